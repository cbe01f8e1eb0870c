use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health assessment produced by the analysis service. The chat relay only
/// reads it to ground the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// 0 to 100
    pub overall_score: f64,
    pub verdict: Verdict,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientAnalysis>,
    #[serde(default)]
    pub personalized_alerts: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Verdict {
    Great,
    Good,
    Caution,
    Avoid,
}

impl Verdict {
    pub fn as_str(&self) -> &str {
        match self {
            Verdict::Great => "Great",
            Verdict::Good => "Good",
            Verdict::Caution => "Caution",
            Verdict::Avoid => "Avoid",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientAnalysis {
    pub name: String,
    pub level: HealthLevel,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty_note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Safe,
    Caution,
    Warning,
    Danger,
}

impl HealthLevel {
    pub fn as_str(&self) -> &str {
        match self {
            HealthLevel::Safe => "safe",
            HealthLevel::Caution => "caution",
            HealthLevel::Warning => "warning",
            HealthLevel::Danger => "danger",
        }
    }
}

impl fmt::Display for HealthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub health_goals: Vec<String>,
}
