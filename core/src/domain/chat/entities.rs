use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    analysis::entities::{AnalysisResult, UserProfile},
    common::generate_timestamp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sealed message of a conversation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatTurn {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: String) -> Self {
        let (now, timestamp) = generate_timestamp();

        Self {
            id: Uuid::new_v7(timestamp),
            role,
            content,
            created_at: now,
        }
    }

    pub fn user(content: String) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: String) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Grounding data attached to every turn of one analysis session.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationContext {
    pub ingredients: String,
    pub analysis: AnalysisResult,
    pub profile: UserProfile,
}

impl ConversationContext {
    pub fn new(ingredients: String, analysis: AnalysisResult, profile: UserProfile) -> Self {
        Self {
            ingredients,
            analysis,
            profile,
        }
    }
}
