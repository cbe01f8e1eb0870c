use serde::{Deserialize, Serialize};

use crate::domain::{
    analysis::entities::{AnalysisResult, UserProfile},
    chat::entities::{ChatRole, ChatTurn},
};

/// Everything the relay needs to forward one user message upstream.
#[derive(Debug, Clone)]
pub struct RelayChatInput {
    pub message: String,
    pub ingredients: String,
    pub analysis: AnalysisResult,
    pub profile: UserProfile,
    pub history: Vec<HistoryMessage>,
}

/// A prior turn as the relay sees it. Ids and timestamps stay client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamRole {
    System,
    User,
    Assistant,
}

impl From<ChatRole> for UpstreamRole {
    fn from(role: ChatRole) -> Self {
        match role {
            ChatRole::User => UpstreamRole::User,
            ChatRole::Assistant => UpstreamRole::Assistant,
        }
    }
}

/// One entry of the chat-completion `messages` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamMessage {
    pub role: UpstreamRole,
    pub content: String,
}

impl UpstreamMessage {
    pub fn new(role: UpstreamRole, content: String) -> Self {
        Self { role, content }
    }
}

/// Wire body the client posts to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayChatRequest {
    pub message: String,
    pub ingredients: String,
    pub analysis_context: AnalysisResult,
    #[serde(default)]
    pub user_profile: UserProfile,
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
}
