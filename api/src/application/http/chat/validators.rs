use std::borrow::Cow;

use nutriscan_core::domain::{
    analysis::entities::{AnalysisResult, UserProfile},
    chat::{entities::ChatRole, value_objects::{HistoryMessage, RelayChatInput}},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub const MAX_MESSAGE_CHARS: usize = 4000;
pub const MAX_INGREDIENTS_CHARS: usize = 20000;

fn validate_message(message: &str) -> Result<(), ValidationError> {
    let length = message.trim().chars().count();

    if length == 0 {
        return Err(ValidationError::new("message_blank")
            .with_message(Cow::Borrowed("message must not be empty")));
    }
    if length > MAX_MESSAGE_CHARS {
        return Err(ValidationError::new("message_too_long")
            .with_message(Cow::Borrowed("message must be at most 4000 characters")));
    }

    Ok(())
}

/// A prior turn as clients send it. Extra fields such as `id` and
/// `timestamp` are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatHistoryEntry {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreamChatValidator {
    #[validate(custom(function = "validate_message"))]
    pub message: String,

    #[validate(length(max = 20000, message = "ingredients must be at most 20000 characters"))]
    pub ingredients: String,

    pub analysis_context: AnalysisResult,

    #[serde(default)]
    pub user_profile: UserProfile,

    #[serde(default)]
    pub conversation_history: Vec<ChatHistoryEntry>,
}

impl From<StreamChatValidator> for RelayChatInput {
    fn from(payload: StreamChatValidator) -> Self {
        RelayChatInput {
            message: payload.message,
            ingredients: payload.ingredients,
            analysis: payload.analysis_context,
            profile: payload.user_profile,
            history: payload
                .conversation_history
                .into_iter()
                .map(|entry| HistoryMessage {
                    role: entry.role,
                    content: entry.content,
                })
                .collect(),
        }
    }
}
