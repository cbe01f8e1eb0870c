use thiserror::Error;

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";
pub const QUOTA_EXCEEDED_MESSAGE: &str = "AI usage limit reached. Please try again later.";
pub const NETWORK_FAILURE_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Failure buckets of one chat exchange. Framing problems in the event
/// stream never show up here, the assembler absorbs them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    QuotaExceeded(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Config(String),

    #[error("A reply is already streaming for this conversation")]
    Busy,

    #[error("Message must not be empty")]
    InvalidMessage,
}

impl ChatError {
    /// Text sealed into the assistant turn when an exchange fails.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Network(_) => NETWORK_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_keeps_relay_wording() {
        let error = ChatError::RateLimited(RATE_LIMIT_MESSAGE.to_string());
        assert_eq!(error.user_message(), RATE_LIMIT_MESSAGE);

        let error = ChatError::Upstream("AI gateway error: 503".to_string());
        assert_eq!(error.user_message(), "AI gateway error: 503");
    }

    #[test]
    fn test_user_message_hides_transport_details() {
        let error = ChatError::Network("connection reset by peer".to_string());
        assert_eq!(error.user_message(), NETWORK_FAILURE_MESSAGE);
    }
}
