use futures::TryStreamExt;
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use serde::Deserialize;

use crate::domain::chat::{
    errors::ChatError,
    ports::{ByteStream, ChatTransport},
    value_objects::RelayChatRequest,
};

const RATE_LIMIT_FALLBACK: &str = "Rate limit exceeded. Please wait a moment and try again.";
const QUOTA_FALLBACK: &str = "AI usage limit reached. Please try again later.";
const FAILURE_FALLBACK: &str = "Failed to get response";

/// Opens chat streams against the relay endpoint.
#[derive(Debug, Clone)]
pub struct RelayHttpClient {
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct RelayErrorBody {
    error: String,
}

impl RelayHttpClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            client: Client::new(),
        }
    }
}

fn is_event_stream(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/event-stream"))
}

impl ChatTransport for RelayHttpClient {
    async fn open_stream(&self, request: RelayChatRequest) -> Result<ByteStream, ChatError> {
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Chat relay request failed: {}", e);
            ChatError::Network(format!("Chat relay request failed: {}", e))
        })?;

        let status = response.status();
        if status.is_success() && is_event_stream(&response) {
            let stream = response
                .bytes_stream()
                .map_err(|e| ChatError::Network(format!("Chat stream interrupted: {}", e)));
            return Ok(Box::pin(stream));
        }

        // Rejections are a single JSON object, never a partial stream.
        let relay_message = response
            .json::<RelayErrorBody>()
            .await
            .ok()
            .map(|body| body.error);
        tracing::warn!(
            "Chat relay rejected the request with {}: {:?}",
            status,
            relay_message
        );

        Err(match status {
            StatusCode::TOO_MANY_REQUESTS => ChatError::RateLimited(
                relay_message.unwrap_or_else(|| RATE_LIMIT_FALLBACK.to_string()),
            ),
            StatusCode::PAYMENT_REQUIRED => ChatError::QuotaExceeded(
                relay_message.unwrap_or_else(|| QUOTA_FALLBACK.to_string()),
            ),
            _ => ChatError::Upstream(relay_message.unwrap_or_else(|| FAILURE_FALLBACK.to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use futures::StreamExt;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    use super::*;
    use crate::domain::analysis::entities::{AnalysisResult, UserProfile, Verdict};

    fn request() -> RelayChatRequest {
        RelayChatRequest {
            message: "Is it gluten free?".to_string(),
            ingredients: "wheat flour".to_string(),
            analysis_context: AnalysisResult {
                overall_score: 61.0,
                verdict: Verdict::Good,
                summary: "Fine.".to_string(),
                ingredients: vec![],
                personalized_alerts: vec![],
            },
            user_profile: UserProfile::default(),
            conversation_history: vec![],
        }
    }

    async fn relay_returning(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/stream"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_open_stream_returns_event_stream_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/stream"))
            .and(header("authorization", "Bearer publishable"))
            .and(body_partial_json(json!({
                "message": "Is it gluten free?",
                "analysisContext": { "verdict": "Good" },
                "conversationHistory": []
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("data: [DONE]\n", "text/event-stream"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = RelayHttpClient::new(
            format!("{}/chat/stream", server.uri()),
            Some("publishable".to_string()),
        );
        let stream = client.open_stream(request()).await.unwrap();
        let chunks: Vec<Bytes> = stream.map(|chunk| chunk.unwrap()).collect().await;

        assert_eq!(chunks.concat(), b"data: [DONE]\n");
    }

    #[tokio::test]
    async fn test_rate_limit_uses_relay_message() {
        let server = relay_returning(
            ResponseTemplate::new(429)
                .set_body_json(json!({ "error": "Rate limit exceeded. Please try again later." })),
        )
        .await;

        let client = RelayHttpClient::new(format!("{}/chat/stream", server.uri()), None);
        let result = client.open_stream(request()).await;

        assert!(matches!(
            result,
            Err(ChatError::RateLimited(message)) if message == "Rate limit exceeded. Please try again later."
        ));
    }

    #[tokio::test]
    async fn test_quota_without_body_uses_fallback() {
        let server = relay_returning(ResponseTemplate::new(402)).await;

        let client = RelayHttpClient::new(format!("{}/chat/stream", server.uri()), None);
        let result = client.open_stream(request()).await;

        assert!(matches!(
            result,
            Err(ChatError::QuotaExceeded(message)) if message == QUOTA_FALLBACK
        ));
    }

    #[tokio::test]
    async fn test_server_error_carries_relay_message() {
        let server = relay_returning(
            ResponseTemplate::new(500).set_body_json(json!({ "error": "AI gateway error: 503" })),
        )
        .await;

        let client = RelayHttpClient::new(format!("{}/chat/stream", server.uri()), None);
        let result = client.open_stream(request()).await;

        assert!(matches!(
            result,
            Err(ChatError::Upstream(message)) if message == "AI gateway error: 503"
        ));
    }

    #[tokio::test]
    async fn test_success_without_event_stream_is_rejected() {
        let server = relay_returning(
            ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })),
        )
        .await;

        let client = RelayHttpClient::new(format!("{}/chat/stream", server.uri()), None);
        let result = client.open_stream(request()).await;

        assert!(matches!(
            result,
            Err(ChatError::Upstream(message)) if message == FAILURE_FALLBACK
        ));
    }
}
