use std::time::Duration;

use futures::TryStreamExt;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::domain::{
    chat::{
        errors::{ChatError, QUOTA_EXCEEDED_MESSAGE, RATE_LIMIT_MESSAGE},
        ports::{ByteStream, ChatCompletionClient},
        value_objects::UpstreamMessage,
    },
    common::{LLMConfig, entities::app_errors::CoreError},
};

/// OpenAI-compatible chat-completion gateway, used in streaming mode only.
#[derive(Debug, Clone)]
pub struct GatewayLLMClient {
    api_key: Option<String>,
    base_url: String,
    model_name: String,
    timeout: Duration,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<UpstreamMessage>,
    stream: bool,
}

impl GatewayLLMClient {
    pub fn new(config: &LLMConfig) -> Result<Self, CoreError> {
        if config.base_url.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "LLM base URL must not be empty".to_string(),
            ));
        }
        if config.timeout.is_zero() {
            return Err(CoreError::InvalidConfig(
                "LLM timeout must be greater than zero".to_string(),
            ));
        }

        let client = Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| {
                CoreError::ExternalServiceError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model_name: config.model.clone(),
            timeout: config.timeout,
            client,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl ChatCompletionClient for GatewayLLMClient {
    async fn stream_completion(
        &self,
        messages: Vec<UpstreamMessage>,
    ) -> Result<ByteStream, ChatError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ChatError::Config("LLM API key is not configured".to_string()))?;

        let request = ChatCompletionRequest {
            model: &self.model_name,
            messages,
            stream: true,
        };

        let send = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&request)
            .send();

        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| {
                tracing::error!("AI gateway timed out after {:?}", self.timeout);
                ChatError::Network(format!(
                    "AI gateway did not respond within {} seconds",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                tracing::error!("AI gateway request failed: {}", e);
                ChatError::Network(format!("AI gateway request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("AI gateway error: {} - {}", status, error_text);

            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    ChatError::RateLimited(RATE_LIMIT_MESSAGE.to_string())
                }
                StatusCode::PAYMENT_REQUIRED => {
                    ChatError::QuotaExceeded(QUOTA_EXCEEDED_MESSAGE.to_string())
                }
                _ => ChatError::Upstream(format!("AI gateway error: {}", status.as_u16())),
            });
        }

        let stream = response
            .bytes_stream()
            .map_err(|e| ChatError::Network(format!("AI gateway stream interrupted: {}", e)));

        Ok(Box::pin(stream))
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
    use crate::domain::chat::value_objects::UpstreamRole;

    const SSE_BODY: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n\n";

    fn config(base_url: &str, api_key: Option<&str>) -> LLMConfig {
        LLMConfig {
            api_key: api_key.map(str::to_string),
            base_url: base_url.to_string(),
            model: "test-model".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    fn messages() -> Vec<UpstreamMessage> {
        vec![
            UpstreamMessage::new(UpstreamRole::System, "be nice".to_string()),
            UpstreamMessage::new(UpstreamRole::User, "hello".to_string()),
        ]
    }

    async fn collect(stream: ByteStream) -> Vec<u8> {
        let chunks: Vec<Bytes> = stream.map(|chunk| chunk.unwrap()).collect().await;
        chunks.concat()
    }

    #[tokio::test]
    async fn test_stream_completion_pipes_body_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(json!({
                "model": "test-model",
                "stream": true,
                "messages": [
                    { "role": "system", "content": "be nice" },
                    { "role": "user", "content": "hello" }
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(SSE_BODY, "text/event-stream"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = GatewayLLMClient::new(&config(&server.uri(), Some("secret"))).unwrap();
        let stream = client.stream_completion(messages()).await.unwrap();

        assert_eq!(collect(stream).await, SSE_BODY.as_bytes());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = GatewayLLMClient::new(&config(&server.uri(), None)).unwrap();
        let result = client.stream_completion(messages()).await;

        assert!(matches!(result, Err(ChatError::Config(_))));
    }

    #[tokio::test]
    async fn test_blank_api_key_counts_as_missing() {
        let client = GatewayLLMClient::new(&config("http://127.0.0.1:9", Some("  "))).unwrap();
        let result = client.stream_completion(messages()).await;

        assert!(matches!(result, Err(ChatError::Config(_))));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (429, ChatError::RateLimited(RATE_LIMIT_MESSAGE.to_string())),
            (402, ChatError::QuotaExceeded(QUOTA_EXCEEDED_MESSAGE.to_string())),
            (503, ChatError::Upstream("AI gateway error: 503".to_string())),
        ];

        for (status, expected) in cases {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(status).set_body_string("upstream said no"))
                .mount(&server)
                .await;

            let client = GatewayLLMClient::new(&config(&server.uri(), Some("secret"))).unwrap();
            let result = client.stream_completion(messages()).await;

            match result {
                Err(error) => assert_eq!(error, expected),
                Ok(_) => panic!("expected an error for status {status}"),
            }
        }
    }

    #[test]
    fn test_new_rejects_unusable_config() {
        let mut empty_url = config("  ", Some("secret"));
        assert!(matches!(
            GatewayLLMClient::new(&empty_url),
            Err(CoreError::InvalidConfig(_))
        ));

        empty_url.base_url = "http://127.0.0.1:9".to_string();
        empty_url.timeout = Duration::ZERO;
        assert!(matches!(
            GatewayLLMClient::new(&empty_url),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_network_error() {
        let client = GatewayLLMClient::new(&config("http://127.0.0.1:9", Some("secret"))).unwrap();
        let result = client.stream_completion(messages()).await;

        assert!(matches!(result, Err(ChatError::Network(_))));
    }
}
