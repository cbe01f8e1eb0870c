use crate::domain::{
    chat::{
        errors::ChatError,
        ports::{ByteStream, ChatCompletionClient, ChatRelayService},
        prompt::build_upstream_messages,
        value_objects::RelayChatInput,
    },
    common::services::Service,
};

impl<LLM> ChatRelayService for Service<LLM>
where
    LLM: ChatCompletionClient,
{
    async fn relay_chat(&self, input: RelayChatInput) -> Result<ByteStream, ChatError> {
        let messages = build_upstream_messages(&input);

        tracing::info!("Chat request with {} messages", messages.len());

        // The upstream body is handed back untouched.
        self.llm_client.stream_completion(messages).await
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use futures::{StreamExt, stream};

    use super::*;
    use crate::domain::{
        analysis::entities::{AnalysisResult, UserProfile, Verdict},
        chat::{
            entities::ChatRole,
            errors::RATE_LIMIT_MESSAGE,
            ports::MockChatCompletionClient,
            value_objects::{HistoryMessage, UpstreamRole},
        },
    };

    fn input() -> RelayChatInput {
        RelayChatInput {
            message: "Is it vegan?".to_string(),
            ingredients: "water, sugar".to_string(),
            analysis: AnalysisResult {
                overall_score: 55.0,
                verdict: Verdict::Caution,
                summary: "Sweet.".to_string(),
                ingredients: vec![],
                personalized_alerts: vec![],
            },
            profile: UserProfile::default(),
            history: vec![HistoryMessage {
                role: ChatRole::User,
                content: "Hi".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_relay_chat_pipes_upstream_bytes() {
        let mut client = MockChatCompletionClient::new();
        client
            .expect_stream_completion()
            .withf(|messages| {
                messages.len() == 3
                    && messages[0].role == UpstreamRole::System
                    && messages[2].content == "Is it vegan?"
            })
            .times(1)
            .returning(|_| {
                Box::pin(async {
                    let chunks = vec![
                        Ok(Bytes::from_static(b"data: {\"choices\":[]}\n")),
                        Ok(Bytes::from_static(b"data: [DONE]\n")),
                    ];
                    Ok(Box::pin(stream::iter(chunks)) as ByteStream)
                })
            });

        let service = Service::new(client);
        let stream = service.relay_chat(input()).await.unwrap();
        let chunks: Vec<Bytes> = stream.map(|chunk| chunk.unwrap()).collect().await;

        assert_eq!(
            chunks,
            vec![
                Bytes::from_static(b"data: {\"choices\":[]}\n"),
                Bytes::from_static(b"data: [DONE]\n"),
            ]
        );
    }

    #[tokio::test]
    async fn test_relay_chat_surfaces_rate_limit() {
        let mut client = MockChatCompletionClient::new();
        client.expect_stream_completion().times(1).returning(|_| {
            Box::pin(async { Err(ChatError::RateLimited(RATE_LIMIT_MESSAGE.to_string())) })
        });

        let service = Service::new(client);
        let result = service.relay_chat(input()).await;

        assert!(matches!(result, Err(ChatError::RateLimited(message)) if message == RATE_LIMIT_MESSAGE));
    }
}
