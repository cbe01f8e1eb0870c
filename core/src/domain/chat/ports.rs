use std::{future::Future, pin::Pin};

use bytes::Bytes;
use futures::Stream;

use crate::domain::chat::{
    errors::ChatError,
    value_objects::{RelayChatInput, RelayChatRequest, UpstreamMessage},
};

/// Raw event-stream bytes, exactly as the producer wrote them.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ChatError>> + Send>>;

/// Streaming chat-completion provider
#[cfg_attr(test, mockall::automock)]
pub trait ChatCompletionClient: Send + Sync {
    fn stream_completion(
        &self,
        messages: Vec<UpstreamMessage>,
    ) -> impl Future<Output = Result<ByteStream, ChatError>> + Send;
}

/// Server side of the chat relay
pub trait ChatRelayService: Send + Sync {
    fn relay_chat(
        &self,
        input: RelayChatInput,
    ) -> impl Future<Output = Result<ByteStream, ChatError>> + Send;
}

/// Client side connection to the relay
#[cfg_attr(test, mockall::automock)]
pub trait ChatTransport: Send + Sync {
    fn open_stream(
        &self,
        request: RelayChatRequest,
    ) -> impl Future<Output = Result<ByteStream, ChatError>> + Send;
}
