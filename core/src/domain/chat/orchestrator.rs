use futures::StreamExt;
use tokio::time::{Instant, timeout_at};

use crate::domain::chat::{
    assembler::{AnswerEvent, assemble_answer},
    entities::{ChatTurn, ConversationContext},
    errors::ChatError,
    ports::ChatTransport,
    value_objects::RelayChatRequest,
};

/// Client-side state of one analysis chat: the permanent turn log, the
/// transient typing slot and the loading flag.
///
/// The log only changes on user send, reply seal and error seal.
#[derive(Debug, Clone)]
pub struct Conversation {
    context: ConversationContext,
    turns: Vec<ChatTurn>,
    typing: Option<String>,
    loading: bool,
}

impl Conversation {
    pub fn new(context: ConversationContext) -> Self {
        Self {
            context,
            turns: Vec::new(),
            typing: None,
            loading: false,
        }
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Partial reply currently streaming in, if any.
    pub fn typing(&self) -> Option<&str> {
        self.typing.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Appends the user turn and marks the conversation as loading.
    ///
    /// The returned request carries the history as it was before this turn.
    pub fn begin_turn(&mut self, message: &str) -> Result<RelayChatRequest, ChatError> {
        if self.loading {
            return Err(ChatError::Busy);
        }

        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::InvalidMessage);
        }

        let request = RelayChatRequest {
            message: message.to_string(),
            ingredients: self.context.ingredients.clone(),
            analysis_context: self.context.analysis.clone(),
            user_profile: self.context.profile.clone(),
            conversation_history: self.turns.clone(),
        };

        self.turns.push(ChatTurn::user(message.to_string()));
        self.loading = true;
        self.typing = None;

        Ok(request)
    }

    pub fn apply_snapshot(&mut self, snapshot: String) {
        if self.loading {
            self.typing = Some(snapshot);
        }
    }

    pub fn seal_reply(&mut self, text: String) -> &ChatTurn {
        self.seal(ChatTurn::assistant(text))
    }

    pub fn seal_error(&mut self, error: &ChatError) -> &ChatTurn {
        tracing::error!("Chat error: {}", error);
        self.seal(ChatTurn::assistant(error.user_message()))
    }

    /// Abandons the in-flight reply. Whatever was shown as typing is
    /// discarded and no assistant turn is sealed.
    pub fn cancel_turn(&mut self) {
        if self.loading {
            tracing::debug!("discarding partial chat reply");
        }
        self.typing = None;
        self.loading = false;
    }

    /// Sends `message` through `transport` and seals exactly one assistant
    /// turn: the assembled reply, or an error message if anything fails.
    ///
    /// `on_update` sees every snapshot of the growing reply. Dropping the
    /// returned future before it resolves behaves like
    /// [`Conversation::cancel_turn`].
    pub async fn send<T, F>(
        &mut self,
        transport: &T,
        message: &str,
        deadline: Instant,
        mut on_update: F,
    ) -> Result<ChatTurn, ChatError>
    where
        T: ChatTransport,
        F: FnMut(&str),
    {
        let request = self.begin_turn(message)?;
        let mut in_flight = InFlightTurn {
            conversation: self,
            settled: false,
        };

        let outcome: Result<String, ChatError> = async {
            let bytes = timeout_at(deadline, transport.open_stream(request))
                .await
                .map_err(|_| {
                    ChatError::Network("timed out waiting for the chat relay".to_string())
                })??;
            let mut answer = assemble_answer(bytes, deadline);

            while let Some(event) = answer.next().await {
                match event? {
                    AnswerEvent::Snapshot(snapshot) => {
                        on_update(&snapshot);
                        in_flight.conversation.apply_snapshot(snapshot);
                    }
                    AnswerEvent::Completed(text) => return Ok(text),
                }
            }

            Err(ChatError::Network(
                "chat stream ended without completing".to_string(),
            ))
        }
        .await;

        let sealed = match outcome {
            Ok(text) => in_flight.conversation.seal_reply(text).clone(),
            Err(error) => in_flight.conversation.seal_error(&error).clone(),
        };
        in_flight.settled = true;

        Ok(sealed)
    }

    fn seal(&mut self, turn: ChatTurn) -> &ChatTurn {
        self.typing = None;
        self.loading = false;
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }
}

/// Resets the conversation if a send is dropped mid-flight.
struct InFlightTurn<'a> {
    conversation: &'a mut Conversation,
    settled: bool,
}

impl Drop for InFlightTurn<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.conversation.cancel_turn();
        }
    }
}
