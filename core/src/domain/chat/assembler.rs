use std::pin::Pin;

use futures::{Stream, StreamExt};
use tokio::time::{Instant, timeout_at};

use crate::domain::chat::{
    decoder::Utf8StreamDecoder,
    errors::ChatError,
    ports::ByteStream,
    sse::{LineOutcome, parse_line},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerState {
    Open,
    Closed,
}

/// The assistant reply while it streams in. Text only ever grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialAnswer {
    text: String,
    state: AnswerState,
}

impl Default for PartialAnswer {
    fn default() -> Self {
        Self {
            text: String::new(),
            state: AnswerState::Open,
        }
    }
}

impl PartialAnswer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> AnswerState {
        self.state
    }

    /// Returns false once the answer is closed; the text is left untouched.
    pub fn append(&mut self, delta: &str) -> bool {
        if self.state == AnswerState::Closed {
            return false;
        }
        self.text.push_str(delta);
        true
    }

    pub fn close(&mut self) {
        self.state = AnswerState::Closed;
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Rebuilds one assistant message from a chunked SSE body.
///
/// Owned by a single assembly run and dropped with it. `feed` is called once
/// per transport read, in order.
#[derive(Debug, Default)]
pub struct SseTokenAssembler {
    decoder: Utf8StreamDecoder,
    buffer: String,
    answer: PartialAnswer,
    done: bool,
}

impl SseTokenAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one chunk and returns every snapshot of the answer it
    /// produced, oldest first.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut snapshots = Vec::new();

        // After the sentinel the transport is only drained.
        if self.done {
            return snapshots;
        }

        let text = self.decoder.decode(chunk);
        self.buffer.push_str(&text);

        while let Some(newline) = self.buffer.find('\n') {
            let raw: String = self.buffer.drain(..=newline).collect();
            let line = &raw[..raw.len() - 1];

            match parse_line(line) {
                LineOutcome::Delta(delta) => {
                    if let Some(snapshot) = self.push_delta(&delta) {
                        snapshots.push(snapshot);
                    }
                }
                LineOutcome::Ignored => {}
                LineOutcome::Done => {
                    self.done = true;
                    self.answer.close();
                    self.buffer.clear();
                    break;
                }
                LineOutcome::Incomplete => {
                    self.buffer.insert_str(0, &raw);
                    break;
                }
            }
        }

        snapshots
    }

    /// End of data. An unterminated last line still counts when it parses,
    /// so a producer that omits the final newline keeps its last delta.
    /// Anything else left in the buffer is dropped.
    pub fn flush(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        if self.done || rest.trim().is_empty() {
            return None;
        }

        if !rest.contains('\n')
            && let LineOutcome::Delta(delta) = parse_line(&rest)
        {
            return self.push_delta(&delta);
        }

        tracing::debug!(
            bytes = rest.len(),
            "dropping unresolved event stream fragment"
        );
        None
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn answer(&self) -> &PartialAnswer {
        &self.answer
    }

    /// Seals the answer. Empty text is a valid final answer.
    pub fn into_text(mut self) -> String {
        self.answer.close();
        self.answer.into_text()
    }

    fn push_delta(&mut self, delta: &str) -> Option<String> {
        if self.answer.append(delta) {
            Some(self.answer.text().to_string())
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerEvent {
    /// The whole answer so far, emitted each time it grows.
    Snapshot(String),
    /// The sealed answer. Always the last item of a successful stream.
    Completed(String),
}

pub type AnswerStream = Pin<Box<dyn Stream<Item = Result<AnswerEvent, ChatError>> + Send>>;

/// Drives an [`SseTokenAssembler`] over `bytes`.
///
/// Every read must finish before `deadline`. Dropping the returned stream
/// drops `bytes` and with it the underlying connection.
pub fn assemble_answer(mut bytes: ByteStream, deadline: Instant) -> AnswerStream {
    Box::pin(async_stream::stream! {
        let mut assembler = SseTokenAssembler::new();

        loop {
            let next = match timeout_at(deadline, bytes.next()).await {
                Ok(next) => next,
                Err(_) if assembler.is_done() => {
                    tracing::warn!("chat stream kept open after the done sentinel");
                    break;
                }
                Err(_) => {
                    yield Err(ChatError::Network(
                        "timed out waiting for the chat stream".to_string(),
                    ));
                    return;
                }
            };

            match next {
                Some(Ok(chunk)) => {
                    for snapshot in assembler.feed(&chunk) {
                        yield Ok(AnswerEvent::Snapshot(snapshot));
                    }
                }
                Some(Err(err)) if assembler.is_done() => {
                    tracing::warn!("chat stream failed after the done sentinel: {}", err);
                    break;
                }
                Some(Err(err)) => {
                    yield Err(err);
                    return;
                }
                None => break,
            }
        }

        if let Some(snapshot) = assembler.flush() {
            yield Ok(AnswerEvent::Snapshot(snapshot));
        }

        yield Ok(AnswerEvent::Completed(assembler.into_text()));
    })
}
