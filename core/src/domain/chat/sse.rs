use serde_json::Value;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

/// Result of handling one complete line of the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Non-empty text to append to the answer.
    Delta(String),
    /// The payload is not valid JSON yet; the line goes back to the buffer.
    Incomplete,
    /// Blank, comment, unknown field, or an event without text.
    Ignored,
    /// Terminal sentinel.
    Done,
}

/// One decoded `data:` event.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamFrame {
    pub raw: String,
    pub payload: Value,
    pub delta: Option<String>,
}

impl StreamFrame {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let payload: Value = serde_json::from_str(raw)?;
        let delta = payload
            .pointer("/choices/0/delta/content")
            .and_then(Value::as_str)
            .filter(|content| !content.is_empty())
            .map(str::to_string);

        Ok(Self {
            raw: raw.to_string(),
            payload,
            delta,
        })
    }
}

/// Classifies one line, without its `\n` terminator.
pub fn parse_line(line: &str) -> LineOutcome {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line.starts_with(':') || line.trim().is_empty() {
        return LineOutcome::Ignored;
    }

    let Some(data) = line.strip_prefix(DATA_PREFIX) else {
        return LineOutcome::Ignored;
    };

    let data = data.trim();
    if data == DONE_SENTINEL {
        return LineOutcome::Done;
    }

    match StreamFrame::parse(data) {
        Ok(StreamFrame {
            delta: Some(delta), ..
        }) => LineOutcome::Delta(delta),
        Ok(_) => LineOutcome::Ignored,
        Err(_) => LineOutcome::Incomplete,
    }
}
