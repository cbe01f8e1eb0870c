/// Incremental UTF-8 decoder for a chunked byte stream.
///
/// A code point cut by a chunk boundary is held back until the following
/// chunk completes it. Invalid sequences decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut decoded = String::with_capacity(self.pending.len());
        let mut offset = 0;

        while offset < self.pending.len() {
            match std::str::from_utf8(&self.pending[offset..]) {
                Ok(valid) => {
                    decoded.push_str(valid);
                    offset = self.pending.len();
                }
                Err(err) => {
                    let valid_end = offset + err.valid_up_to();
                    decoded.push_str(&String::from_utf8_lossy(&self.pending[offset..valid_end]));

                    match err.error_len() {
                        Some(invalid_len) => {
                            decoded.push(char::REPLACEMENT_CHARACTER);
                            offset = valid_end + invalid_len;
                        }
                        // Truncated code point, wait for the next chunk.
                        None => {
                            offset = valid_end;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..offset);
        decoded
    }

    /// Bytes held back waiting for the rest of a code point.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
