//! Transport decoder: raw bytes to discrete SSE event records
//!
//! The chat-completions endpoint replies with a `text/event-stream` style
//! body. This decoder turns an arbitrary sequence of byte chunks into the
//! `data: `-prefixed records the event parser consumes, handling chunk
//! boundaries that fall mid-line or mid-UTF-8-sequence.

/// Literal prefix that marks a payload-carrying SSE line
pub const DATA_PREFIX: &str = "data: ";

/// Incremental decoder for line-oriented SSE framing
///
/// Feed it byte chunks as they arrive; it yields every complete line that
/// starts with [`DATA_PREFIX`]. Other lines (blank keep-alives, `event:`
/// fields, comments) are silently discarded. A line whose terminating
/// newline has not been seen yet stays buffered; the tail left at stream
/// close is abandoned.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Undecoded bytes: at most one incomplete UTF-8 sequence
    pending: Vec<u8>,

    /// Decoded text that has not yet seen its terminating newline
    line_buf: String,
}

impl SseDecoder {
    /// Create a decoder with empty buffers
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one byte chunk, returning every newly completed record
    pub fn feed(&mut self, input: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(input);
        self.decode_pending();
        self.drain_records()
    }

    /// Decode as much of `pending` as is valid UTF-8, holding back an
    /// incomplete trailing sequence and replacing invalid sequences with
    /// U+FFFD (stream-safe decoding).
    fn decode_pending(&mut self) {
        let mut bytes = std::mem::take(&mut self.pending);
        let mut rest = bytes.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    self.line_buf.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    self.line_buf.push_str(std::str::from_utf8(valid).unwrap_or(""));
                    match err.error_len() {
                        Some(len) => {
                            self.line_buf.push('\u{FFFD}');
                            rest = &after[len..];
                        }
                        None => {
                            // Incomplete sequence at the end of the chunk
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }

        let keep = bytes.len() - rest.len();
        bytes.drain(..keep);
        self.pending = bytes;
    }

    /// Split off every line whose newline has been seen and keep the tail
    fn drain_records(&mut self) -> Vec<String> {
        let Some(last_newline) = self.line_buf.rfind('\n') else {
            return Vec::new();
        };
        let complete: String = self.line_buf.drain(..=last_newline).collect();

        complete
            .split('\n')
            .filter(|line| line.starts_with(DATA_PREFIX))
            .map(str::to_owned)
            .collect()
    }
}
