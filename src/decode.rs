//! Incremental UTF-8 decoding for unframed response bodies
//!
//! Chunk boundaries fall wherever the transport puts them, so a multi-byte
//! character may arrive split across two reads. The decoder holds back an
//! incomplete trailing sequence until the next chunk completes it. Invalid
//! sequences are replaced with U+FFFD rather than failing the exchange.

const REPLACEMENT: char = '\u{FFFD}';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Utf8StreamDecoder {
    /// Incomplete sequence carried over from the previous chunk (at most 3 bytes)
    pending: Vec<u8>,
    replacements: usize,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `chunk` as possible, returning the new text
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(chunk);

        let mut out = String::with_capacity(input.len());
        let mut rest: &[u8] = &input;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    if let Some(len) = e.error_len() {
                        out.push(REPLACEMENT);
                        self.replacements += 1;
                        rest = &after[len..];
                    } else {
                        // Truncated sequence at the end: wait for more bytes
                        self.pending = after.to_vec();
                        break;
                    }
                }
            }
        }
        out
    }

    /// Flush at end of stream. An incomplete trailing sequence becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        self.pending.clear();
        self.replacements += 1;
        REPLACEMENT.to_string()
    }

    #[cfg(test)]
    fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of malformed sequences replaced so far
    pub fn replacements(&self) -> usize {
        self.replacements
    }
}
