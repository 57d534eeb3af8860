//! Streaming response framing
//!
//! Ollama streams chat responses as newline-delimited JSON: one chunk object
//! per line. [`NdjsonFramer`] turns arbitrary byte-chunk boundaries back into
//! complete lines, buffering any partial trailing line until the next call.
//!
//! The framer works on raw bytes: network chunks can split a multibyte UTF-8
//! character, so decoding happens only on complete lines, never on chunk
//! boundaries.

/// Line framer for newline-delimited JSON streams
#[derive(Debug, Default)]
pub struct NdjsonFramer {
    /// Buffer for an incomplete trailing line
    buffer: Vec<u8>,
}

impl NdjsonFramer {
    /// Create a new framer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of stream data, returning the complete lines it closed
    ///
    /// Empty lines are dropped; a trailing `\r` is trimmed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(line_end) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=line_end).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }

    /// Drain whatever is left after the stream ends
    ///
    /// Backends terminate the last chunk with a newline, but a final
    /// unterminated line is still handed out rather than dropped.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        let mut line = std::mem::take(&mut self.buffer);
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.is_empty() {
            None
        } else {
            Some(line)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_complete_lines() {
        let mut framer = NdjsonFramer::new();
        let lines = framer.feed(b"{\"a\":1}\n{\"b\":2}\n");
        assert_eq!(lines, vec![b"{\"a\":1}".to_vec(), b"{\"b\":2}".to_vec()]);
        assert_eq!(framer.finish(), None);
    }

    #[test]
    fn test_split_across_chunks() {
        let mut framer = NdjsonFramer::new();
        assert!(framer.feed(b"{\"content\":").is_empty());
        let lines = framer.feed(b"\"hi\"}\n");
        assert_eq!(lines, vec![b"{\"content\":\"hi\"}".to_vec()]);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        // "é" is 0xC3 0xA9; a chunk boundary between the two bytes must not
        // corrupt the decoded line
        let mut framer = NdjsonFramer::new();
        assert!(framer.feed(b"{\"content\":\"h\xc3").is_empty());
        let lines = framer.feed(b"\xa9llo\"}\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(
            std::str::from_utf8(&lines[0]).unwrap(),
            "{\"content\":\"h\u{e9}llo\"}"
        );
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let mut framer = NdjsonFramer::new();
        let lines = framer.feed(b"{\"a\":1}\r\n\r\n{\"b\":2}\n");
        assert_eq!(lines, vec![b"{\"a\":1}".to_vec(), b"{\"b\":2}".to_vec()]);
    }

    #[test]
    fn test_unterminated_final_line() {
        let mut framer = NdjsonFramer::new();
        assert!(framer.feed(b"{\"done\":true}").is_empty());
        assert_eq!(framer.finish(), Some(b"{\"done\":true}".to_vec()));
    }
}
