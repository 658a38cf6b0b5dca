//! SSE Line Framing
//!
//! Buffers raw byte chunks from a streaming HTTP response and yields
//! complete `data:` payloads one at a time.

/// Incremental line buffer over an SSE byte stream.
#[derive(Default)]
pub(crate) struct SseLineBuffer {
    buffer: String,
}

impl SseLineBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and drain every complete `data:` payload it closes.
    ///
    /// Comment lines, event names, and the `[DONE]` sentinel are skipped;
    /// `[DONE]` ends the logical stream but callers also stop when the
    /// transport closes.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut payloads = Vec::new();
        while let Some(line_end) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=line_end).collect();
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim();
                if data != "[DONE]" && !data.is_empty() {
                    payloads.push(data.to_string());
                }
            }
        }
        payloads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_split_across_chunks() {
        let mut buf = SseLineBuffer::new();
        assert!(buf.push(b"data: {\"a\":").is_empty());
        let out = buf.push(b"1}\n");
        assert_eq!(out, vec!["{\"a\":1}".to_string()]);
    }

    #[test]
    fn test_skips_events_and_done() {
        let mut buf = SseLineBuffer::new();
        let out = buf.push(b"event: message_start\ndata: {\"x\":1}\n\ndata: [DONE]\n");
        assert_eq!(out, vec!["{\"x\":1}".to_string()]);
    }

    #[test]
    fn test_multiple_payloads_in_one_chunk() {
        let mut buf = SseLineBuffer::new();
        let out = buf.push(b"data: 1\ndata: 2\n");
        assert_eq!(out, vec!["1".to_string(), "2".to_string()]);
    }
}
