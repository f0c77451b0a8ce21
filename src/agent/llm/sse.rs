//! Server-sent events decoding for streamed model responses.

/// Incremental decoder for `text/event-stream` bodies.
///
/// Bytes may arrive split at arbitrary points, even inside a UTF-8
/// character. Incomplete lines stay buffered as raw bytes until the next
/// [`push`](Self::push) or [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push incoming bytes and return the complete `data:` payloads.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            if let Some(payload) = Self::payload(&String::from_utf8_lossy(&line)) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flush whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Vec<String> {
        let rest = std::mem::take(&mut self.buffer);
        String::from_utf8_lossy(&rest)
            .lines()
            .filter_map(Self::payload)
            .collect()
    }

    fn payload(line: &str) -> Option<String> {
        line.trim()
            .strip_prefix("data:")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
    }
}
