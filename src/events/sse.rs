//! Incremental `text/event-stream` decoder.

use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// `message` when the server sent no `event:` field.
    pub event: String,
    pub data: String,
    pub id: Option<String>,
}

/// Longest line kept; anything longer is discarded up to its line terminator.
pub const MAX_LINE_BYTES: usize = 1 << 20;

/// Feed raw chunks as they arrive; complete events come out once their terminating
/// blank line has been seen. Chunks may split lines or UTF-8 sequences anywhere.
/// Lines end with CRLF, LF or a lone CR.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    after_cr: bool,
    oversized: bool,
    event: Option<String>,
    data: Vec<String>,
    last_id: Option<String>,
}

impl SseDecoder {
    pub fn new() -> Self { Self::default() }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let mut out = Vec::new();
        for &b in chunk {
            // LF right after CR belongs to the same terminator, even across chunks
            if std::mem::take(&mut self.after_cr) && b == b'\n' {
                continue;
            }
            match b {
                b'\r' | b'\n' => {
                    self.after_cr = b == b'\r';
                    if std::mem::take(&mut self.oversized) {
                        warn!(target: "openphotobox::events", "dropped event stream line longer than {} bytes", MAX_LINE_BYTES);
                        continue;
                    }
                    let line = String::from_utf8_lossy(&self.buf).into_owned();
                    self.buf.clear();
                    if let Some(ev) = self.process_line(&line) {
                        out.push(ev);
                    }
                }
                _ if self.oversized => {}
                _ if self.buf.len() >= MAX_LINE_BYTES => {
                    self.oversized = true;
                    self.buf = Vec::new();
                }
                _ => self.buf.push(b),
            }
        }
        out
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" => self.last_id = Some(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: event.filter(|e| !e.is_empty()).unwrap_or_else(|| "message".to_string()),
            data,
            id: self.last_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_event_split_across_chunks() {
        let mut d = SseDecoder::new();
        assert!(d.feed(b"event: asset_ready\r\nda").is_empty());
        assert!(d.feed(b"ta: {\"id\": \"42\"}\r\n").is_empty());
        let evs = d.feed(b"\r\n");
        assert_eq!(evs, vec![SseEvent { event: "asset_ready".into(), data: "{\"id\": \"42\"}".into(), id: None }]);
    }

    #[test]
    fn comments_multiline_data_and_default_name() {
        let mut d = SseDecoder::new();
        let evs = d.feed(b": keepalive\n\nid: 7\ndata: a\ndata: b\n\nevent: x\n\n");
        assert_eq!(evs.len(), 1);
        assert_eq!(evs[0].event, "message");
        assert_eq!(evs[0].data, "a\nb");
        assert_eq!(evs[0].id.as_deref(), Some("7"));
        // an event name without data is discarded and does not leak into the next event
        let evs = d.feed(b"data:tight\n\n");
        assert_eq!(evs[0].event, "message");
        assert_eq!(evs[0].data, "tight");
    }

    #[test]
    fn bare_cr_ends_lines() {
        let mut d = SseDecoder::new();
        let evs = d.feed(b"data: a\r\rdata: b\r\r");
        assert_eq!(evs.iter().map(|e| e.data.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        // CRLF split between chunks is still one terminator
        assert!(d.feed(b"data: x\r").is_empty());
        assert!(d.feed(b"\n").is_empty());
        assert_eq!(d.feed(b"\r\n")[0].data, "x");
    }

    #[test]
    fn overlong_line_is_dropped() {
        let mut d = SseDecoder::new();
        let mut big = b"data: ".to_vec();
        big.resize(MAX_LINE_BYTES + 64, b'a');
        assert!(d.feed(&big).is_empty());
        assert!(d.buf.is_empty());
        let evs = d.feed(b"\n\ndata: ok\n\n");
        assert_eq!(evs.len(), 1);
        assert_eq!(evs[0].data, "ok");
    }

    #[test]
    fn utf8_split_inside_a_character() {
        let mut d = SseDecoder::new();
        let bytes = "data: café\n\n".as_bytes();
        let (a, b) = bytes.split_at(10);
        assert!(d.feed(a).is_empty());
        assert_eq!(d.feed(b)[0].data, "café");
    }
}
