//! Framing for real-time event streams.
//!
//! Two framings are accepted on the same stream:
//!
//! - newline-delimited JSON, one instance bucket per line;
//! - Server-Sent Events, where `data:` lines accumulate until a blank line,
//!   `event:` names the event type, and `:` comments, `id:` and `retry:` are
//!   ignored.
//!
//! An SSE event named `error` is a transport error reported by the server.
//! Unnamed events and events named `message` carry payloads; any other named
//! event is ignored.

use tracing::debug;

use crate::error::SourceError;
use crate::source::InstanceBucket;

/// A complete event decoded from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A payload to be parsed as an instance bucket.
    Message(String),
    /// The server signalled a transport failure.
    Error(String),
}

/// Line-at-a-time decoder for NDJSON and SSE framing.
#[derive(Debug, Default)]
pub struct EventDecoder {
    event_type: Option<String>,
    data: Vec<String>,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (with or without its line terminator).
    ///
    /// Returns an event when the line completes one.
    pub fn feed(&mut self, line: &str) -> Option<StreamEvent> {
        let line = line.trim_end_matches(['\r', '\n']);

        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        // A line without a colon is a field name with an empty value
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, strip_space(value)),
            None => (line, ""),
        };

        match field {
            "data" => {
                self.data.push(value.to_string());
                None
            }
            "event" => {
                self.event_type = (!value.is_empty()).then(|| value.to_string());
                None
            }
            "id" | "retry" => None,
            _ if self.data.is_empty() && self.event_type.is_none() => {
                // Bare line outside any SSE event: NDJSON
                let payload = line.trim();
                (!payload.is_empty()).then(|| StreamEvent::Message(payload.to_string()))
            }
            _ => None,
        }
    }

    /// Flush a pending SSE event at end of stream.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        self.dispatch()
    }

    fn dispatch(&mut self) -> Option<StreamEvent> {
        let event_type = self.event_type.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");

        match event_type.as_deref() {
            None | Some("message") => Some(StreamEvent::Message(data)),
            Some("error") => Some(StreamEvent::Error(data)),
            Some(other) => {
                debug!(event = other, "Ignoring named event");
                None
            }
        }
    }
}

/// SSE strips exactly one leading space from field values.
fn strip_space(value: &str) -> &str {
    value.strip_prefix(' ').unwrap_or(value)
}

/// Parse an event payload into an instance bucket.
pub fn decode_bucket(payload: &[u8]) -> Result<InstanceBucket, SourceError> {
    serde_json::from_slice(payload).map_err(|e| SourceError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUCKET: &str = r#"{"instance":"web-1","routers":[{"url":"GET /","200":1}]}"#;

    fn decode_all(input: &str) -> Vec<StreamEvent> {
        let mut decoder = EventDecoder::new();
        let mut events: Vec<StreamEvent> = input.lines().filter_map(|l| decoder.feed(l)).collect();
        events.extend(decoder.finish());
        events
    }

    #[test]
    fn test_ndjson_lines() {
        let input = format!("{}\n\n{}\n", BUCKET, BUCKET);
        assert_eq!(
            decode_all(&input),
            vec![StreamEvent::Message(BUCKET.into()), StreamEvent::Message(BUCKET.into())]
        );
    }

    #[test]
    fn test_sse_framing() {
        let input = format!(": keep-alive\nid: 7\ndata: {}\n\n", BUCKET);
        assert_eq!(decode_all(&input), vec![StreamEvent::Message(BUCKET.into())]);
    }

    #[test]
    fn test_sse_multiline_data_is_joined() {
        let input = "data: {\"instance\":\ndata: \"web-1\"}\n\n";
        let events = decode_all(input);
        assert_eq!(events, vec![StreamEvent::Message("{\"instance\":\n\"web-1\"}".into())]);

        let StreamEvent::Message(payload) = &events[0] else {
            panic!("expected message");
        };
        let bucket = decode_bucket(payload.as_bytes()).unwrap();
        assert_eq!(bucket.instance, "web-1");
    }

    #[test]
    fn test_sse_error_event() {
        let input = "event: error\ndata: upstream reset\n\n";
        assert_eq!(decode_all(input), vec![StreamEvent::Error("upstream reset".into())]);
    }

    #[test]
    fn test_other_named_events_are_ignored() {
        let input = format!(
            "event: heartbeat\ndata: {{}}\n\nevent: message\ndata: {}\n\n",
            BUCKET
        );
        assert_eq!(decode_all(&input), vec![StreamEvent::Message(BUCKET.into())]);
    }

    #[test]
    fn test_field_without_colon_has_empty_value() {
        let mut decoder = EventDecoder::new();
        assert!(decoder.feed("data: {\"instance\":").is_none());
        assert!(decoder.feed("data").is_none());
        assert!(decoder.feed("data: \"web-1\"}").is_none());
        assert_eq!(
            decoder.feed(""),
            Some(StreamEvent::Message("{\"instance\":\n\n\"web-1\"}".into()))
        );

        // A lone empty data field still dispatches, as an empty payload
        assert!(decoder.feed("data").is_none());
        assert_eq!(decoder.feed(""), Some(StreamEvent::Message(String::new())));
    }

    #[test]
    fn test_pending_event_flushed_at_eof() {
        let input = format!("data: {}", BUCKET);
        assert_eq!(decode_all(&input), vec![StreamEvent::Message(BUCKET.into())]);
    }

    #[test]
    fn test_crlf_terminators() {
        let mut decoder = EventDecoder::new();
        assert!(decoder.feed("data: {}\r\n").is_none());
        assert_eq!(decoder.feed("\r\n"), Some(StreamEvent::Message("{}".into())));
    }

    #[test]
    fn test_decode_bucket_errors_are_parse_errors() {
        let err = decode_bucket(b"not json").unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
