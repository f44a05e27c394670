//! Stream-based data source.
//!
//! Receives real-time events from an async byte stream. This is the mode
//! used for TCP connections or any server pushing newline-delimited JSON or
//! Server-Sent Events.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{DataSource, Delivery, IngestMode};
use crate::error::SourceError;
use crate::events::{decode_bucket, EventDecoder, StreamEvent};

/// Capacity of the channel between the reader task and `poll()`.
const CHANNEL_CAPACITY: usize = 16;

type ErrorSlot = Arc<Mutex<Option<SourceError>>>;

/// A data source that receives instance-bucket events from an async stream.
///
/// A background task reads and decodes the stream and forwards each bucket
/// through a bounded channel; `poll()` hands them out one at a time in
/// arrival order. Dropping the source drops the receiver, which stops the
/// task at its next send.
///
/// # Example with a byte stream
///
/// ```
/// use std::io::Cursor;
/// use routewatch::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"{\"instance\":\"web-1\"}\n";
/// let stream = Cursor::new(data.to_vec());
/// let source = StreamSource::spawn(stream, "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<Delivery>,
    description: String,
    last_error: ErrorSlot,
    disconnected: bool,
}

impl StreamSource {
    /// Spawn a background task that reads events from the given async reader.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let last_error: ErrorSlot = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();
        let desc = description.to_string();

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut decoder = EventDecoder::new();
            let mut buf = Vec::new();

            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => {
                        if let Some(event) = decoder.finish() {
                            let _ = forward(event, &tx, &error_handle).await;
                        }
                        info!(source = %desc, "Stream closed");
                        *error_handle.lock() = Some(SourceError::Closed);
                        break;
                    }
                    Ok(_) => {
                        let line = match std::str::from_utf8(&buf) {
                            Ok(line) => line,
                            Err(e) => {
                                warn!(source = %desc, error = %e, "Skipping line that is not valid UTF-8");
                                *error_handle.lock() = Some(SourceError::Parse(e.to_string()));
                                continue;
                            }
                        };
                        if let Some(event) = decoder.feed(line) {
                            if forward(event, &tx, &error_handle).await.is_err() {
                                // Receiver dropped
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        warn!(source = %desc, error = %e, "Stream read failed");
                        *error_handle.lock() = Some(SourceError::Read(e.to_string()));
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            last_error,
            disconnected: false,
        }
    }

    /// Create a StreamSource from a channel of already-framed payloads.
    ///
    /// Each message is one JSON instance bucket. This is useful when another
    /// transport (a message bus, an HTTP client) does its own framing.
    pub fn from_bytes_channel(mut rx: mpsc::Receiver<Vec<u8>>, description: &str) -> Self {
        let (tx, delivery_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let last_error: ErrorSlot = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();

        tokio::spawn(async move {
            while let Some(bytes) = rx.recv().await {
                match decode_bucket(&bytes) {
                    Ok(bucket) => {
                        *error_handle.lock() = None;
                        if tx.send(Delivery::Event(bucket)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Skipping malformed event");
                        *error_handle.lock() = Some(e);
                    }
                }
            }
        });

        Self {
            receiver: delivery_rx,
            description: format!("stream: {}", description),
            last_error,
            disconnected: false,
        }
    }
}

/// Handle one decoded event. Errs only when the receiver is gone.
async fn forward(
    event: StreamEvent,
    tx: &mpsc::Sender<Delivery>,
    error_handle: &ErrorSlot,
) -> Result<(), ()> {
    match event {
        StreamEvent::Message(payload) => match decode_bucket(payload.as_bytes()) {
            Ok(bucket) => {
                debug!(instance = %bucket.instance, "Received event");
                *error_handle.lock() = None;
                tx.send(Delivery::Event(bucket)).await.map_err(|_| ())
            }
            Err(e) => {
                warn!(error = %e, "Skipping malformed event");
                *error_handle.lock() = Some(e);
                Ok(())
            }
        },
        StreamEvent::Error(message) => {
            warn!(error = %message, "Stream reported a transport error");
            *error_handle.lock() = Some(SourceError::Transport(message));
            Ok(())
        }
    }
}

impl DataSource for StreamSource {
    fn poll(&mut self) -> Option<Delivery> {
        // Try to receive without blocking
        match self.receiver.try_recv() {
            Ok(delivery) => Some(delivery),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.disconnected = true;
                None
            }
        }
    }

    fn mode(&self) -> IngestMode {
        IngestMode::Realtime
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<SourceError> {
        self.last_error.lock().clone()
    }

    fn is_exhausted(&self) -> bool {
        self.disconnected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_json() -> &'static str {
        r#"{"instance":"web-1","routers":[{"url":"GET /","totalResponseTime":30,"200":3}],"cloudApi":[]}"#
    }

    fn instance_of(delivery: Option<Delivery>) -> String {
        match delivery {
            Some(Delivery::Event(bucket)) => bucket.instance,
            other => panic!("expected an event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stream_source_spawn() {
        let data = format!("{}\n", sample_json());
        let cursor = Cursor::new(data);

        let mut source = StreamSource::spawn(cursor, "test");

        // Give the background task time to process
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(instance_of(source.poll()), "web-1");
        assert_eq!(source.mode(), IngestMode::Realtime);
    }

    #[tokio::test]
    async fn test_stream_source_sse_and_ndjson_mix() {
        let data = format!(": hello\ndata: {}\n\n{}\n", sample_json(), sample_json());
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(instance_of(source.poll()), "web-1");
        assert_eq!(instance_of(source.poll()), "web-1");
        assert!(source.poll().is_none());
    }

    #[tokio::test]
    async fn test_stream_source_closes_at_eof() {
        let mut source = StreamSource::spawn(Cursor::new(""), "test");

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert!(source.poll().is_none());
        assert!(source.is_exhausted());
        assert_eq!(source.error(), Some(SourceError::Closed));
    }

    #[tokio::test]
    async fn test_stream_source_description() {
        let source = StreamSource::spawn(Cursor::new(""), "tcp://localhost:9090");
        assert_eq!(source.description(), "stream: tcp://localhost:9090");
    }

    #[tokio::test]
    async fn test_stream_source_skips_invalid_json() {
        let data = format!("not valid json\n{}\n", sample_json());
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        // The bad line is skipped, the good one still arrives
        assert_eq!(instance_of(source.poll()), "web-1");
        assert!(source.poll().is_none());
    }

    #[tokio::test]
    async fn test_stream_source_skips_invalid_utf8_line() {
        let mut data = b"{\"instance\":\"bad\xff\"}\n".to_vec();
        data.extend_from_slice(format!("{}\n", sample_json()).as_bytes());
        let (client, mut server) = tokio::io::duplex(1024);
        let mut source = StreamSource::spawn(client, "test");

        tokio::io::AsyncWriteExt::write_all(&mut server, &data).await.unwrap();
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        // The stream survives the bad line and the next event arrives
        assert_eq!(instance_of(source.poll()), "web-1");
        assert!(source.poll().is_none());
        assert!(!source.is_exhausted());
    }

    #[tokio::test]
    async fn test_stream_source_records_invalid_utf8_as_parse_error() {
        let (client, mut server) = tokio::io::duplex(1024);
        let source = StreamSource::spawn(client, "test");

        tokio::io::AsyncWriteExt::write_all(&mut server, b"\xff\xfe\n").await.unwrap();
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert!(matches!(source.error(), Some(SourceError::Parse(_))));
    }

    #[tokio::test]
    async fn test_stream_source_error_event_is_not_fatal() {
        let data = format!("event: error\ndata: upstream reset\n\n{}\n", sample_json());
        let (client, mut server) = tokio::io::duplex(1024);
        let mut source = StreamSource::spawn(client, "test");

        tokio::io::AsyncWriteExt::write_all(&mut server, data.as_bytes()).await.unwrap();
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        // The event after the error still arrives; the stream stays open
        assert_eq!(instance_of(source.poll()), "web-1");
        assert!(!source.is_exhausted());

        tokio::io::AsyncWriteExt::write_all(&mut server, b"event: error\ndata: again\n\n").await.unwrap();
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        assert_eq!(source.error(), Some(SourceError::Transport("again".into())));
    }

    #[tokio::test]
    async fn test_stream_source_from_bytes_channel() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(16);
        let mut source = StreamSource::from_bytes_channel(rx, "test-channel");

        tx.send(b"garbage".to_vec()).await.unwrap();
        tx.send(sample_json().as_bytes().to_vec()).await.unwrap();

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(instance_of(source.poll()), "web-1");

        drop(tx);
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        assert!(source.poll().is_none());
        assert!(source.is_exhausted());
    }
}
