//! Channel-based data source.
//!
//! Receives deliveries over a tokio mpsc channel, for embedding the pipeline
//! in a process that already has the data in hand.

use tokio::sync::mpsc;

use super::{DataSource, Delivery, IngestMode};
use crate::error::SourceError;

/// Capacity of the channel created by [`ChannelSource::create`].
const CHANNEL_CAPACITY: usize = 64;

/// A data source that receives deliveries via a channel.
///
/// Unlike a watch channel, every delivery sent is handed out exactly once,
/// in send order.
///
/// # Example
///
/// ```
/// use routewatch::{ChannelSource, IngestMode};
///
/// let (tx, source) = ChannelSource::create(IngestMode::Realtime, "in-process");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<Delivery>,
    mode: IngestMode,
    description: String,
    disconnected: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of an mpsc channel
    /// * `mode` - The ingestion mode the sender feeds
    /// * `source_description` - Where deliveries come from
    pub fn new(receiver: mpsc::Receiver<Delivery>, mode: IngestMode, source_description: &str) -> Self {
        Self {
            receiver,
            mode,
            description: format!("channel: {}", source_description),
            disconnected: false,
        }
    }

    /// Create a channel pair for sending deliveries to a ChannelSource.
    pub fn create(mode: IngestMode, source_description: &str) -> (mpsc::Sender<Delivery>, Self) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        (tx, Self::new(rx, mode, source_description))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Delivery> {
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
        self.mode
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<SourceError> {
        // Transport errors belong to whoever owns the sender
        None
    }

    fn is_exhausted(&self) -> bool {
        self.disconnected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InstanceBucket;

    #[test]
    fn test_channel_source_poll_in_order() {
        let (tx, mut source) = ChannelSource::create(IngestMode::Realtime, "test");

        assert!(source.poll().is_none());

        tx.try_send(Delivery::Event(InstanceBucket::new("a"))).unwrap();
        tx.try_send(Delivery::Event(InstanceBucket::new("b"))).unwrap();

        let names: Vec<String> = std::iter::from_fn(|| source.poll())
            .map(|d| match d {
                Delivery::Event(bucket) => bucket.instance,
                Delivery::Batch(_) => panic!("unexpected batch"),
            })
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(source.description(), "channel: test");
    }

    #[test]
    fn test_channel_source_exhausted_after_sender_dropped() {
        let (tx, mut source) = ChannelSource::create(IngestMode::Bulk, "test");
        tx.try_send(Delivery::Batch(Vec::new())).unwrap();
        drop(tx);

        assert!(source.poll().is_some());
        assert!(!source.is_exhausted());
        assert!(source.poll().is_none());
        assert!(source.is_exhausted());
        assert_eq!(source.mode(), IngestMode::Bulk);
    }
}
