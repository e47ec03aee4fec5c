//! Channel-based data source.
//!
//! Receives ticket batches via a tokio watch channel. This is useful
//! for embedding the monitor where batches are pushed by the host
//! application rather than polled from a file or the network.

use tokio::sync::watch;

use super::{TicketBatch, TicketSource};

/// A data source that receives ticket batches via a channel.
///
/// The producer (e.g., an embedding application's fetch task) sends
/// batches through the channel, and this source provides them to the
/// monitor.
///
/// # Example
///
/// ```
/// use deskwatch::ChannelSource;
///
/// // Create a channel pair
/// let (tx, source) = ChannelSource::create("acme.zendesk.com");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<TicketBatch>,
    description: String,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of a watch channel
    /// * `source_description` - A description of where batches come from
    ///   (e.g., "acme.zendesk.com", "export pipeline")
    pub fn new(receiver: watch::Receiver<TicketBatch>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
            initial_returned: false,
        }
    }

    /// Create a channel pair for sending batches to a ChannelSource.
    ///
    /// Returns (sender, source) where the sender can be used to push
    /// batches and the source can be handed to the monitor.
    pub fn create(source_description: &str) -> (watch::Sender<TicketBatch>, Self) {
        let (tx, rx) = watch::channel(TicketBatch::default());
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

impl TicketSource for ChannelSource {
    fn poll(&mut self) -> Option<TicketBatch> {
        // Return the initial value on first poll
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        // Check if there's a new value without blocking
        if self.receiver.has_changed().unwrap_or(false) {
            let batch = self.receiver.borrow_and_update().clone();
            Some(batch)
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        // Channel sources don't fail on their own; a producer that dies
        // simply stops sending
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SerializedTicket, TicketStatus};

    fn ticket(id: u64) -> SerializedTicket {
        SerializedTicket {
            id,
            subject: None,
            status: TicketStatus::New,
            priority: None,
            created_at: None,
            assignee_id: None,
            requester_id: None,
            tags: Vec::new(),
            metric_events: Default::default(),
        }
    }

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");

        // Initially returns the default (empty) batch
        let batch = source.poll();
        assert!(batch.is_some());
        assert!(batch.unwrap().is_empty());

        // No change, so poll returns None
        assert!(source.poll().is_none());

        // Send a new batch
        tx.send(vec![ticket(1)]).unwrap();

        // Now poll returns the new batch
        let batch = source.poll();
        assert!(batch.is_some());
        assert_eq!(batch.unwrap().len(), 1);
    }

    #[test]
    fn test_channel_source_description() {
        let (_tx, source) = ChannelSource::create("acme.zendesk.com");
        assert_eq!(source.description(), "channel: acme.zendesk.com");
    }
}
