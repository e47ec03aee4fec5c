//! Data source abstraction for receiving ticket batches.
//!
//! This module provides a trait-based abstraction for receiving ticket
//! data from various sources (files, network streams, in-memory channels,
//! or a live ticketing API).

mod channel;
mod file;
mod snapshot;
mod stream;

#[cfg(feature = "zendesk")]
mod zendesk;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use snapshot::{
    AppliedSla, MetricEvent, MetricEventKind, SerializedTicket, SlaPolicyRef, TicketBatch,
    TicketPriority, TicketStatus,
};
pub use stream::StreamSource;

#[cfg(feature = "zendesk")]
pub use zendesk::{ZendeskConfig, ZendeskSource};

use std::fmt::Debug;

/// Trait for receiving ticket batches from various sources.
///
/// Implementations provide one lookback window's worth of tickets per
/// poll - from file polling, network streams, channels, or a live API.
///
/// # Example
///
/// ```
/// use deskwatch::{FileSource, TicketSource};
///
/// let mut source = FileSource::new("tickets.json");
/// if let Some(batch) = source.poll() {
///     println!("Got {} tickets", batch.len());
/// }
/// ```
pub trait TicketSource: Send + Debug {
    /// Poll for the latest batch.
    ///
    /// Returns `Some(batch)` if new data is available, `None` otherwise.
    /// This method should be non-blocking; a failing source returns
    /// `None` and reports through [`TicketSource::error`].
    fn poll(&mut self) -> Option<TicketBatch>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar and log output.
    fn description(&self) -> &str;

    /// Check if the source has encountered an error.
    ///
    /// Returns the error message if an error occurred during the last poll.
    fn error(&self) -> Option<&str>;
}
