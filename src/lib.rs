// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # deskwatch
//!
//! A diagnostic TUI and library for monitoring support-ticket activity
//! against service-level commitments.
//!
//! This crate polls a ticket data source on a fixed cadence, detects
//! which tickets are new or changed state since the previous poll,
//! resolves each ticket's SLA standing from its raw metric-event
//! streams, aggregates summary statistics, and presents the result in
//! an interactive terminal UI or as structured log output.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐ │
//! │  │  app    │───▶│   poll   │───▶│   ui    │───▶│ Terminal │ │
//! │  │ (state) │    │ (engine) │    │(render) │    │          │ │
//! │  └────┬────┘    └────┬─────┘    └─────────┘    └──────────┘ │
//! │       │              │ sla resolve → diff → aggregate        │
//! │       ▼              ▼                                       │
//! │  ┌─────────┐    ┌──────────┐                                 │
//! │  │ source  │◀───│   data   │                                 │
//! │  │ (input) │    │ (models) │                                 │
//! │  └─────────┘    └──────────┘                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and user interaction logic
//! - **[`source`]**: Data source abstraction ([`TicketSource`] trait) with
//!   implementations for file polling, TCP streams, channel input, and an
//!   optional live Zendesk fetcher
//! - **[`data`]**: Data models and processing - SLA resolution, change
//!   detection between polls, aggregation, history for sparklines
//! - **[`poll`]**: The poll-loop engine ([`Poller`]) and presenter interface,
//!   shared by the TUI and the headless monitor
//! - **[`ui`]**: Terminal rendering using ratatui - ticket tables, the SLA
//!   risk view, the change feed, and theme support
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Monitor a JSON file of tickets (e.g. a captured API response)
//! deskwatch --file tickets.json
//!
//! # Monitor via TCP connection (newline-delimited JSON batches)
//! deskwatch --connect localhost:9090
//!
//! # Headless: log one structured event per cycle instead of a TUI
//! deskwatch --file tickets.json --headless
//! ```
//!
//! ### As a library with file source
//!
//! ```
//! use deskwatch::{App, FileSource, Poller, Thresholds};
//!
//! let source = Box::new(FileSource::new("tickets.json"));
//! let app = App::new(Poller::new(source, Thresholds::default()));
//! ```
//!
//! ### As a library with channel source (for embedding)
//!
//! ```
//! use deskwatch::{App, ChannelSource, Poller, Thresholds};
//!
//! // Create a channel for pushing ticket batches
//! let (tx, source) = ChannelSource::create("acme.zendesk.com");
//!
//! // Create the app
//! let app = App::new(Poller::new(Box::new(source), Thresholds::default()));
//! ```
//!
//! ### Driving the engine headless
//!
//! ```
//! use deskwatch::{ChannelSource, Poller, Thresholds};
//!
//! let (tx, source) = ChannelSource::create("example");
//! let mut poller = Poller::new(Box::new(source), Thresholds::default());
//!
//! // One cycle: fetch → resolve SLA → diff → aggregate
//! if let Some(report) = poller.cycle() {
//!     println!("{} tickets, {} new", report.stats.total, report.delta.new_tickets.len());
//! }
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod export;
pub mod poll;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use data::{
    DeltaRecord, History, MetricType, SlaEvaluation, SlaStatus, SnapshotStore, Stats,
    Thresholds, TicketRecord, WindowData,
};
pub use poll::{CycleReport, LogPresenter, Poller, Presenter};
pub use source::{
    ChannelSource, FileSource, MetricEvent, MetricEventKind, SerializedTicket, StreamSource,
    TicketBatch, TicketPriority, TicketSource, TicketStatus,
};

#[cfg(feature = "zendesk")]
pub use source::{ZendeskConfig, ZendeskSource};
