//! Data models and processing for ticket batches.
//!
//! This module handles the transformation of raw ticket batches into
//! SLA-annotated records, change detection between polls, and summary
//! aggregation.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "6h", "30m")
//! - [`delta`]: Snapshot store and change detection between consecutive polls
//! - [`history`]: Historical tracking for sparklines and rate calculations
//! - [`sla`]: SLA metric resolution and classification
//! - [`stats`]: Batch aggregation into summary counters
//! - [`ticket`]: Core data models ([`WindowData`], [`TicketRecord`])
//!
//! ## Data Flow
//!
//! ```text
//! TicketBatch (raw JSON)
//!        │
//!        ▼
//! WindowData::from_batch()      (sla::resolve per ticket)
//!        │
//!        ├──▶ SnapshotStore::diff() ──▶ DeltaRecord
//!        │
//!        ├──▶ Stats::aggregate()
//!        │
//!        └──▶ History::record() (for sparklines)
//! ```

pub mod delta;
pub mod duration;
pub mod history;
pub mod sla;
pub mod stats;
pub mod ticket;

pub use delta::{DeltaRecord, PriorityChange, SnapshotStore, StatusChange};
pub use history::History;
pub use sla::{MetricType, SlaEvaluation, SlaStatus, Thresholds};
pub use stats::{AssigneeStats, SlaBuckets, Stats};
pub use ticket::{TicketRecord, WindowData};
