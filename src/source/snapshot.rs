//! Shared types for ticket batches.
//!
//! These types match the serialization format produced by the ticket data
//! source (a Zendesk-style ticketing API, or anything that speaks the same
//! JSON). They serve as the common data format between the fetcher and
//! this monitor consumer.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One poll's worth of tickets, newest-created-first as supplied by the
/// data source's sort order.
pub type TicketBatch = Vec<SerializedTicket>;

/// Lifecycle state of a ticket, ordered by workflow progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    New,
    Open,
    Pending,
    Hold,
    Solved,
    Closed,
}

impl TicketStatus {
    /// Terminal states never re-enter the active workflow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Solved | TicketStatus::Closed)
    }

    /// States that count as "open" for assignee workload purposes.
    pub fn is_workable(&self) -> bool {
        matches!(
            self,
            TicketStatus::New | TicketStatus::Open | TicketStatus::Pending
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::Open => "open",
            TicketStatus::Pending => "pending",
            TicketStatus::Hold => "hold",
            TicketStatus::Solved => "solved",
            TicketStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket priority. Tickets arriving without a priority are treated as
/// [`TicketPriority::Normal`] everywhere (classification, deltas, stats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl TicketPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Normal => "normal",
            TicketPriority::High => "high",
            TicketPriority::Urgent => "urgent",
        }
    }
}

impl Default for TicketPriority {
    fn default() -> Self {
        TicketPriority::Normal
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ticket as the data source serializes it.
///
/// `metric_events` carries the raw per-metric-type SLA event streams,
/// keyed by metric type name (`"resolution_time"`, `"reply_time"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedTicket {
    /// Stable identifier, unique within a ticketing instance.
    pub id: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    pub status: TicketStatus,

    /// Absent means the requester never set one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,

    /// Immutable once set. Absent on malformed records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Agent the ticket is assigned to; absent means unassigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Raw SLA metric event streams, keyed by metric type.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metric_events: BTreeMap<String, Vec<MetricEvent>>,
}

/// One event in an SLA metric stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricEvent {
    #[serde(rename = "type")]
    pub kind: MetricEventKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    /// Present on `apply_sla` events: the matched policy and its target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla: Option<AppliedSla>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricEventKind {
    ApplySla,
    Fulfill,
    Breach,
}

/// The SLA policy attachment on an `apply_sla` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedSla {
    /// Commitment duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_in_seconds: Option<i64>,

    /// Older payloads carry the target in minutes instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<i64>,

    #[serde(default)]
    pub business_hours: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<SlaPolicyRef>,
}

/// Display reference for a matched SLA policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaPolicyRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_batch() {
        let json = r#"[
            {
                "id": 101,
                "subject": "Cannot log in",
                "status": "open",
                "priority": "urgent",
                "created_at": "2024-03-01T09:00:00Z",
                "assignee_id": 7,
                "tags": ["login", "auth"],
                "metric_events": {
                    "resolution_time": [
                        {
                            "type": "apply_sla",
                            "time": "2024-03-01T09:00:05Z",
                            "sla": {
                                "target_in_seconds": 21600,
                                "business_hours": true,
                                "policy": { "title": "Premier", "id": 5 }
                            }
                        },
                        { "type": "breach", "time": "2024-03-01T15:00:05Z" }
                    ]
                }
            },
            { "id": 102, "status": "new" }
        ]"#;

        let batch: TicketBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.len(), 2);

        let first = &batch[0];
        assert_eq!(first.id, 101);
        assert_eq!(first.status, TicketStatus::Open);
        assert_eq!(first.priority, Some(TicketPriority::Urgent));
        assert_eq!(first.assignee_id, Some(7));
        assert_eq!(first.tags, vec!["login", "auth"]);

        let events = first.metric_events.get("resolution_time").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, MetricEventKind::ApplySla);
        let sla = events[0].sla.as_ref().unwrap();
        assert_eq!(sla.target_in_seconds, Some(21600));
        assert!(sla.business_hours);
        assert_eq!(sla.policy.as_ref().unwrap().title.as_deref(), Some("Premier"));
        assert_eq!(events[1].kind, MetricEventKind::Breach);

        // Sparse record: everything optional is absent
        let second = &batch[1];
        assert_eq!(second.status, TicketStatus::New);
        assert!(second.priority.is_none());
        assert!(second.created_at.is_none());
        assert!(second.metric_events.is_empty());
    }

    #[test]
    fn test_status_classes() {
        assert!(TicketStatus::Solved.is_terminal());
        assert!(TicketStatus::Closed.is_terminal());
        assert!(!TicketStatus::Hold.is_terminal());
        assert!(TicketStatus::Pending.is_workable());
        assert!(!TicketStatus::Hold.is_workable());
        assert!(!TicketStatus::Closed.is_workable());
    }

    #[test]
    fn test_priority_default_and_order() {
        assert_eq!(TicketPriority::default(), TicketPriority::Normal);
        assert!(TicketPriority::Urgent > TicketPriority::High);
        assert!(TicketPriority::High > TicketPriority::Normal);
    }
}
