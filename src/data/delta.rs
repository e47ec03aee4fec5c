//! Change detection between consecutive polls.
//!
//! The snapshot store keeps the previous poll's ticket-by-id view; each
//! new batch is diffed against it to surface new tickets and status or
//! priority transitions, then replaces it wholesale.

use std::collections::HashMap;

use super::ticket::WindowData;
use crate::source::{TicketPriority, TicketStatus};

/// A status transition observed between two polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub id: u64,
    pub old: TicketStatus,
    pub new: TicketStatus,
}

/// A priority transition observed between two polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityChange {
    pub id: u64,
    pub old: TicketPriority,
    pub new: TicketPriority,
}

/// What changed since the previous poll.
///
/// Built fresh each cycle, consumed by the presenter, then discarded.
/// Collections keep the current batch's insertion order; a ticket can
/// appear in both change lists in the same cycle.
#[derive(Debug, Clone, Default)]
pub struct DeltaRecord {
    /// Ids present now that were absent from the previous snapshot.
    pub new_tickets: Vec<u64>,
    pub status_changes: Vec<StatusChange>,
    pub priority_changes: Vec<PriorityChange>,
}

impl DeltaRecord {
    pub fn is_empty(&self) -> bool {
        self.new_tickets.is_empty()
            && self.status_changes.is_empty()
            && self.priority_changes.is_empty()
    }

    pub fn total(&self) -> usize {
        self.new_tickets.len() + self.status_changes.len() + self.priority_changes.len()
    }
}

/// The fields the detector compares between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PrevState {
    status: TicketStatus,
    priority: TicketPriority,
}

/// Holds the previous poll's ticket-by-id mapping for one monitored
/// source.
///
/// Each consumer polling a window must own its own store; sharing one
/// across concurrent pollers would corrupt delta results through
/// interleaved replacement.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    previous: HashMap<u64, PrevState>,
    /// False until the first diff has run.
    primed: bool,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether at least one batch has been recorded.
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Diff a processed window against the stored snapshot, then replace
    /// the snapshot with the window's contents.
    ///
    /// Ids present only in the old snapshot (aged out of the lookback
    /// window) are dropped silently; the store tracks the current window,
    /// not permanent disappearance. The first-ever diff reports every
    /// ticket as new.
    pub fn diff(&mut self, window: &WindowData) -> DeltaRecord {
        let mut delta = DeltaRecord::default();
        let mut next = HashMap::with_capacity(window.tickets.len());

        for ticket in &window.tickets {
            let current = PrevState {
                status: ticket.status,
                priority: ticket.priority,
            };

            match self.previous.get(&ticket.id) {
                None => delta.new_tickets.push(ticket.id),
                Some(prev) => {
                    if prev.status != current.status {
                        delta.status_changes.push(StatusChange {
                            id: ticket.id,
                            old: prev.status,
                            new: current.status,
                        });
                    }
                    if prev.priority != current.priority {
                        delta.priority_changes.push(PriorityChange {
                            id: ticket.id,
                            old: prev.priority,
                            new: current.priority,
                        });
                    }
                }
            }

            next.insert(ticket.id, current);
        }

        self.previous = next;
        self.primed = true;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sla::Thresholds;
    use crate::source::{SerializedTicket, TicketBatch};
    use chrono::{DateTime, Utc};

    fn now() -> DateTime<Utc> {
        "2024-03-01T12:00:00Z".parse().unwrap()
    }

    fn ticket(id: u64, status: TicketStatus, priority: Option<TicketPriority>) -> SerializedTicket {
        SerializedTicket {
            id,
            subject: None,
            status,
            priority,
            created_at: Some(now()),
            assignee_id: None,
            requester_id: None,
            tags: Vec::new(),
            metric_events: Default::default(),
        }
    }

    fn window(batch: TicketBatch) -> WindowData {
        WindowData::from_batch(batch, &Thresholds::default(), now())
    }

    #[test]
    fn test_first_cycle_reports_everything_as_new() {
        let mut store = SnapshotStore::new();
        let delta = store.diff(&window(vec![
            ticket(1, TicketStatus::Open, None),
            ticket(2, TicketStatus::New, Some(TicketPriority::High)),
        ]));

        assert_eq!(delta.new_tickets, vec![1, 2]);
        assert!(delta.status_changes.is_empty());
        assert!(delta.priority_changes.is_empty());
        assert!(store.is_primed());
    }

    #[test]
    fn test_identical_batch_twice_yields_empty_delta() {
        let mut store = SnapshotStore::new();
        let batch = vec![
            ticket(1, TicketStatus::Open, Some(TicketPriority::Urgent)),
            ticket(2, TicketStatus::Pending, None),
        ];

        let _ = store.diff(&window(batch.clone()));
        let second = store.diff(&window(batch));
        assert!(second.is_empty());
    }

    #[test]
    fn test_status_change_detected_once() {
        let mut store = SnapshotStore::new();
        let _ = store.diff(&window(vec![ticket(5, TicketStatus::Open, None)]));
        let delta = store.diff(&window(vec![ticket(5, TicketStatus::Pending, None)]));

        assert!(delta.new_tickets.is_empty());
        assert!(delta.priority_changes.is_empty());
        assert_eq!(
            delta.status_changes,
            vec![StatusChange {
                id: 5,
                old: TicketStatus::Open,
                new: TicketStatus::Pending,
            }]
        );
    }

    #[test]
    fn test_status_and_priority_change_in_same_cycle() {
        let mut store = SnapshotStore::new();
        let _ = store.diff(&window(vec![ticket(
            7,
            TicketStatus::New,
            Some(TicketPriority::Low),
        )]));
        let delta = store.diff(&window(vec![ticket(
            7,
            TicketStatus::Open,
            Some(TicketPriority::Urgent),
        )]));

        assert_eq!(delta.status_changes.len(), 1);
        assert_eq!(delta.priority_changes.len(), 1);
        assert_eq!(delta.priority_changes[0].old, TicketPriority::Low);
        assert_eq!(delta.priority_changes[0].new, TicketPriority::Urgent);
    }

    #[test]
    fn test_absent_priority_compares_as_normal() {
        // none -> explicit normal is not a transition under the
        // canonical default.
        let mut store = SnapshotStore::new();
        let _ = store.diff(&window(vec![ticket(3, TicketStatus::Open, None)]));
        let delta = store.diff(&window(vec![ticket(
            3,
            TicketStatus::Open,
            Some(TicketPriority::Normal),
        )]));
        assert!(delta.is_empty());
    }

    #[test]
    fn test_aged_out_tickets_dropped_silently() {
        let mut store = SnapshotStore::new();
        let _ = store.diff(&window(vec![
            ticket(1, TicketStatus::Open, None),
            ticket(2, TicketStatus::Open, None),
        ]));

        // Ticket 1 fell out of the lookback window
        let delta = store.diff(&window(vec![ticket(2, TicketStatus::Open, None)]));
        assert!(delta.is_empty());

        // And does not resurface as changed if it comes back changed --
        // it reads as new again
        let delta = store.diff(&window(vec![
            ticket(1, TicketStatus::Solved, None),
            ticket(2, TicketStatus::Open, None),
        ]));
        assert_eq!(delta.new_tickets, vec![1]);
        assert!(delta.status_changes.is_empty());
    }

    #[test]
    fn test_new_tickets_keep_batch_order() {
        let mut store = SnapshotStore::new();
        let delta = store.diff(&window(vec![
            ticket(30, TicketStatus::New, None),
            ticket(10, TicketStatus::New, None),
            ticket(20, TicketStatus::New, None),
        ]));
        assert_eq!(delta.new_tickets, vec![30, 10, 20]);
    }
}
