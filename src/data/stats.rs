//! Batch aggregation into summary counters.
//!
//! A pure fold over one processed window: counts by status, priority,
//! assignee, and SLA bucket, computed in a single pass with no state
//! carried between cycles.

use std::collections::HashMap;

use super::sla::{MetricType, SlaStatus};
use super::ticket::TicketRecord;
use crate::source::{TicketPriority, TicketStatus};

/// Ticket counts per lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub new: usize,
    pub open: usize,
    pub pending: usize,
    pub hold: usize,
    pub solved: usize,
    pub closed: usize,
}

impl StatusCounts {
    fn bump(&mut self, status: TicketStatus) {
        match status {
            TicketStatus::New => self.new += 1,
            TicketStatus::Open => self.open += 1,
            TicketStatus::Pending => self.pending += 1,
            TicketStatus::Hold => self.hold += 1,
            TicketStatus::Solved => self.solved += 1,
            TicketStatus::Closed => self.closed += 1,
        }
    }

    /// Tickets still in the active workflow (new + open + pending).
    pub fn active(&self) -> usize {
        self.new + self.open + self.pending
    }
}

/// Ticket counts per priority (after canonical defaulting).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriorityCounts {
    pub low: usize,
    pub normal: usize,
    pub high: usize,
    pub urgent: usize,
}

impl PriorityCounts {
    fn bump(&mut self, priority: TicketPriority) {
        match priority {
            TicketPriority::Low => self.low += 1,
            TicketPriority::Normal => self.normal += 1,
            TicketPriority::High => self.high += 1,
            TicketPriority::Urgent => self.urgent += 1,
        }
    }
}

/// Per-agent workload subtotals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssigneeStats {
    pub total: usize,
    pub urgent: usize,
    /// Tickets in a workable state (new/open/pending).
    pub open: usize,
}

/// SLA bucket counts, restricted to resolution-time evaluations on
/// non-terminal tickets — the same visibility rule the resolver applies
/// per ticket, at the aggregate level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlaBuckets {
    pub breached: usize,
    pub at_risk: usize,
    pub on_track: usize,
}

/// Summary counters for one window.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub total: usize,
    pub by_status: StatusCounts,
    pub by_priority: PriorityCounts,
    pub by_assignee: HashMap<u64, AssigneeStats>,
    pub unassigned: usize,
    pub sla: SlaBuckets,
}

impl Stats {
    /// Fold a processed window into summary counters. Pure; one pass.
    pub fn aggregate(tickets: &[TicketRecord]) -> Self {
        let mut stats = Stats {
            total: tickets.len(),
            ..Default::default()
        };

        for ticket in tickets {
            stats.by_status.bump(ticket.status);
            stats.by_priority.bump(ticket.priority);

            match ticket.assignee_id {
                Some(assignee) => {
                    let entry = stats.by_assignee.entry(assignee).or_default();
                    entry.total += 1;
                    if ticket.priority == TicketPriority::Urgent {
                        entry.urgent += 1;
                    }
                    if ticket.status.is_workable() {
                        entry.open += 1;
                    }
                }
                None => stats.unassigned += 1,
            }

            // Aggregate-level mirror of the per-ticket visibility rule:
            // only resolution-time standing on non-terminal tickets.
            if !ticket.status.is_terminal()
                && ticket
                    .sla
                    .as_ref()
                    .is_some_and(|e| e.metric_type == MetricType::ResolutionTime)
            {
                match ticket.sla_status {
                    SlaStatus::Breached => stats.sla.breached += 1,
                    SlaStatus::AtRisk => stats.sla.at_risk += 1,
                    SlaStatus::OnTrack => stats.sla.on_track += 1,
                    _ => {}
                }
            }
        }

        stats
    }

    /// Percentage of the window resolved, 0 when the window is empty.
    pub fn resolution_rate(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.by_status.solved as f64 / self.total as f64) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sla::Thresholds;
    use crate::data::ticket::WindowData;
    use crate::source::{AppliedSla, MetricEvent, MetricEventKind, SerializedTicket};
    use chrono::{DateTime, Duration, Utc};

    fn now() -> DateTime<Utc> {
        "2024-03-01T12:00:00Z".parse().unwrap()
    }

    fn ticket(
        id: u64,
        status: TicketStatus,
        priority: Option<TicketPriority>,
        assignee_id: Option<u64>,
    ) -> SerializedTicket {
        SerializedTicket {
            id,
            subject: None,
            status,
            priority,
            created_at: Some(now() - Duration::hours(1)),
            assignee_id,
            requester_id: None,
            tags: Vec::new(),
            metric_events: Default::default(),
        }
    }

    fn with_resolution_sla(mut raw: SerializedTicket, target: i64, hours_old: i64) -> SerializedTicket {
        raw.created_at = Some(now() - Duration::hours(hours_old));
        raw.metric_events.insert(
            "resolution_time".to_string(),
            vec![MetricEvent {
                kind: MetricEventKind::ApplySla,
                time: None,
                sla: Some(AppliedSla {
                    target_in_seconds: Some(target),
                    target: None,
                    business_hours: false,
                    policy: None,
                }),
            }],
        );
        raw
    }

    fn aggregate(batch: Vec<SerializedTicket>) -> Stats {
        let window = WindowData::from_batch(batch, &Thresholds::default(), now());
        Stats::aggregate(&window.tickets)
    }

    #[test]
    fn test_empty_batch_is_all_zero() {
        let stats = aggregate(Vec::new());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.resolution_rate(), 0);
        assert_eq!(stats.sla, SlaBuckets::default());
        assert!(stats.by_assignee.is_empty());
    }

    #[test]
    fn test_counts_by_status_and_priority() {
        let stats = aggregate(vec![
            ticket(1, TicketStatus::New, Some(TicketPriority::Urgent), None),
            ticket(2, TicketStatus::Open, None, None),
            ticket(3, TicketStatus::Solved, Some(TicketPriority::Low), None),
            ticket(4, TicketStatus::Solved, None, None),
        ]);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_status.new, 1);
        assert_eq!(stats.by_status.open, 1);
        assert_eq!(stats.by_status.solved, 2);
        assert_eq!(stats.by_status.active(), 2);
        assert_eq!(stats.by_priority.urgent, 1);
        // Absent priorities fold into normal
        assert_eq!(stats.by_priority.normal, 2);
        assert_eq!(stats.by_priority.low, 1);
        assert_eq!(stats.resolution_rate(), 50);
    }

    #[test]
    fn test_assignee_subtotals() {
        let stats = aggregate(vec![
            ticket(1, TicketStatus::Open, Some(TicketPriority::Urgent), Some(7)),
            ticket(2, TicketStatus::Pending, None, Some(7)),
            ticket(3, TicketStatus::Closed, Some(TicketPriority::Urgent), Some(7)),
            ticket(4, TicketStatus::Open, None, Some(8)),
            ticket(5, TicketStatus::Open, None, None),
        ]);

        let seven = stats.by_assignee.get(&7).unwrap();
        assert_eq!(seven.total, 3);
        assert_eq!(seven.urgent, 2);
        // Closed ticket is not part of the open workload
        assert_eq!(seven.open, 2);

        let eight = stats.by_assignee.get(&8).unwrap();
        assert_eq!(eight.total, 1);
        assert_eq!(stats.unassigned, 1);
    }

    #[test]
    fn test_sla_buckets_resolution_time_only() {
        // breached: 10h into a 6h resolution target
        let breached = with_resolution_sla(ticket(1, TicketStatus::Open, None, None), 21600, 10);
        // on track: 1h into a 6h resolution target
        let on_track = with_resolution_sla(ticket(2, TicketStatus::Open, None, None), 21600, 1);
        // at risk: 5h into a 6h resolution target
        let at_risk = with_resolution_sla(ticket(3, TicketStatus::Open, None, None), 21600, 5);

        // reply-time breach: never counted in the buckets
        let mut late_reply = ticket(4, TicketStatus::Open, None, None);
        late_reply.metric_events.insert(
            "reply_time".to_string(),
            vec![
                MetricEvent {
                    kind: MetricEventKind::ApplySla,
                    time: None,
                    sla: Some(AppliedSla {
                        target_in_seconds: Some(60),
                        target: None,
                        business_hours: false,
                        policy: None,
                    }),
                },
                MetricEvent {
                    kind: MetricEventKind::Breach,
                    time: None,
                    sla: None,
                },
            ],
        );

        // terminal: excluded even with a resolution evaluation
        let solved = with_resolution_sla(ticket(5, TicketStatus::Solved, None, None), 21600, 10);

        let stats = aggregate(vec![breached, on_track, at_risk, late_reply, solved]);
        assert_eq!(stats.sla.breached, 1);
        assert_eq!(stats.sla.at_risk, 1);
        assert_eq!(stats.sla.on_track, 1);
    }
}
