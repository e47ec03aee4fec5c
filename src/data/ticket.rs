//! Ticket batch processing and SLA annotation.
//!
//! This module transforms raw ticket batches into processed records with
//! their SLA standing resolved, ready for diffing, aggregation, and
//! display.

use std::time::Instant;

use chrono::{DateTime, Utc};

use super::sla::{self, SlaEvaluation, SlaStatus, Thresholds};
use crate::source::{SerializedTicket, TicketBatch, TicketPriority, TicketStatus};

/// A ticket with its SLA standing resolved.
///
/// The `id` is stable across polls; every other field is whatever the
/// source reported this cycle.
#[derive(Debug, Clone)]
pub struct TicketRecord {
    pub id: u64,
    pub subject: Option<String>,
    pub status: TicketStatus,
    /// Canonical: an absent priority has already been defaulted to normal.
    pub priority: TicketPriority,
    pub created_at: Option<DateTime<Utc>>,
    pub assignee_id: Option<u64>,
    pub requester_id: Option<u64>,
    pub tags: Vec<String>,
    pub sla: Option<SlaEvaluation>,
    pub sla_status: SlaStatus,
    /// Seconds until the SLA target is blown; negative once overdue.
    pub sla_remaining: Option<i64>,
}

impl TicketRecord {
    fn from_serialized(raw: SerializedTicket, now: DateTime<Utc>, thresholds: &Thresholds) -> Self {
        let outcome = sla::resolve(
            &raw.metric_events,
            raw.status,
            raw.created_at,
            now,
            thresholds,
        );

        Self {
            id: raw.id,
            subject: raw.subject,
            status: raw.status,
            priority: raw.priority.unwrap_or_default(),
            created_at: raw.created_at,
            assignee_id: raw.assignee_id,
            requester_id: raw.requester_id,
            tags: raw.tags,
            sla: outcome.evaluation,
            sla_status: outcome.status,
            sla_remaining: outcome.remaining_seconds,
        }
    }

    /// Subject with a placeholder for tickets that never got one.
    pub fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or("(no subject)")
    }

    /// Wall-clock age in seconds, if the creation time is known.
    pub fn age_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.created_at.map(|created| (now - created).num_seconds())
    }
}

/// The processed contents of one poll's lookback window.
#[derive(Debug, Clone)]
pub struct WindowData {
    /// Tickets in batch insertion order (newest-created-first from the
    /// source's sort).
    pub tickets: Vec<TicketRecord>,
    pub last_updated: Instant,
    pub fetched_at: DateTime<Utc>,
}

impl WindowData {
    /// Process a raw batch: default priorities, resolve SLA standing.
    ///
    /// This is the single conversion point used by every data source and
    /// both consumers (TUI and headless monitor).
    pub fn from_batch(batch: TicketBatch, thresholds: &Thresholds, now: DateTime<Utc>) -> Self {
        let tickets = batch
            .into_iter()
            .map(|raw| TicketRecord::from_serialized(raw, now, thresholds))
            .collect();

        Self {
            tickets,
            last_updated: Instant::now(),
            fetched_at: now,
        }
    }

    /// An empty window, used for degraded cycles.
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            tickets: Vec::new(),
            last_updated: Instant::now(),
            fetched_at: now,
        }
    }

    pub fn get(&self, id: u64) -> Option<&TicketRecord> {
        self.tickets.iter().find(|t| t.id == id)
    }

    /// Non-terminal tickets whose SLA standing warrants attention,
    /// most severe first.
    pub fn alerting_tickets(&self) -> Vec<&TicketRecord> {
        let mut result: Vec<&TicketRecord> = self
            .tickets
            .iter()
            .filter(|t| !t.status.is_terminal() && t.sla_status.is_alerting())
            .collect();

        result.sort_by(|a, b| b.sla_status.cmp(&a.sla_status));
        result
    }

    /// Active urgent tickets, for the attention list.
    pub fn active_urgent(&self) -> Vec<&TicketRecord> {
        self.tickets
            .iter()
            .filter(|t| t.priority == TicketPriority::Urgent && !t.status.is_terminal())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{AppliedSla, MetricEvent, MetricEventKind};
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2024-03-01T12:00:00Z".parse().unwrap()
    }

    fn raw_ticket(id: u64, status: TicketStatus) -> SerializedTicket {
        SerializedTicket {
            id,
            subject: None,
            status,
            priority: None,
            created_at: Some(now() - Duration::hours(1)),
            assignee_id: None,
            requester_id: None,
            tags: Vec::new(),
            metric_events: Default::default(),
        }
    }

    #[test]
    fn test_from_batch_preserves_order_and_defaults() {
        let batch = vec![
            raw_ticket(3, TicketStatus::New),
            raw_ticket(1, TicketStatus::Open),
            raw_ticket(2, TicketStatus::Solved),
        ];

        let window = WindowData::from_batch(batch, &Thresholds::default(), now());
        let ids: Vec<u64> = window.tickets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        // Absent priority is canonically normal
        assert!(window.tickets.iter().all(|t| t.priority == TicketPriority::Normal));
        // No streams: SLA resolves to none, not an error
        assert!(window.tickets.iter().all(|t| t.sla_status == SlaStatus::None));
        assert_eq!(window.tickets[0].subject(), "(no subject)");
    }

    #[test]
    fn test_from_batch_attaches_sla() {
        let mut raw = raw_ticket(9, TicketStatus::Open);
        raw.created_at = Some(now() - Duration::hours(10));
        raw.metric_events.insert(
            "resolution_time".to_string(),
            vec![MetricEvent {
                kind: MetricEventKind::ApplySla,
                time: None,
                sla: Some(AppliedSla {
                    target_in_seconds: Some(21600),
                    target: None,
                    business_hours: true,
                    policy: None,
                }),
            }],
        );

        let window = WindowData::from_batch(vec![raw], &Thresholds::default(), now());
        let ticket = &window.tickets[0];
        assert_eq!(ticket.sla_status, SlaStatus::Breached);
        assert_eq!(ticket.sla.as_ref().unwrap().target_seconds, 21600);
        assert_eq!(ticket.sla_remaining, Some(21600 - 36000));
    }

    #[test]
    fn test_alerting_tickets_skips_terminal_and_sorts() {
        let apply = |target: i64| MetricEvent {
            kind: MetricEventKind::ApplySla,
            time: None,
            sla: Some(AppliedSla {
                target_in_seconds: Some(target),
                target: None,
                business_hours: false,
                policy: None,
            }),
        };

        // at risk: 5h into a 6h target
        let mut at_risk = raw_ticket(1, TicketStatus::Open);
        at_risk.created_at = Some(now() - Duration::hours(5));
        at_risk
            .metric_events
            .insert("resolution_time".to_string(), vec![apply(21600)]);

        // breached: 10h into a 6h target
        let mut breached = raw_ticket(2, TicketStatus::Open);
        breached.created_at = Some(now() - Duration::hours(10));
        breached
            .metric_events
            .insert("resolution_time".to_string(), vec![apply(21600)]);

        // terminal breach: excluded from the attention list
        let mut solved = raw_ticket(3, TicketStatus::Solved);
        solved.metric_events.insert(
            "resolution_time".to_string(),
            vec![
                apply(21600),
                MetricEvent {
                    kind: MetricEventKind::Breach,
                    time: None,
                    sla: None,
                },
            ],
        );

        let window =
            WindowData::from_batch(vec![at_risk, breached, solved], &Thresholds::default(), now());
        let alerting = window.alerting_tickets();
        let ids: Vec<u64> = alerting.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_empty_window() {
        let window = WindowData::empty(now());
        assert!(window.tickets.is_empty());
        assert!(window.alerting_tickets().is_empty());
    }
}
