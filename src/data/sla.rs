//! SLA metric resolution and classification.
//!
//! This module turns a ticket's raw metric-event streams into a single
//! evaluated commitment and a display status. It is the one place SLA
//! rules live; the TUI, the headless monitor, and the aggregator all
//! consume its output rather than re-deriving anything.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::source::{MetricEvent, MetricEventKind, TicketStatus};

/// Which metric stream produced an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    ResolutionTime,
    ReplyTime,
}

impl MetricType {
    /// Key used by the data source's event stream map.
    pub fn stream_key(&self) -> &'static str {
        match self {
            MetricType::ResolutionTime => "resolution_time",
            MetricType::ReplyTime => "reply_time",
        }
    }

    /// Short label for display ("Resolution" / "Reply").
    pub fn label(&self) -> &'static str {
        match self {
            MetricType::ResolutionTime => "Resolution",
            MetricType::ReplyTime => "Reply",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stream_key())
    }
}

/// Resolution commitments are authoritative once they exist; reply-time
/// commitments are a secondary signal used mainly while a ticket is open.
const METRIC_PRECEDENCE: [MetricType; 2] = [MetricType::ResolutionTime, MetricType::ReplyTime];

/// Tunable classification thresholds.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Fraction of the target that may remain before a ticket is flagged
    /// as at risk (0.25 means "a quarter of the window left").
    pub at_risk_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { at_risk_ratio: 0.25 }
    }
}

/// One resolved SLA commitment for a ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct SlaEvaluation {
    pub metric_type: MetricType,
    /// Commitment duration in seconds.
    pub target_seconds: i64,
    /// Whether the target is measured in business hours rather than
    /// calendar time. Aging of in-flight tickets is computed in raw
    /// wall-clock either way; the flag is surfaced for display.
    pub business_hours: bool,
    /// A `fulfill` event was observed on the stream.
    pub fulfilled: bool,
    /// A `breach` event was observed on the stream. Both flags can be
    /// true when fulfillment happened after the breach.
    pub breached: bool,
    /// Display label for the matched policy.
    pub policy_title: String,
}

/// Display status for a ticket's SLA standing, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SlaStatus {
    /// No evaluation could be resolved (no streams, no apply_sla event,
    /// or age unknowable for an in-flight ticket).
    None,
    /// Terminal ticket, commitment honored.
    Met,
    OnTrack,
    /// A reply-time commitment was blown. Informational, never alerting:
    /// reply-time breaches are not commitment failures in this domain.
    LateReply,
    AtRisk,
    Breached,
}

impl SlaStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            SlaStatus::None => "-",
            SlaStatus::Met => "MET",
            SlaStatus::OnTrack => "OK",
            SlaStatus::LateReply => "LATE",
            SlaStatus::AtRisk => "RISK",
            SlaStatus::Breached => "BREACH",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SlaStatus::None => "none",
            SlaStatus::Met => "met",
            SlaStatus::OnTrack => "on_track",
            SlaStatus::LateReply => "late_reply",
            SlaStatus::AtRisk => "at_risk",
            SlaStatus::Breached => "breached",
        }
    }

    /// Whether this status should surface as an alert.
    pub fn is_alerting(&self) -> bool {
        matches!(self, SlaStatus::AtRisk | SlaStatus::Breached)
    }
}

impl fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolver's full answer for one ticket.
#[derive(Debug, Clone)]
pub struct SlaOutcome {
    pub evaluation: Option<SlaEvaluation>,
    pub status: SlaStatus,
    /// Seconds until the target is blown, for in-flight tickets with a
    /// computable age. Negative once overdue.
    pub remaining_seconds: Option<i64>,
}

impl SlaOutcome {
    fn none() -> Self {
        Self {
            evaluation: None,
            status: SlaStatus::None,
            remaining_seconds: None,
        }
    }
}

/// Resolve a ticket's SLA standing from its raw metric-event streams.
///
/// Metric types are tried in fixed precedence order; the first stream
/// carrying an `apply_sla` event wins. A stream without one yields
/// nothing, and a ticket with no usable stream resolves to
/// [`SlaStatus::None`] — a valid, displayable state, not an error.
pub fn resolve(
    streams: &BTreeMap<String, Vec<MetricEvent>>,
    status: TicketStatus,
    created_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    thresholds: &Thresholds,
) -> SlaOutcome {
    for metric_type in METRIC_PRECEDENCE {
        let Some(events) = streams.get(metric_type.stream_key()) else {
            continue;
        };
        let Some(evaluation) = evaluate_stream(metric_type, events) else {
            continue;
        };

        let (sla_status, remaining) = classify(&evaluation, status, created_at, now, thresholds);
        return SlaOutcome {
            evaluation: Some(evaluation),
            status: sla_status,
            remaining_seconds: remaining,
        };
    }

    SlaOutcome::none()
}

/// Extract an evaluation from one metric stream.
///
/// Returns None when the stream carries no `apply_sla` event — the
/// caller then falls through to the next metric type.
fn evaluate_stream(metric_type: MetricType, events: &[MetricEvent]) -> Option<SlaEvaluation> {
    // First apply_sla event that actually carries a policy payload
    let applied = events
        .iter()
        .find_map(|e| match e.kind {
            MetricEventKind::ApplySla => e.sla.as_ref(),
            _ => None,
        })?;

    // Seconds-based target preferred; older payloads carry minutes.
    let target_seconds = applied
        .target_in_seconds
        .or_else(|| applied.target.map(|minutes| minutes * 60))
        .unwrap_or(0);

    let policy_title = applied
        .policy
        .as_ref()
        .and_then(|p| p.title.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    let fulfilled = events.iter().any(|e| e.kind == MetricEventKind::Fulfill);
    let breached = events.iter().any(|e| e.kind == MetricEventKind::Breach);

    Some(SlaEvaluation {
        metric_type,
        target_seconds,
        business_hours: applied.business_hours,
        fulfilled,
        breached,
        policy_title,
    })
}

/// Classify an evaluation into a display status.
fn classify(
    evaluation: &SlaEvaluation,
    status: TicketStatus,
    created_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    thresholds: &Thresholds,
) -> (SlaStatus, Option<i64>) {
    // Terminal states never need time-remaining math.
    if status.is_terminal() {
        let sla_status = if evaluation.breached {
            downgrade(SlaStatus::Breached, evaluation.metric_type)
        } else {
            SlaStatus::Met
        };
        return (sla_status, None);
    }

    // A recorded breach event is authoritative regardless of the clock.
    if evaluation.breached {
        let remaining = remaining_seconds(evaluation, created_at, now);
        return (
            downgrade(SlaStatus::Breached, evaluation.metric_type),
            remaining,
        );
    }

    // Zero or negative target: already blown, and no division below.
    if evaluation.target_seconds <= 0 {
        return (downgrade(SlaStatus::Breached, evaluation.metric_type), None);
    }

    // Age is unknowable without a creation timestamp.
    let Some(created_at) = created_at else {
        return (SlaStatus::None, None);
    };

    let age = (now - created_at).num_seconds();
    let remaining = evaluation.target_seconds - age;

    let sla_status = if remaining <= 0 {
        downgrade(SlaStatus::Breached, evaluation.metric_type)
    } else if remaining as f64 / evaluation.target_seconds as f64 <= thresholds.at_risk_ratio {
        SlaStatus::AtRisk
    } else {
        SlaStatus::OnTrack
    };

    (sla_status, Some(remaining))
}

/// A breach derived from a reply-time stream is informational, not a
/// commitment failure. Enforced here so every consumer agrees.
fn downgrade(status: SlaStatus, metric_type: MetricType) -> SlaStatus {
    if status == SlaStatus::Breached && metric_type == MetricType::ReplyTime {
        SlaStatus::LateReply
    } else {
        status
    }
}

fn remaining_seconds(
    evaluation: &SlaEvaluation,
    created_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<i64> {
    let created_at = created_at?;
    Some(evaluation.target_seconds - (now - created_at).num_seconds())
}
