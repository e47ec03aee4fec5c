//! JSON export of the current monitor state.
//!
//! Produces the cross-boundary evaluation shape: string-typed metric
//! type, status, and policy title plus numeric target/remaining seconds,
//! so a consumer on the other side of the wire can classify without
//! re-deriving any SLA rules.

use anyhow::Result;
use serde_json::json;

use crate::data::{DeltaRecord, Stats, TicketRecord, WindowData};

/// Render the full export document as pretty-printed JSON.
pub fn render(window: &WindowData, delta: &DeltaRecord, stats: &Stats) -> Result<String> {
    let mut export = serde_json::Map::new();

    // Summary
    let mut summary = serde_json::Map::new();
    summary.insert("total".to_string(), json!(stats.total));
    summary.insert("active".to_string(), json!(stats.by_status.active()));
    summary.insert(
        "by_status".to_string(),
        json!({
            "new": stats.by_status.new,
            "open": stats.by_status.open,
            "pending": stats.by_status.pending,
            "hold": stats.by_status.hold,
            "solved": stats.by_status.solved,
            "closed": stats.by_status.closed,
        }),
    );
    summary.insert(
        "by_priority".to_string(),
        json!({
            "low": stats.by_priority.low,
            "normal": stats.by_priority.normal,
            "high": stats.by_priority.high,
            "urgent": stats.by_priority.urgent,
        }),
    );
    summary.insert("unassigned".to_string(), json!(stats.unassigned));
    summary.insert("resolution_rate".to_string(), json!(stats.resolution_rate()));
    summary.insert(
        "sla".to_string(),
        json!({
            "breached": stats.sla.breached,
            "at_risk": stats.sla.at_risk,
            "on_track": stats.sla.on_track,
        }),
    );
    export.insert("summary".to_string(), serde_json::Value::Object(summary));

    // Per-assignee workload
    let assignees: Vec<serde_json::Value> = stats
        .by_assignee
        .iter()
        .map(|(id, a)| {
            json!({
                "assignee_id": id,
                "total": a.total,
                "urgent": a.urgent,
                "open": a.open,
            })
        })
        .collect();
    export.insert("by_assignee".to_string(), serde_json::Value::Array(assignees));

    // Tickets with the interchange evaluation shape
    let tickets: Vec<serde_json::Value> = window.tickets.iter().map(ticket_json).collect();
    export.insert("tickets".to_string(), serde_json::Value::Array(tickets));

    // Changes since the previous poll
    export.insert(
        "changes".to_string(),
        json!({
            "new_tickets": delta.new_tickets,
            "status_changes": delta.status_changes.iter().map(|c| {
                json!({ "id": c.id, "old": c.old.as_str(), "new": c.new.as_str() })
            }).collect::<Vec<_>>(),
            "priority_changes": delta.priority_changes.iter().map(|c| {
                json!({ "id": c.id, "old": c.old.as_str(), "new": c.new.as_str() })
            }).collect::<Vec<_>>(),
        }),
    );

    Ok(serde_json::to_string_pretty(&serde_json::Value::Object(
        export,
    ))?)
}

fn ticket_json(ticket: &TicketRecord) -> serde_json::Value {
    let sla = ticket.sla.as_ref().map(|eval| {
        json!({
            "metric_type": eval.metric_type.stream_key(),
            "status": ticket.sla_status.as_str(),
            "policy_title": eval.policy_title,
            "target_seconds": eval.target_seconds,
            "remaining_seconds": ticket.sla_remaining,
            "business_hours": eval.business_hours,
            "fulfilled": eval.fulfilled,
            "breached": eval.breached,
        })
    });

    json!({
        "id": ticket.id,
        "subject": ticket.subject(),
        "status": ticket.status.as_str(),
        "priority": ticket.priority.as_str(),
        "created_at": ticket.created_at,
        "assignee_id": ticket.assignee_id,
        "tags": ticket.tags,
        "sla": sla,
    })
}
