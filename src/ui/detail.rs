//! Detail overlay rendering.
//!
//! Displays a modal overlay with detailed information about a selected
//! ticket, including its full SLA evaluation.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_seconds;
use crate::data::SlaStatus;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the ticket detail as a modal overlay.
///
/// Shows the ticket's fields, tags, and the resolved SLA evaluation
/// with its policy, target, and remaining time.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(ref window) = app.window else {
        return;
    };

    // Get the actual ticket from the visual index
    let Some(raw_index) = app.get_selected_ticket_raw_index() else {
        return;
    };
    let Some(ticket) = window.tickets.get(raw_index) else {
        return;
    };

    // Calculate overlay size - use most of the screen
    // Width: 95% of screen, clamped to [MIN_OVERLAY_WIDTH, 100]
    let overlay_width = (area.width * 95 / 100).clamp(MIN_OVERLAY_WIDTH, 100);
    // Height: 90% of screen, clamped to [MIN_OVERLAY_HEIGHT, 40]
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 40);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    // Split overlay into header, SLA, and footer sections
    let chunks = Layout::vertical([
        Constraint::Length(8), // Header with ticket fields
        Constraint::Min(6),    // SLA evaluation
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    // ===== HEADER SECTION =====
    let priority_style = app.theme.priority_style(ticket.priority);

    let created = ticket
        .created_at
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let age = ticket
        .age_seconds(window.fetched_at)
        .map(format_seconds)
        .unwrap_or_else(|| "-".to_string());

    let assignee = ticket
        .assignee_id
        .map(|id| format!("agent #{}", id))
        .unwrap_or_else(|| "unassigned".to_string());
    let requester = ticket
        .requester_id
        .map(|id| format!("#{}", id))
        .unwrap_or_else(|| "-".to_string());

    let tags = if ticket.tags.is_empty() {
        "-".to_string()
    } else {
        ticket.tags.join(", ")
    };

    let header_lines = vec![
        Line::from(vec![Span::styled(
            format!(" [{}] {} ", ticket.id, ticket.subject()),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Status: "),
            Span::styled(
                ticket.status.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("    Priority: "),
            Span::styled(ticket.priority.as_str(), priority_style.add_modifier(Modifier::BOLD)),
            Span::raw("    Assignee: "),
            Span::raw(assignee),
            Span::raw("    Requester: "),
            Span::raw(requester),
        ]),
        Line::from(vec![
            Span::raw(" Created: "),
            Span::raw(created),
            Span::raw("    Age: "),
            Span::raw(age),
        ]),
        Line::from(vec![
            Span::raw(" Tags: "),
            Span::styled(tags, Style::default().add_modifier(Modifier::DIM)),
        ]),
    ];

    let header_block = Block::default()
        .title(" Ticket Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let header = Paragraph::new(header_lines).block(header_block);
    frame.render_widget(header, chunks[0]);

    // ===== SLA SECTION =====
    let sla_block = Block::default()
        .title(" SLA ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let sla_lines = match ticket.sla {
        Some(ref eval) => {
            let status_style = app.theme.sla_style(ticket.sla_status);
            let remaining = match ticket.sla_remaining {
                Some(r) if r >= 0 => format!("{} left", format_seconds(r)),
                Some(r) => format!("{} overdue", format_seconds(-r)),
                None => "-".to_string(),
            };
            let measured = if eval.business_hours {
                "business hours"
            } else {
                "calendar hours"
            };
            let flags = match (eval.fulfilled, eval.breached) {
                (true, true) => "fulfilled after breach",
                (true, false) => "fulfilled",
                (false, true) => "breach recorded",
                (false, false) => "in progress",
            };

            vec![
                Line::from(""),
                Line::from(vec![
                    Span::raw(" Standing: "),
                    Span::styled(
                        format!("{} {}", ticket.sla_status.symbol(), ticket.sla_status),
                        status_style.add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("    "),
                    Span::raw(remaining),
                ]),
                Line::from(vec![
                    Span::raw(" Policy: "),
                    Span::styled(
                        eval.policy_title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!("  ({} metric)", eval.metric_type.label())),
                ]),
                Line::from(vec![
                    Span::raw(" Target: "),
                    Span::raw(format_seconds(eval.target_seconds)),
                    Span::raw(format!(", measured in {}", measured)),
                ]),
                Line::from(vec![
                    Span::raw(" Events: "),
                    Span::styled(flags, Style::default().add_modifier(Modifier::DIM)),
                ]),
            ]
        }
        None => vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                if ticket.sla_status == SlaStatus::None {
                    "  No SLA policy applies to this ticket."
                } else {
                    "  No evaluation available."
                },
                Style::default().add_modifier(Modifier::DIM),
            )]),
        ],
    };

    let sla = Paragraph::new(sla_lines).block(sla_block);
    frame.render_widget(sla, chunks[1]);

    // ===== FOOTER =====
    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " Press Esc to close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[2]);
}
