//! SLA risk view rendering.
//!
//! Tickets whose resolution commitment needs attention, breached first.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_seconds;
use crate::data::{SlaStatus, TicketRecord, WindowData};

/// Column to sort risk rows by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RiskSortColumn {
    #[default]
    Status,
    Id,
    Priority,
    Remaining,
    Policy,
}

impl RiskSortColumn {
    pub fn next(self) -> Self {
        match self {
            Self::Status => Self::Id,
            Self::Id => Self::Priority,
            Self::Priority => Self::Remaining,
            Self::Remaining => Self::Policy,
            Self::Policy => Self::Status,
        }
    }
}

/// The filtered, sorted risk list for the current app state.
///
/// Shared with `App::get_selected_ticket_raw_index` so the rendered
/// rows and the selection math always agree.
pub fn sorted_risks<'a>(app: &App, window: &'a WindowData) -> Vec<&'a TicketRecord> {
    let mut risks: Vec<&TicketRecord> = window
        .alerting_tickets()
        .into_iter()
        .filter(|t| app.matches_filter(t))
        .collect();

    sort_risks(&mut risks, app.risk_sort_column, app.risk_sort_ascending);
    risks
}

/// Render the risk view as a table (like the Tickets view)
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref window) = app.window else {
        return;
    };

    let risks = sorted_risks(app, window);

    if risks.is_empty() && window.alerting_tickets().is_empty() {
        render_on_track_message(frame, app, area);
        return;
    }

    // Count by severity
    let breached_count = risks.iter().filter(|t| t.sla_status == SlaStatus::Breached).count();
    let at_risk_count = risks.iter().filter(|t| t.sla_status == SlaStatus::AtRisk).count();

    // Build header row with sort indicators
    let header = Row::new(vec![
        Cell::from(format_header("Status", RiskSortColumn::Status, app)),
        Cell::from(format_header("ID", RiskSortColumn::Id, app)),
        Cell::from(format_header("Priority", RiskSortColumn::Priority, app)),
        Cell::from("Subject"),
        Cell::from(format_header("Policy", RiskSortColumn::Policy, app)),
        Cell::from(format_header("Remaining", RiskSortColumn::Remaining, app)),
    ])
    .height(1)
    .style(app.theme.header);

    // Build data rows
    let rows: Vec<Row> = risks
        .iter()
        .map(|t| {
            let status_style = app.theme.sla_style(t.sla_status);

            let remaining = t
                .sla_remaining
                .map(format_seconds)
                .unwrap_or_else(|| "-".to_string());

            let policy = t
                .sla
                .as_ref()
                .map(|e| e.policy_title.clone())
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(t.sla_status.symbol()).style(status_style),
                Cell::from(t.id.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(t.priority.as_str()).style(app.theme.priority_style(t.priority)),
                Cell::from(t.subject().to_string()),
                Cell::from(policy).style(Style::default().add_modifier(Modifier::DIM)),
                Cell::from(remaining).style(status_style),
            ])
        })
        .collect();

    // Use Fill constraints like the Tickets view for even distribution
    let widths = [
        Constraint::Length(7),  // Status - fixed
        Constraint::Length(8),  // ID - fixed
        Constraint::Length(9),  // Priority - fixed
        Constraint::Fill(3),    // Subject - 3x share (usually longer)
        Constraint::Fill(2),    // Policy - 2x share
        Constraint::Length(10), // Remaining - fixed
    ];

    // Build title
    let sort_indicator = match app.risk_sort_column {
        RiskSortColumn::Status => "status",
        RiskSortColumn::Id => "id",
        RiskSortColumn::Priority => "priority",
        RiskSortColumn::Remaining => "remaining",
        RiskSortColumn::Policy => "policy",
    };
    let sort_dir = if app.risk_sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !risks.is_empty() {
        format!(" [{}/{}]", app.selected_risk_index + 1, risks.len())
    } else {
        String::new()
    };

    let title = format!(
        " SLA Risk ({} breached, {} at risk) [s:sort {}{}]{}{} ",
        breached_count, at_risk_count, sort_indicator, sort_dir, filter_info, position_info
    );

    let border_color = if breached_count > 0 {
        app.theme.critical
    } else if at_risk_count > 0 {
        app.theme.warning
    } else {
        app.theme.border
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(border_color)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(
        app.selected_risk_index.min(risks.len().saturating_sub(1)),
    ));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_on_track_message(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" SLA Risk ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.healthy));

    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(vec![
            Span::styled("    ✓ ", Style::default().fg(app.theme.healthy)),
            Span::styled(
                "All commitments on track!",
                Style::default().fg(app.theme.healthy).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "      No open tickets are breaching or at risk.",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn format_header(name: &str, col: RiskSortColumn, app: &App) -> Span<'static> {
    if app.risk_sort_column == col {
        let arrow = if app.risk_sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

fn sort_risks(items: &mut [&TicketRecord], column: RiskSortColumn, ascending: bool) {
    items.sort_by(|a, b| {
        let primary = match column {
            RiskSortColumn::Status => a.sla_status.cmp(&b.sla_status),
            RiskSortColumn::Id => a.id.cmp(&b.id),
            RiskSortColumn::Priority => a.priority.cmp(&b.priority),
            RiskSortColumn::Remaining => {
                let a_remaining = a.sla_remaining.unwrap_or(i64::MAX);
                let b_remaining = b.sla_remaining.unwrap_or(i64::MAX);
                a_remaining.cmp(&b_remaining)
            }
            RiskSortColumn::Policy => {
                let a_policy = a.sla.as_ref().map(|e| e.policy_title.as_str()).unwrap_or("");
                let b_policy = b.sla.as_ref().map(|e| e.policy_title.as_str()).unwrap_or("");
                a_policy.to_lowercase().cmp(&b_policy.to_lowercase())
            }
        };

        // Apply direction to primary comparison
        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        // Use secondary sort by id for stability
        if primary == std::cmp::Ordering::Equal {
            a.id.cmp(&b.id)
        } else {
            primary
        }
    });
}
