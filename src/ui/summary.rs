//! Tickets view rendering.
//!
//! Displays a table of all tickets in the window with priority, status,
//! assignee, age, and SLA standing.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_seconds;
use crate::data::{SlaStatus, TicketRecord};

/// Column to sort by in the Tickets view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Sort by ticket id (ids grow over time, so descending means
    /// newest first).
    #[default]
    Id,
    /// Sort by subject alphabetically.
    Subject,
    /// Sort by priority.
    Priority,
    /// Sort by workflow status.
    Status,
    /// Sort by creation time.
    Age,
    /// Sort by SLA severity.
    Sla,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Id => SortColumn::Subject,
            SortColumn::Subject => SortColumn::Priority,
            SortColumn::Priority => SortColumn::Status,
            SortColumn::Status => SortColumn::Age,
            SortColumn::Age => SortColumn::Sla,
            SortColumn::Sla => SortColumn::Id,
        }
    }
}

/// Render the Tickets view showing the whole window in a sortable table.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref window) = app.window else {
        return;
    };

    // Get filtered and sorted ticket indices
    let mut tickets: Vec<(usize, &TicketRecord)> = window
        .tickets
        .iter()
        .enumerate()
        .filter(|(_, t)| app.matches_filter(t))
        .collect();
    sort_tickets_by(&mut tickets, app.sort_column, app.sort_ascending);

    let header = Row::new(vec![
        Cell::from(format_header("ID", SortColumn::Id, app)),
        Cell::from(format_header("Subject", SortColumn::Subject, app)),
        Cell::from(format_header("Priority", SortColumn::Priority, app)),
        Cell::from(format_header("Status", SortColumn::Status, app)),
        Cell::from(format_header("Assignee", SortColumn::Id, app)), // No assignee sort
        Cell::from(format_header("Age", SortColumn::Age, app)),
        Cell::from(format_header("SLA", SortColumn::Sla, app)),
    ])
    .height(1)
    .style(app.theme.header);

    let fetched_at = window.fetched_at;
    let rows: Vec<Row> = tickets
        .iter()
        .map(|(_, t)| {
            let priority_style = app.theme.priority_style(t.priority);
            let sla_style = app.theme.sla_style(t.sla_status);

            let assignee = t
                .assignee_id
                .map(|id| format!("#{}", id))
                .unwrap_or_else(|| "-".to_string());

            let age = t
                .age_seconds(fetched_at)
                .map(format_seconds)
                .unwrap_or_else(|| "-".to_string());

            let sla_badge = sla_badge(t);

            Row::new(vec![
                Cell::from(t.id.to_string()),
                Cell::from(t.subject().to_string()),
                Cell::from(t.priority.as_str()).style(priority_style),
                Cell::from(t.status.as_str()),
                Cell::from(assignee).style(if t.assignee_id.is_none() {
                    Style::default().add_modifier(Modifier::DIM)
                } else {
                    Style::default()
                }),
                Cell::from(age),
                Cell::from(sla_badge).style(sla_style),
            ])
        })
        .collect();

    // Use Fill to distribute space evenly while respecting minimum widths
    let widths = [
        Constraint::Length(8),  // ID
        Constraint::Fill(3),    // Subject - gets the largest share
        Constraint::Length(9),  // Priority
        Constraint::Length(8),  // Status
        Constraint::Length(9),  // Assignee
        Constraint::Length(8),  // Age
        Constraint::Min(12),    // SLA badge + remaining
    ];

    // selected_ticket_index is treated as visual index directly;
    // clamp it to valid range
    let selected_visual_index = app.selected_ticket_index.min(tickets.len().saturating_sub(1));

    let sort_indicator = match app.sort_column {
        SortColumn::Id => "id",
        SortColumn::Subject => "subject",
        SortColumn::Priority => "priority",
        SortColumn::Status => "status",
        SortColumn::Age => "age",
        SortColumn::Sla => "sla",
    };
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    // Build title with filter info
    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    // Show scroll position if there are items
    let position_info = if !tickets.is_empty() {
        format!(" [{}/{}]", selected_visual_index + 1, tickets.len())
    } else {
        String::new()
    };

    let title = format!(
        " Tickets ({}/{}) [s:sort {}{}]{}{} ",
        tickets.len(),
        window.tickets.len(),
        sort_indicator,
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected_visual_index));

    frame.render_stateful_widget(table, area, &mut state);
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// SLA cell contents: symbol plus remaining time where it means something.
fn sla_badge(ticket: &TicketRecord) -> String {
    match ticket.sla_remaining {
        Some(remaining)
            if !matches!(ticket.sla_status, SlaStatus::None | SlaStatus::Met) =>
        {
            format!("{} {}", ticket.sla_status.symbol(), format_seconds(remaining))
        }
        _ => ticket.sla_status.symbol().to_string(),
    }
}

/// Sort tickets by the given column and direction (public for use in app.rs)
pub fn sort_tickets_by(
    tickets: &mut [(usize, &TicketRecord)],
    column: SortColumn,
    ascending: bool,
) {
    tickets.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Id => a.1.id.cmp(&b.1.id),
            SortColumn::Subject => a.1.subject().to_lowercase().cmp(&b.1.subject().to_lowercase()),
            SortColumn::Priority => a.1.priority.cmp(&b.1.priority),
            SortColumn::Status => a.1.status.cmp(&b.1.status),
            // Missing timestamps sort oldest
            SortColumn::Age => a.1.created_at.cmp(&b.1.created_at),
            SortColumn::Sla => a.1.sla_status.cmp(&b.1.sla_status),
        };

        // Apply direction to primary comparison
        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        // Use secondary sort by id for stability when primary values are equal
        if primary == std::cmp::Ordering::Equal {
            a.1.id.cmp(&b.1.id)
        } else {
            primary
        }
    });
}
