//! Changes view rendering.
//!
//! Shows the delta from the most recent poll: tickets that appeared in
//! the window, and status/priority transitions.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::WindowData;

/// Render the changes view as a single table, new tickets first.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref window) = app.window else {
        return;
    };

    if app.delta.is_empty() {
        render_quiet_message(frame, app, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Kind"),
        Cell::from("ID"),
        Cell::from("Subject"),
        Cell::from("Change"),
    ])
    .height(1)
    .style(app.theme.header);

    let mut rows: Vec<Row> = Vec::with_capacity(app.delta.total());

    for id in &app.delta.new_tickets {
        let (subject, priority_style, priority) = match window.get(*id) {
            Some(t) => (
                t.subject().to_string(),
                app.theme.priority_style(t.priority),
                t.priority.as_str(),
            ),
            None => ("?".to_string(), Style::default(), "-"),
        };
        rows.push(Row::new(vec![
            Cell::from("NEW").style(Style::default().fg(app.theme.highlight)),
            Cell::from(id.to_string()),
            Cell::from(subject),
            Cell::from(priority).style(priority_style),
        ]));
    }

    for change in &app.delta.status_changes {
        let subject = subject_of(window, change.id);
        rows.push(Row::new(vec![
            Cell::from("STATUS").style(Style::default().fg(app.theme.warning)),
            Cell::from(change.id.to_string()),
            Cell::from(subject),
            Cell::from(format!("{} → {}", change.old, change.new)),
        ]));
    }

    for change in &app.delta.priority_changes {
        let subject = subject_of(window, change.id);
        rows.push(Row::new(vec![
            Cell::from("PRIORITY").style(Style::default().fg(app.theme.warning)),
            Cell::from(change.id.to_string()),
            Cell::from(subject),
            Cell::from(format!("{} → {}", change.old, change.new)),
        ]));
    }

    let widths = [
        Constraint::Length(10), // Kind
        Constraint::Length(8),  // ID
        Constraint::Fill(3),    // Subject
        Constraint::Fill(1),    // Change
    ];

    let title = format!(
        " Changes ({} new, {} status, {} priority) ",
        app.delta.new_tickets.len(),
        app.delta.status_changes.len(),
        app.delta.priority_changes.len()
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
    state.select(Some(
        app.selected_risk_index.min(app.delta.total().saturating_sub(1)),
    ));

    frame.render_stateful_widget(table, area, &mut state);
}

fn subject_of(window: &WindowData, id: u64) -> String {
    window
        .get(id)
        .map(|t| t.subject().to_string())
        .unwrap_or_else(|| "?".to_string())
}

fn render_quiet_message(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Changes ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(vec![Span::styled(
            "    Nothing changed since the previous poll.",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
