//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the header bar with the window overview.
///
/// Displays: status indicator, SLA bucket counts, ticket counts, and
/// the arrival-rate trend.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    if app.window.is_none() {
        let line = Line::from(vec![
            Span::styled(
                " DESKWATCH ",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("| Loading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let stats = &app.stats;

    // Overall status indicator follows the visible SLA buckets
    let (status_icon, status_style) = if stats.sla.breached > 0 {
        ("●", Style::default().fg(app.theme.critical))
    } else if stats.sla.at_risk > 0 {
        ("●", Style::default().fg(app.theme.warning))
    } else {
        ("●", Style::default().fg(app.theme.healthy))
    };

    let sparkline = render_sparkline(&app.history.totals_sparkline());
    let rate = app
        .history
        .arrival_rate()
        .map(|r| format!("{:+.1}/min", r))
        .unwrap_or_else(|| "-".to_string());

    let line = Line::from(vec![
        Span::styled(format!(" {} ", status_icon), status_style),
        Span::styled("DESKWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        if stats.sla.breached > 0 {
            Span::styled(
                format!("{}", stats.sla.breached),
                Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" breached "),
        if stats.sla.at_risk > 0 {
            Span::styled(
                format!("{}", stats.sla.at_risk),
                Style::default().fg(app.theme.warning),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" at-risk "),
        Span::styled(
            format!("{}", stats.sla.on_track),
            Style::default().fg(app.theme.healthy),
        ),
        Span::raw(" on-track │ "),
        Span::styled(
            format!("{}", stats.total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" tickets "),
        Span::raw(format!(
            "({} active, {} solved) │ ",
            stats.by_status.active(),
            stats.by_status.solved
        )),
        Span::raw(format!("{} {}", sparkline, rate)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return "        ".to_string(); // 8 spaces placeholder
    }

    // Take last 8 values
    let values: Vec<u8> = data.iter().rev().take(8).rev().copied().collect();

    values.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Tickets "),
        Line::from(" 2:SLA Risk "),
        Line::from(" 3:Changes "),
    ];

    let selected = match app.current_view {
        View::Tickets => 0,
        View::Risk => 1,
        View::Changes => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: breadcrumb trail, data source, time since last update,
/// available controls. Also displays temporary status messages and
/// errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref window) = app.window {
        let elapsed = window.last_updated.elapsed();

        // Show breadcrumb
        let breadcrumb = app.breadcrumb();

        // Context-sensitive controls
        let controls = match app.current_view {
            View::Tickets | View::Risk => {
                if app.filter_active {
                    "Type to search | Enter:apply Esc:cancel"
                } else {
                    "/:search s:sort Tab:switch Enter:detail ?:help q:quit"
                }
            }
            View::Changes => "↑↓:scroll Tab:switch ?:help q:quit",
        };

        // A degraded cycle keeps the previous window on screen; make
        // the failure visible alongside it
        let degraded = match app.load_error {
            Some(ref err) => format!(" | STALE ({})", err),
            None => String::new(),
        };

        format!(
            " {} | {} | Updated {:.1}s ago{} | {}",
            breadcrumb,
            app.source_description(),
            elapsed.as_secs_f64(),
            degraded,
            controls,
        )
    } else if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit r:retry", err)
    } else {
        " Loading... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       View ticket detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Tickets & SLA Risk",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Reload data"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 24u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
