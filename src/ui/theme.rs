//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::SlaStatus;
use crate::source::TicketPriority;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for at-risk SLA standing and high priorities.
    pub warning: Color,
    /// Color for breached SLA standing and urgent priorities.
    pub critical: Color,
    /// Color for on-track/met SLA standing.
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for an SLA status
    pub fn sla_style(&self, status: SlaStatus) -> Style {
        match status {
            SlaStatus::Breached => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
            SlaStatus::AtRisk => Style::default().fg(self.warning),
            SlaStatus::OnTrack => Style::default().fg(self.healthy),
            SlaStatus::Met => Style::default().fg(self.healthy).add_modifier(Modifier::DIM),
            SlaStatus::LateReply | SlaStatus::None => {
                Style::default().add_modifier(Modifier::DIM)
            }
        }
    }

    /// Get style for a ticket priority
    pub fn priority_style(&self, priority: TicketPriority) -> Style {
        match priority {
            TicketPriority::Urgent => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
            TicketPriority::High => Style::default().fg(self.warning),
            TicketPriority::Normal => Style::default(),
            TicketPriority::Low => Style::default().add_modifier(Modifier::DIM),
        }
    }
}
