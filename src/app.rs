//! Application state and navigation logic.

use anyhow::Result;

use crate::data::{DeltaRecord, History, Stats, TicketRecord, WindowData};
use crate::poll::Poller;
use crate::ui::summary::SortColumn;
use crate::ui::RiskSortColumn;
use crate::ui::Theme;

/// The current view/tab in the TUI.
///
/// Ticket detail is shown as an overlay (controlled by
/// `App::show_detail_overlay`) rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Overview of all tickets in the window with SLA badges.
    Tickets,
    /// Tickets whose SLA standing needs attention.
    Risk,
    /// What changed since the previous poll.
    Changes,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Tickets => View::Risk,
            View::Risk => View::Changes,
            View::Changes => View::Tickets,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Tickets => View::Changes,
            View::Risk => View::Tickets,
            View::Changes => View::Risk,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Tickets => "Tickets",
            View::Risk => "SLA Risk",
            View::Changes => "Changes",
        }
    }
}

/// Saved state for returning to a previous view.
#[derive(Debug, Clone)]
pub struct ViewState {
    /// The view that was active.
    pub view: View,
    /// The selected ticket index in that view.
    pub selected_ticket_index: usize,
    /// The selected row index (for the Risk view).
    pub selected_risk_index: usize,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Engine
    poller: Poller,
    pub window: Option<WindowData>,
    pub delta: DeltaRecord,
    pub stats: Stats,
    pub history: History,
    pub load_error: Option<String>,

    // Navigation state
    pub selected_ticket_index: usize,
    pub selected_risk_index: usize,
    pub view_stack: Vec<ViewState>,

    // Sorting (Tickets view)
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // Sorting (Risk view)
    pub risk_sort_column: RiskSortColumn,
    pub risk_sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, std::time::Instant)>,
}

impl App {
    /// Create a new App around a poller.
    pub fn new(poller: Poller) -> Self {
        Self {
            running: true,
            current_view: View::Tickets,
            show_help: false,
            show_detail_overlay: false,
            poller,
            window: None,
            delta: DeltaRecord::default(),
            stats: Stats::default(),
            history: History::new(),
            load_error: None,
            selected_ticket_index: 0,
            selected_risk_index: 0,
            view_stack: Vec::new(),
            sort_column: SortColumn::default(),
            sort_ascending: false, // Default descending (newest ids first)
            risk_sort_column: RiskSortColumn::default(),
            risk_sort_ascending: false, // Default descending (breached first)
            filter_text: String::new(),
            filter_active: false,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.poller.source_description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, std::time::Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Push current state to stack and navigate to a new view.
    #[allow(dead_code)]
    pub fn push_view(&mut self, view: View) {
        self.view_stack.push(ViewState {
            view: self.current_view,
            selected_ticket_index: self.selected_ticket_index,
            selected_risk_index: self.selected_risk_index,
        });
        self.current_view = view;
        self.selected_risk_index = 0;
    }

    /// Pop the view stack and restore previous state.
    pub fn pop_view(&mut self) -> bool {
        if let Some(state) = self.view_stack.pop() {
            self.current_view = state.view;
            self.selected_ticket_index = state.selected_ticket_index;
            self.selected_risk_index = state.selected_risk_index;
            true
        } else {
            false
        }
    }

    /// Get breadcrumb trail for current navigation.
    pub fn breadcrumb(&self) -> String {
        let mut parts: Vec<&str> = self.view_stack.iter().map(|s| s.view.label()).collect();
        parts.push(self.current_view.label());
        parts.join(" > ")
    }

    /// Run one engine cycle and absorb its report.
    ///
    /// Returns Ok(true) if a fresh window was received, Ok(false) if no
    /// new data arrived or the cycle degraded (the previous window stays
    /// on screen, with the error surfaced in the status bar).
    pub fn reload_data(&mut self) -> Result<bool> {
        let Some(report) = self.poller.cycle() else {
            return Ok(false);
        };

        if let Some(error) = report.error {
            self.load_error = Some(error);
            return Ok(false);
        }

        self.history.record(&report.stats);
        self.window = Some(report.window);
        self.delta = report.delta;
        self.stats = report.stats;
        self.load_error = None;

        // Clamp selection indices
        if let Some(ref window) = self.window {
            if self.selected_ticket_index >= window.tickets.len() {
                self.selected_ticket_index = window.tickets.len().saturating_sub(1);
            }
        }
        Ok(true)
    }

    /// Switch to the next view (cycles through Tickets → Risk → Changes).
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
        self.selected_risk_index = 0;
    }

    /// Switch to the previous view (cycles through Changes → Risk → Tickets).
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
        self.selected_risk_index = 0;
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.selected_risk_index = 0;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        match self.current_view {
            View::Tickets => {
                // Navigate by visual position in filtered/sorted list
                if let Some(ref window) = self.window {
                    let filtered_count = self.filtered_ticket_count(window);
                    let max = filtered_count.saturating_sub(1);
                    self.selected_ticket_index = (self.selected_ticket_index + n).min(max);
                }
            }
            View::Risk => {
                if let Some(ref window) = self.window {
                    let count = self.filtered_risk_count(window);
                    let max = count.saturating_sub(1);
                    self.selected_risk_index = (self.selected_risk_index + n).min(max);
                }
            }
            View::Changes => {
                let max = self.delta.total().saturating_sub(1);
                self.selected_risk_index = (self.selected_risk_index + n).min(max);
            }
        }
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        match self.current_view {
            View::Tickets => {
                self.selected_ticket_index = self.selected_ticket_index.saturating_sub(n);
            }
            View::Risk | View::Changes => {
                self.selected_risk_index = self.selected_risk_index.saturating_sub(n);
            }
        }
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        match self.current_view {
            View::Tickets => self.selected_ticket_index = 0,
            View::Risk | View::Changes => self.selected_risk_index = 0,
        }
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        match self.current_view {
            View::Tickets => {
                if let Some(ref window) = self.window {
                    let filtered_count = self.filtered_ticket_count(window);
                    self.selected_ticket_index = filtered_count.saturating_sub(1);
                }
            }
            View::Risk => {
                if let Some(ref window) = self.window {
                    let count = self.filtered_risk_count(window);
                    self.selected_risk_index = count.saturating_sub(1);
                }
            }
            View::Changes => {
                self.selected_risk_index = self.delta.total().saturating_sub(1);
            }
        }
    }

    /// Get count of tickets after applying filter.
    fn filtered_ticket_count(&self, window: &WindowData) -> usize {
        if self.filter_text.is_empty() {
            return window.tickets.len();
        }
        window.tickets.iter().filter(|t| self.matches_filter(t)).count()
    }

    /// Get the actual ticket index from the visual index (after
    /// sorting/filtering) in the Tickets view.
    ///
    /// Returns the raw index into `window.tickets` for the currently
    /// selected visual row. Needed because the Tickets view applies
    /// sorting and filtering, so the visual row index differs from the
    /// underlying data index.
    pub fn get_selected_ticket_raw_index(&self) -> Option<usize> {
        let window = self.window.as_ref()?;

        match self.current_view {
            View::Tickets => {
                // Build sorted/filtered list and look up raw index
                let mut tickets: Vec<(usize, &TicketRecord)> = window
                    .tickets
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| self.matches_filter(t))
                    .collect();
                crate::ui::summary::sort_tickets_by(
                    &mut tickets,
                    self.sort_column,
                    self.sort_ascending,
                );

                tickets.get(self.selected_ticket_index).map(|(idx, _)| *idx)
            }
            View::Risk => {
                // Resolve through the sorted/filtered risk list
                let risks = crate::ui::risk::sorted_risks(self, window);
                risks
                    .get(self.selected_risk_index)
                    .and_then(|t| window.tickets.iter().position(|w| w.id == t.id))
            }
            View::Changes => None,
        }
    }

    /// Open the detail overlay for the currently selected ticket.
    pub fn enter_detail(&mut self) {
        if self.current_view == View::Tickets || self.current_view == View::Risk {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then pop view stack, then go
    /// to the Tickets view.
    pub fn go_back(&mut self) {
        // First close any overlays
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
            return;
        }
        // Then try to pop the view stack
        if !self.pop_view() {
            // If stack is empty, go to the overview
            if self.current_view != View::Tickets {
                self.current_view = View::Tickets;
            }
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column for the current view.
    pub fn cycle_sort(&mut self) {
        match self.current_view {
            View::Tickets => self.sort_column = self.sort_column.next(),
            View::Risk => self.risk_sort_column = self.risk_sort_column.next(),
            _ => {}
        }
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        match self.current_view {
            View::Tickets => self.sort_ascending = !self.sort_ascending,
            View::Risk => self.risk_sort_ascending = !self.risk_sort_ascending,
            _ => {}
        }
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if a ticket matches the current filter (subject, tags, or id).
    pub fn matches_filter(&self, ticket: &TicketRecord) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        let search = self.filter_text.to_lowercase();
        ticket.subject().to_lowercase().contains(&search)
            || ticket.id.to_string().contains(&search)
            || ticket.tags.iter().any(|t| t.to_lowercase().contains(&search))
    }

    /// Get count of risk rows after applying filter.
    fn filtered_risk_count(&self, window: &WindowData) -> usize {
        window
            .alerting_tickets()
            .iter()
            .filter(|t| self.matches_filter(t))
            .count()
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &std::path::Path) -> anyhow::Result<()> {
        use std::io::Write;

        let Some(ref window) = self.window else {
            anyhow::bail!("No data to export");
        };

        let json = crate::export::render(window, &self.delta, &self.stats)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}
