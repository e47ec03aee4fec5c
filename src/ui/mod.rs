//! Terminal rendering using ratatui.
//!
//! Each view renders into the content area between the header/tab bars
//! and the status bar; overlays draw on top of the whole frame.

pub mod changes;
pub mod common;
pub mod detail;
pub mod risk;
pub mod summary;
pub mod theme;

pub use risk::RiskSortColumn;
pub use theme::Theme;
