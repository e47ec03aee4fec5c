//! Historical data tracking for sparklines and rate calculations.

use std::collections::VecDeque;
use std::time::Instant;

use super::stats::Stats;

/// Maximum number of historical snapshots to keep.
const MAX_HISTORY_SIZE: usize = 60;

/// Tracks per-cycle counters over time to enable arrival-rate
/// calculations and visual trend indicators in the UI.
#[derive(Debug, Clone)]
pub struct History {
    /// Total ticket counts per cycle.
    pub totals: VecDeque<u64>,
    /// Active (new/open/pending) counts per cycle.
    pub active: VecDeque<u64>,
    /// Visible SLA breach counts per cycle.
    pub breached: VecDeque<u64>,
    /// Timestamps of cycles for rate calculations.
    pub timestamps: VecDeque<Instant>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            totals: VecDeque::new(),
            active: VecDeque::new(),
            breached: VecDeque::new(),
            timestamps: VecDeque::new(),
        }
    }

    /// Record one cycle's counters.
    pub fn record(&mut self, stats: &Stats) {
        push_capped(&mut self.totals, stats.total as u64);
        push_capped(&mut self.active, stats.by_status.active() as u64);
        push_capped(&mut self.breached, stats.sla.breached as u64);

        self.timestamps.push_back(Instant::now());
        if self.timestamps.len() > MAX_HISTORY_SIZE {
            self.timestamps.pop_front();
        }
    }

    /// Get sparkline data for total ticket volume (normalized to 0-7 for
    /// 8 bar levels).
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn totals_sparkline(&self) -> Vec<u8> {
        normalize_sparkline(&self.totals)
    }

    /// Get the ticket arrival rate (tickets per minute) between the two
    /// most recent cycles.
    ///
    /// Returns None if there's not enough history to calculate a rate.
    pub fn arrival_rate(&self) -> Option<f64> {
        if self.totals.len() < 2 || self.timestamps.len() < 2 {
            return None;
        }

        let current = *self.totals.back()?;
        let previous = *self.totals.get(self.totals.len() - 2)?;
        let delta = current as i64 - previous as i64;

        let current_time = self.timestamps.back()?;
        let previous_time = self.timestamps.get(self.timestamps.len() - 2)?;
        let elapsed = current_time.duration_since(*previous_time).as_secs_f64();

        if elapsed > 0.0 {
            Some(delta as f64 / elapsed * 60.0)
        } else {
            None
        }
    }
}

fn push_capped(values: &mut VecDeque<u64>, value: u64) {
    values.push_back(value);
    if values.len() > MAX_HISTORY_SIZE {
        values.pop_front();
    }
}

/// Normalize values to 0-7 range for sparkline display.
fn normalize_sparkline(values: &VecDeque<u64>) -> Vec<u8> {
    if values.len() < 2 {
        return Vec::new();
    }

    let max = values.iter().copied().max().unwrap_or(1).max(1);
    let min = values.iter().copied().min().unwrap_or(0);
    let range = (max - min).max(1) as f64;

    values
        .iter()
        .map(|&v| {
            let normalized = ((v - min) as f64 / range * 7.0) as u8;
            normalized.min(7)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::stats::StatusCounts;

    fn stats_with_total(total: usize) -> Stats {
        Stats {
            total,
            by_status: StatusCounts {
                new: total,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_record_caps_history() {
        let mut history = History::new();
        for i in 0..(MAX_HISTORY_SIZE + 10) {
            history.record(&stats_with_total(i));
        }
        assert_eq!(history.totals.len(), MAX_HISTORY_SIZE);
        assert_eq!(history.timestamps.len(), MAX_HISTORY_SIZE);
    }

    #[test]
    fn test_sparkline_needs_two_points() {
        let mut history = History::new();
        history.record(&stats_with_total(5));
        assert!(history.totals_sparkline().is_empty());

        history.record(&stats_with_total(10));
        let spark = history.totals_sparkline();
        assert_eq!(spark.len(), 2);
        assert_eq!(spark[0], 0);
        assert_eq!(spark[1], 7);
    }

    #[test]
    fn test_flat_history_normalizes_low() {
        let mut history = History::new();
        history.record(&stats_with_total(4));
        history.record(&stats_with_total(4));
        let spark = history.totals_sparkline();
        assert!(spark.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_arrival_rate_requires_history() {
        let mut history = History::new();
        assert!(history.arrival_rate().is_none());
        history.record(&stats_with_total(5));
        assert!(history.arrival_rate().is_none());
    }
}
