//! The poll loop engine.
//!
//! One cycle pulls a batch from the data source and runs it through the
//! fixed pipeline: resolve SLA per ticket, diff against the previous
//! snapshot, aggregate, hand the result to a presenter. Every consumer
//! (the TUI and the headless monitor) drives this same engine, so the
//! SLA precedence and visibility rules cannot drift between them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::data::duration::format_seconds;
use crate::data::{DeltaRecord, SnapshotStore, Stats, Thresholds, WindowData};
use crate::source::TicketSource;

/// Everything one cycle produced.
///
/// `error` is set on a degraded cycle: the source failed, the window is
/// empty, and the stored snapshot was left untouched so recovery does
/// not misreport every ticket as new.
#[derive(Debug)]
pub struct CycleReport {
    pub window: WindowData,
    pub delta: DeltaRecord,
    pub stats: Stats,
    pub error: Option<String>,
}

impl CycleReport {
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Receives one report per completed cycle. Rendering is entirely the
/// presenter's problem; the engine never formats output.
pub trait Presenter {
    fn present(&mut self, report: &CycleReport);
}

/// Drives the fetch → resolve → diff → aggregate pipeline for one
/// monitored source.
///
/// Each poller owns its own [`SnapshotStore`]; two consumers watching
/// the same window must each run their own poller.
#[derive(Debug)]
pub struct Poller {
    source: Box<dyn TicketSource>,
    snapshots: SnapshotStore,
    thresholds: Thresholds,
}

impl Poller {
    pub fn new(source: Box<dyn TicketSource>, thresholds: Thresholds) -> Self {
        Self {
            source,
            snapshots: SnapshotStore::new(),
            thresholds,
        }
    }

    /// Returns a description of the underlying data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Run one cycle.
    ///
    /// Returns `Some` when there is something to present: a fresh report,
    /// or a degraded one if the source is failing. Returns `None` when
    /// the source simply has no new data yet.
    pub fn cycle(&mut self) -> Option<CycleReport> {
        if let Some(batch) = self.source.poll() {
            let window = WindowData::from_batch(batch, &self.thresholds, Utc::now());
            let delta = self.snapshots.diff(&window);
            let stats = Stats::aggregate(&window.tickets);
            return Some(CycleReport {
                window,
                delta,
                stats,
                error: None,
            });
        }

        self.source.error().map(|err| CycleReport {
            window: WindowData::empty(Utc::now()),
            delta: DeltaRecord::default(),
            stats: Stats::default(),
            error: Some(err.to_string()),
        })
    }

    /// Run cycles on a fixed cadence until the stop flag is raised.
    ///
    /// Cancellation is cooperative: the flag is consulted between
    /// cycles (and while sleeping), never mid-cycle. A failed cycle
    /// degrades to an empty batch and is never retried early.
    pub fn run(&mut self, presenter: &mut dyn Presenter, interval: Duration, stop: &AtomicBool) {
        const SLEEP_SLICE: Duration = Duration::from_millis(200);

        while !stop.load(Ordering::Relaxed) {
            if let Some(report) = self.cycle() {
                presenter.present(&report);
            }

            // Sleep in slices so a stop request does not wait out a long
            // refresh interval
            let mut remaining = interval;
            while !remaining.is_zero() && !stop.load(Ordering::Relaxed) {
                let slice = remaining.min(SLEEP_SLICE);
                std::thread::sleep(slice);
                remaining = remaining.saturating_sub(slice);
            }
        }
    }
}

/// Headless presenter: one structured log line per noteworthy fact.
///
/// This is the terminal-monitor rendition of the dashboard; it leans on
/// `tracing` so output composes with whatever subscriber the binary
/// installed.
#[derive(Debug)]
pub struct LogPresenter {
    /// Number of items per delta category to spell out individually.
    pub detail_limit: usize,
}

impl Default for LogPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl LogPresenter {
    pub fn new() -> Self {
        Self { detail_limit: 5 }
    }
}

impl Presenter for LogPresenter {
    fn present(&mut self, report: &CycleReport) {
        if let Some(ref error) = report.error {
            warn!(%error, "cycle degraded to empty batch");
            return;
        }

        let stats = &report.stats;
        info!(
            total = stats.total,
            active = stats.by_status.active(),
            solved = stats.by_status.solved,
            urgent = stats.by_priority.urgent,
            unassigned = stats.unassigned,
            resolution_rate = stats.resolution_rate(),
            "window"
        );

        if stats.sla.breached > 0 || stats.sla.at_risk > 0 {
            warn!(
                breached = stats.sla.breached,
                at_risk = stats.sla.at_risk,
                on_track = stats.sla.on_track,
                "resolution SLA"
            );
        }

        for id in report.delta.new_tickets.iter().take(self.detail_limit) {
            if let Some(ticket) = report.window.get(*id) {
                info!(
                    id,
                    priority = %ticket.priority,
                    subject = ticket.subject(),
                    "new ticket"
                );
            }
        }
        for change in report.delta.status_changes.iter().take(self.detail_limit) {
            info!(
                id = change.id,
                old = %change.old,
                new = %change.new,
                "status change"
            );
        }
        for change in report.delta.priority_changes.iter().take(self.detail_limit) {
            info!(
                id = change.id,
                old = %change.old,
                new = %change.new,
                "priority change"
            );
        }

        for ticket in report.window.alerting_tickets() {
            warn!(
                id = ticket.id,
                status = %ticket.sla_status,
                policy = ticket.sla.as_ref().map(|e| e.policy_title.as_str()).unwrap_or("-"),
                remaining = %ticket
                    .sla_remaining
                    .map(format_seconds)
                    .unwrap_or_else(|| "-".to_string()),
                subject = ticket.subject(),
                "sla attention"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SerializedTicket, TicketBatch, TicketStatus};
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    /// Scripted source: replays a fixed sequence of good batches and
    /// failures, then goes quiet.
    #[derive(Debug)]
    struct ScriptedSource {
        steps: VecDeque<Result<TicketBatch, String>>,
        current_error: Option<String>,
    }

    impl ScriptedSource {
        fn new(steps: Vec<Result<TicketBatch, String>>) -> Self {
            Self {
                steps: steps.into(),
                current_error: None,
            }
        }
    }

    impl TicketSource for ScriptedSource {
        fn poll(&mut self) -> Option<TicketBatch> {
            match self.steps.pop_front() {
                Some(Ok(batch)) => {
                    self.current_error = None;
                    Some(batch)
                }
                Some(Err(message)) => {
                    self.current_error = Some(message);
                    None
                }
                None => {
                    self.current_error = None;
                    None
                }
            }
        }

        fn description(&self) -> &str {
            "scripted"
        }

        fn error(&self) -> Option<&str> {
            self.current_error.as_deref()
        }
    }

    fn ticket(id: u64, status: TicketStatus) -> SerializedTicket {
        SerializedTicket {
            id,
            subject: None,
            status,
            priority: None,
            created_at: None,
            assignee_id: None,
            requester_id: None,
            tags: Vec::new(),
            metric_events: Default::default(),
        }
    }

    #[test]
    fn test_first_cycle_reports_all_new() {
        let source = ScriptedSource::new(vec![Ok(vec![
            ticket(1, TicketStatus::Open),
            ticket(2, TicketStatus::New),
        ])]);
        let mut poller = Poller::new(Box::new(source), Thresholds::default());

        let report = poller.cycle().unwrap();
        assert!(!report.is_degraded());
        assert_eq!(report.stats.total, 2);
        assert_eq!(report.delta.new_tickets, vec![1, 2]);

        // Nothing new, nothing failing: no report
        assert!(poller.cycle().is_none());
    }

    #[test]
    fn test_status_change_across_cycles() {
        let source = ScriptedSource::new(vec![
            Ok(vec![ticket(5, TicketStatus::Open)]),
            Ok(vec![ticket(5, TicketStatus::Pending)]),
        ]);
        let mut poller = Poller::new(Box::new(source), Thresholds::default());

        let _ = poller.cycle().unwrap();
        let report = poller.cycle().unwrap();
        assert!(report.delta.new_tickets.is_empty());
        assert_eq!(report.delta.status_changes.len(), 1);
        assert_eq!(report.delta.status_changes[0].old, TicketStatus::Open);
        assert_eq!(report.delta.status_changes[0].new, TicketStatus::Pending);
    }

    #[test]
    fn test_failing_source_degrades_without_touching_snapshot() {
        let source = ScriptedSource::new(vec![
            Ok(vec![ticket(1, TicketStatus::Open)]),
            Err("connection refused".to_string()),
            Ok(vec![ticket(1, TicketStatus::Open)]),
        ]);
        let mut poller = Poller::new(Box::new(source), Thresholds::default());

        // Good cycle primes the snapshot
        let _ = poller.cycle().unwrap();

        // Source fails: degraded report, empty window
        let degraded = poller.cycle().unwrap();
        assert!(degraded.is_degraded());
        assert_eq!(degraded.stats.total, 0);
        assert!(degraded.delta.is_empty());

        // Recovery with the same window: the snapshot survived the
        // degraded cycle, so nothing reads as new again
        let recovered = poller.cycle().unwrap();
        assert!(!recovered.is_degraded());
        assert!(recovered.delta.is_empty());
    }

    #[test]
    fn test_degraded_cycle_report_shape() {
        let source = ScriptedSource::new(vec![Err("timeout".to_string())]);
        let mut poller = Poller::new(Box::new(source), Thresholds::default());

        let report = poller.cycle().unwrap();
        assert_eq!(report.error.as_deref(), Some("timeout"));
        assert!(report.window.tickets.is_empty());
        assert_eq!(report.stats.resolution_rate(), 0);
    }

    /// Presenter that counts reports and raises the stop flag once done.
    struct CountingPresenter {
        reports: Arc<AtomicUsize>,
        stop_after: usize,
        stop: Arc<AtomicBool>,
    }

    impl Presenter for CountingPresenter {
        fn present(&mut self, _report: &CycleReport) {
            let seen = self.reports.fetch_add(1, Ordering::SeqCst) + 1;
            if seen >= self.stop_after {
                self.stop.store(true, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_run_stops_cooperatively() {
        let source = ScriptedSource::new(vec![
            Ok(vec![ticket(1, TicketStatus::Open)]),
            Ok(vec![ticket(1, TicketStatus::Solved)]),
        ]);
        let mut poller = Poller::new(Box::new(source), Thresholds::default());

        let reports = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(AtomicBool::new(false));
        let mut presenter = CountingPresenter {
            reports: reports.clone(),
            stop_after: 2,
            stop: stop.clone(),
        };

        poller.run(&mut presenter, Duration::from_millis(1), &stop);
        assert_eq!(reports.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_run_honors_preraised_stop() {
        let source = ScriptedSource::new(vec![Ok(vec![ticket(1, TicketStatus::Open)])]);
        let mut poller = Poller::new(Box::new(source), Thresholds::default());

        let stop = AtomicBool::new(true);
        let mut presenter = LogPresenter::new();
        poller.run(&mut presenter, Duration::from_millis(1), &stop);
        // Never cycled: the batch is still queued
        assert!(poller.cycle().is_some());
    }
}
