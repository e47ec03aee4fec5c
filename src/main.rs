// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::info;

mod app;
mod data;
mod events;
mod export;
mod poll;
mod source;
mod ui;

use app::{App, View};
use data::Thresholds;
use poll::{LogPresenter, Poller};
use source::{FileSource, StreamSource, TicketSource};

#[derive(Parser, Debug)]
#[command(name = "deskwatch")]
#[command(about = "Diagnostic TUI for monitoring support-ticket activity and SLA compliance")]
struct Args {
    /// Path to a JSON file holding one ticket batch
    #[cfg_attr(
        feature = "zendesk",
        arg(short, long, default_value = "tickets.json", conflicts_with_all = ["connect", "zendesk"])
    )]
    #[cfg_attr(
        not(feature = "zendesk"),
        arg(short, long, default_value = "tickets.json", conflicts_with_all = ["connect"])
    )]
    file: PathBuf,

    /// Connect to a TCP endpoint streaming newline-delimited JSON
    /// batches (host:port)
    #[cfg_attr(
        feature = "zendesk",
        arg(short, long, conflicts_with_all = ["file", "zendesk"])
    )]
    #[cfg_attr(
        not(feature = "zendesk"),
        arg(short, long, conflicts_with_all = ["file"])
    )]
    connect: Option<String>,

    /// Poll a live Zendesk instance. Takes a config file path;
    /// ZENDESK_SUBDOMAIN / ZENDESK_EMAIL / ZENDESK_API_TOKEN environment
    /// variables override the file.
    #[cfg(feature = "zendesk")]
    #[arg(short, long, conflicts_with_all = ["file", "connect"])]
    zendesk: Option<PathBuf>,

    /// Refresh interval in seconds (file polling and headless cadence)
    #[arg(short, long, default_value = "30")]
    refresh: u64,

    /// Fraction of the SLA target that may remain before a ticket
    /// counts as at risk
    #[arg(long, default_value = "0.25")]
    at_risk_within: f64,

    /// Run without the TUI, logging one structured event per cycle
    #[arg(long)]
    headless: bool,

    /// Export current state to a JSON file and exit
    #[cfg_attr(
        feature = "zendesk",
        arg(short, long, conflicts_with_all = ["connect", "zendesk", "headless"])
    )]
    #[cfg_attr(
        not(feature = "zendesk"),
        arg(short, long, conflicts_with_all = ["connect", "headless"])
    )]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let thresholds = Thresholds {
        at_risk_ratio: args.at_risk_within,
    };
    let refresh = Duration::from_secs(args.refresh.max(1));

    // Handle export mode (non-interactive, one cycle)
    if let Some(ref export_path) = args.export {
        return export_once(&args.file, export_path, &thresholds);
    }

    // A runtime for the push-style sources and the headless stop signal.
    // It must outlive the monitor: background fetch tasks run on it.
    let rt = tokio::runtime::Runtime::new()?;

    let source = build_source(&args, &rt)?;
    let poller = Poller::new(source, thresholds);

    if args.headless {
        return run_headless(poller, refresh, &rt);
    }

    // Push-style sources deliver on their own cadence; poll them often.
    // File mode polls at the requested refresh interval.
    let mut poll_interval = if args.connect.is_some() {
        Duration::from_millis(100)
    } else {
        refresh
    };
    #[cfg(feature = "zendesk")]
    if args.zendesk.is_some() {
        poll_interval = Duration::from_millis(100);
    }

    run_tui(poller, poll_interval)
}

/// Build the data source selected by the CLI flags.
fn build_source(args: &Args, rt: &tokio::runtime::Runtime) -> Result<Box<dyn TicketSource>> {
    if let Some(ref addr) = args.connect {
        return rt.block_on(async {
            use tokio::net::TcpStream;

            println!("Connecting to {}...", addr);
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    println!("Connected!");
                    Ok(Box::new(StreamSource::spawn(stream, addr)) as Box<dyn TicketSource>)
                }
                Err(e) => Err(anyhow::anyhow!("Failed to connect to {}: {}", addr, e)),
            }
        });
    }

    #[cfg(feature = "zendesk")]
    if let Some(ref config_path) = args.zendesk {
        let config = source::ZendeskConfig::load(Some(config_path))?;
        let source = rt.block_on(async { source::ZendeskSource::spawn(config) })?;
        return Ok(Box::new(source));
    }

    Ok(Box::new(FileSource::new(&args.file)))
}

/// Run the headless monitor: one log line per noteworthy fact, until
/// Ctrl-C raises the stop flag between cycles.
fn run_headless(mut poller: Poller, refresh: Duration, rt: &tokio::runtime::Runtime) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let stop = Arc::new(AtomicBool::new(false));
    let stop_signal = stop.clone();
    rt.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop_signal.store(true, Ordering::Relaxed);
        }
    });

    info!(
        source = poller.source_description(),
        refresh_secs = refresh.as_secs(),
        "monitoring"
    );

    let mut presenter = LogPresenter::new();
    poller.run(&mut presenter, refresh, &stop);

    info!("monitoring stopped");
    Ok(())
}

/// Run the TUI with the given poller
fn run_tui(poller: Poller, refresh_interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    // Create app and load initial data
    let mut app = App::new(poller);
    let _ = app.reload_data();

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, refresh_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(0, area.height / 2 - 2, area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            // Render header with SLA overview
            ui::common::render_header(frame, app, chunks[0]);

            // Render tabs
            ui::common::render_tabs(frame, app, chunks[1]);

            // Render current view
            match app.current_view {
                View::Tickets => ui::summary::render(frame, app, chunks[2]),
                View::Risk => ui::risk::render(frame, app, chunks[2]),
                View::Changes => ui::changes::render(frame, app, chunks[2]),
            }

            // Render status bar
            ui::common::render_status_bar(frame, app, chunks[3]);

            // Render detail overlay if active
            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            // Render help overlay if active
            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Content starts after header (1) + tabs (1) + table header (1)
                    events::handle_mouse_event(app, mouse, 3);
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Auto-refresh data periodically
        if last_refresh.elapsed() >= refresh_interval {
            let _ = app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Export one cycle's state to a JSON file
fn export_once(ticket_path: &Path, export_path: &Path, thresholds: &Thresholds) -> Result<()> {
    let source = Box::new(FileSource::new(ticket_path));
    let mut poller = Poller::new(source, thresholds.clone());

    let Some(report) = poller.cycle() else {
        anyhow::bail!("No data available from {}", ticket_path.display());
    };
    if let Some(err) = report.error {
        anyhow::bail!("Failed to read {}: {}", ticket_path.display(), err);
    }

    let json = export::render(&report.window, &report.delta, &report.stats)?;
    std::fs::write(export_path, json)?;

    println!("Exported monitor state to: {}", export_path.display());
    Ok(())
}
