//! Live Zendesk data source (requires the "zendesk" feature).
//!
//! Spawns a background task that periodically fetches the lookback
//! window from the Zendesk search API, enriches the freshest tickets
//! with their SLA metric events, and forwards each batch through a
//! channel to the monitor.
//!
//! Credentials and window settings come from a config file and/or
//! `ZENDESK_`-prefixed environment variables (`ZENDESK_SUBDOMAIN`,
//! `ZENDESK_EMAIL`, `ZENDESK_API_TOKEN`).

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Duration as TimeDelta, Utc};
use config::{Config, Environment, File};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{MetricEvent, SerializedTicket, TicketBatch, TicketSource};

/// Per-request timeout; a hung call must not starve the scheduler.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for a Zendesk instance.
#[derive(Debug, Clone, Deserialize)]
pub struct ZendeskConfig {
    pub subdomain: String,
    pub email: String,
    pub api_token: String,

    /// Lookback window for the ticket search, in hours.
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,

    /// Seconds between fetches of the full window.
    #[serde(default = "default_fetch_interval")]
    pub fetch_interval_secs: u64,

    /// How many of the freshest non-terminal tickets get their metric
    /// events fetched each cycle (each one is a separate API call).
    #[serde(default = "default_sla_fetch_limit")]
    pub sla_fetch_limit: usize,
}

fn default_window_hours() -> i64 {
    24
}

fn default_fetch_interval() -> u64 {
    30
}

fn default_sla_fetch_limit() -> usize {
    50
}

impl ZendeskConfig {
    /// Load settings from an optional config file layered under
    /// `ZENDESK_`-prefixed environment variables.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }
        builder
            .add_source(Environment::with_prefix("ZENDESK"))
            .build()?
            .try_deserialize()
            .context("incomplete Zendesk settings (need subdomain, email, api_token)")
    }

    fn base_url(&self) -> String {
        format!("https://{}.zendesk.com/api/v2", self.subdomain)
    }

    fn auth_user(&self) -> String {
        format!("{}/token", self.email)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SerializedTicket>,
    next_page: Option<String>,
}

/// A data source that polls a live Zendesk instance.
///
/// The fetch task owns the HTTP client; the monitor side only sees the
/// usual non-blocking [`TicketSource`] interface.
#[derive(Debug)]
pub struct ZendeskSource {
    receiver: mpsc::Receiver<TicketBatch>,
    description: String,
    shared_error: Arc<Mutex<Option<String>>>,
    cached_error: Option<String>,
}

impl ZendeskSource {
    /// Spawn the background fetch task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: ZendeskConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        let description = format!("zendesk: {}.zendesk.com", config.subdomain);
        let (tx, rx) = mpsc::channel(4);
        let shared_error = Arc::new(Mutex::new(None));
        let error_handle = shared_error.clone();

        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(config.fetch_interval_secs.max(1)));
            loop {
                interval.tick().await;
                match fetch_window(&client, &config).await {
                    Ok(batch) => {
                        *error_handle.lock().unwrap() = None;
                        debug!(tickets = batch.len(), "fetched window");
                        if tx.send(batch).await.is_err() {
                            // Receiver dropped; monitor is gone
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "window fetch failed");
                        *error_handle.lock().unwrap() = Some(e.to_string());
                    }
                }
            }
        });

        Ok(Self {
            receiver: rx,
            description,
            shared_error,
            cached_error: None,
        })
    }
}

impl TicketSource for ZendeskSource {
    fn poll(&mut self) -> Option<TicketBatch> {
        self.cached_error = self.shared_error.lock().unwrap().clone();

        match self.receiver.try_recv() {
            Ok(batch) => Some(batch),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                if self.cached_error.is_none() {
                    self.cached_error = Some("Fetch task stopped".to_string());
                }
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.cached_error.as_deref()
    }
}

/// Fetch one lookback window: search newest-first, follow pagination,
/// then enrich the freshest non-terminal tickets with metric events.
async fn fetch_window(client: &reqwest::Client, config: &ZendeskConfig) -> Result<TicketBatch> {
    let cutoff = Utc::now() - TimeDelta::hours(config.window_hours);
    let query = format!("type:ticket created>={}", cutoff.to_rfc3339());

    let mut tickets = Vec::new();
    let mut url = format!("{}/search.json", config.base_url());
    let mut params: Option<[(&str, String); 3]> = Some([
        ("query", query),
        ("sort_by", "created_at".to_string()),
        ("sort_order", "desc".to_string()),
    ]);

    loop {
        let mut request = client
            .get(&url)
            .basic_auth(config.auth_user(), Some(&config.api_token));
        if let Some(ref p) = params {
            request = request.query(p);
        }

        let response = request.send().await.context("search request failed")?;
        let response = response
            .error_for_status()
            .context("search request rejected")?;
        let page: SearchResponse = response.json().await.context("malformed search response")?;

        tickets.extend(page.results);

        match page.next_page {
            // The next-page URL already carries the query parameters
            Some(next) => {
                url = next;
                params = None;
            }
            None => break,
        }
    }

    // Metric events cost one call per ticket; cap the enrichment to the
    // freshest non-terminal tickets.
    let mut enriched = 0;
    for ticket in tickets.iter_mut() {
        if enriched >= config.sla_fetch_limit {
            break;
        }
        if ticket.status.is_terminal() {
            continue;
        }
        match fetch_metric_events(client, config, ticket.id).await {
            Ok(streams) => ticket.metric_events = streams,
            // A single failed enrichment leaves that ticket without SLA
            // data; the batch itself is still good
            Err(e) => debug!(ticket = ticket.id, error = %e, "metric event fetch failed"),
        }
        enriched += 1;
    }

    Ok(tickets)
}

/// Fetch the per-metric-type event streams for one ticket.
///
/// Only the streams the resolver understands are kept; anything else in
/// the payload is ignored.
async fn fetch_metric_events(
    client: &reqwest::Client,
    config: &ZendeskConfig,
    ticket_id: u64,
) -> Result<BTreeMap<String, Vec<MetricEvent>>> {
    let url = format!("{}/tickets/{}/metric_events.json", config.base_url(), ticket_id);
    let response = client
        .get(&url)
        .basic_auth(config.auth_user(), Some(&config.api_token))
        .send()
        .await?
        .error_for_status()?;

    let payload: BTreeMap<String, serde_json::Value> = response.json().await?;

    let mut streams = BTreeMap::new();
    for key in ["resolution_time", "reply_time"] {
        if let Some(value) = payload.get(key) {
            if let Ok(events) = serde_json::from_value::<Vec<MetricEvent>>(value.clone()) {
                streams.insert(key.to_string(), events);
            }
        }
    }

    Ok(streams)
}
