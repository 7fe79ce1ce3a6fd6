//! Recorder handle implementation

use super::source::{ExchangeSource, HarSource};
use crate::config::RecorderConfig;
use crate::document::{sort_endpoints, DocumentBuilder, OpenApiDocument};
use crate::error::Result;
use crate::exchange::{CaptureFilter, CapturedExchange, Har};
use crate::store::{
    Endpoint, EndpointStore, EndpointSummary, HostEndpoints, InsertOutcome, ParameteriseOutcome,
};
use crate::types::RecordingStatus;
use futures::StreamExt;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

/// Session token taken when an exchange starts
///
/// Committing with a ticket from before the last `clear` drops the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestTicket {
    generation: u64,
}

impl IngestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a committed exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded(InsertOutcome),
    /// Rejected by the capture filter
    Filtered,
    /// Recording is not running
    NotRecording,
    /// A clear happened after the ticket was taken
    Stale,
}

impl RecordOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, RecordOutcome::Recorded(_))
    }

    /// Short machine-readable label
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordOutcome::Recorded(InsertOutcome::Created) => "created",
            RecordOutcome::Recorded(InsertOutcome::Appended) => "appended",
            RecordOutcome::Filtered => "filtered",
            RecordOutcome::NotRecording => "not_recording",
            RecordOutcome::Stale => "stale",
        }
    }
}

/// Totals from a bulk import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub recorded: usize,
    pub skipped: usize,
    pub rejected: usize,
}

impl ImportSummary {
    fn add(&mut self, outcome: RecordOutcome) {
        if outcome.is_recorded() {
            self.recorded += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// Consistent view of the recorder at one instant
#[derive(Debug, Clone, Serialize)]
pub struct RecorderSnapshot {
    pub status: RecordingStatus,
    pub generation: u64,
    pub version: u64,
    pub endpoints: usize,
    pub hosts: Vec<String>,
    pub disabled_hosts: BTreeSet<String>,
}

#[derive(Debug)]
struct State {
    store: EndpointStore,
    status: RecordingStatus,
    generation: u64,
    version: u64,
}

/// Shared handle over the endpoint store
#[derive(Debug, Clone)]
pub struct Recorder {
    state: Arc<RwLock<State>>,
    version_tx: Arc<watch::Sender<u64>>,
    builder: Arc<DocumentBuilder>,
    filter: CaptureFilter,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(&RecorderConfig::default())
    }
}

impl Recorder {
    /// Create an idle recorder
    pub fn new(config: &RecorderConfig) -> Self {
        let store = EndpointStore::with_settings(config.samples.cap, config.parameters.policy);
        let (version_tx, _) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(State {
                store,
                status: RecordingStatus::Idle,
                generation: 0,
                version: 0,
            })),
            version_tx: Arc::new(version_tx),
            builder: Arc::new(DocumentBuilder::from_config(config)),
            filter: config.capture_filter(),
        }
    }

    /// Create a recorder that is already recording
    pub async fn started(config: &RecorderConfig) -> Self {
        let recorder = Self::new(config);
        recorder.start().await;
        recorder
    }

    /// Receiver notified with the new version after every mutation
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version_tx.subscribe()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub async fn status(&self) -> RecordingStatus {
        self.state.read().await.status
    }

    /// Begin accepting exchanges
    pub async fn start(&self) {
        let mut state = self.state.write().await;
        state.status = RecordingStatus::Recording;
        info!(generation = state.generation, "recording started");
        self.publish(&mut state);
    }

    /// Stop accepting exchanges, keeping what was recorded
    pub async fn stop(&self) {
        let mut state = self.state.write().await;
        state.status = RecordingStatus::Stopped;
        info!(endpoints = state.store.len(), "recording stopped");
        self.publish(&mut state);
    }

    /// Drop every endpoint and start a new session
    ///
    /// Disabled hosts are forgotten too; the recorder returns to idle.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.store.clear();
        state.generation += 1;
        state.status = RecordingStatus::Idle;
        info!(generation = state.generation, "recording cleared");
        self.publish(&mut state);
    }

    // ========================================================================
    // Ingestion
    // ========================================================================

    /// Take a ticket for an exchange that is starting now
    pub async fn begin_exchange(&self) -> IngestTicket {
        IngestTicket {
            generation: self.state.read().await.generation,
        }
    }

    /// Record a finished exchange started under `ticket`
    pub async fn commit(&self, ticket: IngestTicket, exchange: CapturedExchange) -> RecordOutcome {
        if !self.filter.accepts(&exchange) {
            debug!(
                method = %exchange.method,
                url = %exchange.url,
                status = exchange.status,
                "exchange filtered"
            );
            return RecordOutcome::Filtered;
        }

        let mut state = self.state.write().await;
        if ticket.generation != state.generation {
            warn!(
                ticket = ticket.generation,
                current = state.generation,
                url = %exchange.url,
                "dropping exchange from a cleared session"
            );
            return RecordOutcome::Stale;
        }
        if !state.status.accepts_exchanges() {
            return RecordOutcome::NotRecording;
        }

        let outcome = state.store.insert(exchange);
        self.publish(&mut state);
        RecordOutcome::Recorded(outcome)
    }

    /// Record an exchange that started and finished now
    pub async fn record(&self, exchange: CapturedExchange) -> RecordOutcome {
        let ticket = self.begin_exchange().await;
        self.commit(ticket, exchange).await
    }

    /// Record every exchange a source produces
    ///
    /// Entries that fail to convert are counted as rejected and skipped.
    pub async fn import(&self, source: &dyn ExchangeSource) -> Result<ImportSummary> {
        let ticket = self.begin_exchange().await;
        let mut stream = source.exchanges().await?;
        let mut summary = ImportSummary::default();

        while let Some(item) = stream.next().await {
            match item {
                Ok(exchange) => summary.add(self.commit(ticket, exchange).await),
                Err(e) => {
                    warn!(source = %source.name(), error = %e, "rejected exchange");
                    summary.rejected += 1;
                }
            }
        }

        info!(
            source = %source.name(),
            recorded = summary.recorded,
            skipped = summary.skipped,
            rejected = summary.rejected,
            "import finished"
        );
        Ok(summary)
    }

    /// Record every entry of a parsed HAR log
    pub async fn import_har(&self, har: Har) -> Result<ImportSummary> {
        self.import(&HarSource::new(har)).await
    }

    // ========================================================================
    // Operator controls
    // ========================================================================

    /// Re-template an endpoint and fold matching endpoints into it
    pub async fn parameterise(
        &self,
        index: usize,
        template: &str,
        host: &str,
    ) -> Result<ParameteriseOutcome> {
        let mut state = self.state.write().await;
        let outcome = state.store.parameterise(index, template, host)?;
        self.publish(&mut state);
        Ok(outcome)
    }

    /// Replace the set of hosts excluded from views and the document
    pub async fn set_disabled_hosts<I, S>(&self, hosts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.write().await;
        state.store.set_disabled_hosts(hosts);
        debug!(disabled = ?state.store.disabled_hosts(), "disabled hosts updated");
        self.publish(&mut state);
    }

    // ========================================================================
    // Snapshot reads
    // ========================================================================

    /// Enabled endpoints in first-seen order
    pub async fn endpoints(&self) -> Vec<Endpoint> {
        self.state.read().await.store.endpoints()
    }

    /// Enabled endpoint summaries in presentation order
    pub async fn endpoint_summaries(&self) -> Vec<EndpointSummary> {
        let mut endpoints = self.endpoints().await;
        sort_endpoints(&mut endpoints);
        endpoints.iter().map(Endpoint::summary).collect()
    }

    /// Enabled endpoints grouped by host
    pub async fn endpoints_by_host(&self) -> Vec<HostEndpoints> {
        self.state.read().await.store.endpoints_by_host()
    }

    /// Every observed host, disabled ones included
    pub async fn hosts(&self) -> Vec<String> {
        self.state.read().await.store.hosts().to_vec()
    }

    pub async fn disabled_hosts(&self) -> BTreeSet<String> {
        self.state.read().await.store.disabled_hosts().clone()
    }

    /// Build the document from the current enabled endpoints
    pub async fn document(&self) -> OpenApiDocument {
        let endpoints = self.endpoints().await;
        self.builder.build(&endpoints)
    }

    pub async fn snapshot(&self) -> RecorderSnapshot {
        let state = self.state.read().await;
        RecorderSnapshot {
            status: state.status,
            generation: state.generation,
            version: state.version,
            endpoints: state
                .store
                .all_endpoints()
                .iter()
                .filter(|e| !state.store.disabled_hosts().contains(&e.host))
                .count(),
            hosts: state.store.hosts().to_vec(),
            disabled_hosts: state.store.disabled_hosts().clone(),
        }
    }

    fn publish(&self, state: &mut State) {
        state.version += 1;
        self.version_tx.send_replace(state.version);
    }
}
