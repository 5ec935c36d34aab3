// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Source Contract
 * Capability interface every passive data source implements, plus the shared
 * run machinery (task spawn, key skip, statistics, event emission)
 *
 * © 2026 Bountyy Oy
 */

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::extractor::SubdomainExtractor;
use super::keys;
use super::session::Session;
use crate::errors::SourceError;
use crate::http_client::HttpResponse;

/// Events buffered per source before the source task waits on the consumer
pub const SOURCE_CHANNEL_CAPACITY: usize = 256;

/// Event stream of one source for one run
pub type SourceStream = ReceiverStream<SourceEvent>;

/// One unit of source output, always attributed to exactly one source
#[derive(Debug)]
pub struct SourceEvent {
    pub source: &'static str,
    pub payload: EventPayload,
}

#[derive(Debug)]
pub enum EventPayload {
    Subdomain(String),
    Error(SourceError),
    /// Raw response body, only emitted when response archiving is on
    Response(String),
    /// Non-fatal diagnostic
    Info(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Subdomain,
    Error,
    Response,
    Info,
}

impl SourceEvent {
    pub fn kind(&self) -> EventKind {
        match self.payload {
            EventPayload::Subdomain(_) => EventKind::Subdomain,
            EventPayload::Error(_) => EventKind::Error,
            EventPayload::Response(_) => EventKind::Response,
            EventPayload::Info(_) => EventKind::Info,
        }
    }

    pub fn subdomain(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::Subdomain(value) => Some(value),
            _ => None,
        }
    }
}

/// Per-source counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub errors: u64,
    pub results: u64,
    pub time_taken: Duration,
    /// Source never attempted network I/O
    pub skipped: bool,
}

/// What a failure on a page after the first one does to the rest of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageFailurePolicy {
    /// Record the error and move on to the next page
    #[default]
    Continue,
    /// Record the error and stop paginating
    Abort,
}

#[derive(Debug, Default)]
pub struct StatsCounter {
    errors: AtomicU64,
    results: AtomicU64,
    skipped: AtomicBool,
    time_taken: Mutex<Duration>,
}

impl StatsCounter {
    pub fn reset(&self) {
        self.errors.store(0, Ordering::SeqCst);
        self.results.store(0, Ordering::SeqCst);
        self.skipped.store(false, Ordering::SeqCst);
        *self.time_taken.lock() = Duration::ZERO;
    }

    fn add_error(&self) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }

    fn add_result(&self) {
        self.results.fetch_add(1, Ordering::SeqCst);
    }

    fn mark_skipped(&self) {
        self.skipped.store(true, Ordering::SeqCst);
    }

    fn set_time_taken(&self, elapsed: Duration) {
        *self.time_taken.lock() = elapsed;
    }

    pub fn snapshot(&self) -> Statistics {
        Statistics {
            errors: self.errors.load(Ordering::SeqCst),
            results: self.results.load(Ordering::SeqCst),
            time_taken: *self.time_taken.lock(),
            skipped: self.skipped.load(Ordering::SeqCst),
        }
    }
}

/// Credentials and counters embedded by every source
#[derive(Debug, Default)]
pub struct SourceState {
    api_keys: RwLock<Vec<String>>,
    stats: Arc<StatsCounter>,
}

impl SourceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_api_keys(&self, keys: Vec<String>) {
        *self.api_keys.write() = keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
    }

    pub fn api_keys(&self) -> Vec<String> {
        self.api_keys.read().clone()
    }

    pub fn stats(&self) -> &Arc<StatsCounter> {
        &self.stats
    }
}

/// A passive subdomain data source.
///
/// Implementors provide the static facts, the embedded [`SourceState`] and the
/// provider-specific [`Source::scrape`]. [`Source::run`] is shared: it spawns
/// the task, handles the missing-key skip, times the run and closes the stream.
#[async_trait]
pub trait Source: Send + Sync + 'static {
    /// Stable unique identifier, matched case-insensitively
    fn name(&self) -> &'static str;

    /// Part of the default source set
    fn is_default(&self) -> bool;

    /// Results are safe to feed into further enumeration rounds
    fn has_recursive_support(&self) -> bool;

    fn needs_key(&self) -> bool;

    fn state(&self) -> &SourceState;

    fn page_failure_policy(&self) -> PageFailurePolicy {
        PageFailurePolicy::Continue
    }

    /// Provider-specific enumeration. Emits through `scope`, returns when done.
    async fn scrape(&self, scope: &ScrapeScope);

    fn add_api_keys(&self, keys: Vec<String>) {
        self.state().set_api_keys(keys);
    }

    /// Snapshot of the last run's counters
    fn statistics(&self) -> Statistics {
        self.state().stats().snapshot()
    }

    fn reset_statistics(&self) {
        self.state().stats().reset();
    }

    /// Start enumerating `domain` in the background and return its event
    /// stream immediately. The stream closes when the source is done or
    /// `cancel` fires.
    fn run(
        self: Arc<Self>,
        cancel: CancellationToken,
        domain: &str,
        session: Arc<Session>,
    ) -> SourceStream {
        spawn_source(self, cancel, domain, session)
    }
}

/// Shared implementation behind [`Source::run`]
pub fn spawn_source<S: Source + ?Sized>(
    source: Arc<S>,
    cancel: CancellationToken,
    domain: &str,
    session: Arc<Session>,
) -> SourceStream {
    let (tx, rx) = mpsc::channel(SOURCE_CHANNEL_CAPACITY);
    let domain = domain.to_string();

    source.reset_statistics();

    tokio::spawn(async move {
        let started = Instant::now();
        let name = source.name();
        let stats = Arc::clone(source.state().stats());
        let keys = source.state().api_keys();

        let scope = ScrapeScope {
            source: name,
            domain,
            keys,
            session,
            cancel,
            tx,
            stats: Arc::clone(&stats),
            policy: source.page_failure_policy(),
            extractor: None,
        }
        .with_extractor();

        if source.needs_key() && scope.keys.is_empty() {
            stats.mark_skipped();
            debug!("Skipping {}: no API key configured", name);
            scope
                .info(format!("Skipping {}: no API key configured", name))
                .await;
        } else if scope.is_cancelled() {
            stats.mark_skipped();
        } else {
            source.scrape(&scope).await;
        }

        // Counters are final before the stream closes
        stats.set_time_taken(started.elapsed());
        drop(scope);
    });

    ReceiverStream::new(rx)
}

/// Everything a source needs while scraping one domain
pub struct ScrapeScope {
    source: &'static str,
    domain: String,
    keys: Vec<String>,
    session: Arc<Session>,
    cancel: CancellationToken,
    tx: mpsc::Sender<SourceEvent>,
    stats: Arc<StatsCounter>,
    policy: PageFailurePolicy,
    extractor: Option<SubdomainExtractor>,
}

impl ScrapeScope {
    fn with_extractor(mut self) -> Self {
        match SubdomainExtractor::new(&self.domain) {
            Ok(extractor) => self.extractor = Some(extractor),
            Err(e) => warn!("[{}] Could not build extractor for {}: {}", self.source, self.domain, e),
        }
        self
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// One key per call, uniform-random. `None` when no key is configured.
    pub fn api_key(&self) -> Option<&str> {
        self.session.pick_key(&self.keys, self.source)
    }

    /// One `username:secret` pair per call
    pub fn api_key_pair(&self) -> Option<keys::KeyPair> {
        let pairs = keys::key_pairs(&self.keys);
        keys::pick_random(&pairs, self.source).cloned()
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse, SourceError> {
        self.session.simple_get(&self.cancel, self.source, url).await
    }

    pub async fn get_with_headers(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, SourceError> {
        self.session.get(&self.cancel, self.source, url, headers).await
    }

    pub async fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: String,
    ) -> Result<HttpResponse, SourceError> {
        self.session.post(&self.cancel, self.source, url, headers, body).await
    }

    /// Hostnames under the run's domain found anywhere in `text`
    pub fn extract(&self, text: &str) -> Vec<String> {
        match &self.extractor {
            Some(extractor) => extractor.extract(text).collect(),
            None => Vec::new(),
        }
    }

    async fn emit(&self, payload: EventPayload) -> bool {
        let event = SourceEvent {
            source: self.source,
            payload,
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.tx.send(event) => sent.is_ok(),
        }
    }

    /// Emit a hostname. Returns false once the run is over for this source.
    pub async fn subdomain(&self, value: impl Into<String>) -> bool {
        let value = value.into();
        let value = value.trim();
        if value.is_empty() {
            return !self.is_cancelled();
        }

        let delivered = self.emit(EventPayload::Subdomain(value.to_string())).await;
        if delivered {
            self.stats.add_result();
        }
        delivered
    }

    /// Record a failure. Always counted, even if the consumer is gone.
    pub async fn error(&self, error: SourceError) -> bool {
        self.stats.add_error();
        debug!("[{}] {}", self.source, error);
        self.emit(EventPayload::Error(error)).await
    }

    pub async fn info(&self, message: impl Into<String>) -> bool {
        self.emit(EventPayload::Info(message.into())).await
    }

    /// Capture a raw response when archiving is on
    pub async fn response(&self, body: &str) -> bool {
        if !self.session.archives_responses() {
            return true;
        }
        self.session.archive(self.source, body).await;
        self.emit(EventPayload::Response(body.to_string())).await
    }

    /// Record a failure on page `page` (1-based) and decide whether to keep
    /// paginating. The first page always ends the source's contribution.
    pub async fn page_failed(&self, page: usize, error: SourceError) -> bool {
        let delivered = self.error(error).await;
        delivered && page > 1 && self.policy == PageFailurePolicy::Continue
    }

    /// Politeness delay between pages. Returns false if cancelled meanwhile.
    pub async fn pause(&self, delay: Duration) -> bool {
        if delay.is_zero() {
            return !self.is_cancelled();
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}
