// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Execution Session
 * Per-run context shared by every source: rate-limited HTTP transport,
 * key selection, response archive and the run's cancellation token
 *
 * © 2026 Bountyy Oy
 */

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::archive::ResponseArchive;
use super::keys;
use crate::errors::{ReconError, ReconResult, SourceError};
use crate::http_client::{HttpClient, HttpClientConfig, HttpRequest, HttpResponse};
use crate::rate_limiter::{AdaptiveRateLimiter, RateLimiterConfig};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default upper bound for a whole run, stops slow paginating sources from
/// stretching the tail indefinitely
pub const DEFAULT_MAX_ENUMERATION_TIME: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Bounds every individual HTTP call
    pub timeout: Duration,
    /// Bounds the whole run, enforced by the agent through cancellation
    pub max_enumeration_time: Duration,
    pub max_retries: u32,
    /// Requests per second across all sources (None = unlimited)
    pub global_rate_limit: Option<u32>,
    /// Requests per second per source name
    pub source_rate_limits: HashMap<String, u32>,
    pub proxy: Option<String>,
    /// Archive raw responses under `<dir>/<source>.json`
    pub response_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_enumeration_time: DEFAULT_MAX_ENUMERATION_TIME,
            max_retries: 1,
            global_rate_limit: None,
            source_rate_limits: HashMap::new(),
            proxy: None,
            response_dir: None,
        }
    }
}

pub struct Session {
    client: HttpClient,
    archive: Option<ResponseArchive>,
    cancel: CancellationToken,
}

impl Session {
    pub fn new(config: &SessionConfig, cancel: CancellationToken) -> ReconResult<Self> {
        if config.timeout.is_zero() {
            return Err(ReconError::Configuration(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        let rate_limiter = AdaptiveRateLimiter::new(RateLimiterConfig {
            global_rps: config.global_rate_limit.filter(|rps| *rps > 0),
            source_rps: config
                .source_rate_limits
                .iter()
                .map(|(name, rps)| (name.to_lowercase(), *rps))
                .collect(),
            ..Default::default()
        });

        let client = HttpClient::with_config(HttpClientConfig {
            timeout: config.timeout,
            max_retries: config.max_retries,
            proxy: config.proxy.clone(),
            user_agent: None,
        })?
        .with_rate_limiter(Arc::new(rate_limiter));

        Ok(Self {
            client,
            archive: config.response_dir.clone().map(ResponseArchive::new),
            cancel,
        })
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn timeout(&self) -> Duration {
        self.client.timeout()
    }

    pub fn rate_limiter(&self) -> Option<&Arc<AdaptiveRateLimiter>> {
        self.client.rate_limiter()
    }

    pub async fn simple_get(
        &self,
        ctx: &CancellationToken,
        source: &str,
        url: &str,
    ) -> Result<HttpResponse, SourceError> {
        self.request(ctx, source, HttpRequest::get(url)).await
    }

    pub async fn get(
        &self,
        ctx: &CancellationToken,
        source: &str,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, SourceError> {
        self.request(ctx, source, HttpRequest::get(url).with_headers(headers))
            .await
    }

    pub async fn post(
        &self,
        ctx: &CancellationToken,
        source: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: String,
    ) -> Result<HttpResponse, SourceError> {
        self.request(ctx, source, HttpRequest::post(url, body).with_headers(headers))
            .await
    }

    /// Aborts when either the caller's token or the run's token fires
    async fn request(
        &self,
        ctx: &CancellationToken,
        source: &str,
        request: HttpRequest<'_>,
    ) -> Result<HttpResponse, SourceError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(SourceError::Cancelled),
            result = self.client.execute(source, request, ctx) => result,
        }
    }

    /// One key per call, uniform-random; `None` tells the source to skip
    pub fn pick_key<'a>(&self, keys: &'a [String], source: &str) -> Option<&'a str> {
        keys::pick_random(keys, source).map(String::as_str)
    }

    pub fn archives_responses(&self) -> bool {
        self.archive.is_some()
    }

    /// Best-effort archive of a raw response
    pub async fn archive(&self, source: &str, body: &str) {
        if let Some(archive) = &self.archive {
            archive.record(source, body).await;
        }
    }
}
