// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use reqwest::{Client, Method};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::{redact_url, HttpError, NetworkError, ReconError, ReconResult, SourceError};
use crate::rate_limiter::AdaptiveRateLimiter;

/// Realistic browser User-Agents, some upstreams reject library agents
const BROWSER_USER_AGENTS: &[&str] = &[
    // Chrome on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    // Chrome on macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    // Firefox on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    // Safari on macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Get a realistic browser User-Agent (rotates per client)
fn get_browser_user_agent() -> &'static str {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let index = COUNTER.fetch_add(1, Ordering::Relaxed) % BROWSER_USER_AGENTS.len();
    BROWSER_USER_AGENTS[index]
}

/// Maximum response body size (32MB), crt.sh answers for large domains get big
const MAX_BODY_SIZE: usize = 32 * 1024 * 1024;

const DEFAULT_POOL_IDLE_PER_HOST: usize = 8;
const DEFAULT_POOL_MAX_IDLE_TIMEOUT: u64 = 90;

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout, shared by every source of a run
    pub timeout: Duration,
    /// Retries for retryable transport errors and 429/503 answers
    pub max_retries: u32,
    pub proxy: Option<String>,
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 1,
            proxy: None,
            user_agent: None,
        }
    }
}

/// One outgoing request
#[derive(Debug, Clone)]
pub struct HttpRequest<'a> {
    pub method: Method,
    pub url: &'a str,
    pub headers: &'a [(&'a str, &'a str)],
    pub body: Option<String>,
}

impl<'a> HttpRequest<'a> {
    pub fn get(url: &'a str) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: &[],
            body: None,
        }
    }

    pub fn post(url: &'a str, body: String) -> Self {
        Self {
            method: Method::POST,
            url,
            headers: &[],
            body: Some(body),
        }
    }

    pub fn with_headers(mut self, headers: &'a [(&'a str, &'a str)]) -> Self {
        self.headers = headers;
        self
    }
}

#[derive(Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    timeout: Duration,
    max_retries: u32,
    rate_limiter: Option<Arc<AdaptiveRateLimiter>>,
    max_body_size: usize,
}

impl HttpClient {
    pub fn new(timeout_secs: u64, max_retries: u32) -> ReconResult<Self> {
        Self::with_config(HttpClientConfig {
            timeout: Duration::from_secs(timeout_secs),
            max_retries,
            ..Default::default()
        })
    }

    pub fn with_config(config: HttpClientConfig) -> ReconResult<Self> {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| get_browser_user_agent().to_string());

        let mut client_builder = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent)
            .pool_max_idle_per_host(DEFAULT_POOL_IDLE_PER_HOST)
            .pool_idle_timeout(Duration::from_secs(DEFAULT_POOL_MAX_IDLE_TIMEOUT))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true);

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| ReconError::Configuration(format!("Invalid proxy {}: {}", proxy, e)))?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder
            .build()
            .map_err(|e| ReconError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            timeout: config.timeout,
            max_retries: config.max_retries,
            rate_limiter: None,
            max_body_size: MAX_BODY_SIZE,
        })
    }

    /// Set rate limiter for this client
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<AdaptiveRateLimiter>) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn rate_limiter(&self) -> Option<&Arc<AdaptiveRateLimiter>> {
        self.rate_limiter.as_ref()
    }

    /// Send GET request on behalf of `source`
    pub async fn get(
        &self,
        source: &str,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, SourceError> {
        self.execute(source, HttpRequest::get(url), cancel).await
    }

    /// Send a request on behalf of `source`. Every suspension point races the
    /// cancellation token; a non-success status is returned as an error.
    pub async fn execute(
        &self,
        source: &str,
        request: HttpRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, SourceError> {
        let mut attempts = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(SourceError::Cancelled);
            }

            if let Some(limiter) = &self.rate_limiter {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(SourceError::Cancelled),
                    _ = limiter.wait_for_slot(source) => {}
                }
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SourceError::Cancelled),
                outcome = self.send_once(&request) => outcome,
            };

            let retry_after = match outcome {
                Ok(response) if response.status_code == 429 || response.status_code == 503 => {
                    let backoff = match &self.rate_limiter {
                        Some(limiter) => limiter.record_rate_limit(source, response.status_code).await,
                        None => Duration::from_secs(1),
                    };

                    if attempts >= self.max_retries {
                        return Err(HttpError::from_status(
                            response.status_code,
                            request.url,
                            &response.body,
                        )
                        .into());
                    }
                    backoff
                }
                Ok(response) if (200..300).contains(&response.status_code) => {
                    if let Some(limiter) = &self.rate_limiter {
                        limiter.record_success(source).await;
                    }
                    return Ok(response);
                }
                Ok(response) => {
                    return Err(HttpError::from_status(
                        response.status_code,
                        request.url,
                        &response.body,
                    )
                    .into());
                }
                Err(err) => {
                    if attempts >= self.max_retries || !err.is_retryable() {
                        return Err(err);
                    }
                    Duration::from_millis(100 * (attempts as u64 + 1))
                }
            };

            attempts += 1;
            debug!(
                "[{}] Retrying {} (attempt {}/{}) after {:?}",
                source,
                redact_url(request.url),
                attempts,
                self.max_retries,
                retry_after
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SourceError::Cancelled),
                _ = tokio::time::sleep(retry_after) => {}
            }
        }
    }

    async fn send_once(&self, request: &HttpRequest<'_>) -> Result<HttpResponse, SourceError> {
        let started = Instant::now();

        let mut builder = self.client.request(request.method.clone(), request.url);
        for (name, value) in request.headers {
            builder = builder.header(*name, *value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| self.map_transport_error(e))?;

        let status_code = response.status().as_u16();
        let headers = {
            let headers = response.headers();
            let mut map = HashMap::with_capacity(headers.len());
            for (k, v) in headers.iter() {
                if let Ok(value_str) = v.to_str() {
                    map.insert(k.as_str().to_string(), value_str.to_string());
                }
            }
            map
        };

        let body_bytes = response.bytes().await.map_err(|e| self.map_transport_error(e))?;
        if body_bytes.len() > self.max_body_size {
            return Err(HttpError::BodyTooLarge {
                url: redact_url(request.url),
                size: body_bytes.len(),
                max_size: self.max_body_size,
            }
            .into());
        }

        Ok(HttpResponse {
            status_code,
            body: String::from_utf8_lossy(&body_bytes).into_owned(),
            headers,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    fn map_transport_error(&self, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Network(NetworkError::ConnectionTimeout {
                url: err.url().map(|u| redact_url(u.as_str())).unwrap_or_default(),
                timeout: self.timeout,
            })
        } else {
            err.into()
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
    pub headers: HashMap<String, String>,
    pub duration_ms: u64,
}

impl HttpResponse {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
