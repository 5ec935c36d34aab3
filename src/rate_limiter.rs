// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Adaptive Rate Limiter
 * Token bucket algorithm with automatic backoff and per-source limits
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use nonzero_ext::*;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

type DirectLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Requests per second across every source of a run (None = unlimited)
    pub global_rps: Option<u32>,

    /// Requests per second per source name, overriding `default_source_rps`
    pub source_rps: HashMap<String, u32>,

    /// Requests per second for sources without an explicit entry (None = unlimited)
    pub default_source_rps: Option<u32>,

    /// Floor after backoff
    pub min_rps: u32,

    /// Rate applied to an unlimited source the first time it is rate limited
    pub unlimited_backoff_rps: u32,

    /// Backoff multiplier when rate limited
    pub backoff_multiplier: f64,

    /// Recovery multiplier after sustained success
    pub recovery_multiplier: f64,

    /// Enable adaptive rate limiting
    pub adaptive: bool,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            global_rps: None,
            source_rps: HashMap::new(),
            default_source_rps: None,
            min_rps: 1,
            unlimited_backoff_rps: 5,
            backoff_multiplier: 0.5,
            recovery_multiplier: 1.1,
            adaptive: true,
        }
    }
}

fn direct_limiter(rps: u32) -> Arc<DirectLimiter> {
    let quota = Quota::per_second(NonZeroU32::new(rps).unwrap_or(nonzero!(1u32)));
    Arc::new(GovernorRateLimiter::direct(quota))
}

/// Per-source rate limiter state
#[derive(Debug)]
struct SourceState {
    /// Configured ceiling, None while unlimited
    ceiling_rps: Option<u32>,

    current_rps: Option<u32>,

    limiter: Option<Arc<DirectLimiter>>,

    success_count: u32,

    rate_limit_count: u32,
}

impl SourceState {
    fn new(rps: Option<u32>) -> Self {
        Self {
            ceiling_rps: rps,
            current_rps: rps,
            limiter: rps.map(direct_limiter),
            success_count: 0,
            rate_limit_count: 0,
        }
    }

    fn update_rps(&mut self, new_rps: u32) {
        if Some(new_rps) != self.current_rps {
            self.current_rps = Some(new_rps);
            self.limiter = Some(direct_limiter(new_rps));
            debug!("Updated rate limit to {} req/s", new_rps);
        }
    }
}

/// Adaptive rate limiter with per-source tracking, shared by every source of a run
pub struct AdaptiveRateLimiter {
    config: RateLimiterConfig,

    sources: RwLock<HashMap<String, SourceState>>,

    global_limiter: Option<Arc<DirectLimiter>>,
}

impl AdaptiveRateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        let global_limiter = config.global_rps.map(direct_limiter);

        info!(
            "Initialized rate limiter: global={:?} rps, {} source overrides, adaptive={}",
            config.global_rps,
            config.source_rps.len(),
            config.adaptive
        );

        Self {
            config,
            sources: RwLock::new(HashMap::new()),
            global_limiter,
        }
    }

    fn configured_rps(&self, source: &str) -> Option<u32> {
        self.config
            .source_rps
            .get(&source.to_lowercase())
            .copied()
            .or(self.config.default_source_rps)
    }

    /// Wait until a request for `source` is allowed
    pub async fn wait_for_slot(&self, source: &str) {
        if let Some(global) = &self.global_limiter {
            global.until_ready().await;
        }

        let limiter = {
            let mut sources = self.sources.write().await;
            let configured = self.configured_rps(source);
            let state = sources
                .entry(source.to_string())
                .or_insert_with(|| SourceState::new(configured));

            state.limiter.clone()
        };

        if let Some(limiter) = limiter {
            limiter.until_ready().await;
        }
    }

    /// Record successful request (may increase rate limit)
    pub async fn record_success(&self, source: &str) {
        if !self.config.adaptive {
            return;
        }

        let mut sources = self.sources.write().await;

        if let Some(state) = sources.get_mut(source) {
            let Some(current) = state.current_rps else {
                return;
            };
            state.success_count += 1;

            if state.success_count >= 100 {
                let new_rps = ((current as f64 * self.config.recovery_multiplier).ceil() as u32)
                    .max(current + 1);

                let ceiling_rps = state.ceiling_rps;
                match ceiling_rps {
                    Some(ceiling) if new_rps > ceiling => {
                        if current < ceiling {
                            state.update_rps(ceiling);
                        }
                    }
                    // Recovered past the backoff rate of an unlimited source
                    None if new_rps > self.config.unlimited_backoff_rps * 4 => {
                        info!("[RateLimit] Lifting rate limit for {}", source);
                        state.current_rps = None;
                        state.limiter = None;
                    }
                    _ => {
                        info!(
                            "[RateLimit] Increasing rate limit for {}: {} -> {} req/s",
                            source, current, new_rps
                        );
                        state.update_rps(new_rps);
                    }
                }

                state.success_count = 0;
            }
        }
    }

    /// Record rate limit response. Returns how long the caller should back off.
    pub async fn record_rate_limit(&self, source: &str, status_code: u16) -> Duration {
        let configured = self.configured_rps(source);
        let mut sources = self.sources.write().await;

        let state = sources
            .entry(source.to_string())
            .or_insert_with(|| SourceState::new(configured));

        state.rate_limit_count += 1;
        state.success_count = 0;

        if self.config.adaptive {
            let new_rps = match state.current_rps {
                Some(current) => ((current as f64 * self.config.backoff_multiplier) as u32)
                    .max(self.config.min_rps),
                None => self.config.unlimited_backoff_rps.max(self.config.min_rps),
            };

            if state.current_rps.map_or(true, |current| new_rps < current) {
                warn!(
                    "[WARNING] Rate limited on {} (HTTP {}): {:?} -> {} req/s",
                    source, status_code, state.current_rps, new_rps
                );
                state.update_rps(new_rps);
            }
        }

        match status_code {
            429 => Duration::from_secs(2),
            503 => Duration::from_secs(5),
            _ => Duration::from_secs(1),
        }
    }

    /// Current rate for a source, None while unlimited
    pub async fn get_current_rps(&self, source: &str) -> Option<u32> {
        let sources = self.sources.read().await;

        match sources.get(source) {
            Some(state) => state.current_rps,
            None => self.configured_rps(source),
        }
    }

    /// (source, current rps, rate limit hits) for every source seen so far
    pub async fn get_stats(&self) -> Vec<(String, Option<u32>, u32)> {
        let sources = self.sources.read().await;

        sources
            .iter()
            .map(|(name, state)| (name.clone(), state.current_rps, state.rate_limit_count))
            .collect()
    }
}
