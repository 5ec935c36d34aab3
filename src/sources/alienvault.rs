// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * AlienVault OTX Source
 * Passive DNS records of the Open Threat Exchange
 *
 * © 2026 Bountyy Oy
 */

use async_trait::async_trait;
use serde::Deserialize;

use super::{decode_json, trim_base_url};
use crate::discovery::{ScrapeScope, Source, SourceState};
use crate::errors::SourceError;

const BASE_URL: &str = "https://otx.alienvault.com";

#[derive(Debug, Deserialize)]
struct PassiveDnsResponse {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    passive_dns: Vec<PassiveDnsRecord>,
}

#[derive(Debug, Deserialize)]
struct PassiveDnsRecord {
    hostname: String,
}

pub struct AlienVault {
    state: SourceState,
    base_url: String,
}

impl AlienVault {
    pub fn new() -> Self {
        Self {
            state: SourceState::new(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base_url(base_url);
        self
    }
}

impl Default for AlienVault {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for AlienVault {
    fn name(&self) -> &'static str {
        "alienvault"
    }

    fn is_default(&self) -> bool {
        true
    }

    fn has_recursive_support(&self) -> bool {
        true
    }

    fn needs_key(&self) -> bool {
        false
    }

    fn state(&self) -> &SourceState {
        &self.state
    }

    async fn scrape(&self, scope: &ScrapeScope) {
        let url = format!(
            "{}/api/v1/indicators/domain/{}/passive_dns",
            self.base_url,
            scope.domain()
        );

        let result = match scope.api_key() {
            Some(key) => scope.get_with_headers(&url, &[("X-OTX-API-KEY", key)]).await,
            None => scope.get(&url).await,
        };
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                scope.error(e).await;
                return;
            }
        };

        let parsed: PassiveDnsResponse = match decode_json(&url, &response.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                scope.error(e).await;
                return;
            }
        };

        if let Some(error) = parsed.error.filter(|e| !e.is_empty()) {
            let message = match parsed.detail {
                Some(detail) => format!("{}, {}", error, detail),
                None => error,
            };
            scope.error(SourceError::upstream(self.name(), message)).await;
            return;
        }
        scope.response(&response.body).await;

        for record in parsed.passive_dns {
            if !scope.subdomain(record.hostname).await {
                return;
            }
        }
    }
}
