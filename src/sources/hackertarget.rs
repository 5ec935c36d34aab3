// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use async_trait::async_trait;

use super::trim_base_url;
use crate::discovery::{ScrapeScope, Source, SourceState};
use crate::errors::SourceError;

const BASE_URL: &str = "https://api.hackertarget.com";

/// HackerTarget host search, CSV of `host,ip`
pub struct HackerTarget {
    state: SourceState,
    base_url: String,
}

impl HackerTarget {
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

impl Default for HackerTarget {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for HackerTarget {
    fn name(&self) -> &'static str {
        "hackertarget"
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
        let mut url = format!("{}/hostsearch/?q={}", self.base_url, scope.domain());
        if let Some(key) = scope.api_key() {
            url.push_str("&apikey=");
            url.push_str(key);
        }

        let response = match scope.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                scope.error(e).await;
                return;
            }
        };

        // Quota and input errors come back as 200 with a plain-text message
        let body = response.body.trim();
        if body.starts_with("error") || body.starts_with("API count exceeded") {
            scope.error(SourceError::upstream(self.name(), body)).await;
            return;
        }
        scope.response(&response.body).await;

        for line in body.lines() {
            for host in scope.extract(line) {
                if !scope.subdomain(host).await {
                    return;
                }
            }
        }
    }
}
