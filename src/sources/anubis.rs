// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use async_trait::async_trait;

use super::{decode_json, trim_base_url};
use crate::discovery::{ScrapeScope, Source, SourceState};

const BASE_URL: &str = "https://jonlu.ca";

/// Anubis-DB subdomain dump, a bare JSON array of names
pub struct Anubis {
    state: SourceState,
    base_url: String,
}

impl Anubis {
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

impl Default for Anubis {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for Anubis {
    fn name(&self) -> &'static str {
        "anubis"
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
        let url = format!("{}/anubis/subdomains/{}", self.base_url, scope.domain());

        let response = match scope.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                scope.error(e).await;
                return;
            }
        };

        let names: Vec<String> = match decode_json(&url, &response.body) {
            Ok(names) => names,
            Err(e) => {
                scope.error(e).await;
                return;
            }
        };
        scope.response(&response.body).await;

        for name in names {
            if !scope.subdomain(name).await {
                return;
            }
        }
    }
}
