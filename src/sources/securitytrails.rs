// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use async_trait::async_trait;
use serde::Deserialize;

use super::{decode_json, trim_base_url};
use crate::discovery::{ScrapeScope, Source, SourceState};

const BASE_URL: &str = "https://api.securitytrails.com";

/// SecurityTrails subdomain response, labels relative to the queried domain
#[derive(Debug, Deserialize)]
struct SecurityTrailsResponse {
    #[serde(default)]
    subdomains: Vec<String>,
}

pub struct SecurityTrails {
    state: SourceState,
    base_url: String,
}

impl SecurityTrails {
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

impl Default for SecurityTrails {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for SecurityTrails {
    fn name(&self) -> &'static str {
        "securitytrails"
    }

    fn is_default(&self) -> bool {
        true
    }

    fn has_recursive_support(&self) -> bool {
        true
    }

    fn needs_key(&self) -> bool {
        true
    }

    fn state(&self) -> &SourceState {
        &self.state
    }

    async fn scrape(&self, scope: &ScrapeScope) {
        let Some(key) = scope.api_key() else {
            return;
        };
        let url = format!(
            "{}/v1/domain/{}/subdomains?children_only=false",
            self.base_url,
            scope.domain()
        );

        let response = match scope
            .get_with_headers(&url, &[("APIKEY", key), ("Accept", "application/json")])
            .await
        {
            Ok(response) => response,
            Err(e) => {
                scope.error(e).await;
                return;
            }
        };

        let parsed: SecurityTrailsResponse = match decode_json(&url, &response.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                scope.error(e).await;
                return;
            }
        };
        scope.response(&response.body).await;

        for label in parsed.subdomains {
            let label = label.trim_end_matches('.');
            if label.is_empty() {
                continue;
            }
            if !scope.subdomain(format!("{}.{}", label, scope.domain())).await {
                return;
            }
        }
    }
}
