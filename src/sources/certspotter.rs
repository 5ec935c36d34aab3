// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * CertSpotter Source
 * SSLMate certificate issuance API, paginated by issuance id
 *
 * © 2026 Bountyy Oy
 */

use async_trait::async_trait;
use serde::Deserialize;

use super::{decode_json, trim_base_url};
use crate::discovery::{PageFailurePolicy, ScrapeScope, Source, SourceState};
use crate::errors::SourceError;

const BASE_URL: &str = "https://api.certspotter.com";

#[derive(Debug, Deserialize)]
struct Issuance {
    id: String,
    #[serde(default)]
    dns_names: Vec<String>,
}

pub struct CertSpotter {
    state: SourceState,
    base_url: String,
}

impl CertSpotter {
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

    async fn fetch(
        &self,
        scope: &ScrapeScope,
        key: &str,
        after: Option<&str>,
    ) -> Result<(Vec<Issuance>, String), SourceError> {
        let mut url = format!(
            "{}/v1/issuances?domain={}&include_subdomains=true&expand=dns_names",
            self.base_url,
            scope.domain()
        );
        if let Some(after) = after {
            url.push_str("&after=");
            url.push_str(after);
        }

        let authorization = format!("Bearer {}", key);
        let response = scope
            .get_with_headers(&url, &[("Authorization", authorization.as_str())])
            .await?;
        let issuances = decode_json(&url, &response.body)?;
        Ok((issuances, response.body))
    }
}

impl Default for CertSpotter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for CertSpotter {
    fn name(&self) -> &'static str {
        "certspotter"
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

    /// The next page is keyed on the last id of the current one
    fn page_failure_policy(&self) -> PageFailurePolicy {
        PageFailurePolicy::Abort
    }

    async fn scrape(&self, scope: &ScrapeScope) {
        let Some(key) = scope.api_key() else {
            return;
        };

        let mut after: Option<String> = None;
        let mut page = 1;
        loop {
            let (issuances, body) = match self.fetch(scope, key, after.as_deref()).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    scope.page_failed(page, e).await;
                    return;
                }
            };
            if issuances.is_empty() {
                return;
            }
            scope.response(&body).await;

            for issuance in &issuances {
                for name in &issuance.dns_names {
                    if !scope.subdomain(name.as_str()).await {
                        return;
                    }
                }
            }

            after = issuances.last().map(|i| i.id.clone());
            page += 1;
        }
    }
}
