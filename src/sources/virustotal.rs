// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * VirusTotal Source
 * v3 domain relationships API, paginated by opaque cursor
 *
 * © 2026 Bountyy Oy
 */

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{decode_json, trim_base_url};
use crate::discovery::{PageFailurePolicy, ScrapeScope, Source, SourceState};
use crate::errors::{NetworkError, SourceError};

const BASE_URL: &str = "https://www.virustotal.com";
const PAGE_LIMIT: u32 = 40;

/// VirusTotal subdomain response
#[derive(Debug, Deserialize)]
struct VirusTotalResponse {
    #[serde(default)]
    data: Vec<VirusTotalDomain>,
    #[serde(default)]
    meta: VirusTotalMeta,
}

#[derive(Debug, Deserialize)]
struct VirusTotalDomain {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct VirusTotalMeta {
    #[serde(default)]
    cursor: Option<String>,
}

pub struct VirusTotal {
    state: SourceState,
    base_url: String,
}

impl VirusTotal {
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

    /// Cursors are opaque base64 and must be query-encoded
    fn page_url(&self, domain: &str, cursor: Option<&str>) -> Result<String, SourceError> {
        let raw = format!("{}/api/v3/domains/{}/subdomains", self.base_url, domain);
        let mut url = Url::parse(&raw)
            .map_err(|_| SourceError::Network(NetworkError::InvalidUrl { url: raw.clone() }))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &PAGE_LIMIT.to_string());
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor);
            }
        }
        Ok(url.into())
    }

    async fn fetch(
        &self,
        scope: &ScrapeScope,
        key: &str,
        cursor: Option<&str>,
    ) -> Result<(VirusTotalResponse, String), SourceError> {
        let url = self.page_url(scope.domain(), cursor)?;
        let response = scope.get_with_headers(&url, &[("x-apikey", key)]).await?;
        let parsed = decode_json(&url, &response.body)?;
        Ok((parsed, response.body))
    }
}

impl Default for VirusTotal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for VirusTotal {
    fn name(&self) -> &'static str {
        "virustotal"
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

    /// A lost page also loses the cursor to the one after it
    fn page_failure_policy(&self) -> PageFailurePolicy {
        PageFailurePolicy::Abort
    }

    async fn scrape(&self, scope: &ScrapeScope) {
        let Some(key) = scope.api_key() else {
            return;
        };

        let mut cursor: Option<String> = None;
        let mut page = 1;
        loop {
            let (parsed, body) = match self.fetch(scope, key, cursor.as_deref()).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    scope.page_failed(page, e).await;
                    return;
                }
            };
            scope.response(&body).await;

            for domain in parsed.data {
                if !scope.subdomain(domain.id).await {
                    return;
                }
            }

            match parsed.meta.cursor.filter(|c| !c.is_empty()) {
                Some(next) => cursor = Some(next),
                None => return,
            }
            page += 1;
        }
    }
}
