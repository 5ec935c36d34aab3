// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Quake Source
 * 360 Quake service search, POST-paginated with a politeness delay
 *
 * © 2026 Bountyy Oy
 */

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{decode_json, trim_base_url};
use crate::discovery::{ScrapeScope, Source, SourceState};
use crate::errors::SourceError;

const BASE_URL: &str = "https://quake.360.net";
const PAGE_SIZE: u64 = 100;
const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(10);

/// Placeholder Quake returns instead of a host for restricted accounts
const NO_PERMISSION_MARKER: &str = "暂无权限";

#[derive(Debug, Deserialize)]
struct QuakeResponse {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Vec<QuakeRecord>,
    #[serde(default)]
    meta: QuakeMeta,
}

#[derive(Debug, Default, Deserialize)]
struct QuakeRecord {
    #[serde(default)]
    service: QuakeService,
}

#[derive(Debug, Default, Deserialize)]
struct QuakeService {
    #[serde(default)]
    http: QuakeHttp,
}

#[derive(Debug, Default, Deserialize)]
struct QuakeHttp {
    #[serde(default)]
    host: String,
}

#[derive(Debug, Default, Deserialize)]
struct QuakeMeta {
    #[serde(default)]
    pagination: QuakePagination,
}

#[derive(Debug, Default, Deserialize)]
struct QuakePagination {
    #[serde(default)]
    total: u64,
}

pub struct Quake {
    state: SourceState,
    base_url: String,
    page_delay: Duration,
}

impl Quake {
    pub fn new() -> Self {
        Self {
            state: SourceState::new(),
            base_url: BASE_URL.to_string(),
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base_url(base_url);
        self
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    async fn fetch_page(
        &self,
        scope: &ScrapeScope,
        key: &str,
        start: u64,
    ) -> Result<(QuakeResponse, String), SourceError> {
        let url = format!("{}/api/v3/search/quake_service", self.base_url);
        let body = json!({
            "query": format!("domain: {}", scope.domain()),
            "latest": true,
            "start": start,
            "size": PAGE_SIZE,
        })
        .to_string();

        let response = scope
            .post(
                &url,
                &[("Content-Type", "application/json"), ("X-QuakeToken", key)],
                body,
            )
            .await?;
        let parsed: QuakeResponse = decode_json(&url, &response.body)?;
        if parsed.code != 0 {
            return Err(SourceError::upstream(self.name(), parsed.message));
        }
        Ok((parsed, response.body))
    }
}

impl Default for Quake {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for Quake {
    fn name(&self) -> &'static str {
        "quake"
    }

    fn is_default(&self) -> bool {
        true
    }

    fn has_recursive_support(&self) -> bool {
        false
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

        let mut pages = 1;
        let mut page = 1;
        while page <= pages {
            if page > 1 && !scope.pause(self.page_delay).await {
                return;
            }

            match self.fetch_page(scope, key, (page - 1) * PAGE_SIZE).await {
                Ok((parsed, body)) => {
                    let total = parsed.meta.pagination.total;
                    if page == 1 {
                        pages = total.div_ceil(PAGE_SIZE).max(1);
                    }
                    if total > 0 {
                        scope.response(&body).await;
                        for record in parsed.data {
                            let host = record.service.http.host;
                            if host.contains(NO_PERMISSION_MARKER) {
                                continue;
                            }
                            if !scope.subdomain(host).await {
                                return;
                            }
                        }
                    }
                }
                Err(e) => {
                    if !scope.page_failed(page as usize, e).await {
                        return;
                    }
                }
            }
            page += 1;
        }
    }
}
