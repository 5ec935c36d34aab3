// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Hunter Source
 * Qianxin Hunter asset search, 100 results per page with a politeness
 * delay between pages
 *
 * © 2026 Bountyy Oy
 */

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use serde::Deserialize;
use std::time::Duration;

use super::{decode_json, trim_base_url};
use crate::discovery::{ScrapeScope, Source, SourceState};
use crate::errors::SourceError;

const BASE_URL: &str = "https://hunter.qianxin.com";
const PAGE_SIZE: u64 = 100;
const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(5);

/// Application-level codes for bad key, bad query and exhausted balance
const FAILURE_CODES: [i64; 3] = [401, 400, 4024];

#[derive(Debug, Deserialize)]
struct HunterResponse {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<HunterData>,
}

#[derive(Debug, Default, Deserialize)]
struct HunterData {
    #[serde(default)]
    arr: Option<Vec<HunterAsset>>,
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct HunterAsset {
    #[serde(default)]
    domain: String,
}

pub struct Hunter {
    state: SourceState,
    base_url: String,
    page_delay: Duration,
}

impl Hunter {
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
        query: &str,
        page: u64,
    ) -> Result<(HunterData, String), SourceError> {
        let url = format!(
            "{}/openApi/search?api-key={}&search={}&page={}&page_size={}&is_web=3",
            self.base_url, key, query, page, PAGE_SIZE
        );

        let response = scope.get(&url).await?;
        let parsed: HunterResponse = decode_json(&url, &response.body)?;
        if FAILURE_CODES.contains(&parsed.code) {
            return Err(SourceError::upstream(self.name(), parsed.message));
        }
        Ok((parsed.data.unwrap_or_default(), response.body))
    }
}

impl Default for Hunter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for Hunter {
    fn name(&self) -> &'static str {
        "hunter"
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
        let query = URL_SAFE.encode(format!("domain=\"{}\"", scope.domain()));

        let mut pages = 1;
        let mut page = 1;
        while page <= pages {
            if page > 1 && !scope.pause(self.page_delay).await {
                return;
            }

            match self.fetch_page(scope, key, &query, page).await {
                Ok((data, body)) => {
                    if page == 1 {
                        pages = data.total.div_ceil(PAGE_SIZE).max(1);
                    }
                    if data.total > 0 {
                        scope.response(&body).await;
                        for asset in data.arr.unwrap_or_default() {
                            if !scope.subdomain(asset.domain).await {
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
