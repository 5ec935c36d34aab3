// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * RapidDNS Source
 * HTML listing scraped page by page with the subdomain extractor
 *
 * © 2026 Bountyy Oy
 */

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::trim_base_url;
use crate::discovery::{ScrapeScope, Source, SourceState};

const BASE_URL: &str = "https://rapiddns.io";

/// Upper bound on followed pages, the listing can run to thousands
const MAX_PAGES: u32 = 50;

static PAGE_LINK: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[?&]page=(\d+)").ok());

/// Highest page number linked from a listing page
fn last_page(html: &str) -> u32 {
    PAGE_LINK
        .as_ref()
        .map(|re| {
            re.captures_iter(html)
                .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse::<u32>().ok()))
                .max()
                .unwrap_or(1)
        })
        .unwrap_or(1)
}

pub struct RapidDns {
    state: SourceState,
    base_url: String,
}

impl RapidDns {
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

impl Default for RapidDns {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for RapidDns {
    fn name(&self) -> &'static str {
        "rapiddns"
    }

    fn is_default(&self) -> bool {
        false
    }

    fn has_recursive_support(&self) -> bool {
        false
    }

    fn needs_key(&self) -> bool {
        false
    }

    fn state(&self) -> &SourceState {
        &self.state
    }

    async fn scrape(&self, scope: &ScrapeScope) {
        let mut pages = 1;
        let mut page = 1;
        while page <= pages {
            let url = format!(
                "{}/subdomain/{}?page={}&full=1",
                self.base_url,
                scope.domain(),
                page
            );

            match scope.get(&url).await {
                Ok(response) => {
                    if page == 1 {
                        pages = last_page(&response.body).clamp(1, MAX_PAGES);
                    }
                    scope.response(&response.body).await;
                    for host in scope.extract(&response.body) {
                        if !scope.subdomain(host).await {
                            return;
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
