// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use async_trait::async_trait;

use super::trim_base_url;
use crate::discovery::{ScrapeScope, Source, SourceState};

const BASE_URL: &str = "http://web.archive.org";

/// Wayback Machine CDX index, one archived URL per line
pub struct WaybackArchive {
    state: SourceState,
    base_url: String,
}

impl WaybackArchive {
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

impl Default for WaybackArchive {
    fn default() -> Self {
        Self::new()
    }
}

/// Archived URLs are often percent-encoded (`%2F`, `%3A`); decode before matching
fn decode_line(line: &str) -> String {
    url::form_urlencoded::parse(line.as_bytes())
        .map(|(k, v)| if v.is_empty() { k.into_owned() } else { format!("{}={}", k, v) })
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait]
impl Source for WaybackArchive {
    fn name(&self) -> &'static str {
        "waybackarchive"
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
        let url = format!(
            "{}/cdx/search/cdx?url=*.{}/*&output=txt&fl=original&collapse=urlkey",
            self.base_url,
            scope.domain()
        );

        let response = match scope.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                scope.error(e).await;
                return;
            }
        };
        scope.response(&response.body).await;

        for line in response.body.lines() {
            for host in scope.extract(&decode_line(line)) {
                if !scope.subdomain(host).await {
                    return;
                }
            }
        }
    }
}
