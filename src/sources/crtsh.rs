// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * crt.sh Source
 * Certificate Transparency log search
 *
 * © 2026 Bountyy Oy
 */

use async_trait::async_trait;
use serde::Deserialize;

use super::{decode_json, trim_base_url};
use crate::discovery::{ScrapeScope, Source, SourceState};

const BASE_URL: &str = "https://crt.sh";

/// Certificate Transparency log entry
#[derive(Debug, Deserialize)]
struct CertTransparencyEntry {
    name_value: String,
}

pub struct Crtsh {
    state: SourceState,
    base_url: String,
}

impl Crtsh {
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

impl Default for Crtsh {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for Crtsh {
    fn name(&self) -> &'static str {
        "crtsh"
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
        let url = format!("{}/?q=%25.{}&output=json", self.base_url, scope.domain());

        let response = match scope.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                scope.error(e).await;
                return;
            }
        };

        let entries: Vec<CertTransparencyEntry> = match decode_json(&url, &response.body) {
            Ok(entries) => entries,
            Err(e) => {
                scope.error(e).await;
                return;
            }
        };
        scope.response(&response.body).await;

        // One certificate can carry several names, newline separated
        for entry in entries {
            for name in entry.name_value.lines() {
                if !scope.subdomain(name).await {
                    return;
                }
            }
        }
    }
}
