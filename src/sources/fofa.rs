// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * FOFA Source
 * Cyberspace search engine, credentials configured as `email:key`
 *
 * © 2026 Bountyy Oy
 */

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

use super::{decode_json, trim_base_url};
use crate::discovery::{ScrapeScope, Source, SourceState};
use crate::errors::SourceError;

const BASE_URL: &str = "https://fofa.info";
const PAGE_SIZE: u32 = 10000;

#[derive(Debug, Deserialize)]
struct FofaResponse {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    errmsg: String,
    #[serde(default)]
    results: Vec<String>,
}

pub struct Fofa {
    state: SourceState,
    base_url: String,
}

impl Fofa {
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

impl Default for Fofa {
    fn default() -> Self {
        Self::new()
    }
}

/// `https://a.example.com:8443` -> `a.example.com`
fn host_of(entry: &str) -> &str {
    let entry = entry
        .strip_prefix("https://")
        .or_else(|| entry.strip_prefix("http://"))
        .unwrap_or(entry);
    let entry = entry.split('/').next().unwrap_or(entry);
    entry.split(':').next().unwrap_or(entry)
}

#[async_trait]
impl Source for Fofa {
    fn name(&self) -> &'static str {
        "fofa"
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
        let Some(credentials) = scope.api_key_pair() else {
            scope
                .error(SourceError::upstream(
                    self.name(),
                    "API key must be configured as email:key",
                ))
                .await;
            return;
        };

        let query = STANDARD.encode(format!("domain=\"{}\"", scope.domain()));
        let url = format!(
            "{}/api/v1/search/all?full=true&fields=host&page=1&size={}&email={}&key={}&qbase64={}",
            self.base_url, PAGE_SIZE, credentials.username, credentials.secret, query
        );

        let response = match scope.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                scope.error(e).await;
                return;
            }
        };

        let parsed: FofaResponse = match decode_json(&url, &response.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                scope.error(e).await;
                return;
            }
        };
        if parsed.error {
            scope.error(SourceError::upstream(self.name(), parsed.errmsg)).await;
            return;
        }
        scope.response(&response.body).await;

        for entry in &parsed.results {
            if !scope.subdomain(host_of(entry)).await {
                return;
            }
        }
    }
}
