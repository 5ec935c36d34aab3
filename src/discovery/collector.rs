// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Result Collector
 * Drains a merged enumeration stream into a deduplicated, source-attributed
 * host set
 *
 * © 2026 Bountyy Oy
 */

use futures::{Stream, StreamExt};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use super::source::{EventPayload, SourceEvent};

/// One unique hostname and everything that reported it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostEntry {
    pub host: String,
    /// First source that reported the host
    pub source: &'static str,
    pub sources: BTreeSet<&'static str>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EnumerationResults {
    pub domain: String,
    pub hosts: BTreeMap<String, HostEntry>,
}

impl EnumerationResults {
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HostEntry> {
        self.hosts.values()
    }
}

pub struct ResultCollector {
    domain: String,
    suffix: String,
}

impl ResultCollector {
    pub fn new(domain: &str) -> Self {
        let domain = domain.trim().trim_end_matches('.').to_lowercase();
        Self {
            suffix: format!(".{}", domain),
            domain,
        }
    }

    /// Canonical form of `raw` if it belongs to the target domain
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let mut host = raw.trim().to_lowercase();
        while let Some(stripped) = host.strip_prefix("*.") {
            host = stripped.to_string();
        }
        let host = host.trim_start_matches('.').trim_end_matches('.');

        if host == self.domain || host.ends_with(&self.suffix) {
            Some(host.to_string())
        } else {
            None
        }
    }

    /// Fold one event into `results`. Returns the host if it was new.
    pub fn absorb(&self, results: &mut EnumerationResults, event: SourceEvent) -> Option<String> {
        match event.payload {
            EventPayload::Subdomain(raw) => {
                let host = self.normalize(&raw)?;
                match results.hosts.entry(host) {
                    Entry::Occupied(mut existing) => {
                        existing.get_mut().sources.insert(event.source);
                        None
                    }
                    Entry::Vacant(slot) => {
                        let host = slot.key().clone();
                        slot.insert(HostEntry {
                            host: host.clone(),
                            source: event.source,
                            sources: BTreeSet::from([event.source]),
                        });
                        Some(host)
                    }
                }
            }
            EventPayload::Error(error) => {
                warn!("Could not run source {}: {}", event.source, error);
                None
            }
            EventPayload::Info(message) => {
                debug!("[{}] {}", event.source, message);
                None
            }
            EventPayload::Response(_) => None,
        }
    }

    pub async fn collect<S>(&self, stream: S) -> EnumerationResults
    where
        S: Stream<Item = SourceEvent>,
    {
        let mut results = EnumerationResults {
            domain: self.domain.clone(),
            hosts: BTreeMap::new(),
        };

        futures::pin_mut!(stream);
        while let Some(event) = stream.next().await {
            self.absorb(&mut results, event);
        }

        debug!("Collected {} unique hosts for {}", results.len(), self.domain);
        results
    }
}
