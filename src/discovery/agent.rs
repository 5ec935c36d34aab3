// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Enumeration Agent
 * Selects the active source set for a run, launches every source
 * concurrently and merges their event streams into one
 *
 * © 2026 Bountyy Oy
 */

use futures::stream::{select_all, SelectAll, Stream};
use std::collections::{BTreeMap, BTreeSet};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use super::session::{Session, SessionConfig};
use super::source::{Source, SourceEvent, SourceStream, Statistics};
use crate::errors::{ReconError, ReconResult};
use crate::registry::SourceRegistry;

/// Which sources take part in a run
#[derive(Debug, Clone, Default)]
pub struct SourceSelection {
    /// Explicit include list, ignored when `use_all` is set
    pub sources: Vec<String>,
    pub exclude: Vec<String>,
    pub use_all: bool,
    /// Keep only sources whose results are safe to recurse on
    pub recursive_only: bool,
}

pub struct Agent {
    /// Active set, ordered by name
    sources: BTreeMap<&'static str, Arc<dyn Source>>,
}

impl Agent {
    pub fn new(registry: &SourceRegistry, selection: &SourceSelection) -> ReconResult<Self> {
        let mut sources: BTreeMap<&'static str, Arc<dyn Source>> = BTreeMap::new();

        if selection.use_all {
            for source in registry.all() {
                sources.insert(source.name(), Arc::clone(source));
            }
        } else if !selection.sources.is_empty() {
            for requested in &selection.sources {
                match registry.get(requested) {
                    Some(source) => {
                        sources.insert(source.name(), Arc::clone(source));
                    }
                    None => warn!("There is no source with the name: {}", requested.trim()),
                }
            }
        } else {
            for source in registry.all().filter(|s| s.is_default()) {
                sources.insert(source.name(), Arc::clone(source));
            }
        }

        let excluded: BTreeSet<String> = selection
            .exclude
            .iter()
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        sources.retain(|name, _| !excluded.contains(&name.to_lowercase()));

        if selection.recursive_only {
            sources.retain(|_, source| source.has_recursive_support());
        }

        if sources.is_empty() {
            return Err(ReconError::NoSourcesSelected);
        }

        for name in sources.keys() {
            if let Some(message) = registry.standing_warning(name) {
                warn!("{}", message);
            }
        }

        debug!(
            "Selected sources: {}",
            sources.keys().copied().collect::<Vec<_>>().join(", ")
        );

        Ok(Self { sources })
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Launch every active source against `domain` and return the merged
    /// event stream. Firing `cancel`, hitting the run deadline or dropping
    /// the returned [`Enumeration`] stops all sources.
    pub fn enumerate(
        &self,
        domain: &str,
        config: &SessionConfig,
        cancel: CancellationToken,
    ) -> ReconResult<Enumeration> {
        let domain = domain.trim().trim_end_matches('.').to_lowercase();
        if domain.is_empty() {
            return Err(ReconError::Configuration(
                "Target domain must not be empty".to_string(),
            ));
        }

        let run_token = cancel.child_token();
        let session = Arc::new(Session::new(config, run_token.clone())?);

        arm_deadline(run_token.clone(), config.max_enumeration_time, domain.clone());

        for source in self.sources.values() {
            source.reset_statistics();
        }

        info!(
            "Enumerating subdomains for {} using {} sources",
            domain,
            self.sources.len()
        );

        let streams: Vec<SourceStream> = self
            .sources
            .values()
            .map(|source| {
                Arc::clone(source).run(run_token.clone(), &domain, Arc::clone(&session))
            })
            .collect();

        Ok(Enumeration {
            domain,
            merged: select_all(streams),
            run_token: run_token.clone(),
            _guard: run_token.drop_guard(),
        })
    }

    /// Per-source counters of the last run, final once its stream closed
    pub fn statistics(&self) -> BTreeMap<&'static str, Statistics> {
        self.sources
            .iter()
            .map(|(name, source)| (*name, source.statistics()))
            .collect()
    }
}

fn arm_deadline(run_token: CancellationToken, limit: std::time::Duration, domain: String) {
    if limit.is_zero() {
        return;
    }
    tokio::spawn(async move {
        tokio::select! {
            _ = run_token.cancelled() => {}
            _ = tokio::time::sleep(limit) => {
                warn!(
                    "Enumeration of {} exceeded {}s, cancelling remaining sources",
                    domain,
                    limit.as_secs()
                );
                run_token.cancel();
            }
        }
    });
}

/// Merged event stream of one run. Closes once every source stream closed.
pub struct Enumeration {
    domain: String,
    merged: SelectAll<SourceStream>,
    run_token: CancellationToken,
    _guard: DropGuard,
}

impl Enumeration {
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Stop every source of this run
    pub fn cancel(&self) {
        self.run_token.cancel();
    }
}

impl Stream for Enumeration {
    type Item = SourceEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = Pin::new(&mut self.merged).poll_next(cx);
        if let Poll::Ready(None) = polled {
            // Every source finished, release the deadline task
            self.run_token.cancel();
        }
        polled
    }
}

impl std::fmt::Debug for Enumeration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enumeration")
            .field("domain", &self.domain)
            .field("remaining_sources", &self.merged.len())
            .finish()
    }
}
