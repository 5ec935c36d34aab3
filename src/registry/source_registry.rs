// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Source Registry
 * Immutable catalog of every available subdomain source, indexed by
 * lower-cased name
 * © 2026 Bountyy Oy
 */

use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::discovery::Source;
use crate::errors::{ReconError, ReconResult};
use crate::sources;

/// Standing notices about unstable or deprecated upstreams, logged whenever
/// the source is selected for a run
static SOURCE_WARNINGS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            "anubis",
            "anubis: upstream availability is intermittent, results may be incomplete",
        ),
        (
            "waybackarchive",
            "waybackarchive: large domains can take several minutes to download",
        ),
    ])
});

pub struct SourceRegistry {
    sources: BTreeMap<String, Arc<dyn Source>>,
}

impl SourceRegistry {
    /// Build a registry, rejecting duplicate names (case-insensitive)
    pub fn new(sources: Vec<Arc<dyn Source>>) -> ReconResult<Self> {
        let mut index = BTreeMap::new();
        for source in sources {
            let key = source.name().to_lowercase();
            if index.contains_key(&key) {
                return Err(ReconError::DuplicateSource(key));
            }
            index.insert(key, source);
        }
        Ok(Self { sources: index })
    }

    /// Registry holding every built-in source
    pub fn with_default_sources() -> ReconResult<Self> {
        Self::new(sources::all_sources())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Source>> {
        self.sources.get(&name.trim().to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Every source, ordered by name
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn Source>> {
        self.sources.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn standing_warning(&self, name: &str) -> Option<&'static str> {
        SOURCE_WARNINGS.get(name.to_lowercase().as_str()).copied()
    }
}
