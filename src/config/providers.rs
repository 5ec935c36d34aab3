// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Provider Credentials
 * API keys per source from a YAML file (`source: [key, ...]`) and from
 * `LONKERO_<SOURCE>_API_KEY` environment variables
 *
 * © 2026 Bountyy Oy
 */

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::discovery::Source;
use crate::registry::SourceRegistry;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderKeys {
    keys: BTreeMap<String, Vec<String>>,
}

impl ProviderKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read provider config: {:?}", path))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: BTreeMap<String, Option<Vec<String>>> =
            serde_yaml::from_str(content).context("Failed to parse provider config")?;

        let mut keys = Self::default();
        for (source, values) in raw {
            keys.add(&source, values.unwrap_or_default());
        }
        Ok(keys)
    }

    /// Environment variable carrying comma-separated keys for `source`
    pub fn env_var_name(source: &str) -> String {
        format!("LONKERO_{}_API_KEY", source.to_uppercase())
    }

    /// Add keys from `LONKERO_<SOURCE>_API_KEY` for every registered source
    pub fn merge_env<F>(&mut self, registry: &SourceRegistry, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for name in registry.names() {
            if let Some(value) = lookup(&Self::env_var_name(name)) {
                self.add(name, value.split(',').map(str::to_string).collect());
            }
        }
    }

    pub fn add(&mut self, source: &str, keys: Vec<String>) {
        let entry = self.keys.entry(source.trim().to_lowercase()).or_default();
        for key in keys {
            let key = key.trim();
            if !key.is_empty() && !entry.iter().any(|k| k == key) {
                entry.push(key.to_string());
            }
        }
    }

    pub fn get(&self, source: &str) -> &[String] {
        self.keys
            .get(&source.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Hand keys to the registered sources. Returns how many sources got at
    /// least one key.
    pub fn apply_to(&self, registry: &SourceRegistry) -> usize {
        let mut configured = 0;
        for (name, keys) in &self.keys {
            match registry.get(name) {
                Some(source) => {
                    if !keys.is_empty() {
                        configured += 1;
                    }
                    source.add_api_keys(keys.clone());
                    debug!("Loaded {} key(s) for {}", keys.len(), name);
                }
                None => warn!("Provider config has keys for unknown source: {}", name),
            }
        }
        configured
    }

    /// Empty provider file listing every source that needs a key
    pub fn template(registry: &SourceRegistry) -> Result<String> {
        let keys: BTreeMap<&str, Vec<String>> = registry
            .all()
            .filter(|s| s.needs_key())
            .map(|s| (s.name(), Vec::new()))
            .collect();
        serde_yaml::to_string(&keys).context("Failed to render provider config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml() {
        let keys = ProviderKeys::from_yaml(
            "virustotal:\n  - key-a\n  - key-b\nHunter: [\" h1 \"]\nfofa:\n",
        )
        .unwrap();
        assert_eq!(keys.get("virustotal"), ["key-a", "key-b"]);
        assert_eq!(keys.get("hunter"), ["h1"]);
        assert!(keys.get("fofa").is_empty());
    }

    #[test]
    fn test_merge_env_and_apply() {
        let registry = SourceRegistry::with_default_sources().unwrap();
        let mut keys = ProviderKeys::new();
        keys.merge_env(&registry, |var| match var {
            "LONKERO_SECURITYTRAILS_API_KEY" => Some("st1, st2".to_string()),
            _ => None,
        });

        assert_eq!(keys.get("securitytrails"), ["st1", "st2"]);
        assert_eq!(keys.apply_to(&registry), 1);

        let source = registry.get("securitytrails").unwrap();
        assert_eq!(source.state().api_keys(), vec!["st1".to_string(), "st2".to_string()]);
    }

    #[test]
    fn test_template_lists_keyed_sources() {
        let registry = SourceRegistry::with_default_sources().unwrap();
        let template = ProviderKeys::template(&registry).unwrap();
        assert!(template.contains("hunter"));
        assert!(!template.contains("crtsh"));
    }
}
