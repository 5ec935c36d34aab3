// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use validator::Validate;

use super::core::ReconConfig;
use crate::registry::SourceRegistry;

/// Non-fatal findings about a configuration
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate_recon_config(config: &ReconConfig) -> Result<()> {
        config
            .validate()
            .context("Configuration validation failed")?;

        if config.run.rate_limit == Some(0) {
            return Err(anyhow::anyhow!("Global rate limit must be greater than 0 when set"));
        }

        for (source, rps) in &config.run.source_rate_limits {
            if source.trim().is_empty() {
                return Err(anyhow::anyhow!("Per-source rate limit has an empty source name"));
            }
            if *rps == 0 {
                return Err(anyhow::anyhow!(
                    "Rate limit for source {} must be greater than 0",
                    source
                ));
            }
        }

        Ok(())
    }

    /// Source names the registry does not know, and excludes that cancel an include
    pub fn check_sources(config: &ReconConfig, registry: &SourceRegistry) -> ValidationReport {
        let mut report = ValidationReport::default();
        let settings = &config.sources;

        let named = settings
            .include
            .iter()
            .chain(settings.exclude.iter())
            .chain(config.run.source_rate_limits.keys());
        for name in named {
            if !registry.contains(name) {
                report.warnings.push(format!("Unknown source in configuration: {}", name));
            }
        }

        for name in &settings.include {
            if settings.exclude.iter().any(|e| e.eq_ignore_ascii_case(name)) {
                report
                    .warnings
                    .push(format!("Source {} is both included and excluded", name));
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_source_rate_limit_rejected() {
        let mut config = ReconConfig::default();
        config.run.source_rate_limits.insert("crtsh".to_string(), 0);
        assert!(ConfigValidator::validate_recon_config(&config).is_err());
    }

    #[test]
    fn test_check_sources() {
        let registry = SourceRegistry::with_default_sources().unwrap();
        let mut config = ReconConfig::default();
        config.sources.include = vec!["crtsh".to_string(), "bogus".to_string()];
        config.sources.exclude = vec!["CRTSH".to_string()];

        let report = ConfigValidator::check_sources(&config, &registry);
        assert_eq!(report.warnings.len(), 2);
        assert!(!report.is_clean());
    }
}
