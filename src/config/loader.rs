// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::core::ReconConfig;
use super::validation::ConfigValidator;

pub const ENV_TIMEOUT: &str = "LONKERO_TIMEOUT";
pub const ENV_MAX_TIME: &str = "LONKERO_MAX_TIME";
pub const ENV_RATE_LIMIT: &str = "LONKERO_RATE_LIMIT";
pub const ENV_RESPONSE_DIR: &str = "LONKERO_RESPONSE_DIR";

pub struct ConfigLoader {
    config_path: PathBuf,
    format: ConfigFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    pub fn parse(&self, content: &str) -> Result<ReconConfig> {
        let config = match self {
            ConfigFormat::Yaml => serde_yaml::from_str(content).context("Failed to parse YAML config")?,
            ConfigFormat::Toml => toml::from_str(content).context("Failed to parse TOML config")?,
            ConfigFormat::Json => serde_json::from_str(content).context("Failed to parse JSON config")?,
        };
        Ok(config)
    }
}

impl ConfigLoader {
    pub fn new<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref().to_path_buf();
        let format = Self::detect_format(&path)?;

        Ok(Self {
            config_path: path,
            format,
        })
    }

    pub fn with_format<P: AsRef<Path>>(config_path: P, format: ConfigFormat) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            format,
        }
    }

    fn detect_format(path: &Path) -> Result<ConfigFormat> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| anyhow::anyhow!("Could not determine config file format"))?;

        match extension {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(anyhow::anyhow!("Unsupported config file format: {}", extension)),
        }
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    /// Read, apply `LONKERO_*` overrides, validate
    pub fn load_config(&self) -> Result<ReconConfig> {
        let content = std::fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file: {:?}", self.config_path))?;

        let mut config = self.format.parse(&content)?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        ConfigValidator::validate_recon_config(&config)?;

        debug!("Loaded configuration from {:?}", self.config_path);
        Ok(config)
    }
}

/// Configuration from environment variables alone, on top of the defaults
pub fn load_from_env() -> Result<ReconConfig> {
    let mut config = ReconConfig::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    ConfigValidator::validate_recon_config(&config)?;
    Ok(config)
}

/// Apply overrides read through `lookup`
pub fn apply_env_overrides<F>(config: &mut ReconConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(timeout) = lookup(ENV_TIMEOUT) {
        config.run.request_timeout_secs = timeout
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}", ENV_TIMEOUT))?;
    }

    if let Some(max_time) = lookup(ENV_MAX_TIME) {
        config.run.max_enumeration_mins = max_time
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}", ENV_MAX_TIME))?;
    }

    if let Some(rate_limit) = lookup(ENV_RATE_LIMIT) {
        config.run.rate_limit = Some(
            rate_limit
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}", ENV_RATE_LIMIT))?,
        );
    }

    if let Some(dir) = lookup(ENV_RESPONSE_DIR).filter(|d| !d.trim().is_empty()) {
        config.run.response_dir = Some(PathBuf::from(dir.trim()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_detect_format() {
        assert_eq!(ConfigLoader::new("a.yml").unwrap().format(), ConfigFormat::Yaml);
        assert_eq!(ConfigLoader::new("a.toml").unwrap().format(), ConfigFormat::Toml);
        assert_eq!(ConfigLoader::new("a.json").unwrap().format(), ConfigFormat::Json);
        assert!(ConfigLoader::new("a.ini").is_err());
        assert!(ConfigLoader::new("noext").is_err());
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[run]\nrequest_timeout_secs = 12\n\n[run.source_rate_limits]\nvirustotal = 4\n\n[sources]\nall = true\n"
        )
        .unwrap();

        let config = ConfigLoader::new(file.path()).unwrap().load_config().unwrap();
        assert!(config.sources.all);
        assert_eq!(config.run.source_rate_limits.get("virustotal"), Some(&4));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_TIMEOUT, "7"),
            (ENV_MAX_TIME, "3"),
            (ENV_RATE_LIMIT, "20"),
            (ENV_RESPONSE_DIR, "/tmp/responses"),
        ]);
        let mut config = ReconConfig::default();
        apply_env_overrides(&mut config, |k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.run.request_timeout_secs, 7);
        assert_eq!(config.run.max_enumeration_mins, 3);
        assert_eq!(config.run.rate_limit, Some(20));
        assert_eq!(config.run.response_dir, Some(PathBuf::from("/tmp/responses")));
    }

    #[test]
    fn test_invalid_env_override() {
        let mut config = ReconConfig::default();
        let result = apply_env_overrides(&mut config, |k| {
            (k == ENV_TIMEOUT).then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }
}
