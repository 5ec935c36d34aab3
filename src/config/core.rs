// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use crate::discovery::{SessionConfig, SourceSelection};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ReconConfig {
    #[serde(default)]
    #[validate(nested)]
    pub run: RunConfig,

    #[serde(default)]
    pub sources: SourceSettings,
}

/// Transport and timing settings of a run
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RunConfig {
    #[validate(range(min = 1, max = 3600))]
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    #[validate(range(min = 1, max = 1440))]
    #[serde(default = "default_max_enumeration_mins")]
    pub max_enumeration_mins: u64,

    #[validate(range(min = 0, max = 10))]
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Requests per second across all sources
    #[serde(default)]
    pub rate_limit: Option<u32>,

    #[serde(default)]
    pub source_rate_limits: HashMap<String, u32>,

    #[validate(url)]
    #[serde(default)]
    pub proxy: Option<String>,

    #[serde(default)]
    pub response_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout(),
            max_enumeration_mins: default_max_enumeration_mins(),
            max_retries: default_retries(),
            rate_limit: None,
            source_rate_limits: HashMap::new(),
            proxy: None,
            response_dir: None,
        }
    }
}

impl RunConfig {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            timeout: Duration::from_secs(self.request_timeout_secs),
            max_enumeration_time: Duration::from_secs(self.max_enumeration_mins * 60),
            max_retries: self.max_retries,
            global_rate_limit: self.rate_limit,
            source_rate_limits: self.source_rate_limits.clone(),
            proxy: self.proxy.clone(),
            response_dir: self.response_dir.clone(),
        }
    }
}

/// Which sources take part, as written in the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub all: bool,

    #[serde(default)]
    pub recursive: bool,
}

impl SourceSettings {
    pub fn selection(&self) -> SourceSelection {
        SourceSelection {
            sources: self.include.clone(),
            exclude: self.exclude.clone(),
            use_all: self.all,
            recursive_only: self.recursive,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_enumeration_mins() -> u64 {
    10
}

fn default_retries() -> u32 {
    1
}
