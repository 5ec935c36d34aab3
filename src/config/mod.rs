// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod core;
pub mod loader;
pub mod providers;
pub mod validation;

pub use core::{ReconConfig, RunConfig, SourceSettings};
pub use loader::{apply_env_overrides, load_from_env, ConfigFormat, ConfigLoader};
pub use providers::ProviderKeys;
pub use validation::{ConfigValidator, ValidationReport};
