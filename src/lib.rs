// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Recon Library
 * Passive subdomain enumeration engine and built-in sources
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod config;
pub mod discovery;
pub mod errors;
pub mod http_client;
pub mod rate_limiter;
pub mod registry;
pub mod reporting;
pub mod sources;

pub use discovery::{
    Agent, Enumeration, EnumerationResults, ResultCollector, Session, SessionConfig, Source,
    SourceEvent, SourceSelection, Statistics,
};
pub use errors::{ReconError, ReconResult, SourceError};
pub use registry::SourceRegistry;
