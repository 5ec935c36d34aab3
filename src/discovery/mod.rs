// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Discovery Module
 * Multi-source passive subdomain enumeration: source contract, execution
 * session, orchestration and result collection
 *
 * © 2026 Bountyy Oy
 */
pub mod agent;
pub mod archive;
pub mod collector;
pub mod extractor;
pub mod keys;
pub mod session;
pub mod source;

pub use agent::{Agent, Enumeration, SourceSelection};
pub use archive::ResponseArchive;
pub use collector::{EnumerationResults, HostEntry, ResultCollector};
pub use extractor::SubdomainExtractor;
pub use keys::KeyPair;
pub use session::{Session, SessionConfig, DEFAULT_MAX_ENUMERATION_TIME, DEFAULT_TIMEOUT};
pub use source::{
    EventKind, EventPayload, PageFailurePolicy, ScrapeScope, Source, SourceEvent, SourceState,
    SourceStream, Statistics,
};
