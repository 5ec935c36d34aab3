// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Registry Module
 * Catalog of available subdomain sources
 * © 2026 Bountyy Oy
 */

pub mod source_registry;

pub use source_registry::SourceRegistry;
