// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Sources Module
 * Built-in passive subdomain sources, one adapter per upstream
 *
 * © 2026 Bountyy Oy
 */

pub mod alienvault;
pub mod anubis;
pub mod certspotter;
pub mod crtsh;
pub mod fofa;
pub mod hackertarget;
pub mod hunter;
pub mod quake;
pub mod rapiddns;
pub mod securitytrails;
pub mod virustotal;
pub mod waybackarchive;

use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::discovery::Source;
use crate::errors::SourceError;

pub use alienvault::AlienVault;
pub use anubis::Anubis;
pub use certspotter::CertSpotter;
pub use crtsh::Crtsh;
pub use fofa::Fofa;
pub use hackertarget::HackerTarget;
pub use hunter::Hunter;
pub use quake::Quake;
pub use rapiddns::RapidDns;
pub use securitytrails::SecurityTrails;
pub use virustotal::VirusTotal;
pub use waybackarchive::WaybackArchive;

/// Every built-in source with its production endpoint
pub fn all_sources() -> Vec<Arc<dyn Source>> {
    vec![
        Arc::new(AlienVault::new()),
        Arc::new(Anubis::new()),
        Arc::new(CertSpotter::new()),
        Arc::new(Crtsh::new()),
        Arc::new(Fofa::new()),
        Arc::new(HackerTarget::new()),
        Arc::new(Hunter::new()),
        Arc::new(Quake::new()),
        Arc::new(RapidDns::new()),
        Arc::new(SecurityTrails::new()),
        Arc::new(VirusTotal::new()),
        Arc::new(WaybackArchive::new()),
    ]
}

/// Decode a JSON body, attributing failures to `url`
pub(crate) fn decode_json<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::malformed(url, e))
}

pub(crate) fn trim_base_url(url: impl Into<String>) -> String {
    url.into().trim_end_matches('/').to_string()
}
