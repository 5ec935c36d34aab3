// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! API key selection for sources.
//!
//! Selection is uniform-random per call, so a key pool spreads load without
//! any rotation state shared between concurrently running sources.

use rand::seq::IndexedRandom;
use tracing::debug;

const MULTIPART_KEY_SEPARATOR: char = ':';

/// Pick one key uniformly at random. `None` means the source must skip.
pub fn pick_random<'a, T>(keys: &'a [T], source: &str) -> Option<&'a T> {
    let picked = keys.choose(&mut rand::rng());
    if picked.is_none() {
        debug!(
            "Cannot use the {} source because there was no API key/secret defined for it.",
            source
        );
    }
    picked
}

/// Credential made of two parts, configured as `part_a:part_b`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub username: String,
    pub secret: String,
}

impl KeyPair {
    /// Parses `username:secret`. Anything else is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(MULTIPART_KEY_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(username), Some(secret), None) if !username.is_empty() && !secret.is_empty() => {
                Some(Self {
                    username: username.to_string(),
                    secret: secret.to_string(),
                })
            }
            _ => None,
        }
    }
}

/// Parse every well-formed multi-part key, dropping the rest
pub fn key_pairs(keys: &[String]) -> Vec<KeyPair> {
    keys.iter().filter_map(|k| KeyPair::parse(k)).collect()
}
