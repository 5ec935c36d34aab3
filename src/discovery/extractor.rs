// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use regex::Regex;

/// Pulls hostnames under a domain out of free-form text (HTML, CSV, archives)
#[derive(Debug, Clone)]
pub struct SubdomainExtractor {
    pattern: Regex,
}

impl SubdomainExtractor {
    pub fn new(domain: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"(?i)[a-zA-Z0-9\*_.-]+\.{}",
            regex::escape(domain)
        ))?;
        Ok(Self { pattern })
    }

    /// Every match in `text`, lower-cased, in order of appearance
    pub fn extract<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
    }
}
