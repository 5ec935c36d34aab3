// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Output Writers
 * Plain host lists, host + source lists and their JSON-lines variants
 *
 * © 2026 Bountyy Oy
 */

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::discovery::EnumerationResults;

#[derive(Serialize)]
struct HostRecord<'a> {
    host: &'a str,
    input: &'a str,
    source: &'a str,
}

#[derive(Serialize)]
struct SourcesRecord<'a> {
    host: &'a str,
    input: &'a str,
    sources: Vec<&'a str>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputWriter {
    json: bool,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Open `path` for writing, creating parent directories
    pub fn create_file(&self, path: &Path, append: bool) -> Result<File> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }

        options
            .open(path)
            .with_context(|| format!("Failed to open output file {}", path.display()))
    }

    /// One host per line, or `{"host","input","source"}` per line
    pub fn write_hosts<W: Write>(&self, results: &EnumerationResults, writer: W) -> Result<()> {
        let mut writer = BufWriter::new(writer);
        for entry in results.entries() {
            if self.json {
                let record = HostRecord {
                    host: &entry.host,
                    input: &results.domain,
                    source: entry.source,
                };
                serde_json::to_writer(&mut writer, &record)?;
                writer.write_all(b"\n")?;
            } else {
                writeln!(writer, "{}", entry.host)?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// `host,[a,b]` per line, or `{"host","input","sources"}` per line
    pub fn write_sources<W: Write>(&self, results: &EnumerationResults, writer: W) -> Result<()> {
        let mut writer = BufWriter::new(writer);
        for entry in results.entries() {
            let sources: Vec<&str> = entry.sources.iter().copied().collect();
            if self.json {
                let record = SourcesRecord {
                    host: &entry.host,
                    input: &results.domain,
                    sources,
                };
                serde_json::to_writer(&mut writer, &record)?;
                writer.write_all(b"\n")?;
            } else {
                writeln!(writer, "{},[{}]", entry.host, sources.join(","))?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}
