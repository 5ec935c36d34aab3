// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Response Archive
 * Append-only capture of raw source responses, one JSON line per response
 * in `<dir>/<source>.json`
 *
 * © 2026 Bountyy Oy
 */

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::errors::{ReconError, ReconResult};

pub struct ResponseArchive {
    dir: PathBuf,
    /// One write lock per source file
    file_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ResponseArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, source: &str) -> PathBuf {
        self.dir.join(format!("{}.json", source))
    }

    fn lock_for(&self, source: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.file_locks.lock();
        Arc::clone(locks.entry(source.to_string()).or_default())
    }

    /// Append one response for `source`
    pub async fn append(&self, source: &str, body: &str) -> ReconResult<()> {
        if source.is_empty() || body.trim().is_empty() {
            return Ok(());
        }

        let path = self.path_for(source);
        let archive_error = |e: std::io::Error| ReconError::Archive {
            path: path.clone(),
            reason: e.to_string(),
        };

        let lock = self.lock_for(source);
        let _guard = lock.lock().await;

        tokio::fs::create_dir_all(&self.dir).await.map_err(archive_error)?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(archive_error)?;

        let mut line = record_line(body);
        line.push('\n');
        file.write_all(line.as_bytes()).await.map_err(archive_error)?;
        file.flush().await.map_err(archive_error)?;

        debug!("Archived {} byte response for {}", body.len(), source);
        Ok(())
    }

    /// Best-effort variant, failures are logged and swallowed
    pub async fn record(&self, source: &str, body: &str) {
        if let Err(e) = self.append(source, body).await {
            warn!("Could not archive response for {}: {}", source, e);
        }
    }
}

/// JSON bodies are compacted onto one line, anything else becomes a JSON string
fn record_line(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value.to_string(),
        Err(_) => serde_json::Value::String(body.to_string()).to_string(),
    }
}
