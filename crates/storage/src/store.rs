// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lineage store: per-key, timestamp-versioned records backed by
//! append-only log files.

use crate::codec::{encode_line, parse_line, ParseError};
use ax_core::{
    AddStatus, Clock, LineageKey, LineageRecord, SystemClock, Timestamp, ValidationError,
};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::ops::Bound;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Extension of per-automation log files
pub const LOG_EXTENSION: &str = "urd";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("corrupt log {}:{line}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: ParseError,
    },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io { path: path.to_path_buf(), source }
}

type Versions = BTreeMap<Timestamp, LineageRecord>;

/// Lineage records for every `user/automation` key.
///
/// Logs live at `{root}/{user}/{automation}.urd`. `add` runs under one
/// writer lock for all keys; reads take a short shared lock on the
/// in-memory map and see the state as of their call.
pub struct LineageStore<C: Clock = SystemClock> {
    root: PathBuf,
    clock: C,
    writer: Mutex<()>,
    records: RwLock<HashMap<LineageKey, Versions>>,
}

impl LineageStore<SystemClock> {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with_clock(root, SystemClock)
    }
}

impl<C: Clock> LineageStore<C> {
    /// Open the store at `root`, creating the directory if needed, and
    /// replay every log file. Any unreadable line fails the whole open.
    pub fn open_with_clock(root: impl Into<PathBuf>, clock: C) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(io_error(&root))?;

        let mut records: HashMap<LineageKey, Versions> = HashMap::new();
        let files = log_files(&root)?;
        let mut lines = 0usize;
        for path in &files {
            let text = fs::read_to_string(path).map_err(io_error(path))?;
            for (n, line) in text.lines().enumerate() {
                let record = parse_line(line).map_err(|source| StoreError::Corrupt {
                    path: path.clone(),
                    line: n + 1,
                    source,
                })?;
                // Later lines supersede earlier ones.
                records.entry(record.key()).or_default().insert(record.timestamp.clone(), record);
                lines += 1;
            }
        }
        info!(
            root = %root.display(),
            files = files.len(),
            lines,
            keys = records.len(),
            "replayed lineage logs"
        );

        Ok(Self { root, clock, writer: Mutex::new(()), records: RwLock::new(records) })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Log file for `key`.
    pub fn log_path(&self, key: &LineageKey) -> PathBuf {
        self.root.join(&key.user).join(format!("{}.{LOG_EXTENSION}", key.automation))
    }

    /// Add a record. Identical content at the same key and timestamp is a
    /// no-op; different content is appended and supersedes the old value.
    pub fn add(&self, record: LineageRecord) -> Result<AddStatus, StoreError> {
        let _writer = self.writer.lock();
        record.validate()?;
        let key = record.key();

        let status = match self.records.read().get(&key).and_then(|v| v.get(&record.timestamp)) {
            None => AddStatus::New,
            Some(existing) if *existing == record => AddStatus::Unchanged,
            Some(_) => AddStatus::Updated,
        };
        if status == AddStatus::Unchanged {
            return Ok(status);
        }

        let line = encode_line(&record, &self.clock.now())?;
        self.append(&key, &line)?;

        info!(key = %key, timestamp = %record.timestamp, %status, "lineage record written");
        self.records.write().entry(key).or_default().insert(record.timestamp.clone(), record);
        Ok(status)
    }

    fn append(&self, key: &LineageKey, line: &str) -> Result<(), StoreError> {
        let dir = self.root.join(&key.user);
        fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        let path = self.log_path(key);
        let mut file =
            OpenOptions::new().create(true).append(true).open(&path).map_err(io_error(&path))?;
        writeln!(file, "{line}").map_err(io_error(&path))?;
        file.sync_data().map_err(io_error(&path))
    }

    pub fn get(&self, key: &LineageKey, timestamp: &Timestamp) -> Option<LineageRecord> {
        self.records.read().get(key)?.get(timestamp).cloned()
    }

    /// Records of `key` with a timestamp strictly after `timestamp`.
    pub fn since(
        &self,
        key: &LineageKey,
        timestamp: &Timestamp,
    ) -> BTreeMap<Timestamp, LineageRecord> {
        let records = self.records.read();
        let Some(versions) = records.get(key) else {
            return BTreeMap::new();
        };
        versions
            .range::<Timestamp, _>((Bound::Excluded(timestamp), Bound::Unbounded))
            .map(|(ts, r)| (ts.clone(), r.clone()))
            .collect()
    }

    pub fn latest(&self, key: &LineageKey) -> Option<LineageRecord> {
        self.records.read().get(key)?.last_key_value().map(|(_, r)| r.clone())
    }

    pub fn first(&self, key: &LineageKey) -> Option<LineageRecord> {
        self.records.read().get(key)?.first_key_value().map(|(_, r)| r.clone())
    }

    /// Known keys, sorted.
    pub fn keys(&self) -> Vec<LineageKey> {
        let mut keys: Vec<LineageKey> = self.records.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of distinct `(key, timestamp)` entries.
    pub fn len(&self) -> usize {
        self.records.read().values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `{root}/*/*.urd`, sorted by path.
fn log_files(root: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut files = Vec::new();
    for user in fs::read_dir(root).map_err(io_error(root))? {
        let user = user.map_err(io_error(root))?.path();
        if !user.is_dir() {
            continue;
        }
        for entry in fs::read_dir(&user).map_err(io_error(&user))? {
            let path = entry.map_err(io_error(&user))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == LOG_EXTENSION) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
