// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and initialization logic.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use ax_storage::LineageStore;
use fs2::FileExt;
use tracing::info;

use crate::auth::AuthStore;

use super::{Config, DaemonState, LifecycleError};

/// Start the daemon: take the instance lock, load credentials, replay logs.
pub fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    // 1. Create root directory (needed for the lock)
    std::fs::create_dir_all(&config.root)?;

    // 2. Acquire lock file FIRST so two daemons never append to the same logs.
    // Open without truncating; the running daemon's PID stays until we hold the lock.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 3. Credentials
    let auth = AuthStore::load(&config.passwd_path)?;

    // 4. Replay lineage logs (creates the database directory if absent)
    let store = LineageStore::open(&config.database_path)?;

    info!(
        root = %config.root.display(),
        users = auth.len(),
        keys = store.keys().len(),
        records = store.len(),
        "urd started"
    );

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        store: Arc::new(store),
        auth: Arc::new(auth),
        start_time: Instant::now(),
    })
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
