// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

mod startup;
pub use startup::startup;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use ax_storage::{LineageStore, StoreError};
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{AuthStore, PasswdError};
use crate::env::{Args, DEFAULT_PORT};
use crate::routes::AppState;

/// Daemon configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root directory (`--path`)
    pub root: PathBuf,
    /// Passphrase file
    pub passwd_path: PathBuf,
    /// Directory of lineage logs
    pub database_path: PathBuf,
    /// Lock/PID file
    pub lock_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// Log file; stderr when unset
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Resolve every path under `root`, with default host and port.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            passwd_path: root.join("passwd"),
            database_path: root.join("database"),
            lock_path: root.join("urd.pid"),
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            log_file: None,
            root,
        }
    }

    pub fn from_args(args: Args) -> Self {
        Self { host: args.host, port: args.port, log_file: args.log_file, ..Self::at(args.path) }
    }
}

/// Daemon state during operation.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub store: Arc<LineageStore>,
    pub auth: Arc<AuthStore>,
    pub start_time: Instant,
}

impl DaemonState {
    /// Shared state for the HTTP routes.
    pub fn app_state(&self) -> AppState {
        AppState { store: Arc::clone(&self.store), auth: Arc::clone(&self.auth) }
    }

    /// Remove the PID file. The lock itself is released when `self` drops.
    pub fn shutdown(&mut self) {
        info!("Shutting down urd...");
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }
        info!(uptime_secs = self.start_time.elapsed().as_secs(), "urd shutdown complete");
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Failed to acquire lock: urd already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Passphrase file error: {0}")]
    Passwd(#[from] PasswdError),

    #[error("Lineage store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
