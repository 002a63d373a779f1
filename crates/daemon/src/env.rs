// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line arguments, each with an environment fallback.

use clap::Parser;
use std::path::PathBuf;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Parser)]
#[command(name = "urd", version, about = "Lineage store for automation runs")]
pub struct Args {
    /// Directory holding the `passwd` file and the `database` directory
    #[arg(long, env = "URD_PATH", default_value = "./")]
    pub path: PathBuf,

    /// Port to listen on
    #[arg(long, env = "URD_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Host to bind
    #[arg(long, env = "URD_HOST", default_value = "localhost")]
    pub host: String,

    /// Write logs to this file instead of stderr
    #[arg(long, env = "URD_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
