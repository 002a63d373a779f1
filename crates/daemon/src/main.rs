// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `urd` binary: parse arguments, set up logging, serve until signalled.

use std::path::Path;

use anyhow::Context;
use ax_urd::{router, startup, Args, Config};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,tower_http=warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args(Args::parse());
    let _log_guard = init_tracing(config.log_file.as_deref())?;

    let mut daemon = startup(&config).context("failed to start urd")?;

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(daemon.app_state()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    daemon.shutdown();
    Ok(())
}

/// Install the global subscriber. With a log file, writes go through a
/// non-blocking appender whose guard must live until exit.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    let Some(path) = log_file else {
        registry.with(fmt::layer().with_target(true)).init();
        return Ok(None);
    };

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let name = path.file_name().context("log file path has no file name")?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
    registry.with(fmt::layer().with_ansi(false).with_writer(writer)).init();
    Ok(Some(guard))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
