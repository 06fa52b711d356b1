//! Tracing setup: compact stdout output plus an optional append-only log file.
//!
//! Setting `DESKBOT_LOG_FILE` routes a second copy of the logs to that path through
//! a non-blocking writer, keeping file I/O off the request path. Filtering follows
//! `RUST_LOG` and defaults to `info`.

use std::fs::OpenOptions;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Keeps the non-blocking worker alive for the process lifetime.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global tracing subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact());

    match file_writer() {
        Some(writer) => registry
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .compact(),
            )
            .init(),
        None => registry.init(),
    }
}

fn file_writer() -> Option<NonBlocking> {
    let path = std::env::var("DESKBOT_LOG_FILE").ok()?;
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = FILE_GUARD.set(guard);
            Some(writer)
        }
        Err(err) => {
            eprintln!("failed to open log file {path}: {err}");
            None
        }
    }
}
