//! Tracing configuration and log routing.
//!
//! Both binaries write a compact console stream and mirror it into a log file. When
//! `DOCCHAT_LOG_FILE` is set, logs are appended to that path; otherwise they go to
//! `logs/docchat.log`. The file writer is non‑blocking so OCR-heavy uploads never stall on disk.
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_ENV: &str = "DOCCHAT_LOG_FILE";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "docchat.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Where console log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Console {
    /// Server mode: logs share stdout with nothing else.
    Stdout,
    /// CLI mode: stdout carries the answer, so logs go to stderr.
    Stderr,
}

/// Configure tracing subscribers for the console and the log file.
///
/// - Respects `RUST_LOG` for filtering (defaults to `info` for the server, `warn` for the CLI).
/// - Installs a compact console layer and, when available, a file layer.
/// - Uses a global guard to keep the non‑blocking writer alive for the process lifetime.
pub fn init_tracing(console: Console) {
    let default_directive = match console {
        Console::Stdout => "info",
        Console::Stderr => "warn",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let console_layer = match console {
        Console::Stdout => fmt::layer().with_target(false).compact().boxed(),
        Console::Stderr => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .boxed(),
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if let Some(writer) = configure_file_writer() {
        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact();

        registry.with(file_layer).init();
    } else {
        registry.init();
    }
}

/// Resolve the log file location from an optional `DOCCHAT_LOG_FILE` override.
fn resolve_log_path(override_path: Option<String>) -> PathBuf {
    override_path
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR).join(DEFAULT_LOG_FILE))
}

/// Build a non‑blocking writer for file logging.
///
/// Returns `None` when the parent directory cannot be created or the file cannot be opened.
fn configure_file_writer() -> Option<NonBlocking> {
    let path = resolve_log_path(std::env::var(LOG_FILE_ENV).ok());
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {err}", parent.display());
            return None;
        }
    }

    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(non_blocking)
        }
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    }
}
