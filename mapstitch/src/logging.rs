//! Logging setup.
//!
//! - Writes to `<log_dir>/<log_file>`, truncated at startup
//! - Mirrors everything to stdout
//! - Filter from `RUST_LOG`, `info` when unset

use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the background log writer alive. Dropping it flushes the file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Installs the global subscriber.
///
/// Creates `log_dir` if needed and clears any previous log file. Spans are
/// logged when they close, which reports the duration of instrumented
/// stages such as tile fetching.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// truncated.
pub fn init_logging(log_dir: &Path, log_file: &str) -> Result<LoggingGuard, io::Error> {
    prepare_log_file(log_dir, log_file)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_timer(LocalTime::rfc_3339())
        .with_span_events(FmtSpan::CLOSE);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_target(false)
        .compact();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn prepare_log_file(log_dir: &Path, log_file: &str) -> io::Result<()> {
    fs::create_dir_all(log_dir)?;
    fs::write(log_dir.join(log_file), "")
}

/// `~/.mapstitch/logs`, or `logs` if there is no home directory.
pub fn default_log_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".mapstitch").join("logs"))
        .unwrap_or_else(|| "logs".into())
}

pub fn default_log_file() -> &'static str {
    "mapstitch.log"
}
