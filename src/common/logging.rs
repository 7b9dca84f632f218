//! Logging and tracing configuration
//!
//! Logs go to stderr so that stdout stays free for echoed case output and
//! JSON records. A log file next to the results can be added on request.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::paths::{self, LOG_FILE_NAME};

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("harness=debug,warn")
        } else {
            EnvFilter::new("harness=info,warn")
        }
    })
}

/// Initialize tracing for the CLI (stderr logging)
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate (DEBUG with `verbose`), WARN for dependencies.
pub fn init_cli(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Initialize tracing to stderr plus `{results_dir}/harness.log`
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for the lifetime of the program. Falls back to stderr only when the
/// results directory cannot be created.
pub fn init_with_file(results_dir: &Path, verbose: bool) -> Option<WorkerGuard> {
    if let Err(e) = paths::ensure_dir(results_dir) {
        eprintln!(
            "Warning: Could not create log directory '{}': {}",
            results_dir.display(),
            e
        );
        init_cli(verbose);
        return None;
    }

    let appender = tracing_appender::rolling::never(results_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Some(guard)
}
