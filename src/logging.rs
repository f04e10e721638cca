//! Tracing setup for the command-line tool.

use std::path::Path;

use miette::{miette, Context, IntoDiagnostic, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};


/// Must be kept alive for as long as file logging should work;
/// dropping it flushes the log file.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}


/// Parse a level filter (e.g. `info` or `backup_config=trace,warn`).
pub fn parse_level_filter(filter: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(filter)
        .into_diagnostic()
        .wrap_err_with(|| miette!("Invalid log level filter: {}", filter))
}


/// Initialize the global tracing subscriber.
///
/// Console output goes to stderr. If `log_file_output_directory` is given,
/// events passing `log_file_output_level_filter` are additionally written
/// to `{log_file_output_directory}/{log_file_name}`.
pub fn initialize_tracing(
    console_output_level_filter: EnvFilter,
    log_file_output_level_filter: EnvFilter,
    log_file_output_directory: Option<&Path>,
    log_file_name: &str,
) -> Result<LoggingGuard> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_output_level_filter);

    let (file_layer, file_guard) = match log_file_output_directory {
        Some(directory) => {
            std::fs::create_dir_all(directory)
                .into_diagnostic()
                .wrap_err_with(|| {
                    miette!(
                        "Failed to create log file directory at {}.",
                        directory.display()
                    )
                })?;

            let file_appender = tracing_appender::rolling::never(directory, log_file_name);
            let (non_blocking_appender, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .with_writer(non_blocking_appender)
                .with_ansi(false)
                .with_filter(log_file_output_level_filter);

            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .into_diagnostic()
        .wrap_err("Failed to install global tracing subscriber.")?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
