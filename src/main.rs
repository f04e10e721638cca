use backup_config::{
    configuration::get_default_configuration_file_path,
    logging::{initialize_tracing, parse_level_filter},
    Configuration,
    LoadOptions,
    ValidationMode,
};
use clap::Parser;
use miette::{Context, IntoDiagnostic, Result};
use tracing::info;

use crate::cli::CLIArgs;

mod cli;


fn main() -> Result<()> {
    let cli_args = CLIArgs::parse();

    let logging_raii_guard = initialize_tracing(
        parse_level_filter(&cli_args.console_log_filter)?,
        parse_level_filter(&cli_args.log_file_filter)?,
        cli_args.log_file_directory.as_deref(),
        "backup-config.log",
    )
    .wrap_err("Failed to initialize tracing.")?;


    let configuration_file_path = match cli_args.configuration_file_path {
        Some(path) => path,
        None => get_default_configuration_file_path()
            .wrap_err("Could not load configuration file at default path.")?,
    };
    info!("Loading configuration: {}", configuration_file_path.display());

    let load_options = LoadOptions {
        search_paths: cli_args.search_paths,
        validation_mode: if cli_args.strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        },
    };

    let configuration =
        Configuration::load_from_path_with_options(&configuration_file_path, load_options)
            .wrap_err("Failed to load configuration file.")?;

    let resolved_configuration = configuration
        .resolve_all()
        .wrap_err("Invalid backup configuration.")?;

    info!(
        "Configuration loaded: {}.",
        configuration.file_path().display()
    );


    if cli_args.dump {
        let rendered = resolved_configuration
            .to_toml_string()
            .into_diagnostic()
            .wrap_err("Failed to render configuration as TOML.")?;

        print!("{rendered}");
    } else {
        info!(
            "{} include path(s), {} ini value(s), {} log sink(s).",
            resolved_configuration.runtime.include_paths.len(),
            resolved_configuration.runtime.ini_values.len(),
            resolved_configuration.logging.len(),
        );

        for plan in &resolved_configuration.backups {
            info!(
                "Backup {:?}: {} -> {}, {} check(s), {} sync(s), cleanup: {}.",
                plan.name,
                plan.source.source_type,
                plan.target.dirname.join(&plan.target.filename).display(),
                plan.checks.len(),
                plan.syncs.len(),
                plan.cleanup
                    .as_ref()
                    .map_or("none", |cleanup| cleanup.cleanup_type.as_str()),
            );
        }
    }


    drop(logging_raii_guard);
    Ok(())
}
