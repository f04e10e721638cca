//! Command-line interface definitions for the binary.

use std::path::PathBuf;

use clap::Parser;



/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "backup-config",
    author,
    about = "Loads and validates a backup configuration file.",
    version
)]
pub struct CLIArgs {
    /// This is the path to the configuration file to use.
    /// If unspecified, this defaults to `./backup.xml`.
    #[arg(
        short = 'c',
        long = "configuration-file-path",
        help = "Path to the configuration file to use. Defaults to ./backup.xml"
    )]
    pub configuration_file_path: Option<PathBuf>,

    #[arg(
        long = "search-path",
        value_name = "DIRECTORY",
        help = "Directory to look in for a bootstrap file that does not exist next to \
                the configuration file. May be given multiple times."
    )]
    pub search_paths: Vec<PathBuf>,

    #[arg(
        long = "strict",
        help = "Reject incomplete checks and multiple cleanup configs \
                instead of dropping or overriding them."
    )]
    pub strict: bool,

    #[arg(
        long = "dump",
        help = "Print the fully resolved configuration as TOML to stdout."
    )]
    pub dump: bool,

    #[arg(
        long = "console-log-filter",
        default_value = "info",
        help = "Level filter for console output, e.g. \"debug\" or \"backup_config=trace\"."
    )]
    pub console_log_filter: String,

    #[arg(
        long = "log-file-filter",
        default_value = "debug",
        help = "Level filter for the log file, if one is written."
    )]
    pub log_file_filter: String,

    #[arg(
        long = "log-file-directory",
        help = "If specified, log output is also written to backup-config.log in this directory."
    )]
    pub log_file_directory: Option<PathBuf>,
}
