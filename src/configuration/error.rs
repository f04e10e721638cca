use std::{
    io,
    path::{Path, PathBuf},
};

use miette::Diagnostic;
use thiserror::Error;


/// Failure to turn a configuration file into a parsed document.
///
/// Construction of a [`Configuration`][super::Configuration] is atomic:
/// when this is returned, no partially usable configuration exists.
#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("Could not read \"{}\".", .path.display())]
    #[diagnostic(
        code(backup_config::load::unreadable),
        help("Check that the file exists and is readable by the current user.")
    )]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error loading file \"{}\".\n{details}", .path.display())]
    #[diagnostic(
        code(backup_config::load::malformed),
        help("The configuration file must be a well-formed XML document.")
    )]
    Malformed { path: PathBuf, details: String },
}

impl LoadError {
    /// Path of the configuration file the error relates to.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Unreadable { path, .. } => path,
            LoadError::Malformed { path, .. } => path,
        }
    }
}


/// Logical error in a backup plan declaration.
///
/// `position` is the 1-based position of the `backup` element among its siblings.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "backup #{position} ({name:?}) requires exactly one source config, found {found}"
    )]
    #[diagnostic(code(backup_config::backup::invalid_source))]
    InvalidSource {
        position: usize,
        name: String,
        found: usize,
    },

    #[error("source of backup #{position} ({name:?}) requires a type attribute")]
    #[diagnostic(
        code(backup_config::backup::missing_source_type),
        help("Add e.g. type=\"mysql\" to the <source> element.")
    )]
    MissingSourceType { position: usize, name: String },

    #[error(
        "backup #{position} ({name:?}) requires exactly one target config, found {found}"
    )]
    #[diagnostic(code(backup_config::backup::invalid_target))]
    InvalidTarget {
        position: usize,
        name: String,
        found: usize,
    },

    #[error("backup #{position} ({name:?}) allows at most one cleanup config, found {found}")]
    #[diagnostic(
        code(backup_config::backup::multiple_cleanups),
        help("Strict validation is enabled; remove all but one <cleanup> element.")
    )]
    MultipleCleanups {
        position: usize,
        name: String,
        found: usize,
    },

    #[error(
        "check #{check_position} of backup #{position} ({name:?}) requires both type and value"
    )]
    #[diagnostic(
        code(backup_config::backup::invalid_check),
        help("Strict validation is enabled; incomplete <check> elements are rejected.")
    )]
    InvalidCheck {
        position: usize,
        name: String,
        check_position: usize,
    },
}
