use std::{convert::Infallible, env::current_dir, path::PathBuf};

use miette::{miette, Context, IntoDiagnostic, Result};

/// Name of the configuration file looked up when no path is given.
pub const DEFAULT_CONFIGURATION_FILE_NAME: &str = "backup.xml";


/// Returns the default configuration filepath, which is at
/// `{current directory}/backup.xml`.
pub fn get_default_configuration_file_path() -> Result<PathBuf> {
    let mut configuration_filepath = current_dir()
        .into_diagnostic()
        .wrap_err_with(|| miette!("Could not get the current directory."))?;
    configuration_filepath.push(DEFAULT_CONFIGURATION_FILE_NAME);

    if !configuration_filepath.exists() {
        return Err(miette!(
            "Could not find {} in the current directory.",
            DEFAULT_CONFIGURATION_FILE_NAME
        ));
    }

    Ok(configuration_filepath)
}


/// Unwraps the result of a resolution that cannot fail.
pub(crate) fn into_ok<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}
