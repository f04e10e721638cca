use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use self::application::UnresolvedAppSettings;
pub use self::application::AppSettings;
use self::backup::{PlanContext, UnresolvedBackupPlan};
pub use self::backup::{
    BackupPlan,
    CheckConfig,
    CleanupConfig,
    SourceConfig,
    SyncConfig,
    TargetConfig,
};
use self::logging::UnresolvedLogSink;
pub use self::logging::LogSinkConfig;
use self::runtime::UnresolvedRuntimeSettings;
pub use self::runtime::RuntimeSettings;
use super::{
    document::{load_document, Element, RawDocument},
    error::{ConfigError, LoadError},
    paths::PathResolver,
    traits::ResolvableConfigurationWithContext,
    utilities::into_ok,
};

mod application;
mod backup;
mod logging;
mod runtime;



/// How strictly backup plans are validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Incomplete checks are dropped and, of several cleanup configs,
    /// the last one is kept.
    #[default]
    Lenient,

    /// Incomplete checks and multiple cleanup configs are errors.
    Strict,
}


/// Options controlling how a configuration file is loaded and interpreted.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Directories consulted for relative paths that may live on a search path
    /// (currently the bootstrap file) when they don't exist next to the configuration file.
    pub search_paths: Vec<PathBuf>,

    pub validation_mode: ValidationMode,
}


/// A loaded configuration file.
///
/// The document is read and parsed once on construction; every accessor
/// builds fresh records from it and may be called any number of times,
/// in any order, from any thread.
#[derive(Debug, Clone)]
pub struct Configuration {
    document: RawDocument,
    resolver: PathResolver,
    validation_mode: ValidationMode,
}


/// Every section of a [`Configuration`], resolved at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfiguration {
    pub application: AppSettings,

    pub runtime: RuntimeSettings,

    pub logging: Vec<LogSinkConfig>,

    pub backups: Vec<BackupPlan>,
}

impl ResolvedConfiguration {
    /// Render the resolved configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}


impl Configuration {
    /// Load the configuration from a specific file path, using default options.
    pub fn load_from_path<S: AsRef<Path>>(configuration_file_path: S) -> Result<Self, LoadError> {
        Self::load_from_path_with_options(configuration_file_path, LoadOptions::default())
    }

    /// Load the configuration from a specific file path.
    pub fn load_from_path_with_options<S: AsRef<Path>>(
        configuration_file_path: S,
        options: LoadOptions,
    ) -> Result<Self, LoadError> {
        let document = load_document(configuration_file_path)?;

        let resolver = PathResolver::new(document.base_directory())
            .with_search_paths(options.search_paths);

        debug!(
            file_path = %document.file_path().display(),
            validation_mode = ?options.validation_mode,
            "Configuration loaded."
        );

        Ok(Self {
            document,
            resolver,
            validation_mode: options.validation_mode,
        })
    }

    /// Canonical path of the loaded configuration file.
    pub fn file_path(&self) -> &Path {
        self.document.file_path()
    }

    /// Directory relative paths in the configuration are resolved against.
    pub fn base_directory(&self) -> &Path {
        self.resolver.base_directory()
    }

    pub fn validation_mode(&self) -> ValidationMode {
        self.validation_mode
    }

    fn root(&self) -> &Element {
        self.document.root()
    }

    /// Application settings taken from the attributes of the root element.
    pub fn app_settings(&self) -> AppSettings {
        into_ok(UnresolvedAppSettings::from_element(self.root()).resolve(&self.resolver))
    }

    /// Include paths and ini values from the `runtime` section.
    pub fn runtime_settings(&self) -> RuntimeSettings {
        into_ok(UnresolvedRuntimeSettings::from_element(self.root()).resolve(&self.resolver))
    }

    /// Reporting sinks from the `logging` section, in document order.
    pub fn logging_settings(&self) -> Vec<LogSinkConfig> {
        UnresolvedLogSink::all_from_root(self.root())
            .into_iter()
            .map(|sink| into_ok(sink.resolve(&self.resolver)))
            .collect()
    }

    /// Backup plans from the `backups` section, in document order.
    ///
    /// The first invalid plan fails the whole call; no partial list is returned.
    pub fn backup_settings(&self) -> Result<Vec<BackupPlan>, ConfigError> {
        UnresolvedBackupPlan::all_from_root(self.root())
            .into_iter()
            .enumerate()
            .map(|(index, plan)| {
                plan.resolve(PlanContext {
                    resolver: &self.resolver,
                    mode: self.validation_mode,
                    position: index + 1,
                })
            })
            .collect()
    }

    /// Resolve every section.
    pub fn resolve_all(&self) -> Result<ResolvedConfiguration, ConfigError> {
        Ok(ResolvedConfiguration {
            application: self.app_settings(),
            runtime: self.runtime_settings(),
            logging: self.logging_settings(),
            backups: self.backup_settings()?,
        })
    }
}


/// Name/value pairs of all `option` elements below `element`, in document order.
fn option_pairs(element: &Element) -> Vec<(&str, &str)> {
    element
        .descendants_named("option")
        .into_iter()
        .map(|option| {
            (
                option.attribute_or_empty("name"),
                option.attribute_or_empty("value"),
            )
        })
        .collect()
}
