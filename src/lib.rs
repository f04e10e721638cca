//! Loading of declarative backup-plan configuration files.
//!
//! A [`Configuration`] is loaded from an XML file and hands out the
//! application settings, runtime settings, reporting sinks and backup plans
//! it declares as plain, validated records.

pub mod configuration;
pub mod logging;

pub use configuration::{
    AppSettings,
    BackupPlan,
    CheckConfig,
    CleanupConfig,
    ConfigError,
    Configuration,
    LoadError,
    LoadOptions,
    LogSinkConfig,
    ResolvedConfiguration,
    RuntimeSettings,
    SourceConfig,
    SyncConfig,
    TargetConfig,
    ValidationMode,
};
