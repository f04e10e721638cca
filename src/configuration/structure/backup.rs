use std::{collections::BTreeMap, convert::Infallible, path::PathBuf, time::Duration};

use serde::Serialize;
use tracing::{debug, trace};

use super::{option_pairs, ValidationMode};
use crate::configuration::{
    document::Element,
    error::ConfigError,
    paths::PathResolver,
    scalars::{to_boolean, to_bytes, to_duration, to_key_value_map},
    traits::{ResolvableConfiguration, ResolvableConfigurationWithContext},
    utilities::into_ok,
};


/*
 * Unresolved structures, borrowed straight from the document.
 */

#[derive(Debug, Clone)]
struct UnresolvedSource<'a> {
    source_type: &'a str,
    options: Vec<(&'a str, &'a str)>,
}

#[derive(Debug, Clone)]
struct UnresolvedTarget<'a> {
    dirname: &'a str,
    filename: &'a str,
    compress: &'a str,
}

#[derive(Debug, Clone, Copy)]
struct UnresolvedCheck<'a> {
    check_type: &'a str,
    value: &'a str,
}

#[derive(Debug, Clone)]
struct UnresolvedSync<'a> {
    sync_type: &'a str,
    skip_on_check_fail: Option<&'a str>,
    options: Vec<(&'a str, &'a str)>,
}

#[derive(Debug, Clone)]
struct UnresolvedCleanup<'a> {
    cleanup_type: &'a str,
    skip_on_check_fail: Option<&'a str>,
    skip_on_sync_fail: Option<&'a str>,
    options: Vec<(&'a str, &'a str)>,
}

/// A single `backup` element. Parts are collected from all descendants,
/// so cardinality is only checked on resolution.
#[derive(Debug, Clone)]
pub(super) struct UnresolvedBackupPlan<'a> {
    name: &'a str,
    stop_on_error: Option<&'a str>,
    sources: Vec<UnresolvedSource<'a>>,
    targets: Vec<UnresolvedTarget<'a>>,
    checks: Vec<UnresolvedCheck<'a>>,
    syncs: Vec<UnresolvedSync<'a>>,
    cleanups: Vec<UnresolvedCleanup<'a>>,
}

impl<'a> UnresolvedBackupPlan<'a> {
    /// All `backups/backup` declarations below the root, in document order.
    pub(super) fn all_from_root(root: &'a Element) -> Vec<Self> {
        root.children_named("backups")
            .flat_map(|backups| backups.children_named("backup"))
            .map(Self::from_element)
            .collect()
    }

    fn from_element(backup: &'a Element) -> Self {
        let sources = backup
            .descendants_named("source")
            .into_iter()
            .map(|source| UnresolvedSource {
                source_type: source.attribute_or_empty("type"),
                options: option_pairs(source),
            })
            .collect();

        let targets = backup
            .descendants_named("target")
            .into_iter()
            .map(|target| UnresolvedTarget {
                dirname: target.attribute_or_empty("dirname"),
                filename: target.attribute_or_empty("filename"),
                compress: target.attribute_or_empty("compress"),
            })
            .collect();

        let checks = backup
            .descendants_named("check")
            .into_iter()
            .map(|check| UnresolvedCheck {
                check_type: check.attribute_or_empty("type"),
                value: check.attribute_or_empty("value"),
            })
            .collect();

        let syncs = backup
            .descendants_named("sync")
            .into_iter()
            .map(|sync| UnresolvedSync {
                sync_type: sync.attribute_or_empty("type"),
                skip_on_check_fail: sync.attribute("skipOnCheckFail"),
                options: option_pairs(sync),
            })
            .collect();

        let cleanups = backup
            .descendants_named("cleanup")
            .into_iter()
            .map(|cleanup| UnresolvedCleanup {
                cleanup_type: cleanup.attribute_or_empty("type"),
                skip_on_check_fail: cleanup.attribute("skipOnCheckFail"),
                skip_on_sync_fail: cleanup.attribute("skipOnSyncFail"),
                options: option_pairs(cleanup),
            })
            .collect();

        Self {
            name: backup.attribute_or_empty("name"),
            stop_on_error: backup.attribute("stopOnError"),
            sources,
            targets,
            checks,
            syncs,
            cleanups,
        }
    }
}


/*
 * Resolved structures.
 */

/// Where the data of a backup comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceConfig {
    /// Never empty.
    #[serde(rename = "type")]
    pub source_type: String,

    pub options: BTreeMap<String, String>,
}

/// Where the backup artifact is written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetConfig {
    /// Absolute directory, or empty if none was configured.
    pub dirname: PathBuf,

    /// File name, possibly containing date placeholders for the writer to expand.
    pub filename: String,

    /// Compressor name; empty means no compression.
    pub compress: String,
}

impl TargetConfig {
    pub fn is_compressed(&self) -> bool {
        !self.compress.is_empty()
    }
}

/// A sanity check applied to the produced artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckConfig {
    #[serde(rename = "type")]
    pub check_type: String,

    pub value: String,
}

impl CheckConfig {
    /// The check value read as a byte size (e.g. `10M`), or `default` if it is not one.
    pub fn value_as_bytes(&self, default: u64) -> u64 {
        to_bytes(&self.value, default)
    }
}

/// Transfer of the artifact to a remote location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncConfig {
    #[serde(rename = "type")]
    pub sync_type: String,

    pub skip_on_check_fail: bool,

    pub options: BTreeMap<String, String>,
}

/// Retention policy applied after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupConfig {
    #[serde(rename = "type")]
    pub cleanup_type: String,

    pub skip_on_check_fail: bool,

    pub skip_on_sync_fail: bool,

    pub options: BTreeMap<String, String>,
}

impl CleanupConfig {
    /// Option `name` read as a duration (e.g. `2W`), or `default` if missing or unreadable.
    pub fn option_as_duration(&self, name: &str, default: Duration) -> Duration {
        self.options
            .get(name)
            .map_or(default, |value| to_duration(value, default))
    }

    /// Option `name` read as a byte size (e.g. `200M`), or `default` if missing or unreadable.
    pub fn option_as_bytes(&self, name: &str, default: u64) -> u64 {
        self.options
            .get(name)
            .map_or(default, |value| to_bytes(value, default))
    }
}

/// One backup plan: a source, a target, and what happens after the backup is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupPlan {
    /// May be empty.
    pub name: String,

    pub stop_on_error: bool,

    pub source: SourceConfig,

    pub target: TargetConfig,

    pub checks: Vec<CheckConfig>,

    pub syncs: Vec<SyncConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<CleanupConfig>,
}


/*
 * Resolution.
 */

/// Context for resolving a single backup plan.
#[derive(Debug, Clone, Copy)]
pub(super) struct PlanContext<'a> {
    pub(super) resolver: &'a PathResolver,
    pub(super) mode: ValidationMode,
    /// 1-based position of the plan in the document.
    pub(super) position: usize,
}

/// A boolean attribute; absent means `default`, present is read with [`to_boolean`].
fn flag_or(attribute: Option<&str>, default: bool) -> bool {
    attribute.map_or(default, |value| to_boolean(value, default))
}

/// A source without a type.
struct MissingSourceType;

/// A check missing its type or value.
struct IncompleteCheck;

impl<'a> ResolvableConfiguration for UnresolvedSource<'a> {
    type Resolved = SourceConfig;
    type Error = MissingSourceType;

    fn resolve(self) -> Result<Self::Resolved, Self::Error> {
        if self.source_type.is_empty() {
            return Err(MissingSourceType);
        }

        Ok(SourceConfig {
            source_type: self.source_type.to_string(),
            options: to_key_value_map(self.options),
        })
    }
}

impl<'a> ResolvableConfigurationWithContext for UnresolvedTarget<'a> {
    type Context = &'a PathResolver;
    type Resolved = TargetConfig;
    type Error = Infallible;

    fn resolve(self, context: Self::Context) -> Result<Self::Resolved, Self::Error> {
        let dirname = if self.dirname.is_empty() {
            PathBuf::new()
        } else {
            context.resolve(self.dirname, false)
        };

        Ok(TargetConfig {
            dirname,
            filename: self.filename.to_string(),
            compress: self.compress.to_string(),
        })
    }
}

impl<'a> ResolvableConfiguration for UnresolvedCheck<'a> {
    type Resolved = CheckConfig;
    type Error = IncompleteCheck;

    fn resolve(self) -> Result<Self::Resolved, Self::Error> {
        if self.check_type.is_empty() || self.value.is_empty() {
            return Err(IncompleteCheck);
        }

        Ok(CheckConfig {
            check_type: self.check_type.to_string(),
            value: self.value.to_string(),
        })
    }
}

impl<'a> UnresolvedSync<'a> {
    fn into_config(self) -> SyncConfig {
        SyncConfig {
            sync_type: self.sync_type.to_string(),
            skip_on_check_fail: flag_or(self.skip_on_check_fail, true),
            options: to_key_value_map(self.options),
        }
    }
}

impl<'a> UnresolvedCleanup<'a> {
    fn into_config(self) -> CleanupConfig {
        CleanupConfig {
            cleanup_type: self.cleanup_type.to_string(),
            skip_on_check_fail: flag_or(self.skip_on_check_fail, true),
            skip_on_sync_fail: flag_or(self.skip_on_sync_fail, true),
            options: to_key_value_map(self.options),
        }
    }
}


impl<'a> ResolvableConfigurationWithContext for UnresolvedBackupPlan<'a> {
    type Context = PlanContext<'a>;
    type Resolved = BackupPlan;
    type Error = ConfigError;

    fn resolve(self, context: Self::Context) -> Result<Self::Resolved, Self::Error> {
        let position = context.position;
        let name = self.name.to_string();
        let stop_on_error = flag_or(self.stop_on_error, false);


        let source_count = self.sources.len();
        let source = match <[UnresolvedSource; 1]>::try_from(self.sources) {
            Ok([source]) => source,
            Err(_) => {
                return Err(ConfigError::InvalidSource {
                    position,
                    name,
                    found: source_count,
                })
            }
        };
        let source = source
            .resolve()
            .map_err(|MissingSourceType| ConfigError::MissingSourceType {
                position,
                name: name.clone(),
            })?;


        let target_count = self.targets.len();
        let target = match <[UnresolvedTarget; 1]>::try_from(self.targets) {
            Ok([target]) => target,
            Err(_) => {
                return Err(ConfigError::InvalidTarget {
                    position,
                    name,
                    found: target_count,
                })
            }
        };
        let target = into_ok(target.resolve(context.resolver));


        let mut checks = Vec::with_capacity(self.checks.len());
        for (index, unresolved_check) in self.checks.into_iter().enumerate() {
            match unresolved_check.resolve() {
                Ok(check) => checks.push(check),
                Err(IncompleteCheck) => match context.mode {
                    ValidationMode::Lenient => {
                        debug!(
                            backup = %name,
                            check_position = index + 1,
                            "Dropping check without type or value."
                        );
                    }
                    ValidationMode::Strict => {
                        return Err(ConfigError::InvalidCheck {
                            position,
                            name,
                            check_position: index + 1,
                        });
                    }
                },
            }
        }


        let syncs = self
            .syncs
            .into_iter()
            .map(UnresolvedSync::into_config)
            .collect::<Vec<_>>();


        let cleanup_count = self.cleanups.len();
        if cleanup_count > 1 && context.mode == ValidationMode::Strict {
            return Err(ConfigError::MultipleCleanups {
                position,
                name,
                found: cleanup_count,
            });
        }

        let mut cleanup = None;
        for unresolved_cleanup in self.cleanups {
            if let Some(replaced) = cleanup.replace(unresolved_cleanup.into_config()) {
                debug!(
                    backup = %name,
                    replaced_type = %replaced.cleanup_type,
                    "Multiple cleanup configs, keeping the last one."
                );
            }
        }


        trace!(
            backup = %name,
            checks = checks.len(),
            syncs = syncs.len(),
            has_cleanup = cleanup.is_some(),
            "Backup plan resolved."
        );

        Ok(BackupPlan {
            name,
            stop_on_error,
            source,
            target,
            checks,
            syncs,
            cleanup,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::document::{parse_document, Diagnostics};

    fn resolve_plans(xml: &str, mode: ValidationMode) -> Result<Vec<BackupPlan>, ConfigError> {
        let mut diagnostics = Diagnostics::new();
        let root = parse_document(xml, &mut diagnostics).unwrap();
        let resolver = PathResolver::new("/etc/backup");

        UnresolvedBackupPlan::all_from_root(&root)
            .into_iter()
            .enumerate()
            .map(|(index, plan)| {
                plan.resolve(PlanContext {
                    resolver: &resolver,
                    mode,
                    position: index + 1,
                })
            })
            .collect()
    }

    fn single_plan(body: &str, mode: ValidationMode) -> Result<BackupPlan, ConfigError> {
        let xml = format!("<config><backups><backup name=\"db\">{body}</backup></backups></config>");
        resolve_plans(&xml, mode).map(|mut plans| plans.remove(0))
    }

    const SOURCE_AND_TARGET: &str =
        r#"<source type="mysql" /><target dirname="dumps" filename="x.sql" />"#;

    #[test]
    fn defaults_are_applied() {
        let plan = single_plan(
            r#"<source type="mysql" /><target /><sync type="rsync" /><cleanup type="quantity" />"#,
            ValidationMode::Lenient,
        )
        .unwrap();

        assert_eq!(plan.name, "db");
        assert!(!plan.stop_on_error);
        assert_eq!(plan.target, TargetConfig::default());
        assert!(!plan.target.is_compressed());
        assert!(plan.syncs[0].skip_on_check_fail);

        let cleanup = plan.cleanup.unwrap();
        assert!(cleanup.skip_on_check_fail);
        assert!(cleanup.skip_on_sync_fail);
    }

    #[test]
    fn source_options_are_collected() {
        let plan = single_plan(
            r#"<source type="mysql">
                 <option name="databases" value="app" />
                 <option name="tables" value="" />
                 <option name="databases" value="app2" />
               </source>
               <target />"#,
            ValidationMode::Lenient,
        )
        .unwrap();

        assert_eq!(plan.source.source_type, "mysql");
        assert_eq!(plan.source.options.len(), 2);
        assert_eq!(plan.source.options["databases"], "app2");
        assert_eq!(plan.source.options["tables"], "");
    }

    #[test]
    fn missing_source_type_is_an_error() {
        let error = single_plan(r#"<source /><target />"#, ValidationMode::Lenient).unwrap_err();

        assert_eq!(
            error,
            ConfigError::MissingSourceType {
                position: 1,
                name: "db".to_string(),
            }
        );
    }

    #[test]
    fn two_targets_are_an_error() {
        let error = single_plan(
            r#"<source type="mysql" /><target /><target />"#,
            ValidationMode::Lenient,
        )
        .unwrap_err();

        assert!(matches!(error, ConfigError::InvalidTarget { found: 2, .. }));
    }

    #[test]
    fn missing_target_is_an_error() {
        let error = single_plan(r#"<source type="mysql" />"#, ValidationMode::Lenient).unwrap_err();

        assert!(matches!(error, ConfigError::InvalidTarget { found: 0, .. }));
    }

    #[test]
    fn source_is_validated_before_target() {
        let error = single_plan("", ValidationMode::Lenient).unwrap_err();

        assert!(matches!(error, ConfigError::InvalidSource { found: 0, .. }));
    }

    #[test]
    fn incomplete_checks_are_dropped_when_lenient() {
        let plan = single_plan(
            &format!(
                r#"{SOURCE_AND_TARGET}
                   <check type="SizeMin" value="" />
                   <check type="" value="10M" />
                   <check type="SizeMin" value="10M" />"#
            ),
            ValidationMode::Lenient,
        )
        .unwrap();

        assert_eq!(
            plan.checks,
            vec![CheckConfig {
                check_type: "SizeMin".to_string(),
                value: "10M".to_string(),
            }]
        );
        assert_eq!(plan.checks[0].value_as_bytes(0), 10 * 1024 * 1024);
    }

    #[test]
    fn incomplete_check_is_an_error_when_strict() {
        let error = single_plan(
            &format!(
                r#"{SOURCE_AND_TARGET}
                   <check type="SizeMin" value="10M" />
                   <check type="SizeMin" value="" />"#
            ),
            ValidationMode::Strict,
        )
        .unwrap_err();

        assert_eq!(
            error,
            ConfigError::InvalidCheck {
                position: 1,
                name: "db".to_string(),
                check_position: 2,
            }
        );
    }

    #[test]
    fn last_cleanup_wins_when_lenient() {
        let plan = single_plan(
            &format!(
                r#"{SOURCE_AND_TARGET}
                   <cleanup type="quantity"><option name="amount" value="50" /></cleanup>
                   <cleanup type="outdated" skipOnSyncFail="false">
                     <option name="older" value="2W" />
                   </cleanup>"#
            ),
            ValidationMode::Lenient,
        )
        .unwrap();

        let cleanup = plan.cleanup.unwrap();
        assert_eq!(cleanup.cleanup_type, "outdated");
        assert!(!cleanup.skip_on_sync_fail);
        assert!(!cleanup.options.contains_key("amount"));
        assert_eq!(
            cleanup.option_as_duration("older", Duration::ZERO),
            Duration::from_secs(14 * 24 * 60 * 60)
        );
        assert_eq!(cleanup.option_as_bytes("size", 5), 5);
    }

    #[test]
    fn multiple_cleanups_are_an_error_when_strict() {
        let error = single_plan(
            &format!(r#"{SOURCE_AND_TARGET}<cleanup type="a" /><cleanup type="b" />"#),
            ValidationMode::Strict,
        )
        .unwrap_err();

        assert!(matches!(error, ConfigError::MultipleCleanups { found: 2, .. }));
    }

    #[test]
    fn single_cleanup_is_fine_when_strict() {
        let plan = single_plan(
            &format!(r#"{SOURCE_AND_TARGET}<cleanup type="capacity" />"#),
            ValidationMode::Strict,
        )
        .unwrap();

        assert_eq!(plan.cleanup.unwrap().cleanup_type, "capacity");
    }

    #[test]
    fn sync_flags_and_options() {
        let plan = single_plan(
            &format!(
                r#"{SOURCE_AND_TARGET}
                   <sync type="rsync" skipOnCheckFail="false">
                     <option name="host" value="backup.example.com" />
                   </sync>
                   <sync type="sftp" skipOnCheckFail="garbage" />"#
            ),
            ValidationMode::Lenient,
        )
        .unwrap();

        assert_eq!(plan.syncs.len(), 2);
        assert_eq!(plan.syncs[0].sync_type, "rsync");
        assert!(!plan.syncs[0].skip_on_check_fail);
        assert_eq!(plan.syncs[0].options["host"], "backup.example.com");
        assert_eq!(plan.syncs[1].sync_type, "sftp");
        assert!(plan.syncs[1].skip_on_check_fail);
        assert!(plan.syncs[1].options.is_empty());
    }

    #[test]
    fn error_position_refers_to_failing_plan() {
        let xml = format!(
            r#"<config><backups>
                 <backup name="ok">{SOURCE_AND_TARGET}</backup>
                 <backup name="broken"><target /></backup>
               </backups></config>"#
        );

        let error = resolve_plans(&xml, ValidationMode::Lenient).unwrap_err();

        assert_eq!(
            error,
            ConfigError::InvalidSource {
                position: 2,
                name: "broken".to_string(),
                found: 0,
            }
        );
    }

    #[test]
    fn absent_flags_use_their_defaults() {
        let plan = single_plan(
            r#"<source type="mysql" /><target /><sync type="rsync" /><cleanup type="q" />"#,
            ValidationMode::Lenient,
        )
        .unwrap();

        assert!(!plan.stop_on_error);
        assert!(plan.syncs[0].skip_on_check_fail);

        let cleanup = plan.cleanup.unwrap();
        assert!(cleanup.skip_on_check_fail);
        assert!(cleanup.skip_on_sync_fail);
    }

    #[test]
    fn present_flags_are_coerced() {
        let xml = r#"<config><backups><backup stopOnError="yes">
                       <source type="mysql" /><target />
                       <sync type="rsync" skipOnCheckFail="" />
                       <cleanup type="q" skipOnCheckFail="off" skipOnSyncFail="unknown" />
                     </backup></backups></config>"#;

        let plan = resolve_plans(xml, ValidationMode::Lenient).unwrap().remove(0);

        assert!(plan.stop_on_error);
        assert!(!plan.syncs[0].skip_on_check_fail);

        let cleanup = plan.cleanup.unwrap();
        assert!(!cleanup.skip_on_check_fail);
        assert!(cleanup.skip_on_sync_fail);
    }
}
