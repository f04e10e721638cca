use std::{collections::BTreeMap, convert::Infallible, path::PathBuf};

use serde::Serialize;

use crate::configuration::{
    document::Element,
    paths::PathResolver,
    scalars::to_key_value_map,
    traits::ResolvableConfigurationWithContext,
};


#[derive(Debug, Clone, Default)]
pub(super) struct UnresolvedRuntimeSettings<'a> {
    include_paths: Vec<String>,
    ini_entries: Vec<(&'a str, &'a str)>,
}

impl<'a> UnresolvedRuntimeSettings<'a> {
    /// Collects `runtime/includePath` and `runtime/ini` entries in document order.
    pub(super) fn from_element(root: &'a Element) -> Self {
        let mut settings = Self::default();

        for runtime in root.children_named("runtime") {
            settings.include_paths.extend(
                runtime
                    .children_named("includePath")
                    .map(Element::text_content),
            );

            settings.ini_entries.extend(runtime.children_named("ini").map(|ini| {
                (
                    ini.attribute_or_empty("name"),
                    ini.attribute_or_empty("value"),
                )
            }));
        }

        settings
    }
}


/// Settings for the environment the backup tooling runs in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeSettings {
    /// Absolute include paths, in document order. Duplicates are kept.
    pub include_paths: Vec<PathBuf>,

    /// Ini-style name/value settings. The last occurrence of a name wins.
    pub ini_values: BTreeMap<String, String>,
}


impl<'a> ResolvableConfigurationWithContext for UnresolvedRuntimeSettings<'a> {
    type Context = &'a PathResolver;
    type Resolved = RuntimeSettings;
    type Error = Infallible;

    fn resolve(self, context: Self::Context) -> Result<Self::Resolved, Self::Error> {
        let include_paths = self
            .include_paths
            .into_iter()
            .filter(|path| !path.is_empty())
            .map(|path| context.resolve(path, false))
            .collect();

        Ok(RuntimeSettings {
            include_paths,
            ini_values: to_key_value_map(self.ini_entries),
        })
    }
}
