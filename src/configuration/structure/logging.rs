use std::{collections::BTreeMap, convert::Infallible};

use serde::Serialize;

use super::option_pairs;
use crate::configuration::{
    document::Element,
    paths::PathResolver,
    traits::ResolvableConfigurationWithContext,
};

/// Name of the option holding a sink's output location.
const TARGET_OPTION: &str = "target";


#[derive(Debug, Clone)]
pub(super) struct UnresolvedLogSink<'a> {
    sink_type: &'a str,
    target: &'a str,
    options: Vec<(&'a str, &'a str)>,
}

impl<'a> UnresolvedLogSink<'a> {
    /// All `logging/log` declarations below the root, in document order.
    pub(super) fn all_from_root(root: &'a Element) -> Vec<Self> {
        root.children_named("logging")
            .flat_map(|logging| logging.children_named("log"))
            .map(Self::from_element)
            .collect()
    }

    fn from_element(log: &'a Element) -> Self {
        Self {
            sink_type: log.attribute_or_empty("type"),
            target: log.attribute_or_empty(TARGET_OPTION),
            options: option_pairs(log),
        }
    }
}


/// A reporting sink declaration.
///
/// The type is passed through verbatim, even if empty; it is up to the sink
/// factory to reject unknown or missing types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogSinkConfig {
    #[serde(rename = "type")]
    pub sink_type: String,

    /// Sink options. A `target` option is always an absolute path.
    pub options: BTreeMap<String, String>,
}

impl LogSinkConfig {
    pub fn target(&self) -> Option<&str> {
        self.options.get(TARGET_OPTION).map(String::as_str)
    }
}


impl<'a> ResolvableConfigurationWithContext for UnresolvedLogSink<'a> {
    type Context = &'a PathResolver;
    type Resolved = LogSinkConfig;
    type Error = Infallible;

    fn resolve(self, context: Self::Context) -> Result<Self::Resolved, Self::Error> {
        let mut options = BTreeMap::new();

        if !self.target.is_empty() {
            options.insert(
                TARGET_OPTION.to_string(),
                resolved_path_string(context, self.target),
            );
        }

        // Nested options override the attribute, and a nested target is resolved as well.
        for (name, value) in self.options {
            let value = if name == TARGET_OPTION {
                resolved_path_string(context, value)
            } else {
                value.to_string()
            };

            options.insert(name.to_string(), value);
        }

        Ok(LogSinkConfig {
            sink_type: self.sink_type.to_string(),
            options,
        })
    }
}


fn resolved_path_string(context: &PathResolver, path: &str) -> String {
    context.resolve(path, false).to_string_lossy().to_string()
}

