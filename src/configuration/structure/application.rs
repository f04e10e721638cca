use std::{convert::Infallible, path::PathBuf};

use serde::Serialize;

use crate::configuration::{
    document::Element,
    paths::PathResolver,
    scalars::to_boolean,
    traits::ResolvableConfigurationWithContext,
};


/// Attributes of the document root, exactly as written.
#[derive(Debug, Clone, Copy)]
pub(super) struct UnresolvedAppSettings<'a> {
    bootstrap: Option<&'a str>,
    verbose: Option<&'a str>,
    colors: Option<&'a str>,
}

impl<'a> UnresolvedAppSettings<'a> {
    pub(super) fn from_element(root: &'a Element) -> Self {
        Self {
            bootstrap: root.attribute("bootstrap"),
            verbose: root.attribute("verbose"),
            colors: root.attribute("colors"),
        }
    }
}


/// Application-wide settings.
///
/// Every field is `None` when the corresponding attribute is absent;
/// callers pick their own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<bool>,
}

impl AppSettings {
    /// Returns `true` if none of the settings were present.
    pub fn is_empty(&self) -> bool {
        self.bootstrap_path.is_none() && self.verbose.is_none() && self.colors.is_none()
    }
}


impl<'a> ResolvableConfigurationWithContext for UnresolvedAppSettings<'a> {
    type Context = &'a PathResolver;
    type Resolved = AppSettings;
    type Error = Infallible;

    fn resolve(self, context: Self::Context) -> Result<Self::Resolved, Self::Error> {
        Ok(AppSettings {
            bootstrap_path: self
                .bootstrap
                .map(|bootstrap| context.resolve(bootstrap, true)),
            verbose: self.verbose.map(|verbose| to_boolean(verbose, false)),
            colors: self.colors.map(|colors| to_boolean(colors, false)),
        })
    }
}
