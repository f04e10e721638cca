//! This module contains all configuration-relevant code: loading the XML
//! backup configuration file and turning it into the validated model
//! consumed by the backup pipeline.
//!
//! Your starting point should probably be [`Configuration::load_from_path`].
//!
//! # Internals
//! The configuration structure is based on the concept of
//! unvalidated ("unresolved") and validated configuration structures.
//!
//! [`Configuration`] owns the parsed document. Each of its accessors walks the
//! relevant part of the document into an unresolved structure that simply
//! borrows the raw attribute text, and then calls its
//! [`resolve`][traits::ResolvableConfigurationWithContext::resolve] method,
//! which coerces scalars, anchors relative paths at the configuration file's
//! directory and validates the result.

#![allow(rustdoc::private_intra_doc_links)]

mod document;
mod error;
mod paths;
pub mod scalars;
mod structure;
mod traits;
mod utilities;

pub use error::{ConfigError, LoadError};
pub use paths::PathResolver;
pub use structure::*;
pub use utilities::get_default_configuration_file_path;
