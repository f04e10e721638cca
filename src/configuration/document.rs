//! Reading and parsing of the XML configuration document.
//!
//! The XML is parsed once with [`roxmltree`] and then copied into an owned
//! [`Element`] tree, so the parsed document outlives the source text and can
//! be shared between threads.

use std::{
    fs,
    path::{Path, PathBuf},
};

use roxmltree::ParsingOptions;
use tracing::{debug, trace};

use super::error::LoadError;


/// Collects parser diagnostics for a single parse call.
///
/// Passed explicitly into [`parse_document`], so nothing process-wide is touched
/// while parsing.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    messages: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.messages.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// All messages in emission order, joined by newlines.
    pub fn joined(&self) -> String {
        self.messages.join("\n")
    }
}


/// An owned XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attribute_name, _)| attribute_name == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value of the given attribute, or an empty string if it is missing.
    pub fn attribute_or_empty(&self, name: &str) -> &str {
        self.attribute(name).unwrap_or("")
    }

    /// Direct child elements with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// All descendant elements (excluding `self`) with the given name, in document order.
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_descendants_named(name, &mut found);
        found
    }

    fn collect_descendants_named<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants_named(name, found);
        }
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text_content(&self) -> String {
        let mut content = String::new();
        self.collect_text(&mut content);
        content
    }

    fn collect_text(&self, content: &mut String) {
        content.push_str(&self.text);
        for child in &self.children {
            child.collect_text(content);
        }
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let mut text = String::new();
        let mut children = Vec::new();

        for child in node.children() {
            if child.is_element() {
                children.push(Element::from_node(child));
            } else if child.is_text() {
                // Order relative to child elements is not kept.
                text.push_str(child.text().unwrap_or_default());
            }
        }

        Element {
            name: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|attribute| (attribute.name().to_string(), attribute.value().to_string()))
                .collect(),
            text,
            children,
        }
    }
}


/// The parsed configuration file together with its canonical location.
#[derive(Debug, Clone)]
pub(crate) struct RawDocument {
    file_path: PathBuf,
    root: Element,
}

impl RawDocument {
    /// Canonical, absolute path of the file the document was loaded from.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Directory containing the configuration file.
    pub fn base_directory(&self) -> &Path {
        self.file_path.parent().unwrap_or(Path::new("/"))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }
}


/// Parse XML text into an owned element tree, returning the root element.
///
/// Any diagnostics are appended to `diagnostics`. `None` is returned if the
/// text is not a well-formed document.
pub(crate) fn parse_document(contents: &str, diagnostics: &mut Diagnostics) -> Option<Element> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };

    match roxmltree::Document::parse_with_options(contents, options) {
        Ok(document) => Some(Element::from_node(document.root_element())),
        Err(error) => {
            diagnostics.push(error.to_string());
            None
        }
    }
}


/// Read and parse the configuration file at `path`.
pub(crate) fn load_document<P: AsRef<Path>>(path: P) -> Result<RawDocument, LoadError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading configuration document.");

    let contents = fs::read(path).map_err(|source| LoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut diagnostics = Diagnostics::new();
    let root = match std::str::from_utf8(&contents) {
        Ok(contents) => parse_document(contents, &mut diagnostics),
        Err(error) => {
            diagnostics.push(format!("Document is not valid UTF-8: {error}"));
            None
        }
    };

    let root = match root {
        Some(root) if diagnostics.is_empty() => root,
        _ => {
            return Err(LoadError::Malformed {
                path: path.to_path_buf(),
                details: diagnostics.joined(),
            })
        }
    };

    let file_path =
        dunce::canonicalize(path).map_err(|source| LoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

    trace!(
        file_path = %file_path.display(),
        root = root.name(),
        "Configuration document parsed."
    );

    Ok(RawDocument { file_path, root })
}
