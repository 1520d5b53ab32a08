//! Parser adapters: markup text in, a single root element out.
//!
//! HTML goes through html5ever with browser error recovery and the root is
//! the first element child of `<body>`. XML goes through quick-xml and the
//! root is the document element, reported together with its namespace URI.

pub mod html;
pub mod xml;

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::dom::{Document, ElementRef, NodeId};
use crate::error::{Error, Result};
use crate::util::{decode_text, extract_xml_encoding};

/// How a markup fragment is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MarkupMode {
    /// Loose HTML parsing, no namespace propagation.
    #[default]
    Html,
    /// Strict XML parsing, root namespace propagated to every node.
    Xml,
}

impl MarkupMode {
    /// Name of the replacement strategy that uses this mode.
    pub fn strategy_name(self) -> &'static str {
        match self {
            MarkupMode::Html => "preact",
            MarkupMode::Xml => "preact-xml",
        }
    }
}

impl fmt::Display for MarkupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkupMode::Html => f.write_str("html"),
            MarkupMode::Xml => f.write_str("xml"),
        }
    }
}

impl FromStr for MarkupMode {
    type Err = Error;

    /// Names match exactly, the same way registry lookups do.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "html" | "preact" => Ok(MarkupMode::Html),
            "xml" | "preact-xml" => Ok(MarkupMode::Xml),
            _ => Err(Error::UnknownMethod(s.to_string())),
        }
    }
}

/// A parsed fragment: its document plus the single root element to convert.
pub struct ParsedFragment {
    dom: Document,
    root: NodeId,
    namespace: Option<String>,
}

impl ParsedFragment {
    /// Wrap a parsed document. `root` must be an element of `dom`.
    pub fn new(dom: Document, root: NodeId, namespace: Option<String>) -> Result<Self> {
        if !dom.is_element(root) {
            return Err(Error::MissingElement(format!("fragment root {root:?}")));
        }
        Ok(Self {
            dom,
            root,
            namespace: namespace.filter(|ns| !ns.is_empty()),
        })
    }

    pub fn root(&self) -> ElementRef<'_> {
        ElementRef::new_unchecked(&self.dom, self.root)
    }

    /// Namespace URI of the root (XML mode only).
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn document(&self) -> &Document {
        &self.dom
    }
}

/// Parser collaborator used by the guarded commit.
pub trait MarkupParser {
    fn parse_html(&self, text: &str) -> Result<ParsedFragment>;

    fn parse_xml(&self, text: &str) -> Result<ParsedFragment>;

    fn parse(&self, text: &str, mode: MarkupMode) -> Result<ParsedFragment> {
        match mode {
            MarkupMode::Html => self.parse_html(text),
            MarkupMode::Xml => self.parse_xml(text),
        }
    }
}

/// html5ever for HTML, quick-xml for XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardParser;

impl StandardParser {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupParser for StandardParser {
    fn parse_html(&self, text: &str) -> Result<ParsedFragment> {
        html::parse_fragment(text)
    }

    fn parse_xml(&self, text: &str) -> Result<ParsedFragment> {
        xml::parse_fragment(text)
    }
}

impl<P: MarkupParser + ?Sized> MarkupParser for &P {
    fn parse_html(&self, text: &str) -> Result<ParsedFragment> {
        (**self).parse_html(text)
    }

    fn parse_xml(&self, text: &str) -> Result<ParsedFragment> {
        (**self).parse_xml(text)
    }
}

/// Decode fragment bytes received off the wire.
///
/// UTF-8 first, then the encoding named in an `<?xml encoding=...?>`
/// declaration, then Windows-1252.
pub fn decode_markup(bytes: &[u8]) -> Cow<'_, str> {
    decode_text(bytes, extract_xml_encoding(bytes))
}

/// Read a markup file, decoding it like [`decode_markup`].
pub fn read_markup(path: impl AsRef<Path>) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(decode_markup(&bytes).into_owned())
}
