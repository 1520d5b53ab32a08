//! Error types for vsplice operations.

use thiserror::Error;

/// Errors that can occur while parsing, converting or rendering markup.
///
/// A placeholder that is not the only element in its parent is not an
/// error at this level; see [`crate::replace::StructuralViolation`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML escape error: {0}")]
    XmlEscape(#[from] quick_xml::escape::EscapeError),

    #[error("Malformed markup: {0}")]
    MalformedMarkup(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Unknown replacement method: {0}")]
    UnknownMethod(String),
}

pub type Result<T> = std::result::Result<T, Error>;
