//! # vsplice
//!
//! Turn HTML or XML fragments into virtual-DOM trees and splice them into a
//! live document.
//!
//! ## Features
//!
//! - Parse fragments with html5ever (HTML) or quick-xml (XML)
//! - Convert the root element into a [`VNode`] tree, lowercasing tags and
//!   copying attributes verbatim
//! - In XML mode, stamp the root's namespace on every node as `xmlns`
//! - Replace a placeholder only when it is the sole element child of its
//!   parent, reporting a diagnostic otherwise
//!
//! ## Quick Start
//!
//! ```
//! use vsplice::{markup, vdom};
//!
//! let fragment = markup::xml::parse_fragment(
//!     r#"<svg xmlns="http://www.w3.org/2000/svg"><circle r="2"/></svg>"#,
//! )
//! .unwrap();
//! let tree = vdom::convert(&fragment);
//!
//! assert_eq!(tree.tag, "svg");
//! let circle = tree.elements().next().unwrap();
//! assert_eq!(circle.prop("xmlns"), Some("http://www.w3.org/2000/svg"));
//! ```
//!
//! ## Replacing Content
//!
//! ```
//! use vsplice::dom::Document;
//! use vsplice::replace::Registry;
//!
//! let mut page = Document::parse_html(
//!     r#"<body><main><div id="slot">loading</div></main></body>"#,
//! );
//! let slot = page.get_by_id("slot").unwrap();
//!
//! let mut methods = Registry::standard();
//! let outcome = methods
//!     .replace("preact", &mut page, slot, "<p>ready</p>")
//!     .unwrap();
//! assert!(outcome.is_committed());
//! ```

pub mod dom;
pub mod error;
pub mod markup;
pub mod render;
pub mod replace;
pub(crate) mod util;
pub mod vdom;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use dom::{Document, ElementRef, NodeId};
pub use error::{Error, Result};
pub use markup::{MarkupMode, MarkupParser, ParsedFragment, StandardParser};
pub use render::{DomRenderer, Renderer};
pub use replace::{
    CommitOutcome, DiagnosticSink, LogSink, Registry, ReplacementMethod, Replacer,
    StructuralViolation,
};
pub use vdom::{Props, VChild, VNode};
