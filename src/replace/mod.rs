//! Guarded commit of markup fragments into a live document.
//!
//! A placeholder element is replaced by rendering a new tree into its
//! parent, which only works when the placeholder is the parent's sole
//! element child. Otherwise the document is left untouched and a
//! diagnostic is reported.
//!
//! ```
//! use vsplice::dom::Document;
//! use vsplice::markup::MarkupMode;
//! use vsplice::replace::{CommitOutcome, Replacer};
//!
//! let mut page = Document::parse_html(
//!     r#"<body><div id="slot"><div id="x">old body</div></div></body>"#,
//! );
//! let placeholder = page.get_by_id("x").unwrap();
//!
//! let mut replacer = Replacer::new();
//! let outcome = replacer
//!     .commit(&mut page, placeholder, "<span>new body</span>", MarkupMode::Html)
//!     .unwrap();
//!
//! assert!(matches!(outcome, CommitOutcome::Committed { .. }));
//! let slot = page.get_by_id("slot").unwrap();
//! assert_eq!(page.inner_html(slot), "<span>new body</span>");
//! ```

mod registry;
mod sink;

pub use registry::{PreactReplacement, Registry, ReplacementMethod};
pub use sink::{DiagnosticSink, LogSink};

use log::{debug, warn};
use thiserror::Error;

use crate::dom::{Document, NodeId};
use crate::error::Result;
use crate::markup::{MarkupMode, MarkupParser, StandardParser};
use crate::render::{DomRenderer, Renderer};
use crate::vdom;

/// The placeholder is not the only element in its parent.
///
/// The `Display` form is the diagnostic reported to the sink.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Preact replacement: element with ID: {id}, is not the only element in its parent.")]
pub struct StructuralViolation {
    /// The placeholder's `id` attribute, empty when it has none.
    pub id: String,
}

/// Result of a commit that did not hit a parser or renderer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The tree was rendered into `mount`, the placeholder's former parent.
    Committed { mount: NodeId },
    /// Nothing was parsed or changed; the violation was reported.
    Violated(StructuralViolation),
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed { .. })
    }
}

/// Check that `placeholder` is the only element child of its parent.
///
/// Returns the parent, which becomes the renderer's mount point. Text and
/// comment siblings do not count. A placeholder without a parent element
/// fails the check.
pub fn check_sole_element(
    document: &Document,
    placeholder: NodeId,
) -> std::result::Result<NodeId, StructuralViolation> {
    let violation = || StructuralViolation {
        id: document
            .element_id(placeholder)
            .unwrap_or_default()
            .to_string(),
    };

    let parent = document.parent_element(placeholder).ok_or_else(violation)?;
    if document.element_child_count(parent) != 1 {
        return Err(violation());
    }
    Ok(parent)
}

/// Guarded commit: structure check, parse, convert, render.
pub struct Replacer<P = StandardParser, R = DomRenderer, S = LogSink> {
    parser: P,
    renderer: R,
    sink: S,
}

impl Replacer {
    /// html5ever/quick-xml parsing, arena rendering, diagnostics to `log`.
    pub fn new() -> Self {
        Self::with_parts(StandardParser, DomRenderer, LogSink)
    }
}

impl Default for Replacer {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, R, S> Replacer<P, R, S>
where
    P: MarkupParser,
    R: Renderer,
    S: DiagnosticSink,
{
    pub fn with_parts(parser: P, renderer: R, sink: S) -> Self {
        Self {
            parser,
            renderer,
            sink,
        }
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (P, R, S) {
        (self.parser, self.renderer, self.sink)
    }

    /// Replace the content of `placeholder`'s parent with `markup`.
    ///
    /// A structural violation is reported to the sink exactly once and
    /// returned as [`CommitOutcome::Violated`]; the document is not touched
    /// and the parser is never called. Parser and renderer errors are
    /// returned unchanged.
    pub fn commit(
        &mut self,
        document: &mut Document,
        placeholder: NodeId,
        markup: &str,
        mode: MarkupMode,
    ) -> Result<CommitOutcome> {
        let mount = match check_sole_element(document, placeholder) {
            Ok(mount) => mount,
            Err(violation) => {
                warn!("{mode} replacement of {placeholder:?} rejected");
                self.sink.report_error(&violation.to_string());
                return Ok(CommitOutcome::Violated(violation));
            }
        };

        let fragment = self.parser.parse(markup, mode)?;
        let tree = vdom::convert(&fragment);
        debug!(
            "{mode} fragment <{}> converted, {} element(s)",
            tree.tag,
            tree.node_count()
        );
        drop(fragment);

        self.renderer.render(tree, document, mount)?;
        Ok(CommitOutcome::Committed { mount })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::markup::ParsedFragment;
    use crate::vdom::VNode;

    const PAGE: &str = r#"<html><head></head><body><div id="p"><div id="x">old body</div></div></body></html>"#;
    const CROWDED: &str = r#"<html><head></head><body><div id="p"><div id="x">old body</div><div id="y"></div></div></body></html>"#;

    #[derive(Default)]
    struct CountingParser {
        calls: Cell<usize>,
    }

    impl MarkupParser for CountingParser {
        fn parse_html(&self, text: &str) -> Result<ParsedFragment> {
            self.calls.set(self.calls.get() + 1);
            StandardParser.parse_html(text)
        }

        fn parse_xml(&self, text: &str) -> Result<ParsedFragment> {
            self.calls.set(self.calls.get() + 1);
            StandardParser.parse_xml(text)
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        trees: Vec<VNode>,
    }

    impl Renderer for RecordingRenderer {
        fn render(&mut self, tree: VNode, document: &mut Document, mount: NodeId) -> Result<()> {
            self.trees.push(tree.clone());
            DomRenderer.render(tree, document, mount)
        }
    }

    fn replacer() -> Replacer<CountingParser, RecordingRenderer, Vec<String>> {
        Replacer::with_parts(
            CountingParser::default(),
            RecordingRenderer::default(),
            Vec::new(),
        )
    }

    #[test]
    fn test_commit_replaces_parent_content() {
        let mut page = Document::parse_html(PAGE);
        let x = page.get_by_id("x").unwrap();
        let mut replacer = replacer();

        let outcome = replacer
            .commit(&mut page, x, "<span>new body</span>", MarkupMode::Html)
            .unwrap();

        let parent = page.get_by_id("p").unwrap();
        assert_eq!(outcome, CommitOutcome::Committed { mount: parent });
        let span = page.first_element_child(parent).unwrap();
        assert_eq!(page.element_name(span).unwrap().as_ref(), "span");
        assert_eq!(page.text_content(span), "new body");
        assert!(replacer.sink().is_empty());
        assert_eq!(replacer.parser().calls.get(), 1);
        assert_eq!(replacer.renderer().trees.len(), 1);
    }

    #[test]
    fn test_sibling_element_blocks_commit() {
        let mut page = Document::parse_html(CROWDED);
        let before = page.to_html();
        let x = page.get_by_id("x").unwrap();
        let mut replacer = replacer();

        let outcome = replacer
            .commit(&mut page, x, "<span>new body</span>", MarkupMode::Html)
            .unwrap();

        assert_eq!(
            outcome,
            CommitOutcome::Violated(StructuralViolation { id: "x".to_string() })
        );
        assert_eq!(page.to_html(), before);
        assert_eq!(
            replacer.sink(),
            &vec![
                "Preact replacement: element with ID: x, is not the only element in its parent."
                    .to_string()
            ]
        );
        assert_eq!(replacer.parser().calls.get(), 0);
        assert!(replacer.renderer().trees.is_empty());
    }

    #[test]
    fn test_text_and_comment_siblings_are_allowed() {
        let mut page = Document::parse_html(
            "<body><div id=\"p\">\n  <!-- slot --><div id=\"x\">old</div>\n</div></body>",
        );
        let x = page.get_by_id("x").unwrap();

        let outcome = replacer()
            .commit(&mut page, x, "<em>new</em>", MarkupMode::Html)
            .unwrap();

        assert!(outcome.is_committed());
        let parent = page.get_by_id("p").unwrap();
        assert_eq!(page.inner_html(parent), "<em>new</em>");
    }

    #[test]
    fn test_placeholder_without_id_reports_empty_id() {
        let mut page =
            Document::parse_html("<body><div id=\"p\"><div></div><div></div></div></body>");
        let parent = page.get_by_id("p").unwrap();
        let first = page.first_element_child(parent).unwrap();
        let mut replacer = replacer();

        replacer
            .commit(&mut page, first, "<p>x</p>", MarkupMode::Html)
            .unwrap();

        assert_eq!(
            replacer.sink()[0],
            "Preact replacement: element with ID: , is not the only element in its parent."
        );
    }

    #[test]
    fn test_detached_placeholder_is_a_violation() {
        let mut page = Document::parse_html(PAGE);
        let x = page.get_by_id("x").unwrap();
        page.detach(x);

        assert_eq!(
            check_sole_element(&page, x),
            Err(StructuralViolation { id: "x".to_string() })
        );
    }

    #[test]
    fn test_parse_error_propagates_without_mutation() {
        let mut page = Document::parse_html(PAGE);
        let before = page.to_html();
        let x = page.get_by_id("x").unwrap();
        let mut replacer = replacer();

        let result = replacer.commit(&mut page, x, "<a><b></a>", MarkupMode::Xml);

        assert!(result.is_err());
        assert_eq!(page.to_html(), before);
        assert!(replacer.sink().is_empty());
        assert!(replacer.renderer().trees.is_empty());
    }

    #[test]
    fn test_xml_commit_propagates_namespace() {
        let mut page = Document::parse_html(PAGE);
        let x = page.get_by_id("x").unwrap();
        let mut replacer = replacer();

        replacer
            .commit(
                &mut page,
                x,
                r#"<svg xmlns="http://www.w3.org/2000/svg" id="x"><circle r="4"/></svg>"#,
                MarkupMode::Xml,
            )
            .unwrap();

        let tree = &replacer.renderer().trees[0];
        let circle = tree.elements().next().unwrap();
        assert_eq!(circle.prop("xmlns"), Some("http://www.w3.org/2000/svg"));

        // The new root keeps the placeholder's id, so it can be replaced again
        let svg = page.get_by_id("x").unwrap();
        assert!(check_sole_element(&page, svg).is_ok());
    }

    #[test]
    fn test_repeated_commits_on_same_slot() {
        let mut page = Document::parse_html(PAGE);
        let mut replacer = replacer();

        for round in 0..3 {
            let x = page.get_by_id("x").unwrap();
            let markup = format!(r#"<div id="x">round {round}</div>"#);
            let outcome = replacer.commit(&mut page, x, &markup, MarkupMode::Html).unwrap();
            assert!(outcome.is_committed());
        }

        let x = page.get_by_id("x").unwrap();
        assert_eq!(page.text_content(x), "round 2");
        assert_eq!(replacer.renderer().trees.len(), 3);
    }
}
