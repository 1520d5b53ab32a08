//! HTML parsing through html5ever.

use html5ever::driver::ParseOpts;
use html5ever::parse_document as html5ever_parse_document;
use html5ever::tendril::TendrilSink;

use crate::dom::Document;
use crate::dom::tree_sink::DomSink;
use crate::error::{Error, Result};

use super::ParsedFragment;

/// Parse a full HTML document, recovering from errors like a browser does.
pub fn parse_document(html: &str) -> Document {
    html5ever_parse_document(DomSink::new(), ParseOpts::default())
        .one(html)
        .into_dom()
}

/// Parse an HTML fragment and isolate the first element child of `<body>`.
///
/// Content html5ever hoists out of the body (`<title>`, `<meta>`, ...) is
/// not visible here, matching what a browser's `DOMParser` yields.
pub fn parse_fragment(html: &str) -> Result<ParsedFragment> {
    let dom = parse_document(html);
    let root = dom
        .body()
        .and_then(|body| dom.first_element_child(body))
        .ok_or_else(|| Error::MissingElement("element in HTML fragment body".to_string()))?;
    ParsedFragment::new(dom, root, None)
}

impl Document {
    /// Parse an HTML page into a document.
    pub fn parse_html(html: &str) -> Self {
        parse_document(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_root_is_first_body_element() {
        let fragment = parse_fragment("<span>new body</span>").unwrap();

        let root = fragment.root();
        assert_eq!(root.tag_name(), "span");
        assert_eq!(fragment.namespace(), None);
    }

    #[test]
    fn test_leading_text_is_skipped_for_root() {
        let fragment = parse_fragment("  stray <p>para</p><p>second</p>").unwrap();

        assert_eq!(fragment.root().tag_name(), "p");
        assert_eq!(fragment.document().text_content(fragment.root().id()), "para");
    }

    #[test]
    fn test_empty_fragment_is_missing_element() {
        assert!(matches!(
            parse_fragment("just text"),
            Err(Error::MissingElement(_))
        ));
        assert!(matches!(
            parse_fragment("<title>head only</title>"),
            Err(Error::MissingElement(_))
        ));
    }

    #[test]
    fn test_inline_svg_keeps_foreign_namespace() {
        let fragment =
            parse_fragment(r#"<svg viewBox="0 0 10 10"><circle r="4"/></svg>"#).unwrap();

        assert_eq!(fragment.root().namespace_uri(), Some("http://www.w3.org/2000/svg"));
        // HTML mode never reports a fragment namespace
        assert_eq!(fragment.namespace(), None);
    }
}
