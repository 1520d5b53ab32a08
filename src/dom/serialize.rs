//! Markup serialization for arena documents.

use quick_xml::escape::escape;

use super::arena::{Document, NodeData, NodeId, qualified_name};

/// HTML elements that never have an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text content is written without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Pending serialization work.
enum Step {
    /// Write a node; `raw_text` when its parent is `<script>`/`<style>`.
    Open { id: NodeId, raw_text: bool },
    /// Write an element's end tag.
    Close(NodeId),
}

impl Document {
    /// Serialize a node and its subtree.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_steps(vec![Step::Open { id, raw_text: false }], &mut out);
        out
    }

    /// Serialize the children of a node.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_steps(self.child_steps(id), &mut out);
        out
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        self.inner_html(self.document())
    }

    /// Open steps for the children of `id`, reversed for popping.
    fn child_steps(&self, id: NodeId) -> Vec<Step> {
        let raw_text = self
            .element_name(id)
            .is_some_and(|name| RAW_TEXT_ELEMENTS.contains(&name.as_ref()));
        let mut steps: Vec<Step> = self
            .children(id)
            .map(|child| Step::Open { id: child, raw_text })
            .collect();
        steps.reverse();
        steps
    }

    fn write_steps(&self, mut stack: Vec<Step>, out: &mut String) {
        while let Some(step) = stack.pop() {
            let (id, raw_text) = match step {
                Step::Close(id) => {
                    if let Some(NodeData::Element { name, .. }) = self.get(id).map(|n| &n.data) {
                        out.push_str("</");
                        out.push_str(&qualified_name(name));
                        out.push('>');
                    }
                    continue;
                }
                Step::Open { id, raw_text } => (id, raw_text),
            };
            let Some(node) = self.get(id) else {
                continue;
            };

            match &node.data {
                NodeData::Document => stack.extend(self.child_steps(id)),
                NodeData::Element { name, attrs } => {
                    let tag = qualified_name(name);
                    out.push('<');
                    out.push_str(&tag);
                    for attr in attrs {
                        out.push(' ');
                        out.push_str(&attr.qualified_name());
                        out.push_str("=\"");
                        out.push_str(&escape(attr.value.as_str()));
                        out.push('"');
                    }
                    out.push('>');

                    if node.first_child.is_none() && VOID_ELEMENTS.contains(&tag.as_str()) {
                        continue;
                    }
                    stack.push(Step::Close(id));
                    stack.extend(self.child_steps(id));
                }
                NodeData::Text(text) if raw_text => out.push_str(text),
                NodeData::Text(text) => out.push_str(&escape(text.as_str())),
                NodeData::CData(text) => {
                    out.push_str("<![CDATA[");
                    out.push_str(text);
                    out.push_str("]]>");
                }
                NodeData::Comment(text) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
                NodeData::ProcessingInstruction { target, data } => {
                    out.push_str("<?");
                    out.push_str(target);
                    if !data.is_empty() {
                        out.push(' ');
                        out.push_str(data);
                    }
                    out.push_str("?>");
                }
                NodeData::Doctype { name, .. } => {
                    out.push_str("<!DOCTYPE ");
                    out.push_str(name);
                    out.push('>');
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use html5ever::{LocalName, QualName, ns};

    use super::*;

    #[test]
    fn test_round_trip_simple_page() {
        let html = r#"<!DOCTYPE html><html><head></head><body><div id="p"><div id="x">old body</div></div></body></html>"#;
        let dom = Document::parse_html(html);

        assert_eq!(dom.to_html(), html);
    }

    #[test]
    fn test_void_elements_have_no_end_tag() {
        let dom = Document::parse_html("<p>a<br>b<img src=\"x.png\"></p>");

        let p = dom.find_by_tag("p").unwrap();
        assert_eq!(dom.outer_html(p), r#"<p>a<br>b<img src="x.png"></p>"#);
    }

    #[test]
    fn test_text_and_attributes_are_escaped() {
        let dom = Document::parse_html(r#"<p title="a &quot;b&quot;">1 &lt; 2 &amp; 3</p>"#);

        let p = dom.find_by_tag("p").unwrap();
        assert_eq!(dom.inner_html(p), "1 &lt; 2 &amp; 3");
        assert!(dom.outer_html(p).contains("title=\"a &quot;b&quot;\""));
    }

    #[test]
    fn test_script_text_is_raw() {
        let dom = Document::parse_html("<div><script>if (a < b) {}</script></div>");

        let script = dom.find_by_tag("script").unwrap();
        assert_eq!(dom.inner_html(script), "if (a < b) {}");
    }

    #[test]
    fn test_deeply_nested_document() {
        const DEPTH: usize = 100_000;
        let mut dom = Document::new();
        let mut parent = dom.document();
        for _ in 0..DEPTH {
            let name = QualName::new(None, ns!(html), LocalName::from("d"));
            let child = dom.create_element(name, Vec::new());
            dom.append(parent, child);
            parent = child;
        }
        dom.append_text(parent, "x");

        let html = dom.to_html();
        assert_eq!(html.len(), DEPTH * "<d></d>".len() + 1);
        assert!(html.starts_with("<d><d>"));
        assert!(html.ends_with("<d>x</d></d>"));
    }
}
