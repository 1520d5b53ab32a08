//! Borrowed element views over the arena [`Document`].

use super::arena::{Attribute, ChildrenIter, Document, NodeData, NodeId, qualified_name};

/// A node known to be an element, borrowed from its document.
///
/// Obtained through [`Document::element`], so holding one proves the node is
/// an element.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    dom: &'a Document,
    id: NodeId,
}

/// Kind of a child node as seen from its parent element.
#[derive(Debug, Clone, Copy)]
pub enum ChildRef<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
    /// Comments, CDATA sections, processing instructions and doctypes.
    Other,
}

impl Document {
    /// View a node as an element, if it is one.
    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.is_element(id).then_some(ElementRef { dom: self, id })
    }
}

impl<'a> ElementRef<'a> {
    /// Caller guarantees `id` is an element of `dom`.
    pub(crate) fn new_unchecked(dom: &'a Document, id: NodeId) -> Self {
        debug_assert!(dom.is_element(id));
        Self { dom, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.dom
    }

    /// Tag name as written (`prefix:local` for prefixed XML elements).
    pub fn tag_name(&self) -> String {
        match self.dom.get(self.id).map(|n| &n.data) {
            Some(NodeData::Element { name, .. }) => qualified_name(name),
            _ => String::new(),
        }
    }

    /// Namespace URI, `None` when the element has no namespace.
    pub fn namespace_uri(&self) -> Option<&'a str> {
        self.dom
            .element_namespace(self.id)
            .map(|ns| &**ns)
            .filter(|ns| !ns.is_empty())
    }

    pub fn attributes(&self) -> &'a [Attribute] {
        self.dom.attrs(self.id)
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.dom.get_attr(self.id, name)
    }

    /// Child nodes in document order.
    pub fn children(&self) -> Children<'a> {
        Children {
            dom: self.dom,
            inner: self.dom.children(self.id),
        }
    }
}

impl std::fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("tag", &self.tag_name())
            .finish()
    }
}

/// Iterator over the children of an [`ElementRef`].
pub struct Children<'a> {
    dom: &'a Document,
    inner: ChildrenIter<'a>,
}

impl<'a> Iterator for Children<'a> {
    type Item = ChildRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.inner.next()?;
        let dom = self.dom;
        Some(match dom.get(id).map(|n| &n.data) {
            Some(NodeData::Element { .. }) => ChildRef::Element(ElementRef { dom, id }),
            Some(NodeData::Text(text)) => ChildRef::Text(text),
            _ => ChildRef::Other,
        })
    }
}

#[cfg(test)]
mod tests {
    use html5ever::{LocalName, Namespace, QualName, ns};

    use super::*;

    #[test]
    fn test_element_rejects_text_nodes() {
        let mut dom = Document::new();
        let text = dom.create_text("loose".to_string());
        let div = dom.create_element(QualName::new(None, ns!(html), LocalName::from("div")), vec![]);

        assert!(dom.element(text).is_none());
        assert!(dom.element(div).is_some());
    }

    #[test]
    fn test_prefixed_tag_name() {
        let mut dom = Document::new();
        let name = QualName::new(
            Some("m".into()),
            Namespace::from("http://www.w3.org/1998/Math/MathML"),
            LocalName::from("mi"),
        );
        let mi = dom.create_element(name, vec![]);

        let el = dom.element(mi).unwrap();
        assert_eq!(el.tag_name(), "m:mi");
        assert_eq!(el.namespace_uri(), Some("http://www.w3.org/1998/Math/MathML"));
    }

    #[test]
    fn test_children_kinds() {
        let mut dom = Document::new();
        let p = dom.create_element(QualName::new(None, ns!(html), LocalName::from("p")), vec![]);
        let b = dom.create_element(QualName::new(None, ns!(html), LocalName::from("b")), vec![]);
        dom.append_text(p, "a");
        dom.append(p, b);
        let comment = dom.create_comment("c".to_string());
        dom.append(p, comment);

        let kinds: Vec<_> = dom
            .element(p)
            .unwrap()
            .children()
            .map(|c| match c {
                ChildRef::Element(e) => e.tag_name(),
                ChildRef::Text(t) => format!("#text {t}"),
                ChildRef::Other => "#other".to_string(),
            })
            .collect();
        assert_eq!(kinds, ["#text a", "b", "#other"]);
    }
}
