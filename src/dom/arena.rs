//! Arena-based DOM shared by parsed fragments and live documents.
//!
//! All nodes live in one contiguous vector; parent/child/sibling links are
//! indices into it. Detached nodes stay in the arena until they are removed
//! with [`Document::remove`] (or replaced by [`Document::replace_children`]);
//! removed slots are reused by later allocations, so a removed node's id may
//! come back naming a different node.

use html5ever::{LocalName, Namespace, QualName};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node type in the arena DOM.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Element with name and attributes (attributes in source order).
    Element { name: QualName, attrs: Vec<Attribute> },
    /// Text content.
    Text(String),
    /// CDATA section (XML only).
    CData(String),
    /// Comment.
    Comment(String),
    /// Processing instruction (`<?target data?>`).
    ProcessingInstruction { target: String, data: String },
    /// Document type declaration.
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// Element attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    /// Attribute name as written in markup (`prefix:local` or `local`).
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.name)
    }
}

/// Format a `QualName` as `prefix:local`, or just `local` without a prefix.
pub fn qualified_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}

/// A node in the arena DOM.
#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// Arena-based DOM tree.
pub struct Document {
    nodes: Vec<Option<Node>>,
    /// Vacant slots, reused before the vector grows.
    free: Vec<NodeId>,
    document: NodeId,
}

impl Document {
    /// Create a new empty DOM with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            document: NodeId::NONE,
        };
        dom.document = dom.alloc(Node::new(NodeData::Document));
        dom
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.0 as usize] = Some(node);
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)?.as_ref()
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)?.as_mut()
    }

    /// Create a new, detached element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        self.alloc(Node::new(NodeData::Element { name, attrs }))
    }

    /// Create a new text node.
    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text)))
    }

    /// Create a CDATA section node.
    pub fn create_cdata(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::CData(text)))
    }

    /// Create a new comment node.
    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    /// Create a processing instruction node.
    pub fn create_pi(&mut self, target: String, data: String) -> NodeId {
        self.alloc(Node::new(NodeData::ProcessingInstruction { target, data }))
    }

    /// Create a doctype node.
    pub fn create_doctype(&mut self, name: String, public_id: String, system_id: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// `child` must be detached.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let Some(last) = self.get(parent).map(|n| n.last_child) else {
            return;
        };
        self.link(parent, last, NodeId::NONE, child);
    }

    /// Insert detached `new_node` immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let Some((parent, prev)) = self.get(sibling).map(|n| (n.parent, n.prev_sibling)) else {
            return;
        };
        self.link(parent, prev, sibling, new_node);
    }

    /// Splice `node` into `parent`'s child list between `prev` and `next`
    /// (either may be `NONE` at the ends).
    fn link(&mut self, parent: NodeId, prev: NodeId, next: NodeId, node: NodeId) {
        let Some(n) = self.get_mut(node) else {
            return;
        };
        n.parent = parent;
        n.prev_sibling = prev;
        n.next_sibling = next;

        match self.get_mut(prev) {
            Some(p) => p.next_sibling = node,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = node;
                }
            }
        }
        match self.get_mut(next) {
            Some(n) => n.prev_sibling = node,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.last_child = node;
                }
            }
        }
    }

    /// Append text to the last child if it is a text node, or create a new one.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let NodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Unlink a node from its parent and siblings. Its own subtree is kept.
    pub fn detach(&mut self, target: NodeId) {
        let Some(node) = self.get_mut(target) else {
            return;
        };
        let parent = std::mem::replace(&mut node.parent, NodeId::NONE);
        let prev = std::mem::replace(&mut node.prev_sibling, NodeId::NONE);
        let next = std::mem::replace(&mut node.next_sibling, NodeId::NONE);

        match self.get_mut(prev) {
            Some(p) => p.next_sibling = next,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = next;
                }
            }
        }
        match self.get_mut(next) {
            Some(n) => n.prev_sibling = prev,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.last_child = prev;
                }
            }
        }
    }

    /// Move all children of `node` to the end of `new_parent`.
    pub fn reparent_children(&mut self, node: NodeId, new_parent: NodeId) {
        let children: Vec<_> = self.children(node).collect();
        for child in children {
            self.detach(child);
            self.append(new_parent, child);
        }
    }

    /// Remove every child of `parent`, then append `children` in order.
    ///
    /// Old children that are not listed in `children` are freed along with
    /// their subtrees. `children` must not lie inside those subtrees.
    pub fn replace_children(&mut self, parent: NodeId, children: &[NodeId]) {
        let old: Vec<_> = self.children(parent).collect();
        for child in old {
            if children.contains(&child) {
                self.detach(child);
            } else {
                self.remove(child);
            }
        }
        for &child in children {
            self.detach(child);
            self.append(parent, child);
        }
    }

    /// Detach `target` and free it together with its whole subtree.
    ///
    /// The document root cannot be removed.
    pub fn remove(&mut self, target: NodeId) {
        if target == self.document || self.get(target).is_none() {
            return;
        }
        self.detach(target);

        let mut stack = vec![target];
        while let Some(id) = stack.pop() {
            stack.extend(self.children(id));
            if let Some(slot) = self.nodes.get_mut(id.0 as usize) {
                *slot = None;
                self.free.push(id);
            }
        }
    }

    /// Number of live nodes, attached or detached.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Check if the DOM is empty (only has document root).
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(NodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    /// Iterate over the element children of a node.
    pub fn element_children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(parent).filter(|&id| self.is_element(id))
    }

    /// Number of element children (text, comments, etc. are not counted).
    pub fn element_child_count(&self, parent: NodeId) -> usize {
        self.element_children(parent).count()
    }

    /// First element child of a node.
    pub fn first_element_child(&self, parent: NodeId) -> Option<NodeId> {
        self.element_children(parent).next()
    }

    /// Parent of a node, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(NodeId::is_some)
    }

    /// Parent of a node if that parent is an element.
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.is_element(p))
    }

    /// The root element of the document.
    pub fn document_element(&self) -> Option<NodeId> {
        self.first_element_child(self.document)
    }

    /// The `<body>` element, if any.
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html)
            .find(|&id| self.element_name(id).is_some_and(|n| n.as_ref() == "body"))
    }

    /// Find the first attached node matching a predicate (DFS, document order).
    pub fn find<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        let mut stack = vec![self.document];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                if predicate(node) {
                    return Some(id);
                }
                // Push children in reverse order for left-to-right traversal
                let mut children: Vec<_> = self.children(id).collect();
                children.reverse();
                stack.extend(children);
            }
        }
        None
    }

    /// Find element by local tag name (first match).
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find(|node| match &node.data {
            NodeData::Element { name, .. } => name.local.as_ref() == tag,
            _ => false,
        })
    }

    /// Find the attached element with the given `id` attribute.
    pub fn get_by_id(&self, id: &str) -> Option<NodeId> {
        self.find(|node| match &node.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .any(|a| a.name.prefix.is_none() && a.name.local.as_ref() == "id" && a.value == id),
            _ => false,
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a Document,
    current: NodeId,
}

impl<'a> Iterator for ChildrenIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        Some(id)
    }
}

/// Convenience methods for element nodes.
impl Document {
    /// Get element's local name (tag).
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Get element's namespace.
    pub fn element_namespace(&self, id: NodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        })
    }

    /// Get element's attributes in source order.
    pub fn attrs(&self, id: NodeId) -> &[Attribute] {
        static EMPTY: &[Attribute] = &[];
        self.get(id)
            .and_then(|n| match &n.data {
                NodeData::Element { attrs, .. } => Some(attrs.as_slice()),
                _ => None,
            })
            .unwrap_or(EMPTY)
    }

    /// Get an attribute value by qualified name.
    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.qualified_name() == attr_name)
            .map(|a| a.value.as_str())
    }

    /// Get element's id attribute.
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.get_attr(id, "id")
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    /// Check if node is a text node.
    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| matches!(n.data, NodeData::Text(_)))
    }

    /// Get text content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of all descendant text nodes, like DOM `textContent`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            match self.get(current).map(|n| &n.data) {
                Some(NodeData::Text(text) | NodeData::CData(text)) => {
                    out.push_str(text);
                    continue;
                }
                Some(NodeData::Comment(_) | NodeData::ProcessingInstruction { .. }) => continue,
                _ => {}
            }
            let mut children: Vec<_> = self.children(current).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use html5ever::ns;

    use super::*;

    fn html_qname(local: &str) -> QualName {
        QualName::new(None, ns!(html), LocalName::from(local))
    }

    fn attr(name: &str, value: &str) -> Attribute {
        Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_create_elements() {
        let mut dom = Document::new();

        let div = dom.create_element(html_qname("div"), vec![attr("id", "main")]);
        dom.append(dom.document(), div);

        assert_eq!(dom.element_name(div).unwrap().as_ref(), "div");
        assert_eq!(dom.element_id(div), Some("main"));
        assert_eq!(dom.get_by_id("main"), Some(div));
    }

    #[test]
    fn test_append_children() {
        let mut dom = Document::new();

        let parent = dom.create_element(html_qname("div"), vec![]);
        let child1 = dom.create_element(html_qname("p"), vec![]);
        let child2 = dom.create_element(html_qname("p"), vec![]);

        dom.append(dom.document(), parent);
        dom.append(parent, child1);
        dom.append(parent, child2);

        let children: Vec<_> = dom.children(parent).collect();
        assert_eq!(children, vec![child1, child2]);
    }

    #[test]
    fn test_text_merging() {
        let mut dom = Document::new();

        let p = dom.create_element(html_qname("p"), vec![]);
        dom.append(dom.document(), p);

        dom.append_text(p, "Hello, ");
        dom.append_text(p, "World!");

        let children: Vec<_> = dom.children(p).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(dom.text(children[0]), Some("Hello, World!"));
    }

    #[test]
    fn test_element_child_count_ignores_other_nodes() {
        let mut dom = Document::new();

        let parent = dom.create_element(html_qname("div"), vec![]);
        dom.append(dom.document(), parent);
        dom.append_text(parent, "\n  ");
        let only = dom.create_element(html_qname("span"), vec![]);
        dom.append(parent, only);
        let comment = dom.create_comment("note".to_string());
        dom.append(parent, comment);

        assert_eq!(dom.element_child_count(parent), 1);
        assert_eq!(dom.first_element_child(parent), Some(only));
    }

    #[test]
    fn test_detach_middle_child() {
        let mut dom = Document::new();

        let parent = dom.create_element(html_qname("ul"), vec![]);
        let a = dom.create_element(html_qname("li"), vec![]);
        let b = dom.create_element(html_qname("li"), vec![]);
        let c = dom.create_element(html_qname("li"), vec![]);
        dom.append(parent, a);
        dom.append(parent, b);
        dom.append(parent, c);

        dom.detach(b);

        let children: Vec<_> = dom.children(parent).collect();
        assert_eq!(children, vec![a, c]);
        assert_eq!(dom.parent(b), None);
    }

    #[test]
    fn test_replace_children_drops_old_ids() {
        let mut dom = Document::new();

        let parent = dom.create_element(html_qname("div"), vec![]);
        dom.append(dom.document(), parent);
        let old = dom.create_element(html_qname("div"), vec![attr("id", "old")]);
        dom.append(parent, old);

        let new = dom.create_element(html_qname("span"), vec![attr("id", "new")]);
        dom.replace_children(parent, &[new]);

        assert_eq!(dom.get_by_id("old"), None);
        assert_eq!(dom.get_by_id("new"), Some(new));
        assert_eq!(dom.parent(new), Some(parent));
    }

    #[test]
    fn test_text_content_is_recursive() {
        let mut dom = Document::new();

        let div = dom.create_element(html_qname("div"), vec![]);
        let b = dom.create_element(html_qname("b"), vec![]);
        dom.append_text(div, "new ");
        dom.append(div, b);
        dom.append_text(b, "body");

        assert_eq!(dom.text_content(div), "new body");
    }

    #[test]
    fn test_remove_frees_subtree_slots() {
        let mut dom = Document::new();

        let list = dom.create_element(html_qname("ul"), vec![]);
        dom.append(dom.document(), list);
        let item = dom.create_element(html_qname("li"), vec![attr("id", "gone")]);
        dom.append(list, item);
        dom.append_text(item, "text");
        assert_eq!(dom.len(), 4);

        dom.remove(item);

        assert_eq!(dom.len(), 2);
        assert!(dom.get(item).is_none());
        assert_eq!(dom.get_by_id("gone"), None);
        assert_eq!(dom.children(list).count(), 0);

        // Freed slots are handed out again
        let reused = dom.create_element(html_qname("li"), vec![]);
        assert!(reused.0 < 4);
        assert_eq!(dom.len(), 3);
    }

    #[test]
    fn test_document_root_is_never_removed() {
        let mut dom = Document::new();
        let root = dom.document();

        dom.remove(root);

        assert!(dom.get(root).is_some());
        assert_eq!(dom.len(), 1);
    }

    #[test]
    fn test_repeated_replace_children_stays_bounded() {
        let mut dom = Document::new();
        let parent = dom.create_element(html_qname("div"), vec![]);
        dom.append(dom.document(), parent);

        for _ in 0..1_000 {
            let child = dom.create_element(html_qname("p"), vec![]);
            dom.append_text(child, "again");
            dom.replace_children(parent, &[child]);
        }

        assert_eq!(dom.len(), 4);
        assert_eq!(dom.text_content(parent), "again");
    }

    #[test]
    fn test_replace_children_keeps_listed_old_child() {
        let mut dom = Document::new();
        let parent = dom.create_element(html_qname("div"), vec![]);
        let keep = dom.create_element(html_qname("b"), vec![]);
        let dropped = dom.create_element(html_qname("i"), vec![]);
        dom.append(parent, keep);
        dom.append(parent, dropped);

        dom.replace_children(parent, &[keep]);

        assert_eq!(dom.children(parent).collect::<Vec<_>>(), vec![keep]);
        assert!(dom.get(dropped).is_none());
    }
}
