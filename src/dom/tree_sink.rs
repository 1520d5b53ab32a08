//! html5ever tree builder target for the arena [`Document`].

use std::borrow::Cow;
use std::cell::{Ref, RefCell};

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as ParsedAttribute, QualName};

use super::arena::{Attribute, Document, NodeData, NodeId};

/// Receives html5ever's tree construction calls and records them in a
/// [`Document`]. Node ids double as the sink's handles.
///
/// The trait hands out `&self` only, hence the RefCell. Element names are
/// lent out as `Ref` guards and must be dropped before the next mutation.
#[derive(Default)]
pub struct DomSink {
    dom: RefCell<Document>,
}

impl DomSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_dom(self) -> Document {
        self.dom.into_inner()
    }

    fn insert(&self, parent: NodeId, child: NodeOrText<NodeId>) {
        let mut dom = self.dom.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => dom.append(parent, node),
            NodeOrText::AppendText(text) => dom.append_text(parent, &text),
        }
    }
}

fn to_attributes(parsed: Vec<ParsedAttribute>) -> impl Iterator<Item = Attribute> {
    parsed.into_iter().map(|attr| Attribute {
        name: attr.name,
        value: attr.value.to_string(),
    })
}

impl TreeSink for DomSink {
    type Handle = NodeId;
    type Output = Self;
    type ElemName<'a>
        = Ref<'a, QualName>
    where
        Self: 'a;

    fn finish(self) -> Self {
        self
    }

    // Recover silently, the way browsers do
    fn parse_error(&self, _msg: Cow<'static, str>) {}

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn get_document(&self) -> NodeId {
        self.dom.borrow().document()
    }

    fn get_template_contents(&self, target: &NodeId) -> NodeId {
        // No separate template fragment: contents stay under <template>
        *target
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }

    fn elem_name<'a>(&'a self, target: &'a NodeId) -> Ref<'a, QualName> {
        static NO_NAME: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        Ref::map(self.dom.borrow(), |dom| match dom.get(*target).map(|node| &node.data) {
            Some(NodeData::Element { name, .. }) => name,
            _ => &NO_NAME,
        })
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<ParsedAttribute>,
        _flags: ElementFlags,
    ) -> NodeId {
        let attrs = to_attributes(attrs).collect();
        self.dom.borrow_mut().create_element(name, attrs)
    }

    fn create_comment(&self, text: StrTendril) -> NodeId {
        self.dom.borrow_mut().create_comment(text.to_string())
    }

    fn create_pi(&self, target: StrTendril, data: StrTendril) -> NodeId {
        self.dom
            .borrow_mut()
            .create_pi(target.to_string(), data.to_string())
    }

    fn append(&self, parent: &NodeId, child: NodeOrText<NodeId>) {
        self.insert(*parent, child);
    }

    fn append_before_sibling(&self, sibling: &NodeId, child: NodeOrText<NodeId>) {
        let mut dom = self.dom.borrow_mut();
        let node = match child {
            NodeOrText::AppendNode(node) => node,
            NodeOrText::AppendText(text) => dom.create_text(text.to_string()),
        };
        dom.insert_before(*sibling, node);
    }

    /// Foster parenting: before `element` if it is still attached, otherwise
    /// at the end of `prev_element`.
    fn append_based_on_parent_node(
        &self,
        element: &NodeId,
        prev_element: &NodeId,
        child: NodeOrText<NodeId>,
    ) {
        let attached = self.dom.borrow().parent(*element).is_some();
        if attached {
            self.append_before_sibling(element, child);
        } else {
            self.insert(*prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let mut dom = self.dom.borrow_mut();
        let root = dom.document();
        let doctype = dom.create_doctype(
            name.to_string(),
            public_id.to_string(),
            system_id.to_string(),
        );
        dom.append(root, doctype);
    }

    fn add_attrs_if_missing(&self, target: &NodeId, attrs: Vec<ParsedAttribute>) {
        let mut dom = self.dom.borrow_mut();
        let Some(NodeData::Element { attrs: present, .. }) =
            dom.get_mut(*target).map(|node| &mut node.data)
        else {
            return;
        };
        for attr in to_attributes(attrs) {
            if present.iter().all(|p| p.name != attr.name) {
                present.push(attr);
            }
        }
    }

    fn remove_from_parent(&self, target: &NodeId) {
        self.dom.borrow_mut().detach(*target);
    }

    fn reparent_children(&self, node: &NodeId, new_parent: &NodeId) {
        self.dom.borrow_mut().reparent_children(*node, *new_parent);
    }
}
