//! Virtual-DOM tree values and the tree builder.
//!
//! [`build`] turns one element of a parsed fragment into a [`VNode`]: tag
//! names are lower-cased, attributes are copied verbatim into props, text
//! children are kept as strings and every other node kind is dropped. In
//! XML mode the fragment's namespace URI is written to the `xmlns` prop of
//! every node in the tree.

use std::collections::BTreeMap;

use crate::dom::{ChildRef, Children, ElementRef};
use crate::markup::ParsedFragment;

/// Prop name → value. Values are always strings.
pub type Props = BTreeMap<String, String>;

/// Prop that carries the propagated namespace URI.
pub const XMLNS_PROP: &str = "xmlns";

/// A renderer-facing element: tag, props and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VNode {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub tag: String,
    pub props: Props,
    pub children: Vec<VChild>,
}

/// A child of a [`VNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum VChild {
    Element(VNode),
    Text(String),
}

impl VNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<VChild>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn prop(&self, name: &str) -> Option<&str> {
        self.props.get(name).map(String::as_str)
    }

    /// Element children, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &VNode> {
        self.children.iter().filter_map(|child| match child {
            VChild::Element(node) => Some(node),
            VChild::Text(_) => None,
        })
    }

    /// Concatenated text of the whole subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<&VChild> = self.children.iter().rev().collect();
        while let Some(child) = stack.pop() {
            match child {
                VChild::Text(text) => out.push_str(text),
                VChild::Element(node) => stack.extend(node.children.iter().rev()),
            }
        }
        out
    }

    /// Total number of element nodes in the tree, this one included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.elements());
        }
        count
    }
}

impl From<VNode> for VChild {
    fn from(node: VNode) -> Self {
        VChild::Element(node)
    }
}

impl From<String> for VChild {
    fn from(text: String) -> Self {
        VChild::Text(text)
    }
}

impl From<&str> for VChild {
    fn from(text: &str) -> Self {
        VChild::Text(text.to_string())
    }
}

/// An element whose children are still being walked.
struct Frame<'a> {
    node: VNode,
    pending: Children<'a>,
}

impl<'a> Frame<'a> {
    fn open(element: ElementRef<'a>, namespace: Option<&str>) -> Self {
        let mut props: Props = element
            .attributes()
            .iter()
            .map(|attr| (attr.qualified_name(), attr.value.clone()))
            .collect();

        if let Some(ns) = namespace.filter(|ns| !ns.is_empty()) {
            props.insert(XMLNS_PROP.to_string(), ns.to_string());
        }

        Frame {
            node: VNode {
                tag: element.tag_name().to_lowercase(),
                props,
                children: Vec::new(),
            },
            pending: element.children(),
        }
    }
}

/// Convert an element and its descendants into a [`VNode`].
///
/// `namespace`, when non-empty, is set as the `xmlns` prop on every node,
/// replacing any literal `xmlns` attribute. Comments, CDATA sections and
/// processing instructions produce no child entry.
pub fn build(root: ElementRef<'_>, namespace: Option<&str>) -> VNode {
    let mut ancestors: Vec<Frame<'_>> = Vec::new();
    let mut current = Frame::open(root, namespace);

    loop {
        match current.pending.next() {
            Some(ChildRef::Element(child)) => {
                let frame = Frame::open(child, namespace);
                ancestors.push(std::mem::replace(&mut current, frame));
            }
            Some(ChildRef::Text(text)) => {
                current.node.children.push(VChild::Text(text.to_string()));
            }
            Some(ChildRef::Other) => {}
            None => match ancestors.pop() {
                Some(parent) => {
                    let finished = std::mem::replace(&mut current, parent);
                    current.node.children.push(VChild::Element(finished.node));
                }
                None => return current.node,
            },
        }
    }
}

/// HTML flavour: no namespace.
pub fn build_html(root: ElementRef<'_>) -> VNode {
    build(root, None)
}

/// XML flavour: `namespace` propagated to every node.
pub fn build_xml(root: ElementRef<'_>, namespace: &str) -> VNode {
    build(root, Some(namespace))
}

/// Build the tree for a parsed fragment, using its namespace if it has one.
pub fn convert(fragment: &ParsedFragment) -> VNode {
    build(fragment.root(), fragment.namespace())
}
