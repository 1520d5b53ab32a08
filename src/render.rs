//! Renderers mount a [`VNode`] tree into a live document.

use html5ever::{LocalName, Namespace, Prefix, QualName, ns};
use log::debug;

use crate::dom::{Attribute, Document, NodeId};
use crate::error::{Error, Result};
use crate::vdom::{Props, VChild, VNode, XMLNS_PROP};

/// Renderer collaborator used by the guarded commit.
///
/// A renderer owns the mount point's content after `render` returns: the
/// previous children are gone and the tree's materialization takes their
/// place.
pub trait Renderer {
    fn render(&mut self, tree: VNode, document: &mut Document, mount: NodeId) -> Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn render(&mut self, tree: VNode, document: &mut Document, mount: NodeId) -> Result<()> {
        (**self).render(tree, document, mount)
    }
}

/// Materializes trees straight into the arena document.
///
/// Namespaces follow the usual virtual-DOM rules: an `xmlns` prop wins,
/// `<svg>` and `<math>` switch into their namespaces, children of
/// `<foreignObject>` go back to HTML, everything else inherits from its
/// parent (starting from the mount point).
#[derive(Debug, Clone, Copy, Default)]
pub struct DomRenderer;

impl DomRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DomRenderer {
    fn render(&mut self, tree: VNode, document: &mut Document, mount: NodeId) -> Result<()> {
        if !document.is_element(mount) {
            return Err(Error::MissingElement(format!("mount point {mount:?}")));
        }

        let inherited = document
            .element_namespace(mount)
            .cloned()
            .unwrap_or(ns!(html));

        let VNode {
            tag,
            props,
            children,
        } = tree;
        let root_ns = namespace_for(&tag, &props, &inherited);
        let root = create_element(document, &tag, &props, root_ns.clone());
        let child_ns = children_namespace(&tag, root_ns);

        // Build the whole subtree detached, then swap it in and free the old one
        let mut nodes = 1;
        let mut stack = vec![(root, children, child_ns)];
        while let Some((parent, children, inherited)) = stack.pop() {
            for child in children {
                match child {
                    VChild::Text(text) => {
                        let text = document.create_text(text);
                        document.append(parent, text);
                    }
                    VChild::Element(VNode {
                        tag,
                        props,
                        children,
                    }) => {
                        let ns = namespace_for(&tag, &props, &inherited);
                        let id = create_element(document, &tag, &props, ns.clone());
                        document.append(parent, id);
                        stack.push((id, children, children_namespace(&tag, ns)));
                        nodes += 1;
                    }
                }
            }
        }

        document.replace_children(mount, &[root]);
        debug!("rendered {nodes} element(s) into {mount:?}");
        Ok(())
    }
}

fn namespace_for(tag: &str, props: &Props, inherited: &Namespace) -> Namespace {
    if let Some(xmlns) = props.get(XMLNS_PROP).filter(|ns| !ns.is_empty()) {
        return Namespace::from(xmlns.as_str());
    }
    match tag {
        "svg" => ns!(svg),
        "math" => ns!(mathml),
        _ => inherited.clone(),
    }
}

fn children_namespace(tag: &str, ns: Namespace) -> Namespace {
    if tag == "foreignobject" && ns == ns!(svg) {
        ns!(html)
    } else {
        ns
    }
}

fn create_element(document: &mut Document, tag: &str, props: &Props, ns: Namespace) -> NodeId {
    let (prefix, local) = split_name(tag);
    let name = QualName::new(prefix.map(Prefix::from), ns, LocalName::from(local));

    let attrs = props
        .iter()
        .map(|(key, value)| {
            let (prefix, local) = split_name(key);
            let attr_ns = match (prefix, local) {
                (None, "xmlns") | (Some("xmlns"), _) => ns!(xmlns),
                (Some("xlink"), _) => ns!(xlink),
                (Some("xml"), _) => ns!(xml),
                _ => ns!(),
            };
            Attribute {
                name: QualName::new(prefix.map(Prefix::from), attr_ns, LocalName::from(local)),
                value: value.clone(),
            }
        })
        .collect();

    document.create_element(name, attrs)
}

fn split_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}
