//! Arena DOM used both for parsed markup fragments and for the live document
//! that replacements are committed into.

mod arena;
mod element_ref;
mod serialize;
pub(crate) mod tree_sink;

pub use arena::{Attribute, ChildrenIter, Document, Node, NodeData, NodeId, qualified_name};
pub use element_ref::{ChildRef, Children, ElementRef};
