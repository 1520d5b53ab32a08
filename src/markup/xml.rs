//! XML parsing through quick-xml.
//!
//! Builds the same arena [`Document`] as the HTML path. Element and
//! attribute names keep their prefixes; each element's namespace is resolved
//! from the `xmlns` declarations in scope.

use std::borrow::Cow;

use html5ever::{LocalName, Namespace, Prefix, QualName};
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use crate::dom::{Attribute, Document, NodeId};
use crate::error::{Error, Result};

use super::ParsedFragment;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Namespace bindings in scope, innermost last.
#[derive(Default)]
struct NamespaceScopes {
    bindings: Vec<(Option<String>, String)>,
    /// Number of bindings each open element pushed.
    frames: Vec<usize>,
}

impl NamespaceScopes {
    fn push(&mut self, declared: Vec<(Option<String>, String)>) {
        self.frames.push(declared.len());
        self.bindings.extend(declared);
    }

    fn pop(&mut self) {
        if let Some(count) = self.frames.pop() {
            let keep = self.bindings.len().saturating_sub(count);
            self.bindings.truncate(keep);
        }
    }

    fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE);
        }
        self.bindings
            .iter()
            .rev()
            .find(|(p, _)| p.as_deref() == prefix)
            .map(|(_, uri)| uri.as_str())
    }
}

/// Parse an XML document.
pub fn parse_document(xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut dom = Document::new();
    let mut open: Vec<NodeId> = Vec::new();
    let mut scopes = NamespaceScopes::default();

    loop {
        let parent = open.last().copied().unwrap_or(dom.document());
        match reader.read_event()? {
            Event::Start(e) => {
                let id = create_element(&mut dom, &mut scopes, &e)?;
                attach_element(&mut dom, parent, id)?;
                open.push(id);
            }
            Event::Empty(e) => {
                let id = create_element(&mut dom, &mut scopes, &e)?;
                attach_element(&mut dom, parent, id)?;
                scopes.pop();
            }
            Event::End(_) => {
                open.pop();
                scopes.pop();
            }
            Event::Text(e) => {
                // Whitespace between prolog nodes has no place in a DOM
                if !open.is_empty() {
                    let text = String::from_utf8_lossy(e.as_ref());
                    dom.append_text(parent, &normalize_newlines(&text));
                }
            }
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                let resolved = resolve_entity(&entity)
                    .ok_or_else(|| Error::MalformedMarkup(format!("unknown entity &{entity};")))?;
                if !open.is_empty() {
                    dom.append_text(parent, &resolved);
                }
            }
            Event::CData(e) => {
                let content = String::from_utf8_lossy(e.as_ref());
                let cdata = dom.create_cdata(normalize_newlines(&content).into_owned());
                dom.append(parent, cdata);
            }
            Event::Comment(e) => {
                let content = String::from_utf8_lossy(e.as_ref());
                let comment = dom.create_comment(normalize_newlines(&content).into_owned());
                dom.append(parent, comment);
            }
            Event::PI(e) => {
                let content = String::from_utf8_lossy(e.as_ref()).into_owned();
                let (target, data) = match content.split_once(char::is_whitespace) {
                    Some((target, data)) => (target.to_string(), data.trim_start().to_string()),
                    None => (content, String::new()),
                };
                let pi = dom.create_pi(target, data);
                dom.append(parent, pi);
            }
            Event::DocType(e) => {
                let content = String::from_utf8_lossy(e.as_ref());
                let name = content.split_whitespace().next().unwrap_or_default().to_string();
                let doctype = dom.create_doctype(name, String::new(), String::new());
                dom.append(parent, doctype);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(&unclosed) = open.last() {
        let name = dom
            .element(unclosed)
            .map(|el| el.tag_name())
            .unwrap_or_default();
        return Err(Error::MalformedMarkup(format!("unclosed element <{name}>")));
    }

    Ok(dom)
}

/// Parse an XML fragment: its document element plus that element's namespace.
pub fn parse_fragment(xml: &str) -> Result<ParsedFragment> {
    let dom = parse_document(xml)?;
    let root = dom
        .document_element()
        .ok_or_else(|| Error::MissingElement("XML document element".to_string()))?;
    let namespace = dom
        .element(root)
        .and_then(|el| el.namespace_uri())
        .map(str::to_string);
    ParsedFragment::new(dom, root, namespace)
}

impl Document {
    /// Parse an XML document.
    pub fn parse_xml(xml: &str) -> Result<Self> {
        parse_document(xml)
    }
}

fn attach_element(dom: &mut Document, parent: NodeId, id: NodeId) -> Result<()> {
    if parent == dom.document() && dom.document_element().is_some() {
        return Err(Error::MalformedMarkup(
            "more than one top-level element".to_string(),
        ));
    }
    dom.append(parent, id);
    Ok(())
}

/// Create an element, pushing its namespace declarations onto `scopes`.
fn create_element(
    dom: &mut Document,
    scopes: &mut NamespaceScopes,
    start: &BytesStart<'_>,
) -> Result<NodeId> {
    let mut raw_attrs = Vec::new();
    let mut declared = Vec::new();

    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&normalize_attribute(&raw))?.into_owned();

        if key == "xmlns" {
            declared.push((None, value.clone()));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            declared.push((Some(prefix.to_string()), value.clone()));
        }
        raw_attrs.push((key, value));
    }

    scopes.push(declared);

    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let (prefix, local) = split_qname(&tag);
    let ns = scopes.resolve(prefix).unwrap_or_default();
    let name = make_qname(prefix, ns, local);

    let attrs = raw_attrs
        .into_iter()
        .map(|(key, value)| {
            let (prefix, local) = split_qname(&key);
            let ns = match (prefix, local) {
                (None, "xmlns") | (Some("xmlns"), _) => XMLNS_NAMESPACE,
                (Some(p), _) => scopes.resolve(Some(p)).unwrap_or_default(),
                // Unprefixed attributes are in no namespace
                (None, _) => "",
            };
            Attribute {
                name: make_qname(prefix, ns, local),
                value,
            }
        })
        .collect();

    Ok(dom.create_element(name, attrs))
}

fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

fn make_qname(prefix: Option<&str>, ns: &str, local: &str) -> QualName {
    QualName::new(prefix.map(Prefix::from), Namespace::from(ns), LocalName::from(local))
}

/// Line ends become `\n`: both `\r\n` and a lone `\r`.
fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Literal whitespace in a raw attribute value becomes a space. Runs before
/// unescaping, so `&#10;` still yields a newline.
fn normalize_attribute(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['\t', '\n', '\r']) {
        return Cow::Borrowed(raw);
    }
    normalize_newlines(raw)
        .chars()
        .map(|c| if matches!(c, '\t' | '\n') { ' ' } else { c })
        .collect::<String>()
        .into()
}

fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse::<u32>().ok()?
    };
    char::from_u32(code).map(String::from)
}
