//! WASM bindings for browser-side tree building.
//!
//! The trees come back as JSON strings shaped like `{ type, props, children }`
//! so a JavaScript renderer can consume them directly.

use wasm_bindgen::prelude::*;

use crate::markup::{MarkupMode, MarkupParser, StandardParser};
use crate::vdom;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Convert an HTML fragment to a JSON virtual-DOM tree.
///
/// The first element of the parsed body becomes the root.
#[wasm_bindgen]
pub fn html_to_vnode(markup: &str) -> Result<String, JsValue> {
    to_json(markup, MarkupMode::Html)
}

/// Convert an XML fragment to a JSON virtual-DOM tree.
///
/// The document element's namespace is set as `xmlns` on every node.
#[wasm_bindgen]
pub fn xml_to_vnode(markup: &str) -> Result<String, JsValue> {
    to_json(markup, MarkupMode::Xml)
}

fn to_json(markup: &str, mode: MarkupMode) -> Result<String, JsValue> {
    let fragment = StandardParser::new()
        .parse(markup, mode)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let tree = vdom::convert(&fragment);
    serde_json::to_string(&tree).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_then_convert() {
        init();
        init();

        let json = html_to_vnode("<p class=\"a\">hi</p>").unwrap();
        assert_eq!(json, r#"{"type":"p","props":{"class":"a"},"children":["hi"]}"#);
    }
}
