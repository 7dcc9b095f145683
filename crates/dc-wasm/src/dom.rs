//! Live page backend over `web-sys`.

use dc_core::{Document, DomError, MutationSource};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CssStyleDeclaration, Element, HtmlElement, MutationObserver, MutationObserverInit, NodeList};

pub struct WebDocument {
    document: web_sys::Document,
    highlight_class: String,
    observer: Option<MutationObserver>,
}

impl WebDocument {
    pub fn new(document: web_sys::Document, highlight_class: impl Into<String>) -> Self {
        Self {
            document,
            highlight_class: highlight_class.into(),
            observer: None,
        }
    }

    /// Observer used for every subscription handed out by `observe`.
    pub fn set_observer(&mut self, observer: MutationObserver) {
        self.observer = Some(observer);
    }
}

/// Open child-list subscription. Dropping it disconnects the observer.
pub struct WebSubscription {
    observer: MutationObserver,
}

impl Drop for WebSubscription {
    fn drop(&mut self) {
        self.observer.disconnect();
        log::debug!("Mutation observer disconnected");
    }
}

impl MutationSource for WebDocument {
    type Subscription = WebSubscription;

    fn observe(&self) -> Result<WebSubscription, DomError> {
        let observer = self
            .observer
            .clone()
            .ok_or_else(|| DomError::Subscription("no observer attached".to_string()))?;
        let target = self
            .body()
            .or_else(|| self.root())
            .ok_or_else(|| DomError::Subscription("document has no root".to_string()))?;

        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer
            .observe_with_options(&target, &init)
            .map_err(|err| DomError::Subscription(describe_js(&err)))?;

        log::debug!("Mutation observer connected");
        Ok(WebSubscription { observer })
    }
}

impl Document for WebDocument {
    type Node = Element;

    fn root(&self) -> Option<Element> {
        self.document.document_element()
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn is_element(&self, _node: &Element) -> bool {
        true
    }

    fn tag_name(&self, node: &Element) -> Option<String> {
        let tag = node.tag_name();
        if tag.is_empty() {
            None
        } else {
            Some(tag.to_ascii_lowercase())
        }
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn text(&self, node: &Element) -> String {
        match node.dyn_ref::<HtmlElement>() {
            Some(html) => html.inner_text(),
            None => node.text_content().unwrap_or_default(),
        }
    }

    fn parent_element(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn previous_element_sibling(&self, node: &Element) -> Option<Element> {
        node.previous_element_sibling()
    }

    fn next_element_sibling(&self, node: &Element) -> Option<Element> {
        node.next_element_sibling()
    }

    fn query_all(&self, selector: &str) -> Result<Vec<Element>, DomError> {
        self.document
            .query_selector_all(selector)
            .map(elements)
            .map_err(|err| DomError::invalid_selector(selector, describe_js(&err)))
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Result<Vec<Element>, DomError> {
        scope
            .query_selector_all(selector)
            .map(elements)
            .map_err(|err| DomError::invalid_selector(selector, describe_js(&err)))
    }

    fn matches(&self, node: &Element, selector: &str) -> Result<bool, DomError> {
        node.matches(selector)
            .map_err(|err| DomError::invalid_selector(selector, describe_js(&err)))
    }

    fn set_hidden(&self, node: &Element, hidden: bool) {
        let Some(style) = style_of(node) else {
            return;
        };
        let result = if hidden {
            style.set_property_with_priority("display", "none", "important")
        } else {
            style.remove_property("display").map(|_| ())
        };
        if let Err(err) = result {
            log::debug!("Could not update display of <{}>: {}", node.tag_name(), describe_js(&err));
        }
    }

    fn is_hidden(&self, node: &Element) -> bool {
        style_of(node)
            .and_then(|style| style.get_property_value("display").ok())
            .map_or(false, |display| display == "none")
    }

    fn set_highlight(&self, node: &Element, highlighted: bool) {
        let classes = node.class_list();
        let result = if highlighted {
            classes.add_1(&self.highlight_class)
        } else {
            classes.remove_1(&self.highlight_class)
        };
        if let Err(err) = result {
            log::debug!("Could not toggle highlight: {}", describe_js(&err));
        }
    }
}

/// Inline style of any element with one (HTML, SVG, MathML).
fn style_of(node: &Element) -> Option<CssStyleDeclaration> {
    js_sys::Reflect::get(node, &JsValue::from_str("style"))
        .ok()
        .filter(JsValue::is_object)
        .map(JsCast::unchecked_into)
}

pub(crate) fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub(crate) fn describe_js(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{:?}", value)
}
