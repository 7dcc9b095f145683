//! On-page panel for the top-level frame.
//!
//! Built once with DOM calls (no `innerHTML`, so rule text never needs
//! escaping) and appended to the body hidden. Styling comes from the
//! extension's stylesheet through the ids and classes set here.

use dc_core::{Panel, Rule};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement, HtmlInputElement};

use crate::actions;

const FLIPPED_CLASS: &str = "remover-is-flipped";
const SELECTOR_PREVIEW_CHARS: usize = 35;

pub struct WebPanel {
    document: web_sys::Document,
    root: HtmlElement,
    guidance: HtmlInputElement,
    list: Element,
}

impl WebPanel {
    pub fn build(document: &web_sys::Document, idle_guidance: &str) -> Result<Self, JsValue> {
        let root: HtmlElement = document.create_element("div")?.dyn_into()?;
        root.set_id("remover-panel");
        root.style().set_property("display", "none")?;

        // Main view
        let main = element(document, "div", "remover-main-view", "remover-view")?;
        let header = element(document, "div", "", "remover-panel-header")?;
        header.append_child(&text_element(document, "h3", "remover-header-title", "Click to Remove Element")?.into())?;
        let buttons = element(document, "div", "", "remover-setting")?;
        buttons.append_child(&icon_button(document, "remover-reset-btn", "Reset rules for this domain", "🔄")?.into())?;
        buttons.append_child(&icon_button(document, "remover-settings-btn", "Settings", "⚙️")?.into())?;
        buttons.append_child(&icon_button(document, "remover-close-btn", "Close (Esc)", "❌")?.into())?;
        header.append_child(&buttons)?;
        main.append_child(&header)?;

        let tools = element(document, "div", "remover-tools", "")?;
        let guidance: HtmlInputElement = document.create_element("input")?.dyn_into()?;
        guidance.set_id("remover-selector-display");
        guidance.set_type("text");
        guidance.set_read_only(true);
        guidance.set_value(idle_guidance);
        tools.append_child(&guidance)?;
        main.append_child(&tools)?;

        let container = element(document, "div", "remover-list-container", "")?;
        container.append_child(&text_element(document, "h4", "", "Removed on this domain")?.into())?;
        let list = element(document, "ul", "remover-list", "")?;
        container.append_child(&list)?;
        main.append_child(&container)?;
        root.append_child(&main)?;

        // Settings view
        let settings = element(document, "div", "remover-settings-view", "remover-view")?;
        let header = element(document, "div", "", "remover-panel-header")?;
        header.append_child(&icon_button(document, "remover-back-btn", "Back", "⬅️")?.into())?;
        header.append_child(&text_element(document, "h3", "", "Settings")?.into())?;
        settings.append_child(&header)?;

        let export_item = element(document, "div", "", "remover-setting-item")?;
        let export = text_element(document, "button", "", "Export All Rules")?;
        export.set_id("remover-export");
        export_item.append_child(&export)?;
        settings.append_child(&export_item)?;

        let import_item = element(document, "div", "", "remover-setting-item")?;
        let label = text_element(document, "label", "", "Import Rules")?;
        label.set_attribute("for", "remover-import-file")?;
        import_item.append_child(&label)?;
        let import: HtmlInputElement = document.create_element("input")?.dyn_into()?;
        import.set_id("remover-import-file");
        import.set_type("file");
        import.set_accept(".json");
        import_item.append_child(&import)?;
        settings.append_child(&import_item)?;
        root.append_child(&settings)?;

        let body = document.body().ok_or_else(|| JsValue::from_str("Document has no body"))?;
        body.append_child(&root)?;

        let panel = Self {
            document: document.clone(),
            root,
            guidance,
            list,
        };
        panel.wire(&container, &import)?;
        Ok(panel)
    }

    /// Attach the panel's own listeners. They run in the bubble phase, after
    /// the page-level capture handlers have let the click through.
    fn wire(&self, container: &Element, import: &HtmlInputElement) -> Result<(), JsValue> {
        self.on_button("#remover-close-btn", actions::close)?;
        self.on_button("#remover-reset-btn", actions::reset)?;
        let root = self.root.clone();
        self.on_button("#remover-settings-btn", move || flip(&root))?;
        let root = self.root.clone();
        self.on_button("#remover-back-btn", move || flip(&root))?;
        self.on_button("#remover-export", actions::export)?;

        listen(&self.list, "click", |event: Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let selector = target
                .closest(".remover-undo")
                .ok()
                .flatten()
                .and_then(|button| button.get_attribute("data-selector"));
            if let Some(selector) = selector {
                event.stop_propagation();
                actions::undo(&selector);
            }
        })?;

        listen(container, "mouseover", |_| actions::preview(true))?;
        listen(container, "mouseout", |_| actions::preview(false))?;

        let root = self.root.clone();
        listen(import, "change", move |event: Event| {
            let Some(input) = event.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) else {
                return;
            };
            if let Some(file) = input.files().and_then(|files| files.get(0)) {
                root.class_list().remove_1(FLIPPED_CLASS).ok();
                actions::import(file);
            }
            input.set_value("");
        })?;
        Ok(())
    }

    fn on_button(&self, selector: &str, action: impl Fn() + 'static) -> Result<(), JsValue> {
        let button = self
            .root
            .query_selector(selector)?
            .ok_or_else(|| JsValue::from_str(&format!("Panel is missing {}", selector)))?;
        listen(&button, "click", move |event: Event| {
            event.stop_propagation();
            action();
        })
    }

    fn card(&self, rule: &Rule) -> Result<Element, JsValue> {
        let card = element(&self.document, "li", "", "remover-item-card")?;
        card.set_attribute("title", &format!("Selector: {}", rule.selector))?;
        card.append_child(&text_element(&self.document, "span", "remover-item-icon", &rule.description.icon)?.into())?;

        let info = element(&self.document, "div", "", "remover-item-info")?;
        info.append_child(&text_element(&self.document, "span", "remover-item-desc", &rule.description.text)?.into())?;
        info.append_child(&text_element(
            &self.document,
            "span",
            "remover-item-selector",
            &preview_selector(&rule.selector),
        )?.into())?;
        card.append_child(&info)?;

        let undo = text_element(&self.document, "button", "remover-undo", "X")?;
        undo.set_attribute("data-selector", &rule.selector)?;
        undo.set_attribute("title", "Undo")?;
        card.append_child(&undo)?;
        Ok(card)
    }

    fn try_render(&self, rules: &[Rule]) -> Result<(), JsValue> {
        self.list.set_text_content(None);
        if rules.is_empty() {
            let empty = text_element(&self.document, "li", "remover-empty", "No elements removed yet.")?;
            self.list.append_child(&empty)?;
            return Ok(());
        }
        for rule in rules {
            self.list.append_child(&self.card(rule)?.into())?;
        }
        Ok(())
    }
}

impl Panel<Element> for WebPanel {
    fn show(&self) {
        if let Err(err) = self.root.style().set_property("display", "flex") {
            log::warn!("Could not show panel: {:?}", err);
        }
    }

    fn hide(&self) {
        self.root.style().set_property("display", "none").ok();
        self.root.class_list().remove_1(FLIPPED_CLASS).ok();
    }

    fn contains(&self, node: &Element) -> bool {
        self.root.contains(Some(node.as_ref()))
    }

    fn set_guidance(&self, text: &str) {
        self.guidance.set_value(text);
    }

    fn render(&self, rules: &[Rule]) {
        if let Err(err) = self.try_render(rules) {
            log::warn!("Could not render rule list: {:?}", err);
        }
    }
}

fn preview_selector(selector: &str) -> String {
    if selector.chars().count() > SELECTOR_PREVIEW_CHARS {
        let head: String = selector.chars().take(SELECTOR_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        selector.to_string()
    }
}

fn flip(root: &HtmlElement) {
    root.class_list().toggle(FLIPPED_CLASS).ok();
}

fn element(document: &web_sys::Document, tag: &str, id: &str, class: &str) -> Result<Element, JsValue> {
    let el = document.create_element(tag)?;
    if !id.is_empty() {
        el.set_id(id);
    }
    if !class.is_empty() {
        el.set_class_name(class);
    }
    Ok(el)
}

fn text_element(document: &web_sys::Document, tag: &str, class: &str, text: &str) -> Result<Element, JsValue> {
    let el = element(document, tag, "", class)?;
    el.set_text_content(Some(text));
    Ok(el)
}

fn icon_button(document: &web_sys::Document, id: &str, title: &str, glyph: &str) -> Result<Element, JsValue> {
    let button = element(document, "button", id, "remover-icon-btn")?;
    button.set_attribute("title", title)?;
    button.set_text_content(Some(glyph));
    Ok(button)
}

/// Listener that lives as long as the page.
fn listen(target: &web_sys::EventTarget, kind: &str, handler: impl FnMut(Event) + 'static) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_selector() {
        assert_eq!(preview_selector("#promo"), "#promo");
        assert_eq!(
            preview_selector("body > main > section:nth-of-type(2) > div > p"),
            "body > main > section:nth-of-type(2..."
        );
    }
}
