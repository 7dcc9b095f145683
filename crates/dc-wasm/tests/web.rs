#![cfg(target_arch = "wasm32")]

use dc_core::{derive_selector, Description, Document, HostLink, HostNotice, MutationSource, Panel, Rule};
use dc_wasm::{action_state, is_restricted, WebDocument, WebHost, WebPanel};
use js_sys::Reflect;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;
use web_sys::Element;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn fixture(html: &str) -> Element {
    let doc = document();
    let host = doc.create_element("div").unwrap();
    host.set_inner_html(html);
    doc.body().unwrap().append_child(&host).unwrap();
    host
}

#[wasm_bindgen_test]
fn test_hide_and_restore_live_elements() {
    let host = fixture(r#"<p class="ad-slot">buy</p><p>keep</p>"#);
    let doc = WebDocument::new(document(), "remover-highlight");

    let ads = doc.query_within(&host, ".ad-slot").unwrap();
    assert_eq!(ads.len(), 1);
    doc.set_hidden(&ads[0], true);
    assert!(doc.is_hidden(&ads[0]));
    let style = ads[0].get_attribute("style").unwrap();
    assert!(style.contains("display: none !important"));

    doc.set_hidden(&ads[0], false);
    assert!(!doc.is_hidden(&ads[0]));
    host.remove();
}

#[wasm_bindgen_test]
fn test_invalid_selector_is_an_error() {
    let doc = WebDocument::new(document(), "remover-highlight");
    assert!(doc.query_all("div[[[").is_err());
    assert!(doc.query_all("body").is_ok());
}

#[wasm_bindgen_test]
fn test_derived_selector_matches_live_element() {
    let host = fixture("<section><span>a</span><span>b</span></section>");
    let doc = WebDocument::new(document(), "remover-highlight");
    let spans = doc.query_within(&host, "span").unwrap();

    let selector = derive_selector(&doc, &spans[1]).unwrap();
    assert_eq!(doc.query_all(&selector).unwrap(), vec![spans[1].clone()]);
    host.remove();
}

#[wasm_bindgen_test]
fn test_highlight_uses_configured_class() {
    let host = fixture("<div>x</div>");
    let doc = WebDocument::new(document(), "picked");
    let target = host.first_element_child().unwrap();

    doc.set_highlight(&target, true);
    assert!(target.class_list().contains("picked"));
    doc.set_highlight(&target, false);
    assert!(!target.class_list().contains("picked"));
    host.remove();
}

#[wasm_bindgen_test]
fn test_observe_without_observer_fails() {
    let doc = WebDocument::new(document(), "remover-highlight");
    assert!(doc.observe().is_err());
}

#[wasm_bindgen_test]
fn test_page_listeners_follow_activation() {
    let host = WebHost::new(document());
    assert!(!host.listening());

    host.notify(HostNotice::StateChange { active: true });
    assert!(host.listening());
    host.notify(HostNotice::StateChange { active: true });
    assert!(host.listening());

    host.notify(HostNotice::StateChange { active: false });
    assert!(!host.listening());
}

#[wasm_bindgen_test]
fn test_panel_lists_rules() {
    let panel = WebPanel::build(&document(), "Hold [Ctrl]/[Cmd] to select").unwrap();
    panel.render(&[Rule::new("#promo", Description::new("Big <b>sale</b>", "📄"))]);

    let card = document().query_selector("#remover-list .remover-item-card").unwrap().unwrap();
    let text = card.query_selector(".remover-item-desc").unwrap().unwrap();
    assert_eq!(text.text_content().unwrap(), "Big <b>sale</b>");
    let undo = card.query_selector(".remover-undo").unwrap().unwrap();
    assert_eq!(undo.get_attribute("data-selector").unwrap(), "#promo");
    assert!(panel.contains(&undo));

    panel.render(&[]);
    let empty = document().query_selector("#remover-list .remover-empty").unwrap();
    assert!(empty.is_some());

    document().get_element_by_id("remover-panel").unwrap().remove();
}

#[wasm_bindgen_test]
fn test_action_state_object() {
    let state = action_state("https://example.com", Some(true));
    let title = Reflect::get(&state, &JsValue::from_str("title")).unwrap();
    assert_eq!(title.as_string().unwrap(), "Click to Remove Element (Active - Press ESC to exit)");
    let path = Reflect::get(&state, &JsValue::from_str("path")).unwrap();
    let small = Reflect::get(&path, &JsValue::from(16)).unwrap();
    assert_eq!(small.as_string().unwrap(), "icons/active-16.png");

    let restricted = action_state("chrome://extensions", None);
    let enabled = Reflect::get(&restricted, &JsValue::from_str("enabled")).unwrap();
    assert_eq!(enabled.as_bool(), Some(false));
    assert!(is_restricted(""));
}
