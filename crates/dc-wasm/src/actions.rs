//! Panel actions: undo, reset, preview, export and import.

use dc_core::{export_store, import_store, ImportError, RuleStore};
use js_sys::Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Blob, BlobPropertyBag, File, HtmlAnchorElement, Url};

use crate::chrome::ChromeStorage;
use crate::dom::describe_js;
use crate::{spawn_flush, with_session};

const RESET_PROMPT: &str =
    "Are you sure you want to restore all hidden elements for this domain? This action cannot be undone.";
const IMPORT_DONE: &str = "Settings imported successfully! Please reload affected pages.";
const IMPORT_INVALID: &str = "Error: Invalid JSON file.";

pub fn close() {
    with_session(|session| session.deactivate());
}

pub fn undo(selector: &str) {
    if let Some(flush) = with_session(|session| session.undo(selector)) {
        spawn_flush(flush);
    }
}

pub fn reset() {
    let confirmed = web_sys::window()
        .and_then(|window| window.confirm_with_message(RESET_PROMPT).ok())
        .unwrap_or(false);
    if let Some(Some(flush)) = with_session(|session| session.reset(confirmed)) {
        spawn_flush(flush);
    }
}

/// `true` restores every hidden element while the list is hovered, `false`
/// hides them again.
pub fn preview(restore: bool) {
    with_session(|session| {
        if restore {
            session.preview_restore();
        } else {
            session.preview_reapply();
        }
    });
}

pub fn export() {
    let Some(file_name) = with_session(|session| session.config().export_file_name.clone()) else {
        return;
    };
    spawn_local(async move {
        match export_store(&ChromeStorage).await {
            Ok(text) => {
                if let Err(err) = download(&text, &file_name) {
                    log::warn!("Export download failed: {}", describe_js(&err));
                }
            }
            Err(err) => log::warn!("Export failed: {}", err),
        }
    });
}

pub fn import(file: File) {
    spawn_local(async move {
        let text = match JsFuture::from(file.text()).await {
            Ok(value) => value.as_string().unwrap_or_default(),
            Err(err) => {
                log::warn!("Could not read {}: {}", file.name(), describe_js(&err));
                return;
            }
        };

        match import_store(&ChromeStorage, &text).await {
            Ok(domains) => {
                log::info!("Imported rules for {} domains", domains);
                alert(IMPORT_DONE);
                reload().await;
            }
            Err(err @ (ImportError::Parse(_) | ImportError::NotAnObject)) => {
                log::warn!("Import rejected: {}", err);
                alert(IMPORT_INVALID);
            }
            Err(err) => {
                log::warn!("Import failed: {}", err);
                alert(&format!("Error: {}", err));
            }
        }
    });
}

/// Re-read this domain's rules after the store was replaced underneath us.
pub async fn reload() {
    let Some(key) = with_session(|session| session.domain_key().to_string()) else {
        return;
    };
    match RuleStore::load(&ChromeStorage, &key).await {
        Ok(loaded) => {
            if let Some(Some(flush)) = with_session(|session| session.reload(loaded)) {
                spawn_flush(flush);
            }
        }
        Err(err) => log::warn!("Could not reload rules for {}: {}", key, err),
    }
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        window.alert_with_message(message).ok();
    }
}

fn download(text: &str, file_name: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("No document"))?;
    let body = document.body().ok_or_else(|| JsValue::from_str("No body"))?;

    let parts = Array::of1(&JsValue::from_str(text));
    let options = BlobPropertyBag::new();
    options.set_type("application/json");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    body.append_child(&anchor)?;
    anchor.click();
    anchor.remove();
    Url::revoke_object_url(&url)?;
    Ok(())
}
