//! WebAssembly bindings for the element remover
//!
//! The content script calls [`start`] once per frame. The background script
//! uses [`action_state`] to keep the toolbar icon in sync.

mod actions;
mod chrome;
mod dom;
mod events;
mod panel;

use std::cell::RefCell;

use dc_core::{
    dispatch, is_restricted_url, resolve_domain_key, ActionState, Flush, FrameRole, HostLink, HostNotice,
    HostRequest, RemoverConfig, RuleStore, Session,
};
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{MutationObserver, MutationRecord, Window};

pub use chrome::ChromeStorage;
pub use dom::{WebDocument, WebSubscription};
pub use events::PageListeners;
pub use panel::WebPanel;

/// Host link of the top-level frame. Activation changes arrive here, so it
/// also owns the page listeners that only run while active.
pub struct WebHost {
    listeners: PageListeners,
}

impl WebHost {
    pub fn new(document: web_sys::Document) -> Self {
        Self {
            listeners: PageListeners::new(document),
        }
    }

    pub fn listening(&self) -> bool {
        self.listeners.is_attached()
    }
}

impl HostLink for WebHost {
    fn notify(&self, notice: HostNotice) {
        let HostNotice::StateChange { active } = notice;
        self.listeners.set_attached(active);
        chrome::send_notice(notice);
    }
}

pub type WebSession = Session<WebDocument, Option<WebPanel>, Option<WebHost>>;

thread_local! {
    static SESSION: RefCell<Option<WebSession>> = RefCell::new(None);
}

/// Run `f` against the frame's session. Returns `None` before [`start`] and
/// when called re-entrantly from inside another session call.
pub(crate) fn with_session<R>(f: impl FnOnce(&mut WebSession) -> R) -> Option<R> {
    SESSION.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => slot.as_mut().map(f),
        Err(_) => {
            log::debug!("Session busy, event skipped");
            None
        }
    })
}

pub(crate) fn spawn_flush(flush: Flush) {
    wasm_bindgen_futures::spawn_local(async move {
        let key = flush.key().to_string();
        if let Err(err) = flush.commit(&ChromeStorage).await {
            log::warn!("Failed to save rules for {}: {}", key, err);
        }
    });
}

#[wasm_bindgen(start)]
pub fn init_runtime() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}

#[wasm_bindgen]
pub fn is_started() -> bool {
    SESSION.with(|cell| cell.try_borrow().map_or(true, |slot| slot.is_some()))
}

/// Set up this frame: load the domain's rules, hide what they match and
/// start watching for inserted content. `config_json` is an optional partial
/// [`RemoverConfig`] override.
#[wasm_bindgen]
pub async fn start(config_json: Option<String>) -> Result<(), JsValue> {
    if is_started() {
        return Err(JsValue::from_str("Already started. Reload the page to restart."));
    }

    let config = match config_json.as_deref() {
        Some(text) => RemoverConfig::from_json(text)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?,
        None => RemoverConfig::default(),
    };

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("No document"))?;
    let role = frame_role(&window);

    // Cross-origin frames cannot read the top hostname and fall back to their own.
    let top_host = match role {
        FrameRole::Top => None,
        FrameRole::Nested => window
            .top()
            .ok()
            .flatten()
            .and_then(|top| top.location().hostname().ok()),
    };
    let local_host = window.location().hostname().unwrap_or_default();
    let Some(key) = resolve_domain_key(top_host.as_deref(), &local_host) else {
        log::debug!("No hostname, nothing to do");
        return Ok(());
    };

    let mut doc = WebDocument::new(document.clone(), config.highlight_class.clone());
    doc.set_observer(mutation_observer()?);

    let (panel, host) = match role {
        FrameRole::Top => (
            Some(WebPanel::build(&document, &config.idle_guidance)?),
            Some(WebHost::new(document.clone())),
        ),
        FrameRole::Nested => (None, None),
    };

    let session = Session::new(doc, panel, host, role, key.clone(), config);
    SESSION.with(|cell| *cell.borrow_mut() = Some(session));

    if role == FrameRole::Top {
        let listener = Closure::<dyn FnMut(JsValue, JsValue, Function) -> JsValue>::new(on_message);
        chrome::on_message_add_listener(listener.as_ref().unchecked_ref());
        listener.forget();
    }

    let loaded = RuleStore::load(&ChromeStorage, &key)
        .await
        .map_err(|e| JsValue::from_str(&format!("Failed to load rules: {}", e)))?;
    if let Some(Some(repair)) = with_session(|session| session.install(loaded)) {
        spawn_flush(repair);
    }

    log::info!("Element remover ready for {} ({:?})", key, role);
    Ok(())
}

#[wasm_bindgen]
pub fn is_active() -> bool {
    with_session(|session| session.is_active()).unwrap_or(false)
}

/// Toolbar state for a tab: `{ state, title, enabled, path: { 16, 32 } }`.
#[wasm_bindgen]
pub fn action_state(url: &str, is_active: Option<bool>) -> JsValue {
    let state = ActionState::for_tab(url, is_active);
    let result = Object::new();
    let name = serde_json::to_value(state)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default();
    let _ = Reflect::set(&result, &"state".into(), &JsValue::from_str(&name));
    let _ = Reflect::set(&result, &"title".into(), &JsValue::from_str(state.title()));
    let _ = Reflect::set(&result, &"enabled".into(), &JsValue::from(state.is_enabled()));

    let paths = Object::new();
    for (size, path) in state.icon_paths() {
        let _ = Reflect::set(&paths, &JsValue::from(size), &JsValue::from_str(&path));
    }
    let _ = Reflect::set(&result, &"path".into(), &paths);
    result.into()
}

#[wasm_bindgen]
pub fn is_restricted(url: &str) -> bool {
    is_restricted_url(url)
}

fn frame_role(window: &Window) -> FrameRole {
    match window.top() {
        Ok(Some(top)) if Object::is(top.as_ref(), window.as_ref()) => FrameRole::Top,
        Ok(None) => FrameRole::Top,
        _ => FrameRole::Nested,
    }
}

fn mutation_observer() -> Result<MutationObserver, JsValue> {
    let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(|records: Array, _: MutationObserver| {
        let batches: Vec<_> = records
            .iter()
            .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
            .map(|record| dom::elements(record.added_nodes()))
            .collect();
        with_session(|session| session.on_mutations(batches));
    });
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(observer)
}

fn on_message(message: JsValue, _sender: JsValue, send_response: Function) -> JsValue {
    let request = chrome::to_json(&message)
        .ok()
        .and_then(|value| serde_json::from_value::<HostRequest>(value).ok());
    let Some(request) = request else {
        return JsValue::FALSE;
    };

    let response = with_session(|session| dispatch(session, request)).flatten();
    if let Some(response) = response {
        let encoded = serde_json::to_value(response)
            .map_err(dc_core::StorageError::from)
            .and_then(|value| chrome::from_json(&value));
        match encoded {
            Ok(value) => {
                let _ = send_response.call1(&JsValue::NULL, &value);
            }
            Err(err) => log::warn!("Could not encode response: {}", err),
        }
    }
    JsValue::FALSE
}
