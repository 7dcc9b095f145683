//! Bindings to the extension APIs: `chrome.storage.local` and
//! `chrome.runtime` messaging.

use dc_core::{HostNotice, Storage, StorageError};
use js_sys::{Function, Object, Promise, Reflect, JSON};
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::dom::describe_js;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = get)]
    fn storage_get(keys: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = set)]
    fn storage_set(items: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = clear)]
    fn storage_clear() -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime"], js_name = sendMessage)]
    fn runtime_send_message(message: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    pub(crate) fn on_message_add_listener(callback: &Function);
}

/// `chrome.storage.local`, shared by every frame of every tab.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStorage;

impl Storage for ChromeStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let result = settle(storage_get(&JsValue::from_str(key))).await?;
        let entry = Reflect::get(&result, &JsValue::from_str(key)).map_err(backend)?;
        if entry.is_undefined() {
            return Ok(None);
        }
        to_json(&entry).map(Some)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let items = Object::new();
        Reflect::set(&items, &JsValue::from_str(key), &from_json(&value)?).map_err(backend)?;
        settle(storage_set(&items)).await?;
        Ok(())
    }

    async fn get_all(&self) -> Result<Map<String, Value>, StorageError> {
        let result = settle(storage_get(&JsValue::NULL)).await?;
        match to_json(&result)? {
            Value::Object(entries) => Ok(entries),
            _ => Ok(Map::new()),
        }
    }

    async fn replace_all(&self, entries: Map<String, Value>) -> Result<(), StorageError> {
        settle(storage_clear()).await?;
        let items = from_json(&Value::Object(entries))?;
        settle(storage_set(&items)).await?;
        Ok(())
    }
}

/// Fire-and-forget `chrome.runtime.sendMessage`. Nobody may be listening.
pub fn send_notice(notice: HostNotice) {
    let message = match serde_json::to_value(notice).map_err(StorageError::from).and_then(|v| from_json(&v)) {
        Ok(message) => message,
        Err(err) => {
            log::warn!("Could not encode notice: {}", err);
            return;
        }
    };
    match runtime_send_message(&message) {
        Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                log::debug!("Notice not delivered: {}", describe_js(&err));
            }
        }),
        Err(err) => log::debug!("Notice not sent: {}", describe_js(&err)),
    }
}

async fn settle(call: Result<Promise, JsValue>) -> Result<JsValue, StorageError> {
    let promise = call.map_err(backend)?;
    JsFuture::from(promise).await.map_err(backend)
}

fn backend(err: JsValue) -> StorageError {
    StorageError::Backend(describe_js(&err))
}

/// Structured clone of a JS value into JSON.
pub(crate) fn to_json(value: &JsValue) -> Result<Value, StorageError> {
    let text = JsValue::from(JSON::stringify(value).map_err(backend)?)
        .as_string()
        .ok_or_else(|| StorageError::Backend("value has no JSON form".to_string()))?;
    Ok(serde_json::from_str(&text)?)
}

pub(crate) fn from_json(value: &Value) -> Result<JsValue, StorageError> {
    let text = serde_json::to_string(value)?;
    JSON::parse(&text).map_err(backend)
}
