//! Browser storage: LocalStorage and `document.cookie`

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlDocument, Storage};

use super::cookie::CookieJar;
use super::store::{KeyValueStore, StoreError};

fn js_error(value: JsValue) -> StoreError {
    StoreError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

/// `window.localStorage`
pub struct WebLocalStorage {
    storage: Storage,
}

impl WebLocalStorage {
    /// Open LocalStorage. Fails when there is no window, when access throws
    /// (privacy settings, sandboxed iframes) or when the browser has none.
    pub fn open() -> Result<Self, StoreError> {
        let window =
            web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StoreError::Unavailable("localStorage not supported".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for WebLocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(|e| {
            // QuotaExceededError arrives as a DOMException
            let name = js_sys::Reflect::get(&e, &JsValue::from_str("name"))
                .ok()
                .and_then(|n| n.as_string());
            match name.as_deref() {
                Some("QuotaExceededError") => StoreError::QuotaExceeded(key.to_string()),
                _ => js_error(e),
            }
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.storage.remove_item(key).map_err(js_error)
    }
}

/// `document.cookie`
pub struct DocumentCookies {
    document: HtmlDocument,
}

impl DocumentCookies {
    pub fn open() -> Result<Self, StoreError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| StoreError::Unavailable("no document".into()))?
            .dyn_into::<HtmlDocument>()
            .map_err(|_| StoreError::Unavailable("document is not an HTML document".into()))?;
        Ok(Self { document })
    }
}

impl CookieJar for DocumentCookies {
    fn cookie_header(&self) -> Result<String, StoreError> {
        self.document.cookie().map_err(js_error)
    }

    fn write(&self, assignment: &str) -> Result<(), StoreError> {
        self.document.set_cookie(assignment).map_err(js_error)
    }
}
