//! JavaScript bindings for the paste page
//!
//! ```js
//! const settings = new PasteSettingsHandle({ default_lang: "Python" });
//! settings.load_form(false);
//! authorEntry.onblur = () => settings.on_author_change();
//! ```

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::ReconcilerConfig;
use crate::form::{self, LoadOptions, SubmitOutcome, dom::DomForm};
use crate::persistence::SettingsReconciler;
use crate::record::{self, SettingsRecord};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"paste-settings: logger already initialized".into());
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| JsError::new(&e.to_string()))
}

fn record_from_js(value: JsValue) -> Result<SettingsRecord, JsError> {
    if value.is_undefined() || value.is_null() {
        return Ok(SettingsRecord::new());
    }
    let json: serde_json::Value =
        serde_wasm_bindgen::from_value(value).map_err(|e| JsError::new(&e.to_string()))?;
    SettingsRecord::from_value(json).map_err(|e| JsError::new(&e.to_string()))
}

fn page_form() -> Result<DomForm, JsError> {
    DomForm::from_page().ok_or_else(|| JsError::new("no document to bind the paste form to"))
}

/// Page-side handle over the settings reconciler
#[wasm_bindgen]
pub struct PasteSettingsHandle {
    reconciler: SettingsReconciler,
}

#[wasm_bindgen]
impl PasteSettingsHandle {
    /// `config` may be omitted; missing fields take their defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<PasteSettingsHandle, JsError> {
        let config = if config.is_undefined() || config.is_null() {
            ReconcilerConfig::default()
        } else {
            let config: ReconcilerConfig = serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsError::new(&e.to_string()))?;
            config.validate().map_err(|e| JsError::new(&e.to_string()))?;
            config
        };
        Ok(Self {
            reconciler: SettingsReconciler::detect(config),
        })
    }

    /// "local" or "cookie"
    pub fn backend(&self) -> String {
        self.reconciler.backend_kind().as_str().to_string()
    }

    /// Effective settings as `{paste_author, paste_lang, paste_theme}`
    pub fn load(&self) -> Result<JsValue, JsError> {
        to_js(&self.reconciler.resolve())
    }

    /// Merge `changes` into the stored settings and return the result
    pub fn update(&self, changes: JsValue) -> Result<JsValue, JsError> {
        let changes = record_from_js(changes)?;
        to_js(&self.reconciler.update(&changes))
    }

    /// Persist a settings object as-is. Returns whether storage accepted it.
    pub fn save(&self, settings: JsValue) -> Result<bool, JsError> {
        let settings = record_from_js(settings)?;
        Ok(self.reconciler.persist(&settings))
    }

    /// Apply stored settings to the page's form controls
    pub fn load_form(&self, skip_lang: bool) -> Result<JsValue, JsError> {
        let mut form = page_form()?;
        let settings = form::load_into_form(&self.reconciler, &mut form, LoadOptions { skip_lang });
        to_js(&settings)
    }

    pub fn on_author_change(&self) -> Result<JsValue, JsError> {
        let form = page_form()?;
        to_js(&form::on_author_change(&self.reconciler, &form))
    }

    pub fn on_lang_change(&self, save: bool) -> Result<JsValue, JsError> {
        let form = page_form()?;
        to_js(&form::on_lang_change(&self.reconciler, &form, save))
    }

    pub fn on_theme_change(&self, save: bool) -> Result<JsValue, JsError> {
        let form = page_form()?;
        to_js(&form::on_theme_change(&self.reconciler, &form, save))
    }

    /// Handle the paste endpoint's response body. Returns the url to navigate
    /// to, or `undefined` when there is none; a rejected paste throws with
    /// the server's message.
    pub fn on_submit_response(&self, body: &str) -> Result<Option<String>, JsError> {
        let form = page_form()?;
        match form::on_submit_response(&self.reconciler, &form, body)
            .map_err(|e| JsError::new(&e.to_string()))?
        {
            SubmitOutcome::Redirect(url) => Ok(Some(url)),
            SubmitOutcome::Rejected(message) => Err(JsError::new(&message)),
            SubmitOutcome::NoUrl => Ok(None),
        }
    }
}

/// Merge two plain settings objects with the guarded rules
#[wasm_bindgen]
pub fn merge_settings(old: JsValue, new: JsValue) -> Result<JsValue, JsError> {
    let old = record_from_js(old)?;
    let new = record_from_js(new)?;
    to_js(&record::merge(&old, &new))
}
