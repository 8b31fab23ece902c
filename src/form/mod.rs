//! Paste form binding
//!
//! The page's author field and language/theme menus, seen through
//! [`SettingsForm`], and the event handlers that keep them in sync with
//! stored settings.

pub mod catalog;
#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use catalog::{Catalog, CatalogEntry, CatalogForm};

use serde::Deserialize;

use crate::persistence::SettingsReconciler;
use crate::record::SettingsRecord;
use crate::settings::{PasteSettings, SettingKey};

/// Read and write access to the paste form's settings controls
pub trait SettingsForm {
    fn author(&self) -> String;
    /// Display name of the selected language
    fn lang(&self) -> String;
    /// Display name of the selected theme
    fn theme(&self) -> String;
    fn set_author(&mut self, author: &str);
    /// Select a language by display name. Unknown names select the first
    /// entry and return `false`.
    fn select_lang(&mut self, name: &str) -> bool;
    /// Select a theme by display name, with the same fallback as
    /// [`SettingsForm::select_lang`]
    fn select_theme(&mut self, name: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Leave the language menu alone (viewing an existing paste)
    pub skip_lang: bool,
}

/// Current form values as a settings record
pub fn form_settings(form: &dyn SettingsForm) -> SettingsRecord {
    PasteSettings {
        author: form.author(),
        lang: form.lang(),
        theme: form.theme(),
    }
    .to_record()
}

/// Resolve stored settings and apply them to the form
pub fn load_into_form(
    reconciler: &SettingsReconciler,
    form: &mut dyn SettingsForm,
    options: LoadOptions,
) -> PasteSettings {
    let settings = reconciler.resolve();
    if !options.skip_lang {
        form.select_lang(&settings.lang);
    }
    form.select_theme(&settings.theme);
    form.set_author(&settings.author);
    settings
}

/// Author field lost focus. An empty field erases the stored author.
pub fn on_author_change(reconciler: &SettingsReconciler, form: &dyn SettingsForm) -> PasteSettings {
    let author = form.author();
    let mut changes = SettingsRecord::new();
    if author.is_empty() {
        changes.erase(SettingKey::Author.as_str());
    } else {
        changes.set(SettingKey::Author.as_str(), author);
    }
    reconciler.update(&changes)
}

/// Language menu changed; saves the choice when `save` is set
pub fn on_lang_change(
    reconciler: &SettingsReconciler,
    form: &dyn SettingsForm,
    save: bool,
) -> Option<PasteSettings> {
    save.then(|| {
        let changes = SettingsRecord::new().with(SettingKey::Lang.as_str(), form.lang());
        reconciler.update(&changes)
    })
}

/// Theme menu changed; saves the choice when `save` is set
pub fn on_theme_change(
    reconciler: &SettingsReconciler,
    form: &dyn SettingsForm,
    save: bool,
) -> Option<PasteSettings> {
    save.then(|| {
        let changes = SettingsRecord::new().with(SettingKey::Theme.as_str(), form.theme());
        reconciler.update(&changes)
    })
}

/// Body returned by the paste submission endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Paste created; settings saved, navigate here
    Redirect(String),
    /// The server refused the paste
    Rejected(String),
    /// Success without a paste url; nothing to do
    NoUrl,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("invalid submission response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Handle a submission response body.
///
/// A successful response carrying a url saves the form's current settings,
/// so the next paste starts from them.
pub fn on_submit_response(
    reconciler: &SettingsReconciler,
    form: &dyn SettingsForm,
    body: &str,
) -> Result<SubmitOutcome, SubmitError> {
    let response: SubmitResponse = serde_json::from_str(body)?;
    if response.status.as_deref() == Some("error") {
        let message = response
            .message
            .unwrap_or_else(|| "The error was unknown.".to_string());
        log::warn!("Submit error: {message}");
        return Ok(SubmitOutcome::Rejected(message));
    }
    match response.url {
        Some(url) => {
            reconciler.persist(&form_settings(form));
            Ok(SubmitOutcome::Redirect(url))
        }
        None => Ok(SubmitOutcome::NoUrl),
    }
}
