//! Paste Settings - preference memory for the paste tool
//!
//! Core modules:
//! - `record`: Settings records and the merge rules
//! - `settings`: Typed author/language/theme view and key names
//! - `persistence`: Resolve/persist against LocalStorage or a cookie
//! - `platform`: Browser/native storage abstraction
//! - `form`: Form controls and the event handlers that save them
//! - `config`: Defaults, cookie attributes, erase policy

pub mod config;
pub mod form;
pub mod persistence;
pub mod platform;
pub mod record;
pub mod settings;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use config::{CookieConfig, ReconcilerConfig};
pub use persistence::{Backend, BackendKind, SettingsReconciler};
pub use record::{ErasePolicy, SettingsRecord, merge, merge_with, update_json};
pub use settings::{PasteSettings, SettingKey};

/// Storage constants
pub mod consts {
    /// Language used when none is stored
    pub const DEFAULT_LANG: &str = "Python";
    /// Theme used when none is stored
    pub const DEFAULT_THEME: &str = "Solarized Dark";

    /// Cookie holding the JSON settings when LocalStorage is unavailable
    pub const COOKIE_NAME: &str = "pastesettings";
    pub const COOKIE_PATH: &str = "/";
    pub const COOKIE_MAX_AGE_DAYS: u32 = 365;

    /// Scratch key written and removed to test LocalStorage
    pub const PROBE_KEY: &str = "paste_settings_probe";
}
