//! Resolve, update and persist paste settings against the selected backend

use crate::config::ReconcilerConfig;
use crate::platform::KeyValueStore;
use crate::record::{SettingsRecord, merge, merge_with};
use crate::settings::{PasteSettings, SettingKey, migrate_legacy_keys};

use super::{Backend, BackendKind};

/// Owns the defaults, the chosen backend and the erase policy
#[derive(Debug)]
pub struct SettingsReconciler {
    config: ReconcilerConfig,
    defaults: PasteSettings,
    backend: Backend,
}

impl SettingsReconciler {
    pub fn new(config: ReconcilerConfig, backend: Backend) -> Self {
        let defaults = config.defaults();
        log::info!(
            "Settings reconciler using {} storage (erase policy: {})",
            backend.kind().as_str(),
            config.erase_policy.as_str()
        );
        Self {
            config,
            defaults,
            backend,
        }
    }

    /// Probe the platform's storage and build a reconciler over it
    pub fn detect(config: ReconcilerConfig) -> Self {
        let backend = Backend::detect(&config.cookie);
        Self::new(config, backend)
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn defaults(&self) -> &PasteSettings {
        &self.defaults
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Effective settings: stored values over the defaults.
    ///
    /// Never fails; unreadable or malformed storage yields the defaults.
    pub fn resolve(&self) -> PasteSettings {
        match &self.backend {
            Backend::Local(store) => self.resolve_local(store.as_ref()),
            Backend::Cookie(store) => self.resolve_cookie(store.as_ref()),
        }
    }

    fn resolve_local(&self, store: &dyn KeyValueStore) -> PasteSettings {
        let mut settings = self.defaults.clone();
        for key in SettingKey::ALL {
            match store.get_item(key.as_str()) {
                // An empty string is a stored erasure and still wins
                Ok(Some(value)) => settings.set(key, value),
                Ok(None) => {}
                Err(e) => log::warn!("Failed to read {}: {e}", key.as_str()),
            }
        }
        settings
    }

    fn resolve_cookie(&self, store: &dyn KeyValueStore) -> PasteSettings {
        PasteSettings::from_record(&self.cookie_record(store), &self.defaults)
    }

    /// The stored cookie over the defaults, unrecognized keys included
    fn cookie_record(&self, store: &dyn KeyValueStore) -> SettingsRecord {
        merge(&self.defaults.to_record(), &self.read_cookie(store))
    }

    fn read_cookie(&self, store: &dyn KeyValueStore) -> SettingsRecord {
        let name = &self.config.cookie.name;
        let raw = match store.get_item(name) {
            Ok(Some(raw)) => raw,
            Ok(None) => return SettingsRecord::new(),
            Err(e) => {
                log::warn!("Failed to read cookie {name}: {e}");
                return SettingsRecord::new();
            }
        };
        match SettingsRecord::from_json(&raw) {
            Ok(record) => migrate_legacy_keys(&record),
            Err(e) => {
                log::warn!("Ignoring malformed cookie {name}: {e}");
                SettingsRecord::new()
            }
        }
    }

    /// Write `record` to storage. Returns whether every write succeeded.
    ///
    /// With LocalStorage each recognized key is written on its own: absent
    /// and empty values are skipped. An erased author is stored as `""`; an
    /// erased language or theme is removed so the default applies again.
    /// With cookies the whole record is stored, erasures as `""`.
    pub fn persist(&self, record: &SettingsRecord) -> bool {
        let record = migrate_legacy_keys(record);
        let result = match &self.backend {
            Backend::Local(store) => Self::persist_local(store.as_ref(), &record),
            Backend::Cookie(store) => {
                let json = record.erasures_as_empty().to_json();
                store.set_item(&self.config.cookie.name, &json)
            }
        };
        match result {
            Ok(()) => {
                log::debug!("Settings saved ({} keys)", record.len());
                true
            }
            Err(e) => {
                log::warn!("Failed to save settings: {e}");
                false
            }
        }
    }

    fn persist_local(
        store: &dyn KeyValueStore,
        record: &SettingsRecord,
    ) -> Result<(), crate::platform::StoreError> {
        let mut first_error = None;
        for key in SettingKey::ALL {
            let written = match record.get(key.as_str()) {
                None => continue,
                Some(None) if key == SettingKey::Author => store.set_item(key.as_str(), ""),
                Some(None) => store.remove_item(key.as_str()),
                Some(Some(value)) if value.is_empty() => continue,
                Some(Some(value)) => store.set_item(key.as_str(), value),
            };
            if let Err(e) = written {
                log::debug!("Failed to write {}: {e}", key.as_str());
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Persist `settings` in full
    pub fn save(&self, settings: &PasteSettings) -> bool {
        self.persist(&settings.to_record())
    }

    /// Merge `changes` into the stored settings and persist the result.
    ///
    /// Uses the configured erase policy, so under [`ErasePolicy::Honor`]
    /// (the default) `{"paste_author": null}` clears the stored author.
    /// In the cookie tier, keys the reconciler does not recognize are
    /// carried through untouched.
    ///
    /// [`ErasePolicy::Honor`]: crate::record::ErasePolicy::Honor
    pub fn update(&self, changes: &SettingsRecord) -> PasteSettings {
        let changes = migrate_legacy_keys(changes);
        let current = match &self.backend {
            Backend::Local(_) => self.resolve().to_record(),
            Backend::Cookie(store) => self.cookie_record(store.as_ref()),
        };
        let merged = merge_with(&current, &changes, self.config.erase_policy);
        self.persist(&merged);
        PasteSettings::from_record(&merged, &self.defaults)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use proptest::prelude::*;

    use super::*;
    use crate::platform::{CookieStore, MemoryCookieJar, MemoryStore};
    use crate::record::ErasePolicy;

    fn local() -> (Rc<MemoryStore>, SettingsReconciler) {
        local_with(ReconcilerConfig::default())
    }

    fn local_with(config: ReconcilerConfig) -> (Rc<MemoryStore>, SettingsReconciler) {
        let store = Rc::new(MemoryStore::new());
        let backend = Backend::Local(Box::new(Rc::clone(&store)));
        (store, SettingsReconciler::new(config, backend))
    }

    fn cookie() -> (Rc<CookieStore<MemoryCookieJar>>, SettingsReconciler) {
        let store = Rc::new(CookieStore::new(MemoryCookieJar::new(), "/", 31_536_000));
        let backend = Backend::Cookie(Box::new(Rc::clone(&store)));
        (store, SettingsReconciler::new(ReconcilerConfig::default(), backend))
    }

    fn alice() -> PasteSettings {
        PasteSettings {
            author: "Alice".into(),
            lang: "Go".into(),
            theme: "Monokai".into(),
        }
    }

    #[test]
    fn test_resolve_without_stored_data_is_defaults() {
        let (_, reconciler) = local();
        assert_eq!(reconciler.resolve(), PasteSettings::default());
        let (_, reconciler) = cookie();
        assert_eq!(reconciler.resolve(), PasteSettings::default());
    }

    #[test]
    fn test_round_trip_local() {
        let (store, reconciler) = local();
        assert!(reconciler.save(&alice()));
        assert_eq!(store.get_item("paste_lang").unwrap().as_deref(), Some("Go"));
        assert_eq!(reconciler.resolve(), alice());
    }

    #[test]
    fn test_round_trip_cookie() {
        let (store, reconciler) = cookie();
        assert!(reconciler.save(&alice()));
        let raw = store.get_item("pastesettings").unwrap().unwrap();
        assert_eq!(
            raw,
            r#"{"paste_author":"Alice","paste_lang":"Go","paste_theme":"Monokai"}"#
        );
        assert_eq!(store.jar().attributes("pastesettings")[0], "Path=/");
        assert_eq!(reconciler.resolve(), alice());
    }

    #[test]
    fn test_local_empty_string_overrides_default() {
        let (store, reconciler) = local_with(ReconcilerConfig {
            default_lang: "Rust".into(),
            ..ReconcilerConfig::default()
        });
        store.set_item("paste_author", "").unwrap();
        store.set_item("paste_theme", "").unwrap();
        let settings = reconciler.resolve();
        assert_eq!(settings.author, "");
        assert_eq!(settings.theme, "");
        assert_eq!(settings.lang, "Rust");
    }

    #[test]
    fn test_local_read_failure_keeps_defaults() {
        let (store, reconciler) = local();
        reconciler.save(&alice());
        store.set_disabled(true);
        assert_eq!(reconciler.resolve(), PasteSettings::default());
        assert!(!reconciler.save(&alice()));
    }

    #[test]
    fn test_persist_local_skips_absent_and_empty() {
        let (store, reconciler) = local();
        let record = SettingsRecord::new()
            .with_erased("paste_author")
            .with("paste_lang", "")
            .with("paste_onhold", "yes");
        assert!(reconciler.persist(&record));
        assert_eq!(store.get_item("paste_author").unwrap().as_deref(), Some(""));
        assert_eq!(store.get_item("paste_lang").unwrap(), None);
        assert_eq!(store.get_item("paste_onhold").unwrap(), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_persist_local_reports_quota_failure() {
        let store = Rc::new(MemoryStore::with_quota(2));
        let reconciler = SettingsReconciler::new(
            ReconcilerConfig::default(),
            Backend::Local(Box::new(Rc::clone(&store))),
        );
        assert!(!reconciler.save(&alice()));
        // keys before the failing one are still written
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_cookie_erasure_is_written_as_empty() {
        let (store, reconciler) = cookie();
        let record = alice().to_record().with_erased("paste_author");
        assert!(reconciler.persist(&record));
        let raw = store.get_item("pastesettings").unwrap().unwrap();
        assert!(raw.contains(r#""paste_author":"""#), "{raw}");
        assert_eq!(reconciler.resolve().author, "");
    }

    #[test]
    fn test_cookie_malformed_yields_defaults() {
        for raw in ["{not json", "[1,2,3]", "\"Alice\"", "null"] {
            let (store, reconciler) = cookie();
            store.set_item("pastesettings", raw).unwrap();
            assert_eq!(reconciler.resolve(), PasteSettings::default(), "{raw}");
        }
    }

    #[test]
    fn test_cookie_falsy_values_keep_defaults() {
        let (store, reconciler) = cookie();
        store
            .set_item(
                "pastesettings",
                r#"{"paste_author":null,"paste_lang":"","paste_theme":"Monokai","paste_private":true}"#,
            )
            .unwrap();
        assert_eq!(
            reconciler.resolve(),
            PasteSettings::with_defaults("Python", "Monokai")
        );
    }

    #[test]
    fn test_cookie_legacy_keys() {
        let (store, reconciler) = cookie();
        store
            .set_item("pastesettings", r#"{"author":"Bob","lang":"C","theme":"Twilight"}"#)
            .unwrap();
        assert_eq!(
            reconciler.resolve(),
            PasteSettings {
                author: "Bob".into(),
                lang: "C".into(),
                theme: "Twilight".into(),
            }
        );
    }

    #[test]
    fn test_update_language() {
        let (_, reconciler) = local();
        let updated = reconciler.update(&SettingsRecord::new().with("paste_lang", "Rust"));
        assert_eq!(updated, PasteSettings::with_defaults("Rust", "Solarized Dark"));
        assert_eq!(reconciler.resolve(), updated);
    }

    #[test]
    fn test_update_null_author_erases_under_honor() {
        let (store, reconciler) = local();
        reconciler.save(&alice());
        let updated = reconciler.update(&SettingsRecord::new().with_erased("paste_author"));
        assert_eq!(updated.author, "");
        assert_eq!(store.get_item("paste_author").unwrap().as_deref(), Some(""));
        assert_eq!(reconciler.resolve().author, "");
        assert_eq!(reconciler.resolve().lang, "Go");
    }

    #[test]
    fn test_update_null_author_ignored_under_ignore() {
        let (_, reconciler) = local_with(ReconcilerConfig {
            erase_policy: ErasePolicy::Ignore,
            ..ReconcilerConfig::default()
        });
        reconciler.save(&alice());
        let updated = reconciler.update(&SettingsRecord::new().with_erased("paste_author"));
        assert_eq!(updated, alice());
        assert_eq!(reconciler.resolve(), alice());
    }

    #[test]
    fn test_update_through_cookie_accepts_legacy_keys() {
        let (_, reconciler) = cookie();
        reconciler.save(&alice());
        let updated = reconciler.update(&SettingsRecord::new().with("theme", "Dawn"));
        assert_eq!(updated.theme, "Dawn");
        assert_eq!(reconciler.resolve().theme, "Dawn");
        assert_eq!(reconciler.resolve().author, "Alice");
    }

    #[test]
    fn test_cookie_update_keeps_unrecognized_keys() {
        let (store, reconciler) = cookie();
        reconciler.update(&SettingsRecord::new().with("paste_onhold", "yes"));
        let updated = reconciler.update(&SettingsRecord::new().with("paste_lang", "Rust"));
        assert_eq!(updated.lang, "Rust");

        let raw = store.get_item("pastesettings").unwrap().unwrap();
        let stored = SettingsRecord::from_json(&raw).unwrap();
        assert_eq!(stored.value("paste_onhold"), Some("yes"), "{raw}");
        assert_eq!(stored.value("paste_lang"), Some("Rust"));
        assert_eq!(stored.value("paste_theme"), Some("Solarized Dark"));
    }

    #[test]
    fn test_erased_lang_falls_back_to_default_local() {
        let (store, reconciler) = local();
        reconciler.save(&alice());
        let updated = reconciler.update(&SettingsRecord::new().with_erased("paste_lang"));
        assert_eq!(updated.lang, "Python");
        assert_eq!(updated.author, "Alice");
        assert_eq!(store.get_item("paste_lang").unwrap(), None);
        assert_eq!(reconciler.resolve(), updated);
    }

    #[test]
    fn test_erased_theme_falls_back_to_default_cookie() {
        let (_, reconciler) = cookie();
        reconciler.save(&alice());
        let updated = reconciler.update(&SettingsRecord::new().with_erased("paste_theme"));
        assert_eq!(updated.theme, "Solarized Dark");
        assert_eq!(updated.lang, "Go");
        assert_eq!(reconciler.resolve(), updated);
    }

    fn setting_value() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 ;=\"%,é日本]{1,12}"
    }

    fn full_settings() -> impl Strategy<Value = PasteSettings> {
        (setting_value(), setting_value(), setting_value()).prop_map(|(author, lang, theme)| {
            PasteSettings {
                author,
                lang,
                theme,
            }
        })
    }

    proptest! {
        #[test]
        fn prop_round_trip_local(settings in full_settings()) {
            let (_, reconciler) = local();
            prop_assert!(reconciler.save(&settings));
            prop_assert_eq!(reconciler.resolve(), settings);
        }

        #[test]
        fn prop_round_trip_cookie(settings in full_settings()) {
            let (_, reconciler) = cookie();
            prop_assert!(reconciler.save(&settings));
            prop_assert_eq!(reconciler.resolve(), settings);
        }
    }
}
