//! Paste settings and preference keys
//!
//! The typed view of a settings record. Persisted per key in LocalStorage, or
//! as one JSON cookie when LocalStorage is unavailable.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_LANG, DEFAULT_THEME};
use crate::record::SettingsRecord;

/// Recognized preference keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Author,
    Lang,
    Theme,
}

impl SettingKey {
    pub const ALL: [SettingKey; 3] = [SettingKey::Author, SettingKey::Lang, SettingKey::Theme];

    /// Storage key, also used in current cookies
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Author => "paste_author",
            SettingKey::Lang => "paste_lang",
            SettingKey::Theme => "paste_theme",
        }
    }

    /// Key name used by cookies written before the `paste_` prefix
    pub fn legacy_str(&self) -> &'static str {
        match self {
            SettingKey::Author => "author",
            SettingKey::Lang => "lang",
            SettingKey::Theme => "theme",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s || key.legacy_str() == s)
    }
}

/// Rename legacy keys (`author`, `lang`, `theme`) to their current names.
///
/// A current key already in the record wins over its legacy twin.
pub fn migrate_legacy_keys(record: &SettingsRecord) -> SettingsRecord {
    let mut migrated = record.clone();
    for key in SettingKey::ALL {
        if let Some(value) = migrated.remove(key.legacy_str()) {
            if !migrated.contains_key(key.as_str()) {
                migrated.insert(key.as_str(), value);
            }
        }
    }
    migrated
}

/// Effective paste preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteSettings {
    /// Display name attached to new pastes
    #[serde(rename = "paste_author")]
    pub author: String,
    /// Language (editor mode) name, as shown in the language menu
    #[serde(rename = "paste_lang")]
    pub lang: String,
    /// Editor theme name, as shown in the theme menu
    #[serde(rename = "paste_theme")]
    pub theme: String,
}

impl Default for PasteSettings {
    fn default() -> Self {
        Self::with_defaults(DEFAULT_LANG, DEFAULT_THEME)
    }
}

impl PasteSettings {
    /// Settings with no author and the given language/theme
    pub fn with_defaults(lang: impl Into<String>, theme: impl Into<String>) -> Self {
        Self {
            author: String::new(),
            lang: lang.into(),
            theme: theme.into(),
        }
    }

    pub fn get(&self, key: SettingKey) -> &str {
        match key {
            SettingKey::Author => &self.author,
            SettingKey::Lang => &self.lang,
            SettingKey::Theme => &self.theme,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: impl Into<String>) {
        let value = value.into();
        match key {
            SettingKey::Author => self.author = value,
            SettingKey::Lang => self.lang = value,
            SettingKey::Theme => self.theme = value,
        }
    }

    /// Fill every key from `record`, taking missing ones from `defaults`.
    ///
    /// An erased author becomes an empty string; an erased language or theme
    /// falls back to its default.
    pub fn from_record(record: &SettingsRecord, defaults: &PasteSettings) -> Self {
        let mut settings = defaults.clone();
        for key in SettingKey::ALL {
            match record.get(key.as_str()) {
                Some(Some(value)) => settings.set(key, value.as_str()),
                Some(None) if key == SettingKey::Author => settings.set(key, ""),
                Some(None) | None => {}
            }
        }
        settings
    }

    pub fn to_record(&self) -> SettingsRecord {
        SettingKey::ALL
            .into_iter()
            .map(|key| (key.as_str(), Some(self.get(key).to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let defaults = PasteSettings::default();
        assert_eq!(defaults.author, "");
        assert_eq!(defaults.lang, "Python");
        assert_eq!(defaults.theme, "Solarized Dark");
    }

    #[test]
    fn test_key_names() {
        assert_eq!(SettingKey::from_str("paste_lang"), Some(SettingKey::Lang));
        assert_eq!(SettingKey::from_str("theme"), Some(SettingKey::Theme));
        assert_eq!(SettingKey::from_str("paste_onhold"), None);
    }

    #[test]
    fn test_record_round_trip() {
        let settings = PasteSettings {
            author: "Alice".into(),
            lang: "Go".into(),
            theme: "Monokai".into(),
        };
        let record = settings.to_record();
        assert_eq!(record.value("paste_author"), Some("Alice"));
        assert_eq!(record.len(), 3);
        assert_eq!(PasteSettings::from_record(&record, &PasteSettings::default()), settings);
    }

    #[test]
    fn test_from_record_fills_defaults_and_erasures() {
        let record = SettingsRecord::new()
            .with_erased("paste_author")
            .with_erased("paste_lang")
            .with("paste_theme", "Monokai")
            .with("unrelated", "x");
        let defaults = PasteSettings {
            author: "Anon".into(),
            ..PasteSettings::default()
        };
        let settings = PasteSettings::from_record(&record, &defaults);
        assert_eq!(settings.author, "");
        assert_eq!(settings.lang, "Python");
        assert_eq!(settings.theme, "Monokai");
    }

    #[test]
    fn test_migrate_legacy_keys() {
        let record = SettingsRecord::new()
            .with("author", "Old")
            .with("lang", "Go")
            .with("paste_lang", "Rust")
            .with("paste_onhold", "yes");
        let migrated = migrate_legacy_keys(&record);
        assert_eq!(
            migrated,
            SettingsRecord::new()
                .with("paste_author", "Old")
                .with("paste_lang", "Rust")
                .with("paste_onhold", "yes")
        );
    }

    #[test]
    fn test_serde_uses_storage_key_names() {
        let json = serde_json::to_string(&PasteSettings::default()).unwrap();
        assert_eq!(
            json,
            r#"{"paste_author":"","paste_lang":"Python","paste_theme":"Solarized Dark"}"#
        );
    }
}
