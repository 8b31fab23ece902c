//! Language and theme catalogs, and a form backed by them

use serde::{Deserialize, Serialize};

use super::SettingsForm;

/// One menu entry: the display name and the editor identifier behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Display name, e.g. "Python"
    pub name: String,
    /// Editor identifier, e.g. "ace/mode/python"
    pub value: String,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Menu entries sorted by display name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut entries: Vec<CatalogEntry> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.position(name).map(|i| &self.entries[i])
    }
}

/// In-memory form over two catalogs, mirroring the page's selects
#[derive(Debug, Clone)]
pub struct CatalogForm {
    pub author: String,
    langs: Catalog,
    themes: Catalog,
    lang_index: usize,
    theme_index: usize,
}

impl CatalogForm {
    pub fn new(langs: Catalog, themes: Catalog) -> Self {
        Self {
            author: String::new(),
            langs,
            themes,
            lang_index: 0,
            theme_index: 0,
        }
    }

    /// Editor mode for the selected language
    pub fn selected_mode(&self) -> Option<&str> {
        self.langs
            .entries()
            .get(self.lang_index)
            .map(|e| e.value.as_str())
    }

    /// Editor theme identifier for the selected theme
    pub fn selected_theme_value(&self) -> Option<&str> {
        self.themes
            .entries()
            .get(self.theme_index)
            .map(|e| e.value.as_str())
    }
}

fn entry_name(catalog: &Catalog, index: usize) -> String {
    catalog
        .entries()
        .get(index)
        .map(|e| e.name.clone())
        .unwrap_or_default()
}

impl SettingsForm for CatalogForm {
    fn author(&self) -> String {
        self.author.clone()
    }

    fn lang(&self) -> String {
        entry_name(&self.langs, self.lang_index)
    }

    fn theme(&self) -> String {
        entry_name(&self.themes, self.theme_index)
    }

    fn set_author(&mut self, author: &str) {
        self.author = author.to_string();
    }

    fn select_lang(&mut self, name: &str) -> bool {
        let found = self.langs.position(name);
        if found.is_none() {
            log::warn!("No mode named: {name:?}");
        }
        self.lang_index = found.unwrap_or(0);
        found.is_some()
    }

    fn select_theme(&mut self, name: &str) -> bool {
        let found = self.themes.position(name);
        if found.is_none() {
            log::warn!("No theme named: {name:?}");
        }
        self.theme_index = found.unwrap_or(0);
        found.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs() -> Catalog {
        Catalog::new([
            CatalogEntry::new("Rust", "ace/mode/rust"),
            CatalogEntry::new("Python", "ace/mode/python"),
            CatalogEntry::new("Go", "ace/mode/golang"),
        ])
    }

    #[test]
    fn test_catalog_sorted_by_name() {
        let catalog = langs();
        let names: Vec<&str> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Go", "Python", "Rust"]);
        assert_eq!(catalog.get("Rust").map(|e| e.value.as_str()), Some("ace/mode/rust"));
        assert_eq!(catalog.position("Cobol"), None);
    }

    #[test]
    fn test_unknown_name_selects_first_entry() {
        let mut form = CatalogForm::new(langs(), Catalog::default());
        assert!(form.select_lang("Rust"));
        assert_eq!(form.selected_mode(), Some("ace/mode/rust"));

        assert!(!form.select_lang("Cobol"));
        assert_eq!(form.lang(), "Go");

        assert!(!form.select_theme("Monokai"));
        assert_eq!(form.theme(), "");
        assert_eq!(form.selected_theme_value(), None);
    }
}
