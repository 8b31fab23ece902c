//! The paste page's form controls, read and written through the DOM

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlInputElement, HtmlSelectElement};

use super::SettingsForm;

/// Element ids of the paste form controls
#[derive(Debug, Clone)]
pub struct FormIds {
    pub author: String,
    pub lang: String,
    pub theme: String,
}

impl Default for FormIds {
    fn default() -> Self {
        Self {
            author: "paste-author-entry".to_string(),
            lang: "langselect".to_string(),
            theme: "themeselect".to_string(),
        }
    }
}

pub struct DomForm {
    author: Option<HtmlInputElement>,
    lang: Option<HtmlSelectElement>,
    theme: Option<HtmlSelectElement>,
}

impl DomForm {
    /// Look up the controls; missing ones read as empty and ignore writes
    pub fn new(document: &Document, ids: &FormIds) -> Self {
        let author = document
            .get_element_by_id(&ids.author)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
        let lang = document
            .get_element_by_id(&ids.lang)
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok());
        let theme = document
            .get_element_by_id(&ids.theme)
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok());
        if author.is_none() || lang.is_none() || theme.is_none() {
            log::warn!("Paste form is incomplete, some settings controls are missing");
        }
        Self { author, lang, theme }
    }

    /// The form on the current page
    pub fn from_page() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self::new(&document, &FormIds::default()))
    }
}

fn selected_text(select: Option<&HtmlSelectElement>) -> String {
    select
        .and_then(|s| u32::try_from(s.selected_index()).ok().and_then(|i| s.item(i)))
        .and_then(|option| option.text_content())
        .unwrap_or_default()
}

fn select_by_text(select: Option<&HtmlSelectElement>, name: &str, what: &str) -> bool {
    let Some(select) = select else {
        return false;
    };
    let found = (0..select.length()).find(|&i| {
        select
            .item(i)
            .and_then(|option| option.text_content())
            .is_some_and(|text| text == name)
    });
    match found {
        Some(i) => {
            select.set_selected_index(i as i32);
            true
        }
        None => {
            log::warn!("No {what} named: {name:?}");
            select.set_selected_index(0);
            false
        }
    }
}

impl SettingsForm for DomForm {
    fn author(&self) -> String {
        self.author.as_ref().map(|el| el.value()).unwrap_or_default()
    }

    fn lang(&self) -> String {
        selected_text(self.lang.as_ref())
    }

    fn theme(&self) -> String {
        selected_text(self.theme.as_ref())
    }

    fn set_author(&mut self, author: &str) {
        if let Some(el) = &self.author {
            el.set_value(author);
        }
    }

    fn select_lang(&mut self, name: &str) -> bool {
        select_by_text(self.lang.as_ref(), name, "mode")
    }

    fn select_theme(&mut self, name: &str) -> bool {
        select_by_text(self.theme.as_ref(), name, "theme")
    }
}
