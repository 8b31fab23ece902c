//! Cookie-backed storage
//!
//! A [`CookieStore`] treats each cookie as one key-value item: the key is the
//! cookie name, the value is percent-encoded on write and decoded on read.

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::store::{KeyValueStore, StoreError};

/// Raw access to a cookie jar, shaped after `document.cookie`
pub trait CookieJar {
    /// All visible cookies as `name=value; name2=value2`
    fn cookie_header(&self) -> Result<String, StoreError>;
    /// Apply one `name=value; Attr=...` assignment
    fn write(&self, assignment: &str) -> Result<(), StoreError>;
}

/// Find the raw (still encoded) value of cookie `name` in a cookie header
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}

/// Decode a cookie value, falling back to the raw text if it is not valid
/// percent-encoding
pub fn decode_value(raw: &str) -> String {
    let unquoted = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    match urlencoding::decode(unquoted) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            log::debug!("Cookie value is not percent-encoded ({e}), using raw text");
            unquoted.to_string()
        }
    }
}

/// Build a cookie assignment with the value percent-encoded
pub fn format_cookie(name: &str, value: &str, path: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; Path={}; Max-Age={}; SameSite=Lax",
        name,
        urlencoding::encode(value),
        path,
        max_age_secs
    )
}

/// Key-value view over a cookie jar
#[derive(Debug)]
pub struct CookieStore<J> {
    jar: J,
    path: String,
    max_age_secs: u64,
}

impl<J: CookieJar> CookieStore<J> {
    pub fn new(jar: J, path: impl Into<String>, max_age_secs: u64) -> Self {
        Self {
            jar,
            path: path.into(),
            max_age_secs,
        }
    }

    pub fn jar(&self) -> &J {
        &self.jar
    }
}

impl<J: CookieJar> KeyValueStore for CookieStore<J> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let header = self.jar.cookie_header()?;
        Ok(find_cookie(&header, key).map(decode_value))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.jar
            .write(&format_cookie(key, value, &self.path, self.max_age_secs))
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.jar.write(&format_cookie(key, "", &self.path, 0))
    }
}

/// In-memory cookie jar honoring `Max-Age=0` deletion
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: RefCell<BTreeMap<String, String>>,
    /// Attributes of the last assignment, keyed by cookie name
    attributes: RefCell<BTreeMap<String, Vec<String>>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes (`Path=/`, ...) sent with the last write of `name`
    pub fn attributes(&self, name: &str) -> Vec<String> {
        self.attributes
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }
}

impl CookieJar for MemoryCookieJar {
    fn cookie_header(&self) -> Result<String, StoreError> {
        let cookies = self.cookies.borrow();
        let pairs: Vec<String> = cookies.iter().map(|(k, v)| format!("{k}={v}")).collect();
        Ok(pairs.join("; "))
    }

    fn write(&self, assignment: &str) -> Result<(), StoreError> {
        let mut parts = assignment.split(';').map(str::trim);
        let (name, value) = parts
            .next()
            .and_then(|pair| pair.split_once('='))
            .ok_or_else(|| StoreError::Js(format!("malformed cookie assignment: {assignment}")))?;
        let attributes: Vec<String> = parts.map(str::to_string).collect();
        let expired = attributes
            .iter()
            .any(|attr| attr.eq_ignore_ascii_case("max-age=0"));

        if expired {
            self.cookies.borrow_mut().remove(name);
        } else {
            self.cookies
                .borrow_mut()
                .insert(name.to_string(), value.to_string());
        }
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), attributes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_cookie() {
        let header = "theme=dark; pastesettings=%7B%7D;other=1";
        assert_eq!(find_cookie(header, "pastesettings"), Some("%7B%7D"));
        assert_eq!(find_cookie(header, "other"), Some("1"));
        assert_eq!(find_cookie(header, "paste"), None);
        assert_eq!(find_cookie("", "paste"), None);
    }

    #[test]
    fn test_decode_value() {
        assert_eq!(
            decode_value("%7B%22paste_lang%22%3A%22Rust%22%7D"),
            r#"{"paste_lang":"Rust"}"#
        );
        assert_eq!(decode_value("\"quoted%20value\""), "quoted value");
        assert_eq!(decode_value("%FF%FE"), "%FF%FE");
    }

    #[test]
    fn test_format_cookie() {
        assert_eq!(
            format_cookie("pastesettings", r#"{"a":"b c"}"#, "/", 31_536_000),
            "pastesettings=%7B%22a%22%3A%22b%20c%22%7D; Path=/; Max-Age=31536000; SameSite=Lax"
        );
    }

    #[test]
    fn test_cookie_store_round_trip() {
        let store = CookieStore::new(MemoryCookieJar::new(), "/", 60);
        assert_eq!(store.get_item("pastesettings").unwrap(), None);

        let json = r#"{"paste_author":"Ann; Lee=1"}"#;
        store.set_item("pastesettings", json).unwrap();
        assert_eq!(store.get_item("pastesettings").unwrap().as_deref(), Some(json));
        assert_eq!(
            store.jar().attributes("pastesettings"),
            vec!["Path=/", "Max-Age=60", "SameSite=Lax"]
        );

        store.remove_item("pastesettings").unwrap();
        assert_eq!(store.get_item("pastesettings").unwrap(), None);
    }

    #[test]
    fn test_memory_jar_rejects_malformed_assignment() {
        let jar = MemoryCookieJar::new();
        assert!(matches!(jar.write("no-equals-sign"), Err(StoreError::Js(_))));
    }
}
