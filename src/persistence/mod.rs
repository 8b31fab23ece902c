//! Settings persistence with storage fallback
//!
//! Features:
//! - Backend chosen once by capability probe (LocalStorage, then cookie)
//! - Per-key LocalStorage layout, single JSON cookie layout
//! - Legacy cookie key migration
//! - Storage failures absorbed and logged, never surfaced

pub mod reconciler;

pub use reconciler::SettingsReconciler;

use crate::config::CookieConfig;
use crate::platform::{CookieStore, KeyValueStore, MemoryCookieJar, probe};

/// Which storage tier a backend uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// One item per setting key
    Local,
    /// One cookie holding the whole record as JSON
    Cookie,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Cookie => "cookie",
        }
    }
}

/// The storage tier selected for this page load
pub enum Backend {
    Local(Box<dyn KeyValueStore>),
    Cookie(Box<dyn KeyValueStore>),
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Backend").field(&self.kind()).finish()
    }
}

impl Backend {
    /// Prefer `local` when it passes the write probe, else use `cookie`
    pub fn select(local: Option<Box<dyn KeyValueStore>>, cookie: Box<dyn KeyValueStore>) -> Self {
        match local {
            Some(store) => match probe(store.as_ref()) {
                Ok(()) => {
                    log::debug!("Using local storage for settings");
                    Backend::Local(store)
                }
                Err(e) => {
                    log::warn!("Local storage unusable ({e}), falling back to cookie");
                    Backend::Cookie(cookie)
                }
            },
            None => {
                log::info!("No local storage, using cookie for settings");
                Backend::Cookie(cookie)
            }
        }
    }

    /// Probe the browser's storage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn detect(cookie: &CookieConfig) -> Self {
        use crate::platform::web::{DocumentCookies, WebLocalStorage};

        let local = match WebLocalStorage::open() {
            Ok(storage) => Some(Box::new(storage) as Box<dyn KeyValueStore>),
            Err(e) => {
                log::warn!("LocalStorage unavailable: {e}");
                None
            }
        };
        let cookies: Box<dyn KeyValueStore> = match DocumentCookies::open() {
            Ok(jar) => Box::new(CookieStore::new(jar, &cookie.path, cookie.max_age_secs())),
            Err(e) => {
                log::warn!("Cookies unavailable ({e}), settings will not persist");
                Box::new(CookieStore::new(
                    MemoryCookieJar::new(),
                    &cookie.path,
                    cookie.max_age_secs(),
                ))
            }
        };
        Self::select(local, cookies)
    }

    /// Native stub: in-memory storage for the lifetime of the process
    #[cfg(not(target_arch = "wasm32"))]
    pub fn detect(cookie: &CookieConfig) -> Self {
        let cookies = CookieStore::new(MemoryCookieJar::new(), &cookie.path, cookie.max_age_secs());
        let local = crate::platform::MemoryStore::new();
        Self::select(Some(Box::new(local)), Box::new(cookies))
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Local(_) => BackendKind::Local,
            Backend::Cookie(_) => BackendKind::Cookie,
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        match self {
            Backend::Local(store) | Backend::Cookie(store) => store.as_ref(),
        }
    }
}
