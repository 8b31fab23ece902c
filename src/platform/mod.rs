//! Platform abstraction layer
//!
//! Handles browser/native differences for storage:
//! - LocalStorage (per-key strings) on web
//! - `document.cookie` as the fallback tier on web
//! - In-memory stores natively and in tests

pub mod cookie;
pub mod store;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use cookie::{CookieJar, CookieStore, MemoryCookieJar};
pub use store::{KeyValueStore, MemoryStore, StoreError, probe};
