//! Reconciler configuration
//!
//! Every field has a default, so an empty object (or no config at all) gives
//! the stock paste tool behavior.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::record::ErasePolicy;
use crate::settings::PasteSettings;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid reconciler config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cookie name must not be empty or contain `=`, `;` or whitespace: {0:?}")]
    CookieName(String),
    #[error("cookie path must start with `/` and not contain `;` or control characters: {0:?}")]
    CookiePath(String),
}

/// Cookie fallback attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    /// Lifetime in days
    pub max_age_days: u32,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: COOKIE_NAME.to_string(),
            path: COOKIE_PATH.to_string(),
            max_age_days: COOKIE_MAX_AGE_DAYS,
        }
    }
}

impl CookieConfig {
    pub fn max_age_secs(&self) -> u64 {
        u64::from(self.max_age_days) * 24 * 60 * 60
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Language used when none is stored
    pub default_lang: String,
    /// Theme used when none is stored
    pub default_theme: String,
    pub cookie: CookieConfig,
    /// Whether `update` lets `null` erase a stored value
    pub erase_policy: ErasePolicy,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            default_lang: DEFAULT_LANG.to_string(),
            default_theme: DEFAULT_THEME.to_string(),
            cookie: CookieConfig::default(),
            erase_policy: ErasePolicy::default(),
        }
    }
}

impl ReconcilerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.cookie.name;
        if name.is_empty() || name.contains(['=', ';']) || name.contains(char::is_whitespace) {
            return Err(ConfigError::CookieName(name.clone()));
        }
        let path = &self.cookie.path;
        if !path.starts_with('/') || path.contains(';') || path.contains(char::is_control) {
            return Err(ConfigError::CookiePath(path.clone()));
        }
        Ok(())
    }

    /// The default settings record
    pub fn defaults(&self) -> PasteSettings {
        PasteSettings::with_defaults(&self.default_lang, &self.default_theme)
    }
}
