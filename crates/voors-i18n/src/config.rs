use serde::{Deserialize, Serialize};

use crate::locale::Locale;

/// Persistence and fallback settings for the language manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Storage key holding the preferred locale code.
    pub storage_key: String,
    /// Used when nothing (or something unrecognized) is stored.
    pub default_locale: Locale,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            storage_key: "lang".to_string(),
            default_locale: Locale::Fr,
        }
    }
}
