//! Page-level configuration.
//!
//! The page may embed a JSON object in `<script type="application/json"
//! id="voors-config">`. Every field is optional; an absent or blank block
//! means the shipped defaults.
//!
//! ```
//! use voors_web::SiteConfig;
//!
//! let cfg = SiteConfig::from_json(r#"{"log_level":"debug","language":{"default_locale":"en"}}"#).unwrap();
//! assert_eq!(cfg.log_level, "debug");
//! assert_eq!(cfg.animation.typing.type_ms, 44);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use voors_core::OrchestratorConfig;
use voors_i18n::LanguageConfig;

/// `id` of the inline script carrying the JSON configuration.
pub const CONFIG_ELEMENT_ID: &str = "voors-config";

#[derive(Debug, Error)]
pub enum SiteConfigError {
    #[error("invalid site configuration: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub animation: OrchestratorConfig,
    pub language: LanguageConfig,
    /// `tracing` filter directive, e.g. `"info"` or `"voors_core=debug"`.
    pub log_level: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            animation: OrchestratorConfig::default(),
            language: LanguageConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn from_json(json: &str) -> Result<Self, SiteConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse the inline block's text. Missing or whitespace-only text yields
    /// the defaults.
    pub fn from_embedded(text: Option<&str>) -> Result<Self, SiteConfigError> {
        match text.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(json) => Self::from_json(json),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use voors_i18n::Locale;

    #[test]
    fn blank_block_means_defaults() {
        assert_eq!(SiteConfig::from_embedded(None).unwrap(), SiteConfig::default());
        assert_eq!(
            SiteConfig::from_embedded(Some("  \n ")).unwrap(),
            SiteConfig::default()
        );
    }

    #[test]
    fn nested_overrides_keep_siblings() {
        let cfg = SiteConfig::from_embedded(Some(
            r#"{"animation":{"particles":{"count":12}},"language":{"storage_key":"voors.lang"}}"#,
        ))
        .unwrap();
        assert_eq!(cfg.animation.particles.count, 12);
        assert_eq!(cfg.animation.particles.wrap_margin, 20.0);
        assert_eq!(cfg.language.storage_key, "voors.lang");
        assert_eq!(cfg.language.default_locale, Locale::Fr);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn malformed_block_is_reported() {
        let err = SiteConfig::from_embedded(Some("{\"log_level\": 3}")).unwrap_err();
        assert!(err.to_string().starts_with("invalid site configuration"));
    }
}
