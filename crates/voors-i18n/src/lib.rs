#![forbid(unsafe_code)]

//! Two-locale text substitution for the site.
//!
//! Elements marked `[data-i18n="key"]` receive the dictionary string for the
//! active [`Locale`]; the choice is persisted through a
//! [`KeyValueStore`](voors_core::KeyValueStore) and flipped by the
//! `[data-lang-switch]` control.

pub mod config;
pub mod dictionary;
pub mod locale;
pub mod manager;

pub use config::LanguageConfig;
pub use dictionary::Dictionary;
pub use locale::{Locale, LocaleError};
pub use manager::LanguagePreferenceManager;
