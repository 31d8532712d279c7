use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocaleError {
    #[error("unsupported locale: {code:?}")]
    Unsupported { code: String },

    #[error("invalid dictionary JSON: {0}")]
    Catalog(#[from] serde_json::Error),
}

/// A supported site language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl Locale {
    pub const ALL: [Self; 2] = [Self::Fr, Self::En];

    /// Lowercase code as persisted, written to `<html lang>` and shown on the
    /// toggle.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Fr => "fr",
            Self::En => "en",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Fr => Self::En,
            Self::En => Self::Fr,
        }
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    /// Exact lowercase codes only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fr" => Ok(Self::Fr),
            "en" => Ok(Self::En),
            other => Err(LocaleError::Unsupported {
                code: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_parse_back() {
        for locale in Locale::ALL {
            assert_eq!(locale.code().parse::<Locale>().unwrap(), locale);
        }
    }

    #[test]
    fn only_exact_codes_are_accepted() {
        for bad in ["", "de", "FR", "fr-FR", " en"] {
            let err = bad.parse::<Locale>().unwrap_err();
            assert!(matches!(err, LocaleError::Unsupported { .. }), "{bad:?}");
        }
    }

    #[test]
    fn toggle_is_an_involution() {
        assert_eq!(Locale::Fr.toggled(), Locale::En);
        assert_eq!(Locale::Fr.toggled().toggled(), Locale::Fr);
        assert_eq!(Locale::default(), Locale::Fr);
    }

    #[test]
    fn serde_uses_lowercase_codes() {
        assert_eq!(serde_json::to_string(&Locale::En).unwrap(), "\"en\"");
        let parsed: Locale = serde_json::from_str("\"fr\"").unwrap();
        assert_eq!(parsed, Locale::Fr);
    }
}
