#![forbid(unsafe_code)]

//! Translation dictionary: locale → key → display string.
//!
//! # Invariants
//!
//! 1. Immutable after construction.
//! 2. Every key of one locale should exist in the other. A gap is tolerated at
//!    lookup time (the element keeps its current text) and reported by
//!    [`Dictionary::missing_keys`]; the built-in catalog is checked for gaps
//!    in debug builds.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

use crate::locale::{Locale, LocaleError};

/// `(key, fr, en)` rows of the shipped catalog.
const CATALOG: &[(&str, &str, &str)] = &[
    ("nav.home", "Accueil", "Home"),
    ("nav.services", "Services", "Services"),
    ("nav.about", "À propos", "About"),
    ("nav.projects", "Réalisations", "Projects"),
    ("nav.partners", "Partenaires", "Partners"),
    ("nav.contact", "Contact", "Contact"),
    ("hero.title", "L'industrie, réinventée", "Industry, reinvented"),
    (
        "hero.subtitle",
        "Conception, fabrication et assemblage de structures métalliques",
        "Design, fabrication and assembly of steel structures",
    ),
    ("hero.cta", "Demander un devis", "Request a quote"),
    ("hero.secondary", "Découvrir nos offres", "Explore our offers"),
    ("services.title", "Nos savoir-faire", "What we do"),
    ("services.steel", "Charpente métallique", "Steel framing"),
    ("services.machining", "Usinage de précision", "Precision machining"),
    ("services.assembly", "Assemblage sur site", "On-site assembly"),
    ("services.maintenance", "Maintenance industrielle", "Industrial maintenance"),
    ("about.title", "Qui sommes-nous", "Who we are"),
    (
        "about.text",
        "Une équipe d'ingénieurs et d'artisans au service de vos projets.",
        "A team of engineers and craftspeople working on your projects.",
    ),
    ("stats.projects", "Projets livrés", "Projects delivered"),
    ("stats.clients", "Clients fidèles", "Returning clients"),
    ("stats.years", "Années d'expérience", "Years of experience"),
    ("partners.title", "Ils nous font confiance", "They trust us"),
    ("contact.title", "Parlons de votre projet", "Let's talk about your project"),
    ("contact.name", "Votre nom", "Your name"),
    ("contact.email", "Votre e-mail", "Your email"),
    ("contact.message", "Votre message", "Your message"),
    ("contact.send", "Envoyer", "Send"),
    ("footer.rights", "Tous droits réservés", "All rights reserved"),
];

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    fr: BTreeMap<String, String>,
    #[serde(default)]
    en: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    fr: BTreeMap<String, String>,
    en: BTreeMap<String, String>,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Dictionary {
    /// The catalog shipped with the site.
    #[must_use]
    pub fn builtin() -> Self {
        let mut fr = BTreeMap::new();
        let mut en = BTreeMap::new();
        for &(key, fr_text, en_text) in CATALOG {
            fr.insert(key.to_string(), fr_text.to_string());
            en.insert(key.to_string(), en_text.to_string());
        }
        let dict = Self { fr, en };
        debug_assert!(
            dict.missing_keys().is_empty(),
            "built-in catalog has gaps: {:?}",
            dict.missing_keys()
        );
        dict
    }

    /// Parse `{"fr": {...}, "en": {...}}`. Gaps are logged, not rejected.
    pub fn from_json(json: &str) -> Result<Self, LocaleError> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        let dict = Self {
            fr: raw.fr,
            en: raw.en,
        };
        let missing = dict.missing_keys();
        if !missing.is_empty() {
            warn!(count = missing.len(), "dictionary keys missing in one locale");
        }
        Ok(dict)
    }

    fn table(&self, locale: Locale) -> &BTreeMap<String, String> {
        match locale {
            Locale::Fr => &self.fr,
            Locale::En => &self.en,
        }
    }

    #[must_use]
    pub fn lookup(&self, locale: Locale, key: &str) -> Option<&str> {
        self.table(locale).get(key).map(String::as_str)
    }

    /// Keys present in one locale but absent from the other, paired with the
    /// locale that lacks them.
    #[must_use]
    pub fn missing_keys(&self) -> Vec<(Locale, String)> {
        let mut missing = Vec::new();
        for key in self.fr.keys().filter(|k| !self.en.contains_key(*k)) {
            missing.push((Locale::En, key.clone()));
        }
        for key in self.en.keys().filter(|k| !self.fr.contains_key(*k)) {
            missing.push((Locale::Fr, key.clone()));
        }
        missing
    }

    /// All keys known to either locale, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let mut keys: Vec<&str> = self
            .fr
            .keys()
            .chain(self.en.keys().filter(|k| !self.fr.contains_key(*k)))
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_is_complete_in_both_locales() {
        let dict = Dictionary::builtin();
        assert!(dict.missing_keys().is_empty());
        assert_eq!(dict.keys().count(), CATALOG.len());
        assert_eq!(dict.lookup(Locale::Fr, "nav.about"), Some("À propos"));
        assert_eq!(dict.lookup(Locale::En, "nav.about"), Some("About"));
    }

    #[test]
    fn catalog_keys_are_unique() {
        let mut keys: Vec<&str> = CATALOG.iter().map(|(k, _, _)| *k).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), CATALOG.len());
    }

    #[test]
    fn json_gaps_are_reported() {
        let dict = Dictionary::from_json(
            r#"{"fr":{"a":"A-fr","b":"B-fr"},"en":{"a":"A-en","c":"C-en"}}"#,
        )
        .unwrap();
        assert_eq!(
            dict.missing_keys(),
            vec![(Locale::En, "b".to_string()), (Locale::Fr, "c".to_string())]
        );
        assert_eq!(dict.lookup(Locale::En, "b"), None);
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn bad_json_is_a_catalog_error() {
        let err = Dictionary::from_json("[]").unwrap_err();
        assert!(matches!(err, LocaleError::Catalog(_)));
    }
}
