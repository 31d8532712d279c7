#![forbid(unsafe_code)]

//! The language preference manager.
//!
//! # State machine
//!
//! ```text
//!            init (document loading)         Ready
//!   Idle ─────────────────────────► Waiting ───────┐
//!    │                                             ▼
//!    └──── init (document parsed) ──────────────► Active ──destroy──► Destroyed
//! ```
//!
//! While active the locale flips between `fr` and `en` on each toggle click.
//!
//! # Failure Modes
//!
//! - Unsupported locale codes are logged and rejected; nothing changes.
//! - Storage failures are logged; the page still switches language.
//! - Keys missing from the dictionary leave their element untouched.

use tracing::{debug, info, warn};
use voors_core::{
    Dispatch, DomEvent, ElementId, EventKind, EventSink, EventTarget, Host, HostEvent,
    KeyValueStore, ListenerId, Marker, ResourceLedger, TeardownReport,
};

use crate::config::LanguageConfig;
use crate::dictionary::Dictionary;
use crate::locale::{Locale, LocaleError};

/// The manager owns every resource it registers.
const OWNER: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Waiting,
    Active,
    Destroyed,
}

pub struct LanguagePreferenceManager {
    config: LanguageConfig,
    dictionary: Dictionary,
    store: Box<dyn KeyValueStore>,
    active: Locale,
    toggle: Option<ElementId>,
    targets: Vec<ElementId>,
    ready: Option<ListenerId>,
    click: Option<ListenerId>,
    ledger: ResourceLedger,
    phase: Phase,
}

impl std::fmt::Debug for LanguagePreferenceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguagePreferenceManager")
            .field("phase", &self.phase)
            .field("active", &self.active)
            .field("toggle", &self.toggle)
            .field("targets", &self.targets.len())
            .finish_non_exhaustive()
    }
}

impl LanguagePreferenceManager {
    #[must_use]
    pub fn new(config: LanguageConfig, store: Box<dyn KeyValueStore>) -> Self {
        Self::with_dictionary(config, Dictionary::builtin(), store)
    }

    #[must_use]
    pub fn with_dictionary(
        config: LanguageConfig,
        dictionary: Dictionary,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        let active = config.default_locale;
        Self {
            config,
            dictionary,
            store,
            active,
            toggle: None,
            targets: Vec::new(),
            ready: None,
            click: None,
            ledger: ResourceLedger::new(),
            phase: Phase::Idle,
        }
    }

    #[inline]
    #[must_use]
    pub fn active_locale(&self) -> Locale {
        self.active
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Whether toggle clicks are matched through a document-level listener.
    #[must_use]
    pub fn is_delegated(&self) -> bool {
        self.click.is_some() && self.toggle.is_none()
    }

    #[must_use]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    #[must_use]
    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn init(&mut self, host: &mut dyn Host) {
        match self.phase {
            Phase::Waiting | Phase::Active => {
                debug!("language manager already initialized");
                return;
            }
            Phase::Idle | Phase::Destroyed => {}
        }
        self.ledger.reopen();

        if host.document_loading() {
            match self.ledger.listen(host, OWNER, EventTarget::Document, EventKind::Ready) {
                Ok(listener) => {
                    self.ready = Some(listener);
                    self.phase = Phase::Waiting;
                    debug!("language init deferred until document ready");
                    return;
                }
                Err(err) => warn!(%err, "ready listener refused; initializing now"),
            }
        }
        self.finish_init(host);
    }

    fn finish_init(&mut self, host: &mut dyn Host) {
        self.toggle = host.query(Marker::LangSwitch);
        self.targets = host.query_all(Marker::I18n);

        let target = match self.toggle {
            Some(toggle) => EventTarget::Element(toggle),
            None => EventTarget::Document,
        };
        self.click = match self.ledger.listen(host, OWNER, target, EventKind::Click) {
            Ok(listener) => Some(listener),
            Err(err) => {
                warn!(%err, "language toggle listener refused");
                None
            }
        };

        self.phase = Phase::Active;
        let initial = self.stored_locale();
        self.apply_locale(host, initial);
        info!(
            locale = %initial,
            targets = self.targets.len(),
            delegated = self.toggle.is_none(),
            "language manager initialized"
        );
    }

    fn stored_locale(&self) -> Locale {
        match self.store.get(&self.config.storage_key) {
            Ok(Some(code)) => code.parse().unwrap_or_else(|_| {
                debug!(%code, "stored locale unrecognized; using default");
                self.config.default_locale
            }),
            Ok(None) => self.config.default_locale,
            Err(err) => {
                warn!(%err, "language preference unreadable");
                self.config.default_locale
            }
        }
    }

    /// Switch to the locale named by `code`.
    pub fn apply_language(&mut self, host: &mut dyn Host, code: &str) -> Result<(), LocaleError> {
        let locale = code.parse::<Locale>().inspect_err(|err| {
            warn!(%err, "language change ignored");
        })?;
        self.apply_locale(host, locale);
        Ok(())
    }

    /// Flip between the two locales.
    pub fn toggle(&mut self, host: &mut dyn Host) -> Locale {
        let next = self.active.toggled();
        self.apply_locale(host, next);
        next
    }

    fn apply_locale(&mut self, host: &mut dyn Host, locale: Locale) {
        self.active = locale;
        if let Err(err) = self.store.set(&self.config.storage_key, locale.code()) {
            warn!(%err, "language preference not persisted");
        }
        host.set_document_lang(locale.code());

        let mut written = 0usize;
        for &el in &self.targets {
            let Some(key) = host.attribute(el, "data-i18n") else {
                continue;
            };
            let Some(text) = self.dictionary.lookup(locale, &key) else {
                debug!(%key, %locale, "no translation; element left as is");
                continue;
            };
            if voors_core::host::is_input_like(&host.tag_name(el)) {
                host.set_attribute(el, "placeholder", text);
            } else {
                host.set_text(el, text);
            }
            written += 1;
        }

        for toggle in host.query_all(Marker::LangSwitch) {
            host.set_text(toggle, locale.code());
        }
        debug!(%locale, written, "language applied");
    }

    /// Remove every listener. Safe to call more than once.
    pub fn destroy(&mut self, host: &mut dyn Host) -> TeardownReport {
        if self.phase == Phase::Destroyed || self.phase == Phase::Idle {
            return TeardownReport::default();
        }
        let report = self.ledger.release_all(host);
        self.ready = None;
        self.click = None;
        self.toggle = None;
        self.targets.clear();
        self.phase = Phase::Destroyed;
        report
    }

    fn on_click(&mut self, host: &mut dyn Host, target: Option<ElementId>) -> Dispatch {
        if self.toggle.is_none() {
            let hit = target.and_then(|t| host.closest(t, Marker::LangSwitch));
            if hit.is_none() {
                return Dispatch::default();
            }
        }
        let locale = self.toggle(host);
        debug!(%locale, "language toggled");
        Dispatch::prevent_default()
    }
}

impl EventSink for LanguagePreferenceManager {
    fn dispatch(&mut self, host: &mut dyn Host, event: &HostEvent) -> Dispatch {
        if !matches!(self.phase, Phase::Waiting | Phase::Active) {
            return Dispatch::default();
        }
        if self.ledger.route(event).is_none() {
            return Dispatch::default();
        }
        let HostEvent::Dom { listener, event } = event else {
            return Dispatch::default();
        };
        let listener = Some(*listener);

        match event {
            DomEvent::Ready if listener == self.ready && self.phase == Phase::Waiting => {
                if let Some(ready) = self.ready.take() {
                    if let Err(err) = self.ledger.unlisten(host, ready) {
                        warn!(%err, "ready listener removal failed");
                    }
                }
                self.finish_init(host);
                Dispatch::handled()
            }
            DomEvent::Click { target } if listener == self.click => self.on_click(host, *target),
            _ => Dispatch::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voors_core::MemoryStore;

    #[test]
    fn new_manager_starts_idle_on_default_locale() {
        let config = LanguageConfig {
            default_locale: Locale::En,
            ..LanguageConfig::default()
        };
        let manager = LanguagePreferenceManager::new(config, Box::new(MemoryStore::new()));
        assert_eq!(manager.active_locale(), Locale::En);
        assert!(!manager.is_active());
        assert!(!manager.is_delegated());
        assert_eq!(manager.ledger().active_listeners(), 0);
    }

    #[test]
    fn builtin_dictionary_by_default() {
        let manager =
            LanguagePreferenceManager::new(LanguageConfig::default(), Box::new(MemoryStore::new()));
        assert_eq!(manager.dictionary().lookup(Locale::En, "contact.send"), Some("Send"));
    }
}
