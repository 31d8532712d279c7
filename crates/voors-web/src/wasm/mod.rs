//! Browser boot: configuration, logging, and the page runtime.
//!
//! `start` runs when the module is instantiated. If the document is still
//! parsing, the runtime is built on `DOMContentLoaded`; otherwise right away.
//! The runtime then lives in a thread-local [`Pump`] until [`teardown`].

mod host;
mod pump;
mod storage;

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{info, warn};
use voors_core::{AnimationOrchestrator, Host, TeardownReport};
use voors_i18n::LanguagePreferenceManager;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, Window};

use crate::config::{CONFIG_ELEMENT_ID, SiteConfig};
use crate::logging;
use crate::slot::Take;

use host::{WebHost, is_loading};
use pump::{Pump, Runtime};
use storage::LocalStorageStore;

thread_local! {
    static PUMP: RefCell<Option<Rc<Pump>>> = const { RefCell::new(None) };
}

fn read_config(document: &Document) -> SiteConfig {
    let text = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content());
    SiteConfig::from_embedded(text.as_deref()).unwrap_or_else(|err| {
        // The subscriber is not installed yet.
        web_sys::console::warn_1(&JsValue::from_str(&err.to_string()));
        SiteConfig::default()
    })
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    #[cfg(feature = "panic-hook")]
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let config = read_config(&document);
    logging::init(&config.log_level);

    if is_loading(&document) {
        let target = document.clone();
        let boot = Closure::once_into_js(move || boot(window, document, config));
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            "DOMContentLoaded",
            boot.unchecked_ref(),
            &options,
        )?;
        info!("boot deferred until DOMContentLoaded");
    } else {
        boot(window, document, config);
    }
    Ok(())
}

fn boot(window: Window, document: Document, config: SiteConfig) {
    if PUMP.with(|slot| slot.borrow().is_some()) {
        warn!("runtime already booted; replacing it");
        teardown();
    }
    let pump = Rc::new(Pump::default());
    let store = LocalStorageStore::open(&window);
    pump.install(Runtime {
        host: WebHost::new(window, document, Rc::downgrade(&pump)),
        animations: AnimationOrchestrator::new(config.animation),
        language: LanguagePreferenceManager::new(config.language, Box::new(store)),
    });
    pump.with_runtime(|rt| {
        let host: &mut dyn Host = &mut rt.host;
        rt.language.init(host);
        rt.animations.init(host);
    });
    PUMP.with(|slot| *slot.borrow_mut() = Some(pump));
}

fn log_report(component: &str, report: &TeardownReport) {
    if report.is_clean() {
        info!(component, actions = report.actions_run, "teardown complete");
    }
    for failure in &report.failures {
        warn!(component, %failure, "teardown step failed");
    }
}

/// Release every frame, timer, observer, and listener the runtime holds.
///
/// A runtime that is mid-dispatch stays registered, so a later call can
/// still release it.
#[wasm_bindgen]
pub fn teardown() {
    let Some(pump) = PUMP.with(|slot| slot.borrow().clone()) else {
        return;
    };
    match pump.take() {
        Take::Taken(mut rt) => {
            PUMP.with(|slot| slot.borrow_mut().take());
            log_report("animations", &rt.animations.destroy(&mut rt.host));
            log_report("language", &rt.language.destroy(&mut rt.host));
        }
        Take::Empty => {
            PUMP.with(|slot| slot.borrow_mut().take());
        }
        Take::Busy => warn!("runtime busy; teardown postponed to the next call"),
    }
}

/// Switch the page language (`"fr"` or `"en"`) and persist the choice.
#[wasm_bindgen(js_name = applyLanguage)]
pub fn apply_language(code: &str) -> Result<(), JsValue> {
    let pump = PUMP
        .with(|slot| slot.borrow().clone())
        .ok_or_else(|| JsValue::from_str("runtime not started"))?;
    pump.with_runtime(|rt| rt.language.apply_language(&mut rt.host, code))
        .ok_or_else(|| JsValue::from_str("runtime busy"))?
        .map_err(|err| JsValue::from_str(&err.to_string()))
}
