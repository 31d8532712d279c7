#![forbid(unsafe_code)]

//! Browser entry point for the VOORS site runtime.
//!
//! On `wasm32` this crate exports a `start` function that reads the inline
//! JSON configuration, installs console logging, and boots the animation
//! orchestrator and the language preference manager against the live DOM.
//! Two more exports are available to page scripts:
//!
//! - `teardown()` releases every frame, timer, observer, and listener.
//! - `applyLanguage(code)` switches between `"fr"` and `"en"`.
//!
//! Configuration parsing, the log writer, and the [`RuntimeSlot`] that owns
//! the runtime are platform-independent and tested natively.

pub mod config;
pub mod logging;
pub mod slot;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use config::{CONFIG_ELEMENT_ID, SiteConfig, SiteConfigError};
pub use slot::{RuntimeSlot, Take};
