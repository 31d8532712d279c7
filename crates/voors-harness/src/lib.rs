#![forbid(unsafe_code)]

//! Headless test host for the site runtime.
//!
//! [`HeadlessPage`] implements [`voors_core::Host`] entirely in memory with a
//! virtual clock. Tests build a page, hand it to the components, and drive
//! time and user input explicitly:
//!
//! ```
//! use voors_core::{AnimationOrchestrator, Host, OrchestratorConfig};
//! use voors_harness::{BODY, HeadlessPage};
//!
//! let mut page = HeadlessPage::new();
//! let card = page.add(BODY, "div", &["reveal"], &[]);
//!
//! let mut animations = AnimationOrchestrator::new(OrchestratorConfig::default());
//! animations.init(&mut page);
//! assert!(!page.has_class(card, "is-visible"));
//!
//! page.reveal(&mut [&mut animations], card);
//! assert!(page.has_class(card, "is-visible"));
//!
//! animations.destroy(&mut page);
//! assert_eq!(page.active_watchers(), 0);
//! ```

pub mod driver;
pub mod page;

pub use driver::FRAME_MS;
pub use page::{BODY, CanvasState, DrawCall, Faults, HeadlessPage, ROOT};

use voors_core::{HostError, KeyValueStore};

/// Storage that always fails, like a private-mode `localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> voors_core::Result<Option<String>> {
        Err(HostError::storage("storage disabled"))
    }

    fn set(&mut self, _key: &str, _value: &str) -> voors_core::Result<()> {
        Err(HostError::storage("storage disabled"))
    }
}

/// Route `tracing` output through the test harness writer. Filter with
/// `RUST_LOG`; repeated calls are harmless.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
