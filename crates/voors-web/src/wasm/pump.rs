//! Single-threaded event pump between browser callbacks and the runtime.
//!
//! Browser callbacks can re-enter: `element.focus()` fires `focus`
//! synchronously, and a listener may be invoked while the runtime is still
//! dispatching. Every callback therefore goes through [`Pump::deliver`],
//! which queues the raw event and drains the queue only when nobody else is
//! already doing so.
//!
//! # Invariants
//!
//! 1. Events are dispatched in arrival order.
//! 2. The runtime is never borrowed twice; a nested delivery only enqueues.
//! 3. Closures retired during a drain outlive that drain.

use std::cell::RefCell;
use std::collections::VecDeque;

use js_sys::Array;
use tracing::{trace, warn};
use voors_core::{
    AnimationOrchestrator, Dispatch, EventSink, FrameHandle, HostEvent, ListenerId, TimerHandle,
    WatcherId,
};
use voors_i18n::LanguagePreferenceManager;

use super::host::WebHost;
use crate::slot::{RuntimeSlot, Take};

/// A browser callback before it is resolved against live handles.
pub(crate) enum Raw {
    Frame { handle: FrameHandle, now_ms: f64 },
    Timer { handle: TimerHandle },
    Dom {
        listener: ListenerId,
        event: web_sys::Event,
    },
    Intersections { watcher: WatcherId, entries: Array },
}

/// The two page components and the host they share.
pub(crate) struct Runtime {
    pub host: WebHost,
    pub animations: AnimationOrchestrator,
    pub language: LanguagePreferenceManager,
}

impl Runtime {
    fn dispatch(&mut self, event: &HostEvent) -> Dispatch {
        let animations = self.animations.dispatch(&mut self.host, event);
        let language = self.language.dispatch(&mut self.host, event);
        animations.merge(language)
    }
}

#[derive(Default)]
pub(crate) struct Pump {
    queue: RefCell<VecDeque<Raw>>,
    runtime: RuntimeSlot<Runtime>,
}

impl Pump {
    pub(crate) fn install(&self, runtime: Runtime) {
        if self.runtime.install(runtime).is_err() {
            warn!("runtime busy; install dropped");
        }
    }

    /// Remove the runtime, e.g. for teardown. A busy runtime stays in place
    /// with its queue intact.
    pub(crate) fn take(&self) -> Take<Runtime> {
        let taken = self.runtime.take();
        if matches!(taken, Take::Taken(_)) {
            self.queue.borrow_mut().clear();
        }
        taken
    }

    /// Queue a callback and drain if possible. Returns the outcome of this
    /// callback when it was dispatched immediately, so listeners can call
    /// `preventDefault` before returning to the browser.
    pub(crate) fn deliver(&self, raw: Raw) -> Dispatch {
        self.queue.borrow_mut().push_back(raw);
        if self.runtime.is_busy() {
            trace!("runtime busy; event queued");
            return Dispatch::default();
        }
        let Some(mut runtime) = self.runtime.lock() else {
            self.queue.borrow_mut().clear();
            return Dispatch::default();
        };
        runtime.host.sweep();
        let mut first = None;
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(raw) = next else {
                break;
            };
            let mut outcome = Dispatch::default();
            for event in runtime.host.resolve(raw) {
                outcome = outcome.merge(runtime.dispatch(&event));
            }
            first.get_or_insert(outcome);
        }
        first.unwrap_or_default()
    }

    /// Run `f` against the runtime, then dispatch whatever it queued.
    pub(crate) fn with_runtime<R>(&self, f: impl FnOnce(&mut Runtime) -> R) -> Option<R> {
        let result = f(&mut *self.runtime.lock()?);
        self.drain();
        Some(result)
    }

    fn drain(&self) {
        let Some(mut runtime) = self.runtime.lock() else {
            return;
        };
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(raw) = next else {
                break;
            };
            for event in runtime.host.resolve(raw) {
                runtime.dispatch(&event);
            }
        }
    }
}
