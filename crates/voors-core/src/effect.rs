#![forbid(unsafe_code)]

//! The unit of behavior the orchestrator drives.
//!
//! Each sub-behavior (reveal, counters, particles, ...) is one [`Effect`]. The
//! orchestrator activates it once, routes the callbacks of the resources it
//! acquired back to it, and calls [`Effect::deactivate`] after the ledger has
//! released those resources.
//!
//! Effects never talk to the ledger directly: [`EffectCx`] stamps every
//! acquisition with the effect's owner index and turns host failures into
//! logged `None`s, so effect code reads as "try, and skip if unavailable".

use tracing::{debug, warn};

use crate::config::OrchestratorConfig;
use crate::env::Environment;
use crate::error::{HostError, Result};
use crate::event::{Dispatch, HostEvent};
use crate::host::{
    ElementId, EventKind, EventTarget, FrameHandle, Host, ListenerId, TimerHandle, WatchOptions,
    WatcherId,
};
use crate::ledger::{Owner, ResourceLedger};

pub trait Effect {
    /// Stable name for logs.
    fn name(&self) -> &'static str;

    /// Purely decorative effects are skipped when reduced motion is preferred.
    fn decorative(&self) -> bool {
        false
    }

    /// Discover targets and acquire resources. Absent targets mean no-op.
    fn activate(&mut self, cx: &mut EffectCx<'_>);

    /// React to a callback of a resource this effect acquired.
    fn on_event(&mut self, cx: &mut EffectCx<'_>, event: &HostEvent) -> Dispatch {
        let _ = (cx, event);
        Dispatch::default()
    }

    /// Drop per-element state. Host resources are already released.
    fn deactivate(&mut self) {}
}

/// Outcome of [`EffectCx::watch_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Watched {
    pub watcher: Option<WatcherId>,
    /// Targets that are not being observed.
    pub missed: Vec<ElementId>,
}

/// Per-call context handed to an [`Effect`].
pub struct EffectCx<'a> {
    pub host: &'a mut dyn Host,
    pub env: &'a mut Environment,
    pub config: &'a OrchestratorConfig,
    ledger: &'a mut ResourceLedger,
    owner: Owner,
    name: &'static str,
}

impl<'a> EffectCx<'a> {
    pub fn new(
        host: &'a mut dyn Host,
        env: &'a mut Environment,
        config: &'a OrchestratorConfig,
        ledger: &'a mut ResourceLedger,
        owner: Owner,
        name: &'static str,
    ) -> Self {
        Self {
            host,
            env,
            config,
            ledger,
            owner,
            name,
        }
    }

    fn settle<T>(&self, what: &'static str, result: Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(HostError::LedgerClosed) => {
                debug!(effect = self.name, what, "ledger closed; not rescheduling");
                None
            }
            Err(err) => {
                warn!(effect = self.name, what, %err, "host refused resource");
                None
            }
        }
    }

    pub fn request_frame(&mut self) -> Option<FrameHandle> {
        let result = self.ledger.request_frame(self.host, self.owner);
        self.settle("frame", result)
    }

    pub fn set_timeout(&mut self, delay_ms: u32) -> Option<TimerHandle> {
        let result = self.ledger.set_timeout(self.host, self.owner, delay_ms);
        self.settle("timer", result)
    }

    pub fn clear_timeout(&mut self, handle: TimerHandle) {
        let result = self.ledger.clear_timeout(self.host, handle);
        self.settle("clear_timeout", result);
    }

    /// Create a watcher and watch every element in `targets`.
    ///
    /// Targets the host would not observe come back in [`Watched::missed`]
    /// (all of them when no watcher could be created), so the caller can put
    /// them in their end state right away.
    pub fn watch_all(&mut self, options: &WatchOptions, targets: &[ElementId]) -> Watched {
        let result = self.ledger.create_watcher(self.host, self.owner, options);
        let Some(watcher) = self.settle("watcher", result) else {
            return Watched {
                watcher: None,
                missed: targets.to_vec(),
            };
        };
        let mut missed = Vec::new();
        for &el in targets {
            let result = self.host.watch(watcher, el);
            if self.settle("watch", result).is_none() {
                missed.push(el);
            }
        }
        Watched {
            watcher: Some(watcher),
            missed,
        }
    }

    pub fn unwatch(&mut self, watcher: WatcherId, el: ElementId) {
        let result = self.host.unwatch(watcher, el);
        self.settle("unwatch", result);
    }

    pub fn listen(&mut self, target: EventTarget, kind: EventKind) -> Option<ListenerId> {
        let result = self.ledger.listen(self.host, self.owner, target, kind);
        self.settle("listener", result)
    }

    /// Run `action` during teardown, after every resource registered before it.
    pub fn on_teardown(
        &mut self,
        label: &'static str,
        action: impl FnOnce(&mut dyn Host) -> Result<()> + 'static,
    ) {
        let result = self.ledger.defer(label, action);
        self.settle("teardown action", result);
    }

    #[must_use]
    pub fn reduced_motion(&self) -> bool {
        self.env.reduced_motion
    }
}
