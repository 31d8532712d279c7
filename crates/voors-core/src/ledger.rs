#![forbid(unsafe_code)]

//! Resource ledger: every host resource a component acquires, and who owns it.
//!
//! The ledger plays two roles:
//!
//! - **Routing**: each frame request, timer, watcher, and listener maps to the
//!   [`Owner`] that requested it, so incoming [`HostEvent`]s reach the right
//!   effect.
//! - **Teardown**: [`ResourceLedger::release_all`] cancels every outstanding
//!   frame request and timer, then runs the ordered teardown actions
//!   (watcher disconnects, listener removals, deferred closures).
//!
//! # Invariants
//!
//! 1. After `release_all`, no frame request or timer is outstanding and every
//!    teardown action has run exactly once, in registration order.
//! 2. A failing action is counted and logged; the remaining actions still run.
//! 3. A closed ledger refuses new resources with [`HostError::LedgerClosed`].
//!    Self-rescheduling loops stop there.
//! 4. Fired frames and timers leave the ledger when routed; they are one-shot.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{HostError, Result};
use crate::event::HostEvent;
use crate::host::{
    EventKind, EventTarget, FrameHandle, Host, ListenerId, TimerHandle, WatchOptions, WatcherId,
};

/// Index of the effect (or component) that owns a resource.
pub type Owner = usize;

type DeferredAction = Box<dyn FnOnce(&mut dyn Host) -> Result<()>>;

enum Teardown {
    Disconnect(WatcherId),
    Unlisten(ListenerId),
    Deferred {
        label: &'static str,
        action: DeferredAction,
    },
}

impl std::fmt::Debug for Teardown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnect(w) => write!(f, "Disconnect({})", w.get()),
            Self::Unlisten(l) => write!(f, "Unlisten({})", l.get()),
            Self::Deferred { label, .. } => write!(f, "Deferred({label})"),
        }
    }
}

/// Outcome of one [`ResourceLedger::release_all`] pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeardownReport {
    pub frames_cancelled: usize,
    pub timers_cleared: usize,
    pub actions_run: usize,
    pub failures: Vec<String>,
}

impl TeardownReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ResourceLedger {
    frames: BTreeMap<FrameHandle, Owner>,
    timers: BTreeMap<TimerHandle, Owner>,
    watchers: BTreeMap<WatcherId, Owner>,
    listeners: BTreeMap<ListenerId, Owner>,
    teardown: Vec<Teardown>,
    closed: bool,
}

// ---------------------------------------------------------------------------
// Acquisition
// ---------------------------------------------------------------------------

impl ResourceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Accept registrations again after a full release.
    pub fn reopen(&mut self) {
        self.closed = false;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(HostError::LedgerClosed)
        } else {
            Ok(())
        }
    }

    pub fn request_frame(&mut self, host: &mut dyn Host, owner: Owner) -> Result<FrameHandle> {
        self.ensure_open()?;
        let handle = host.request_frame()?;
        self.frames.insert(handle, owner);
        Ok(handle)
    }

    /// Cancel a frame request before it fires. Unknown handles are ignored.
    pub fn cancel_frame(&mut self, host: &mut dyn Host, handle: FrameHandle) -> Result<()> {
        if self.frames.remove(&handle).is_some() {
            host.cancel_frame(handle)?;
        }
        Ok(())
    }

    pub fn set_timeout(
        &mut self,
        host: &mut dyn Host,
        owner: Owner,
        delay_ms: u32,
    ) -> Result<TimerHandle> {
        self.ensure_open()?;
        let handle = host.set_timeout(delay_ms)?;
        self.timers.insert(handle, owner);
        Ok(handle)
    }

    /// Clear a pending timer. Unknown or already-fired handles are ignored.
    pub fn clear_timeout(&mut self, host: &mut dyn Host, handle: TimerHandle) -> Result<()> {
        if self.timers.remove(&handle).is_some() {
            host.clear_timeout(handle)?;
        }
        Ok(())
    }

    /// Create a watcher whose disconnect is queued for teardown.
    pub fn create_watcher(
        &mut self,
        host: &mut dyn Host,
        owner: Owner,
        options: &WatchOptions,
    ) -> Result<WatcherId> {
        self.ensure_open()?;
        let watcher = host.create_watcher(options)?;
        self.watchers.insert(watcher, owner);
        self.teardown.push(Teardown::Disconnect(watcher));
        Ok(watcher)
    }

    /// Register a listener whose removal is queued for teardown.
    pub fn listen(
        &mut self,
        host: &mut dyn Host,
        owner: Owner,
        target: EventTarget,
        kind: EventKind,
    ) -> Result<ListenerId> {
        self.ensure_open()?;
        let listener = host.listen(target, kind)?;
        self.listeners.insert(listener, owner);
        self.teardown.push(Teardown::Unlisten(listener));
        Ok(listener)
    }

    /// Remove a listener early and drop its pending teardown entry.
    pub fn unlisten(&mut self, host: &mut dyn Host, listener: ListenerId) -> Result<()> {
        if self.listeners.remove(&listener).is_none() {
            return Ok(());
        }
        self.teardown
            .retain(|t| !matches!(t, Teardown::Unlisten(l) if *l == listener));
        host.unlisten(listener)
    }

    /// Queue an arbitrary cleanup closure.
    pub fn defer(
        &mut self,
        label: &'static str,
        action: impl FnOnce(&mut dyn Host) -> Result<()> + 'static,
    ) -> Result<()> {
        self.ensure_open()?;
        self.teardown.push(Teardown::Deferred {
            label,
            action: Box::new(action),
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

impl ResourceLedger {
    /// Owner of the resource an event refers to.
    ///
    /// Frames and timers are one-shot and leave the ledger here. Events for
    /// unknown handles return `None`.
    pub fn route(&mut self, event: &HostEvent) -> Option<Owner> {
        match event {
            HostEvent::Frame { handle, .. } => self.frames.remove(handle),
            HostEvent::Timer { handle } => self.timers.remove(handle),
            HostEvent::Visibility { watcher, .. } => self.watchers.get(watcher).copied(),
            HostEvent::Dom { listener, .. } => self.listeners.get(listener).copied(),
        }
    }

    #[must_use]
    pub fn active_frames(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    #[must_use]
    pub fn active_watchers(&self) -> usize {
        self.watchers.len()
    }

    #[must_use]
    pub fn active_listeners(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn pending_teardown(&self) -> usize {
        self.teardown.len()
    }

    /// Whether `owner` holds any routed resource.
    #[must_use]
    pub fn owns_any(&self, owner: Owner) -> bool {
        self.frames.values().any(|&o| o == owner)
            || self.timers.values().any(|&o| o == owner)
            || self.watchers.values().any(|&o| o == owner)
            || self.listeners.values().any(|&o| o == owner)
    }
}

// ---------------------------------------------------------------------------
// Teardown
// ---------------------------------------------------------------------------

impl ResourceLedger {
    /// Close the ledger and release everything it holds.
    ///
    /// Calling this on an already-released ledger does nothing.
    pub fn release_all(&mut self, host: &mut dyn Host) -> TeardownReport {
        self.closed = true;
        let mut report = TeardownReport::default();

        for (handle, _) in std::mem::take(&mut self.frames) {
            match host.cancel_frame(handle) {
                Ok(()) => report.frames_cancelled += 1,
                Err(err) => {
                    warn!(frame = handle.get(), %err, "frame cancel failed");
                    report.failures.push(err.to_string());
                }
            }
        }

        for (handle, _) in std::mem::take(&mut self.timers) {
            match host.clear_timeout(handle) {
                Ok(()) => report.timers_cleared += 1,
                Err(err) => {
                    warn!(timer = handle.get(), %err, "timer clear failed");
                    report.failures.push(err.to_string());
                }
            }
        }

        for action in std::mem::take(&mut self.teardown) {
            let label = format!("{action:?}");
            let outcome = match action {
                Teardown::Disconnect(w) => host.disconnect(w),
                Teardown::Unlisten(l) => host.unlisten(l),
                Teardown::Deferred { action, .. } => action(host),
            };
            report.actions_run += 1;
            if let Err(err) = outcome {
                warn!(action = %label, %err, "teardown action failed");
                report.failures.push(format!("{label}: {err}"));
            }
        }

        self.watchers.clear();
        self.listeners.clear();
        debug!(
            frames = report.frames_cancelled,
            timers = report.timers_cleared,
            actions = report.actions_run,
            failures = report.failures.len(),
            "ledger released"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Dot, ElementId, Rect, ScrollBehavior};
    use crate::marker::Marker;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Minimal host that only hands out handles and records releases.
    #[derive(Default)]
    struct CountingHost {
        next: u32,
        log: Rc<RefCell<Vec<String>>>,
        fail_disconnect: bool,
    }

    impl CountingHost {
        fn bump(&mut self) -> u32 {
            self.next += 1;
            self.next
        }
    }

    impl Host for CountingHost {
        fn query_all(&self, _: Marker) -> Vec<ElementId> {
            Vec::new()
        }
        fn closest(&self, _: ElementId, _: Marker) -> Option<ElementId> {
            None
        }
        fn element_by_id(&self, _: &str) -> Option<ElementId> {
            None
        }
        fn parent(&self, _: ElementId) -> Option<ElementId> {
            None
        }
        fn root(&self) -> ElementId {
            ElementId(0)
        }
        fn body(&self) -> Option<ElementId> {
            None
        }
        fn tag_name(&self, _: ElementId) -> String {
            String::new()
        }
        fn create_element(&mut self, _: &str) -> ElementId {
            ElementId(self.bump())
        }
        fn append_child(&mut self, _: ElementId, _: ElementId) {}
        fn attribute(&self, _: ElementId, _: &str) -> Option<String> {
            None
        }
        fn set_attribute(&mut self, _: ElementId, _: &str, _: &str) {}
        fn remove_attribute(&mut self, _: ElementId, _: &str) {}
        fn has_class(&self, _: ElementId, _: &str) -> bool {
            false
        }
        fn add_class(&mut self, _: ElementId, _: &str) {}
        fn remove_class(&mut self, _: ElementId, _: &str) {}
        fn style_property(&self, _: ElementId, _: &str) -> Option<String> {
            None
        }
        fn set_style_property(&mut self, _: ElementId, _: &str, _: &str) {}
        fn text(&self, _: ElementId) -> String {
            String::new()
        }
        fn set_text(&mut self, _: ElementId, _: &str) {}
        fn bounding_rect(&self, _: ElementId) -> Rect {
            Rect::default()
        }
        fn set_document_lang(&mut self, _: &str) {}
        fn document_loading(&self) -> bool {
            false
        }
        fn document_hidden(&self) -> bool {
            false
        }
        fn matches_media(&self, _: &str) -> bool {
            false
        }
        fn viewport_height(&self) -> f64 {
            800.0
        }
        fn device_pixel_ratio(&self) -> f64 {
            1.0
        }
        fn now_ms(&self) -> f64 {
            0.0
        }
        fn random_seed(&self) -> u64 {
            1
        }
        fn scroll_into_view(&mut self, _: ElementId, _: ScrollBehavior) {}
        fn replace_history_hash(&mut self, _: &str) -> Result<()> {
            Ok(())
        }
        fn play_media(&mut self, _: ElementId) -> Result<()> {
            Ok(())
        }
        fn resize_canvas(&mut self, _: ElementId, _: u32, _: u32, _: f64) -> Result<()> {
            Ok(())
        }
        fn clear_canvas(&mut self, _: ElementId, _: f64, _: f64) {}
        fn fill_dot(&mut self, _: ElementId, _: Dot<'_>) {}
        fn request_frame(&mut self) -> Result<FrameHandle> {
            Ok(FrameHandle(self.bump()))
        }
        fn cancel_frame(&mut self, handle: FrameHandle) -> Result<()> {
            self.log.borrow_mut().push(format!("cancel_frame {}", handle.get()));
            Ok(())
        }
        fn set_timeout(&mut self, _: u32) -> Result<TimerHandle> {
            Ok(TimerHandle(self.bump()))
        }
        fn clear_timeout(&mut self, handle: TimerHandle) -> Result<()> {
            self.log.borrow_mut().push(format!("clear_timeout {}", handle.get()));
            Ok(())
        }
        fn supports_visibility_watch(&self) -> bool {
            true
        }
        fn create_watcher(&mut self, _: &WatchOptions) -> Result<WatcherId> {
            Ok(WatcherId(self.bump()))
        }
        fn watch(&mut self, _: WatcherId, _: ElementId) -> Result<()> {
            Ok(())
        }
        fn unwatch(&mut self, _: WatcherId, _: ElementId) -> Result<()> {
            Ok(())
        }
        fn disconnect(&mut self, watcher: WatcherId) -> Result<()> {
            self.log.borrow_mut().push(format!("disconnect {}", watcher.get()));
            if self.fail_disconnect {
                return Err(HostError::platform("disconnect refused"));
            }
            Ok(())
        }
        fn listen(&mut self, _: EventTarget, _: EventKind) -> Result<ListenerId> {
            Ok(ListenerId(self.bump()))
        }
        fn unlisten(&mut self, listener: ListenerId) -> Result<()> {
            self.log.borrow_mut().push(format!("unlisten {}", listener.get()));
            Ok(())
        }
    }

    fn opts() -> WatchOptions {
        WatchOptions::new(0.5, "0px")
    }

    #[test]
    fn teardown_runs_in_registration_order() {
        let mut host = CountingHost::default();
        let log = Rc::clone(&host.log);
        let mut ledger = ResourceLedger::new();

        let l1 = ledger
            .listen(&mut host, 0, EventTarget::Window, EventKind::Resize)
            .unwrap();
        let w = ledger.create_watcher(&mut host, 1, &opts()).unwrap();
        let deferred_log = Rc::clone(&log);
        ledger
            .defer("custom", move |_| {
                deferred_log.borrow_mut().push("custom".into());
                Ok(())
            })
            .unwrap();

        let report = ledger.release_all(&mut host);
        assert!(report.is_clean());
        assert_eq!(report.actions_run, 3);
        assert_eq!(
            *log.borrow(),
            vec![
                format!("unlisten {}", l1.get()),
                format!("disconnect {}", w.get()),
                "custom".to_string(),
            ]
        );
    }

    #[test]
    fn failures_are_isolated() {
        let mut host = CountingHost {
            fail_disconnect: true,
            ..CountingHost::default()
        };
        let log = Rc::clone(&host.log);
        let mut ledger = ResourceLedger::new();
        ledger.create_watcher(&mut host, 0, &opts()).unwrap();
        ledger
            .defer("always-fails", |_| Err(HostError::platform("nope")))
            .unwrap();
        let l = ledger
            .listen(&mut host, 0, EventTarget::Document, EventKind::Click)
            .unwrap();

        let report = ledger.release_all(&mut host);
        assert_eq!(report.actions_run, 3);
        assert_eq!(report.failures.len(), 2);
        assert!(log.borrow().contains(&format!("unlisten {}", l.get())));
    }

    #[test]
    fn frames_and_timers_are_cancelled_first() {
        let mut host = CountingHost::default();
        let log = Rc::clone(&host.log);
        let mut ledger = ResourceLedger::new();
        ledger
            .listen(&mut host, 0, EventTarget::Window, EventKind::Scroll)
            .unwrap();
        let f = ledger.request_frame(&mut host, 0).unwrap();
        let t = ledger.set_timeout(&mut host, 0, 100).unwrap();

        let report = ledger.release_all(&mut host);
        assert_eq!(report.frames_cancelled, 1);
        assert_eq!(report.timers_cleared, 1);
        assert_eq!(ledger.active_frames(), 0);
        assert_eq!(ledger.active_timers(), 0);
        let log = log.borrow();
        assert_eq!(log[0], format!("cancel_frame {}", f.get()));
        assert_eq!(log[1], format!("clear_timeout {}", t.get()));
    }

    #[test]
    fn closed_ledger_refuses_new_resources() {
        let mut host = CountingHost::default();
        let mut ledger = ResourceLedger::new();
        ledger.release_all(&mut host);
        assert!(ledger.is_closed());
        assert_eq!(
            ledger.request_frame(&mut host, 0),
            Err(HostError::LedgerClosed)
        );
        assert!(ledger.defer("late", |_| Ok(())).is_err());

        ledger.reopen();
        assert!(ledger.request_frame(&mut host, 0).is_ok());
    }

    #[test]
    fn second_release_is_a_no_op() {
        let mut host = CountingHost::default();
        let mut ledger = ResourceLedger::new();
        ledger.create_watcher(&mut host, 0, &opts()).unwrap();
        let first = ledger.release_all(&mut host);
        let second = ledger.release_all(&mut host);
        assert_eq!(first.actions_run, 1);
        assert_eq!(second, TeardownReport::default());
    }

    #[test]
    fn routing_consumes_one_shot_resources() {
        let mut host = CountingHost::default();
        let mut ledger = ResourceLedger::new();
        let frame = ledger.request_frame(&mut host, 3).unwrap();
        let watcher = ledger.create_watcher(&mut host, 4, &opts()).unwrap();

        let fired = HostEvent::Frame {
            handle: frame,
            now_ms: 16.0,
        };
        assert_eq!(ledger.route(&fired), Some(3));
        assert_eq!(ledger.route(&fired), None);

        let seen = HostEvent::Visibility {
            watcher,
            element: ElementId(1),
            intersecting: true,
        };
        assert_eq!(ledger.route(&seen), Some(4));
        assert_eq!(ledger.route(&seen), Some(4));
    }

    #[test]
    fn early_unlisten_drops_teardown_entry() {
        let mut host = CountingHost::default();
        let log = Rc::clone(&host.log);
        let mut ledger = ResourceLedger::new();
        let l = ledger
            .listen(&mut host, 0, EventTarget::Document, EventKind::Ready)
            .unwrap();
        ledger.unlisten(&mut host, l).unwrap();
        assert_eq!(ledger.pending_teardown(), 0);
        assert!(!ledger.owns_any(0));

        let report = ledger.release_all(&mut host);
        assert_eq!(report.actions_run, 0);
        assert_eq!(log.borrow().len(), 1);
    }
}
