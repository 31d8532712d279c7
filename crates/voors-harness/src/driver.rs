//! Driving a [`HeadlessPage`]: advance the clock and deliver callbacks.
//!
//! Every driver method takes the components under test as a slice of
//! [`EventSink`]s. Each event is offered to every sink; a sink ignores handles
//! its own ledger does not know, so several components can share one page the
//! way they share one browser document.

use tracing::trace;
use voors_core::{
    Dispatch, DomEvent, ElementId, EventKind, EventSink, EventTarget, Host, HostEvent, ListenerId,
};

use crate::page::HeadlessPage;

/// Virtual duration of one display frame.
pub const FRAME_MS: f64 = 16.0;

impl HeadlessPage {
    fn deliver(&mut self, sinks: &mut [&mut dyn EventSink], event: &HostEvent) -> Dispatch {
        let mut outcome = Dispatch::default();
        for sink in sinks.iter_mut() {
            outcome = outcome.merge(sink.dispatch(self, event));
        }
        outcome
    }

    /// Fire every timer due at or before `until`, in due order.
    fn fire_timers(&mut self, sinks: &mut [&mut dyn EventSink], until: f64) -> usize {
        let mut fired = 0;
        loop {
            let next = self
                .timers
                .iter()
                .filter(|(_, due)| **due <= until)
                .min_by(|a, b| a.1.total_cmp(b.1).then(a.0.cmp(b.0)))
                .map(|(handle, due)| (*handle, *due));
            let Some((handle, due)) = next else {
                break;
            };
            self.timers.remove(&handle);
            self.now_ms = self.now_ms.max(due);
            self.deliver(sinks, &HostEvent::Timer { handle });
            fired += 1;
        }
        self.now_ms = self.now_ms.max(until);
        fired
    }

    /// Move the clock forward by `ms`, firing timers on the way. Returns the
    /// number of timers fired.
    pub fn advance(&mut self, sinks: &mut [&mut dyn EventSink], ms: f64) -> usize {
        let until = self.now_ms + ms;
        self.fire_timers(sinks, until)
    }

    /// Run one display frame: advance [`FRAME_MS`], then deliver every frame
    /// request that was pending when the frame started. Requests made during
    /// delivery wait for the next frame. Returns the number delivered.
    pub fn run_frame(&mut self, sinks: &mut [&mut dyn EventSink]) -> usize {
        self.advance(sinks, FRAME_MS);
        let batch: Vec<_> = self.frames.iter().copied().collect();
        let mut delivered = 0;
        for handle in batch {
            if !self.frames.remove(&handle) {
                continue;
            }
            let event = HostEvent::Frame {
                handle,
                now_ms: self.now_ms,
            };
            self.deliver(sinks, &event);
            delivered += 1;
        }
        trace!(delivered, now = self.now_ms, "frame");
        delivered
    }

    pub fn run_frames(&mut self, sinks: &mut [&mut dyn EventSink], count: usize) -> usize {
        (0..count).map(|_| self.run_frame(sinks)).sum()
    }

    /// Report `el` crossing the threshold of every watcher that watches it.
    pub fn intersect(
        &mut self,
        sinks: &mut [&mut dyn EventSink],
        el: ElementId,
        intersecting: bool,
    ) -> Dispatch {
        let watchers: Vec<_> = self
            .watchers
            .iter()
            .filter(|(_, w)| w.targets.contains(&el))
            .map(|(id, _)| *id)
            .collect();
        let mut outcome = Dispatch::default();
        for watcher in watchers {
            let event = HostEvent::Visibility {
                watcher,
                element: el,
                intersecting,
            };
            outcome = outcome.merge(self.deliver(sinks, &event));
        }
        outcome
    }

    /// Scroll `el` into the viewport.
    pub fn reveal(&mut self, sinks: &mut [&mut dyn EventSink], el: ElementId) -> Dispatch {
        self.intersect(sinks, el, true)
    }

    /// Deliver `event` to the listeners matching `targets` and `kind`, in
    /// target order, skipping listeners removed during delivery.
    fn fire_listeners(
        &mut self,
        sinks: &mut [&mut dyn EventSink],
        targets: &[EventTarget],
        kind: EventKind,
        event: &DomEvent,
    ) -> Dispatch {
        let mut ordered: Vec<ListenerId> = Vec::new();
        for target in targets {
            ordered.extend(
                self.listeners
                    .iter()
                    .filter(|(_, r)| r.target == *target && r.kind == kind)
                    .map(|(id, _)| *id),
            );
        }
        let mut outcome = Dispatch::default();
        for listener in ordered {
            if !self.listeners.contains_key(&listener) {
                continue;
            }
            let host_event = HostEvent::Dom {
                listener,
                event: event.clone(),
            };
            outcome = outcome.merge(self.deliver(sinks, &host_event));
        }
        outcome
    }

    /// Element, its ancestors, then document and window.
    fn bubble_path(&self, el: ElementId) -> Vec<EventTarget> {
        std::iter::once(el)
            .chain(self.ancestors(el))
            .map(EventTarget::Element)
            .chain([EventTarget::Document, EventTarget::Window])
            .collect()
    }

    /// Click `el`; the event bubbles to the document.
    pub fn click(&mut self, sinks: &mut [&mut dyn EventSink], el: ElementId) -> Dispatch {
        let path = self.bubble_path(el);
        self.fire_listeners(sinks, &path, EventKind::Click, &DomEvent::Click {
            target: Some(el),
        })
    }

    pub fn key_down(&mut self, sinks: &mut [&mut dyn EventSink], key: &str) -> Dispatch {
        let path = self.bubble_path(self.body().unwrap_or(self.root()));
        self.fire_listeners(sinks, &path, EventKind::KeyDown, &DomEvent::KeyDown {
            key: key.to_string(),
        })
    }

    pub fn pointer_move(
        &mut self,
        sinks: &mut [&mut dyn EventSink],
        el: ElementId,
        client_x: f64,
        client_y: f64,
    ) -> Dispatch {
        let path = self.bubble_path(el);
        self.fire_listeners(sinks, &path, EventKind::MouseMove, &DomEvent::PointerMove {
            client_x,
            client_y,
        })
    }

    /// Enter and leave do not bubble.
    pub fn pointer_enter(&mut self, sinks: &mut [&mut dyn EventSink], el: ElementId) -> Dispatch {
        let target = [EventTarget::Element(el)];
        self.fire_listeners(sinks, &target, EventKind::MouseEnter, &DomEvent::PointerEnter)
    }

    pub fn pointer_leave(&mut self, sinks: &mut [&mut dyn EventSink], el: ElementId) -> Dispatch {
        let target = [EventTarget::Element(el)];
        self.fire_listeners(sinks, &target, EventKind::MouseLeave, &DomEvent::PointerLeave)
    }

    pub fn focus(&mut self, sinks: &mut [&mut dyn EventSink], el: ElementId) -> Dispatch {
        let target = [EventTarget::Element(el)];
        self.fire_listeners(sinks, &target, EventKind::Focus, &DomEvent::Focus)
    }

    pub fn blur(&mut self, sinks: &mut [&mut dyn EventSink], el: ElementId) -> Dispatch {
        let target = [EventTarget::Element(el)];
        self.fire_listeners(sinks, &target, EventKind::Blur, &DomEvent::Blur)
    }

    pub fn scroll(&mut self, sinks: &mut [&mut dyn EventSink]) -> Dispatch {
        let targets = [EventTarget::Document, EventTarget::Window];
        self.fire_listeners(sinks, &targets, EventKind::Scroll, &DomEvent::Scroll)
    }

    pub fn resize(&mut self, sinks: &mut [&mut dyn EventSink]) -> Dispatch {
        let target = [EventTarget::Window];
        self.fire_listeners(sinks, &target, EventKind::Resize, &DomEvent::Resize)
    }

    /// Switch tabs away (`true`) or back (`false`).
    pub fn set_hidden(&mut self, sinks: &mut [&mut dyn EventSink], hidden: bool) -> Dispatch {
        self.set_hidden_flag(hidden);
        let target = [EventTarget::Document];
        self.fire_listeners(
            sinks,
            &target,
            EventKind::VisibilityChange,
            &DomEvent::VisibilityChange,
        )
    }

    /// Finish parsing and fire `DOMContentLoaded`.
    pub fn fire_ready(&mut self, sinks: &mut [&mut dyn EventSink]) -> Dispatch {
        self.set_loading(false);
        let target = [EventTarget::Document];
        self.fire_listeners(sinks, &target, EventKind::Ready, &DomEvent::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::BODY;

    /// Records every event it sees.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<HostEvent>,
    }

    impl EventSink for Recorder {
        fn dispatch(&mut self, _host: &mut dyn Host, event: &HostEvent) -> Dispatch {
            self.seen.push(event.clone());
            Dispatch::handled()
        }
    }

    #[test]
    fn timers_fire_in_due_order() {
        let mut page = HeadlessPage::new();
        let late = page.set_timeout(50).unwrap();
        let early = page.set_timeout(10).unwrap();
        let mut rec = Recorder::default();
        assert_eq!(page.advance(&mut [&mut rec], 40.0), 1);
        assert_eq!(page.advance(&mut [&mut rec], 40.0), 1);
        assert_eq!(
            rec.seen,
            vec![
                HostEvent::Timer { handle: early },
                HostEvent::Timer { handle: late }
            ]
        );
        assert_eq!(page.now(), 80.0);
    }

    #[test]
    fn frames_requested_during_a_frame_wait() {
        let mut page = HeadlessPage::new();
        page.request_frame().unwrap();
        let mut rec = Recorder::default();
        assert_eq!(page.run_frame(&mut [&mut rec]), 1);
        assert_eq!(page.run_frame(&mut [&mut rec]), 0);
    }

    #[test]
    fn click_bubbles_from_target_to_document() {
        let mut page = HeadlessPage::new();
        let button = page.add(BODY, "button", &[], &[]);
        let on_doc = page.listen(EventTarget::Document, EventKind::Click).unwrap();
        let on_button = page
            .listen(EventTarget::Element(button), EventKind::Click)
            .unwrap();
        let mut rec = Recorder::default();
        page.click(&mut [&mut rec], button);
        let order: Vec<ListenerId> = rec
            .seen
            .iter()
            .filter_map(|e| match e {
                HostEvent::Dom { listener, .. } => Some(*listener),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec![on_button, on_doc]);
    }
}
