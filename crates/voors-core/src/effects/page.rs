//! Small page-wide behaviors: hover accents, section accent, tab visibility
//! class, and the debounced narrow-viewport flag.

use std::collections::HashMap;

use tracing::debug;

use crate::effect::{Effect, EffectCx};
use crate::event::{Dispatch, DomEvent, HostEvent};
use crate::host::{ElementId, EventKind, EventTarget, ListenerId, TimerHandle};
use crate::marker::Marker;

pub const ANIMATED_CLASS: &str = "is-animated";
pub const ACCENT_CLASS: &str = "industrial-scan";
pub const HIDDEN_CLASS: &str = "is-hidden";

// ---------------------------------------------------------------------------
// Micro-interactions
// ---------------------------------------------------------------------------

/// `[data-animate]` elements carry `is-animated` while hovered.
#[derive(Debug, Default)]
pub struct MicroInteractions {
    items: HashMap<ListenerId, ElementId>,
}

impl Effect for MicroInteractions {
    fn name(&self) -> &'static str {
        "micro-interactions"
    }

    fn decorative(&self) -> bool {
        true
    }

    fn activate(&mut self, cx: &mut EffectCx<'_>) {
        for el in cx.host.query_all(Marker::Animate) {
            for kind in [EventKind::MouseEnter, EventKind::MouseLeave] {
                if let Some(listener) = cx.listen(EventTarget::Element(el), kind) {
                    self.items.insert(listener, el);
                }
            }
        }
    }

    fn on_event(&mut self, cx: &mut EffectCx<'_>, event: &HostEvent) -> Dispatch {
        let HostEvent::Dom { listener, event } = event else {
            return Dispatch::default();
        };
        let Some(&el) = self.items.get(listener) else {
            return Dispatch::default();
        };
        match event {
            DomEvent::PointerEnter => cx.host.add_class(el, ANIMATED_CLASS),
            DomEvent::PointerLeave => cx.host.remove_class(el, ANIMATED_CLASS),
            _ => return Dispatch::default(),
        }
        Dispatch::handled()
    }

    fn deactivate(&mut self) {
        self.items.clear();
    }
}

// ---------------------------------------------------------------------------
// Section accent
// ---------------------------------------------------------------------------

/// Marks every `section` with the scan-line accent class. One-shot.
#[derive(Debug, Default, Clone, Copy)]
pub struct SectionAccent;

impl Effect for SectionAccent {
    fn name(&self) -> &'static str {
        "section-accent"
    }

    fn decorative(&self) -> bool {
        true
    }

    fn activate(&mut self, cx: &mut EffectCx<'_>) {
        for section in cx.host.query_all(Marker::Section) {
            cx.host.add_class(section, ACCENT_CLASS);
        }
    }
}

// ---------------------------------------------------------------------------
// Tab visibility
// ---------------------------------------------------------------------------

/// Mirrors `document.hidden` as the root `is-hidden` class.
#[derive(Debug, Default)]
pub struct PageVisibility {
    listener: Option<ListenerId>,
}

impl Effect for PageVisibility {
    fn name(&self) -> &'static str {
        "page-visibility"
    }

    fn activate(&mut self, cx: &mut EffectCx<'_>) {
        self.listener = cx.listen(EventTarget::Document, EventKind::VisibilityChange);
    }

    fn on_event(&mut self, cx: &mut EffectCx<'_>, event: &HostEvent) -> Dispatch {
        match event {
            HostEvent::Dom {
                listener,
                event: DomEvent::VisibilityChange,
            } if Some(*listener) == self.listener => {
                let hidden = cx.host.document_hidden();
                let root = cx.host.root();
                cx.host.toggle_class(root, HIDDEN_CLASS, hidden);
                Dispatch::handled()
            }
            _ => Dispatch::default(),
        }
    }

    fn deactivate(&mut self) {
        self.listener = None;
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Re-evaluates the narrow-viewport flag once a resize burst settles.
#[derive(Debug, Default)]
pub struct ViewportWatch {
    listener: Option<ListenerId>,
    debounce: Option<TimerHandle>,
}

impl Effect for ViewportWatch {
    fn name(&self) -> &'static str {
        "viewport"
    }

    fn activate(&mut self, cx: &mut EffectCx<'_>) {
        self.listener = cx.listen(EventTarget::Window, EventKind::Resize);
    }

    fn on_event(&mut self, cx: &mut EffectCx<'_>, event: &HostEvent) -> Dispatch {
        match event {
            HostEvent::Dom {
                listener,
                event: DomEvent::Resize,
            } if Some(*listener) == self.listener => {
                if let Some(pending) = self.debounce.take() {
                    cx.clear_timeout(pending);
                }
                self.debounce = cx.set_timeout(cx.config.resize_debounce_ms);
                Dispatch::handled()
            }
            HostEvent::Timer { handle } if Some(*handle) == self.debounce => {
                self.debounce = None;
                let narrow = cx.host.matches_media(&cx.config.narrow_query());
                if narrow != cx.env.narrow_viewport {
                    debug!(narrow, "viewport class changed");
                }
                cx.env.narrow_viewport = narrow;
                Dispatch::handled()
            }
            _ => Dispatch::default(),
        }
    }

    fn deactivate(&mut self) {
        *self = Self::default();
    }
}
