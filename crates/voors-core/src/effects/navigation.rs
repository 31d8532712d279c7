//! Mobile menu toggle and in-page anchor scrolling.
//!
//! The menu needs both `[data-burger]` and `[data-mobile]`; anchor scrolling
//! is registered regardless, as a single delegated document click listener.

use tracing::{debug, warn};

use crate::effect::{Effect, EffectCx};
use crate::event::{Dispatch, DomEvent, HostEvent};
use crate::host::{ElementId, EventKind, EventTarget, Host, ListenerId, ScrollBehavior};
use crate::marker::Marker;

#[derive(Debug, Default)]
pub struct Navigation {
    burger: Option<ElementId>,
    panel: Option<ElementId>,
    burger_click: Option<ListenerId>,
    panel_click: Option<ListenerId>,
    escape: Option<ListenerId>,
    anchor_click: Option<ListenerId>,
}

impl Navigation {
    fn is_open(&self, host: &dyn Host) -> bool {
        self.burger
            .and_then(|b| host.attribute(b, "aria-expanded"))
            .is_some_and(|v| v == "true")
    }

    fn open(&self, host: &mut dyn Host) {
        let (Some(burger), Some(panel)) = (self.burger, self.panel) else {
            return;
        };
        host.set_attribute(burger, "aria-expanded", "true");
        host.add_class(panel, "is-open");
        if let Some(body) = host.body() {
            host.add_class(body, "menu-open");
        }
    }

    fn close(&self, host: &mut dyn Host) {
        if let (Some(burger), Some(panel)) = (self.burger, self.panel) {
            close_menu(host, burger, panel);
        }
    }

    /// Smooth-scroll to the target of an in-page anchor.
    fn follow_anchor(cx: &mut EffectCx<'_>, target: ElementId) -> Dispatch {
        let Some(anchor) = cx.host.closest(target, Marker::InPageAnchor) else {
            return Dispatch::default();
        };
        let Some(href) = cx.host.attribute(anchor, "href") else {
            return Dispatch::default();
        };
        if href.len() < 2 {
            return Dispatch::default();
        }
        let Some(section) = cx.host.element_by_id(&href[1..]) else {
            return Dispatch::default();
        };

        let behavior = if cx.reduced_motion() {
            ScrollBehavior::Auto
        } else {
            ScrollBehavior::Smooth
        };
        cx.host.scroll_into_view(section, behavior);
        if let Err(err) = cx.host.replace_history_hash(&href) {
            warn!(%href, %err, "history update failed");
        }
        debug!(%href, "anchor scroll");
        Dispatch::prevent_default()
    }
}

fn close_menu(host: &mut dyn Host, burger: ElementId, panel: ElementId) {
    host.set_attribute(burger, "aria-expanded", "false");
    host.remove_class(panel, "is-open");
    if let Some(body) = host.body() {
        host.remove_class(body, "menu-open");
    }
}

impl Effect for Navigation {
    fn name(&self) -> &'static str {
        "navigation"
    }

    fn activate(&mut self, cx: &mut EffectCx<'_>) {
        self.burger = cx.host.query(Marker::Burger);
        self.panel = cx.host.query(Marker::MobilePanel);
        if let (Some(burger), Some(panel)) = (self.burger, self.panel) {
            self.burger_click = cx.listen(EventTarget::Element(burger), EventKind::Click);
            self.panel_click = cx.listen(EventTarget::Element(panel), EventKind::Click);
            self.escape = cx.listen(EventTarget::Document, EventKind::KeyDown);
            // An open menu locks body scroll; never leave it locked.
            cx.on_teardown("close menu", move |host| {
                close_menu(host, burger, panel);
                Ok(())
            });
        }
        self.anchor_click = cx.listen(EventTarget::Document, EventKind::Click);
    }

    fn on_event(&mut self, cx: &mut EffectCx<'_>, event: &HostEvent) -> Dispatch {
        let HostEvent::Dom { listener, event } = event else {
            return Dispatch::default();
        };
        let listener = Some(*listener);

        match event {
            DomEvent::Click { .. } if listener == self.burger_click => {
                if self.is_open(cx.host) {
                    self.close(cx.host);
                } else {
                    self.open(cx.host);
                }
                Dispatch::handled()
            }
            DomEvent::Click {
                target: Some(target),
            } if listener == self.panel_click => {
                if cx.host.closest(*target, Marker::Link).is_some() {
                    self.close(cx.host);
                }
                Dispatch::handled()
            }
            DomEvent::KeyDown { key } if listener == self.escape => {
                if key == "Escape" {
                    self.close(cx.host);
                }
                Dispatch::handled()
            }
            DomEvent::Click {
                target: Some(target),
            } if listener == self.anchor_click => Self::follow_anchor(cx, *target),
            _ => Dispatch::default(),
        }
    }

    fn deactivate(&mut self) {
        *self = Self::default();
    }
}
