//! Pointer tilt for `[data-tilt]` cards.
//!
//! The card's rotation is published as the `--rx` / `--ry` custom properties;
//! the stylesheet owns the actual transform.

use std::collections::HashMap;

use crate::effect::{Effect, EffectCx};
use crate::event::{Dispatch, DomEvent, HostEvent};
use crate::host::{ElementId, EventKind, EventTarget, Host, ListenerId};
use crate::marker::Marker;
use crate::motion::{fixed2, parse_number_or, tilt_angles};

pub const TILTING_CLASS: &str = "is-tilting";

#[derive(Debug, Default)]
pub struct Tilt {
    cards: HashMap<ListenerId, ElementId>,
}

impl Tilt {
    fn lean(cx: &mut EffectCx<'_>, card: ElementId, client_x: f64, client_y: f64) {
        let rect = cx.host.bounding_rect(card);
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        let max = parse_number_or(
            cx.host.attribute(card, "data-tilt-max").as_deref(),
            cx.config.tilt.default_max_deg,
        );
        let (rx, ry) = tilt_angles(
            (client_x - rect.left) / rect.width,
            (client_y - rect.top) / rect.height,
            max,
        );
        cx.host
            .set_style_property(card, "--rx", &format!("{}deg", fixed2(rx)));
        cx.host
            .set_style_property(card, "--ry", &format!("{}deg", fixed2(ry)));
        cx.host.add_class(card, TILTING_CLASS);
    }

    fn settle(host: &mut dyn Host, card: ElementId) {
        host.set_style_property(card, "--rx", "0deg");
        host.set_style_property(card, "--ry", "0deg");
        host.remove_class(card, TILTING_CLASS);
    }
}

impl Effect for Tilt {
    fn name(&self) -> &'static str {
        "tilt"
    }

    fn decorative(&self) -> bool {
        true
    }

    fn activate(&mut self, cx: &mut EffectCx<'_>) {
        for card in cx.host.query_all(Marker::Tilt) {
            for kind in [EventKind::MouseMove, EventKind::MouseLeave] {
                if let Some(listener) = cx.listen(EventTarget::Element(card), kind) {
                    self.cards.insert(listener, card);
                }
            }
        }
    }

    fn on_event(&mut self, cx: &mut EffectCx<'_>, event: &HostEvent) -> Dispatch {
        let HostEvent::Dom { listener, event } = event else {
            return Dispatch::default();
        };
        let Some(&card) = self.cards.get(listener) else {
            return Dispatch::default();
        };
        match *event {
            DomEvent::PointerMove { client_x, client_y } => Self::lean(cx, card, client_x, client_y),
            DomEvent::PointerLeave => Self::settle(cx.host, card),
            _ => return Dispatch::default(),
        }
        Dispatch::handled()
    }

    fn deactivate(&mut self) {
        self.cards.clear();
    }
}
