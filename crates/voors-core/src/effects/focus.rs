//! Focus styling: form controls carry `is-focus` while focused.

use std::collections::HashMap;

use crate::effect::{Effect, EffectCx};
use crate::event::{Dispatch, DomEvent, HostEvent};
use crate::host::{ElementId, EventKind, EventTarget, ListenerId};
use crate::marker::Marker;

pub const FOCUS_CLASS: &str = "is-focus";

#[derive(Debug, Default)]
pub struct FocusStyling {
    controls: HashMap<ListenerId, ElementId>,
}

impl Effect for FocusStyling {
    fn name(&self) -> &'static str {
        "focus"
    }

    fn activate(&mut self, cx: &mut EffectCx<'_>) {
        for control in cx.host.query_all(Marker::FormControl) {
            for kind in [EventKind::Focus, EventKind::Blur] {
                if let Some(listener) = cx.listen(EventTarget::Element(control), kind) {
                    self.controls.insert(listener, control);
                }
            }
        }
    }

    fn on_event(&mut self, cx: &mut EffectCx<'_>, event: &HostEvent) -> Dispatch {
        let HostEvent::Dom { listener, event } = event else {
            return Dispatch::default();
        };
        let Some(&control) = self.controls.get(listener) else {
            return Dispatch::default();
        };
        match event {
            DomEvent::Focus => cx.host.add_class(control, FOCUS_CLASS),
            DomEvent::Blur => cx.host.remove_class(control, FOCUS_CLASS),
            _ => return Dispatch::default(),
        }
        Dispatch::handled()
    }

    fn deactivate(&mut self) {
        self.controls.clear();
    }
}
