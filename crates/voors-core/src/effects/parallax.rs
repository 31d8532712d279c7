//! Scroll parallax for `[data-parallax]` elements.
//!
//! Scroll events only raise a flag and request one frame; the frame does the
//! layout reads and writes, so a burst of scroll events costs one update.

use crate::effect::{Effect, EffectCx};
use crate::event::{Dispatch, DomEvent, HostEvent};
use crate::host::{ElementId, EventKind, EventTarget, FrameHandle, ListenerId};
use crate::marker::Marker;
use crate::motion::{fixed2, parallax_offset, parse_number_or};

#[derive(Debug, Default)]
pub struct Parallax {
    targets: Vec<ElementId>,
    scroll: Option<ListenerId>,
    frame: Option<FrameHandle>,
}

impl Parallax {
    /// Request the update frame unless one is already in flight.
    fn schedule(&mut self, cx: &mut EffectCx<'_>) {
        if self.frame.is_none() {
            self.frame = cx.request_frame();
        }
    }

    fn update(&self, cx: &mut EffectCx<'_>) {
        let config = &cx.config.parallax;
        let vh = cx.host.viewport_height();
        for &el in &self.targets {
            let speed = parse_number_or(
                cx.host.attribute(el, "data-parallax").as_deref(),
                config.default_speed,
            );
            let top = cx.host.bounding_rect(el).top;
            let y = parallax_offset(top, vh, speed, config.scale_px);
            cx.host
                .set_style_property(el, "transform", &format!("translate3d(0, {}px, 0)", fixed2(y)));
        }
    }
}

impl Effect for Parallax {
    fn name(&self) -> &'static str {
        "parallax"
    }

    fn decorative(&self) -> bool {
        true
    }

    fn activate(&mut self, cx: &mut EffectCx<'_>) {
        self.targets = cx.host.query_all(Marker::Parallax);
        if self.targets.is_empty() {
            return;
        }
        self.scroll = cx.listen(EventTarget::Window, EventKind::Scroll);
        self.schedule(cx);
    }

    fn on_event(&mut self, cx: &mut EffectCx<'_>, event: &HostEvent) -> Dispatch {
        match event {
            HostEvent::Dom {
                listener,
                event: DomEvent::Scroll,
            } if Some(*listener) == self.scroll => {
                self.schedule(cx);
                Dispatch::handled()
            }
            HostEvent::Frame { handle, .. } if Some(*handle) == self.frame => {
                self.frame = None;
                self.update(cx);
                Dispatch::handled()
            }
            _ => Dispatch::default(),
        }
    }

    fn deactivate(&mut self) {
        *self = Self::default();
    }
}
