//! Hero section: nudge the background video into playing and cascade the
//! hero content in.
//!
//! The cascade index counts every matched element, including the `.reveal`
//! ones that are left to [`Reveal`](super::Reveal), so delays line up with
//! document position.

use tracing::debug;

use crate::effect::{Effect, EffectCx};
use crate::event::{Dispatch, HostEvent};
use crate::host::{ElementId, FrameHandle, TimerHandle};
use crate::marker::Marker;
use crate::motion::{css_ms, stagger_delay_ms};

pub const CASCADE_CLASS: &str = "hero-cascade";
pub const ENTERED_CLASS: &str = "is-in";

#[derive(Debug, Default)]
pub struct Hero {
    video: Option<ElementId>,
    play_timer: Option<TimerHandle>,
    pending: Vec<ElementId>,
    frame: Option<FrameHandle>,
}

impl Effect for Hero {
    fn name(&self) -> &'static str {
        "hero"
    }

    fn decorative(&self) -> bool {
        true
    }

    fn activate(&mut self, cx: &mut EffectCx<'_>) {
        let config = cx.config;

        self.video = cx
            .host
            .query(Marker::HeroVideo)
            .or_else(|| cx.host.query(Marker::Video));
        if self.video.is_some() {
            self.play_timer = cx.set_timeout(config.hero.play_delay_ms);
        }

        if cx.host.query(Marker::Hero).is_none() {
            return;
        }
        for (i, el) in cx.host.query_all(Marker::HeroCascade).into_iter().enumerate() {
            if cx.host.has_class(el, "reveal") {
                continue;
            }
            let delay = stagger_delay_ms(i, config.hero.stagger_step_ms, config.hero.stagger_cap);
            cx.host.set_style_property(el, "transition-delay", &css_ms(delay));
            cx.host.add_class(el, CASCADE_CLASS);
            self.pending.push(el);
        }
        if !self.pending.is_empty() {
            self.frame = cx.request_frame();
        }
    }

    fn on_event(&mut self, cx: &mut EffectCx<'_>, event: &HostEvent) -> Dispatch {
        match event {
            HostEvent::Timer { handle } if Some(*handle) == self.play_timer => {
                self.play_timer = None;
                if let Some(video) = self.video {
                    if let Err(err) = cx.host.play_media(video) {
                        debug!(%err, "hero video playback refused");
                    }
                }
                Dispatch::handled()
            }
            HostEvent::Frame { handle, .. } if Some(*handle) == self.frame => {
                self.frame = None;
                for el in self.pending.drain(..) {
                    cx.host.add_class(el, ENTERED_CLASS);
                }
                Dispatch::handled()
            }
            _ => Dispatch::default(),
        }
    }

    fn deactivate(&mut self) {
        *self = Self::default();
    }
}
