//! Scroll reveal: `.reveal` elements gain `is-visible` once they scroll in.
//!
//! Reveal children of a group container (`.grid`, `.cards`, `.offers`,
//! `.services`) are staggered by their position among every `.reveal` on the
//! page, unless they already carry an inline `transition-delay`.

use tracing::debug;

use crate::config::RevealConfig;
use crate::effect::{Effect, EffectCx};
use crate::event::{Dispatch, HostEvent};
use crate::host::{ElementId, Host, WatcherId};
use crate::marker::Marker;
use crate::motion::{css_ms, stagger_delay_ms};

pub const VISIBLE_CLASS: &str = "is-visible";

#[derive(Debug, Default)]
pub struct Reveal {
    watcher: Option<WatcherId>,
}

/// Assign group stagger delays. Returns how many delays were written.
///
/// The index is the element's position among all `items`, so a group further
/// down the page starts later (up to the cap).
pub fn apply_stagger(host: &mut dyn Host, items: &[ElementId], config: &RevealConfig) -> usize {
    let mut written = 0;
    for (index, &el) in items.iter().enumerate() {
        let Some(parent) = host.parent(el) else {
            continue;
        };
        let grouped = config
            .group_classes
            .iter()
            .any(|class| host.has_class(parent, class));
        if !grouped || host.style_property(el, "transition-delay").is_some() {
            continue;
        }
        let delay = stagger_delay_ms(index, config.stagger_step_ms, config.stagger_cap);
        host.set_style_property(el, "transition-delay", &css_ms(delay));
        written += 1;
    }
    written
}

impl Effect for Reveal {
    fn name(&self) -> &'static str {
        "reveal"
    }

    fn activate(&mut self, cx: &mut EffectCx<'_>) {
        let items = cx.host.query_all(Marker::Reveal);
        if items.is_empty() {
            return;
        }

        let config = cx.config;
        let staggered = apply_stagger(cx.host, &items, &config.reveal);
        debug!(count = items.len(), staggered, "reveal targets");

        let shown = if !cx.reduced_motion() && cx.host.supports_visibility_watch() {
            let watched = cx.watch_all(&config.reveal.watch, &items);
            self.watcher = watched.watcher;
            watched.missed
        } else {
            items
        };
        for el in shown {
            cx.host.add_class(el, VISIBLE_CLASS);
        }
    }

    fn on_event(&mut self, cx: &mut EffectCx<'_>, event: &HostEvent) -> Dispatch {
        let HostEvent::Visibility {
            watcher,
            element,
            intersecting: true,
        } = *event
        else {
            return Dispatch::default();
        };
        if Some(watcher) != self.watcher {
            return Dispatch::default();
        }
        cx.host.add_class(element, VISIBLE_CLASS);
        cx.unwatch(watcher, element);
        Dispatch::handled()
    }

    fn deactivate(&mut self) {
        self.watcher = None;
    }
}
