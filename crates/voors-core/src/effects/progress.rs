//! Progress bars: `[data-width]` elements grow to their target width once
//! half visible.

use tracing::debug;

use crate::effect::{Effect, EffectCx};
use crate::event::{Dispatch, HostEvent};
use crate::host::{ElementId, Host, WatcherId};
use crate::marker::Marker;

#[derive(Debug, Default)]
pub struct ProgressBars {
    watcher: Option<WatcherId>,
}

fn fill(host: &mut dyn Host, bar: ElementId) {
    if let Some(width) = host.attribute(bar, "data-width") {
        host.set_style_property(bar, "width", &width);
    }
}

impl Effect for ProgressBars {
    fn name(&self) -> &'static str {
        "progress"
    }

    fn activate(&mut self, cx: &mut EffectCx<'_>) {
        let bars = cx.host.query_all(Marker::ProgressBar);
        if bars.is_empty() {
            return;
        }
        let filled = if !cx.reduced_motion() && cx.host.supports_visibility_watch() {
            let config = cx.config;
            let watched = cx.watch_all(&config.progress.watch, &bars);
            self.watcher = watched.watcher;
            watched.missed
        } else {
            bars
        };
        if !filled.is_empty() {
            debug!(count = filled.len(), "progress bars filled immediately");
        }
        for bar in filled {
            fill(cx.host, bar);
        }
    }

    fn on_event(&mut self, cx: &mut EffectCx<'_>, event: &HostEvent) -> Dispatch {
        match *event {
            HostEvent::Visibility {
                watcher,
                element,
                intersecting: true,
            } if Some(watcher) == self.watcher => {
                fill(cx.host, element);
                cx.unwatch(watcher, element);
                Dispatch::handled()
            }
            _ => Dispatch::default(),
        }
    }

    fn deactivate(&mut self) {
        self.watcher = None;
    }
}
