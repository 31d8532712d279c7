//! Deferred image loading: `data-src` moves into `src` near the viewport.

use tracing::debug;

use crate::effect::{Effect, EffectCx};
use crate::event::{Dispatch, HostEvent};
use crate::host::{ElementId, Host, WatcherId};
use crate::marker::Marker;

#[derive(Debug, Default)]
pub struct LazyLoad {
    watcher: Option<WatcherId>,
}

fn load(host: &mut dyn Host, img: ElementId) {
    if let Some(src) = host.attribute(img, "data-src") {
        host.set_attribute(img, "src", &src);
        host.remove_attribute(img, "data-src");
    }
}

impl Effect for LazyLoad {
    fn name(&self) -> &'static str {
        "lazy-load"
    }

    fn activate(&mut self, cx: &mut EffectCx<'_>) {
        let images = cx.host.query_all(Marker::LazyImage);
        if images.is_empty() {
            return;
        }

        let now = if cx.host.supports_visibility_watch() {
            let config = cx.config;
            let watched = cx.watch_all(&config.lazy_load.watch, &images);
            self.watcher = watched.watcher;
            watched.missed
        } else {
            images
        };
        if !now.is_empty() {
            debug!(count = now.len(), "images not watched; loading now");
        }
        for img in now {
            load(cx.host, img);
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
        load(cx.host, element);
        cx.unwatch(watcher, element);
        Dispatch::handled()
    }

    fn deactivate(&mut self) {
        self.watcher = None;
    }
}
