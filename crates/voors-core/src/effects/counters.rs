//! Animated counters: `[data-counter]` counts up from zero once visible.
//!
//! The final frame writes the attribute text verbatim, so the end state is
//! `prefix + data-counter + suffix` on both the animated and the immediate
//! path.

use std::collections::HashMap;

use tracing::debug;

use crate::effect::{Effect, EffectCx};
use crate::event::{Dispatch, HostEvent};
use crate::host::{ElementId, FrameHandle, Host, WatcherId};
use crate::marker::Marker;
use crate::motion::{counter_value, format_number, progress};

/// Attribute snapshot of one counter element.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterSpec {
    pub end_text: String,
    pub end: f64,
    pub prefix: String,
    pub suffix: String,
}

impl CounterSpec {
    #[must_use]
    pub fn read(host: &dyn Host, el: ElementId) -> Self {
        let end_text = host
            .attribute(el, "data-counter")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "0".to_string());
        let end = end_text.trim().parse::<f64>().unwrap_or(0.0);
        Self {
            end,
            end_text,
            prefix: host.attribute(el, "data-prefix").unwrap_or_default(),
            suffix: host.attribute(el, "data-suffix").unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn final_text(&self) -> String {
        format!("{}{}{}", self.prefix, self.end_text, self.suffix)
    }

    /// Text at animation progress `p`.
    #[must_use]
    pub fn text_at(&self, p: f64) -> String {
        if p >= 1.0 {
            return self.final_text();
        }
        format!(
            "{}{}{}",
            self.prefix,
            format_number(counter_value(self.end, p)),
            self.suffix
        )
    }
}

#[derive(Debug)]
struct CounterRun {
    el: ElementId,
    spec: CounterSpec,
    start_ms: f64,
}

#[derive(Debug, Default)]
pub struct Counters {
    watcher: Option<WatcherId>,
    runs: Vec<CounterRun>,
    frames: HashMap<FrameHandle, usize>,
}

impl Counters {
    fn start(&mut self, cx: &mut EffectCx<'_>, el: ElementId) {
        let spec = CounterSpec::read(cx.host, el);
        let index = self.runs.len();
        self.runs.push(CounterRun {
            el,
            spec,
            start_ms: cx.host.now_ms(),
        });
        match cx.request_frame() {
            Some(frame) => {
                self.frames.insert(frame, index);
            }
            None => {
                let text = self.runs[index].spec.final_text();
                cx.host.set_text(el, &text);
            }
        }
    }

    fn advance(&mut self, cx: &mut EffectCx<'_>, index: usize, now_ms: f64) {
        let Some(run) = self.runs.get(index) else {
            return;
        };
        let p = progress(now_ms - run.start_ms, cx.config.counter.duration_ms);
        cx.host.set_text(run.el, &run.spec.text_at(p));
        if p < 1.0 {
            if let Some(frame) = cx.request_frame() {
                self.frames.insert(frame, index);
            }
        }
    }
}

impl Effect for Counters {
    fn name(&self) -> &'static str {
        "counters"
    }

    fn activate(&mut self, cx: &mut EffectCx<'_>) {
        let counters = cx.host.query_all(Marker::Counter);
        if counters.is_empty() {
            return;
        }

        let settled = if !cx.reduced_motion() && cx.host.supports_visibility_watch() {
            let config = cx.config;
            let watched = cx.watch_all(&config.counter.watch, &counters);
            self.watcher = watched.watcher;
            watched.missed
        } else {
            counters
        };
        if !settled.is_empty() {
            debug!(count = settled.len(), "counters set to final value");
        }
        for el in settled {
            let text = CounterSpec::read(cx.host, el).final_text();
            cx.host.set_text(el, &text);
        }
    }

    fn on_event(&mut self, cx: &mut EffectCx<'_>, event: &HostEvent) -> Dispatch {
        match *event {
            HostEvent::Visibility {
                watcher,
                element,
                intersecting: true,
            } if Some(watcher) == self.watcher => {
                cx.unwatch(watcher, element);
                self.start(cx, element);
                Dispatch::handled()
            }
            HostEvent::Frame { handle, now_ms } => match self.frames.remove(&handle) {
                Some(index) => {
                    self.advance(cx, index, now_ms);
                    Dispatch::handled()
                }
                None => Dispatch::default(),
            },
            _ => Dispatch::default(),
        }
    }

    fn deactivate(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(end: &str, prefix: &str, suffix: &str) -> CounterSpec {
        CounterSpec {
            end_text: end.to_string(),
            end: end.parse().unwrap_or(0.0),
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    #[test]
    fn text_keeps_prefix_and_suffix() {
        let s = spec("250", "", "+");
        assert_eq!(s.text_at(0.0), "0+");
        assert_eq!(s.text_at(0.5), "219+");
        assert_eq!(s.text_at(1.0), "250+");
    }

    #[test]
    fn final_frame_uses_attribute_text() {
        let s = spec("4.5", "€", "M");
        assert_eq!(s.text_at(0.99), "€4M");
        assert_eq!(s.text_at(1.0), "€4.5M");
        assert_eq!(s.final_text(), "€4.5M");
    }
}
