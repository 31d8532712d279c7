#![forbid(unsafe_code)]

//! The platform capability surface handed to every component call.
//!
//! A [`Host`] is the page as seen from the runtime: element queries and
//! mutations, environment queries, canvas drawing, and the four kinds of
//! asynchronous resources (frame requests, timers, visibility watchers, event
//! listeners). Each resource call returns an opaque handle; the host later
//! reports the callback as a [`HostEvent`](crate::HostEvent) carrying the same
//! handle.
//!
//! The trait is object safe and always used as `&mut dyn Host`, so the browser
//! backend and the headless test page are interchangeable.
//!
//! # Invariants
//!
//! 1. Handles are never reused within one host.
//! 2. A cancelled frame request or timer never produces an event.
//! 3. A disconnected watcher and a removed listener never produce events.
//! 4. `query_all` returns elements in document order.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::marker::Marker;

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Raw numeric value, for logging and host-side bookkeeping.
            #[inline]
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }
        }
    };
}

handle_type!(
    /// Opaque reference to one element of the page.
    ElementId
);
handle_type!(
    /// A pending "before next repaint" callback.
    FrameHandle
);
handle_type!(
    /// A pending one-shot timer.
    TimerHandle
);
handle_type!(
    /// A visibility watcher (one observer, many watched elements).
    WatcherId
);
handle_type!(
    /// A registered event listener.
    ListenerId
);

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// Element box in viewport coordinates (CSS pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Visibility watcher configuration (threshold ratio and CSS root margin).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchOptions {
    pub threshold: f64,
    pub root_margin: String,
}

impl WatchOptions {
    #[must_use]
    pub fn new(threshold: f64, root_margin: impl Into<String>) -> Self {
        Self {
            threshold,
            root_margin: root_margin.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

impl ScrollBehavior {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Smooth => "smooth",
        }
    }
}

/// One filled circle on a 2D canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot<'a> {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub alpha: f64,
    pub color: &'a str,
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Window,
    Document,
    Element(ElementId),
}

/// The DOM events the runtime listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
    Scroll,
    Resize,
    MouseMove,
    MouseEnter,
    MouseLeave,
    Focus,
    Blur,
    VisibilityChange,
    Ready,
}

impl EventKind {
    /// DOM event type name.
    #[must_use]
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::KeyDown => "keydown",
            Self::Scroll => "scroll",
            Self::Resize => "resize",
            Self::MouseMove => "mousemove",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::VisibilityChange => "visibilitychange",
            Self::Ready => "DOMContentLoaded",
        }
    }

    /// Listeners that never call `preventDefault` can be registered passive.
    #[must_use]
    pub const fn is_passive(self) -> bool {
        matches!(self, Self::Scroll | Self::Resize)
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

pub trait Host {
    // ── Document structure ────────────────────────────────────────────

    /// All elements matching `marker`, in document order.
    fn query_all(&self, marker: Marker) -> Vec<ElementId>;

    /// First element matching `marker`.
    fn query(&self, marker: Marker) -> Option<ElementId> {
        self.query_all(marker).into_iter().next()
    }

    /// Nearest inclusive ancestor of `el` matching `marker`.
    fn closest(&self, el: ElementId, marker: Marker) -> Option<ElementId>;

    /// Element whose `id` attribute equals `id`.
    fn element_by_id(&self, id: &str) -> Option<ElementId>;

    fn parent(&self, el: ElementId) -> Option<ElementId>;

    /// The document element (`<html>`).
    fn root(&self) -> ElementId;

    fn body(&self) -> Option<ElementId>;

    /// Lowercase tag name.
    fn tag_name(&self, el: ElementId) -> String;

    fn create_element(&mut self, tag: &str) -> ElementId;

    fn append_child(&mut self, parent: ElementId, child: ElementId);

    // ── Element state ─────────────────────────────────────────────────

    fn attribute(&self, el: ElementId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str);

    fn remove_attribute(&mut self, el: ElementId, name: &str);

    fn has_class(&self, el: ElementId, class: &str) -> bool;

    fn add_class(&mut self, el: ElementId, class: &str);

    fn remove_class(&mut self, el: ElementId, class: &str);

    fn toggle_class(&mut self, el: ElementId, class: &str, on: bool) {
        if on {
            self.add_class(el, class);
        } else {
            self.remove_class(el, class);
        }
    }

    /// Inline style property, `None` when unset or empty.
    fn style_property(&self, el: ElementId, name: &str) -> Option<String>;

    fn set_style_property(&mut self, el: ElementId, name: &str, value: &str);

    fn text(&self, el: ElementId) -> String;

    fn set_text(&mut self, el: ElementId, text: &str);

    fn bounding_rect(&self, el: ElementId) -> Rect;

    // ── Document state ────────────────────────────────────────────────

    fn set_document_lang(&mut self, lang: &str);

    /// `document.readyState == "loading"`.
    fn document_loading(&self) -> bool;

    /// `document.hidden`.
    fn document_hidden(&self) -> bool;

    // ── Environment ───────────────────────────────────────────────────

    fn matches_media(&self, query: &str) -> bool;

    fn viewport_height(&self) -> f64;

    fn device_pixel_ratio(&self) -> f64;

    /// Monotonic milliseconds, same clock as frame timestamps.
    fn now_ms(&self) -> f64;

    /// Seed for decorative randomness.
    fn random_seed(&self) -> u64;

    // ── Navigation and media ──────────────────────────────────────────

    fn scroll_into_view(&mut self, el: ElementId, behavior: ScrollBehavior);

    /// Replace the current history entry's fragment with `hash` (`"#id"`).
    fn replace_history_hash(&mut self, hash: &str) -> Result<()>;

    /// Request playback; an autoplay refusal surfaces as `PlaybackRejected`.
    fn play_media(&mut self, el: ElementId) -> Result<()>;

    // ── Canvas ────────────────────────────────────────────────────────

    /// Set the backing store to `width × height` device pixels and reset the
    /// drawing transform to `scale`.
    fn resize_canvas(&mut self, el: ElementId, width: u32, height: u32, scale: f64) -> Result<()>;

    fn clear_canvas(&mut self, el: ElementId, width: f64, height: f64);

    fn fill_dot(&mut self, el: ElementId, dot: Dot<'_>);

    // ── Scheduling ────────────────────────────────────────────────────

    fn request_frame(&mut self) -> Result<FrameHandle>;

    fn cancel_frame(&mut self, handle: FrameHandle) -> Result<()>;

    fn set_timeout(&mut self, delay_ms: u32) -> Result<TimerHandle>;

    fn clear_timeout(&mut self, handle: TimerHandle) -> Result<()>;

    // ── Visibility watchers ───────────────────────────────────────────

    fn supports_visibility_watch(&self) -> bool;

    fn create_watcher(&mut self, options: &WatchOptions) -> Result<WatcherId>;

    fn watch(&mut self, watcher: WatcherId, el: ElementId) -> Result<()>;

    fn unwatch(&mut self, watcher: WatcherId, el: ElementId) -> Result<()>;

    fn disconnect(&mut self, watcher: WatcherId) -> Result<()>;

    // ── Listeners ─────────────────────────────────────────────────────

    fn listen(&mut self, target: EventTarget, kind: EventKind) -> Result<ListenerId>;

    fn unlisten(&mut self, listener: ListenerId) -> Result<()>;
}

/// Input-like elements take translated text as a placeholder.
#[must_use]
pub fn is_input_like(tag: &str) -> bool {
    matches!(tag, "input" | "textarea")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_match_dom() {
        assert_eq!(EventKind::Ready.dom_name(), "DOMContentLoaded");
        assert_eq!(EventKind::MouseLeave.dom_name(), "mouseleave");
        assert!(EventKind::Scroll.is_passive());
        assert!(!EventKind::Click.is_passive());
    }

    #[test]
    fn input_like_tags() {
        assert!(is_input_like("input"));
        assert!(is_input_like("textarea"));
        assert!(!is_input_like("select"));
        assert!(!is_input_like("span"));
    }

    #[test]
    fn handles_order_by_value() {
        assert!(FrameHandle(1) < FrameHandle(2));
        assert_eq!(ListenerId(9).get(), 9);
    }
}
