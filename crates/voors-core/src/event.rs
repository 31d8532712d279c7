//! Host callbacks delivered back into components.

use crate::host::{ElementId, FrameHandle, Host, ListenerId, TimerHandle, WatcherId};

/// A callback the host reports for a resource it handed out earlier.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// A frame request fired; `now_ms` is the frame timestamp.
    Frame { handle: FrameHandle, now_ms: f64 },
    /// A timer elapsed.
    Timer { handle: TimerHandle },
    /// A watched element crossed its watcher's threshold.
    Visibility {
        watcher: WatcherId,
        element: ElementId,
        intersecting: bool,
    },
    /// A DOM event reached a registered listener.
    Dom { listener: ListenerId, event: DomEvent },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    /// `target` is the innermost element that was clicked.
    Click { target: Option<ElementId> },
    KeyDown { key: String },
    Scroll,
    Resize,
    /// Pointer position in viewport coordinates.
    PointerMove { client_x: f64, client_y: f64 },
    PointerEnter,
    PointerLeave,
    Focus,
    Blur,
    VisibilityChange,
    Ready,
}

/// What the host should do with the native event after dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatch {
    pub handled: bool,
    pub prevent_default: bool,
}

impl Dispatch {
    #[must_use]
    pub const fn handled() -> Self {
        Self {
            handled: true,
            prevent_default: false,
        }
    }

    #[must_use]
    pub const fn prevent_default() -> Self {
        Self {
            handled: true,
            prevent_default: true,
        }
    }

    /// Combine outcomes from two sinks that saw the same event.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            handled: self.handled || other.handled,
            prevent_default: self.prevent_default || other.prevent_default,
        }
    }
}

/// Anything that owns host resources and reacts to their callbacks.
pub trait EventSink {
    fn dispatch(&mut self, host: &mut dyn Host, event: &HostEvent) -> Dispatch;
}
