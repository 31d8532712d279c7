//! [`Host`] over the live DOM.
//!
//! Elements are interned: the first time the runtime sees a DOM element it
//! gets the next [`ElementId`], stored both in a registry and as an
//! expando property on the element so later lookups resolve to the same id.
//!
//! Every callback the browser fires (frames, timers, observer entries,
//! listener events) is handed to the [`Pump`] as a [`Raw`] event and resolved
//! back into a [`HostEvent`] by [`WebHost::resolve`] once the runtime is
//! free. Resolution drops callbacks whose handle was released in between, so
//! a cancelled resource never reaches a component.
//!
//! # Failure Modes
//!
//! - DOM exceptions surface as [`HostError::Platform`].
//! - Listener and observer closures released while the browser may still be
//!   inside them are parked and dropped at the next top-level delivery.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::rc::Weak;

use js_sys::{Array, Reflect};
use tracing::{debug, trace, warn};
use voors_core::{
    Dot, DomEvent, ElementId, EventKind, EventTarget, FrameHandle, Host, HostError, HostEvent,
    ListenerId, Marker, Rect, Result, ScrollBehavior, TimerHandle, WatchOptions, WatcherId,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, Document, Element, HtmlCanvasElement,
    HtmlElement, HtmlMediaElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, MouseEvent, ScrollIntoViewOptions, Window,
};

use super::pump::{Pump, Raw};

/// Expando property carrying an element's interned id.
const ID_KEY: &str = "__voorsId";

/// Returned when an element cannot be created; every lookup misses it.
const DETACHED: ElementId = ElementId(u32::MAX);

/// Best-effort message from a thrown JS value.
pub(crate) fn describe(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"))
}

/// `document.readyState == "loading"`.
pub(crate) fn is_loading(document: &Document) -> bool {
    Reflect::get(document, &JsValue::from_str("readyState"))
        .ok()
        .and_then(|v| v.as_string())
        .is_some_and(|state| state == "loading")
}

fn js(context: &'static str) -> impl Fn(JsValue) -> HostError {
    move |err| HostError::platform(format!("{context}: {}", describe(&err)))
}

struct Listener {
    target: web_sys::EventTarget,
    kind: EventKind,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

struct Watcher {
    observer: IntersectionObserver,
    callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}


pub(crate) struct WebHost {
    window: Window,
    document: Document,
    pump: Weak<Pump>,
    elements: RefCell<Vec<Element>>,
    next_handle: u32,
    frames: HashMap<FrameHandle, i32>,
    timers: HashMap<TimerHandle, i32>,
    watchers: HashMap<WatcherId, Watcher>,
    listeners: HashMap<ListenerId, Listener>,
    canvases: HashMap<ElementId, CanvasRenderingContext2d>,
    /// Released closures the browser may still be executing.
    retired: Vec<Box<dyn Any>>,
}

impl WebHost {
    pub(crate) fn new(window: Window, document: Document, pump: Weak<Pump>) -> Self {
        Self {
            window,
            document,
            pump,
            elements: RefCell::new(Vec::new()),
            next_handle: 1,
            frames: HashMap::new(),
            timers: HashMap::new(),
            watchers: HashMap::new(),
            listeners: HashMap::new(),
            canvases: HashMap::new(),
            retired: Vec::new(),
        }
    }

    fn bump(&mut self) -> u32 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }

    fn intern(&self, el: &Element) -> ElementId {
        let key = JsValue::from_str(ID_KEY);
        if let Some(id) = Reflect::get(el, &key).ok().and_then(|v| v.as_f64()) {
            return ElementId(id as u32);
        }
        let mut elements = self.elements.borrow_mut();
        let id = ElementId(u32::try_from(elements.len()).unwrap_or(u32::MAX));
        if let Err(err) = Reflect::set(el, &key, &JsValue::from(id.get())) {
            warn!(err = %describe(&err), "element id not stored; lookups may duplicate");
        }
        elements.push(el.clone());
        id
    }

    fn element(&self, el: ElementId) -> Option<Element> {
        self.elements.borrow().get(el.get() as usize).cloned()
    }

    fn html_element(&self, el: ElementId) -> Option<HtmlElement> {
        self.element(el)?.dyn_into::<HtmlElement>().ok()
    }

    /// Drop closures parked by earlier releases.
    pub(crate) fn sweep(&mut self) {
        if !self.retired.is_empty() {
            trace!(count = self.retired.len(), "retired closures dropped");
            self.retired.clear();
        }
    }

    /// Turn a browser callback into the events components see. Callbacks for
    /// handles released since they were queued resolve to nothing.
    pub(crate) fn resolve(&mut self, raw: Raw) -> Vec<HostEvent> {
        match raw {
            Raw::Frame { handle, now_ms } => match self.frames.remove(&handle) {
                Some(_) => vec![HostEvent::Frame { handle, now_ms }],
                None => Vec::new(),
            },
            Raw::Timer { handle } => match self.timers.remove(&handle) {
                Some(_) => vec![HostEvent::Timer { handle }],
                None => Vec::new(),
            },
            Raw::Dom { listener, event } => {
                let Some(kind) = self.listeners.get(&listener).map(|l| l.kind) else {
                    return Vec::new();
                };
                let event = self.translate(kind, &event);
                vec![HostEvent::Dom { listener, event }]
            }
            Raw::Intersections { watcher, entries } => {
                if !self.watchers.contains_key(&watcher) {
                    return Vec::new();
                }
                entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|entry| HostEvent::Visibility {
                        watcher,
                        element: self.intern(&entry.target()),
                        intersecting: entry.is_intersecting(),
                    })
                    .collect()
            }
        }
    }

    fn translate(&self, kind: EventKind, event: &web_sys::Event) -> DomEvent {
        match kind {
            EventKind::Click => DomEvent::Click {
                target: event
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .map(|el| self.intern(&el)),
            },
            EventKind::KeyDown => DomEvent::KeyDown {
                key: event
                    .dyn_ref::<KeyboardEvent>()
                    .map(KeyboardEvent::key)
                    .unwrap_or_default(),
            },
            EventKind::MouseMove => {
                let (client_x, client_y) = event
                    .dyn_ref::<MouseEvent>()
                    .map_or((0.0, 0.0), |m| {
                        (f64::from(m.client_x()), f64::from(m.client_y()))
                    });
                DomEvent::PointerMove { client_x, client_y }
            }
            EventKind::Scroll => DomEvent::Scroll,
            EventKind::Resize => DomEvent::Resize,
            EventKind::MouseEnter => DomEvent::PointerEnter,
            EventKind::MouseLeave => DomEvent::PointerLeave,
            EventKind::Focus => DomEvent::Focus,
            EventKind::Blur => DomEvent::Blur,
            EventKind::VisibilityChange => DomEvent::VisibilityChange,
            EventKind::Ready => DomEvent::Ready,
        }
    }

    fn canvas_context(&self, el: ElementId) -> Option<&CanvasRenderingContext2d> {
        self.canvases.get(&el)
    }
}

impl Host for WebHost {
    fn query_all(&self, marker: Marker) -> Vec<ElementId> {
        match self.document.query_selector_all(marker.css()) {
            Ok(list) => (0..list.length())
                .filter_map(|i| list.item(i))
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .map(|el| self.intern(&el))
                .collect(),
            Err(err) => {
                warn!(%marker, err = %describe(&err), "selector rejected");
                Vec::new()
            }
        }
    }

    fn closest(&self, el: ElementId, marker: Marker) -> Option<ElementId> {
        let found = self.element(el)?.closest(marker.css()).ok().flatten()?;
        Some(self.intern(&found))
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.document
            .get_element_by_id(id)
            .map(|el| self.intern(&el))
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        let parent = self.element(el)?.parent_element()?;
        Some(self.intern(&parent))
    }

    fn root(&self) -> ElementId {
        self.document
            .document_element()
            .map_or(DETACHED, |el| self.intern(&el))
    }

    fn body(&self) -> Option<ElementId> {
        self.document.body().map(|body| self.intern(&body))
    }

    fn tag_name(&self, el: ElementId) -> String {
        self.element(el)
            .map(|e| e.tag_name().to_ascii_lowercase())
            .unwrap_or_default()
    }

    fn create_element(&mut self, tag: &str) -> ElementId {
        match self.document.create_element(tag) {
            Ok(el) => self.intern(&el),
            Err(err) => {
                warn!(tag, err = %describe(&err), "element creation failed");
                DETACHED
            }
        }
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        let (Some(parent), Some(child)) = (self.element(parent), self.element(child)) else {
            return;
        };
        if let Err(err) = parent.append_child(&child) {
            warn!(err = %describe(&err), "append failed");
        }
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.element(el)?.get_attribute(name)
    }

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) {
        if let Some(e) = self.element(el) {
            if let Err(err) = e.set_attribute(name, value) {
                debug!(name, err = %describe(&err), "attribute rejected");
            }
        }
    }

    fn remove_attribute(&mut self, el: ElementId, name: &str) {
        if let Some(e) = self.element(el) {
            if let Err(err) = e.remove_attribute(name) {
                debug!(name, err = %describe(&err), "attribute removal rejected");
            }
        }
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.element(el)
            .is_some_and(|e| e.class_list().contains(class))
    }

    fn add_class(&mut self, el: ElementId, class: &str) {
        if let Some(e) = self.element(el) {
            if let Err(err) = e.class_list().add_1(class) {
                debug!(class, err = %describe(&err), "class rejected");
            }
        }
    }

    fn remove_class(&mut self, el: ElementId, class: &str) {
        if let Some(e) = self.element(el) {
            if let Err(err) = e.class_list().remove_1(class) {
                debug!(class, err = %describe(&err), "class removal rejected");
            }
        }
    }

    fn style_property(&self, el: ElementId, name: &str) -> Option<String> {
        self.html_element(el)?
            .style()
            .get_property_value(name)
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn set_style_property(&mut self, el: ElementId, name: &str, value: &str) {
        if let Some(e) = self.html_element(el) {
            if let Err(err) = e.style().set_property(name, value) {
                debug!(name, err = %describe(&err), "style rejected");
            }
        }
    }

    fn text(&self, el: ElementId) -> String {
        self.element(el)
            .and_then(|e| e.text_content())
            .unwrap_or_default()
    }

    fn set_text(&mut self, el: ElementId, text: &str) {
        if let Some(e) = self.element(el) {
            e.set_text_content(Some(text));
        }
    }

    fn bounding_rect(&self, el: ElementId) -> Rect {
        self.element(el).map_or_else(Rect::default, |e| {
            let r = e.get_bounding_client_rect();
            Rect::new(r.left(), r.top(), r.width(), r.height())
        })
    }

    fn set_document_lang(&mut self, lang: &str) {
        let root = self.root();
        self.set_attribute(root, "lang", lang);
    }

    fn document_loading(&self) -> bool {
        is_loading(&self.document)
    }

    fn document_hidden(&self) -> bool {
        self.document.hidden()
    }

    fn matches_media(&self, query: &str) -> bool {
        matches!(self.window.match_media(query), Ok(Some(list)) if list.matches())
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    fn now_ms(&self) -> f64 {
        self.window.performance().map_or(0.0, |p| p.now())
    }

    fn random_seed(&self) -> u64 {
        let hi = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
        let lo = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
        (hi << 32) | lo
    }

    fn scroll_into_view(&mut self, el: ElementId, behavior: ScrollBehavior) {
        let Some(e) = self.element(el) else {
            return;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(match behavior {
            ScrollBehavior::Auto => web_sys::ScrollBehavior::Auto,
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
        });
        e.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn replace_history_hash(&mut self, hash: &str) -> Result<()> {
        let history = self.window.history().map_err(js("history"))?;
        history
            .replace_state_with_url(&JsValue::NULL, "", Some(hash))
            .map_err(js("replaceState"))
    }

    fn play_media(&mut self, el: ElementId) -> Result<()> {
        let media = self
            .element(el)
            .and_then(|e| e.dyn_into::<HtmlMediaElement>().ok())
            .ok_or_else(|| HostError::missing("media element"))?;
        let promise = media.play().map_err(|err| HostError::PlaybackRejected {
            reason: describe(&err),
        })?;
        // Autoplay refusals arrive as a rejected promise.
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await {
                debug!(reason = %describe(&err), "media playback rejected");
            }
        });
        Ok(())
    }

    fn resize_canvas(&mut self, el: ElementId, width: u32, height: u32, scale: f64) -> Result<()> {
        let unsupported = || HostError::Unsupported {
            capability: "canvas 2d context",
        };
        let canvas = self
            .element(el)
            .and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or_else(unsupported)?;
        canvas.set_width(width);
        canvas.set_height(height);
        let ctx = canvas
            .get_context("2d")
            .map_err(js("getContext"))?
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(unsupported)?;
        ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0)
            .map_err(js("setTransform"))?;
        self.canvases.insert(el, ctx);
        Ok(())
    }

    fn clear_canvas(&mut self, el: ElementId, width: f64, height: f64) {
        if let Some(ctx) = self.canvas_context(el) {
            ctx.clear_rect(0.0, 0.0, width, height);
        }
    }

    fn fill_dot(&mut self, el: ElementId, dot: Dot<'_>) {
        let Some(ctx) = self.canvas_context(el) else {
            return;
        };
        ctx.begin_path();
        if ctx.arc(dot.x, dot.y, dot.radius, 0.0, TAU).is_err() {
            return;
        }
        ctx.set_global_alpha(dot.alpha);
        ctx.set_fill_style_str(dot.color);
        ctx.fill();
        ctx.set_global_alpha(1.0);
    }

    fn request_frame(&mut self) -> Result<FrameHandle> {
        let handle = FrameHandle(self.bump());
        let pump = self.pump.clone();
        let callback = Closure::once_into_js(move |now_ms: f64| {
            if let Some(pump) = pump.upgrade() {
                pump.deliver(Raw::Frame { handle, now_ms });
            }
        });
        let id = self
            .window
            .request_animation_frame(callback.unchecked_ref())
            .map_err(js("requestAnimationFrame"))?;
        self.frames.insert(handle, id);
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) -> Result<()> {
        let id = self.frames.remove(&handle).ok_or(HostError::UnknownHandle {
            kind: "frame",
            id: handle.get(),
        })?;
        self.window
            .cancel_animation_frame(id)
            .map_err(js("cancelAnimationFrame"))
    }

    fn set_timeout(&mut self, delay_ms: u32) -> Result<TimerHandle> {
        let handle = TimerHandle(self.bump());
        let pump = self.pump.clone();
        let callback = Closure::once_into_js(move || {
            if let Some(pump) = pump.upgrade() {
                pump.deliver(Raw::Timer { handle });
            }
        });
        let id = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                i32::try_from(delay_ms).unwrap_or(i32::MAX),
            )
            .map_err(js("setTimeout"))?;
        self.timers.insert(handle, id);
        Ok(handle)
    }

    fn clear_timeout(&mut self, handle: TimerHandle) -> Result<()> {
        let id = self.timers.remove(&handle).ok_or(HostError::UnknownHandle {
            kind: "timer",
            id: handle.get(),
        })?;
        self.window.clear_timeout_with_handle(id);
        Ok(())
    }

    fn supports_visibility_watch(&self) -> bool {
        Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
    }

    fn create_watcher(&mut self, options: &WatchOptions) -> Result<WatcherId> {
        let id = WatcherId(self.bump());
        let pump = self.pump.clone();
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                if let Some(pump) = pump.upgrade() {
                    pump.deliver(Raw::Intersections {
                        watcher: id,
                        entries,
                    });
                }
            },
        );
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin);
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
                .map_err(js("IntersectionObserver"))?;
        self.watchers.insert(id, Watcher { observer, callback });
        Ok(id)
    }

    fn watch(&mut self, watcher: WatcherId, el: ElementId) -> Result<()> {
        let w = self.watchers.get(&watcher).ok_or(HostError::UnknownHandle {
            kind: "watcher",
            id: watcher.get(),
        })?;
        let target = self
            .element(el)
            .ok_or_else(|| HostError::missing(format!("element {}", el.get())))?;
        w.observer.observe(&target);
        Ok(())
    }

    fn unwatch(&mut self, watcher: WatcherId, el: ElementId) -> Result<()> {
        let w = self.watchers.get(&watcher).ok_or(HostError::UnknownHandle {
            kind: "watcher",
            id: watcher.get(),
        })?;
        if let Some(target) = self.element(el) {
            w.observer.unobserve(&target);
        }
        Ok(())
    }

    fn disconnect(&mut self, watcher: WatcherId) -> Result<()> {
        let w = self.watchers.remove(&watcher).ok_or(HostError::UnknownHandle {
            kind: "watcher",
            id: watcher.get(),
        })?;
        w.observer.disconnect();
        self.retired.push(Box::new(w.callback));
        Ok(())
    }

    fn listen(&mut self, target: EventTarget, kind: EventKind) -> Result<ListenerId> {
        let target: web_sys::EventTarget = match target {
            EventTarget::Window => self.window.clone().into(),
            EventTarget::Document => self.document.clone().into(),
            EventTarget::Element(el) => self
                .element(el)
                .ok_or_else(|| HostError::missing(format!("element {}", el.get())))?
                .into(),
        };
        let id = ListenerId(self.bump());
        let pump = self.pump.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let Some(pump) = pump.upgrade() else {
                return;
            };
            let outcome = pump.deliver(Raw::Dom {
                listener: id,
                event: event.clone(),
            });
            if outcome.prevent_default {
                event.prevent_default();
            }
        });
        let options = AddEventListenerOptions::new();
        options.set_passive(kind.is_passive());
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind.dom_name(),
                callback.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(js("addEventListener"))?;
        self.listeners.insert(
            id,
            Listener {
                target,
                kind,
                callback,
            },
        );
        Ok(id)
    }

    fn unlisten(&mut self, listener: ListenerId) -> Result<()> {
        let l = self.listeners.remove(&listener).ok_or(HostError::UnknownHandle {
            kind: "listener",
            id: listener.get(),
        })?;
        let removed = l
            .target
            .remove_event_listener_with_callback(l.kind.dom_name(), l.callback.as_ref().unchecked_ref())
            .map_err(js("removeEventListener"));
        self.retired.push(Box::new(l.callback));
        removed
    }
}
