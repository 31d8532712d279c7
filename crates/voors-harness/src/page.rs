#![forbid(unsafe_code)]

//! `HeadlessPage`: an in-memory [`Host`] with a virtual clock.
//!
//! The page keeps a small element tree (tag, attributes, classes, inline
//! style, text, box) rooted at `<html>` with a `<body>` child, plus queues for
//! every asynchronous resource the runtime can request. Nothing fires on its
//! own; the driver methods in [`crate::driver`] advance time and deliver
//! callbacks explicitly, so every scenario is deterministic.
//!
//! # Invariants
//!
//! 1. Handles come from one counter and are never reused.
//! 2. Queries only see elements attached under the root, in document order.
//! 3. Cancelled frames and cleared timers never fire; disconnected watchers
//!    and removed listeners never deliver.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;
use voors_core::host::is_input_like;
use voors_core::{
    Dot, ElementId, EventKind, EventTarget, FrameHandle, Host, HostError, ListenerId, Marker,
    Rect, Result, ScrollBehavior, TimerHandle, WatchOptions, WatcherId,
};

pub const ROOT: ElementId = ElementId(0);
pub const BODY: ElementId = ElementId(1);

// ---------------------------------------------------------------------------
// Recorded side effects
// ---------------------------------------------------------------------------

/// One canvas call, in the order the runtime issued it.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear {
        canvas: ElementId,
        width: f64,
        height: f64,
    },
    Dot {
        canvas: ElementId,
        x: f64,
        y: f64,
        radius: f64,
        alpha: f64,
        color: String,
    },
}

/// Backing-store geometry of a canvas after `resize_canvas`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasState {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
}

/// Switches that make host operations fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Faults {
    pub refuse_frames: bool,
    pub refuse_listeners: bool,
    pub fail_unlisten: bool,
    pub fail_disconnect: bool,
    pub fail_history: bool,
    pub reject_playback: bool,
    pub no_canvas: bool,
    /// Elements a watcher refuses to observe.
    pub unwatchable: Vec<ElementId>,
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    style: BTreeMap<String, String>,
    text: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    rect: Rect,
}

#[derive(Debug, Clone)]
pub(crate) struct Watcher {
    pub(crate) options: WatchOptions,
    pub(crate) targets: Vec<ElementId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Registration {
    pub(crate) target: EventTarget,
    pub(crate) kind: EventKind,
}

#[derive(Debug)]
pub struct HeadlessPage {
    nodes: Vec<Node>,
    media: BTreeMap<String, bool>,
    viewport_height: f64,
    pixel_ratio: f64,
    seed: u64,
    watch_supported: bool,
    hidden: bool,
    loading: bool,
    lang: Option<String>,
    hash: Option<String>,
    pub(crate) now_ms: f64,
    next_handle: u32,
    pub(crate) frames: BTreeSet<FrameHandle>,
    pub(crate) timers: BTreeMap<TimerHandle, f64>,
    pub(crate) watchers: BTreeMap<WatcherId, Watcher>,
    pub(crate) listeners: BTreeMap<ListenerId, Registration>,
    canvases: BTreeMap<ElementId, CanvasState>,
    draws: Vec<DrawCall>,
    scrolls: Vec<(ElementId, ScrollBehavior)>,
    played: Vec<ElementId>,
    pub faults: Faults,
}

impl Default for HeadlessPage {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPage {
    /// An empty, fully parsed document with watcher support.
    #[must_use]
    pub fn new() -> Self {
        let root = Node {
            tag: "html".to_string(),
            children: vec![BODY],
            ..Node::default()
        };
        let body = Node {
            tag: "body".to_string(),
            parent: Some(ROOT),
            ..Node::default()
        };
        Self {
            nodes: vec![root, body],
            media: BTreeMap::new(),
            viewport_height: 800.0,
            pixel_ratio: 1.0,
            seed: 0x5eed,
            watch_supported: true,
            hidden: false,
            loading: false,
            lang: None,
            hash: None,
            now_ms: 0.0,
            next_handle: 1,
            frames: BTreeSet::new(),
            timers: BTreeMap::new(),
            watchers: BTreeMap::new(),
            listeners: BTreeMap::new(),
            canvases: BTreeMap::new(),
            draws: Vec::new(),
            scrolls: Vec::new(),
            played: Vec::new(),
            faults: Faults::default(),
        }
    }

    // ── Fixture building ─────────────────────────────────────────────

    /// Append a new `tag` element under `parent` with the given classes and
    /// attributes.
    pub fn add(
        &mut self,
        parent: ElementId,
        tag: &str,
        classes: &[&str],
        attrs: &[(&str, &str)],
    ) -> ElementId {
        let el = self.create_element(tag);
        for class in classes {
            self.add_class(el, class);
        }
        for (name, value) in attrs {
            self.set_attribute(el, name, value);
        }
        self.append_child(parent, el);
        el
    }

    pub fn set_rect(&mut self, el: ElementId, rect: Rect) {
        if let Some(node) = self.node_mut(el) {
            node.rect = rect;
        }
    }

    pub fn set_media(&mut self, query: &str, matches: bool) {
        self.media.insert(query.to_string(), matches);
    }

    pub fn set_reduced_motion(&mut self, on: bool) {
        self.set_media(voors_core::env::REDUCED_MOTION_QUERY, on);
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height;
    }

    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Simulate a platform without visibility observers.
    pub fn set_watch_supported(&mut self, supported: bool) {
        self.watch_supported = supported;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub(crate) fn set_hidden_flag(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    // ── Inspection ───────────────────────────────────────────────────

    #[must_use]
    pub fn now(&self) -> f64 {
        self.now_ms
    }

    #[must_use]
    pub fn classes(&self, el: ElementId) -> Vec<String> {
        self.node(el).map(|n| n.classes.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn children(&self, el: ElementId) -> Vec<ElementId> {
        self.node(el).map(|n| n.children.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn document_lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }

    #[must_use]
    pub fn history_hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    #[must_use]
    pub fn scrolls(&self) -> &[(ElementId, ScrollBehavior)] {
        &self.scrolls
    }

    #[must_use]
    pub fn played(&self) -> &[ElementId] {
        &self.played
    }

    #[must_use]
    pub fn canvas(&self, el: ElementId) -> Option<CanvasState> {
        self.canvases.get(&el).copied()
    }

    #[must_use]
    pub fn draw_log(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn clear_draw_log(&mut self) {
        self.draws.clear();
    }

    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    #[must_use]
    pub fn active_watchers(&self) -> usize {
        self.watchers.len()
    }

    #[must_use]
    pub fn active_listeners(&self) -> usize {
        self.listeners.len()
    }

    /// Options of the watcher currently watching `el`, if any.
    #[must_use]
    pub fn watch_options(&self, el: ElementId) -> Option<&WatchOptions> {
        self.watchers
            .values()
            .find(|w| w.targets.contains(&el))
            .map(|w| &w.options)
    }

    #[must_use]
    pub fn is_watched(&self, el: ElementId) -> bool {
        self.watch_options(el).is_some()
    }

    /// Listeners of `kind` attached to `target`.
    #[must_use]
    pub fn listeners_on(&self, target: EventTarget, kind: EventKind) -> usize {
        self.listeners
            .values()
            .filter(|r| r.target == target && r.kind == kind)
            .count()
    }

    // ── Internals ────────────────────────────────────────────────────

    fn node(&self, el: ElementId) -> Option<&Node> {
        self.nodes.get(el.get() as usize)
    }

    fn node_mut(&mut self, el: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(el.get() as usize)
    }

    fn bump(&mut self) -> u32 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }

    /// Attached elements in document order.
    fn document_order(&self) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![ROOT];
        while let Some(el) = stack.pop() {
            out.push(el);
            if let Some(node) = self.node(el) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    pub(crate) fn ancestors(&self, el: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut cur = self.node(el).and_then(|n| n.parent);
        while let Some(p) = cur {
            out.push(p);
            cur = self.node(p).and_then(|n| n.parent);
        }
        out
    }

    fn has_attr(&self, el: ElementId, name: &str) -> bool {
        self.node(el).is_some_and(|n| n.attrs.contains_key(name))
    }

    fn tag_is(&self, el: ElementId, tag: &str) -> bool {
        self.node(el).is_some_and(|n| n.tag == tag)
    }

    fn inside_hero(&self, el: ElementId) -> bool {
        self.ancestors(el).into_iter().any(|a| self.has_class(a, "hero"))
    }

    fn matches(&self, el: ElementId, marker: Marker) -> bool {
        match marker {
            Marker::LazyImage => self.tag_is(el, "img") && self.has_attr(el, "data-src"),
            Marker::Burger => self.has_attr(el, "data-burger"),
            Marker::MobilePanel => self.has_attr(el, "data-mobile"),
            Marker::Link => self.tag_is(el, "a"),
            Marker::InPageAnchor => {
                self.tag_is(el, "a")
                    && self
                        .attribute(el, "href")
                        .is_some_and(|h| h.starts_with('#'))
            }
            Marker::Reveal => self.has_class(el, "reveal"),
            Marker::Typing => self.has_attr(el, "data-typing"),
            Marker::Counter => self.has_attr(el, "data-counter"),
            Marker::ParticlesCanvas => {
                self.attribute(el, "id").as_deref() == Some("particles-canvas")
            }
            Marker::Parallax => self.has_attr(el, "data-parallax"),
            Marker::Tilt => self.has_attr(el, "data-tilt"),
            Marker::Animate => self.has_attr(el, "data-animate"),
            Marker::Section => self.tag_is(el, "section"),
            Marker::ProgressBar => self.has_attr(el, "data-width"),
            Marker::FormControl => {
                self.node(el)
                    .is_some_and(|n| is_input_like(&n.tag) || n.tag == "select")
            }
            Marker::Hero => self.has_class(el, "hero"),
            Marker::HeroVideo => self.tag_is(el, "video") && self.inside_hero(el),
            Marker::Video => self.tag_is(el, "video"),
            Marker::HeroCascade => {
                let in_content = self
                    .parent(el)
                    .is_some_and(|p| self.has_class(p, "hero__content") && self.inside_hero(p));
                (self.has_class(el, "reveal") && self.inside_hero(el)) || in_content
            }
            Marker::LogosTrack => self.has_class(el, "logos-track"),
            Marker::LangSwitch => self.has_attr(el, "data-lang-switch"),
            Marker::I18n => self.has_attr(el, "data-i18n"),
        }
    }

    fn unknown(kind: &'static str, id: u32) -> HostError {
        HostError::UnknownHandle { kind, id }
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

impl Host for HeadlessPage {
    fn query_all(&self, marker: Marker) -> Vec<ElementId> {
        self.document_order()
            .into_iter()
            .filter(|&el| self.matches(el, marker))
            .collect()
    }

    fn closest(&self, el: ElementId, marker: Marker) -> Option<ElementId> {
        std::iter::once(el)
            .chain(self.ancestors(el))
            .find(|&e| self.matches(e, marker))
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.document_order()
            .into_iter()
            .find(|&el| self.attribute(el, "id").as_deref() == Some(id))
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.node(el).and_then(|n| n.parent)
    }

    fn root(&self) -> ElementId {
        ROOT
    }

    fn body(&self) -> Option<ElementId> {
        Some(BODY)
    }

    fn tag_name(&self, el: ElementId) -> String {
        self.node(el).map(|n| n.tag.clone()).unwrap_or_default()
    }

    fn create_element(&mut self, tag: &str) -> ElementId {
        let id = ElementId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            ..Node::default()
        });
        id
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        if child == ROOT || self.node(parent).is_none() || self.node(child).is_none() {
            return;
        }
        if let Some(old) = self.parent(child) {
            if let Some(node) = self.node_mut(old) {
                node.children.retain(|&c| c != child);
            }
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.node(el).and_then(|n| n.attrs.get(name).cloned())
    }

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) {
        if let Some(node) = self.node_mut(el) {
            node.attrs.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, el: ElementId, name: &str) {
        if let Some(node) = self.node_mut(el) {
            node.attrs.remove(name);
        }
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.node(el).is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, el: ElementId, class: &str) {
        if let Some(node) = self.node_mut(el) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, el: ElementId, class: &str) {
        if let Some(node) = self.node_mut(el) {
            node.classes.retain(|c| c != class);
        }
    }

    fn style_property(&self, el: ElementId, name: &str) -> Option<String> {
        self.node(el)
            .and_then(|n| n.style.get(name))
            .filter(|v| !v.is_empty())
            .cloned()
    }

    fn set_style_property(&mut self, el: ElementId, name: &str, value: &str) {
        if let Some(node) = self.node_mut(el) {
            node.style.insert(name.to_string(), value.to_string());
        }
    }

    fn text(&self, el: ElementId) -> String {
        self.node(el).map(|n| n.text.clone()).unwrap_or_default()
    }

    fn set_text(&mut self, el: ElementId, text: &str) {
        let Some(node) = self.node_mut(el) else {
            return;
        };
        node.text = text.to_string();
        let orphans = std::mem::take(&mut node.children);
        for child in orphans {
            if let Some(c) = self.node_mut(child) {
                c.parent = None;
            }
        }
    }

    fn bounding_rect(&self, el: ElementId) -> Rect {
        self.node(el).map(|n| n.rect).unwrap_or_default()
    }

    fn set_document_lang(&mut self, lang: &str) {
        self.lang = Some(lang.to_string());
    }

    fn document_loading(&self) -> bool {
        self.loading
    }

    fn document_hidden(&self) -> bool {
        self.hidden
    }

    fn matches_media(&self, query: &str) -> bool {
        self.media.get(query).copied().unwrap_or(false)
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn random_seed(&self) -> u64 {
        self.seed
    }

    fn scroll_into_view(&mut self, el: ElementId, behavior: ScrollBehavior) {
        self.scrolls.push((el, behavior));
    }

    fn replace_history_hash(&mut self, hash: &str) -> Result<()> {
        if self.faults.fail_history {
            return Err(HostError::platform("history is read-only"));
        }
        self.hash = Some(hash.to_string());
        Ok(())
    }

    fn play_media(&mut self, el: ElementId) -> Result<()> {
        if self.faults.reject_playback {
            return Err(HostError::PlaybackRejected {
                reason: "autoplay blocked".to_string(),
            });
        }
        self.played.push(el);
        Ok(())
    }

    fn resize_canvas(&mut self, el: ElementId, width: u32, height: u32, scale: f64) -> Result<()> {
        if self.faults.no_canvas || !self.tag_is(el, "canvas") {
            return Err(HostError::Unsupported {
                capability: "canvas 2d context",
            });
        }
        self.canvases.insert(
            el,
            CanvasState {
                width,
                height,
                scale,
            },
        );
        Ok(())
    }

    fn clear_canvas(&mut self, el: ElementId, width: f64, height: f64) {
        self.draws.push(DrawCall::Clear {
            canvas: el,
            width,
            height,
        });
    }

    fn fill_dot(&mut self, el: ElementId, dot: Dot<'_>) {
        self.draws.push(DrawCall::Dot {
            canvas: el,
            x: dot.x,
            y: dot.y,
            radius: dot.radius,
            alpha: dot.alpha,
            color: dot.color.to_string(),
        });
    }

    fn request_frame(&mut self) -> Result<FrameHandle> {
        if self.faults.refuse_frames {
            return Err(HostError::Unsupported {
                capability: "animation frames",
            });
        }
        let handle = FrameHandle(self.bump());
        self.frames.insert(handle);
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) -> Result<()> {
        if self.frames.remove(&handle) {
            Ok(())
        } else {
            Err(Self::unknown("frame", handle.get()))
        }
    }

    fn set_timeout(&mut self, delay_ms: u32) -> Result<TimerHandle> {
        let handle = TimerHandle(self.bump());
        self.timers.insert(handle, self.now_ms + f64::from(delay_ms));
        Ok(handle)
    }

    fn clear_timeout(&mut self, handle: TimerHandle) -> Result<()> {
        match self.timers.remove(&handle) {
            Some(_) => Ok(()),
            None => Err(Self::unknown("timer", handle.get())),
        }
    }

    fn supports_visibility_watch(&self) -> bool {
        self.watch_supported
    }

    fn create_watcher(&mut self, options: &WatchOptions) -> Result<WatcherId> {
        if !self.watch_supported {
            return Err(HostError::Unsupported {
                capability: "visibility watcher",
            });
        }
        let id = WatcherId(self.bump());
        self.watchers.insert(
            id,
            Watcher {
                options: options.clone(),
                targets: Vec::new(),
            },
        );
        Ok(id)
    }

    fn watch(&mut self, watcher: WatcherId, el: ElementId) -> Result<()> {
        let w = self
            .watchers
            .get_mut(&watcher)
            .ok_or_else(|| Self::unknown("watcher", watcher.get()))?;
        if self.faults.unwatchable.contains(&el) {
            return Err(HostError::platform("element cannot be observed"));
        }
        if !w.targets.contains(&el) {
            w.targets.push(el);
        }
        Ok(())
    }

    fn unwatch(&mut self, watcher: WatcherId, el: ElementId) -> Result<()> {
        let w = self
            .watchers
            .get_mut(&watcher)
            .ok_or_else(|| Self::unknown("watcher", watcher.get()))?;
        w.targets.retain(|&t| t != el);
        Ok(())
    }

    fn disconnect(&mut self, watcher: WatcherId) -> Result<()> {
        if self.faults.fail_disconnect {
            return Err(HostError::platform("disconnect failed"));
        }
        self.watchers
            .remove(&watcher)
            .map(|_| ())
            .ok_or_else(|| Self::unknown("watcher", watcher.get()))
    }

    fn listen(&mut self, target: EventTarget, kind: EventKind) -> Result<ListenerId> {
        if self.faults.refuse_listeners {
            return Err(HostError::platform("listener registration refused"));
        }
        let id = ListenerId(self.bump());
        self.listeners.insert(id, Registration { target, kind });
        trace!(listener = id.get(), event = kind.dom_name(), "listen");
        Ok(id)
    }

    fn unlisten(&mut self, listener: ListenerId) -> Result<()> {
        if self.faults.fail_unlisten {
            return Err(HostError::platform("listener removal failed"));
        }
        self.listeners
            .remove(&listener)
            .map(|_| ())
            .ok_or_else(|| Self::unknown("listener", listener.get()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_follow_document_order_and_skip_detached() {
        let mut page = HeadlessPage::new();
        let a = page.add(BODY, "div", &["reveal"], &[]);
        let section = page.add(BODY, "section", &[], &[]);
        let b = page.add(section, "p", &["reveal"], &[]);
        let c = page.add(a, "span", &["reveal"], &[]);
        let detached = page.create_element("div");
        page.add_class(detached, "reveal");
        assert_eq!(page.query_all(Marker::Reveal), vec![a, c, b]);
    }

    #[test]
    fn hero_cascade_matches_content_children_and_reveals() {
        let mut page = HeadlessPage::new();
        let hero = page.add(BODY, "header", &["hero"], &[]);
        let content = page.add(hero, "div", &["hero__content"], &[]);
        let title = page.add(content, "h1", &[], &[]);
        let nested = page.add(title, "span", &[], &[]);
        let reveal = page.add(content, "p", &["reveal"], &[]);
        let outside = page.add(BODY, "div", &["hero__content"], &[]);
        let stray = page.add(outside, "p", &[], &[]);
        let found = page.query_all(Marker::HeroCascade);
        assert_eq!(found, vec![title, reveal]);
        assert!(!found.contains(&nested));
        assert!(!found.contains(&stray));
    }

    #[test]
    fn closest_is_inclusive() {
        let mut page = HeadlessPage::new();
        let switch = page.add(BODY, "button", &[], &[("data-lang-switch", "")]);
        let icon = page.add(switch, "i", &[], &[]);
        assert_eq!(page.closest(icon, Marker::LangSwitch), Some(switch));
        assert_eq!(page.closest(switch, Marker::LangSwitch), Some(switch));
        assert_eq!(page.closest(BODY, Marker::LangSwitch), None);
    }

    #[test]
    fn handles_are_unique_across_kinds() {
        let mut page = HeadlessPage::new();
        let f = page.request_frame().unwrap();
        let t = page.set_timeout(10).unwrap();
        let l = page.listen(EventTarget::Window, EventKind::Resize).unwrap();
        assert_ne!(f.get(), t.get());
        assert_ne!(t.get(), l.get());
        page.cancel_frame(f).unwrap();
        assert!(page.cancel_frame(f).is_err());
    }

    #[test]
    fn unsupported_watchers_are_refused() {
        let mut page = HeadlessPage::new();
        page.set_watch_supported(false);
        let err = page.create_watcher(&WatchOptions::new(0.5, "0px")).unwrap_err();
        assert!(matches!(err, HostError::Unsupported { .. }));
    }
}
