//! E2E: orchestrator lifecycle on a fully marked-up page.
//!
//! Verifies that init acquires resources only where markers exist, that
//! destroy releases every one of them (even when some releases fail), and
//! that nothing reacts after teardown.

#![forbid(unsafe_code)]

use pretty_assertions::assert_eq;
use voors_core::effects::{Reveal, Typing};
use voors_core::{
    AnimationOrchestrator, Effect, EventKind, EventTarget, Host, OrchestratorConfig, Rect,
    TeardownReport,
};
use voors_harness::{BODY, HeadlessPage, init_test_logging};

// ── Fixture ─────────────────────────────────────────────────────────────

struct Site {
    page: HeadlessPage,
    burger: voors_core::ElementId,
    panel: voors_core::ElementId,
    typing: voors_core::ElementId,
}

fn full_site() -> Site {
    let mut page = HeadlessPage::new();
    let header = page.add(BODY, "header", &["hero"], &[]);
    let burger = page.add(header, "button", &[], &[("data-burger", ""), ("aria-expanded", "false")]);
    let panel = page.add(header, "nav", &[], &[("data-mobile", "")]);
    page.add(panel, "a", &[], &[("href", "#contact")]);
    let content = page.add(header, "div", &["hero__content"], &[]);
    page.add(content, "h1", &[], &[]);
    page.add(header, "video", &[], &[]);

    let canvas = page.add(BODY, "canvas", &[], &[("id", "particles-canvas")]);
    page.set_rect(canvas, Rect::new(0.0, 0.0, 320.0, 200.0));

    let grid = page.add(BODY, "section", &["grid"], &[]);
    for _ in 0..3 {
        page.add(grid, "article", &["reveal"], &[("data-tilt", ""), ("data-animate", "")]);
    }
    let typing = page.add(
        BODY,
        "span",
        &[],
        &[("data-typing", ""), ("data-typing-strings", "Acier|Bois")],
    );
    page.add(BODY, "strong", &[], &[("data-counter", "120")]);
    page.add(BODY, "div", &[], &[("data-parallax", "0.2")]);
    page.add(BODY, "div", &[], &[("data-width", "80%")]);
    page.add(BODY, "img", &[], &[("data-src", "a.png")]);
    page.add(BODY, "input", &[], &[]);
    page.add(BODY, "div", &["logos-track"], &[]);
    page.add(BODY, "section", &[], &[("id", "contact")]);
    page.clear_draw_log();

    Site {
        page,
        burger,
        panel,
        typing,
    }
}

fn boot(page: &mut HeadlessPage) -> AnimationOrchestrator {
    init_test_logging();
    let mut orchestrator = AnimationOrchestrator::new(OrchestratorConfig::default());
    orchestrator.init(page);
    orchestrator
}

// ── Tests ───────────────────────────────────────────────────────────────

#[test]
fn empty_page_acquires_only_page_level_listeners() {
    let mut page = HeadlessPage::new();
    let orchestrator = boot(&mut page);

    assert_eq!(page.pending_frames(), 0);
    assert_eq!(page.pending_timers(), 0);
    assert_eq!(page.active_watchers(), 0);
    // Anchor delegation, tab visibility, viewport resize.
    assert_eq!(page.listeners_on(EventTarget::Document, EventKind::Click), 1);
    assert_eq!(
        page.listeners_on(EventTarget::Document, EventKind::VisibilityChange),
        1
    );
    assert_eq!(page.listeners_on(EventTarget::Window, EventKind::Resize), 1);
    assert_eq!(page.active_listeners(), 3);
    assert!(orchestrator.is_active());
}

#[test]
fn init_marks_root_and_body() {
    let mut page = HeadlessPage::new();
    let _orchestrator = boot(&mut page);
    assert!(!page.has_class(page.root(), "reduced-motion"));
    assert!(page.has_class(BODY, "no-custom-cursor"));
}

#[test]
fn destroy_releases_everything() {
    let Site { mut page, .. } = full_site();
    let mut orchestrator = boot(&mut page);
    page.run_frames(&mut [&mut orchestrator], 3);

    assert!(page.pending_frames() > 0);
    assert!(page.pending_timers() > 0);
    assert!(page.active_watchers() > 0);
    assert!(page.active_listeners() > 0);

    let report = orchestrator.destroy(&mut page);
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(page.pending_frames(), 0);
    assert_eq!(page.pending_timers(), 0);
    assert_eq!(page.active_watchers(), 0);
    assert_eq!(page.active_listeners(), 0);
    assert_eq!(orchestrator.ledger().pending_teardown(), 0);
    assert!(!orchestrator.is_active());
}

#[test]
fn second_destroy_is_a_no_op() {
    let Site { mut page, .. } = full_site();
    let mut orchestrator = boot(&mut page);
    let first = orchestrator.destroy(&mut page);
    assert!(first.actions_run > 0);
    assert_eq!(orchestrator.destroy(&mut page), TeardownReport::default());
}

#[test]
fn destroy_before_init_is_a_no_op() {
    let mut page = HeadlessPage::new();
    let mut orchestrator = AnimationOrchestrator::default();
    assert_eq!(orchestrator.destroy(&mut page), TeardownReport::default());
}

#[test]
fn reentrant_init_is_ignored() {
    let Site { mut page, .. } = full_site();
    let mut orchestrator = boot(&mut page);
    let listeners = page.active_listeners();
    let watchers = page.active_watchers();
    orchestrator.init(&mut page);
    assert_eq!(page.active_listeners(), listeners);
    assert_eq!(page.active_watchers(), watchers);
}

#[test]
fn nothing_reacts_after_destroy() {
    let Site {
        mut page,
        burger,
        panel,
        typing,
    } = full_site();
    let mut orchestrator = boot(&mut page);
    orchestrator.destroy(&mut page);

    let text = page.text(typing);
    page.click(&mut [&mut orchestrator], burger);
    page.advance(&mut [&mut orchestrator], 5_000.0);
    page.run_frames(&mut [&mut orchestrator], 5);

    assert_eq!(page.attribute(burger, "aria-expanded").as_deref(), Some("false"));
    assert!(!page.has_class(panel, "is-open"));
    assert_eq!(page.text(typing), text);
    assert_eq!(page.pending_frames(), 0);
}

#[test]
fn destroy_closes_an_open_menu() {
    let Site {
        mut page,
        burger,
        panel,
        ..
    } = full_site();
    let mut orchestrator = boot(&mut page);
    page.click(&mut [&mut orchestrator], burger);
    assert!(page.has_class(BODY, "menu-open"));

    let report = orchestrator.destroy(&mut page);
    assert!(report.is_clean());
    assert!(!page.has_class(BODY, "menu-open"));
    assert!(!page.has_class(panel, "is-open"));
    assert_eq!(page.attribute(burger, "aria-expanded").as_deref(), Some("false"));
}

#[test]
fn teardown_failures_are_isolated_and_counted() {
    let Site { mut page, .. } = full_site();
    let mut orchestrator = boot(&mut page);
    let watchers = page.active_watchers();
    assert!(watchers > 0);

    page.faults.fail_disconnect = true;
    let report = orchestrator.destroy(&mut page);

    assert_eq!(report.failures.len(), watchers);
    assert!(!report.is_clean());
    // Listener removals queued after the failing disconnects still ran.
    assert_eq!(page.active_listeners(), 0);
    assert_eq!(page.pending_frames(), 0);
    assert_eq!(page.pending_timers(), 0);
}

#[test]
fn reinit_after_destroy_rebuilds_effects() {
    let Site { mut page, .. } = full_site();
    let mut orchestrator = boot(&mut page);
    orchestrator.destroy(&mut page);

    orchestrator.init(&mut page);
    assert!(orchestrator.is_active());
    assert!(page.active_watchers() > 0);
    page.clear_draw_log();
    page.run_frame(&mut [&mut orchestrator]);
    assert!(!page.draw_log().is_empty());
    orchestrator.destroy(&mut page);
}

#[test]
fn custom_effect_set_only_touches_its_markers() {
    let Site { mut page, typing, .. } = full_site();
    let effects: Vec<Box<dyn Effect>> = vec![Box::new(Reveal::default()), Box::new(Typing::default())];
    let mut orchestrator = AnimationOrchestrator::with_effects(OrchestratorConfig::default(), effects);
    orchestrator.init(&mut page);

    assert_eq!(orchestrator.active_effects(), vec!["reveal", "typing"]);
    assert_eq!(page.active_listeners(), 0);
    assert_eq!(page.pending_frames(), 0);
    assert_eq!(page.text(typing), "A");
}
