//! E2E: a visitor who prefers reduced motion gets every end state at once
//! and none of the decorative loops.

#![forbid(unsafe_code)]

use pretty_assertions::assert_eq;
use voors_core::{AnimationOrchestrator, Host, OrchestratorConfig, Rect, ScrollBehavior};
use voors_harness::{BODY, HeadlessPage};

fn calm_page() -> HeadlessPage {
    let mut page = HeadlessPage::new();
    page.set_reduced_motion(true);
    page
}

fn boot(page: &mut HeadlessPage) -> AnimationOrchestrator {
    let mut orchestrator = AnimationOrchestrator::new(OrchestratorConfig::default());
    orchestrator.init(page);
    orchestrator
}

#[test]
fn root_is_flagged_and_decorative_effects_are_skipped() {
    let mut page = calm_page();
    let orch = boot(&mut page);
    assert!(orch.environment().reduced_motion);
    assert!(page.has_class(page.root(), "reduced-motion"));

    let active = orch.active_effects();
    for decorative in ["particles", "parallax", "tilt", "micro-interactions", "section-accent", "hero"] {
        assert!(!active.contains(&decorative), "{decorative} should be skipped");
    }
    assert!(active.contains(&"reveal"));
    assert!(active.contains(&"navigation"));
}

#[test]
fn particles_never_touch_the_canvas() {
    let mut page = calm_page();
    let canvas = page.add(BODY, "canvas", &[], &[("id", "particles-canvas")]);
    page.set_rect(canvas, Rect::new(0.0, 0.0, 320.0, 200.0));
    let mut orch = boot(&mut page);
    page.run_frames(&mut [&mut orch], 5);
    assert_eq!(page.canvas(canvas), None);
    assert!(page.draw_log().is_empty());
    assert_eq!(page.pending_frames(), 0);
}

#[test]
fn content_appears_in_its_final_state() {
    let mut page = calm_page();
    let grid = page.add(BODY, "div", &["grid"], &[]);
    let card = page.add(grid, "article", &["reveal"], &[]);
    let typing = page.add(
        BODY,
        "span",
        &[],
        &[("data-typing", ""), ("data-typing-strings", "Acier|Bois")],
    );
    let counter = page.add(BODY, "strong", &[], &[("data-counter", "250"), ("data-suffix", "+")]);
    let bar = page.add(BODY, "div", &[], &[("data-width", "60%")]);
    let _orch = boot(&mut page);

    assert!(page.has_class(card, "is-visible"));
    assert_eq!(page.text(typing), "Acier");
    assert_eq!(page.text(counter), "250+");
    assert_eq!(page.style_property(bar, "width").as_deref(), Some("60%"));
    assert_eq!(page.pending_timers(), 0);
    assert_eq!(page.pending_frames(), 0);
    assert_eq!(page.active_watchers(), 0);
}

#[test]
fn no_hero_cascade_or_section_accent() {
    let mut page = calm_page();
    let hero = page.add(BODY, "header", &["hero"], &[]);
    let video = page.add(hero, "video", &[], &[]);
    let content = page.add(hero, "div", &["hero__content"], &[]);
    let title = page.add(content, "h1", &[], &[]);
    let section = page.add(BODY, "section", &[], &[]);
    let card = page.add(BODY, "div", &[], &[("data-tilt", ""), ("data-animate", "")]);
    page.set_rect(card, Rect::new(0.0, 0.0, 100.0, 100.0));
    let mut orch = boot(&mut page);

    page.advance(&mut [&mut orch], 500.0);
    page.pointer_enter(&mut [&mut orch], card);
    page.pointer_move(&mut [&mut orch], card, 10.0, 10.0);

    assert!(!page.has_class(title, "hero-cascade"));
    assert_eq!(page.style_property(title, "transition-delay"), None);
    assert!(!page.has_class(section, "industrial-scan"));
    assert!(!page.has_class(card, "is-animated"));
    assert_eq!(page.style_property(card, "--rx"), None);
    assert!(!page.played().contains(&video));
}

#[test]
fn anchors_jump_instead_of_gliding() {
    let mut page = calm_page();
    let link = page.add(BODY, "a", &[], &[("href", "#offres")]);
    let target = page.add(BODY, "section", &[], &[("id", "offres")]);
    let mut orch = boot(&mut page);

    let outcome = page.click(&mut [&mut orch], link);
    assert!(outcome.prevent_default);
    assert_eq!(page.scrolls(), &[(target, ScrollBehavior::Auto)]);
    assert_eq!(page.history_hash(), Some("#offres"));
}

#[test]
fn functional_effects_still_respond() {
    let mut page = calm_page();
    let burger = page.add(BODY, "button", &[], &[("data-burger", "")]);
    let panel = page.add(BODY, "nav", &[], &[("data-mobile", "")]);
    let input = page.add(BODY, "textarea", &[], &[]);
    let mut orch = boot(&mut page);

    page.click(&mut [&mut orch], burger);
    assert!(page.has_class(panel, "is-open"));
    page.focus(&mut [&mut orch], input);
    assert!(page.has_class(input, "is-focus"));

    let report = orch.destroy(&mut page);
    assert!(report.is_clean());
    assert_eq!(page.active_listeners(), 0);
}
