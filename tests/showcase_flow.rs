//! End-to-end flow: mount the whole page on a virtual clock and drive it
//! the way a browser host would.
//!
//! Run with: cargo test --test showcase_flow

use std::cell::RefCell;
use std::rc::Rc;

use spark_showcase::host::events;
use spark_showcase::{
    mount, PageLayout, PointerOffset, SectionId, ShowcaseConfig, TypewriterPhase, VirtualClock,
};

// =============================================================================
// HELPERS
// =============================================================================

fn setup() -> (Rc<VirtualClock>, Rc<PageLayout>, ShowcaseConfig) {
    events::reset_events();
    events::set_viewport(1920.0, 1080.0);

    let layout = Rc::new(PageLayout::stacked([
        ("home", 800.0),
        ("about", 600.0),
        ("projects", 900.0),
        ("contact", 500.0),
    ]));
    let config = ShowcaseConfig::from_json(
        r#"{
            "typewriter": {
                "phrases": ["ab", "c"],
                "typing_interval_ms": 10,
                "deleting_interval_ms": 5,
                "pause_after_typed_ms": 100,
                "pause_after_deleted_ms": 50
            }
        }"#,
    )
    .unwrap();

    (Rc::new(VirtualClock::new()), layout, config)
}

fn section(id: &str) -> Option<SectionId> {
    Some(SectionId::from(id))
}

// =============================================================================
// TESTS
// =============================================================================

#[test]
fn test_typewriter_renders_through_mount() {
    let (clock, layout, config) = setup();
    let handle = mount(&config, layout, clock.clone()).unwrap();

    let seen = Rc::new(RefCell::new(Vec::<String>::new()));
    let seen_clone = seen.clone();
    handle.on_render(move |snapshot| {
        let mut seen = seen_clone.borrow_mut();
        if seen.last() != Some(&snapshot.text) {
            seen.push(snapshot.text.clone());
        }
    });

    clock.advance_to(190);
    assert_eq!(*seen.borrow(), vec!["", "a", "ab", "a", "", "c"]);

    let state = handle.typewriter().snapshot();
    assert_eq!(state.phrase_index, 1);
    assert_eq!(state.phase, TypewriterPhase::PausedFull);
    assert_eq!(clock.pending_count(), 1);

    // Second phrase deleted, back to the first.
    clock.advance_to(355);
    let snapshot = handle.frame();
    assert_eq!(snapshot.text, "a");
    assert_eq!(snapshot.phrase_index, 0);
}

#[test]
fn test_scrolling_through_the_page() {
    let (clock, layout, config) = setup();
    let handle = mount(&config, layout, clock.clone()).unwrap();

    let top = handle.frame();
    assert!(!top.scrolled);
    assert_eq!(top.active, section("home"));
    // The top of "about" already peeks into a 1080px viewport.
    assert_eq!(top.revealed.len(), 1);
    assert!(top.revealed.contains(&SectionId::from("about")));

    // Several events inside one frame collapse into one evaluation.
    events::dispatch_scroll(30.0);
    events::dispatch_scroll(600.0);
    events::dispatch_scroll(900.0);
    assert!(handle.scroll_tracker().has_pending_frame());
    assert_eq!(handle.snapshot().active, section("home"));

    let middle = handle.frame();
    assert!(!handle.scroll_tracker().has_pending_frame());
    assert!(middle.scrolled);
    assert_eq!(middle.active, section("about"));
    assert!(middle.revealed.contains(&SectionId::from("about")));
    assert!(middle.revealed.contains(&SectionId::from("projects")));
    assert_eq!(middle.hero_opacity, 0.0);

    events::dispatch_scroll(2500.0);
    assert_eq!(handle.frame().active, section("contact"));

    // Past the end of the page nothing contains the anchor line.
    events::dispatch_scroll(5000.0);
    assert_eq!(handle.frame().active, section("contact"));

    // Back to the top: navbar clears, reveals stay latched.
    events::dispatch_scroll(0.0);
    let back = handle.frame();
    assert!(!back.scrolled);
    assert_eq!(back.active, section("home"));
    assert_eq!(back.revealed.len(), 3);
    assert_eq!(back.hero_offset, 0.0);
}

#[test]
fn test_pointer_parallax() {
    let (clock, layout, config) = setup();
    let handle = mount(&config, layout, clock.clone()).unwrap();

    assert_eq!(handle.frame().pointer, PointerOffset::ZERO);

    events::dispatch_pointer_move(960.0, 540.0);
    assert_eq!(handle.frame().pointer, PointerOffset::ZERO);

    events::dispatch_pointer_move(1010.0, 440.0);
    assert_eq!(handle.frame().pointer, PointerOffset::new(1.0, -2.0));
}

#[test]
fn test_unmount_leaves_host_clean() {
    let (clock, layout, config) = setup();
    let handle = mount(&config, layout, clock.clone()).unwrap();
    clock.advance(15);
    let before = handle.typewriter().snapshot();

    drop(handle);
    assert_eq!(clock.pending_count(), 0);
    assert_eq!(events::subscriber_counts(), (0, 0));
    assert!(events::attached_listeners().is_empty());

    // A fresh mount starts from the beginning.
    let (clock, layout, config) = setup();
    let handle = mount(&config, layout, clock.clone()).unwrap();
    assert_eq!(before.buffer, "a");
    assert_eq!(handle.frame().text, "");
}
