use std::cell::Cell;
use std::rc::Rc;

use slidesync::bus::{FrameScheduler, ScrollSignalBus};
use slidesync::chrome::{ChromeHandle, SinkSelect};
use slidesync::deck::parse_deck;
use slidesync::intersect::RootMargin;
use slidesync::nav::{NavCommand, NavOptions, ScrollBehavior};
use slidesync::page::PageLayout;
use slidesync::session::{Session, SessionOptions};
use slidesync::trace::{parse_script, run_trace};

const IDS: [&str; 5] = ["s1", "s2", "s3", "s4", "s5"];

fn options(behavior: ScrollBehavior) -> SessionOptions {
    SessionOptions {
        nav: NavOptions {
            behavior,
            ..NavOptions::default()
        },
        threshold: 0.6,
        margin: RootMargin::default(),
        smooth_speed: 0.35,
    }
}

/// Five 800-unit slides in an 800-unit viewport, every sink wired.
fn five_slides(behavior: ScrollBehavior) -> (Session, ChromeHandle) {
    let page = PageLayout::uniform(IDS, 800.0, 800.0).unwrap();
    let chrome = ChromeHandle::new();
    let links = chrome.links(IDS);
    let session = Session::new(&page, chrome.sinks(&[]), links, options(behavior));
    (session, chrome)
}

fn trace(script: &str, disabled: &[SinkSelect]) -> String {
    let page = PageLayout::uniform(IDS, 800.0, 800.0).unwrap();
    let chrome = ChromeHandle::new();
    let links = chrome.links(IDS);
    let mut session = Session::new(&page, chrome.sinks(disabled), links, options(ScrollBehavior::Instant));
    let steps = parse_script(script).unwrap();
    let mut out = Vec::new();
    run_trace(&mut session, &chrome, &steps, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_mid_page_scroll_resolves_third_slide() {
    let (mut s, chrome) = five_slides(ScrollBehavior::Instant);
    s.scroll_to(1250.0);
    let state = s.tick().nav.expect("scroll should deliver a frame");

    assert_eq!(state.index, 2);
    assert_eq!(state.counter_label, "3 / 5");
    assert!((state.progress_fraction - 1250.0 / 3200.0).abs() < 1e-9);
    assert!(state.prev_enabled);
    assert!(state.next_enabled);
    assert!(!state.at_top);

    let c = chrome.snapshot();
    assert_eq!(c.counter, "3 / 5");
    assert!(c.back_to_top_visible);
}

#[test]
fn test_top_of_page() {
    let (mut s, chrome) = five_slides(ScrollBehavior::Instant);
    s.scroll_to(900.0);
    s.tick();
    s.scroll_to(3.0);
    let state = s.tick().nav.unwrap();

    assert_eq!(state.index, 0);
    assert!(state.at_top, "within the at-top tolerance");
    assert!(!state.prev_enabled);
    assert!(state.next_enabled);
    assert!(!chrome.snapshot().back_to_top_visible);
}

#[test]
fn test_goto_clamps_out_of_range() {
    let (mut s, chrome) = five_slides(ScrollBehavior::Instant);
    assert_eq!(s.command(NavCommand::GoTo(99)), 4);
    s.tick();
    assert_eq!(s.scroll_top(), 3200.0);
    assert_eq!(chrome.snapshot().counter, "5 / 5");

    assert_eq!(s.command(NavCommand::GoTo(-3)), 0);
    s.tick();
    assert_eq!(s.scroll_top(), 0.0);
    assert_eq!(chrome.snapshot().counter, "1 / 5");
}

#[test]
fn test_advance_at_last_slide_stays() {
    let (mut s, chrome) = five_slides(ScrollBehavior::Instant);
    s.command(NavCommand::Last);
    s.tick();
    let writes = chrome.snapshot().writes;

    assert_eq!(s.command(NavCommand::Advance), 4);
    assert!(s.tick().nav.is_none());
    assert_eq!(chrome.snapshot().writes, writes);
    assert!(!chrome.snapshot().next_enabled);
}

#[test]
fn test_bus_coalesces_burst_into_one_notification() {
    struct Counting(Rc<Cell<u32>>);
    impl FrameScheduler for Counting {
        fn request_frame(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    let requests = Rc::new(Cell::new(0));
    let calls = Rc::new(Cell::new(0));
    let mut bus = ScrollSignalBus::new(Counting(Rc::clone(&requests)));
    {
        let calls = Rc::clone(&calls);
        bus.subscribe(move || calls.set(calls.get() + 1));
    }

    for _ in 0..25 {
        bus.notify_scroll_occurred();
    }
    assert_eq!(requests.get(), 1);
    bus.on_animation_frame();
    assert_eq!(calls.get(), 1);

    // A stray frame with nothing pending does nothing.
    bus.on_animation_frame();
    assert_eq!(calls.get(), 1);

    bus.notify_scroll_occurred();
    assert_eq!(requests.get(), 2);
}

#[test]
fn test_single_active_link_after_scroll() {
    let (mut s, chrome) = five_slides(ScrollBehavior::Instant);
    assert_eq!(chrome.snapshot().active_links(), vec!["s1"]);

    s.scroll_to(1600.0);
    s.tick();
    assert_eq!(chrome.snapshot().active_links(), vec!["s3"]);
    assert_eq!(s.tracker().active_link_target(), Some("s3"));
    assert!(s.tracker().has_been_shown(2));
    assert!(!s.tracker().has_been_shown(1), "s2 never passed the threshold");
}

#[test]
fn test_row_steps_through_exact_threshold_activate_next_slide() {
    // 20-row slides scrolled 3 rows at a time: at scroll_top=12 slide b is
    // exactly 60% visible, then 75% one step later.
    let page = PageLayout::uniform(["a", "b", "c"], 20.0, 20.0).unwrap();
    let chrome = ChromeHandle::new();
    let links = chrome.links(["a", "b", "c"]);
    let mut s = Session::new(&page, chrome.sinks(&[]), links, options(ScrollBehavior::Instant));

    for _ in 0..4 {
        s.scroll_by(3.0);
        s.tick();
    }
    assert_eq!(s.scroll_top(), 12.0);
    assert_eq!(chrome.snapshot().active_links(), vec!["a"]);

    s.scroll_by(3.0);
    s.tick();
    assert_eq!(chrome.snapshot().active_links(), vec!["b"]);
    assert_eq!(s.tracker().active_index(), Some(1));

    s.scroll_by(3.0);
    s.tick();
    assert_eq!(chrome.snapshot().active_links(), vec!["b"]);
}

#[test]
fn test_smooth_next_link_lands_on_next_slide() {
    let (mut s, chrome) = five_slides(ScrollBehavior::Smooth);
    assert_eq!(s.activate_next_link(), 1);
    let mut frames = 0;
    while s.needs_frame() {
        s.tick();
        frames += 1;
        assert!(frames < 100, "smooth scroll never settled");
    }
    assert_eq!(s.scroll_top(), 800.0);
    assert_eq!(chrome.snapshot().counter, "2 / 5");
    assert_eq!(chrome.snapshot().active_links(), vec!["s2"]);
}

#[test]
fn test_deck_to_session() {
    let md = "# Intro\n\nHello\n\n---\n\n# Details\n\n- a\n- b\n\n---\n\n# Intro\n\nAgain\n";
    let slides = parse_deck(md).unwrap();
    let ids: Vec<&str> = slides.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["intro", "details", "intro-2"]);

    let page = PageLayout::from_deck(&slides, 40, 10).unwrap();
    let chrome = ChromeHandle::new();
    let links = chrome.links(ids.iter().copied());
    let mut s = Session::new(&page, chrome.sinks(&[]), links, options(ScrollBehavior::Instant));

    assert_eq!(s.slide_count(), 3);
    s.command(NavCommand::Last);
    s.tick();
    assert_eq!(s.current_index(), 2);
    assert_eq!(chrome.snapshot().counter, "3 / 3");
    assert_eq!(chrome.snapshot().active_links(), vec!["intro-2"]);
}

#[test]
fn test_trace_prints_one_line_per_delivered_frame() {
    let out = trace("scroll 100\nscroll 700\nscroll 1250\nframe\nframe\n", &[]);
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len(), 2, "output:\n{out}");
    assert!(lines[0].starts_with("init: scroll_top=0 slide 1 / 5"));
    assert!(lines[1].starts_with("frame 1: scroll_top=1250 slide 3 / 5"));
    assert!(lines[1].contains("prev=on next=on top=false"));
}

#[test]
fn test_trace_keys_and_controls() {
    let out = trace("key pagedown\nframe\nkey j\ntop\nframe\n", &[]);

    assert!(out.contains("frame 1: scroll_top=800 slide 2 / 5"), "output:\n{out}");
    assert!(out.contains("key j: passed through"));
    assert!(out.contains("frame 2: scroll_top=0 slide 1 / 5"));
}

#[test]
fn test_trace_with_missing_sinks_still_navigates() {
    let out = trace("goto 4\nframe\n", &[SinkSelect::Progress, SinkSelect::Counter]);
    assert!(out.contains("frame 1: scroll_top=2400 slide 4 / 5"), "output:\n{out}");
    assert!(out.contains("active=s4"));
}
