#![no_main]

use libfuzzer_sys::fuzz_target;
use slidesync::chrome::ChromeHandle;
use slidesync::nav::NavOptions;
use slidesync::page::PageLayout;
use slidesync::session::{Session, SessionOptions};
use slidesync::trace::{parse_script, run_trace};

const IDS: [&str; 5] = ["s1", "s2", "s3", "s4", "s5"];

fuzz_target!(|data: &[u8]| {
    let Ok(script) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(steps) = parse_script(script) else {
        return;
    };

    let Ok(page) = PageLayout::uniform(IDS, 800.0, 600.0) else {
        return;
    };
    let chrome = ChromeHandle::new();
    let links = chrome.links(IDS);
    let options = SessionOptions {
        nav: NavOptions::default(),
        threshold: 0.6,
        margin: Default::default(),
        smooth_speed: 0.35,
    };
    let mut session = Session::new(&page, chrome.sinks(&[]), links, options);

    let mut out = Vec::new();
    if let Err(e) = run_trace(&mut session, &chrome, &steps, &mut out) {
        panic!("trace failed: {e:#}");
    }

    // Whatever the script did, the page stays in range and at most one
    // navigation link is active.
    let top = session.scroll_top();
    assert!(top.is_finite() && (0.0..=page.max_scroll()).contains(&top));
    assert!(chrome.snapshot().active_links().len() <= 1);
    if let Some(state) = session.nav_state() {
        assert!((0.0..=1.0).contains(&state.progress_fraction));
        assert!(state.index < IDS.len());
    }
});
