#![no_main]

use std::collections::HashSet;

use libfuzzer_sys::fuzz_target;
use slidesync::deck::parse_deck;
use slidesync::page::PageLayout;

fuzz_target!(|data: &[u8]| {
    let Ok(markdown) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing must not panic; an empty deck is a plain error.
    let Ok(slides) = parse_deck(markdown) else {
        return;
    };
    assert!(!slides.is_empty());

    // Every parsed deck must lay out: unique non-empty ids, ascending offsets.
    let mut seen = HashSet::new();
    for slide in &slides {
        assert!(!slide.id.is_empty(), "empty slide id");
        assert!(seen.insert(slide.id.as_str()), "duplicate slide id {}", slide.id);
    }

    let page = match PageLayout::from_deck(&slides, 40, 12) {
        Ok(p) => p,
        Err(e) => panic!("layout failed: {e}"),
    };
    let mut prev = -1.0;
    for (slide, h) in page.deck.slides().iter().zip(&page.heights) {
        assert!(slide.top_offset > prev, "offsets not ascending");
        assert!(*h >= 12.0, "slide {} shorter than the viewport", slide.id);
        prev = slide.top_offset;
    }
});
