//! Page layout: deck slides stacked as full-viewport sections.

use log::debug;

use crate::deck::{DeckSlide, Row};
use crate::error::Result;
use crate::intersect::SlideExtent;
use crate::slide::{Slide, SlideDeck};

pub struct PageLayout {
    pub deck: SlideDeck,
    /// Laid-out rows per slide (empty for geometry-only pages).
    pub rows: Vec<Vec<Row>>,
    /// Sidebar label per slide.
    pub labels: Vec<String>,
    /// Height of each slide in document units.
    pub heights: Vec<f64>,
    pub scroll_height: f64,
    pub viewport_height: f64,
}

impl PageLayout {
    /// Lay out deck slides `width` columns wide; every slide is at least one
    /// viewport tall.
    pub fn from_deck(slides: &[DeckSlide], width: usize, viewport_rows: usize) -> Result<Self> {
        let rows: Vec<Vec<Row>> = slides.iter().map(|s| s.layout(width)).collect();
        let heights: Vec<f64> = rows
            .iter()
            .map(|r| r.len().max(viewport_rows).max(1) as f64)
            .collect();
        let ids = slides.iter().map(|s| s.id.clone());
        let mut page = Self::stack(ids, rows, heights, viewport_rows as f64)?;
        page.labels = slides.iter().map(|s| s.label().to_string()).collect();
        debug!(
            "page: {} slide(s), {} rows tall, viewport {} rows, width {}",
            page.deck.len(),
            page.scroll_height,
            viewport_rows,
            width
        );
        Ok(page)
    }

    /// Geometry-only page of equally tall slides.
    pub fn uniform<S: Into<String>>(
        ids: impl IntoIterator<Item = S>,
        slide_height: f64,
        viewport_height: f64,
    ) -> Result<Self> {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let heights = vec![slide_height; ids.len()];
        let rows = vec![Vec::new(); ids.len()];
        Self::stack(ids, rows, heights, viewport_height)
    }

    fn stack(
        ids: impl IntoIterator<Item = String>,
        rows: Vec<Vec<Row>>,
        heights: Vec<f64>,
        viewport_height: f64,
    ) -> Result<Self> {
        let mut top = 0.0;
        let mut slides = Vec::with_capacity(heights.len());
        for (id, h) in ids.into_iter().zip(&heights) {
            slides.push(Slide::new(id, top));
            top += h;
        }
        Ok(Self {
            labels: slides.iter().map(|s| s.id.clone()).collect(),
            deck: SlideDeck::new(slides)?,
            rows,
            heights,
            scroll_height: top,
            viewport_height,
        })
    }

    pub fn max_scroll(&self) -> f64 {
        (self.scroll_height - self.viewport_height).max(0.0)
    }

    /// Vertical extent of every slide, for intersection observation.
    pub fn extents(&self) -> Vec<SlideExtent> {
        self.deck
            .slides()
            .iter()
            .zip(&self.heights)
            .map(|(s, h)| SlideExtent {
                top: s.top_offset,
                height: *h,
            })
            .collect()
    }

    /// Row at a document line, as (slide index, row within slide).
    pub fn locate(&self, y: usize) -> Option<(usize, usize)> {
        let y = y as f64;
        let idx = self
            .deck
            .slides()
            .partition_point(|s| s.top_offset <= y)
            .checked_sub(1)?;
        let within = y - self.deck.slides()[idx].top_offset;
        if within >= self.heights[idx] {
            return None;
        }
        Some((idx, within as usize))
    }
}
