//! Slides and the validated, ordered slide sequence.

use std::collections::HashSet;

use crate::error::{EngineError, Result};

/// One full-viewport section of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub id: String,
    /// Document offset at which the slide begins.
    pub top_offset: f64,
}

impl Slide {
    pub fn new(id: impl Into<String>, top_offset: f64) -> Self {
        Self {
            id: id.into(),
            top_offset,
        }
    }
}

/// Non-empty slide sequence, sorted by `top_offset`, ids unique.
///
/// Indices are stable for the lifetime of the deck; there is no insertion or
/// removal after construction.
#[derive(Debug, Clone)]
pub struct SlideDeck {
    slides: Vec<Slide>,
}

impl SlideDeck {
    pub fn new(slides: Vec<Slide>) -> Result<Self> {
        if slides.is_empty() {
            return Err(EngineError::InvalidState("empty slide sequence".into()));
        }
        let mut seen = HashSet::new();
        for (i, slide) in slides.iter().enumerate() {
            if slide.id.is_empty() {
                return Err(EngineError::InvalidState(format!("slide {i} has an empty id")));
            }
            if !seen.insert(slide.id.as_str()) {
                return Err(EngineError::InvalidState(format!(
                    "duplicate slide id '{}'",
                    slide.id
                )));
            }
            if !slide.top_offset.is_finite() {
                return Err(EngineError::InvalidState(format!(
                    "slide '{}' has a non-finite offset",
                    slide.id
                )));
            }
            if i > 0 && slide.top_offset < slides[i - 1].top_offset {
                return Err(EngineError::InvalidState(format!(
                    "slide '{}' at {} precedes slide '{}' at {}",
                    slide.id,
                    slide.top_offset,
                    slides[i - 1].id,
                    slides[i - 1].top_offset
                )));
            }
        }
        Ok(Self { slides })
    }

    /// Build a deck of equally tall slides starting at offset 0.
    pub fn uniform<S: Into<String>>(ids: impl IntoIterator<Item = S>, height: f64) -> Result<Self> {
        let slides = ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| Slide::new(id, i as f64 * height))
            .collect();
        Self::new(slides)
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Always false: construction rejects empty decks.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.slides.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.slides.iter().position(|s| s.id == id)
    }

    /// Clamp a possibly out-of-range index into `[0, len-1]`.
    pub fn clamp_index(&self, index: i64) -> usize {
        index.clamp(0, self.last_index() as i64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_deck_is_invalid() {
        let err = SlideDeck::new(Vec::new()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
    }

    #[test]
    fn unsorted_deck_is_invalid() {
        let slides = vec![Slide::new("a", 800.0), Slide::new("b", 0.0)];
        assert!(SlideDeck::new(slides).is_err());
    }

    #[test]
    fn duplicate_ids_are_invalid() {
        let slides = vec![Slide::new("a", 0.0), Slide::new("a", 800.0)];
        let err = SlideDeck::new(slides).unwrap_err();
        assert_eq!(err.to_string(), "invalid state: duplicate slide id 'a'");
    }

    #[test]
    fn equal_offsets_are_allowed() {
        let slides = vec![Slide::new("a", 0.0), Slide::new("b", 0.0)];
        assert!(SlideDeck::new(slides).is_ok());
    }

    #[test]
    fn uniform_offsets() {
        let deck = SlideDeck::uniform(["s1", "s2", "s3"], 800.0).unwrap();
        assert_eq!(deck.len(), 3);
        assert_eq!(deck.slides()[2].top_offset, 1600.0);
        assert_eq!(deck.index_of("s2"), Some(1));
        assert_eq!(deck.index_of("nope"), None);
    }

    #[test]
    fn clamp_index_bounds() {
        let deck = SlideDeck::uniform(["a", "b", "c"], 100.0).unwrap();
        assert_eq!(deck.clamp_index(-5), 0);
        assert_eq!(deck.clamp_index(1), 1);
        assert_eq!(deck.clamp_index(99), 2);
    }
}
