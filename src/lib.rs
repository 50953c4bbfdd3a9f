//! Scroll-synchronized slide navigation.
//!
//! The engine (`bus`, `resolve`, `nav`, `visibility`, `intersect`, `keys`)
//! decides which slide of a scrolling page is current and keeps navigation
//! UI consistent with it. It only talks to its host through traits, so the
//! same engine drives the terminal viewer and the headless trace runner.

pub mod bus;
pub mod chrome;
pub mod config;
pub mod deck;
pub mod error;
pub mod input;
pub mod intersect;
pub mod keys;
pub mod nav;
pub mod page;
pub mod resolve;
pub mod session;
pub mod slide;
pub mod smooth;
pub mod theme;
pub mod trace;
pub mod viewer;
pub mod visibility;

pub use error::{EngineError, SinkKind};
pub use nav::{NavCommand, NavState, NavigationSync};
pub use slide::{Slide, SlideDeck};
