//! Engine error taxonomy.
//!
//! Only construction can fail. A missing sink is reported, never returned from
//! an update path: the dependent feature becomes a no-op and the rest of the
//! engine keeps running.

use std::fmt;

/// Which UI sink a `MissingSink` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Progress,
    Counter,
    PrevNext,
    BackToTop,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SinkKind::Progress => "progress",
            SinkKind::Counter => "counter",
            SinkKind::PrevNext => "prev/next",
            SinkKind::BackToTop => "back-to-top",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Degenerate slide input (empty, unsorted, duplicate ids).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A UI sink is absent; its feature is disabled.
    #[error("{0} sink missing, feature disabled")]
    MissingSink(SinkKind),
}

pub type Result<T> = std::result::Result<T, EngineError>;
