//! Error taxonomy shared by every stage.
//!
//! Only failures that stop a call are errors. A search that runs out of open
//! nodes is a normal outcome and is reported through
//! [`crate::astar::SearchStatus`] instead.
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum TrackerError {
    /// Missing or inconsistent options. Aborts the run.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A point failed to resolve to a valid multi-plane wire intersection.
    #[error("geometry error: {0}")]
    Geometry(String),
    /// Image collections whose sizes or shapes disagree.
    #[error("bad input shape for {what}: expected {expected}, found {found}")]
    BadInputShape {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

impl TrackerError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// True for failures the orchestrator may swallow per pair.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Geometry(_))
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
