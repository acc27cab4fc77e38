//! Fixture engine error types.

use thiserror::Error;

/// Errors that can occur during group allocation or fixture generation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("competition not found: {0}")]
    CompetitionNotFound(String),

    #[error("competition has no registered teams")]
    NoParticipants,

    #[error("invalid group count: {0} (supported range is 1-8)")]
    InvalidGroupCount(u32),

    #[error("unknown competition format: {0}")]
    UnknownFormat(String),

    #[error("fixtures already generated for competition: {0}")]
    FixturesAlreadyScheduled(String),

    #[error("state store error: {0}")]
    State(#[from] matchday_state::StateError),
}

pub type EngineResult<T> = Result<T, EngineError>;
