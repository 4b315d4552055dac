//! Shared error types for the engine crate.

use thiserror::Error;

use quiz_core::catalog::CatalogError;

/// Invalid transitions on `QuizSession`.
///
/// These are recoverable: the engine treats them as no-ops rather than
/// surfacing them to collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session is not running")]
    NotRunning,
    #[error("no question is awaiting an answer")]
    NoActiveQuestion,
}

/// Errors emitted by high-score adapters.
///
/// Non-fatal to the quiz lifecycle; the engine logs a warning and the
/// session continues.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HighScoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Format(#[from] serde_json::Error),
}

/// Errors emitted by `QuizEngine`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Generation(#[from] CatalogError),
}
