#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod highscore;
pub mod render;
pub mod session;

pub use quiz_core::time::Clock;

pub use engine::{ADVANCE_DELAY_MS, QuizEngine, QuizEvent};
pub use error::{EngineError, HighScoreError, SessionError};
pub use highscore::{HighScoreStore, InMemoryHighScore, JsonFileHighScore};
pub use render::{NullRenderer, ShapeRenderer};
pub use session::{
    AnswerOutcome, QuizSession, SESSION_SECONDS, SessionPhase, SessionSnapshot, TickOutcome,
};
