use chrono::{DateTime, Utc};

use quiz_core::model::{Difficulty, Question};

use crate::error::SessionError;

/// Length of one timed session.
pub const SESSION_SECONDS: u32 = 120;

/// Streak bonus: +5 points per consecutive correct answer, capped at 5.
const STREAK_BONUS_STEP: u32 = 5;
const STREAK_BONUS_CAP: u32 = 5;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Running,
}

/// Outcome of a single timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub time_remaining: u32,
    /// True exactly once, on the tick that exhausts the time budget.
    pub ended: bool,
}

/// Outcome of resolving a submitted answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    /// Base points plus streak bonus; zero on a wrong answer.
    pub points_awarded: u32,
    /// The success or error feedback text of the resolved question.
    pub feedback: String,
    /// The resolved question, removed from the session.
    pub question: Question,
}

/// Read-only scoreboard view for display layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub active: bool,
    pub difficulty: Difficulty,
    pub score: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub time_remaining: u32,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// State machine for one timed play-through.
///
/// Owns score, streak, best streak, the countdown and the in-flight
/// question; all mutation goes through the transition methods below.
#[derive(Debug, Clone)]
pub struct QuizSession {
    phase: SessionPhase,
    difficulty: Difficulty,
    score: u32,
    streak: u32,
    best_streak: u32,
    time_remaining: u32,
    current_question: Option<Question>,
    started_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            difficulty: Difficulty::default(),
            score: 0,
            streak: 0,
            best_streak: 0,
            time_remaining: SESSION_SECONDS,
            current_question: None,
            started_at: None,
        }
    }

    /// Begin a fresh session at the given difficulty.
    ///
    /// Valid from any state: starting while running restarts. Counters are
    /// zeroed and the full time budget restored; the first question is
    /// installed separately via [`QuizSession::set_question`].
    pub fn start(&mut self, difficulty: Difficulty, started_at: DateTime<Utc>) {
        self.phase = SessionPhase::Running;
        self.difficulty = difficulty;
        self.score = 0;
        self.streak = 0;
        self.best_streak = 0;
        self.time_remaining = SESSION_SECONDS;
        self.current_question = None;
        self.started_at = Some(started_at);
    }

    /// Install the next question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` outside a running session.
    pub fn set_question(&mut self, question: Question) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Running {
            return Err(SessionError::NotRunning);
        }
        self.current_question = Some(question);
        Ok(())
    }

    /// Advance the countdown by one second.
    ///
    /// On reaching zero the session clamps, clears the question and
    /// transitions to `Idle`; the outcome reports `ended` exactly once.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` outside a running session.
    pub fn tick(&mut self) -> Result<TickOutcome, SessionError> {
        if self.phase != SessionPhase::Running {
            return Err(SessionError::NotRunning);
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.phase = SessionPhase::Idle;
            self.current_question = None;
            return Ok(TickOutcome {
                time_remaining: 0,
                ended: true,
            });
        }
        Ok(TickOutcome {
            time_remaining: self.time_remaining,
            ended: false,
        })
    }

    /// Resolve the in-flight question against a selected option value.
    ///
    /// The question is always cleared, pending the next one. A correct
    /// answer scores `base_points(difficulty) + min(streak, 5) × 5` and
    /// extends the streak; a wrong answer resets the streak and leaves the
    /// score untouched.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` outside a running session and
    /// `SessionError::NoActiveQuestion` when no question is in flight.
    pub fn submit_answer(&mut self, selected: &str) -> Result<AnswerOutcome, SessionError> {
        if self.phase != SessionPhase::Running {
            return Err(SessionError::NotRunning);
        }
        let Some(question) = self.current_question.take() else {
            return Err(SessionError::NoActiveQuestion);
        };

        let correct = question.is_correct(selected);
        let mut points_awarded = 0;
        if correct {
            points_awarded = self.difficulty.base_points()
                + self.streak.min(STREAK_BONUS_CAP) * STREAK_BONUS_STEP;
            self.score += points_awarded;
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = 0;
        }

        let feedback = if correct {
            question.feedback_success().to_string()
        } else {
            question.feedback_error().to_string()
        };

        Ok(AnswerOutcome {
            correct,
            points_awarded,
            feedback,
            question,
        })
    }

    /// Return to `Idle`, zeroing all counters and restoring the full time
    /// budget.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns the scoreboard view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            active: self.is_active(),
            difficulty: self.difficulty,
            score: self.score,
            streak: self.streak,
            best_streak: self.best_streak,
            time_remaining: self.time_remaining,
        }
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
