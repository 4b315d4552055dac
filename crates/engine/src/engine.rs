use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use quiz_core::catalog;
use quiz_core::model::{Difficulty, Question};
use quiz_core::time::Clock;

use crate::error::EngineError;
use crate::highscore::HighScoreStore;
use crate::render::ShapeRenderer;
use crate::session::QuizSession;

/// Pause between resolving an answer and advancing to the next question.
///
/// The engine schedules the advance but does not own the timer; the
/// clock/scheduler collaborator calls back via
/// [`QuizEngine::on_advance_timeout`] after this delay.
pub const ADVANCE_DELAY_MS: u64 = 1400;

/// Events emitted to collaborators by the engine's entry points.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizEvent {
    /// A new question is installed and its shape has been drawn.
    QuestionReady(Question),
    /// The in-flight question was resolved; the next one arrives after the
    /// advance delay.
    AnswerResolved { correct: bool, question: Question },
    /// Time ran out; the session is idle again.
    SessionEnded { final_score: u32 },
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Composition root driving round progression.
///
/// Owns the session state machine, the question source and the pending
/// deferred advance. Entry points are serialized through `&mut self`; each
/// is one atomic transition.
pub struct QuizEngine<R: Rng = StdRng> {
    session: QuizSession,
    rng: R,
    clock: Clock,
    store: Arc<dyn HighScoreStore + Send + Sync>,
    renderer: Arc<dyn ShapeRenderer + Send + Sync>,
    high_score: u32,
    advance_epoch: u64,
    pending_advance: Option<u64>,
}

impl QuizEngine<StdRng> {
    /// Build an engine with an OS-seeded generator.
    #[must_use]
    pub fn new(
        clock: Clock,
        store: Arc<dyn HighScoreStore + Send + Sync>,
        renderer: Arc<dyn ShapeRenderer + Send + Sync>,
    ) -> Self {
        Self::with_rng(clock, store, renderer, StdRng::from_os_rng())
    }
}

impl<R: Rng> QuizEngine<R> {
    /// Build an engine with an explicit generator, keeping question
    /// generation deterministic under a seeded source.
    ///
    /// The stored high score is loaded once here; a load failure is logged
    /// and read as zero.
    #[must_use]
    pub fn with_rng(
        clock: Clock,
        store: Arc<dyn HighScoreStore + Send + Sync>,
        renderer: Arc<dyn ShapeRenderer + Send + Sync>,
        rng: R,
    ) -> Self {
        let high_score = match store.load() {
            Ok(best) => best,
            Err(err) => {
                log::warn!("failed to load high score: {err}");
                0
            }
        };
        Self {
            session: QuizSession::new(),
            rng,
            clock,
            store,
            renderer,
            high_score,
            advance_epoch: 0,
            pending_advance: None,
        }
    }

    /// Start (or restart) a session and deal the first question.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Generation` when question generation fails,
    /// which indicates a template bug rather than a recoverable condition.
    pub fn start(&mut self, difficulty: Difficulty) -> Result<Vec<QuizEvent>, EngineError> {
        self.cancel_pending_advance();
        self.session.start(difficulty, self.clock.now());
        let question = self.next_question()?;
        Ok(vec![QuizEvent::QuestionReady(question)])
    }

    /// Resolve an answer selection against the in-flight question.
    ///
    /// Schedules the deferred advance on success (replacing any previous
    /// pending one). Submitting while idle or without a question is a
    /// no-op.
    pub fn submit_answer(&mut self, selected: &str) -> Vec<QuizEvent> {
        match self.session.submit_answer(selected) {
            Ok(outcome) => {
                self.pending_advance = Some(self.advance_epoch);
                vec![QuizEvent::AnswerResolved {
                    correct: outcome.correct,
                    question: outcome.question,
                }]
            }
            Err(err) => {
                log::debug!("ignoring answer submission: {err}");
                Vec::new()
            }
        }
    }

    /// Entry point for the collaborator-driven 1-second tick.
    ///
    /// Ticks while idle are no-ops. On expiry the pending advance is
    /// cancelled, the high score persisted, and `SessionEnded` emitted.
    pub fn on_tick(&mut self) -> Vec<QuizEvent> {
        match self.session.tick() {
            Ok(outcome) if outcome.ended => {
                self.cancel_pending_advance();
                let final_score = self.session.score();
                self.persist_high_score(final_score);
                vec![QuizEvent::SessionEnded { final_score }]
            }
            Ok(_) => Vec::new(),
            Err(err) => {
                log::debug!("ignoring tick: {err}");
                Vec::new()
            }
        }
    }

    /// Entry point for the deferred-advance callback.
    ///
    /// Only a callback matching the current epoch advances the round; a
    /// reset or session end in the meantime leaves this a no-op, so a stale
    /// question can never overwrite a fresh idle state.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Generation` when question generation fails.
    pub fn on_advance_timeout(&mut self) -> Result<Vec<QuizEvent>, EngineError> {
        if self.pending_advance.take() != Some(self.advance_epoch) {
            return Ok(Vec::new());
        }
        if !self.session.is_active() {
            return Ok(Vec::new());
        }
        let question = self.next_question()?;
        Ok(vec![QuizEvent::QuestionReady(question)])
    }

    /// Return to idle, discarding any pending advance.
    pub fn reset(&mut self) {
        self.cancel_pending_advance();
        self.session.reset();
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// Best score seen so far, including the stored one loaded at startup.
    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Whether an advance callback is expected.
    #[must_use]
    pub fn has_pending_advance(&self) -> bool {
        self.pending_advance.is_some()
    }

    fn next_question(&mut self) -> Result<Question, EngineError> {
        let question = catalog::generate_question(&mut self.rng, self.session.difficulty())?;
        self.session.set_question(question.clone())?;
        self.renderer.draw(question.shape());
        Ok(question)
    }

    fn cancel_pending_advance(&mut self) {
        self.advance_epoch += 1;
        self.pending_advance = None;
    }

    fn persist_high_score(&mut self, final_score: u32) {
        if final_score <= self.high_score {
            return;
        }
        self.high_score = final_score;
        if let Err(err) = self.store.save(final_score) {
            log::warn!("failed to persist high score: {err}");
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
