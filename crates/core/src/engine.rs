//! Quiz session engine: question generation, answer evaluation, scoring and
//! difficulty adaptation for one player.

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;

use crate::model::{Difficulty, DifficultyShift, Question, QuestionTicket};
use crate::scoring::{ScoreBreakdown, score_correct_answer};
use crate::time::{seconds_between, whole_seconds_between};

/// Questions in one game.
pub const QUESTIONS_PER_GAME: u32 = 10;

/// Consecutive correct answers that raise the difficulty.
pub const UPGRADE_STREAK: u32 = 5;

/// Consecutive wrong answers that lower the difficulty.
pub const DOWNGRADE_STREAK: u32 = 3;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Engine errors. None of them change session state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no game in progress")]
    NoActiveSession,

    #[error("no question is waiting for an answer")]
    NoActiveQuestion,

    #[error("answer must be a whole number, got {raw:?}")]
    InvalidAnswerInput { raw: String },

    #[error("answer for question {got} arrived after question {expected} was asked")]
    StaleQuestion {
        expected: QuestionTicket,
        got: QuestionTicket,
    },

    #[error("every question in this game has been answered")]
    GameOver,

    #[error("game has already ended")]
    SessionEnded,
}

//
// ─── ANSWERS ──────────────────────────────────────────────────────────────────
//

/// What the player did with the pending question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Value(i64),
    /// The timer ran out. Never equal to any expected answer.
    TimedOut,
}

impl Answer {
    #[must_use]
    pub fn is_correct_for(self, question: &Question) -> bool {
        match self {
            Answer::Value(v) => v == question.expected_answer(),
            Answer::TimedOut => false,
        }
    }
}

/// Parse raw player input into an answer value.
///
/// # Errors
///
/// Returns `QuizError::InvalidAnswerInput` unless the trimmed input is a
/// base-10 integer.
pub fn parse_answer(raw: &str) -> Result<i64, QuizError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| QuizError::InvalidAnswerInput {
            raw: raw.to_owned(),
        })
}

/// Outcome of one answered or timed-out question.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerResult {
    pub ticket: QuestionTicket,
    pub is_correct: bool,
    pub timed_out: bool,
    pub expected_answer: i64,
    pub points_awarded: u32,
    pub breakdown: Option<ScoreBreakdown>,
    pub new_score: u32,
    /// Set only when this answer moved the difficulty.
    pub new_difficulty: Option<Difficulty>,
    pub game_over: bool,
}

/// End-of-game projection of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub score: u32,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub highest_difficulty: Difficulty,
    pub elapsed_seconds: u64,
}

//
// ─── SESSION STATE ────────────────────────────────────────────────────────────
//

/// Mutable state of one game, owned by a single player context.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    difficulty: Difficulty,
    score: u32,
    correct_count: u32,
    wrong_count: u32,
    questions_asked: u32,
    questions_generated: u32,
    current_question: Option<Question>,
    consecutive_correct: u32,
    consecutive_wrong: u32,
    question_started_at: DateTime<Utc>,
    highest_difficulty: Difficulty,
    started_at: DateTime<Utc>,
    elapsed_at_end: Option<u64>,
}

impl QuizSession {
    #[must_use]
    pub fn start(difficulty: Difficulty, now: DateTime<Utc>) -> Self {
        Self {
            difficulty,
            score: 0,
            correct_count: 0,
            wrong_count: 0,
            questions_asked: 0,
            questions_generated: 0,
            current_question: None,
            consecutive_correct: 0,
            consecutive_wrong: 0,
            question_started_at: now,
            highest_difficulty: difficulty,
            started_at: now,
            elapsed_at_end: None,
        }
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
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    #[must_use]
    pub fn questions_asked(&self) -> u32 {
        self.questions_asked
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    #[must_use]
    pub fn consecutive_correct(&self) -> u32 {
        self.consecutive_correct
    }

    #[must_use]
    pub fn consecutive_wrong(&self) -> u32 {
        self.consecutive_wrong
    }

    #[must_use]
    pub fn question_started_at(&self) -> DateTime<Utc> {
        self.question_started_at
    }

    #[must_use]
    pub fn highest_difficulty(&self) -> Difficulty {
        self.highest_difficulty
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.questions_asked >= QUESTIONS_PER_GAME
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.elapsed_at_end.is_some()
    }

    /// Draw the next question and start its timer.
    ///
    /// A question still pending is replaced without being counted.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::SessionEnded` after `end`, and `QuizError::GameOver`
    /// once every question has been answered.
    pub fn generate_question<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Question, QuizError> {
        if self.is_ended() {
            return Err(QuizError::SessionEnded);
        }
        if self.is_game_over() {
            return Err(QuizError::GameOver);
        }

        self.questions_generated = self.questions_generated.saturating_add(1);
        let ticket = QuestionTicket::new(self.questions_generated);
        let question = Question::generate(self.difficulty, ticket, rng);
        self.question_started_at = now;
        self.current_question = Some(question.clone());
        Ok(question)
    }

    /// Evaluate an answer to the pending question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveQuestion` when nothing is pending and
    /// `QuizError::SessionEnded` after `end`.
    pub fn submit(&mut self, answer: Answer, now: DateTime<Utc>) -> Result<AnswerResult, QuizError> {
        if self.is_ended() {
            return Err(QuizError::SessionEnded);
        }
        let question = self
            .current_question
            .take()
            .ok_or(QuizError::NoActiveQuestion)?;
        Ok(self.evaluate(&question, answer, now))
    }

    /// Like `submit`, but only if `ticket` names the pending question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::StaleQuestion` when another question is pending,
    /// plus the errors of `submit`.
    pub fn submit_for(
        &mut self,
        ticket: QuestionTicket,
        answer: Answer,
        now: DateTime<Utc>,
    ) -> Result<AnswerResult, QuizError> {
        if self.is_ended() {
            return Err(QuizError::SessionEnded);
        }
        let pending = self
            .current_question
            .as_ref()
            .map(Question::ticket)
            .ok_or(QuizError::NoActiveQuestion)?;
        if pending != ticket {
            return Err(QuizError::StaleQuestion {
                expected: pending,
                got: ticket,
            });
        }
        self.submit(answer, now)
    }

    fn evaluate(&mut self, question: &Question, answer: Answer, now: DateTime<Utc>) -> AnswerResult {
        self.questions_asked = self.questions_asked.saturating_add(1);
        let is_correct = answer.is_correct_for(question);

        let breakdown = if is_correct {
            self.correct_count = self.correct_count.saturating_add(1);
            self.consecutive_correct = self.consecutive_correct.saturating_add(1);
            self.consecutive_wrong = 0;

            let elapsed = seconds_between(self.question_started_at, now);
            let breakdown = score_correct_answer(
                self.difficulty,
                question.operation(),
                elapsed,
                self.consecutive_correct,
            );
            self.score = self.score.saturating_add(breakdown.total);
            Some(breakdown)
        } else {
            self.wrong_count = self.wrong_count.saturating_add(1);
            self.consecutive_wrong = self.consecutive_wrong.saturating_add(1);
            self.consecutive_correct = 0;
            None
        };

        let new_difficulty = self.adapt_difficulty();

        AnswerResult {
            ticket: question.ticket(),
            is_correct,
            timed_out: matches!(answer, Answer::TimedOut),
            expected_answer: question.expected_answer(),
            points_awarded: breakdown.map_or(0, |b| b.total),
            breakdown,
            new_score: self.score,
            new_difficulty,
            game_over: self.is_game_over(),
        }
    }

    /// Apply the streak rules; the upgrade check wins over the downgrade check.
    fn adapt_difficulty(&mut self) -> Option<Difficulty> {
        let shift = if self.consecutive_correct >= UPGRADE_STREAK {
            self.consecutive_correct = 0;
            DifficultyShift::Upgrade
        } else if self.consecutive_wrong >= DOWNGRADE_STREAK {
            self.consecutive_wrong = 0;
            DifficultyShift::Downgrade
        } else {
            return None;
        };

        let next = self.difficulty.transition(shift);
        self.highest_difficulty = self.highest_difficulty.max(next);
        if next == self.difficulty {
            return None;
        }
        self.difficulty = next;
        Some(next)
    }

    /// Freeze the elapsed time. Later calls keep the first value.
    pub fn end(&mut self, now: DateTime<Utc>) {
        if self.elapsed_at_end.is_none() {
            self.elapsed_at_end = Some(whole_seconds_between(self.started_at, now));
            self.current_question = None;
        }
    }

    #[must_use]
    pub fn summary(&self, now: DateTime<Utc>) -> GameSummary {
        GameSummary {
            score: self.score,
            correct_count: self.correct_count,
            wrong_count: self.wrong_count,
            highest_difficulty: self.highest_difficulty,
            elapsed_seconds: self
                .elapsed_at_end
                .unwrap_or_else(|| whole_seconds_between(self.started_at, now)),
        }
    }
}

//
// ─── PLAYER CONTEXT ───────────────────────────────────────────────────────────
//

/// Per-player handle holding at most one live session.
///
/// Create one per player; nothing is shared between handles.
#[derive(Debug, Clone, Default)]
pub struct QuizEngine {
    session: Option<QuizSession>,
}

impl QuizEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session, discarding any previous one.
    pub fn start_session(&mut self, difficulty: Difficulty, now: DateTime<Utc>) -> &QuizSession {
        self.session.insert(QuizSession::start(difficulty, now))
    }

    /// # Errors
    ///
    /// Returns `QuizError::NoActiveSession` if no session was started.
    pub fn session(&self) -> Result<&QuizSession, QuizError> {
        self.session.as_ref().ok_or(QuizError::NoActiveSession)
    }

    fn session_mut(&mut self) -> Result<&mut QuizSession, QuizError> {
        self.session.as_mut().ok_or(QuizError::NoActiveSession)
    }

    #[must_use]
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// # Errors
    ///
    /// Returns `QuizError::NoActiveSession`, or any error of
    /// `QuizSession::generate_question`.
    pub fn generate_question<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Question, QuizError> {
        self.session_mut()?.generate_question(rng, now)
    }

    /// # Errors
    ///
    /// Returns `QuizError::NoActiveSession` or `QuizError::NoActiveQuestion`.
    pub fn submit_answer(&mut self, value: i64, now: DateTime<Utc>) -> Result<AnswerResult, QuizError> {
        self.session_mut()?.submit(Answer::Value(value), now)
    }

    /// Parse and submit raw input. Invalid input leaves the session untouched.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::SessionEnded` after `end` whatever the input, then
    /// `QuizError::InvalidAnswerInput` for non-integer input, plus the errors
    /// of `submit_answer`.
    pub fn submit_raw(&mut self, raw: &str, now: DateTime<Utc>) -> Result<AnswerResult, QuizError> {
        let value = self.parse_live(raw)?;
        self.submit_answer(value, now)
    }

    /// Ticketed form of `submit_raw`.
    ///
    /// # Errors
    ///
    /// As `submit_raw`, plus `QuizError::StaleQuestion` for another ticket.
    pub fn submit_raw_for(
        &mut self,
        ticket: QuestionTicket,
        raw: &str,
        now: DateTime<Utc>,
    ) -> Result<AnswerResult, QuizError> {
        let value = self.parse_live(raw)?;
        self.submit_answer_for(ticket, value, now)
    }

    fn parse_live(&self, raw: &str) -> Result<i64, QuizError> {
        if self.session()?.is_ended() {
            return Err(QuizError::SessionEnded);
        }
        parse_answer(raw)
    }

    /// # Errors
    ///
    /// See `QuizSession::submit_for`.
    pub fn submit_answer_for(
        &mut self,
        ticket: QuestionTicket,
        value: i64,
        now: DateTime<Utc>,
    ) -> Result<AnswerResult, QuizError> {
        self.session_mut()?.submit_for(ticket, Answer::Value(value), now)
    }

    /// Count the pending question as wrong.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveSession` or `QuizError::NoActiveQuestion`.
    pub fn handle_timeout(&mut self, now: DateTime<Utc>) -> Result<AnswerResult, QuizError> {
        self.session_mut()?.submit(Answer::TimedOut, now)
    }

    /// # Errors
    ///
    /// See `QuizSession::submit_for`.
    pub fn handle_timeout_for(
        &mut self,
        ticket: QuestionTicket,
        now: DateTime<Utc>,
    ) -> Result<AnswerResult, QuizError> {
        self.session_mut()?.submit_for(ticket, Answer::TimedOut, now)
    }

    /// # Errors
    ///
    /// Returns `QuizError::NoActiveSession` if no session was started.
    pub fn end_session(&mut self, now: DateTime<Utc>) -> Result<(), QuizError> {
        self.session_mut()?.end(now);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizError::NoActiveSession` if no session was started.
    pub fn summary(&self, now: DateTime<Utc>) -> Result<GameSummary, QuizError> {
        Ok(self.session()?.summary(now))
    }

    /// Remove the session from this handle, e.g. after its score is saved.
    pub fn take_session(&mut self) -> Option<QuizSession> {
        self.session.take()
    }
}
