use quiz_core::model::{Difficulty, Question, QuestionTicket};
use quiz_core::{QUESTIONS_PER_GAME, QuizSession};

/// What the UI may show for a pending question.
///
/// Deliberately carries no expected answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPrompt {
    pub ticket: QuestionTicket,
    /// 1-based position in the game.
    pub number: u32,
    pub total: u32,
    pub text: String,
    pub difficulty: Difficulty,
}

impl QuestionPrompt {
    #[must_use]
    pub fn new(question: &Question, session: &QuizSession) -> Self {
        Self {
            ticket: question.ticket(),
            number: session.questions_asked() + 1,
            total: QUESTIONS_PER_GAME,
            text: question.text(),
            difficulty: session.difficulty(),
        }
    }
}

/// Aggregated view of game progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameProgress {
    pub difficulty: Difficulty,
    pub score: u32,
    pub answered: u32,
    pub remaining: u32,
    pub is_game_over: bool,
}

impl GameProgress {
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Self {
        Self {
            difficulty: session.difficulty(),
            score: session.score(),
            answered: session.questions_asked(),
            remaining: QUESTIONS_PER_GAME.saturating_sub(session.questions_asked()),
            is_game_over: session.is_game_over(),
        }
    }
}
