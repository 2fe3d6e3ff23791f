#![forbid(unsafe_code)]

pub mod engine;
pub mod model;
pub mod scoring;
pub mod time;

pub use engine::{
    Answer, AnswerResult, DOWNGRADE_STREAK, GameSummary, QUESTIONS_PER_GAME, QuizEngine,
    QuizError, QuizSession, UPGRADE_STREAK, parse_answer,
};
pub use time::Clock;
