//! Points awarded for a correct answer.

use crate::model::{Difficulty, Operation};

/// Seconds a player has to answer before the question times out.
pub const ANSWER_TIME_LIMIT_SECS: u32 = 30;

/// Answers at or under this many seconds earn the speed bonus.
pub const SPEED_BONUS_WINDOW_SECS: f64 = 5.0;

pub const SPEED_BONUS_POINTS: u32 = 5;

/// Points per step of the current correct streak.
pub const STREAK_BONUS_PER_ANSWER: u32 = 2;

/// Itemised score for one correct answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// Difficulty base points scaled by the operation multiplier.
    pub weighted_base: f64,
    pub time_bonus: u32,
    pub speed_bonus: u32,
    pub streak_bonus: u32,
    pub total: u32,
}

#[must_use]
pub fn base_points(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => 5,
        Difficulty::Medium => 10,
        Difficulty::Hard => 20,
    }
}

#[must_use]
pub fn operation_multiplier(operation: Operation) -> f64 {
    match operation {
        Operation::Multiply => 1.5,
        Operation::Add | Operation::Subtract => 1.0,
    }
}

/// One point per three seconds left on the timer, never negative.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn time_bonus(elapsed_secs: f64) -> u32 {
    let remaining = f64::from(ANSWER_TIME_LIMIT_SECS) - elapsed_secs.max(0.0);
    let steps = (remaining / 3.0).floor();
    if steps <= 0.0 { 0 } else { steps as u32 }
}

#[must_use]
pub fn speed_bonus(elapsed_secs: f64) -> u32 {
    if elapsed_secs.max(0.0) <= SPEED_BONUS_WINDOW_SECS {
        SPEED_BONUS_POINTS
    } else {
        0
    }
}

/// Score a correct answer.
///
/// `streak` is the consecutive-correct count including this answer.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn score_correct_answer(
    difficulty: Difficulty,
    operation: Operation,
    elapsed_secs: f64,
    streak: u32,
) -> ScoreBreakdown {
    let weighted_base = f64::from(base_points(difficulty)) * operation_multiplier(operation);
    let time_bonus = time_bonus(elapsed_secs);
    let speed_bonus = speed_bonus(elapsed_secs);
    let streak_bonus = streak.saturating_mul(STREAK_BONUS_PER_ANSWER);

    let raw = weighted_base
        + f64::from(time_bonus)
        + f64::from(speed_bonus)
        + f64::from(streak_bonus);

    ScoreBreakdown {
        weighted_base,
        time_bonus,
        speed_bonus,
        streak_bonus,
        total: raw.floor() as u32,
    }
}
