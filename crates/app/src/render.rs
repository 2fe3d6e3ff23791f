//! Plain-text formatting for the terminal front-end.

use quiz_core::model::MAX_PLAYER_NAME_CHARS;
use quiz_core::{AnswerResult, GameSummary};
use services::{QuestionPrompt, RankedEntry};

/// `m:ss`, minutes unbounded.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn question_line(prompt: &QuestionPrompt, score: u32) -> String {
    format!(
        "[{}/{}] {} | score {}\n  {}",
        prompt.number,
        prompt.total,
        prompt.difficulty.label(),
        score,
        prompt.text
    )
}

pub fn feedback(result: &AnswerResult) -> Vec<String> {
    let mut lines = Vec::new();
    if result.is_correct {
        lines.push(format!("Correct! +{} points", result.points_awarded));
    } else if result.timed_out {
        lines.push(format!("Time's up! The answer was {}.", result.expected_answer));
    } else {
        lines.push(format!("Wrong. The answer was {}.", result.expected_answer));
    }
    if let Some(difficulty) = result.new_difficulty {
        lines.push(format!("Difficulty is now {}.", difficulty.label()));
    }
    lines
}

pub fn summary(summary: &GameSummary) -> Vec<String> {
    vec![
        "Game over!".to_string(),
        format!("  Score:            {}", summary.score),
        format!("  Correct:          {}", summary.correct_count),
        format!("  Wrong:            {}", summary.wrong_count),
        format!("  Highest level:    {}", summary.highest_difficulty.label()),
        format!("  Time:             {}", format_elapsed(summary.elapsed_seconds)),
    ]
}

pub fn leaderboard(rows: &[RankedEntry]) -> Vec<String> {
    if rows.is_empty() {
        return vec!["No scores yet.".to_string()];
    }
    rows.iter()
        .map(|row| {
            format!(
                "{:>3}. {:<width$} {:>6}  {:<6}  {}{}",
                row.rank,
                row.name,
                row.score,
                row.difficulty.label(),
                row.recorded_at.format("%Y-%m-%d %H:%M"),
                if row.is_registered { " *" } else { "" },
                width = MAX_PLAYER_NAME_CHARS,
            )
        })
        .collect()
}
