use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown difficulty: {0:?}")]
pub struct ParseDifficultyError(String);

//
// ─── OPERATION ────────────────────────────────────────────────────────────────
//

/// Arithmetic operation of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
}

impl Operation {
    /// Symbol used when rendering the question text.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Subtract => '-',
            Operation::Multiply => '×',
        }
    }

    /// Exact integer result of `left <op> right`.
    #[must_use]
    pub fn apply(self, left: i64, right: i64) -> i64 {
        match self {
            Operation::Add => left + right,
            Operation::Subtract => left - right,
            Operation::Multiply => left * right,
        }
    }
}

//
// ─── DIFFICULTY ───────────────────────────────────────────────────────────────
//

/// Game difficulty, ordered `Easy < Medium < Hard`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

/// Streak event that moves the difficulty one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyShift {
    Upgrade,
    Downgrade,
}

const EASY_OPERATIONS: [Operation; 2] = [Operation::Add, Operation::Subtract];
const ALL_OPERATIONS: [Operation; 3] = [Operation::Add, Operation::Subtract, Operation::Multiply];

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Lowercase code used for persistence.
    #[must_use]
    pub fn as_code(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Operations a question may use at this level.
    #[must_use]
    pub fn operations(self) -> &'static [Operation] {
        match self {
            Difficulty::Easy => &EASY_OPERATIONS,
            Difficulty::Medium | Difficulty::Hard => &ALL_OPERATIONS,
        }
    }

    /// Inclusive operand range for an operation at this level.
    #[must_use]
    pub fn operand_range(self, operation: Operation) -> RangeInclusive<i64> {
        match (self, operation) {
            (Difficulty::Easy, _) => 0..=10,
            (Difficulty::Medium, Operation::Multiply) => 2..=14,
            (Difficulty::Medium, _) => 10..=100,
            (Difficulty::Hard, Operation::Multiply) => 10..=40,
            (Difficulty::Hard, _) => 100..=1000,
        }
    }

    /// Transition table for streak-driven adaptation.
    ///
    /// The edges saturate: `Hard` cannot upgrade and `Easy` cannot downgrade.
    #[must_use]
    pub fn transition(self, shift: DifficultyShift) -> Self {
        use Difficulty::{Easy, Hard, Medium};
        use DifficultyShift::{Downgrade, Upgrade};

        match (self, shift) {
            (Easy, Upgrade) => Medium,
            (Medium, Upgrade) | (Hard, Upgrade) => Hard,
            (Easy, Downgrade) | (Medium, Downgrade) => Easy,
            (Hard, Downgrade) => Medium,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseDifficultyError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_is_ordered() {
        assert!(Difficulty::Easy < Difficulty::Medium);
        assert!(Difficulty::Medium < Difficulty::Hard);
    }

    #[test]
    fn transition_table_saturates_at_edges() {
        use DifficultyShift::{Downgrade, Upgrade};
        assert_eq!(Difficulty::Easy.transition(Upgrade), Difficulty::Medium);
        assert_eq!(Difficulty::Medium.transition(Upgrade), Difficulty::Hard);
        assert_eq!(Difficulty::Hard.transition(Upgrade), Difficulty::Hard);
        assert_eq!(Difficulty::Hard.transition(Downgrade), Difficulty::Medium);
        assert_eq!(Difficulty::Medium.transition(Downgrade), Difficulty::Easy);
        assert_eq!(Difficulty::Easy.transition(Downgrade), Difficulty::Easy);
    }

    #[test]
    fn easy_never_multiplies() {
        assert!(!Difficulty::Easy.operations().contains(&Operation::Multiply));
        assert!(Difficulty::Medium.operations().contains(&Operation::Multiply));
        assert!(Difficulty::Hard.operations().contains(&Operation::Multiply));
    }

    #[test]
    fn parses_codes_and_labels() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" medium ".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!("expert".parse::<Difficulty>().is_err());
        for d in Difficulty::ALL {
            assert_eq!(d.as_code().parse::<Difficulty>().unwrap(), d);
        }
    }

    #[test]
    fn serde_uses_lowercase_codes() {
        let json = serde_json::to_string(&Difficulty::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
