use rand::Rng;
use serde::Serialize;
use std::fmt;

use crate::model::{Difficulty, Operation, QuestionTicket};

/// A single arithmetic question.
///
/// The operation is carried as a tag, never recovered from the text. The
/// expected answer must not be shown to the player before they answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    ticket: QuestionTicket,
    operation: Operation,
    left: i64,
    right: i64,
    expected_answer: i64,
}

impl Question {
    /// Build a question, ordering subtraction operands so the result is non-negative.
    #[must_use]
    pub fn new(ticket: QuestionTicket, operation: Operation, left: i64, right: i64) -> Self {
        let (left, right) = if operation == Operation::Subtract && left < right {
            (right, left)
        } else {
            (left, right)
        };

        Self {
            ticket,
            operation,
            left,
            right,
            expected_answer: operation.apply(left, right),
        }
    }

    /// Draw a random question for the given difficulty.
    pub fn generate<R: Rng + ?Sized>(
        difficulty: Difficulty,
        ticket: QuestionTicket,
        rng: &mut R,
    ) -> Self {
        let operations = difficulty.operations();
        let operation = operations[rng.random_range(0..operations.len())];
        let range = difficulty.operand_range(operation);
        let left = rng.random_range(range.clone());
        let right = rng.random_range(range);
        Self::new(ticket, operation, left, right)
    }

    #[must_use]
    pub fn ticket(&self) -> QuestionTicket {
        self.ticket
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn operands(&self) -> (i64, i64) {
        (self.left, self.right)
    }

    #[must_use]
    pub fn expected_answer(&self) -> i64 {
        self.expected_answer
    }

    /// Player-facing text, e.g. `12 × 7 = ?`.
    #[must_use]
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} = ?",
            self.left,
            self.operation.symbol(),
            self.right
        )
    }
}
