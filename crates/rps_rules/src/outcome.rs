//! Result of a single round.

use serde::{Deserialize, Serialize};

/// Outcome of a round, from the point of view of slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// The first move won.
    Player1Wins,
    /// The second move won.
    Player2Wins,
    /// Both players threw the same move.
    Tie,
}

impl Outcome {
    /// The outcome with the players swapped.
    pub fn mirror(self) -> Self {
        match self {
            Outcome::Player1Wins => Outcome::Player2Wins,
            Outcome::Player2Wins => Outcome::Player1Wins,
            Outcome::Tie => Outcome::Tie,
        }
    }

    /// Returns true if neither player won.
    pub fn is_tie(self) -> bool {
        matches!(self, Outcome::Tie)
    }
}
