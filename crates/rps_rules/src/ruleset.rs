//! Classic and extended move sets.

use crate::Move;
use serde::{Deserialize, Serialize};

const CLASSIC_MOVES: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];
const EXTENDED_MOVES: [Move; 5] = [
    Move::Rock,
    Move::Paper,
    Move::Scissors,
    Move::Lizard,
    Move::Spock,
];

/// Which moves are legal in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Ruleset {
    /// Rock, paper, scissors.
    Classic,
    /// Adds lizard and Spock.
    Extended,
}

impl Ruleset {
    /// Selects the ruleset from a match's extended-mode flag.
    pub fn from_extended_mode(extended_mode: bool) -> Self {
        if extended_mode {
            Ruleset::Extended
        } else {
            Ruleset::Classic
        }
    }

    /// Returns true if `mv` may be played under this ruleset.
    pub fn allows(self, mv: Move) -> bool {
        match self {
            Ruleset::Classic => !mv.is_extended(),
            Ruleset::Extended => true,
        }
    }

    /// All legal moves, in display order.
    pub fn moves(self) -> &'static [Move] {
        match self {
            Ruleset::Classic => &CLASSIC_MOVES,
            Ruleset::Extended => &EXTENDED_MOVES,
        }
    }
}
