//! The five move symbols.

use crate::RulesError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// A move a player can throw.
///
/// Stored and transmitted in upper case (`"ROCK"`, `"SPOCK"`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Move {
    /// Crushes lizard, crushes scissors.
    Rock,
    /// Covers rock, disproves Spock.
    Paper,
    /// Cuts paper, decapitates lizard.
    Scissors,
    /// Poisons Spock, eats paper.
    Lizard,
    /// Smashes scissors, vaporizes rock.
    Spock,
}

impl Move {
    /// Position on the Rock, Spock, Paper, Lizard, Scissors cycle.
    ///
    /// Every move beats the one and two steps behind it on this cycle. The
    /// classic moves sit on even positions, so the same rule covers the
    /// three-move game.
    pub(crate) fn cycle_position(self) -> u8 {
        match self {
            Move::Rock => 0,
            Move::Spock => 1,
            Move::Paper => 2,
            Move::Lizard => 3,
            Move::Scissors => 4,
        }
    }

    /// Returns true if this move defeats `other`.
    pub fn beats(self, other: Move) -> bool {
        let diff = (5 + self.cycle_position() - other.cycle_position()) % 5;
        diff == 1 || diff == 2
    }

    /// Returns true for the two moves only available in extended mode.
    pub fn is_extended(self) -> bool {
        matches!(self, Move::Lizard | Move::Spock)
    }

    /// The verb describing how this move defeats `other`, if it does.
    pub fn verb(self, other: Move) -> Option<&'static str> {
        if !self.beats(other) {
            return None;
        }
        let verb = match (self, other) {
            (Move::Rock, _) => "crushes",
            (Move::Paper, Move::Rock) => "covers",
            (Move::Paper, _) => "disproves",
            (Move::Scissors, Move::Paper) => "cuts",
            (Move::Scissors, _) => "decapitates",
            (Move::Lizard, Move::Spock) => "poisons",
            (Move::Lizard, _) => "eats",
            (Move::Spock, Move::Scissors) => "smashes",
            (Move::Spock, _) => "vaporizes",
        };
        Some(verb)
    }

    /// Converts the move to the string stored in the database.
    pub fn to_db_string(self) -> &'static str {
        self.into()
    }

    /// Parses a move from its stored form.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::UnknownMove`] if the string names no move.
    #[instrument]
    pub fn from_db_string(s: &str) -> Result<Self, RulesError> {
        Move::from_str(s).map_err(|_| RulesError::UnknownMove(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_each_move_beats_exactly_two() {
        for mv in Move::iter() {
            let wins = Move::iter().filter(|other| mv.beats(*other)).count();
            let losses = Move::iter().filter(|other| other.beats(mv)).count();
            assert_eq!(wins, 2, "{mv} should beat two moves");
            assert_eq!(losses, 2, "{mv} should lose to two moves");
        }
    }

    #[test]
    fn test_no_move_beats_itself() {
        for mv in Move::iter() {
            assert!(!mv.beats(mv));
        }
    }

    #[test]
    fn test_verb_present_only_for_wins() {
        for a in Move::iter() {
            for b in Move::iter() {
                assert_eq!(a.verb(b).is_some(), a.beats(b), "{a} vs {b}");
            }
        }
        assert_eq!(Move::Spock.verb(Move::Rock), Some("vaporizes"));
        assert_eq!(Move::Lizard.verb(Move::Paper), Some("eats"));
    }

    #[test]
    fn test_db_string_uses_upper_case() {
        assert_eq!(Move::Scissors.to_db_string(), "SCISSORS");
        assert_eq!(Move::from_db_string("LIZARD"), Ok(Move::Lizard));
        assert!(matches!(
            Move::from_db_string("rock"),
            Err(RulesError::UnknownMove(_))
        ));
    }

    #[test]
    fn test_serde_matches_db_string() {
        let json = serde_json::to_string(&Move::Spock).unwrap();
        assert_eq!(json, "\"SPOCK\"");
    }
}
