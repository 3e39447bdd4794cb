//! Value types shared by the live match state machine.

use crate::MatchError;
use derive_getters::Getters;
use rps_rules::{Move, Outcome, Ruleset};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Unique identifier for a live session.
pub type SessionId = String;

/// Opaque identity of a connecting player.
///
/// Supplied by the identity provider; only ever compared for equality.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Creates a player identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One of the two player positions in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// First player to join.
    Player1,
    /// Second player to join.
    Player2,
}

impl Slot {
    /// Both slots in seating order.
    pub const ALL: [Slot; 2] = [Slot::Player1, Slot::Player2];

    pub(crate) fn index(self) -> usize {
        match self {
            Slot::Player1 => 0,
            Slot::Player2 => 1,
        }
    }

    /// The opposing slot.
    pub fn other(self) -> Self {
        match self {
            Slot::Player1 => Slot::Player2,
            Slot::Player2 => Slot::Player1,
        }
    }

    /// One-based player number as stored with historical records.
    pub fn player_num(self) -> i32 {
        match self {
            Slot::Player1 => 1,
            Slot::Player2 => 2,
        }
    }

    /// The slot that won a round, if any.
    pub fn from_outcome(outcome: Outcome) -> Option<Self> {
        match outcome {
            Outcome::Player1Wins => Some(Slot::Player1),
            Outcome::Player2Wins => Some(Slot::Player2),
            Outcome::Tie => None,
        }
    }
}

/// Static settings fixed when a match is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Getters)]
pub struct MatchConfig {
    /// Number of rounds the series is played over; always odd.
    best_of: u32,
    /// Whether lizard and Spock are legal.
    extended_mode: bool,
    /// Whether the session is listed for anyone to join.
    public: bool,
}

impl MatchConfig {
    /// Creates a validated match configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvalidConfig`] if `best_of` is zero or even.
    #[instrument]
    pub fn new(best_of: u32, extended_mode: bool, public: bool) -> Result<Self, MatchError> {
        if best_of == 0 || best_of % 2 == 0 {
            return Err(MatchError::InvalidConfig(format!(
                "best_of must be a positive odd number, got {}",
                best_of
            )));
        }
        Ok(Self {
            best_of,
            extended_mode,
            public,
        })
    }

    /// The ruleset implied by `extended_mode`.
    pub fn ruleset(&self) -> Ruleset {
        Ruleset::from_extended_mode(self.extended_mode)
    }

    /// Round wins needed to take the series.
    pub fn wins_needed(&self) -> u32 {
        self.best_of / 2 + 1
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            best_of: 5,
            extended_mode: false,
            public: false,
        }
    }
}

/// A resolved round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct RoundResult {
    /// One-based round number.
    number: u32,
    player1_move: Move,
    player2_move: Move,
    outcome: Outcome,
}

impl RoundResult {
    pub(crate) fn new(number: u32, player1_move: Move, player2_move: Move, outcome: Outcome) -> Self {
        Self {
            number,
            player1_move,
            player2_move,
            outcome,
        }
    }

    /// The slot that won this round, or `None` for a tie.
    pub fn winner(&self) -> Option<Slot> {
        Slot::from_outcome(self.outcome)
    }

    /// Returns true if the round was won by either player.
    pub fn is_decisive(&self) -> bool {
        !self.outcome.is_tie()
    }
}

/// Lifecycle phase of a live match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchPhase {
    /// Fewer than two seats are taken.
    AwaitingPlayers,
    /// Both seats taken, round not yet complete.
    RoundInProgress,
    /// Both moves submitted, resolution pending.
    RoundComplete,
    /// A player has reached the majority of round wins.
    SeriesComplete,
}

/// Synchronous result of a successful move submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveOutcome {
    /// The move is recorded; the opponent has not moved yet.
    Waiting,
    /// The move completed a round.
    RoundResolved {
        /// The round that was resolved.
        round: RoundResult,
    },
    /// The move completed the round that decided the series.
    SeriesComplete {
        /// The deciding round.
        round: RoundResult,
        /// Slot of the series winner.
        winner: Slot,
    },
}

/// Persistence progress of a decided match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Finalization {
    /// Not yet written.
    Pending,
    /// A write is running outside the session lock.
    InFlight,
    /// Written; carries the storage identifier.
    Finalized(crate::RecordId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_config_rejects_even_best_of() {
        assert!(matches!(
            MatchConfig::new(4, false, false),
            Err(MatchError::InvalidConfig(_))
        ));
        assert!(MatchConfig::new(0, false, false).is_err());
    }

    #[test]
    fn test_wins_needed_is_majority() {
        assert_eq!(MatchConfig::new(1, false, false).unwrap().wins_needed(), 1);
        assert_eq!(MatchConfig::new(3, false, false).unwrap().wins_needed(), 2);
        assert_eq!(MatchConfig::new(7, true, true).unwrap().wins_needed(), 4);
    }

    #[test]
    fn test_slot_helpers() {
        assert_eq!(Slot::Player1.other(), Slot::Player2);
        assert_eq!(Slot::Player2.player_num(), 2);
        assert_eq!(Slot::from_outcome(Outcome::Tie), None);
    }

    #[test]
    fn test_player_id_is_transparent() {
        let id = PlayerId::from("alice");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"alice\"");
        assert_eq!(id.to_string(), "alice");
    }
}
