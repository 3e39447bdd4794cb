//! Errors surfaced to the transport layer.

use crate::{PlayerId, SessionId, StoreError};
use rps_rules::RulesError;

/// Recoverable error from a live match, registry or finalizer operation.
///
/// A failed operation never changes the state of the match.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MatchError {
    /// Both seats are taken by other players.
    #[display("Session {} already has two players", _0)]
    SessionFull(SessionId),

    /// The player holds no seat in the session.
    #[display("Player {} is not in this session", _0)]
    PlayerNotInSession(PlayerId),

    /// The move is outside the match's ruleset.
    #[display("Illegal move: {}", _0)]
    IllegalMove(RulesError),

    /// The player already moved this round.
    #[display("Player {} has already moved this round", _0)]
    DuplicateMove(PlayerId),

    /// The series has a winner; no more moves are taken.
    #[display("Series is already decided")]
    SeriesAlreadyComplete,

    /// The second seat is still empty.
    #[display("Waiting for an opponent to join")]
    AwaitingOpponent,

    /// Finalization requested before the series was decided.
    #[display("Series in session {} is not complete", _0)]
    NotComplete(SessionId),

    /// Finalization requested twice.
    #[display("Session {} is already finalized", _0)]
    AlreadyFinalized(SessionId),

    /// No session with this identifier.
    #[display("Session {} not found", _0)]
    NotFound(SessionId),

    /// Rejected match settings.
    #[display("Invalid match config: {}", _0)]
    InvalidConfig(String),

    /// The persistence collaborator failed to store the match.
    #[display("{}", _0)]
    Persistence(StoreError),
}

impl std::error::Error for MatchError {}

impl From<RulesError> for MatchError {
    fn from(err: RulesError) -> Self {
        MatchError::IllegalMove(err)
    }
}

impl From<StoreError> for MatchError {
    fn from(err: StoreError) -> Self {
        MatchError::Persistence(err)
    }
}
