//! Notifications emitted on every live match transition.

use super::types::{PlayerId, RoundResult, Slot};
use crate::RecordId;
use serde::{Deserialize, Serialize};

/// A state transition of a live session, broadcast to subscribers.
///
/// The transport layer decides how these reach clients. Submitted moves are
/// announced without the move itself so the opponent cannot react to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMatchEvent {
    /// A player took or reclaimed a seat.
    PlayerConnected {
        /// Seat taken.
        slot: Slot,
        /// Who connected.
        player: PlayerId,
    },
    /// A player dropped; their seat is kept.
    PlayerDisconnected {
        /// Seat held.
        slot: Slot,
        /// Who disconnected.
        player: PlayerId,
    },
    /// A player locked in a move for the current round.
    MoveSubmitted {
        /// Seat that moved.
        slot: Slot,
    },
    /// Both players moved and the round was scored.
    RoundResolved {
        /// The scored round.
        round: RoundResult,
    },
    /// A player reached the round-win majority.
    SeriesComplete {
        /// Winning seat.
        winner: Slot,
        /// Winning player.
        player: PlayerId,
    },
    /// The decided series was written to storage.
    Finalized {
        /// Storage identifier of the written match.
        record_id: RecordId,
    },
    /// The registry dropped the session for inactivity.
    Evicted,
}
