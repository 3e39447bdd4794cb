//! Live match state machine.

mod error;
mod event;
pub mod invariants;
mod state;
mod types;

pub use error::MatchError;
pub use event::LiveMatchEvent;
pub use state::LiveMatch;
pub use types::{
    Finalization, MatchConfig, MatchPhase, MoveOutcome, PlayerId, RoundResult, SessionId, Slot,
};
