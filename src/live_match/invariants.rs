//! Invariants of a live match.
//!
//! Each invariant is a named, independently testable property. The full
//! set is checked after every successful mutation in debug builds.

use super::state::LiveMatch;
use super::types::Slot;
use tracing::error;

/// A property that must hold for every reachable [`LiveMatch`].
pub trait Invariant {
    /// Checks if the invariant holds.
    fn holds(live: &LiveMatch) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet {
    /// Checks every invariant, collecting all violations.
    fn check_all(live: &LiveMatch) -> Result<(), Vec<InvariantViolation>>;
}

impl<I1, I2, I3, I4> InvariantSet for (I1, I2, I3, I4)
where
    I1: Invariant,
    I2: Invariant,
    I3: Invariant,
    I4: Invariant,
{
    fn check_all(live: &LiveMatch) -> Result<(), Vec<InvariantViolation>> {
        let results = [
            (I1::holds(live), I1::description()),
            (I2::holds(live), I2::description()),
            (I3::holds(live), I3::description()),
            (I4::holds(live), I4::description()),
        ];
        let violations: Vec<_> = results
            .into_iter()
            .filter(|(holds, _)| !holds)
            .map(|(_, description)| InvariantViolation::new(description))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// The two seats never hold the same identity.
pub struct DistinctPlayers;

impl Invariant for DistinctPlayers {
    fn holds(live: &LiveMatch) -> bool {
        match (live.player(Slot::Player1), live.player(Slot::Player2)) {
            (Some(a), Some(b)) => a != b,
            _ => true,
        }
    }

    fn description() -> &'static str {
        "Seats hold distinct players"
    }
}

/// Decisive rounds never outnumber `best_of`.
pub struct RoundsBounded;

impl Invariant for RoundsBounded {
    fn holds(live: &LiveMatch) -> bool {
        let decisive = live
            .round_history()
            .iter()
            .filter(|round| round.is_decisive())
            .count();
        decisive <= *live.config().best_of() as usize
    }

    fn description() -> &'static str {
        "Decisive rounds do not exceed best_of"
    }
}

/// Seat tallies agree with the round history.
pub struct TallyMatchesHistory;

impl Invariant for TallyMatchesHistory {
    fn holds(live: &LiveMatch) -> bool {
        Slot::ALL.into_iter().all(|slot| {
            let counted = live
                .round_history()
                .iter()
                .filter(|round| round.winner() == Some(slot))
                .count();
            counted == live.wins(slot) as usize
        })
    }

    fn description() -> &'static str {
        "Win tallies match round history"
    }
}

/// A winner exists exactly when some player holds a majority, and a decided
/// series has no pending moves.
pub struct WinnerIffMajority;

impl Invariant for WinnerIffMajority {
    fn holds(live: &LiveMatch) -> bool {
        let needed = live.config().wins_needed();
        let leader = Slot::ALL
            .into_iter()
            .find(|slot| live.wins(*slot) >= needed);
        let moves_clear = Slot::ALL
            .into_iter()
            .all(|slot| live.current_move(slot).is_none());

        match live.series_winner() {
            Some(winner) => leader == Some(winner) && moves_clear,
            None => leader.is_none(),
        }
    }

    fn description() -> &'static str {
        "Series winner set iff a player holds a majority of round wins"
    }
}

/// Every live match invariant.
pub type LiveMatchInvariants = (
    DistinctPlayers,
    RoundsBounded,
    TallyMatchesHistory,
    WinnerIffMajority,
);

/// Asserts all invariants in debug builds.
pub(crate) fn assert_invariants(live: &LiveMatch) {
    if cfg!(debug_assertions) {
        if let Err(violations) = LiveMatchInvariants::check_all(live) {
            error!(session_id = %live.id(), ?violations, "Live match invariant violated");
            panic!("live match invariant violated: {:?}", violations);
        }
    }
}
