//! Round resolution.

use crate::{Move, Outcome, RulesError, Ruleset};
use tracing::{instrument, trace};

/// Resolves a round between `first` (player 1) and `second` (player 2).
///
/// # Errors
///
/// Returns [`RulesError::IllegalMove`] if either move is outside `ruleset`.
#[instrument(level = "trace")]
pub fn resolve(ruleset: Ruleset, first: Move, second: Move) -> Result<Outcome, RulesError> {
    for mv in [first, second] {
        if !ruleset.allows(mv) {
            return Err(RulesError::IllegalMove { mv, ruleset });
        }
    }

    let outcome = if first == second {
        Outcome::Tie
    } else if first.beats(second) {
        Outcome::Player1Wins
    } else {
        Outcome::Player2Wins
    };
    trace!(%outcome, "Round resolved");
    Ok(outcome)
}
