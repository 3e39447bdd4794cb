//! Rule validation errors.

use crate::{Move, Ruleset};

/// Error raised when a move cannot be played or parsed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RulesError {
    /// The move exists but is not part of the active ruleset.
    #[display("{} is not playable under {} rules", mv, ruleset)]
    IllegalMove {
        /// The rejected move.
        mv: Move,
        /// The ruleset that rejected it.
        ruleset: Ruleset,
    },

    /// The string does not name any move.
    #[display("Unknown move '{}'", _0)]
    UnknownMove(String),
}

impl std::error::Error for RulesError {}
