//! Pure Rock-Paper-Scissors-Lizard-Spock rules.
//!
//! This crate knows nothing about sessions, players or storage. It answers
//! one question: given the two moves of a round and the active ruleset, who
//! won?
//!
//! ```
//! use rps_rules::{Move, Outcome, Ruleset, resolve};
//!
//! let outcome = resolve(Ruleset::Extended, Move::Spock, Move::Rock).unwrap();
//! assert_eq!(outcome, Outcome::Player1Wins);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod moves;
mod outcome;
mod resolve;
mod ruleset;

pub use error::RulesError;
pub use moves::Move;
pub use outcome::Outcome;
pub use resolve::resolve;
pub use ruleset::Ruleset;
