//! rps_live - live Rock-Paper-Scissors-Lizard-Spock matches
//!
//! The core of a match server: two players join a session, throw moves,
//! rounds are scored, and once one player holds a majority of a best-of-N
//! series the result is written to storage.
//!
//! # Architecture
//!
//! - **Rules**: move resolution lives in the `rps_rules` crate
//! - **Live match**: the per-session state machine ([`LiveMatch`])
//! - **Registry**: session lookup, serialized access, idle eviction
//!   ([`SessionRegistry`], [`SessionHandle`])
//! - **Finalizer**: turns a decided match into a [`SeriesRecord`] and writes
//!   it through a [`SeriesStore`] ([`MatchFinalizer`])
//! - **Database**: SQLite [`SeriesStore`] built on diesel ([`db`])
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rps_live::{InMemorySeriesStore, MatchConfig, MoveOutcome, PlayerId, SessionRegistry};
//! use rps_rules::Move;
//!
//! # fn main() -> Result<(), rps_live::MatchError> {
//! let registry = SessionRegistry::new(Arc::new(InMemorySeriesStore::new()));
//! let id = registry.create(MatchConfig::new(1, false, false)?);
//! let session = registry.get(&id)?;
//!
//! let (alice, bob) = (PlayerId::from("alice"), PlayerId::from("bob"));
//! session.connect_player(alice.clone())?;
//! session.connect_player(bob.clone())?;
//! session.apply_move(&alice, Move::Paper)?;
//! let outcome = session.apply_move(&bob, Move::Rock)?;
//! assert!(matches!(outcome, MoveOutcome::SeriesComplete { .. }));
//!
//! registry.finalize(&id)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
pub mod db;
mod finalize;
mod live_match;
mod session;
mod store;

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Live match state machine
pub use live_match::invariants;
pub use live_match::{
    Finalization, LiveMatch, LiveMatchEvent, MatchConfig, MatchError, MatchPhase, MoveOutcome,
    PlayerId, RoundResult, SessionId, Slot,
};

// Crate-level exports - Session management
pub use session::{
    DEFAULT_EVENT_CAPACITY, DEFAULT_IDLE_TIMEOUT, RegistrySettings, SessionHandle, SessionRegistry,
};

// Crate-level exports - Persistence bridge
pub use finalize::{MatchFinalizer, series_record};
pub use store::{GameRecord, InMemorySeriesStore, RecordId, SeriesRecord, SeriesStore, StoreError};
