//! Persistence boundary for decided matches.
//!
//! The live match core only ever writes finished series. [`SeriesRecord`]
//! is the immutable shape handed across the boundary; [`SeriesStore`] is the
//! write contract the storage layer implements.

use crate::{MatchConfig, PlayerId, SessionId, Slot};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use rps_rules::Move;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, instrument};

/// Identifier assigned by storage to a written match.
pub type RecordId = i32;

/// One round of a finished series, as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Getters, new)]
pub struct GameRecord {
    /// Zero-based position of the round in the series.
    game_num: u32,
    player1_move: Move,
    player2_move: Move,
    /// Winning slot; `None` for a tie.
    winner: Option<Slot>,
}

/// A finished series, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters, new)]
pub struct SeriesRecord {
    session_id: SessionId,
    config: MatchConfig,
    player1: PlayerId,
    player2: PlayerId,
    winner: Slot,
    start_time: DateTime<Utc>,
    duration_secs: u32,
    games: Vec<GameRecord>,
}

impl SeriesRecord {
    /// Identity seated in `slot`.
    pub fn player(&self, slot: Slot) -> &PlayerId {
        match slot {
            Slot::Player1 => &self.player1,
            Slot::Player2 => &self.player2,
        }
    }

    /// Identity of the series winner.
    pub fn winner_player(&self) -> &PlayerId {
        self.player(self.winner)
    }
}

/// Write contract of the persistence collaborator.
///
/// Implementations may block on I/O; callers never hold a session lock
/// while calling them.
pub trait SeriesStore: Send + Sync + std::fmt::Debug {
    /// Durably appends a finished series.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record could not be written.
    fn write_series_record(&self, record: &SeriesRecord) -> Result<RecordId, StoreError>;
}

/// Storage failure with location tracking.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Store error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Keeps written series in memory.
#[derive(Debug, Default)]
pub struct InMemorySeriesStore {
    records: Mutex<Vec<SeriesRecord>>,
}

impl InMemorySeriesStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of every written record, in write order.
    pub fn records(&self) -> Vec<SeriesRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SeriesStore for InMemorySeriesStore {
    #[instrument(skip(self, record), fields(session_id = %record.session_id()))]
    fn write_series_record(&self, record: &SeriesRecord) -> Result<RecordId, StoreError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if records.iter().any(|r| r.session_id() == record.session_id()) {
            return Err(StoreError::new(format!(
                "Series for session {} already stored",
                record.session_id()
            )));
        }
        records.push(record.clone());
        let id = RecordId::try_from(records.len())
            .map_err(|e| StoreError::new(format!("Record id overflow: {}", e)))?;
        debug!(games = record.games().len(), "Series kept in memory");
        info!(record_id = id, "Series stored");
        Ok(id)
    }
}
