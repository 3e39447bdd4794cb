//! Database models for finished matches.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use rps_rules::{Move, RulesError};

use crate::db::schema;

/// A player known to the historical record.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::players)]
pub struct StoredPlayer {
    id: i32,
    username: String,
    created_at: NaiveDateTime,
}

/// Insertable player.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::players)]
pub(crate) struct NewPlayer {
    username: String,
}

/// A finished match.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::matches)]
pub struct StoredMatch {
    id: i32,
    session_id: String,
    start_time: NaiveDateTime,
    duration_secs: i32,
    best_of: i32,
    extended_mode: bool,
    public: bool,
    winner_id: i32,
}

/// Insertable match.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::matches)]
pub(crate) struct NewMatch {
    session_id: String,
    start_time: NaiveDateTime,
    duration_secs: i32,
    best_of: i32,
    extended_mode: bool,
    public: bool,
    winner_id: i32,
}

/// Seat of a player in a match.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::player_matches)]
pub(crate) struct NewPlayerMatch {
    match_id: i32,
    player_id: i32,
    player_num: i32,
}

/// One round of a finished match.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::games)]
pub struct StoredGame {
    id: i32,
    match_id: i32,
    game_num: i32,
    /// `None` for a tied round.
    winner_id: Option<i32>,
}

/// Insertable round.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::games)]
pub(crate) struct NewGame {
    match_id: i32,
    game_num: i32,
    winner_id: Option<i32>,
}

/// The move one player threw in a round.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::player_games)]
pub struct StoredPlayerGame {
    id: i32,
    game_id: i32,
    player_id: i32,
    player_num: i32,
    player_move: String,
}

impl StoredPlayerGame {
    /// Parses the stored move.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::UnknownMove`] for an unrecognised value.
    pub fn parse_move(&self) -> Result<Move, RulesError> {
        Move::from_db_string(&self.player_move)
    }
}

/// Insertable player move.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::player_games)]
pub(crate) struct NewPlayerGame {
    game_id: i32,
    player_id: i32,
    player_num: i32,
    player_move: String,
}
