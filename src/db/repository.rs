//! Database repository for finished matches.

use diesel::prelude::*;
use diesel_migrations::MigrationHarness;
use tracing::{debug, info, instrument};

use crate::db::models::{NewGame, NewMatch, NewPlayer, NewPlayerGame, NewPlayerMatch};
use crate::db::{DbError, MIGRATIONS, StoredGame, StoredMatch, StoredPlayer, StoredPlayerGame, schema};
use crate::{RecordId, SeriesRecord, SeriesStore, Slot, StoreError};

/// SQLite-backed [`SeriesStore`].
#[derive(Debug, Clone)]
pub struct MatchRepository {
    db_path: String,
}

impl MatchRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating MatchRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Applies pending schema migrations, returning how many ran.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(applied.len())
    }

    /// Writes a finished series as one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the session was already written or a database
    /// error occurs. Nothing is written on error.
    #[instrument(skip(self, record), fields(session_id = %record.session_id()))]
    pub fn write_series(&self, record: &SeriesRecord) -> Result<StoredMatch, DbError> {
        debug!(games = record.games().len(), "Writing series");
        let mut conn = self.connection()?;

        let stored = conn.transaction::<_, DbError, _>(|conn| {
            let player1_id = player_id_for(conn, record.player(Slot::Player1).as_str())?;
            let player2_id = player_id_for(conn, record.player(Slot::Player2).as_str())?;
            let player_id = |slot: Slot| match slot {
                Slot::Player1 => player1_id,
                Slot::Player2 => player2_id,
            };

            let new_match = NewMatch::new(
                record.session_id().clone(),
                record.start_time().naive_utc(),
                to_i32(*record.duration_secs(), "duration_secs")?,
                to_i32(*record.config().best_of(), "best_of")?,
                *record.config().extended_mode(),
                *record.config().public(),
                player_id(*record.winner()),
            );
            let stored = diesel::insert_into(schema::matches::table)
                .values(&new_match)
                .returning(StoredMatch::as_returning())
                .get_result(conn)?;

            let seats: Vec<_> = Slot::ALL
                .into_iter()
                .map(|slot| NewPlayerMatch::new(*stored.id(), player_id(slot), slot.player_num()))
                .collect();
            diesel::insert_into(schema::player_matches::table)
                .values(&seats)
                .execute(conn)?;

            for game in record.games() {
                let new_game = NewGame::new(
                    *stored.id(),
                    to_i32(*game.game_num(), "game_num")?,
                    game.winner().map(player_id),
                );
                let stored_game = diesel::insert_into(schema::games::table)
                    .values(&new_game)
                    .returning(StoredGame::as_returning())
                    .get_result(conn)?;

                let throws = [
                    (Slot::Player1, *game.player1_move()),
                    (Slot::Player2, *game.player2_move()),
                ]
                .map(|(slot, mv)| {
                    NewPlayerGame::new(
                        *stored_game.id(),
                        player_id(slot),
                        slot.player_num(),
                        mv.to_db_string().to_string(),
                    )
                });
                diesel::insert_into(schema::player_games::table)
                    .values(&throws[..])
                    .execute(conn)?;
            }

            Ok(stored)
        })?;

        info!(
            match_id = stored.id(),
            winner_id = stored.winner_id(),
            games = record.games().len(),
            "Series written"
        );
        Ok(stored)
    }

    /// Gets a match by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_match(&self, match_id: i32) -> Result<Option<StoredMatch>, DbError> {
        let mut conn = self.connection()?;
        let found = schema::matches::table
            .find(match_id)
            .select(StoredMatch::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(found)
    }

    /// Gets the rounds of a match, in play order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn games_for_match(&self, match_id: i32) -> Result<Vec<StoredGame>, DbError> {
        let mut conn = self.connection()?;
        let games = schema::games::table
            .filter(schema::games::match_id.eq(match_id))
            .order(schema::games::game_num.asc())
            .select(StoredGame::as_select())
            .load(&mut conn)?;
        debug!(match_id, count = games.len(), "Games loaded");
        Ok(games)
    }

    /// Gets both players' moves for a round, player 1 first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn player_games_for_game(&self, game_id: i32) -> Result<Vec<StoredPlayerGame>, DbError> {
        let mut conn = self.connection()?;
        let throws = schema::player_games::table
            .filter(schema::player_games::game_id.eq(game_id))
            .order(schema::player_games::player_num.asc())
            .select(StoredPlayerGame::as_select())
            .load(&mut conn)?;
        Ok(throws)
    }

    /// Gets a player by username. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn player_by_username(&self, username: &str) -> Result<Option<StoredPlayer>, DbError> {
        let mut conn = self.connection()?;
        let player = schema::players::table
            .filter(schema::players::username.eq(username))
            .select(StoredPlayer::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(player)
    }
}

impl SeriesStore for MatchRepository {
    fn write_series_record(&self, record: &SeriesRecord) -> Result<RecordId, StoreError> {
        let stored = self.write_series(record)?;
        Ok(*stored.id())
    }
}

/// Returns the id of `username`, creating the player on first sight.
fn player_id_for(conn: &mut SqliteConnection, username: &str) -> Result<i32, DbError> {
    let existing = schema::players::table
        .filter(schema::players::username.eq(username))
        .select(schema::players::id)
        .first::<i32>(conn)
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }

    let player = diesel::insert_into(schema::players::table)
        .values(&NewPlayer::new(username.to_string()))
        .returning(StoredPlayer::as_returning())
        .get_result(conn)?;
    debug!(player_id = player.id(), username, "Player created");
    Ok(*player.id())
}

fn to_i32(value: u32, field: &str) -> Result<i32, DbError> {
    i32::try_from(value).map_err(|_| DbError::new(format!("{} out of range: {}", field, value)))
}
