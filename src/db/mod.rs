//! SQLite persistence for finished matches.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub use error::DbError;
pub use models::{StoredGame, StoredMatch, StoredPlayer, StoredPlayerGame};
pub use repository::MatchRepository;

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
