//! Bridges decided live matches into durable storage.

use crate::{
    GameRecord, LiveMatch, LiveMatchEvent, MatchError, RecordId, SeriesRecord, SeriesStore,
    SessionHandle, Slot,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Writes decided series through a [`SeriesStore`].
///
/// A match is finalized at most once. A second request fails with
/// [`MatchError::AlreadyFinalized`], including while the first write is
/// still running. If the write fails the claim is released and the caller
/// may retry.
#[derive(Debug, Clone)]
pub struct MatchFinalizer {
    store: Arc<dyn SeriesStore>,
}

impl MatchFinalizer {
    /// Creates a finalizer writing to `store`.
    pub fn new(store: Arc<dyn SeriesStore>) -> Self {
        Self { store }
    }

    /// Converts the decided match behind `handle` into a [`SeriesRecord`]
    /// and writes it.
    ///
    /// The session lock is held only to claim the match and snapshot its
    /// history; the write itself runs unlocked.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotComplete`], [`MatchError::AlreadyFinalized`], or
    /// [`MatchError::Persistence`] if the store rejects the write.
    #[instrument(skip(self, handle), fields(session_id = %handle.id()))]
    pub fn finalize(&self, handle: &SessionHandle) -> Result<RecordId, MatchError> {
        let record = {
            let mut live = handle.lock();
            live.begin_finalization()?;
            series_record(&live, Utc::now())
        };
        let Some(record) = record else {
            handle.lock().abort_finalization();
            error!("Decided match is missing a player");
            return Err(MatchError::NotComplete(handle.id().clone()));
        };

        match self.store.write_series_record(&record) {
            Ok(record_id) => {
                let mut live = handle.lock();
                live.complete_finalization(record_id);
                handle.emit(LiveMatchEvent::Finalized { record_id });
                info!(record_id, games = record.games().len(), "Series finalized");
                Ok(record_id)
            }
            Err(err) => {
                handle.lock().abort_finalization();
                error!(error = %err, "Failed to write series");
                Err(err.into())
            }
        }
    }
}

/// Builds the storage shape of a decided match.
///
/// Returns `None` unless the series has a winner and both seats are filled.
pub fn series_record(live: &LiveMatch, finished_at: DateTime<Utc>) -> Option<SeriesRecord> {
    let winner = live.series_winner()?;
    let player1 = live.player(Slot::Player1)?.clone();
    let player2 = live.player(Slot::Player2)?.clone();
    let start_time = live.started_at().unwrap_or_else(|| live.created_at());
    let duration_secs = (finished_at - start_time)
        .num_seconds()
        .clamp(0, i64::from(u32::MAX)) as u32;

    let games = live
        .round_history()
        .iter()
        .enumerate()
        .map(|(game_num, round)| {
            GameRecord::new(
                game_num as u32,
                *round.player1_move(),
                *round.player2_move(),
                round.winner(),
            )
        })
        .collect();

    Some(SeriesRecord::new(
        live.id().clone(),
        *live.config(),
        player1,
        player2,
        winner,
        start_time,
        duration_secs,
        games,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MatchConfig, PlayerId};
    use chrono::Duration;
    use rps_rules::Move;

    #[test]
    fn test_series_record_shape() {
        let config = MatchConfig::new(3, false, true).unwrap();
        let mut live = LiveMatch::new("abc".to_string(), config);
        let a = PlayerId::from("alice");
        let b = PlayerId::from("bob");
        live.connect_player(a.clone()).unwrap();
        live.connect_player(b.clone()).unwrap();
        assert!(series_record(&live, Utc::now()).is_none());

        let rounds = [
            (Move::Rock, Move::Rock),
            (Move::Paper, Move::Scissors),
            (Move::Rock, Move::Scissors),
            (Move::Paper, Move::Rock),
        ];
        for (ma, mb) in rounds {
            live.apply_move(&a, ma).unwrap();
            live.apply_move(&b, mb).unwrap();
        }

        let finished = live.started_at().unwrap() + Duration::seconds(42);
        let record = series_record(&live, finished).unwrap();
        assert_eq!(record.session_id(), "abc");
        assert_eq!(*record.winner(), Slot::Player1);
        assert_eq!(record.winner_player(), &a);
        assert_eq!(*record.duration_secs(), 42);
        assert_eq!(record.games().len(), 4);

        let first = record.games()[0];
        assert_eq!(*first.game_num(), 0);
        assert_eq!(*first.winner(), None);
        assert_eq!(*record.games()[1].winner(), Some(Slot::Player2));
        assert_eq!(*record.games()[3].game_num(), 3);
    }
}
