//! The live match state machine.
//!
//! A [`LiveMatch`] is plain, synchronous state. Every mutating method
//! validates first and mutates second, so an `Err` always leaves the match
//! exactly as it was. Serializing access between the two players' handlers
//! is the job of [`SessionHandle`](crate::SessionHandle).

use super::invariants::assert_invariants;
use super::types::{
    Finalization, MatchConfig, MatchPhase, MoveOutcome, PlayerId, RoundResult, SessionId, Slot,
};
use crate::{MatchError, RecordId};
use chrono::{DateTime, Utc};
use rps_rules::{Move, RulesError, resolve};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// A player's seat in a live match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Seat {
    pub(crate) player: PlayerId,
    pub(crate) connected: bool,
    pub(crate) current_move: Option<Move>,
    pub(crate) wins: u32,
}

impl Seat {
    fn new(player: PlayerId) -> Self {
        Self {
            player,
            connected: false,
            current_move: None,
            wins: 0,
        }
    }
}

/// One in-progress best-of-N series between two players.
#[derive(Debug, Clone)]
pub struct LiveMatch {
    id: SessionId,
    config: MatchConfig,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    pub(crate) seats: [Option<Seat>; 2],
    pub(crate) rounds: Vec<RoundResult>,
    pub(crate) series_winner: Option<Slot>,
    finalization: Finalization,
    last_activity: Instant,
}

impl LiveMatch {
    /// Creates a match with both seats empty.
    #[instrument(skip(config), fields(best_of = config.best_of(), extended = config.extended_mode()))]
    pub fn new(id: SessionId, config: MatchConfig) -> Self {
        debug!(session_id = %id, "Creating live match");
        Self {
            id,
            config,
            created_at: Utc::now(),
            started_at: None,
            seats: [None, None],
            rounds: Vec::new(),
            series_winner: None,
            finalization: Finalization::Pending,
            last_activity: Instant::now(),
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Settings fixed at creation.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// When the session was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the second seat was filled.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Identity seated in `slot`.
    pub fn player(&self, slot: Slot) -> Option<&PlayerId> {
        self.seat(slot).map(|seat| &seat.player)
    }

    /// Whether the player in `slot` is currently connected.
    pub fn is_connected(&self, slot: Slot) -> bool {
        self.seat(slot).is_some_and(|seat| seat.connected)
    }

    /// Number of connected players.
    pub fn connected_count(&self) -> usize {
        Slot::ALL.iter().filter(|slot| self.is_connected(**slot)).count()
    }

    /// The move `slot` has submitted this round, if any.
    ///
    /// Transport layers should not reveal this to the opponent.
    pub fn current_move(&self, slot: Slot) -> Option<Move> {
        self.seat(slot).and_then(|seat| seat.current_move)
    }

    /// Round wins for `slot`.
    pub fn wins(&self, slot: Slot) -> u32 {
        self.seat(slot).map_or(0, |seat| seat.wins)
    }

    /// Every resolved round, oldest first.
    pub fn round_history(&self) -> &[RoundResult] {
        &self.rounds
    }

    /// Slot of the series winner once decided.
    pub fn series_winner(&self) -> Option<Slot> {
        self.series_winner
    }

    /// Identity of the series winner once decided.
    pub fn series_winner_player(&self) -> Option<&PlayerId> {
        self.series_winner.and_then(|slot| self.player(slot))
    }

    /// Persistence progress.
    pub fn finalization(&self) -> Finalization {
        self.finalization
    }

    /// Time of the last successful mutation.
    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// The slot held by `player`.
    pub fn slot_of(&self, player: &PlayerId) -> Option<Slot> {
        Slot::ALL
            .into_iter()
            .find(|slot| self.player(*slot) == Some(player))
    }

    /// True while exactly one player has moved this round.
    pub fn is_round_in_progress(&self) -> bool {
        self.current_move(Slot::Player1).is_some() != self.current_move(Slot::Player2).is_some()
    }

    /// True once both players have moved this round.
    pub fn is_round_complete(&self) -> bool {
        self.current_move(Slot::Player1).is_some() && self.current_move(Slot::Player2).is_some()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> MatchPhase {
        if self.series_winner.is_some() {
            MatchPhase::SeriesComplete
        } else if self.seats.iter().any(Option::is_none) {
            MatchPhase::AwaitingPlayers
        } else if self.is_round_complete() {
            MatchPhase::RoundComplete
        } else {
            MatchPhase::RoundInProgress
        }
    }

    /// Seats `player`, or marks them connected again if already seated.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::SessionFull`] if both seats belong to others.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn connect_player(&mut self, player: PlayerId) -> Result<Slot, MatchError> {
        let slot = match self.slot_of(&player) {
            Some(slot) => {
                debug!(%slot, "Player reconnecting to existing seat");
                slot
            }
            None => {
                let slot = Slot::ALL
                    .into_iter()
                    .find(|slot| self.seat(*slot).is_none())
                    .ok_or_else(|| {
                        warn!(player_id = %player, "Session already has two players");
                        MatchError::SessionFull(self.id.clone())
                    })?;
                info!(player_id = %player, %slot, "Seating player");
                self.seats[slot.index()] = Some(Seat::new(player));
                if self.seats.iter().all(Option::is_some) {
                    self.started_at = Some(Utc::now());
                }
                slot
            }
        };

        if let Some(seat) = self.seat_mut(slot) {
            seat.connected = true;
        }
        self.touch();
        assert_invariants(self);
        Ok(slot)
    }

    /// Marks `player` disconnected. The seat is kept for reconnection.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::PlayerNotInSession`] if `player` holds no seat.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn disconnect_player(&mut self, player: &PlayerId) -> Result<Slot, MatchError> {
        let slot = self.require_slot(player)?;
        if let Some(seat) = self.seat_mut(slot) {
            seat.connected = false;
        }
        info!(%slot, "Player disconnected");
        self.touch();
        Ok(slot)
    }

    /// Records `mv` for `player`, resolving the round once both have moved.
    ///
    /// # Errors
    ///
    /// Checked in this order: [`MatchError::PlayerNotInSession`],
    /// [`MatchError::IllegalMove`], [`MatchError::SeriesAlreadyComplete`],
    /// [`MatchError::AwaitingOpponent`], [`MatchError::DuplicateMove`].
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn apply_move(&mut self, player: &PlayerId, mv: Move) -> Result<MoveOutcome, MatchError> {
        let slot = self.require_slot(player)?;

        let ruleset = self.config.ruleset();
        if !ruleset.allows(mv) {
            warn!(%mv, %ruleset, "Move outside ruleset");
            return Err(RulesError::IllegalMove { mv, ruleset }.into());
        }
        if self.series_winner.is_some() {
            return Err(MatchError::SeriesAlreadyComplete);
        }
        if self.seat(slot.other()).is_none() {
            return Err(MatchError::AwaitingOpponent);
        }
        if self.current_move(slot).is_some() {
            warn!(%slot, "Duplicate move this round");
            return Err(MatchError::DuplicateMove(player.clone()));
        }

        // Resolve before mutating so a resolver failure leaves the round untouched.
        let resolved = match self.current_move(slot.other()) {
            Some(other) => {
                let (first, second) = match slot {
                    Slot::Player1 => (mv, other),
                    Slot::Player2 => (other, mv),
                };
                Some((first, second, resolve(ruleset, first, second)?))
            }
            None => None,
        };

        self.touch();
        let outcome = match resolved {
            None => {
                if let Some(seat) = self.seat_mut(slot) {
                    seat.current_move = Some(mv);
                }
                debug!(%slot, "Move recorded, waiting for opponent");
                MoveOutcome::Waiting
            }
            Some((first, second, outcome)) => {
                let round = RoundResult::new(self.rounds.len() as u32 + 1, first, second, outcome);
                self.finish_round(round)
            }
        };
        assert_invariants(self);
        Ok(outcome)
    }

    /// Returns true if the registry may drop this session.
    ///
    /// A session qualifies once it has been idle for at least `idle_timeout`
    /// and either has fewer than two connected players or holds a decided
    /// series. Sessions with a write in flight are never evictable.
    pub fn is_evictable(&self, now: Instant, idle_timeout: Duration) -> bool {
        if now.saturating_duration_since(self.last_activity) < idle_timeout {
            return false;
        }
        match self.finalization {
            Finalization::InFlight => false,
            Finalization::Finalized(_) => true,
            Finalization::Pending => self.connected_count() < 2 || self.series_winner.is_some(),
        }
    }

    /// Claims the match for finalization.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotComplete`] before the series is decided,
    /// [`MatchError::AlreadyFinalized`] if a write is running or done.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub(crate) fn begin_finalization(&mut self) -> Result<(), MatchError> {
        if self.series_winner.is_none() {
            return Err(MatchError::NotComplete(self.id.clone()));
        }
        match self.finalization {
            Finalization::Pending => {
                self.finalization = Finalization::InFlight;
                Ok(())
            }
            Finalization::InFlight | Finalization::Finalized(_) => {
                warn!(finalization = ?self.finalization, "Finalize requested twice");
                Err(MatchError::AlreadyFinalized(self.id.clone()))
            }
        }
    }

    /// Records a successful write.
    pub(crate) fn complete_finalization(&mut self, record_id: RecordId) {
        assert!(
            self.finalization == Finalization::InFlight,
            "finalization completed without being claimed"
        );
        self.finalization = Finalization::Finalized(record_id);
        self.touch();
    }

    /// Releases the claim after a failed write so it can be retried.
    pub(crate) fn abort_finalization(&mut self) {
        if self.finalization == Finalization::InFlight {
            self.finalization = Finalization::Pending;
        }
    }

    fn finish_round(&mut self, round: RoundResult) -> MoveOutcome {
        self.rounds.push(round);
        for seat in self.seats.iter_mut().flatten() {
            seat.current_move = None;
        }

        let Some(winner) = round.winner() else {
            info!(round = round.number(), "Round tied");
            return MoveOutcome::RoundResolved { round };
        };

        let wins_needed = self.config.wins_needed();
        let wins = match self.seat_mut(winner) {
            Some(seat) => {
                seat.wins += 1;
                seat.wins
            }
            None => 0,
        };
        let (won, lost) = match winner {
            Slot::Player1 => (*round.player1_move(), *round.player2_move()),
            Slot::Player2 => (*round.player2_move(), *round.player1_move()),
        };
        info!(
            round = round.number(),
            winner = %winner,
            "{} {} {}",
            won,
            won.verb(lost).unwrap_or("beats"),
            lost
        );
        debug!(
            player1_move = %round.player1_move(),
            player2_move = %round.player2_move(),
            wins,
            "Round resolved"
        );

        if wins >= wins_needed {
            self.series_winner = Some(winner);
            info!(winner = %winner, rounds = self.rounds.len(), "Series decided");
            MoveOutcome::SeriesComplete { round, winner }
        } else {
            MoveOutcome::RoundResolved { round }
        }
    }

    fn require_slot(&self, player: &PlayerId) -> Result<Slot, MatchError> {
        self.slot_of(player).ok_or_else(|| {
            warn!(player_id = %player, "Unknown player");
            MatchError::PlayerNotInSession(player.clone())
        })
    }

    fn seat(&self, slot: Slot) -> Option<&Seat> {
        self.seats[slot.index()].as_ref()
    }

    fn seat_mut(&mut self, slot: Slot) -> Option<&mut Seat> {
        self.seats[slot.index()].as_mut()
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}
