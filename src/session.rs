//! Live session registry and per-session handles.
//!
//! Two kinds of locks are in play. Each session's [`LiveMatch`] sits behind
//! its own mutex, which serializes the two players' operations. The
//! registry map has a separate mutex that is only ever held for map
//! operations, never while waiting on a session, so one busy session cannot
//! stall lookups of another. The only place both are taken is eviction,
//! always session first.

use crate::{
    LiveMatch, LiveMatchEvent, MatchConfig, MatchError, MatchFinalizer, MatchPhase, MoveOutcome,
    PlayerId, RecordId, SeriesStore, SessionId, Slot,
};
use rps_rules::Move;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Default time a session may sit idle before eviction.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Default per-session event buffer.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

#[derive(Debug)]
struct SessionInner {
    id: SessionId,
    state: Mutex<LiveMatch>,
    events: broadcast::Sender<LiveMatchEvent>,
}

/// Shared, serialized access to one live match.
///
/// Cloning is cheap; all clones refer to the same session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<SessionInner>,
}

impl SessionHandle {
    /// Wraps a live match for shared access.
    pub fn new(live: LiveMatch, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            inner: Arc::new(SessionInner {
                id: live.id().clone(),
                state: Mutex::new(live),
                events,
            }),
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &SessionId {
        &self.inner.id
    }

    /// Seats or reconnects `player`. See [`LiveMatch::connect_player`].
    ///
    /// # Errors
    ///
    /// [`MatchError::SessionFull`] if both seats belong to others.
    #[instrument(skip(self), fields(session_id = %self.id()))]
    pub fn connect_player(&self, player: PlayerId) -> Result<Slot, MatchError> {
        let mut live = self.lock();
        let slot = live.connect_player(player.clone())?;
        self.emit(LiveMatchEvent::PlayerConnected { slot, player });
        Ok(slot)
    }

    /// Marks `player` disconnected. See [`LiveMatch::disconnect_player`].
    ///
    /// # Errors
    ///
    /// [`MatchError::PlayerNotInSession`] if `player` holds no seat.
    #[instrument(skip(self), fields(session_id = %self.id()))]
    pub fn disconnect_player(&self, player: &PlayerId) -> Result<Slot, MatchError> {
        let mut live = self.lock();
        let slot = live.disconnect_player(player)?;
        self.emit(LiveMatchEvent::PlayerDisconnected {
            slot,
            player: player.clone(),
        });
        Ok(slot)
    }

    /// Submits a move. See [`LiveMatch::apply_move`].
    ///
    /// # Errors
    ///
    /// Any move validation error from [`LiveMatch::apply_move`].
    #[instrument(skip(self), fields(session_id = %self.id()))]
    pub fn apply_move(&self, player: &PlayerId, mv: Move) -> Result<MoveOutcome, MatchError> {
        let mut live = self.lock();
        let outcome = live.apply_move(player, mv)?;
        if let Some(slot) = live.slot_of(player) {
            self.emit(LiveMatchEvent::MoveSubmitted { slot });
        }
        match outcome {
            MoveOutcome::Waiting => {}
            MoveOutcome::RoundResolved { round } => {
                self.emit(LiveMatchEvent::RoundResolved { round });
            }
            MoveOutcome::SeriesComplete { round, winner } => {
                self.emit(LiveMatchEvent::RoundResolved { round });
                if let Some(player) = live.player(winner) {
                    self.emit(LiveMatchEvent::SeriesComplete {
                        winner,
                        player: player.clone(),
                    });
                }
            }
        }
        Ok(outcome)
    }

    /// A copy of the current match state.
    pub fn snapshot(&self) -> LiveMatch {
        self.lock().clone()
    }

    /// Subscribes to this session's transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveMatchEvent> {
        self.inner.events.subscribe()
    }

    /// Locks the match. A poisoned lock is recovered: mutations are
    /// all-or-nothing, so the state behind it is still consistent.
    pub(crate) fn lock(&self) -> MutexGuard<'_, LiveMatch> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn emit(&self, event: LiveMatchEvent) {
        // No subscribers is not an error.
        let receivers = self.inner.events.send(event).unwrap_or(0);
        debug!(receivers, "Event emitted");
    }

    fn same_session(&self, other: &SessionHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Tuning for a [`SessionRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Idle time after which abandoned sessions are evicted.
    pub idle_timeout: Duration,
    /// Buffered events per session before slow subscribers lag.
    pub event_capacity: usize,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Maps session identifiers to live matches.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<SessionId, SessionHandle>>>,
    finalizer: MatchFinalizer,
    settings: RegistrySettings,
}

impl SessionRegistry {
    /// Creates a registry with default settings.
    #[instrument(skip(store))]
    pub fn new(store: Arc<dyn SeriesStore>) -> Self {
        Self::with_settings(store, RegistrySettings::default())
    }

    /// Creates a registry with explicit settings.
    #[instrument(skip(store))]
    pub fn with_settings(store: Arc<dyn SeriesStore>, settings: RegistrySettings) -> Self {
        info!(?settings, "Creating session registry");
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            finalizer: MatchFinalizer::new(store),
            settings,
        }
    }

    /// Registry settings.
    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    /// Creates an empty session and returns its fresh identifier.
    #[instrument(skip(self))]
    pub fn create(&self, config: MatchConfig) -> SessionId {
        let mut sessions = self.map();
        let id = loop {
            let candidate = uuid::Uuid::new_v4().simple().to_string();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
            warn!(session_id = %candidate, "Session id collision, regenerating");
        };

        let live = LiveMatch::new(id.clone(), config);
        let handle = SessionHandle::new(live, self.settings.event_capacity);
        sessions.insert(id.clone(), handle);
        info!(session_id = %id, count = sessions.len(), "Session created");
        id
    }

    /// Looks up a session.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotFound`] for an unknown identifier.
    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Result<SessionHandle, MatchError> {
        self.map().get(id).cloned().ok_or_else(|| {
            debug!(session_id = id, "Session not found");
            MatchError::NotFound(id.to_string())
        })
    }

    /// Drops a session, returning its handle if it existed.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &str) -> Option<SessionHandle> {
        let removed = self.map().remove(id);
        if removed.is_some() {
            info!(session_id = id, "Session removed");
        }
        removed
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.map().len()
    }

    /// Returns true if no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }

    /// Public sessions still waiting for a second player.
    #[instrument(skip(self))]
    pub fn open_sessions(&self) -> Vec<SessionId> {
        let mut open: Vec<_> = self
            .handles()
            .into_iter()
            .filter(|handle| {
                let live = handle.lock();
                *live.config().public() && live.phase() == MatchPhase::AwaitingPlayers
            })
            .map(|handle| handle.id().clone())
            .collect();
        open.sort();
        debug!(count = open.len(), "Listed open sessions");
        open
    }

    /// Writes the decided series of session `id` and drops the session.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotFound`] or any error from [`MatchFinalizer::finalize`].
    #[instrument(skip(self))]
    pub fn finalize(&self, id: &str) -> Result<RecordId, MatchError> {
        let handle = self.get(id)?;
        let record_id = self.finalizer.finalize(&handle)?;
        self.remove_if_same(&handle);
        Ok(record_id)
    }

    /// Evicts sessions that have been idle too long.
    pub fn evict_idle(&self) -> Vec<SessionId> {
        self.evict_idle_at(Instant::now())
    }

    /// Evicts sessions idle as of `now`. See [`LiveMatch::is_evictable`].
    #[instrument(skip(self, now))]
    pub fn evict_idle_at(&self, now: Instant) -> Vec<SessionId> {
        let mut evicted = Vec::new();
        for handle in self.handles() {
            let live = handle.lock();
            if !live.is_evictable(now, self.settings.idle_timeout) {
                continue;
            }
            if self.remove_if_same(&handle) {
                warn!(
                    session_id = %handle.id(),
                    phase = %live.phase(),
                    connected = live.connected_count(),
                    "Evicting idle session"
                );
                handle.emit(LiveMatchEvent::Evicted);
                evicted.push(handle.id().clone());
            }
        }
        if !evicted.is_empty() {
            info!(count = evicted.len(), "Idle sessions evicted");
        }
        evicted
    }

    /// Runs [`SessionRegistry::evict_idle`] every `period` on the tokio
    /// runtime until the returned task is aborted.
    #[instrument(skip(self))]
    pub fn spawn_eviction(&self, period: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = registry.evict_idle();
                debug!(evicted = evicted.len(), "Eviction pass complete");
            }
        })
    }

    fn remove_if_same(&self, handle: &SessionHandle) -> bool {
        let mut sessions = self.map();
        let same = sessions
            .get(handle.id())
            .is_some_and(|current| current.same_session(handle));
        if same {
            sessions.remove(handle.id());
        }
        same
    }

    fn handles(&self) -> Vec<SessionHandle> {
        self.map().values().cloned().collect()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<SessionId, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemorySeriesStore;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(Arc::new(InMemorySeriesStore::new()))
    }

    #[test]
    fn test_create_generates_unique_ids() {
        let registry = registry();
        let a = registry.create(MatchConfig::default());
        let b = registry.create(MatchConfig::default());
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_get_unknown_session() {
        let registry = registry();
        assert_eq!(
            registry.get("nope").unwrap_err(),
            MatchError::NotFound("nope".to_string())
        );
    }

    #[test]
    fn test_remove_drops_session() {
        let registry = registry();
        let id = registry.create(MatchConfig::default());
        assert!(registry.remove(&id).is_some());
        assert!(registry.remove(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_handles_share_state() {
        let registry = registry();
        let id = registry.create(MatchConfig::default());
        let first = registry.get(&id).unwrap();
        let second = registry.get(&id).unwrap();
        first.connect_player(PlayerId::from("alice")).unwrap();
        assert_eq!(second.snapshot().connected_count(), 1);
    }

    #[test]
    fn test_open_sessions_lists_public_waiting() {
        let registry = registry();
        let public = registry.create(MatchConfig::new(3, false, true).unwrap());
        let private = registry.create(MatchConfig::new(3, false, false).unwrap());
        let full = registry.create(MatchConfig::new(3, false, true).unwrap());
        let handle = registry.get(&full).unwrap();
        handle.connect_player(PlayerId::from("a")).unwrap();
        handle.connect_player(PlayerId::from("b")).unwrap();

        let open = registry.open_sessions();
        assert_eq!(open, vec![public]);
        assert!(!open.contains(&private));
    }
}
