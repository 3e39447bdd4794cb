//! Tests for finalizing decided matches into storage.

use rps_live::{
    Finalization, InMemorySeriesStore, MatchConfig, MatchError, PlayerId, RecordId,
    SeriesRecord, SeriesStore, SessionHandle, SessionRegistry, Slot, StoreError,
};
use rps_rules::Move;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fails the first `failures` writes, then succeeds.
#[derive(Debug)]
struct FlakyStore {
    failures: AtomicUsize,
    inner: InMemorySeriesStore,
}

impl FlakyStore {
    fn new(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            inner: InMemorySeriesStore::new(),
        }
    }
}

impl SeriesStore for FlakyStore {
    fn write_series_record(&self, record: &SeriesRecord) -> Result<RecordId, StoreError> {
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(StoreError::new("disk unavailable"));
        }
        self.inner.write_series_record(record)
    }
}

fn decided(registry: &SessionRegistry) -> (String, SessionHandle) {
    let id = registry.create(MatchConfig::new(3, false, false).expect("Valid config"));
    let handle = registry.get(&id).expect("Session exists");
    let alice = PlayerId::from("alice");
    let bob = PlayerId::from("bob");
    handle.connect_player(alice.clone()).expect("Seat alice");
    handle.connect_player(bob.clone()).expect("Seat bob");
    for (ma, mb) in [(Move::Rock, Move::Rock), (Move::Rock, Move::Paper)] {
        handle.apply_move(&alice, ma).expect("Alice moves");
        handle.apply_move(&bob, mb).expect("Bob moves");
    }
    handle.apply_move(&alice, Move::Scissors).expect("Alice moves");
    handle.apply_move(&bob, Move::Paper).expect("Bob moves");
    handle.apply_move(&alice, Move::Lizard).unwrap_err();
    handle.apply_move(&alice, Move::Spock).unwrap_err();
    handle.apply_move(&alice, Move::Paper).expect("Alice moves");
    handle.apply_move(&bob, Move::Scissors).expect("Bob moves");
    assert_eq!(handle.snapshot().series_winner(), Some(Slot::Player2));
    (id, handle)
}

#[test]
fn test_finalize_writes_record() {
    let store = Arc::new(InMemorySeriesStore::new());
    let registry = SessionRegistry::new(store.clone());
    let (id, handle) = decided(&registry);

    let record_id = registry.finalize(&id).expect("Finalize");
    assert_eq!(handle.snapshot().finalization(), Finalization::Finalized(record_id));

    let records = store.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.session_id(), &id);
    assert_eq!(*record.winner(), Slot::Player2);
    assert_eq!(record.winner_player().as_str(), "bob");
    assert_eq!(record.games().len(), 4);
    assert_eq!(*record.games()[0].winner(), None);
    assert_eq!(*record.games()[3].player2_move(), Move::Scissors);
    assert!(matches!(registry.get(&id), Err(MatchError::NotFound(_))));
}

#[test]
fn test_finalize_undecided_match_fails() {
    let store = Arc::new(InMemorySeriesStore::new());
    let registry = SessionRegistry::new(store.clone());
    let id = registry.create(MatchConfig::default());

    assert_eq!(registry.finalize(&id), Err(MatchError::NotComplete(id.clone())));
    assert!(store.records().is_empty());
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_finalize_twice_fails_loudly() {
    let store = Arc::new(InMemorySeriesStore::new());
    let registry = SessionRegistry::new(store.clone());
    let (id, handle) = decided(&registry);

    let finalizer = rps_live::MatchFinalizer::new(store.clone());
    finalizer.finalize(&handle).expect("First finalize");
    assert_eq!(
        finalizer.finalize(&handle),
        Err(MatchError::AlreadyFinalized(id))
    );
    assert_eq!(store.records().len(), 1);
}

#[test]
fn test_failed_write_can_be_retried() {
    let store = Arc::new(FlakyStore::new(1));
    let registry = SessionRegistry::new(store.clone());
    let (id, handle) = decided(&registry);

    let first = registry.finalize(&id);
    assert!(matches!(first, Err(MatchError::Persistence(_))));
    assert_eq!(handle.snapshot().finalization(), Finalization::Pending);
    assert_eq!(registry.len(), 1);

    let record_id = registry.finalize(&id).expect("Retry succeeds");
    assert_eq!(record_id, 1);
    assert_eq!(store.inner.records().len(), 1);
    assert!(registry.is_empty());
}
