//! Tests for the live match state machine.

use rps_live::{
    LiveMatch, MatchConfig, MatchError, MatchPhase, MoveOutcome, PlayerId, Slot,
};
use rps_rules::{Move, Outcome, RulesError, Ruleset};

fn seated(best_of: u32, extended: bool) -> (LiveMatch, PlayerId, PlayerId) {
    let config = MatchConfig::new(best_of, extended, false).expect("Valid config");
    let mut live = LiveMatch::new("match".to_string(), config);
    let alice = PlayerId::from("alice");
    let bob = PlayerId::from("bob");
    live.connect_player(alice.clone()).expect("Seat alice");
    live.connect_player(bob.clone()).expect("Seat bob");
    (live, alice, bob)
}

fn play(live: &mut LiveMatch, a: &PlayerId, b: &PlayerId, ma: Move, mb: Move) -> MoveOutcome {
    assert_eq!(live.apply_move(a, ma).expect("First move"), MoveOutcome::Waiting);
    live.apply_move(b, mb).expect("Second move")
}

#[test]
fn test_best_of_three_full_series() {
    let (mut live, alice, bob) = seated(3, false);
    assert_eq!(live.phase(), MatchPhase::RoundInProgress);

    let outcome = play(&mut live, &alice, &bob, Move::Rock, Move::Scissors);
    assert!(matches!(outcome, MoveOutcome::RoundResolved { .. }));
    assert_eq!(live.wins(Slot::Player1), 1);

    let outcome = play(&mut live, &alice, &bob, Move::Rock, Move::Paper);
    assert!(matches!(outcome, MoveOutcome::RoundResolved { .. }));
    assert_eq!(live.wins(Slot::Player2), 1);

    let outcome = play(&mut live, &alice, &bob, Move::Paper, Move::Rock);
    match outcome {
        MoveOutcome::SeriesComplete { round, winner } => {
            assert_eq!(winner, Slot::Player1);
            assert_eq!(*round.number(), 3);
            assert_eq!(*round.outcome(), Outcome::Player1Wins);
        }
        other => panic!("Expected series completion, got {:?}", other),
    }

    assert_eq!(live.phase(), MatchPhase::SeriesComplete);
    assert_eq!(live.series_winner_player(), Some(&alice));
    assert_eq!(live.round_history().len(), 3);
    assert_eq!(live.current_move(Slot::Player1), None);
    assert_eq!(live.current_move(Slot::Player2), None);
}

#[test]
fn test_best_of_three_two_straight_wins() {
    let (mut live, alice, bob) = seated(3, false);
    play(&mut live, &alice, &bob, Move::Rock, Move::Scissors);
    let outcome = play(&mut live, &alice, &bob, Move::Paper, Move::Rock);
    assert!(matches!(
        outcome,
        MoveOutcome::SeriesComplete {
            winner: Slot::Player1,
            ..
        }
    ));
    assert_eq!(live.wins(Slot::Player1), 2);
    assert_eq!(live.wins(Slot::Player2), 0);
    assert_eq!(live.round_history().len(), 2);
}

#[test]
fn test_second_mover_resolves_from_its_own_seat() {
    let (mut live, alice, bob) = seated(3, false);
    live.apply_move(&bob, Move::Scissors).expect("Bob moves first");
    let outcome = live.apply_move(&alice, Move::Paper).expect("Alice answers");
    let MoveOutcome::RoundResolved { round } = outcome else {
        panic!("Round should resolve");
    };
    assert_eq!(*round.player1_move(), Move::Paper);
    assert_eq!(*round.player2_move(), Move::Scissors);
    assert_eq!(round.winner(), Some(Slot::Player2));
}

#[test]
fn test_ties_do_not_count_toward_series() {
    let (mut live, alice, bob) = seated(1, false);
    for _ in 0..4 {
        let outcome = play(&mut live, &alice, &bob, Move::Rock, Move::Rock);
        assert!(matches!(outcome, MoveOutcome::RoundResolved { .. }));
    }
    assert_eq!(live.series_winner(), None);
    assert_eq!(live.round_history().len(), 4);
    assert!(live.round_history().iter().all(|r| !r.is_decisive()));

    let outcome = play(&mut live, &alice, &bob, Move::Scissors, Move::Paper);
    assert!(matches!(
        outcome,
        MoveOutcome::SeriesComplete {
            winner: Slot::Player1,
            ..
        }
    ));
}

#[test]
fn test_duplicate_move_rejected_and_state_unchanged() {
    let (mut live, alice, _bob) = seated(3, false);
    live.apply_move(&alice, Move::Rock).expect("First move");
    let result = live.apply_move(&alice, Move::Paper);
    assert_eq!(result, Err(MatchError::DuplicateMove(alice.clone())));
    assert_eq!(live.current_move(Slot::Player1), Some(Move::Rock));
    assert!(live.round_history().is_empty());
}

#[test]
fn test_classic_rejects_extended_moves() {
    let (mut live, alice, _bob) = seated(3, false);
    let result = live.apply_move(&alice, Move::Spock);
    assert_eq!(
        result,
        Err(MatchError::IllegalMove(RulesError::IllegalMove {
            mv: Move::Spock,
            ruleset: Ruleset::Classic,
        }))
    );
    assert_eq!(live.current_move(Slot::Player1), None);
}

#[test]
fn test_extended_mode_accepts_lizard_and_spock() {
    let (mut live, alice, bob) = seated(1, true);
    let outcome = play(&mut live, &alice, &bob, Move::Spock, Move::Lizard);
    assert!(matches!(
        outcome,
        MoveOutcome::SeriesComplete {
            winner: Slot::Player2,
            ..
        }
    ));
}

#[test]
fn test_third_player_is_rejected() {
    let (mut live, _alice, _bob) = seated(3, false);
    let result = live.connect_player(PlayerId::from("carol"));
    assert_eq!(result, Err(MatchError::SessionFull("match".to_string())));
}

#[test]
fn test_reconnect_is_idempotent() {
    let (mut live, alice, _bob) = seated(3, false);
    live.apply_move(&alice, Move::Paper).expect("Move");
    live.disconnect_player(&alice).expect("Disconnect");
    assert!(!live.is_connected(Slot::Player1));
    assert_eq!(live.connected_count(), 1);

    let slot = live.connect_player(alice.clone()).expect("Reconnect");
    assert_eq!(slot, Slot::Player1);
    assert!(live.is_connected(Slot::Player1));
    assert_eq!(live.current_move(Slot::Player1), Some(Move::Paper));

    let again = live.connect_player(alice).expect("Reconnect twice");
    assert_eq!(again, Slot::Player1);
    assert_eq!(live.connected_count(), 2);
}

#[test]
fn test_stranger_cannot_move() {
    let (mut live, _alice, _bob) = seated(3, false);
    let carol = PlayerId::from("carol");
    assert_eq!(
        live.apply_move(&carol, Move::Rock),
        Err(MatchError::PlayerNotInSession(carol))
    );
}

#[test]
fn test_move_before_opponent_joins() {
    let config = MatchConfig::default();
    let mut live = LiveMatch::new("solo".to_string(), config);
    let alice = PlayerId::from("alice");
    live.connect_player(alice.clone()).expect("Seat alice");
    assert_eq!(live.phase(), MatchPhase::AwaitingPlayers);
    assert_eq!(
        live.apply_move(&alice, Move::Rock),
        Err(MatchError::AwaitingOpponent)
    );
    assert!(live.started_at().is_none());
}

#[test]
fn test_moves_after_series_rejected() {
    let (mut live, alice, bob) = seated(1, false);
    play(&mut live, &alice, &bob, Move::Rock, Move::Scissors);
    assert_eq!(
        live.apply_move(&bob, Move::Rock),
        Err(MatchError::SeriesAlreadyComplete)
    );
    assert_eq!(live.round_history().len(), 1);
}

#[test]
fn test_scripted_sequences_keep_tallies_consistent() {
    let moves = [Move::Rock, Move::Paper, Move::Scissors, Move::Lizard, Move::Spock];
    for best_of in [1, 3, 5, 7] {
        for seed in 0..25usize {
            let (mut live, alice, bob) = seated(best_of, true);
            let mut step = 0usize;
            while live.series_winner().is_none() {
                let ma = moves[(seed + step * 3) % 5];
                let mb = moves[(seed * 7 + step) % 5];
                play(&mut live, &alice, &bob, ma, mb);
                step += 1;
                assert!(step < 200, "Series never finished");
            }

            let decisive = live.round_history().iter().filter(|r| r.is_decisive()).count();
            assert!(decisive as u32 <= best_of);
            let p1 = live.wins(Slot::Player1);
            let p2 = live.wins(Slot::Player2);
            assert_eq!((p1 + p2) as usize, decisive);
            assert_eq!(p1.max(p2), best_of / 2 + 1);
            for (i, round) in live.round_history().iter().enumerate() {
                assert_eq!(*round.number() as usize, i + 1);
            }
        }
    }
}
