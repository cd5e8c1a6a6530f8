//! Round state machine integration tests.
//!
//! These drive full rounds through the public API with the real timeline
//! (preview, flip settling, mismatch delay) and check the events the
//! presentation layer would see.

use std::cell::RefCell;
use std::rc::Rc;

use memory_match::core::{DifficultyId, Orientation, PairId, RoundConfig, RoundTimings};
use memory_match::difficulty::DifficultyPolicy;
use memory_match::round::{
    Activation, IgnoreReason, RoundEvent, RoundEventKind, RoundObserver, RoundSnapshot,
    RoundState, RoundStateMachine,
};
use memory_match::scoring::{KeyValueStore, MemoryStore};

/// Medium deck where positions 0 and 4 match and positions 1 and 2 differ.
const MEDIUM_DECK: [u32; 16] = [0, 1, 2, 3, 0, 1, 2, 3, 4, 5, 6, 7, 4, 5, 6, 7];

/// Lead-in 500 + flip 320 + dwell 1000 + flip 320.
const PREVIEW_MS: u64 = 2140;
const FLIP_MS: u64 = 320;

fn pair_ids(raw: &[u32]) -> Vec<PairId> {
    raw.iter().copied().map(PairId::new).collect()
}

fn medium_round() -> RoundStateMachine<MemoryStore> {
    let mut round = RoundStateMachine::new(MemoryStore::new());
    let config = DifficultyPolicy::default().round_config(DifficultyId::Medium);
    round
        .configure_round_with_deck(config, &pair_ids(&MEDIUM_DECK))
        .unwrap();
    round
}

fn medium_round_in_play() -> RoundStateMachine<MemoryStore> {
    let mut round = medium_round();
    round.advance_ms(PREVIEW_MS);
    assert_eq!(round.state(), RoundState::Idle);
    round.drain_events();
    round
}

/// Select two cards with the default timeline, waiting for each flip.
fn select_pair(round: &mut RoundStateMachine<MemoryStore>, a: usize, b: usize) {
    assert_eq!(round.on_card_activated(a), Activation::FirstSelected);
    round.advance_ms(FLIP_MS);
    assert_eq!(round.state(), RoundState::OneSelected);
    assert_eq!(round.on_card_activated(b), Activation::SecondSelected);
    round.advance_ms(FLIP_MS);
}

fn face_up(round: &RoundStateMachine<MemoryStore>, position: usize) -> bool {
    round.deck().get(position).unwrap().is_face_up()
}

fn count_kind(events: &[RoundEvent], kind: RoundEventKind) -> usize {
    events.iter().filter(|e| e.kind() == kind).count()
}

#[test]
fn test_preview_reveals_then_hides_every_card() {
    let mut round = medium_round();
    assert_eq!(round.state(), RoundState::Preview);
    assert_eq!(
        round.on_card_activated(0),
        Activation::Ignored(IgnoreReason::Preview)
    );
    assert!(!round.pause(), "preview cannot be paused");

    round.advance_ms(500);
    assert!((0..16).all(|p| face_up(&round, p)));

    round.advance_ms(PREVIEW_MS - 501);
    assert_eq!(round.state(), RoundState::Preview);
    assert!((0..16).all(|p| !face_up(&round, p)));

    round.advance_ms(1);
    assert_eq!(round.state(), RoundState::Idle);
    assert_eq!(round.progress().elapsed_seconds, 0);

    let events = round.drain_events();
    assert!(matches!(
        events[0],
        RoundEvent::RoundStarted {
            cols: 4,
            rows: 4,
            total_pairs: 8
        }
    ));
    assert_eq!(count_kind(&events, RoundEventKind::CardFlipped), 32);
    assert_eq!(events.last(), Some(&RoundEvent::PreviewPhaseEnded));
}

#[test]
fn test_medium_scenario_match_then_mismatch() {
    let mut round = medium_round_in_play();

    // Match: 0 and 4 share a pair.
    select_pair(&mut round, 0, 4);
    let events = round.drain_events();
    assert!(events.contains(&RoundEvent::CardMatched { position: 0 }));
    assert!(events.contains(&RoundEvent::CardMatched { position: 4 }));
    assert_eq!(round.progress().matches, 1);
    assert_eq!(round.progress().turns, 1);
    assert_eq!(round.state(), RoundState::Idle);

    // Mismatch: 1 and 2 differ.
    select_pair(&mut round, 1, 2);
    let events = round.drain_events();
    assert!(events.contains(&RoundEvent::MismatchDetected { first: 1, second: 2 }));
    assert!(events.contains(&RoundEvent::TurnResolved {
        turns: 2,
        matches: 1,
        total_pairs: 8
    }));
    assert_eq!(round.state(), RoundState::Resolving);

    // Still visible until the Medium delay has passed.
    round.advance_ms(999);
    assert!(face_up(&round, 1) && face_up(&round, 2));

    round.advance_ms(1);
    assert!(!face_up(&round, 1) && !face_up(&round, 2));
    assert!(!round.deck().get(1).unwrap().is_matched());
    assert!(!round.deck().get(2).unwrap().is_matched());
    assert_eq!(round.first_selected(), None);
    assert_eq!(round.second_selected(), None);

    // Input stays locked until the flip-down settles.
    assert_eq!(
        round.on_card_activated(3),
        Activation::Ignored(IgnoreReason::Resolving)
    );
    round.advance_ms(FLIP_MS);
    assert_eq!(round.state(), RoundState::Idle);

    assert_eq!(round.progress().turns, 2);
    assert_eq!(round.progress().matches, 1);
}

#[test]
fn test_first_card_locks_input_until_settled() {
    let mut round = medium_round_in_play();

    round.on_card_activated(0);
    assert_eq!(round.state(), RoundState::Resolving);
    assert_eq!(
        round.on_card_activated(4),
        Activation::Ignored(IgnoreReason::Resolving)
    );
    round.advance_ms(FLIP_MS);
    assert_eq!(round.state(), RoundState::OneSelected);
}

#[test]
fn test_matched_and_reselected_cards_never_count() {
    let mut round = medium_round_in_play();
    select_pair(&mut round, 0, 4);

    assert_eq!(
        round.on_card_activated(0),
        Activation::Ignored(IgnoreReason::AlreadyMatched)
    );

    round.on_card_activated(1);
    round.advance_ms(FLIP_MS);
    assert_eq!(
        round.on_card_activated(1),
        Activation::Ignored(IgnoreReason::AlreadyFaceUp)
    );
    assert_eq!(round.progress().turns, 1);
    assert_eq!(round.progress().matches, 1);
    assert_eq!(round.first_selected(), Some(1));
}

#[test]
fn test_debounce_drops_rapid_second_tap() {
    let mut round = RoundStateMachine::new(MemoryStore::new());
    let config = RoundConfig::new(4, 4, DifficultyId::Medium, 1000)
        .with_timings(RoundTimings::instant().with_debounce_ms(150));
    round
        .configure_round_with_deck(config, &pair_ids(&MEDIUM_DECK))
        .unwrap();

    assert_eq!(round.on_card_activated(0), Activation::FirstSelected);
    assert_eq!(round.state(), RoundState::OneSelected);

    round.advance_ms(149);
    assert_eq!(
        round.on_card_activated(4),
        Activation::Ignored(IgnoreReason::Debounced)
    );

    round.advance_ms(1);
    assert_eq!(round.on_card_activated(4), Activation::SecondSelected);
    assert_eq!(round.progress().matches, 1);
}

#[test]
fn test_pause_preserves_mismatch_delay() {
    let mut round = medium_round_in_play();
    select_pair(&mut round, 1, 2);

    round.advance_ms(400);
    assert!(round.pause());
    assert!(round.is_paused());
    assert!(!round.pause());
    assert_eq!(
        round.on_card_activated(5),
        Activation::Ignored(IgnoreReason::Paused)
    );

    round.advance_ms(10_000);
    assert!(face_up(&round, 1) && face_up(&round, 2));
    assert_eq!(round.state(), RoundState::Resolving);

    assert!(round.resume());
    round.advance_ms(599);
    assert!(face_up(&round, 1));
    round.advance_ms(1);
    assert!(!face_up(&round, 1));

    let events = round.drain_events();
    assert!(events.contains(&RoundEvent::PauseChanged { paused: true }));
    assert!(events.contains(&RoundEvent::PauseChanged { paused: false }));
}

#[test]
fn test_pause_keeps_selection() {
    let mut round = medium_round_in_play();
    round.on_card_activated(3);
    round.advance_ms(FLIP_MS);

    round.pause();
    round.advance_ms(5000);
    round.resume();

    assert_eq!(round.state(), RoundState::OneSelected);
    assert_eq!(round.first_selected(), Some(3));
    assert_eq!(round.on_card_activated(7), Activation::SecondSelected);
}

#[test]
fn test_elapsed_time_freezes_while_paused() {
    let mut round = medium_round_in_play();

    round.advance_ms(2500);
    assert_eq!(round.progress().elapsed_seconds, 2);

    round.pause();
    round.advance_ms(10_000);
    assert_eq!(round.progress().elapsed_seconds, 2);

    round.resume();
    round.advance_ms(600);
    assert_eq!(round.progress().elapsed_seconds, 3);
}

#[test]
fn test_tick_uses_seconds() {
    let mut round = medium_round();
    // 2250ms: the preview ends at 2140, then 110ms of play.
    round.tick(2.25);
    assert_eq!(round.state(), RoundState::Idle);

    round.tick(1.5);
    assert_eq!(round.progress().elapsed_seconds, 1);

    // Nonsense deltas are ignored.
    round.tick(-3.0);
    round.tick(f64::NAN);
    assert_eq!(round.progress().elapsed_seconds, 1);
}

#[test]
fn test_teardown_cancels_pending_mismatch() {
    let mut round = medium_round_in_play();
    select_pair(&mut round, 1, 2);
    assert!(round.pending_callbacks() > 0);

    round.teardown();
    assert_eq!(round.pending_callbacks(), 0);
    assert_eq!(round.state(), RoundState::Inactive);
    assert!(round.deck().is_empty());
    round.drain_events();

    round.advance_ms(60_000);
    assert!(round.drain_events().is_empty());
    assert_eq!(
        round.on_card_activated(0),
        Activation::Ignored(IgnoreReason::NoRound)
    );
    assert!(!round.restart());
}

#[test]
fn test_restart_redeals_and_replays_preview() {
    let mut round = RoundStateMachine::new(MemoryStore::new());
    let config = DifficultyPolicy::default()
        .round_config(DifficultyId::Hard)
        .with_seed(7);
    round.configure_round(config).unwrap();
    round.advance_ms(PREVIEW_MS);
    round.on_card_activated(0);
    round.advance_ms(FLIP_MS);
    round.drain_events();

    assert!(round.restart());
    assert_eq!(round.state(), RoundState::Preview);
    assert_eq!(round.progress().turns, 0);
    assert_eq!(round.first_selected(), None);
    assert_eq!(round.deck().len(), 20);
    assert!(round.deck().iter().all(|c| !c.is_face_up()));
    // Only the preview lead-in is pending; the old flip is gone.
    assert_eq!(round.pending_callbacks(), 1);

    let events = round.drain_events();
    assert!(matches!(
        events[0],
        RoundEvent::RoundStarted {
            cols: 5,
            rows: 4,
            total_pairs: 10
        }
    ));
}

#[test]
fn test_seeded_rounds_deal_identically() {
    let config = DifficultyPolicy::default()
        .round_config(DifficultyId::Medium)
        .with_seed(1234);

    let mut a = RoundStateMachine::new(MemoryStore::new());
    let mut b = RoundStateMachine::new(MemoryStore::new());
    a.configure_round(config.clone()).unwrap();
    b.configure_round(config).unwrap();

    let ids_a: Vec<PairId> = a.deck().iter().map(|c| c.pair_id).collect();
    let ids_b: Vec<PairId> = b.deck().iter().map(|c| c.pair_id).collect();
    assert_eq!(ids_a, ids_b);
    assert_eq!(a.rng_state(), b.rng_state());
}

#[test]
fn test_configuration_errors_prevent_start() {
    let mut round = RoundStateMachine::new(MemoryStore::new());

    assert!(round
        .configure_round(RoundConfig::new(0, 4, DifficultyId::Easy, 800))
        .is_err());
    assert!(round
        .configure_round(RoundConfig::new(5, 3, DifficultyId::Easy, 800))
        .is_err());

    let config = RoundConfig::new(2, 2, DifficultyId::Easy, 800);
    assert!(round
        .configure_round_with_deck(config, &pair_ids(&[0, 0, 0, 1]))
        .is_err());

    assert_eq!(round.state(), RoundState::Inactive);
    assert!(round.drain_events().is_empty());
}

#[test]
fn test_full_round_wins_once_and_records_best() {
    let mut round = RoundStateMachine::new(MemoryStore::new());
    let config = RoundConfig::new(4, 4, DifficultyId::Medium, 1000)
        .with_timings(RoundTimings::instant());
    round
        .configure_round_with_deck(config, &pair_ids(&MEDIUM_DECK))
        .unwrap();
    round.drain_events();

    // One miss, then every pair.
    round.on_card_activated(0);
    round.on_card_activated(1);
    round.advance_ms(1000);
    for (a, b) in [(0, 4), (1, 5), (2, 6), (3, 7), (8, 12), (9, 13), (10, 14)] {
        round.on_card_activated(a);
        round.on_card_activated(b);
        round.advance_ms(2000);
    }
    assert_eq!(round.state(), RoundState::Idle);
    round.on_card_activated(11);
    round.on_card_activated(15);

    assert_eq!(round.state(), RoundState::Won);
    assert_eq!(round.progress().matches, 8);
    assert_eq!(round.progress().turns, 9);
    assert_eq!(round.progress().elapsed_seconds, 15);

    // Nothing moves after the win.
    round.advance_ms(10_000);
    assert_eq!(round.progress().elapsed_seconds, 15);
    assert!(!round.pause());
    assert_eq!(
        round.on_card_activated(0),
        Activation::Ignored(IgnoreReason::Won)
    );

    let events = round.drain_events();
    assert_eq!(count_kind(&events, RoundEventKind::RoundWon), 1);
    let summary = events
        .iter()
        .find_map(|e| match e {
            RoundEvent::RoundWon(summary) => Some(*summary),
            _ => None,
        })
        .unwrap();
    assert_eq!(summary.turns, 9);
    assert_eq!(summary.elapsed_seconds, 15);
    assert_eq!(summary.difficulty, DifficultyId::Medium);
    assert_eq!(summary.stars, 3);
    assert!(summary.is_new_best);
    assert_eq!(summary.best_moves, 9);
    assert_eq!(summary.best_time_seconds, 15);

    let store = round.recorder().store();
    assert_eq!(store.get("bestMoves_medium").as_deref(), Some("9"));
    assert_eq!(store.get("bestTime_medium").as_deref(), Some("15"));
}

#[test]
fn test_observers_receive_only_subscribed_kinds() {
    let mut round = RoundStateMachine::new(MemoryStore::new());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let observer: Box<dyn RoundObserver> =
        Box::new(move |e: &RoundEvent| sink.borrow_mut().push(e.kind()));
    let id = round.subscribe(
        &[RoundEventKind::CardMatched, RoundEventKind::PreviewPhaseEnded],
        observer,
    );

    let config = RoundConfig::new(4, 4, DifficultyId::Medium, 1000)
        .with_timings(RoundTimings::instant());
    round
        .configure_round_with_deck(config.clone(), &pair_ids(&MEDIUM_DECK))
        .unwrap();
    round.on_card_activated(0);
    round.on_card_activated(4);

    assert_eq!(
        *seen.borrow(),
        vec![
            RoundEventKind::PreviewPhaseEnded,
            RoundEventKind::CardMatched,
            RoundEventKind::CardMatched,
        ]
    );

    assert!(round.unsubscribe(id));
    round
        .configure_round_with_deck(config, &pair_ids(&MEDIUM_DECK))
        .unwrap();
    assert_eq!(seen.borrow().len(), 3);
}

#[test]
fn test_snapshot_serializes() {
    let mut round = medium_round_in_play();
    round.on_card_activated(0);

    let snapshot = round.snapshot();
    assert_eq!(snapshot.state, RoundState::Resolving);
    assert_eq!(snapshot.difficulty, Some(DifficultyId::Medium));
    assert_eq!(snapshot.cards.len(), 16);
    assert_eq!(snapshot.cards[0].orientation, Orientation::FaceUp);
    assert_eq!(snapshot.first_selected, Some(0));

    let json = serde_json::to_string(&snapshot).unwrap();
    let restored: RoundSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, snapshot);
}
