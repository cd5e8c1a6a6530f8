//! The round state machine.
//!
//! Owns the deck and drives it through the turn protocol:
//!
//! ```text
//! Preview -> Idle -> Resolving -> OneSelected -> Resolving -> Idle ... -> Won
//!                    (first flip)                (second flip, compare)
//! ```
//!
//! Everything that takes time (flip animations settling, the preview dwell,
//! the mismatch delay) is a deferred callback on the round's [`Scheduler`].
//! The host advances time with [`tick`](RoundStateMachine::tick); pausing
//! simply stops the scheduler clock, so pending callbacks and the elapsed
//! counter resume exactly where they stopped.
//!
//! ## Example
//!
//! ```
//! use memory_match::core::{DifficultyId, PairId, RoundTimings};
//! use memory_match::difficulty::DifficultyPolicy;
//! use memory_match::round::{RoundState, RoundStateMachine};
//! use memory_match::scoring::MemoryStore;
//!
//! let mut round = RoundStateMachine::new(MemoryStore::new());
//! let config = DifficultyPolicy::default()
//!     .round_config(DifficultyId::Easy)
//!     .with_timings(RoundTimings::instant());
//! let deck: Vec<PairId> = [0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5]
//!     .into_iter()
//!     .map(PairId::new)
//!     .collect();
//! round.configure_round_with_deck(config, &deck).unwrap();
//!
//! // Instant timings finish the preview immediately.
//! assert_eq!(round.state(), RoundState::Idle);
//!
//! for pair in 0..6 {
//!     round.on_card_activated(pair * 2);
//!     round.on_card_activated(pair * 2 + 1);
//! }
//! assert_eq!(round.state(), RoundState::Won);
//! assert_eq!(round.progress().turns, 6);
//! ```

use crate::core::{
    ConfigError, Deck, DifficultyId, GameRng, GameRngState, Orientation, PairId, RoundConfig,
};
use crate::difficulty::DifficultyPolicy;
use crate::scoring::{KeyValueStore, ScoreRecorder};

use super::event::{EventBus, RoundEvent, RoundEventKind, RoundObserver, RoundSummary, SubscriptionId};
use super::scheduler::Scheduler;
use super::state::{Activation, IgnoreReason, RoundProgress, RoundSnapshot, RoundState};

/// Deferred work the round schedules for itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Deferred {
    /// Lead-in over: turn every card face-up.
    PreviewReveal,
    /// Dwell over: turn every card face-down.
    PreviewHide,
    /// Preview cards settled face-down: play begins.
    PreviewEnd,
    FirstRevealSettled,
    SecondRevealSettled,
    /// Mismatch delay over: turn the pair back down.
    MismatchExpired,
    MismatchHideSettled,
}

/// Round state machine and matching engine.
///
/// Generic over the key-value store used to persist best records.
pub struct RoundStateMachine<S> {
    policy: DifficultyPolicy,
    recorder: ScoreRecorder<S>,
    events: EventBus,

    config: Option<RoundConfig>,
    deck: Deck,
    rng: GameRng,

    state: RoundState,
    paused: bool,
    progress: RoundProgress,
    first_selected: Option<usize>,
    second_selected: Option<usize>,

    /// Round clock. Frozen while paused.
    scheduler: Scheduler<Deferred>,
    /// Host clock. Always advances; used for input debounce.
    wall_clock_ms: u64,
    last_accepted_ms: Option<u64>,
    /// Round clock reading when the preview ended.
    play_started_ms: Option<u64>,
    /// Sub-millisecond carry from fractional ticks.
    tick_carry_ms: f64,
}

impl<S: KeyValueStore> RoundStateMachine<S> {
    /// Create an idle machine with the default difficulty table.
    pub fn new(store: S) -> Self {
        Self::with_policy(DifficultyPolicy::default(), store)
    }

    /// Create an idle machine with a custom difficulty table.
    pub fn with_policy(policy: DifficultyPolicy, store: S) -> Self {
        Self {
            policy,
            recorder: ScoreRecorder::new(store),
            events: EventBus::new(),
            config: None,
            deck: Deck::default(),
            rng: GameRng::new(0),
            state: RoundState::Inactive,
            paused: false,
            progress: RoundProgress::default(),
            first_selected: None,
            second_selected: None,
            scheduler: Scheduler::new(),
            wall_clock_ms: 0,
            last_accepted_ms: None,
            play_started_ms: None,
            tick_carry_ms: 0.0,
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn state(&self) -> RoundState {
        self.state
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn progress(&self) -> RoundProgress {
        self.progress
    }

    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    #[must_use]
    pub fn config(&self) -> Option<&RoundConfig> {
        self.config.as_ref()
    }

    #[must_use]
    pub fn policy(&self) -> &DifficultyPolicy {
        &self.policy
    }

    #[must_use]
    pub fn first_selected(&self) -> Option<usize> {
        self.first_selected
    }

    #[must_use]
    pub fn second_selected(&self) -> Option<usize> {
        self.second_selected
    }

    #[must_use]
    pub fn recorder(&self) -> &ScoreRecorder<S> {
        &self.recorder
    }

    /// Dealing RNG state, for replaying the next restart's deal.
    #[must_use]
    pub fn rng_state(&self) -> GameRngState {
        self.rng.state()
    }

    /// Number of deferred callbacks still pending.
    #[must_use]
    pub fn pending_callbacks(&self) -> usize {
        self.scheduler.pending_count()
    }

    #[must_use]
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            state: self.state,
            paused: self.paused,
            difficulty: self.config.as_ref().map(|c| c.difficulty),
            cols: self.config.as_ref().map_or(0, |c| c.cols),
            rows: self.config.as_ref().map_or(0, |c| c.rows),
            progress: self.progress,
            cards: self.deck.cards().to_vec(),
            first_selected: self.first_selected,
            second_selected: self.second_selected,
        }
    }

    // === Events ===

    /// Register an observer for specific event kinds.
    pub fn subscribe(
        &mut self,
        kinds: &[RoundEventKind],
        observer: Box<dyn RoundObserver>,
    ) -> SubscriptionId {
        self.events.subscribe(kinds, observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        self.events.drain()
    }

    // === Configuration ===

    /// Deal a fresh shuffled deck and start the preview.
    pub fn configure_round(&mut self, config: RoundConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let mut rng = config.seed.map_or_else(GameRng::from_entropy, GameRng::new);
        let ids = rng.shuffled_pairs(config.total_pairs());
        let deck = Deck::from_pair_ids(&ids)?;
        self.rng = rng;
        self.begin(config, deck);
        Ok(())
    }

    /// Start a round with a known deck order (row-major pair IDs).
    pub fn configure_round_with_deck(
        &mut self,
        config: RoundConfig,
        pair_ids: &[PairId],
    ) -> Result<(), ConfigError> {
        config.validate()?;
        if pair_ids.len() != config.card_count() {
            return Err(ConfigError::InvalidDeck(format!(
                "expected {} cards for a {}x{} grid, got {}",
                config.card_count(),
                config.cols,
                config.rows,
                pair_ids.len()
            )));
        }
        let deck = Deck::from_pair_ids(pair_ids)?;
        self.rng = config.seed.map_or_else(GameRng::from_entropy, GameRng::new);
        self.begin(config, deck);
        Ok(())
    }

    /// Start a round at a difficulty using the policy's parameters.
    pub fn configure_difficulty(&mut self, difficulty: DifficultyId) -> Result<(), ConfigError> {
        let config = self.policy.round_config(difficulty);
        self.configure_round(config)
    }

    /// Re-deal with the current configuration and replay the preview.
    ///
    /// Returns false if no round is configured.
    pub fn restart(&mut self) -> bool {
        let Some(config) = self.config.clone() else {
            return false;
        };
        let ids = self.rng.shuffled_pairs(config.total_pairs());
        match Deck::from_pair_ids(&ids) {
            Ok(deck) => {
                log::debug!("restarting {} round", config.difficulty);
                self.begin(config, deck);
                true
            }
            Err(err) => {
                log::warn!("restart failed: {}", err);
                false
            }
        }
    }

    /// Cancel every pending callback and discard the deck.
    ///
    /// After teardown every input is a no-op until the next configure.
    /// An active pause is lifted and reported.
    pub fn teardown(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        if cancelled > 0 {
            log::debug!("teardown cancelled {} pending callbacks", cancelled);
        }
        if self.paused {
            self.events.publish(RoundEvent::PauseChanged { paused: false });
        }
        self.config = None;
        self.deck = Deck::default();
        self.state = RoundState::Inactive;
        self.paused = false;
        self.progress = RoundProgress::default();
        self.first_selected = None;
        self.second_selected = None;
        self.last_accepted_ms = None;
        self.play_started_ms = None;
    }

    fn begin(&mut self, config: RoundConfig, deck: Deck) {
        self.teardown();

        log::info!(
            "starting {} round: {}x{} grid, {} pairs",
            config.difficulty,
            config.cols,
            config.rows,
            deck.total_pairs()
        );

        self.progress = RoundProgress {
            total_pairs: deck.total_pairs(),
            ..RoundProgress::default()
        };
        self.deck = deck;
        self.state = RoundState::Preview;
        self.scheduler
            .schedule(config.timings.preview_lead_in_ms, Deferred::PreviewReveal);
        self.events.publish(RoundEvent::RoundStarted {
            cols: config.cols,
            rows: config.rows,
            total_pairs: self.progress.total_pairs,
        });
        self.config = Some(config);

        self.run_due(self.scheduler.now_ms());
    }

    // === Input ===

    /// Deliver a card tap.
    ///
    /// Taps that are not legal right now are ignored; the returned
    /// [`Activation`] says why.
    pub fn on_card_activated(&mut self, position: usize) -> Activation {
        let outcome = self.try_activate(position);
        if let Activation::Ignored(reason) = outcome {
            log::debug!("ignored activation of card {}: {:?}", position, reason);
        }
        outcome
    }

    fn try_activate(&mut self, position: usize) -> Activation {
        let Some(config) = self.config.as_ref() else {
            return Activation::Ignored(IgnoreReason::NoRound);
        };
        let timings = config.timings;

        if self.paused {
            return Activation::Ignored(IgnoreReason::Paused);
        }
        match self.state {
            RoundState::Idle | RoundState::OneSelected => {}
            RoundState::Inactive => return Activation::Ignored(IgnoreReason::NoRound),
            RoundState::Preview => return Activation::Ignored(IgnoreReason::Preview),
            RoundState::Resolving => return Activation::Ignored(IgnoreReason::Resolving),
            RoundState::Won => return Activation::Ignored(IgnoreReason::Won),
        }

        let Some(card) = self.deck.get(position) else {
            return Activation::Ignored(IgnoreReason::OutOfRange);
        };
        if card.is_matched() {
            return Activation::Ignored(IgnoreReason::AlreadyMatched);
        }
        // Also covers re-tapping the first selected card.
        if card.is_face_up() {
            return Activation::Ignored(IgnoreReason::AlreadyFaceUp);
        }
        if let Some(last) = self.last_accepted_ms {
            if self.wall_clock_ms.saturating_sub(last) < u64::from(timings.debounce_ms) {
                return Activation::Ignored(IgnoreReason::Debounced);
            }
        }

        self.last_accepted_ms = Some(self.wall_clock_ms);
        self.flip(position, Orientation::FaceUp);
        self.state = RoundState::Resolving;

        let outcome = if self.first_selected.is_none() {
            self.first_selected = Some(position);
            self.scheduler
                .schedule(timings.flip_ms, Deferred::FirstRevealSettled);
            Activation::FirstSelected
        } else {
            self.second_selected = Some(position);
            self.progress.turns += 1;
            self.scheduler
                .schedule(timings.flip_ms, Deferred::SecondRevealSettled);
            Activation::SecondSelected
        };

        self.run_due(self.scheduler.now_ms());
        outcome
    }

    /// Suspend play. Only Idle, OneSelected and Resolving can be paused.
    pub fn pause(&mut self) -> bool {
        if self.paused || !self.state.is_pausable() {
            return false;
        }
        self.paused = true;
        log::debug!("paused in {:?}", self.state);
        self.events.publish(RoundEvent::PauseChanged { paused: true });
        true
    }

    /// Continue a paused round where it left off.
    pub fn resume(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        self.paused = false;
        log::debug!("resumed in {:?}", self.state);
        self.events.publish(RoundEvent::PauseChanged { paused: false });
        true
    }

    // === Time ===

    /// Advance time by `delta_seconds`.
    ///
    /// Runs due callbacks and the elapsed counter unless paused.
    pub fn tick(&mut self, delta_seconds: f64) {
        if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return;
        }
        let total = delta_seconds * 1000.0 + self.tick_carry_ms;
        let whole = total.floor();
        self.tick_carry_ms = total - whole;
        self.advance_ms(whole as u64);
    }

    /// Advance time by whole milliseconds.
    pub fn advance_ms(&mut self, delta_ms: u64) {
        self.wall_clock_ms = self.wall_clock_ms.saturating_add(delta_ms);

        if self.paused || matches!(self.state, RoundState::Inactive | RoundState::Won) {
            return;
        }
        let target = self.scheduler.now_ms().saturating_add(delta_ms);
        self.run_due(target);
    }

    fn run_due(&mut self, target_ms: u64) {
        while let Some(deferred) = self.scheduler.pop_due(target_ms) {
            self.run_deferred(deferred);
        }
        self.scheduler.advance_to(target_ms);
        self.refresh_elapsed();
    }

    fn refresh_elapsed(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        if let Some(started) = self.play_started_ms {
            let elapsed_ms = self.scheduler.now_ms().saturating_sub(started);
            self.progress.elapsed_seconds = u32::try_from(elapsed_ms / 1000).unwrap_or(u32::MAX);
        }
    }

    // === Deferred callbacks ===

    fn run_deferred(&mut self, deferred: Deferred) {
        let Some(config) = self.config.as_ref() else {
            return;
        };
        let timings = config.timings;
        let mismatch_delay_ms = config.mismatch_delay_ms;
        log::debug!("deferred {:?} at {}ms in {:?}", deferred, self.scheduler.now_ms(), self.state);

        match deferred {
            Deferred::PreviewReveal => {
                self.flip_all(Orientation::FaceUp);
                self.scheduler.schedule(
                    timings.flip_ms.saturating_add(timings.preview_dwell_ms),
                    Deferred::PreviewHide,
                );
            }
            Deferred::PreviewHide => {
                self.flip_all(Orientation::FaceDown);
                self.scheduler.schedule(timings.flip_ms, Deferred::PreviewEnd);
            }
            Deferred::PreviewEnd => {
                self.state = RoundState::Idle;
                self.play_started_ms = Some(self.scheduler.now_ms());
                self.progress.elapsed_seconds = 0;
                self.events.publish(RoundEvent::PreviewPhaseEnded);
            }
            Deferred::FirstRevealSettled => {
                if self.state == RoundState::Resolving && self.second_selected.is_none() {
                    self.state = RoundState::OneSelected;
                }
            }
            Deferred::SecondRevealSettled => self.resolve_pair(mismatch_delay_ms),
            Deferred::MismatchExpired => {
                if let (Some(first), Some(second)) = (self.first_selected, self.second_selected) {
                    self.flip(first, Orientation::FaceDown);
                    self.flip(second, Orientation::FaceDown);
                }
                self.first_selected = None;
                self.second_selected = None;
                self.scheduler
                    .schedule(timings.flip_ms, Deferred::MismatchHideSettled);
            }
            Deferred::MismatchHideSettled => {
                if self.state == RoundState::Resolving {
                    self.state = RoundState::Idle;
                }
            }
        }
    }

    fn resolve_pair(&mut self, mismatch_delay_ms: u32) {
        let (Some(first), Some(second)) = (self.first_selected, self.second_selected) else {
            self.state = RoundState::Idle;
            return;
        };
        let same = match (self.deck.get(first), self.deck.get(second)) {
            (Some(a), Some(b)) => a.pair_id == b.pair_id,
            _ => false,
        };

        if same {
            for position in [first, second] {
                if let Some(card) = self.deck.get_mut(position) {
                    card.mark_matched();
                }
                self.events.publish(RoundEvent::CardMatched { position });
            }
            self.first_selected = None;
            self.second_selected = None;
            self.progress.matches += 1;
            self.publish_turn();

            if self.progress.is_won() {
                self.win();
            } else {
                self.state = RoundState::Idle;
            }
        } else {
            self.events
                .publish(RoundEvent::MismatchDetected { first, second });
            self.publish_turn();
            self.scheduler
                .schedule(mismatch_delay_ms, Deferred::MismatchExpired);
        }
    }

    fn win(&mut self) {
        self.refresh_elapsed();
        self.state = RoundState::Won;
        self.scheduler.cancel_all();

        let Some(difficulty) = self.config.as_ref().map(|c| c.difficulty) else {
            return;
        };
        let turns = self.progress.turns;
        let elapsed_seconds = self.progress.elapsed_seconds;
        let outcome = self
            .recorder
            .record_result(difficulty, turns, elapsed_seconds);
        let stars = self.policy.compute_stars(turns, difficulty);

        log::info!(
            "{} round won in {} turns, {}s, {} stars",
            difficulty,
            turns,
            elapsed_seconds,
            stars
        );
        self.events.publish(RoundEvent::RoundWon(RoundSummary {
            turns,
            elapsed_seconds,
            difficulty,
            stars,
            is_new_best: outcome.is_new_best,
            best_moves: outcome.best_moves,
            best_time_seconds: outcome.best_time_seconds,
        }));
    }

    // === Helpers ===

    fn publish_turn(&mut self) {
        self.events.publish(RoundEvent::TurnResolved {
            turns: self.progress.turns,
            matches: self.progress.matches,
            total_pairs: self.progress.total_pairs,
        });
    }

    fn flip(&mut self, position: usize, orientation: Orientation) {
        let Some(card) = self.deck.get_mut(position) else {
            return;
        };
        match orientation {
            Orientation::FaceUp => card.flip_up(),
            Orientation::FaceDown => card.flip_down(),
        }
        self.events.publish(RoundEvent::CardFlipped {
            position,
            orientation,
        });
    }

    fn flip_all(&mut self, orientation: Orientation) {
        for position in 0..self.deck.len() {
            self.flip(position, orientation);
        }
    }
}

impl<S> std::fmt::Debug for RoundStateMachine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundStateMachine")
            .field("state", &self.state)
            .field("paused", &self.paused)
            .field("progress", &self.progress)
            .field("first_selected", &self.first_selected)
            .field("second_selected", &self.second_selected)
            .field("pending_callbacks", &self.scheduler.pending_count())
            .finish()
    }
}
