//! # memory-match
//!
//! The game core of a single-player memory card game: a grid of face-down
//! cards hides pairs, and the player turns two cards per turn looking for
//! matches.
//!
//! ## Design Principles
//!
//! 1. **Headless**: No rendering, audio, or input handling. The host feeds
//!    card activations and elapsed time; the core answers with events.
//!
//! 2. **Deterministic**: Every delay is a deferred callback on a clock the
//!    host drives. Seeded rounds replay exactly.
//!
//! 3. **Injected Persistence**: Best records and preferences go through a
//!    [`KeyValueStore`](scoring::KeyValueStore) supplied by the host.
//!
//! ## Modules
//!
//! - `core`: Cards, deck, RNG, round configuration, errors
//! - `difficulty`: Grid sizes, mismatch delays, star thresholds
//! - `layout`: Card sizing and placement within a viewport
//! - `round`: The round state machine and its events
//! - `scoring`: Best records, preferences, key-value stores

pub mod core;
pub mod difficulty;
pub mod layout;
pub mod round;
pub mod scoring;

// Re-export commonly used types
pub use crate::core::{
    Card, Orientation, PairId,
    Deck, GameRng, GameRngState,
    DifficultyId, RoundConfig, RoundTimings,
    ConfigError,
};

pub use crate::difficulty::{compute_stars, DifficultyPolicy, DifficultyProfile, StarThresholds};

pub use crate::layout::{CardRect, GridLayoutPlanner, LayoutParams};

pub use crate::round::{
    Activation, IgnoreReason,
    RoundEvent, RoundEventKind, RoundObserver, RoundSummary, SubscriptionId,
    RoundProgress, RoundSnapshot, RoundState, RoundStateMachine,
};

pub use crate::scoring::{
    BestRecord, RecordOutcome, ScoreRecorder, Preferences,
    KeyValueStore, MemoryStore, JsonFileStore,
};
