//! Core types: cards, deck, RNG, configuration, errors.
//!
//! These are the building blocks the round state machine operates on.
//! Nothing here knows about turns, timers, or presentation.

pub mod card;
pub mod config;
pub mod deck;
pub mod error;
pub mod rng;

pub use card::{Card, Orientation, PairId};
pub use config::{DifficultyId, RoundConfig, RoundTimings};
pub use deck::Deck;
pub use error::ConfigError;
pub use rng::{GameRng, GameRngState};
