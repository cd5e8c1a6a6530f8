//! Difficulty policy.
//!
//! Maps a difficulty to grid dimensions, the mismatch resolution delay,
//! and the star thresholds used to rate a finished round.

pub mod policy;

pub use policy::{compute_stars, DifficultyPolicy, DifficultyProfile, StarThresholds};
