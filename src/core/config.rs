//! Round configuration types.
//!
//! A round is configured at start by providing:
//! - `DifficultyId`: which difficulty table row applies
//! - `RoundTimings`: animation and input timing constants
//! - `RoundConfig`: grid dimensions, mismatch delay, timings, seed
//!
//! Use [`DifficultyPolicy::round_config`](crate::difficulty::DifficultyPolicy::round_config)
//! to derive a `RoundConfig` from a difficulty.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Difficulty identifier.
///
/// Serialized as the lowercase identifier used for persistence keys
/// (`"easy"`, `"medium"`, `"hard"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyId {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl DifficultyId {
    /// All difficulties in menu order.
    pub const ALL: [DifficultyId; 3] = [DifficultyId::Easy, DifficultyId::Medium, DifficultyId::Hard];

    /// The stable string identifier.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            DifficultyId::Easy => "easy",
            DifficultyId::Medium => "medium",
            DifficultyId::Hard => "hard",
        }
    }

    /// Parse an identifier, falling back to `Medium` when unknown.
    #[must_use]
    pub fn from_id_or_default(id: &str) -> Self {
        id.parse().unwrap_or_else(|_| {
            log::debug!("unknown difficulty '{}', falling back to medium", id);
            DifficultyId::Medium
        })
    }
}

impl std::str::FromStr for DifficultyId {
    type Err = ConfigError;

    /// Strict parse for callers that cannot accept a fallback.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(DifficultyId::Easy),
            "medium" => Ok(DifficultyId::Medium),
            "hard" => Ok(DifficultyId::Hard),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

impl std::fmt::Display for DifficultyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Timing constants for the round timeline, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTimings {
    /// Delay between round start and the preview reveal.
    pub preview_lead_in_ms: u32,

    /// Time for a flip animation to settle.
    pub flip_ms: u32,

    /// How long the preview holds every card face-up.
    pub preview_dwell_ms: u32,

    /// Activations closer together than this are dropped.
    pub debounce_ms: u32,
}

impl Default for RoundTimings {
    fn default() -> Self {
        Self {
            preview_lead_in_ms: 500,
            flip_ms: 320,
            preview_dwell_ms: 1000,
            debounce_ms: 150,
        }
    }
}

impl RoundTimings {
    /// Timings with every delay set to zero.
    ///
    /// Handy for tests and headless simulation.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            preview_lead_in_ms: 0,
            flip_ms: 0,
            preview_dwell_ms: 0,
            debounce_ms: 0,
        }
    }

    #[must_use]
    pub fn with_debounce_ms(mut self, ms: u32) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Total length of the opening preview sequence.
    #[must_use]
    pub fn preview_total_ms(&self) -> u64 {
        [self.preview_lead_in_ms, self.flip_ms, self.preview_dwell_ms, self.flip_ms]
            .into_iter()
            .map(u64::from)
            .sum()
    }
}

/// Configuration for a single round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Grid columns.
    pub cols: u32,

    /// Grid rows.
    pub rows: u32,

    /// Difficulty this round is played (and recorded) at.
    pub difficulty: DifficultyId,

    /// How long a mismatched pair stays visible before flipping back.
    pub mismatch_delay_ms: u32,

    /// Animation and input timing.
    #[serde(default)]
    pub timings: RoundTimings,

    /// Deal seed. `None` draws a fresh seed from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl RoundConfig {
    /// Create a configuration with default timings and a random deal.
    pub fn new(cols: u32, rows: u32, difficulty: DifficultyId, mismatch_delay_ms: u32) -> Self {
        Self {
            cols,
            rows,
            difficulty,
            mismatch_delay_ms,
            timings: RoundTimings::default(),
            seed: None,
        }
    }

    #[must_use]
    pub fn with_timings(mut self, timings: RoundTimings) -> Self {
        self.timings = timings;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_mismatch_delay_ms(mut self, ms: u32) -> Self {
        self.mismatch_delay_ms = ms;
        self
    }

    /// Number of cards on the grid.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Number of pairs to find.
    #[must_use]
    pub fn total_pairs(&self) -> usize {
        self.card_count() / 2
    }

    /// Check the grid can be dealt as pairs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::ZeroDimension {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if self.card_count() % 2 != 0 {
            return Err(ConfigError::OddArea {
                cols: self.cols,
                rows: self.rows,
            });
        }
        Ok(())
    }
}
