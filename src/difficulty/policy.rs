//! Difficulty table: grid size, mismatch delay, star thresholds.

use serde::{Deserialize, Serialize};

use crate::core::{ConfigError, DifficultyId, RoundConfig};

/// Move-count ceilings for a star rating.
///
/// `turns <= three_stars` earns 3 stars, `turns <= two_stars` earns 2,
/// anything else earns 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarThresholds {
    pub three_stars: u32,
    pub two_stars: u32,
}

impl StarThresholds {
    #[must_use]
    pub const fn new(three_stars: u32, two_stars: u32) -> Self {
        Self {
            three_stars,
            two_stars,
        }
    }

    /// Rate a completed round. Always 1, 2 or 3.
    #[must_use]
    pub fn rate(&self, turns: u32) -> u8 {
        if turns <= self.three_stars {
            3
        } else if turns <= self.two_stars {
            2
        } else {
            1
        }
    }
}

/// Parameters for one difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub cols: u32,
    pub rows: u32,
    pub mismatch_delay_ms: u32,
    pub stars: StarThresholds,
}

impl DifficultyProfile {
    #[must_use]
    pub fn total_pairs(&self) -> usize {
        (self.cols as usize * self.rows as usize) / 2
    }
}

/// Maps difficulty identifiers to round parameters.
///
/// ## Defaults
///
/// | Difficulty | Grid | Pairs | Mismatch delay | 3★ | 2★ |
/// |------------|------|-------|----------------|----|----|
/// | Easy       | 4×3  | 6     | 800 ms         | ≤8 | ≤12 |
/// | Medium     | 4×4  | 8     | 1000 ms        | ≤12 | ≤18 |
/// | Hard       | 5×4  | 10    | 1200 ms        | ≤16 | ≤24 |
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyPolicy {
    pub easy: DifficultyProfile,
    pub medium: DifficultyProfile,
    pub hard: DifficultyProfile,
}

impl Default for DifficultyPolicy {
    fn default() -> Self {
        Self {
            easy: DifficultyProfile {
                cols: 4,
                rows: 3,
                mismatch_delay_ms: 800,
                stars: StarThresholds::new(8, 12),
            },
            medium: DifficultyProfile {
                cols: 4,
                rows: 4,
                mismatch_delay_ms: 1000,
                stars: StarThresholds::new(12, 18),
            },
            hard: DifficultyProfile {
                cols: 5,
                rows: 4,
                mismatch_delay_ms: 1200,
                stars: StarThresholds::new(16, 24),
            },
        }
    }
}

impl DifficultyPolicy {
    /// Load a policy from JSON, validating every profile's grid.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let policy: Self = serde_json::from_str(json)?;
        for difficulty in DifficultyId::ALL {
            policy.round_config(difficulty).validate()?;
        }
        Ok(policy)
    }

    /// Parameters for a difficulty.
    #[must_use]
    pub fn resolve(&self, difficulty: DifficultyId) -> &DifficultyProfile {
        match difficulty {
            DifficultyId::Easy => &self.easy,
            DifficultyId::Medium => &self.medium,
            DifficultyId::Hard => &self.hard,
        }
    }

    /// Parameters for a difficulty identifier; unknown identifiers get Medium.
    #[must_use]
    pub fn resolve_id(&self, id: &str) -> &DifficultyProfile {
        self.resolve(DifficultyId::from_id_or_default(id))
    }

    /// Build a round configuration with default timings.
    #[must_use]
    pub fn round_config(&self, difficulty: DifficultyId) -> RoundConfig {
        let profile = self.resolve(difficulty);
        RoundConfig::new(profile.cols, profile.rows, difficulty, profile.mismatch_delay_ms)
    }

    /// Star rating for a completed round. Pure; always 1, 2 or 3.
    #[must_use]
    pub fn compute_stars(&self, turns: u32, difficulty: DifficultyId) -> u8 {
        self.resolve(difficulty).stars.rate(turns)
    }
}

/// Star rating using the default table.
#[must_use]
pub fn compute_stars(turns: u32, difficulty: DifficultyId) -> u8 {
    DifficultyPolicy::default().compute_stars(turns, difficulty)
}
