//! Round state, progress counters and observable snapshots.

use serde::{Deserialize, Serialize};

use crate::core::{Card, DifficultyId};

/// Where the round is in its turn protocol.
///
/// Pausing is orthogonal and tracked separately, so the state underneath a
/// pause is preserved as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoundState {
    /// No round configured, or the round was torn down.
    #[default]
    Inactive,
    /// Opening reveal. Input is rejected.
    Preview,
    /// Waiting for the first card of a turn.
    Idle,
    /// One card is face-up; waiting for the second.
    OneSelected,
    /// A flip is settling or a pair is being compared. Input is rejected.
    Resolving,
    /// Every pair found. Terminal.
    Won,
}

impl RoundState {
    /// States a pause may suspend.
    #[must_use]
    pub fn is_pausable(self) -> bool {
        matches!(self, RoundState::Idle | RoundState::OneSelected | RoundState::Resolving)
    }

    /// States in which the elapsed-time clock runs.
    #[must_use]
    pub fn is_playing(self) -> bool {
        self.is_pausable()
    }
}

/// Counters for the current round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundProgress {
    /// Completed two-card selections.
    pub turns: u32,
    /// Pairs found.
    pub matches: u32,
    pub total_pairs: usize,
    /// Whole seconds of active play.
    pub elapsed_seconds: u32,
}

impl RoundProgress {
    #[must_use]
    pub fn is_won(&self) -> bool {
        self.total_pairs > 0 && self.matches as usize == self.total_pairs
    }

    #[must_use]
    pub fn pairs_remaining(&self) -> usize {
        self.total_pairs.saturating_sub(self.matches as usize)
    }
}

/// Why an activation was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IgnoreReason {
    NoRound,
    Preview,
    Paused,
    Resolving,
    Won,
    /// Arrived within the debounce window of the last accepted activation.
    Debounced,
    OutOfRange,
    AlreadyMatched,
    AlreadyFaceUp,
}

/// Result of delivering a card activation.
///
/// Ignoring an activation is normal control flow, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activation {
    /// The card was turned face-up as the first card of a turn.
    FirstSelected,
    /// The card was turned face-up as the second card; a turn was counted.
    SecondSelected,
    Ignored(IgnoreReason),
}

/// Serializable view of a round for presentation sync and debugging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub state: RoundState,
    pub paused: bool,
    pub difficulty: Option<DifficultyId>,
    pub cols: u32,
    pub rows: u32,
    pub progress: RoundProgress,
    pub cards: Vec<Card>,
    pub first_selected: Option<usize>,
    pub second_selected: Option<usize>,
}
