//! Best-record tracking per difficulty.

use serde::{Deserialize, Serialize};

use crate::core::DifficultyId;

use super::keys;
use super::store::KeyValueStore;

/// Best results ever recorded for one difficulty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestRecord {
    /// Fewest turns for a completed round.
    pub best_moves: Option<u32>,
    /// Shortest elapsed time for a completed round, in whole seconds.
    pub best_time_seconds: Option<u32>,
}

/// Verdict for a completed round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOutcome {
    /// True if either field improved.
    pub is_new_best: bool,
    pub moves_improved: bool,
    pub time_improved: bool,
    /// Best moves after recording this round.
    pub best_moves: u32,
    /// Best time after recording this round.
    pub best_time_seconds: u32,
}

/// Reads and updates best records through an injected store.
///
/// Each field is updated independently, and only when the new value is
/// strictly smaller than the stored one (or nothing is stored yet).
#[derive(Debug)]
pub struct ScoreRecorder<S> {
    store: S,
}

impl<S: KeyValueStore> ScoreRecorder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Current best record. Unparsable stored values read as absent.
    #[must_use]
    pub fn best(&self, difficulty: DifficultyId) -> BestRecord {
        BestRecord {
            best_moves: self.read_u32(&keys::best_moves(difficulty)),
            best_time_seconds: self.read_u32(&keys::best_time(difficulty)),
        }
    }

    /// Record a completed round and report whether it set a new best.
    pub fn record_result(
        &mut self,
        difficulty: DifficultyId,
        turns: u32,
        elapsed_seconds: u32,
    ) -> RecordOutcome {
        let prior = self.best(difficulty);

        let moves_improved = prior.best_moves.map_or(true, |best| turns < best);
        let time_improved = prior.best_time_seconds.map_or(true, |best| elapsed_seconds < best);

        if moves_improved {
            self.store
                .set(&keys::best_moves(difficulty), &turns.to_string());
        }
        if time_improved {
            self.store
                .set(&keys::best_time(difficulty), &elapsed_seconds.to_string());
        }

        let outcome = RecordOutcome {
            is_new_best: moves_improved || time_improved,
            moves_improved,
            time_improved,
            best_moves: if moves_improved { turns } else { prior.best_moves.unwrap_or(turns) },
            best_time_seconds: if time_improved {
                elapsed_seconds
            } else {
                prior.best_time_seconds.unwrap_or(elapsed_seconds)
            },
        };

        if outcome.is_new_best {
            log::info!(
                "new best on {}: moves {} time {}s",
                difficulty,
                outcome.best_moves,
                outcome.best_time_seconds
            );
        }
        outcome
    }

    /// Forget the records for a difficulty.
    pub fn clear(&mut self, difficulty: DifficultyId) {
        self.store.remove(&keys::best_moves(difficulty));
        self.store.remove(&keys::best_time(difficulty));
    }

    fn read_u32(&self, key: &str) -> Option<u32> {
        let raw = self.store.get(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("ignoring unparsable value {:?} for {}", raw, key);
                None
            }
        }
    }
}
