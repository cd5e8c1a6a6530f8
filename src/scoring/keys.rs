//! Persistence key names and value encodings.
//!
//! | Key                   | Value                         |
//! |-----------------------|-------------------------------|
//! | `memory_muted`        | `"true"` / `"false"`          |
//! | `memory_difficulty`   | `"easy"` / `"medium"` / `"hard"` |
//! | `bestMoves_<id>`      | decimal turn count            |
//! | `bestTime_<id>`       | decimal whole seconds         |

use crate::core::DifficultyId;

pub const MUTED: &str = "memory_muted";
pub const LAST_DIFFICULTY: &str = "memory_difficulty";

#[must_use]
pub fn best_moves(difficulty: DifficultyId) -> String {
    format!("bestMoves_{}", difficulty.id())
}

#[must_use]
pub fn best_time(difficulty: DifficultyId) -> String {
    format!("bestTime_{}", difficulty.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(best_moves(DifficultyId::Easy), "bestMoves_easy");
        assert_eq!(best_time(DifficultyId::Hard), "bestTime_hard");
    }
}
