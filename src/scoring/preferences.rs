//! User preferences shared across rounds: sound mute and last difficulty.

use crate::core::DifficultyId;

use super::keys;
use super::store::KeyValueStore;

/// Typed access to preferences kept in a key-value store.
#[derive(Debug)]
pub struct Preferences<S> {
    store: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Muted only when the stored value is exactly `"true"`.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.store.get(keys::MUTED).as_deref() == Some("true")
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.store.set(keys::MUTED, if muted { "true" } else { "false" });
    }

    /// Flip the mute flag and return the new value.
    pub fn toggle_muted(&mut self) -> bool {
        let muted = !self.is_muted();
        self.set_muted(muted);
        muted
    }

    /// Last difficulty picked in the menu. Defaults to Medium.
    #[must_use]
    pub fn last_difficulty(&self) -> DifficultyId {
        self.store
            .get(keys::LAST_DIFFICULTY)
            .map(|id| DifficultyId::from_id_or_default(&id))
            .unwrap_or_default()
    }

    pub fn set_last_difficulty(&mut self, difficulty: DifficultyId) {
        self.store.set(keys::LAST_DIFFICULTY, difficulty.id());
    }
}
