//! The deck: every card of a round, in row-major grid order.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::card::{Card, PairId};
use super::error::ConfigError;

/// Ordered cards of a round.
///
/// Invariant: the length is even and every `PairId` present appears on
/// exactly two cards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build a deck from dealt pair identifiers, checking the pairing invariant.
    pub fn from_pair_ids(ids: &[PairId]) -> Result<Self, ConfigError> {
        if ids.is_empty() {
            return Err(ConfigError::InvalidDeck("deck is empty".to_string()));
        }

        let mut counts: FxHashMap<PairId, usize> = FxHashMap::default();
        for id in ids {
            *counts.entry(*id).or_insert(0) += 1;
        }
        if let Some((id, count)) = counts.iter().find(|(_, count)| **count != 2) {
            return Err(ConfigError::InvalidDeck(format!(
                "{} appears {} times",
                id, count
            )));
        }

        let cards = ids
            .iter()
            .enumerate()
            .map(|(position, id)| Card::new(position, *id))
            .collect();
        Ok(Self { cards })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn total_pairs(&self) -> usize {
        self.cards.len() / 2
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Card> {
        self.cards.get(position)
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut Card> {
        self.cards.get_mut(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
