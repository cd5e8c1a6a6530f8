//! Cards: one grid cell of the memory board.
//!
//! A card knows its position in the deck, the pair it belongs to, which way
//! it faces, and whether its pair has been found. Only the round state
//! machine mutates cards; presentation reads them through snapshots.

use serde::{Deserialize, Serialize};

/// Pair identifier. Exactly two cards per round share a `PairId`.
///
/// The engine doesn't interpret pair IDs beyond equality. Presentation maps
/// them to faces (image `card_front_01` for pair 0, and so on).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairId(pub u32);

impl PairId {
    /// Create a new pair ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pair({})", self.0)
    }
}

/// Which side of the card is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    FaceDown,
    FaceUp,
}

impl Orientation {
    #[must_use]
    pub fn is_face_up(self) -> bool {
        self == Orientation::FaceUp
    }
}

/// A single card in a round.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Index into the deck (row-major, 0-based).
    pub position: usize,

    /// The pair this card belongs to.
    pub pair_id: PairId,

    /// Current face orientation.
    pub orientation: Orientation,

    /// Set once the pair is found. Never reverts.
    matched: bool,
}

impl Card {
    /// Create a face-down, unmatched card.
    #[must_use]
    pub fn new(position: usize, pair_id: PairId) -> Self {
        Self {
            position,
            pair_id,
            orientation: Orientation::FaceDown,
            matched: false,
        }
    }

    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.matched
    }

    #[must_use]
    pub fn is_face_up(&self) -> bool {
        self.orientation.is_face_up()
    }

    /// Can this card be chosen as part of a turn?
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        !self.matched && !self.is_face_up()
    }

    pub fn flip_up(&mut self) {
        self.orientation = Orientation::FaceUp;
    }

    /// Turn the card face-down. Matched cards stay face-up.
    pub fn flip_down(&mut self) {
        if !self.matched {
            self.orientation = Orientation::FaceDown;
        }
    }

    /// Mark the card as matched. Matched cards are shown face-up.
    pub fn mark_matched(&mut self) {
        self.matched = true;
        self.orientation = Orientation::FaceUp;
    }
}
