//! Round notifications.
//!
//! The state machine reports everything the presentation layer needs as
//! [`RoundEvent`] values. Presentation subscribes to the kinds it cares about
//! through the [`EventBus`]; every event is also buffered so headless
//! callers can [`drain`](EventBus::drain) them after each call.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{DifficultyId, Orientation};

/// End-of-round summary carried by [`RoundEvent::RoundWon`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub turns: u32,
    pub elapsed_seconds: u32,
    pub difficulty: DifficultyId,
    /// 1 to 3.
    pub stars: u8,
    pub is_new_best: bool,
    pub best_moves: u32,
    pub best_time_seconds: u32,
}

/// Something the presentation layer should react to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    /// A new deck was dealt (configure or restart).
    RoundStarted {
        cols: u32,
        rows: u32,
        total_pairs: usize,
    },
    /// A card turned over. Play the flip animation and sound.
    CardFlipped {
        position: usize,
        orientation: Orientation,
    },
    /// A card's pair was found.
    CardMatched { position: usize },
    /// A turn finished resolving.
    TurnResolved {
        turns: u32,
        matches: u32,
        total_pairs: usize,
    },
    /// The two selected cards differ. They flip back after the mismatch delay.
    MismatchDetected { first: usize, second: usize },
    /// The opening preview finished; input is live and the clock runs.
    PreviewPhaseEnded,
    /// Pause state changed.
    PauseChanged { paused: bool },
    /// Every pair was found.
    RoundWon(RoundSummary),
}

/// Discriminant of [`RoundEvent`], used for subscriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundEventKind {
    RoundStarted,
    CardFlipped,
    CardMatched,
    TurnResolved,
    MismatchDetected,
    PreviewPhaseEnded,
    PauseChanged,
    RoundWon,
}

impl RoundEventKind {
    pub const ALL: [RoundEventKind; 8] = [
        RoundEventKind::RoundStarted,
        RoundEventKind::CardFlipped,
        RoundEventKind::CardMatched,
        RoundEventKind::TurnResolved,
        RoundEventKind::MismatchDetected,
        RoundEventKind::PreviewPhaseEnded,
        RoundEventKind::PauseChanged,
        RoundEventKind::RoundWon,
    ];
}

impl RoundEvent {
    #[must_use]
    pub fn kind(&self) -> RoundEventKind {
        match self {
            RoundEvent::RoundStarted { .. } => RoundEventKind::RoundStarted,
            RoundEvent::CardFlipped { .. } => RoundEventKind::CardFlipped,
            RoundEvent::CardMatched { .. } => RoundEventKind::CardMatched,
            RoundEvent::TurnResolved { .. } => RoundEventKind::TurnResolved,
            RoundEvent::MismatchDetected { .. } => RoundEventKind::MismatchDetected,
            RoundEvent::PreviewPhaseEnded => RoundEventKind::PreviewPhaseEnded,
            RoundEvent::PauseChanged { .. } => RoundEventKind::PauseChanged,
            RoundEvent::RoundWon(_) => RoundEventKind::RoundWon,
        }
    }
}

/// Receiver of round events.
///
/// Closures taking `&RoundEvent` implement this automatically.
pub trait RoundObserver {
    fn notify(&mut self, event: &RoundEvent);
}

impl<F: FnMut(&RoundEvent)> RoundObserver for F {
    fn notify(&mut self, event: &RoundEvent) {
        self(event)
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u32);

/// Typed observer set plus an event buffer.
#[derive(Default)]
pub struct EventBus {
    observers: FxHashMap<SubscriptionId, Box<dyn RoundObserver>>,

    /// Index by event kind, in subscription order.
    by_kind: FxHashMap<RoundEventKind, SmallVec<[SubscriptionId; 4]>>,

    buffered: Vec<RoundEvent>,

    next_id: u32,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .field("buffered", &self.buffered.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for the given event kinds.
    pub fn subscribe(
        &mut self,
        kinds: &[RoundEventKind],
        observer: Box<dyn RoundObserver>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        for kind in kinds {
            let ids = self.by_kind.entry(*kind).or_default();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        self.observers.insert(id, observer);
        id
    }

    /// Register an observer for every event kind.
    pub fn subscribe_all(&mut self, observer: Box<dyn RoundObserver>) -> SubscriptionId {
        self.subscribe(&RoundEventKind::ALL, observer)
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if self.observers.remove(&id).is_none() {
            return false;
        }
        self.by_kind.retain(|_, ids| {
            ids.retain(|sid| *sid != id);
            !ids.is_empty()
        });
        true
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Deliver an event to matching observers and buffer it.
    pub fn publish(&mut self, event: RoundEvent) {
        if let Some(ids) = self.by_kind.get(&event.kind()) {
            for id in ids {
                if let Some(observer) = self.observers.get_mut(id) {
                    observer.notify(&event);
                }
            }
        }
        self.buffered.push(event);
    }

    /// Take every buffered event, oldest first.
    pub fn drain(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.buffered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<RoundEvent>>>, Box<dyn RoundObserver>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let observer: Box<dyn RoundObserver> =
            Box::new(move |e: &RoundEvent| sink.borrow_mut().push(e.clone()));
        (seen, observer)
    }

    #[test]
    fn test_filtered_delivery() {
        let mut bus = EventBus::new();
        let (seen, observer) = recorder();
        bus.subscribe(&[RoundEventKind::CardMatched], observer);

        bus.publish(RoundEvent::PreviewPhaseEnded);
        bus.publish(RoundEvent::CardMatched { position: 3 });

        assert_eq!(*seen.borrow(), vec![RoundEvent::CardMatched { position: 3 }]);
        assert_eq!(bus.drain().len(), 2);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let (seen, observer) = recorder();
        let id = bus.subscribe_all(observer);

        bus.publish(RoundEvent::PreviewPhaseEnded);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(RoundEvent::PreviewPhaseEnded);

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(bus.observer_count(), 0);
    }

    #[test]
    fn test_duplicate_kinds_deliver_once() {
        let mut bus = EventBus::new();
        let (seen, observer) = recorder();
        bus.subscribe(&[RoundEventKind::PauseChanged, RoundEventKind::PauseChanged], observer);

        bus.publish(RoundEvent::PauseChanged { paused: true });
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_kind_covers_all_variants() {
        let summary = RoundSummary {
            turns: 8,
            elapsed_seconds: 30,
            difficulty: DifficultyId::Easy,
            stars: 3,
            is_new_best: true,
            best_moves: 8,
            best_time_seconds: 30,
        };
        assert_eq!(RoundEvent::RoundWon(summary).kind(), RoundEventKind::RoundWon);
        assert_eq!(
            RoundEvent::MismatchDetected { first: 0, second: 1 }.kind(),
            RoundEventKind::MismatchDetected
        );
    }
}
