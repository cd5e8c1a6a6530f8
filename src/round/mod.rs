//! The round: state machine, deferred callbacks, and notifications.
//!
//! - [`machine`]: turn protocol, matching, win detection
//! - [`scheduler`]: deferred callbacks on a pausable clock
//! - [`event`]: outbound events and observer registration
//! - [`state`]: state enum, progress counters, snapshots

pub mod event;
pub mod machine;
pub mod scheduler;
pub mod state;

pub use event::{
    EventBus, RoundEvent, RoundEventKind, RoundObserver, RoundSummary, SubscriptionId,
};
pub use machine::RoundStateMachine;
pub use scheduler::{Scheduler, TimerId};
pub use state::{Activation, IgnoreReason, RoundProgress, RoundSnapshot, RoundState};
