//! Scoring and persistence.
//!
//! - [`store`]: the injected key-value store interface and two implementations
//! - [`keys`]: persisted key names
//! - [`recorder`]: best moves / best time per difficulty
//! - [`preferences`]: mute flag and last-selected difficulty

pub mod keys;
pub mod preferences;
pub mod recorder;
pub mod store;

pub use preferences::Preferences;
pub use recorder::{BestRecord, RecordOutcome, ScoreRecorder};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
