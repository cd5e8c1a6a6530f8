//! Configuration errors.
//!
//! Only round configuration can fail. Everything that happens during play
//! (out-of-turn taps, taps on matched cards) is absorbed as a no-op and
//! reported through [`Activation`](crate::round::Activation) instead.

/// Error raised while configuring a round or loading configuration data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A grid dimension was zero.
    ZeroDimension { cols: u32, rows: u32 },

    /// `cols * rows` is odd, so cards cannot be paired.
    OddArea { cols: u32, rows: u32 },

    /// A difficulty identifier was required but not recognized.
    UnknownDifficulty(String),

    /// An injected deck violates the pairing invariant.
    InvalidDeck(String),

    /// Configuration text could not be parsed.
    Parse(String),

    /// A backing file could not be read or written.
    Io(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroDimension { cols, rows } => {
                write!(f, "grid dimensions must be positive (got {}x{})", cols, rows)
            }
            ConfigError::OddArea { cols, rows } => {
                write!(f, "grid {}x{} has an odd number of cells", cols, rows)
            }
            ConfigError::UnknownDifficulty(id) => write!(f, "unknown difficulty '{}'", id),
            ConfigError::InvalidDeck(reason) => write!(f, "invalid deck: {}", reason),
            ConfigError::Parse(reason) => write!(f, "parse error: {}", reason),
            ConfigError::Io(reason) => write!(f, "io error: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}
