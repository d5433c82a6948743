use thiserror::Error;

/// Result type alias for skiplist construction.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Rejected configuration. Raised once, at construction, before any list exists.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("maximum level for skip list must be a positive integer, got {0}")]
    InvalidMaxLevel(usize),

    #[error("probability for skip list must be a floating point value in the range [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("a hash index maps each key to one node and cannot be combined with duplicate keys")]
    HashIndexWithDuplicates,

    #[error("a hash index needs keys, comparator-ordered sets have none")]
    HashIndexWithoutKey,
}
