use crate::error::{ConfigError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default maximum number of lanes a node may occupy.
pub const DEFAULT_MAX_LEVEL: usize = 32;
/// Default probability that a node is promoted to the next lane.
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// What to do when an item that compares equal to an existing one is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplicates {
    /// Keep one node per key. The existing node keeps its level and position,
    /// only its value (or item) is swapped.
    Replace,
    /// Keep every node. Equal items are ordered by insertion.
    Allow,
}

/// Construction options shared by [`SkipList`](crate::SkipList) and
/// [`SkipSet`](crate::SkipSet).
///
/// ```
/// use skiplist_lanes::{Config, SkipList};
///
/// let config = Config::default().with_max_level(16).with_seed(7);
/// let sk: SkipList<u32, &str> = SkipList::with_config(config).unwrap();
/// assert!(sk.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub max_level: usize,
    pub probability: f64,
    /// `None` seeds the level generator from the wall clock.
    pub seed: Option<u64>,
    pub hash_index: bool,
    pub duplicates: Duplicates,
}

impl Default for Config {
    /// Map defaults: unique keys with a hash index.
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            probability: DEFAULT_PROBABILITY,
            seed: None,
            hash_index: true,
            duplicates: Duplicates::Replace,
        }
    }
}

impl Config {
    /// Set defaults: duplicates allowed, no hash index.
    pub fn multiset() -> Self {
        Self {
            hash_index: false,
            duplicates: Duplicates::Allow,
            ..Self::default()
        }
    }

    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_hash_index(mut self, hash_index: bool) -> Self {
        self.hash_index = hash_index;
        self
    }

    pub fn with_duplicates(mut self, duplicates: Duplicates) -> Self {
        self.duplicates = duplicates;
        self
    }

    /// Checks the options that do not depend on the container flavor.
    pub fn validate(&self) -> Result<()> {
        if self.max_level < 1 {
            return Err(ConfigError::InvalidMaxLevel(self.max_level));
        }
        // NaN fails both comparisons, so it lands here too.
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(ConfigError::InvalidProbability(self.probability));
        }
        if self.hash_index && self.duplicates == Duplicates::Allow {
            return Err(ConfigError::HashIndexWithDuplicates);
        }
        Ok(())
    }

    pub(crate) fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default()
        })
    }
}
