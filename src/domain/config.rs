use std::path::Path;

use serde::{Deserialize, Serialize};

/// A segment to generate at startup, and how many numbers to draw from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSeed {
    /// The segment prefix, e.g. `"138"`.
    pub segment: String,
    /// How many sequence numbers to generate.
    pub count: usize,
}

impl SegmentSeed {
    fn new(segment: &str, count: usize) -> Self {
        Self {
            segment: segment.to_string(),
            count,
        }
    }
}

/// Settings for a pool data directory: where the pool file lives, how a new
/// pool is sized and seeded, and how numbers are grouped for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The pool file name, relative to the data root.
    pool_file: String,

    /// The capacity a new pool is created with.
    initial_capacity: usize,

    /// The maximum number of numbers one owner may hold.
    owner_limit: usize,

    /// The number of leading digits forming a category (e.g. '13').
    category_digits: usize,

    /// The number of leading digits forming a segment (e.g. '138').
    segment_digits: usize,

    /// Segments generated when no pool file exists yet.
    pub segments: Vec<SegmentSeed>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pool_file: default_pool_file(),
            initial_capacity: default_initial_capacity(),
            owner_limit: default_owner_limit(),
            category_digits: default_category_digits(),
            segment_digits: default_segment_digits(),
            segments: default_segments(),
        }
    }
}

impl Config {
    /// Reads `config.toml` from `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file is unreadable or is not a valid configuration.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Writes the configuration as TOML to `path`.
    ///
    /// # Errors
    ///
    /// Fails if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the pool file name.
    #[must_use]
    pub fn pool_file(&self) -> &str {
        &self.pool_file
    }

    /// Returns the initial pool capacity.
    #[must_use]
    pub const fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// Returns the per-owner binding limit.
    #[must_use]
    pub const fn owner_limit(&self) -> usize {
        self.owner_limit
    }

    /// Returns the width of a category prefix.
    #[must_use]
    pub const fn category_digits(&self) -> usize {
        self.category_digits
    }

    /// Returns the width of a segment prefix.
    #[must_use]
    pub const fn segment_digits(&self) -> usize {
        self.segment_digits
    }

    /// Sets the per-owner binding limit.
    pub const fn set_owner_limit(&mut self, limit: usize) {
        self.owner_limit = limit;
    }
}

fn default_pool_file() -> String {
    "phones.dat".to_string()
}

const fn default_initial_capacity() -> usize {
    100
}

const fn default_owner_limit() -> usize {
    5
}

const fn default_category_digits() -> usize {
    2
}

const fn default_segment_digits() -> usize {
    3
}

fn default_segments() -> Vec<SegmentSeed> {
    vec![
        SegmentSeed::new("138", 50),
        SegmentSeed::new("139", 50),
        SegmentSeed::new("150", 50),
    ]
}

/// On-disk layouts of the configuration, tagged by `_version`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_pool_file")]
        pool_file: String,

        #[serde(default = "default_initial_capacity")]
        initial_capacity: usize,

        #[serde(default = "default_owner_limit")]
        owner_limit: usize,

        #[serde(default = "default_category_digits")]
        category_digits: usize,

        #[serde(default = "default_segment_digits")]
        segment_digits: usize,

        #[serde(default = "default_segments")]
        segments: Vec<SegmentSeed>,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                pool_file,
                initial_capacity,
                owner_limit,
                category_digits,
                segment_digits,
                segments,
            } => Self {
                pool_file,
                initial_capacity,
                owner_limit,
                category_digits,
                segment_digits,
                segments,
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            pool_file: config.pool_file,
            initial_capacity: config.initial_capacity,
            owner_limit: config.owner_limit,
            category_digits: config.category_digits,
            segment_digits: config.segment_digits,
            segments: config.segments,
        }
    }
}
