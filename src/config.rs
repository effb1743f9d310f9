//! Caller-supplied settings for fill, build and block-placement operations.

use instant::Duration;

/// Settings for a single call to `find_fill`.
#[derive(Debug, Clone)]
pub struct FillConfig {
    /// Seed for the candidate shuffle. The same seed and word list always produce the same fill.
    pub seed: u64,

    /// Give up once this many backtracks have been performed.
    pub max_backtracks: u64,

    /// Candidates are shuffled within consecutive groups of this size after being sorted by
    /// score, so equally good options are tried in a seed-dependent order.
    pub tier_size: usize,

    /// Optional wall-clock budget, checked each time a slot is selected.
    pub time_limit: Option<Duration>,
}

impl Default for FillConfig {
    fn default() -> Self {
        FillConfig {
            seed: 0,
            max_backtracks: 100_000,
            tier_size: 5,
            time_limit: None,
        }
    }
}

/// Settings for `GridBuilder`.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Height of the working grid that words are placed into before trimming.
    pub max_rows: usize,

    /// Width of the working grid that words are placed into before trimming.
    pub max_cols: usize,

    /// How many of the highest-scoring candidates are considered at all.
    pub top_n: usize,

    /// How many candidates of any single length may be admitted to the top `top_n`.
    pub max_per_length: usize,

    /// Stop placing words once this many have been placed.
    pub target_word_count: usize,

    /// A build is considered successful once at least this many words are placed.
    pub min_word_count: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            max_rows: 21,
            max_cols: 21,
            top_n: 30,
            max_per_length: 5,
            target_word_count: 30,
            min_word_count: 10,
        }
    }
}

/// Thresholds for acceptable block layouts. A value of 0 disables that threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockLimits {
    /// The longest allowed run of consecutive blocks in any row or column.
    pub max_consecutive: usize,

    /// The largest allowed area of a solid rectangle of blocks.
    pub max_cluster_area: usize,
}
