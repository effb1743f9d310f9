//! A crossword fill engine: a weighted lexicon with pattern lookup, slot and crossing discovery,
//! a most-constrained-first backtracking solver, a word-first grid builder and a block pattern
//! analyzer.

pub mod blocks;
pub mod builder;
pub mod config;
pub mod errors;
pub mod grid;
pub mod lexicon;
pub mod slots;
pub mod solver;

pub use blocks::{
    analyze_dead_blocks, place_symmetric_blocks, validate_block_pattern, BlockAnalysis,
};
pub use builder::{BuiltGrid, GridBuilder, Placement};
pub use config::{BlockLimits, BuildConfig, FillConfig};
pub use errors::{FillError, FillFailure, GridError, LexiconError};
pub use grid::{Cell, Grid};
pub use lexicon::{normalize_word, Lexicon, MergeStats, Word, WordEntry};
pub use slots::{discover_slots, Crossing, Direction, SlotConfig};
pub use solver::{
    find_fill, find_fill_with_scorer, Fill, LetterScoreScorer, Scorer, Statistics, WeightScorer,
};

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// An identifier for a given slot, based on its index in the list returned by `discover_slots`.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the lexicon's bucket for its length.
pub type WordId = usize;

/// Zero-indexed (row, col) coords for a cell in the grid, where row = 0 is the top row.
pub type GridCoord = (usize, usize);
