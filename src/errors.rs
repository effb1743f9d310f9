//! Error types for grid construction, lexicon ingestion and the fill/build operations.
//!
//! Fill and build failures distinguish between outcomes worth retrying (a different seed or a
//! larger word list may succeed) and caller input errors. A failed fill always carries the best
//! partial result so the caller can inspect what was reached.

use crate::solver::Fill;

/// Failure kinds for a fill or build attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FillError {
    #[error("no fill exists for this grid with the given word list")]
    NoSolution,

    #[error("search aborted after exceeding {limit} backtracks")]
    BacktrackLimitExceeded { limit: u64 },

    #[error("grid template contains no slots of two or more cells")]
    NoSlotsFound,

    #[error("grid construction placed {placed} words, {required} required")]
    BuildFailure { placed: usize, required: usize },

    #[error("search aborted after reaching its time limit")]
    Timeout,
}

impl FillError {
    /// Can this failure plausibly be resolved by retrying with another seed or a broader word
    /// list?
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FillError::NoSlotsFound)
    }
}

/// A failed fill, carrying the deepest partial fill reached along with its diagnostics.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{error} ({} slots left unfilled)", .partial.unfilled.len())]
pub struct FillFailure {
    pub error: FillError,
    pub partial: Fill,
}

/// Errors raised while constructing a `Grid`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid must have at least one row and one column")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid template character '{ch}' at row {row}, column {col}")]
    InvalidCharacter { ch: char, row: usize, col: usize },
}

/// Errors raised while adding words to a `Lexicon`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexiconError {
    #[error("word list contains invalid word: \"{0}\"")]
    InvalidWord(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_missing_slots_is_fatal() {
        assert!(FillError::NoSolution.is_retryable());
        assert!(FillError::BacktrackLimitExceeded { limit: 10 }.is_retryable());
        assert!(FillError::BuildFailure { placed: 3, required: 10 }.is_retryable());
        assert!(FillError::Timeout.is_retryable());
        assert!(!FillError::NoSlotsFound.is_retryable());
    }

    #[test]
    fn test_messages_include_details() {
        let err = FillError::BuildFailure { placed: 3, required: 10 };
        assert_eq!(err.to_string(), "grid construction placed 3 words, 10 required");

        let err = GridError::Ragged { row: 2, expected: 5, found: 4 };
        assert_eq!(err.to_string(), "row 2 has 4 cells, expected 5");
    }
}
