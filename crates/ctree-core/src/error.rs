//! Error types for model construction.

use thiserror::Error;

/// Result type for model construction.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Rejected before any heap is built.
    #[error("operand width must be at least 1, got {0}")]
    InvalidWidth(usize),

    /// Booth radix-4 requires a signed interpretation of the multiplier.
    #[error("unsigned Booth multiplication is not supported")]
    UnsignedBooth,

    /// A reduction policy failed to reach its termination condition within
    /// the safety bound. The partial stage list is discarded, never returned.
    #[error("reduction did not converge within {limit} stages")]
    NonConvergence { limit: usize },

    /// Prefix trees are generated for adder widths between 2 and 256.
    #[error("prefix tree width must be between 2 and 256, got {0}")]
    InvalidPrefixWidth(usize),
}
