//! Error types for netlist emission.

use thiserror::Error;

/// Result type for emission.
pub type Result<T> = std::result::Result<T, Error>;

/// Emission failures are internal-consistency defects in the reduction
/// model, not recoverable input problems; there is no fallback output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A bit in stage `stage` has no producing cell and no name match in the
    /// previous stage's column.
    #[error("bit `{name}` in stage {stage} column {column} has no producer in the previous stage")]
    Provenance {
        name: String,
        stage: usize,
        column: usize,
    },

    /// A final-stage column holds more bits than the two output rows can
    /// carry.
    #[error("final stage column {column} holds {height} bits, cannot drive sum/carry")]
    UnreducedColumn { column: usize, height: usize },
}
