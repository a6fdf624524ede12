//! Failure kinds of the preprocessing and query layers.
//!
//! A missing path is not an error but the `None` arm of the query result.
//! Inconsistencies inside the contractor inner loops are programming faults
//! and assert instead of returning.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Rejected input data: nonpositive or oversized weight, a restriction
    /// referencing unknown nodes, or an edge endpoint out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A shortcut via id that maps to neither the current nor the original
    /// node id space. Fatal.
    #[error("graph inconsistency: {0}")]
    GraphInconsistency(String),
    /// I/O failure on the edge spill file or an output blob.
    #[error("resource failure: {0}")]
    Resource(#[from] std::io::Error),
    /// A query exceeded its settled node cap.
    #[error("query cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
