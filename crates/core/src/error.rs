//! Error types for simulation-preorder computation.
//!
//! Structural preconditions (dense contiguous ids, calling engine internals
//! out of order) are programmer errors and signal failure via
//! `debug_assert!`/panic, matching the original algorithm's `assert` use —
//! they are not represented here. This type covers the narrow, cheaply
//! checkable subset of caller-contract violations the seeded entry point
//! can reject before doing any work (see `compute_simulation_seeded`).

use crate::ids::StateId;
use thiserror::Error;

/// Result type alias for fallible simulation-preorder operations.
pub type SimResult<T> = std::result::Result<T, SimError>;

/// Errors returned by the seeded driver entry point.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A state id was assigned to more than one of the initial partition's
    /// blocks, or to both the partition and `final_states`.
    #[error("state {state:?} appears in more than one initial block")]
    PartitionOverlap {
        /// The state id that was seen twice.
        state: StateId,
    },

    /// A state id in the initial partition or `final_states` falls outside
    /// `[0, states)`.
    #[error("state {state:?} is out of range for an LTS with {states} states")]
    StateOutOfRange {
        /// The offending id.
        state: StateId,
        /// Number of states in the LTS.
        states: usize,
    },

    /// `output_size` requested more rows/columns than the LTS has states.
    #[error("output_size {output_size} exceeds the LTS's {states} states")]
    OutputSizeExceedsStates {
        /// Requested output size.
        output_size: usize,
        /// Number of states in the LTS.
        states: usize,
    },

    /// The initial relation supplied to the seeded entry point was not
    /// reflexive, or was not sized to the initial partition.
    #[error("initial relation is not a valid seed: {reason}")]
    InvalidInitialRelation {
        /// Human-readable description of what failed.
        reason: String,
    },
}
