//! Domain types and data structures for simulation-preorder computation.
//!
//! This crate defines the pieces the `ltssim-engine` refinement engine is
//! built from:
//! - [`ids`]: dense `StateId`/`LabelId`/`BlockId` newtypes
//! - [`error`]: `SimError`, the caller-facing error type
//! - [`matrix`]: `BinaryRelation`, the quotient relation matrix
//! - [`smart_set`]: `SmartSet`, the sparse dense-integer multiset
//! - [`lts`]: the `Lts` trait and `delta`/`delta1` derivation
//! - [`counter`]: `CounterTable`, the per-block per-label edge counter

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod counter;
pub mod error;
pub mod ids;
pub mod lts;
pub mod matrix;
pub mod smart_set;

pub use counter::{CounterContext, CounterTable};
pub use error::{SimError, SimResult};
pub use ids::{BlockId, LabelId, StateId};
pub use lts::{build_delta, Delta, Lts};
pub use matrix::BinaryRelation;
pub use smart_set::SmartSet;
