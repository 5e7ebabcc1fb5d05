//! # ltssim
//!
//! Computes the simulation preorder of a finite labelled transition system
//! via OLRT partition refinement (Henzinger–Henzinger–Kopke / Ranzato–Tapparo).
//!
//! ```no_run
//! use ltssim::{compute_simulation, Lts, LabelId, StateId};
//!
//! struct TwoStateChain;
//!
//! impl Lts for TwoStateChain {
//!     fn states(&self) -> usize { 2 }
//!     fn labels(&self) -> usize { 1 }
//!     fn pre(&self, _label: LabelId, state: StateId) -> &[StateId] {
//!         if state.index() == 1 { &[StateId(0)] } else { &[] }
//!     }
//!     fn post(&self, _label: LabelId, state: StateId) -> &[StateId] {
//!         if state.index() == 0 { &[StateId(1)] } else { &[] }
//!     }
//!     fn bw_labels(&self, state: StateId) -> &[LabelId] {
//!         if state.index() == 1 { &[LabelId(0)] } else { &[] }
//!     }
//! }
//!
//! let rel = compute_simulation(&TwoStateChain, 2);
//! assert!(rel.get(1, 0)); // state 1 has no moves, so it simulates into state 0
//! ```
//!
//! This crate re-exports [`ltssim_core`]'s domain types and
//! [`ltssim_engine`]'s driver as a single convenient facade.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use ltssim_core::{
    BinaryRelation, BlockId, CounterContext, CounterTable, Delta, LabelId, Lts, SimError,
    SimResult, SmartSet, StateId,
};
pub use ltssim_engine::{
    compute_simulation, compute_simulation_bounded, compute_simulation_seeded, Block, EngineConfig,
    EngineConfigBuilder, Partition, QueueDiscipline, SimEngine,
};
