//! The stateful OLRT partition-refinement engine and its public driver.
//!
//! Built on [`ltssim_core`]'s data structures:
//! - [`partition`]: the intrusive arena-indexed block partition
//! - [`config`]: `EngineConfig`/`QueueDiscipline` and the internal work queue
//! - [`engine`]: `SimEngine`, the stateful refinement algorithm itself
//! - [`driver`]: `compute_simulation`/`compute_simulation_seeded`/`compute_simulation_bounded`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod driver;
pub mod engine;
pub mod partition;

pub use config::{EngineConfig, EngineConfigBuilder, QueueDiscipline};
pub use driver::{compute_simulation, compute_simulation_bounded, compute_simulation_seeded};
pub use engine::SimEngine;
pub use partition::{Block, Partition};
