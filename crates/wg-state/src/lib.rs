//! Mutable simulation state read and written by the group-control passes.
//!
//! - [`WellState`]: per-well signed phase rates (producers negative,
//!   injectors positive), reservoir and solvent rates, lift gas, current
//!   control modes and the partition ownership flag.
//! - [`GroupState`]: per-group control modes, reductions, aggregated rates,
//!   REIN/VREP bookkeeping and sales-derived gas targets.
//!
//! Neither type synchronizes internally: the caller orders the resolver and
//! aggregation passes before any constraint check of the same iteration.

pub mod group_state;
pub mod well_state;

pub use group_state::GroupState;
pub use well_state::WellState;
