//! wg-core: shared foundation for the wellgroup crates.
//!
//! Contains:
//! - ids (compact arena indices for groups and wells)
//! - numeric (Real, epsilons, guarded division)
//! - phase (fluid phases and their positions in rate vectors)
//! - cmode (control-mode vocabulary shared by schedule, state and controls)
//! - units (uom SI pressure + constructors)
//! - logger (deferred diagnostic sink)
//! - error (shared error type)

pub mod cmode;
pub mod error;
pub mod ids;
pub mod logger;
pub mod numeric;
pub mod phase;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use cmode::*;
pub use error::{WgError, WgResult};
pub use ids::*;
pub use logger::{DeferredLogger, DiagnosticSink, LogEntry, LogLevel};
pub use numeric::*;
pub use phase::{Phase, PhaseUsage, RateVector};
pub use units::*;
