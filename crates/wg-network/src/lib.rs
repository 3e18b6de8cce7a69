//! wg-network: surface network pressure propagation.
//!
//! Provides:
//! - Network model (nodes named after groups, branches with optional VFP tables)
//! - Builder with topology validation
//! - VFP evaluator trait and a linear stand-in table set
//! - Two-pass pressure propagation driven by group production rates
//!
//! # Example
//!
//! ```
//! use wg_core::bar;
//! use wg_network::{NetworkBuilder, vfp_table_from_id};
//!
//! let mut builder = NetworkBuilder::new();
//! builder.add_node("SEP", Some(bar(50.0)));
//! builder.add_node("PLAT", None);
//! builder.add_branch("SEP", "PLAT", vfp_table_from_id(9999));
//! let network = builder.build().unwrap();
//!
//! assert!(network.active());
//! assert_eq!(network.uptree_branch("PLAT").unwrap().vfp_table, None);
//! ```

pub mod error;
pub mod network;
pub mod pressure;
pub mod vfp;

pub use error::NetworkError;
pub use network::{
    Branch, NO_PRESSURE_LOSS_TABLE, Network, NetworkBuilder, NetworkNode, vfp_table_from_id,
};
pub use pressure::compute_network_pressures;
pub use vfp::{LinearVfpTable, LinearVfpTables, VfpEvaluator};
