//! wg-tree: the group/well control tree for one schedule step.
//!
//! Provides:
//! - Arena-backed tree of groups and wells (`GroupTree`) with parent/child indices
//! - Incremental builder with validation
//! - Control specifications and their resolution against the summary state
//! - The per-step schedule view: events, gas sales and consumption contracts
//!
//! # Example
//!
//! ```
//! use wg_tree::{TreeBuilder, WellRole};
//!
//! let mut builder = TreeBuilder::new();
//! builder.add_group("PLAT", "FIELD");
//! builder.add_well("P1", "PLAT", WellRole::Producer);
//! let tree = builder.build().unwrap();
//!
//! assert_eq!(tree.groups().len(), 2);
//! assert_eq!(tree.parent_name("P1"), Some("PLAT"));
//! ```

pub mod builder;
pub mod controls;
pub mod error;
pub mod schedule;
pub mod summary;
pub mod tree;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::TreeBuilder;
pub use controls::{
    InjectionControls, InjectionSpec, ProductionControls, ProductionSpec, Uda,
};
pub use error::TreeError;
pub use schedule::{GConSale, GConSump, GroupEvent, GroupEvents, ScheduleStep};
pub use summary::SummaryState;
pub use tree::{FIELD, Group, GroupTree, MAX_TREE_DEPTH, NodeRef, Well, WellRole};
