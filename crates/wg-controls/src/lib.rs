//! Group control passes over a well/group tree.
//!
//! The passes run in a fixed order each iteration:
//!
//! - [`resolver`]: freeze every group's production and injection modes
//! - [`aggregate`]: bottom-up rates, REIN/VREP bookkeeping and reductions
//! - [`constraints`]: per-node checks against the controlling group's target
//!
//! [`fraction`] turns guide rates into shares of a target and [`target`]
//! maps control modes onto the quantity they limit. [`prepare`] runs the
//! resolver and aggregation passes in order.
//!
//! # Example
//!
//! ```
//! use wg_controls::{GroupContext, GuideRateTable, prepare_iteration, well_group_target_prod};
//! use wg_core::{DeferredLogger, GuideRateTarget, PhaseUsage, ProducerCMode, ProductionCMode};
//! use wg_state::{GroupState, WellState};
//! use wg_tree::{GroupEvent, ProductionSpec, ScheduleStep, SummaryState, TreeBuilder, Uda, WellRole};
//!
//! let mut builder = TreeBuilder::new();
//! let g = builder.add_group("G", "FIELD");
//! let mut spec = ProductionSpec::new(ProductionCMode::Orat);
//! spec.oil_target = Uda::Value(1000.0);
//! builder.set_production(g, spec);
//! builder.add_well("A", "G", WellRole::Producer);
//! builder.add_well("B", "G", WellRole::Producer);
//! let mut step = ScheduleStep::new(builder.build().unwrap());
//! step.events.add("G", GroupEvent::ProductionUpdate);
//!
//! let mut wells = WellState::new(PhaseUsage::three_phase());
//! for name in ["A", "B"] {
//!     wells.add_well(name, true);
//!     wells.set_production_cmode(name, ProducerCMode::Grup).unwrap();
//! }
//! let mut groups = GroupState::new(3);
//! let mut guide = GuideRateTable::new();
//! guide.set("A", 3.0, GuideRateTarget::Oil);
//! guide.set("B", 1.0, GuideRateTarget::Oil);
//!
//! let summary = SummaryState::new();
//! let mut log = DeferredLogger::new();
//! prepare_iteration(&step, &summary, &mut guide, &mut wells, &mut groups, &mut log).unwrap();
//!
//! let ctx = GroupContext::new(&step, &summary, &wells, &groups, &guide);
//! let target = well_group_target_prod(&ctx, "A", &[]).unwrap();
//! assert_eq!(target, Some(750.0));
//! ```

pub mod aggregate;
pub mod constraints;
pub mod fraction;
pub mod guide_rate;
pub mod prepare;
pub mod resolver;
pub mod target;

pub use aggregate::{
    group_controlled_wells, injection_guide_rate_value, sum_solvent_rates, sum_well_phase_rates,
    sum_well_rates, sum_well_res_rates, update_group_production_rates,
    update_group_target_reduction, update_guide_rates_for_injection_groups,
    update_rein_for_groups, update_reservoir_rates_injection_groups, update_vrep_for_groups,
    update_well_rates,
};
pub use constraints::{
    GroupContext, check_group_constraints_inj, check_group_constraints_prod,
    well_group_target_inj, well_group_target_prod,
};
pub use fraction::{FractionCalculator, guide_rate_inj, guide_rate_prod};
pub use guide_rate::{GuideRateProvider, GuideRateTable};
pub use prepare::prepare_iteration;
pub use resolver::set_cmode_group;
pub use target::{
    InjectionTarget, InjectionTargetCalculator, ProductionTarget, ProductionTargetCalculator,
};
