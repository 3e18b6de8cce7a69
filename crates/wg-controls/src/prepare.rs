//! Per-iteration preparation: the resolver and aggregation passes in order.

use wg_core::{DiagnosticSink, WgResult};
use wg_state::{GroupState, WellState};
use wg_tree::{ScheduleStep, SummaryState};

use crate::aggregate;
use crate::guide_rate::GuideRateTable;
use crate::resolver;

/// Run every pass constraint checks depend on, over the whole tree.
///
/// Order: control modes, well rates, group production rates, VREP,
/// reservoir injection rates, REIN, injection guide rates, then production
/// and injection reductions. Everything reads the rates currently stored in
/// `well_state`.
pub fn prepare_iteration(
    step: &ScheduleStep,
    summary: &SummaryState,
    guide_rates: &mut GuideRateTable,
    well_state: &mut WellState,
    group_state: &mut GroupState,
    logger: &mut dyn DiagnosticSink,
) -> WgResult<()> {
    let tree = &step.tree;
    let field = tree.field().id;
    let pu = *well_state.phase_usage();

    tracing::debug!(
        groups = tree.groups().len(),
        wells = tree.wells().len(),
        "preparing group controls"
    );

    resolver::set_cmode_group(step, summary, group_state, field, logger)?;
    aggregate::update_well_rates(tree, field, well_state);
    aggregate::update_group_production_rates(tree, field, well_state, group_state)?;
    aggregate::update_vrep_for_groups(tree, field, well_state, group_state);
    aggregate::update_reservoir_rates_injection_groups(tree, field, well_state, group_state)?;
    aggregate::update_rein_for_groups(step, summary, &pu, field, well_state, group_state)?;
    aggregate::update_guide_rates_for_injection_groups(
        step,
        summary,
        &pu,
        field,
        group_state,
        guide_rates,
        logger,
    )?;
    for is_injector in [false, true] {
        aggregate::update_group_target_reduction(
            tree,
            field,
            is_injector,
            &pu,
            &*guide_rates,
            well_state,
            group_state,
        )?;
    }

    tracing::debug!("group controls prepared");
    Ok(())
}
