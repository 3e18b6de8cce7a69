//! Bottom-up rate and reduction aggregation.
//!
//! Every sum counts a well only if this partition owns it, it is open and
//! it has the requested role. Each group level multiplies by its own
//! efficiency factor, so a well's contribution to an ancestor carries the
//! product of all efficiencies on the way up. Wells the partition does not
//! know are skipped.

use wg_core::{
    DiagnosticSink, GroupId, GuideRateInjTarget, InjectorCMode, Phase, PhaseUsage, ProducerCMode,
    Real, WgError, WgResult,
};
use wg_state::{GroupState, WellState};
use wg_tree::{GroupTree, ScheduleStep, SummaryState};

use crate::guide_rate::{GuideRateProvider, GuideRateTable};

fn sum_over_subtree(
    tree: &GroupTree,
    well_state: &WellState,
    group: GroupId,
    injector: bool,
    well_value: impl Fn(usize) -> Real,
) -> Real {
    let mut sums = vec![0.0; tree.groups().len()];
    for id in tree.subtree_post_order(group) {
        let g = tree.group(id);
        let mut rate: Real = g.groups.iter().map(|child| sums[child.slot()]).sum();
        for &wid in &g.wells {
            let well = tree.well(wid);
            let Some(index) = well_state.well_index(&well.name) else {
                continue;
            };
            if !well_state.is_owned(index) || !well.has_role(injector) || well.is_shut() {
                continue;
            }
            let value = well.efficiency * well_value(index);
            if injector {
                rate += value;
            } else {
                rate -= value;
            }
        }
        sums[id.slot()] = g.efficiency * rate;
    }
    sums[group.slot()]
}

/// Efficiency-weighted sum of one phase of `rates` over the wells beneath `group`.
///
/// `rates` is laid out like [`WellState::well_rates`]. Producer rates are
/// stored negative and subtracted, so a producing group sums to a
/// non-negative value.
pub fn sum_well_phase_rates(
    rates: &[Real],
    tree: &GroupTree,
    well_state: &WellState,
    group: GroupId,
    phase_pos: usize,
    injector: bool,
) -> Real {
    let np = well_state.num_phases();
    sum_over_subtree(tree, well_state, group, injector, |index| {
        rates.get(index * np + phase_pos).copied().unwrap_or(0.0)
    })
}

/// Surface rates of one phase summed beneath `group`.
pub fn sum_well_rates(
    tree: &GroupTree,
    well_state: &WellState,
    group: GroupId,
    phase_pos: usize,
    injector: bool,
) -> Real {
    sum_well_phase_rates(
        well_state.well_rates(),
        tree,
        well_state,
        group,
        phase_pos,
        injector,
    )
}

/// Reservoir-volume rates of one phase summed beneath `group`.
pub fn sum_well_res_rates(
    tree: &GroupTree,
    well_state: &WellState,
    group: GroupId,
    phase_pos: usize,
    injector: bool,
) -> Real {
    sum_well_phase_rates(
        well_state.well_reservoir_rates(),
        tree,
        well_state,
        group,
        phase_pos,
        injector,
    )
}

pub fn sum_solvent_rates(
    tree: &GroupTree,
    well_state: &WellState,
    group: GroupId,
    injector: bool,
) -> Real {
    sum_over_subtree(tree, well_state, group, injector, |index| {
        well_state.solvent_rate(index)
    })
}

/// True if the group's current mode lets its parent steer it (`FLD`/`NONE`).
pub(crate) fn participates(
    group_state: &GroupState,
    name: &str,
    is_production: bool,
    injection_phase: Phase,
) -> WgResult<bool> {
    Ok(if is_production {
        group_state.production_control(name)?.defers_to_parent()
    } else {
        group_state
            .injection_control(name, injection_phase)?
            .defers_to_parent()
    })
}

/// Number of wells beneath `group` taking part in its group control.
///
/// Descends only into participating subgroups and counts open GRUP wells
/// of the requested role.
/// `always_included_child` is counted (or descended into) regardless of
/// its mode.
pub fn group_controlled_wells(
    tree: &GroupTree,
    well_state: &WellState,
    group_state: &GroupState,
    group: &str,
    always_included_child: Option<&str>,
    is_production: bool,
    injection_phase: Phase,
) -> WgResult<usize> {
    let start = tree.require_group(group)?.id;
    let mut count = 0;
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        let g = tree.group(id);
        for &child in &g.groups {
            let name = tree.group(child).name.as_str();
            if always_included_child == Some(name)
                || participates(group_state, name, is_production, injection_phase)?
            {
                stack.push(child);
            }
        }
        for &wid in &g.wells {
            let well = tree.well(wid);
            if !well.has_role(!is_production) || well.is_shut() {
                continue;
            }
            let name = well.name.as_str();
            let grup = if is_production {
                well_state.is_production_grup(name)
            } else {
                well_state.is_injection_grup(name)
            };
            if grup || always_included_child == Some(name) {
                count += 1;
            }
        }
    }
    Ok(count)
}

/// Compute and store the reductions of `root` and every group beneath it.
///
/// A group's reduction is the part of its target already taken by
/// subordinates outside group control, scaled by its efficiency. Returns
/// the reduction of `root`.
pub fn update_group_target_reduction(
    tree: &GroupTree,
    root: GroupId,
    is_injector: bool,
    pu: &PhaseUsage,
    guide_rate: &dyn GuideRateProvider,
    well_state: &WellState,
    group_state: &mut GroupState,
) -> WgResult<Vec<Real>> {
    let np = pu.num_phases();
    let mut reductions: Vec<Vec<Real>> = vec![Vec::new(); tree.groups().len()];

    for id in tree.subtree_post_order(root) {
        let group = tree.group(id);
        let mut reduction = vec![0.0; np];

        for &sub_id in &group.groups {
            let sub = tree.group(sub_id);
            let sub_reduction = &reductions[sub_id.slot()];
            if is_injector {
                for phase in Phase::ALL {
                    let Some(pos) = pu.pos(phase) else {
                        continue;
                    };
                    if group_state
                        .injection_control(&sub.name, phase)?
                        .defers_to_parent()
                    {
                        reduction[pos] += sub_reduction[pos];
                    } else {
                        // Individually controlled: its actual rate is fixed.
                        reduction[pos] += sum_well_rates(tree, well_state, sub_id, pos, true);
                    }
                }
            } else {
                let individual = !group_state.production_control(&sub.name)?.defers_to_parent();
                let controlled = group_controlled_wells(
                    tree,
                    well_state,
                    group_state,
                    &sub.name,
                    None,
                    true,
                    Phase::Oil,
                )?;
                if individual || controlled == 0 {
                    for (pos, r) in reduction.iter_mut().enumerate() {
                        *r += sum_well_rates(tree, well_state, sub_id, pos, false);
                    }
                } else if !guide_rate.has(&sub.name) {
                    // A subgroup with its own guide rate gets an allocation instead.
                    for (r, s) in reduction.iter_mut().zip(sub_reduction) {
                        *r += s;
                    }
                }
            }
        }

        for &wid in &group.wells {
            let well = tree.well(wid);
            if !well.has_role(is_injector) || well.is_shut() {
                continue;
            }
            let Some(index) = well_state.well_index(&well.name) else {
                continue;
            };
            if !well_state.is_owned(index) {
                continue;
            }
            let rates = well_state.rates_of(index);
            if is_injector {
                if well_state.injection_cmode(index) != InjectorCMode::Grup {
                    for (r, w) in reduction.iter_mut().zip(rates) {
                        *r += w * well.efficiency;
                    }
                }
            } else if well_state.production_cmode(index) != ProducerCMode::Grup {
                for (r, w) in reduction.iter_mut().zip(rates) {
                    *r -= w * well.efficiency;
                }
            }
        }

        for r in &mut reduction {
            *r *= group.efficiency;
        }
        if is_injector {
            group_state.update_injection_reduction_rates(group.name.as_str(), reduction.clone())?;
        } else {
            group_state.update_production_reduction_rates(group.name.as_str(), reduction.clone())?;
        }
        reductions[id.slot()] = reduction;
    }

    let root_reduction = std::mem::take(&mut reductions[root.slot()]);
    tracing::debug!(
        group = tree.group(root).name.as_str(),
        is_injector,
        reduction = ?root_reduction,
        "group target reductions updated"
    );
    Ok(root_reduction)
}

/// Store each group's production voidage (reservoir rates of producers, all phases).
pub fn update_vrep_for_groups(
    tree: &GroupTree,
    root: GroupId,
    well_state: &WellState,
    group_state: &mut GroupState,
) {
    let np = well_state.num_phases();
    for id in tree.subtree_post_order(root) {
        let resv: Real = (0..np)
            .map(|pos| sum_well_res_rates(tree, well_state, id, pos, false))
            .sum();
        group_state.update_injection_vrep_rate(tree.group(id).name.as_str(), resv);
    }
}

/// Store each group's reservoir-volume injection rates per phase.
pub fn update_reservoir_rates_injection_groups(
    tree: &GroupTree,
    root: GroupId,
    well_state: &WellState,
    group_state: &mut GroupState,
) -> WgResult<()> {
    let np = well_state.num_phases();
    for id in tree.subtree_post_order(root) {
        let resv = (0..np)
            .map(|pos| sum_well_res_rates(tree, well_state, id, pos, true))
            .collect();
        group_state.update_injection_reservoir_rates(tree.group(id).name.as_str(), resv)?;
    }
    Ok(())
}

/// Copy each well's rates into the positive-for-both-roles convention.
///
/// Wells the partition does not know get zero rates.
pub fn update_well_rates(tree: &GroupTree, root: GroupId, well_state: &mut WellState) {
    let np = well_state.num_phases();
    for id in tree.subtree_post_order(root) {
        for &wid in &tree.group(id).wells {
            let well = tree.well(wid);
            let rates = match well_state.well_index(&well.name) {
                Some(index) => {
                    let sign = if well.is_injector() { 1.0 } else { -1.0 };
                    well_state
                        .rates_of(index)
                        .iter()
                        .map(|r| sign * r)
                        .collect()
                }
                None => vec![0.0; np],
            };
            well_state.set_current_well_rates(well.name.as_str(), rates);
        }
    }
}

/// Store each group's production surface rates (positive).
pub fn update_group_production_rates(
    tree: &GroupTree,
    root: GroupId,
    well_state: &WellState,
    group_state: &mut GroupState,
) -> WgResult<()> {
    let np = well_state.num_phases();
    for id in tree.subtree_post_order(root) {
        let rates = (0..np)
            .map(|pos| sum_well_rates(tree, well_state, id, pos, false))
            .collect();
        group_state.update_production_rates(tree.group(id).name.as_str(), rates)?;
    }
    tracing::debug!(
        group = tree.group(root).name.as_str(),
        "group production rates updated"
    );
    Ok(())
}

/// Store each group's reinjection (REIN) rates.
///
/// REIN is the group's production, plus gas import and minus gas
/// consumption when the group has a consumption contract.
pub fn update_rein_for_groups(
    step: &ScheduleStep,
    summary: &SummaryState,
    pu: &PhaseUsage,
    root: GroupId,
    well_state: &WellState,
    group_state: &mut GroupState,
) -> WgResult<()> {
    let tree = &step.tree;
    let np = well_state.num_phases();
    for id in tree.subtree_post_order(root) {
        let name = tree.group(id).name.as_str();
        let mut rein: Vec<Real> = (0..np)
            .map(|pos| sum_well_rates(tree, well_state, id, pos, false))
            .collect();
        if let (Some(gconsump), Some(gas)) = (step.gconsump(name), pu.pos(Phase::Gas)) {
            let (import, consumption) = gconsump.rates(summary)?;
            rein[gas] += import;
            rein[gas] -= consumption;
        }
        group_state.update_injection_rein_rates(name, rein)?;
    }
    tracing::debug!(group = tree.group(root).name.as_str(), "REIN rates updated");
    Ok(())
}

/// Guide-rate value an injection group derives from its guide-rate definition.
///
/// `VOID` uses the group's voidage, `NETV` the voidage net of the other
/// phases' reservoir injection. `RATE`, `POTN` and no definition give 0.
pub fn injection_guide_rate_value(
    def: GuideRateInjTarget,
    group: &str,
    phase: Phase,
    pu: &PhaseUsage,
    group_state: &GroupState,
    logger: &mut dyn DiagnosticSink,
) -> WgResult<Real> {
    match def {
        GuideRateInjTarget::Rate | GuideRateInjTarget::Potn | GuideRateInjTarget::NoGuideRate => {
            Ok(0.0)
        }
        GuideRateInjTarget::Void => group_state.injection_vrep_rate(group),
        GuideRateInjTarget::Netv => {
            let mut value = group_state.injection_vrep_rate(group)?;
            let injected = group_state.injection_reservoir_rates(group)?;
            for other in pu.active_phases().filter(|p| *p != phase) {
                value -= pu.rate(injected, other);
            }
            Ok(value)
        }
        GuideRateInjTarget::Resv => {
            let what = format!("guide phase RESV for group {}", group);
            logger.error(&format!("{} is not implemented", what));
            Err(WgError::Unimplemented { what })
        }
    }
}

/// Refresh the injection guide rates of every injection group beneath `root`.
///
/// Groups without a guide-rate definition are left alone. A non-positive
/// computed value falls back to the configured guide rate, except for
/// `POTN` which keeps its previous entry.
pub fn update_guide_rates_for_injection_groups(
    step: &ScheduleStep,
    summary: &SummaryState,
    pu: &PhaseUsage,
    root: GroupId,
    group_state: &GroupState,
    guide_rates: &mut GuideRateTable,
    logger: &mut dyn DiagnosticSink,
) -> WgResult<()> {
    let tree = &step.tree;
    for id in tree.subtree_post_order(root) {
        let group = tree.group(id);
        for phase in Phase::ALL {
            let Some(spec) = group.injection_spec(phase) else {
                continue;
            };
            let controls = spec.resolve(&group.name, summary)?;
            if controls.guide_rate_def == GuideRateInjTarget::NoGuideRate {
                continue;
            }
            let value = injection_guide_rate_value(
                controls.guide_rate_def,
                &group.name,
                phase,
                pu,
                group_state,
                logger,
            )?;
            if value > 0.0 {
                guide_rates.set_injection(group.name.as_str(), phase, value);
            } else if controls.guide_rate_def != GuideRateInjTarget::Potn {
                guide_rates.set_injection(group.name.as_str(), phase, spec.guide_rate);
            }
            tracing::trace!(
                group = group.name.as_str(),
                %phase,
                value,
                "injection guide rate evaluated"
            );
        }
    }
    Ok(())
}
