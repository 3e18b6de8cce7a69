//! One control step over a compiled case.

use serde::Serialize;
use std::collections::BTreeMap;
use wg_controls::{
    GroupContext, check_group_constraints_inj, check_group_constraints_prod, prepare_iteration,
    well_group_target_inj, well_group_target_prod,
};
use wg_core::{DiagnosticSink, InjectionCMode, Phase, in_bar};
use wg_network::compute_network_pressures;
use wg_tree::{Well, WellRole};

use crate::ProjectResult;
use crate::compile::{CompiledCase, active_phases};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StepReport {
    pub case: String,
    /// Active phases, in the order of every rate vector below.
    pub phases: Vec<Phase>,
    pub groups: Vec<GroupReport>,
    pub wells: Vec<WellReport>,
    pub network_pressures_bar: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupReport {
    pub name: String,
    pub production_cmode: String,
    /// Injection mode per phase, for phases other than `NONE`.
    pub injection_cmodes: BTreeMap<String, String>,
    pub production_rates: Vec<f64>,
    pub production_reduction: Vec<f64>,
    pub injection_reduction: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WellReport {
    pub name: String,
    pub group: String,
    /// Rate assigned by the controlling group; absent when no group control reaches the well.
    pub group_target: Option<f64>,
    pub violated: bool,
    pub scale: f64,
}

/// Prepare the group controls, evaluate every well against its group
/// target and propagate network pressures.
pub fn run_step(
    case: &mut CompiledCase,
    logger: &mut dyn DiagnosticSink,
) -> ProjectResult<StepReport> {
    prepare_iteration(
        &case.step,
        &case.summary,
        &mut case.guide_rates,
        &mut case.well_state,
        &mut case.group_state,
        logger,
    )?;

    let tree = &case.step.tree;
    let ctx = GroupContext::new(
        &case.step,
        &case.summary,
        &case.well_state,
        &case.group_state,
        &case.guide_rates,
    );

    let mut wells = Vec::with_capacity(tree.wells().len());
    for well in tree.wells() {
        if let Some(report) = evaluate_well(&ctx, well, &case.resv_coeff, logger)? {
            wells.push(report);
        }
    }

    let mut groups = Vec::with_capacity(tree.groups().len());
    for group in tree.groups() {
        let name = group.name.as_str();
        let mut injection_cmodes = BTreeMap::new();
        for phase in case.pu.active_phases() {
            let cmode = case.group_state.injection_control(name, phase)?;
            if cmode != InjectionCMode::None {
                injection_cmodes.insert(phase.to_string(), cmode.to_string());
            }
        }
        groups.push(GroupReport {
            name: name.to_owned(),
            production_cmode: case.group_state.production_control(name)?.to_string(),
            injection_cmodes,
            production_rates: case.group_state.production_rates(name)?.to_vec(),
            production_reduction: case.group_state.production_reduction_rates(name)?.to_vec(),
            injection_reduction: case.group_state.injection_reduction_rates(name)?.to_vec(),
        });
    }

    let pressures = compute_network_pressures(
        &case.network,
        tree,
        &case.well_state,
        &case.group_state,
        &case.pu,
        &case.vfp,
    )?;
    let network_pressures_bar = pressures
        .into_iter()
        .map(|(node, p)| (node, in_bar(p)))
        .collect();

    tracing::info!(
        case = case.name.as_str(),
        wells = wells.len(),
        violations = wells.iter().filter(|w| w.violated).count(),
        "control step evaluated"
    );

    Ok(StepReport {
        case: case.name.clone(),
        phases: active_phases(&case.pu),
        groups,
        wells,
        network_pressures_bar,
    })
}

/// Group target and constraint verdict of one well; `None` for wells this
/// partition does not own or that are shut.
fn evaluate_well(
    ctx: &GroupContext<'_>,
    well: &Well,
    resv_coeff: &[f64],
    logger: &mut dyn DiagnosticSink,
) -> ProjectResult<Option<WellReport>> {
    let Some(index) = ctx.well_state.well_index(&well.name) else {
        return Ok(None);
    };
    if !ctx.well_state.is_owned(index) || well.is_shut() {
        return Ok(None);
    }
    let group = ctx.tree().group(well.group).name.as_str();
    let rates = ctx.well_state.rates_of(index);

    let (group_target, (violated, scale)) = match well.role {
        WellRole::Producer => (
            well_group_target_prod(ctx, &well.name, resv_coeff)?,
            check_group_constraints_prod(
                ctx,
                &well.name,
                group,
                rates,
                well.efficiency,
                resv_coeff,
                logger,
            )?,
        ),
        WellRole::Injector(phase) => (
            well_group_target_inj(ctx, &well.name, phase, resv_coeff)?,
            check_group_constraints_inj(
                ctx,
                &well.name,
                group,
                rates,
                phase,
                well.efficiency,
                resv_coeff,
                logger,
            )?,
        ),
    };

    Ok(Some(WellReport {
        name: well.name.clone(),
        group: group.to_owned(),
        group_target,
        violated,
        scale,
    }))
}
