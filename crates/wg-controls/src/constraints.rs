//! Group constraint checks.
//!
//! A well or group under group control walks up through `FLD`/`NONE`
//! groups to the group whose own control governs it. That group's target
//! is carried back down the chain: each level with a guide rate (and the
//! top) subtracts its reduction, and the share passed on is the next
//! node's local guide-rate fraction.

use wg_core::{
    DiagnosticSink, InjectionCMode, MIN_TARGET_RATE, Phase, PhaseUsage, ProductionCMode, Real,
    WgError, WgResult,
};
use wg_state::{GroupState, WellState};
use wg_tree::{Group, GroupTree, NodeRef, ScheduleStep, SummaryState};

use crate::fraction::FractionCalculator;
use crate::guide_rate::GuideRateProvider;
use crate::target::{InjectionTargetCalculator, ProductionTargetCalculator};

/// Everything a constraint check reads, for one iteration.
#[derive(Clone, Copy)]
pub struct GroupContext<'a> {
    pub step: &'a ScheduleStep,
    pub summary: &'a SummaryState,
    pub well_state: &'a WellState,
    pub group_state: &'a GroupState,
    pub guide_rate: &'a dyn GuideRateProvider,
    pub pu: PhaseUsage,
}

impl<'a> GroupContext<'a> {
    pub fn new(
        step: &'a ScheduleStep,
        summary: &'a SummaryState,
        well_state: &'a WellState,
        group_state: &'a GroupState,
        guide_rate: &'a dyn GuideRateProvider,
    ) -> Self {
        Self {
            step,
            summary,
            well_state,
            group_state,
            guide_rate,
            pu: *well_state.phase_usage(),
        }
    }

    pub fn tree(&self) -> &'a GroupTree {
        &self.step.tree
    }
}

/// Per-role hooks used while walking the chain below the controlling group.
trait Allocation {
    fn has_guide_rate(&self, name: &str) -> bool;
    fn local_reduction(&self, group: &str) -> WgResult<Real>;
    fn controlled_wells(&self, group: &str) -> WgResult<usize>;
    fn local_fraction(&self, child: &str) -> WgResult<Real>;
}

struct ProductionAllocation<'a> {
    group_state: &'a GroupState,
    guide_rate: &'a dyn GuideRateProvider,
    tcalc: &'a ProductionTargetCalculator,
    fcalc: FractionCalculator<'a>,
    name: &'a str,
}

impl Allocation for ProductionAllocation<'_> {
    fn has_guide_rate(&self, name: &str) -> bool {
        self.guide_rate.has(name)
    }

    fn local_reduction(&self, group: &str) -> WgResult<Real> {
        Ok(self
            .tcalc
            .rate_from_rates(self.group_state.production_reduction_rates(group)?))
    }

    fn controlled_wells(&self, group: &str) -> WgResult<usize> {
        self.fcalc.group_controlled_wells(group, None)
    }

    fn local_fraction(&self, child: &str) -> WgResult<Real> {
        self.fcalc.local_fraction(child, Some(self.name))
    }
}

struct InjectionAllocation<'a> {
    group_state: &'a GroupState,
    guide_rate: &'a dyn GuideRateProvider,
    tcalc: &'a InjectionTargetCalculator,
    fcalc: FractionCalculator<'a>,
    name: &'a str,
    phase: Phase,
}

impl Allocation for InjectionAllocation<'_> {
    fn has_guide_rate(&self, name: &str) -> bool {
        self.guide_rate.has_injection(name, self.phase)
    }

    fn local_reduction(&self, group: &str) -> WgResult<Real> {
        Ok(self
            .tcalc
            .rate_from_rates(self.group_state.injection_reduction_rates(group)?))
    }

    fn controlled_wells(&self, group: &str) -> WgResult<usize> {
        self.fcalc.group_controlled_wells(group, None)
    }

    fn local_fraction(&self, child: &str) -> WgResult<Real> {
        self.fcalc.local_fraction(child, Some(self.name))
    }
}

/// Carry `orig_target` from the top of `chain` down to its last element.
///
/// `own_rate` (already efficiency-scaled) is added back once, at the lowest
/// level where the node was counted in a reduction: the deepest ancestor
/// carrying a guide rate, or the controlling group.
fn allocate(
    alloc: &impl Allocation,
    chain: &[&str],
    orig_target: Real,
    own_rate: Option<Real>,
) -> WgResult<Real> {
    let num_ancestors = chain.len() - 1;
    let mut local_reduction_level = 0;
    for (ii, name) in chain.iter().enumerate().take(num_ancestors) {
        if ii == 0 || alloc.has_guide_rate(name) {
            local_reduction_level = ii;
        }
    }

    let mut target = orig_target;
    for ii in 0..num_ancestors {
        if ii == 0 || alloc.has_guide_rate(chain[ii]) {
            target -= alloc.local_reduction(chain[ii])?;
            if ii == local_reduction_level {
                if let Some(own) = own_rate {
                    target += own;
                }
            }
        }
        // A subgroup without group-controlled wells was reduced by its
        // actual rate; with its own guide rate it gets that back here.
        if ii + 1 < num_ancestors
            && alloc.controlled_wells(chain[ii + 1])? == 0
            && alloc.has_guide_rate(chain[ii + 1])
        {
            target += alloc.local_reduction(chain[ii + 1])?;
        }
        target *= alloc.local_fraction(chain[ii + 1])?;
    }
    Ok(target)
}

/// Walk up from `group` through groups deferring to their parent.
///
/// Returns the controlling group, its mode and the efficiency accumulated
/// below it; `None` if some group on the way is not available for its
/// parent's control or the top group has no production controls.
fn controlling_production_group<'t>(
    ctx: &GroupContext<'t>,
    group: &'t Group,
    efficiency: Real,
) -> WgResult<Option<(&'t Group, ProductionCMode, Real)>> {
    let tree = ctx.tree();
    let mut group = group;
    let mut efficiency = efficiency;
    loop {
        let cmode = ctx.group_state.production_control(&group.name)?;
        if !cmode.defers_to_parent() {
            if !group.is_production_group() {
                return Ok(None);
            }
            return Ok(Some((group, cmode, efficiency)));
        }
        if !group.production_group_control_available() {
            return Ok(None);
        }
        efficiency *= group.efficiency;
        group = tree.group(parent_id(group)?);
    }
}

fn controlling_injection_group<'t>(
    ctx: &GroupContext<'t>,
    group: &'t Group,
    phase: Phase,
    efficiency: Real,
) -> WgResult<Option<(&'t Group, InjectionCMode, Real)>> {
    let tree = ctx.tree();
    let mut group = group;
    let mut efficiency = efficiency;
    loop {
        let cmode = ctx.group_state.injection_control(&group.name, phase)?;
        if !cmode.defers_to_parent() {
            if !group.is_injection_group() {
                return Ok(None);
            }
            return Ok(Some((group, cmode, efficiency)));
        }
        if !group.injection_group_control_available(phase) {
            return Ok(None);
        }
        efficiency *= group.efficiency;
        group = tree.group(parent_id(group)?);
    }
}

fn parent_id(group: &Group) -> WgResult<wg_core::GroupId> {
    group.parent.ok_or_else(|| WgError::Invariant {
        what: format!("group {} defers to a parent it does not have", group.name),
    })
}

fn sales_target(ctx: &GroupContext<'_>, group: &str) -> WgResult<Real> {
    match ctx.step.gconsale(group) {
        Some(sale) => sale.sales_target(ctx.summary),
        None => Ok(0.0),
    }
}

/// Violation flag and rate scale from a current rate and its target.
fn verdict(current_rate: Real, target: Real, efficiency: Real) -> (bool, Real) {
    let target_rate = (target / efficiency).max(MIN_TARGET_RATE);
    let scale = if current_rate > MIN_TARGET_RATE {
        target_rate / current_rate
    } else {
        1.0
    };
    (current_rate > target_rate, scale)
}

/// Check `name`'s production against the target it gets from its controlling group.
///
/// `group` is where the walk starts (the parent of `name`), `rates` the
/// node's signed phase rates and `efficiency_factor` its own efficiency.
/// Returns whether the current rate exceeds the target and the factor that
/// would bring it onto the target; `(false, 1.0)` when no group control
/// applies.
pub fn check_group_constraints_prod(
    ctx: &GroupContext<'_>,
    name: &str,
    group: &str,
    rates: &[Real],
    efficiency_factor: Real,
    resv_coeff: &[Real],
    logger: &mut dyn DiagnosticSink,
) -> WgResult<(bool, Real)> {
    let tree = ctx.tree();
    let start = tree.require_group(group)?;
    let Some((control, cmode, efficiency)) =
        controlling_production_group(ctx, start, efficiency_factor)?
    else {
        return Ok((false, 1.0));
    };

    let sales = ctx.group_state.grat_sales_target(&control.name).unwrap_or(0.0);
    let tcalc = ProductionTargetCalculator::new(cmode, ctx.pu, resv_coeff, sales)?;
    let alloc = production_allocation(ctx, &tcalc, name);

    let orig_target = tcalc.group_target(&control.production_controls(ctx.summary)?);
    // Producer rates are stored negative.
    let current_rate = -tcalc.rate_from_rates(rates);
    let chain = tree.chain_top_bot(name, &control.name)?;
    let efficiency = efficiency * control.efficiency;
    let target = allocate(&alloc, &chain, orig_target, Some(current_rate * efficiency))?;

    let (violated, scale) = verdict(current_rate, target, efficiency);
    if violated {
        logger.debug(&format!(
            "{} exceeds its {} share of group {} (scale {:.4})",
            name, cmode, control.name, scale
        ));
    }
    Ok((violated, scale))
}

/// Injection counterpart of [`check_group_constraints_prod`] for one phase.
#[allow(clippy::too_many_arguments)]
pub fn check_group_constraints_inj(
    ctx: &GroupContext<'_>,
    name: &str,
    group: &str,
    rates: &[Real],
    phase: Phase,
    efficiency_factor: Real,
    resv_coeff: &[Real],
    logger: &mut dyn DiagnosticSink,
) -> WgResult<(bool, Real)> {
    let tree = ctx.tree();
    let start = tree.require_group(group)?;
    let Some((control, cmode, efficiency)) =
        controlling_injection_group(ctx, start, phase, efficiency_factor)?
    else {
        return Ok((false, 1.0));
    };

    let sales = sales_target(ctx, &control.name)?;
    let tcalc =
        InjectionTargetCalculator::new(cmode, ctx.pu, resv_coeff, control.name.as_str(), sales, phase)?;
    let alloc = injection_allocation(ctx, &tcalc, name, phase);

    let controls = control.injection_controls(phase, ctx.summary)?;
    let orig_target = tcalc.group_target(&controls, ctx.group_state)?;
    let current_rate = tcalc.rate_from_rates(rates);
    let chain = tree.chain_top_bot(name, &control.name)?;
    let efficiency = efficiency * control.efficiency;
    let target = allocate(&alloc, &chain, orig_target, Some(current_rate * efficiency))?;

    let (violated, scale) = verdict(current_rate, target, efficiency);
    if violated {
        logger.debug(&format!(
            "{} exceeds its {} {} share of group {} (scale {:.4})",
            name, phase, cmode, control.name, scale
        ));
    }
    Ok((violated, scale))
}

fn production_allocation<'a>(
    ctx: &GroupContext<'a>,
    tcalc: &'a ProductionTargetCalculator,
    name: &'a str,
) -> ProductionAllocation<'a> {
    ProductionAllocation {
        group_state: ctx.group_state,
        guide_rate: ctx.guide_rate,
        tcalc,
        fcalc: FractionCalculator::new(
            ctx.tree(),
            ctx.well_state,
            ctx.group_state,
            ctx.guide_rate,
            tcalc.guide_target(),
            ctx.pu,
            true,
            Phase::Oil,
        ),
        name,
    }
}

fn injection_allocation<'a>(
    ctx: &GroupContext<'a>,
    tcalc: &'a InjectionTargetCalculator,
    name: &'a str,
    phase: Phase,
) -> InjectionAllocation<'a> {
    InjectionAllocation {
        group_state: ctx.group_state,
        guide_rate: ctx.guide_rate,
        tcalc,
        fcalc: FractionCalculator::new(
            ctx.tree(),
            ctx.well_state,
            ctx.group_state,
            ctx.guide_rate,
            tcalc.guide_target(),
            ctx.pu,
            false,
            phase,
        ),
        name,
        phase,
    }
}

/// Starting group and own efficiency of a well or group.
fn start_of<'t>(tree: &'t GroupTree, name: &str) -> WgResult<(&'t Group, Real)> {
    match tree.lookup(name) {
        Some(NodeRef::Well(id)) => {
            let well = tree.well(id);
            Ok((tree.group(well.group), well.efficiency))
        }
        Some(NodeRef::Group(id)) => {
            let group = tree.group(id);
            Ok((tree.group(parent_id(group)?), group.efficiency))
        }
        None => Err(WgError::unknown_node(name)),
    }
}

/// Production target handed to `name` by its controlling group.
///
/// Same walk as the constraint check, without adding the node's own rate
/// back, so it is the rate `name` would be assigned under group control.
/// `None` when no group control reaches `name`.
pub fn well_group_target_prod(
    ctx: &GroupContext<'_>,
    name: &str,
    resv_coeff: &[Real],
) -> WgResult<Option<Real>> {
    let tree = ctx.tree();
    let (start, own_efficiency) = start_of(tree, name)?;
    let Some((control, cmode, efficiency)) =
        controlling_production_group(ctx, start, own_efficiency)?
    else {
        return Ok(None);
    };
    let sales = ctx.group_state.grat_sales_target(&control.name).unwrap_or(0.0);
    let tcalc = ProductionTargetCalculator::new(cmode, ctx.pu, resv_coeff, sales)?;
    let alloc = production_allocation(ctx, &tcalc, name);
    let orig_target = tcalc.group_target(&control.production_controls(ctx.summary)?);
    let chain = tree.chain_top_bot(name, &control.name)?;
    let target = allocate(&alloc, &chain, orig_target, None)?;
    Ok(Some((target / (efficiency * control.efficiency)).max(0.0)))
}

/// Injection target handed to `name` for `phase` by its controlling group.
pub fn well_group_target_inj(
    ctx: &GroupContext<'_>,
    name: &str,
    phase: Phase,
    resv_coeff: &[Real],
) -> WgResult<Option<Real>> {
    let tree = ctx.tree();
    let (start, own_efficiency) = start_of(tree, name)?;
    let Some((control, cmode, efficiency)) =
        controlling_injection_group(ctx, start, phase, own_efficiency)?
    else {
        return Ok(None);
    };
    let sales = sales_target(ctx, &control.name)?;
    let tcalc =
        InjectionTargetCalculator::new(cmode, ctx.pu, resv_coeff, control.name.as_str(), sales, phase)?;
    let alloc = injection_allocation(ctx, &tcalc, name, phase);
    let controls = control.injection_controls(phase, ctx.summary)?;
    let orig_target = tcalc.group_target(&controls, ctx.group_state)?;
    let chain = tree.chain_top_bot(name, &control.name)?;
    let target = allocate(&alloc, &chain, orig_target, None)?;
    Ok(Some((target / (efficiency * control.efficiency)).max(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide_rate::GuideRateTable;
    use wg_core::{DeferredLogger, GuideRateTarget, ProducerCMode};
    use wg_tree::{FIELD, ProductionSpec, TreeBuilder, Uda, WellRole};

    // FIELD -> G (ORAT 1000) -> A, B
    fn two_wells() -> (ScheduleStep, WellState, GroupState, GuideRateTable) {
        let mut b = TreeBuilder::new();
        let g = b.add_group("G", FIELD);
        let mut prod = ProductionSpec::new(ProductionCMode::Orat);
        prod.oil_target = Uda::Value(1000.0);
        b.set_production(g, prod);
        b.add_well("A", "G", WellRole::Producer);
        b.add_well("B", "G", WellRole::Producer);
        let step = ScheduleStep::new(b.build().unwrap());

        let mut ws = WellState::new(PhaseUsage::three_phase());
        for w in ["A", "B"] {
            ws.add_well(w, true);
            ws.set_production_cmode(w, ProducerCMode::Grup).unwrap();
        }
        let mut gs = GroupState::new(3);
        gs.set_production_control(FIELD, ProductionCMode::None);
        gs.set_production_control("G", ProductionCMode::Orat);
        gs.update_production_reduction_rates(FIELD, vec![0.0; 3]).unwrap();
        gs.update_production_reduction_rates("G", vec![0.0; 3]).unwrap();

        let mut guide = GuideRateTable::new();
        guide.set("A", 3.0, GuideRateTarget::Oil);
        guide.set("B", 1.0, GuideRateTarget::Oil);
        (step, ws, gs, guide)
    }

    #[test]
    fn targets_split_by_guide_rate() {
        let (step, ws, gs, guide) = two_wells();
        let summary = SummaryState::new();
        let ctx = GroupContext::new(&step, &summary, &ws, &gs, &guide);
        let a = well_group_target_prod(&ctx, "A", &[]).unwrap().unwrap();
        let b = well_group_target_prod(&ctx, "B", &[]).unwrap().unwrap();
        assert!((a - 750.0).abs() < 1e-9);
        assert!((b - 250.0).abs() < 1e-9);
    }

    #[test]
    fn violation_and_scale() {
        let (step, ws, gs, guide) = two_wells();
        let summary = SummaryState::new();
        let ctx = GroupContext::new(&step, &summary, &ws, &gs, &guide);
        let mut log = DeferredLogger::new();

        // (1000 + 1600) * 0.75 = 1950, above the current 1600
        let (violated, scale) =
            check_group_constraints_prod(&ctx, "A", "G", &[0.0, -1600.0, 0.0], 1.0, &[], &mut log)
                .unwrap();
        assert!(!violated);
        assert!((scale - 1950.0 / 1600.0).abs() < 1e-12);

        // B: (1000 + 400) * 0.25 = 350 < 400
        let (violated, scale) =
            check_group_constraints_prod(&ctx, "B", "G", &[0.0, -400.0, 0.0], 1.0, &[], &mut log)
                .unwrap();
        assert!(violated);
        assert!((scale - 350.0 / 400.0).abs() < 1e-12);
        assert_eq!(log.entries().len(), 1);
    }

    #[test]
    fn unavailable_group_is_not_constrained() {
        let (step, ws, mut gs, guide) = two_wells();
        gs.set_production_control("G", ProductionCMode::None);
        let summary = SummaryState::new();
        let ctx = GroupContext::new(&step, &summary, &ws, &gs, &guide);
        let mut log = DeferredLogger::new();
        // G defers, FIELD defers but is never available for a parent.
        let res =
            check_group_constraints_prod(&ctx, "A", "G", &[0.0, -100.0, 0.0], 1.0, &[], &mut log)
                .unwrap();
        assert_eq!(res, (false, 1.0));
        assert_eq!(well_group_target_prod(&ctx, "A", &[]).unwrap(), None);
    }

    #[test]
    fn over_reduced_target_is_floored() {
        let (step, ws, mut gs, guide) = two_wells();
        gs.update_production_reduction_rates("G", vec![0.0, 5000.0, 0.0])
            .unwrap();
        let summary = SummaryState::new();
        let ctx = GroupContext::new(&step, &summary, &ws, &gs, &guide);
        let mut log = DeferredLogger::new();
        let (violated, scale) =
            check_group_constraints_prod(&ctx, "A", "G", &[0.0, -10.0, 0.0], 1.0, &[], &mut log)
                .unwrap();
        assert!(violated);
        assert!((scale - MIN_TARGET_RATE / 10.0).abs() < 1e-20);
        assert_eq!(well_group_target_prod(&ctx, "A", &[]).unwrap(), Some(0.0));
    }

    #[test]
    fn zero_rate_gives_unit_scale() {
        let (step, ws, gs, guide) = two_wells();
        let summary = SummaryState::new();
        let ctx = GroupContext::new(&step, &summary, &ws, &gs, &guide);
        let mut log = DeferredLogger::new();
        let res = check_group_constraints_prod(&ctx, "A", "G", &[0.0; 3], 1.0, &[], &mut log)
            .unwrap();
        assert_eq!(res, (false, 1.0));
    }

    #[test]
    fn invalid_controlling_mode_is_fatal() {
        let (step, ws, mut gs, guide) = two_wells();
        gs.set_production_control("G", ProductionCMode::Prbl);
        let summary = SummaryState::new();
        let ctx = GroupContext::new(&step, &summary, &ws, &gs, &guide);
        let mut log = DeferredLogger::new();
        let err = check_group_constraints_prod(&ctx, "A", "G", &[0.0; 3], 1.0, &[], &mut log)
            .unwrap_err();
        assert!(matches!(err, WgError::InvalidControlMode { .. }));
    }
}
