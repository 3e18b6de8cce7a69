//! Guide-rate fractions.
//!
//! A node's share of a controlling group's target is the product, level by
//! level, of its guide rate over the guide rates of the siblings taking
//! part in group control.

use wg_core::{
    GUIDE_RATE_EPSILON, GuideRateTarget, Phase, PhaseUsage, RateVector, Real, WgError, WgResult,
    guarded_ratio,
};
use wg_state::{GroupState, WellState};
use wg_tree::{Group, GroupTree, MAX_TREE_DEPTH, NodeRef};

use crate::aggregate::{self, participates};
use crate::guide_rate::GuideRateProvider;

/// Current rates of a well as guide-rate input; zero when the well is not on this partition.
pub fn well_rate_vector(well_state: &WellState, pu: &PhaseUsage, name: &str) -> RateVector {
    RateVector::from_rates(well_state.current_well_rates(name).unwrap_or(&[]), pu)
}

/// Current production rates of a group as guide-rate input.
pub fn group_rate_vector(group_state: &GroupState, pu: &PhaseUsage, name: &str) -> RateVector {
    RateVector::from_rates(group_state.production_rates(name).unwrap_or(&[]), pu)
}

/// Production guide rate of a well or group, without participation filtering.
///
/// Groups without an explicit entry sum their participating subgroups and
/// their open GRUP producers.
pub fn guide_rate_prod(
    name: &str,
    tree: &GroupTree,
    well_state: &WellState,
    group_state: &GroupState,
    guide_rate: &dyn GuideRateProvider,
    target: GuideRateTarget,
    pu: &PhaseUsage,
) -> WgResult<Real> {
    stand_alone_guide_rate(name, tree, well_state, group_state, guide_rate, target, pu, None, 0)
}

/// Injection guide rate of a well or group for `phase`.
#[allow(clippy::too_many_arguments)]
pub fn guide_rate_inj(
    name: &str,
    tree: &GroupTree,
    well_state: &WellState,
    group_state: &GroupState,
    guide_rate: &dyn GuideRateProvider,
    target: GuideRateTarget,
    phase: Phase,
    pu: &PhaseUsage,
) -> WgResult<Real> {
    stand_alone_guide_rate(
        name,
        tree,
        well_state,
        group_state,
        guide_rate,
        target,
        pu,
        Some(phase),
        0,
    )
}

#[allow(clippy::too_many_arguments)]
fn stand_alone_guide_rate(
    name: &str,
    tree: &GroupTree,
    well_state: &WellState,
    group_state: &GroupState,
    guide_rate: &dyn GuideRateProvider,
    target: GuideRateTarget,
    pu: &PhaseUsage,
    injection_phase: Option<Phase>,
    depth: usize,
) -> WgResult<Real> {
    check_depth(name, depth)?;
    let group = match tree.lookup(name) {
        Some(NodeRef::Well(_)) => {
            return Ok(guide_rate.get(name, target, &well_rate_vector(well_state, pu, name)));
        }
        Some(NodeRef::Group(id)) => tree.group(id),
        None => return Err(WgError::unknown_node(name)),
    };
    match injection_phase {
        None if guide_rate.has(name) => {
            return Ok(guide_rate.get(name, target, &group_rate_vector(group_state, pu, name)));
        }
        Some(phase) if guide_rate.has_injection(name, phase) => {
            return Ok(guide_rate.get_injection(name, phase));
        }
        _ => {}
    }

    let is_production = injection_phase.is_none();
    let phase = injection_phase.unwrap_or(Phase::Oil);
    let mut total = 0.0;
    for &child in &group.groups {
        let child_name = tree.group(child).name.as_str();
        if participates(group_state, child_name, is_production, phase)? {
            total += stand_alone_guide_rate(
                child_name,
                tree,
                well_state,
                group_state,
                guide_rate,
                target,
                pu,
                injection_phase,
                depth + 1,
            )?;
        }
    }
    for &wid in &group.wells {
        let well = tree.well(wid);
        if well.has_role(!is_production) && !well.is_shut() {
            let grup = if is_production {
                well_state.is_production_grup(&well.name)
            } else {
                well_state.is_injection_grup(&well.name)
            };
            if grup {
                total += guide_rate.get(
                    &well.name,
                    target,
                    &well_rate_vector(well_state, pu, &well.name),
                );
            }
        }
    }
    Ok(total)
}

fn check_depth(name: &str, depth: usize) -> WgResult<()> {
    if depth > MAX_TREE_DEPTH {
        return Err(WgError::Invariant {
            what: format!("guide-rate recursion below '{}' exceeds {} levels", name, MAX_TREE_DEPTH),
        });
    }
    Ok(())
}

/// Computes guide-rate fractions for one target, role and injection phase.
pub struct FractionCalculator<'a> {
    tree: &'a GroupTree,
    well_state: &'a WellState,
    group_state: &'a GroupState,
    guide_rate: &'a dyn GuideRateProvider,
    target: GuideRateTarget,
    pu: PhaseUsage,
    is_producer: bool,
    injection_phase: Phase,
}

impl<'a> FractionCalculator<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tree: &'a GroupTree,
        well_state: &'a WellState,
        group_state: &'a GroupState,
        guide_rate: &'a dyn GuideRateProvider,
        target: GuideRateTarget,
        pu: PhaseUsage,
        is_producer: bool,
        injection_phase: Phase,
    ) -> Self {
        Self {
            tree,
            well_state,
            group_state,
            guide_rate,
            target,
            pu,
            is_producer,
            injection_phase,
        }
    }

    /// Share of `control_group`'s target that reaches `name`.
    ///
    /// With `always_include_this`, `name` counts as participating at every
    /// level even if its own mode has not switched to group control yet.
    pub fn fraction(
        &self,
        name: &str,
        control_group: &str,
        always_include_this: bool,
    ) -> WgResult<Real> {
        let always = always_include_this.then_some(name);
        let mut fraction = 1.0;
        let mut current = name;
        let mut levels = 0;
        while current != control_group {
            check_depth(name, levels)?;
            fraction *= self.local_fraction(current, always)?;
            current = self
                .tree
                .parent_name(current)
                .ok_or_else(|| WgError::Invariant {
                    what: format!("'{}' is not below '{}'", name, control_group),
                })?;
            levels += 1;
        }
        Ok(fraction)
    }

    /// Guide rate of `name` over the summed guide rates of its parent's
    /// participating children; 0 when that sum is negligible.
    pub fn local_fraction(
        &self,
        name: &str,
        always_included_child: Option<&str>,
    ) -> WgResult<Real> {
        let my_guide_rate = self.guide_rate(name, always_included_child, 0)?;
        let parent = self
            .tree
            .parent_of(name)
            .ok_or_else(|| WgError::Invariant {
                what: format!("'{}' has no parent group", name),
            })?;
        let total = self.guide_rate_sum(self.tree.group(parent), always_included_child, 0)?;
        Ok(guarded_ratio(my_guide_rate, total, GUIDE_RATE_EPSILON))
    }

    fn guide_rate_sum(
        &self,
        group: &Group,
        always_included_child: Option<&str>,
        depth: usize,
    ) -> WgResult<Real> {
        check_depth(&group.name, depth)?;
        let mut total = 0.0;
        for &child in &group.groups {
            let name = self.tree.group(child).name.as_str();
            if always_included_child == Some(name)
                || participates(self.group_state, name, self.is_producer, self.injection_phase)?
            {
                total += self.guide_rate(name, always_included_child, depth + 1)?;
            }
        }
        for &wid in &group.wells {
            let well = self.tree.well(wid);
            if !well.has_role(!self.is_producer) || well.is_shut() {
                continue;
            }
            let name = well.name.as_str();
            let grup = if self.is_producer {
                self.well_state.is_production_grup(name)
            } else {
                self.well_state.is_injection_grup(name)
            };
            if grup || always_included_child == Some(name) {
                total += self.guide_rate(name, always_included_child, depth + 1)?;
            }
        }
        Ok(total)
    }

    fn guide_rate(
        &self,
        name: &str,
        always_included_child: Option<&str>,
        depth: usize,
    ) -> WgResult<Real> {
        let group = match self.tree.lookup(name) {
            Some(NodeRef::Well(_)) => {
                let rates = well_rate_vector(self.well_state, &self.pu, name);
                return Ok(self.guide_rate.get(name, self.target, &rates));
            }
            Some(NodeRef::Group(id)) => self.tree.group(id),
            None => return Err(WgError::unknown_node(name)),
        };
        if self.group_controlled_wells(name, always_included_child)? == 0 {
            return Ok(0.0);
        }
        if self.is_producer && self.guide_rate.has(name) {
            let rates = group_rate_vector(self.group_state, &self.pu, name);
            Ok(self.guide_rate.get(name, self.target, &rates))
        } else if !self.is_producer && self.guide_rate.has_injection(name, self.injection_phase) {
            Ok(self.guide_rate.get_injection(name, self.injection_phase))
        } else {
            self.guide_rate_sum(group, always_included_child, depth)
        }
    }

    pub fn group_controlled_wells(
        &self,
        group: &str,
        always_included_child: Option<&str>,
    ) -> WgResult<usize> {
        aggregate::group_controlled_wells(
            self.tree,
            self.well_state,
            self.group_state,
            group,
            always_included_child,
            self.is_producer,
            self.injection_phase,
        )
    }
}
