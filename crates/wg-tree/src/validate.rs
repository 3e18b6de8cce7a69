//! Tree validation logic.

use std::collections::HashSet;
use wg_core::GroupId;

use crate::builder::{GroupDraft, WellDraft};
use crate::error::TreeError;
use crate::tree::{Group, MAX_TREE_DEPTH};

/// Validate names, efficiency factors and per-phase injection specs.
pub(crate) fn validate_drafts(groups: &[GroupDraft], wells: &[WellDraft]) -> Result<(), TreeError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let names = groups
        .iter()
        .map(|g| g.name.as_str())
        .chain(wells.iter().map(|w| w.name.as_str()));
    for name in names {
        if !seen.insert(name) {
            return Err(TreeError::DuplicateName {
                name: name.to_owned(),
            });
        }
    }

    let efficiencies = groups
        .iter()
        .map(|g| (g.name.as_str(), g.efficiency))
        .chain(wells.iter().map(|w| (w.name.as_str(), w.efficiency)));
    for (name, eff) in efficiencies {
        if !eff.is_finite() || eff < 0.0 {
            return Err(TreeError::InvalidEfficiency {
                name: name.to_owned(),
            });
        }
    }

    for g in groups {
        let mut phases = HashSet::new();
        for spec in &g.injection {
            if !phases.insert(spec.phase) {
                return Err(TreeError::DuplicateInjectionPhase {
                    group: g.name.clone(),
                    phase: spec.phase.to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Walk the resolved groups from the root, returning the children-first
/// order and the depth. Fails if a group is unreachable or nested too deep.
pub(crate) fn order_from_root(
    groups: &[Group],
    root: GroupId,
) -> Result<(Vec<GroupId>, usize), TreeError> {
    let mut order = Vec::with_capacity(groups.len());
    let mut depth = 0;
    let mut stack = vec![(root, 0_usize, false)];

    while let Some((id, level, expanded)) = stack.pop() {
        if expanded {
            order.push(id);
            continue;
        }
        let group = &groups[id.slot()];
        if level > MAX_TREE_DEPTH {
            return Err(TreeError::TooDeep {
                group: group.name.clone(),
                limit: MAX_TREE_DEPTH,
            });
        }
        depth = depth.max(level);
        stack.push((id, level, true));
        for &child in group.groups.iter().rev() {
            stack.push((child, level + 1, false));
        }
    }

    if order.len() != groups.len() {
        let visited: HashSet<GroupId> = order.iter().copied().collect();
        if let Some(lost) = groups.iter().find(|g| !visited.contains(&g.id)) {
            return Err(TreeError::Unreachable {
                group: lost.name.clone(),
            });
        }
    }

    Ok((order, depth))
}
