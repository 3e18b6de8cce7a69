//! Core tree data structures.

use std::collections::HashMap;
use wg_core::{GroupId, Phase, Real, WellId, WellStatus, WgError, WgResult};

use crate::controls::{InjectionControls, InjectionSpec, ProductionControls, ProductionSpec};
use crate::summary::SummaryState;

/// Name of the root group.
pub const FIELD: &str = "FIELD";

/// Deepest nesting the builder accepts. Every walk over the tree is bounded by it.
pub const MAX_TREE_DEPTH: usize = 256;

/// Whether a well produces or injects (and which phase).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellRole {
    Producer,
    Injector(Phase),
}

/// A leaf of the control tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Well {
    pub id: WellId,
    pub name: String,
    pub group: GroupId,
    pub efficiency: Real,
    pub status: WellStatus,
    pub role: WellRole,
}

impl Well {
    pub fn is_producer(&self) -> bool {
        matches!(self.role, WellRole::Producer)
    }

    pub fn is_injector(&self) -> bool {
        matches!(self.role, WellRole::Injector(_))
    }

    pub fn is_shut(&self) -> bool {
        self.status == WellStatus::Shut
    }

    /// True if the well has the requested role (`injector` or producer).
    pub fn has_role(&self, injector: bool) -> bool {
        if injector {
            self.is_injector()
        } else {
            self.is_producer()
        }
    }
}

/// An internal node of the control tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub parent: Option<GroupId>,
    pub efficiency: Real,
    pub groups: Vec<GroupId>,
    pub wells: Vec<WellId>,
    pub production: Option<ProductionSpec>,
    /// Injection specs indexed by `Phase::canonical_index`.
    pub injection: [Option<InjectionSpec>; 3],
}

impl Group {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_production_group(&self) -> bool {
        self.production.is_some()
    }

    pub fn is_injection_group(&self) -> bool {
        self.injection.iter().any(Option::is_some)
    }

    pub fn has_injection_control(&self, phase: Phase) -> bool {
        self.injection_spec(phase).is_some()
    }

    pub fn injection_spec(&self, phase: Phase) -> Option<&InjectionSpec> {
        self.injection[phase.canonical_index()].as_ref()
    }

    /// Whether the parent's production control may steer this group.
    pub fn production_group_control_available(&self) -> bool {
        if self.name == FIELD {
            return false;
        }
        self.production
            .as_ref()
            .is_none_or(|p| p.available_for_group_control)
    }

    /// Whether the parent's `phase` injection control may steer this group.
    pub fn injection_group_control_available(&self, phase: Phase) -> bool {
        if self.name == FIELD {
            return false;
        }
        self.injection_spec(phase)
            .is_none_or(|s| s.available_for_group_control)
    }

    pub fn production_controls(&self, summary: &SummaryState) -> WgResult<ProductionControls> {
        self.production
            .as_ref()
            .ok_or_else(|| WgError::missing("production controls", &self.name))?
            .resolve(summary)
    }

    pub fn injection_controls(
        &self,
        phase: Phase,
        summary: &SummaryState,
    ) -> WgResult<InjectionControls> {
        self.injection_spec(phase)
            .ok_or_else(|| WgError::missing("injection controls", &self.name))?
            .resolve(&self.name, summary)
    }
}

/// A name resolved to its arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Group(GroupId),
    Well(WellId),
}

/// The validated, immutable control tree.
///
/// Groups and wells live in arenas indexed by their ids; children are
/// stored as id lists on each group and every node knows its parent.
/// `post_order` lists all groups with children before parents, so bottom-up
/// passes are a plain loop.
#[derive(Debug, Clone)]
pub struct GroupTree {
    pub(crate) groups: Vec<Group>,
    pub(crate) wells: Vec<Well>,
    pub(crate) names: HashMap<String, NodeRef>,
    pub(crate) field: GroupId,
    pub(crate) post_order: Vec<GroupId>,
    pub(crate) depth: usize,
}

impl GroupTree {
    /// Return all groups.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Return all wells.
    pub fn wells(&self) -> &[Well] {
        &self.wells
    }

    /// Get a group by id (ids are only minted by this tree; panics otherwise).
    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.slot()]
    }

    /// Get a well by id (ids are only minted by this tree; panics otherwise).
    pub fn well(&self, id: WellId) -> &Well {
        &self.wells[id.slot()]
    }

    pub fn field(&self) -> &Group {
        self.group(self.field)
    }

    pub fn lookup(&self, name: &str) -> Option<NodeRef> {
        self.names.get(name).copied()
    }

    pub fn has_well(&self, name: &str) -> bool {
        matches!(self.lookup(name), Some(NodeRef::Well(_)))
    }

    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        match self.lookup(name)? {
            NodeRef::Group(id) => Some(self.group(id)),
            NodeRef::Well(_) => None,
        }
    }

    pub fn well_by_name(&self, name: &str) -> Option<&Well> {
        match self.lookup(name)? {
            NodeRef::Well(id) => Some(self.well(id)),
            NodeRef::Group(_) => None,
        }
    }

    pub fn require_group(&self, name: &str) -> WgResult<&Group> {
        self.group_by_name(name)
            .ok_or_else(|| WgError::unknown_node(name))
    }

    pub fn node_name(&self, node: NodeRef) -> &str {
        match node {
            NodeRef::Group(id) => &self.group(id).name,
            NodeRef::Well(id) => &self.well(id).name,
        }
    }

    /// Parent group of a well or group; `None` for the root or unknown names.
    pub fn parent_of(&self, name: &str) -> Option<GroupId> {
        match self.lookup(name)? {
            NodeRef::Group(id) => self.group(id).parent,
            NodeRef::Well(id) => Some(self.well(id).group),
        }
    }

    pub fn parent_name(&self, name: &str) -> Option<&str> {
        self.parent_of(name).map(|id| self.group(id).name.as_str())
    }

    /// All groups, children before parents.
    pub fn group_post_order(&self) -> &[GroupId] {
        &self.post_order
    }

    /// Groups of the subtree rooted at `root`, children before parents.
    pub fn subtree_post_order(&self, root: GroupId) -> Vec<GroupId> {
        let mut order = Vec::new();
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            for &child in self.group(id).groups.iter().rev() {
                stack.push((child, false));
            }
        }
        order
    }

    /// Number of group levels below the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Names from `top` down to `bottom` (both included).
    ///
    /// `bottom` may be a well or a group; `top` must be one of its ancestors.
    pub fn chain_top_bot(&self, bottom: &str, top: &str) -> WgResult<Vec<&str>> {
        let bottom_ref = self
            .lookup(bottom)
            .ok_or_else(|| WgError::unknown_node(bottom))?;
        let mut chain = vec![self.node_name(bottom_ref)];
        let mut current = self.parent_of(bottom);
        loop {
            let id = current.ok_or_else(|| WgError::Invariant {
                what: format!("'{}' is not an ancestor of '{}'", top, bottom),
            })?;
            let group = self.group(id);
            chain.push(group.name.as_str());
            if group.name == top {
                break;
            }
            current = group.parent;
        }
        chain.reverse();
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TreeBuilder;

    fn sample() -> GroupTree {
        let mut b = TreeBuilder::new();
        b.add_group("PLAT", FIELD);
        b.add_group("G1", "PLAT");
        b.add_group("G2", "PLAT");
        b.add_well("P1", "G1", WellRole::Producer);
        b.add_well("I1", "G2", WellRole::Injector(Phase::Water));
        b.build().unwrap()
    }

    #[test]
    fn post_order_lists_children_first() {
        let tree = sample();
        let names: Vec<&str> = tree
            .group_post_order()
            .iter()
            .map(|&id| tree.group(id).name.as_str())
            .collect();
        let pos = |n: &str| names.iter().position(|x| *x == n).unwrap();
        assert_eq!(names.len(), 4);
        assert!(pos("G1") < pos("PLAT"));
        assert!(pos("G2") < pos("PLAT"));
        assert_eq!(*names.last().unwrap(), FIELD);
    }

    #[test]
    fn chain_runs_top_to_bottom() {
        let tree = sample();
        let chain = tree.chain_top_bot("P1", FIELD).unwrap();
        assert_eq!(chain, vec![FIELD, "PLAT", "G1", "P1"]);
        assert!(tree.chain_top_bot("P1", "G2").is_err());
    }

    #[test]
    fn field_is_never_available_for_group_control() {
        let tree = sample();
        assert!(!tree.field().production_group_control_available());
        assert!(!tree.field().injection_group_control_available(Phase::Gas));
        let g1 = tree.group_by_name("G1").unwrap();
        assert!(g1.production_group_control_available());
    }
}
