//! Incremental tree builder.

use std::collections::HashMap;
use wg_core::{GroupId, Real, WellId, WellStatus};

use crate::controls::{InjectionSpec, ProductionSpec};
use crate::error::TreeError;
use crate::tree::{FIELD, Group, GroupTree, NodeRef, Well, WellRole};
use crate::validate;

#[derive(Debug, Clone)]
pub(crate) struct GroupDraft {
    pub(crate) name: String,
    pub(crate) parent: Option<String>,
    pub(crate) efficiency: Real,
    pub(crate) production: Option<ProductionSpec>,
    pub(crate) injection: Vec<InjectionSpec>,
}

#[derive(Debug, Clone)]
pub(crate) struct WellDraft {
    pub(crate) name: String,
    pub(crate) group: String,
    pub(crate) efficiency: Real,
    pub(crate) status: WellStatus,
    pub(crate) role: WellRole,
}

/// Builder for constructing a control tree incrementally.
///
/// The builder starts with the `FIELD` root. Parents are referenced by name
/// and may be added in any order; `build()` resolves and validates them and
/// freezes the result into an immutable `GroupTree`.
#[derive(Debug)]
pub struct TreeBuilder {
    groups: Vec<GroupDraft>,
    wells: Vec<WellDraft>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Create a builder holding only the `FIELD` root.
    pub fn new() -> Self {
        Self {
            groups: vec![GroupDraft {
                name: FIELD.to_owned(),
                parent: None,
                efficiency: 1.0,
                production: None,
                injection: Vec::new(),
            }],
            wells: Vec::new(),
        }
    }

    /// The root group's id.
    pub fn field(&self) -> GroupId {
        GroupId::from_index(0)
    }

    /// Add a group under `parent` and return its ID.
    pub fn add_group(&mut self, name: impl Into<String>, parent: impl Into<String>) -> GroupId {
        let id = GroupId::from_index(self.groups.len() as u32);
        self.groups.push(GroupDraft {
            name: name.into(),
            parent: Some(parent.into()),
            efficiency: 1.0,
            production: None,
            injection: Vec::new(),
        });
        id
    }

    /// Add an open well with unit efficiency under `group` and return its ID.
    pub fn add_well(
        &mut self,
        name: impl Into<String>,
        group: impl Into<String>,
        role: WellRole,
    ) -> WellId {
        let id = WellId::from_index(self.wells.len() as u32);
        self.wells.push(WellDraft {
            name: name.into(),
            group: group.into(),
            efficiency: 1.0,
            status: WellStatus::Open,
            role,
        });
        id
    }

    pub fn set_group_efficiency(&mut self, id: GroupId, efficiency: Real) {
        if let Some(g) = self.groups.get_mut(id.slot()) {
            g.efficiency = efficiency;
        }
    }

    pub fn set_production(&mut self, id: GroupId, spec: ProductionSpec) {
        if let Some(g) = self.groups.get_mut(id.slot()) {
            g.production = Some(spec);
        }
    }

    pub fn add_injection(&mut self, id: GroupId, spec: InjectionSpec) {
        if let Some(g) = self.groups.get_mut(id.slot()) {
            g.injection.push(spec);
        }
    }

    pub fn set_well_efficiency(&mut self, id: WellId, efficiency: Real) {
        if let Some(w) = self.wells.get_mut(id.slot()) {
            w.efficiency = efficiency;
        }
    }

    pub fn set_well_status(&mut self, id: WellId, status: WellStatus) {
        if let Some(w) = self.wells.get_mut(id.slot()) {
            w.status = status;
        }
    }

    /// Look up a group added earlier by name.
    pub fn group_id(&self, name: &str) -> Option<GroupId> {
        self.groups
            .iter()
            .position(|g| g.name == name)
            .map(|i| GroupId::from_index(i as u32))
    }

    /// Build and validate the tree.
    pub fn build(self) -> Result<GroupTree, TreeError> {
        validate::validate_drafts(&self.groups, &self.wells)?;

        let mut names = HashMap::with_capacity(self.groups.len() + self.wells.len());
        for (i, g) in self.groups.iter().enumerate() {
            names.insert(g.name.clone(), NodeRef::Group(GroupId::from_index(i as u32)));
        }
        for (i, w) in self.wells.iter().enumerate() {
            names.insert(w.name.clone(), NodeRef::Well(WellId::from_index(i as u32)));
        }

        let resolve_parent = |child: &str, parent: &str| match names.get(parent) {
            Some(NodeRef::Group(id)) => Ok(*id),
            _ => Err(TreeError::UnknownParent {
                child: child.to_owned(),
                parent: parent.to_owned(),
            }),
        };

        let mut groups = Vec::with_capacity(self.groups.len());
        for (i, draft) in self.groups.into_iter().enumerate() {
            let parent = match &draft.parent {
                Some(p) => Some(resolve_parent(&draft.name, p)?),
                None => None,
            };
            let mut injection: [Option<InjectionSpec>; 3] = [None, None, None];
            for spec in draft.injection {
                let slot = spec.phase.canonical_index();
                injection[slot] = Some(spec);
            }
            groups.push(Group {
                id: GroupId::from_index(i as u32),
                name: draft.name,
                parent,
                efficiency: draft.efficiency,
                groups: Vec::new(),
                wells: Vec::new(),
                production: draft.production,
                injection,
            });
        }

        let mut wells = Vec::with_capacity(self.wells.len());
        for (i, draft) in self.wells.into_iter().enumerate() {
            let group = resolve_parent(&draft.name, &draft.group)?;
            wells.push(Well {
                id: WellId::from_index(i as u32),
                name: draft.name,
                group,
                efficiency: draft.efficiency,
                status: draft.status,
                role: draft.role,
            });
        }

        // Child lists, in insertion order for determinism
        for i in 0..groups.len() {
            if let Some(parent) = groups[i].parent {
                let id = groups[i].id;
                groups[parent.slot()].groups.push(id);
            }
        }
        for w in &wells {
            groups[w.group.slot()].wells.push(w.id);
        }

        let field = GroupId::from_index(0);
        let (post_order, depth) = validate::order_from_root(&groups, field)?;

        Ok(GroupTree {
            groups,
            wells,
            names,
            field,
            post_order,
            depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wg_core::Phase;

    #[test]
    fn builder_basic() {
        let mut builder = TreeBuilder::new();
        let g1 = builder.add_group("G1", FIELD);
        let w1 = builder.add_well("W1", "G1", WellRole::Producer);

        assert_eq!(g1.index(), 1);
        assert_eq!(w1.index(), 0);
        assert_eq!(builder.group_id("G1"), Some(g1));
        assert_eq!(builder.group_id(FIELD), Some(builder.field()));
    }

    #[test]
    fn parents_may_be_added_later() {
        let mut builder = TreeBuilder::new();
        builder.add_well("W1", "LOW", WellRole::Producer);
        builder.add_group("LOW", "HIGH");
        builder.add_group("HIGH", FIELD);
        let tree = builder.build().unwrap();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.parent_name("LOW"), Some("HIGH"));
        assert_eq!(tree.group_by_name("LOW").unwrap().wells.len(), 1);
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut builder = TreeBuilder::new();
        builder.add_well("W1", "NOPE", WellRole::Injector(Phase::Gas));
        let err = builder.build().unwrap_err();
        assert!(matches!(err, TreeError::UnknownParent { .. }));
    }

    #[test]
    fn well_cannot_parent_a_group() {
        let mut builder = TreeBuilder::new();
        builder.add_group("G1", FIELD);
        builder.add_well("W1", "G1", WellRole::Producer);
        builder.add_group("G2", "W1");
        assert!(builder.build().is_err());
    }
}
