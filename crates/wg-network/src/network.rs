//! Surface gathering network: nodes named after groups, joined by branches.

use std::collections::HashMap;
use wg_core::Pressure;

use crate::error::NetworkError;

/// Table id that case files use for a branch without pressure loss.
pub const NO_PRESSURE_LOSS_TABLE: u32 = 9999;

/// Map a case-file table id onto an optional VFP table.
pub fn vfp_table_from_id(id: u32) -> Option<u32> {
    (id != NO_PRESSURE_LOSS_TABLE).then_some(id)
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkNode {
    pub name: String,
    /// Fixed pressure; the root always has one.
    pub terminal_pressure: Option<Pressure>,
    /// Route the lift gas of the group's wells through this node.
    pub add_gas_lift_gas: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub uptree: String,
    pub downtree: String,
    /// `None` means the downtree node sees the uptree pressure unchanged.
    pub vfp_table: Option<u32>,
}

/// A validated network. The default value is an inactive network.
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: Vec<NetworkNode>,
    branches: Vec<Branch>,
    index: HashMap<String, usize>,
    uptree: Vec<Option<usize>>,
    downtree: Vec<Vec<usize>>,
    root: Option<usize>,
}

impl Network {
    /// True once the network has a root to propagate from.
    pub fn active(&self) -> bool {
        self.root.is_some()
    }

    pub fn nodes(&self) -> &[NetworkNode] {
        &self.nodes
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn root(&self) -> Option<&NetworkNode> {
        self.root.map(|i| &self.nodes[i])
    }

    pub fn node(&self, name: &str) -> Option<&NetworkNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    /// The branch leading up from `name`, if any.
    pub fn uptree_branch(&self, name: &str) -> Option<&Branch> {
        let i = *self.index.get(name)?;
        self.uptree[i].map(|b| &self.branches[b])
    }

    /// Branches leading down from `name`.
    pub fn downtree_branches(&self, name: &str) -> impl Iterator<Item = &Branch> + '_ {
        let list = self
            .index
            .get(name)
            .map(|&i| self.downtree[i].as_slice())
            .unwrap_or(&[]);
        list.iter().map(|&b| &self.branches[b])
    }
}

/// Incremental builder; nodes are referenced by name.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    nodes: Vec<NetworkNode>,
    branches: Vec<Branch>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>, terminal_pressure: Option<Pressure>) {
        self.nodes.push(NetworkNode {
            name: name.into(),
            terminal_pressure,
            add_gas_lift_gas: false,
        });
    }

    pub fn set_add_gas_lift_gas(&mut self, name: &str, add: bool) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.name == name) {
            node.add_gas_lift_gas = add;
        }
    }

    pub fn add_branch(
        &mut self,
        uptree: impl Into<String>,
        downtree: impl Into<String>,
        vfp_table: Option<u32>,
    ) {
        self.branches.push(Branch {
            uptree: uptree.into(),
            downtree: downtree.into(),
            vfp_table,
        });
    }

    /// Validate and index the network.
    ///
    /// An empty builder yields an inactive network.
    pub fn build(self) -> Result<Network, NetworkError> {
        let mut index = HashMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if index.insert(node.name.clone(), i).is_some() {
                return Err(NetworkError::DuplicateNode {
                    name: node.name.clone(),
                });
            }
        }
        if self.nodes.is_empty() {
            return Ok(Network::default());
        }

        let mut uptree = vec![None; self.nodes.len()];
        let mut downtree = vec![Vec::new(); self.nodes.len()];
        for (b, branch) in self.branches.iter().enumerate() {
            let lookup = |node: &str| {
                index
                    .get(node)
                    .copied()
                    .ok_or_else(|| NetworkError::UnknownNode {
                        branch: format!("{} -> {}", branch.uptree, branch.downtree),
                        node: node.to_owned(),
                    })
            };
            let up = lookup(&branch.uptree)?;
            let down = lookup(&branch.downtree)?;
            if uptree[down].replace(b).is_some() {
                return Err(NetworkError::MultipleUptree {
                    node: branch.downtree.clone(),
                });
            }
            downtree[up].push(b);
        }

        let roots: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| uptree[i].is_none())
            .collect();
        let [root] = roots[..] else {
            return Err(NetworkError::RootCount { count: roots.len() });
        };
        if self.nodes[root].terminal_pressure.is_none() {
            return Err(NetworkError::RootWithoutPressure {
                root: self.nodes[root].name.clone(),
            });
        }

        // Every node has at most one uptree branch, so a node missed by the
        // walk from the root sits on a cycle.
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            seen[i] = true;
            for &b in &downtree[i] {
                let child = index[&self.branches[b].downtree];
                if !seen[child] {
                    stack.push(child);
                }
            }
        }
        if let Some(i) = seen.iter().position(|s| !s) {
            return Err(NetworkError::Unreachable {
                node: self.nodes[i].name.clone(),
            });
        }

        Ok(Network {
            nodes: self.nodes,
            branches: self.branches,
            index,
            uptree,
            downtree,
            root: Some(root),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wg_core::bar;

    #[test]
    fn sentinel_table_means_no_loss() {
        assert_eq!(vfp_table_from_id(NO_PRESSURE_LOSS_TABLE), None);
        assert_eq!(vfp_table_from_id(3), Some(3));
    }

    #[test]
    fn build_and_navigate() {
        let mut b = NetworkBuilder::new();
        b.add_node("SEP", Some(bar(50.0)));
        b.add_node("PLAT", None);
        b.add_node("G1", None);
        b.add_branch("SEP", "PLAT", Some(1));
        b.add_branch("PLAT", "G1", None);
        let net = b.build().unwrap();

        assert!(net.active());
        assert_eq!(net.root().unwrap().name, "SEP");
        assert_eq!(net.uptree_branch("G1").unwrap().uptree, "PLAT");
        assert!(net.uptree_branch("SEP").is_none());
        assert_eq!(net.downtree_branches("SEP").count(), 1);
        assert_eq!(net.downtree_branches("G1").count(), 0);
    }

    #[test]
    fn empty_network_is_inactive() {
        let net = NetworkBuilder::new().build().unwrap();
        assert!(!net.active());
        assert!(net.root().is_none());
    }

    #[test]
    fn rejects_bad_topologies() {
        let mut b = NetworkBuilder::new();
        b.add_node("A", Some(bar(10.0)));
        b.add_node("A", None);
        assert!(matches!(b.build(), Err(NetworkError::DuplicateNode { .. })));

        let mut b = NetworkBuilder::new();
        b.add_node("A", Some(bar(10.0)));
        b.add_branch("A", "B", None);
        assert!(matches!(b.build(), Err(NetworkError::UnknownNode { .. })));

        let mut b = NetworkBuilder::new();
        b.add_node("A", None);
        assert_eq!(
            b.build().unwrap_err(),
            NetworkError::RootWithoutPressure { root: "A".into() }
        );

        // R is the root; X and Y feed each other.
        let mut b = NetworkBuilder::new();
        b.add_node("R", Some(bar(10.0)));
        b.add_node("X", None);
        b.add_node("Y", None);
        b.add_branch("X", "Y", None);
        b.add_branch("Y", "X", None);
        assert!(matches!(b.build(), Err(NetworkError::Unreachable { .. })));

        let mut b = NetworkBuilder::new();
        b.add_node("R", Some(bar(10.0)));
        b.add_node("S", Some(bar(10.0)));
        assert_eq!(b.build().unwrap_err(), NetworkError::RootCount { count: 2 });
    }
}
