//! Node pressures from group production rates.
//!
//! Leaves take their inflow from the group of the same name; flows are
//! summed towards the root, then pressures are resolved from the root down
//! through each branch's VFP table.

use std::collections::HashMap;
use wg_core::{Phase, PhaseUsage, Pressure, Real, WgError, WgResult, in_bar};
use wg_state::{GroupState, WellState};
use wg_tree::GroupTree;

use crate::network::Network;
use crate::vfp::VfpEvaluator;

/// Pressure at every network node, keyed by node name.
///
/// Empty when the network is inactive. A leaf that routes lift gas adds the
/// ALQ of its group's own wells to its gas inflow.
pub fn compute_network_pressures(
    network: &Network,
    tree: &GroupTree,
    well_state: &WellState,
    group_state: &GroupState,
    pu: &PhaseUsage,
    vfp: &dyn VfpEvaluator,
) -> WgResult<HashMap<String, Pressure>> {
    let Some(root) = network.root() else {
        return Ok(HashMap::new());
    };

    // Parents come before their children in `order`.
    let mut order: Vec<&str> = Vec::with_capacity(network.nodes().len());
    let mut leaves: Vec<&str> = Vec::new();
    let mut stack = vec![root.name.as_str()];
    while let Some(node) = stack.pop() {
        order.push(node);
        let mut has_children = false;
        for branch in network.downtree_branches(node) {
            has_children = true;
            stack.push(branch.downtree.as_str());
        }
        if !has_children {
            leaves.push(node);
        }
    }

    let np = pu.num_phases();
    let mut inflows: HashMap<&str, Vec<Real>> = HashMap::with_capacity(order.len());
    for &leaf in &leaves {
        let group = tree.require_group(leaf)?;
        let mut rates = group_state.production_rates(leaf)?.to_vec();
        let node = network.node(leaf).ok_or_else(|| WgError::unknown_node(leaf))?;
        if node.add_gas_lift_gas {
            if let Some(gas) = pu.pos(Phase::Gas) {
                for &wid in &group.wells {
                    rates[gas] += well_state.alq(&tree.well(wid).name);
                }
            }
        }
        inflows.insert(leaf, rates);
    }

    for &node in order.iter().rev() {
        let Some(branch) = network.uptree_branch(node) else {
            continue;
        };
        let down = inflows.get(node).cloned().unwrap_or_else(|| vec![0.0; np]);
        let up = inflows
            .entry(branch.uptree.as_str())
            .or_insert_with(|| vec![0.0; np]);
        for (u, d) in up.iter_mut().zip(&down) {
            *u += d;
        }
    }

    let mut pressures: HashMap<String, Pressure> = HashMap::with_capacity(order.len());
    for &node in &order {
        let spec = network.node(node).ok_or_else(|| WgError::unknown_node(node))?;
        let pressure = if let Some(p) = spec.terminal_pressure {
            p
        } else {
            let branch = network.uptree_branch(node).ok_or_else(|| WgError::Invariant {
                what: format!("network node '{}' has neither pressure nor uptree branch", node),
            })?;
            let up_press = *pressures
                .get(&branch.uptree)
                .ok_or_else(|| WgError::missing("network pressure", branch.uptree.as_str()))?;
            match branch.vfp_table {
                Some(table) => {
                    let flow = inflows.get(node).map(Vec::as_slice).unwrap_or(&[]);
                    // Tables expect production negative.
                    let rate = |phase| -pu.rate(flow, phase);
                    vfp.bhp(
                        table,
                        rate(Phase::Water),
                        rate(Phase::Oil),
                        rate(Phase::Gas),
                        up_press,
                        0.0,
                    )?
                }
                None => up_press,
            }
        };
        tracing::trace!(node, pressure_bar = in_bar(pressure), "network node pressure");
        pressures.insert(node.to_owned(), pressure);
    }

    tracing::debug!(
        nodes = pressures.len(),
        leaves = leaves.len(),
        "network pressures computed"
    );
    Ok(pressures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkBuilder;
    use crate::vfp::{LinearVfpTable, LinearVfpTables};
    use wg_core::bar;
    use wg_tree::{FIELD, TreeBuilder, WellRole};

    // FIELD -> PLAT -> {G1: P1, P2 ; G2: P3}
    fn setup() -> (GroupTree, WellState, GroupState) {
        let mut b = TreeBuilder::new();
        b.add_group("PLAT", FIELD);
        b.add_group("G1", "PLAT");
        b.add_group("G2", "PLAT");
        b.add_well("P1", "G1", WellRole::Producer);
        b.add_well("P2", "G1", WellRole::Producer);
        b.add_well("P3", "G2", WellRole::Producer);
        let tree = b.build().unwrap();

        let mut ws = WellState::new(PhaseUsage::three_phase());
        for w in ["P1", "P2", "P3"] {
            ws.add_well(w, true);
        }
        ws.set_alq("P1", 5.0).unwrap();
        ws.set_alq("P2", 7.0).unwrap();

        let mut gs = GroupState::new(3);
        gs.update_production_rates("G1", vec![10.0, 100.0, 1000.0]).unwrap();
        gs.update_production_rates("G2", vec![20.0, 200.0, 2000.0]).unwrap();
        (tree, ws, gs)
    }

    fn tables() -> LinearVfpTables {
        let mut t = LinearVfpTables::new();
        t.insert(
            1,
            LinearVfpTable {
                oil: 0.01,
                ..Default::default()
            },
        );
        t.insert(
            2,
            LinearVfpTable {
                gas: 0.001,
                ..Default::default()
            },
        );
        t
    }

    #[test]
    fn inactive_network_gives_no_pressures() {
        let (tree, ws, gs) = setup();
        let net = Network::default();
        let p = compute_network_pressures(&net, &tree, &ws, &gs, &PhaseUsage::three_phase(), &tables())
            .unwrap();
        assert!(p.is_empty());
    }

    #[test]
    fn no_loss_branch_keeps_uptree_pressure() {
        let (tree, ws, gs) = setup();
        let mut b = NetworkBuilder::new();
        b.add_node("PLAT", Some(bar(50.0)));
        b.add_node("G1", None);
        b.add_branch("PLAT", "G1", None);
        let net = b.build().unwrap();

        let p = compute_network_pressures(&net, &tree, &ws, &gs, &PhaseUsage::three_phase(), &tables())
            .unwrap();
        assert_eq!(p["G1"], bar(50.0));
        assert_eq!(p["PLAT"], bar(50.0));
    }

    #[test]
    fn flows_accumulate_and_lift_gas_is_added() {
        let (tree, ws, gs) = setup();
        // SEP(50) -1-> PLAT -2-> G1 (lift gas) ; PLAT -none-> G2
        let mut b = NetworkBuilder::new();
        b.add_node("SEP", Some(bar(50.0)));
        b.add_node("PLAT", None);
        b.add_node("G1", None);
        b.add_node("G2", None);
        b.set_add_gas_lift_gas("G1", true);
        b.add_branch("SEP", "PLAT", Some(1));
        b.add_branch("PLAT", "G1", Some(2));
        b.add_branch("PLAT", "G2", None);
        let net = b.build().unwrap();
        assert_eq!(net.nodes().len(), 4);

        let p = compute_network_pressures(&net, &tree, &ws, &gs, &PhaseUsage::three_phase(), &tables())
            .unwrap();

        // PLAT carries 300 oil: 50 + 0.01 * 300 = 53 bar.
        assert!((in_bar(p["PLAT"]) - 53.0).abs() < 1e-9);
        // G1 carries 1000 + 12 lift gas: 53 + 0.001 * 1012.
        assert!((in_bar(p["G1"]) - (53.0 + 1.012)).abs() < 1e-9);
        assert!((in_bar(p["G2"]) - 53.0).abs() < 1e-9);
    }

    #[test]
    fn leaf_without_group_rates_is_an_error() {
        let (tree, ws, _) = setup();
        let gs = GroupState::new(3);
        let mut b = NetworkBuilder::new();
        b.add_node("PLAT", Some(bar(50.0)));
        b.add_node("G1", None);
        b.add_branch("PLAT", "G1", None);
        let net = b.build().unwrap();
        let res = compute_network_pressures(&net, &tree, &ws, &gs, &PhaseUsage::three_phase(), &tables());
        assert!(matches!(res, Err(WgError::MissingState { .. })));
    }
}
