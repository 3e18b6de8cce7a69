//! Pressure propagation over generated network chains.

use proptest::prelude::*;
use wg_core::{PhaseUsage, bar, in_bar};
use wg_network::{LinearVfpTable, LinearVfpTables, NetworkBuilder, compute_network_pressures};
use wg_state::{GroupState, WellState};
use wg_tree::{FIELD, TreeBuilder};

// A chain of groups N0 -> N1 -> ... mirrored by the network; only the
// bottom group produces.
fn chain(len: usize, oil: f64) -> (wg_tree::GroupTree, GroupState) {
    let mut b = TreeBuilder::new();
    let mut parent = FIELD.to_owned();
    for i in 0..len {
        let name = format!("N{}", i);
        b.add_group(name.as_str(), parent.as_str());
        parent = name;
    }
    let tree = b.build().unwrap();
    let mut gs = GroupState::new(3);
    gs.update_production_rates(parent.as_str(), vec![0.0, oil, 0.0]).unwrap();
    (tree, gs)
}

proptest! {
    #[test]
    fn lossless_chain_carries_root_pressure(len in 1_usize..12, p in 1.0_f64..300.0) {
        let (tree, gs) = chain(len, 100.0);
        let mut b = NetworkBuilder::new();
        b.add_node("ROOT", Some(bar(p)));
        let mut up = "ROOT".to_owned();
        for i in 0..len {
            let name = format!("N{}", i);
            b.add_node(name.as_str(), None);
            b.add_branch(up.as_str(), name.as_str(), None);
            up = name;
        }
        let net = b.build().unwrap();
        let ws = WellState::new(PhaseUsage::three_phase());
        let pressures = compute_network_pressures(
            &net, &tree, &ws, &gs, &PhaseUsage::three_phase(), &LinearVfpTables::new(),
        ).unwrap();

        prop_assert_eq!(pressures.len(), len + 1);
        for value in pressures.values() {
            prop_assert_eq!(*value, bar(p));
        }
    }

    #[test]
    fn each_loss_branch_adds_its_drop(len in 1_usize..8, oil in 0.0_f64..1000.0) {
        let (tree, gs) = chain(len, oil);
        let mut tables = LinearVfpTables::new();
        tables.insert(1, LinearVfpTable { base: 1.0, oil: 0.01, ..Default::default() });

        let mut b = NetworkBuilder::new();
        b.add_node("ROOT", Some(bar(10.0)));
        let mut up = "ROOT".to_owned();
        for i in 0..len {
            let name = format!("N{}", i);
            b.add_node(name.as_str(), None);
            b.add_branch(up.as_str(), name.as_str(), Some(1));
            up = name;
        }
        let net = b.build().unwrap();
        let ws = WellState::new(PhaseUsage::three_phase());
        let pressures = compute_network_pressures(
            &net, &tree, &ws, &gs, &PhaseUsage::three_phase(), &tables,
        ).unwrap();

        let bottom = in_bar(pressures[&up]);
        let expected = 10.0 + len as f64 * (1.0 + 0.01 * oil);
        prop_assert!((bottom - expected).abs() < 1e-6);
    }
}
