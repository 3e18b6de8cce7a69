//! Property tests for guide-rate fractions and partitioned sums.

use proptest::prelude::*;
use wg_controls::{FractionCalculator, GuideRateTable, sum_well_rates};
use wg_core::{GuideRateTarget, Phase, PhaseUsage, ProducerCMode};
use wg_state::{GroupState, WellState};
use wg_tree::{FIELD, GroupTree, TreeBuilder, WellRole};

fn one_group(num_wells: usize) -> (GroupTree, Vec<String>) {
    let mut builder = TreeBuilder::new();
    builder.add_group("G", FIELD);
    let names: Vec<String> = (0..num_wells).map(|i| format!("W{}", i)).collect();
    for name in &names {
        builder.add_well(name.as_str(), "G", WellRole::Producer);
    }
    (builder.build().unwrap(), names)
}

proptest! {
    #[test]
    fn sibling_fractions_sum_to_one(guides in prop::collection::vec(0.01_f64..100.0, 1..8)) {
        let (tree, names) = one_group(guides.len());
        let mut wells = WellState::new(PhaseUsage::three_phase());
        let mut table = GuideRateTable::new();
        for (name, g) in names.iter().zip(&guides) {
            wells.add_well(name.as_str(), true);
            wells.set_production_cmode(name, ProducerCMode::Grup).unwrap();
            table.set(name.as_str(), *g, GuideRateTarget::Oil);
        }
        let groups = GroupState::new(3);
        let fcalc = FractionCalculator::new(
            &tree,
            &wells,
            &groups,
            &table,
            GuideRateTarget::Oil,
            PhaseUsage::three_phase(),
            true,
            Phase::Oil,
        );

        let mut sum = 0.0;
        for name in &names {
            let f = fcalc.local_fraction(name, Some(name.as_str())).unwrap();
            prop_assert!((0.0..=1.0 + 1e-12).contains(&f));
            sum += f;
        }
        prop_assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn partitioned_sums_count_each_well_once(
        wells_spec in prop::collection::vec((0.0_f64..1000.0, any::<bool>()), 1..10),
    ) {
        let (tree, names) = one_group(wells_spec.len());
        let field = tree.field().id;

        // Both partitions know every well; exactly one owns it.
        let mut first = WellState::new(PhaseUsage::three_phase());
        let mut second = WellState::new(PhaseUsage::three_phase());
        let mut expected = 0.0;
        for (name, (rate, in_first)) in names.iter().zip(&wells_spec) {
            for (state, owned) in [(&mut first, *in_first), (&mut second, !*in_first)] {
                state.add_well(name.as_str(), owned);
                state.set_well_rates(name, &[0.0, -rate, 0.0]).unwrap();
            }
            expected += rate;
        }

        let total = sum_well_rates(&tree, &first, field, 1, false)
            + sum_well_rates(&tree, &second, field, 1, false);
        prop_assert!((total - expected).abs() < 1e-6);
    }
}
