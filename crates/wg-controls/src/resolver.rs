//! Control-mode resolution.

use wg_core::{DiagnosticSink, GroupId, InjectionCMode, Phase, ProductionCMode, WgResult};
use wg_state::GroupState;
use wg_tree::{GroupEvent, ScheduleStep, SummaryState};

/// Resolve the current control modes of `root` and every group beneath it.
///
/// Children are resolved before their parent. A group without a mode yet
/// starts at `NONE`; update events overwrite the modes from the resolved
/// controls and a gas sales contract forces gas injection to `SALE`. Without
/// new events a second call leaves every mode unchanged.
pub fn set_cmode_group(
    step: &ScheduleStep,
    summary: &SummaryState,
    group_state: &mut GroupState,
    root: GroupId,
    logger: &mut dyn DiagnosticSink,
) -> WgResult<()> {
    let tree = &step.tree;
    for id in tree.subtree_post_order(root) {
        let group = tree.group(id);
        let name = group.name.as_str();

        for phase in Phase::ALL {
            if !group_state.has_injection_control(name, phase) {
                group_state.set_injection_control(name, phase, InjectionCMode::None);
            }
        }
        if !group_state.has_production_control(name) {
            group_state.set_production_control(name, ProductionCMode::None);
        }

        if group.is_injection_group()
            && step.events.has_event(name, GroupEvent::InjectionUpdate)
        {
            for phase in Phase::ALL {
                if !group.has_injection_control(phase) {
                    continue;
                }
                let controls = group.injection_controls(phase, summary)?;
                group_state.set_injection_control(name, phase, controls.cmode);
                logger.debug(&format!(
                    "group {} {} injection control set to {}",
                    name, phase, controls.cmode
                ));
            }
        }

        if group.is_production_group()
            && step.events.has_event(name, GroupEvent::ProductionUpdate)
        {
            let controls = group.production_controls(summary)?;
            group_state.set_production_control(name, controls.cmode);
            logger.debug(&format!(
                "group {} production control set to {}",
                name, controls.cmode
            ));
        }

        if step.gconsale(name).is_some() {
            group_state.set_injection_control(name, Phase::Gas, InjectionCMode::Sale);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wg_core::DeferredLogger;
    use wg_tree::{FIELD, GConSale, InjectionSpec, ProductionSpec, TreeBuilder, Uda};

    fn step() -> ScheduleStep {
        let mut b = TreeBuilder::new();
        let plat = b.add_group("PLAT", FIELD);
        b.add_group("G1", "PLAT");
        b.set_production(plat, ProductionSpec::new(ProductionCMode::Orat));
        b.add_injection(plat, InjectionSpec::new(Phase::Water, InjectionCMode::Vrep));
        ScheduleStep::new(b.build().unwrap())
    }

    #[test]
    fn defaults_to_none_without_events() {
        let step = step();
        let mut gs = GroupState::new(3);
        let mut log = DeferredLogger::new();
        set_cmode_group(&step, &SummaryState::new(), &mut gs, step.tree.field().id, &mut log)
            .unwrap();
        assert_eq!(gs.production_control("PLAT").unwrap(), ProductionCMode::None);
        assert_eq!(
            gs.injection_control("G1", Phase::Gas).unwrap(),
            InjectionCMode::None
        );
        assert!(log.is_empty());
    }

    #[test]
    fn events_and_sales_contract_apply() {
        let mut step = step();
        step.events.add("PLAT", GroupEvent::ProductionUpdate);
        step.events.add("PLAT", GroupEvent::InjectionUpdate);
        step.gconsale.insert(
            "PLAT".into(),
            GConSale {
                sales_target: Uda::Value(1.0e5),
            },
        );
        let mut gs = GroupState::new(3);
        let mut log = DeferredLogger::new();
        let field = step.tree.field().id;
        set_cmode_group(&step, &SummaryState::new(), &mut gs, field, &mut log).unwrap();

        assert_eq!(gs.production_control("PLAT").unwrap(), ProductionCMode::Orat);
        assert_eq!(
            gs.injection_control("PLAT", Phase::Water).unwrap(),
            InjectionCMode::Vrep
        );
        assert_eq!(
            gs.injection_control("PLAT", Phase::Gas).unwrap(),
            InjectionCMode::Sale
        );
        assert_eq!(log.entries().len(), 2);
    }

    #[test]
    fn existing_modes_survive_a_rerun() {
        let step = step();
        let mut gs = GroupState::new(3);
        gs.set_production_control("G1", ProductionCMode::Lrat);
        let mut log = DeferredLogger::new();
        let field = step.tree.field().id;
        set_cmode_group(&step, &SummaryState::new(), &mut gs, field, &mut log).unwrap();
        set_cmode_group(&step, &SummaryState::new(), &mut gs, field, &mut log).unwrap();
        assert_eq!(gs.production_control("G1").unwrap(), ProductionCMode::Lrat);
    }
}
