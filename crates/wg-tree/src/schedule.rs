//! The per-step schedule view consumed by the control passes.

use std::collections::{HashMap, HashSet};
use wg_core::{Real, WgResult};

use crate::controls::Uda;
use crate::summary::SummaryState;
use crate::tree::GroupTree;

/// Schedule events relevant to group control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupEvent {
    ProductionUpdate,
    InjectionUpdate,
}

/// Events that fired for groups at this step.
#[derive(Debug, Clone, Default)]
pub struct GroupEvents {
    events: HashMap<String, HashSet<GroupEvent>>,
}

impl GroupEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, group: impl Into<String>, event: GroupEvent) {
        self.events.entry(group.into()).or_default().insert(event);
    }

    pub fn has_event(&self, group: &str, event: GroupEvent) -> bool {
        self.events.get(group).is_some_and(|e| e.contains(&event))
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Gas sales contract (GCONSALE) of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct GConSale {
    pub sales_target: Uda,
}

impl GConSale {
    pub fn sales_target(&self, summary: &SummaryState) -> WgResult<Real> {
        self.sales_target.resolve(summary)
    }
}

/// Gas consumption and import (GCONSUMP) of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct GConSump {
    pub consumption_rate: Uda,
    pub import_rate: Uda,
}

impl GConSump {
    /// (import, consumption) resolved against the summary state.
    pub fn rates(&self, summary: &SummaryState) -> WgResult<(Real, Real)> {
        Ok((
            self.import_rate.resolve(summary)?,
            self.consumption_rate.resolve(summary)?,
        ))
    }
}

/// Everything the control passes read from the schedule for one step.
#[derive(Debug, Clone)]
pub struct ScheduleStep {
    pub tree: GroupTree,
    pub events: GroupEvents,
    pub gconsale: HashMap<String, GConSale>,
    pub gconsump: HashMap<String, GConSump>,
}

impl ScheduleStep {
    /// A step with no events or contracts.
    pub fn new(tree: GroupTree) -> Self {
        Self {
            tree,
            events: GroupEvents::new(),
            gconsale: HashMap::new(),
            gconsump: HashMap::new(),
        }
    }

    pub fn gconsale(&self, group: &str) -> Option<&GConSale> {
        self.gconsale.get(group)
    }

    pub fn gconsump(&self, group: &str) -> Option<&GConSump> {
        self.gconsump.get(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_per_group() {
        let mut events = GroupEvents::new();
        events.add("G1", GroupEvent::ProductionUpdate);
        assert!(events.has_event("G1", GroupEvent::ProductionUpdate));
        assert!(!events.has_event("G1", GroupEvent::InjectionUpdate));
        assert!(!events.has_event("G2", GroupEvent::ProductionUpdate));
        events.clear();
        assert!(!events.has_event("G1", GroupEvent::ProductionUpdate));
    }

    #[test]
    fn consumption_resolves() {
        let sump = GConSump {
            consumption_rate: Uda::Value(10.0),
            import_rate: Uda::Value(4.0),
        };
        assert_eq!(sump.rates(&SummaryState::new()).unwrap(), (4.0, 10.0));
    }
}
