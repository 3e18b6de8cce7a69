//! Per-group state mutated by the control passes.

use std::collections::HashMap;
use wg_core::{InjectionCMode, Phase, ProductionCMode, Real, WgError, WgResult};

/// Control modes, reductions and aggregated rates keyed by group name.
///
/// Entries appear as the resolver and aggregator passes write them. Readers
/// that need a value the passes should already have produced get a
/// `MissingState` error; optional lookups return `Option`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupState {
    num_phases: usize,
    production_controls: HashMap<String, ProductionCMode>,
    injection_controls: HashMap<String, [Option<InjectionCMode>; 3]>,
    production_reduction_rates: HashMap<String, Vec<Real>>,
    injection_reduction_rates: HashMap<String, Vec<Real>>,
    production_rates: HashMap<String, Vec<Real>>,
    injection_reservoir_rates: HashMap<String, Vec<Real>>,
    injection_rein_rates: HashMap<String, Vec<Real>>,
    injection_vrep_rates: HashMap<String, Real>,
    grat_sales_targets: HashMap<String, Real>,
}

fn rates<'a>(
    map: &'a HashMap<String, Vec<Real>>,
    what: &'static str,
    group: &str,
) -> WgResult<&'a [Real]> {
    map.get(group)
        .map(Vec::as_slice)
        .ok_or_else(|| WgError::missing(what, group))
}

impl GroupState {
    pub fn new(num_phases: usize) -> Self {
        Self {
            num_phases,
            ..Self::default()
        }
    }

    pub fn num_phases(&self) -> usize {
        self.num_phases
    }

    fn check_len(&self, rates: &[Real]) -> WgResult<()> {
        if rates.len() != self.num_phases {
            return Err(WgError::InvalidArg {
                what: format!(
                    "expected {} phase rates, got {}",
                    self.num_phases,
                    rates.len()
                ),
            });
        }
        Ok(())
    }

    // -- control modes --

    pub fn has_production_control(&self, group: &str) -> bool {
        self.production_controls.contains_key(group)
    }

    pub fn production_control(&self, group: &str) -> WgResult<ProductionCMode> {
        self.production_controls
            .get(group)
            .copied()
            .ok_or_else(|| WgError::missing("production control", group))
    }

    pub fn set_production_control(&mut self, group: impl Into<String>, cmode: ProductionCMode) {
        self.production_controls.insert(group.into(), cmode);
    }

    pub fn has_injection_control(&self, group: &str, phase: Phase) -> bool {
        self.injection_controls
            .get(group)
            .is_some_and(|modes| modes[phase.canonical_index()].is_some())
    }

    pub fn injection_control(&self, group: &str, phase: Phase) -> WgResult<InjectionCMode> {
        self.injection_controls
            .get(group)
            .and_then(|modes| modes[phase.canonical_index()])
            .ok_or_else(|| WgError::missing("injection control", group))
    }

    pub fn set_injection_control(
        &mut self,
        group: impl Into<String>,
        phase: Phase,
        cmode: InjectionCMode,
    ) {
        self.injection_controls.entry(group.into()).or_default()[phase.canonical_index()] =
            Some(cmode);
    }

    // -- reductions --

    pub fn production_reduction_rates(&self, group: &str) -> WgResult<&[Real]> {
        rates(&self.production_reduction_rates, "production reduction", group)
    }

    pub fn update_production_reduction_rates(
        &mut self,
        group: impl Into<String>,
        rates: Vec<Real>,
    ) -> WgResult<()> {
        self.check_len(&rates)?;
        self.production_reduction_rates.insert(group.into(), rates);
        Ok(())
    }

    pub fn injection_reduction_rates(&self, group: &str) -> WgResult<&[Real]> {
        rates(&self.injection_reduction_rates, "injection reduction", group)
    }

    pub fn update_injection_reduction_rates(
        &mut self,
        group: impl Into<String>,
        rates: Vec<Real>,
    ) -> WgResult<()> {
        self.check_len(&rates)?;
        self.injection_reduction_rates.insert(group.into(), rates);
        Ok(())
    }

    // -- aggregated rates --

    pub fn production_rates(&self, group: &str) -> WgResult<&[Real]> {
        rates(&self.production_rates, "production rates", group)
    }

    pub fn update_production_rates(
        &mut self,
        group: impl Into<String>,
        rates: Vec<Real>,
    ) -> WgResult<()> {
        self.check_len(&rates)?;
        self.production_rates.insert(group.into(), rates);
        Ok(())
    }

    pub fn injection_reservoir_rates(&self, group: &str) -> WgResult<&[Real]> {
        rates(
            &self.injection_reservoir_rates,
            "injection reservoir rates",
            group,
        )
    }

    pub fn update_injection_reservoir_rates(
        &mut self,
        group: impl Into<String>,
        rates: Vec<Real>,
    ) -> WgResult<()> {
        self.check_len(&rates)?;
        self.injection_reservoir_rates.insert(group.into(), rates);
        Ok(())
    }

    pub fn injection_rein_rates(&self, group: &str) -> WgResult<&[Real]> {
        rates(&self.injection_rein_rates, "REIN rates", group)
    }

    pub fn update_injection_rein_rates(
        &mut self,
        group: impl Into<String>,
        rates: Vec<Real>,
    ) -> WgResult<()> {
        self.check_len(&rates)?;
        self.injection_rein_rates.insert(group.into(), rates);
        Ok(())
    }

    pub fn injection_vrep_rate(&self, group: &str) -> WgResult<Real> {
        self.injection_vrep_rates
            .get(group)
            .copied()
            .ok_or_else(|| WgError::missing("VREP rate", group))
    }

    pub fn update_injection_vrep_rate(&mut self, group: impl Into<String>, rate: Real) {
        self.injection_vrep_rates.insert(group.into(), rate);
    }

    // -- gas sales --

    pub fn has_grat_sales_target(&self, group: &str) -> bool {
        self.grat_sales_targets.contains_key(group)
    }

    pub fn grat_sales_target(&self, group: &str) -> Option<Real> {
        self.grat_sales_targets.get(group).copied()
    }

    /// Gas-rate target a group receives from its sales contract.
    pub fn update_grat_sales_target(&mut self, group: impl Into<String>, target: Real) {
        self.grat_sales_targets.insert(group.into(), target);
    }
}
