//! Per-well state.

use std::collections::HashMap;
use wg_core::{InjectorCMode, PhaseUsage, ProducerCMode, Real, WgError, WgResult};

/// Per-well rates and control modes for the wells known to this partition.
///
/// Rates are stored flat, `num_phases` entries per well, with producers
/// negative and injectors positive. A well appears here only if this
/// partition holds some of its perforations; `owned` marks the single
/// partition that counts it in group sums.
#[derive(Debug, Clone)]
pub struct WellState {
    pu: PhaseUsage,
    names: Vec<String>,
    index: HashMap<String, usize>,
    owned: Vec<bool>,
    rates: Vec<Real>,
    reservoir_rates: Vec<Real>,
    solvent_rates: Vec<Real>,
    alq: Vec<Real>,
    production_cmodes: Vec<ProducerCMode>,
    injection_cmodes: Vec<InjectorCMode>,
    current_well_rates: HashMap<String, Vec<Real>>,
}

impl WellState {
    pub fn new(pu: PhaseUsage) -> Self {
        Self {
            pu,
            names: Vec::new(),
            index: HashMap::new(),
            owned: Vec::new(),
            rates: Vec::new(),
            reservoir_rates: Vec::new(),
            solvent_rates: Vec::new(),
            alq: Vec::new(),
            production_cmodes: Vec::new(),
            injection_cmodes: Vec::new(),
            current_well_rates: HashMap::new(),
        }
    }

    /// Register a well on this partition; returns its local index.
    ///
    /// Re-registering a known well only updates its ownership flag.
    pub fn add_well(&mut self, name: impl Into<String>, owned: bool) -> usize {
        let name = name.into();
        if let Some(&idx) = self.index.get(&name) {
            self.owned[idx] = owned;
            return idx;
        }
        let idx = self.names.len();
        let np = self.pu.num_phases();
        self.index.insert(name.clone(), idx);
        self.names.push(name);
        self.owned.push(owned);
        self.rates.extend(std::iter::repeat_n(0.0, np));
        self.reservoir_rates.extend(std::iter::repeat_n(0.0, np));
        self.solvent_rates.push(0.0);
        self.alq.push(0.0);
        self.production_cmodes.push(ProducerCMode::Bhp);
        self.injection_cmodes.push(InjectorCMode::Bhp);
        idx
    }

    pub fn phase_usage(&self) -> &PhaseUsage {
        &self.pu
    }

    pub fn num_phases(&self) -> usize {
        self.pu.num_phases()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn well_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Whether this partition counts the well in group sums.
    pub fn is_owned(&self, index: usize) -> bool {
        self.owned[index]
    }

    fn require(&self, name: &str) -> WgResult<usize> {
        self.well_index(name)
            .ok_or_else(|| WgError::missing("well state", name))
    }

    fn check_len(&self, rates: &[Real]) -> WgResult<()> {
        if rates.len() != self.num_phases() {
            return Err(WgError::InvalidArg {
                what: format!(
                    "expected {} phase rates, got {}",
                    self.num_phases(),
                    rates.len()
                ),
            });
        }
        Ok(())
    }

    /// Flat surface rates of all wells.
    pub fn well_rates(&self) -> &[Real] {
        &self.rates
    }

    /// Flat reservoir-volume rates of all wells.
    pub fn well_reservoir_rates(&self) -> &[Real] {
        &self.reservoir_rates
    }

    /// Surface rates of one well.
    pub fn rates_of(&self, index: usize) -> &[Real] {
        let np = self.num_phases();
        &self.rates[index * np..(index + 1) * np]
    }

    pub fn set_well_rates(&mut self, name: &str, rates: &[Real]) -> WgResult<()> {
        self.check_len(rates)?;
        let idx = self.require(name)?;
        let np = self.num_phases();
        self.rates[idx * np..(idx + 1) * np].copy_from_slice(rates);
        Ok(())
    }

    pub fn set_reservoir_rates(&mut self, name: &str, rates: &[Real]) -> WgResult<()> {
        self.check_len(rates)?;
        let idx = self.require(name)?;
        let np = self.num_phases();
        self.reservoir_rates[idx * np..(idx + 1) * np].copy_from_slice(rates);
        Ok(())
    }

    pub fn solvent_rate(&self, index: usize) -> Real {
        self.solvent_rates[index]
    }

    pub fn set_solvent_rate(&mut self, name: &str, rate: Real) -> WgResult<()> {
        let idx = self.require(name)?;
        self.solvent_rates[idx] = rate;
        Ok(())
    }

    /// Artificial-lift quantity of a well; 0 for wells not on this partition.
    pub fn alq(&self, name: &str) -> Real {
        self.well_index(name).map_or(0.0, |i| self.alq[i])
    }

    pub fn set_alq(&mut self, name: &str, alq: Real) -> WgResult<()> {
        let idx = self.require(name)?;
        self.alq[idx] = alq;
        Ok(())
    }

    pub fn production_cmode(&self, index: usize) -> ProducerCMode {
        self.production_cmodes[index]
    }

    pub fn injection_cmode(&self, index: usize) -> InjectorCMode {
        self.injection_cmodes[index]
    }

    pub fn set_production_cmode(&mut self, name: &str, cmode: ProducerCMode) -> WgResult<()> {
        let idx = self.require(name)?;
        self.production_cmodes[idx] = cmode;
        Ok(())
    }

    pub fn set_injection_cmode(&mut self, name: &str, cmode: InjectorCMode) -> WgResult<()> {
        let idx = self.require(name)?;
        self.injection_cmodes[idx] = cmode;
        Ok(())
    }

    /// True if the producer is known here and under group control.
    pub fn is_production_grup(&self, name: &str) -> bool {
        self.well_index(name)
            .is_some_and(|i| self.production_cmodes[i] == ProducerCMode::Grup)
    }

    /// True if the injector is known here and under group control.
    pub fn is_injection_grup(&self, name: &str) -> bool {
        self.well_index(name)
            .is_some_and(|i| self.injection_cmodes[i] == InjectorCMode::Grup)
    }

    /// Rates of a well in the positive-for-both-roles convention.
    pub fn current_well_rates(&self, name: &str) -> Option<&[Real]> {
        self.current_well_rates.get(name).map(Vec::as_slice)
    }

    pub fn set_current_well_rates(&mut self, name: impl Into<String>, rates: Vec<Real>) {
        self.current_well_rates.insert(name.into(), rates);
    }
}
