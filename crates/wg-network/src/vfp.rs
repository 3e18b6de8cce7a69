//! Vertical flow performance lookups.

use std::collections::HashMap;
use wg_core::{Pressure, Real, WgError, WgResult, bar, ensure_finite, in_bar};

/// Inlet pressure of a pipe given its flow and outlet pressure.
///
/// Rates follow the production convention: negative for flow out of the
/// reservoir.
pub trait VfpEvaluator {
    fn bhp(
        &self,
        table: u32,
        water: Real,
        oil: Real,
        gas: Real,
        outlet: Pressure,
        alq: Real,
    ) -> WgResult<Pressure>;
}

/// Pressure drop linear in the produced phase rates.
///
/// `drop = base + water * qw + oil * qo + gas * qg - alq * lift`, in bar,
/// never below zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinearVfpTable {
    pub base: Real,
    pub water: Real,
    pub oil: Real,
    pub gas: Real,
    pub alq: Real,
}

impl LinearVfpTable {
    pub fn pressure_drop(&self, water: Real, oil: Real, gas: Real, alq: Real) -> Real {
        // Production rates arrive negative.
        let dp = self.base - self.water * water - self.oil * oil - self.gas * gas - self.alq * alq;
        dp.max(0.0)
    }
}

/// A set of linear tables keyed by table id.
#[derive(Debug, Clone, Default)]
pub struct LinearVfpTables {
    tables: HashMap<u32, LinearVfpTable>,
}

impl LinearVfpTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u32, table: LinearVfpTable) {
        self.tables.insert(id, table);
    }

    pub fn get(&self, id: u32) -> Option<&LinearVfpTable> {
        self.tables.get(&id)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl VfpEvaluator for LinearVfpTables {
    fn bhp(
        &self,
        table: u32,
        water: Real,
        oil: Real,
        gas: Real,
        outlet: Pressure,
        alq: Real,
    ) -> WgResult<Pressure> {
        let t = self.tables.get(&table).ok_or_else(|| WgError::InvalidArg {
            what: format!("VFP table {} is not defined", table),
        })?;
        let inlet = in_bar(outlet) + t.pressure_drop(water, oil, gas, alq);
        Ok(bar(ensure_finite(inlet, "VFP inlet pressure")?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_grows_with_production() {
        let mut tables = LinearVfpTables::new();
        tables.insert(
            1,
            LinearVfpTable {
                base: 2.0,
                oil: 0.01,
                ..Default::default()
            },
        );
        let p = tables.bhp(1, 0.0, -1000.0, 0.0, bar(50.0), 0.0).unwrap();
        assert!((in_bar(p) - 62.0).abs() < 1e-9);
    }

    #[test]
    fn lift_gas_reduces_the_drop_but_not_below_zero() {
        let t = LinearVfpTable {
            base: 1.0,
            alq: 1.0,
            ..Default::default()
        };
        assert_eq!(t.pressure_drop(0.0, 0.0, 0.0, 0.5), 0.5);
        assert_eq!(t.pressure_drop(0.0, 0.0, 0.0, 5.0), 0.0);
    }

    #[test]
    fn unknown_table_is_an_error() {
        let tables = LinearVfpTables::new();
        assert!(tables.bhp(7, 0.0, 0.0, 0.0, bar(1.0), 0.0).is_err());
    }
}
