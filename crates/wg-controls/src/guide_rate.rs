//! Guide-rate lookups.
//!
//! The allocation passes only read guide rates. [`GuideRateProvider`] is the
//! seam; [`GuideRateTable`] is the in-memory implementation used by case
//! files and tests.

use std::collections::HashMap;
use wg_core::{GUIDE_RATE_EPSILON, GuideRateTarget, Phase, Real, RateVector};

/// Read-only guide-rate source.
pub trait GuideRateProvider {
    /// True if `name` has an explicit production guide rate.
    fn has(&self, name: &str) -> bool;

    /// True if `name` has an explicit injection guide rate for `phase`.
    fn has_injection(&self, name: &str, phase: Phase) -> bool;

    /// Production guide rate of `name` expressed in `target`.
    ///
    /// `rates` are the node's current surface rates, used to convert between
    /// targets and as the fallback weight for wells without an entry.
    fn get(&self, name: &str, target: GuideRateTarget, rates: &RateVector) -> Real;

    /// Injection guide rate of `name` for `phase`; 0 when absent.
    fn get_injection(&self, name: &str, phase: Phase) -> Real;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    value: Real,
    target: GuideRateTarget,
}

/// Guide rates keyed by node name, and by (name, phase) for injection.
#[derive(Debug, Clone, Default)]
pub struct GuideRateTable {
    production: HashMap<String, Entry>,
    injection: HashMap<(String, Phase), Real>,
}

impl GuideRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the production guide rate of a node, given in `target`.
    pub fn set(&mut self, name: impl Into<String>, value: Real, target: GuideRateTarget) {
        self.production
            .insert(name.into(), Entry { value, target });
    }

    pub fn set_injection(&mut self, name: impl Into<String>, phase: Phase, value: Real) {
        self.injection.insert((name.into(), phase), value);
    }

    pub fn len(&self) -> usize {
        self.production.len() + self.injection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.production.is_empty() && self.injection.is_empty()
    }
}

impl GuideRateProvider for GuideRateTable {
    fn has(&self, name: &str) -> bool {
        self.production.contains_key(name)
    }

    fn has_injection(&self, name: &str, phase: Phase) -> bool {
        self.injection.contains_key(&(name.to_owned(), phase))
    }

    fn get(&self, name: &str, target: GuideRateTarget, rates: &RateVector) -> Real {
        let Some(entry) = self.production.get(name) else {
            // No entry: weight by the current rate in the requested target.
            return rates.eval(target).unwrap_or(0.0).max(0.0);
        };
        if entry.target == target {
            return entry.value;
        }
        // Convert through the node's current phase split.
        match (rates.eval(target), rates.eval(entry.target)) {
            (Some(num), Some(den)) if den.abs() > GUIDE_RATE_EPSILON => entry.value * num / den,
            _ => entry.value,
        }
    }

    fn get_injection(&self, name: &str, phase: Phase) -> Real {
        self.injection
            .get(&(name.to_owned(), phase))
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_entry_in_same_target() {
        let mut table = GuideRateTable::new();
        table.set("P1", 3.0, GuideRateTarget::Oil);
        let rates = RateVector::default();
        assert!(table.has("P1"));
        assert_eq!(table.get("P1", GuideRateTarget::Oil, &rates), 3.0);
    }

    #[test]
    fn converts_through_rate_ratio() {
        let mut table = GuideRateTable::new();
        table.set("P1", 10.0, GuideRateTarget::Oil);
        let rates = RateVector {
            oil: 100.0,
            gas: 5000.0,
            water: 20.0,
        };
        assert_eq!(table.get("P1", GuideRateTarget::Gas, &rates), 500.0);
        assert_eq!(table.get("P1", GuideRateTarget::Res, &rates), 10.0);
    }

    #[test]
    fn missing_wells_fall_back_to_current_rate() {
        let table = GuideRateTable::new();
        let rates = RateVector {
            oil: 40.0,
            gas: 0.0,
            water: 60.0,
        };
        assert!(!table.has("P9"));
        assert_eq!(table.get("P9", GuideRateTarget::Liq, &rates), 100.0);
        assert_eq!(table.get("P9", GuideRateTarget::Res, &rates), 0.0);
    }

    #[test]
    fn injection_entries_are_per_phase() {
        let mut table = GuideRateTable::new();
        table.set_injection("INJ", Phase::Water, 2.5);
        assert!(table.has_injection("INJ", Phase::Water));
        assert!(!table.has_injection("INJ", Phase::Gas));
        assert_eq!(table.get_injection("INJ", Phase::Gas), 0.0);
        assert_eq!(table.len(), 1);
    }
}
