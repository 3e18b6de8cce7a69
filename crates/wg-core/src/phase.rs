//! Fluid phases and their positions in per-well rate vectors.

use core::fmt;

use crate::cmode::GuideRateTarget;
use crate::numeric::Real;

/// A fluid phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Phase {
    Water,
    Oil,
    Gas,
}

impl Phase {
    /// Canonical (water, oil, gas) order.
    pub const ALL: [Phase; 3] = [Phase::Water, Phase::Oil, Phase::Gas];

    /// Slot in the canonical order, independent of which phases are active.
    pub fn canonical_index(self) -> usize {
        match self {
            Phase::Water => 0,
            Phase::Oil => 1,
            Phase::Gas => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Water => "WATER",
            Phase::Oil => "OIL",
            Phase::Gas => "GAS",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which phases are active and where each one sits in a rate vector.
///
/// Active phases are packed in canonical order, so a water/gas run has
/// water at position 0 and gas at position 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseUsage {
    pos: [Option<usize>; 3],
    num_phases: usize,
}

impl PhaseUsage {
    /// Build a usage descriptor from the active phases (order and duplicates ignored).
    pub fn new(active: &[Phase]) -> Self {
        let mut pos = [None; 3];
        let mut next = 0;
        for phase in Phase::ALL {
            if active.contains(&phase) {
                pos[phase.canonical_index()] = Some(next);
                next += 1;
            }
        }
        Self {
            pos,
            num_phases: next,
        }
    }

    pub fn three_phase() -> Self {
        Self::new(&Phase::ALL)
    }

    pub fn num_phases(&self) -> usize {
        self.num_phases
    }

    pub fn is_active(&self, phase: Phase) -> bool {
        self.pos[phase.canonical_index()].is_some()
    }

    /// Position of `phase` in rate vectors, if active.
    pub fn pos(&self, phase: Phase) -> Option<usize> {
        self.pos[phase.canonical_index()]
    }

    /// Active phases in canonical order.
    pub fn active_phases(&self) -> impl Iterator<Item = Phase> + '_ {
        Phase::ALL.into_iter().filter(|p| self.is_active(*p))
    }

    /// Rate of `phase` in `rates`, 0 when the phase is inactive.
    pub fn rate(&self, rates: &[Real], phase: Phase) -> Real {
        self.pos(phase)
            .and_then(|p| rates.get(p).copied())
            .unwrap_or(0.0)
    }
}

impl Default for PhaseUsage {
    fn default() -> Self {
        Self::three_phase()
    }
}

/// Surface rates in the (oil, gas, water) shape guide-rate lookups expect.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateVector {
    pub oil: Real,
    pub gas: Real,
    pub water: Real,
}

impl RateVector {
    pub fn from_rates(rates: &[Real], pu: &PhaseUsage) -> Self {
        Self {
            oil: pu.rate(rates, Phase::Oil),
            gas: pu.rate(rates, Phase::Gas),
            water: pu.rate(rates, Phase::Water),
        }
    }

    /// The rate matching a guide-rate target, if it is a surface-rate target.
    pub fn eval(&self, target: GuideRateTarget) -> Option<Real> {
        match target {
            GuideRateTarget::Oil => Some(self.oil),
            GuideRateTarget::Gas => Some(self.gas),
            GuideRateTarget::Wat => Some(self.water),
            GuideRateTarget::Liq => Some(self.oil + self.water),
            GuideRateTarget::Res => None,
        }
    }
}
