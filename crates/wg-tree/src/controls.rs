//! Group control specifications.
//!
//! Specs are stored as given in the schedule; target values may refer to
//! summary quantities and are resolved on demand into plain numbers.

use wg_core::{GuideRateInjTarget, InjectionCMode, Phase, ProductionCMode, Real, WgResult};

use crate::summary::SummaryState;

/// A control value: a number, or the name of a summary quantity.
#[derive(Debug, Clone, PartialEq)]
pub enum Uda {
    Value(Real),
    Quantity(String),
}

impl Uda {
    pub fn resolve(&self, summary: &SummaryState) -> WgResult<Real> {
        match self {
            Uda::Value(v) => Ok(*v),
            Uda::Quantity(key) => summary.require(key),
        }
    }
}

impl Default for Uda {
    fn default() -> Self {
        Uda::Value(0.0)
    }
}

impl From<Real> for Uda {
    fn from(v: Real) -> Self {
        Uda::Value(v)
    }
}

impl From<&str> for Uda {
    fn from(key: &str) -> Self {
        Uda::Quantity(key.to_owned())
    }
}

/// Production control specification of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionSpec {
    pub cmode: ProductionCMode,
    pub oil_target: Uda,
    pub water_target: Uda,
    pub gas_target: Uda,
    pub liquid_target: Uda,
    pub resv_target: Uda,
    /// Whether this group may be steered by its parent's control.
    pub available_for_group_control: bool,
}

impl ProductionSpec {
    pub fn new(cmode: ProductionCMode) -> Self {
        Self {
            cmode,
            oil_target: Uda::default(),
            water_target: Uda::default(),
            gas_target: Uda::default(),
            liquid_target: Uda::default(),
            resv_target: Uda::default(),
            available_for_group_control: true,
        }
    }

    pub fn resolve(&self, summary: &SummaryState) -> WgResult<ProductionControls> {
        Ok(ProductionControls {
            cmode: self.cmode,
            oil_target: self.oil_target.resolve(summary)?,
            water_target: self.water_target.resolve(summary)?,
            gas_target: self.gas_target.resolve(summary)?,
            liquid_target: self.liquid_target.resolve(summary)?,
            resv_target: self.resv_target.resolve(summary)?,
        })
    }
}

/// Production controls with every target resolved to a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductionControls {
    pub cmode: ProductionCMode,
    pub oil_target: Real,
    pub water_target: Real,
    pub gas_target: Real,
    pub liquid_target: Real,
    pub resv_target: Real,
}

/// Injection control specification of a group for one phase.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectionSpec {
    pub phase: Phase,
    pub cmode: InjectionCMode,
    pub surface_max_rate: Uda,
    pub resv_max_rate: Uda,
    pub target_reinj_fraction: Uda,
    pub target_void_fraction: Uda,
    /// Group whose production is reinjected; the owning group when unset.
    pub reinj_group: Option<String>,
    /// Group whose voidage is replaced; the owning group when unset.
    pub voidage_group: Option<String>,
    pub guide_rate_def: GuideRateInjTarget,
    /// Configured guide rate, used when the computed one is not positive.
    pub guide_rate: Real,
    pub available_for_group_control: bool,
}

impl InjectionSpec {
    pub fn new(phase: Phase, cmode: InjectionCMode) -> Self {
        Self {
            phase,
            cmode,
            surface_max_rate: Uda::default(),
            resv_max_rate: Uda::default(),
            target_reinj_fraction: Uda::default(),
            target_void_fraction: Uda::default(),
            reinj_group: None,
            voidage_group: None,
            guide_rate_def: GuideRateInjTarget::NoGuideRate,
            guide_rate: 0.0,
            available_for_group_control: true,
        }
    }

    pub fn resolve(&self, group_name: &str, summary: &SummaryState) -> WgResult<InjectionControls> {
        Ok(InjectionControls {
            phase: self.phase,
            cmode: self.cmode,
            surface_max_rate: self.surface_max_rate.resolve(summary)?,
            resv_max_rate: self.resv_max_rate.resolve(summary)?,
            target_reinj_fraction: self.target_reinj_fraction.resolve(summary)?,
            target_void_fraction: self.target_void_fraction.resolve(summary)?,
            reinj_group: self
                .reinj_group
                .clone()
                .unwrap_or_else(|| group_name.to_owned()),
            voidage_group: self
                .voidage_group
                .clone()
                .unwrap_or_else(|| group_name.to_owned()),
            guide_rate_def: self.guide_rate_def,
        })
    }
}

/// Injection controls with every value resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectionControls {
    pub phase: Phase,
    pub cmode: InjectionCMode,
    pub surface_max_rate: Real,
    pub resv_max_rate: Real,
    pub target_reinj_fraction: Real,
    pub target_void_fraction: Real,
    pub reinj_group: String,
    pub voidage_group: String,
    pub guide_rate_def: GuideRateInjTarget,
}
