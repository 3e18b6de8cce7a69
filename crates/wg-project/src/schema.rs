//! Case file schema definitions.
//!
//! Rates in case files use the runtime sign convention (producers negative)
//! and pressures are in bar.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wg_core::{
    GuideRateInjTarget, GuideRateTarget, InjectionCMode, InjectorCMode, Phase, ProducerCMode,
    ProductionCMode, WellStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Case {
    pub name: String,
    #[serde(default = "default_phases")]
    pub phases: Vec<Phase>,
    /// Summary quantities control values may refer to.
    #[serde(default)]
    pub summary: BTreeMap<String, f64>,
    #[serde(default)]
    pub groups: Vec<GroupDef>,
    #[serde(default)]
    pub wells: Vec<WellDef>,
    #[serde(default)]
    pub guide_rates: GuideRatesDef,
    #[serde(default)]
    pub events: Vec<EventDef>,
    #[serde(default)]
    pub gconsale: Vec<GConSaleDef>,
    #[serde(default)]
    pub gconsump: Vec<GConSumpDef>,
    /// Reservoir-volume coefficients per active phase, for RESV and VREP controls.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resv_coeff: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkDef>,
    #[serde(default)]
    pub vfp_tables: Vec<VfpTableDef>,
}

fn default_phases() -> Vec<Phase> {
    Phase::ALL.to_vec()
}

/// A control value: a number or the name of a summary quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ValueDef {
    Number(f64),
    Quantity(String),
}

impl Default for ValueDef {
    fn default() -> Self {
        ValueDef::Number(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupDef {
    pub name: String,
    /// Defaults to `FIELD`; must be absent on the `FIELD` entry itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production: Option<ProductionDef>,
    #[serde(default)]
    pub injection: Vec<InjectionDef>,
}

fn default_efficiency() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductionDef {
    pub cmode: ProductionCMode,
    #[serde(default)]
    pub oil_target: ValueDef,
    #[serde(default)]
    pub water_target: ValueDef,
    #[serde(default)]
    pub gas_target: ValueDef,
    #[serde(default)]
    pub liquid_target: ValueDef,
    #[serde(default)]
    pub resv_target: ValueDef,
    #[serde(default = "default_true")]
    pub available_for_group_control: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InjectionDef {
    pub phase: Phase,
    pub cmode: InjectionCMode,
    #[serde(default)]
    pub surface_max_rate: ValueDef,
    #[serde(default)]
    pub resv_max_rate: ValueDef,
    #[serde(default)]
    pub target_reinj_fraction: ValueDef,
    #[serde(default)]
    pub target_void_fraction: ValueDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reinj_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voidage_group: Option<String>,
    #[serde(default = "default_guide_rate_def")]
    pub guide_rate_def: GuideRateInjTarget,
    #[serde(default)]
    pub guide_rate: f64,
    #[serde(default = "default_true")]
    pub available_for_group_control: bool,
}

fn default_guide_rate_def() -> GuideRateInjTarget {
    GuideRateInjTarget::NoGuideRate
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WellKind {
    Producer,
    Injector,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WellDef {
    pub name: String,
    pub group: String,
    pub kind: WellKind,
    /// Injected phase; required for injectors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
    #[serde(default = "default_status")]
    pub status: WellStatus,
    /// Whether this partition counts the well in group sums.
    #[serde(default = "default_true")]
    pub owned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer_cmode: Option<ProducerCMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injector_cmode: Option<InjectorCMode>,
    /// Surface rates per active phase.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rates: Vec<f64>,
    /// Reservoir-volume rates per active phase.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reservoir_rates: Vec<f64>,
    #[serde(default)]
    pub solvent_rate: f64,
    #[serde(default)]
    pub alq: f64,
}

fn default_status() -> WellStatus {
    WellStatus::Open
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GuideRatesDef {
    #[serde(default)]
    pub production: Vec<ProductionGuideRateDef>,
    #[serde(default)]
    pub injection: Vec<InjectionGuideRateDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductionGuideRateDef {
    pub name: String,
    pub value: f64,
    pub target: GuideRateTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InjectionGuideRateDef {
    pub name: String,
    pub phase: Phase,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ProductionUpdate,
    InjectionUpdate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventDef {
    pub group: String,
    pub event: EventKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GConSaleDef {
    pub group: String,
    pub sales_target: ValueDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GConSumpDef {
    pub group: String,
    #[serde(default)]
    pub consumption_rate: ValueDef,
    #[serde(default)]
    pub import_rate: ValueDef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    #[serde(default)]
    pub nodes: Vec<NetworkNodeDef>,
    #[serde(default)]
    pub branches: Vec<BranchDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkNodeDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_pressure_bar: Option<f64>,
    #[serde(default)]
    pub add_gas_lift_gas: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchDef {
    pub uptree: String,
    pub downtree: String,
    /// VFP table id; 9999 means no pressure loss.
    pub vfp_table: u32,
}

/// Linear stand-in for a VFP table; coefficients in bar per unit rate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VfpTableDef {
    pub id: u32,
    #[serde(default)]
    pub base: f64,
    #[serde(default)]
    pub water: f64,
    #[serde(default)]
    pub oil: f64,
    #[serde(default)]
    pub gas: f64,
    #[serde(default)]
    pub alq: f64,
}
