//! Target calculators.
//!
//! A group's active control mode picks a target kind. Each kind knows how
//! to read the group's target from its resolved controls and how to project
//! a phase-rate vector onto the same quantity, so targets, reductions and
//! current rates are always compared in one unit.

use wg_core::{
    GuideRateTarget, InjectionCMode, Phase, PhaseUsage, ProductionCMode, Real, WgError, WgResult,
    ensure_finite,
};
use wg_state::GroupState;
use wg_tree::{InjectionControls, ProductionControls};

/// Quantity a production control targets.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductionTarget {
    Oil,
    Water,
    /// Gas rate, overridden by a positive sales-derived target.
    Gas { sales_target: Real },
    Liquid,
    /// Reservoir volume, phase rates weighted by `coeff`.
    Reservoir { coeff: Vec<Real> },
}

/// Production target calculator for one controlling group.
#[derive(Debug, Clone)]
pub struct ProductionTargetCalculator {
    target: ProductionTarget,
    pu: PhaseUsage,
}

impl ProductionTargetCalculator {
    /// Fails for modes that carry no rate target (`NONE`, `FLD`, `PRBL`, `CRAT`).
    pub fn new(
        cmode: ProductionCMode,
        pu: PhaseUsage,
        resv_coeff: &[Real],
        grat_target_from_sales: Real,
    ) -> WgResult<Self> {
        let target = match cmode {
            ProductionCMode::Orat => ProductionTarget::Oil,
            ProductionCMode::Wrat => ProductionTarget::Water,
            ProductionCMode::Grat => ProductionTarget::Gas {
                sales_target: grat_target_from_sales,
            },
            ProductionCMode::Lrat => ProductionTarget::Liquid,
            ProductionCMode::Resv => {
                check_coeff(resv_coeff, &pu)?;
                ProductionTarget::Reservoir {
                    coeff: resv_coeff.to_vec(),
                }
            }
            other => {
                return Err(WgError::InvalidControlMode {
                    mode: other.to_string(),
                    context: "production target calculator".into(),
                });
            }
        };
        Ok(Self { target, pu })
    }

    pub fn target(&self) -> &ProductionTarget {
        &self.target
    }

    /// Project phase rates onto the controlled quantity.
    pub fn rate_from_rates(&self, rates: &[Real]) -> Real {
        let pu = &self.pu;
        match &self.target {
            ProductionTarget::Oil => pu.rate(rates, Phase::Oil),
            ProductionTarget::Water => pu.rate(rates, Phase::Water),
            ProductionTarget::Gas { .. } => pu.rate(rates, Phase::Gas),
            ProductionTarget::Liquid => pu.rate(rates, Phase::Oil) + pu.rate(rates, Phase::Water),
            ProductionTarget::Reservoir { coeff } => {
                rates.iter().zip(coeff).map(|(r, c)| r * c).sum()
            }
        }
    }

    /// The group's own target for the controlled quantity.
    pub fn group_target(&self, ctrl: &ProductionControls) -> Real {
        match &self.target {
            ProductionTarget::Oil => ctrl.oil_target,
            ProductionTarget::Water => ctrl.water_target,
            ProductionTarget::Gas { sales_target } => {
                if *sales_target > 0.0 {
                    *sales_target
                } else {
                    ctrl.gas_target
                }
            }
            ProductionTarget::Liquid => ctrl.liquid_target,
            ProductionTarget::Reservoir { .. } => ctrl.resv_target,
        }
    }

    /// Guide-rate target matching the controlled quantity.
    pub fn guide_target(&self) -> GuideRateTarget {
        match self.target {
            ProductionTarget::Oil => GuideRateTarget::Oil,
            ProductionTarget::Water => GuideRateTarget::Wat,
            ProductionTarget::Gas { .. } => GuideRateTarget::Gas,
            ProductionTarget::Liquid => GuideRateTarget::Liq,
            ProductionTarget::Reservoir { .. } => GuideRateTarget::Res,
        }
    }
}

/// Quantity an injection control targets, for the injected phase.
#[derive(Debug, Clone, PartialEq)]
pub enum InjectionTarget {
    /// Surface rate.
    Rate,
    /// Reservoir rate, converted to surface with the phase's coefficient.
    Reservoir { coeff: Real },
    /// Fraction of the reinjection group's REIN rate.
    Reinjection,
    /// Fraction of the voidage group's production voidage, net of the
    /// other phases' reservoir injection.
    Voidage { coeff: Vec<Real> },
    /// REIN gas left over after the sales contract.
    Sales { sales_target: Real },
}

/// Injection target calculator for one controlling group and phase.
#[derive(Debug, Clone)]
pub struct InjectionTargetCalculator {
    target: InjectionTarget,
    phase: Phase,
    pos: usize,
    pu: PhaseUsage,
    group_name: String,
}

impl InjectionTargetCalculator {
    pub fn new(
        cmode: InjectionCMode,
        pu: PhaseUsage,
        resv_coeff: &[Real],
        group_name: impl Into<String>,
        sales_target: Real,
        phase: Phase,
    ) -> WgResult<Self> {
        let group_name = group_name.into();
        let pos = pu.pos(phase).ok_or_else(|| WgError::InvalidArg {
            what: format!("injection phase {} is not active", phase),
        })?;
        let invalid = |mode: InjectionCMode| WgError::InvalidControlMode {
            mode: mode.to_string(),
            context: format!("{} injection target of group {}", phase, group_name),
        };
        let target = match cmode {
            InjectionCMode::Rate => InjectionTarget::Rate,
            InjectionCMode::Resv => {
                check_coeff(resv_coeff, &pu)?;
                InjectionTarget::Reservoir {
                    coeff: resv_coeff[pos],
                }
            }
            InjectionCMode::Rein => InjectionTarget::Reinjection,
            InjectionCMode::Vrep => {
                check_coeff(resv_coeff, &pu)?;
                InjectionTarget::Voidage {
                    coeff: resv_coeff.to_vec(),
                }
            }
            InjectionCMode::Sale if phase == Phase::Gas => InjectionTarget::Sales { sales_target },
            other => return Err(invalid(other)),
        };
        Ok(Self {
            target,
            phase,
            pos,
            pu,
            group_name,
        })
    }

    pub fn target(&self) -> &InjectionTarget {
        &self.target
    }

    pub fn rate_from_rates(&self, rates: &[Real]) -> Real {
        rates.get(self.pos).copied().unwrap_or(0.0)
    }

    /// The group's own injection target for the phase.
    pub fn group_target(
        &self,
        ctrl: &InjectionControls,
        group_state: &GroupState,
    ) -> WgResult<Real> {
        let target = match &self.target {
            InjectionTarget::Rate => ctrl.surface_max_rate,
            InjectionTarget::Reservoir { coeff } => ctrl.resv_max_rate / coeff,
            InjectionTarget::Reinjection => {
                let rein = group_state.injection_rein_rates(&ctrl.reinj_group)?;
                ctrl.target_reinj_fraction * rein[self.pos]
            }
            InjectionTarget::Voidage { coeff } => {
                let group = ctrl.voidage_group.as_str();
                let mut voidage =
                    group_state.injection_vrep_rate(group)? * ctrl.target_void_fraction;
                let injected = group_state.injection_reservoir_rates(group)?;
                for phase in self.pu.active_phases().filter(|p| *p != self.phase) {
                    voidage -= self.pu.rate(injected, phase);
                }
                voidage / coeff[self.pos]
            }
            InjectionTarget::Sales { sales_target } => {
                // Import and consumption are already part of REIN.
                group_state.injection_rein_rates(&self.group_name)?[self.pos] - sales_target
            }
        };
        ensure_finite(target, "injection group target")
    }

    pub fn guide_target(&self) -> GuideRateTarget {
        match self.phase {
            Phase::Water => GuideRateTarget::Wat,
            Phase::Oil => GuideRateTarget::Oil,
            Phase::Gas => GuideRateTarget::Gas,
        }
    }
}

fn check_coeff(resv_coeff: &[Real], pu: &PhaseUsage) -> WgResult<()> {
    if resv_coeff.len() != pu.num_phases() {
        return Err(WgError::InvalidArg {
            what: format!(
                "expected {} reservoir coefficients, got {}",
                pu.num_phases(),
                resv_coeff.len()
            ),
        });
    }
    if resv_coeff.iter().any(|c| !c.is_finite() || *c <= 0.0) {
        return Err(WgError::InvalidArg {
            what: "reservoir coefficients must be positive".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prod_ctrl() -> ProductionControls {
        ProductionControls {
            cmode: ProductionCMode::Grat,
            oil_target: 100.0,
            water_target: 200.0,
            gas_target: 3000.0,
            liquid_target: 250.0,
            resv_target: 400.0,
        }
    }

    fn inj_ctrl(cmode: InjectionCMode, phase: Phase) -> InjectionControls {
        InjectionControls {
            phase,
            cmode,
            surface_max_rate: 1000.0,
            resv_max_rate: 900.0,
            target_reinj_fraction: 0.5,
            target_void_fraction: 1.2,
            reinj_group: "PROD".into(),
            voidage_group: "PROD".into(),
            guide_rate_def: wg_core::GuideRateInjTarget::NoGuideRate,
        }
    }

    #[test]
    fn sales_target_overrides_gas_target() {
        let pu = PhaseUsage::three_phase();
        let tc = ProductionTargetCalculator::new(ProductionCMode::Grat, pu, &[], 1500.0).unwrap();
        assert_eq!(tc.group_target(&prod_ctrl()), 1500.0);
        let tc = ProductionTargetCalculator::new(ProductionCMode::Grat, pu, &[], 0.0).unwrap();
        assert_eq!(tc.group_target(&prod_ctrl()), 3000.0);
        assert_eq!(tc.guide_target(), GuideRateTarget::Gas);
    }

    #[test]
    fn liquid_and_reservoir_projections() {
        let pu = PhaseUsage::three_phase();
        let rates = [10.0, 20.0, 300.0];
        let lrat = ProductionTargetCalculator::new(ProductionCMode::Lrat, pu, &[], 0.0).unwrap();
        assert_eq!(lrat.rate_from_rates(&rates), 30.0);
        let resv =
            ProductionTargetCalculator::new(ProductionCMode::Resv, pu, &[1.0, 2.0, 0.1], 0.0)
                .unwrap();
        assert!((resv.rate_from_rates(&rates) - 80.0).abs() < 1e-12);
        assert_eq!(resv.group_target(&prod_ctrl()), 400.0);
    }

    #[test]
    fn inactive_modes_are_rejected() {
        let pu = PhaseUsage::three_phase();
        for cmode in [ProductionCMode::None, ProductionCMode::Fld, ProductionCMode::Prbl] {
            let err = ProductionTargetCalculator::new(cmode, pu, &[], 0.0).unwrap_err();
            assert!(matches!(err, WgError::InvalidControlMode { .. }));
        }
        let err = InjectionTargetCalculator::new(
            InjectionCMode::Sale,
            pu,
            &[],
            "G",
            0.0,
            Phase::Water,
        )
        .unwrap_err();
        assert!(matches!(err, WgError::InvalidControlMode { .. }));
    }

    #[test]
    fn rein_and_sales_targets() {
        let pu = PhaseUsage::three_phase();
        let mut gs = GroupState::new(3);
        gs.update_injection_rein_rates("PROD", vec![50.0, 100.0, 8000.0])
            .unwrap();

        let rein =
            InjectionTargetCalculator::new(InjectionCMode::Rein, pu, &[], "INJ", 0.0, Phase::Gas)
                .unwrap();
        let t = rein
            .group_target(&inj_ctrl(InjectionCMode::Rein, Phase::Gas), &gs)
            .unwrap();
        assert_eq!(t, 4000.0);

        let sale =
            InjectionTargetCalculator::new(InjectionCMode::Sale, pu, &[], "PROD", 3000.0, Phase::Gas)
                .unwrap();
        let t = sale
            .group_target(&inj_ctrl(InjectionCMode::Sale, Phase::Gas), &gs)
            .unwrap();
        assert_eq!(t, 5000.0);
    }

    #[test]
    fn voidage_replacement_nets_other_phases() {
        let pu = PhaseUsage::three_phase();
        let mut gs = GroupState::new(3);
        gs.update_injection_vrep_rate("PROD", 1000.0);
        gs.update_injection_reservoir_rates("PROD", vec![0.0, 0.0, 300.0])
            .unwrap();
        let coeff = [1.0, 1.0, 0.5];

        let vrep = InjectionTargetCalculator::new(
            InjectionCMode::Vrep,
            pu,
            &coeff,
            "INJ",
            0.0,
            Phase::Water,
        )
        .unwrap();
        let t = vrep
            .group_target(&inj_ctrl(InjectionCMode::Vrep, Phase::Water), &gs)
            .unwrap();
        // 1000 * 1.2 - 300 of gas already injected
        assert!((t - 900.0).abs() < 1e-12);
        assert_eq!(vrep.guide_target(), GuideRateTarget::Wat);
    }

    #[test]
    fn reservoir_injection_divides_by_coefficient() {
        let pu = PhaseUsage::three_phase();
        let gs = GroupState::new(3);
        let resv = InjectionTargetCalculator::new(
            InjectionCMode::Resv,
            pu,
            &[1.0, 1.0, 0.5],
            "INJ",
            0.0,
            Phase::Gas,
        )
        .unwrap();
        let t = resv
            .group_target(&inj_ctrl(InjectionCMode::Resv, Phase::Gas), &gs)
            .unwrap();
        assert_eq!(t, 1800.0);
    }
}
