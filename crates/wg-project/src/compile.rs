//! Compile a validated case into the runtime objects of one control step.

use wg_controls::GuideRateTable;
use wg_core::{Phase, PhaseUsage, WgResult, bar};
use wg_network::{LinearVfpTable, LinearVfpTables, Network, NetworkBuilder, vfp_table_from_id};
use wg_state::{GroupState, WellState};
use wg_tree::{
    FIELD, GConSale, GConSump, GroupEvent, InjectionSpec, ProductionSpec, ScheduleStep,
    SummaryState, TreeBuilder, Uda, WellRole,
};

use crate::ProjectResult;
use crate::schema::{Case, EventKind, GroupDef, NetworkDef, ValueDef, WellDef, WellKind};

/// Everything one control step needs, built from a case file.
#[derive(Debug, Clone)]
pub struct CompiledCase {
    pub name: String,
    pub pu: PhaseUsage,
    pub step: ScheduleStep,
    pub summary: SummaryState,
    pub well_state: WellState,
    pub group_state: GroupState,
    pub guide_rates: GuideRateTable,
    pub resv_coeff: Vec<f64>,
    pub network: Network,
    pub vfp: LinearVfpTables,
}

fn uda(value: &ValueDef) -> Uda {
    match value {
        ValueDef::Number(v) => Uda::Value(*v),
        ValueDef::Quantity(key) => Uda::Quantity(key.clone()),
    }
}

/// Compile a case. The case should have passed [`crate::validate_case`].
pub fn compile_case(case: &Case) -> ProjectResult<CompiledCase> {
    let pu = PhaseUsage::new(&case.phases);

    let mut summary = SummaryState::new();
    for (key, value) in &case.summary {
        summary.set(key.as_str(), *value);
    }

    let step = compile_step(case)?;
    let well_state = compile_wells(&case.wells, pu)?;

    let mut guide_rates = GuideRateTable::new();
    for gr in &case.guide_rates.production {
        guide_rates.set(gr.name.as_str(), gr.value, gr.target);
    }
    for gr in &case.guide_rates.injection {
        guide_rates.set_injection(gr.name.as_str(), gr.phase, gr.value);
    }

    let network = match &case.network {
        Some(def) => compile_network(def)?,
        None => Network::default(),
    };
    let mut vfp = LinearVfpTables::new();
    for t in &case.vfp_tables {
        vfp.insert(
            t.id,
            LinearVfpTable {
                base: t.base,
                water: t.water,
                oil: t.oil,
                gas: t.gas,
                alq: t.alq,
            },
        );
    }

    tracing::debug!(
        case = case.name.as_str(),
        groups = step.tree.groups().len(),
        wells = step.tree.wells().len(),
        network_nodes = network.nodes().len(),
        "case compiled"
    );

    Ok(CompiledCase {
        name: case.name.clone(),
        pu,
        step,
        summary,
        well_state,
        group_state: GroupState::new(pu.num_phases()),
        guide_rates,
        resv_coeff: case.resv_coeff.clone(),
        network,
        vfp,
    })
}

fn compile_step(case: &Case) -> ProjectResult<ScheduleStep> {
    let mut builder = TreeBuilder::new();
    // Parents may be listed after their children.
    for group in case.groups.iter().filter(|g| g.name != FIELD) {
        builder.add_group(group.name.as_str(), group.parent.as_deref().unwrap_or(FIELD));
    }
    for group in &case.groups {
        apply_group(&mut builder, group);
    }
    for well in &case.wells {
        let role = match (well.kind, well.phase) {
            (WellKind::Injector, Some(phase)) => WellRole::Injector(phase),
            _ => WellRole::Producer,
        };
        let id = builder.add_well(well.name.as_str(), well.group.as_str(), role);
        builder.set_well_efficiency(id, well.efficiency);
        builder.set_well_status(id, well.status);
    }

    let mut step = ScheduleStep::new(builder.build()?);
    for event in &case.events {
        let event_kind = match event.event {
            EventKind::ProductionUpdate => GroupEvent::ProductionUpdate,
            EventKind::InjectionUpdate => GroupEvent::InjectionUpdate,
        };
        step.events.add(event.group.as_str(), event_kind);
    }
    for sale in &case.gconsale {
        step.gconsale.insert(
            sale.group.clone(),
            GConSale {
                sales_target: uda(&sale.sales_target),
            },
        );
    }
    for sump in &case.gconsump {
        step.gconsump.insert(
            sump.group.clone(),
            GConSump {
                consumption_rate: uda(&sump.consumption_rate),
                import_rate: uda(&sump.import_rate),
            },
        );
    }
    Ok(step)
}

fn apply_group(builder: &mut TreeBuilder, group: &GroupDef) {
    let Some(id) = builder.group_id(&group.name) else {
        return;
    };
    builder.set_group_efficiency(id, group.efficiency);
    if let Some(prod) = &group.production {
        let mut spec = ProductionSpec::new(prod.cmode);
        spec.oil_target = uda(&prod.oil_target);
        spec.water_target = uda(&prod.water_target);
        spec.gas_target = uda(&prod.gas_target);
        spec.liquid_target = uda(&prod.liquid_target);
        spec.resv_target = uda(&prod.resv_target);
        spec.available_for_group_control = prod.available_for_group_control;
        builder.set_production(id, spec);
    }
    for inj in &group.injection {
        let mut spec = InjectionSpec::new(inj.phase, inj.cmode);
        spec.surface_max_rate = uda(&inj.surface_max_rate);
        spec.resv_max_rate = uda(&inj.resv_max_rate);
        spec.target_reinj_fraction = uda(&inj.target_reinj_fraction);
        spec.target_void_fraction = uda(&inj.target_void_fraction);
        spec.reinj_group = inj.reinj_group.clone();
        spec.voidage_group = inj.voidage_group.clone();
        spec.guide_rate_def = inj.guide_rate_def;
        spec.guide_rate = inj.guide_rate;
        spec.available_for_group_control = inj.available_for_group_control;
        builder.add_injection(id, spec);
    }
}

fn compile_wells(wells: &[WellDef], pu: PhaseUsage) -> WgResult<WellState> {
    let mut state = WellState::new(pu);
    for well in wells {
        let name = well.name.as_str();
        state.add_well(name, well.owned);
        if !well.rates.is_empty() {
            state.set_well_rates(name, &well.rates)?;
        }
        if !well.reservoir_rates.is_empty() {
            state.set_reservoir_rates(name, &well.reservoir_rates)?;
        }
        state.set_solvent_rate(name, well.solvent_rate)?;
        state.set_alq(name, well.alq)?;
        if let Some(cmode) = well.producer_cmode {
            state.set_production_cmode(name, cmode)?;
        }
        if let Some(cmode) = well.injector_cmode {
            state.set_injection_cmode(name, cmode)?;
        }
    }
    Ok(state)
}

fn compile_network(def: &NetworkDef) -> ProjectResult<Network> {
    let mut builder = NetworkBuilder::new();
    for node in &def.nodes {
        builder.add_node(node.name.as_str(), node.terminal_pressure_bar.map(bar));
        builder.set_add_gas_lift_gas(&node.name, node.add_gas_lift_gas);
    }
    for branch in &def.branches {
        builder.add_branch(
            branch.uptree.as_str(),
            branch.downtree.as_str(),
            vfp_table_from_id(branch.vfp_table),
        );
    }
    Ok(builder.build()?)
}

/// Active phases of a compiled case, in rate-vector order.
pub fn active_phases(pu: &PhaseUsage) -> Vec<Phase> {
    pu.active_phases().collect()
}
