//! Case validation logic.

use crate::schema::{Case, GroupDef, NetworkDef, ValueDef, WellDef, WellKind};
use std::collections::HashSet;
use wg_network::NO_PRESSURE_LOSS_TABLE;
use wg_tree::FIELD;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn missing(id: &str, context: &str) -> ValidationError {
    ValidationError::MissingReference {
        id: id.to_string(),
        context: context.to_string(),
    }
}

pub fn validate_case(case: &Case) -> Result<(), ValidationError> {
    if case.phases.is_empty() {
        return Err(invalid("phases", "[]", "at least one phase must be active"));
    }
    let mut phases = HashSet::new();
    for phase in &case.phases {
        if !phases.insert(phase) {
            return Err(ValidationError::DuplicateId {
                id: phase.to_string(),
                context: "phases".to_string(),
            });
        }
    }
    let num_phases = case.phases.len();

    let mut group_names: HashSet<&str> = HashSet::from([FIELD]);
    for group in &case.groups {
        if group.name != FIELD && !group_names.insert(group.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: group.name.clone(),
                context: "groups".to_string(),
            });
        }
    }
    if case.groups.iter().filter(|g| g.name == FIELD).count() > 1 {
        return Err(ValidationError::DuplicateId {
            id: FIELD.to_string(),
            context: "groups".to_string(),
        });
    }
    for group in &case.groups {
        validate_group(group, &group_names, &phases)?;
    }

    let mut well_names = HashSet::new();
    for well in &case.wells {
        if group_names.contains(well.name.as_str()) || !well_names.insert(well.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: well.name.clone(),
                context: "wells".to_string(),
            });
        }
        validate_well(well, &group_names, &phases, num_phases)?;
    }

    let is_node = |name: &str| group_names.contains(name) || well_names.contains(name);
    for gr in &case.guide_rates.production {
        if !is_node(&gr.name) {
            return Err(missing(&gr.name, "production guide rate"));
        }
        check_non_negative(&format!("guide rate of {}", gr.name), gr.value)?;
    }
    for gr in &case.guide_rates.injection {
        if !is_node(&gr.name) {
            return Err(missing(&gr.name, "injection guide rate"));
        }
        check_non_negative(&format!("guide rate of {}", gr.name), gr.value)?;
    }

    for event in &case.events {
        if !group_names.contains(event.group.as_str()) {
            return Err(missing(&event.group, "event group"));
        }
    }
    for sale in &case.gconsale {
        if !group_names.contains(sale.group.as_str()) {
            return Err(missing(&sale.group, "gconsale group"));
        }
    }
    for sump in &case.gconsump {
        if !group_names.contains(sump.group.as_str()) {
            return Err(missing(&sump.group, "gconsump group"));
        }
    }

    if !case.resv_coeff.is_empty() {
        if case.resv_coeff.len() != num_phases {
            return Err(invalid(
                "resv_coeff",
                format!("{:?}", case.resv_coeff),
                "need one coefficient per active phase",
            ));
        }
        if case.resv_coeff.iter().any(|c| !c.is_finite() || *c <= 0.0) {
            return Err(invalid(
                "resv_coeff",
                format!("{:?}", case.resv_coeff),
                "coefficients must be positive",
            ));
        }
    }

    let mut table_ids = HashSet::new();
    for table in &case.vfp_tables {
        if table.id == NO_PRESSURE_LOSS_TABLE {
            return Err(invalid(
                "vfp_tables.id",
                table.id,
                "reserved for branches without pressure loss",
            ));
        }
        if !table_ids.insert(table.id) {
            return Err(ValidationError::DuplicateId {
                id: table.id.to_string(),
                context: "vfp_tables".to_string(),
            });
        }
    }

    if let Some(network) = &case.network {
        validate_network(network, &group_names, &table_ids)?;
    }

    Ok(())
}

fn check_non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(field, value, "must be finite and non-negative"));
    }
    Ok(())
}

fn check_value(field: &str, value: &ValueDef) -> Result<(), ValidationError> {
    match value {
        ValueDef::Number(v) if !v.is_finite() => Err(invalid(field, v, "must be finite")),
        ValueDef::Quantity(key) if key.is_empty() => {
            Err(invalid(field, "\"\"", "summary key must not be empty"))
        }
        _ => Ok(()),
    }
}

fn validate_group(
    group: &GroupDef,
    group_names: &HashSet<&str>,
    phases: &HashSet<&wg_core::Phase>,
) -> Result<(), ValidationError> {
    match (&group.parent, group.name == FIELD) {
        (Some(_), true) => {
            return Err(invalid("FIELD.parent", "set", "the root group has no parent"));
        }
        (Some(parent), false) if !group_names.contains(parent.as_str()) => {
            return Err(missing(parent, &format!("parent of group {}", group.name)));
        }
        _ => {}
    }
    if !group.efficiency.is_finite() || group.efficiency < 0.0 {
        return Err(invalid(
            format!("{}.efficiency", group.name),
            group.efficiency,
            "must be finite and non-negative",
        ));
    }

    if let Some(prod) = &group.production {
        for (what, value) in [
            ("oil_target", &prod.oil_target),
            ("water_target", &prod.water_target),
            ("gas_target", &prod.gas_target),
            ("liquid_target", &prod.liquid_target),
            ("resv_target", &prod.resv_target),
        ] {
            check_value(&format!("{}.production.{}", group.name, what), value)?;
        }
    }

    let mut seen = HashSet::new();
    for inj in &group.injection {
        if !phases.contains(&inj.phase) {
            return Err(invalid(
                format!("{}.injection.phase", group.name),
                inj.phase,
                "phase is not active",
            ));
        }
        if !seen.insert(inj.phase) {
            return Err(ValidationError::DuplicateId {
                id: inj.phase.to_string(),
                context: format!("injection controls of group {}", group.name),
            });
        }
        for (what, value) in [
            ("surface_max_rate", &inj.surface_max_rate),
            ("resv_max_rate", &inj.resv_max_rate),
            ("target_reinj_fraction", &inj.target_reinj_fraction),
            ("target_void_fraction", &inj.target_void_fraction),
        ] {
            check_value(&format!("{}.injection.{}", group.name, what), value)?;
        }
        for other in [&inj.reinj_group, &inj.voidage_group].into_iter().flatten() {
            if !group_names.contains(other.as_str()) {
                return Err(missing(other, &format!("injection control of group {}", group.name)));
            }
        }
    }
    Ok(())
}

fn validate_well(
    well: &WellDef,
    group_names: &HashSet<&str>,
    phases: &HashSet<&wg_core::Phase>,
    num_phases: usize,
) -> Result<(), ValidationError> {
    if !group_names.contains(well.group.as_str()) {
        return Err(missing(&well.group, &format!("group of well {}", well.name)));
    }
    if !well.efficiency.is_finite() || well.efficiency < 0.0 {
        return Err(invalid(
            format!("{}.efficiency", well.name),
            well.efficiency,
            "must be finite and non-negative",
        ));
    }

    match well.kind {
        WellKind::Producer => {
            if well.phase.is_some() || well.injector_cmode.is_some() {
                return Err(ValidationError::Unsupported {
                    feature: format!("{}: injection settings on a producer", well.name),
                    reason: "producers take producer_cmode only".to_string(),
                });
            }
        }
        WellKind::Injector => {
            let Some(phase) = well.phase else {
                return Err(invalid(
                    format!("{}.phase", well.name),
                    "none",
                    "injectors need an injected phase",
                ));
            };
            if !phases.contains(&phase) {
                return Err(invalid(
                    format!("{}.phase", well.name),
                    phase,
                    "phase is not active",
                ));
            }
            if well.producer_cmode.is_some() {
                return Err(ValidationError::Unsupported {
                    feature: format!("{}: producer_cmode on an injector", well.name),
                    reason: "injectors take injector_cmode only".to_string(),
                });
            }
        }
    }

    for (what, rates) in [("rates", &well.rates), ("reservoir_rates", &well.reservoir_rates)] {
        if !rates.is_empty() && rates.len() != num_phases {
            return Err(invalid(
                format!("{}.{}", well.name, what),
                format!("{:?}", rates),
                "need one rate per active phase",
            ));
        }
        if rates.iter().any(|r| !r.is_finite()) {
            return Err(invalid(
                format!("{}.{}", well.name, what),
                format!("{:?}", rates),
                "rates must be finite",
            ));
        }
    }
    check_non_negative(&format!("{}.alq", well.name), well.alq)?;
    Ok(())
}

fn validate_network(
    network: &NetworkDef,
    group_names: &HashSet<&str>,
    table_ids: &HashSet<u32>,
) -> Result<(), ValidationError> {
    let mut node_names = HashSet::new();
    for node in &network.nodes {
        if !node_names.insert(node.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: node.name.clone(),
                context: "network nodes".to_string(),
            });
        }
        if let Some(p) = node.terminal_pressure_bar {
            if !p.is_finite() || p <= 0.0 {
                return Err(invalid(
                    format!("{}.terminal_pressure_bar", node.name),
                    p,
                    "must be positive",
                ));
            }
        }
    }

    let mut has_downtree = HashSet::new();
    for branch in &network.branches {
        for node in [&branch.uptree, &branch.downtree] {
            if !node_names.contains(node.as_str()) {
                return Err(missing(node, "network branch"));
            }
        }
        if branch.vfp_table != NO_PRESSURE_LOSS_TABLE && !table_ids.contains(&branch.vfp_table) {
            return Err(missing(
                &branch.vfp_table.to_string(),
                &format!("branch {} -> {}", branch.uptree, branch.downtree),
            ));
        }
        has_downtree.insert(branch.uptree.as_str());
    }

    // Leaves draw their inflow from the group of the same name.
    for node in &network.nodes {
        if !has_downtree.contains(node.name.as_str()) && !group_names.contains(node.name.as_str()) {
            return Err(missing(&node.name, "group for network leaf"));
        }
    }
    Ok(())
}
