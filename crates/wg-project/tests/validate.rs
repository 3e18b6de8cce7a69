use wg_project::{ProjectError, ValidationError, parse_yaml};

fn validation_error(yaml: &str) -> ValidationError {
    match parse_yaml(yaml) {
        Err(ProjectError::Validation(e)) => e,
        other => panic!("expected a validation error, got {:?}", other.map(|c| c.name)),
    }
}

#[test]
fn minimal_case_is_valid() {
    let case = parse_yaml("name: empty\n").unwrap();
    assert_eq!(case.phases.len(), 3);
    assert!(case.groups.is_empty());
}

#[test]
fn rejects_duplicate_names() {
    let err = validation_error(
        r#"
name: dup
groups:
  - { name: G }
wells:
  - { name: G, group: G, kind: producer }
"#,
    );
    assert!(matches!(err, ValidationError::DuplicateId { .. }));
}

#[test]
fn rejects_missing_parent() {
    let err = validation_error(
        r#"
name: orphan
groups:
  - { name: G, parent: NOWHERE }
"#,
    );
    assert!(matches!(err, ValidationError::MissingReference { .. }));
}

#[test]
fn injector_needs_a_phase() {
    let err = validation_error(
        r#"
name: inj
wells:
  - { name: I1, group: FIELD, kind: injector }
"#,
    );
    assert!(matches!(err, ValidationError::InvalidValue { .. }));
}

#[test]
fn rate_vectors_match_active_phases() {
    let err = validation_error(
        r#"
name: rates
phases: [oil, water]
wells:
  - { name: P1, group: FIELD, kind: producer, rates: [0, -1, 0] }
"#,
    );
    assert!(matches!(err, ValidationError::InvalidValue { .. }));
}

#[test]
fn network_leaves_must_be_groups() {
    let err = validation_error(
        r#"
name: net
network:
  nodes:
    - { name: SEP, terminal_pressure_bar: 30 }
    - { name: NOT_A_GROUP }
  branches:
    - { uptree: SEP, downtree: NOT_A_GROUP, vfp_table: 9999 }
"#,
    );
    assert!(matches!(err, ValidationError::MissingReference { .. }));
}

#[test]
fn branches_need_defined_tables() {
    let err = validation_error(
        r#"
name: net
groups:
  - { name: G }
network:
  nodes:
    - { name: SEP, terminal_pressure_bar: 30 }
    - { name: G }
  branches:
    - { uptree: SEP, downtree: G, vfp_table: 4 }
"#,
    );
    assert!(matches!(err, ValidationError::MissingReference { .. }));
}

#[test]
fn reserved_table_id_is_rejected() {
    let err = validation_error(
        r#"
name: tables
vfp_tables:
  - { id: 9999, base: 1.0 }
"#,
    );
    assert!(matches!(err, ValidationError::InvalidValue { .. }));
}

#[test]
fn unparsable_mode_is_a_yaml_error() {
    let res = parse_yaml(
        r#"
name: bad
groups:
  - name: G
    production: { cmode: FAST }
"#,
    );
    assert!(matches!(res, Err(ProjectError::Yaml(_))));
}
