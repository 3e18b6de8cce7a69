//! wg-project: case file format, validation and compilation.

pub mod compile;
pub mod run;
pub mod schema;
pub mod validate;

pub use compile::{CompiledCase, compile_case};
pub use run::{GroupReport, StepReport, WellReport, run_step};
pub use schema::*;
pub use validate::{ValidationError, validate_case};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Tree error: {0}")]
    Tree(#[from] wg_tree::TreeError),

    #[error("Network error: {0}")]
    Network(#[from] wg_network::NetworkError),

    #[error("Control error: {0}")]
    Control(#[from] wg_core::WgError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_yaml(content: &str) -> ProjectResult<Case> {
    let case: Case = serde_yaml::from_str(content)?;
    validate_case(&case)?;
    Ok(case)
}

pub fn parse_json(content: &str) -> ProjectResult<Case> {
    let case: Case = serde_json::from_str(content)?;
    validate_case(&case)?;
    Ok(case)
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<Case> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml(&content)
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<Case> {
    let content = std::fs::read_to_string(path)?;
    parse_json(&content)
}

/// Load a case as YAML, or as JSON when the extension is `.json`.
pub fn load_case(path: &std::path::Path) -> ProjectResult<Case> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}

pub fn save_yaml(path: &std::path::Path, case: &Case) -> ProjectResult<()> {
    validate_case(case)?;
    let content = serde_yaml::to_string(case)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn save_json(path: &std::path::Path, case: &Case) -> ProjectResult<()> {
    validate_case(case)?;
    let content = serde_json::to_string_pretty(case)?;
    std::fs::write(path, content)?;
    Ok(())
}
