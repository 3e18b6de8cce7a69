use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use wg_core::DeferredLogger;
use wg_project::{ProjectResult, StepReport, compile_case, load_case, run_step};

#[derive(Parser)]
#[command(name = "wg-cli")]
#[command(about = "Wellgroup CLI - group control targets and network pressures", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate case file syntax and structure
    Validate {
        /// Path to the case file (YAML, or JSON with a .json extension)
        case_path: PathBuf,
    },
    /// Run one control step and print group targets and network pressures
    Step {
        /// Path to the case file (YAML, or JSON with a .json extension)
        case_path: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Yaml,
    Json,
}

fn main() -> ProjectResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Step { case_path, format } => cmd_step(&case_path, format),
    }
}

fn cmd_validate(case_path: &Path) -> ProjectResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = load_case(case_path)?;
    compile_case(&case)?;
    println!("✓ Case is valid");
    println!("  {} groups, {} wells", case.groups.len(), case.wells.len());
    Ok(())
}

fn cmd_step(case_path: &Path, format: Format) -> ProjectResult<()> {
    let case = load_case(case_path)?;
    let mut compiled = compile_case(&case)?;
    tracing::debug!(case = compiled.name.as_str(), "running control step");
    let mut log = DeferredLogger::new();
    let result = run_step(&mut compiled, &mut log);
    log.flush();
    let report = result?;

    match format {
        Format::Text => print_report(&report),
        Format::Yaml => print!("{}", serde_yaml::to_string(&report)?),
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn print_report(report: &StepReport) {
    let phases: Vec<String> = report.phases.iter().map(|p| p.to_string()).collect();
    println!("Case: {}", report.case);
    println!("  Phases: {}", phases.join(", "));

    println!("Groups:");
    for g in &report.groups {
        let injection: Vec<String> = g
            .injection_cmodes
            .iter()
            .map(|(phase, cmode)| format!("{} {}", phase, cmode))
            .collect();
        println!(
            "  {:<12} prod {:<5} inj [{}]  rates {:?}  reduction {:?}",
            g.name,
            g.production_cmode,
            injection.join(", "),
            g.production_rates,
            g.production_reduction
        );
    }

    println!("Wells:");
    for w in &report.wells {
        let target = w
            .group_target
            .map(|t| format!("{:.3}", t))
            .unwrap_or_else(|| "-".to_string());
        let flag = if w.violated { "  VIOLATED" } else { "" };
        println!(
            "  {:<12} group {:<12} target {:>12}  scale {:.4}{}",
            w.name, w.group, target, w.scale, flag
        );
    }

    if report.network_pressures_bar.is_empty() {
        println!("Network: inactive");
    } else {
        println!("Network pressures (bar):");
        for (node, p) in &report.network_pressures_bar {
            println!("  {:<12} {:.3}", node, p);
        }
    }
}
