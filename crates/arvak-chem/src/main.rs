//! Arvak chemistry CLI: load a Broombridge document and summarize it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use arvak_chem::{BroombridgeDocument, IndexScheme, InputState, StateType, TypedProblem};
use clap::{Parser, ValueEnum};
use console::style;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "arvak-chem")]
#[command(author, version, about = "Load Broombridge electronic-structure problems", long_about = None)]
struct Cli {
    /// Broombridge YAML document
    path: PathBuf,

    /// Spin-orbital numbering
    #[arg(
        long,
        value_enum,
        env = "ARVAK_CHEM_INDEX_CONVENTION",
        default_value_t = Convention::UpDown
    )]
    index_convention: Convention,

    /// Print the typed problems as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Convention {
    /// 2 * orbital + spin
    UpDown,
    /// orbital + n_orbitals * spin
    HalfUp,
}

impl From<Convention> for IndexScheme {
    fn from(c: Convention) -> Self {
        match c {
            Convention::UpDown => IndexScheme::UpDown,
            Convention::HalfUp => IndexScheme::HalfUp,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let document = BroombridgeDocument::from_path(&cli.path)
        .with_context(|| format!("failed to load {}", cli.path.display()))?;
    let problems = document
        .extract_all(cli.index_convention.into())
        .context("failed to build typed problems")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&problems)?);
        return Ok(());
    }

    println!(
        "{} {} (schema {})",
        style("Loaded").green().bold(),
        cli.path.display(),
        document.version()?
    );
    for (i, problem) in problems.iter().enumerate() {
        print_problem(i + 1, problem);
    }
    Ok(())
}

fn print_problem(number: usize, problem: &TypedProblem) {
    println!();
    println!("{}", style(format!("▶ Problem {}", number)).green().bold());
    println!("{}", style("─".repeat(40)).dim());
    print_result("Orbitals", problem.n_orbitals);
    print_result("Electrons", problem.n_electrons);
    print_result("Identity term", format!("{:.6}", problem.identity_term));
    print_result("One-body terms", problem.one_body_terms.len());
    print_result("Two-body terms", problem.two_body_terms.len());
    print_result("Index convention", format!("{:?}", problem.index_convention));

    for state in problem.initial_states.values() {
        print_state(state);
    }
}

fn print_state(state: &InputState) {
    println!(
        "  {} {}",
        style(&state.label).cyan().bold(),
        style(format!("[{}]", state.method)).dim()
    );
    match state.state_type {
        StateType::SparseMultiConfigurational | StateType::UnitaryCoupledCluster => {
            for (amplitude, term) in state.superposition().into_iter().flatten() {
                println!("    {:+.6}  {}", amplitude.re, operators(term));
            }
        }
        StateType::SingleConfigurational => {
            println!("    {}", style("single configuration, no superposition").dim());
        }
        StateType::Unrecognized => {
            println!(
                "    {} unrecognized method, no superposition",
                style("!").yellow().bold()
            );
        }
    }
}

fn operators(term: &arvak_chem::FermionTerm) -> String {
    if term.is_empty() {
        return "|vacuum>".to_string();
    }
    term.operators
        .iter()
        .map(|op| op.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{}:", label)).dim(), value);
}
