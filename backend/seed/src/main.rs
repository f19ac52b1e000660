use std::process::ExitCode;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use seed::{
    SeedOptions, SeedReport,
    generate::{DEFAULT_SEED, Params},
    rng::parse_seed,
    seed_demo,
};
use store::{StateDir, allow_init_from_env};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Seed the pilot state directory with a synthetic cohort")]
struct Args {
    /// Cohort id stamped on every node and suggestion
    #[arg(long)]
    cohort: String,

    /// Number of nodes
    #[arg(long, allow_negative_numbers = true)]
    n: i64,

    /// Max suggestions initiated per node
    #[arg(long, allow_negative_numbers = true)]
    k: i64,

    #[arg(long, default_value_t = DEFAULT_SEED, value_parser = parse_seed, allow_negative_numbers = true)]
    seed: i64,

    /// Overwrite existing state files
    #[arg(long)]
    force: bool,
}

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();

    match run(args) {
        Ok(report) => {
            println!(
                "Seed complete. Nodes: {}. Suggestions: {}.",
                report.nodes, report.suggestions
            );
            println!("Wrote {}", report.nodes_file.display());
            println!("Wrote {}", report.suggestions_file.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<SeedReport> {
    ensure!(!args.cohort.trim().is_empty(), "--cohort is required");

    let options = SeedOptions {
        cohort: args.cohort,
        n: args.n,
        k: args.k,
        seed: args.seed,
        force: args.force,
    };
    Params::new(&options.cohort, options.n, options.k, options.seed)?;

    let state = StateDir::from_env()?;
    state
        .ensure(allow_init_from_env())
        .context("State directory unavailable")?;

    Ok(seed_demo(&state, &options)?)
}
