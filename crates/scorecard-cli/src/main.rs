//! scorecard CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "scorecard",
    version,
    about = "Per-student exam scorecards: subject scores, charts, and reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate charts and a report for every student
    Generate(commands::generate::GenerateArgs),

    /// Check student record files and insights for problems
    Validate {
        /// Directory of <student_id>.json record files
        #[arg(long)]
        records_dir: PathBuf,

        /// Flat JSON insights file
        #[arg(long)]
        insights: Option<PathBuf>,
    },

    /// Create a starter scorecard.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scorecard=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate(args) => commands::generate::execute(args).await,
        Commands::Validate {
            records_dir,
            insights,
        } => commands::validate::execute(records_dir, insights),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
