//! planexec CLI: the main entry point.
//!
//! Commands:
//! - `onboard`: Write a default config file
//! - `run`: Plan, execute and replan until the objective is met
//! - `plan`: Print the initial plan without executing it

use clap::{Parser, Subcommand};
use planexec_agent::AnswerPolicy;

mod commands;

#[derive(Parser)]
#[command(
    name = "planexec",
    about = "planexec: plan-and-execute agent",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Run a full session for an objective
    Run {
        /// What the session should achieve
        #[arg(short, long)]
        objective: String,

        /// Which text to print at the end: `response` or `draft`
        #[arg(long)]
        answer: Option<AnswerPolicy>,

        /// Give up after this many execute/replan rounds (0 = unlimited)
        #[arg(long)]
        max_rounds: Option<u32>,
    },

    /// Print the initial plan for an objective
    Plan {
        #[arg(short, long)]
        objective: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the answer.
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Run {
            objective,
            answer,
            max_rounds,
        } => commands::run::run(objective, answer, max_rounds).await?,
        Commands::Plan { objective } => commands::plan::run(objective).await?,
    }

    Ok(())
}
