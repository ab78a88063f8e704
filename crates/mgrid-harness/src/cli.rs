use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mgrid::GridConfig;
use serde::Serialize;

use crate::error::Result;
use crate::replay::replay;
use crate::scenario::Scenario;

#[derive(Debug, Parser)]
#[command(
    name = "mgrid-harness",
    about = "Replay drag scenarios through the mgrid masonry engine",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a scenario file and print the resulting layout as JSON.
    Replay(ReplayArgs),

    /// Print the default grid configuration as JSON.
    Defaults {
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Scenario JSON file.
    pub scenario: PathBuf,

    /// Indent the output.
    #[arg(long)]
    pub pretty: bool,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}

pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Commands::Replay(args) => {
            let scenario = Scenario::load(&args.scenario)?;
            tracing::debug!(
                target: "mgrid.harness",
                path = %args.scenario.display(),
                steps = scenario.steps.len(),
                "replaying scenario"
            );
            let output = replay(&scenario)?;
            emit(out, &output, args.pretty)
        }
        Commands::Defaults { pretty } => emit(out, &GridConfig::default(), pretty),
    }
}

fn emit(out: &mut impl Write, value: &impl Serialize, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
