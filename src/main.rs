//! Credit approval - Main Entry Point
//!
//! Runs the synthetic credit-approval workflow from the command line.

use clap::Parser;
use credit_approval::cli::{cmd_generate, cmd_info, cmd_run, generate_path, Cli, Commands, RunArgs};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_approval=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run(args)) => {
            cmd_run(&args)?;
        }
        Some(Commands::Generate { rows, seed, output, output_dir }) => {
            cmd_generate(rows, seed, &generate_path(output, output_dir.as_deref()))?;
        }
        Some(Commands::Info { data, target }) => {
            cmd_info(&data, &target)?;
        }
        None => {
            // No subcommand: run with defaults
            cmd_run(&RunArgs::default())?;
        }
    }

    Ok(())
}
