use clap::Parser;
use colored::*;
use eyre::Result;
use tokio_util::sync::CancellationToken;

use aider_ralph::cli::{Cli, Commands};
use aider_ralph::runner::{LoopController, LoopOutcome, ProcessRunner};
use aider_ralph::{console, init};

/// Distinguished exit status for operator interrupt.
const EXIT_INTERRUPTED: i32 = 130;

fn setup_logging() {
    env_logger::Builder::from_default_env().init();
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();

    console::banner();

    if let Some(Commands::Init { name }) = &cli.command {
        init::run(name.clone())?;
        return Ok(());
    }

    let config = cli.to_run_config();
    if let Err(e) = config.validate() {
        console::error(&e.to_string());
        std::process::exit(1);
    }

    if config.max_iterations == 0 {
        console::warn("No --max-iterations set. Loop will run indefinitely!");
        console::warn("Press Ctrl+C to stop, or set -m for safety");
        println!();
    }

    console::show_config(&config);

    // The interrupt handler only signals the token; the controller observes it
    // before starting another iteration and main maps the outcome to an exit
    // status.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                println!();
                console::warn("Interrupted by user (Ctrl+C)");
                cancel.cancel();
            }
        });
    }

    let log_file = config.log_file.clone();
    let controller = LoopController::new(config, ProcessRunner, cancel);
    let summary = controller.run().await;

    if let Some(path) = &log_file {
        println!();
        println!("{}", format!("Log saved to: {}", path.display()).cyan());
    }

    log::info!(
        "run finished: {} iterations, outcome {:?}",
        summary.iterations,
        summary.outcome
    );

    match summary.outcome {
        LoopOutcome::Interrupted => std::process::exit(EXIT_INTERRUPTED),
        LoopOutcome::Completed | LoopOutcome::Exhausted => Ok(()),
    }
}
