//! mesh-placer - import a mesh into Unreal Engine and place it in a running game
//!
//! The import half renders a script for the editor's Python console; the
//! placement half talks to the game through the UnrealCV plugin.

mod actions;
mod cli;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let job = cli::Cli::parse().into_job().unwrap_or_else(|e| e.exit());

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(actions::run(job));
    // A pending stdin read sits on a blocking thread; don't wait for it.
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Action failed: {:?}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
