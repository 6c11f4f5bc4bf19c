use std::process::ExitCode;

use clap::Parser;
use outlier_engine::{EngineError, cli::Cli};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match outlier_engine::cli::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<EngineError>() {
                Some(e) if e.is_file_not_found() => eprintln!("Error: {e}"),
                _ => eprintln!("An unexpected error occurred: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
