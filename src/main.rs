//! installcheck CLI entry point.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use installcheck::cli::{CheckCommand, CheckOptions, Cli};
use installcheck::report::should_use_colors;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("installcheck=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("installcheck=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("installcheck starting with args: {:?}", cli);

    let invocation_dir = std::env::current_dir().unwrap_or_default();
    let project_root = cli
        .project
        .clone()
        .unwrap_or_else(|| invocation_dir.clone());

    let options = CheckOptions::from_cli(&cli, should_use_colors());
    let command = CheckCommand::new(&project_root, &invocation_dir, options);

    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr().lock();
    match command.execute(&mut stdout, &mut stderr) {
        Ok(result) => ExitCode::from(result.status_byte()),
        Err(e) => {
            let _ = writeln!(stderr, "Error: {}", e);
            ExitCode::from(1)
        }
    }
}
