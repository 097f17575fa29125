use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use zircon::cli::{Invocation, DEFAULT_OUTPUT};
use zircon::{generate, Error, Result};

const STDOUT_NAME: &str = "<stdout>";

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(inv: &Invocation) -> Result<()> {
    // Nothing reaches the output until the whole scanner has been generated.
    let mut scanner = Vec::new();
    let summary = generate(&inv.spec, &inv.options(), &mut scanner)?;
    if inv.to_stdout {
        let mut out = io::stdout().lock();
        out.write_all(&scanner)
            .and_then(|()| out.flush())
            .map_err(|e| Error::io(STDOUT_NAME, e))?;
    } else {
        fs::write(DEFAULT_OUTPUT, &scanner).map_err(|e| Error::io(DEFAULT_OUTPUT, e))?;
    }
    info!(
        spec = %inv.spec.display(),
        rules = summary.rules,
        states = summary.minimized_states,
        "done"
    );
    Ok(())
}

fn main() -> ExitCode {
    let inv = Invocation::parse();
    init_tracing(inv.verbose);
    match run(&inv) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("zircon: {}", e);
            ExitCode::from(1)
        }
    }
}
