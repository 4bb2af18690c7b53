use std::process::ExitCode;

use gitshim::cli::{self, Cli};
use tracing_subscriber::EnvFilter;

fn init_tracing(debug: bool) {
    let default = if debug { "gitshim=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let args = Cli::parse_args();
    init_tracing(args.debug);

    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
