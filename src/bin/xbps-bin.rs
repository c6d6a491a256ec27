//! CLI entry point. Parses arguments, wires up logging, and dispatches into
//! the library crate; this is the only place in the crate that calls
//! `std::process::exit` (§9 Design Notes, "exit-from-library").

use tracing_subscriber::EnvFilter;

use xbps_rs::cli;

fn main() {
    let args = cli::parse();
    let config = cli::config(&args);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.verbosity().filter_directive()))
        .init();

    if let Err(err) = cli::run(&args) {
        eprintln!("xbps-bin: {err}");
        std::process::exit(err.exit_code());
    }
}
