//! amnesis binary entry point

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = amnesis::cli::Cli::parse();
    if let Err(e) = amnesis::cli::execute(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
