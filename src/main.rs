use clap::Parser;
use sortify::cli::{self, Cli};
use std::process;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli::run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
