//! Radiance Application
//!
//! Command-line front end to the method registry: list the built-in methods,
//! print or save a resolved config, or read a single field.

mod app;
mod errors;

use app::{Command, LoggingConfig};
use clap::Parser;

/// Radiance - resolve NeRF training method configurations
#[derive(Parser, Debug)]
#[command(name = "radiance")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let args = Args::parse();

    app::init_logging(&LoggingConfig {
        level: args.log_level,
    });

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = app::run(args.command, &mut stdout) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
