//! CSOM Builder CLI
//!
//! Usage:
//!   csom-builder [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>  Envelope configuration (TOML format)
//!   -v, --verbose        Log ID allocation and render failures to stderr
//!   -h, --help           Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use csom_builder::{EnvelopeConfig, RequestDescription};

#[derive(Parser)]
#[command(name = "csom-builder")]
#[command(about = "Compile a TOML request description into a CSOM XML request")]
struct Cli {
    /// Request description (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Envelope configuration file (TOML format); overrides the description's [envelope]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    // Read input
    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let description = match RequestDescription::from_str(&source) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let built = match &cli.config {
        Some(path) => match EnvelopeConfig::from_file(path) {
            Ok(config) => description.build_with_config(config),
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => description.build(),
    };

    let mut builder = match built {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // The document is printed even when some templates failed
    let (document, error) = builder.compile().into_parts();
    println!("{}", document);
    if let Some(e) = error {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
