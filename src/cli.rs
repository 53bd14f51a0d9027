//! Command-line interface implementation for ironmaker.
//! Provides argument parsing using clap. Every flag is optional; without flags all
//! configuration is gathered interactively.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments structure for ironmaker.
#[derive(Parser, Debug)]
#[command(author, version, about = "ironmaker: generate an Express application", long_about = None)]
pub struct Args {
    /// Read answers from a JSON or YAML file instead of prompting
    #[arg(short, long, value_name = "FILE")]
    pub answers: Option<PathBuf>,

    /// Directory containing the template set
    #[arg(short, long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Replace an existing non-empty project directory without asking.
    /// Only used together with --answers.
    #[arg(short, long)]
    pub force: bool,

    /// Print every created file and enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With clap's default error handling for invalid arguments
pub fn get_args() -> Args {
    Args::parse()
}
