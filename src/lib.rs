//! ironmaker is an interactive scaffolder for Express applications.
//! It asks a few questions, then materializes a project directory by copying static
//! template files and rendering parameterized templates.

/// Command-line interface module for the ironmaker application
pub mod cli;

/// Loading answers from JSON or YAML files
pub mod config;

/// Common constants
pub mod constants;

/// Template data maps and their merge rules
pub mod data;

/// Error types and handling for the ironmaker application
pub mod error;

/// Formatters applied to rendered code
pub mod formatter;

/// Decides which files a set of options produces and runs the generation
pub mod generator;

pub mod logger;

/// The generated package manifest
pub mod manifest;

/// Typed generation options
pub mod options;

/// Deferred copy/render/write operations and their execution
pub mod processor;

/// Progress reporting for created files
pub mod progress;

/// User input and interaction handling
pub mod prompt;

/// The interactive question flow
pub mod questions;

/// Template loading and rendering functionality
pub mod renderer;

/// File system helpers
pub mod utils;
