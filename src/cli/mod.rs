//! CLI module for aider-ralph - command-line interface.
//!
//! Provides the main entry point: loop options, the trailing `--` pass-through
//! to aider, and the `init` scaffolding subcommand.

pub mod commands;

pub use commands::{Cli, Commands};
