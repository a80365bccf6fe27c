//! aider-ralph - Ralph Wiggum AI loop technique for aider
//!
//! Drives the aider agent in a supervised retry loop: assemble a prompt from
//! layered sources, run the agent under a timeout while mirroring its output,
//! scan the transcript for completion and notes markers, and repeat until a
//! completion marker appears or the iteration cap is exhausted.

pub mod cli;
pub mod config;
pub mod console;
pub mod detect;
pub mod error;
pub mod init;
pub mod notes;
pub mod prompt;
pub mod runner;

pub use error::{RalphError, Result};
