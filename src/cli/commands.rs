//! CLI command definitions using clap.
//!
//! The flag set mirrors the classic ralph-loop workflow: an iteration cap as
//! the safety net, a completion marker, live-editable prompt/specs files, and
//! everything after `--` handed to aider untouched.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{CompletionSpec, PromptSource, RunConfig, TagSpec};
use crate::detect::DEFAULT_STATUS_TAG;

/// aider-ralph - Ralph Wiggum AI loop technique for aider
#[derive(Parser, Debug)]
#[command(name = "aider-ralph")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Prompt text for the agent (omit to use -f or the built-in template)
    #[arg(conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Stop after N iterations (0 = unlimited; a cap is strongly recommended)
    #[arg(short = 'm', long, default_value_t = 0, value_name = "N")]
    pub max_iterations: u32,

    /// Legacy completion phrase checked as a substring of the output
    #[arg(short = 'c', long, value_name = "TEXT")]
    pub completion_promise: Option<String>,

    /// Tag for the structured completion marker
    #[arg(long, default_value = DEFAULT_STATUS_TAG, requires = "completion_value", value_name = "TAG")]
    pub completion_tag: String,

    /// Value expected inside the completion tag, e.g. COMPLETED
    #[arg(long, value_name = "VALUE")]
    pub completion_value: Option<String>,

    /// Read the prompt from a file, re-read each iteration (live updates)
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub prompt_file: Option<PathBuf>,

    /// Specs document folded into every prompt, re-read each iteration
    #[arg(short = 's', long = "specs", value_name = "PATH")]
    pub specs_file: Option<PathBuf>,

    /// Notes file carried across iterations (append-only)
    #[arg(long = "notes", default_value = crate::config::DEFAULT_NOTES_FILE, value_name = "PATH")]
    pub notes_file: PathBuf,

    /// Delay between iterations in seconds
    #[arg(short = 'd', long, default_value_t = crate::config::DEFAULT_DELAY_SECS, value_name = "SECONDS")]
    pub delay: u64,

    /// Timeout per iteration in seconds, kills aider if it hangs (0 = none)
    #[arg(short = 't', long, default_value_t = crate::config::DEFAULT_TIMEOUT_SECS, value_name = "SECONDS")]
    pub timeout: u64,

    /// Log all mirrored output to a file
    #[arg(short = 'l', long = "log", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Show detailed progress information
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Show what would be executed without running aider
    #[arg(long)]
    pub dry_run: bool,

    /// Options after -- are passed directly to aider
    #[arg(last = true, value_name = "AIDER_OPTIONS")]
    pub agent_opts: Vec<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the project: create SPECS.md and the .ralph/ directory
    Init {
        /// Project name (defaults to the current directory name)
        name: Option<String>,
    },
}

impl Cli {
    /// Build the engine's validated configuration value object.
    pub fn to_run_config(&self) -> RunConfig {
        let prompt = if let Some(text) = &self.prompt {
            PromptSource::Literal(text.clone())
        } else if let Some(path) = &self.prompt_file {
            PromptSource::File(path.clone())
        } else {
            PromptSource::Default
        };

        let tag = self.completion_value.as_ref().map(|value| TagSpec {
            tag: self.completion_tag.clone(),
            value: value.clone(),
        });

        RunConfig {
            max_iterations: self.max_iterations,
            timeout_secs: self.timeout,
            delay_secs: self.delay,
            dry_run: self.dry_run,
            verbose: self.verbose,
            completion: CompletionSpec {
                tag,
                promise: self.completion_promise.clone(),
            },
            notes_file: self.notes_file.clone(),
            specs_file: self.specs_file.clone(),
            prompt,
            agent_bin: "aider".to_string(),
            agent_args: self.agent_opts.clone(),
            log_file: self.log_file.clone(),
        }
    }
}
