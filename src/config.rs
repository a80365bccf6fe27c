//! Run configuration for the loop engine.
//!
//! The CLI builds a single validated `RunConfig` value object; the engine
//! consumes it read-only and never mutates it. Validation happens exactly once,
//! before the first iteration.

use std::path::{Path, PathBuf};

use crate::error::{RalphError, Result};

/// Default per-iteration timeout: 15 minutes.
pub const DEFAULT_TIMEOUT_SECS: u64 = 900;

/// Default delay between iterations.
pub const DEFAULT_DELAY_SECS: u64 = 2;

/// Default notes file, consumed as flat context by later iterations.
pub const DEFAULT_NOTES_FILE: &str = ".ralph/notes.md";

/// Where the per-iteration prompt template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    /// A literal prompt string supplied on the command line
    Literal(String),

    /// A template file, re-read every iteration (live-edit semantics)
    File(PathBuf),

    /// The built-in default template
    Default,
}

/// A structured completion marker: `<tag> value </tag>` in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpec {
    pub tag: String,
    pub value: String,
}

/// How completion is detected in a transcript.
///
/// The tag check is evaluated first and short-circuits; the legacy substring
/// is only consulted when no tag spec matches. With neither configured the
/// loop runs to the iteration cap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionSpec {
    /// Structured `<tag>value</tag>` marker
    pub tag: Option<TagSpec>,

    /// Legacy literal substring match anywhere in the transcript
    pub promise: Option<String>,
}

impl CompletionSpec {
    /// Whether any completion check is configured at all.
    pub fn is_configured(&self) -> bool {
        self.tag.is_some() || self.promise.is_some()
    }
}

/// Validated configuration for one supervised run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Maximum subprocess invocations before forced stop (0 = unlimited)
    pub max_iterations: u32,

    /// Wall-clock deadline per iteration in seconds (0 = no deadline)
    pub timeout_secs: u64,

    /// Delay between iterations in seconds
    pub delay_secs: u64,

    /// Report the would-be invocation without spawning anything
    pub dry_run: bool,

    /// Show prompt previews and the full agent command line
    pub verbose: bool,

    /// Completion marker configuration
    pub completion: CompletionSpec,

    /// Append-only notes file carried across iterations
    pub notes_file: PathBuf,

    /// Optional specs document folded into every prompt
    pub specs_file: Option<PathBuf>,

    /// Prompt template source
    pub prompt: PromptSource,

    /// Agent executable, resolved from PATH
    pub agent_bin: String,

    /// Pass-through arguments appended to the agent invocation unmodified
    pub agent_args: Vec<String>,

    /// Optional transcript log, appended to for the whole run
    pub log_file: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_iterations: 0,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            delay_secs: DEFAULT_DELAY_SECS,
            dry_run: false,
            verbose: false,
            completion: CompletionSpec::default(),
            notes_file: PathBuf::from(DEFAULT_NOTES_FILE),
            specs_file: None,
            prompt: PromptSource::Default,
            agent_bin: "aider".to_string(),
            agent_args: Vec::new(),
            log_file: None,
        }
    }
}

impl RunConfig {
    /// Validate the configuration before the loop starts.
    ///
    /// Failures here are fatal: the process reports once and exits without
    /// running a single iteration.
    pub fn validate(&self) -> Result<()> {
        if !executable_on_path(&self.agent_bin) {
            return Err(RalphError::Config(format!(
                "{} is not installed or not on PATH. Install with: pip install aider-chat",
                self.agent_bin
            )));
        }

        if let PromptSource::File(path) = &self.prompt
            && !path.is_file()
        {
            return Err(RalphError::Config(format!(
                "prompt file not found: {}",
                path.display()
            )));
        }

        if let Some(path) = &self.specs_file
            && !path.is_file()
        {
            return Err(RalphError::Config(format!(
                "specs file not found: {}",
                path.display()
            )));
        }

        Ok(())
    }
}

/// Check whether `bin` resolves to an executable file.
///
/// Names containing a path separator are checked directly; bare names are
/// probed against every PATH entry, mirroring `exec.LookPath` semantics.
fn executable_on_path(bin: &str) -> bool {
    if bin.contains(std::path::MAIN_SEPARATOR) {
        return Path::new(bin).is_file();
    }

    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };

    std::env::split_paths(&paths).any(|dir| dir.join(bin).is_file())
}
