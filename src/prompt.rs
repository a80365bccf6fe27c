//! Prompt assembly - builds the per-iteration instruction text.
//!
//! One merge path for every prompt source: template (literal string, file, or
//! the built-in default), then the specs document wrapped in BEGIN/END
//! delimiters, then accumulated notes wrapped in their own delimiters. The
//! specs and notes files are re-read on every call so edits made while the
//! loop is running take effect on the next iteration.

use std::fs;

use crate::config::{PromptSource, RunConfig};
use crate::error::{RalphError, Result};

/// Built-in template used when no prompt or prompt file is configured.
pub const DEFAULT_TEMPLATE: &str = r#"You are one iteration of an autonomous coding loop. Work on the project
according to the specs below. Make focused progress: implement one requirement
at a time, run the tests, and fix failures before moving on.

When EVERY requirement is implemented and verified, output exactly:

<ralph_status>
COMPLETED
</ralph_status>

To carry context into your next iteration (decisions made, dead ends, what to
pick up next), output it between these markers:

<ralph_notes>
your notes here
</ralph_notes>"#;

const SPECS_BEGIN: &str = "----- BEGIN SPECS -----";
const SPECS_END: &str = "----- END SPECS -----";
const NOTES_BEGIN: &str = "----- BEGIN NOTES (from previous iterations) -----";
const NOTES_END: &str = "----- END NOTES -----";

/// Rendered between the specs delimiters when the file exists but is empty,
/// so the agent can tell "empty specs" from "no specs configured".
const EMPTY_SPECS_MARKER: &str = "(specs file is empty)";

/// Build the prompt for one iteration.
///
/// Fails when a configured prompt or specs file cannot be read; a missing
/// notes file is treated as empty notes, not an error.
pub fn assemble(config: &RunConfig) -> Result<String> {
    let template = match &config.prompt {
        PromptSource::Literal(text) => text.clone(),
        PromptSource::File(path) => {
            fs::read_to_string(path).map_err(|source| RalphError::PromptRead {
                path: path.clone(),
                source,
            })?
        }
        PromptSource::Default => DEFAULT_TEMPLATE.to_string(),
    };

    let mut prompt = template;

    if let Some(path) = &config.specs_file {
        let specs = fs::read_to_string(path).map_err(|source| RalphError::SpecsRead {
            path: path.clone(),
            source,
        })?;

        prompt.push_str("\n\n");
        prompt.push_str(SPECS_BEGIN);
        prompt.push('\n');
        if specs.trim().is_empty() {
            prompt.push_str(EMPTY_SPECS_MARKER);
        } else {
            prompt.push_str(specs.trim_end());
        }
        prompt.push('\n');
        prompt.push_str(SPECS_END);
    }

    let notes = fs::read_to_string(&config.notes_file).unwrap_or_default();
    if !notes.trim().is_empty() {
        prompt.push_str("\n\n");
        prompt.push_str(NOTES_BEGIN);
        prompt.push('\n');
        prompt.push_str(notes.trim_end());
        prompt.push('\n');
        prompt.push_str(NOTES_END);
    }

    Ok(prompt)
}
