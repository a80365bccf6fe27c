//! Notes extraction and persistence across iterations.
//!
//! The agent reports free-form context between `<ralph_notes>` markers
//! (case-insensitive). Only the last block in a transcript is kept: later
//! self-reported notes supersede earlier ones within the same run. Entries
//! are appended to a markdown-like flat file that is never rewritten and is
//! folded into future prompts as whole-file text.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{RalphError, Result};

static NOTES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<ralph_notes>(.*?)</ralph_notes>").expect("notes pattern compiles")
});

/// One iteration's notes, ready to append.
#[derive(Debug, Clone)]
pub struct NotesEntry {
    pub iteration: u32,
    pub timestamp: String,
    pub body: String,
}

impl NotesEntry {
    pub fn new(iteration: u32, body: String) -> Self {
        Self {
            iteration,
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            body,
        }
    }
}

/// Extract the notes body from a transcript, if any.
///
/// Scans every non-overlapping block and keeps the last one; empty or
/// whitespace-only content counts as "no notes for this iteration".
pub fn extract_notes(transcript: &str) -> Option<String> {
    NOTES_RE
        .captures_iter(transcript)
        .last()
        .map(|cap| cap[1].trim().to_string())
        .filter(|body| !body.is_empty())
}

/// Append one entry to the notes file.
///
/// Creates the parent directory and the file on first use; never truncates.
/// Each entry is a blank line, an iteration heading, a blank line, then the
/// body with a guaranteed trailing newline.
pub fn append(entry: &NotesEntry, path: &Path) -> Result<()> {
    let wrap = |source| RalphError::NotesAppend {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(wrap)?;

    let mut block = format!(
        "\n## Iteration {} ({})\n\n{}",
        entry.iteration, entry.timestamp, entry.body
    );
    if !block.ends_with('\n') {
        block.push('\n');
    }

    file.write_all(block.as_bytes()).map_err(wrap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extract_single_block() {
        let transcript = "output\n<ralph_notes>\nkeep going on auth\n</ralph_notes>\nmore";
        assert_eq!(
            extract_notes(transcript).as_deref(),
            Some("keep going on auth")
        );
    }

    #[test]
    fn test_extract_last_block_wins() {
        let transcript = "\
<ralph_notes>first plan</ralph_notes>
some work happens
<ralph_notes>revised plan</ralph_notes>";
        assert_eq!(extract_notes(transcript).as_deref(), Some("revised plan"));
    }

    #[test]
    fn test_extract_case_insensitive_delimiters() {
        let transcript = "<RALPH_NOTES>shouting notes</RALPH_NOTES>";
        assert_eq!(extract_notes(transcript).as_deref(), Some("shouting notes"));
    }

    #[test]
    fn test_extract_spans_lines_non_greedy() {
        let transcript = "\
<ralph_notes>
line one
line two
</ralph_notes>
<ralph_notes>short</ralph_notes>";
        // Non-greedy: two separate blocks, not one giant match
        assert_eq!(extract_notes(transcript).as_deref(), Some("short"));
    }

    #[test]
    fn test_extract_whitespace_only_is_none() {
        assert_eq!(extract_notes("<ralph_notes>   \n\t </ralph_notes>"), None);
        assert_eq!(extract_notes("<ralph_notes></ralph_notes>"), None);
    }

    #[test]
    fn test_extract_no_block_is_none() {
        assert_eq!(extract_notes("just normal agent output"), None);
    }

    #[test]
    fn test_append_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".ralph").join("notes.md");

        let entry = NotesEntry::new(1, "first note".to_string());
        append(&entry, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("## Iteration 1 ("));
        assert!(content.contains("first note"));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_append_is_append_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");

        append(&NotesEntry::new(1, "note one".to_string()), &path).unwrap();
        append(&NotesEntry::new(2, "note two".to_string()), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("note one"));
        assert!(content.contains("note two"));
        let one = content.find("## Iteration 1").unwrap();
        let two = content.find("## Iteration 2").unwrap();
        assert!(two > one);
    }

    #[test]
    fn test_append_body_preserved_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        let body = "- tried X, failed\n- `cargo test` passes except auth::login";

        append(&NotesEntry::new(3, body.to_string()), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(body));
    }
}
