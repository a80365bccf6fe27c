//! Completion detection over a captured transcript.
//!
//! Two textual protocols: a structured `<tag> value </tag>` marker with
//! arbitrary whitespace between the pieces, and a legacy literal substring.
//! The tag check runs first and short-circuits; the substring is consulted
//! only when no tag spec is configured or the tag spec does not match.
//! Detection is first-match: the loop stops as soon as the agent claims done.

use regex::Regex;

use crate::config::CompletionSpec;

/// Default tag for the structured completion marker.
pub const DEFAULT_STATUS_TAG: &str = "ralph_status";

/// Check a transcript against the configured completion spec.
///
/// With neither check configured this always returns false and the loop runs
/// to the iteration cap.
pub fn is_complete(transcript: &str, spec: &CompletionSpec) -> bool {
    if let Some(tag) = &spec.tag
        && tag_marker_present(transcript, &tag.tag, &tag.value)
    {
        return true;
    }

    if let Some(promise) = &spec.promise {
        return transcript.contains(promise.as_str());
    }

    false
}

/// Whitespace-tolerant, case-sensitive search for `<tag> value </tag>`.
///
/// Tag and value are literal text, not patterns; `\s*` between the pieces
/// covers inline and multi-line layouts.
fn tag_marker_present(transcript: &str, tag: &str, value: &str) -> bool {
    let pattern = format!(
        r"<{tag}>\s*{value}\s*</{tag}>",
        tag = regex::escape(tag),
        value = regex::escape(value),
    );

    // Escaped literals always compile; a failure just means no match.
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(transcript),
        Err(_) => false,
    }
}
