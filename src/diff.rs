//! Unified diff between the original unit and its current serialization.

use crate::config::DiffOptions;
use similar::{ChangeTag, TextDiff};

/// Render a unified diff, or the empty string when nothing changed.
///
/// No header is emitted for a no-op, so callers can test the result with
/// `is_empty()`.
pub fn unified_diff(original: &str, modified: &str, options: &DiffOptions) -> String {
    if original == modified {
        return String::new();
    }

    let diff = TextDiff::from_lines(original, modified);
    let mut unified = diff.unified_diff();
    unified
        .context_radius(options.context_lines)
        .header(&options.original_label, &options.modified_label);
    unified.to_string()
}

/// Count inserted and deleted lines.
pub fn line_changes(original: &str, modified: &str) -> (usize, usize) {
    let diff = TextDiff::from_lines(original, modified);
    diff.iter_all_changes()
        .fold((0, 0), |(ins, del), change| match change.tag() {
            ChangeTag::Insert => (ins + 1, del),
            ChangeTag::Delete => (ins, del + 1),
            ChangeTag::Equal => (ins, del),
        })
}
