//! Language adapters.
//!
//! Every backend implements [`LanguageAdapter`]. Mutating operations report
//! success as a boolean; a refused or failed edit leaves the adapter exactly
//! as it was before the call.

pub mod external;
pub mod fallback;
pub mod native;

use crate::config::DiffOptions;
use crate::diff::unified_diff;
use crate::language::Language;
use serde::Serialize;
use std::fmt;

pub use external::ExternalTreeAdapter;
pub use fallback::LineFallbackAdapter;
pub use native::NativeTreeAdapter;

/// Body range addressed by a partial replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialTarget {
    /// 0-based index into the element's body statements.
    Statement(usize),
    /// 1-based inclusive line range; `end` defaults to `start`.
    Lines { start: usize, end: Option<usize> },
}

impl PartialTarget {
    /// Combine the optional caller inputs. The statement index wins when
    /// both are given; `None` when neither is.
    pub fn from_parts(
        line_start: Option<usize>,
        line_end: Option<usize>,
        statement_index: Option<usize>,
    ) -> Option<Self> {
        match (statement_index, line_start) {
            (Some(index), _) => Some(PartialTarget::Statement(index)),
            (None, Some(start)) => Some(PartialTarget::Lines {
                start,
                end: line_end,
            }),
            (None, None) => None,
        }
    }

    /// Inclusive line bounds for a `Lines` target.
    pub fn line_bounds(&self) -> Option<(usize, usize)> {
        match *self {
            PartialTarget::Lines { start, end } => Some((start, end.unwrap_or(start).max(start))),
            PartialTarget::Statement(_) => None,
        }
    }
}

impl fmt::Display for PartialTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialTarget::Statement(index) => write!(f, "statement {index}"),
            PartialTarget::Lines { start, end: None } => write!(f, "line {start}"),
            PartialTarget::Lines {
                start,
                end: Some(end),
            } => write!(f, "lines {start}-{end}"),
        }
    }
}

/// Read-only view of an element and its direct body statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementStructure {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub line_start: usize,
    pub line_end: usize,
    pub body_items: Vec<BodyItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodyItem {
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: String,
    pub line_start: usize,
    pub line_end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Index of the first statement overlapping `[start, end]` and of the last
/// statement in the run that starts at or before `end`.
///
/// `spans` are 1-based inclusive line ranges in body order.
pub(crate) fn overlap_run(spans: &[(usize, usize)], start: usize, end: usize) -> Option<(usize, usize)> {
    let first = spans.iter().position(|&(s, e)| s <= end && e >= start)?;
    let extra = spans[first + 1..]
        .iter()
        .take_while(|&&(s, _)| s <= end)
        .count();
    Some((first, first + extra))
}

/// Structural editing over one source unit.
pub trait LanguageAdapter {
    fn language(&self) -> Language;

    /// Indexed element names in traversal order.
    fn list_elements(&self) -> Vec<String>;

    /// Exact current text of an element.
    fn get_source(&self, name: &str) -> Option<String>;

    fn get_structure(&self, name: &str) -> Option<ElementStructure>;

    /// Verbatim text of the body statements overlapping the line range.
    fn get_body_snippet(&self, name: &str, line_start: usize, line_end: usize) -> Option<String>;

    fn replace_element(&mut self, name: &str, new_code: &str) -> bool;

    /// Insert new code next to `anchor` (after it unless `before`), never
    /// past the entry guard. Without an anchor the code goes before the
    /// entry guard, or at the end.
    fn add_element(&mut self, new_code: &str, anchor: Option<&str>, before: bool) -> bool;

    fn delete_element(&mut self, name: &str) -> bool;

    fn replace_partial(&mut self, name: &str, new_code: &str, target: PartialTarget) -> bool;

    /// Replace the whole unit. Committed only when the new text parses.
    fn replace_source(&mut self, new_source: &str) -> bool;

    /// Text at construction time.
    fn original_source(&self) -> &str;

    /// Serialization of the current state.
    fn modified_source(&self) -> String;

    fn diff(&self, options: &DiffOptions) -> String {
        unified_diff(self.original_source(), &self.modified_source(), options)
    }
}
