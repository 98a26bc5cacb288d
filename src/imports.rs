//! Import reconciliation.
//!
//! Merges import statements arriving with new code into a body that already
//! has imports. Statements are compared by canonical text; a statement whose
//! canonical form is already present is dropped. Admitted statements land
//! after the last existing import, in arrival order.

use std::collections::HashSet;

/// Cursor over a body's import section.
#[derive(Debug, Clone)]
pub struct ImportReconciler {
    seen: HashSet<String>,
    cursor: usize,
}

impl ImportReconciler {
    /// Scan a body given as one entry per statement: `Some(canonical)` for an
    /// import, `None` for anything else.
    ///
    /// `floor` is the insertion point used when the body has no imports at
    /// all (e.g. just past a module docstring).
    pub fn scan<I, S>(body: I, floor: usize) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut last_import = None;

        for (i, statement) in body.into_iter().enumerate() {
            if let Some(canonical) = statement {
                seen.insert(canonical.into());
                last_import = Some(i);
            }
        }

        Self {
            seen,
            cursor: last_import.map_or(floor, |i| i + 1),
        }
    }

    /// Decide where an incoming import goes.
    ///
    /// Returns the body position to insert at, or `None` when an identical
    /// import already exists. Each admission advances the cursor so the next
    /// import lands after this one.
    pub fn admit(&mut self, canonical: &str) -> Option<usize> {
        if !self.seen.insert(canonical.to_string()) {
            return None;
        }
        let position = self.cursor;
        self.cursor += 1;
        Some(position)
    }

    /// Position the next admitted import would take.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
