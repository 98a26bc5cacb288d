//! Name → node index over a parsed tree.
//!
//! Adapters walk their tree in pre-order and feed every named candidate to
//! [`ElementIndex::build`]. The first candidate for a name wins; later
//! same-named nodes stay in the tree but are not addressable by name.

use serde::Serialize;
use std::collections::HashMap;

/// Shape of an indexed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ElementKind {
    /// Function- or class-like construct with a nested body.
    Definable,
    /// Single assignment-like statement.
    Binding,
    /// One name introduced by an import statement.
    ImportAlias,
}

/// A named candidate and the handle it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<R> {
    pub name: String,
    pub kind: ElementKind,
    pub node: R,
}

impl<R> Entry<R> {
    pub fn new(name: impl Into<String>, kind: ElementKind, node: R) -> Self {
        Self {
            name: name.into(),
            kind,
            node,
        }
    }
}

/// Insertion-ordered mapping from element name to node handle.
#[derive(Debug, Clone)]
pub struct ElementIndex<R> {
    entries: Vec<Entry<R>>,
    by_name: HashMap<String, usize>,
}

impl<R> ElementIndex<R> {
    /// Build the index from candidates in traversal order.
    pub fn build<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = Entry<R>>,
    {
        let mut entries = Vec::new();
        let mut by_name = HashMap::new();

        for candidate in candidates {
            if by_name.contains_key(&candidate.name) {
                continue;
            }
            by_name.insert(candidate.name.clone(), entries.len());
            entries.push(candidate);
        }

        Self { entries, by_name }
    }

    /// Names in index order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Entry<R>> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R> Default for ElementIndex<R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}
