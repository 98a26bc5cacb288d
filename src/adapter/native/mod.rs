//! Python adapter over an owned statement arena.
//!
//! Every edit runs on a clone of the arena. The clone is rendered, parsed
//! and lowered again; only a clean parse replaces the committed tree, so a
//! rejected edit never leaves partial state behind.

mod lower;
mod tree;

pub use tree::{Alias, ImportStmt, NodeId};

use self::lower::{lower, lower_parsed};
use self::tree::{Block, Content, Item, Node, Owner, Shape, SyntaxTree};
use super::{overlap_run, BodyItem, ElementStructure, LanguageAdapter, PartialTarget};
use crate::error::{report, EditFailure, ParseError};
use crate::imports::ImportReconciler;
use crate::index::{ElementIndex, ElementKind, Entry};
use crate::language::Language;
use crate::text::{clip_ranges, dedent, reindent, reindent_except};
use crate::ts::{literal_ranges, parse_checked, Grammar};
use std::ops::{Range, RangeInclusive};

pub struct NativeTreeAdapter {
    original: String,
    source: String,
    tree: SyntaxTree,
    index: ElementIndex<NodeId>,
}

impl NativeTreeAdapter {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let tree =
            lower(source).map_err(|e| ParseError::from_tree_sitter(Language::Python, e))?;
        let index = build_index(&tree);
        Ok(Self {
            original: source.to_string(),
            source: source.to_string(),
            tree,
            index,
        })
    }

    fn entry(&self, name: &str) -> Result<&Entry<NodeId>, EditFailure> {
        self.index
            .get(name)
            .ok_or_else(|| EditFailure::not_found(name))
    }

    fn commit(&mut self, work: SyntaxTree) -> Result<(), EditFailure> {
        let text = work.render();
        self.commit_text(text)
    }

    fn commit_text(&mut self, text: String) -> Result<(), EditFailure> {
        let tree = lower(&text).map_err(EditFailure::reparse)?;
        self.index = build_index(&tree);
        self.tree = tree;
        self.source = text;
        Ok(())
    }

    fn try_replace(&mut self, name: &str, new_code: &str) -> Result<(), EditFailure> {
        let id = self.entry(name)?.node;
        let snippet = Snippet::parse(new_code)?;
        if !snippet.has_code() {
            return Err(EditFailure::EmptyPatch);
        }

        let mut work = self.tree.clone();
        let (owner, pos) = work.locate(id).ok_or_else(|| EditFailure::not_found(name))?;
        let indent = work.block(owner).map_or(0, |b| b.indent);
        let grafts = snippet.grafts(&snippet.tree.module, 0, indent, |n| !is_import(n));

        splice_replace(&mut work, owner, pos..=pos, grafts);
        reconcile_imports(&mut work, snippet.imports());
        self.commit(work)
    }

    fn try_add(&mut self, new_code: &str, anchor: Option<&str>, before: bool) -> Result<(), EditFailure> {
        let snippet = Snippet::parse(new_code)?;
        if !snippet.has_code() {
            return Err(EditFailure::EmptyPatch);
        }

        let top: Vec<NodeId> = self.tree.top_level().map(|(id, _)| id).collect();
        let guard = self
            .tree
            .top_level()
            .position(|(_, node)| node.entry_guard);

        let pos = match anchor {
            Some(anchor) => {
                let anchor_not_found = || EditFailure::AnchorNotFound {
                    name: anchor.to_string(),
                };
                let id = self.index.get(anchor).ok_or_else(anchor_not_found)?.node;
                let at = top
                    .iter()
                    .position(|&t| t == id)
                    .ok_or_else(anchor_not_found)?;
                let proposed = if before { at } else { at + 1 };
                guard.map_or(proposed, |g| proposed.min(g))
            }
            None => guard.unwrap_or(top.len()),
        };

        let mut work = self.tree.clone();
        let grafts = snippet.grafts(&snippet.tree.module, 0, 0, |n| !is_import(n));
        splice_insert(&mut work, Owner::Module, pos, grafts);
        reconcile_imports(&mut work, snippet.imports());
        self.commit(work)
    }

    fn try_delete(&mut self, name: &str) -> Result<(), EditFailure> {
        let entry = self.entry(name)?;
        let (id, kind) = (entry.node, entry.kind);

        let mut work = self.tree.clone();
        let (owner, pos) = work.locate(id).ok_or_else(|| EditFailure::not_found(name))?;

        if kind == ElementKind::ImportAlias {
            if let Shape::Import(stmt) = &work.node(id).shape {
                let aliases: Vec<Alias> = stmt
                    .aliases
                    .iter()
                    .filter(|a| a.bound_name() != name)
                    .cloned()
                    .collect();
                if !aliases.is_empty() {
                    let reduced = ImportStmt {
                        aliases,
                        ..stmt.clone()
                    };
                    let node = work.node_mut(id);
                    node.content = Content::Leaf(reduced.canonical());
                    node.shape = Shape::Import(reduced);
                    return self.commit(work);
                }
            }
        }

        splice_remove(&mut work, owner, pos);
        self.commit(work)
    }

    fn try_replace_partial(
        &mut self,
        name: &str,
        new_code: &str,
        target: PartialTarget,
    ) -> Result<(), EditFailure> {
        let id = self.entry(name)?.node;
        let body = self
            .tree
            .node(id)
            .body()
            .ok_or_else(|| EditFailure::NoBody {
                name: name.to_string(),
            })?;

        let out_of_range = || EditFailure::TargetOutOfRange {
            name: name.to_string(),
            target: target.to_string(),
        };
        let range = match target {
            PartialTarget::Statement(index) if index < body.items.len() => index..=index,
            PartialTarget::Statement(_) => return Err(out_of_range()),
            PartialTarget::Lines { .. } => {
                let spans = self.body_spans(body);
                let (start, end) = target.line_bounds().ok_or_else(out_of_range)?;
                let (first, last) = overlap_run(&spans, start, end).ok_or_else(out_of_range)?;
                first..=last
            }
        };

        let snippet = Snippet::parse(new_code)?;
        let mut work = self.tree.clone();
        expand_inline(&mut work, id);
        let indent = work.block(Owner::Node(id)).map_or(0, |b| b.indent);

        let grafts = match snippet.definable_body(new_code) {
            Some(inner) => snippet.grafts(inner, inner.indent, indent, |_| true),
            None => snippet.grafts(&snippet.tree.module, 0, indent, |_| true),
        };
        if grafts.is_empty() {
            return Err(EditFailure::EmptyPatch);
        }

        splice_replace(&mut work, Owner::Node(id), range, grafts);
        self.commit(work)
    }

    fn body_spans(&self, body: &Block) -> Vec<(usize, usize)> {
        body.items
            .iter()
            .map(|item| self.tree.node(item.node).lines)
            .collect()
    }
}

impl LanguageAdapter for NativeTreeAdapter {
    fn language(&self) -> Language {
        Language::Python
    }

    fn list_elements(&self) -> Vec<String> {
        self.index.names()
    }

    fn get_source(&self, name: &str) -> Option<String> {
        let node = self.tree.node(self.index.get(name)?.node);
        Some(self.source[node.span.clone()].to_string())
    }

    fn get_structure(&self, name: &str) -> Option<ElementStructure> {
        let node = self.tree.node(self.index.get(name)?.node);
        let body_items = node
            .body()
            .map(|body| {
                body.items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        let child = self.tree.node(item.node);
                        BodyItem {
                            index,
                            kind: child.kind.to_string(),
                            line_start: child.lines.0,
                            line_end: child.lines.1,
                            tag: child.tag.clone(),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(ElementStructure {
            name: name.to_string(),
            kind: node.kind.to_string(),
            line_start: node.lines.0,
            line_end: node.lines.1,
            body_items,
        })
    }

    fn get_body_snippet(&self, name: &str, line_start: usize, line_end: usize) -> Option<String> {
        let body = self.tree.node(self.index.get(name)?.node).body()?;
        let (first, last) = overlap_run(&self.body_spans(body), line_start, line_end)?;
        let start = self.tree.node(body.items[first].node).span.start;
        let end = self.tree.node(body.items[last].node).span.end;
        Some(self.source[start..end].to_string())
    }

    fn replace_element(&mut self, name: &str, new_code: &str) -> bool {
        let outcome = self.try_replace(name, new_code);
        report("replace_element", outcome)
    }

    fn add_element(&mut self, new_code: &str, anchor: Option<&str>, before: bool) -> bool {
        let outcome = self.try_add(new_code, anchor, before);
        report("add_element", outcome)
    }

    fn delete_element(&mut self, name: &str) -> bool {
        let outcome = self.try_delete(name);
        report("delete_element", outcome)
    }

    fn replace_partial(&mut self, name: &str, new_code: &str, target: PartialTarget) -> bool {
        let outcome = self.try_replace_partial(name, new_code, target);
        report("replace_partial", outcome)
    }

    fn replace_source(&mut self, new_source: &str) -> bool {
        let outcome = self.commit_text(new_source.to_string());
        report("replace_source", outcome)
    }

    fn original_source(&self) -> &str {
        &self.original
    }

    fn modified_source(&self) -> String {
        self.source.clone()
    }
}

/// Module body plus class bodies, in source order.
fn build_index(tree: &SyntaxTree) -> ElementIndex<NodeId> {
    let mut candidates = Vec::new();
    collect_candidates(tree, &tree.module, &mut candidates);
    ElementIndex::build(candidates)
}

fn collect_candidates(tree: &SyntaxTree, block: &Block, out: &mut Vec<Entry<NodeId>>) {
    for item in &block.items {
        let node = tree.node(item.node);
        match &node.shape {
            Shape::Definable { name } => {
                out.push(Entry::new(name.as_str(), ElementKind::Definable, item.node));
                if node.kind == "ClassDef" {
                    if let Some(body) = node.body() {
                        collect_candidates(tree, body, out);
                    }
                }
            }
            Shape::Binding { targets } => out.extend(
                targets
                    .iter()
                    .map(|t| Entry::new(t.as_str(), ElementKind::Binding, item.node)),
            ),
            Shape::Import(stmt) => out.extend(
                stmt.aliases
                    .iter()
                    .map(|a| Entry::new(a.bound_name(), ElementKind::ImportAlias, item.node)),
            ),
            Shape::Other => {}
        }
    }
}

fn is_import(node: &Node) -> bool {
    matches!(node.shape, Shape::Import(_))
}

/// Replacement code, dedented and lowered on its own.
struct Snippet {
    source: String,
    tree: SyntaxTree,
    literals: Vec<Range<usize>>,
}

/// A statement to splice in, with the text that goes before it.
struct Graft {
    lead: String,
    node: Node,
}

impl Snippet {
    fn parse(code: &str) -> Result<Self, EditFailure> {
        let source = dedent(code);
        if source.is_empty() {
            return Err(EditFailure::EmptyPatch);
        }
        let parsed = parse_checked(Grammar::Python, &source).map_err(EditFailure::malformed)?;
        let literals = literal_ranges(parsed.root_node());
        let tree = lower_parsed(&source, &parsed);
        Ok(Self {
            source,
            tree,
            literals,
        })
    }

    fn has_code(&self) -> bool {
        self.tree.top_level().any(|(_, node)| !is_import(node))
    }

    fn imports(&self) -> Vec<(ImportStmt, String)> {
        self.tree
            .top_level()
            .filter_map(|(_, node)| match &node.shape {
                Shape::Import(stmt) => {
                    Some((stmt.clone(), self.source[node.span.clone()].to_string()))
                }
                _ => None,
            })
            .collect()
    }

    /// The body of the leading definition when the code starts with a
    /// definable header.
    fn definable_body(&self, code: &str) -> Option<&Block> {
        let trimmed = code.trim_start();
        let is_header = ["def ", "async def ", "class ", "@"]
            .iter()
            .any(|prefix| trimmed.starts_with(prefix));
        if !is_header {
            return None;
        }
        self.tree
            .top_level()
            .find_map(|(_, node)| node.is_definable().then(|| node.body()).flatten())
    }

    /// Selected statements of `block`, moved from column `from` to `to`.
    fn grafts(
        &self,
        block: &Block,
        from: usize,
        to: usize,
        select: impl Fn(&Node) -> bool,
    ) -> Vec<Graft> {
        let delta = to as isize - from as isize;
        let mut grafts: Vec<Graft> = Vec::new();
        for item in &block.items {
            let node = self.tree.node(item.node);
            if !select(node) {
                continue;
            }
            let gap = if grafts.is_empty() {
                item.gap.trim_start()
            } else {
                item.gap.as_str()
            };
            let literals = clip_ranges(&self.literals, node.span.clone());
            let text = reindent_except(&self.source[node.span.clone()], delta, &literals);
            grafts.push(Graft {
                lead: reindent(gap, delta),
                node: Node::grafted(text, node.shape.clone()),
            });
        }
        grafts
    }
}

/// Separator for a statement placed next to existing ones.
fn fabricated_gap(module_level: bool, definable: bool, indent: usize) -> String {
    let newlines = match (definable, module_level) {
        (true, true) => 3,
        (true, false) => 2,
        (false, _) => 1,
    };
    format!("{}{}", "\n".repeat(newlines), " ".repeat(indent))
}

fn push_grafts(work: &mut SyntaxTree, grafts: Vec<Graft>) -> Vec<Item> {
    grafts
        .into_iter()
        .map(|g| Item {
            gap: g.lead,
            node: work.push(g.node),
        })
        .collect()
}

fn splice_replace(work: &mut SyntaxTree, owner: Owner, range: RangeInclusive<usize>, grafts: Vec<Graft>) {
    let mut items = push_grafts(work, grafts);
    let Some(block) = work.block_mut(owner) else {
        return;
    };
    if let Some(first) = items.first_mut() {
        first.gap = format!("{}{}", block.items[*range.start()].gap, first.gap);
    }
    block.items.splice(range, items);
}

fn splice_insert(work: &mut SyntaxTree, owner: Owner, pos: usize, grafts: Vec<Graft>) {
    let module_level = owner == Owner::Module;
    let (Some(first_definable), Some(last_definable)) = (
        grafts.first().map(|g| g.node.is_definable()),
        grafts.last().map(|g| g.node.is_definable()),
    ) else {
        return;
    };
    let Some((indent, prev_definable, next_definable, len)) = work.block(owner).map(|b| {
        let definable = |i: usize| b.items.get(i).is_some_and(|it| work.node(it.node).is_definable());
        (b.indent, pos > 0 && definable(pos - 1), definable(pos), b.items.len())
    }) else {
        return;
    };

    let mut items = push_grafts(work, grafts);
    // An empty module holds all its text in the trailer.
    let leading = (module_level && len == 0).then(|| std::mem::replace(&mut work.trailer, "\n".to_string()));

    let Some(block) = work.block_mut(owner) else {
        return;
    };
    if let Some(mut lead) = leading {
        if !lead.is_empty() && !lead.ends_with('\n') {
            lead.push('\n');
        }
        items[0].gap = lead + &items[0].gap;
    } else if pos == 0 && len > 0 {
        let old = std::mem::take(&mut block.items[0].gap);
        items[0].gap = old + &items[0].gap;
        block.items[0].gap = fabricated_gap(module_level, last_definable || next_definable, indent);
    } else {
        let gap = fabricated_gap(module_level, first_definable || prev_definable, indent);
        items[0].gap = gap + &items[0].gap;
        // A `;` separator would glue the next statement to the last graft.
        if let Some(next) = block.items.get_mut(pos) {
            if !next.gap.contains('\n') {
                next.gap = fabricated_gap(module_level, last_definable || next_definable, indent);
            }
        }
    }
    block.items.splice(pos..pos, items);
}

fn splice_remove(work: &mut SyntaxTree, owner: Owner, pos: usize) {
    let Some(block) = work.block_mut(owner) else {
        return;
    };
    let removed = block.items.remove(pos);
    if let Some(next) = block.items.get_mut(pos) {
        // A `;` separator only makes sense after the removed statement.
        if !next.gap.contains('\n') {
            next.gap = removed.gap.clone();
        } else if pos == 0 {
            next.gap = format!("{}{}", removed.gap, next.gap.trim_start());
        }
    }
    if !block.items.is_empty() {
        return;
    }

    match owner {
        Owner::Module => {
            let rest = format!("{}{}", removed.gap, work.trailer);
            work.trailer = if rest.trim().is_empty() { String::new() } else { rest };
        }
        Owner::Node(_) => {
            let pass = work.push(Node::grafted("pass".to_string(), Shape::Other));
            if let Some(block) = work.block_mut(owner) {
                block.items.push(Item {
                    gap: if pos == 0 { removed.gap } else { String::new() },
                    node: pass,
                });
            }
        }
    }
}

/// Move an inline body (`def f(): pass`) onto its own indented lines.
fn expand_inline(work: &mut SyntaxTree, id: NodeId) {
    if let Content::Compound { header, body, .. } = &mut work.node_mut(id).content {
        let inline = header
            .rsplit('\n')
            .next()
            .is_some_and(|last| !last.trim().is_empty());
        if inline {
            *header = header.trim_end().to_string();
            if let Some(first) = body.items.first_mut() {
                first.gap = format!("\n{}", " ".repeat(body.indent));
            }
        }
    }
}

/// Merge incoming imports into the module body.
fn reconcile_imports(work: &mut SyntaxTree, imports: Vec<(ImportStmt, String)>) {
    if imports.is_empty() {
        return;
    }
    let floor = usize::from(work.top_level().next().is_some_and(|(_, n)| n.docstring));
    let existing = work.top_level().map(|(_, node)| match &node.shape {
        Shape::Import(stmt) => Some(stmt.canonical()),
        _ => None,
    });
    let mut reconciler = ImportReconciler::scan(existing, floor);

    for (stmt, text) in imports {
        if let Some(pos) = reconciler.admit(&stmt.canonical()) {
            let graft = Graft {
                lead: String::new(),
                node: Node::grafted(text, Shape::Import(stmt)),
            };
            splice_insert(work, Owner::Module, pos, vec![graft]);
        }
    }
}
