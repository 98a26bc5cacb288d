//! JavaScript adapter over immutable tree-sitter trees.
//!
//! The tree cannot be mutated, so every edit splices the current text,
//! re-parses it and rebuilds the index. When the new text fails to parse
//! the previous text is put back.

use super::{overlap_run, BodyItem, ElementStructure, LanguageAdapter, PartialTarget};
use crate::error::{report, EditFailure, ParseError};
use crate::guard::is_entry_guard;
use crate::index::{ElementIndex, ElementKind, Entry};
use crate::language::Language;
use crate::text::{clip_ranges, dedent, line_indent, reindent_except, remove_lines};
use crate::ts::{literal_ranges, parse_checked, Grammar};
use std::ops::Range;
use tree_sitter::{Node, Tree};

/// Where an indexed JavaScript element lives in the current text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsHandle {
    /// Kind of the node `node` points at.
    kind: &'static str,
    /// Byte range of the element node, used to find it again.
    node: Range<usize>,
    /// Text replaced and returned for the element.
    unit: Range<usize>,
    /// Enclosing top-level statement or class member.
    statement: Range<usize>,
    /// Declarator sharing its declaration with siblings.
    shared: bool,
}

pub struct ExternalTreeAdapter {
    original: String,
    source: String,
    tree: Tree,
    index: ElementIndex<JsHandle>,
}

const DEFINITIONS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "class_declaration",
];

const MEMBERS: &[&str] = &["method_definition", "field_definition"];

fn statements(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

fn lines(node: Node<'_>) -> (usize, usize) {
    (node.start_position().row + 1, node.end_position().row + 1)
}

impl ExternalTreeAdapter {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let tree = parse_checked(Grammar::JavaScript, source)
            .map_err(|e| ParseError::from_tree_sitter(Language::JavaScript, e))?;
        let index = build_index(&tree, source);
        Ok(Self {
            original: source.to_string(),
            source: source.to_string(),
            tree,
            index,
        })
    }

    /// Swap in `text`, keeping the old text until the re-parse succeeds.
    fn commit(&mut self, text: String) -> Result<(), EditFailure> {
        let previous = std::mem::replace(&mut self.source, text);
        match parse_checked(Grammar::JavaScript, &self.source) {
            Ok(tree) => {
                self.index = build_index(&tree, &self.source);
                self.tree = tree;
                Ok(())
            }
            Err(e) => {
                self.source = previous;
                Err(EditFailure::reparse(e))
            }
        }
    }

    fn splice(&mut self, range: Range<usize>, replacement: &str) -> Result<(), EditFailure> {
        let mut text = String::with_capacity(self.source.len() + replacement.len());
        text.push_str(&self.source[..range.start]);
        text.push_str(replacement);
        text.push_str(&self.source[range.end..]);
        self.commit(text)
    }

    fn handle(&self, name: &str) -> Result<(&JsHandle, ElementKind), EditFailure> {
        self.index
            .get(name)
            .map(|e| (&e.node, e.kind))
            .ok_or_else(|| EditFailure::not_found(name))
    }

    /// Find the live node for a handle.
    fn resolve(&self, handle: &JsHandle) -> Option<Node<'_>> {
        let mut node = self
            .tree
            .root_node()
            .descendant_for_byte_range(handle.node.start, handle.node.end)?;
        loop {
            if node.byte_range() == handle.node && node.kind() == handle.kind {
                return Some(node);
            }
            node = node.parent()?;
        }
    }

    /// Body statements of a definable element.
    fn body_of(&self, handle: &JsHandle) -> Option<Vec<Node<'_>>> {
        let node = self.resolve(handle)?;
        let body = match node.kind() {
            "method_definition" => node.child_by_field_name("body"),
            kind if DEFINITIONS.contains(&kind) => node.child_by_field_name("body"),
            _ => None,
        }?;
        Some(statements(body))
    }

    fn top_level(&self) -> Vec<Node<'_>> {
        statements(self.tree.root_node())
    }

    fn try_replace(&mut self, name: &str, new_code: &str) -> Result<(), EditFailure> {
        let (handle, _) = self.handle(name)?;
        let handle = handle.clone();
        let code = dedent(new_code);
        let code = code.trim_end();
        if code.is_empty() {
            return Err(EditFailure::EmptyPatch);
        }

        let literals = if MEMBERS.contains(&handle.kind) {
            validate_members(code)?
        } else {
            let tree = parse_checked(Grammar::JavaScript, code).map_err(EditFailure::malformed)?;
            let has_code = statements(tree.root_node())
                .iter()
                .any(|s| s.kind() != "import_statement");
            if !has_code {
                return Err(EditFailure::EmptyPatch);
            }
            literal_ranges(tree.root_node())
        };

        if handle.shared {
            let declarators = single_declaration_declarators(code)?;
            return self.splice(handle.unit.clone(), &declarators);
        }

        let range = if code.starts_with("export ") && handle.statement.start < handle.unit.start {
            handle.statement.clone()
        } else {
            handle.unit.clone()
        };
        let column = line_indent(&self.source, range.start);
        let replacement = reindent_except(code, column as isize, &literals);
        self.splice(range, &replacement)
    }

    fn try_add(&mut self, new_code: &str, anchor: Option<&str>, before: bool) -> Result<(), EditFailure> {
        let code = dedent(new_code);
        let code = code.trim_end();
        let tree = parse_checked(Grammar::JavaScript, code).map_err(EditFailure::malformed)?;
        let has_code = statements(tree.root_node())
            .iter()
            .any(|s| s.kind() != "import_statement");
        if !has_code {
            return Err(EditFailure::EmptyPatch);
        }

        let top = self.top_level();
        let guard = top
            .iter()
            .position(|s| is_entry_guard(Grammar::JavaScript, *s, &self.source));

        let pos = match anchor {
            Some(anchor) => {
                let anchor_not_found = || EditFailure::AnchorNotFound {
                    name: anchor.to_string(),
                };
                let handle = &self.index.get(anchor).ok_or_else(anchor_not_found)?.node;
                let at = top
                    .iter()
                    .position(|s| s.byte_range() == handle.statement)
                    .ok_or_else(anchor_not_found)?;
                let proposed = if before { at } else { at + 1 };
                guard.map_or(proposed, |g| proposed.min(g))
            }
            None => guard.unwrap_or(top.len()),
        };

        let (at, insertion) = match top.get(pos) {
            Some(next) => (leading_comments_start(*next), format!("{code}\n\n")),
            None if self.source.trim().is_empty() => (0, format!("{code}\n")),
            None => {
                let end = self.source.trim_end().len();
                (end, format!("\n\n{code}"))
            }
        };
        self.splice(at..at, &insertion)
    }

    fn try_delete(&mut self, name: &str) -> Result<(), EditFailure> {
        let (handle, kind) = self.handle(name)?;
        let handle = handle.clone();

        if kind == ElementKind::ImportAlias {
            let node = self.resolve(&handle).ok_or_else(|| EditFailure::not_found(name))?;
            if let Some(rebuilt) = rebuild_import(node, &self.source, name) {
                return self.splice(handle.statement.clone(), &rebuilt);
            }
        } else if handle.shared {
            let node = self.resolve(&handle).ok_or_else(|| EditFailure::not_found(name))?;
            let range = match (node.next_named_sibling(), node.prev_named_sibling()) {
                (Some(next), _) if next.kind() == "variable_declarator" => {
                    node.start_byte()..next.start_byte()
                }
                (_, Some(prev)) if prev.kind() == "variable_declarator" => {
                    prev.end_byte()..node.end_byte()
                }
                _ => handle.unit.clone(),
            };
            return self.splice(range, "");
        }

        let text = remove_lines(&self.source, handle.statement.clone());
        self.commit(text)
    }

    fn try_replace_partial(
        &mut self,
        name: &str,
        new_code: &str,
        target: PartialTarget,
    ) -> Result<(), EditFailure> {
        let (handle, _) = self.handle(name)?;
        let handle = handle.clone();
        let no_body = || EditFailure::NoBody {
            name: name.to_string(),
        };
        let body = self.body_of(&handle).ok_or_else(no_body)?;
        if body.is_empty() {
            return Err(no_body());
        }

        let out_of_range = || EditFailure::TargetOutOfRange {
            name: name.to_string(),
            target: target.to_string(),
        };
        let (first, last) = match target {
            PartialTarget::Statement(index) if index < body.len() => (index, index),
            PartialTarget::Statement(_) => return Err(out_of_range()),
            PartialTarget::Lines { .. } => {
                let spans: Vec<(usize, usize)> = body.iter().map(|n| lines(*n)).collect();
                let (start, end) = target.line_bounds().ok_or_else(out_of_range)?;
                overlap_run(&spans, start, end).ok_or_else(out_of_range)?
            }
        };
        let in_class = handle.kind == "class_declaration";
        let mut range = body[first].start_byte()..body[last].end_byte();
        if in_class && self.source[range.end..].starts_with(';') {
            range.end += 1;
        }
        let column = line_indent(&self.source, range.start);

        let replacement = match definable_body(new_code)? {
            Some(inner) => reindent_except(
                &inner.text,
                column as isize - inner.column as isize,
                &inner.literals,
            ),
            None => {
                let code = dedent(new_code);
                let code = code.trim_end();
                if code.is_empty() {
                    return Err(EditFailure::EmptyPatch);
                }
                let literals = if in_class {
                    validate_members(code)?
                } else {
                    let tree = parse_checked(Grammar::JavaScript, code).map_err(EditFailure::malformed)?;
                    literal_ranges(tree.root_node())
                };
                reindent_except(code, column as isize, &literals)
            }
        };
        self.splice(range, &replacement)
    }
}

impl LanguageAdapter for ExternalTreeAdapter {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn list_elements(&self) -> Vec<String> {
        self.index.names()
    }

    fn get_source(&self, name: &str) -> Option<String> {
        let handle = &self.index.get(name)?.node;
        Some(self.source[handle.unit.clone()].to_string())
    }

    fn get_structure(&self, name: &str) -> Option<ElementStructure> {
        let handle = &self.index.get(name)?.node;
        let node = self.resolve(handle)?;
        let (line_start, line_end) = lines(node);
        let body_items = self
            .body_of(handle)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let (line_start, line_end) = lines(item);
                BodyItem {
                    index,
                    kind: item.kind().to_string(),
                    line_start,
                    line_end,
                    tag: tag_for(item, &self.source),
                }
            })
            .collect();

        Some(ElementStructure {
            name: name.to_string(),
            kind: node.kind().to_string(),
            line_start,
            line_end,
            body_items,
        })
    }

    fn get_body_snippet(&self, name: &str, line_start: usize, line_end: usize) -> Option<String> {
        let body = self.body_of(&self.index.get(name)?.node)?;
        let spans: Vec<(usize, usize)> = body.iter().map(|n| lines(*n)).collect();
        let (first, last) = overlap_run(&spans, line_start, line_end)?;
        Some(self.source[body[first].start_byte()..body[last].end_byte()].to_string())
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
        let outcome = self.commit(new_source.to_string());
        report("replace_source", outcome)
    }

    fn original_source(&self) -> &str {
        &self.original
    }

    fn modified_source(&self) -> String {
        self.source.clone()
    }
}

fn build_index(tree: &Tree, source: &str) -> ElementIndex<JsHandle> {
    let mut candidates = Vec::new();
    for statement in statements(tree.root_node()) {
        collect(statement, statement.byte_range(), source, &mut candidates);
    }
    ElementIndex::build(candidates)
}

fn collect(node: Node<'_>, statement: Range<usize>, source: &str, out: &mut Vec<Entry<JsHandle>>) {
    let whole = |n: Node<'_>, statement: Range<usize>| JsHandle {
        kind: n.kind(),
        node: n.byte_range(),
        unit: n.byte_range(),
        statement,
        shared: false,
    };

    match node.kind() {
        "export_statement" => {
            if let Some(declaration) = node.child_by_field_name("declaration") {
                collect(declaration, statement, source, out);
            }
        }
        kind if DEFINITIONS.contains(&kind) => {
            let Some(name) = node.child_by_field_name("name") else {
                return;
            };
            out.push(Entry::new(
                text(name, source),
                ElementKind::Definable,
                whole(node, statement),
            ));
            if kind == "class_declaration" {
                if let Some(body) = node.child_by_field_name("body") {
                    for member in statements(body) {
                        collect_member(member, source, out);
                    }
                }
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            let declarators: Vec<Node<'_>> = statements(node)
                .into_iter()
                .filter(|d| d.kind() == "variable_declarator")
                .collect();
            let shared = declarators.len() > 1;
            for declarator in declarators {
                let Some(name) = declarator.child_by_field_name("name") else {
                    continue;
                };
                if name.kind() != "identifier" {
                    continue;
                }
                let unit = if shared {
                    declarator.byte_range()
                } else {
                    node.byte_range()
                };
                out.push(Entry::new(
                    text(name, source),
                    ElementKind::Binding,
                    JsHandle {
                        kind: declarator.kind(),
                        node: declarator.byte_range(),
                        unit,
                        statement: statement.clone(),
                        shared,
                    },
                ));
            }
        }
        "import_statement" => {
            for name in import_bindings(node, source) {
                out.push(Entry::new(
                    name,
                    ElementKind::ImportAlias,
                    whole(node, statement.clone()),
                ));
            }
        }
        _ => {}
    }
}

fn collect_member(member: Node<'_>, source: &str, out: &mut Vec<Entry<JsHandle>>) {
    let (field, kind) = match member.kind() {
        "method_definition" => ("name", ElementKind::Definable),
        "field_definition" => ("property", ElementKind::Binding),
        _ => return,
    };
    let Some(name) = member.child_by_field_name(field) else {
        return;
    };

    let mut unit = member.byte_range();
    if kind == ElementKind::Binding && source[unit.end..].starts_with(';') {
        unit.end += 1;
    }
    out.push(Entry::new(
        text(name, source),
        kind,
        JsHandle {
            kind: member.kind(),
            node: member.byte_range(),
            unit: unit.clone(),
            statement: unit,
            shared: false,
        },
    ));
}

/// Local names bound by an import statement, in source order.
fn import_bindings(statement: Node<'_>, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = statement.walk();
    let Some(clause) = statement
        .named_children(&mut cursor)
        .find(|c| c.kind() == "import_clause")
    else {
        return names;
    };

    for part in statements(clause) {
        match part.kind() {
            "identifier" => names.push(text(part, source).to_string()),
            "namespace_import" => {
                if let Some(alias) = statements(part).into_iter().find(|n| n.kind() == "identifier") {
                    names.push(text(alias, source).to_string());
                }
            }
            "named_imports" => {
                for specifier in statements(part) {
                    if let Some(bound) = specifier
                        .child_by_field_name("alias")
                        .or_else(|| specifier.child_by_field_name("name"))
                    {
                        names.push(text(bound, source).to_string());
                    }
                }
            }
            _ => {}
        }
    }
    names
}

/// The import statement without `drop`, or `None` when nothing would be
/// left to import.
fn rebuild_import(statement: Node<'_>, source: &str, drop: &str) -> Option<String> {
    let module = statement.child_by_field_name("source")?;
    let mut cursor = statement.walk();
    let clause = statement
        .named_children(&mut cursor)
        .find(|c| c.kind() == "import_clause")?;

    let mut parts = Vec::new();
    let mut named = Vec::new();
    for part in statements(clause) {
        match part.kind() {
            "identifier" if text(part, source) != drop => parts.push(text(part, source).to_string()),
            "namespace_import" => {
                let alias = statements(part).into_iter().find(|n| n.kind() == "identifier")?;
                if text(alias, source) != drop {
                    parts.push(format!("* as {}", text(alias, source)));
                }
            }
            "named_imports" => {
                for specifier in statements(part) {
                    let name = specifier.child_by_field_name("name")?;
                    let alias = specifier.child_by_field_name("alias");
                    let bound = alias.unwrap_or(name);
                    if text(bound, source) == drop {
                        continue;
                    }
                    named.push(match alias {
                        Some(alias) => format!("{} as {}", text(name, source), text(alias, source)),
                        None => text(name, source).to_string(),
                    });
                }
            }
            _ => {}
        }
    }

    if !named.is_empty() {
        parts.push(format!("{{ {} }}", named.join(", ")));
    }
    if parts.is_empty() {
        return None;
    }
    let semicolon = if text(statement, source).ends_with(';') { ";" } else { "" };
    Some(format!(
        "import {} from {}{}",
        parts.join(", "),
        text(module, source),
        semicolon
    ))
}

/// Start of `node`, moved up over comments on the lines directly above it.
fn leading_comments_start(node: Node<'_>) -> usize {
    let mut start = node.start_byte();
    let mut row = node.start_position().row;
    let mut current = node;
    while let Some(prev) = current.prev_sibling() {
        if prev.kind() != "comment" || prev.end_position().row + 1 < row {
            break;
        }
        start = prev.start_byte();
        row = prev.start_position().row;
        current = prev;
    }
    start
}

/// Class members are not valid at the top level; parse them inside a
/// throwaway class. Yields the multi-line literals of `code`.
fn validate_members(code: &str) -> Result<Vec<Range<usize>>, EditFailure> {
    const OPEN: &str = "class Members {\n";
    let wrapped = format!("{OPEN}{code}\n}}\n");
    let tree = parse_checked(Grammar::JavaScript, &wrapped).map_err(EditFailure::malformed)?;
    let window = OPEN.len()..OPEN.len() + code.len();
    Ok(clip_ranges(&literal_ranges(tree.root_node()), window))
}

/// Declarator list of code that must be exactly one declaration.
fn single_declaration_declarators(code: &str) -> Result<String, EditFailure> {
    let tree = parse_checked(Grammar::JavaScript, code).map_err(EditFailure::malformed)?;
    let top = statements(tree.root_node());
    let [declaration] = top.as_slice() else {
        return Err(EditFailure::malformed("expected a single declaration"));
    };
    if !matches!(declaration.kind(), "lexical_declaration" | "variable_declaration") {
        return Err(EditFailure::malformed("expected a single declaration"));
    }
    let declarators: Vec<Node<'_>> = statements(*declaration)
        .into_iter()
        .filter(|d| d.kind() == "variable_declarator")
        .collect();
    match (declarators.first(), declarators.last()) {
        (Some(first), Some(last)) => Ok(code[first.start_byte()..last.end_byte()].to_string()),
        _ => Err(EditFailure::EmptyPatch),
    }
}

/// Inner body text and its column when `code` is a whole definition.
/// Body statements lifted out of a replacement definition.
struct InnerBody {
    text: String,
    /// Indentation of the first body statement.
    column: usize,
    /// Multi-line literals, relative to `text`.
    literals: Vec<Range<usize>>,
}

fn definable_body(code: &str) -> Result<Option<InnerBody>, EditFailure> {
    let code = dedent(code);
    let trimmed = code.trim_start();
    let is_header = ["function", "async function", "class "]
        .iter()
        .any(|prefix| trimmed.starts_with(prefix));
    if !is_header {
        return Ok(None);
    }

    let tree = parse_checked(Grammar::JavaScript, &code).map_err(EditFailure::malformed)?;
    let definition = statements(tree.root_node())
        .into_iter()
        .find(|n| DEFINITIONS.contains(&n.kind()))
        .ok_or(EditFailure::EmptyPatch)?;
    let body = definition
        .child_by_field_name("body")
        .map(statements)
        .unwrap_or_default();
    match (body.first(), body.last()) {
        (Some(first), Some(last)) => {
            let window = first.start_byte()..last.end_byte();
            Ok(Some(InnerBody {
                text: code[window.clone()].to_string(),
                column: line_indent(&code, first.start_byte()),
                literals: clip_ranges(&literal_ranges(tree.root_node()), window),
            }))
        }
        _ => Err(EditFailure::EmptyPatch),
    }
}

fn tag_for(node: Node<'_>, source: &str) -> Option<String> {
    let field_text = |n: Node<'_>, field: &str| n.child_by_field_name(field).map(|f| text(f, source).to_string());
    match node.kind() {
        "lexical_declaration" | "variable_declaration" => statements(node)
            .into_iter()
            .find(|d| d.kind() == "variable_declarator")
            .and_then(|d| field_text(d, "name"))
            .map(|name| format!("assigns={name}")),
        "field_definition" => field_text(node, "property").map(|name| format!("assigns={name}")),
        "return_statement" => Some("returns=true".to_string()),
        "if_statement" | "for_statement" | "for_in_statement" | "while_statement"
        | "do_statement" | "try_statement" | "switch_statement" => Some("hasBody=true".to_string()),
        kind if DEFINITIONS.contains(&kind) || kind == "method_definition" => {
            field_text(node, "name").map(|name| format!("defines={name}"))
        }
        _ => None,
    }
}
