//! Lowering a Python tree-sitter CST into the statement arena.

use super::tree::{Alias, Block, Content, ImportStmt, Item, Node, NodeId, Shape, SyntaxTree};
use crate::guard::is_entry_guard;
use crate::ts::{parse_checked, Grammar, TreeSitterError};
use tree_sitter::{Node as TsNode, Tree};

/// Parse `source` and lower it. Fails on any syntax error.
pub fn lower(source: &str) -> Result<SyntaxTree, TreeSitterError> {
    let parsed = parse_checked(Grammar::Python, source)?;
    Ok(lower_parsed(source, &parsed))
}

/// Lower an already checked parse of `source`.
pub fn lower_parsed(source: &str, parsed: &Tree) -> SyntaxTree {
    let mut lowering = Lowering {
        source,
        tree: SyntaxTree::default(),
    };

    let statements = statements(parsed.root_node());
    let (items, end) = lowering.items(&statements, 0);
    lowering.tree.module = Block { indent: 0, items };
    lowering.tree.trailer = source[end..].to_string();
    lowering.tree
}

fn statements(node: TsNode<'_>) -> Vec<TsNode<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

struct Lowering<'s> {
    source: &'s str,
    tree: SyntaxTree,
}

impl<'s> Lowering<'s> {
    fn text(&self, node: TsNode<'_>) -> &'s str {
        &self.source[node.byte_range()]
    }

    fn field_text(&self, node: TsNode<'_>, field: &str) -> Option<String> {
        node.child_by_field_name(field).map(|n| self.text(n).to_string())
    }

    fn items(&mut self, statements: &[TsNode<'_>], mut prev: usize) -> (Vec<Item>, usize) {
        let mut items = Vec::with_capacity(statements.len());
        for statement in statements {
            let gap = self.source[prev..statement.start_byte()].to_string();
            let node = self.statement(*statement);
            items.push(Item { gap, node });
            prev = statement.end_byte();
        }
        (items, prev)
    }

    fn statement(&mut self, ts: TsNode<'_>) -> NodeId {
        let definition = match ts.kind() {
            "decorated_definition" => ts.child_by_field_name("definition"),
            "function_definition" | "class_definition" => Some(ts),
            _ => None,
        };

        let (kind, shape) = match definition {
            Some(def) => self.classify_definition(def),
            None => self.classify(ts),
        };
        let tag = tag_for(kind, &shape);
        let docstring = kind == "Expr"
            && statements(ts)
                .first()
                .is_some_and(|n| matches!(n.kind(), "string" | "concatenated_string"));

        let content = match definition
            .and_then(|def| def.child_by_field_name("body"))
            .map(statements)
        {
            Some(body) if !body.is_empty() => self.compound(ts, &body),
            _ => Content::Leaf(self.text(ts).to_string()),
        };

        let start = ts.start_position();
        let end = ts.end_position();
        self.tree.push(Node {
            kind,
            shape,
            lines: (start.row + 1, end.row + 1),
            span: ts.byte_range(),
            column: start.column,
            tag,
            entry_guard: is_entry_guard(Grammar::Python, ts, self.source),
            docstring,
            content,
        })
    }

    fn compound(&mut self, ts: TsNode<'_>, body: &[TsNode<'_>]) -> Content {
        let first = body[0];
        let header = self.source[ts.start_byte()..first.start_byte()].to_string();
        let inline = header
            .rsplit('\n')
            .next()
            .is_some_and(|last| !last.trim().is_empty());
        let indent = if inline {
            ts.start_position().column + 4
        } else {
            first.start_position().column
        };

        let (items, end) = self.items(body, first.start_byte());
        Content::Compound {
            header,
            body: Block { indent, items },
            trailer: self.source[end..ts.end_byte()].to_string(),
        }
    }

    fn classify_definition(&self, def: TsNode<'_>) -> (&'static str, Shape) {
        let name = self.field_text(def, "name").unwrap_or_default();
        let kind = match def.kind() {
            "class_definition" => "ClassDef",
            _ if self.text(def).starts_with("async") => "AsyncFunctionDef",
            _ => "FunctionDef",
        };
        (kind, Shape::Definable { name })
    }

    fn classify(&self, ts: TsNode<'_>) -> (&'static str, Shape) {
        match ts.kind() {
            "expression_statement" => self.classify_expression(ts),
            "import_statement" => ("Import", Shape::Import(self.import(ts))),
            "import_from_statement" | "future_import_statement" => {
                ("ImportFrom", Shape::Import(self.import(ts)))
            }
            "return_statement" => ("Return", Shape::Other),
            "pass_statement" => ("Pass", Shape::Other),
            "if_statement" => ("If", Shape::Other),
            "for_statement" => ("For", Shape::Other),
            "while_statement" => ("While", Shape::Other),
            "with_statement" => ("With", Shape::Other),
            "try_statement" => ("Try", Shape::Other),
            "match_statement" => ("Match", Shape::Other),
            "raise_statement" => ("Raise", Shape::Other),
            "assert_statement" => ("Assert", Shape::Other),
            "delete_statement" => ("Delete", Shape::Other),
            "global_statement" => ("Global", Shape::Other),
            "nonlocal_statement" => ("Nonlocal", Shape::Other),
            "break_statement" => ("Break", Shape::Other),
            "continue_statement" => ("Continue", Shape::Other),
            "type_alias_statement" => ("TypeAlias", Shape::Other),
            _ => ("Stmt", Shape::Other),
        }
    }

    fn classify_expression(&self, ts: TsNode<'_>) -> (&'static str, Shape) {
        let Some(expr) = statements(ts).into_iter().next() else {
            return ("Expr", Shape::Other);
        };
        match expr.kind() {
            "assignment" => {
                let kind = if expr.child_by_field_name("type").is_some() {
                    "AnnAssign"
                } else {
                    "Assign"
                };
                let targets = self.assignment_targets(expr);
                if targets.is_empty() {
                    (kind, Shape::Other)
                } else {
                    (kind, Shape::Binding { targets })
                }
            }
            "augmented_assignment" => ("AugAssign", Shape::Other),
            _ => ("Expr", Shape::Other),
        }
    }

    /// Plain-name targets, following chains like `a = b = 1`.
    fn assignment_targets(&self, mut assignment: TsNode<'_>) -> Vec<String> {
        let mut targets = Vec::new();
        loop {
            if let Some(left) = assignment.child_by_field_name("left") {
                if left.kind() == "identifier" {
                    targets.push(self.text(left).to_string());
                }
            }
            match assignment.child_by_field_name("right") {
                Some(right) if right.kind() == "assignment" => assignment = right,
                _ => return targets,
            }
        }
    }

    fn import(&self, ts: TsNode<'_>) -> ImportStmt {
        let module = match ts.kind() {
            "future_import_statement" => Some("__future__".to_string()),
            "import_from_statement" => self.field_text(ts, "module_name").map(|m| compact(&m)),
            _ => None,
        };

        let mut cursor = ts.walk();
        let aliases = ts
            .children_by_field_name("name", &mut cursor)
            .map(|name| {
                if name.kind() == "aliased_import" {
                    Alias {
                        name: compact(&self.field_text(name, "name").unwrap_or_default()),
                        asname: self.field_text(name, "alias"),
                    }
                } else {
                    Alias {
                        name: compact(self.text(name)),
                        asname: None,
                    }
                }
            })
            .collect();

        let mut cursor = ts.walk();
        let wildcard = ts
            .named_children(&mut cursor)
            .any(|c| c.kind() == "wildcard_import");

        ImportStmt {
            module,
            aliases,
            wildcard,
        }
    }
}

fn tag_for(kind: &str, shape: &Shape) -> Option<String> {
    match (kind, shape) {
        (_, Shape::Definable { name }) => Some(format!("defines={name}")),
        ("Assign" | "AnnAssign", Shape::Binding { targets }) => {
            targets.first().map(|t| format!("assigns={t}"))
        }
        ("Return", _) => Some("returns=true".to_string()),
        ("If" | "For" | "While" | "With" | "Try" | "Match", _) => Some("hasBody=true".to_string()),
        _ => None,
    }
}
