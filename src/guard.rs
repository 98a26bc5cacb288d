//! Entry-guard detection.
//!
//! An entry guard is the top-level `if` that only runs when the file is the
//! program's entry point. New elements are inserted before it.

use crate::ts::Grammar;
use tree_sitter::Node;

/// Whether `node` is the entry-guard statement of its grammar.
pub fn is_entry_guard(grammar: Grammar, node: Node<'_>, source: &str) -> bool {
    if node.kind() != "if_statement" {
        return false;
    }
    let Some(condition) = node.child_by_field_name("condition") else {
        return false;
    };
    match grammar {
        Grammar::Python => is_python_main_check(condition, source),
        Grammar::JavaScript => is_require_main_check(condition, source),
    }
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// `__name__ == "__main__"`, operands in either order.
fn is_python_main_check(condition: Node<'_>, source: &str) -> bool {
    if condition.kind() != "comparison_operator" {
        return false;
    }

    let mut cursor = condition.walk();
    let operators: Vec<&str> = condition
        .children(&mut cursor)
        .filter(|c| !c.is_named())
        .map(|c| c.kind())
        .collect();
    if operators != ["=="] {
        return false;
    }

    let operands = named_children(condition);
    let [left, right] = operands.as_slice() else {
        return false;
    };

    let is_name = |n: &Node<'_>| n.kind() == "identifier" && text(*n, source) == "__name__";
    let is_main = |n: &Node<'_>| {
        n.kind() == "string" && matches!(text(*n, source), "'__main__'" | "\"__main__\"")
    };

    (is_name(left) && is_main(right)) || (is_main(left) && is_name(right))
}

/// `(require.main === module)`, also with `==` and operands swapped.
fn is_require_main_check(condition: Node<'_>, source: &str) -> bool {
    let inner = if condition.kind() == "parenthesized_expression" {
        match named_children(condition).as_slice() {
            [only] => *only,
            _ => return false,
        }
    } else {
        condition
    };

    if inner.kind() != "binary_expression" {
        return false;
    }
    let operator = inner
        .child_by_field_name("operator")
        .map(|op| op.kind())
        .unwrap_or_default();
    if !matches!(operator, "===" | "==") {
        return false;
    }

    let (Some(left), Some(right)) = (
        inner.child_by_field_name("left"),
        inner.child_by_field_name("right"),
    ) else {
        return false;
    };

    let is_require_main = |n: Node<'_>| {
        n.kind() == "member_expression"
            && n.child_by_field_name("object")
                .is_some_and(|o| text(o, source) == "require")
            && n.child_by_field_name("property")
                .is_some_and(|p| text(p, source) == "main")
    };
    let is_module = |n: Node<'_>| n.kind() == "identifier" && text(n, source) == "module";

    (is_require_main(left) && is_module(right)) || (is_module(left) && is_require_main(right))
}
