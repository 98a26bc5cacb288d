//! Multi-line string literals, whose line breaks carry value.

use std::ops::Range;
use tree_sitter::Node;

/// Node kinds that quote text in the supported grammars.
const LITERAL_KINDS: &[&str] = &["string", "template_string"];

/// Byte ranges of every string literal under `root` that spans more than
/// one line. Nested literals are covered by their outermost one.
pub fn literal_ranges(root: Node<'_>) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    collect(root, &mut ranges);
    ranges
}

fn collect(node: Node<'_>, ranges: &mut Vec<Range<usize>>) {
    if LITERAL_KINDS.contains(&node.kind()) {
        if node.start_position().row != node.end_position().row {
            ranges.push(node.byte_range());
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(child, ranges);
    }
}
