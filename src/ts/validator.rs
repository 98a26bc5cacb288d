use crate::pool;
use crate::ts::errors::TreeSitterError;
use crate::ts::parser::Grammar;
use tree_sitter::Tree;

/// Parse `source` with the pooled parser and reject trees with ERROR or
/// MISSING nodes.
///
/// Returns the tree when the source parses cleanly.
pub fn parse_checked(grammar: Grammar, source: &str) -> Result<Tree, TreeSitterError> {
    pool::with_parser(grammar, |parser| {
        let parsed = parser.parse_with_source(source)?;
        if !parsed.has_errors() {
            return Ok(parsed.into_tree());
        }

        let errors = parsed.error_nodes();
        // has_error() can be set without a visible ERROR node; report the root.
        let (line, column) = errors
            .first()
            .map(|e| (e.start_point.row + 1, e.start_point.column + 1))
            .unwrap_or((1, 1));

        match errors.len() {
            0 | 1 => Err(TreeSitterError::SyntaxError { line, column }),
            count => Err(TreeSitterError::MultipleSyntaxErrors {
                count,
                line,
                column,
            }),
        }
    })?
}
