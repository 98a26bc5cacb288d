use crate::ts::parser::Grammar;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeSitterError {
    #[error("failed to set {grammar} language for parser")]
    LanguageSet { grammar: Grammar },

    #[error("tree-sitter returned no tree for {grammar} source")]
    ParseFailed { grammar: Grammar },

    #[error("syntax error at line {line}, column {column}")]
    SyntaxError { line: usize, column: usize },

    #[error("{count} syntax errors, first at line {line}, column {column}")]
    MultipleSyntaxErrors {
        count: usize,
        line: usize,
        column: usize,
    },
}
