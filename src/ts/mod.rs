//! Tree-sitter integration shared by the tree-backed adapters.
//!
//! Provides grammar selection, parsing, syntax validation and the location
//! of multi-line string literals. Validation is strict: a tree with any
//! ERROR or MISSING node counts as a failed parse.

pub mod errors;
pub mod literals;
pub mod parser;
pub mod validator;

pub use errors::TreeSitterError;
pub use literals::literal_ranges;
pub use parser::{Grammar, ParsedSource, SourceParser};
pub use validator::parse_checked;
