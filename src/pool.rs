//! Thread-local parser pooling.
//!
//! Every edit re-parses the whole unit, so parsers are kept per thread and
//! per grammar instead of being rebuilt on each call. Creates a parser on
//! first use per thread, reuses it for subsequent operations.

use crate::ts::{Grammar, SourceParser, TreeSitterError};
use std::cell::RefCell;

thread_local! {
    static PYTHON_PARSER: RefCell<Option<SourceParser>> = const { RefCell::new(None) };
    static JAVASCRIPT_PARSER: RefCell<Option<SourceParser>> = const { RefCell::new(None) };
}

/// Execute function with the pooled parser for `grammar`.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use structedit::pool::with_parser;
/// use structedit::ts::Grammar;
///
/// let tree = with_parser(Grammar::Python, |parser| parser.parse("x = 1\n"))??;
/// assert_eq!(tree.root_node().kind(), "module");
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(grammar: Grammar, f: F) -> Result<R, TreeSitterError>
where
    F: FnOnce(&mut SourceParser) -> R,
{
    let slot = match grammar {
        Grammar::Python => &PYTHON_PARSER,
        Grammar::JavaScript => &JAVASCRIPT_PARSER,
    };

    slot.with(|cell| {
        let mut opt = cell.borrow_mut();
        if opt.is_none() {
            *opt = Some(SourceParser::new(grammar)?);
        }
        Ok(f(opt.as_mut().expect("parser was just initialized above")))
    })
}
