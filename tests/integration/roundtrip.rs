//! Untouched sources must come back byte-identical with an empty diff.

use proptest::prelude::*;
use structedit::{Editor, Language};

const PYTHON_STATEMENTS: &[&str] = &[
    "x = 1",
    "a = b = 2",
    "count: int = 0",
    "import os",
    "from collections import OrderedDict as OD",
    "# a comment",
    "",
    "def f(a, b=2):\n    return a + b",
    "async def g():\n    await f(1)",
    "class K:\n    y = 2\n\n    def m(self):  # trailing\n        pass",
    "@decorator\ndef h(): pass",
    "for i in range(3):\n    print(i)",
    "if __name__ == '__main__':\n    f(1)",
];

const JAVASCRIPT_STATEMENTS: &[&str] = &[
    "let x = 1;",
    "const a = 1, b = 2;",
    "import fs from 'fs';",
    "import { join as j } from 'path';",
    "// a comment",
    "",
    "function f(a) {\n  return a + 1;\n}",
    "export async function g() {\n  await f(1);\n}",
    "class K {\n  y = 2;\n\n  m() {\n    return this.y;\n  }\n}",
    "for (let i = 0; i < 3; i++) {\n  console.log(i);\n}",
    "if (require.main === module) {\n  f(1);\n}",
];

fn assemble(statements: &'static [&'static str]) -> impl Strategy<Value = String> {
    (
        prop::collection::vec((prop::sample::select(statements), 0usize..3), 0..12),
        any::<bool>(),
    )
        .prop_map(|(parts, trailing_newline)| {
            let mut source = String::new();
            for (statement, blank_lines) in parts {
                source.push_str(statement);
                source.push('\n');
                source.push_str(&"\n".repeat(blank_lines));
            }
            if !trailing_newline {
                let trimmed = source.trim_end_matches('\n').len();
                source.truncate(trimmed);
            }
            source
        })
}

proptest! {
    #[test]
    fn python_round_trips(source in assemble(PYTHON_STATEMENTS)) {
        let editor = Editor::from_source(&source, Language::Python).unwrap();
        prop_assert_eq!(editor.modified_source(), source);
        prop_assert_eq!(editor.diff(), "");
    }

    #[test]
    fn javascript_round_trips(source in assemble(JAVASCRIPT_STATEMENTS)) {
        let editor = Editor::from_source(&source, Language::JavaScript).unwrap();
        prop_assert_eq!(editor.modified_source(), source);
        prop_assert_eq!(editor.diff(), "");
    }

    #[test]
    fn plain_text_round_trips(source in "[a-z #\t\n]{0,200}") {
        let editor = Editor::from_source(&source, Language::PlainText).unwrap();
        prop_assert_eq!(editor.modified_source(), source);
        prop_assert_eq!(editor.diff(), "");
    }

    #[test]
    fn element_sources_are_slices_of_the_unit(source in assemble(PYTHON_STATEMENTS)) {
        let editor = Editor::from_source(&source, Language::Python).unwrap();
        for name in editor.list_elements() {
            let text = editor.get_source(&name).unwrap();
            prop_assert!(source.contains(&text), "{} not found verbatim", name);
        }
    }
}
