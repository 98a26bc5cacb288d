use structedit::{Editor, Language};

fn python(source: &str) -> Editor {
    Editor::from_source(source, Language::Python).unwrap()
}

/// Lines 1-9 are module bindings, `f` starts on line 10 and its body holds
/// five statements: `a` (11), `b` (12), `if` (13-14), `for` (15-17) and
/// `return` (18).
fn long_function() -> String {
    let mut source = String::new();
    for i in 1..=9 {
        source.push_str(&format!("x{i} = {i}\n"));
    }
    source.push_str(
        "def f():\n    a = 1\n    b = 2\n    if b:\n        b += 1\n    for i in range(3):\n        a += i\n        b += i\n    return a + b\n",
    );
    source
}

#[test]
fn fresh_editor_has_empty_diff() {
    let editor = python("import os\n\n\ndef main():\n    return os.sep\n");
    assert_eq!(editor.diff(), "");
    assert_eq!(editor.modified_source(), editor.original_source());
}

#[test]
fn first_definition_wins_on_collision() {
    let source = "def f():\n    return 1\n\n\ndef f():\n    return 2\n";
    let mut editor = python(source);

    assert_eq!(editor.list_elements(), vec!["f"]);
    assert_eq!(editor.get_source("f").as_deref(), Some("def f():\n    return 1"));

    assert!(editor.replace_element("f", "def f():\n    return 3\n"));
    assert_eq!(
        editor.modified_source(),
        "def f():\n    return 3\n\n\ndef f():\n    return 2\n"
    );
}

#[test]
fn replacement_can_rename_an_element() {
    let mut editor = python("def old():\n    pass\n");
    assert!(editor.replace_element("old", "def new():\n    pass\n"));
    assert_eq!(editor.list_elements(), vec!["new"]);
    assert!(editor.get_source("old").is_none());
}

#[test]
fn shared_import_is_added_once() {
    let mut editor = python("import os\n\nx = 1\n");
    assert!(editor.add_element("import json\ndef f(): pass", None, false));
    assert!(editor.add_element("import json\ndef g(): pass", None, false));

    let out = editor.modified_source();
    assert_eq!(out.matches("import json").count(), 1);
    assert!(out.starts_with("import os\nimport json\n"));
    assert!(out.find("def f").unwrap() < out.find("def g").unwrap());
}

#[test]
fn unanchored_add_stops_at_entry_guard() {
    let mut editor = python("def main():\n    pass\n\n\nif __name__ == '__main__':\n    main()\n");
    assert!(editor.add_element("def helper():\n    pass", None, false));

    let out = editor.modified_source();
    assert!(out.find("def helper").unwrap() < out.find("if __name__").unwrap());
    assert!(out.ends_with("if __name__ == '__main__':\n    main()\n"));
}

#[test]
fn anchored_add_after_last_element_stops_at_entry_guard() {
    let mut editor = python(
        "def main():\n    pass\n\n\nif __name__ == \"__main__\":\n    main()\n\nLATE = 1\n",
    );
    assert!(editor.add_element("EARLY = 0", Some("LATE"), false));

    let out = editor.modified_source();
    assert!(out.find("EARLY = 0").unwrap() < out.find("if __name__").unwrap());
    assert!(out.find("def main").unwrap() < out.find("EARLY = 0").unwrap());
}

#[test]
fn partial_replace_spans_overlapping_statements() {
    let source = long_function();
    let mut editor = python(&source);

    let structure = editor.get_structure("f").unwrap();
    assert_eq!(structure.line_start, 10);
    assert_eq!(structure.body_items.len(), 5);
    assert_eq!(
        (structure.body_items[3].line_start, structure.body_items[3].line_end),
        (15, 17)
    );

    assert_eq!(
        editor.get_body_snippet("f", 14, 14).as_deref(),
        Some("if b:\n        b += 1")
    );

    assert!(editor.replace_partial("f", "return 0", Some(12), Some(18), None));
    let expected = format!("{}def f():\n    a = 1\n    return 0\n", &source[..source.find("def f").unwrap()]);
    assert_eq!(editor.modified_source(), expected);
}

#[test]
fn partial_replace_outside_body_is_rejected() {
    let mut editor = python(&long_function());
    assert!(!editor.replace_partial("f", "return 0", Some(1), Some(9), None));
    assert!(!editor.replace_partial("f", "return 0", None, None, Some(5)));
    assert_eq!(editor.diff(), "");
}

#[test]
fn delete_alias_then_statement() {
    let mut editor = python("import os, sys\nfrom json import dumps, loads\n\nx = 1\n");

    assert!(editor.delete_element("sys"));
    assert_eq!(
        editor.modified_source(),
        "import os\nfrom json import dumps, loads\n\nx = 1\n"
    );

    assert!(editor.delete_element("dumps"));
    assert!(editor.modified_source().contains("from json import loads\n"));

    assert!(editor.delete_element("os"));
    assert_eq!(editor.modified_source(), "from json import loads\n\nx = 1\n");
    assert!(!editor.delete_element("os"));
}

#[test]
fn bad_patch_rolls_back() {
    let mut editor = python("def f():\n    return 1\n");
    assert!(!editor.replace_element("f", "not valid syntax ("));
    assert_eq!(editor.diff(), "");

    assert!(editor.replace_element("f", "def f():\n    return 2\n"));
    let diff = editor.diff();
    assert!(!editor.replace_element("f", "def f(:\n"));
    assert!(!editor.add_element("class (", None, false));
    assert!(!editor.replace_partial("f", "return (", None, None, Some(0)));
    assert_eq!(editor.diff(), diff);
}

#[test]
fn class_members_are_addressable() {
    let mut editor = python("class Greeter:\n    greeting = 'hi'\n\n    def greet(self):\n        return self.greeting\n");
    assert_eq!(editor.list_elements(), vec!["Greeter", "greeting", "greet"]);

    assert!(editor.replace_element("greet", "def greet(self):\n    return self.greeting.upper()\n"));
    assert!(editor
        .modified_source()
        .contains("    def greet(self):\n        return self.greeting.upper()"));

    assert!(editor.delete_element("greeting"));
    assert_eq!(editor.list_elements(), vec!["Greeter", "greet"]);
}
