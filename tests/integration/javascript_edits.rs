use structedit::{Editor, Language};

const APP: &str = r#"const fs = require('fs');

function load(path) {
  const raw = fs.readFileSync(path, 'utf8');
  return JSON.parse(raw);
}

function main() {
  console.log(load('config.json'));
}

if (require.main === module) {
  main();
}
"#;

fn javascript(source: &str) -> Editor {
    Editor::from_source(source, Language::JavaScript).unwrap()
}

#[test]
fn fresh_editor_has_empty_diff() {
    let editor = javascript(APP);
    assert_eq!(editor.diff(), "");
    assert_eq!(editor.list_elements(), vec!["fs", "load", "main"]);
}

#[test]
fn add_lands_before_entry_guard() {
    let mut editor = javascript(APP);
    assert!(editor.add_element("function helper() {\n  return 1;\n}", None, false));
    assert!(editor.add_element("const LATE = 2;", Some("main"), false));

    let out = editor.modified_source();
    let guard = out.find("if (require.main").unwrap();
    assert!(out.find("function helper").unwrap() < guard);
    assert!(out.find("const LATE").unwrap() < guard);
    assert!(out.find("function main").unwrap() < out.find("const LATE").unwrap());
}

#[test]
fn replace_then_diff() {
    let mut editor = javascript(APP);
    assert!(editor.replace_element(
        "load",
        "function load(path) {\n  return JSON.parse(fs.readFileSync(path, 'utf8'));\n}"
    ));
    let diff = editor.diff();
    assert!(diff.contains("-  const raw = fs.readFileSync(path, 'utf8');\n"));
    assert!(diff.contains("+  return JSON.parse(fs.readFileSync(path, 'utf8'));\n"));
}

#[test]
fn partial_replace_by_line() {
    let mut editor = javascript(APP);
    assert_eq!(
        editor.get_body_snippet("load", 4, 5).as_deref(),
        Some("const raw = fs.readFileSync(path, 'utf8');\n  return JSON.parse(raw);")
    );
    assert!(editor.replace_partial("load", "return null;", Some(5), None, None));
    assert!(editor
        .modified_source()
        .contains("  const raw = fs.readFileSync(path, 'utf8');\n  return null;\n}"));
}

#[test]
fn bad_patch_rolls_back() {
    let mut editor = javascript(APP);
    assert!(!editor.replace_element("main", "not valid syntax ("));
    assert!(!editor.replace_partial("main", "console.log(", None, None, Some(0)));
    assert!(!editor.replace_element("missing", "function missing() {}"));
    assert_eq!(editor.modified_source(), APP);
    assert_eq!(editor.diff(), "");
}

#[test]
fn delete_alias_then_statement() {
    let mut editor = javascript("import { a, b } from './m.js';\n\nlet x = a + b;\n");
    assert!(editor.delete_element("a"));
    assert!(editor.modified_source().starts_with("import { b } from './m.js';\n"));
    assert!(editor.delete_element("b"));
    assert!(!editor.modified_source().contains("./m.js"));
    assert!(editor.modified_source().contains("let x = a + b;"));
}

#[test]
fn replace_source_requires_valid_javascript() {
    let mut editor = javascript(APP);
    assert!(!editor.replace_source("function ("));
    assert_eq!(editor.modified_source(), APP);
    assert!(editor.replace_source("let only = 1;\n"));
    assert_eq!(editor.list_elements(), vec!["only"]);
}
