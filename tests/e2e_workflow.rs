//! End-to-end workflow test
//!
//! Tests the complete workflow:
//! 1. Open a file from disk
//! 2. Apply a sequence of structural edits
//! 3. Persist with a backup
//! 4. Re-open and check the result is stable

use std::fs;
use structedit::{Editor, EditorConfig, Language, SaveOutcome};
use tempfile::TempDir;

const SERVICE: &str = r#""""Order service."""
import json


class Orders:
    def __init__(self):
        self.items = []

    def add(self, item):
        self.items.append(item)

    def total(self):
        return sum(i["price"] for i in self.items)


def main():
    orders = Orders()
    orders.add({"price": 3})
    print(orders.total())


if __name__ == "__main__":
    main()
"#;

fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("service.py"), SERVICE).unwrap();
    dir
}

#[test]
fn test_e2e_edit_save_reopen() {
    let dir = setup_workspace();
    let path = dir.path().join("service.py");

    let mut config = EditorConfig::default();
    config.persist.keep_backup = true;
    let mut editor = Editor::open_with_config(&path, config).unwrap();
    assert_eq!(editor.language(), Language::Python);
    assert_eq!(
        editor.list_elements(),
        vec!["json", "Orders", "__init__", "add", "total", "main"]
    );

    // Method replacement brings a new import with it.
    assert!(editor.replace_element(
        "total",
        "import math\n\ndef total(self):\n    return math.fsum(i[\"price\"] for i in self.items)\n",
    ));
    // New top-level helper lands before the entry guard.
    assert!(editor.add_element(
        "def dump(orders):\n    return json.dumps(orders.items)",
        Some("main"),
        false,
    ));
    // Surgical edit inside main.
    assert!(editor.replace_partial("main", "print(dump(orders))", None, None, Some(2)));

    let modified = editor.modified_source();
    assert!(modified.starts_with("\"\"\"Order service.\"\"\"\nimport json\nimport math\n"));
    assert!(modified.contains(
        "    def total(self):\n        return math.fsum(i[\"price\"] for i in self.items)\n"
    ));
    assert!(modified.contains("    print(dump(orders))\n"));
    assert!(modified.find("def dump").unwrap() < modified.find("if __name__").unwrap());

    let outcome = editor.save().unwrap();
    let backup = match outcome {
        SaveOutcome::Written { backup, .. } => backup.unwrap(),
        other => panic!("expected a write, got {other:?}"),
    };
    assert_eq!(fs::read_to_string(&backup).unwrap(), SERVICE);
    assert_eq!(fs::read_to_string(&path).unwrap(), modified);

    // Re-opening sees the saved text as the new baseline.
    let reopened = Editor::open(&path).unwrap();
    assert_eq!(reopened.diff(), "");
    assert!(reopened.list_elements().contains(&"dump".to_string()));
    assert!(reopened.list_elements().contains(&"math".to_string()));
}

#[test]
fn test_e2e_rejected_edits_do_not_touch_disk() {
    let dir = setup_workspace();
    let path = dir.path().join("service.py");

    let mut editor = Editor::open(&path).unwrap();
    assert!(!editor.replace_element("missing", "def missing():\n    pass\n"));
    assert!(!editor.replace_element("main", "def main(:\n"));
    assert!(!editor.delete_element("Order"));

    assert!(matches!(
        editor.save().unwrap(),
        SaveOutcome::Unchanged { .. }
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), SERVICE);
}

#[test]
fn test_e2e_javascript_and_text_files() {
    let dir = TempDir::new().unwrap();
    let js = dir.path().join("util.mjs");
    let notes = dir.path().join("NOTES.txt");
    fs::write(&js, "export function twice(x) {\n  return x * 2;\n}\n").unwrap();
    fs::write(&notes, "first\nsecond\n").unwrap();

    let mut editor = Editor::open(&js).unwrap();
    assert_eq!(editor.language(), Language::JavaScript);
    assert!(editor.add_element("export const THRICE = 3;", None, false));
    assert!(matches!(editor.save().unwrap(), SaveOutcome::Written { .. }));
    assert_eq!(
        fs::read_to_string(&js).unwrap(),
        "export function twice(x) {\n  return x * 2;\n}\n\nexport const THRICE = 3;\n"
    );

    let mut editor = Editor::open(&notes).unwrap();
    assert_eq!(editor.list_elements(), vec!["content"]);
    assert!(editor.replace_partial("content", "SECOND", Some(2), None, None));
    assert!(matches!(editor.save().unwrap(), SaveOutcome::Written { .. }));
    assert_eq!(fs::read_to_string(&notes).unwrap(), "first\nSECOND\n");
}
