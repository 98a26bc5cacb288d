//! Integration tests for the command-line interface.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const APP: &str = "import os\n\n\ndef main():\n    return os.sep\n\n\nif __name__ == '__main__':\n    main()\n";

/// A workspace holding `app.py`; also used as HOME so no user config leaks in.
fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("app.py"), APP).unwrap();
    dir
}

fn structedit(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_structedit"));
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    structedit(dir).args(args).output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_structedit"))
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let help = stdout(&output);
    assert!(help.contains("Structural editing"));
    assert!(help.contains("replace"));
    assert!(help.contains("partial"));
}

#[test]
fn test_cli_list() {
    let dir = setup_workspace();
    let output = run(dir.path(), &["app.py", "list"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "os\nmain\n");
}

#[test]
fn test_cli_show() {
    let dir = setup_workspace();
    let output = run(dir.path(), &["app.py", "show", "main"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "def main():\n    return os.sep\n");
}

#[test]
fn test_cli_structure_json() {
    let dir = setup_workspace();
    let output = run(dir.path(), &["app.py", "structure", "main", "--json"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["name"], "main");
    assert_eq!(value["type"], "FunctionDef");
    assert_eq!(value["line_start"], 4);
    assert_eq!(value["body_items"][0]["type"], "Return");
    assert_eq!(value["body_items"][0]["tag"], "returns=true");
}

#[test]
fn test_cli_replace_dry_run_leaves_file() {
    let dir = setup_workspace();
    let output = run(
        dir.path(),
        &["app.py", "replace", "main", "--code", "def main():\n    return 1\n"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("-    return os.sep"));
    assert!(out.contains("+    return 1"));
    assert_eq!(fs::read_to_string(dir.path().join("app.py")).unwrap(), APP);
}

#[test]
fn test_cli_replace_write() {
    let dir = setup_workspace();
    let output = run(
        dir.path(),
        &["app.py", "replace", "main", "--write", "--code", "def main():\n    return 1\n"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("wrote"));
    let content = fs::read_to_string(dir.path().join("app.py")).unwrap();
    assert!(content.contains("def main():\n    return 1\n"));
    assert!(content.ends_with("if __name__ == '__main__':\n    main()\n"));
}

#[test]
fn test_cli_add_from_stdin() {
    let dir = setup_workspace();
    let mut child = structedit(dir.path())
        .args(["app.py", "add", "--write"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"import sys\n\ndef helper():\n    return sys.argv\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let content = fs::read_to_string(dir.path().join("app.py")).unwrap();
    assert!(content.starts_with("import os\nimport sys\n"));
    assert!(content.find("def helper").unwrap() < content.find("if __name__").unwrap());
}

#[test]
fn test_cli_partial() {
    let dir = setup_workspace();
    let output = run(
        dir.path(),
        &["app.py", "partial", "main", "--statement", "0", "--code", "return 2", "--write"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let content = fs::read_to_string(dir.path().join("app.py")).unwrap();
    assert!(content.contains("def main():\n    return 2\n"));
}

#[test]
fn test_cli_rejected_edit_exits_nonzero() {
    let dir = setup_workspace();
    let output = run(
        dir.path(),
        &["app.py", "replace", "main", "--write", "--code", "def main(:\n"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("rejected"));
    assert_eq!(fs::read_to_string(dir.path().join("app.py")).unwrap(), APP);
}

#[test]
fn test_cli_suggests_similar_name() {
    let dir = setup_workspace();
    let output = run(dir.path(), &["app.py", "delete", "mian"]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("element not found: mian"));
    assert!(err.contains("did you mean 'main'?"));
}

#[test]
fn test_cli_language_override() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("script.data"), "def run():\n    pass\n").unwrap();

    let plain = run(dir.path(), &["script.data", "list"]);
    assert_eq!(stdout(&plain), "content\n");

    let python = run(dir.path(), &["script.data", "--language", "python", "list"]);
    assert!(python.status.success());
    assert_eq!(stdout(&python), "run\n");
}

#[test]
fn test_cli_diff_uses_config_labels() {
    let dir = setup_workspace();
    fs::write(
        dir.path().join(".structedit.toml"),
        "[diff]\noriginal_label = \"a/app.py\"\nmodified_label = \"b/app.py\"\n",
    )
    .unwrap();
    fs::write(dir.path().join("next.py"), APP.replace("os.sep", "os.pathsep")).unwrap();

    let output = run(dir.path(), &["app.py", "diff", "next.py"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.starts_with("--- a/app.py\n+++ b/app.py\n"));
    assert!(out.contains("+    return os.pathsep\n"));
}

#[test]
fn test_cli_invalid_config_fails() {
    let dir = setup_workspace();
    fs::write(dir.path().join("bad.toml"), "[persist]\nbackup_suffix = \"\"\n").unwrap();

    let output = run(dir.path(), &["--config", "bad.toml", "app.py", "list"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("backup_suffix"));
}

#[test]
fn test_cli_missing_file() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["nope.py", "list"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("nope.py"));
}
