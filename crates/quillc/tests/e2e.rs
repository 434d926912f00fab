//! End-to-end tests driving the `quillc` binary over temporary projects.

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write source file");
    path
}

fn quillc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_quillc"))
        .args(args)
        .output()
        .expect("run quillc")
}

fn check(paths: &[&PathBuf], extra: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_quillc"));
    cmd.arg("check");
    for flag in extra {
        cmd.arg(flag);
    }
    for path in paths {
        cmd.arg(path);
    }
    cmd.output().expect("run quillc")
}

#[test]
fn clean_program_exits_zero() {
    let dir = TempDir::new().unwrap();
    let main = write_file(
        &dir,
        "main.quill",
        "fn add(a: i32, b: i32): i32 { return a + b; }\nfn main() { var r = add(1, 2); }\n",
    );
    let out = check(&[&main], &[]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn type_error_exits_nonzero_with_formatted_diagnostic() {
    let dir = TempDir::new().unwrap();
    let main = write_file(&dir, "main.quill", "fn f(): i32 { return true; }\n");
    let out = check(&[&main], &[]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("error: type mismatch: expected i32, found bool (return value)"),
        "stderr: {stderr}"
    );
    // The plain line carries the file:line:col prefix.
    assert!(stderr.contains("main.quill:1:"), "stderr: {stderr}");
}

#[test]
fn parse_error_recovers_and_reports() {
    let dir = TempDir::new().unwrap();
    let main = write_file(&dir, "main.quill", "var x = 1 var y = 2;\n");
    let out = check(&[&main], &[]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("expected ';'"), "stderr: {stderr}");
}

#[test]
fn merge_conflict_across_files() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.quill", "fn foo() {}\n");
    let b = write_file(&dir, "b.quill", "var foo: i32;\n");
    let out = check(&[&a, &b], &[]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("Symbol conflict: 'foo' already exists in namespace ''"),
        "stderr: {stderr}"
    );
}

#[test]
fn cross_file_program_checks_cleanly() {
    let dir = TempDir::new().unwrap();
    let lib = write_file(
        &dir,
        "lib.quill",
        "namespace math { fn square(x: i32): i32 { return x * x; } }\n",
    );
    let main = write_file(
        &dir,
        "main.quill",
        "using math;\nfn main() { var n = square(7); }\n",
    );
    let out = check(&[&lib, &main], &[]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn print_ast_dumps_tree() {
    let dir = TempDir::new().unwrap();
    let main = write_file(&dir, "main.quill", "fn main() { var x = 1; }\n");
    let out = check(&[&main], &["--print-ast"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("CompilationUnit"), "stdout: {stdout}");
    assert!(stdout.contains("FunctionDecl main"), "stdout: {stdout}");
    assert!(stdout.contains("VarDecl x"), "stdout: {stdout}");
}

#[test]
fn print_symbols_dumps_table() {
    let dir = TempDir::new().unwrap();
    let main = write_file(&dir, "main.quill", "type Point { var x: i32; }\n");
    let out = check(&[&main], &["--print-symbols"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Point"), "stdout: {stdout}");
    assert!(stdout.contains("x: i32"), "stdout: {stdout}");
}

#[test]
fn emit_json_produces_machine_readable_diagnostics() {
    let dir = TempDir::new().unwrap();
    let main = write_file(&dir, "main.quill", "fn f() { return q; }\n");
    let out = check(&[&main], &["--emit-json"]);
    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let line = stdout.lines().next().expect("one json diagnostic");
    let value: serde_json::Value = serde_json::from_str(line).expect("valid json");
    assert_eq!(value["severity"], "error");
    assert!(value["message"].as_str().unwrap().contains("unknown identifier 'q'"));
}

#[test]
fn missing_input_is_a_usage_error() {
    let out = quillc(&["check"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn unreadable_file_is_reported() {
    let out = quillc(&["check", "/nonexistent/definitely-missing.quill"]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("failed to read"), "stderr: {stderr}");
}
