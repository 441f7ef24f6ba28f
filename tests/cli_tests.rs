// Tests for the tinypy binary: argument handling, exit statuses, deep
// recursion, a closed stdout, and the --tokens / --ast debugging dumps.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn script(name: &str, source: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("tinypy-cli-{}-{}.py", std::process::id(), name));
    fs::write(&path, source).unwrap();
    path
}

fn tinypy(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tinypy"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn run_script(name: &str, source: &str) -> Output {
    let path = script(name, source);
    let output = tinypy(&[path.to_str().unwrap()]);
    let _ = fs::remove_file(path);
    output
}

#[test]
fn test_runs_a_script() {
    let output = run_script(
        "add",
        "def add(a, b):\n    return a + b\nx = add(2, 3)\nprint(x)\n",
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "5\n");
    assert!(output.stderr.is_empty());
}

#[test]
fn test_wrong_argument_count_prints_usage() {
    let output = tinypy(&[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));

    let output = tinypy(&["a.py", "b.py"]);
    assert!(!output.status.success());
}

#[test]
fn test_missing_file() {
    let output = tinypy(&["/definitely/not/here.py"]);
    assert_eq!(output.status.code(), Some(66));
}

#[test]
fn test_static_errors_exit_65() {
    let output = run_script("lex", "x = $\n");
    assert_eq!(output.status.code(), Some(65));
    assert!(String::from_utf8_lossy(&output.stderr).contains("LexError"));

    let output = run_script("parse", "print(1)\nx = (1\n");
    assert_eq!(output.status.code(), Some(65));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ParseError"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_runtime_errors_exit_70() {
    let output = run_script("runtime", "print(1)\nprint(True + 1)\n");
    assert_eq!(output.status.code(), Some(70));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TypeError"));
    assert!(stderr.contains("print(True + 1)"));
}

#[test]
fn test_token_dump() {
    let path = script("tokens", "x = 1\n");
    let output = tinypy(&["--tokens", path.to_str().unwrap()]);
    let _ = fs::remove_file(path);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Token: IDENTIFIER Value: x\nToken: EQUAL Value: \n"));
    assert!(stdout.ends_with("Token: END Value: \n"));
}

#[test]
fn test_ast_dump_does_not_execute() {
    let path = script("ast", "print(1 + 2)\n");
    let output = tinypy(&["--ast", path.to_str().unwrap()]);
    let _ = fs::remove_file(path);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "(Print (PLUS (NUMBER 1) (NUMBER 2)))\n"
    );
}

const COUNTDOWN: &str = "\
def down(n):
    if n == 0:
        return 0
    return down(n - 1)
";

#[test]
fn test_deep_recursion_runs_to_completion() {
    let output = run_script("deep", &format!("{}print(down(5000))\n", COUNTDOWN));
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "0\n");
}

#[test]
fn test_runaway_recursion_exits_70() {
    let output = run_script("runaway", "def forever(n):\n    return forever(n + 1)\nforever(0)\n");
    assert_eq!(output.status.code(), Some(70));
    assert!(String::from_utf8_lossy(&output.stderr).contains("RecursionError"));
}

#[test]
fn test_closed_stdout_does_not_panic() {
    let line = "x".repeat(200);
    let source = format!(
        "def spam(n):\n    if n == 0:\n        return 0\n    print(\"{}\", n)\n    return spam(n - 1)\nspam(2000)\n",
        line
    );
    let path = script("closed-stdout", &source);
    let mut child = Command::new(env!("CARGO_BIN_EXE_tinypy"))
        .arg(&path)
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    drop(child.stdout.take());
    let output = child.wait_with_output().unwrap();
    let _ = fs::remove_file(path);

    assert!(output.status.success(), "status: {:?}", output.status);
    assert!(!String::from_utf8_lossy(&output.stderr).contains("panicked"));
}
