//! Integration tests for command mode (-c/--command flag) and script input

use std::io::Write;
use std::process::{Command, Stdio};

fn tabula() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tabula"));
    // Tests must be deterministic and not depend on a user's ~/.config/tabula/config.toml.
    cmd.arg("--no-config");
    cmd
}

fn run_commands(commands: &[&str]) -> (String, String, i32) {
    let mut cmd = tabula();
    for c in commands {
        cmd.arg("-c").arg(c);
    }
    let output = cmd.output().expect("Failed to execute tabula");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

#[test]
fn test_formula_value() {
    let (stdout, _, code) = run_commands(&["set A1 5", "set B1 =A1*2", "get B1"]);
    assert_eq!(stdout.trim(), "10\t=A1*2");
    assert_eq!(code, 0);
}

#[test]
fn test_recalculation_after_change() {
    let (stdout, _, code) = run_commands(&[
        "set A1 5",
        "set B1 =A1*2",
        "get B1",
        "set A1 7",
        "get B1",
    ]);
    assert_eq!(stdout, "10\t=A1*2\n14\t=A1*2\n");
    assert_eq!(code, 0);
}

#[test]
fn test_values_and_texts_output() {
    let (stdout, _, code) = run_commands(&[
        "set A1 =1+2",
        "set B2 'quoted",
        "values",
        "texts",
    ]);
    assert_eq!(stdout, "3\t\n\tquoted\n=1+2\t\n\t'quoted\n");
    assert_eq!(code, 0);
}

#[test]
fn test_circular_dependency_exit_code() {
    let (stdout, stderr, code) = run_commands(&["set A1 =B1+1", "set B1 =A1+1", "get B1"]);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Circular dependency"));
    assert!(stderr.contains("Line 2"));
    assert_eq!(code, 1);
}

#[test]
fn test_unknown_command_exit_code() {
    let (_, stderr, code) = run_commands(&["explode A1"]);
    assert!(stderr.contains("Unknown command"));
    assert_eq!(code, 1);
}

#[test]
fn test_size_after_clear() {
    let (stdout, _, code) = run_commands(&[
        "set A1 1",
        "set C3 2",
        "size",
        "clear C3",
        "size",
    ]);
    assert_eq!(stdout, "3 x 3\n1 x 1\n");
    assert_eq!(code, 0);
}

#[test]
fn test_script_from_stdin() {
    let mut child = tabula()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to spawn tabula");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"# totals\nset A1 10\nset A2 =A1/4\nget A2\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout), "2.5\t=A1/4\n");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_export_to_file() {
    let path = std::env::temp_dir().join(format!("tabula-export-{}.tsv", std::process::id()));
    let output = tabula()
        .args(["-c", "set A1 2", "-c", "set B1 =A1*A1", "-o"])
        .arg(&path)
        .output()
        .expect("Failed to execute tabula");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "2\t4\n");
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_unknown_option() {
    let output = tabula().arg("--bogus").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_long_formula_script() {
    let path = std::env::temp_dir().join(format!("tabula-long-{}.tab", std::process::id()));
    let script = format!("set A1 =1{}\nget A1\n", "+1".repeat(100_000));
    std::fs::write(&path, &script).unwrap();
    let output = tabula().arg(&path).output().expect("Failed to execute tabula");
    std::fs::remove_file(&path).unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("100001\t=1+1+1"));
}
