use pretty_assertions::assert_eq;
use std::{
    env,
    path::PathBuf,
    process::{Command, Output, Stdio},
};

fn bin_path() -> &'static str {
    env!("CARGO_BIN_EXE_lazybrew")
}

fn demo(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("demos");
    path.push(name);
    path.to_string_lossy().into_owned()
}

fn lazybrew(args: &[&str]) -> Command {
    let mut cmd = Command::new(bin_path());
    cmd.args(args)
        .env_remove("LAZYBREW_INPUTS")
        .env_remove("LAZYBREW_LOG")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn run_evaluates_lazily() {
    let output = lazybrew(&["run", &demo("lazy.br")])
        .output()
        .expect("failed to run lazybrew");
    assert!(
        output.status.success(),
        "lazy demo failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        stdout_lines(&output),
        vec!["assigned", "computing x", "42", "84"]
    );
}

#[test]
fn input_flags_feed_the_program() {
    let output = lazybrew(&["run", &demo("input.br"), "--input", "Ada", "--input", "30"])
        .output()
        .expect("failed to run lazybrew");
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec!["name?", "age?", "Ada is 30", "next year: 31"]
    );
}

#[test]
fn input_env_var_feeds_the_program() {
    let output = lazybrew(&["run", &demo("input.br")])
        .env("LAZYBREW_INPUTS", "Grace|21")
        .output()
        .expect("failed to run lazybrew");
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec!["name?", "age?", "Grace is 21", "next year: 22"]
    );
}

#[test]
fn caught_exceptions_exit_cleanly() {
    let output = lazybrew(&["run", &demo("exceptions.br")])
        .output()
        .expect("failed to run lazybrew");
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec!["5", "cannot divide by zero", "built-in div0"]
    );
}

#[test]
fn error_kinds_map_to_exit_codes() {
    let cases = [
        ("name_error.br", 3, "NAME_ERROR"),
        ("type_error.br", 4, "TYPE_ERROR"),
        ("fault.br", 5, "FAULT_ERROR"),
    ];
    for (file, code, kind) in cases {
        let output = lazybrew(&["run", &demo(file)])
            .output()
            .expect("failed to run lazybrew");
        assert_eq!(output.status.code(), Some(code), "exit code for {file}");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains(kind), "missing {kind} in stderr:\n{stderr}");
    }
}

#[test]
fn syntax_errors_are_reported_by_check() {
    let output = lazybrew(&["check", &demo("syntax_error.br")])
        .output()
        .expect("failed to run lazybrew");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("initializer"),
        "missing initializer diagnostic:\n{stderr}"
    );

    let output = lazybrew(&["check", &demo("lazy.br")])
        .output()
        .expect("failed to run lazybrew");
    assert!(output.status.success());
}

#[test]
fn wrong_extension_is_rejected() {
    let output = lazybrew(&["run", "program.txt"])
        .output()
        .expect("failed to run lazybrew");
    assert_eq!(output.status.code(), Some(1));
}
