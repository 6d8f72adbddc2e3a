use crate::language::parser::parse_program;
use crate::runtime::{
    console::ScriptedConsole,
    error::{ErrorKind, RuntimeResult},
    Interpreter,
};

mod builtins;
mod exceptions;
mod scoping;

/// Runs `source` with scripted input; returns the printed lines and the outcome.
fn execute(source: &str, inputs: &[&str]) -> (Vec<String>, RuntimeResult<()>) {
    let program = parse_program(source).expect("program should parse");
    let console = ScriptedConsole::with_inputs(inputs.iter().copied());
    let mut interpreter = Interpreter::new(&program, console);
    let result = interpreter.run();
    assert_eq!(
        interpreter.environment().frame_depth(),
        0,
        "environment not unwound after run"
    );
    (interpreter.into_console().into_lines(), result)
}

fn run(source: &str) -> Vec<String> {
    run_with_inputs(source, &[])
}

fn run_with_inputs(source: &str, inputs: &[&str]) -> Vec<String> {
    let (lines, result) = execute(source, inputs);
    if let Err(err) = result {
        panic!("program failed with {}: {err}\noutput so far: {lines:?}", err.kind());
    }
    lines
}

/// Runs a program that must fail; returns the output produced first and the error kind.
fn run_err(source: &str) -> (Vec<String>, ErrorKind) {
    run_err_with_inputs(source, &[])
}

fn run_err_with_inputs(source: &str, inputs: &[&str]) -> (Vec<String>, ErrorKind) {
    let (lines, result) = execute(source, inputs);
    match result {
        Ok(()) => panic!("program unexpectedly succeeded; output: {lines:?}"),
        Err(err) => (lines, err.kind()),
    }
}

fn lines(expected: &[&str]) -> Vec<String> {
    expected.iter().map(|line| line.to_string()).collect()
}
