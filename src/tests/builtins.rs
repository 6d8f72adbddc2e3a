use super::*;
use pretty_assertions::assert_eq;

#[test]
fn print_concatenates_its_arguments() {
    let output = run(r#"
        func main() {
            print("x=", 1, " ", true, nil);
            print();
        }
    "#);
    assert_eq!(output, lines(&["x=1 true", ""]));
}

#[test]
fn inputi_prints_prompt_and_parses() {
    let output = run_with_inputs(
        r#"
        func main() {
            var n;
            n = inputi("age?");
            print(n + 1);
        }
    "#,
        &["21"],
    );
    assert_eq!(output, lines(&["age?", "22"]));
}

#[test]
fn inputs_returns_the_line_as_a_string() {
    let output = run_with_inputs(
        r#"
        func main() {
            print(inputs() + "!");
            print("[", inputs(), "]");
        }
    "#,
        &["abc"],
    );
    assert_eq!(output, lines(&["abc!", "[]"]));
}

#[test]
fn inputi_rejects_non_integers() {
    let (_, kind) = run_err_with_inputs("func main() { print(inputi()); }", &["abc"]);
    assert_eq!(kind, ErrorKind::TypeError);
}

#[test]
fn input_with_two_arguments_is_a_name_error() {
    let (_, kind) = run_err(r#"func main() { inputs("a", "b"); }"#);
    assert_eq!(kind, ErrorKind::NameError);
}

#[test]
fn builtins_take_precedence_over_user_functions() {
    let output = run(r#"
        func print(a) { raise "shadowed"; }
        func main() { print("builtin"); }
    "#);
    assert_eq!(output, lines(&["builtin"]));
}

#[test]
fn run_source_separates_syntax_and_runtime_failures() {
    let mut console = ScriptedConsole::new();
    crate::run_source(r#"func main() { print("hi"); }"#, &mut console).expect("program runs");
    assert_eq!(console.lines(), lines(&["hi"]).as_slice());

    let syntax = crate::run_source("func main() {", ScriptedConsole::new());
    assert!(matches!(syntax, Err(crate::LazybrewError::Syntax(_))));

    let runtime = crate::run_source("func main() { print(x); }", ScriptedConsole::new());
    match runtime {
        Err(crate::LazybrewError::Runtime(err)) => assert_eq!(err.kind(), ErrorKind::NameError),
        other => panic!("expected a runtime error, got {other:?}"),
    }
}
