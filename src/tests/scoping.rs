use super::*;
use pretty_assertions::assert_eq;

#[test]
fn inner_block_shadows_and_restores() {
    let output = run(r#"
        func main() {
            var x;
            x = 1;
            if (true) {
                var x;
                x = 2;
                print(x);
            }
            print(x);
        }
    "#);
    assert_eq!(output, lines(&["2", "1"]));
}

#[test]
fn assignment_reaches_enclosing_block() {
    let output = run(r#"
        func main() {
            var x;
            x = 1;
            if (x == 1) { x = 5; } else { x = 6; }
            print(x);
        }
    "#);
    assert_eq!(output, lines(&["5"]));
}

#[test]
fn block_variables_do_not_outlive_the_block() {
    let (output, kind) = run_err(r#"
        func main() {
            if (true) { var y; y = 1; print(y); }
            print(y);
        }
    "#);
    assert_eq!(output, lines(&["1"]));
    assert_eq!(kind, ErrorKind::NameError);
}

#[test]
fn callee_cannot_see_caller_variables() {
    let (_, kind) = run_err(r#"
        func f() { print(x); }
        func main() { var x; x = 1; f(); }
    "#);
    assert_eq!(kind, ErrorKind::NameError);
}

#[test]
fn duplicate_definition_in_one_scope_is_a_name_error() {
    let (_, kind) = run_err("func main() { var x; var x; }");
    assert_eq!(kind, ErrorKind::NameError);
}

#[test]
fn duplicate_parameter_is_a_name_error() {
    let (_, kind) = run_err("func f(a, a) { } func main() { f(1, 2); }");
    assert_eq!(kind, ErrorKind::NameError);
}

#[test]
fn assigning_an_undefined_variable_is_a_name_error() {
    let (_, kind) = run_err("func main() { y = 3; }");
    assert_eq!(kind, ErrorKind::NameError);
}

#[test]
fn for_loop_counts() {
    let output = run(r#"
        func main() {
            var i;
            for (i = 0; i < 3; i = i + 1) {
                var sq;
                sq = i * i;
                print(i, ":", sq);
            }
            print("done ", i);
        }
    "#);
    assert_eq!(output, lines(&["0:0", "1:1", "2:4", "done 3"]));
}

#[test]
fn non_boolean_conditions_are_type_errors() {
    let (_, kind) = run_err("func main() { if (1) { print(1); } }");
    assert_eq!(kind, ErrorKind::TypeError);

    let (_, kind) = run_err("func main() { var i; for (i = 0; i; i = i + 1) { } }");
    assert_eq!(kind, ErrorKind::TypeError);
}

#[test]
fn return_unwinds_nested_blocks() {
    let output = run(r#"
        func find() {
            var i;
            for (i = 0; i < 10; i = i + 1) {
                if (i == 4) { return i * 100; }
            }
            return -1;
        }
        func main() { print(find()); }
    "#);
    assert_eq!(output, lines(&["400"]));
}
