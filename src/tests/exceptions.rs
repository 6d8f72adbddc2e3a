use super::*;
use pretty_assertions::assert_eq;

#[test]
fn matching_catch_handles_raise() {
    let output = run(r#"
        func main() {
            try {
                raise "oops";
                print("unreachable");
            } catch "other" {
                print("wrong handler");
            } catch "oops" {
                print("caught");
            }
            print("after");
        }
    "#);
    assert_eq!(output, lines(&["caught", "after"]));
}

#[test]
fn uncaught_raise_is_a_fault() {
    let (output, kind) = run_err(r#"
        func main() {
            print("start");
            try { raise "x"; } catch "y" { print("no"); }
            print("never");
        }
    "#);
    assert_eq!(output, lines(&["start"]));
    assert_eq!(kind, ErrorKind::FaultError);
}

#[test]
fn unmatched_raise_reaches_outer_try() {
    let output = run(r#"
        func main() {
            try {
                try {
                    raise "outer";
                } catch "inner" {
                    print("inner handler");
                }
                print("skipped");
            } catch "outer" {
                print("outer handler");
            }
        }
    "#);
    assert_eq!(output, lines(&["outer handler"]));
}

#[test]
fn raise_crosses_function_calls() {
    let output = run(r#"
        func deep(n) {
            if (n == 0) { raise "bottom"; }
            deep(n - 1);
        }
        func main() {
            try { deep(3); } catch "bottom" { print("caught from depth"); }
        }
    "#);
    assert_eq!(output, lines(&["caught from depth"]));
}

#[test]
fn raise_from_handler_propagates_outward() {
    let output = run(r#"
        func main() {
            try {
                try { raise "a"; } catch "a" { raise "b"; }
            } catch "b" {
                print("rethrown");
            }
        }
    "#);
    assert_eq!(output, lines(&["rethrown"]));
}

#[test]
fn exception_tag_is_computed() {
    let output = run(r#"
        func main() {
            var kind;
            kind = "net";
            try { raise kind + "_down"; } catch "net_down" { print("computed"); }
        }
    "#);
    assert_eq!(output, lines(&["computed"]));
}

#[test]
fn raising_a_non_string_is_a_type_error() {
    let (_, kind) = run_err("func main() { raise 42; }");
    assert_eq!(kind, ErrorKind::TypeError);
}

#[test]
fn division_by_zero_is_catchable() {
    let output = run(r#"
        func main() {
            try { print(1 / 0); } catch "div0" { print("div0"); }
        }
    "#);
    assert_eq!(output, lines(&["div0"]));

    let (_, kind) = run_err("func main() { print(1 / 0); }");
    assert_eq!(kind, ErrorKind::FaultError);
}

#[test]
fn return_inside_try_leaves_the_function() {
    let output = run(r#"
        func f() {
            try { return 1; } catch "x" { print("no"); }
            return 2;
        }
        func main() { print(f()); }
    "#);
    assert_eq!(output, lines(&["1"]));
}

#[test]
fn raise_stops_a_loop() {
    let output = run(r#"
        func main() {
            var i;
            try {
                for (i = 0; i < 10; i = i + 1) {
                    if (i == 2) { raise "stop"; }
                    print(i);
                }
            } catch "stop" {
                print("stopped at ", i);
            }
        }
    "#);
    assert_eq!(output, lines(&["0", "1", "stopped at 2"]));
}

#[test]
fn fatal_errors_are_not_catchable() {
    let (_, kind) = run_err(r#"
        func main() {
            try { print(undefined); } catch "NAME_ERROR" { print("no"); }
        }
    "#);
    assert_eq!(kind, ErrorKind::NameError);
}
