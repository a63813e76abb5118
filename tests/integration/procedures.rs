// User procedures: inputs, OUTPUT and STOP, tail calls, scope.

use crate::common::*;
use qlogo_compiler::{CompilerConfig, ErrorCode, Procedure, Signal};

fn square(ev: &mut qlogo_compiler::Evaluator) {
    define(
        ev,
        "square",
        &["x"],
        vec![vec![p("output", vec![p("product", vec![var("x"), var("x")])])]],
    );
}

#[test]
fn test_output_value() {
    let (mut ev, _) = setup();
    square(&mut ev);
    assert_eq!(value(&mut ev, vec![call("square", vec![n(7.0)])]), "49");
    assert_eq!(
        value(&mut ev, vec![p("sum", vec![call("square", vec![n(3.0)]), n(1.0)])]),
        "10"
    );
}

#[test]
fn test_procedure_names_ignore_case() {
    let (mut ev, _) = setup();
    square(&mut ev);
    assert!(ev.procedure("Square").is_some());
    assert_eq!(value(&mut ev, vec![call("SQUARE", vec![n(2.0)])]), "4");
}

#[test]
fn test_unused_output() {
    let (mut ev, _) = setup();
    square(&mut ev);
    let err = run(
        &mut ev,
        vec![vec![call("square", vec![n(3.0)]), p("print", vec![w("x")])]],
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "You don't say what to do with 9");
}

#[test]
fn test_procedure_without_output() {
    let (mut ev, out) = setup();
    define(&mut ev, "noout", &[], vec![vec![p("print", vec![w("hi")])]]);
    let message = error_message(&mut ev, vec![p("print", vec![call("noout", vec![])])]);
    assert_eq!(message, "noout didn't output to print");
    assert_eq!(out.text(), "hi\n");
}

#[test]
fn test_input_count_checked() {
    let (mut ev, _) = setup();
    square(&mut ev);
    let message = error_message(&mut ev, vec![call("square", vec![])]);
    assert_eq!(message, "not enough inputs to square");
    let message = error_message(&mut ev, vec![call("square", vec![n(1.0), n(2.0)])]);
    assert_eq!(message, "too many inputs to square");
}

#[test]
fn test_unknown_procedure() {
    let (mut ev, _) = setup();
    let message = error_message(&mut ev, vec![call("nosuch", vec![])]);
    assert_eq!(message, "I don't know how to nosuch");
}

#[test]
fn test_stop_inside_nested_lists() {
    let (mut ev, out) = setup();
    let body = q1(vec![
        p("print", vec![p("repcount", vec![])]),
        p(
            "if",
            vec![
                p("equalp", vec![p("repcount", vec![]), n(3.0)]),
                q1(vec![p("stop", vec![])]),
            ],
        ),
    ]);
    define(&mut ev, "upto3", &[], vec![vec![p("repeat", vec![n(10.0), body])]]);
    define(
        &mut ev,
        "twice",
        &[],
        vec![
            vec![call("upto3", vec![])],
            vec![call("upto3", vec![])],
        ],
    );
    run(&mut ev, vec![vec![call("twice", vec![])]]).unwrap();
    assert_eq!(out.text(), "1\n2\n3\n1\n2\n3\n");
    assert_eq!(ev.repcount(), -1.0);
}

#[test]
fn test_output_from_inside_loop() {
    let (mut ev, _) = setup();
    let body = q1(vec![p(
        "if",
        vec![
            p("equalp", vec![p("repcount", vec![]), n(4.0)]),
            q1(vec![p("output", vec![p("repcount", vec![])])]),
        ],
    )]);
    define(&mut ev, "find4", &[], vec![vec![p("repeat", vec![n(10.0), body])]]);
    assert_eq!(value(&mut ev, vec![call("find4", vec![])]), "4");
    assert_eq!(ev.repcount(), -1.0);
}

#[test]
fn test_deep_tail_recursion() {
    let (mut ev, _) = setup();
    define(
        &mut ev,
        "countdown",
        &["n"],
        vec![
            vec![p(
                "if",
                vec![
                    p("equalp", vec![var("n"), n(0.0)]),
                    q1(vec![p("output", vec![w("done")])]),
                ],
            )],
            vec![p(
                "output",
                vec![call("countdown", vec![p("difference", vec![var("n"), n(1.0)])])],
            )],
        ],
    );
    assert_eq!(value(&mut ev, vec![call("countdown", vec![n(5000.0)])]), "done");
}

#[test]
fn test_stack_overflow() {
    let (mut ev, _) = setup_with(CompilerConfig::new().with_max_depth(50));
    define(
        &mut ev,
        "deep",
        &["n"],
        vec![vec![p(
            "output",
            vec![p("sum", vec![n(1.0), call("deep", vec![var("n")])])],
        )]],
    );
    match run(&mut ev, vec![vec![p("print", vec![call("deep", vec![n(1.0)])])]]) {
        Err(Signal::Error { code, message, .. }) => {
            assert_eq!(code, ErrorCode::StackOverflow);
            assert_eq!(message, "Stack overflow");
        }
        other => panic!("unexpected {:?}", other.map(|v| v.map(|d| d.show()))),
    }
}

#[test]
fn test_optional_and_rest_inputs() {
    let (mut ev, _) = setup();
    let body = block(vec![vec![p(
        "output",
        vec![p("list", vec![var("a"), var("b"), var("c")])],
    )]]);
    let procedure = Procedure::new("opt", vec!["a".into()], body)
        .with_optional("b", block(vec![vec![n(10.0)]]))
        .with_rest("c")
        .into_datum();
    ev.define_procedure(procedure);

    assert_eq!(shown(&mut ev, vec![call("opt", vec![n(1.0)])]), "[1 10 []]");
    assert_eq!(
        shown(&mut ev, vec![call("opt", vec![n(1.0), n(2.0), n(3.0), n(4.0)])]),
        "[1 2 [3 4]]"
    );
    let message = error_message(&mut ev, vec![call("opt", vec![])]);
    assert_eq!(message, "not enough inputs to opt");
}

#[test]
fn test_default_sees_earlier_inputs() {
    let (mut ev, _) = setup();
    let body = block(vec![vec![p("output", vec![var("b")])]]);
    let procedure = Procedure::new("twice", vec!["a".into()], body)
        .with_optional("b", block(vec![vec![p("product", vec![var("a"), n(2.0)])]]))
        .into_datum();
    ev.define_procedure(procedure);
    assert_eq!(value(&mut ev, vec![call("twice", vec![n(21.0)])]), "42");
}

#[test]
fn test_dynamic_scope() {
    let (mut ev, out) = setup();
    define(&mut ev, "inner", &[], vec![vec![p("output", vec![var("x")])]]);
    define(
        &mut ev,
        "outer",
        &["x"],
        vec![vec![p("print", vec![call("inner", vec![])])]],
    );
    run(&mut ev, vec![vec![call("outer", vec![n(5.0)])]]).unwrap();
    assert_eq!(out.text(), "5\n");
    assert!(ev.variable("x").is_none());
}

#[test]
fn test_local_and_make() {
    let (mut ev, out) = setup();
    run(&mut ev, vec![vec![p("make", vec![w("g"), n(10.0)])]]).unwrap();
    define(
        &mut ev,
        "setter",
        &[],
        vec![
            vec![p("local", vec![w("y")])],
            vec![p("make", vec![w("y"), n(3.0)])],
            vec![p("make", vec![w("g"), p("sum", vec![var("g"), var("y")])])],
            vec![p("print", vec![var("y")])],
        ],
    );
    run(&mut ev, vec![vec![call("setter", vec![])]]).unwrap();
    assert_eq!(out.text(), "3\n");
    assert!(ev.variable("y").is_none());
    assert_eq!(ev.variable("g").unwrap().print(), "13");
}

#[test]
fn test_stop_outside_procedure() {
    let (mut ev, _) = setup();
    let message = error_message(&mut ev, vec![p("stop", vec![])]);
    assert_eq!(message, "Can only use stop inside a procedure");
    let message = error_message(&mut ev, vec![p("output", vec![n(3.0)])]);
    assert_eq!(message, "Can only use output inside a procedure");
}

#[test]
fn test_redefinition_takes_effect() {
    let (mut ev, _) = setup();
    define(&mut ev, "f", &[], vec![vec![p("output", vec![n(1.0)])]]);
    let line = block(vec![vec![call("f", vec![])]]);
    assert_eq!(ev.execute(&line).unwrap().unwrap().print(), "1");
    define(&mut ev, "f", &[], vec![vec![p("output", vec![n(2.0)])]]);
    assert_eq!(ev.execute(&line).unwrap().unwrap().print(), "2");
}
