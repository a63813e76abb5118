// CATCH, THROW and the ERROR report.

use crate::common::*;
use qlogo_compiler::{ErrorCode, Signal};

#[test]
fn test_catch_matching_throw() {
    let (mut ev, _) = setup();
    let body = q1(vec![p("throw", vec![w("mytag"), n(5.0)])]);
    assert_eq!(value(&mut ev, vec![p("catch", vec![w("mytag"), body])]), "5");
}

#[test]
fn test_catch_tag_ignores_case() {
    let (mut ev, _) = setup();
    let body = q1(vec![p("throw", vec![w("MyTag"), n(5.0)])]);
    assert_eq!(value(&mut ev, vec![p("catch", vec![w("MYTAG"), body])]), "5");
}

#[test]
fn test_throw_without_value() {
    let (mut ev, out) = setup();
    let body = q1(vec![
        p("throw", vec![w("quiet")]),
        p("print", vec![w("unreachable")]),
    ]);
    let result = run(&mut ev, vec![vec![p("catch", vec![w("quiet"), body])]]).unwrap();
    assert!(result.is_none());
    assert_eq!(out.text(), "");
}

#[test]
fn test_uncaught_throw() {
    let (mut ev, _) = setup();
    let body = q1(vec![p("throw", vec![w("othertag"), n(5.0)])]);
    match run(&mut ev, vec![vec![p("catch", vec![w("mytag"), body])]]) {
        Err(Signal::Throw { tag, value }) => {
            assert_eq!(tag, "OTHERTAG");
            assert_eq!(value.unwrap().print(), "5");
        }
        other => panic!("unexpected {:?}", other.map(|v| v.map(|d| d.show()))),
    }
}

#[test]
fn test_nested_catch() {
    let (mut ev, _) = setup();
    let inner = p(
        "catch",
        vec![w("inner"), q1(vec![p("throw", vec![w("outer"), n(5.0)])])],
    );
    assert_eq!(
        value(&mut ev, vec![p("catch", vec![w("outer"), q1(vec![inner])])]),
        "5"
    );
}

#[test]
fn test_throw_through_procedures() {
    let (mut ev, out) = setup();
    define(
        &mut ev,
        "thrower",
        &[],
        vec![
            vec![p("throw", vec![w("up"), n(42.0)])],
            vec![p("print", vec![w("unreachable")])],
        ],
    );
    define(&mut ev, "middle", &[], vec![vec![call("thrower", vec![])]]);
    let body = q1(vec![call("middle", vec![])]);
    assert_eq!(value(&mut ev, vec![p("catch", vec![w("up"), body])]), "42");
    assert_eq!(out.text(), "");
}

#[test]
fn test_catch_error_swallows_errors() {
    let (mut ev, _) = setup();
    let body = q1(vec![p("sum", vec![n(1.0), w("x")])]);
    let result = run(&mut ev, vec![vec![p("catch", vec![w("error"), body])]]).unwrap();
    assert!(result.is_none());

    let code = ev.current_error().unwrap().as_error().unwrap().code;
    assert_eq!(code, ErrorCode::DoesntLike);
}

#[test]
fn test_catch_error_leaves_other_throws() {
    let (mut ev, _) = setup();
    let body = q1(vec![p("throw", vec![w("elsewhere")])]);
    let err = run(&mut ev, vec![vec![p("catch", vec![w("error"), body])]]).unwrap_err();
    assert!(matches!(err, Signal::Throw { ref tag, .. } if tag == "ELSEWHERE"));
}

#[test]
fn test_other_tag_does_not_catch_errors() {
    let (mut ev, _) = setup();
    let body = q1(vec![p("sum", vec![n(1.0), w("x")])]);
    let message = error_message(&mut ev, vec![p("catch", vec![w("mine"), body])]);
    assert_eq!(message, "sum doesn't like x as input");
}

#[test]
fn test_error_report() {
    let (mut ev, _) = setup();
    define(&mut ev, "oops", &[], vec![vec![p("sum", vec![n(1.0), w("x")])]]);
    run(
        &mut ev,
        vec![
            vec![p("catch", vec![w("error"), q1(vec![call("oops", vec![])])])],
            vec![p("make", vec![w("e"), p("error", vec![])])],
        ],
    )
    .unwrap();
    let item = |ev: &mut qlogo_compiler::Evaluator, i: f64| {
        value(ev, vec![p("item", vec![n(i), var("e")])])
    };
    assert_eq!(item(&mut ev, 1.0), "4");
    assert_eq!(item(&mut ev, 2.0), "sum doesn't like x as input");
    assert_eq!(item(&mut ev, 3.0), "oops");

    // ERROR forgets the error once reported.
    assert_eq!(shown(&mut ev, vec![p("error", vec![])]), "[]");
}

#[test]
fn test_throw_error_is_user_error() {
    let (mut ev, _) = setup();
    match run(&mut ev, vec![vec![p("throw", vec![w("error"), w("oops")])]]) {
        Err(Signal::Error { code, message, .. }) => {
            assert_eq!(code, ErrorCode::CustomThrow);
            assert_eq!(message, "oops");
        }
        other => panic!("unexpected {:?}", other.map(|v| v.map(|d| d.show()))),
    }
    let message = error_message(&mut ev, vec![p("throw", vec![w("error")])]);
    assert_eq!(message, "Throw \"Error");
}

#[test]
fn test_catch_error_catches_throw_error() {
    let (mut ev, _) = setup();
    let body = q1(vec![p("throw", vec![w("error"), w("oops")])]);
    let result = run(&mut ev, vec![vec![p("catch", vec![w("error"), body])]]).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_toplevel_and_system() {
    let (mut ev, _) = setup();
    assert!(matches!(
        run(&mut ev, vec![vec![p("throw", vec![w("toplevel")])]]),
        Err(Signal::Toplevel)
    ));
    assert!(matches!(
        run(&mut ev, vec![vec![p("throw", vec![w("system")])]]),
        Err(Signal::System)
    ));
    assert!(matches!(
        run(&mut ev, vec![vec![p("bye", vec![])]]),
        Err(Signal::System)
    ));
}

#[test]
fn test_catch_suspends_erract() {
    let (mut ev, out) = setup();
    ev.set_variable("erract", qlogo_compiler::DatumP::word("true"));
    let body = q1(vec![p("sum", vec![n(1.0), w("x")])]);
    let result = run(&mut ev, vec![vec![p("catch", vec![w("error"), body])]]).unwrap();
    assert!(result.is_none());
    // No pause happened, so nothing was written.
    assert_eq!(out.text(), "");
    assert_eq!(ev.variable("erract").unwrap().print(), "true");
}
