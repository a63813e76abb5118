// REPEAT, FOREVER, IF and friends, RUN, and GOTO.

use crate::common::*;
use qlogo_compiler::Signal;

#[test]
fn test_repeat_counts_from_one() {
    let (mut ev, out) = setup();
    run(
        &mut ev,
        vec![vec![p(
            "repeat",
            vec![n(3.0), q1(vec![p("print", vec![p("repcount", vec![])])])],
        )]],
    )
    .unwrap();
    assert_eq!(out.text(), "1\n2\n3\n");
    assert_eq!(ev.repcount(), -1.0);
}

#[test]
fn test_repcount_outside_loop() {
    let (mut ev, _) = setup();
    assert_eq!(value(&mut ev, vec![p("repcount", vec![])]), "-1");
}

#[test]
fn test_nested_repeat_restores_outer_count() {
    let (mut ev, out) = setup();
    let inner = p(
        "repeat",
        vec![n(2.0), q1(vec![p("type", vec![w("x")])])],
    );
    let outer_body = q1(vec![inner, p("print", vec![p("repcount", vec![])])]);
    run(&mut ev, vec![vec![p("repeat", vec![n(2.0), outer_body])]]).unwrap();
    assert_eq!(out.text(), "xx1\nxx2\n");
}

#[test]
fn test_repeat_zero_times() {
    let (mut ev, out) = setup();
    run(
        &mut ev,
        vec![vec![p("repeat", vec![n(0.0), q1(vec![p("print", vec![w("no")])])])]],
    )
    .unwrap();
    assert_eq!(out.text(), "");
}

#[test]
fn test_repeat_value_from_last_pass() {
    let (mut ev, _) = setup();
    assert_eq!(
        value(&mut ev, vec![p("repeat", vec![n(1.0), q1(vec![n(5.0)])])]),
        "5"
    );
    let message = error_message(&mut ev, vec![p("repeat", vec![n(2.0), q1(vec![n(5.0)])])]);
    assert_eq!(message, "You don't say what to do with 5");
}

#[test]
fn test_repeat_rejects_bad_count() {
    let (mut ev, _) = setup();
    let message = error_message(
        &mut ev,
        vec![p("repeat", vec![n(-1.0), q1(vec![p("print", vec![w("a")])])])],
    );
    assert_eq!(message, "repeat doesn't like -1 as input");
    let message = error_message(
        &mut ev,
        vec![p("repeat", vec![n(1.5), q1(vec![p("print", vec![w("a")])])])],
    );
    assert_eq!(message, "repeat doesn't like 1.5 as input");
}

#[test]
fn test_if_and_ifelse() {
    let (mut ev, out) = setup();
    run(
        &mut ev,
        vec![
            vec![p(
                "if",
                vec![
                    p("lessp", vec![n(1.0), n(2.0)]),
                    q1(vec![p("print", vec![w("yes")])]),
                ],
            )],
            vec![p(
                "if",
                vec![
                    p("greaterp", vec![n(1.0), n(2.0)]),
                    q1(vec![p("print", vec![w("no")])]),
                ],
            )],
        ],
    )
    .unwrap();
    assert_eq!(out.text(), "yes\n");

    let choose = |ev: &mut qlogo_compiler::Evaluator, cond: &str| {
        value(
            ev,
            vec![p("ifelse", vec![w(cond), q1(vec![n(5.0)]), q1(vec![n(6.0)])])],
        )
    };
    assert_eq!(choose(&mut ev, "true"), "5");
    assert_eq!(choose(&mut ev, "FALSE"), "6");
}

#[test]
fn test_if_condition_list_is_run() {
    let (mut ev, _) = setup();
    let cond = q1(vec![p("lessp", vec![n(1.0), n(2.0)])]);
    assert_eq!(
        value(&mut ev, vec![p("ifelse", vec![cond, q1(vec![n(1.0)]), q1(vec![n(2.0)])])]),
        "1"
    );
}

#[test]
fn test_if_rejects_non_boolean() {
    let (mut ev, _) = setup();
    let message = error_message(
        &mut ev,
        vec![p("if", vec![w("maybe"), q1(vec![p("print", vec![w("x")])])])],
    );
    assert_eq!(message, "if doesn't like maybe as input");
}

#[test]
fn test_test_and_iftrue() {
    let (mut ev, out) = setup();
    run(
        &mut ev,
        vec![
            vec![p("test", vec![p("lessp", vec![n(1.0), n(2.0)])])],
            vec![p("iftrue", vec![q1(vec![p("print", vec![w("yes")])])])],
            vec![p("iffalse", vec![q1(vec![p("print", vec![w("no")])])])],
        ],
    )
    .unwrap();
    assert_eq!(out.text(), "yes\n");
}

#[test]
fn test_iftrue_without_test() {
    let (mut ev, _) = setup();
    let message = error_message(
        &mut ev,
        vec![p("iftrue", vec![q1(vec![p("print", vec![w("yes")])])])],
    );
    assert_eq!(message, "iftrue without TEST");
}

#[test]
fn test_and_or_not() {
    let (mut ev, _) = setup();
    assert_eq!(value(&mut ev, vec![p("and", vec![w("true"), w("false")])]), "false");
    assert_eq!(value(&mut ev, vec![p("or", vec![w("false"), w("true")])]), "true");
    assert_eq!(value(&mut ev, vec![p("and", vec![])]), "true");
    assert_eq!(value(&mut ev, vec![p("or", vec![])]), "false");
    assert_eq!(value(&mut ev, vec![p("not", vec![w("false")])]), "true");
    let run_me = q1(vec![p("lessp", vec![n(1.0), n(2.0)])]);
    assert_eq!(value(&mut ev, vec![p("or", vec![w("false"), run_me])]), "true");
}

#[test]
fn test_and_stops_at_first_false() {
    let (mut ev, out) = setup();
    let noisy = q1(vec![p("print", vec![w("ran")]), w("true")]);
    assert_eq!(value(&mut ev, vec![p("and", vec![w("false"), noisy])]), "false");
    assert_eq!(out.text(), "");
}

#[test]
fn test_and_rejects_non_boolean() {
    let (mut ev, _) = setup();
    let message = error_message(&mut ev, vec![p("and", vec![n(1.0), w("true")])]);
    assert_eq!(message, "and doesn't like 1 as input");
}

#[test]
fn test_run_and_runresult() {
    let (mut ev, out) = setup();
    run(&mut ev, vec![vec![p("run", vec![q1(vec![p("print", vec![n(7.0)])])])]]).unwrap();
    assert_eq!(out.text(), "7\n");

    let sum = q1(vec![p("sum", vec![n(1.0), n(2.0)])]);
    assert_eq!(value(&mut ev, vec![p("run", vec![sum])]), "3");

    let sum = q1(vec![p("sum", vec![n(1.0), n(2.0)])]);
    assert_eq!(shown(&mut ev, vec![p("runresult", vec![sum])]), "[3]");
    let quiet = q1(vec![p("type", vec![])]);
    assert_eq!(shown(&mut ev, vec![p("runresult", vec![quiet])]), "[]");
}

#[test]
fn test_forever_until_stop() {
    let (mut ev, out) = setup();
    run(&mut ev, vec![vec![p("make", vec![w("i"), n(0.0)])]]).unwrap();
    let body = q1(vec![
        p("make", vec![w("i"), p("sum", vec![var("i"), n(1.0)])]),
        p("print", vec![var("i")]),
        p(
            "if",
            vec![
                p("equalp", vec![var("i"), n(3.0)]),
                q1(vec![p("stop", vec![])]),
            ],
        ),
    ]);
    define(&mut ev, "count3", &[], vec![vec![p("forever", vec![body])]]);
    run(&mut ev, vec![vec![call("count3", vec![])]]).unwrap();
    assert_eq!(out.text(), "1\n2\n3\n");
    assert_eq!(ev.repcount(), -1.0);
}

#[test]
fn test_goto_skips_to_tag() {
    let (mut ev, out) = setup();
    define(
        &mut ev,
        "jumper",
        &[],
        vec![
            vec![p("goto", vec![w("t1")])],
            vec![p("tag", vec![w("y2")])],
            vec![p("print", vec![lst(&["this", "shouldn't", "print"])])],
            vec![p("tag", vec![w("t1")])],
            vec![p("print", vec![lst(&["this", "should", "print"])])],
        ],
    );
    run(&mut ev, vec![vec![call("jumper", vec![])]]).unwrap();
    assert_eq!(out.text(), "this should print\n");
}

#[test]
fn test_goto_backwards_loop() {
    let (mut ev, out) = setup();
    define(
        &mut ev,
        "loop",
        &["n"],
        vec![
            vec![p("tag", vec![w("top")])],
            vec![p(
                "if",
                vec![
                    p("equalp", vec![var("n"), n(0.0)]),
                    q1(vec![p("stop", vec![])]),
                ],
            )],
            vec![p("type", vec![var("n")])],
            vec![p("make", vec![w("n"), p("difference", vec![var("n"), n(1.0)])])],
            vec![p("goto", vec![w("top")])],
        ],
    );
    run(&mut ev, vec![vec![call("loop", vec![n(3.0)])]]).unwrap();
    assert_eq!(out.text(), "321");
}

#[test]
fn test_goto_unknown_tag() {
    let (mut ev, out) = setup();
    define(
        &mut ev,
        "lost",
        &[],
        vec![
            vec![p("goto", vec![w("tag2")])],
            vec![p("tag", vec![w("tag1")])],
            vec![p("print", vec![w("unreachable")])],
        ],
    );
    let err = run(&mut ev, vec![vec![call("lost", vec![])]]).unwrap_err();
    match err {
        Signal::Error { message, .. } => assert_eq!(message, "goto doesn't like tag2 as input"),
        other => panic!("unexpected {}", other),
    }
    assert_eq!(out.text(), "");
}

#[test]
fn test_goto_outside_procedure() {
    let (mut ev, _) = setup();
    let message = error_message(&mut ev, vec![p("goto", vec![w("somewhere")])]);
    assert_eq!(message, "Can only use goto inside a procedure");
}

#[test]
fn test_goto_runs_entry_block_first() {
    // to hop  tag "a  print 1  goto "b  tag "b  print 2  end
    let (mut ev, out) = setup();
    define(
        &mut ev,
        "hop",
        &[],
        vec![
            vec![p("tag", vec![w("a")])],
            vec![p("print", vec![n(1.0)])],
            vec![p("goto", vec![w("b")])],
            vec![p("tag", vec![w("b")])],
            vec![p("print", vec![n(2.0)])],
        ],
    );
    run(&mut ev, vec![vec![call("hop", vec![])]]).unwrap();
    assert_eq!(out.text(), "1\n2\n");
}
