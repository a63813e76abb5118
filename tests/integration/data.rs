// Words, lists and arrays through the data primitives.

use crate::common::*;

#[test]
fn test_selectors() {
    let (mut ev, _) = setup();
    assert_eq!(value(&mut ev, vec![p("first", vec![lst(&["a", "b", "c"])])]), "a");
    assert_eq!(value(&mut ev, vec![p("last", vec![lst(&["a", "b", "c"])])]), "c");
    assert_eq!(shown(&mut ev, vec![p("butfirst", vec![lst(&["a", "b", "c"])])]), "[b c]");
    assert_eq!(shown(&mut ev, vec![p("butlast", vec![lst(&["a", "b", "c"])])]), "[a b]");
    assert_eq!(value(&mut ev, vec![p("first", vec![w("hello")])]), "h");
    assert_eq!(value(&mut ev, vec![p("bf", vec![w("hello")])]), "ello");
    assert_eq!(value(&mut ev, vec![p("item", vec![n(2.0), lst(&["a", "b", "c"])])]), "b");
    assert_eq!(value(&mut ev, vec![p("item", vec![n(3.0), w("hello")])]), "l");
}

#[test]
fn test_selector_errors() {
    let (mut ev, _) = setup();
    let message = error_message(&mut ev, vec![p("first", vec![lst(&[])])]);
    assert_eq!(message, "first doesn't like [] as input");
    let message = error_message(&mut ev, vec![p("item", vec![n(4.0), lst(&["a", "b"])])]);
    assert_eq!(message, "item doesn't like 4 as input");
    let message = error_message(&mut ev, vec![p("butfirst", vec![w("")])]);
    assert_eq!(message, "butfirst doesn't like  as input");
}

#[test]
fn test_constructors() {
    let (mut ev, _) = setup();
    assert_eq!(
        shown(&mut ev, vec![p("fput", vec![w("x"), lst(&["a", "b"])])]),
        "[x a b]"
    );
    assert_eq!(
        shown(&mut ev, vec![p("lput", vec![w("x"), lst(&["a", "b"])])]),
        "[a b x]"
    );
    assert_eq!(value(&mut ev, vec![p("word", vec![w("ab"), w("cd")])]), "abcd");
    assert_eq!(
        shown(&mut ev, vec![p("list", vec![w("a"), lst(&["b", "c"])])]),
        "[a [b c]]"
    );
    assert_eq!(
        shown(&mut ev, vec![p("sentence", vec![w("a"), lst(&["b", "c"])])]),
        "[a b c]"
    );
    assert_eq!(shown(&mut ev, vec![p("list", vec![])]), "[]");
}

#[test]
fn test_word_rejects_list() {
    let (mut ev, _) = setup();
    let message = error_message(&mut ev, vec![p("word", vec![w("a"), lst(&["b"])])]);
    assert_eq!(message, "word doesn't like [b] as input");
}

#[test]
fn test_predicates() {
    let (mut ev, _) = setup();
    assert_eq!(value(&mut ev, vec![p("equalp", vec![n(1.0), w("1.0")])]), "true");
    assert_eq!(value(&mut ev, vec![p("equalp", vec![w("abc"), w("ABC")])]), "true");
    assert_eq!(
        value(&mut ev, vec![p("equalp", vec![lst(&["a", "b"]), lst(&["A", "b"])])]),
        "true"
    );
    assert_eq!(value(&mut ev, vec![p("notequalp", vec![w("a"), w("b")])]), "true");
    assert_eq!(value(&mut ev, vec![p("wordp", vec![w("a")])]), "true");
    assert_eq!(value(&mut ev, vec![p("listp", vec![w("a")])]), "false");
    assert_eq!(value(&mut ev, vec![p("emptyp", vec![lst(&[])])]), "true");
    assert_eq!(value(&mut ev, vec![p("numberp", vec![w("12.5")])]), "true");
    assert_eq!(value(&mut ev, vec![p("numberp", vec![w("12a")])]), "false");
    assert_eq!(value(&mut ev, vec![p("beforep", vec![w("apple"), w("Banana")])]), "true");
    assert_eq!(
        value(&mut ev, vec![p("memberp", vec![w("b"), lst(&["a", "b", "c"])])]),
        "true"
    );
    assert_eq!(value(&mut ev, vec![p("substringp", vec![w("ell"), w("hello")])]), "true");
}

#[test]
fn test_member_and_count() {
    let (mut ev, _) = setup();
    assert_eq!(
        shown(&mut ev, vec![p("member", vec![w("c"), lst(&["a", "b", "c", "d"])])]),
        "[c d]"
    );
    assert_eq!(shown(&mut ev, vec![p("member", vec![w("z"), lst(&["a"])])]), "[]");
    assert_eq!(value(&mut ev, vec![p("count", vec![lst(&["a", "b", "c"])])]), "3");
    assert_eq!(value(&mut ev, vec![p("count", vec![w("hello")])]), "5");
}

#[test]
fn test_characters() {
    let (mut ev, _) = setup();
    assert_eq!(value(&mut ev, vec![p("ascii", vec![w("A")])]), "65");
    assert_eq!(value(&mut ev, vec![p("char", vec![n(97.0)])]), "a");
    assert_eq!(value(&mut ev, vec![p("uppercase", vec![w("MiXed")])]), "MIXED");
    assert_eq!(value(&mut ev, vec![p("lowercase", vec![w("MiXed")])]), "mixed");
}

#[test]
fn test_arrays() {
    let (mut ev, _) = setup();
    run(
        &mut ev,
        vec![
            vec![p("make", vec![w("arr"), p("array", vec![n(3.0)])])],
            vec![p("setitem", vec![n(2.0), var("arr"), w("x")])],
        ],
    )
    .unwrap();
    assert_eq!(value(&mut ev, vec![p("item", vec![n(2.0), var("arr")])]), "x");
    assert_eq!(shown(&mut ev, vec![var("arr")]), "{[] x []}");
    assert_eq!(value(&mut ev, vec![p("arrayp", vec![var("arr")])]), "true");

    let zero_based = p("listtoarray", vec![lst(&["a", "b"]), n(0.0)]);
    assert_eq!(shown(&mut ev, vec![zero_based]), "{a b}@0");
    let back = p("arraytolist", vec![p("listtoarray", vec![lst(&["a", "b"])])]);
    assert_eq!(shown(&mut ev, vec![back]), "[a b]");
}

#[test]
fn test_setitem_refuses_cycle() {
    let (mut ev, _) = setup();
    run(
        &mut ev,
        vec![vec![p("make", vec![w("arr"), p("array", vec![n(1.0)])])]],
    )
    .unwrap();
    let message = error_message(&mut ev, vec![p("setitem", vec![n(1.0), var("arr"), var("arr")])]);
    assert!(message.starts_with("setitem doesn't like"));
}

#[test]
fn test_thing() {
    let (mut ev, _) = setup();
    run(&mut ev, vec![vec![p("make", vec![w("v"), w("hello")])]]).unwrap();
    assert_eq!(value(&mut ev, vec![p("thing", vec![w("V")])]), "hello");
    let message = error_message(&mut ev, vec![p("thing", vec![w("missing")])]);
    assert_eq!(message, "missing has no value");
}

#[test]
fn test_butfirst_shares_tail() {
    let (mut ev, _) = setup();
    run(
        &mut ev,
        vec![vec![p("make", vec![w("l"), lst(&["a", "b", "c"])])]],
    )
    .unwrap();
    assert_eq!(
        value(&mut ev, vec![p(".eq", vec![p("bf", vec![var("l")]), p("bf", vec![var("l")])])]),
        "true"
    );
}
