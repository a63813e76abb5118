// Compiled code reuse and invalidation.

use std::rc::Rc;

use crate::common::*;

#[test]
fn test_list_compiled_once() {
    let (mut ev, out) = setup();
    let line = block(vec![vec![p("print", vec![w("hi")])]]);
    ev.execute(&line).unwrap();
    let misses = ev.cache().misses();
    ev.execute(&line).unwrap();
    ev.execute(&line).unwrap();
    assert_eq!(ev.cache().misses(), misses);
    assert!(ev.cache().hits() >= 2);
    assert_eq!(out.text(), "hi\nhi\nhi\n");
}

#[test]
fn test_same_entry_until_definition() {
    let (mut ev, _) = setup();
    let line = block(vec![vec![p("print", vec![w("hi")])]]);
    let first = ev.compile_list(&line).unwrap();
    let again = ev.compile_list(&line).unwrap();
    assert!(Rc::ptr_eq(&first, &again));

    define(&mut ev, "anything", &[], vec![vec![p("stop", vec![])]]);
    let after = ev.compile_list(&line).unwrap();
    assert_ne!(first.id(), after.id());
}

#[test]
fn test_stale_code_is_released() {
    let (mut ev, _) = setup();
    let line = block(vec![vec![p("print", vec![w("hi")])]]);
    let weak = Rc::downgrade(&ev.compile_list(&line).unwrap());
    assert!(weak.upgrade().is_some());

    define(&mut ev, "anything", &[], vec![vec![p("stop", vec![])]]);
    let _fresh = ev.compile_list(&line).unwrap();
    assert!(weak.upgrade().is_none());
}

#[test]
fn test_redefinition_drops_old_body() {
    let (mut ev, _) = setup();
    let old = define(&mut ev, "f", &[], vec![vec![p("output", vec![n(1.0)])]]);
    run(&mut ev, vec![vec![p("print", vec![call("f", vec![])])]]).unwrap();
    let before = ev.cache().len();

    define(&mut ev, "f", &[], vec![vec![p("output", vec![n(2.0)])]]);
    assert_eq!(ev.cache().len(), before - 1);
    drop(old);
}

#[test]
fn test_invalidate() {
    let (mut ev, _) = setup();
    let line = block(vec![vec![p("print", vec![w("hi")])]]);
    ev.execute(&line).unwrap();
    let len = ev.cache().len();
    ev.invalidate(&line);
    assert_eq!(ev.cache().len(), len - 1);
    ev.execute(&line).unwrap();
    assert_eq!(ev.cache().len(), len);
}

#[test]
fn test_backend_name() {
    let (ev, _) = setup();
    assert_eq!(ev.backend_name(), "machine");
}
