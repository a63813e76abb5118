// Turtle primitives against a host with and without a canvas.

use std::cell::RefCell;
use std::rc::Rc;

use crate::common::*;
use qlogo_compiler::primitives::TurtleOp;
use qlogo_compiler::{ErrorCode, Evaluator, Host};

/// Tracks position and heading; moves along the heading like a turtle.
#[derive(Clone, Default)]
struct Canvas {
    state: Rc<RefCell<(f64, f64, f64, bool)>>,
}

impl Host for Canvas {
    fn write(&mut self, _text: &str) {}

    fn turtle(&mut self, op: TurtleOp, args: &[f64]) -> Result<(), ErrorCode> {
        let mut s = self.state.borrow_mut();
        match op {
            TurtleOp::Forward => {
                let rad = s.2.to_radians();
                s.0 += args[0] * rad.sin();
                s.1 += args[0] * rad.cos();
            }
            TurtleOp::Right => s.2 = (s.2 + args[0]).rem_euclid(360.0),
            TurtleOp::Left => s.2 = (s.2 - args[0]).rem_euclid(360.0),
            TurtleOp::SetXY => {
                s.0 = args[0];
                s.1 = args[1];
            }
            TurtleOp::Home => *s = (0.0, 0.0, 0.0, s.3),
            TurtleOp::PenUp => s.3 = true,
            TurtleOp::PenDown => s.3 = false,
            _ => {}
        }
        Ok(())
    }

    fn set_pos(&mut self, x: f64, y: f64) -> Result<(), ErrorCode> {
        let mut s = self.state.borrow_mut();
        s.0 = x;
        s.1 = y;
        Ok(())
    }

    fn pos(&self) -> (f64, f64) {
        let s = self.state.borrow();
        (s.0, s.1)
    }

    fn heading(&self) -> f64 {
        self.state.borrow().2
    }

    fn pen_down(&self) -> bool {
        !self.state.borrow().3
    }
}

fn canvas() -> (Evaluator, Canvas) {
    let host = Canvas::default();
    (Evaluator::new(host.clone()), host)
}

#[test]
fn test_no_graphics() {
    let (mut ev, _) = setup();
    let message = error_message(&mut ev, vec![p("forward", vec![n(10.0)])]);
    assert_eq!(message, "Graphics not initialized");
    let message = error_message(&mut ev, vec![p("setpos", vec![lst(&["1", "2"])])]);
    assert_eq!(message, "Graphics not initialized");
}

#[test]
fn test_turtle_moves() {
    let (mut ev, _) = canvas();
    run(
        &mut ev,
        vec![
            vec![p("forward", vec![n(10.0)])],
            vec![p("right", vec![n(90.0)])],
        ],
    )
    .unwrap();
    assert_eq!(shown(&mut ev, vec![p("pos", vec![])]), "[0 10]");
    assert_eq!(value(&mut ev, vec![p("heading", vec![])]), "90");

    run(&mut ev, vec![vec![p("setxy", vec![n(3.0), n(4.0)])]]).unwrap();
    assert_eq!(shown(&mut ev, vec![p("pos", vec![])]), "[3 4]");
    run(&mut ev, vec![vec![p("setpos", vec![lst(&["-1", "2"])])]]).unwrap();
    assert_eq!(shown(&mut ev, vec![p("pos", vec![])]), "[-1 2]");
}

#[test]
fn test_turtle_queries() {
    let (mut ev, _) = canvas();
    assert_eq!(value(&mut ev, vec![p("pendownp", vec![])]), "true");
    run(&mut ev, vec![vec![p("penup", vec![])]]).unwrap();
    assert_eq!(value(&mut ev, vec![p("pendown?", vec![])]), "false");
    assert_eq!(value(&mut ev, vec![p("shownp", vec![])]), "true");
    assert_eq!(value(&mut ev, vec![p("towards", vec![lst(&["0", "10"])])]), "0");
}

#[test]
fn test_setpos_needs_position() {
    let (mut ev, _) = canvas();
    let message = error_message(&mut ev, vec![p("setpos", vec![w("abc")])]);
    assert_eq!(message, "setpos doesn't like abc as input");
    let message = error_message(&mut ev, vec![p("towards", vec![lst(&["1"])])]);
    assert_eq!(message, "towards doesn't like [1] as input");
}

#[test]
fn test_turtle_input_must_be_number() {
    let (mut ev, _) = canvas();
    let message = error_message(&mut ev, vec![p("forward", vec![w("far")])]);
    assert_eq!(message, "forward doesn't like far as input");
}
