//! Shared test helpers.
//!
//! There is no parser in this crate, so tests build node groups directly
//! with a small DSL and attach them to lists the way a parser would.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use qlogo_compiler::{
    primitives, AstNode, CompilerConfig, DatumP, Evaluator, Host, List, PauseReply, Procedure,
    Signal,
};

/// Records everything written and answers PAUSE from a queue.
#[derive(Clone, Default)]
pub struct Recorder {
    pub out: Rc<RefCell<String>>,
    pub replies: Rc<RefCell<VecDeque<PauseReply>>>,
}

impl Recorder {
    pub fn text(&self) -> String {
        self.out.borrow().clone()
    }

    pub fn reply(&self, reply: PauseReply) {
        self.replies.borrow_mut().push_back(reply);
    }
}

impl Host for Recorder {
    fn write(&mut self, text: &str) {
        self.out.borrow_mut().push_str(text);
    }

    fn pause(&mut self) -> PauseReply {
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or(PauseReply::Toplevel)
    }
}

pub fn setup() -> (Evaluator, Recorder) {
    let host = Recorder::default();
    (Evaluator::new(host.clone()), host)
}

pub fn setup_with(config: CompilerConfig) -> (Evaluator, Recorder) {
    let host = Recorder::default();
    (Evaluator::with_config(host.clone(), config), host)
}

// === Nodes ===

/// A quoted word literal.
pub fn w(text: &str) -> DatumP {
    AstNode::literal(DatumP::word(text))
}

pub fn n(value: f64) -> DatumP {
    AstNode::literal(DatumP::number(value))
}

/// `:name`
pub fn var(name: &str) -> DatumP {
    AstNode::value_of(name)
}

/// A primitive call.
pub fn p(name: &str, children: Vec<DatumP>) -> DatumP {
    primitives::node(name, children).unwrap_or_else(|| panic!("no primitive {}", name))
}

/// A quoted list of words, e.g. `[a b c]`.
pub fn lst(items: &[&str]) -> DatumP {
    AstNode::literal(List::from_vec(items.iter().map(|w| DatumP::word(w)).collect()))
}

/// A user procedure call.
pub fn call(name: &str, args: Vec<DatumP>) -> DatumP {
    AstNode::procedure_call(name, args)
}

// === Lists ===

/// An instruction list with its parse attached, one group per line.
pub fn block(lines: Vec<Vec<DatumP>>) -> DatumP {
    let items: Vec<DatumP> = lines
        .iter()
        .flatten()
        .map(|node| match node.as_node() {
            Some(ast) => ast.name().clone(),
            None => node.clone(),
        })
        .collect();
    let list = List::from_vec(items);
    if let Some(l) = list.as_list() {
        l.attach_ast(Rc::new(lines));
    }
    list
}

/// A literal instruction list operand, e.g. the body of REPEAT.
pub fn q(lines: Vec<Vec<DatumP>>) -> DatumP {
    AstNode::literal(block(lines))
}

/// A one-line literal instruction list.
pub fn q1(nodes: Vec<DatumP>) -> DatumP {
    q(vec![nodes])
}

// === Running ===

pub fn define(
    ev: &mut Evaluator,
    name: &str,
    params: &[&str],
    lines: Vec<Vec<DatumP>>,
) -> DatumP {
    let params = params.iter().map(|s| s.to_string()).collect();
    let procedure = Procedure::new(name, params, block(lines)).into_datum();
    ev.define_procedure(procedure.clone());
    procedure
}

pub fn run(ev: &mut Evaluator, lines: Vec<Vec<DatumP>>) -> Result<Option<DatumP>, Signal> {
    let list = block(lines);
    ev.execute(&list)
}

/// Run one line and print its value.
pub fn value(ev: &mut Evaluator, nodes: Vec<DatumP>) -> String {
    match run(ev, vec![nodes]) {
        Ok(Some(v)) => v.print(),
        Ok(None) => panic!("no value"),
        Err(sig) => panic!("signal: {}", sig),
    }
}

/// Run one line and show its value.
pub fn shown(ev: &mut Evaluator, nodes: Vec<DatumP>) -> String {
    match run(ev, vec![nodes]) {
        Ok(Some(v)) => v.show(),
        Ok(None) => panic!("no value"),
        Err(sig) => panic!("signal: {}", sig),
    }
}

/// Run one line expecting an uncaught error; returns its message.
pub fn error_message(ev: &mut Evaluator, nodes: Vec<DatumP>) -> String {
    match run(ev, vec![nodes]) {
        Err(Signal::Error { message, .. }) => message,
        Err(other) => panic!("expected an error, got signal {}", other),
        Ok(v) => panic!("expected an error, got {:?}", v.map(|d| d.show())),
    }
}
