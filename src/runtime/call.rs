//! Running lists and procedures
//!
//! This is where flow-control tokens are consumed. A procedure call turns
//! OUTPUT and STOP into its result, re-enters its body for GOTO, and loops
//! on tail-call continuations instead of recursing. CATCH compares errors
//! against its tag. Everything else passes tokens through untouched.

use tracing::trace;

use super::bridge::key_of;
use super::{Evaluator, PauseReply};
use crate::error::ErrorCode;
use crate::primitives::Generator;
use crate::value::{Datum, DatumP, List};

/// What the result of a procedure call has to satisfy, decided by the
/// OUTPUT or STOP that made the last tail call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Call,
    Stop,
    Output,
    MaybeOutput,
}

impl Exit {
    fn of(source: &DatumP) -> Exit {
        match source.as_node().map(|n| n.generator()) {
            Some(Generator::Stop) => Exit::Stop,
            Some(Generator::Output) => Exit::Output,
            Some(Generator::MaybeOutput) => Exit::MaybeOutput,
            _ => Exit::Call,
        }
    }
}

impl Evaluator {
    /// Compile (or fetch) and run an instruction list in the current frame.
    pub fn run_list(&mut self, list: &DatumP) -> DatumP {
        let entry = match self.compile_list(list) {
            Ok(entry) => entry,
            Err(err) => return self.compile_failure(list, err),
        };
        let saved = self.frames.top_mut().line.replace(list.clone());
        let result = entry.call(self, 0);
        self.frames.top_mut().line = saved;
        result
    }

    /// Call the user procedure named by `node` with evaluated `args`.
    pub fn run_procedure(&mut self, node: &DatumP, args: Vec<DatumP>) -> DatumP {
        let mut call = node.clone();
        let mut args = args;
        let mut exit = Exit::Call;
        let mut exit_source: Option<DatumP> = None;

        loop {
            let key = match call.as_node() {
                Some(ast) => ast.key(),
                None => key_of(&call),
            };
            let Some(procedure) = self.procedures.get(&key).cloned() else {
                return self.raise(ErrorCode::NoHow, &[&call]);
            };
            if self.frames.depth() >= self.config.max_depth {
                return self.raise(ErrorCode::StackOverflow, &[]);
            }

            let result = self.invoke(&procedure, &call, args);
            let value = match result.datum() {
                Datum::Continuation(token) => {
                    trace!(from = %key, to = ?token.call, "tail call");
                    exit = Exit::of(&token.source);
                    exit_source = Some(token.source.clone());
                    call = token.call.clone();
                    args = token.args.clone();
                    continue;
                }
                Datum::Return(token) => token.value.clone(),
                Datum::Error(_) => return result.clone(),
                _ if result.is_data() => return self.dont_say(&result),
                _ => None,
            };

            return match (exit, value) {
                (Exit::Stop, Some(value)) => self.dont_say(&value),
                (Exit::Output, None) => {
                    let source = exit_source.unwrap_or_else(|| node.clone());
                    self.didnt_output(&call, &source)
                }
                (_, Some(value)) => value,
                (_, None) => node.clone(),
            };
        }
    }

    /// One activation: check the input count, bind inputs in a new frame,
    /// run the body and follow GOTOs.
    fn invoke(&mut self, procedure: &DatumP, call: &DatumP, args: Vec<DatumP>) -> DatumP {
        let Some(proc) = procedure.as_procedure() else {
            return self.raise(ErrorCode::NoHow, &[call]);
        };
        if args.len() < proc.min_inputs() {
            return self.raise(ErrorCode::NotEnoughInputs, &[call]);
        }
        if proc.max_inputs().is_some_and(|max| args.len() > max) {
            return self.raise(ErrorCode::TooManyInputs, &[call]);
        }

        self.frames.push(procedure.clone(), call.clone());
        let result = self.run_body(procedure, call, args);
        self.frames.pop();
        result
    }

    fn run_body(&mut self, procedure: &DatumP, call: &DatumP, args: Vec<DatumP>) -> DatumP {
        let Some(proc) = procedure.as_procedure() else {
            return self.raise(ErrorCode::NoHow, &[call]);
        };
        let mut args = args.into_iter();
        for name in proc.required() {
            let value = args.next().unwrap_or_else(DatumP::nothing);
            self.frames.bind_local(name, value);
        }
        for param in proc.optional() {
            let value = match args.next() {
                Some(value) => value,
                None => {
                    // Defaults run in the new frame and see earlier inputs.
                    let value = self.run_list(&param.default);
                    if value.is_flow_control() {
                        return value;
                    }
                    if !value.is_data() {
                        return self.didnt_output(&param.default, call);
                    }
                    value
                }
            };
            self.frames.bind_local(&param.name, value);
        }
        if let Some(rest) = proc.rest() {
            let rest_list = List::from_vec(args.collect());
            self.frames.bind_local(rest, rest_list);
        }

        let body = proc.body().clone();
        let entry = match self.compile_source(&body, Some(procedure)) {
            Ok(entry) => entry,
            Err(err) => return self.compile_failure(&body, err),
        };
        self.frames.top_mut().line = Some(body);

        let mut block = 0;
        loop {
            let result = entry.call(self, block);
            let Datum::Goto(token) = result.datum() else {
                return result.clone();
            };
            match proc.block_for_tag(&key_of(&token.tag)) {
                Some(target) => {
                    trace!(procedure = proc.name(), block = target, "goto");
                    block = target;
                }
                None => {
                    let (source, tag) = (token.source.clone(), token.tag.clone());
                    return self.doesnt_like(&source, &tag);
                }
            }
        }
    }

    /// RUNRESULT: `[value]` or `[]`.
    pub(crate) fn run_result(&mut self, list: &DatumP) -> DatumP {
        let result = self.run_list(list);
        if result.is_flow_control() {
            return result;
        }
        if result.is_data() {
            return List::from_vec(vec![result]);
        }
        List::empty()
    }

    /// Ask the host for a replacement value.
    pub(crate) fn pause(&mut self) -> DatumP {
        match self.host.pause() {
            PauseReply::Value(value) => value,
            PauseReply::Toplevel => self.custom(&DatumP::word("TOPLEVEL"), None),
        }
    }

    /// True if ERRACT holds a value that asks for a pause.
    pub(crate) fn erract_set(&self) -> bool {
        match self.frames.get("ERRACT") {
            Some(value) => match value.datum() {
                Datum::Word(w) => !w.is_empty() && w.boolean() != Some(false),
                Datum::List(l) => !l.is_empty(),
                Datum::Array(_) => true,
                _ => false,
            },
            None => false,
        }
    }

    /// Detach ERRACT for the duration of a CATCH; returns the old value.
    pub(crate) fn begin_catch(&mut self) -> DatumP {
        let stash = self.frames.get("ERRACT").unwrap_or_else(DatumP::nothing);
        if stash.is_data() {
            self.frames.set("ERRACT", DatumP::nothing());
        }
        stash
    }

    /// Finish a CATCH: restore ERRACT and decide whether `result` is ours.
    ///
    /// A CATCH "ERROR takes any error except an uncaught THROW of another
    /// tag, and outputs nothing. A THROW whose tag matches is cleared and its
    /// value becomes the output. Anything else goes on up.
    pub(crate) fn end_catch(
        &mut self,
        stash: &DatumP,
        tag: &DatumP,
        node: &DatumP,
        result: DatumP,
    ) -> DatumP {
        if stash.is_data() {
            self.frames.set("ERRACT", stash.clone());
        }
        let Some(err) = result.as_error() else {
            return result;
        };
        let catch_key = key_of(tag);
        let thrown_key = err.tag_key();

        if catch_key == "ERROR" && (err.code != ErrorCode::NoCatch || thrown_key == "ERROR") {
            return node.clone();
        }
        if err.code == ErrorCode::NoCatch && thrown_key == catch_key {
            let value = err.output.clone().unwrap_or_else(|| node.clone());
            self.current_error = None;
            return value;
        }
        result
    }

    /// ERROR: `[code message procedure line]` for the last error, then
    /// forget it. `[]` if there is none.
    pub(crate) fn error_list(&mut self) -> DatumP {
        let Some(error) = self.current_error.take() else {
            return List::empty();
        };
        let Some(record) = error.as_error() else {
            return List::empty();
        };
        let procedure = match &record.procedure {
            Some(node) => node.display_name(),
            None => List::empty(),
        };
        let line = record.line.clone().unwrap_or_else(List::empty);
        List::from_vec(vec![
            DatumP::number(record.code.code() as f64),
            record.message.clone(),
            procedure,
            line,
        ])
    }
}
