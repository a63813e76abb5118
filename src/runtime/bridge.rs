//! Helper dispatch
//!
//! Backends call [`Evaluator::call_helper`] with the helper and its
//! argument registers. Argument types were checked when the function was
//! verified, so accessors here fall back to neutral values rather than
//! failing.

use super::{datafns, Evaluator};
use crate::error::ErrorCode;
use crate::lir::{Helper, WriteMode};
use crate::value::{ContinuationToken, Datum, DatumP, GotoToken, List, ReturnToken};

/// A register value crossing the bridge.
#[derive(Debug, Clone)]
pub enum RegValue {
    F64(f64),
    Bool(bool),
    Datum(DatumP),
    /// Result of a helper with no result
    Void,
}

impl RegValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            RegValue::F64(v) => *v,
            _ => 0.0,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            RegValue::Bool(b) => *b,
            _ => false,
        }
    }

    pub fn to_datum(&self) -> DatumP {
        match self {
            RegValue::Datum(d) => d.clone(),
            _ => DatumP::nothing(),
        }
    }
}

fn datum(args: &[RegValue], i: usize) -> DatumP {
    args.get(i).map(RegValue::to_datum).unwrap_or_else(DatumP::nothing)
}

fn number(args: &[RegValue], i: usize) -> f64 {
    args.get(i).map(RegValue::as_f64).unwrap_or(0.0)
}

fn flag(args: &[RegValue], i: usize) -> bool {
    args.get(i).is_some_and(RegValue::as_bool)
}

fn rest(args: &[RegValue], from: usize) -> Vec<DatumP> {
    args.iter().skip(from).map(RegValue::to_datum).collect()
}

/// Uppercase key of a name word.
pub(crate) fn key_of(name: &DatumP) -> String {
    match name.as_word() {
        Some(w) => w.key().to_string(),
        None => name.print().to_uppercase(),
    }
}

/// A position list `[x y]`.
fn position(pos: &DatumP) -> Option<(f64, f64)> {
    let items = pos.as_list()?.to_vec();
    match items.as_slice() {
        [x, y] => Some((x.as_word()?.number()?, y.as_word()?.number()?)),
        _ => None,
    }
}

impl Evaluator {
    /// Run one helper on behalf of compiled code.
    pub fn call_helper(&mut self, helper: Helper, args: &[RegValue]) -> RegValue {
        use RegValue::{Bool, Datum as D, Void, F64};

        match helper {
            // === Values ===
            Helper::WordFromF64 => D(DatumP::number(number(args, 0))),
            Helper::WordFromBool => D(DatumP::boolean(flag(args, 0))),
            Helper::DoubleOf => {
                let d = datum(args, 0);
                F64(d.as_word().and_then(|w| w.number()).unwrap_or(0.0))
            }
            Helper::DoubleValid => {
                Bool(datum(args, 0).as_word().is_some_and(|w| w.number().is_some()))
            }
            Helper::BoolOf => {
                let d = datum(args, 0);
                Bool(d.as_word().and_then(|w| w.boolean()).unwrap_or(false))
            }
            Helper::BoolValid => {
                Bool(datum(args, 0).as_word().is_some_and(|w| w.boolean().is_some()))
            }
            Helper::HasTag(mask) => Bool(datum(args, 0).has_tag(mask)),

            // === Errors ===
            Helper::ErrDoesntLike => D(self.doesnt_like(&datum(args, 0), &datum(args, 1))),
            Helper::ErrDontSay => D(self.dont_say(&datum(args, 0))),
            Helper::ErrDidntOutput => D(self.didnt_output(&datum(args, 0), &datum(args, 1))),
            Helper::ErrNoValue => D(self.raise(ErrorCode::NoValue, &[&datum(args, 0)])),
            Helper::ErrNotEnoughInputs => {
                D(self.raise(ErrorCode::NotEnoughInputs, &[&datum(args, 0)]))
            }
            Helper::ErrTooManyInputs => {
                D(self.raise(ErrorCode::TooManyInputs, &[&datum(args, 0)]))
            }
            Helper::ErrNoTest => D(self.raise(ErrorCode::NoTest, &[&datum(args, 0)])),
            Helper::ErrToplevel => D(self.custom(&DatumP::word("TOPLEVEL"), None)),
            Helper::ErrSystem => D(self.custom(&DatumP::word("SYSTEM"), None)),
            Helper::Throw => D(self.custom(&datum(args, 0), Some(datum(args, 1)))),

            // === Flow-control tokens ===
            Helper::ReturnToken => {
                let value = datum(args, 1);
                D(ReturnToken {
                    source: datum(args, 0),
                    value: value.is_data().then_some(value),
                }
                .into_datum())
            }
            Helper::GotoToken => D(GotoToken {
                source: datum(args, 0),
                tag: datum(args, 1),
            }
            .into_datum()),
            Helper::ContinuationToken => D(ContinuationToken {
                source: datum(args, 0),
                call: datum(args, 1),
                args: rest(args, 2),
            }
            .into_datum()),

            // === Control bridges ===
            Helper::RunList => D(self.run_list(&datum(args, 0))),
            Helper::RunProcedure => D(self.run_procedure(&datum(args, 0), rest(args, 1))),
            Helper::Pause => D(self.pause()),
            Helper::Erract => Bool(self.erract_set()),
            Helper::WriteError => {
                self.write_error(&datum(args, 0));
                Void
            }
            Helper::Repcount => F64(self.repcount),
            Helper::SetRepcount => {
                self.repcount = number(args, 0);
                Void
            }
            Helper::BeginCatch => D(self.begin_catch()),
            Helper::EndCatch => D(self.end_catch(
                &datum(args, 0),
                &datum(args, 1),
                &datum(args, 2),
                datum(args, 3),
            )),
            Helper::ErrorList => D(self.error_list()),
            Helper::SetTest => {
                self.frames.top_mut().test = Some(flag(args, 0));
                Void
            }
            Helper::IsTested => Bool(self.frames.top().test.is_some()),
            Helper::TestedState => Bool(self.frames.top().test.unwrap_or(false)),
            Helper::RunResult => D(self.run_result(&datum(args, 0))),
            Helper::ContinueToken => {
                D(self.custom(&DatumP::word("PAUSE"), Some(datum(args, 0))))
            }

            // === Workspace ===
            Helper::GetVar => {
                let key = key_of(&datum(args, 0));
                D(self.frames.get(&key).unwrap_or_else(DatumP::nothing))
            }
            Helper::SetVar => {
                let key = key_of(&datum(args, 1));
                self.frames.set(&key, datum(args, 2));
                D(datum(args, 0))
            }
            Helper::MakeLocal => D(self.make_local(&datum(args, 0), &rest(args, 1))),

            // === Data and I/O ===
            Helper::Data(op) => D(datafns::apply(self, op, &datum(args, 0), &rest(args, 1))),
            Helper::Write(mode) => {
                self.write_values(mode, &rest(args, 0));
                Void
            }

            // === Math ===
            Helper::Math(f) => F64(f.apply(number(args, 0), number(args, 1))),
            Helper::Random => {
                let n = number(args, 0) as i64;
                F64(self.rng.i64(0..n.max(1)) as f64)
            }
            Helper::RandomRange => {
                let (start, end) = (number(args, 0) as i64, number(args, 1) as i64);
                F64(self.rng.i64(start..=end.max(start)) as f64)
            }
            Helper::Rerandom => {
                self.rng.seed(0);
                Void
            }
            Helper::RerandomSeed => {
                self.rng.seed(number(args, 0) as u64);
                Void
            }
            Helper::Form => {
                let (value, width, precision) = (number(args, 0), number(args, 1), number(args, 2));
                let width = width.max(0.0) as usize;
                let precision = precision as usize;
                D(DatumP::word(&format!("{:>width$.precision$}", value)))
            }

            // === Turtle ===
            Helper::Turtle(op) => {
                let numbers: Vec<f64> = args.iter().map(RegValue::as_f64).collect();
                match self.host.turtle(op, &numbers) {
                    Ok(()) => D(DatumP::nothing()),
                    Err(code) => D(self.raise(code, &[])),
                }
            }
            Helper::SetPos => {
                let (node, pos) = (datum(args, 0), datum(args, 1));
                match position(&pos) {
                    Some((x, y)) => match self.host.set_pos(x, y) {
                        Ok(()) => D(DatumP::nothing()),
                        Err(code) => D(self.raise(code, &[])),
                    },
                    None => D(self.doesnt_like(&node, &pos)),
                }
            }
            Helper::Pos => {
                let (x, y) = self.host.pos();
                D(List::from_vec(vec![DatumP::number(x), DatumP::number(y)]))
            }
            Helper::Heading => F64(self.host.heading()),
            Helper::Towards => {
                let (node, pos) = (datum(args, 0), datum(args, 1));
                match position(&pos) {
                    Some((x, y)) => {
                        let (cx, cy) = self.host.pos();
                        let heading = (x - cx).atan2(y - cy).to_degrees().rem_euclid(360.0);
                        D(DatumP::number(heading))
                    }
                    None => D(self.doesnt_like(&node, &pos)),
                }
            }
            Helper::PenDownP => Bool(self.host.pen_down()),
            Helper::ShownP => Bool(self.host.shown()),
        }
    }

    /// PRINT, SHOW and TYPE.
    pub(crate) fn write_values(&mut self, mode: WriteMode, values: &[DatumP]) {
        let text = match mode {
            WriteMode::Print => {
                let parts: Vec<String> = values.iter().map(DatumP::print).collect();
                parts.join(" ") + "\n"
            }
            WriteMode::Show => {
                let parts: Vec<String> = values.iter().map(DatumP::show).collect();
                parts.join(" ") + "\n"
            }
            WriteMode::Type => values.iter().map(DatumP::print).collect(),
        };
        self.host.write(&text);
    }

    pub(crate) fn write_error(&mut self, err: &DatumP) {
        if let Some(record) = err.as_error() {
            let text = format!("{}\n", record.message.print());
            self.host.write(&text);
        }
    }

    /// LOCAL: each input is a name or a list of names.
    fn make_local(&mut self, node: &DatumP, names: &[DatumP]) -> DatumP {
        for name in names {
            match name.datum() {
                Datum::Word(w) => {
                    let key = w.key().to_string();
                    self.frames.bind_local(&key, DatumP::nothing());
                }
                Datum::List(list) => {
                    for item in list.iter() {
                        match item.as_word() {
                            Some(w) => {
                                let key = w.key().to_string();
                                self.frames.bind_local(&key, DatumP::nothing());
                            }
                            None => return self.doesnt_like(node, name),
                        }
                    }
                }
                _ => return self.doesnt_like(node, name),
            }
        }
        node.clone()
    }
}
