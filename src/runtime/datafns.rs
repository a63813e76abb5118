//! Data structure primitives
//!
//! Reached through one bridge helper per operation. Inputs have already
//! been evaluated; a bad input is reported against the calling node.

use super::bridge::key_of;
use super::Evaluator;
use crate::error::ErrorCode;
use crate::primitives::DataOp;
use crate::value::{Datum, DatumP, List};

/// Nesting limit for structural comparison, so cyclic lists terminate.
const MAX_COMPARE_DEPTH: usize = 1000;

/// Largest array ARRAY will build.
const MAX_ARRAY_SIZE: usize = 1 << 24;

fn arg(args: &[DatumP], i: usize) -> DatumP {
    args.get(i).cloned().unwrap_or_else(DatumP::nothing)
}

fn integer(d: &DatumP) -> Option<i64> {
    let n = d.as_word()?.number()?;
    (n.fract() == 0.0 && n.abs() < 9.0e15).then_some(n as i64)
}

/// An array origin: an integer that fits in `i32`.
fn origin(d: &DatumP) -> Option<i32> {
    integer(d).and_then(|n| i32::try_from(n).ok())
}

fn truth(b: bool) -> DatumP {
    DatumP::boolean(b)
}

/// Logo equality: numbers by value, words ignoring case, lists by
/// structure, arrays by identity.
pub fn equal(a: &DatumP, b: &DatumP) -> bool {
    equal_at(a, b, 0)
}

fn equal_at(a: &DatumP, b: &DatumP, depth: usize) -> bool {
    if depth > MAX_COMPARE_DEPTH {
        return false;
    }
    match (a.datum(), b.datum()) {
        (Datum::Word(x), Datum::Word(y)) => match (x.number(), y.number()) {
            (Some(p), Some(q)) => p == q,
            _ => x.key() == y.key(),
        },
        (Datum::List(x), Datum::List(y)) => {
            if a.ptr_eq(b) {
                return true;
            }
            let (xs, ys) = (x.to_vec(), y.to_vec());
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(&ys)
                    .all(|(p, q)| equal_at(p, q, depth + 1))
        }
        (Datum::Array(_), Datum::Array(_)) => a.ptr_eq(b),
        _ => false,
    }
}

/// True if `needle` is `haystack` or occurs anywhere inside it.
fn contains(haystack: &DatumP, needle: &DatumP, depth: usize) -> bool {
    if haystack.ptr_eq(needle) {
        return true;
    }
    if depth > MAX_COMPARE_DEPTH {
        return false;
    }
    let items = match haystack.datum() {
        Datum::List(list) => list.to_vec(),
        Datum::Array(array) => array.to_vec(),
        _ => return false,
    };
    items.iter().any(|item| contains(item, needle, depth + 1))
}

fn first_char(text: &str) -> Option<String> {
    text.chars().next().map(String::from)
}

pub(super) fn apply(ev: &mut Evaluator, op: DataOp, node: &DatumP, args: &[DatumP]) -> DatumP {
    let a = arg(args, 0);
    let b = arg(args, 1);

    match op {
        // === Constructors ===
        DataOp::Word => {
            let mut text = String::new();
            for item in args {
                match item.as_word() {
                    Some(w) => text.push_str(w.text()),
                    None => return ev.doesnt_like(node, item),
                }
            }
            DatumP::word(&text)
        }
        DataOp::List => List::from_vec(args.to_vec()),
        DataOp::Sentence => {
            let mut items = Vec::new();
            for item in args {
                match item.datum() {
                    Datum::List(list) => items.extend(list.iter()),
                    Datum::Word(_) => items.push(item.clone()),
                    _ => return ev.doesnt_like(node, item),
                }
            }
            List::from_vec(items)
        }
        DataOp::Fput => match (b.datum(), a.as_word()) {
            (Datum::List(_), _) => List::cons(a.clone(), b.clone()),
            (Datum::Word(w), Some(head)) => DatumP::word(&format!("{}{}", head.text(), w.text())),
            _ => ev.doesnt_like(node, &b),
        },
        DataOp::Lput => match (b.datum(), a.as_word()) {
            (Datum::List(list), _) => {
                let mut items = list.to_vec();
                items.push(a.clone());
                List::from_vec(items)
            }
            (Datum::Word(w), Some(tail)) => DatumP::word(&format!("{}{}", w.text(), tail.text())),
            _ => ev.doesnt_like(node, &b),
        },
        DataOp::Array => {
            let size = match integer(&a).and_then(|n| usize::try_from(n).ok()) {
                Some(n) if n <= MAX_ARRAY_SIZE => n,
                _ => return ev.doesnt_like(node, &a),
            };
            let origin = match args.get(1) {
                Some(o) => match origin(o) {
                    Some(n) => n,
                    None => return ev.doesnt_like(node, o),
                },
                None => 1,
            };
            DatumP::array(origin, (0..size).map(|_| List::empty()).collect())
        }
        DataOp::ListToArray => {
            let Some(list) = a.as_list() else {
                return ev.doesnt_like(node, &a);
            };
            let origin = match args.get(1) {
                Some(o) => match origin(o) {
                    Some(n) => n,
                    None => return ev.doesnt_like(node, o),
                },
                None => 1,
            };
            DatumP::array(origin, list.to_vec())
        }
        DataOp::ArrayToList => match a.as_array() {
            Some(array) => List::from_vec(array.to_vec()),
            None => ev.doesnt_like(node, &a),
        },

        // === Selectors ===
        DataOp::First => match a.datum() {
            Datum::Word(w) => match first_char(w.text()) {
                Some(c) => DatumP::word(&c),
                None => ev.doesnt_like(node, &a),
            },
            Datum::List(list) => match list.first() {
                Some(head) => head,
                None => ev.doesnt_like(node, &a),
            },
            Datum::Array(array) => match array.get(array.origin() as i64) {
                Some(item) => item,
                None => ev.doesnt_like(node, &a),
            },
            _ => ev.doesnt_like(node, &a),
        },
        DataOp::Last => match a.datum() {
            Datum::Word(w) => match w.text().chars().last() {
                Some(c) => DatumP::word(&c.to_string()),
                None => ev.doesnt_like(node, &a),
            },
            Datum::List(list) => match list.last() {
                Some(item) => item,
                None => ev.doesnt_like(node, &a),
            },
            Datum::Array(array) if !array.is_empty() => {
                let index = array.origin() as i64 + array.len() as i64 - 1;
                array.get(index).unwrap_or_else(DatumP::nothing)
            }
            _ => ev.doesnt_like(node, &a),
        },
        DataOp::ButFirst => match a.datum() {
            Datum::Word(w) if !w.is_empty() => {
                let rest: String = w.text().chars().skip(1).collect();
                DatumP::word(&rest)
            }
            Datum::List(list) => match list.butfirst() {
                Some(tail) => tail,
                None => ev.doesnt_like(node, &a),
            },
            _ => ev.doesnt_like(node, &a),
        },
        DataOp::ButLast => match a.datum() {
            Datum::Word(w) if !w.is_empty() => {
                let mut chars: Vec<char> = w.text().chars().collect();
                chars.pop();
                DatumP::word(&chars.into_iter().collect::<String>())
            }
            Datum::List(list) if !list.is_empty() => {
                let mut items = list.to_vec();
                items.pop();
                List::from_vec(items)
            }
            _ => ev.doesnt_like(node, &a),
        },
        DataOp::Item => {
            let Some(index) = integer(&a) else {
                return ev.doesnt_like(node, &a);
            };
            let found = match b.datum() {
                Datum::Word(w) if index >= 1 => w
                    .text()
                    .chars()
                    .nth(index as usize - 1)
                    .map(|c| DatumP::word(&c.to_string())),
                Datum::List(list) if index >= 1 => list.item(index as usize),
                Datum::Array(array) => array.get(index),
                Datum::Word(_) | Datum::List(_) => None,
                _ => return ev.doesnt_like(node, &b),
            };
            match found {
                Some(item) => item,
                None => ev.doesnt_like(node, &a),
            }
        }

        // === Mutators ===
        DataOp::SetItem | DataOp::DotSetItem => {
            let value = arg(args, 2);
            let Some(array) = b.as_array() else {
                return ev.doesnt_like(node, &b);
            };
            if op == DataOp::SetItem && contains(&value, &b, 0) {
                return ev.doesnt_like(node, &value);
            }
            match integer(&a) {
                Some(index) if array.set(index, value) => node.clone(),
                _ => ev.doesnt_like(node, &a),
            }
        }
        DataOp::DotSetFirst => match a.as_list() {
            Some(list) if list.set_first(b.clone()) => node.clone(),
            _ => ev.doesnt_like(node, &a),
        },
        DataOp::DotSetBf => match a.as_list() {
            Some(list) if b.as_list().is_some() => {
                if list.set_butfirst(b.clone()) {
                    node.clone()
                } else {
                    ev.doesnt_like(node, &a)
                }
            }
            Some(_) => ev.doesnt_like(node, &b),
            None => ev.doesnt_like(node, &a),
        },

        // === Predicates ===
        DataOp::WordP => truth(a.as_word().is_some()),
        DataOp::ListP => truth(a.as_list().is_some()),
        DataOp::ArrayP => truth(a.as_array().is_some()),
        DataOp::EmptyP => truth(match a.datum() {
            Datum::Word(w) => w.is_empty(),
            Datum::List(list) => list.is_empty(),
            _ => false,
        }),
        DataOp::EqualP => truth(equal(&a, &b)),
        DataOp::NotEqualP => truth(!equal(&a, &b)),
        DataOp::BeforeP => match (a.as_word(), b.as_word()) {
            (Some(x), Some(y)) => truth(x.key() < y.key()),
            (None, _) => ev.doesnt_like(node, &a),
            _ => ev.doesnt_like(node, &b),
        },
        DataOp::DotEq => truth(a.ptr_eq(&b)),
        DataOp::MemberP => match b.datum() {
            Datum::List(list) => truth(list.iter().any(|item| equal(&a, &item))),
            Datum::Array(array) => truth(array.to_vec().iter().any(|item| equal(&a, item))),
            Datum::Word(w) => match a.as_word() {
                Some(x) if x.text().chars().count() == 1 => truth(w.key().contains(x.key())),
                _ => truth(false),
            },
            _ => ev.doesnt_like(node, &b),
        },
        DataOp::SubstringP => match (a.as_word(), b.as_word()) {
            (Some(x), Some(y)) => truth(y.key().contains(x.key())),
            _ => truth(false),
        },
        DataOp::NumberP => truth(a.as_word().is_some_and(|w| w.number().is_some())),

        // === Queries ===
        DataOp::Count => match a.datum() {
            Datum::Word(w) => DatumP::number(w.text().chars().count() as f64),
            Datum::List(list) => DatumP::number(list.len() as f64),
            Datum::Array(array) => DatumP::number(array.len() as f64),
            _ => ev.doesnt_like(node, &a),
        },
        DataOp::Ascii => {
            let mut chars = a.as_word().map(|w| w.text().chars()).into_iter().flatten();
            match (chars.next(), chars.next()) {
                (Some(c), None) => DatumP::number(c as u32 as f64),
                _ => ev.doesnt_like(node, &a),
            }
        }
        DataOp::Char => match integer(&a).and_then(|n| u32::try_from(n).ok()).and_then(char::from_u32) {
            Some(c) => DatumP::word(&c.to_string()),
            None => ev.doesnt_like(node, &a),
        },
        DataOp::Member => match b.datum() {
            Datum::List(_) => {
                let mut cell = b.clone();
                loop {
                    let next = match cell.as_list() {
                        Some(list) => match list.first() {
                            Some(head) if equal(&a, &head) => return cell,
                            Some(_) => list.butfirst(),
                            None => None,
                        },
                        None => None,
                    };
                    match next {
                        Some(tail) => cell = tail,
                        None => return List::empty(),
                    }
                }
            }
            Datum::Word(w) => {
                let needle = a.as_word().and_then(|x| {
                    let mut chars = x.text().chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Some(c),
                        _ => None,
                    }
                });
                let text = w.text();
                let found = needle.and_then(|n| {
                    text.chars()
                        .position(|c| c.to_uppercase().eq(n.to_uppercase()))
                });
                match found {
                    Some(pos) => DatumP::word(&text.chars().skip(pos).collect::<String>()),
                    None => DatumP::word(""),
                }
            }
            _ => ev.doesnt_like(node, &b),
        },
        DataOp::Lowercase => match a.as_word() {
            Some(w) => DatumP::word(&w.text().to_lowercase()),
            None => ev.doesnt_like(node, &a),
        },
        DataOp::Uppercase => match a.as_word() {
            Some(w) => DatumP::word(&w.text().to_uppercase()),
            None => ev.doesnt_like(node, &a),
        },

        // === Workspace ===
        DataOp::Thing => {
            let key = key_of(&a);
            match ev.frames.get(&key).filter(|v| v.is_data()) {
                Some(value) => value,
                None => ev.raise(ErrorCode::NoValue, &[&a]),
            }
        }
    }
}
