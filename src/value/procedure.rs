use std::cell::RefCell;

use rustc_hash::FxHashMap;

use super::{Datum, DatumP};

/// An optional input: its name and the instruction list producing the
/// default value.
#[derive(Clone)]
pub struct OptionalParam {
    pub name: String,
    pub default: DatumP,
}

/// A user-defined procedure.
pub struct Procedure {
    name: String,
    required: Vec<String>,
    optional: Vec<OptionalParam>,
    rest: Option<String>,
    default_inputs: usize,
    body: DatumP,
    /// Label key -> block index, filled in while the body is lowered
    tag_to_block: RefCell<FxHashMap<String, i32>>,
    /// Label key -> the TAG node that defined it
    tag_to_line: RefCell<FxHashMap<String, DatumP>>,
}

impl Procedure {
    pub fn new(name: &str, required: Vec<String>, body: DatumP) -> Self {
        let default_inputs = required.len();
        Procedure {
            name: name.to_uppercase(),
            required: required.iter().map(|r| r.to_uppercase()).collect(),
            optional: Vec::new(),
            rest: None,
            default_inputs,
            body,
            tag_to_block: RefCell::new(FxHashMap::default()),
            tag_to_line: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn with_optional(mut self, name: &str, default: DatumP) -> Self {
        self.optional.push(OptionalParam {
            name: name.to_uppercase(),
            default,
        });
        self
    }

    pub fn with_rest(mut self, name: &str) -> Self {
        self.rest = Some(name.to_uppercase());
        self
    }

    /// Number of inputs the parser collects when the call is not parenthesized.
    pub fn with_default_inputs(mut self, count: usize) -> Self {
        self.default_inputs = count;
        self
    }

    pub fn into_datum(self) -> DatumP {
        DatumP::new(Datum::Procedure(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn optional(&self) -> &[OptionalParam] {
        &self.optional
    }

    pub fn rest(&self) -> Option<&str> {
        self.rest.as_deref()
    }

    pub fn default_inputs(&self) -> usize {
        self.default_inputs
    }

    pub fn min_inputs(&self) -> usize {
        self.required.len()
    }

    /// `None` when a rest input accepts any number.
    pub fn max_inputs(&self) -> Option<usize> {
        match self.rest {
            Some(_) => None,
            None => Some(self.required.len() + self.optional.len()),
        }
    }

    pub fn body(&self) -> &DatumP {
        &self.body
    }

    pub fn set_tag(&self, key: &str, block: i32, line: DatumP) {
        self.tag_to_block.borrow_mut().insert(key.to_string(), block);
        self.tag_to_line.borrow_mut().insert(key.to_string(), line);
    }

    pub fn block_for_tag(&self, key: &str) -> Option<i32> {
        self.tag_to_block.borrow().get(key).copied()
    }

    pub fn line_for_tag(&self, key: &str) -> Option<DatumP> {
        self.tag_to_line.borrow().get(key).cloned()
    }
}
