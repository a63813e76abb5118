//! Flow-control tokens.
//!
//! Compiled code returns one of these instead of a data value to signal
//! an error, a jump, a return or a tail call. Every call site checks the
//! tag and hands the token upward until something consumes it.

use super::{Datum, DatumP};
use crate::error::ErrorCode;

/// An error, also the payload channel for CATCH/THROW.
pub struct ErrorRecord {
    pub code: ErrorCode,
    /// Catch tag word (ERROR for ordinary errors)
    pub tag: DatumP,
    /// Message word
    pub message: DatumP,
    /// Value carried by THROW, if any
    pub output: Option<DatumP>,
    /// Node of the procedure running when the error was made
    pub procedure: Option<DatumP>,
    /// Instruction list running when the error was made
    pub line: Option<DatumP>,
}

impl ErrorRecord {
    pub fn into_datum(self) -> DatumP {
        DatumP::new(Datum::Error(self))
    }

    pub fn tag_key(&self) -> String {
        match self.tag.as_word() {
            Some(w) => w.key().to_string(),
            None => String::new(),
        }
    }
}

/// GOTO a label of the running procedure.
pub struct GotoToken {
    /// The GOTO node
    pub source: DatumP,
    /// Label word
    pub tag: DatumP,
}

/// STOP, OUTPUT or .MAYBEOUTPUT.
pub struct ReturnToken {
    /// The node that produced the token
    pub source: DatumP,
    /// `None` for STOP, or .MAYBEOUTPUT of nothing
    pub value: Option<DatumP>,
}

/// A tail call: the procedure boundary runs `call` with `args` in place of
/// the current procedure.
pub struct ContinuationToken {
    /// The OUTPUT/STOP node
    pub source: DatumP,
    /// The procedure call node
    pub call: DatumP,
    /// Evaluated arguments
    pub args: Vec<DatumP>,
}

impl GotoToken {
    pub fn into_datum(self) -> DatumP {
        DatumP::new(Datum::Goto(self))
    }
}

impl ReturnToken {
    pub fn into_datum(self) -> DatumP {
        DatumP::new(Datum::Return(self))
    }
}

impl ContinuationToken {
    pub fn into_datum(self) -> DatumP {
        DatumP::new(Datum::Continuation(self))
    }
}
