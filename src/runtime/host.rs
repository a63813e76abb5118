//! The embedding host
//!
//! Console output, turtle graphics and interactive correction belong to
//! whoever embeds the compiler. The defaults describe a host with a text
//! console and no canvas.

use std::io::Write;

use crate::error::ErrorCode;
use crate::primitives::TurtleOp;
use crate::value::{AstGroups, DatumP};

/// What PAUSE handed back.
#[derive(Debug, Clone)]
pub enum PauseReply {
    /// A replacement value, typically typed by the user
    Value(DatumP),
    /// Abandon the computation and return to top level
    Toplevel,
}

pub trait Host {
    /// Write text exactly as given.
    fn write(&mut self, text: &str);

    /// Ask for a replacement value after a failed input check.
    fn pause(&mut self) -> PauseReply {
        PauseReply::Toplevel
    }

    /// Parse a word or list into node groups. Called for source that was
    /// never parsed, or whose parse predates a procedure definition.
    fn parse(&mut self, _source: &DatumP) -> Option<AstGroups> {
        None
    }

    fn turtle(&mut self, _op: TurtleOp, _args: &[f64]) -> Result<(), ErrorCode> {
        Err(ErrorCode::NoGraphics)
    }

    fn set_pos(&mut self, _x: f64, _y: f64) -> Result<(), ErrorCode> {
        Err(ErrorCode::NoGraphics)
    }

    fn pos(&self) -> (f64, f64) {
        (0.0, 0.0)
    }

    fn heading(&self) -> f64 {
        0.0
    }

    fn pen_down(&self) -> bool {
        true
    }

    fn shown(&self) -> bool {
        true
    }
}

/// Writes to standard output.
#[derive(Debug, Default)]
pub struct ConsoleHost;

impl Host for ConsoleHost {
    fn write(&mut self, text: &str) {
        let mut out = std::io::stdout().lock();
        // A closed stdout has nowhere to report to.
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}
