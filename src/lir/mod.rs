//! Low-level Intermediate Representation (LIR)
//!
//! The code generator lowers executable nodes into `LirFunction`s; a
//! [`Backend`](crate::backend::Backend) turns them into entry points.
//!
//! ```text
//! AST node groups -> Lowerer -> LirFunction -> Backend -> EntryPoint
//! ```
//!
//! Registers carry one of three native representations: a double, a
//! boolean, or an opaque datum handle. Everything the runtime does for
//! compiled code is a [`Helper`] call.

mod display;
mod helper;
pub mod lower;
mod types;
mod verify;

pub use helper::{Helper, MathFn, Signature, WriteMode};
pub use lower::Lowerer;
pub use types::*;
pub use verify::verify;
