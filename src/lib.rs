//! # qlogo-compiler - Native compilation core for a Logo interpreter
//!
//! Parsed instruction lists are lowered to a typed intermediate program
//! and linked into callable entry points. Compiled code talks to the
//! interpreter only through the runtime bridge on [`Evaluator`].
//!
//! ## Quick Start
//!
//! ```
//! use qlogo_compiler::{primitives, AstNode, DatumP, Evaluator, Host, List};
//! use std::rc::Rc;
//!
//! struct Quiet;
//! impl Host for Quiet {
//!     fn write(&mut self, _text: &str) {}
//! }
//!
//! let mut ev = Evaluator::new(Quiet);
//!
//! // sum 2 3
//! let sum = primitives::node(
//!     "sum",
//!     vec![
//!         AstNode::literal(DatumP::word("2")),
//!         AstNode::literal(DatumP::word("3")),
//!     ],
//! )
//! .unwrap();
//! let list = List::from_vec(vec![DatumP::word("sum"), DatumP::word("2"), DatumP::word("3")]);
//! list.as_list().unwrap().attach_ast(Rc::new(vec![vec![sum]]));
//!
//! let result = ev.execute(&list).unwrap().unwrap();
//! assert_eq!(result.print(), "5");
//! ```
//!
//! ## Architecture
//!
//! 1. **Value model** - words, lists, arrays, executable nodes and
//!    flow-control tokens behind one reference-counted handle
//! 2. **Code generator** - lowers node groups to LIR, coercing between
//!    double, boolean and datum representations
//! 3. **Backend** - links LIR into an entry point (register machine, or
//!    Cranelift with the `jit` feature)
//! 4. **Runtime bridge** - the helper calls compiled code makes back into
//!    the evaluator, including the procedure trampoline
//!
//! Compiled code is cached per source list and dropped when the list is
//! reparsed.

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
#[cfg(feature = "jit")]
pub mod jit;
pub mod lir;
pub mod primitives;
pub mod runtime;
pub mod value;

pub use backend::{Backend, EntryPoint};
pub use cache::CompileCache;
pub use config::{BackendKind, CompilerConfig};
pub use error::{CompileError, CompileResult, ErrorCode};
pub use primitives::{Generator, RequestType};
pub use runtime::{ConsoleHost, Evaluator, Host, PauseReply, Signal};
pub use value::{AstNode, Datum, DatumP, List, Procedure, Word};
