//! Error types
//!
//! Two families live here. [`ErrorCode`] numbers the errors a running
//! program sees; those travel as error records inside values. [`CompileError`]
//! covers failures of the compiler itself (lowering, verification, backend).

mod codes;

pub use codes::ErrorCode;

use thiserror::Error;

/// A failure while turning a parse into an entry point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// A list was executed but nothing ever parsed it
    #[error("no parse attached to list {0}")]
    Unparsed(String),

    /// A node's generator cannot be lowered in this position
    #[error("cannot lower {name}: {reason}")]
    Unsupported { name: String, reason: String },

    /// Operand count outside what the primitive accepts
    #[error("{name} takes {min}..{max} inputs, got {got}")]
    Arity {
        name: String,
        min: usize,
        max: String,
        got: usize,
    },

    /// The lowered function failed structural checks
    #[error("invalid LIR in {function}: {message}")]
    InvalidLir { function: String, message: String },

    /// The code generator backend rejected the function
    #[error("backend failed: {0}")]
    Backend(String),

    /// A configuration document could not be read
    #[error("bad configuration: {0}")]
    Config(String),
}

pub type CompileResult<T> = Result<T, CompileError>;
