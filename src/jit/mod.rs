//! Cranelift backend
//!
//! Translates LIR functions to native code. Only the arithmetic, boolean
//! and control-flow instructions become machine instructions; every datum
//! operation goes through `extern "C"` trampolines into the runtime bridge.
//!
//! ## Architecture
//!
//! ```text
//! LirFunction -> JitCompiler -> Cranelift IR -> native code -> JitCode
//! ```
//!
//! ## Calling Convention
//!
//! ```ignore
//! type JitFn = unsafe extern "C" fn(
//!     frame: *mut JitFrame,   // evaluator, constants and datum registers
//!     block_id: i32,          // requested entry block, 0 for normal entry
//! ) -> i64;                   // datum register holding the result, -1 if none
//! ```
//!
//! Datum registers are slots in the per-call [`JitFrame`]; native code only
//! ever handles their indices, so no reference count crosses the boundary.

mod code;
mod compiler;
mod runtime;
mod translate;

pub use code::JitCode;
pub use compiler::JitCompiler;
pub(crate) use runtime::run;

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::backend::{Backend, Code, EntryPoint};
use crate::error::{CompileError, CompileResult};
use crate::lir::LirFunction;

/// JIT compilation error
#[derive(Debug, Clone)]
pub enum JitError {
    /// Host ISA could not be configured
    Unavailable(String),
    /// Cranelift compilation failed
    CompilationFailed(String),
    /// Invalid LIR structure
    InvalidLir(String),
}

impl fmt::Display for JitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JitError::Unavailable(msg) => write!(f, "JIT: host not supported: {}", msg),
            JitError::CompilationFailed(msg) => write!(f, "JIT compilation failed: {}", msg),
            JitError::InvalidLir(msg) => write!(f, "JIT: invalid LIR: {}", msg),
        }
    }
}

impl std::error::Error for JitError {}

impl From<JitError> for CompileError {
    fn from(err: JitError) -> Self {
        CompileError::Backend(err.to_string())
    }
}

/// Backend producing native code. Each function gets its own module so its
/// code can be freed when the entry point is dropped.
pub struct JitBackend {
    compiled: u64,
}

impl JitBackend {
    pub fn new() -> Result<Self, JitError> {
        // Fail early if the host ISA is unsupported.
        JitCompiler::new()?;
        Ok(JitBackend { compiled: 0 })
    }
}

impl Backend for JitBackend {
    fn name(&self) -> &'static str {
        "cranelift"
    }

    fn compile_and_link(&mut self, func: LirFunction) -> CompileResult<Rc<EntryPoint>> {
        let code = JitCompiler::new()?.compile(&func)?;
        self.compiled += 1;
        debug!(name = %func.name, total = self.compiled, "compiled native code");
        Ok(EntryPoint::new(func.name, Code::Native(code)))
    }
}
