//! Code generation backends
//!
//! A backend turns a verified `LirFunction` into an [`EntryPoint`]: a
//! callable taking the execution context and a starting block id and
//! returning a datum. The default backend is a register machine over the
//! LIR itself; with the `jit` feature, Cranelift produces native code.

mod machine;

pub use machine::MachineBackend;

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{trace, warn};

use crate::config::BackendKind;
use crate::error::CompileResult;
use crate::lir::LirFunction;
use crate::runtime::Evaluator;
use crate::value::DatumP;

pub trait Backend {
    fn name(&self) -> &'static str;

    /// Compile and link one function.
    fn compile_and_link(&mut self, func: LirFunction) -> CompileResult<Rc<EntryPoint>>;
}

/// Compiled code of either backend.
pub(crate) enum Code {
    Machine(machine::Program),
    #[cfg(feature = "jit")]
    Native(crate::jit::JitCode),
}

static NEXT_ENTRY: AtomicU64 = AtomicU64::new(1);

/// A linked function. Dropping the last handle unlinks its code.
pub struct EntryPoint {
    id: u64,
    name: String,
    code: Code,
}

impl EntryPoint {
    pub(crate) fn new(name: impl Into<String>, code: Code) -> Rc<Self> {
        Rc::new(EntryPoint {
            id: NEXT_ENTRY.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            code,
        })
    }

    /// Distinct for every link, including relinks of the same source.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run from block `block`; 0 is the normal entry.
    pub fn call(&self, ev: &mut Evaluator, block: i32) -> DatumP {
        match &self.code {
            Code::Machine(program) => program.run(ev, block),
            #[cfg(feature = "jit")]
            Code::Native(code) => crate::jit::run(code, ev, block),
        }
    }
}

impl Drop for EntryPoint {
    fn drop(&mut self) {
        trace!(id = self.id, name = %self.name, "unlinked entry point");
    }
}

impl fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.code {
            Code::Machine(_) => "machine",
            #[cfg(feature = "jit")]
            Code::Native(_) => "native",
        };
        f.debug_struct("EntryPoint")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("code", &kind)
            .finish()
    }
}

/// The backend for `kind`. Falls back to the register machine when the JIT
/// is unavailable.
pub fn create(kind: BackendKind) -> Box<dyn Backend> {
    match kind {
        BackendKind::Machine => Box::new(MachineBackend::new()),
        BackendKind::Jit => jit_backend().unwrap_or_else(|| Box::new(MachineBackend::new())),
    }
}

#[cfg(feature = "jit")]
fn jit_backend() -> Option<Box<dyn Backend>> {
    match crate::jit::JitBackend::new() {
        Ok(backend) => Some(Box::new(backend)),
        Err(err) => {
            warn!(error = %err, "JIT unavailable, using the machine backend");
            None
        }
    }
}

#[cfg(not(feature = "jit"))]
fn jit_backend() -> Option<Box<dyn Backend>> {
    warn!("built without the jit feature, using the machine backend");
    None
}
