//! Execution context and runtime bridge
//!
//! The [`Evaluator`] owns everything compiled code can reach: call frames,
//! the procedure table, the compilation cache, REPCOUNT, the current error
//! and the host. Compiled code calls back into it through
//! [`Evaluator::call_helper`]; the bridge may in turn compile and run more
//! code, so every entry is re-entrant.

mod bridge;
mod call;
mod datafns;
mod errors;
mod frames;
mod host;

pub use bridge::RegValue;
pub use frames::{Frame, FrameStack};
pub use host::{ConsoleHost, Host, PauseReply};

use std::rc::Rc;

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::backend::{self, Backend, EntryPoint};
use crate::cache::CompileCache;
use crate::config::CompilerConfig;
use crate::error::{CompileError, CompileResult, ErrorCode};
use crate::lir::{self, Lowerer};
use crate::value::{arena, AstGroups, Datum, DatumP};

/// How a top-level run ended other than normally.
#[derive(Debug, Clone, Error)]
pub enum Signal {
    /// An uncaught error
    #[error("{message}")]
    Error {
        code: ErrorCode,
        message: String,
        error: DatumP,
    },
    /// THROW with a tag nothing caught
    #[error("Can't find catch tag for {tag}")]
    Throw { tag: String, value: Option<DatumP> },
    /// THROW "SYSTEM or BYE
    #[error("system exit")]
    System,
    /// THROW "TOPLEVEL, or PAUSE abandoned
    #[error("return to top level")]
    Toplevel,
}

/// The execution context compiled code runs against.
pub struct Evaluator {
    pub(crate) frames: FrameStack,
    procedures: FxHashMap<String, DatumP>,
    /// Time of the most recent procedure definition
    last_definition: u64,
    cache: CompileCache,
    backend: Box<dyn Backend>,
    /// REPCOUNT; -1 outside any loop
    repcount: f64,
    current_error: Option<DatumP>,
    host: Box<dyn Host>,
    rng: fastrand::Rng,
    config: CompilerConfig,
}

impl Evaluator {
    pub fn new(host: impl Host + 'static) -> Self {
        Self::with_config(host, CompilerConfig::default())
    }

    pub fn with_config(host: impl Host + 'static, config: CompilerConfig) -> Self {
        Evaluator {
            frames: FrameStack::new(),
            procedures: FxHashMap::default(),
            last_definition: 0,
            cache: CompileCache::new(),
            backend: backend::create(config.backend),
            repcount: -1.0,
            current_error: None,
            host: Box::new(host),
            rng: fastrand::Rng::new(),
            config,
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    // === Procedures ===

    /// Define or redefine a procedure. Every list parsed before this point
    /// is reparsed and recompiled the next time it runs.
    pub fn define_procedure(&mut self, procedure: DatumP) {
        let Some(proc) = procedure.as_procedure() else {
            warn!(value = ?procedure, "define_procedure called with a non-procedure");
            return;
        };
        let name = proc.name().to_string();
        if let Some(old) = self.procedures.insert(name.clone(), procedure.clone()) {
            self.invalidate(&old);
        }
        self.last_definition = arena::tick();
        debug!(name = %name, at = self.last_definition, "defined procedure");
    }

    pub fn procedure(&self, name: &str) -> Option<DatumP> {
        self.procedures.get(&name.to_uppercase()).cloned()
    }

    pub fn last_definition(&self) -> u64 {
        self.last_definition
    }

    // === Variables ===

    pub fn variable(&self, name: &str) -> Option<DatumP> {
        self.frames.get(&name.to_uppercase()).filter(|v| v.is_data())
    }

    pub fn set_variable(&mut self, name: &str, value: DatumP) {
        self.frames.set(&name.to_uppercase(), value);
    }

    // === State ===

    pub fn repcount(&self) -> f64 {
        self.repcount
    }

    /// The error ERROR would report.
    pub fn current_error(&self) -> Option<&DatumP> {
        self.current_error.as_ref()
    }

    pub fn cache(&self) -> &CompileCache {
        &self.cache
    }

    /// Seed the random number generator.
    pub fn seed(&mut self, seed: u64) {
        self.rng.seed(seed);
    }

    // === Compilation ===

    /// Entry point for an instruction list, compiling it if the cached one
    /// is missing or stale.
    pub fn compile_list(&mut self, source: &DatumP) -> CompileResult<Rc<EntryPoint>> {
        self.compile_source(source, None)
    }

    /// Entry point for a single node. Nodes are compiled once.
    pub fn compile_node(&mut self, node: &DatumP) -> CompileResult<Rc<EntryPoint>> {
        let ast = node.as_node().ok_or_else(|| CompileError::Unsupported {
            name: node.show(),
            reason: "not an executable node".into(),
        })?;
        let id = ast.id();
        if let Some(entry) = self.cache.lookup(id, 0) {
            return Ok(entry);
        }
        let name = format!("{}#{}", ast.key(), id.0);
        let func = Lowerer::new().lower_node_unit(&name, node)?;
        let entry = self.link(func)?;
        self.cache.insert(id, node, 0, entry.clone());
        Ok(entry)
    }

    /// Drop any compiled code for a list, node or procedure body.
    pub fn invalidate(&mut self, source: &DatumP) {
        let id = match source.datum() {
            Datum::List(list) => list.id(),
            Datum::AstNode(node) => node.id(),
            Datum::Procedure(proc) => match proc.body().as_list() {
                Some(body) => body.id(),
                None => return,
            },
            _ => return,
        };
        self.cache.invalidate(id);
    }

    fn compile_source(
        &mut self,
        source: &DatumP,
        procedure: Option<&DatumP>,
    ) -> CompileResult<Rc<EntryPoint>> {
        let Some(list) = source.as_list() else {
            // Words are parsed every time they run.
            let groups = self
                .host
                .parse(source)
                .ok_or_else(|| CompileError::Unparsed(source.show()))?;
            return self.lower_and_link(&source.print(), &groups, procedure, source);
        };

        if list.ast().is_none() || list.stamp() <= self.last_definition {
            match self.host.parse(source) {
                Some(groups) => list.attach_ast(groups),
                None if list.ast().is_some() => list.restamp(),
                None => return Err(CompileError::Unparsed(source.show())),
            }
        }

        let id = list.id();
        if let Some(entry) = self.cache.lookup(id, list.stamp()) {
            return Ok(entry);
        }
        let groups = list
            .ast()
            .ok_or_else(|| CompileError::Unparsed(source.show()))?;
        let name = match procedure.and_then(|p| p.as_procedure()) {
            Some(proc) => proc.name().to_string(),
            None => format!("list#{}", id.0),
        };
        let entry = self.lower_and_link(&name, &groups, procedure, source)?;
        self.cache.insert(id, source, list.stamp(), entry.clone());
        Ok(entry)
    }

    fn lower_and_link(
        &mut self,
        name: &str,
        groups: &AstGroups,
        procedure: Option<&DatumP>,
        source: &DatumP,
    ) -> CompileResult<Rc<EntryPoint>> {
        let mut lowerer = Lowerer::new().with_procedure(procedure.cloned(), Some(source.clone()));
        let func = lowerer.lower_unit(name, groups)?;
        self.link(func)
    }

    fn link(&mut self, func: lir::LirFunction) -> CompileResult<Rc<EntryPoint>> {
        if self.config.verify_ir {
            lir::verify(&func)?;
        }
        if self.config.dump_ir {
            trace!(name = %func.name, "\n{}", func);
        }
        self.backend.compile_and_link(func)
    }

    // === Top level ===

    /// Run an instruction list as the top-level driver would.
    pub fn execute(&mut self, list: &DatumP) -> Result<Option<DatumP>, Signal> {
        let result = self.run_list(list);
        match result.datum() {
            Datum::Error(err) => Err(self.signal_for(err, &result)),
            Datum::Return(token) => Err(self.stray_token(&token.source)),
            Datum::Goto(token) => Err(self.stray_token(&token.source)),
            Datum::Continuation(token) => Err(self.stray_token(&token.source)),
            _ if result.is_data() => Ok(Some(result)),
            _ => Ok(None),
        }
    }

    /// Run a single node, compiled on its own.
    pub fn run_node(&mut self, node: &DatumP) -> DatumP {
        match self.compile_node(node) {
            Ok(entry) => entry.call(self, 0),
            Err(err) => self.compile_failure(node, err),
        }
    }

    fn signal_for(&self, err: &crate::value::ErrorRecord, datum: &DatumP) -> Signal {
        if err.code == ErrorCode::NoCatch {
            return match err.tag_key().as_str() {
                "SYSTEM" => Signal::System,
                "TOPLEVEL" => Signal::Toplevel,
                tag => Signal::Throw {
                    tag: tag.to_string(),
                    value: err.output.clone(),
                },
            };
        }
        Signal::Error {
            code: err.code,
            message: err.message.print(),
            error: datum.clone(),
        }
    }

    /// A STOP, OUTPUT or GOTO that found no procedure to leave.
    fn stray_token(&mut self, source: &DatumP) -> Signal {
        warn!(source = ?source, "flow-control token reached top level");
        let error = self.raise(ErrorCode::NotInsideProcedure, &[source]);
        let message = error
            .as_error()
            .map(|e| e.message.print())
            .unwrap_or_default();
        Signal::Error {
            code: ErrorCode::NotInsideProcedure,
            message,
            error,
        }
    }
}
