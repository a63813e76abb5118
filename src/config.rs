//! Compiler configuration

use serde_json::Value;

use crate::error::{CompileError, CompileResult};

/// Which backend links compiled functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Portable register machine over the LIR
    #[default]
    Machine,
    /// Cranelift native code (feature `jit`)
    Jit,
}

impl BackendKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "machine" => Some(BackendKind::Machine),
            "jit" | "cranelift" => Some(BackendKind::Jit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    pub backend: BackendKind,
    /// Run the LIR verifier before linking
    pub verify_ir: bool,
    /// Emit each lowered function at trace level
    pub dump_ir: bool,
    /// Nested procedure calls allowed before "Stack overflow"
    pub max_depth: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            backend: BackendKind::Machine,
            verify_ir: cfg!(debug_assertions),
            dump_ir: false,
            max_depth: 1000,
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_verify_ir(mut self, verify: bool) -> Self {
        self.verify_ir = verify;
        self
    }

    pub fn with_dump_ir(mut self, dump: bool) -> Self {
        self.dump_ir = dump;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Read a configuration object such as
    /// `{"backend": "jit", "max_depth": 200}`. Missing keys keep their
    /// defaults.
    pub fn from_json_str(text: &str) -> CompileResult<Self> {
        let bad = |message: String| CompileError::Config(message);
        let value: Value = serde_json::from_str(text).map_err(|e| bad(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(bad("configuration must be an object".into()));
        };

        let mut config = CompilerConfig::default();
        for (key, value) in &map {
            match (key.as_str(), value) {
                ("backend", Value::String(name)) => {
                    config.backend = BackendKind::parse(name)
                        .ok_or_else(|| bad(format!("unknown backend {:?}", name)))?;
                }
                ("verify_ir", Value::Bool(b)) => config.verify_ir = *b,
                ("dump_ir", Value::Bool(b)) => config.dump_ir = *b,
                ("max_depth", Value::Number(n)) => {
                    config.max_depth = n
                        .as_u64()
                        .filter(|d| *d > 0)
                        .ok_or_else(|| bad(format!("max_depth must be a positive integer, got {}", n)))?
                        as usize;
                }
                (key, value) => return Err(bad(format!("unexpected {}: {}", key, value))),
            }
        }
        Ok(config)
    }
}
