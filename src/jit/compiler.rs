//! JIT compiler: LirFunction -> Cranelift IR -> native code

use cranelift_codegen::ir::types::I64;
use cranelift_codegen::ir::{AbiParam, Function, InstBuilder, Signature, UserFuncName};
use cranelift_codegen::settings::{self, Configurable};
use cranelift_frontend::{FunctionBuilder, FunctionBuilderContext};
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::{FuncId, Linkage, Module};

use crate::lir::LirFunction;

use super::code::JitCode;
use super::runtime;
use super::translate::FunctionTranslator;
use super::JitError;

/// JIT compiler that translates one LirFunction to native code
pub struct JitCompiler {
    module: JITModule,
    helpers: RuntimeHelpers,
}

/// Pre-declared trampoline function IDs
pub(crate) struct RuntimeHelpers {
    pub(crate) load_const: FuncId,
    pub(crate) move_datum: FuncId,
    pub(crate) call: FuncId,
}

impl JitCompiler {
    pub fn new() -> Result<Self, JitError> {
        let mut flag_builder = settings::builder();
        for (flag, value) in [
            ("use_colocated_libcalls", "false"),
            ("is_pic", "false"),
            ("opt_level", "speed"),
        ] {
            flag_builder
                .set(flag, value)
                .map_err(|e| JitError::Unavailable(e.to_string()))?;
        }

        let isa_builder =
            cranelift_native::builder().map_err(|e| JitError::Unavailable(e.to_string()))?;
        let isa = isa_builder
            .finish(settings::Flags::new(flag_builder))
            .map_err(|e| JitError::Unavailable(e.to_string()))?;

        let mut builder = JITBuilder::with_isa(isa, cranelift_module::default_libcall_names());
        builder.symbol("qlogo_jit_const", runtime::qlogo_jit_const as *const u8);
        builder.symbol("qlogo_jit_move", runtime::qlogo_jit_move as *const u8);
        builder.symbol("qlogo_jit_call", runtime::qlogo_jit_call as *const u8);

        let mut module = JITModule::new(builder);
        let helpers = Self::declare_helpers(&mut module)?;
        Ok(JitCompiler { module, helpers })
    }

    /// fn(frame: *mut JitFrame, block_id: i32) -> i64
    fn make_jit_signature(&self) -> Signature {
        let mut sig = self.module.make_signature();
        sig.params.push(AbiParam::new(I64)); // frame pointer
        sig.params.push(AbiParam::new(cranelift_codegen::ir::types::I32)); // block id
        sig.returns.push(AbiParam::new(I64)); // result register
        sig
    }

    fn declare_helpers(module: &mut JITModule) -> Result<RuntimeHelpers, JitError> {
        // (frame, dst, src) -> ()
        let mut store_sig = module.make_signature();
        for _ in 0..3 {
            store_sig.params.push(AbiParam::new(I64));
        }

        // (frame, site, args_ptr, nargs, dst) -> bits
        let mut call_sig = module.make_signature();
        for _ in 0..5 {
            call_sig.params.push(AbiParam::new(I64));
        }
        call_sig.returns.push(AbiParam::new(I64));

        let declare =
            |module: &mut JITModule, name: &str, sig: &Signature| -> Result<FuncId, JitError> {
                module
                    .declare_function(name, Linkage::Import, sig)
                    .map_err(|e| JitError::CompilationFailed(e.to_string()))
            };

        Ok(RuntimeHelpers {
            load_const: declare(module, "qlogo_jit_const", &store_sig)?,
            move_datum: declare(module, "qlogo_jit_move", &store_sig)?,
            call: declare(module, "qlogo_jit_call", &call_sig)?,
        })
    }

    /// Compile a LirFunction to native code
    pub fn compile(mut self, lir: &LirFunction) -> Result<JitCode, JitError> {
        let sig = self.make_jit_signature();
        let func_id = self
            .module
            .declare_function(&symbol_name(&lir.name), Linkage::Local, &sig)
            .map_err(|e| JitError::CompilationFailed(e.to_string()))?;

        let mut ctx = self.module.make_context();
        ctx.func.signature = sig;
        ctx.func.name = UserFuncName::user(0, func_id.as_u32());

        let call_sites = self.translate_function(lir, &mut ctx.func)?;

        self.module
            .define_function(func_id, &mut ctx)
            .map_err(|e| JitError::CompilationFailed(e.to_string()))?;
        self.module
            .finalize_definitions()
            .map_err(|e| JitError::CompilationFailed(e.to_string()))?;
        let fn_ptr = self.module.get_finalized_function(func_id);

        Ok(JitCode::new(
            fn_ptr,
            self.module,
            lir.constants.clone(),
            call_sites,
            lir.reg_types.clone(),
        ))
    }

    /// Cranelift IR for a LirFunction, one line per entry. Diagnostic only.
    pub fn clif_text(mut self, lir: &LirFunction) -> Result<Vec<String>, JitError> {
        let sig = self.make_jit_signature();
        let func_id = self
            .module
            .declare_function(&symbol_name(&lir.name), Linkage::Local, &sig)
            .map_err(|e| JitError::CompilationFailed(e.to_string()))?;

        let mut ctx = self.module.make_context();
        ctx.func.signature = sig;
        ctx.func.name = UserFuncName::user(0, func_id.as_u32());
        self.translate_function(lir, &mut ctx.func)?;

        let text = format!("{}", ctx.func);
        Ok(text.lines().map(String::from).collect())
    }

    /// Translate LIR function to Cranelift IR; returns the helper for each
    /// call site.
    ///
    /// ```text
    /// entry_block(frame, block_id):
    ///     jump lir_entry
    /// lir blocks...
    /// ```
    fn translate_function(
        &mut self,
        lir: &LirFunction,
        func: &mut Function,
    ) -> Result<Vec<crate::lir::Helper>, JitError> {
        let mut builder_ctx = FunctionBuilderContext::new();
        let mut builder = FunctionBuilder::new(func, &mut builder_ctx);
        let mut translator = FunctionTranslator::new(&mut self.module, &self.helpers, lir);

        translator.declare_registers(&mut builder);

        let entry_block = builder.create_block();
        let block_map = translator.create_blocks(&mut builder);

        builder.append_block_params_for_function_params(entry_block);
        builder.switch_to_block(entry_block);
        builder.seal_block(entry_block);
        translator.frame_ptr = Some(builder.block_params(entry_block)[0]);
        translator.block_id = Some(builder.block_params(entry_block)[1]);
        translator.init_registers(&mut builder);

        let first = block_map
            .get(&lir.entry)
            .copied()
            .ok_or_else(|| JitError::InvalidLir(format!("missing entry {}", lir.entry)))?;
        builder.ins().jump(first, &[]);

        for bb in &lir.blocks {
            let cl_block = block_map[&bb.label];
            builder.switch_to_block(cl_block);
            for instr in &bb.instructions {
                translator.translate_instr(&mut builder, instr)?;
            }
            translator.translate_terminator(&mut builder, &bb.terminator, &block_map)?;
        }

        // Loops add back-edges, so seal once every block is filled.
        builder.seal_all_blocks();
        builder.finalize();
        Ok(translator.into_call_sites())
    }
}

/// Cranelift symbol names must not repeat within a module; ours hold one
/// function each, so only the characters matter.
fn symbol_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("logo_{}", cleaned)
}
