//! LIR to Cranelift IR translation
//!
//! `FunctionTranslator` turns LIR instructions and terminators into
//! Cranelift IR. Double and boolean registers become Cranelift variables;
//! datum registers exist only in the frame and are named by index.

use cranelift_codegen::ir::condcodes::{FloatCC, IntCC};
use cranelift_codegen::ir::types::{F64, I32, I64, I8};
use cranelift_codegen::ir::{Block, InstBuilder, MemFlags, StackSlotData, StackSlotKind, Value};
use cranelift_frontend::{FunctionBuilder, Variable};
use cranelift_jit::JITModule;
use cranelift_module::{FuncId, Module};
use rustc_hash::FxHashMap;

use crate::lir::{CmpOp, Helper, Label, LirFunction, LirInstr, Reg, Terminator, Ty};

use super::compiler::RuntimeHelpers;
use super::JitError;

/// Helper to create a Variable from a register index
#[inline]
fn var(n: u32) -> Variable {
    Variable::from_u32(n)
}

fn float_cc(op: CmpOp) -> FloatCC {
    match op {
        CmpOp::Eq => FloatCC::Equal,
        CmpOp::Ne => FloatCC::OrderedNotEqual,
        CmpOp::Lt => FloatCC::LessThan,
        CmpOp::Le => FloatCC::LessThanOrEqual,
        CmpOp::Gt => FloatCC::GreaterThan,
        CmpOp::Ge => FloatCC::GreaterThanOrEqual,
    }
}

/// Translator for a single function
pub(crate) struct FunctionTranslator<'a> {
    module: &'a mut JITModule,
    helpers: &'a RuntimeHelpers,
    lir: &'a LirFunction,
    pub(crate) frame_ptr: Option<Value>,
    pub(crate) block_id: Option<Value>,
    call_sites: Vec<Helper>,
}

impl<'a> FunctionTranslator<'a> {
    pub(crate) fn new(
        module: &'a mut JITModule,
        helpers: &'a RuntimeHelpers,
        lir: &'a LirFunction,
    ) -> Self {
        FunctionTranslator {
            module,
            helpers,
            lir,
            frame_ptr: None,
            block_id: None,
            call_sites: Vec::new(),
        }
    }

    pub(crate) fn into_call_sites(self) -> Vec<Helper> {
        self.call_sites
    }

    fn ty(&self, reg: Reg) -> Ty {
        self.lir.reg_type(reg)
    }

    pub(crate) fn declare_registers(&self, builder: &mut FunctionBuilder) {
        for (i, ty) in self.lir.reg_types.iter().enumerate() {
            match ty {
                Ty::F64 => builder.declare_var(var(i as u32), F64),
                Ty::Bool => builder.declare_var(var(i as u32), I8),
                Ty::Datum => {}
            }
        }
    }

    /// Give every native register a defined value at entry.
    pub(crate) fn init_registers(&self, builder: &mut FunctionBuilder) {
        for (i, ty) in self.lir.reg_types.iter().enumerate() {
            let zero = match ty {
                Ty::F64 => builder.ins().f64const(0.0),
                Ty::Bool => builder.ins().iconst(I8, 0),
                Ty::Datum => continue,
            };
            builder.def_var(var(i as u32), zero);
        }
    }

    pub(crate) fn create_blocks(&self, builder: &mut FunctionBuilder) -> FxHashMap<Label, Block> {
        self.lir
            .blocks
            .iter()
            .map(|bb| (bb.label, builder.create_block()))
            .collect()
    }

    fn frame(&self) -> Result<Value, JitError> {
        self.frame_ptr
            .ok_or_else(|| JitError::InvalidLir("no frame pointer".to_string()))
    }

    /// Translate a single LIR instruction
    pub(crate) fn translate_instr(
        &mut self,
        builder: &mut FunctionBuilder,
        instr: &LirInstr,
    ) -> Result<(), JitError> {
        match instr {
            LirInstr::ConstF64 { dst, value } => {
                let val = builder.ins().f64const(*value);
                builder.def_var(var(dst.0), val);
            }

            LirInstr::ConstBool { dst, value } => {
                let val = builder.ins().iconst(I8, *value as i64);
                builder.def_var(var(dst.0), val);
            }

            LirInstr::ConstDatum { dst, index } => {
                let frame = self.frame()?;
                let dst = builder.ins().iconst(I64, dst.0 as i64);
                let index = builder.ins().iconst(I64, *index as i64);
                self.call_void(builder, self.helpers.load_const, &[frame, dst, index]);
            }

            LirInstr::BlockIdIs { dst, id } => {
                let block_id = self
                    .block_id
                    .ok_or_else(|| JitError::InvalidLir("no block id".to_string()))?;
                let val = builder.ins().icmp_imm(IntCC::Equal, block_id, *id as i64);
                builder.def_var(var(dst.0), val);
            }

            LirInstr::FBin { dst, op, lhs, rhs } => {
                let a = builder.use_var(var(lhs.0));
                let b = builder.use_var(var(rhs.0));
                let val = match op {
                    crate::lir::FBinOp::Add => builder.ins().fadd(a, b),
                    crate::lir::FBinOp::Sub => builder.ins().fsub(a, b),
                    crate::lir::FBinOp::Mul => builder.ins().fmul(a, b),
                    crate::lir::FBinOp::Div => builder.ins().fdiv(a, b),
                };
                builder.def_var(var(dst.0), val);
            }

            LirInstr::FNeg { dst, src } => {
                let a = builder.use_var(var(src.0));
                let val = builder.ins().fneg(a);
                builder.def_var(var(dst.0), val);
            }

            LirInstr::FCmp { dst, op, lhs, rhs } => {
                let a = builder.use_var(var(lhs.0));
                let b = builder.use_var(var(rhs.0));
                let val = builder.ins().fcmp(float_cc(*op), a, b);
                builder.def_var(var(dst.0), val);
            }

            LirInstr::FIsInt { dst, src } => {
                // Same saturating round trip as `lir::is_int32`.
                let a = builder.use_var(var(src.0));
                let int = builder.ins().fcvt_to_sint_sat(I32, a);
                let back = builder.ins().fcvt_from_sint(F64, int);
                let val = builder.ins().fcmp(FloatCC::Equal, back, a);
                builder.def_var(var(dst.0), val);
            }

            LirInstr::BNot { dst, src } => {
                let a = builder.use_var(var(src.0));
                let val = builder.ins().bxor_imm(a, 1);
                builder.def_var(var(dst.0), val);
            }

            LirInstr::BAnd { dst, lhs, rhs } => {
                let a = builder.use_var(var(lhs.0));
                let b = builder.use_var(var(rhs.0));
                let val = builder.ins().band(a, b);
                builder.def_var(var(dst.0), val);
            }

            LirInstr::Move { dst, src } => {
                if self.ty(*dst) == Ty::Datum {
                    let frame = self.frame()?;
                    let d = builder.ins().iconst(I64, dst.0 as i64);
                    let s = builder.ins().iconst(I64, src.0 as i64);
                    self.call_void(builder, self.helpers.move_datum, &[frame, d, s]);
                } else {
                    let val = builder.use_var(var(src.0));
                    builder.def_var(var(dst.0), val);
                }
            }

            LirInstr::Call { dst, helper, args } => {
                self.translate_call(builder, *dst, *helper, args)?;
            }
        }
        Ok(())
    }

    /// Spill the arguments to a stack slot and call the dispatcher.
    fn translate_call(
        &mut self,
        builder: &mut FunctionBuilder,
        dst: Option<Reg>,
        helper: Helper,
        args: &[Reg],
    ) -> Result<(), JitError> {
        let frame = self.frame()?;
        let site = self.call_sites.len();
        self.call_sites.push(helper);

        let args_ptr = if args.is_empty() {
            builder.ins().iconst(I64, 0)
        } else {
            let slot = builder.create_sized_stack_slot(StackSlotData::new(
                StackSlotKind::ExplicitSlot,
                (args.len() * 8) as u32,
                3,
            ));
            for (i, reg) in args.iter().enumerate() {
                let word = match self.ty(*reg) {
                    Ty::F64 => builder.use_var(var(reg.0)),
                    Ty::Bool => {
                        let b = builder.use_var(var(reg.0));
                        builder.ins().uextend(I64, b)
                    }
                    Ty::Datum => builder.ins().iconst(I64, reg.0 as i64),
                };
                builder.ins().stack_store(word, slot, (i * 8) as i32);
            }
            builder.ins().stack_addr(I64, slot, 0)
        };

        let site = builder.ins().iconst(I64, site as i64);
        let nargs = builder.ins().iconst(I64, args.len() as i64);
        let dst_index = match dst {
            Some(reg) if self.ty(reg) == Ty::Datum => reg.0 as i64,
            _ => -1,
        };
        let dst_index = builder.ins().iconst(I64, dst_index);

        let func_ref = self
            .module
            .declare_func_in_func(self.helpers.call, builder.func);
        let call = builder
            .ins()
            .call(func_ref, &[frame, site, args_ptr, nargs, dst_index]);
        let bits = builder.inst_results(call)[0];

        if let Some(dst) = dst {
            match self.ty(dst) {
                Ty::F64 => {
                    let val = builder.ins().bitcast(F64, MemFlags::new(), bits);
                    builder.def_var(var(dst.0), val);
                }
                Ty::Bool => {
                    let val = builder.ins().ireduce(I8, bits);
                    builder.def_var(var(dst.0), val);
                }
                Ty::Datum => {}
            }
        }
        Ok(())
    }

    pub(crate) fn translate_terminator(
        &mut self,
        builder: &mut FunctionBuilder,
        term: &Terminator,
        block_map: &FxHashMap<Label, Block>,
    ) -> Result<(), JitError> {
        let target = |label: &Label| -> Result<Block, JitError> {
            block_map
                .get(label)
                .copied()
                .ok_or_else(|| JitError::InvalidLir(format!("unknown target {}", label)))
        };
        match term {
            Terminator::Return(reg) => {
                let val = builder.ins().iconst(I64, reg.0 as i64);
                builder.ins().return_(&[val]);
            }

            Terminator::Jump(label) => {
                builder.ins().jump(target(label)?, &[]);
            }

            Terminator::Branch {
                cond,
                then_label,
                else_label,
            } => {
                let cond_val = builder.use_var(var(cond.0));
                builder
                    .ins()
                    .brif(cond_val, target(then_label)?, &[], target(else_label)?, &[]);
            }

            Terminator::Unreachable => {
                let val = builder.ins().iconst(I64, -1);
                builder.ins().return_(&[val]);
            }
        }
        Ok(())
    }

    fn call_void(&mut self, builder: &mut FunctionBuilder, func_id: FuncId, args: &[Value]) {
        let func_ref = self.module.declare_func_in_func(func_id, builder.func);
        builder.ins().call(func_ref, args);
    }
}
