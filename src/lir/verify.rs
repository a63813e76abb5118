//! Structural checks run on lowered functions before they reach a backend.

use rustc_hash::FxHashSet;

use super::types::*;
use crate::error::{CompileError, CompileResult};

/// Check labels, register types and helper arities.
pub fn verify(func: &LirFunction) -> CompileResult<()> {
    let fail = |message: String| CompileError::InvalidLir {
        function: func.name.clone(),
        message,
    };

    let mut labels = FxHashSet::default();
    for block in &func.blocks {
        if !labels.insert(block.label) {
            return Err(fail(format!("duplicate block {}", block.label)));
        }
    }
    if !labels.contains(&func.entry) {
        return Err(fail(format!("missing entry {}", func.entry)));
    }

    let ty = |reg: Reg| -> CompileResult<Ty> {
        func.reg_types
            .get(reg.0 as usize)
            .copied()
            .ok_or_else(|| fail(format!("unknown register {}", reg)))
    };
    let expect = |reg: Reg, want: Ty, what: &LirInstr| -> CompileResult<()> {
        let got = ty(reg)?;
        if got != want {
            return Err(fail(format!("{}: {} is {:?}, expected {:?}", what, reg, got, want)));
        }
        Ok(())
    };

    for block in &func.blocks {
        for instr in &block.instructions {
            match instr {
                LirInstr::ConstF64 { dst, .. } => expect(*dst, Ty::F64, instr)?,
                LirInstr::ConstBool { dst, .. } | LirInstr::BlockIdIs { dst, .. } => {
                    expect(*dst, Ty::Bool, instr)?
                }
                LirInstr::ConstDatum { dst, index } => {
                    expect(*dst, Ty::Datum, instr)?;
                    if *index as usize >= func.constants.len() {
                        return Err(fail(format!("{}: constant out of range", instr)));
                    }
                }
                LirInstr::FBin { dst, lhs, rhs, .. } => {
                    expect(*dst, Ty::F64, instr)?;
                    expect(*lhs, Ty::F64, instr)?;
                    expect(*rhs, Ty::F64, instr)?;
                }
                LirInstr::FNeg { dst, src } => {
                    expect(*dst, Ty::F64, instr)?;
                    expect(*src, Ty::F64, instr)?;
                }
                LirInstr::FCmp { dst, lhs, rhs, .. } => {
                    expect(*dst, Ty::Bool, instr)?;
                    expect(*lhs, Ty::F64, instr)?;
                    expect(*rhs, Ty::F64, instr)?;
                }
                LirInstr::FIsInt { dst, src } => {
                    expect(*dst, Ty::Bool, instr)?;
                    expect(*src, Ty::F64, instr)?;
                }
                LirInstr::BNot { dst, src } => {
                    expect(*dst, Ty::Bool, instr)?;
                    expect(*src, Ty::Bool, instr)?;
                }
                LirInstr::BAnd { dst, lhs, rhs } => {
                    expect(*dst, Ty::Bool, instr)?;
                    expect(*lhs, Ty::Bool, instr)?;
                    expect(*rhs, Ty::Bool, instr)?;
                }
                LirInstr::Move { dst, src } => expect(*src, ty(*dst)?, instr)?,
                LirInstr::Call { dst, helper, args } => {
                    let sig = helper.signature();
                    if args.len() < sig.params.len()
                        || (sig.rest.is_none() && args.len() != sig.params.len())
                    {
                        return Err(fail(format!("{}: wrong argument count", instr)));
                    }
                    for (i, arg) in args.iter().enumerate() {
                        let want = sig.params.get(i).copied().or(sig.rest);
                        if let Some(want) = want {
                            expect(*arg, want, instr)?;
                        }
                    }
                    match (dst, sig.ret) {
                        (Some(dst), Some(ret)) => expect(*dst, ret, instr)?,
                        (None, _) => {}
                        (Some(_), None) => {
                            return Err(fail(format!("{}: helper has no result", instr)))
                        }
                    }
                }
            }
        }

        let target = |label: &Label| -> CompileResult<()> {
            if labels.contains(label) {
                Ok(())
            } else {
                Err(fail(format!("{} jumps to missing {}", block.label, label)))
            }
        };
        match &block.terminator {
            Terminator::Return(reg) => {
                if ty(*reg)? != Ty::Datum {
                    return Err(fail(format!("{} returns non-datum {}", block.label, reg)));
                }
            }
            Terminator::Jump(label) => target(label)?,
            Terminator::Branch {
                cond,
                then_label,
                else_label,
            } => {
                if ty(*cond)? != Ty::Bool {
                    return Err(fail(format!("{} branches on non-bool {}", block.label, cond)));
                }
                target(then_label)?;
                target(else_label)?;
            }
            Terminator::Unreachable => {}
        }
    }
    Ok(())
}
