//! Register machine backend
//!
//! Executes LIR directly. Labels are resolved to block indices at link
//! time; registers live in a frame allocated per call.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::error;

use super::{Backend, Code, EntryPoint};
use crate::error::{CompileError, CompileResult};
use crate::lir::{is_int32, Label, LirFunction, LirInstr, Reg, Terminator, Ty};
use crate::runtime::{Evaluator, RegValue};
use crate::value::DatumP;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct MachineBackend {
    linked: u64,
}

impl MachineBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MachineBackend {
    fn name(&self) -> &'static str {
        "machine"
    }

    fn compile_and_link(&mut self, func: LirFunction) -> CompileResult<Rc<EntryPoint>> {
        let name = func.name.clone();
        let program = Program::link(func)?;
        self.linked += 1;
        Ok(EntryPoint::new(name, Code::Machine(program)))
    }
}

enum Exit {
    Return(Reg),
    Jump(usize),
    Branch { cond: Reg, then_idx: usize, else_idx: usize },
    Unreachable,
}

struct Block {
    instructions: Vec<LirInstr>,
    exit: Exit,
}

/// A linked function for the register machine.
pub(crate) struct Program {
    name: String,
    blocks: Vec<Block>,
    entry: usize,
    reg_types: Vec<Ty>,
    constants: Vec<DatumP>,
}

impl Program {
    fn link(func: LirFunction) -> CompileResult<Program> {
        let index: FxHashMap<Label, usize> = func
            .blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (b.label, i))
            .collect();
        let resolve = |label: Label| -> CompileResult<usize> {
            index
                .get(&label)
                .copied()
                .ok_or_else(|| CompileError::Backend(format!("{}: no block {}", func.name, label)))
        };

        let mut blocks = Vec::with_capacity(func.blocks.len());
        for block in &func.blocks {
            let exit = match block.terminator {
                Terminator::Return(reg) => Exit::Return(reg),
                Terminator::Jump(target) => Exit::Jump(resolve(target)?),
                Terminator::Branch {
                    cond,
                    then_label,
                    else_label,
                } => Exit::Branch {
                    cond,
                    then_idx: resolve(then_label)?,
                    else_idx: resolve(else_label)?,
                },
                Terminator::Unreachable => Exit::Unreachable,
            };
            blocks.push(Block {
                instructions: block.instructions.clone(),
                exit,
            });
        }
        let entry = resolve(func.entry)?;

        Ok(Program {
            name: func.name,
            blocks,
            entry,
            reg_types: func.reg_types,
            constants: func.constants,
        })
    }

    pub(crate) fn run(&self, ev: &mut Evaluator, block_id: i32) -> DatumP {
        let mut regs: Vec<RegValue> = self
            .reg_types
            .iter()
            .map(|ty| match ty {
                Ty::F64 => RegValue::F64(0.0),
                Ty::Bool => RegValue::Bool(false),
                Ty::Datum => RegValue::Datum(DatumP::nothing()),
            })
            .collect();

        let mut pc = self.entry;
        loop {
            let block = &self.blocks[pc];
            for instr in &block.instructions {
                self.step(instr, &mut regs, ev, block_id);
            }
            pc = match block.exit {
                Exit::Return(reg) => return regs[reg.0 as usize].to_datum(),
                Exit::Jump(target) => target,
                Exit::Branch {
                    cond,
                    then_idx,
                    else_idx,
                } => {
                    if regs[cond.0 as usize].as_bool() {
                        then_idx
                    } else {
                        else_idx
                    }
                }
                Exit::Unreachable => {
                    error!(function = %self.name, block = pc, "reached an unreachable block");
                    return DatumP::nothing();
                }
            };
        }
    }

    fn step(&self, instr: &LirInstr, regs: &mut [RegValue], ev: &mut Evaluator, block_id: i32) {
        let f = |regs: &[RegValue], r: Reg| regs[r.0 as usize].as_f64();
        let b = |regs: &[RegValue], r: Reg| regs[r.0 as usize].as_bool();

        let (dst, value) = match instr {
            LirInstr::ConstF64 { dst, value } => (*dst, RegValue::F64(*value)),
            LirInstr::ConstBool { dst, value } => (*dst, RegValue::Bool(*value)),
            LirInstr::ConstDatum { dst, index } => {
                (*dst, RegValue::Datum(self.constants[*index as usize].clone()))
            }
            LirInstr::BlockIdIs { dst, id } => (*dst, RegValue::Bool(block_id == *id)),
            LirInstr::FBin { dst, op, lhs, rhs } => {
                (*dst, RegValue::F64(op.eval(f(regs, *lhs), f(regs, *rhs))))
            }
            LirInstr::FNeg { dst, src } => (*dst, RegValue::F64(-f(regs, *src))),
            LirInstr::FCmp { dst, op, lhs, rhs } => {
                (*dst, RegValue::Bool(op.eval(f(regs, *lhs), f(regs, *rhs))))
            }
            LirInstr::FIsInt { dst, src } => (*dst, RegValue::Bool(is_int32(f(regs, *src)))),
            LirInstr::BNot { dst, src } => (*dst, RegValue::Bool(!b(regs, *src))),
            LirInstr::BAnd { dst, lhs, rhs } => {
                (*dst, RegValue::Bool(b(regs, *lhs) && b(regs, *rhs)))
            }
            LirInstr::Move { dst, src } => (*dst, regs[src.0 as usize].clone()),
            LirInstr::Call { dst, helper, args } => {
                let argv: SmallVec<[RegValue; 4]> =
                    args.iter().map(|r| regs[r.0 as usize].clone()).collect();
                let out = ev.call_helper(*helper, &argv);
                match dst {
                    Some(dst) => (*dst, out),
                    None => return,
                }
            }
        };
        regs[dst.0 as usize] = value;
    }
}
