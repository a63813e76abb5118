//! Textual dump of LIR functions, used for `dump_ir` tracing and tests.

use std::fmt;

use super::types::*;

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

impl fmt::Display for LirInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LirInstr::ConstF64 { dst, value } => write!(f, "{} = f64 {}", dst, value),
            LirInstr::ConstBool { dst, value } => write!(f, "{} = bool {}", dst, value),
            LirInstr::ConstDatum { dst, index } => write!(f, "{} = const #{}", dst, index),
            LirInstr::BlockIdIs { dst, id } => write!(f, "{} = block_id == {}", dst, id),
            LirInstr::FBin { dst, op, lhs, rhs } => {
                write!(f, "{} = {:?} {}, {}", dst, op, lhs, rhs)
            }
            LirInstr::FNeg { dst, src } => write!(f, "{} = neg {}", dst, src),
            LirInstr::FCmp { dst, op, lhs, rhs } => {
                write!(f, "{} = cmp.{:?} {}, {}", dst, op, lhs, rhs)
            }
            LirInstr::FIsInt { dst, src } => write!(f, "{} = is_int {}", dst, src),
            LirInstr::BNot { dst, src } => write!(f, "{} = not {}", dst, src),
            LirInstr::BAnd { dst, lhs, rhs } => write!(f, "{} = and {}, {}", dst, lhs, rhs),
            LirInstr::Move { dst, src } => write!(f, "{} = {}", dst, src),
            LirInstr::Call { dst, helper, args } => {
                if let Some(dst) = dst {
                    write!(f, "{} = ", dst)?;
                }
                write!(f, "call {:?}(", helper)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminator::Return(reg) => write!(f, "return {}", reg),
            Terminator::Jump(label) => write!(f, "jump {}", label),
            Terminator::Branch {
                cond,
                then_label,
                else_label,
            } => write!(f, "branch {} ? {} : {}", cond, then_label, else_label),
            Terminator::Unreachable => f.write_str("unreachable"),
        }
    }
}

impl fmt::Display for LirFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fn {} entry {}:", self.name, self.entry)?;
        for (i, c) in self.constants.iter().enumerate() {
            writeln!(f, "  #{} = {}", i, c.show())?;
        }
        for block in &self.blocks {
            writeln!(f, "{}:", block.label)?;
            for instr in &block.instructions {
                writeln!(f, "    {}", instr)?;
            }
            writeln!(f, "    {}", block.terminator)?;
        }
        Ok(())
    }
}
