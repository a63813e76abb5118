//! LIR type definitions

use smallvec::SmallVec;

use super::helper::Helper;
use crate::value::DatumP;

/// Virtual register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reg(pub u32);

impl Reg {
    pub fn new(id: u32) -> Self {
        Reg(id)
    }
}

/// Basic block label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

impl Label {
    pub fn new(id: u32) -> Self {
        Label(id)
    }
}

/// Native representation held by a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ty {
    F64,
    Bool,
    /// Opaque handle to a value
    Datum,
}

/// A LIR function (compilation unit)
///
/// Compiled functions take the execution context and a requested block id
/// and return a datum. Registers are typed and may be written more than
/// once (loop counters and retry candidates are rewritten with `Move`).
#[derive(Debug, Clone)]
pub struct LirFunction {
    /// Function name (for debugging)
    pub name: String,
    /// Basic blocks
    pub blocks: Vec<BasicBlock>,
    /// Entry block label
    pub entry: Label,
    /// Type of each register, indexed by register number
    pub reg_types: Vec<Ty>,
    /// Datum constants referenced by `ConstDatum`
    pub constants: Vec<DatumP>,
}

impl LirFunction {
    pub fn new(name: impl Into<String>) -> Self {
        LirFunction {
            name: name.into(),
            blocks: Vec::new(),
            entry: Label(0),
            reg_types: Vec::new(),
            constants: Vec::new(),
        }
    }

    pub fn num_regs(&self) -> u32 {
        self.reg_types.len() as u32
    }

    pub fn reg_type(&self, reg: Reg) -> Ty {
        self.reg_types[reg.0 as usize]
    }

    pub fn block(&self, label: Label) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.label == label)
    }
}

/// A basic block - sequence of instructions ending in a terminator
#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub label: Label,
    pub instructions: Vec<LirInstr>,
    pub terminator: Terminator,
}

impl BasicBlock {
    pub fn new(label: Label) -> Self {
        BasicBlock {
            label,
            instructions: Vec::new(),
            terminator: Terminator::Unreachable,
        }
    }
}

/// LIR instruction
#[derive(Debug, Clone)]
pub enum LirInstr {
    // === Constants ===
    ConstF64 { dst: Reg, value: f64 },
    ConstBool { dst: Reg, value: bool },
    /// Load entry `index` of the function's constant pool
    ConstDatum { dst: Reg, index: u32 },

    // === Entry state ===
    /// True if the requested block id equals `id`
    BlockIdIs { dst: Reg, id: i32 },

    // === Floating point ===
    FBin {
        dst: Reg,
        op: FBinOp,
        lhs: Reg,
        rhs: Reg,
    },
    FNeg { dst: Reg, src: Reg },
    /// Ordered comparison
    FCmp {
        dst: Reg,
        op: CmpOp,
        lhs: Reg,
        rhs: Reg,
    },
    /// True if `src` survives a round trip through a 32-bit integer
    FIsInt { dst: Reg, src: Reg },

    // === Booleans ===
    BNot { dst: Reg, src: Reg },
    BAnd { dst: Reg, lhs: Reg, rhs: Reg },

    // === Registers ===
    Move { dst: Reg, src: Reg },

    // === Runtime bridge ===
    /// Call a bridge helper; `dst` is `None` for helpers with no result
    Call {
        dst: Option<Reg>,
        helper: Helper,
        args: SmallVec<[Reg; 4]>,
    },
}

/// Floating point binary operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FBinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Comparison operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn eval(self, lhs: f64, rhs: f64) -> bool {
        match self {
            CmpOp::Eq => lhs == rhs,
            // Ordered: NaN is never "not equal".
            CmpOp::Ne => lhs < rhs || lhs > rhs,
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
        }
    }
}

impl FBinOp {
    pub fn eval(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            FBinOp::Add => lhs + rhs,
            FBinOp::Sub => lhs - rhs,
            FBinOp::Mul => lhs * rhs,
            FBinOp::Div => lhs / rhs,
        }
    }
}

/// Round-trip test shared by every backend.
pub fn is_int32(value: f64) -> bool {
    // Saturating cast, same as the JIT's fcvt_to_sint_sat.
    (value as i32) as f64 == value
}

/// Block terminator
#[derive(Debug, Clone)]
pub enum Terminator {
    /// Return a datum from the function
    Return(Reg),
    /// Unconditional jump
    Jump(Label),
    /// Conditional branch on a boolean register
    Branch {
        cond: Reg,
        then_label: Label,
        else_label: Label,
    },
    /// Unreachable (after a return in the middle of a node)
    Unreachable,
}
