//! Runtime bridge vocabulary
//!
//! Every call compiled code makes back into the runtime goes through one of
//! these helpers. The signature tells backends how to pass arguments; the
//! runtime module implements them.

use super::types::Ty;
use crate::primitives::{DataOp, TurtleOp};

/// Math routines with no access to the execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathFn {
    Sqrt,
    Exp,
    Log10,
    Ln,
    Trunc,
    Round,
    Sin,
    Cos,
    Atan,
    Atan2,
    Pow,
    /// 32-bit remainder, sign of the dividend
    Remainder,
    /// 32-bit modulo, sign of the divisor
    Modulo,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    Ashift,
    Lshift,
}

impl MathFn {
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            MathFn::Atan2
                | MathFn::Pow
                | MathFn::Remainder
                | MathFn::Modulo
                | MathFn::BitAnd
                | MathFn::BitOr
                | MathFn::BitXor
                | MathFn::Ashift
                | MathFn::Lshift
        )
    }

    /// Apply the function. Integer routines expect operands already
    /// checked to be 32-bit integers (and a non-zero divisor).
    pub fn apply(self, a: f64, b: f64) -> f64 {
        let (ia, ib) = (a as i32, b as i32);
        match self {
            MathFn::Sqrt => a.sqrt(),
            MathFn::Exp => a.exp(),
            MathFn::Log10 => a.log10(),
            MathFn::Ln => a.ln(),
            MathFn::Trunc => a.trunc(),
            MathFn::Round => a.round(),
            MathFn::Sin => a.sin(),
            MathFn::Cos => a.cos(),
            MathFn::Atan => a.atan(),
            MathFn::Atan2 => a.atan2(b),
            MathFn::Pow => a.powf(b),
            MathFn::Remainder => ia.wrapping_rem(ib) as f64,
            MathFn::Modulo => {
                let r = ia.wrapping_rem(ib);
                if r != 0 && ((r < 0) != (ib < 0)) {
                    r.wrapping_add(ib) as f64
                } else {
                    r as f64
                }
            }
            MathFn::BitAnd => (ia & ib) as f64,
            MathFn::BitOr => (ia | ib) as f64,
            MathFn::BitXor => (ia ^ ib) as f64,
            MathFn::BitNot => (!ia) as f64,
            MathFn::Ashift => {
                if ib >= 0 {
                    ia.wrapping_shl(ib as u32) as f64
                } else {
                    ia.wrapping_shr(ib.unsigned_abs()) as f64
                }
            }
            MathFn::Lshift => {
                if ib >= 0 {
                    ia.wrapping_shl(ib as u32) as f64
                } else {
                    ((ia as u32).wrapping_shr(ib.unsigned_abs()) as i32) as f64
                }
            }
        }
    }
}

/// Output style for PRINT, SHOW and TYPE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteMode {
    Print,
    Show,
    Type,
}

/// Parameter and result types of a helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub params: &'static [Ty],
    /// Type of any further arguments
    pub rest: Option<Ty>,
    pub ret: Option<Ty>,
}

const NONE: &[Ty] = &[];
const F: &[Ty] = &[Ty::F64];
const FF: &[Ty] = &[Ty::F64, Ty::F64];
const FFF: &[Ty] = &[Ty::F64, Ty::F64, Ty::F64];
const B: &[Ty] = &[Ty::Bool];
const D: &[Ty] = &[Ty::Datum];
const DD: &[Ty] = &[Ty::Datum, Ty::Datum];
const DDD: &[Ty] = &[Ty::Datum, Ty::Datum, Ty::Datum];

/// Runtime bridge entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Helper {
    // === Values ===
    WordFromF64,
    WordFromBool,
    DoubleOf,
    DoubleValid,
    BoolOf,
    BoolValid,
    /// True if the datum's tag intersects the mask
    HasTag(u32),

    // === Errors ===
    ErrDoesntLike,
    ErrDontSay,
    ErrDidntOutput,
    ErrNoValue,
    ErrNotEnoughInputs,
    ErrTooManyInputs,
    ErrNoTest,
    ErrToplevel,
    ErrSystem,
    /// THROW tag [value]
    Throw,

    // === Flow-control tokens ===
    /// STOP when the value is nothing, OUTPUT otherwise
    ReturnToken,
    GotoToken,
    /// Tail call: node, call node, then the evaluated arguments
    ContinuationToken,

    // === Control bridges ===
    RunList,
    /// Procedure call node, then the evaluated arguments
    RunProcedure,
    Pause,
    Erract,
    WriteError,
    Repcount,
    SetRepcount,
    BeginCatch,
    /// Stashed ERRACT, catch tag, catch node, result
    EndCatch,
    ErrorList,
    SetTest,
    IsTested,
    TestedState,
    RunResult,
    ContinueToken,

    // === Workspace ===
    GetVar,
    /// Node, name, value
    SetVar,
    /// Node, then names or lists of names
    MakeLocal,

    // === Data and I/O ===
    /// Node, then the operands
    Data(DataOp),
    Write(WriteMode),

    // === Math ===
    Math(MathFn),
    Random,
    RandomRange,
    Rerandom,
    RerandomSeed,
    Form,

    // === Turtle ===
    Turtle(TurtleOp),
    /// Node, position list
    SetPos,
    Pos,
    Heading,
    /// Node, position list
    Towards,
    PenDownP,
    ShownP,
}

impl Helper {
    pub fn signature(self) -> Signature {
        let sig = |params: &'static [Ty], ret: Option<Ty>| Signature {
            params,
            rest: None,
            ret,
        };
        let datum = Some(Ty::Datum);
        match self {
            Helper::WordFromF64 => sig(F, datum),
            Helper::WordFromBool => sig(B, datum),
            Helper::DoubleOf => sig(D, Some(Ty::F64)),
            Helper::DoubleValid | Helper::BoolOf | Helper::BoolValid | Helper::HasTag(_) => {
                sig(D, Some(Ty::Bool))
            }

            Helper::ErrDoesntLike | Helper::ErrDidntOutput | Helper::Throw => sig(DD, datum),
            Helper::ErrDontSay
            | Helper::ErrNoValue
            | Helper::ErrNotEnoughInputs
            | Helper::ErrTooManyInputs
            | Helper::ErrNoTest => sig(D, datum),
            Helper::ErrToplevel | Helper::ErrSystem => sig(NONE, datum),

            Helper::ReturnToken | Helper::GotoToken => sig(DD, datum),
            Helper::ContinuationToken => Signature {
                params: DD,
                rest: Some(Ty::Datum),
                ret: datum,
            },

            Helper::RunList | Helper::RunResult | Helper::ContinueToken => sig(D, datum),
            Helper::RunProcedure | Helper::MakeLocal | Helper::Data(_) => Signature {
                params: D,
                rest: Some(Ty::Datum),
                ret: datum,
            },
            Helper::Pause | Helper::BeginCatch | Helper::ErrorList => sig(NONE, datum),
            Helper::Erract | Helper::IsTested | Helper::TestedState => sig(NONE, Some(Ty::Bool)),
            Helper::WriteError => sig(D, None),
            Helper::Repcount => sig(NONE, Some(Ty::F64)),
            Helper::SetRepcount => sig(F, None),
            Helper::EndCatch => Signature {
                params: &[Ty::Datum, Ty::Datum, Ty::Datum, Ty::Datum],
                rest: None,
                ret: datum,
            },
            Helper::SetTest => sig(B, None),

            Helper::GetVar => sig(D, datum),
            Helper::SetVar => sig(DDD, datum),

            Helper::Write(_) => Signature {
                params: NONE,
                rest: Some(Ty::Datum),
                ret: None,
            },

            Helper::Math(f) => sig(if f.is_binary() { FF } else { F }, Some(Ty::F64)),
            Helper::Random => sig(F, Some(Ty::F64)),
            Helper::RandomRange => sig(FF, Some(Ty::F64)),
            Helper::Rerandom => sig(NONE, None),
            Helper::RerandomSeed => sig(F, None),
            Helper::Form => sig(FFF, datum),

            Helper::Turtle(op) => {
                let params = match op.inputs() {
                    0 => NONE,
                    1 => F,
                    _ => FF,
                };
                sig(params, datum)
            }
            Helper::SetPos | Helper::Towards => sig(DD, datum),
            Helper::Pos => sig(NONE, datum),
            Helper::Heading => sig(NONE, Some(Ty::F64)),
            Helper::PenDownP | Helper::ShownP => sig(NONE, Some(Ty::Bool)),
        }
    }
}
