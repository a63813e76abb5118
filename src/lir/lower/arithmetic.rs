//! Arithmetic, comparison and logic lowering

use std::f64::consts::PI;

use super::*;
use crate::lir::MathFn;

impl Lowerer {
    /// SUM and PRODUCT: fold any number of inputs, `identity` for none.
    pub(super) fn gen_sum(&mut self, node: &DatumP, op: FBinOp, identity: f64) -> CompileResult<Reg> {
        let children = self.generate_children(node, RequestType::REAL)?;
        let mut iter = children.into_iter();
        let Some(mut acc) = iter.next() else {
            return Ok(self.emit_f64(identity));
        };
        for next in iter {
            acc = self.fbin(op, acc, next);
        }
        Ok(acc)
    }

    pub(super) fn gen_difference(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let c = self.generate_children(node, RequestType::REAL)?;
        Ok(self.fbin(FBinOp::Sub, c[0], c[1]))
    }

    pub(super) fn gen_minus(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let src = self.generate_child(node, 0, RequestType::REAL)?;
        let dst = self.fresh_reg(Ty::F64);
        self.emit(LirInstr::FNeg { dst, src });
        Ok(dst)
    }

    /// QUOTIENT a b, or the reciprocal with one input. The divisor must
    /// not be zero.
    pub(super) fn gen_quotient(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let c = self.generate_children(node, RequestType::REAL)?;
        if c.len() == 1 {
            let divisor = self.not_zero(node, c[0]);
            let one = self.emit_f64(1.0);
            return Ok(self.fbin(FBinOp::Div, one, divisor));
        }
        let divisor = self.not_zero(node, c[1]);
        Ok(self.fbin(FBinOp::Div, c[0], divisor))
    }

    /// REMAINDER and MODULO on 32-bit integers.
    pub(super) fn gen_remainder(&mut self, node: &DatumP, f: MathFn) -> CompileResult<Reg> {
        let c = self.generate_children(node, RequestType::REAL)?;
        let num = self.int32_from_double(node, c[0]);
        let denom = self.nonzero_int32(node, c[1]);
        Ok(self.call(Helper::Math(f), &[num, denom]))
    }

    pub(super) fn gen_sqrt(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let src = self.generate_child(node, 0, RequestType::REAL)?;
        let src = self.not_negative(node, src);
        Ok(self.call(Helper::Math(MathFn::Sqrt), &[src]))
    }

    /// POWER base exp: a negative base needs an integral exponent.
    pub(super) fn gen_power(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let c = self.generate_children(node, RequestType::REAL)?;
        let base = c[0];
        let exponent = self.fresh_reg(Ty::F64);
        self.emit_move(exponent, c[1]);

        let zero = self.emit_f64(0.0);
        let negative = self.fcmp(CmpOp::Lt, base, zero);
        let check = self.fresh_label();
        let merge = self.fresh_label();
        self.terminate(Terminator::Branch {
            cond: negative,
            then_label: check,
            else_label: merge,
        });
        self.start_new_block(check);
        let checked = self.int32_from_double(node, exponent);
        self.emit_move(exponent, checked);
        self.terminate(Terminator::Jump(merge));
        self.start_new_block(merge);

        Ok(self.call(Helper::Math(MathFn::Pow), &[base, exponent]))
    }

    pub(super) fn gen_unary_math(&mut self, node: &DatumP, f: MathFn) -> CompileResult<Reg> {
        let src = self.generate_child(node, 0, RequestType::REAL)?;
        Ok(self.call(Helper::Math(f), &[src]))
    }

    /// LOG10 and LN need a positive input.
    pub(super) fn gen_log(&mut self, node: &DatumP, f: MathFn) -> CompileResult<Reg> {
        let src = self.generate_child(node, 0, RequestType::REAL)?;
        let src = self.greater_than_zero(node, src);
        Ok(self.call(Helper::Math(f), &[src]))
    }

    pub(super) fn gen_trig(&mut self, node: &DatumP, f: MathFn, degrees: bool) -> CompileResult<Reg> {
        let mut src = self.generate_child(node, 0, RequestType::REAL)?;
        if degrees {
            let scale = self.emit_f64(PI / 180.0);
            src = self.fbin(FBinOp::Mul, src, scale);
        }
        Ok(self.call(Helper::Math(f), &[src]))
    }

    /// ARCTAN x, or (ARCTAN x y) for the angle of the point (x, y).
    pub(super) fn gen_arctan(&mut self, node: &DatumP, degrees: bool) -> CompileResult<Reg> {
        let c = self.generate_children(node, RequestType::REAL)?;
        let mut theta = if c.len() == 1 {
            self.call(Helper::Math(MathFn::Atan), &[c[0]])
        } else {
            self.call(Helper::Math(MathFn::Atan2), &[c[1], c[0]])
        };
        if degrees {
            let scale = self.emit_f64(180.0 / PI);
            theta = self.fbin(FBinOp::Mul, theta, scale);
        }
        Ok(theta)
    }

    pub(super) fn gen_bitwise(&mut self, node: &DatumP, f: MathFn, identity: f64) -> CompileResult<Reg> {
        let children = self.generate_children(node, RequestType::REAL)?;
        let ints: Vec<Reg> = children
            .into_iter()
            .map(|c| self.int32_from_double(node, c))
            .collect();
        let mut iter = ints.into_iter();
        let Some(mut acc) = iter.next() else {
            return Ok(self.emit_f64(identity));
        };
        for next in iter {
            acc = self.call(Helper::Math(f), &[acc, next]);
        }
        Ok(acc)
    }

    pub(super) fn gen_bitnot(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let src = self.generate_child(node, 0, RequestType::REAL)?;
        let src = self.int32_from_double(node, src);
        Ok(self.call(Helper::Math(MathFn::BitNot), &[src]))
    }

    pub(super) fn gen_shift(&mut self, node: &DatumP, f: MathFn) -> CompileResult<Reg> {
        let c = self.generate_children(node, RequestType::REAL)?;
        let num = self.int32_from_double(node, c[0]);
        let count = self.int32_from_double(node, c[1]);
        Ok(self.call(Helper::Math(f), &[num, count]))
    }

    /// RANDOM n is in [0, n); (RANDOM start end) is in [start, end].
    pub(super) fn gen_random(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let c = self.generate_children(node, RequestType::REAL)?;
        if c.len() == 1 {
            let n = self.validation_double(node, c[0], |this, v| {
                let zero = this.emit_f64(0.0);
                let positive = this.fcmp(CmpOp::Gt, v, zero);
                let is_int = this.fresh_reg(Ty::Bool);
                this.emit(LirInstr::FIsInt { dst: is_int, src: v });
                let dst = this.fresh_reg(Ty::Bool);
                this.emit(LirInstr::BAnd {
                    dst,
                    lhs: positive,
                    rhs: is_int,
                });
                dst
            });
            return Ok(self.call(Helper::Random, &[n]));
        }
        let start = self.int32_from_double(node, c[0]);
        let end = self.int32_from_double(node, c[1]);
        let backwards = self.fcmp(CmpOp::Gt, start, end);
        let who = node.display_name();
        self.return_error_if(backwards, |this| {
            let who_reg = this.emit_datum(&who);
            let end_word = this.call(Helper::WordFromF64, &[end]);
            this.call(Helper::ErrDoesntLike, &[who_reg, end_word])
        });
        Ok(self.call(Helper::RandomRange, &[start, end]))
    }

    pub(super) fn gen_rerandom(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let c = self.generate_children(node, RequestType::REAL)?;
        match c.first() {
            Some(&seed) => {
                let seed = self.count_from_double(node, seed);
                self.call_void(Helper::RerandomSeed, &[seed]);
            }
            None => self.call_void(Helper::Rerandom, &[]),
        }
        Ok(self.emit_datum(node))
    }

    /// FORM num width precision
    pub(super) fn gen_form(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let c = self.generate_children(node, RequestType::REAL)?;
        let width = self.int32_from_double(node, c[1]);
        let precision = self.count_from_double(node, c[2]);
        Ok(self.call(Helper::Form, &[c[0], width, precision]))
    }

    /// An infix operator written where a prefix call belongs.
    pub(super) fn gen_infix_error(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let name = self.emit_datum(&node.display_name());
        let err = self.call(Helper::ErrNotEnoughInputs, &[name]);
        self.return_now(err);
        Ok(self.emit_datum(node))
    }

    pub(super) fn gen_compare(&mut self, node: &DatumP, op: CmpOp) -> CompileResult<Reg> {
        let c = self.generate_children(node, RequestType::REAL)?;
        Ok(self.fcmp(op, c[0], c[1]))
    }

    pub(super) fn gen_not(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let src = self.generate_child(node, 0, RequestType::BOOL)?;
        Ok(self.bnot(src))
    }

    /// AND and OR. Each operand is lowered in its own block, reached only
    /// if the answer is still open; list operands are run first.
    pub(super) fn gen_and_or(&mut self, node: &DatumP, is_and: bool) -> CompileResult<Reg> {
        let children: Vec<DatumP> = node_of(node)?.children().to_vec();
        let result = self.fresh_reg(Ty::Bool);
        let init = self.emit_bool(is_and);
        self.emit_move(result, init);
        if children.is_empty() {
            return Ok(result);
        }

        let exit = self.fresh_label();
        let last = children.len() - 1;
        for (i, operand) in children.iter().enumerate() {
            let raw = self.lower_node(operand, RequestType::DATUM_OR_BOOL)?;
            let value = self.cast(raw, Some(node), operand, RequestType::DATUM_OR_BOOL)?;
            let b = match self.reg_ty(value) {
                Ty::Bool => value,
                _ => {
                    let value = self.exec_if_list(node, value);
                    self.bool_from_datum(node, value)
                }
            };
            self.emit_move(result, b);
            if i < last {
                let next = self.fresh_label();
                let (then_label, else_label) = if is_and { (next, exit) } else { (exit, next) };
                self.terminate(Terminator::Branch {
                    cond: b,
                    then_label,
                    else_label,
                });
                self.start_new_block(next);
            }
        }
        self.terminate(Terminator::Jump(exit));
        self.start_new_block(exit);
        Ok(result)
    }

    /// A list used as a condition is run and its output used instead.
    pub(super) fn exec_if_list(&mut self, who: &DatumP, value: Reg) -> Reg {
        let out = self.fresh_reg(Ty::Datum);
        self.emit_move(out, value);
        let is_list = self.call(Helper::HasTag(tag::LIST), &[value]);
        let run = self.fresh_label();
        let cont = self.fresh_label();
        self.terminate(Terminator::Branch {
            cond: is_list,
            then_label: run,
            else_label: cont,
        });
        self.start_new_block(run);
        let result = self.call(Helper::RunList, &[value]);
        self.propagate_flow(result);
        let result = self.not_nothing_from_datum(who, result);
        self.emit_move(out, result);
        self.terminate(Terminator::Jump(cont));
        self.start_new_block(cont);
        out
    }
}
