//! Coercion between native and datum representations
//!
//! `cast` reconciles what a node produced with what its consumer asked
//! for. Failed probes of a datum go through the validation loops, which
//! consult ERRACT and PAUSE for a replacement before giving up.

use super::*;

impl Lowerer {
    /// Convert `src`, produced by `node`, to the `request`ed representation.
    pub(crate) fn cast(
        &mut self,
        src: Reg,
        parent: Option<&DatumP>,
        node: &DatumP,
        request: RequestType,
    ) -> CompileResult<Reg> {
        let produced = node_of(node)?.returns();
        let who = parent.unwrap_or(node).clone();

        match self.reg_ty(src) {
            Ty::F64 => {
                if request.contains(RequestType::REAL) {
                    return Ok(src);
                }
                let word = self.call(Helper::WordFromF64, &[src]);
                self.finish_native_cast(word, &who, request)
            }
            Ty::Bool => {
                if request.contains(RequestType::BOOL) {
                    return Ok(src);
                }
                let word = self.call(Helper::WordFromBool, &[src]);
                self.finish_native_cast(word, &who, request)
            }
            Ty::Datum => {
                if produced == request {
                    return Ok(src);
                }
                if produced == RequestType::NOTHING {
                    if request.contains(RequestType::NOTHING) {
                        return Ok(src);
                    }
                    let who_reg = self.emit_datum(&who.display_name());
                    let err = self.call(Helper::ErrDidntOutput, &[src, who_reg]);
                    self.return_now(err);
                    return Ok(src);
                }
                if produced == RequestType::DATUM_OR_NOTHING {
                    // Tokens from a nested run pass straight through.
                    self.propagate_flow(src);
                    if request == RequestType::NOTHING {
                        return Ok(self.nothing_from_datum(src));
                    }
                    if request.contains(RequestType::DATUM) {
                        if request.contains(RequestType::NOTHING) {
                            return Ok(src);
                        }
                        return Ok(self.not_nothing_from_datum(&who, src));
                    }
                    let value = self.not_nothing_from_datum(&who, src);
                    return self.datum_to_native(&who, value, request);
                }
                // A datum.
                if request.contains(RequestType::DATUM) {
                    return Ok(src);
                }
                if request.contains(RequestType::NOTHING) {
                    let err = self.call(Helper::ErrDontSay, &[src]);
                    self.return_now(err);
                    return Ok(src);
                }
                self.datum_to_native(&who, src, request)
            }
        }
    }

    /// A boxed native value headed somewhere that is not a datum slot.
    fn finish_native_cast(
        &mut self,
        word: Reg,
        who: &DatumP,
        request: RequestType,
    ) -> CompileResult<Reg> {
        if request.contains(RequestType::DATUM) {
            return Ok(word);
        }
        if request.contains(RequestType::REAL) || request.contains(RequestType::BOOL) {
            // No direct bool <-> double conversion.
            let who_reg = self.emit_datum(&who.display_name());
            let err = self.call(Helper::ErrDoesntLike, &[who_reg, word]);
            self.return_now(err);
            return Ok(self.placeholder(request));
        }
        let err = self.call(Helper::ErrDontSay, &[word]);
        self.return_now(err);
        Ok(word)
    }

    fn datum_to_native(
        &mut self,
        who: &DatumP,
        src: Reg,
        request: RequestType,
    ) -> CompileResult<Reg> {
        if request.contains(RequestType::BOOL) {
            return Ok(self.bool_from_datum(who, src));
        }
        if request.contains(RequestType::REAL) {
            return Ok(self.double_from_datum(who, src));
        }
        Err(CompileError::Unsupported {
            name: who.show(),
            reason: format!("no conversion to {:?}", request),
        })
    }

    /// A register of the requested kind for code after an unconditional return.
    fn placeholder(&mut self, request: RequestType) -> Reg {
        if request.contains(RequestType::REAL) {
            self.emit_f64(0.0)
        } else if request.contains(RequestType::BOOL) {
            self.emit_bool(false)
        } else {
            self.emit_datum(&DatumP::nothing())
        }
    }

    /// A statement position: anything with data is "don't say what to do".
    pub(crate) fn nothing_from_datum(&mut self, src: Reg) -> Reg {
        let has_data = self.call(Helper::HasTag(tag::DATA_MASK), &[src]);
        self.return_error_if(has_data, |this| this.call(Helper::ErrDontSay, &[src]));
        src
    }

    /// An operand position: no value is "didn't output".
    pub(crate) fn not_nothing_from_datum(&mut self, who: &DatumP, src: Reg) -> Reg {
        let has_data = self.call(Helper::HasTag(tag::DATA_MASK), &[src]);
        let missing = self.bnot(has_data);
        let who_name = who.display_name();
        self.return_error_if(missing, |this| {
            let who_reg = this.emit_datum(&who_name);
            this.call(Helper::ErrDidntOutput, &[src, who_reg])
        });
        src
    }

    pub(crate) fn double_from_datum(&mut self, who: &DatumP, src: Reg) -> Reg {
        let result = self.fresh_reg(Ty::F64);
        self.validation_datum(who, src, |this, candidate| {
            let value = this.call(Helper::DoubleOf, &[candidate]);
            this.emit_move(result, value);
            this.call(Helper::DoubleValid, &[candidate])
        });
        result
    }

    pub(crate) fn bool_from_datum(&mut self, who: &DatumP, src: Reg) -> Reg {
        let result = self.fresh_reg(Ty::Bool);
        self.validation_datum(who, src, |this, candidate| {
            let value = this.call(Helper::BoolOf, &[candidate]);
            this.emit_move(result, value);
            this.call(Helper::BoolValid, &[candidate])
        });
        result
    }

    /// Require the datum's tag to intersect `mask`.
    pub(crate) fn datum_with_tag(&mut self, who: &DatumP, mask: u32, src: Reg) -> Reg {
        self.validation_datum(who, src, |this, candidate| {
            this.call(Helper::HasTag(mask), &[candidate])
        })
    }

    /// Retry loop for a datum operand.
    ///
    /// `validator` emits a boolean check of the candidate. On failure, if
    /// ERRACT is set the error is printed and PAUSE supplies a new
    /// candidate, which goes around again; a non-datum reply from PAUSE is
    /// returned as is. Without ERRACT the error is returned.
    pub(crate) fn validation_datum(
        &mut self,
        who: &DatumP,
        src: Reg,
        validator: impl FnOnce(&mut Self, Reg) -> Reg,
    ) -> Reg {
        let candidate = self.fresh_reg(Ty::Datum);
        self.emit_move(candidate, src);

        let try_label = self.fresh_label();
        let not_valid = self.fresh_label();
        let erract = self.fresh_label();
        let not_datum = self.fresh_label();
        let bailout = self.fresh_label();
        let accept = self.fresh_label();
        let who_name = who.display_name();

        self.terminate(Terminator::Jump(try_label));
        self.start_new_block(try_label);
        let valid = validator(self, candidate);
        self.terminate(Terminator::Branch {
            cond: valid,
            then_label: accept,
            else_label: not_valid,
        });

        self.start_new_block(not_valid);
        let erract_set = self.call(Helper::Erract, &[]);
        self.terminate(Terminator::Branch {
            cond: erract_set,
            then_label: erract,
            else_label: bailout,
        });

        self.start_new_block(erract);
        let who_reg = self.emit_datum(&who_name);
        let err = self.call(Helper::ErrDoesntLike, &[who_reg, candidate]);
        self.call_void(Helper::WriteError, &[err]);
        let reply = self.call(Helper::Pause, &[]);
        self.emit_move(candidate, reply);
        let is_datum = self.call(Helper::HasTag(tag::DATA_MASK), &[reply]);
        self.terminate(Terminator::Branch {
            cond: is_datum,
            then_label: try_label,
            else_label: not_datum,
        });

        self.start_new_block(not_datum);
        self.terminate(Terminator::Return(candidate));

        self.start_new_block(bailout);
        let who_reg = self.emit_datum(&who_name);
        let err = self.call(Helper::ErrDoesntLike, &[who_reg, candidate]);
        self.terminate(Terminator::Return(err));

        self.start_new_block(accept);
        candidate
    }

    /// Retry loop for a native double operand.
    ///
    /// Same protocol as [`validation_datum`](Self::validation_datum); the
    /// replacement from PAUSE must itself read as a number, and a reply
    /// that is not a datum escapes to top level.
    pub(crate) fn validation_double(
        &mut self,
        who: &DatumP,
        src: Reg,
        validator: impl FnOnce(&mut Self, Reg) -> Reg,
    ) -> Reg {
        let candidate = self.fresh_reg(Ty::F64);
        self.emit_move(candidate, src);
        let bad = self.fresh_reg(Ty::Datum);

        let validate = self.fresh_label();
        let convert = self.fresh_label();
        let erract = self.fresh_label();
        let reprobe = self.fresh_label();
        let not_datum = self.fresh_label();
        let bailout = self.fresh_label();
        let accept = self.fresh_label();
        let who_name = who.display_name();

        self.terminate(Terminator::Jump(validate));
        self.start_new_block(validate);
        let valid = validator(self, candidate);
        self.terminate(Terminator::Branch {
            cond: valid,
            then_label: accept,
            else_label: convert,
        });

        self.start_new_block(convert);
        let word = self.call(Helper::WordFromF64, &[candidate]);
        self.emit_move(bad, word);
        let erract_set = self.call(Helper::Erract, &[]);
        self.terminate(Terminator::Branch {
            cond: erract_set,
            then_label: erract,
            else_label: bailout,
        });

        self.start_new_block(erract);
        let who_reg = self.emit_datum(&who_name);
        let err = self.call(Helper::ErrDoesntLike, &[who_reg, bad]);
        self.call_void(Helper::WriteError, &[err]);
        let reply = self.call(Helper::Pause, &[]);
        let is_datum = self.call(Helper::HasTag(tag::DATA_MASK), &[reply]);
        self.terminate(Terminator::Branch {
            cond: is_datum,
            then_label: reprobe,
            else_label: not_datum,
        });

        self.start_new_block(reprobe);
        self.emit_move(bad, reply);
        let number = self.call(Helper::DoubleOf, &[reply]);
        self.emit_move(candidate, number);
        let is_number = self.call(Helper::DoubleValid, &[reply]);
        self.terminate(Terminator::Branch {
            cond: is_number,
            then_label: validate,
            else_label: erract,
        });

        self.start_new_block(not_datum);
        let escape = self.call(Helper::ErrToplevel, &[]);
        self.terminate(Terminator::Return(escape));

        self.start_new_block(bailout);
        let who_reg = self.emit_datum(&who_name);
        let err = self.call(Helper::ErrDoesntLike, &[who_reg, bad]);
        self.terminate(Terminator::Return(err));

        self.start_new_block(accept);
        candidate
    }

    // === Validators ===

    pub(crate) fn int32_from_double(&mut self, who: &DatumP, src: Reg) -> Reg {
        self.validation_double(who, src, |this, c| {
            let dst = this.fresh_reg(Ty::Bool);
            this.emit(LirInstr::FIsInt { dst, src: c });
            dst
        })
    }

    pub(crate) fn not_zero(&mut self, who: &DatumP, src: Reg) -> Reg {
        self.validation_double(who, src, |this, c| {
            let zero = this.emit_f64(0.0);
            this.fcmp(CmpOp::Ne, c, zero)
        })
    }

    pub(crate) fn not_negative(&mut self, who: &DatumP, src: Reg) -> Reg {
        self.validation_double(who, src, |this, c| {
            let zero = this.emit_f64(0.0);
            this.fcmp(CmpOp::Ge, c, zero)
        })
    }

    pub(crate) fn greater_than_zero(&mut self, who: &DatumP, src: Reg) -> Reg {
        self.validation_double(who, src, |this, c| {
            let zero = this.emit_f64(0.0);
            this.fcmp(CmpOp::Gt, c, zero)
        })
    }

    /// Non-zero 32-bit integer, for divisors of integer division.
    pub(crate) fn nonzero_int32(&mut self, who: &DatumP, src: Reg) -> Reg {
        self.validation_double(who, src, |this, c| {
            let zero = this.emit_f64(0.0);
            let nonzero = this.fcmp(CmpOp::Ne, c, zero);
            let is_int = this.fresh_reg(Ty::Bool);
            this.emit(LirInstr::FIsInt { dst: is_int, src: c });
            let dst = this.fresh_reg(Ty::Bool);
            this.emit(LirInstr::BAnd {
                dst,
                lhs: nonzero,
                rhs: is_int,
            });
            dst
        })
    }

    /// Non-negative 32-bit integer, for counts.
    pub(crate) fn count_from_double(&mut self, who: &DatumP, src: Reg) -> Reg {
        self.validation_double(who, src, |this, c| {
            let zero = this.emit_f64(0.0);
            let non_negative = this.fcmp(CmpOp::Ge, c, zero);
            let is_int = this.fresh_reg(Ty::Bool);
            this.emit(LirInstr::FIsInt { dst: is_int, src: c });
            let dst = this.fresh_reg(Ty::Bool);
            this.emit(LirInstr::BAnd {
                dst,
                lhs: is_int,
                rhs: non_negative,
            });
            dst
        })
    }
}
