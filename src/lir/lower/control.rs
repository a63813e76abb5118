//! Control structures
//!
//! Loops and conditionals run their instruction lists through the
//! runtime and hand any flow-control token straight back to the caller.
//! STOP, OUTPUT, GOTO and THROW build a token and return it.

use super::*;

impl Lowerer {
    pub(super) fn gen_run(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let list = self.generate_child(node, 0, RequestType::DATUM)?;
        let list = self.datum_with_tag(node, tag::WORD_OR_LIST_MASK, list);
        Ok(self.call(Helper::RunList, &[list]))
    }

    /// RUNRESULT: `[value]`, `[]` for no value.
    pub(super) fn gen_runresult(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let list = self.generate_child(node, 0, RequestType::DATUM)?;
        let list = self.datum_with_tag(node, tag::WORD_OR_LIST_MASK, list);
        let result = self.call(Helper::RunResult, &[list]);
        self.propagate_flow(result);
        Ok(result)
    }

    /// REPEAT count list
    ///
    /// REPCOUNT counts from 1 and is restored on every way out. A value
    /// from the last pass is the output; a value from any other pass is
    /// "don't say what to do with".
    pub(super) fn gen_repeat(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let c = self.generate_children_with(node, &[RequestType::REAL, RequestType::DATUM])?;
        let count = self.count_from_double(node, c[0]);
        let list = self.datum_with_tag(node, tag::WORD_OR_LIST_MASK, c[1]);

        let saved = self.call(Helper::Repcount, &[]);
        let result = self.fresh_reg(Ty::Datum);
        let node_reg = self.emit_datum(node);
        self.emit_move(result, node_reg);
        let rc = self.fresh_reg(Ty::F64);
        let one = self.emit_f64(1.0);
        self.emit_move(rc, one);

        let head = self.fresh_label();
        let body = self.fresh_label();
        let exit = self.fresh_label();
        self.terminate(Terminator::Jump(head));

        self.start_new_block(head);
        let more = self.fcmp(CmpOp::Le, rc, count);
        self.terminate(Terminator::Branch {
            cond: more,
            then_label: body,
            else_label: exit,
        });

        self.start_new_block(body);
        self.call_void(Helper::SetRepcount, &[rc]);
        let value = self.call(Helper::RunList, &[list]);
        let is_last = self.fcmp(CmpOp::Eq, rc, count);
        self.loop_outcome(value, saved, Some((is_last, result, exit)));
        let next = self.fbin(FBinOp::Add, rc, one);
        self.emit_move(rc, next);
        self.terminate(Terminator::Jump(head));

        self.start_new_block(exit);
        self.call_void(Helper::SetRepcount, &[saved]);
        Ok(result)
    }

    /// FOREVER list: only a flow-control token or an error ends it.
    pub(super) fn gen_forever(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let list = self.generate_child(node, 0, RequestType::DATUM)?;
        let list = self.datum_with_tag(node, tag::WORD_OR_LIST_MASK, list);

        let saved = self.call(Helper::Repcount, &[]);
        let rc = self.fresh_reg(Ty::F64);
        let one = self.emit_f64(1.0);
        self.emit_move(rc, one);

        let head = self.fresh_label();
        self.terminate(Terminator::Jump(head));
        self.start_new_block(head);
        self.call_void(Helper::SetRepcount, &[rc]);
        let value = self.call(Helper::RunList, &[list]);
        self.loop_outcome(value, saved, None);
        let next = self.fbin(FBinOp::Add, rc, one);
        self.emit_move(rc, next);
        self.terminate(Terminator::Jump(head));

        let after = self.fresh_label();
        self.start_new_block(after);
        Ok(self.emit_datum(node))
    }

    /// Sort out one pass of a loop body. Tokens and errors leave the
    /// function; a value leaves the loop through `last` when it is the
    /// final pass, and is an error otherwise. Falls through when the pass
    /// produced nothing.
    fn loop_outcome(&mut self, value: Reg, saved: Reg, last: Option<(Reg, Reg, Label)>) {
        let is_flow = self.call(Helper::HasTag(tag::FLOW_CONTROL_MASK), &[value]);
        let leave = self.fresh_label();
        let check_data = self.fresh_label();
        self.terminate(Terminator::Branch {
            cond: is_flow,
            then_label: leave,
            else_label: check_data,
        });
        self.start_new_block(leave);
        self.call_void(Helper::SetRepcount, &[saved]);
        self.terminate(Terminator::Return(value));

        self.start_new_block(check_data);
        let has_data = self.call(Helper::HasTag(tag::DATA_MASK), &[value]);
        let data = self.fresh_label();
        let cont = self.fresh_label();
        self.terminate(Terminator::Branch {
            cond: has_data,
            then_label: data,
            else_label: cont,
        });

        self.start_new_block(data);
        let dont_say = self.fresh_label();
        match last {
            Some((is_last, result, exit)) => {
                let keep = self.fresh_label();
                self.terminate(Terminator::Branch {
                    cond: is_last,
                    then_label: keep,
                    else_label: dont_say,
                });
                self.start_new_block(keep);
                self.emit_move(result, value);
                self.terminate(Terminator::Jump(exit));
            }
            None => self.terminate(Terminator::Jump(dont_say)),
        }
        self.start_new_block(dont_say);
        self.call_void(Helper::SetRepcount, &[saved]);
        let err = self.call(Helper::ErrDontSay, &[value]);
        self.terminate(Terminator::Return(err));

        self.start_new_block(cont);
    }

    /// Turn an IF-style condition into a native boolean: a list is run for
    /// its value first.
    fn condition(&mut self, node: &DatumP, cond: Reg) -> Reg {
        match self.reg_ty(cond) {
            Ty::Bool => cond,
            _ => {
                let value = self.exec_if_list(node, cond);
                self.bool_from_datum(node, value)
            }
        }
    }

    /// IF and IFELSE. Without an else list the result is no value.
    pub(super) fn gen_if(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let arms = node_of(node)?.children().len() - 1;
        let mut requests = vec![RequestType::DATUM_OR_BOOL];
        requests.extend(std::iter::repeat(RequestType::DATUM).take(arms));
        let c = self.generate_children_with(node, &requests)?;

        let cond = self.condition(node, c[0]);
        let then_list = self.datum_with_tag(node, tag::WORD_OR_LIST_MASK, c[1]);
        let else_list = c
            .get(2)
            .map(|&list| self.datum_with_tag(node, tag::WORD_OR_LIST_MASK, list));

        let result = self.fresh_reg(Ty::Datum);
        let then_label = self.fresh_label();
        let else_label = self.fresh_label();
        let merge = self.fresh_label();
        self.terminate(Terminator::Branch {
            cond,
            then_label,
            else_label,
        });

        self.start_new_block(then_label);
        let value = self.call(Helper::RunList, &[then_list]);
        self.emit_move(result, value);
        self.terminate(Terminator::Jump(merge));

        self.start_new_block(else_label);
        let value = match else_list {
            Some(list) => self.call(Helper::RunList, &[list]),
            None => self.emit_datum(node),
        };
        self.emit_move(result, value);
        self.terminate(Terminator::Jump(merge));

        self.start_new_block(merge);
        Ok(result)
    }

    pub(super) fn gen_test(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let cond = self.generate_child(node, 0, RequestType::DATUM_OR_BOOL)?;
        let cond = self.condition(node, cond);
        self.call_void(Helper::SetTest, &[cond]);
        Ok(self.emit_datum(node))
    }

    /// IFTRUE and IFFALSE run their list when the last TEST in this
    /// procedure matched `when`.
    pub(super) fn gen_iftest(&mut self, node: &DatumP, when: bool) -> CompileResult<Reg> {
        let list = self.generate_child(node, 0, RequestType::DATUM)?;
        let list = self.datum_with_tag(node, tag::WORD_OR_LIST_MASK, list);

        let tested = self.call(Helper::IsTested, &[]);
        let untested = self.bnot(tested);
        let name = node.display_name();
        self.return_error_if(untested, |this| {
            let name = this.emit_datum(&name);
            this.call(Helper::ErrNoTest, &[name])
        });

        let state = self.call(Helper::TestedState, &[]);
        let cond = if when { state } else { self.bnot(state) };

        let result = self.fresh_reg(Ty::Datum);
        let node_reg = self.emit_datum(node);
        self.emit_move(result, node_reg);
        let run = self.fresh_label();
        let merge = self.fresh_label();
        self.terminate(Terminator::Branch {
            cond,
            then_label: run,
            else_label: merge,
        });
        self.start_new_block(run);
        let value = self.call(Helper::RunList, &[list]);
        self.emit_move(result, value);
        self.terminate(Terminator::Jump(merge));
        self.start_new_block(merge);
        Ok(result)
    }

    /// STOP, OUTPUT and .MAYBEOUTPUT leave the procedure with a token.
    /// An input that calls a user procedure becomes a tail call.
    pub(super) fn gen_procedure_exit(
        &mut self,
        node: &DatumP,
        request: RequestType,
    ) -> CompileResult<Reg> {
        let input = node_of(node)?.children().first().cloned();
        let node_reg = self.emit_datum(node);

        let token = match input {
            Some(call)
                if call
                    .as_node()
                    .is_some_and(|n| n.generator() == Generator::ExecProcedure) =>
            {
                let mut args = self.generate_children(&call, RequestType::DATUM)?;
                let call_reg = self.emit_datum(&call);
                args.insert(0, call_reg);
                args.insert(0, node_reg);
                self.call(Helper::ContinuationToken, &args)
            }
            Some(_) => {
                let value = self.generate_child(node, 0, request)?;
                let value = if request == RequestType::NOTHING {
                    self.emit_datum(&DatumP::nothing())
                } else {
                    value
                };
                self.call(Helper::ReturnToken, &[node_reg, value])
            }
            None => {
                let nothing = self.emit_datum(&DatumP::nothing());
                self.call(Helper::ReturnToken, &[node_reg, nothing])
            }
        };
        self.return_now(token);
        Ok(self.emit_datum(node))
    }

    pub(super) fn gen_goto(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let label = self.generate_child(node, 0, RequestType::DATUM)?;
        let node_reg = self.emit_datum(node);
        let token = self.call(Helper::GotoToken, &[node_reg, label]);
        self.return_now(token);
        Ok(self.emit_datum(node))
    }

    /// CATCH tag list. ERRACT is off while the list runs.
    pub(super) fn gen_catch(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let c = self.generate_children(node, RequestType::DATUM)?;
        let list = self.datum_with_tag(node, tag::WORD_OR_LIST_MASK, c[1]);
        let stash = self.call(Helper::BeginCatch, &[]);
        let result = self.call(Helper::RunList, &[list]);
        let node_reg = self.emit_datum(node);
        let out = self.call(Helper::EndCatch, &[stash, c[0], node_reg, result]);
        self.propagate_flow(out);
        Ok(out)
    }

    /// THROW tag [value]
    pub(super) fn gen_throw(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let c = self.generate_children(node, RequestType::DATUM)?;
        let value = match c.get(1) {
            Some(&value) => value,
            None => self.emit_datum(&DatumP::nothing()),
        };
        let err = self.call(Helper::Throw, &[c[0], value]);
        self.return_now(err);
        Ok(self.emit_datum(node))
    }

    /// CONTINUE [value] ends a PAUSE.
    pub(super) fn gen_continue(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let c = self.generate_children(node, RequestType::DATUM)?;
        let value = match c.first() {
            Some(&value) => value,
            None => self.emit_datum(&DatumP::nothing()),
        };
        let token = self.call(Helper::ContinueToken, &[value]);
        self.return_now(token);
        Ok(self.emit_datum(node))
    }
}
