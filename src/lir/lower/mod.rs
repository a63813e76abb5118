//! AST to LIR lowering
//!
//! A compile unit is one instruction list: its node groups become one
//! `LirFunction` taking a requested block id. Groups led by TAG start new
//! blocks; when there is more than one block, a table of contents at the
//! entry dispatches on the block id so GOTO can re-enter past it.

mod arithmetic;
mod coerce;
mod control;
mod data;
mod io;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use super::helper::Helper;
use super::types::*;
use crate::error::{CompileError, CompileResult};
use crate::primitives::{self, Generator, RequestType};
use crate::value::{tag, AstNode, DatumP};

/// Lowers node groups to LIR
pub struct Lowerer {
    /// Current function being built
    current_func: LirFunction,
    /// Current block being built
    current_block: BasicBlock,
    /// Next label ID
    next_label: u32,
    /// Constant pool slot by datum address
    constant_slots: FxHashMap<usize, u32>,
    /// Procedure whose body is being lowered; TAG labels are recorded here
    procedure: Option<DatumP>,
    /// Instruction list recorded as the defining line of each label
    running_line: Option<DatumP>,
}

impl Lowerer {
    pub fn new() -> Self {
        Lowerer {
            current_func: LirFunction::new(""),
            current_block: BasicBlock::new(Label(0)),
            next_label: 1, // 0 is block 0
            constant_slots: FxHashMap::default(),
            procedure: None,
            running_line: None,
        }
    }

    /// Record TAG labels into `procedure` while lowering.
    pub fn with_procedure(mut self, procedure: Option<DatumP>, line: Option<DatumP>) -> Self {
        self.procedure = procedure.filter(|p| p.as_procedure().is_some());
        self.running_line = line;
        self
    }

    fn reset(&mut self, name: &str) {
        self.current_func = LirFunction::new(name);
        self.current_block = BasicBlock::new(Label(0));
        self.next_label = 1;
        self.constant_slots.clear();
    }

    /// Lower an instruction list's parse into one function.
    pub fn lower_unit(&mut self, name: &str, groups: &[Vec<DatumP>]) -> CompileResult<LirFunction> {
        self.reset(name);

        let mut groups: Vec<&[DatumP]> = groups
            .iter()
            .map(|g| g.as_slice())
            .filter(|g| !g.is_empty())
            .collect();
        let mut body_labels = vec![Label(0)];

        if groups.first().is_some_and(|g| is_tag(&g[0])) {
            let rest = self.register_tags(groups[0], 0);
            if rest.is_empty() {
                groups.remove(0);
            } else {
                groups[0] = rest;
            }
        }
        let last_node = groups.last().and_then(|g| g.last()).cloned();

        let mut result: Option<Reg> = None;
        for group in groups {
            let mut nodes = group;
            if is_tag(&group[0]) {
                let block_id = body_labels.len() as i32;
                nodes = self.register_tags(group, block_id);
                let label = self.fresh_label();
                self.terminate(Terminator::Jump(label));
                self.start_new_block(label);
                body_labels.push(label);
                // Values from earlier blocks do not reach a re-entry point.
                result = None;
            }
            for node in nodes {
                let request = match &last_node {
                    Some(last) if last.ptr_eq(node) => RequestType::DATUM_OR_NOTHING,
                    _ => RequestType::NOTHING,
                };
                let reg = self.lower_node(node, request)?;
                result = Some(self.cast(reg, None, node, request)?);
            }
        }

        let result = match result {
            Some(reg) => reg,
            None => self.emit_datum(&DatumP::nothing()),
        };
        self.terminate(Terminator::Return(result));
        self.finish_block();

        if body_labels.len() > 1 {
            self.current_func.entry = self.generate_toc(&body_labels);
        } else {
            self.current_func.entry = Label(0);
        }

        debug!(
            name,
            blocks = body_labels.len(),
            lir_blocks = self.current_func.blocks.len(),
            "lowered compile unit"
        );
        Ok(std::mem::replace(&mut self.current_func, LirFunction::new("")))
    }

    /// Lower a single node as its own unit.
    pub fn lower_node_unit(&mut self, name: &str, node: &DatumP) -> CompileResult<LirFunction> {
        self.lower_unit(name, &[vec![node.clone()]])
    }

    /// One test-and-branch block per tagged block: entry `i` jumps to body
    /// block `i + 1` when the requested id matches, else to the next entry.
    /// The last entry falls through to block 0.
    fn generate_toc(&mut self, body_labels: &[Label]) -> Label {
        let entries: Vec<Label> = (1..body_labels.len()).map(|_| self.fresh_label()).collect();
        for (i, entry) in entries.iter().enumerate() {
            let block_id = i as i32 + 1;
            self.current_block = BasicBlock::new(*entry);
            let cond = self.fresh_reg(Ty::Bool);
            self.emit(LirInstr::BlockIdIs { dst: cond, id: block_id });
            let next = entries.get(i + 1).copied().unwrap_or(body_labels[0]);
            self.terminate(Terminator::Branch {
                cond,
                then_label: body_labels[block_id as usize],
                else_label: next,
            });
            self.finish_block();
        }
        entries[0]
    }

    /// Record the leading TAG nodes of a group; returns the nodes after them.
    fn register_tags<'g>(&mut self, group: &'g [DatumP], block_id: i32) -> &'g [DatumP] {
        let count = group.iter().take_while(|n| is_tag(n)).count();
        if let Some(proc_datum) = &self.procedure {
            if let Some(procedure) = proc_datum.as_procedure() {
                for node in &group[..count] {
                    if let Some(key) = tag_name(node) {
                        let line = self.running_line.clone().unwrap_or_else(|| node.clone());
                        procedure.set_tag(&key, block_id, line);
                    }
                }
            }
        }
        &group[count..]
    }

    /// Lower one node with the requested representation; the caller casts.
    pub(crate) fn lower_node(&mut self, node: &DatumP, request: RequestType) -> CompileResult<Reg> {
        let ast = node_of(node)?;

        if let Some(reg) = self.check_arity(node, ast)? {
            return Ok(reg);
        }

        match ast.generator() {
            Generator::Literal => self.gen_literal(node, request),
            Generator::ValueOf => self.gen_value_of(node),
            Generator::ExecProcedure => self.gen_exec_procedure(node),
            Generator::NoOp | Generator::Tag => Ok(self.emit_datum(node)),

            Generator::Sum => self.gen_sum(node, FBinOp::Add, 0.0),
            Generator::Product => self.gen_sum(node, FBinOp::Mul, 1.0),
            Generator::Difference => self.gen_difference(node),
            Generator::Minus => self.gen_minus(node),
            Generator::Quotient => self.gen_quotient(node),
            Generator::Remainder => self.gen_remainder(node, super::MathFn::Remainder),
            Generator::Modulo => self.gen_remainder(node, super::MathFn::Modulo),
            Generator::Sqrt => self.gen_sqrt(node),
            Generator::Power => self.gen_power(node),
            Generator::Exp => self.gen_unary_math(node, super::MathFn::Exp),
            Generator::Log10 => self.gen_log(node, super::MathFn::Log10),
            Generator::Ln => self.gen_log(node, super::MathFn::Ln),
            Generator::Int => self.gen_unary_math(node, super::MathFn::Trunc),
            Generator::Round => self.gen_unary_math(node, super::MathFn::Round),
            Generator::Sin => self.gen_trig(node, super::MathFn::Sin, true),
            Generator::Cos => self.gen_trig(node, super::MathFn::Cos, true),
            Generator::RadSin => self.gen_trig(node, super::MathFn::Sin, false),
            Generator::RadCos => self.gen_trig(node, super::MathFn::Cos, false),
            Generator::Arctan => self.gen_arctan(node, true),
            Generator::RadArctan => self.gen_arctan(node, false),
            Generator::BitAnd => self.gen_bitwise(node, super::MathFn::BitAnd, -1.0),
            Generator::BitOr => self.gen_bitwise(node, super::MathFn::BitOr, 0.0),
            Generator::BitXor => self.gen_bitwise(node, super::MathFn::BitXor, 0.0),
            Generator::BitNot => self.gen_bitnot(node),
            Generator::Ashift => self.gen_shift(node, super::MathFn::Ashift),
            Generator::Lshift => self.gen_shift(node, super::MathFn::Lshift),
            Generator::Random => self.gen_random(node),
            Generator::Rerandom => self.gen_rerandom(node),
            Generator::Form => self.gen_form(node),
            Generator::InfixError => self.gen_infix_error(node),

            Generator::LessP => self.gen_compare(node, CmpOp::Lt),
            Generator::GreaterP => self.gen_compare(node, CmpOp::Gt),
            Generator::LessEqualP => self.gen_compare(node, CmpOp::Le),
            Generator::GreaterEqualP => self.gen_compare(node, CmpOp::Ge),
            Generator::Not => self.gen_not(node),
            Generator::And => self.gen_and_or(node, true),
            Generator::Or => self.gen_and_or(node, false),

            Generator::Run => self.gen_run(node),
            Generator::RunResult => self.gen_runresult(node),
            Generator::Repeat => self.gen_repeat(node),
            Generator::Forever => self.gen_forever(node),
            Generator::Repcount => Ok(self.call(Helper::Repcount, &[])),
            Generator::If | Generator::IfElse => self.gen_if(node),
            Generator::Test => self.gen_test(node),
            Generator::IfTrue => self.gen_iftest(node, true),
            Generator::IfFalse => self.gen_iftest(node, false),
            Generator::Stop => self.gen_procedure_exit(node, RequestType::NOTHING),
            Generator::Output => self.gen_procedure_exit(node, RequestType::DATUM),
            Generator::MaybeOutput => {
                self.gen_procedure_exit(node, RequestType::DATUM_OR_NOTHING)
            }
            Generator::Goto => self.gen_goto(node),
            Generator::Catch => self.gen_catch(node),
            Generator::Throw => self.gen_throw(node),
            Generator::Error => Ok(self.call(Helper::ErrorList, &[])),
            Generator::Pause => Ok(self.call(Helper::Pause, &[])),
            Generator::Continue => self.gen_continue(node),
            Generator::Bye => {
                let err = self.call(Helper::ErrSystem, &[]);
                self.return_now(err);
                Ok(self.emit_datum(node))
            }

            Generator::Data(op) => self.gen_data(node, op),
            Generator::Make => self.gen_make(node),
            Generator::Local => self.gen_local(node),

            Generator::Print => self.gen_write(node, super::WriteMode::Print),
            Generator::Show => self.gen_write(node, super::WriteMode::Show),
            Generator::Type => self.gen_write(node, super::WriteMode::Type),

            Generator::Turtle(op) => self.gen_turtle(node, op),
            Generator::SetPos => self.gen_setpos(node),
            Generator::Pos => Ok(self.call(Helper::Pos, &[])),
            Generator::Heading => Ok(self.call(Helper::Heading, &[])),
            Generator::Towards => self.gen_towards(node),
            Generator::PenDownP => Ok(self.call(Helper::PenDownP, &[])),
            Generator::ShownP => Ok(self.call(Helper::ShownP, &[])),
        }
    }

    /// Input counts outside the primitive's bounds compile to an
    /// unconditional error return.
    fn check_arity(&mut self, node: &DatumP, ast: &AstNode) -> CompileResult<Option<Reg>> {
        if matches!(
            ast.generator(),
            Generator::Literal | Generator::ValueOf | Generator::ExecProcedure
        ) {
            return Ok(None);
        }
        let Some(prim) = primitives::lookup(&ast.key()) else {
            return Ok(None);
        };
        let got = ast.children().len();
        let helper = if got < prim.min_inputs {
            Helper::ErrNotEnoughInputs
        } else if prim.max_inputs.is_some_and(|max| got > max) {
            Helper::ErrTooManyInputs
        } else {
            return Ok(None);
        };
        let name = self.emit_datum(ast.name());
        let err = self.call(helper, &[name]);
        self.return_now(err);
        Ok(Some(self.emit_datum(node)))
    }

    // === Leaves ===

    fn gen_literal(&mut self, node: &DatumP, request: RequestType) -> CompileResult<Reg> {
        let value = child(node, 0)?;
        if let Some(word) = value.as_word() {
            if request == RequestType::REAL {
                if let Some(n) = word.number() {
                    return Ok(self.emit_f64(n));
                }
            }
            if request.contains(RequestType::BOOL) {
                if let Some(b) = word.boolean() {
                    return Ok(self.emit_bool(b));
                }
            }
        }
        Ok(self.emit_datum(&value))
    }

    fn gen_value_of(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let name = child(node, 0)?;
        let name_reg = self.emit_datum(&name);
        let value = self.call(Helper::GetVar, &[name_reg]);
        let bound = self.call(Helper::HasTag(tag::DATA_MASK), &[value]);
        let unbound = self.bnot(bound);
        self.return_error_if(unbound, |this| this.call(Helper::ErrNoValue, &[name_reg]));
        Ok(value)
    }

    fn gen_exec_procedure(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let mut args = self.generate_children(node, RequestType::DATUM)?;
        let node_reg = self.emit_datum(node);
        args.insert(0, node_reg);
        Ok(self.call(Helper::RunProcedure, &args))
    }

    // === Children ===

    /// Lower child `index` of `parent` and cast it to `request`.
    pub(crate) fn generate_child(
        &mut self,
        parent: &DatumP,
        index: usize,
        request: RequestType,
    ) -> CompileResult<Reg> {
        let node = child(parent, index)?;
        let reg = self.lower_node(&node, request)?;
        self.cast(reg, Some(parent), &node, request)
    }

    /// All children with one request. Every child is lowered before any
    /// is cast, left to right.
    pub(crate) fn generate_children(
        &mut self,
        parent: &DatumP,
        request: RequestType,
    ) -> CompileResult<Vec<Reg>> {
        let count = node_of(parent)?.children().len();
        self.generate_children_with(parent, &vec![request; count])
    }

    pub(crate) fn generate_children_with(
        &mut self,
        parent: &DatumP,
        requests: &[RequestType],
    ) -> CompileResult<Vec<Reg>> {
        let children: Vec<DatumP> = node_of(parent)?.children().to_vec();
        let mut raw = Vec::with_capacity(children.len());
        for (node, request) in children.iter().zip(requests) {
            raw.push(self.lower_node(node, *request)?);
        }
        let mut out = Vec::with_capacity(raw.len());
        for ((reg, node), request) in raw.into_iter().zip(&children).zip(requests) {
            out.push(self.cast(reg, Some(parent), node, *request)?);
        }
        Ok(out)
    }

    // === Helper Methods ===

    fn fresh_reg(&mut self, ty: Ty) -> Reg {
        let r = Reg::new(self.current_func.reg_types.len() as u32);
        self.current_func.reg_types.push(ty);
        r
    }

    fn reg_ty(&self, reg: Reg) -> Ty {
        self.current_func.reg_type(reg)
    }

    fn emit(&mut self, instr: LirInstr) {
        self.current_block.instructions.push(instr);
    }

    fn emit_f64(&mut self, value: f64) -> Reg {
        let dst = self.fresh_reg(Ty::F64);
        self.emit(LirInstr::ConstF64 { dst, value });
        dst
    }

    fn emit_bool(&mut self, value: bool) -> Reg {
        let dst = self.fresh_reg(Ty::Bool);
        self.emit(LirInstr::ConstBool { dst, value });
        dst
    }

    fn emit_datum(&mut self, value: &DatumP) -> Reg {
        let index = match self.constant_slots.get(&value.addr()) {
            Some(&index) => index,
            None => {
                let index = self.current_func.constants.len() as u32;
                self.current_func.constants.push(value.clone());
                self.constant_slots.insert(value.addr(), index);
                index
            }
        };
        let dst = self.fresh_reg(Ty::Datum);
        self.emit(LirInstr::ConstDatum { dst, index });
        dst
    }

    fn emit_move(&mut self, dst: Reg, src: Reg) {
        self.emit(LirInstr::Move { dst, src });
    }

    fn fbin(&mut self, op: FBinOp, lhs: Reg, rhs: Reg) -> Reg {
        let dst = self.fresh_reg(Ty::F64);
        self.emit(LirInstr::FBin { dst, op, lhs, rhs });
        dst
    }

    fn fcmp(&mut self, op: CmpOp, lhs: Reg, rhs: Reg) -> Reg {
        let dst = self.fresh_reg(Ty::Bool);
        self.emit(LirInstr::FCmp { dst, op, lhs, rhs });
        dst
    }

    fn bnot(&mut self, src: Reg) -> Reg {
        let dst = self.fresh_reg(Ty::Bool);
        self.emit(LirInstr::BNot { dst, src });
        dst
    }

    /// Call a helper that produces a value.
    fn call(&mut self, helper: Helper, args: &[Reg]) -> Reg {
        let ty = helper.signature().ret.unwrap_or(Ty::Datum);
        let dst = self.fresh_reg(ty);
        self.emit(LirInstr::Call {
            dst: Some(dst),
            helper,
            args: SmallVec::from_slice(args),
        });
        dst
    }

    fn call_void(&mut self, helper: Helper, args: &[Reg]) {
        self.emit(LirInstr::Call {
            dst: None,
            helper,
            args: SmallVec::from_slice(args),
        });
    }

    fn terminate(&mut self, term: Terminator) {
        self.current_block.terminator = term;
    }

    fn finish_block(&mut self) {
        let block = std::mem::replace(&mut self.current_block, BasicBlock::new(Label(0)));
        self.current_func.blocks.push(block);
    }

    /// Allocate a new basic block label.
    fn fresh_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    /// Finish the current block and start a new one with the given label.
    fn start_new_block(&mut self, label: Label) {
        self.finish_block();
        self.current_block = BasicBlock::new(label);
    }

    /// Return `value` from the function here. Code emitted afterwards
    /// lands in a fresh block nothing jumps to.
    fn return_now(&mut self, value: Reg) {
        self.terminate(Terminator::Return(value));
        let dead = self.fresh_label();
        self.start_new_block(dead);
    }

    /// Return `value` when `cond` holds, otherwise continue.
    fn return_if(&mut self, cond: Reg, value: Reg) {
        let ret = self.fresh_label();
        let cont = self.fresh_label();
        self.terminate(Terminator::Branch {
            cond,
            then_label: ret,
            else_label: cont,
        });
        self.start_new_block(ret);
        self.terminate(Terminator::Return(value));
        self.start_new_block(cont);
    }

    /// When `cond` holds, build an error with `build` and return it. The
    /// error is only constructed on that path.
    fn return_error_if(&mut self, cond: Reg, build: impl FnOnce(&mut Self) -> Reg) {
        let ret = self.fresh_label();
        let cont = self.fresh_label();
        self.terminate(Terminator::Branch {
            cond,
            then_label: ret,
            else_label: cont,
        });
        self.start_new_block(ret);
        let err = build(self);
        self.terminate(Terminator::Return(err));
        self.start_new_block(cont);
    }

    /// Hand a flow-control token straight back to our caller.
    fn propagate_flow(&mut self, value: Reg) {
        let is_flow = self.call(Helper::HasTag(tag::FLOW_CONTROL_MASK), &[value]);
        self.return_if(is_flow, value);
    }
}

impl Default for Lowerer {
    fn default() -> Self {
        Self::new()
    }
}

fn node_of(node: &DatumP) -> CompileResult<&AstNode> {
    node.as_node().ok_or_else(|| CompileError::Unsupported {
        name: node.show(),
        reason: "not an executable node".into(),
    })
}

fn child(node: &DatumP, index: usize) -> CompileResult<DatumP> {
    let ast = node_of(node)?;
    ast.children()
        .get(index)
        .cloned()
        .ok_or_else(|| CompileError::Unsupported {
            name: ast.key(),
            reason: format!("missing input {}", index + 1),
        })
}

fn is_tag(node: &DatumP) -> bool {
    node.as_node()
        .is_some_and(|n| n.generator() == Generator::Tag)
}

/// Label key of a TAG node whose input is a literal word.
fn tag_name(node: &DatumP) -> Option<String> {
    let literal = node.as_node()?.children().first()?.clone();
    let word = literal.as_node()?.children().first()?.clone();
    word.as_word().map(|w| w.key().to_string())
}
