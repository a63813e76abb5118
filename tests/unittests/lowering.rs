// Lowering and verification of LIR, and running it on the register machine.

use qlogo_compiler::backend::{self, Backend};
use qlogo_compiler::lir::{
    self, BasicBlock, FBinOp, Helper, Label, LirFunction, LirInstr, Lowerer, Reg, Terminator, Ty,
};
use qlogo_compiler::{primitives, AstNode, BackendKind, CompileError, DatumP, Procedure};
use smallvec::smallvec;

use crate::common::*;

fn lit(text: &str) -> DatumP {
    AstNode::literal(DatumP::word(text))
}

fn prim(name: &str, children: Vec<DatumP>) -> DatumP {
    primitives::node(name, children).unwrap()
}

fn add_function() -> LirFunction {
    let mut func = LirFunction::new("add");
    func.reg_types = vec![Ty::F64, Ty::F64, Ty::F64, Ty::Datum];
    let mut block = BasicBlock::new(Label(0));
    block.instructions = vec![
        LirInstr::ConstF64 { dst: Reg(0), value: 2.0 },
        LirInstr::ConstF64 { dst: Reg(1), value: 3.0 },
        LirInstr::FBin {
            dst: Reg(2),
            op: FBinOp::Add,
            lhs: Reg(0),
            rhs: Reg(1),
        },
        LirInstr::Call {
            dst: Some(Reg(3)),
            helper: Helper::WordFromF64,
            args: smallvec![Reg(2)],
        },
    ];
    block.terminator = Terminator::Return(Reg(3));
    func.blocks.push(block);
    func
}

#[test]
fn test_hand_built_function_runs() {
    let func = add_function();
    lir::verify(&func).unwrap();
    let mut machine = backend::create(BackendKind::Machine);
    let entry = machine.compile_and_link(func).unwrap();
    let (mut ev, _) = setup();
    assert_eq!(entry.call(&mut ev, 0).print(), "5");
    assert_eq!(entry.name(), "add");
}

#[test]
fn test_verify_rejects_native_return() {
    let mut func = add_function();
    func.blocks[0].terminator = Terminator::Return(Reg(2));
    match lir::verify(&func) {
        Err(CompileError::InvalidLir { function, message }) => {
            assert_eq!(function, "add");
            assert!(message.contains("non-datum"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_verify_rejects_missing_target() {
    let mut func = add_function();
    func.blocks[0].terminator = Terminator::Jump(Label(9));
    assert!(matches!(lir::verify(&func), Err(CompileError::InvalidLir { .. })));
}

#[test]
fn test_verify_rejects_helper_arity() {
    let mut func = add_function();
    func.blocks[0].instructions[3] = LirInstr::Call {
        dst: Some(Reg(3)),
        helper: Helper::WordFromF64,
        args: smallvec![Reg(2), Reg(2)],
    };
    assert!(lir::verify(&func).is_err());
}

#[test]
fn test_dump_lists_blocks() {
    let text = add_function().to_string();
    assert!(text.starts_with("fn add entry bb0:"));
    assert!(text.contains("return r3"));
}

#[test]
fn test_table_of_contents_chain() {
    let proc_datum = Procedure::new("tags", vec![], DatumP::empty_list()).into_datum();
    let groups = vec![
        vec![prim("print", vec![lit("0")])],
        vec![prim("tag", vec![lit("one")])],
        vec![prim("print", vec![lit("1")])],
        vec![prim("tag", vec![lit("two")]), prim("tag", vec![lit("deux")])],
        vec![prim("print", vec![lit("2")])],
    ];
    let func = Lowerer::new()
        .with_procedure(Some(proc_datum.clone()), None)
        .lower_unit("tags", &groups)
        .unwrap();
    lir::verify(&func).unwrap();

    let procedure = proc_datum.as_procedure().unwrap();
    assert_eq!(procedure.block_for_tag("ONE"), Some(1));
    assert_eq!(procedure.block_for_tag("TWO"), Some(2));
    assert_eq!(procedure.block_for_tag("DEUX"), Some(2));

    // Entry tests block 1, then block 2, then falls through to block 0.
    let first = func.block(func.entry).unwrap();
    assert!(matches!(first.instructions[0], LirInstr::BlockIdIs { id: 1, .. }));
    let Terminator::Branch { else_label, .. } = first.terminator else {
        panic!("entry does not branch");
    };
    let second = func.block(else_label).unwrap();
    assert!(matches!(second.instructions[0], LirInstr::BlockIdIs { id: 2, .. }));
    let Terminator::Branch { else_label, .. } = second.terminator else {
        panic!("second entry does not branch");
    };
    assert_eq!(else_label, Label(0));
}

#[test]
fn test_single_block_has_no_table() {
    let groups = vec![vec![prim("print", vec![lit("0")])]];
    let func = Lowerer::new().lower_unit("plain", &groups).unwrap();
    assert_eq!(func.entry, Label(0));
    assert!(!func
        .blocks
        .iter()
        .flat_map(|b| &b.instructions)
        .any(|i| matches!(i, LirInstr::BlockIdIs { .. })));
}

#[test]
fn test_lowered_program_verifies() {
    // A mix of every representation and the retry loops.
    let line = vec![prim(
        "print",
        vec![prim(
            "ifelse",
            vec![
                prim("and", vec![lit("true"), prim("lessp", vec![lit("1"), lit("x")])]),
                lit("yes"),
                lit("no"),
            ],
        )],
    )];
    let func = Lowerer::new().lower_unit("mix", &[line]).unwrap();
    lir::verify(&func).unwrap();
}
