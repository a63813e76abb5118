//! Printing and turtle graphics

use super::*;
use crate::lir::WriteMode;
use crate::primitives::TurtleOp;

impl Lowerer {
    pub(super) fn gen_write(&mut self, node: &DatumP, mode: WriteMode) -> CompileResult<Reg> {
        let args = self.generate_children(node, RequestType::DATUM)?;
        self.call_void(Helper::Write(mode), &args);
        Ok(self.emit_datum(node))
    }

    pub(super) fn gen_turtle(&mut self, node: &DatumP, op: TurtleOp) -> CompileResult<Reg> {
        let args = self.generate_children(node, RequestType::REAL)?;
        let result = self.call(Helper::Turtle(op), &args);
        self.propagate_flow(result);
        Ok(result)
    }

    pub(super) fn gen_setpos(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let pos = self.generate_child(node, 0, RequestType::DATUM)?;
        let node_reg = self.emit_datum(node);
        let result = self.call(Helper::SetPos, &[node_reg, pos]);
        self.propagate_flow(result);
        Ok(result)
    }

    pub(super) fn gen_towards(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let pos = self.generate_child(node, 0, RequestType::DATUM)?;
        let node_reg = self.emit_datum(node);
        let result = self.call(Helper::Towards, &[node_reg, pos]);
        self.propagate_flow(result);
        Ok(result)
    }
}
