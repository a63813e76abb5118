//! Data structure and workspace primitives

use super::*;
use crate::primitives::DataOp;

impl Lowerer {
    /// Every data primitive is one bridge call with the node and its
    /// evaluated inputs; the runtime reports bad inputs as an error datum.
    pub(super) fn gen_data(&mut self, node: &DatumP, op: DataOp) -> CompileResult<Reg> {
        let mut args = self.generate_children(node, RequestType::DATUM)?;
        let node_reg = self.emit_datum(node);
        args.insert(0, node_reg);
        let result = self.call(Helper::Data(op), &args);
        self.propagate_flow(result);
        Ok(result)
    }

    /// MAKE name value
    pub(super) fn gen_make(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let c = self.generate_children(node, RequestType::DATUM)?;
        let name = self.datum_with_tag(node, tag::WORD, c[0]);
        let node_reg = self.emit_datum(node);
        let result = self.call(Helper::SetVar, &[node_reg, name, c[1]]);
        self.propagate_flow(result);
        Ok(result)
    }

    /// LOCAL name1 name2 ..., or LOCAL [name1 name2 ...]
    pub(super) fn gen_local(&mut self, node: &DatumP) -> CompileResult<Reg> {
        let mut args = self.generate_children(node, RequestType::DATUM)?;
        let node_reg = self.emit_datum(node);
        args.insert(0, node_reg);
        let result = self.call(Helper::MakeLocal, &args);
        self.propagate_flow(result);
        Ok(result)
    }
}
