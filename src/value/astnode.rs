use std::rc::Rc;

use super::arena::{self, SourceId};
use super::{Datum, DatumP};
use crate::primitives::{Generator, RequestType};

/// Parse of an instruction list: one group per line, each group a sequence
/// of executable nodes.
pub type AstGroups = Rc<Vec<Vec<DatumP>>>;

/// An executable node: a name, the generator that lowers it, its operands
/// and the representation it produces.
pub struct AstNode {
    id: SourceId,
    name: DatumP,
    generator: Generator,
    children: Vec<DatumP>,
    returns: RequestType,
}

impl AstNode {
    pub fn new(
        name: DatumP,
        generator: Generator,
        returns: RequestType,
        children: Vec<DatumP>,
    ) -> DatumP {
        DatumP::new(Datum::AstNode(AstNode {
            id: arena::next_source_id(),
            name,
            generator,
            children,
            returns,
        }))
    }

    /// A node wrapping a literal word, list or array.
    pub fn literal(value: DatumP) -> DatumP {
        let name = DatumP::word("literal");
        AstNode::new(name, Generator::Literal, RequestType::DATUM, vec![value])
    }

    /// A `:name` variable read.
    pub fn value_of(name: &str) -> DatumP {
        AstNode::new(
            DatumP::word("valueOf"),
            Generator::ValueOf,
            RequestType::DATUM,
            vec![DatumP::word(name)],
        )
    }

    /// A call to a user-defined procedure.
    pub fn procedure_call(name: &str, args: Vec<DatumP>) -> DatumP {
        AstNode::new(
            DatumP::word(name),
            Generator::ExecProcedure,
            RequestType::DATUM_OR_NOTHING,
            args,
        )
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn name(&self) -> &DatumP {
        &self.name
    }

    /// Uppercase name.
    pub fn key(&self) -> String {
        match self.name.as_word() {
            Some(w) => w.key().to_string(),
            None => self.name.print().to_uppercase(),
        }
    }

    pub fn generator(&self) -> Generator {
        self.generator
    }

    pub fn children(&self) -> &[DatumP] {
        &self.children
    }

    pub fn returns(&self) -> RequestType {
        self.returns
    }
}
