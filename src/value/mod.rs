//! Value model
//!
//! Every runtime value is a [`Datum`] reached through a [`DatumP`] owning
//! handle. Cloning a handle retains the value, dropping the last handle
//! releases it to the [`arena`] ledger. Sub-values are referenced, never
//! embedded, so lists of lists share structure.
//!
//! Reference cycles built with the mutation primitives (`.SETFIRST`,
//! `.SETBF`, `.SETITEM`) are never collected.

pub mod arena;
mod array;
mod astnode;
mod display;
mod flow;
mod list;
mod procedure;
mod word;

use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

pub use arena::SourceId;
pub use array::Array;
pub use astnode::{AstGroups, AstNode};
pub use display::{print_form, show_form};
pub use flow::{ContinuationToken, ErrorRecord, GotoToken, ReturnToken};
pub use list::{List, ListIter};
pub use procedure::{OptionalParam, Procedure};
pub use word::Word;

/// Tag bits reported by [`Datum::tag`].
pub mod tag {
    pub const WORD: u32 = 0x1;
    pub const LIST: u32 = 0x2;
    pub const ARRAY: u32 = 0x4;
    pub const DATA_MASK: u32 = 0x7;
    pub const WORD_OR_LIST_MASK: u32 = 0x3;

    pub const ERROR: u32 = 0x10;
    pub const GOTO: u32 = 0x20;
    pub const CONTINUATION: u32 = 0x40;
    pub const RETURN: u32 = 0x80;
    pub const FLOW_CONTROL_MASK: u32 = 0xF0;

    pub const NOTHING: u32 = 0x100;
    pub const AST_NODE: u32 = 0x200;
    pub const PROCEDURE: u32 = 0x400;
    pub const UNBOUND_MASK: u32 = 0x300;
}

/// Discriminant of a [`Datum`], used by the arena ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatumKind {
    Word,
    List,
    Array,
    AstNode,
    Procedure,
    Error,
    Goto,
    Continuation,
    Return,
    Nothing,
}

impl DatumKind {
    pub const COUNT: usize = 10;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn tag(self) -> u32 {
        match self {
            DatumKind::Word => tag::WORD,
            DatumKind::List => tag::LIST,
            DatumKind::Array => tag::ARRAY,
            DatumKind::AstNode => tag::AST_NODE,
            DatumKind::Procedure => tag::PROCEDURE,
            DatumKind::Error => tag::ERROR,
            DatumKind::Goto => tag::GOTO,
            DatumKind::Continuation => tag::CONTINUATION,
            DatumKind::Return => tag::RETURN,
            DatumKind::Nothing => tag::NOTHING,
        }
    }
}

/// A runtime value.
pub enum Datum {
    Word(Word),
    List(List),
    Array(Array),
    AstNode(AstNode),
    Procedure(Procedure),
    Error(ErrorRecord),
    Goto(GotoToken),
    Continuation(ContinuationToken),
    Return(ReturnToken),
    Nothing,
}

impl Datum {
    pub fn kind(&self) -> DatumKind {
        match self {
            Datum::Word(_) => DatumKind::Word,
            Datum::List(_) => DatumKind::List,
            Datum::Array(_) => DatumKind::Array,
            Datum::AstNode(_) => DatumKind::AstNode,
            Datum::Procedure(_) => DatumKind::Procedure,
            Datum::Error(_) => DatumKind::Error,
            Datum::Goto(_) => DatumKind::Goto,
            Datum::Continuation(_) => DatumKind::Continuation,
            Datum::Return(_) => DatumKind::Return,
            Datum::Nothing => DatumKind::Nothing,
        }
    }

    pub fn tag(&self) -> u32 {
        self.kind().tag()
    }

    pub fn has_tag(&self, mask: u32) -> bool {
        self.tag() & mask != 0
    }

    /// Word, list or array.
    pub fn is_data(&self) -> bool {
        self.has_tag(tag::DATA_MASK)
    }

    /// Error, goto, continuation or return token.
    pub fn is_flow_control(&self) -> bool {
        self.has_tag(tag::FLOW_CONTROL_MASK)
    }

    pub fn as_word(&self) -> Option<&Word> {
        match self {
            Datum::Word(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Datum::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Datum::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&AstNode> {
        match self {
            Datum::AstNode(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_procedure(&self) -> Option<&Procedure> {
        match self {
            Datum::Procedure(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorRecord> {
        match self {
            Datum::Error(e) => Some(e),
            _ => None,
        }
    }
}

struct Tracked {
    datum: Datum,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        arena::release(self.datum.kind());
    }
}

/// Owning handle to a [`Datum`].
#[derive(Clone)]
pub struct DatumP(Rc<Tracked>);

/// Non-owning handle, used by the compilation cache to notice when a source
/// list has been dropped.
#[derive(Clone)]
pub struct WeakDatum(Weak<Tracked>);

impl WeakDatum {
    pub fn upgrade(&self) -> Option<DatumP> {
        self.0.upgrade().map(DatumP)
    }

    pub fn is_dead(&self) -> bool {
        self.0.strong_count() == 0
    }
}

thread_local! {
    static NOTHING: DatumP = DatumP::new(Datum::Nothing);
}

impl DatumP {
    pub fn new(datum: Datum) -> Self {
        arena::acquire(datum.kind());
        DatumP(Rc::new(Tracked { datum }))
    }

    pub fn word(text: &str) -> Self {
        DatumP::new(Datum::Word(Word::from_text(text)))
    }

    pub fn number(value: f64) -> Self {
        DatumP::new(Datum::Word(Word::from_number(value)))
    }

    pub fn boolean(value: bool) -> Self {
        DatumP::new(Datum::Word(Word::from_bool(value)))
    }

    pub fn list(items: Vec<DatumP>) -> Self {
        List::from_vec(items)
    }

    pub fn empty_list() -> Self {
        List::empty()
    }

    pub fn array(origin: i32, items: Vec<DatumP>) -> Self {
        DatumP::new(Datum::Array(Array::new(origin, items)))
    }

    /// The canonical "no value" datum.
    pub fn nothing() -> Self {
        NOTHING.with(|n| n.clone())
    }

    pub fn datum(&self) -> &Datum {
        &self.0.datum
    }

    /// Address-based identity; only meaningful while the handle is alive.
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn ptr_eq(&self, other: &DatumP) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live owning handles.
    pub fn refcount(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn downgrade(&self) -> WeakDatum {
        WeakDatum(Rc::downgrade(&self.0))
    }

    /// Name used in error messages: a node reports its procedure name.
    pub fn display_name(&self) -> DatumP {
        match self.datum() {
            Datum::AstNode(node) => node.name().clone(),
            _ => self.clone(),
        }
    }

    /// Show form of the value, as used in messages.
    pub fn show(&self) -> String {
        show_form(self)
    }

    /// Print form of the value.
    pub fn print(&self) -> String {
        print_form(self)
    }
}

impl Deref for DatumP {
    type Target = Datum;

    fn deref(&self) -> &Datum {
        &self.0.datum
    }
}

impl fmt::Debug for DatumP {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.datum() {
            Datum::Word(_) | Datum::List(_) | Datum::Array(_) => {
                write!(f, "{:?}({})", self.kind(), show_form(self))
            }
            Datum::AstNode(node) => write!(f, "AstNode({})", node.name().print()),
            Datum::Procedure(p) => write!(f, "Procedure({})", p.name()),
            Datum::Error(e) => write!(f, "Error({:?}, {})", e.code, e.message.print()),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

impl fmt::Display for DatumP {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print_form(self))
    }
}
