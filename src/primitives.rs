//! Primitive table
//!
//! Maps each primitive name to the generator that lowers it, its input
//! counts and the representation it produces. The parser uses the table to
//! build nodes; the code generator uses the generator to pick a lowering
//! function.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use crate::value::{AstNode, DatumP};

/// Representation requested from, or produced by, a node.
///
/// A bitmask: a request accepts any representation whose bit it contains.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestType(u8);

impl RequestType {
    pub const NOTHING: RequestType = RequestType(1);
    pub const BOOL: RequestType = RequestType(2);
    pub const DATUM: RequestType = RequestType(4);
    pub const REAL: RequestType = RequestType(8);
    pub const DATUM_OR_NOTHING: RequestType = RequestType(4 | 1);
    pub const DATUM_OR_BOOL: RequestType = RequestType(4 | 2);

    pub fn bits(self) -> u8 {
        self.0
    }

    /// True if every bit of `other` is allowed here.
    pub fn contains(self, other: RequestType) -> bool {
        self.0 & other.0 == other.0
    }

    fn from_code(code: &str) -> RequestType {
        match code {
            "r" => RequestType::REAL,
            "b" => RequestType::BOOL,
            "n" => RequestType::NOTHING,
            "dn" => RequestType::DATUM_OR_NOTHING,
            _ => RequestType::DATUM,
        }
    }
}

impl std::fmt::Debug for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match *self {
            RequestType::NOTHING => "N",
            RequestType::BOOL => "B",
            RequestType::DATUM => "D",
            RequestType::REAL => "R",
            RequestType::DATUM_OR_NOTHING => "DN",
            RequestType::DATUM_OR_BOOL => "DB",
            RequestType(bits) => return write!(f, "RequestType({:#x})", bits),
        };
        f.write_str(name)
    }
}

/// Data-structure primitives, lowered through one generic bridge call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataOp {
    Word,
    List,
    Sentence,
    Fput,
    Lput,
    Array,
    ListToArray,
    ArrayToList,
    First,
    Last,
    ButFirst,
    ButLast,
    Item,
    SetItem,
    DotSetItem,
    DotSetFirst,
    DotSetBf,
    WordP,
    ListP,
    ArrayP,
    EmptyP,
    EqualP,
    NotEqualP,
    BeforeP,
    DotEq,
    MemberP,
    SubstringP,
    NumberP,
    Count,
    Ascii,
    Char,
    Member,
    Lowercase,
    Uppercase,
    Thing,
}

/// Turtle commands forwarded to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurtleOp {
    Forward,
    Back,
    Left,
    Right,
    SetXY,
    SetX,
    SetY,
    SetHeading,
    Home,
    ClearScreen,
    Clean,
    PenDown,
    PenUp,
    ShowTurtle,
    HideTurtle,
}

impl TurtleOp {
    /// Number of numeric inputs.
    pub fn inputs(self) -> usize {
        match self {
            TurtleOp::SetXY => 2,
            TurtleOp::Forward
            | TurtleOp::Back
            | TurtleOp::Left
            | TurtleOp::Right
            | TurtleOp::SetX
            | TurtleOp::SetY
            | TurtleOp::SetHeading => 1,
            _ => 0,
        }
    }
}

/// Selects the lowering function for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generator {
    // === Leaves ===
    Literal,
    ValueOf,
    ExecProcedure,
    NoOp,

    // === Arithmetic ===
    Sum,
    Product,
    Difference,
    Minus,
    Quotient,
    Remainder,
    Modulo,
    Sqrt,
    Power,
    Exp,
    Log10,
    Ln,
    Int,
    Round,
    Sin,
    Cos,
    RadSin,
    RadCos,
    Arctan,
    RadArctan,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    Ashift,
    Lshift,
    Random,
    Rerandom,
    Form,
    InfixError,

    // === Predicates ===
    LessP,
    GreaterP,
    LessEqualP,
    GreaterEqualP,
    Not,
    And,
    Or,

    // === Control ===
    Run,
    RunResult,
    Repeat,
    Forever,
    Repcount,
    If,
    IfElse,
    Test,
    IfTrue,
    IfFalse,
    Stop,
    Output,
    MaybeOutput,
    Tag,
    Goto,
    Catch,
    Throw,
    Error,
    Pause,
    Continue,
    Bye,

    // === Data and workspace ===
    Data(DataOp),
    Make,
    Local,

    // === Communication ===
    Print,
    Show,
    Type,

    // === Turtle ===
    Turtle(TurtleOp),
    SetPos,
    Pos,
    Heading,
    Towards,
    PenDownP,
    ShownP,
}

/// One row of the primitive table.
#[derive(Debug, Clone, Copy)]
pub struct Primitive {
    pub name: &'static str,
    pub generator: Generator,
    pub min_inputs: usize,
    pub default_inputs: usize,
    /// `None` for unbounded
    pub max_inputs: Option<usize>,
    pub returns: RequestType,
}

macro_rules! prim {
    ($name:expr, $gen:expr, $min:expr, $def:expr, $max:expr, $ret:expr) => {{
        let max: i32 = $max;
        Primitive {
            name: $name,
            generator: $gen,
            min_inputs: $min,
            default_inputs: $def,
            max_inputs: usize::try_from(max).ok(),
            returns: RequestType::from_code($ret),
        }
    }};
}

use DataOp as D;
use Generator as G;

fn table() -> Vec<Primitive> {
    vec![
        // arithmetic
        prim!("SUM", G::Sum, 0, 2, -1, "r"),
        prim!("PRODUCT", G::Product, 0, 2, -1, "r"),
        prim!("DIFFERENCE", G::Difference, 2, 2, 2, "r"),
        prim!("MINUS", G::Minus, 1, 1, 1, "r"),
        prim!("-", G::Minus, 1, 1, 1, "r"),
        prim!("QUOTIENT", G::Quotient, 1, 2, 2, "r"),
        prim!("REMAINDER", G::Remainder, 2, 2, 2, "r"),
        prim!("MODULO", G::Modulo, 2, 2, 2, "r"),
        prim!("SQRT", G::Sqrt, 1, 1, 1, "r"),
        prim!("POWER", G::Power, 2, 2, 2, "r"),
        prim!("EXP", G::Exp, 1, 1, 1, "r"),
        prim!("LOG10", G::Log10, 1, 1, 1, "r"),
        prim!("LN", G::Ln, 1, 1, 1, "r"),
        prim!("INT", G::Int, 1, 1, 1, "r"),
        prim!("ROUND", G::Round, 1, 1, 1, "r"),
        prim!("SIN", G::Sin, 1, 1, 1, "r"),
        prim!("COS", G::Cos, 1, 1, 1, "r"),
        prim!("RADSIN", G::RadSin, 1, 1, 1, "r"),
        prim!("RADCOS", G::RadCos, 1, 1, 1, "r"),
        prim!("ARCTAN", G::Arctan, 1, 1, 2, "r"),
        prim!("RADARCTAN", G::RadArctan, 1, 1, 2, "r"),
        prim!("BITAND", G::BitAnd, 0, 2, -1, "r"),
        prim!("BITOR", G::BitOr, 0, 2, -1, "r"),
        prim!("BITXOR", G::BitXor, 0, 2, -1, "r"),
        prim!("BITNOT", G::BitNot, 1, 1, 1, "r"),
        prim!("ASHIFT", G::Ashift, 2, 2, 2, "r"),
        prim!("LSHIFT", G::Lshift, 2, 2, 2, "r"),
        prim!("RANDOM", G::Random, 1, 1, 2, "r"),
        prim!("RERANDOM", G::Rerandom, 0, 0, 1, "n"),
        prim!("FORM", G::Form, 3, 3, 3, "d"),
        prim!("+", G::InfixError, 1, 1, 1, "d"),
        prim!("*", G::InfixError, 1, 1, 1, "d"),
        prim!("/", G::InfixError, 1, 1, 1, "d"),
        prim!("<", G::InfixError, 1, 1, 1, "d"),
        prim!(">", G::InfixError, 1, 1, 1, "d"),
        prim!("=", G::InfixError, 1, 1, 1, "d"),
        prim!("<=", G::InfixError, 1, 1, 1, "d"),
        prim!(">=", G::InfixError, 1, 1, 1, "d"),
        prim!("<>", G::InfixError, 1, 1, 1, "d"),
        // predicates
        prim!("LESSP", G::LessP, 2, 2, 2, "b"),
        prim!("LESS?", G::LessP, 2, 2, 2, "b"),
        prim!("GREATERP", G::GreaterP, 2, 2, 2, "b"),
        prim!("GREATER?", G::GreaterP, 2, 2, 2, "b"),
        prim!("LESSEQUALP", G::LessEqualP, 2, 2, 2, "b"),
        prim!("LESSEQUAL?", G::LessEqualP, 2, 2, 2, "b"),
        prim!("GREATEREQUALP", G::GreaterEqualP, 2, 2, 2, "b"),
        prim!("GREATEREQUAL?", G::GreaterEqualP, 2, 2, 2, "b"),
        prim!("NOT", G::Not, 1, 1, 1, "b"),
        prim!("AND", G::And, 0, 2, -1, "b"),
        prim!("OR", G::Or, 0, 2, -1, "b"),
        // control
        prim!("RUN", G::Run, 1, 1, 1, "dn"),
        prim!("RUNRESULT", G::RunResult, 1, 1, 1, "d"),
        prim!("REPEAT", G::Repeat, 2, 2, 2, "dn"),
        prim!("FOREVER", G::Forever, 1, 1, 1, "n"),
        prim!("REPCOUNT", G::Repcount, 0, 0, 0, "r"),
        prim!("IF", G::If, 2, 2, 3, "dn"),
        prim!("IFELSE", G::IfElse, 3, 3, 3, "dn"),
        prim!("TEST", G::Test, 1, 1, 1, "n"),
        prim!("IFTRUE", G::IfTrue, 1, 1, 1, "dn"),
        prim!("IFT", G::IfTrue, 1, 1, 1, "dn"),
        prim!("IFFALSE", G::IfFalse, 1, 1, 1, "dn"),
        prim!("IFF", G::IfFalse, 1, 1, 1, "dn"),
        prim!("STOP", G::Stop, 0, 0, 1, "n"),
        prim!("OUTPUT", G::Output, 1, 1, 1, "n"),
        prim!("OP", G::Output, 1, 1, 1, "n"),
        prim!(".MAYBEOUTPUT", G::MaybeOutput, 1, 1, 1, "n"),
        prim!("TAG", G::Tag, 1, 1, 1, "n"),
        prim!("GOTO", G::Goto, 1, 1, 1, "n"),
        prim!("CATCH", G::Catch, 2, 2, 2, "dn"),
        prim!("THROW", G::Throw, 1, 1, 2, "n"),
        prim!("ERROR", G::Error, 0, 0, 0, "d"),
        prim!("PAUSE", G::Pause, 0, 0, 0, "dn"),
        prim!("CONTINUE", G::Continue, 0, 0, 1, "dn"),
        prim!("CO", G::Continue, 0, 0, 1, "dn"),
        prim!("BYE", G::Bye, 0, 0, 0, "n"),
        // data
        prim!("WORD", G::Data(D::Word), 0, 2, -1, "d"),
        prim!("LIST", G::Data(D::List), 0, 2, -1, "d"),
        prim!("SENTENCE", G::Data(D::Sentence), 0, 2, -1, "d"),
        prim!("SE", G::Data(D::Sentence), 0, 2, -1, "d"),
        prim!("FPUT", G::Data(D::Fput), 2, 2, 2, "d"),
        prim!("LPUT", G::Data(D::Lput), 2, 2, 2, "d"),
        prim!("ARRAY", G::Data(D::Array), 1, 1, 2, "d"),
        prim!("LISTTOARRAY", G::Data(D::ListToArray), 1, 1, 2, "d"),
        prim!("ARRAYTOLIST", G::Data(D::ArrayToList), 1, 1, 1, "d"),
        prim!("FIRST", G::Data(D::First), 1, 1, 1, "d"),
        prim!("LAST", G::Data(D::Last), 1, 1, 1, "d"),
        prim!("BUTFIRST", G::Data(D::ButFirst), 1, 1, 1, "d"),
        prim!("BF", G::Data(D::ButFirst), 1, 1, 1, "d"),
        prim!("BUTLAST", G::Data(D::ButLast), 1, 1, 1, "d"),
        prim!("BL", G::Data(D::ButLast), 1, 1, 1, "d"),
        prim!("ITEM", G::Data(D::Item), 2, 2, 2, "d"),
        prim!("SETITEM", G::Data(D::SetItem), 3, 3, 3, "n"),
        prim!(".SETITEM", G::Data(D::DotSetItem), 3, 3, 3, "n"),
        prim!(".SETFIRST", G::Data(D::DotSetFirst), 2, 2, 2, "n"),
        prim!(".SETBF", G::Data(D::DotSetBf), 2, 2, 2, "n"),
        prim!("WORDP", G::Data(D::WordP), 1, 1, 1, "d"),
        prim!("WORD?", G::Data(D::WordP), 1, 1, 1, "d"),
        prim!("LISTP", G::Data(D::ListP), 1, 1, 1, "d"),
        prim!("LIST?", G::Data(D::ListP), 1, 1, 1, "d"),
        prim!("ARRAYP", G::Data(D::ArrayP), 1, 1, 1, "d"),
        prim!("ARRAY?", G::Data(D::ArrayP), 1, 1, 1, "d"),
        prim!("EMPTYP", G::Data(D::EmptyP), 1, 1, 1, "d"),
        prim!("EMPTY?", G::Data(D::EmptyP), 1, 1, 1, "d"),
        prim!("EQUALP", G::Data(D::EqualP), 2, 2, 2, "d"),
        prim!("EQUAL?", G::Data(D::EqualP), 2, 2, 2, "d"),
        prim!("NOTEQUALP", G::Data(D::NotEqualP), 2, 2, 2, "d"),
        prim!("NOTEQUAL?", G::Data(D::NotEqualP), 2, 2, 2, "d"),
        prim!("BEFOREP", G::Data(D::BeforeP), 2, 2, 2, "d"),
        prim!("BEFORE?", G::Data(D::BeforeP), 2, 2, 2, "d"),
        prim!(".EQ", G::Data(D::DotEq), 2, 2, 2, "d"),
        prim!("MEMBERP", G::Data(D::MemberP), 2, 2, 2, "d"),
        prim!("MEMBER?", G::Data(D::MemberP), 2, 2, 2, "d"),
        prim!("SUBSTRINGP", G::Data(D::SubstringP), 2, 2, 2, "d"),
        prim!("SUBSTRING?", G::Data(D::SubstringP), 2, 2, 2, "d"),
        prim!("NUMBERP", G::Data(D::NumberP), 1, 1, 1, "d"),
        prim!("NUMBER?", G::Data(D::NumberP), 1, 1, 1, "d"),
        prim!("COUNT", G::Data(D::Count), 1, 1, 1, "d"),
        prim!("ASCII", G::Data(D::Ascii), 1, 1, 1, "d"),
        prim!("CHAR", G::Data(D::Char), 1, 1, 1, "d"),
        prim!("MEMBER", G::Data(D::Member), 2, 2, 2, "d"),
        prim!("LOWERCASE", G::Data(D::Lowercase), 1, 1, 1, "d"),
        prim!("UPPERCASE", G::Data(D::Uppercase), 1, 1, 1, "d"),
        // workspace
        prim!("THING", G::Data(D::Thing), 1, 1, 1, "d"),
        prim!("MAKE", G::Make, 2, 2, 2, "n"),
        prim!("LOCAL", G::Local, 1, 1, -1, "n"),
        // communication
        prim!("PRINT", G::Print, 0, 1, -1, "n"),
        prim!("PR", G::Print, 0, 1, -1, "n"),
        prim!("SHOW", G::Show, 0, 1, -1, "n"),
        prim!("TYPE", G::Type, 0, 1, -1, "n"),
        // turtle
        prim!("FORWARD", G::Turtle(TurtleOp::Forward), 1, 1, 1, "n"),
        prim!("FD", G::Turtle(TurtleOp::Forward), 1, 1, 1, "n"),
        prim!("BACK", G::Turtle(TurtleOp::Back), 1, 1, 1, "n"),
        prim!("BK", G::Turtle(TurtleOp::Back), 1, 1, 1, "n"),
        prim!("LEFT", G::Turtle(TurtleOp::Left), 1, 1, 1, "n"),
        prim!("LT", G::Turtle(TurtleOp::Left), 1, 1, 1, "n"),
        prim!("RIGHT", G::Turtle(TurtleOp::Right), 1, 1, 1, "n"),
        prim!("RT", G::Turtle(TurtleOp::Right), 1, 1, 1, "n"),
        prim!("SETXY", G::Turtle(TurtleOp::SetXY), 2, 2, 2, "n"),
        prim!("SETX", G::Turtle(TurtleOp::SetX), 1, 1, 1, "n"),
        prim!("SETY", G::Turtle(TurtleOp::SetY), 1, 1, 1, "n"),
        prim!("SETHEADING", G::Turtle(TurtleOp::SetHeading), 1, 1, 1, "n"),
        prim!("SETH", G::Turtle(TurtleOp::SetHeading), 1, 1, 1, "n"),
        prim!("HOME", G::Turtle(TurtleOp::Home), 0, 0, 0, "n"),
        prim!("CLEARSCREEN", G::Turtle(TurtleOp::ClearScreen), 0, 0, 0, "n"),
        prim!("CS", G::Turtle(TurtleOp::ClearScreen), 0, 0, 0, "n"),
        prim!("CLEAN", G::Turtle(TurtleOp::Clean), 0, 0, 0, "n"),
        prim!("PENDOWN", G::Turtle(TurtleOp::PenDown), 0, 0, 0, "n"),
        prim!("PD", G::Turtle(TurtleOp::PenDown), 0, 0, 0, "n"),
        prim!("PENUP", G::Turtle(TurtleOp::PenUp), 0, 0, 0, "n"),
        prim!("PU", G::Turtle(TurtleOp::PenUp), 0, 0, 0, "n"),
        prim!("SHOWTURTLE", G::Turtle(TurtleOp::ShowTurtle), 0, 0, 0, "n"),
        prim!("ST", G::Turtle(TurtleOp::ShowTurtle), 0, 0, 0, "n"),
        prim!("HIDETURTLE", G::Turtle(TurtleOp::HideTurtle), 0, 0, 0, "n"),
        prim!("HT", G::Turtle(TurtleOp::HideTurtle), 0, 0, 0, "n"),
        prim!("SETPOS", G::SetPos, 1, 1, 1, "n"),
        prim!("POS", G::Pos, 0, 0, 0, "d"),
        prim!("HEADING", G::Heading, 0, 0, 0, "r"),
        prim!("TOWARDS", G::Towards, 1, 1, 1, "d"),
        prim!("PENDOWNP", G::PenDownP, 0, 0, 0, "b"),
        prim!("PENDOWN?", G::PenDownP, 0, 0, 0, "b"),
        prim!("SHOWNP", G::ShownP, 0, 0, 0, "b"),
        prim!("SHOWN?", G::ShownP, 0, 0, 0, "b"),
    ]
}

struct Table {
    rows: Vec<Primitive>,
    by_name: FxHashMap<&'static str, usize>,
}

fn shared() -> &'static Table {
    static TABLE: OnceLock<Table> = OnceLock::new();
    TABLE.get_or_init(|| {
        let rows = table();
        let by_name = rows.iter().enumerate().map(|(i, p)| (p.name, i)).collect();
        Table { rows, by_name }
    })
}

/// Look up a primitive by name, any case.
pub fn lookup(name: &str) -> Option<&'static Primitive> {
    let table = shared();
    let key = name.to_uppercase();
    table.by_name.get(key.as_str()).map(|&i| &table.rows[i])
}

/// Every primitive row, in table order.
pub fn all() -> &'static [Primitive] {
    &shared().rows
}

/// Build a node for a primitive call. `None` if the name is not a primitive.
pub fn node(name: &str, children: Vec<DatumP>) -> Option<DatumP> {
    let prim = lookup(name)?;
    Some(AstNode::new(
        DatumP::word(name),
        prim.generator,
        prim.returns,
        children,
    ))
}
