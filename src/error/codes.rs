//! Numbered language errors.

/// Error numbers as reported by ERROR and THROW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    StackOverflow,
    TurtleOutOfBounds,
    DoesntLike,
    DidntOutput,
    NotEnoughInputs,
    TooManyInputs,
    DontSay,
    ParenNotFound,
    NoValue,
    UnexpectedParen,
    NoHow,
    NoCatch,
    AlreadyDefined,
    FileSystem,
    Throw,
    IsPrimitive,
    ToInProc,
    NoTest,
    NoGraphics,
    NotInsideProcedure,
    CustomThrow,
    NoApply,
}

impl ErrorCode {
    /// The number users see.
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::StackOverflow => 2,
            ErrorCode::TurtleOutOfBounds => 3,
            ErrorCode::DoesntLike => 4,
            ErrorCode::DidntOutput => 5,
            ErrorCode::NotEnoughInputs => 6,
            ErrorCode::TooManyInputs => 8,
            ErrorCode::DontSay => 9,
            ErrorCode::ParenNotFound => 10,
            ErrorCode::NoValue => 11,
            ErrorCode::UnexpectedParen => 12,
            ErrorCode::NoHow => 13,
            ErrorCode::NoCatch => 14,
            ErrorCode::AlreadyDefined => 15,
            ErrorCode::FileSystem => 18,
            ErrorCode::Throw => 21,
            ErrorCode::IsPrimitive => 22,
            ErrorCode::ToInProc => 23,
            ErrorCode::NoTest => 25,
            ErrorCode::NoGraphics => 28,
            ErrorCode::NotInsideProcedure => 31,
            ErrorCode::CustomThrow => 35,
            ErrorCode::NoApply => 44,
        }
    }

    /// Message template; `%1` and `%2` are replaced by shown values.
    pub fn template(self) -> &'static str {
        match self {
            ErrorCode::StackOverflow => "Stack overflow",
            ErrorCode::TurtleOutOfBounds => "Turtle out of bounds",
            ErrorCode::DoesntLike => "%1 doesn't like %2 as input",
            ErrorCode::DidntOutput => "%1 didn't output to %2",
            ErrorCode::NotEnoughInputs => "not enough inputs to %1",
            ErrorCode::TooManyInputs => "too many inputs to %1",
            ErrorCode::DontSay => "You don't say what to do with %1",
            ErrorCode::ParenNotFound => "')' not found",
            ErrorCode::NoValue => "%1 has no value",
            ErrorCode::UnexpectedParen => "unexpected ')'",
            ErrorCode::NoHow => "I don't know how to %1",
            ErrorCode::NoCatch => "Can't find catch tag for %1",
            ErrorCode::AlreadyDefined => "%1 is already defined",
            ErrorCode::FileSystem => "File system error",
            ErrorCode::Throw => "Throw \"Error",
            ErrorCode::IsPrimitive => "%1 is a primitive",
            ErrorCode::ToInProc => "can't use %1 inside a procedure",
            ErrorCode::NoTest => "%1 without TEST",
            ErrorCode::NoGraphics => "Graphics not initialized",
            ErrorCode::NotInsideProcedure => "Can only use %1 inside a procedure",
            ErrorCode::CustomThrow => "%1",
            ErrorCode::NoApply => "%1 can't be applied",
        }
    }

    pub fn format(self, args: &[&str]) -> String {
        let mut text = self.template().to_string();
        for (i, arg) in args.iter().enumerate() {
            text = text.replace(&format!("%{}", i + 1), arg);
        }
        text
    }
}
