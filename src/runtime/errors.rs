//! Building error records
//!
//! Every error remembers the frame's procedure call and running line and
//! becomes the current error, which ERROR reports. Compiled code only
//! builds one on the path that fails.

use super::Evaluator;
use crate::error::{CompileError, ErrorCode};
use crate::value::{DatumP, ErrorRecord};

impl Evaluator {
    /// Raise `code` with its message arguments, shown.
    pub(crate) fn raise(&mut self, code: ErrorCode, args: &[&DatumP]) -> DatumP {
        let shown: Vec<String> = args.iter().map(|a| a.display_name().show()).collect();
        let refs: Vec<&str> = shown.iter().map(String::as_str).collect();
        let message = code.format(&refs);
        self.raise_with(code, DatumP::word("ERROR"), message, None)
    }

    fn raise_with(
        &mut self,
        code: ErrorCode,
        tag: DatumP,
        message: String,
        output: Option<DatumP>,
    ) -> DatumP {
        let frame = self.frames.top();
        let record = ErrorRecord {
            code,
            tag,
            message: DatumP::word(&message),
            output,
            procedure: frame.node.clone(),
            line: frame.line.clone(),
        };
        let datum = record.into_datum();
        self.current_error = Some(datum.clone());
        datum
    }

    pub(crate) fn doesnt_like(&mut self, who: &DatumP, what: &DatumP) -> DatumP {
        self.raise(ErrorCode::DoesntLike, &[who, what])
    }

    pub(crate) fn dont_say(&mut self, what: &DatumP) -> DatumP {
        self.raise(ErrorCode::DontSay, &[what])
    }

    /// `src` produced no value for `who`.
    pub(crate) fn didnt_output(&mut self, src: &DatumP, who: &DatumP) -> DatumP {
        self.raise(ErrorCode::DidntOutput, &[src, who])
    }

    /// THROW: the ERROR tag raises a user error, any other tag is looked
    /// for by CATCH.
    pub(crate) fn custom(&mut self, tag: &DatumP, output: Option<DatumP>) -> DatumP {
        let key = tag.as_word().map(|w| w.key().to_string()).unwrap_or_default();
        let output = output.filter(|o| o.is_data());
        if key == "ERROR" {
            return match output {
                None => self.raise_with(
                    ErrorCode::Throw,
                    tag.clone(),
                    ErrorCode::Throw.template().to_string(),
                    None,
                ),
                Some(message) => {
                    let text = message.print();
                    self.raise_with(ErrorCode::CustomThrow, tag.clone(), text, Some(message))
                }
            };
        }
        let message = ErrorCode::NoCatch.format(&[&tag.show()]);
        self.raise_with(ErrorCode::NoCatch, tag.clone(), message, output)
    }

    /// A compile failure seen by running code becomes an ordinary error.
    pub(crate) fn compile_failure(&mut self, source: &DatumP, err: CompileError) -> DatumP {
        tracing::debug!(source = ?source, error = %err, "compile failed");
        let message = match &err {
            CompileError::Unparsed(_) => ErrorCode::NoHow.format(&[&source.show()]),
            other => other.to_string(),
        };
        self.raise_with(ErrorCode::NoHow, DatumP::word("ERROR"), message, None)
    }
}
