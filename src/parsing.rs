//! Errors produced while translating assembly source.

use std::fmt;
use itertools::Itertools;

use crate::isa::Opcode;

/// A translation error. All translation errors are fatal: no part of the code image is usable
/// after one has been produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,

    /// Line number (1-based) of the source line that caused the error.
    pub line: Option<usize>,

    /// Descriptions of what was being done when the error happened, innermost first.
    pub context: Vec<String>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Error {
        Error {
            kind,
            line: None,
            context: Vec::new(),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error::new(kind)
    }
}

pub trait ErrorExt<R> {
    /// Adds a description of the operation that failed.
    fn context<T>(self, ctx: T) -> Self where T: Into<String>;

    /// Attaches the source line number, unless a more specific one is already known.
    fn line(self, line: usize) -> Self;
}

impl<R> ErrorExt<R> for Result<R, Error> {
    fn context<T>(mut self, ctx: T) -> Self where T: Into<String> {
        if let Err(ref mut err) = self {
            err.context.push(ctx.into());
        }

        self
    }

    fn line(mut self, line: usize) -> Self {
        if let Err(ref mut err) = self {
            err.line.get_or_insert(line);
        }

        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ErrorKind {
    /// A label or a variable was defined twice.
    DuplicateSymbol {
        name: String,
        first_line: usize,
    },

    /// A `.code:` section marker appeared after the `.data:` marker.
    CodeAfterData,

    /// A label definition in the data section.
    LabelInData {
        name: String,
    },

    /// An instruction or a directive was given the wrong number of arguments.
    OperandCount {
        opcode: Opcode,
        expected: usize,
        got: usize,
    },

    /// A numeric argument could not be read as an integer.
    InvalidLiteral {
        literal: String,
    },

    /// A numeric argument does not fit in a machine word.
    LiteralOutOfRange {
        literal: String,
    },

    /// A `BUFFER` directive with a size outside of `1..=MAX_UNSIGNED`.
    InvalidBufferSize {
        size: String,
    },

    /// The memory layout would grow past the last addressable cell.
    LayoutTooLarge {
        cells: i64,
        requested: i64,
    },

    /// An operand names a symbol that was never defined.
    UnresolvedSymbol {
        name: String,
        suggestion: Option<String>,
    },

    /// An instruction mnemonic that does not exist.
    UnknownOpcode {
        name: String,
        suggestion: Option<String>,
    },

    /// A data declaration with an opcode other than `NUMBER`, `STRING`, `BUFFER` or `VECTOR`.
    InvalidDirective {
        name: String,
    },

    /// A data directive used in the code section.
    DirectiveInCode {
        opcode: Opcode,
    },

    /// A data declaration that is not of the form `name OPCODE argument`.
    MalformedDeclaration,

    /// More than one `VECTOR` declaration.
    DuplicateVector {
        first_line: usize,
    },

    UnexpectedToken {
        token: String,
    },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::DuplicateSymbol { name, first_line } =>
                write!(f, "redefinition of '{}' (first defined on line {})", name, first_line),
            ErrorKind::CodeAfterData =>
                write!(f, ".code: section after the .data: section"),
            ErrorKind::LabelInData { name } =>
                write!(f, "label '{}' in the data section", name),
            ErrorKind::OperandCount { opcode, expected, got } =>
                write!(f, "{} takes {} argument(s) but {} were given", opcode, expected, got),
            ErrorKind::InvalidLiteral { literal } =>
                write!(f, "'{}' is not a number", literal),
            ErrorKind::LiteralOutOfRange { literal } =>
                write!(f, "{} does not fit in a 32-bit word", literal),
            ErrorKind::InvalidBufferSize { size } =>
                write!(f, "invalid buffer size {}", size),
            ErrorKind::LayoutTooLarge { cells, requested } =>
                write!(f, "cannot add {} cells after {}, memory is full", requested, cells),
            ErrorKind::UnresolvedSymbol { name, suggestion: Some(suggestion) } =>
                write!(f, "undefined symbol '{}', did you mean '{}'?", name, suggestion),
            ErrorKind::UnresolvedSymbol { name, suggestion: None } =>
                write!(f, "undefined symbol '{}'", name),
            ErrorKind::UnknownOpcode { name, suggestion: Some(suggestion) } =>
                write!(f, "unknown instruction '{}', did you mean '{}'?", name, suggestion),
            ErrorKind::UnknownOpcode { name, suggestion: None } =>
                write!(f, "unknown instruction '{}'", name),
            ErrorKind::InvalidDirective { name } =>
                write!(f, "'{}' is not a data directive", name),
            ErrorKind::DirectiveInCode { opcode } =>
                write!(f, "directive {} outside of the data section", opcode),
            ErrorKind::MalformedDeclaration =>
                write!(f, "expected a declaration of the form 'name DIRECTIVE argument'"),
            ErrorKind::DuplicateVector { first_line } =>
                write!(f, "interrupt vector already declared on line {}", first_line),
            ErrorKind::UnexpectedToken { token } =>
                write!(f, "unexpected '{}'", token),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(line) = self.line {
            write!(f, "line {}: ", line)?;
        }

        if !self.context.is_empty() {
            let ctx = self.context.iter()
                .rev()
                .join(": ");

            write!(f, "{}: ", ctx)?;
        }

        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for Error {}
