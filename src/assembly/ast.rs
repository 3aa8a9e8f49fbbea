use crate::isa::Opcode;

/// The two sections of an assembly program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Code,
    Data,
}

/// The argument of a code instruction, as it changes between the translation passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// The instruction takes no operand.
    NoOperand,

    /// A symbol that is resolved into an address in the second pass.
    Unresolved(String),

    /// A literal or an already resolved symbol.
    Resolved(u32),
}

/// The argument of a data declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `NUMBER n`: a single cell holding a signed number.
    Number(&'a str),

    /// `STRING text`: a length cell followed by one cell per character.
    String(&'a str),

    /// `BUFFER n`: `n` zero cells.
    Buffer(&'a str),

    /// `VECTOR label`: declares the interrupt handler.
    Vector(&'a str),
}

/// A single meaningful line of assembly source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement<'a> {
    Section(Section),

    Label(&'a str),

    Declaration {
        name: &'a str,
        directive: Directive<'a>,
    },

    Instruction {
        opcode: Opcode,
        operand: Operand,
    },
}
