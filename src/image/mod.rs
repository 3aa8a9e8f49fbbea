//! Code images: the output of the translator and the input of the simulator.
//!
//! The textual form of an image looks like this:
//!
//! ```text
//! ___image___
//! ___vector___
//! 3
//! ___memory___
//! 0 PUSH 65
//! 1 OUTPUT
//! 2 HALT
//! 3 RET
//! ___end___
//! ```
//!
//! The line after `___vector___` holds the address of the interrupt handler and is omitted
//! when the program declares none. Every memory record is listed in address order.

use std::fmt;

use crate::isa::Instruction;

mod parser;

pub use self::parser::{ImageErrorKind, ParseError};

/// A translated program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeImage {
    /// Address of the interrupt handler, if the program declares one.
    pub interrupt_vector: Option<u32>,

    /// The initial memory. `memory[i].index == i` for every record.
    pub memory: Vec<Instruction>,
}

impl CodeImage {
    /// Parses an image from its textual form.
    pub fn parse(text: &str) -> Result<CodeImage, ParseError> {
        parser::parse_image_file(text)
    }

    /// Serializes the image into its textual form.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Number of memory cells in the image.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }
}

impl fmt::Display for CodeImage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "___image___")?;
        writeln!(f, "___vector___")?;

        if let Some(vector) = self.interrupt_vector {
            writeln!(f, "{}", vector)?;
        }

        writeln!(f, "___memory___")?;

        for record in &self.memory {
            writeln!(f, "{}", record)?;
        }

        writeln!(f, "___end___")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::Opcode;

    #[test]
    fn test_image_text() {
        let image = CodeImage {
            interrupt_vector: Some(1),
            memory: vec![
                Instruction { index: 0, opcode: Opcode::Halt, value: None },
                Instruction { index: 1, opcode: Opcode::Jump, value: Some(0) },
            ],
        };

        let text = image.to_text();

        assert_eq!(text, "___image___\n___vector___\n1\n___memory___\n0 HALT\n1 JUMP 0\n___end___\n");
        assert_eq!(CodeImage::parse(&text).unwrap(), image);
    }
}
