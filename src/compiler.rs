//! Translation from assembly source to a code image.
//!
//! Translation happens in two passes. The first one, [Program::parse], lays out every memory
//! cell and records the address of each symbol. The second one, [compile], replaces symbol
//! operands with their addresses and resolves the interrupt vector.

use slog::{debug, o, trace, Discard, Logger};

use crate::assembly::ast::Operand;
use crate::assembly::{Program, VectorDeclaration};
use crate::image::CodeImage;
use crate::isa::Instruction;
use crate::parsing::{Error, ErrorExt, ErrorKind};
use crate::symbol_table::{SymbolKind, SymbolTable};

/// Translates assembly source into a code image.
pub fn translate(source: &str) -> Result<CodeImage, Error> {
    translate_with_logger(source, None)
}

pub fn translate_with_logger<L>(source: &str, logger: L) -> Result<CodeImage, Error>
where
    L: Into<Option<Logger>>,
{
    let program = Program::parse(source)?;
    compile_with_logger(program, logger)
}

/// Runs the second translation pass over a parsed program.
pub fn compile(program: Program) -> Result<CodeImage, Error> {
    compile_with_logger(program, None)
}

fn resolve_symbol(symbol_table: &SymbolTable, symbol: &str) -> Result<u32, Error> {
    symbol_table.resolve(symbol)
        .ok_or_else(|| ErrorKind::UnresolvedSymbol {
            name: symbol.to_string(),
            suggestion: symbol_table.suggest(symbol, None),
        }.into())
}

fn resolve_vector(symbol_table: &SymbolTable, vector: &VectorDeclaration) -> Result<u32, Error> {
    symbol_table.resolve_label(&vector.target)
        .ok_or_else(|| ErrorKind::UnresolvedSymbol {
            name: vector.target.clone(),
            suggestion: symbol_table.suggest(&vector.target, Some(SymbolKind::Label)),
        }.into())
}

pub fn compile_with_logger<L>(program: Program, logger: L) -> Result<CodeImage, Error>
where
    L: Into<Option<Logger>>,
{
    let logger = logger
        .into()
        .unwrap_or(Logger::root(Discard, o!()))
        .new(o!("stage" => "translation"));

    let Program { cells, symbol_table, vector } = program;

    for (name, info) in symbol_table.iter() {
        trace!(logger, "symbol"; "name" => name, "kind" => ?info.kind, "address" => info.address, "line" => info.line);
    }

    let interrupt_vector = match vector {
        Some(vector) => {
            let address = resolve_vector(&symbol_table, &vector)
                .context(format!("interrupt vector '{}' must name a label", vector.name))
                .line(vector.line)?;

            debug!(logger, "resolve interrupt vector"; "target" => vector.target.as_str(), "address" => address);

            Some(address)
        },
        None => None,
    };

    let mut memory = Vec::with_capacity(cells.len());

    for (index, cell) in cells.into_iter().enumerate() {
        let value = match cell.operand {
            Operand::NoOperand => None,
            Operand::Resolved(value) => Some(value),
            Operand::Unresolved(symbol) => {
                let address = resolve_symbol(&symbol_table, &symbol)
                    .line(cell.line)?;

                trace!(logger, "resolve symbol"; "symbol" => symbol.as_str(), "address" => address);

                Some(address)
            },
        };

        let record = Instruction {
            index: index as u32,
            opcode: cell.opcode,
            value,
        };

        trace!(logger, "append record"; "index" => index, "opcode" => %record.opcode, "value" => ?record.value);

        memory.push(record);
    }

    debug!(logger, "translation finished"; "records" => memory.len(), "symbols" => symbol_table.len());

    Ok(CodeImage {
        interrupt_vector,
        memory,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::Opcode;

    #[test]
    fn test_translate() {
        let source = r#"
; prints the first character of the message
.code:
start:
    LOAD msg
    PUSH msg
    INC
    LOAD_AC
    OUTPUT
    HALT
.data:
    msg STRING A!
    irq VECTOR start
"#;

        let image = translate(source).unwrap();

        assert_eq!(image.interrupt_vector, Some(0));
        assert_eq!(image.memory.len(), 9);

        assert_eq!(image.memory[0], Instruction { index: 0, opcode: Opcode::Load, value: Some(6) });
        assert_eq!(image.memory[1], Instruction { index: 1, opcode: Opcode::Push, value: Some(6) });
        assert_eq!(image.memory[2], Instruction { index: 2, opcode: Opcode::Increment, value: None });
        assert_eq!(image.memory[6], Instruction { index: 6, opcode: Opcode::String, value: Some(2) });
        assert_eq!(image.memory[7], Instruction { index: 7, opcode: Opcode::String, value: Some(65) });
        assert_eq!(image.memory[8], Instruction { index: 8, opcode: Opcode::String, value: Some(33) });

        for (index, record) in image.memory.iter().enumerate() {
            assert_eq!(record.index as usize, index);
        }
    }

    #[test]
    fn test_forward_references() {
        let image = translate("JUMP end\nNOP\nend:\nHALT\n").unwrap();

        assert_eq!(image.memory[0].value, Some(2));
        assert_eq!(image.interrupt_vector, None);
    }

    #[test]
    fn test_label_at_end() {
        let image = translate("JUMP end\nend:\n").unwrap();

        assert_eq!(image.memory[0].value, Some(1));
        assert_eq!(image.memory.len(), 1);
    }

    #[test]
    fn test_unresolved_symbol() {
        let err = translate("HALT\nLOAD cuont\n.data:\ncount NUMBER 0\n").unwrap_err();

        assert_eq!(err.kind, ErrorKind::UnresolvedSymbol {
            name: "cuont".to_string(),
            suggestion: Some("count".to_string()),
        });
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn test_vector_must_name_label() {
        let err = translate("HALT\n.data:\nx NUMBER 1\nirq VECTOR x\n").unwrap_err();

        assert_eq!(err.kind, ErrorKind::UnresolvedSymbol {
            name: "x".to_string(),
            suggestion: None,
        });
        assert_eq!(err.line, Some(4));

        let err = translate("handler:\nHALT\n.data:\nirq VECTOR handlr\n").unwrap_err();

        assert_eq!(err.kind, ErrorKind::UnresolvedSymbol {
            name: "handlr".to_string(),
            suggestion: Some("handler".to_string()),
        });
    }

    #[test]
    fn test_empty_source() {
        let image = translate("; nothing here\n\n").unwrap();

        assert_eq!(image, CodeImage::default());
    }
}
