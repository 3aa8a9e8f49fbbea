use std::convert::TryFrom;

use slog::Logger;

use crate::image::CodeImage;
use crate::isa::{fold_signed, Opcode, MAX_UNSIGNED};
use crate::parsing::{Error, ErrorExt, ErrorKind};
use crate::symbol_table::{SymbolInfo, SymbolKind, SymbolTable};

use super::ast::{Directive, Operand, Section, Statement};
use super::parser::{meaningful, parse_literal, parse_statement};

/// A memory cell laid out by the first pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub opcode: Opcode,
    pub operand: Operand,

    /// Source line the cell was produced from.
    pub line: usize,
}

/// The `VECTOR` declaration. The target is resolved in the second pass.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDeclaration {
    pub name: String,
    pub target: String,
    pub line: usize,
}

/// Result of the first translation pass: memory layout, symbol addresses and the unresolved
/// interrupt vector.
#[derive(Debug, Default, Clone)]
pub struct Program {
    pub cells: Vec<Cell>,
    pub symbol_table: SymbolTable,
    pub vector: Option<VectorDeclaration>,
}

impl Program {
    /// Runs the first pass over `source`.
    pub fn parse(source: &str) -> Result<Program, Error> {
        let mut program = Program::default();
        let mut section = Section::Code;

        for (index, line) in source.lines().enumerate() {
            let number = index + 1;

            program.parse_line(line, number, &mut section)
                .line(number)?;
        }

        Ok(program)
    }

    /// Runs the second pass. See [crate::compiler::compile].
    pub fn compile(self) -> Result<CodeImage, Error> {
        crate::compiler::compile(self)
    }

    pub fn compile_with_logger<L: Into<Option<Logger>>>(self, logger: L) -> Result<CodeImage, Error> {
        crate::compiler::compile_with_logger(self, logger)
    }

    /// Address of the next cell.
    fn address(&self) -> Result<u32, Error> {
        let cells = self.cells.len();

        u32::try_from(cells)
            .map_err(|_| ErrorKind::LayoutTooLarge { cells: cells as i64, requested: 0 }.into())
    }

    /// Fails if `count` more cells would not be addressable.
    fn reserve(&self, count: i64) -> Result<(), Error> {
        let cells = self.cells.len() as i64;

        if cells + count > MAX_UNSIGNED + 1 {
            return Err(ErrorKind::LayoutTooLarge { cells, requested: count }.into());
        }

        Ok(())
    }

    fn parse_line(&mut self, line: &str, number: usize, section: &mut Section) -> Result<(), Error> {
        let statement = match parse_statement(meaningful(line), *section)? {
            Some(statement) => statement,
            None => return Ok(()),
        };

        match statement {
            Statement::Section(Section::Code) if *section == Section::Data => {
                Err(ErrorKind::CodeAfterData.into())
            },
            Statement::Section(next) => {
                *section = next;
                Ok(())
            },
            Statement::Label(name) => self.define(name, SymbolKind::Label, number),
            Statement::Declaration { name, directive } => {
                self.declare(name, directive, number)
                    .context(format!("declaration of '{}'", name))
            },
            Statement::Instruction { opcode, operand } => {
                self.reserve(1)?;
                self.push(opcode, operand, number);
                Ok(())
            },
        }
    }

    fn push(&mut self, opcode: Opcode, operand: Operand, line: usize) {
        self.cells.push(Cell { opcode, operand, line });
    }

    fn define(&mut self, name: &str, kind: SymbolKind, line: usize) -> Result<(), Error> {
        let info = SymbolInfo {
            kind,
            address: self.address()?,
            line,
        };

        self.symbol_table.define_symbol(name, info)
            .map_err(|existing| ErrorKind::DuplicateSymbol {
                name: name.to_string(),
                first_line: existing.line,
            }.into())
    }

    fn declare(&mut self, name: &str, directive: Directive, line: usize) -> Result<(), Error> {
        match directive {
            Directive::Vector(target) => {
                if let Some(ref first) = self.vector {
                    return Err(ErrorKind::DuplicateVector { first_line: first.line }.into());
                }

                self.vector = Some(VectorDeclaration {
                    name: name.to_string(),
                    target: target.to_string(),
                    line,
                });
            },
            Directive::Number(literal) => {
                let value = fold_signed(parse_literal(literal)?)
                    .ok_or_else(|| ErrorKind::LiteralOutOfRange { literal: literal.to_string() })?;

                self.reserve(1)?;
                self.define(name, SymbolKind::Variable, line)?;
                self.push(Opcode::Number, Operand::Resolved(value), line);
            },
            Directive::String(text) => {
                self.reserve(text.chars().count() as i64 + 1)?;
                self.define(name, SymbolKind::Variable, line)?;
                self.push(Opcode::String, Operand::Resolved(text.chars().count() as u32), line);

                for character in text.chars() {
                    self.push(Opcode::String, Operand::Resolved(character as u32), line);
                }
            },
            Directive::Buffer(literal) => {
                let invalid = || ErrorKind::InvalidBufferSize { size: literal.to_string() };

                let size = parse_literal(literal).map_err(|_| invalid())?;

                if size < 1 || size > MAX_UNSIGNED {
                    return Err(invalid().into());
                }

                self.reserve(size)?;
                self.define(name, SymbolKind::Variable, line)?;

                for _ in 0..size {
                    self.push(Opcode::Buffer, Operand::Resolved(0), line);
                }
            },
        }

        Ok(())
    }
}
