//! Classification of single source lines into [statements](Statement).

use std::num::IntErrorKind;

use logos::{Lexer, Logos};

use crate::isa::{fold_operand, Opcode};
use crate::parsing::{Error, ErrorKind};
use crate::utils::suggest;

use super::ast::{Directive, Operand, Section, Statement};
use super::token::Token;

/// Removes the comment and the surrounding whitespace from a source line.
pub fn meaningful(line: &str) -> &str {
    line.find(';')
        .map_or(line, |start| &line[..start])
        .trim()
}

/// Reads an integer literal. Range checks are left to the caller.
pub(crate) fn parse_literal(literal: &str) -> Result<i64, ErrorKind> {
    literal.parse().map_err(|err: std::num::ParseIntError| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ErrorKind::LiteralOutOfRange {
            literal: literal.to_string(),
        },
        _ => ErrorKind::InvalidLiteral {
            literal: literal.to_string(),
        },
    })
}

fn unexpected<'a>(lex: &Lexer<'a, Token<'a>>) -> Error {
    ErrorKind::UnexpectedToken {
        token: lex.slice().to_string(),
    }.into()
}

fn expect_end<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Result<(), Error> {
    match lex.next() {
        None => Ok(()),
        Some(_) => Err(unexpected(lex)),
    }
}

/// Strips one pair of double quotes around a string argument.
fn unquote(argument: &str) -> &str {
    if argument.len() >= 2 && argument.starts_with('"') && argument.ends_with('"') {
        &argument[1..argument.len() - 1]
    } else {
        argument
    }
}

/// Parses the meaningful part of a line (see [meaningful]).
///
/// The section decides whether the line is read as a data declaration or as a code
/// instruction. Returns `None` for an empty line.
pub fn parse_statement(line: &str, section: Section) -> Result<Option<Statement>, Error> {
    let mut lex = Token::lexer(line);

    let first = match lex.next() {
        Some(token) => token,
        None => return Ok(None),
    };

    let statement = match first {
        Token::CodeSection => {
            expect_end(&mut lex)?;
            Statement::Section(Section::Code)
        },
        Token::DataSection => {
            expect_end(&mut lex)?;
            Statement::Section(Section::Data)
        },
        Token::Label(name) if section == Section::Data => {
            return Err(ErrorKind::LabelInData { name: name.to_string() }.into());
        },
        Token::Label(name) => {
            expect_end(&mut lex)?;
            Statement::Label(name)
        },
        Token::Word(name) if section == Section::Data => parse_declaration(line, name, &mut lex)?,
        Token::Word(mnemonic) => parse_instruction(mnemonic, &mut lex)?,
        Token::Literal(_) | Token::Error => return Err(unexpected(&lex)),
    };

    Ok(Some(statement))
}

fn parse_declaration<'a>(
    line: &'a str,
    name: &'a str,
    lex: &mut Lexer<'a, Token<'a>>,
) -> Result<Statement<'a>, Error> {
    let directive = match lex.next() {
        Some(Token::Word(directive)) => directive,
        _ => return Err(ErrorKind::MalformedDeclaration.into()),
    };

    let opcode = match directive.parse::<Opcode>() {
        Ok(opcode) if opcode.is_directive() => opcode,
        _ => return Err(ErrorKind::InvalidDirective { name: directive.to_string() }.into()),
    };

    // The argument is taken verbatim, so that strings may contain any characters.
    let argument = line[lex.span().end..].trim();

    let words = argument.split_whitespace().count();
    let expected_words = match opcode {
        Opcode::String => std::cmp::max(words, 1),
        _ => 1,
    };

    if words != expected_words {
        return Err(ErrorKind::OperandCount { opcode, expected: 1, got: words }.into());
    }

    let directive = match opcode {
        Opcode::Number => Directive::Number(argument),
        Opcode::String => Directive::String(unquote(argument)),
        Opcode::Buffer => Directive::Buffer(argument),
        _ => Directive::Vector(argument),
    };

    Ok(Statement::Declaration { name, directive })
}

fn parse_instruction<'a>(mnemonic: &'a str, lex: &mut Lexer<'a, Token<'a>>) -> Result<Statement<'a>, Error> {
    let opcode = mnemonic.parse::<Opcode>()
        .map_err(|_| ErrorKind::UnknownOpcode {
            name: mnemonic.to_string(),
            suggestion: suggest(mnemonic, Opcode::instruction_mnemonics()),
        })?;

    if opcode.is_directive() {
        return Err(ErrorKind::DirectiveInCode { opcode }.into());
    }

    let mut operands = Vec::new();

    while let Some(token) = lex.next() {
        let operand = match token {
            Token::Word(symbol) => Operand::Unresolved(symbol.to_string()),
            Token::Literal(literal) => {
                let value = parse_literal(literal)?;

                let value = fold_operand(value)
                    .ok_or_else(|| ErrorKind::LiteralOutOfRange { literal: literal.to_string() })?;

                Operand::Resolved(value)
            },
            _ => return Err(unexpected(lex)),
        };

        operands.push(operand);
    }

    let expected = if opcode.takes_operand() { 1 } else { 0 };

    if operands.len() != expected {
        return Err(ErrorKind::OperandCount { opcode, expected, got: operands.len() }.into());
    }

    let operand = operands.pop().unwrap_or(Operand::NoOperand);

    Ok(Statement::Instruction { opcode, operand })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_code(line: &str) -> Result<Option<Statement>, Error> {
        parse_statement(line, Section::Code)
    }

    #[test]
    fn test_meaningful() {
        assert_eq!(meaningful("   LOAD x ; comment ; more"), "LOAD x");
        assert_eq!(meaningful("; only a comment"), "");
        assert_eq!(meaningful("\tHALT\r"), "HALT");
    }

    #[test]
    fn test_parse_instructions() {
        assert_eq!(parse_code("HALT"), Ok(Some(Statement::Instruction {
            opcode: Opcode::Halt,
            operand: Operand::NoOperand,
        })));

        assert_eq!(parse_code("JUMP loop"), Ok(Some(Statement::Instruction {
            opcode: Opcode::Jump,
            operand: Operand::Unresolved("loop".to_string()),
        })));

        assert_eq!(parse_code("PUSH -1"), Ok(Some(Statement::Instruction {
            opcode: Opcode::Push,
            operand: Operand::Resolved(0xFFFF_FFFF),
        })));

        assert_eq!(parse_code("CMP 4294967295"), Ok(Some(Statement::Instruction {
            opcode: Opcode::Compare,
            operand: Operand::Resolved(u32::max_value()),
        })));

        assert_eq!(parse_code("loop:"), Ok(Some(Statement::Label("loop"))));
        assert_eq!(parse_code(".data:"), Ok(Some(Statement::Section(Section::Data))));
        assert_eq!(parse_code(""), Ok(None));
    }

    #[test]
    fn test_parse_instruction_errors() {
        let err = parse_code("HALT 1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::OperandCount { opcode: Opcode::Halt, expected: 0, got: 1 });

        let err = parse_code("JUMP").unwrap_err();
        assert_eq!(err.kind, ErrorKind::OperandCount { opcode: Opcode::Jump, expected: 1, got: 0 });

        let err = parse_code("LOAD a b").unwrap_err();
        assert_eq!(err.kind, ErrorKind::OperandCount { opcode: Opcode::Load, expected: 1, got: 2 });

        let err = parse_code("PUSH 4294967296").unwrap_err();
        assert_eq!(err.kind, ErrorKind::LiteralOutOfRange { literal: "4294967296".to_string() });

        let err = parse_code("PUSH 99999999999999999999").unwrap_err();
        assert_eq!(err.kind, ErrorKind::LiteralOutOfRange { literal: "99999999999999999999".to_string() });

        let err = parse_code("LOAF x").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownOpcode {
            name: "LOAF".to_string(),
            suggestion: Some("LOAD".to_string()),
        });

        let err = parse_code("NUMBER 5").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DirectiveInCode { opcode: Opcode::Number });

        let err = parse_code("loop: JUMP loop").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken { token: "JUMP".to_string() });

        let err = parse_code("PUSH $").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken { token: "$".to_string() });
    }

    #[test]
    fn test_parse_declarations() {
        let parse_data = |line| parse_statement(line, Section::Data);

        assert_eq!(parse_data("msg STRING Hello, world!"), Ok(Some(Statement::Declaration {
            name: "msg",
            directive: Directive::String("Hello, world!"),
        })));

        assert_eq!(parse_data("msg STRING \"  padded \""), Ok(Some(Statement::Declaration {
            name: "msg",
            directive: Directive::String("  padded "),
        })));

        assert_eq!(parse_data("n NUMBER -42"), Ok(Some(Statement::Declaration {
            name: "n",
            directive: Directive::Number("-42"),
        })));

        assert_eq!(parse_data("irq VECTOR handler"), Ok(Some(Statement::Declaration {
            name: "irq",
            directive: Directive::Vector("handler"),
        })));

        let err = parse_data("n WORD 1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidDirective { name: "WORD".to_string() });

        let err = parse_data("n LOAD 1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidDirective { name: "LOAD".to_string() });

        let err = parse_data("n NUMBER").unwrap_err();
        assert_eq!(err.kind, ErrorKind::OperandCount { opcode: Opcode::Number, expected: 1, got: 0 });

        let err = parse_data("buf BUFFER 1 2").unwrap_err();
        assert_eq!(err.kind, ErrorKind::OperandCount { opcode: Opcode::Buffer, expected: 1, got: 2 });

        let err = parse_data("n 5").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedDeclaration);

        let err = parse_data("here:").unwrap_err();
        assert_eq!(err.kind, ErrorKind::LabelInData { name: "here".to_string() });
    }
}
