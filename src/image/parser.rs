use std::fmt;
use std::result::Result as StdResult;

use nom::{
    IResult,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::multispace0,
    combinator::{all_consuming, cut, map, map_res, opt},
    sequence::{preceded, terminated, tuple},
    error::context,
};

use crate::error::finish;
use crate::isa::{Instruction, Opcode};

use super::CodeImage;

#[derive(Debug, Clone, PartialEq)]
pub enum ImageErrorKind {
    /// Records must be listed in address order, starting from zero.
    IndexMismatch {
        expected: usize,
        found: u32,
    },

    UnknownOpcode(String),
}

impl fmt::Display for ImageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImageErrorKind::IndexMismatch { expected, found } => {
                write!(f, "expected a record for address {}, found one for {}", expected, found)
            },
            ImageErrorKind::UnknownOpcode(name) => write!(f, "unknown opcode '{}'", name),
        }
    }
}

pub type ParseError = crate::error::ParseError<ImageErrorKind>;
type Result<'a, T> = IResult<&'a str, T, ParseError>;

const SPACE_CHARACTERS: &str = " \t";
const NEWLINE_CHARACTERS: &str = "\r\n";

fn sp(input: &str) -> Result<&str> {
    take_while1(|c| SPACE_CHARACTERS.contains(c))(input)
}

fn newline(input: &str) -> Result<&str> {
    take_while1(|c| NEWLINE_CHARACTERS.contains(c))(input)
}

fn take_u32(base: u32) -> impl Fn(&str) -> Result<u32> {
    move |input: &str| map_res(
        take_while1(|c: char| c.is_digit(base)),
        |s| u32::from_str_radix(s, base),
    )(input)
}

fn take_opcode(input: &str) -> Result<Opcode> {
    let (rest, name) = take_while(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)?;

    match name.parse() {
        Ok(opcode) => Ok((rest, opcode)),
        Err(()) => Err(nom::Err::Failure(
            ParseError::from_kind(input, ImageErrorKind::UnknownOpcode(name.to_string())),
        )),
    }
}

fn parse_record(input: &str) -> Result<Instruction> {
    map(
        tuple((
            take_u32(10),
            cut(terminated(
                tuple((
                    preceded(sp, take_opcode),
                    opt(preceded(sp, take_u32(10))),
                )),
                newline,
            )),
        )),
        |(index, (opcode, value))| Instruction {
            index,
            opcode,
            value,
        },
    )(input)
}

fn parse_records(mut input: &str) -> Result<Vec<Instruction>> {
    let mut memory = Vec::new();

    loop {
        match context("record", parse_record)(input) {
            Ok((rest, record)) => {
                if record.index as usize != memory.len() {
                    let kind = ImageErrorKind::IndexMismatch {
                        expected: memory.len(),
                        found: record.index,
                    };

                    return Err(nom::Err::Failure(ParseError::from_kind(input, kind)));
                }

                memory.push(record);
                input = rest;
            },
            Err(nom::Err::Error(_)) => return Ok((input, memory)),
            Err(err) => return Err(err),
        }
    }
}

fn parse_image_file_nom(input: &str) -> Result<CodeImage> {
    map(
        tuple((
            terminated(tag("___image___"), newline),
            terminated(tag("___vector___"), newline),
            opt(terminated(take_u32(10), newline)),
            terminated(tag("___memory___"), newline),
            parse_records,
            terminated(tag("___end___"), multispace0),
        )),
        |(_, _, interrupt_vector, _, memory, _)| CodeImage {
            interrupt_vector,
            memory,
        },
    )(input)
}

pub(crate) fn parse_image_file(input: &str) -> StdResult<CodeImage, ParseError> {
    finish(all_consuming(parse_image_file_nom)(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image() {
        let text = "___image___\n___vector___\n2\n___memory___\n0 PUSH 65\n1 OUTPUT\n2 HALT\n3 NUMBER 4294967295\n___end___\n";

        let image = parse_image_file(text).unwrap();

        assert_eq!(image.interrupt_vector, Some(2));
        assert_eq!(image.memory, vec![
            Instruction { index: 0, opcode: Opcode::Push, value: Some(65) },
            Instruction { index: 1, opcode: Opcode::Output, value: None },
            Instruction { index: 2, opcode: Opcode::Halt, value: None },
            Instruction { index: 3, opcode: Opcode::Number, value: Some(u32::max_value()) },
        ]);
    }

    #[test]
    fn test_parse_image_without_vector() {
        let text = "___image___\r\n___vector___\r\n___memory___\r\n0 HALT\r\n___end___";

        let image = parse_image_file(text).unwrap();

        assert_eq!(image.interrupt_vector, None);
        assert_eq!(image.memory.len(), 1);
    }

    #[test]
    fn test_parse_image_errors() {
        let text = "___image___\n___vector___\n___memory___\n0 HALT\n2 HALT\n___end___\n";
        let err = parse_image_file(text).unwrap_err();

        assert_eq!(err.kind(), Some(&ImageErrorKind::IndexMismatch { expected: 1, found: 2 }));
        assert_eq!(err.verbose(text).line, 5);

        let text = "___image___\n___vector___\n___memory___\n0 JMP 3\n___end___\n";
        let err = parse_image_file(text).unwrap_err();

        assert_eq!(err.kind(), Some(&ImageErrorKind::UnknownOpcode("JMP".to_string())));

        let text = "___image___\n___vector___\n___memory___\n0 PUSH 4294967296\n___end___\n";
        assert!(parse_image_file(text).is_err());

        let text = "___image___\n___vector___\n___memory___\n0 HALT\n";
        assert!(parse_image_file(text).is_err());
    }
}
