//! Tokens and a tokenizer for a single line of assembly source.

use logos::{Lexer, Logos};

use std::fmt;

/// Enumeration of all tokens of the assembly format.
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Token<'a> {
    /// Errorneous token that could not be interpreted as any of the other variants.
    #[error]
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Error,

    /// The `.code:` section marker.
    #[token(".code:")]
    CodeSection,

    /// The `.data:` section marker.
    #[token(".data:")]
    DataSection,

    /// A label definition, `name:`. Holds the name without the colon.
    #[regex("[A-Za-z_][A-Za-z0-9_]*:", label_callback)]
    Label(&'a str),

    /// An instruction mnemonic, a directive or a symbol reference.
    #[regex("[A-Za-z_][A-Za-z0-9_]*", word_callback)]
    Word(&'a str),

    /// An integer literal with an optional sign. Range checks happen in the parser.
    #[regex("[+-]?[0-9]+", word_callback)]
    Literal(&'a str),
}

fn label_callback<'a>(lex: &mut Lexer<'a, Token<'a>>) -> &'a str {
    let slice = lex.slice();
    &slice[..slice.len() - 1]
}

fn word_callback<'a>(lex: &mut Lexer<'a, Token<'a>>) -> &'a str {
    lex.slice()
}

impl<'t> fmt::Display for Token<'t> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Error => write!(f, "<error>"),
            Token::CodeSection => write!(f, ".code:"),
            Token::DataSection => write!(f, ".data:"),
            Token::Label(label) => write!(f, "{}:", label),
            Token::Word(word) => write!(f, "{}", word),
            Token::Literal(literal) => write!(f, "{}", literal),
        }
    }
}

#[test]
fn test_tokenize_line() {
    let tokens: Vec<_> = Token::lexer("start:  JUMP loop_2 -15 .data:").collect();

    assert_eq!(tokens, vec![
        Token::Label("start"),
        Token::Word("JUMP"),
        Token::Word("loop_2"),
        Token::Literal("-15"),
        Token::DataSection,
    ]);
}

#[test]
fn test_tokenize_garbage() {
    let tokens: Vec<_> = Token::lexer("PUSH #1").collect();

    assert_eq!(tokens[0], Token::Word("PUSH"));
    assert_eq!(tokens[1], Token::Error);
}
