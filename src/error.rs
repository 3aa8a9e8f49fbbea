use std::fmt::{self, Display};
use nom::error::ErrorKind;

#[derive(Debug, Clone)]
enum InnerError<Kind> {
    Incomplete,
    Other(Kind),
    Nom(ErrorKind),
}

impl<Kind: Display> fmt::Display for InnerError<Kind> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InnerError::Nom(_err) => write!(f, "unexpected input"),
            InnerError::Other(kind) => fmt::Display::fmt(kind, f),
            InnerError::Incomplete => write!(f, "expected more input"),
        }
    }
}

/// Error type of the file format parsers. Contains the reason of the error and the unconsumed
/// input at the point where parsing failed.
///
/// For error location information see [ParseError::verbose].
#[derive(Clone, Debug)]
pub struct ParseError<Kind> {
    rest: String,
    kind: InnerError<Kind>,
    context: Vec<&'static str>,
}

impl<Kind> ParseError<Kind> {
    pub(crate) fn from_kind(rest: &str, kind: Kind) -> ParseError<Kind> {
        ParseError {
            rest: rest.to_string(),
            kind: InnerError::Other(kind),
            context: Vec::new(),
        }
    }

    pub(crate) fn incomplete() -> ParseError<Kind> {
        ParseError {
            rest: String::new(),
            kind: InnerError::Incomplete,
            context: Vec::new(),
        }
    }

    /// Returns the domain specific reason of the error, if the error was not produced by the
    /// grammar itself.
    pub fn kind(&self) -> Option<&Kind> {
        match self.kind {
            InnerError::Other(ref kind) => Some(kind),
            _ => None,
        }
    }

    /// Calculates the error location information from the [ParseError] and the original input
    /// buffer.
    ///
    /// # Parameters
    /// - `input`: The original input buffer or an exact copy of it.
    pub fn verbose(self, input: &str) -> VerboseParseError<Kind> {
        let start = input.len().saturating_sub(self.rest.len());

        let mut line = 1;
        let mut column = 1;

        for ch in input[..start].chars() {
            if ch == '\n' {
                line += 1;
                column = 0;
            }

            column += 1;
        }

        let rest = input[start..]
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(20)
            .collect();

        VerboseParseError {
            line,
            column,
            kind: self.kind,
            rest,
        }
    }
}

/// Error type containing location information in addition to the reason of the error.
///
/// Created from a [ParseError] with [ParseError::verbose].
#[derive(Clone, Debug)]
pub struct VerboseParseError<Kind> {
    /// The line number of the error location.
    pub line: usize,
    /// The column number of the error location.
    pub column: usize,
    kind: InnerError<Kind>,
    rest: String,
}

impl<Kind: Display> fmt::Display for VerboseParseError<Kind> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "at line {} col {}: {}, at '{}'", self.line, self.column, self.kind, self.rest)
    }
}

impl<Kind: Display> fmt::Display for ParseError<Kind> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for ctx in self.context.iter().rev() {
            write!(f, "invalid {}: ", ctx)?;
        }

        let snippet: String = self.rest
            .chars()
            .take_while(|c| *c != '\n')
            .take(20)
            .collect();

        write!(f, "{} at: {}", self.kind, snippet)
    }
}

impl<Kind> nom::error::ParseError<&str> for ParseError<Kind> {
    fn from_error_kind(input: &str, kind: ErrorKind) -> Self {
        ParseError {
            rest: input.to_string(),
            kind: InnerError::Nom(kind),
            context: Vec::new(),
        }
    }

    fn append(_input: &str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    fn add_context(_input: &str, ctx: &'static str, mut other: Self) -> Self {
        other.context.push(ctx);
        other
    }
}

/// Converts the result of a top level `nom` parser into a plain result.
pub(crate) fn finish<'a, T, Kind>(
    result: nom::IResult<&'a str, T, ParseError<Kind>>,
) -> Result<T, ParseError<Kind>> {
    match result {
        Ok((_, value)) => Ok(value),
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => Err(err),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::incomplete()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Oops;

    impl Display for Oops {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "oops")
        }
    }

    #[test]
    fn test_verbose_location() {
        let input = "first line\nsecond line\nthird";
        let error = ParseError::from_kind(&input[15..], Oops);

        assert_eq!(error.kind(), Some(&Oops));

        let verbose = error.verbose(input);

        assert_eq!(verbose.line, 2);
        assert_eq!(verbose.column, 5);
        assert_eq!(verbose.to_string(), "at line 2 col 5: oops, at 'nd line'");
    }

    #[test]
    fn test_display_with_context() {
        let error: ParseError<Oops> = nom::error::ParseError::from_error_kind("abc\ndef", ErrorKind::Digit);
        let error = nom::error::ParseError::add_context("abc", "record", error);

        assert_eq!(error.to_string(), "invalid record: unexpected input at: abc");
    }
}
