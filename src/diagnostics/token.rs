use std::fmt;

/// Why the lexer rejected a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexicalErrorKind {
    IdentifierStartsWithDigit,
    IdentifierEndsWithDigit,
    IdentifierConsecutiveDigits,
    IntegerTooLong,
    RealIntegerPartTooLong,
    RealFractionTooLong,
    MalformedReal,
    UnrecognizedSymbol,
}

impl LexicalErrorKind {
    pub fn explanation(self) -> &'static str {
        match self {
            LexicalErrorKind::IdentifierStartsWithDigit => {
                "Identifiers must not start with a digit."
            }
            LexicalErrorKind::IdentifierEndsWithDigit => "Identifiers must not end with a digit.",
            LexicalErrorKind::IdentifierConsecutiveDigits => {
                "Identifiers must not contain two consecutive digits."
            }
            LexicalErrorKind::IntegerTooLong => "Integer constant has too many digits.",
            LexicalErrorKind::RealIntegerPartTooLong => {
                "Integer part of the real constant has too many digits."
            }
            LexicalErrorKind::RealFractionTooLong => {
                "Fractional part of the real constant has too many digits."
            }
            LexicalErrorKind::MalformedReal => {
                "A real constant needs digits on both sides of the point."
            }
            LexicalErrorKind::UnrecognizedSymbol => "Unrecognized symbol.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Identifier,
    Integer,
    Real,
    Literal,
    Keyword,
    Symbol,
    Invalid(LexicalErrorKind),
}

/// A token as reported by the front end, positioned by 1-based line and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub image: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, image: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            image: image.into(),
            line,
            column,
        }
    }

    pub fn eof(line: usize, column: usize) -> Self {
        Self::new(TokenKind::Eof, "", line, column)
    }

    pub fn lexical_error(&self) -> Option<LexicalErrorKind> {
        match self.kind {
            TokenKind::Invalid(kind) => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("end of file"),
            _ => write!(
                f,
                "\"{}\"",
                self.image.replace('\n', "\\n").replace('\r', "\\r")
            ),
        }
    }
}
