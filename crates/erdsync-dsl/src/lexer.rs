use logos::Logos;

use crate::error::Span;
use crate::token::Token;

/// A token paired with its source span and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken<'a> {
    pub token: Token,
    pub span: Span,
    pub text: &'a str,
}

impl SpannedToken<'_> {
    /// The text with surrounding quotes removed, for string literals.
    pub fn unquoted(&self) -> &str {
        match self.token {
            Token::StringLiteral => self
                .text
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(self.text),
            _ => self.text,
        }
    }
}

/// Tokenizes one line. `offset` is the byte position of the line within the
/// whole document, so spans are absolute.
///
/// # Errors
///
/// Returns the span of the first byte run no token rule accepts.
pub fn tokenize_line(line: &str, offset: usize) -> Result<Vec<SpannedToken<'_>>, Span> {
    let mut tokens = Vec::new();
    for (result, range) in Token::lexer(line).spanned() {
        let span = Span::new(offset + range.start, offset + range.end);
        match result {
            Ok(token) => tokens.push(SpannedToken {
                token,
                span,
                text: &line[range],
            }),
            Err(()) => return Err(span),
        }
    }
    Ok(tokens)
}

/// Splits a document into `(line_number, byte_offset, line)` triples.
/// Line numbers are one-based and a trailing `\r` is dropped.
pub fn lines(source: &str) -> impl Iterator<Item = (usize, usize, &str)> {
    let mut offset = 0;
    source.split('\n').enumerate().map(move |(index, raw)| {
        let start = offset;
        offset += raw.len() + 1;
        (index + 1, start, raw.strip_suffix('\r').unwrap_or(raw))
    })
}
