use logos::Logos;

/// Tokens of one diagram line.
///
/// Whitespace and `%%` / `//` comments are skipped by logos. Lines are
/// lexed one at a time, so no rule spans a newline.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"%%[^\n]*")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    #[token("erDiagram")]
    Header,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    /// Double-quoted text with no embedded quote or newline.
    #[regex(r#""[^"\n]*""#)]
    StringLiteral,

    /// A crow's-foot connector such as `||--o{` or `}o..||`.
    #[regex(r"(\|\||\|o|\}o|\}\|)(--|\.\.)(\|\||o\||o\{|\|\{)")]
    Relationship,

    /// A bare word: entity name, field name, type or key marker. A
    /// parenthesized group may contain commas, as in `decimal(10,2)`.
    #[regex(r#"[^\s"{}|:,%/]([^\s"{}|:,(]|\([^)\s"{}|]*\)|\()*"#)]
    Ident,
}

impl Token {
    /// True for tokens that may stand for a name when written unquoted.
    pub fn is_word(&self) -> bool {
        matches!(self, Self::Ident | Self::Header)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Header => "erDiagram",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Colon => ":",
            Self::Comma => ",",
            Self::StringLiteral => "string literal",
            Self::Relationship => "relationship",
            Self::Ident => "identifier",
        };
        f.write_str(s)
    }
}
