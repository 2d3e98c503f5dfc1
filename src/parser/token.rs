//! Token types for the manifest expression dialect.

use logos::Logos;

/// The kind of token produced by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    // ========== Punctuation ==========
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("+")]
    Plus,

    // ========== Literals ==========
    /// Double-quoted string, quotes included in the slice
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    DoubleString,

    /// Single-quoted string, quotes included in the slice
    #[regex(r#"'([^'\\\n]|\\.)*'"#)]
    SingleString,

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    #[token("true")]
    True,

    #[token("false")]
    False,

    // ========== Identifiers ==========
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::Colon => "`:`",
            TokenKind::Comma => "`,`",
            TokenKind::Plus => "`+`",
            TokenKind::DoubleString | TokenKind::SingleString => "string",
            TokenKind::Number => "number",
            TokenKind::True | TokenKind::False => "boolean",
            TokenKind::Ident => "identifier",
        };
        f.write_str(s)
    }
}

/// Decode the body of a quoted string token, slice including quotes.
pub fn unescape(quoted: &str) -> String {
    let body = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
