//! Token definitions for the S-expression tree format

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")] // Skip whitespace
#[logos(skip r";[^\n]*")] // Skip line comments
pub enum TokenKind {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    /// `body:` - field label for the next child
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*:")]
    Field,

    /// Grammar kind of a node
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Kind,

    /// Leaf text or an unnamed token
    #[regex(r#""([^"\\]|\\.)*""#)]
    Str,

    Error,
    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Field => "field label",
            TokenKind::Kind => "node kind",
            TokenKind::Str => "string",
            TokenKind::Error => "invalid input",
            TokenKind::Eof => "end of input",
        }
    }
}

/// A token with its byte range
#[derive(Debug, Clone, Copy)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

/// Tokenize an S-expression, always ending with `Eof`
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let kind = result.unwrap_or(TokenKind::Error);
        tokens.push(Token {
            kind,
            start: lexer.span().start,
            end: lexer.span().end,
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        start: source.len(),
        end: source.len(),
    });
    tokens
}
