//! S-expression reader
//!
//! Reads the `to_sexp` form of a syntax tree extended with quoted leaf text:
//!
//! ```text
//! (call function: (identifier "fetch") arguments: (argument_list (identifier "id")))
//! ```
//!
//! A lone string inside a node is that node's text. Any other string is an
//! unnamed token child (`operator: "+="`). Spans are the byte ranges of the
//! parenthesized forms within the S-expression itself.

mod token;

pub use token::{tokenize, Token, TokenKind};

use perfscan_isg::Span;
use thiserror::Error;

use crate::{SyntaxNode, MAX_DEPTH};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SexpError {
    #[error("unexpected {found} at offset {offset}: expected {expected}")]
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
        offset: usize,
    },

    #[error("trailing input at offset {offset}")]
    TrailingInput { offset: usize },

    #[error("nesting deeper than {limit} levels at offset {offset}")]
    TooDeep { limit: usize, offset: usize },
}

impl SexpError {
    pub fn offset(&self) -> usize {
        match self {
            SexpError::UnexpectedToken { offset, .. } => *offset,
            SexpError::TrailingInput { offset } => *offset,
            SexpError::TooDeep { offset, .. } => *offset,
        }
    }
}

/// Parse one S-expression tree
pub fn parse_sexp(source: &str) -> Result<SyntaxNode, SexpError> {
    let mut reader = Reader::new(source);
    let node = reader.node(None)?;
    if !reader.at(TokenKind::Eof) {
        return Err(SexpError::TrailingInput {
            offset: reader.current().start,
        });
    }
    Ok(node)
}

struct Reader<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    /// Byte offset at which each line starts
    line_starts: Vec<usize>,
}

impl<'a> Reader<'a> {
    fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
            depth: 0,
            line_starts,
        }
    }

    // === Utilities ===

    fn current(&self) -> Token {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .copied()
            .unwrap_or(Token {
                kind: TokenKind::Eof,
                start: self.source.len(),
                end: self.source.len(),
            })
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn consume(&mut self, kind: TokenKind) -> Result<Token, SexpError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(SexpError::UnexpectedToken {
                expected: kind.describe(),
                found: self.current().kind.describe(),
                offset: self.current().start,
            })
        }
    }

    fn text(&self, token: Token) -> &'a str {
        &self.source[token.start..token.end]
    }

    fn line_of(&self, offset: usize) -> u32 {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        line as u32 + 1
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(start, end, self.line_of(start), self.line_of(end.saturating_sub(1).max(start)))
    }

    // === Nodes ===

    fn node(&mut self, field: Option<String>) -> Result<SyntaxNode, SexpError> {
        if self.depth >= MAX_DEPTH {
            return Err(SexpError::TooDeep {
                limit: MAX_DEPTH,
                offset: self.current().start,
            });
        }
        self.depth += 1;
        let node = self.node_body(field);
        self.depth -= 1;
        node
    }

    fn node_body(&mut self, field: Option<String>) -> Result<SyntaxNode, SexpError> {
        let open = self.consume(TokenKind::LParen)?;
        let kind_token = self.consume(TokenKind::Kind)?;
        let kind = self.text(kind_token).to_string();

        let mut children = Vec::new();
        let mut strings = 0usize;
        while !self.at(TokenKind::RParen) {
            let field = if self.at(TokenKind::Field) {
                let label = self.advance();
                Some(self.text(label).trim_end_matches(':').to_string())
            } else {
                None
            };
            match self.current().kind {
                TokenKind::LParen => children.push(self.node(field)?),
                TokenKind::Str => {
                    strings += 1;
                    let token = self.advance();
                    let text = unescape(self.text(token));
                    children.push(SyntaxNode {
                        kind: text.clone(),
                        named: false,
                        field,
                        text: Some(text),
                        span: self.span(token.start, token.end),
                        children: Vec::new(),
                    });
                }
                _ => {
                    return Err(SexpError::UnexpectedToken {
                        expected: "child node or string",
                        found: self.current().kind.describe(),
                        offset: self.current().start,
                    })
                }
            }
        }
        let close = self.consume(TokenKind::RParen)?;

        // `(identifier "x")` carries leaf text rather than a token child
        let mut text = None;
        if strings == 1 && children.len() == 1 && children[0].field.is_none() {
            text = children.pop().and_then(|c| c.text);
        }

        Ok(SyntaxNode {
            kind,
            named: true,
            field,
            text,
            span: self.span(open.start, close.end),
            children,
        })
    }
}

fn unescape(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_text() {
        let node = parse_sexp(r#"(identifier "users")"#).expect("parse");
        assert_eq!(node.kind, "identifier");
        assert_eq!(node.text.as_deref(), Some("users"));
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_fields_and_tokens() {
        let node = parse_sexp(
            r#"(augmented_assignment left: (identifier "s") operator: "+=" right: (identifier "x"))"#,
        )
        .expect("parse");
        assert_eq!(node.children.len(), 3);
        assert_eq!(node.field_any(&["left"]).map(|c| c.leaf_text()), Some("s"));
        let op = node.field_any(&["operator"]).expect("operator");
        assert!(!op.named);
        assert_eq!(op.leaf_text(), "+=");
    }

    #[test]
    fn test_spans_nest_and_count_lines() {
        let source = "(module\n  (expression_statement\n    (identifier \"x\")))";
        let node = parse_sexp(source).expect("parse");
        assert_eq!(node.span.start, 0);
        assert_eq!(node.span.end, source.len());
        assert_eq!(node.span.start_line, 1);
        assert_eq!(node.span.end_line, 3);
        let stmt = &node.children[0];
        assert!(node.span.contains(&stmt.span));
        assert_eq!(stmt.span.start_line, 2);
        assert_eq!(stmt.children[0].span.start_line, 3);
    }

    #[test]
    fn test_unbalanced_input_is_rejected() {
        let err = parse_sexp("(module (block)").expect_err("missing paren");
        assert!(matches!(err, SexpError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_trailing_input_is_rejected() {
        let err = parse_sexp("(module) (module)").expect_err("two roots");
        assert_eq!(err, SexpError::TrailingInput { offset: 9 });
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let levels = 100_000;
        let source = format!("{}(identifier \"x\"){}", "(block ".repeat(levels), ")".repeat(levels));
        let err = parse_sexp(&source).expect_err("too deep");
        assert_eq!(
            err,
            SexpError::TooDeep {
                limit: MAX_DEPTH,
                offset: MAX_DEPTH * "(block ".len(),
            }
        );
    }

    #[test]
    fn test_nesting_at_the_limit_is_read() {
        let levels = MAX_DEPTH - 1;
        let source = format!("{}(identifier \"x\"){}", "(block ".repeat(levels), ")".repeat(levels));
        let mut node = &parse_sexp(&source).expect("parse");
        let mut depth = 1;
        while let Some(child) = node.children.first() {
            node = child;
            depth += 1;
        }
        assert_eq!(depth, MAX_DEPTH);
        assert_eq!(node.leaf_text(), "x");
    }
}
