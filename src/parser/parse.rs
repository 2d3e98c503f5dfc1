//! Recursive-descent parser for carved manifest regions.
//!
//! The accepted grammar is a small expression subset:
//!
//! ```text
//! expr     := primary ( '+' primary )*
//! primary  := STRING | NUMBER | 'true' | 'false'
//!           | IDENT [ '(' [ expr ( ',' expr )* [','] ] ')' ]
//!           | '{' [ property ( ',' property )* [','] ] '}'
//!           | '[' [ expr ( ',' expr )* [','] ] ']'
//! property := ( STRING | IDENT ) ':' expr
//! ```

use std::ops::Range;

use logos::Logos;

use crate::parser::errors::ManifestError;
use crate::parser::expr::{ExprNode, Literal, Property};
use crate::parser::token::{unescape, TokenKind};

/// Parse a complete region into an expression tree.
///
/// Trailing input after the expression is an error.
pub fn parse(src: &str) -> Result<ExprNode, ManifestError> {
    let mut parser = Parser::new(src)?;
    let expr = parser.parse_expr()?;

    if let Some((kind, span)) = parser.peek() {
        return Err(parser.error(format!("unexpected {} after expression", kind), span));
    }

    Ok(expr)
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<(TokenKind, Range<usize>)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Result<Self, ManifestError> {
        let mut tokens = Vec::new();
        let mut lexer = TokenKind::lexer(src);

        while let Some(result) = lexer.next() {
            match result {
                Ok(kind) => tokens.push((kind, lexer.span())),
                Err(()) => {
                    return Err(ManifestError::unsupported(
                        format!("unexpected character `{}`", lexer.slice()),
                        &src[lexer.span().start..],
                    ))
                }
            }
        }

        Ok(Parser {
            src,
            tokens,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<(TokenKind, Range<usize>)> {
        self.tokens.get(self.pos).cloned()
    }

    fn advance(&mut self) -> Option<(TokenKind, Range<usize>)> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if matches!(self.peek(), Some((k, _)) if k == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Result<(), ManifestError> {
        match self.advance() {
            Some((k, _)) if k == kind => Ok(()),
            Some((k, span)) => Err(self.error(format!("expected {} {}, found {}", kind, context, k), span)),
            None => Err(self.eof(format!("expected {} {}", kind, context))),
        }
    }

    fn error(&self, reason: String, span: Range<usize>) -> ManifestError {
        ManifestError::unsupported(reason, &self.src[span.start..])
    }

    fn eof(&self, reason: String) -> ManifestError {
        let tail = self.src.len().saturating_sub(40);
        let tail = (0..=tail).rev().find(|&i| self.src.is_char_boundary(i)).unwrap_or(0);
        ManifestError::unsupported(format!("{} at end of input", reason), &self.src[tail..])
    }

    fn parse_expr(&mut self) -> Result<ExprNode, ManifestError> {
        let mut left = self.parse_primary()?;
        while self.eat(TokenKind::Plus) {
            let right = self.parse_primary()?;
            left = ExprNode::binary(left, right);
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<ExprNode, ManifestError> {
        let (kind, span) = self
            .advance()
            .ok_or_else(|| self.eof("expected expression".to_string()))?;
        let src = self.src;
        let slice = &src[span.clone()];

        match kind {
            TokenKind::DoubleString | TokenKind::SingleString => {
                Ok(ExprNode::Literal(Literal::Str(unescape(slice))))
            }
            TokenKind::Number => slice
                .parse::<f64>()
                .map(|n| ExprNode::Literal(Literal::Number(n)))
                .map_err(|_| self.error(format!("invalid number `{}`", slice), span)),
            TokenKind::True => Ok(ExprNode::Literal(Literal::Bool(true))),
            TokenKind::False => Ok(ExprNode::Literal(Literal::Bool(false))),
            TokenKind::Ident => {
                let name = slice.to_string();
                if self.eat(TokenKind::LParen) {
                    let args = self.parse_list(TokenKind::RParen, "in call arguments")?;
                    Ok(ExprNode::Call { callee: name, args })
                } else {
                    Ok(ExprNode::Identifier(name))
                }
            }
            TokenKind::LBracket => {
                let items = self.parse_list(TokenKind::RBracket, "in array")?;
                Ok(ExprNode::Array(items))
            }
            TokenKind::LBrace => self.parse_object(),
            other => Err(self.error(format!("expected expression, found {}", other), span)),
        }
    }

    /// Comma-separated expressions up to `close`; a trailing comma is allowed.
    fn parse_list(&mut self, close: TokenKind, context: &str) -> Result<Vec<ExprNode>, ManifestError> {
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.parse_expr()?);
            if !self.eat(TokenKind::Comma) {
                self.expect(close, context)?;
                return Ok(items);
            }
        }
    }

    fn parse_object(&mut self) -> Result<ExprNode, ManifestError> {
        let src = self.src;
        let mut props = Vec::new();
        loop {
            if self.eat(TokenKind::RBrace) {
                break;
            }

            let key = match self.advance() {
                Some((TokenKind::DoubleString | TokenKind::SingleString, span)) => {
                    ExprNode::Literal(Literal::Str(unescape(&src[span])))
                }
                Some((TokenKind::Ident, span)) => ExprNode::Identifier(src[span].to_string()),
                Some((kind, span)) => {
                    return Err(self.error(format!("expected property key, found {}", kind), span))
                }
                None => return Err(self.eof("expected property key".to_string())),
            };

            self.expect(TokenKind::Colon, "after property key")?;
            let value = self.parse_expr()?;
            props.push(Property::new(key, value));

            if !self.eat(TokenKind::Comma) {
                self.expect(TokenKind::RBrace, "in object")?;
                break;
            }
        }
        Ok(ExprNode::Object(props))
    }
}
