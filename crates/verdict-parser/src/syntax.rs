//! Loose syntax tree
//!
//! The first parsing pass accepts every well-formed expression, including
//! constructs the rule grammar does not support (arithmetic, `not`, chained
//! comparisons). Rejecting those is left to lowering, so malformed text is
//! always reported as a syntax error before any unsupported construct.

use crate::error::{ParseError, Result};
use crate::lexer::{Token, TokenKind};
use verdict_core::LogicalOp;

/// Comparison operator as written, including ones the grammar rejects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompareToken {
    Gt,
    Lt,
    Eq,
    Ge,
    Le,
    Ne,
}

impl CompareToken {
    fn from_kind(kind: &TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Gt => Some(CompareToken::Gt),
            TokenKind::Lt => Some(CompareToken::Lt),
            TokenKind::EqEq => Some(CompareToken::Eq),
            TokenKind::Ge => Some(CompareToken::Ge),
            TokenKind::Le => Some(CompareToken::Le),
            TokenKind::Ne => Some(CompareToken::Ne),
            _ => None,
        }
    }

    pub(crate) fn symbol(&self) -> &'static str {
        match self {
            CompareToken::Gt => ">",
            CompareToken::Lt => "<",
            CompareToken::Eq => "==",
            CompareToken::Ge => ">=",
            CompareToken::Le => "<=",
            CompareToken::Ne => "!=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    /// Same connective over two or more terms, in source order
    Bool {
        op: LogicalOp,
        terms: Vec<Expr>,
        offset: usize,
    },
    /// `left op right [op right ...]`
    Compare {
        left: Box<Expr>,
        rest: Vec<(CompareToken, Expr)>,
        offset: usize,
    },
    Call {
        name: String,
        args: Vec<Expr>,
        offset: usize,
    },
    Name {
        name: String,
        offset: usize,
    },
    Int {
        value: i64,
        offset: usize,
    },
    Float {
        offset: usize,
    },
    Str {
        value: String,
        offset: usize,
    },
    Not {
        offset: usize,
    },
    Negate {
        operand: Box<Expr>,
        offset: usize,
    },
    Arithmetic {
        offset: usize,
    },
}

impl Expr {
    pub(crate) fn offset(&self) -> usize {
        match self {
            Expr::Bool { offset, .. }
            | Expr::Compare { offset, .. }
            | Expr::Call { offset, .. }
            | Expr::Name { offset, .. }
            | Expr::Int { offset, .. }
            | Expr::Float { offset }
            | Expr::Str { offset, .. }
            | Expr::Not { offset }
            | Expr::Negate { offset, .. }
            | Expr::Arithmetic { offset } => *offset,
        }
    }
}

/// Recursive-descent parser over a token stream
pub(crate) struct SyntaxParser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_nesting: usize,
}

impl SyntaxParser {
    pub(crate) fn new(tokens: Vec<Token>, max_nesting: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_nesting,
        }
    }

    /// Parse a complete expression; trailing tokens are a syntax error
    pub(crate) fn parse(mut self) -> Result<Expr> {
        if self.peek().kind == TokenKind::Eof {
            return Err(ParseError::syntax(0, "empty expression"));
        }

        let expr = self.parse_or()?;
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            return Err(ParseError::syntax(
                token.offset,
                format!("unexpected {}", token.kind.describe()),
            ));
        }
        Ok(expr)
    }

    fn peek(&self) -> &Token {
        // tokenize always ends the stream with Eof and we never advance past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        let token = self.advance();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(ParseError::syntax(
                token.offset,
                format!("expected {}, found {}", kind.describe(), token.kind.describe()),
            ))
        }
    }

    fn enter(&mut self, offset: usize) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_nesting {
            return Err(ParseError::syntax(offset, "expression is nested too deeply"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_or(&mut self) -> Result<Expr> {
        self.parse_bool(LogicalOp::Or)
    }

    /// `term (op term)*`, where a term of `or` is an `and` chain
    fn parse_bool(&mut self, op: LogicalOp) -> Result<Expr> {
        let offset = self.peek().offset;
        let keyword = match op {
            LogicalOp::Or => TokenKind::Or,
            LogicalOp::And => TokenKind::And,
        };

        let mut terms = vec![self.parse_bool_term(op)?];
        while self.peek().kind == keyword {
            self.advance();
            terms.push(self.parse_bool_term(op)?);
        }

        if terms.len() == 1 {
            Ok(terms.remove(0))
        } else {
            Ok(Expr::Bool { op, terms, offset })
        }
    }

    fn parse_bool_term(&mut self, op: LogicalOp) -> Result<Expr> {
        match op {
            LogicalOp::Or => self.parse_bool(LogicalOp::And),
            LogicalOp::And => self.parse_not(),
        }
    }

    fn parse_not(&mut self) -> Result<Expr> {
        let token = self.peek().clone();
        if token.kind == TokenKind::Not {
            self.advance();
            self.enter(token.offset)?;
            self.parse_not()?;
            self.leave();
            return Ok(Expr::Not {
                offset: token.offset,
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let offset = self.peek().offset;
        let left = self.parse_arithmetic()?;

        let mut rest = Vec::new();
        while let Some(op) = CompareToken::from_kind(&self.peek().kind) {
            self.advance();
            rest.push((op, self.parse_arithmetic()?));
        }

        if rest.is_empty() {
            Ok(left)
        } else {
            Ok(Expr::Compare {
                left: Box::new(left),
                rest,
                offset,
            })
        }
    }

    fn parse_arithmetic(&mut self) -> Result<Expr> {
        let offset = self.peek().offset;
        let left = self.parse_unary()?;

        let mut is_arithmetic = false;
        while matches!(
            self.peek().kind,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Star | TokenKind::Slash | TokenKind::Percent
        ) {
            self.advance();
            self.parse_unary()?;
            is_arithmetic = true;
        }

        if is_arithmetic {
            Ok(Expr::Arithmetic { offset })
        } else {
            Ok(left)
        }
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Minus => {
                self.advance();
                self.enter(token.offset)?;
                let operand = self.parse_unary()?;
                self.leave();
                Ok(Expr::Negate {
                    operand: Box::new(operand),
                    offset: token.offset,
                })
            }
            TokenKind::Plus => {
                self.advance();
                self.enter(token.offset)?;
                self.parse_unary()?;
                self.leave();
                Ok(Expr::Arithmetic {
                    offset: token.offset,
                })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let token = self.advance();
        let offset = token.offset;

        match token.kind {
            TokenKind::Int(value) => Ok(Expr::Int { value, offset }),
            TokenKind::Float(_) => Ok(Expr::Float { offset }),
            TokenKind::Str(value) => Ok(Expr::Str { value, offset }),
            TokenKind::Ident(name) => {
                if self.peek().kind == TokenKind::LParen {
                    self.advance();
                    self.enter(offset)?;
                    let args = self.parse_args()?;
                    self.leave();
                    Ok(Expr::Call { name, args, offset })
                } else {
                    Ok(Expr::Name { name, offset })
                }
            }
            TokenKind::LParen => {
                self.enter(offset)?;
                let inner = self.parse_or()?;
                self.leave();
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            other => Err(ParseError::syntax(
                offset,
                format!("unexpected {}", other.describe()),
            )),
        }
    }

    /// Arguments after the opening parenthesis, up to and including `)`
    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.peek().kind == TokenKind::RParen {
            self.advance();
            return Ok(args);
        }

        loop {
            args.push(self.parse_or()?);
            let token = self.advance();
            match token.kind {
                TokenKind::Comma => continue,
                TokenKind::RParen => return Ok(args),
                other => {
                    return Err(ParseError::syntax(
                        token.offset,
                        format!("expected ',' or ')', found {}", other.describe()),
                    ))
                }
            }
        }
    }
}
