//! Tokenizer for rule text

use crate::error::{ParseError, Result};

/// Token kinds produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Int(i64),
    Float(String),
    Str(String),
    /// `and`
    And,
    /// `or`
    Or,
    /// `not`
    Not,
    Gt,
    Lt,
    EqEq,
    Ge,
    Le,
    Ne,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
    Eof,
}

impl TokenKind {
    /// Short description used in syntax errors
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            TokenKind::Int(n) => format!("integer {}", n),
            TokenKind::Float(text) => format!("number {}", text),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::And => "'and'".to_string(),
            TokenKind::Or => "'or'".to_string(),
            TokenKind::Not => "'not'".to_string(),
            TokenKind::Gt => "'>'".to_string(),
            TokenKind::Lt => "'<'".to_string(),
            TokenKind::EqEq => "'=='".to_string(),
            TokenKind::Ge => "'>='".to_string(),
            TokenKind::Le => "'<='".to_string(),
            TokenKind::Ne => "'!='".to_string(),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::Percent => "'%'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

/// A token and the byte offset where it starts
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Split rule text into tokens, always ending with `Eof`
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let kind = match c {
            '(' | ')' | ',' | '+' | '-' | '*' | '/' | '%' => {
                chars.next();
                match c {
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    ',' => TokenKind::Comma,
                    '+' => TokenKind::Plus,
                    '-' => TokenKind::Minus,
                    '*' => TokenKind::Star,
                    '/' => TokenKind::Slash,
                    _ => TokenKind::Percent,
                }
            }
            '>' | '<' | '=' | '!' => {
                chars.next();
                let followed_by_eq = matches!(chars.peek(), Some(&(_, '=')));
                if followed_by_eq {
                    chars.next();
                }
                match (c, followed_by_eq) {
                    ('>', false) => TokenKind::Gt,
                    ('>', true) => TokenKind::Ge,
                    ('<', false) => TokenKind::Lt,
                    ('<', true) => TokenKind::Le,
                    ('=', true) => TokenKind::EqEq,
                    ('!', true) => TokenKind::Ne,
                    ('=', false) => {
                        return Err(ParseError::syntax(
                            offset,
                            "assignment '=' is not allowed, use '==' to compare",
                        ))
                    }
                    _ => return Err(ParseError::syntax(offset, "unexpected character '!'")),
                }
            }
            '\'' | '"' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, ch)) = chars.next() {
                    match ch {
                        _ if ch == c => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some((_, 'n')) => value.push('\n'),
                            Some((_, 't')) => value.push('\t'),
                            Some((_, escaped @ ('\\' | '\'' | '"'))) => value.push(escaped),
                            Some((_, other)) => {
                                value.push('\\');
                                value.push(other);
                            }
                            None => break,
                        },
                        _ => value.push(ch),
                    }
                }
                if !closed {
                    return Err(ParseError::syntax(offset, "unterminated string literal"));
                }
                TokenKind::Str(value)
            }
            _ if c.is_ascii_digit() => {
                let mut text = String::new();
                let mut is_float = false;
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_ascii_digit() || ch == '_' {
                        if ch != '_' {
                            text.push(ch);
                        }
                        chars.next();
                    } else if ch == '.' && !is_float {
                        is_float = true;
                        text.push(ch);
                        chars.next();
                    } else if ch.is_alphabetic() {
                        return Err(ParseError::syntax(offset, "invalid number literal"));
                    } else {
                        break;
                    }
                }
                if is_float {
                    TokenKind::Float(text)
                } else {
                    let n = text.parse::<i64>().map_err(|_| {
                        ParseError::syntax(offset, format!("integer literal {} is out of range", text))
                    })?;
                    TokenKind::Int(n)
                }
            }
            _ if c.is_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        name.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match name.as_str() {
                    "and" => TokenKind::And,
                    "or" => TokenKind::Or,
                    "not" => TokenKind::Not,
                    _ => TokenKind::Ident(name),
                }
            }
            _ => {
                return Err(ParseError::syntax(
                    offset,
                    format!("unexpected character '{}'", c),
                ))
            }
        };

        tokens.push(Token { kind, offset });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        offset: input.len(),
    });
    Ok(tokens)
}
