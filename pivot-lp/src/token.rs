//! Tokenizer for the lp_solve dialect.
//!
//! Produces a flat token stream with 1-based line/column positions.
//! `//` comments run to end of line. Adjacent number-identifier pairs
//! (`3x`) come out as two tokens; the parser treats adjacency as
//! multiplication.

use crate::error::{ParseError, ParseErrorKind};

/// Token class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier (variable name, label, or directive keyword).
    Ident,
    /// Numeric literal.
    Number,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `;`
    Semi,
    /// `<=` or `<`
    Le,
    /// `>=` or `>`
    Ge,
    /// `=`
    Eq,
    /// End of input.
    Eof,
}

/// A token with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token class.
    pub kind: TokenKind,
    /// Source text (empty for Eof).
    pub text: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub col: usize,
}

impl Token {
    /// Numeric value of a `Number` token.
    pub fn number(&self) -> Result<f64, ParseError> {
        self.text.parse::<f64>().map_err(|_| {
            ParseError::new(self.line, self.col, "a number", ParseErrorKind::BadNumber)
        })
    }
}

/// Tokenize a full program.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1usize;
    let mut col = 1usize;

    macro_rules! bump {
        () => {{
            let c = chars.next();
            if let Some(c) = c {
                if c == '\n' {
                    line += 1;
                    col = 1;
                } else {
                    col += 1;
                }
            }
            c
        }};
    }

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            bump!();
            continue;
        }

        // Line comment.
        if c == '/' {
            let (cl, cc) = (line, col);
            bump!();
            if chars.peek() == Some(&'/') {
                while let Some(&n) = chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    bump!();
                }
                continue;
            }
            return Err(ParseError::new(
                cl,
                cc,
                "'//' to start a comment",
                ParseErrorKind::UnexpectedToken,
            ));
        }

        let (tl, tc) = (line, col);
        let simple = |kind: TokenKind, text: &str| Token {
            kind,
            text: text.to_string(),
            line: tl,
            col: tc,
        };

        match c {
            '+' => {
                bump!();
                tokens.push(simple(TokenKind::Plus, "+"));
            }
            '-' => {
                bump!();
                tokens.push(simple(TokenKind::Minus, "-"));
            }
            ':' => {
                bump!();
                tokens.push(simple(TokenKind::Colon, ":"));
            }
            ',' => {
                bump!();
                tokens.push(simple(TokenKind::Comma, ","));
            }
            ';' => {
                bump!();
                tokens.push(simple(TokenKind::Semi, ";"));
            }
            '<' => {
                bump!();
                if chars.peek() == Some(&'=') {
                    bump!();
                }
                tokens.push(simple(TokenKind::Le, "<="));
            }
            '>' => {
                bump!();
                if chars.peek() == Some(&'=') {
                    bump!();
                }
                tokens.push(simple(TokenKind::Ge, ">="));
            }
            '=' => {
                bump!();
                tokens.push(simple(TokenKind::Eq, "="));
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut text = String::new();
                while let Some(&n) = chars.peek() {
                    if n.is_ascii_digit() || n == '.' {
                        text.push(n);
                        bump!();
                    } else if n == 'e' || n == 'E' {
                        // Exponent only when followed by a digit or sign.
                        let mut ahead = chars.clone();
                        ahead.next();
                        match ahead.peek() {
                            Some(&d) if d.is_ascii_digit() || d == '+' || d == '-' => {
                                text.push(n);
                                bump!();
                                if let Some(&s) = chars.peek() {
                                    if s == '+' || s == '-' {
                                        text.push(s);
                                        bump!();
                                    }
                                }
                            }
                            _ => break,
                        }
                    } else {
                        break;
                    }
                }
                let tok = Token {
                    kind: TokenKind::Number,
                    text,
                    line: tl,
                    col: tc,
                };
                tok.number()?;
                tokens.push(tok);
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut text = String::new();
                while let Some(&n) = chars.peek() {
                    if n.is_alphanumeric() || n == '_' {
                        text.push(n);
                        bump!();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Ident,
                    text,
                    line: tl,
                    col: tc,
                });
            }
            other => {
                return Err(ParseError::new(
                    tl,
                    tc,
                    format!("a token, found '{}'", other),
                    ParseErrorKind::UnexpectedToken,
                ));
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        text: String::new(),
        line,
        col,
    });
    Ok(tokens)
}
