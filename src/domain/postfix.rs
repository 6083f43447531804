//! Infix to postfix conversion (shunting-yard).
//!
//! The scan is permissive by default: any character that is not a digit,
//! whitespace or bracket is treated as an operator, a `)` without partner is
//! ignored and an unmatched `(` is dropped at the end of the scan.
//! [`Mode::Strict`] turns those cases into errors instead.

use std::fmt;

use itertools::Itertools;
use tracing::{instrument, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::operator::{precedence, Operator};

/// How the converter and tree builder treat malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Permissive,
    Strict,
}

/// A unit of scanned input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Number(String),
    /// Any symbol that is neither a digit nor a bracket, known operator or not.
    Operator(char),
    LeftParen,
    RightParen,
}

impl Token {
    fn precedence(&self) -> i8 {
        match self {
            Token::Operator(symbol) => precedence(*symbol),
            _ => -1,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(literal) => write!(f, "{}", literal),
            Token::Operator(symbol) => write!(f, "{}", symbol),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
        }
    }
}

/// A token together with its character offset in the infix input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Token,
    pub position: usize,
}

/// Splits infix text into tokens, skipping whitespace.
///
/// A number starts with an ASCII digit and runs over every following digit
/// and `.`; `1.2.3` is therefore a single (unparseable) number token.
pub fn tokenize(infix: &str) -> Vec<Lexeme> {
    let mut lexemes = Vec::new();
    let mut chars = infix.chars().enumerate().peekable();

    while let Some((position, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        let token = match c {
            '0'..='9' => {
                let mut literal = String::from(c);
                while let Some((_, next)) =
                    chars.next_if(|(_, next)| next.is_ascii_digit() || *next == '.')
                {
                    literal.push(next);
                }
                Token::Number(literal)
            }
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            other => Token::Operator(other),
        };
        lexemes.push(Lexeme { token, position });
    }
    lexemes
}

/// Postfix token sequence in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Postfix {
    tokens: Vec<Token>,
}

impl Postfix {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for Postfix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.iter().join(" "))
    }
}

/// Shunting-yard converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter {
    mode: Mode,
}

impl Converter {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[instrument(level = "debug", skip(self))]
    pub fn convert(&self, infix: &str) -> DomainResult<Postfix> {
        let mut output = Vec::new();
        let mut stack: Vec<Lexeme> = Vec::new();

        for lexeme in tokenize(infix) {
            match lexeme.token {
                Token::Number(_) => output.push(lexeme.token),
                Token::LeftParen => stack.push(lexeme),
                Token::RightParen => self.close_bracket(&mut stack, &mut output, lexeme.position)?,
                Token::Operator(symbol) => {
                    if self.mode == Mode::Strict && Operator::from_symbol(symbol).is_none() {
                        return Err(DomainError::UnexpectedCharacter {
                            ch: symbol,
                            position: lexeme.position,
                        });
                    }
                    let incoming = lexeme.token.precedence();
                    while let Some(top) = stack.pop() {
                        if top.token.precedence() >= incoming {
                            output.push(top.token);
                        } else {
                            stack.push(top);
                            break;
                        }
                    }
                    stack.push(lexeme);
                }
            }
        }

        while let Some(rest) = stack.pop() {
            match rest.token {
                Token::LeftParen if self.mode == Mode::Strict => {
                    return Err(DomainError::UnbalancedBracket {
                        position: rest.position,
                    });
                }
                Token::LeftParen => trace!("dropping unmatched '(' at {}", rest.position),
                token => output.push(token),
            }
        }

        let postfix = Postfix { tokens: output };
        trace!("postfix: {}", postfix);
        Ok(postfix)
    }

    /// Pops operators up to the matching `(`, which is discarded.
    fn close_bracket(
        &self,
        stack: &mut Vec<Lexeme>,
        output: &mut Vec<Token>,
        position: usize,
    ) -> DomainResult<()> {
        loop {
            match stack.pop() {
                Some(Lexeme {
                    token: Token::LeftParen,
                    ..
                }) => return Ok(()),
                Some(lexeme) => output.push(lexeme.token),
                None if self.mode == Mode::Strict => {
                    return Err(DomainError::UnbalancedBracket { position })
                }
                None => {
                    trace!("ignoring unmatched ')' at {}", position);
                    return Ok(());
                }
            }
        }
    }
}
