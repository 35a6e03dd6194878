use std::fmt;

use thiserror::Error;

use crate::token::{Token, TokenKind};

pub type RatResult<T> = Result<T, Error>;

/// What the active production wanted to see when it gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// A terminal of the given kind, optionally with an exact lexeme.
    Token {
        kind: TokenKind,
        lexeme: Option<String>,
    },
    /// Any token that can start the named grammar category.
    Category(&'static str),
}

impl Expected {
    pub fn kind(kind: TokenKind) -> Self {
        Self::Token { kind, lexeme: None }
    }

    pub fn exact(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        Self::Token {
            kind,
            lexeme: Some(lexeme.into()),
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token { kind, lexeme: None } => write!(f, "{kind}"),
            Self::Token {
                kind,
                lexeme: Some(lexeme),
            } => write!(f, "{kind} '{lexeme}'"),
            Self::Category(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The current token is `Invalid`: no token can start with this text.
    #[error("lexical error @ line {line}: invalid token '{lexeme}' where {expected} was expected")]
    Lexical {
        line: usize,
        lexeme: String,
        expected: Expected,
    },

    #[error("syntax error @ line {line}: expected {expected} but found {found}")]
    Syntax {
        line: usize,
        expected: Expected,
        found: Token,
    },
}

impl Error {
    /// Builds the error for a failed match, classifying it by the offending token.
    pub fn unexpected(line: usize, expected: Expected, found: Token) -> Self {
        if found.kind == TokenKind::Invalid {
            Self::Lexical {
                line,
                lexeme: found.lexeme,
                expected,
            }
        } else {
            Self::Syntax {
                line,
                expected,
                found,
            }
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Io(_) => None,
            Self::Lexical { line, .. } | Self::Syntax { line, .. } => Some(*line),
        }
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
