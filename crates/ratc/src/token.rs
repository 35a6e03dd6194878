use std::fmt;

/// Reserved words. `true` and `false` are deliberately absent: the parser
/// recognizes them as literals in expression position.
pub const KEYWORDS: [&str; 12] = [
    "function", "integer", "boolean", "real", "if", "else", "endif", "while", "endwhile",
    "return", "scan", "print",
];

pub const QUALIFIERS: [&str; 3] = ["integer", "boolean", "real"];

pub const SEPARATORS: [u8; 8] = [b'(', b')', b';', b',', b'[', b']', b'{', b'}'];

pub const SECTION_DELIMITER: &str = "$$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Integer,
    Real,
    Operator,
    Separator,
    Invalid,
    EndOfInput,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Identifier => "Identifier",
            Self::Keyword => "Keyword",
            Self::Integer => "Integer",
            Self::Real => "Real",
            Self::Operator => "Operator",
            Self::Separator => "Separator",
            Self::Invalid => "Invalid",
            Self::EndOfInput => "EndOfInput",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
        }
    }

    /// Classifies an identifier-shaped word, promoting reserved words to `Keyword`.
    pub fn word(lexeme: impl Into<String>) -> Self {
        let lexeme = lexeme.into();
        let kind = if is_keyword(&lexeme) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Self { kind, lexeme }
    }

    pub fn end_of_input() -> Self {
        Self::new(TokenKind::EndOfInput, "")
    }

    pub fn is(&self, kind: TokenKind, lexeme: &str) -> bool {
        self.kind == kind && self.lexeme == lexeme
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.is(TokenKind::Keyword, word)
    }

    pub fn is_separator(&self, separator: &str) -> bool {
        self.is(TokenKind::Separator, separator)
    }

    pub fn is_operator(&self, operator: &str) -> bool {
        self.is(TokenKind::Operator, operator)
    }

    pub fn is_qualifier(&self) -> bool {
        self.kind == TokenKind::Keyword && QUALIFIERS.contains(&self.lexeme.as_str())
    }

    /// One row of the token table printed by `ratc tokens` and echoed by the parser.
    pub fn table_row(&self) -> String {
        format!("Token: {:<12}  Lexeme: {}", self.kind.name(), self.lexeme)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfInput => f.write_str("EndOfInput"),
            kind => write!(f, "{kind} '{}'", self.lexeme),
        }
    }
}

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}
