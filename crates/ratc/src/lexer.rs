use std::io::{BufReader, Bytes, Read};

use crate::error::RatResult;
use crate::token::{Token, TokenKind, SECTION_DELIMITER, SEPARATORS};

/// Reads the whole stream into a token table terminated by one `EndOfInput` token.
pub fn tokenize<R: Read>(reader: R) -> RatResult<Vec<Token>> {
    Lexer::new(reader).collect()
}

/// Character-level tokenizer pulling from a byte stream one token per call.
///
/// The lexer never rewinds its input. Lookahead is a single buffered byte that
/// is peeked by the two-character rules (`<=`, `==`, `=>`, `!=`, `$$`, `[*`,
/// `12.5`) and otherwise left for the next call.
pub struct Lexer<R> {
    bytes: Bytes<BufReader<R>>,
    lookahead: Option<u8>,
    line: usize,
    finished: bool,
}

impl<R: Read> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
            lookahead: None,
            line: 1,
            finished: false,
        }
    }

    /// Current source line, counting every newline consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the next token, `Invalid` for text that cannot start a token, and
    /// `EndOfInput` once the stream is exhausted. Only I/O failures are errors.
    pub fn next_token(&mut self) -> RatResult<Token> {
        loop {
            let Some(current) = self.bump()? else {
                tracing::trace!(line = self.line, "end of input");
                return Ok(Token::end_of_input());
            };

            let token = if current.is_ascii_whitespace() {
                continue;
            } else if is_ident_start(current) {
                self.lex_word(current)?
            } else if current.is_ascii_digit() {
                self.lex_number(current)?
            } else {
                match current {
                    b'[' if self.peek()? == Some(b'*') => {
                        self.bump()?;
                        self.skip_comment()?;
                        continue;
                    }
                    b'$' => {
                        if self.eat(b'$')? {
                            Token::new(TokenKind::Separator, SECTION_DELIMITER)
                        } else {
                            single_char_token(TokenKind::Invalid, current)
                        }
                    }
                    b'<' | b'!' => self.lex_operator(current, &[b'='])?,
                    b'=' => self.lex_operator(current, &[b'=', b'>'])?,
                    b'+' | b'-' | b'*' | b'/' | b'>' => {
                        single_char_token(TokenKind::Operator, current)
                    }
                    _ if SEPARATORS.contains(&current) => {
                        single_char_token(TokenKind::Separator, current)
                    }
                    _ => single_char_token(TokenKind::Invalid, current),
                }
            };

            tracing::trace!(line = self.line, kind = %token.kind, lexeme = %token.lexeme, "token");
            return Ok(token);
        }
    }

    fn lex_word(&mut self, first: u8) -> RatResult<Token> {
        let mut lexeme = String::from(char::from(first));
        while let Some(byte) = self.peek()? {
            if !is_ident_continue(byte) {
                break;
            }
            self.bump()?;
            lexeme.push(char::from(byte));
        }
        Ok(Token::word(lexeme))
    }

    fn lex_number(&mut self, first: u8) -> RatResult<Token> {
        let mut lexeme = String::from(char::from(first));
        self.take_digits(&mut lexeme)?;

        if !self.eat(b'.')? {
            return Ok(Token::new(TokenKind::Integer, lexeme));
        }
        lexeme.push('.');

        match self.peek()? {
            Some(byte) if byte.is_ascii_digit() => {
                self.take_digits(&mut lexeme)?;
                Ok(Token::new(TokenKind::Real, lexeme))
            }
            _ => Ok(Token::new(TokenKind::Invalid, lexeme)),
        }
    }

    fn take_digits(&mut self, lexeme: &mut String) -> RatResult<()> {
        while let Some(byte) = self.peek()? {
            if !byte.is_ascii_digit() {
                break;
            }
            self.bump()?;
            lexeme.push(char::from(byte));
        }
        Ok(())
    }

    fn lex_operator(&mut self, first: u8, seconds: &[u8]) -> RatResult<Token> {
        let mut lexeme = String::from(char::from(first));
        if let Some(second) = self.peek()? {
            if seconds.contains(&second) {
                self.bump()?;
                lexeme.push(char::from(second));
            }
        }
        Ok(Token::new(TokenKind::Operator, lexeme))
    }

    /// Discards everything up to and including `*]`. The opening `[*` has
    /// already been consumed; an unterminated comment runs to end of input.
    fn skip_comment(&mut self) -> RatResult<()> {
        while let Some(byte) = self.bump()? {
            if byte == b'*' && self.eat(b']')? {
                return Ok(());
            }
        }
        tracing::debug!(line = self.line, "unterminated comment reached end of input");
        Ok(())
    }

    fn eat(&mut self, expected: u8) -> RatResult<bool> {
        if self.peek()? == Some(expected) {
            self.bump()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn peek(&mut self) -> RatResult<Option<u8>> {
        if self.lookahead.is_none() {
            self.lookahead = self.bytes.next().transpose()?;
        }
        Ok(self.lookahead)
    }

    fn bump(&mut self) -> RatResult<Option<u8>> {
        let byte = match self.lookahead.take() {
            Some(byte) => Some(byte),
            None => self.bytes.next().transpose()?,
        };
        if byte == Some(b'\n') {
            self.line += 1;
        }
        Ok(byte)
    }
}

impl<R: Read> Iterator for Lexer<R> {
    type Item = RatResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        self.finished = match &result {
            Ok(token) => token.kind == TokenKind::EndOfInput,
            Err(_) => true,
        };
        Some(result)
    }
}

fn single_char_token(kind: TokenKind, byte: u8) -> Token {
    Token::new(kind, char::from(byte).to_string())
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic()
}

fn is_ident_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}
