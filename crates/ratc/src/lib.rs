pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

use std::io::{self, Read, Write};

pub use config::ParseOptions;
pub use error::{Error, Expected, RatResult};
pub use token::{Token, TokenKind};

pub fn tokenize_source(source: &str) -> RatResult<Vec<Token>> {
    lexer::tokenize(source.as_bytes())
}

pub fn parse<R: Read>(reader: R, options: ParseOptions, out: &mut dyn Write) -> RatResult<()> {
    parser::parse(reader, options, out)
}

/// Accepts or rejects `source` without producing any output.
pub fn check_source(source: &str) -> RatResult<()> {
    parse(source.as_bytes(), ParseOptions::default(), &mut io::sink())
}

/// Parses `source` and returns the token echo and derivation trace it produced.
///
/// On failure the output written before the offending token is discarded; use
/// [`parse`] with your own sink to keep it.
pub fn check_source_with_output(source: &str, options: ParseOptions) -> RatResult<String> {
    let mut out = Vec::new();
    parse(source.as_bytes(), options, &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
