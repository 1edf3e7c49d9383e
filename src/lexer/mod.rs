//! Lexical analysis module for the compiler.
//!
//! Converts C source text into a stream of tokens for parsing:
//!
//! - Tokenization of source code using regex patterns
//! - Recognition of keywords, identifiers, literals, and operators
//! - Line tracking for error reporting
//! - Comments, whitespace and preprocessor lines are skipped

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
