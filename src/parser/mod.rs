//! Parser module.
//!
//! Transforms a stream of tokens into calls on the `AstBuilder`. It uses a
//! Pratt parser for expressions with C operator precedence and handles:
//!
//! - Declarations (variables, arrays, prototypes and function definitions)
//! - Statements (blocks, control flow, jumps)
//! - Expressions (binary ops, unary and postfix ops, calls, casts, subscripts)
//! - Type specifiers with pointer chains and `const`
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;
