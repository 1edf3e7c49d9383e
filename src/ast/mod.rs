//! Abstract syntax tree.
//!
//! - `ast`: the node arena, node kinds and in-place rewriting helpers
//! - `builder`: construction callbacks driven by the parser
//! - `operators`: binary and unary operator definitions
//! - `types`: resolved types and lowering of type subtrees
pub mod ast;
pub mod builder;
pub mod operators;
pub mod types;

#[cfg(test)]
mod tests;
