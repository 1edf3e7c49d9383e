//! Error types and error handling for the compiler.
//!
//! This module defines the diagnostics used throughout the compilation
//! process. It includes:
//!
//! - Fatal errors carrying the offending source line
//! - Specific error variants for every compilation phase
//! - Non-fatal warnings collected by the compilation session
//! - Helpful error messages and suggestions

pub mod errors;

#[cfg(test)]
mod tests;
