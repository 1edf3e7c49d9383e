//! Code generation module for the compiler.
//!
//! This module contains the P-machine code generator that turns the resolved
//! tree into a list of text instructions. It handles:
//!
//! - Frame layout and the string pool
//! - The program wrapper that calls `main`
//! - Compilation of expressions and statements
//! - Splicing of the builtin runtime routines a program uses

pub mod compiler;
pub mod expr;
pub mod instruction;
pub mod stdlib;
pub mod stmt;
