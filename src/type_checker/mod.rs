//! Name resolution and type checking.
//!
//! This module walks the tree built by the parser and annotates it in place:
//!
//! - Binding identifiers and calls to symbols in a scoped symbol table
//! - Typing every expression and splicing in implicit conversions
//! - Applying manual casts
//! - Checking declarations, prototypes, returns and loop jumps
//! - Assigning control-flow labels
//!
//! A separate reachability pass warns about non-void functions that may end
//! without returning a value.

pub mod conversions;
pub mod reachability;
pub mod symbol_table;
pub mod type_checker;
