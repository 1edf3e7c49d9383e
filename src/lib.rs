#![allow(clippy::module_inception)]

use std::rc::Rc;

use ast::ast::Ast;
use compiler::instruction::Instruction;
use errors::errors::{Error, ErrorTip, Warning};
use session::Session;

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod session;
pub mod type_checker;

extern crate regex;

#[derive(Debug, Clone)]
pub struct Position(pub u32, pub Rc<String>);

#[derive(Debug, Clone)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Result of a successful compilation.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub instructions: Vec<Instruction>,
    pub warnings: Vec<Warning>,
}

impl CompileOutput {
    /// The program as text, one instruction per line.
    pub fn render(&self) -> String {
        compiler::instruction::render(&self.instructions)
    }
}

/// Tokenizes and parses `source` into a tree.
pub fn parse_source(source: &str, file: &str) -> Result<Ast, Error> {
    let tokens = lexer::lexer::tokenize(source.to_string(), Some(file.to_string()))?;
    parser::parser::parse(tokens, Rc::new(file.to_string()))
}

/// Runs every pass over `source` in a fresh session.
///
/// Stops at the first fatal error. Warnings never stop compilation; they
/// come back with the instructions.
pub fn compile_source(source: &str, file: &str) -> Result<CompileOutput, Error> {
    let mut session = Session::new();
    let mut ast = parse_source(source, file)?;

    let mut symbols = type_checker::type_checker::type_check(&mut ast, &mut session)?;
    type_checker::reachability::check_returns(&ast, &mut session);
    let instructions = compiler::compiler::compile(&mut ast, &mut symbols, &mut session)?;

    Ok(CompileOutput {
        instructions,
        warnings: session.take_warnings(),
    })
}

/// Returns line `line` (1-based) of `source`.
pub fn get_line(source: &str, line: u32) -> Option<&str> {
    let index = (line as usize).checked_sub(1)?;
    source.lines().nth(index)
}

/// Formats a diagnostic with the offending source line.
///
/// ```text
/// Error: SymbolNotDeclared (Declare `x` before using it)
/// -> main.c
///   |
/// 3 | x = 1;
///   |
/// 3: Use of 'x' before declaration
/// ```
pub fn format_error(error: &Error, source: &str, file: &str) -> String {
    let mut text = String::new();

    if let ErrorTip::None = error.get_tip() {
        text.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        text.push_str(&format!("Error: {} ({})\n", error.get_error_name(), error.get_tip()));
    }
    text.push_str(&format!("-> {}\n", file));

    if let Some(line_text) = get_line(source, error.get_line()) {
        let line_string = error.get_line().to_string();
        let padding = line_string.len() + 2;
        text.push_str(&format!("{:>padding$}\n", "|"));
        text.push_str(&format!("{} | {}\n", line_string, line_text.trim()));
        text.push_str(&format!("{:>padding$}\n", "|"));
    }

    text.push_str(&error.to_string());
    text
}

pub fn display_error(error: &Error, source: &str, file: &str) {
    eprintln!("{}", format_error(error, source, file));
}

#[cfg(test)]
mod tests {
    use super::{compile_source, format_error, get_line};

    #[test]
    fn test_get_line() {
        let source = "int a;\nvoid main() {\n  a = 1;\n}";

        assert_eq!(get_line(source, 1), Some("int a;"));
        assert_eq!(get_line(source, 3), Some("  a = 1;"));
        assert_eq!(get_line(source, 0), None);
        assert_eq!(get_line(source, 9), None);
    }

    #[test]
    fn test_format_error() {
        let source = "void main() {\n  x = 1;\n}";
        let error = compile_source(source, "main.c").unwrap_err();
        let text = format_error(&error, source, "main.c");

        assert!(text.starts_with("Error: SymbolNotDeclared"));
        assert!(text.contains("-> main.c"));
        assert!(text.contains("2 | x = 1;"));
        assert!(text.ends_with("2: Use of 'x' before declaration"));
    }
}
