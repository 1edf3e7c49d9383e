//! Utility macros for the compiler.
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_DEFAULT_HANDLER!` - Creates a default lexer handler for simple tokens
//! - `MK_INSTR!` - Creates a P-machine instruction from a mnemonic and operands

/// Creates a Token instance.
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Number, "42".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// Creates a default lexer handler for simple single-token patterns.
///
/// Generates a handler function that creates a token with the given kind
/// and advances the lexer position by the token's length.
///
/// ```ignore
/// RegexPattern {
///     regex: Regex::new("^\\+").unwrap(),
///     handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+"),
/// }
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _matched: &str| {
            let span = lexer.span_here();
            lexer.push(MK_TOKEN!($kind, String::from($value), span));
            lexer.advance_n($value.len());
            Ok(())
        }
    };
}

/// Creates an instruction.
///
/// ```ignore
/// compiler.emit(MK_INSTR!("lod", ptype, depth, offset));
/// compiler.emit(MK_INSTR!("retp"));
/// ```
#[macro_export]
macro_rules! MK_INSTR {
    ($mnemonic:expr) => {
        $crate::compiler::instruction::Instruction::Op {
            mnemonic: String::from($mnemonic),
            operands: vec![],
        }
    };
    ($mnemonic:expr, $($operand:expr),+ $(,)?) => {
        $crate::compiler::instruction::Instruction::Op {
            mnemonic: String::from($mnemonic),
            operands: vec![$($operand.to_string()),+],
        }
    };
}
