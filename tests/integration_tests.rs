//! Integration tests for end-to-end compilation.
//!
//! These tests run whole programs through tokenization, parsing,
//! resolution and P-machine code generation, and check properties of the
//! emitted instruction text.

use std::collections::HashSet;

use pcc::{
    compile_source,
    errors::errors::{ErrorImpl, WarningImpl},
    format_error, CompileOutput,
};

const BLOCK: &str = include_str!("programs/block.c");
const FUNCTIONS: &str = include_str!("programs/functions.c");
const PASCAL: &str = include_str!("programs/pascal.c");
const SNAKE: &str = include_str!("programs/snake.c");

fn compile(source: &str, file: &str) -> CompileOutput {
    let _ = env_logger::builder().is_test(true).try_init();

    match compile_source(source, file) {
        Ok(output) => output,
        Err(error) => panic!("{}", format_error(&error, source, file)),
    }
}

fn text_lines(output: &CompileOutput) -> Vec<String> {
    output.render().lines().map(String::from).collect()
}

/// Full label of the user function `name`, such as `fib_0`.
fn function_label(lines: &[String], name: &str) -> String {
    let prefix = format!("{}_", name);
    lines
        .iter()
        .filter_map(|line| line.strip_suffix(':'))
        .find(|label| {
            label
                .strip_prefix(&prefix)
                .is_some_and(|suffix| suffix.chars().all(|c| c.is_ascii_digit()))
        })
        .map(String::from)
        .unwrap_or_else(|| panic!("no label for function {}", name))
}

/// The lines of the function labelled `label`, up to the next function.
fn function_lines(lines: &[String], label: &str) -> Vec<String> {
    let start = lines
        .iter()
        .position(|line| *line == format!("{}:", label))
        .unwrap_or_else(|| panic!("label {} not found", label));

    lines[start + 1..]
        .iter()
        .take_while(|line| !(line.ends_with(':') && !line.starts_with('l')))
        .cloned()
        .collect()
}

/// Checks that every label is defined once and every jump or call target
/// is defined.
fn assert_labels_consistent(output: &CompileOutput) {
    let mut defined = HashSet::new();
    for instruction in output.instructions.iter().filter(|i| i.is_label()) {
        let name = instruction.to_string();
        assert!(defined.insert(name.clone()), "label {} defined twice", name);
    }

    for instruction in output.instructions.iter() {
        let target = match instruction.mnemonic() {
            Some("ujp") | Some("fjp") => instruction.operands().first(),
            Some("cup") => instruction.operands().get(1),
            _ => None,
        };
        if let Some(target) = target {
            assert!(
                defined.contains(&format!("{}:", target)),
                "jump to undefined label {}",
                target
            );
        }
    }
}

#[test]
fn test_compile_simple_program() {
    let output = compile("void main() { }", "simple.c");

    assert_eq!(output.render(), "ssp 5\nmst 0\ncup 0 main_0\nhlt\nmain_0:\nssp 5\nretp\n");
    assert!(output.warnings.is_empty());
}

#[test]
fn test_block_scopes() {
    let output = compile(BLOCK, "block.c");
    let lines = text_lines(&output);
    assert_labels_consistent(&output);

    // Global `a` first, then each shadowing local in turn.
    let main = function_lines(&lines, &function_label(&lines, "main"));
    let loads: Vec<_> = main.iter().filter(|line| line.starts_with("lod i")).collect();
    assert_eq!(loads, vec!["lod i 1 5", "lod i 0 5", "lod i 0 6", "lod i 0 7"]);
    assert_eq!(main[0], "ssp 8");

    let f = function_lines(&lines, &function_label(&lines, "f"));
    assert!(f.contains(&"lod i 0 5".to_string()));

    assert!(lines.contains(&"printf:".to_string()));
    assert!(lines.contains(&"print:".to_string()));
}

#[test]
fn test_functions_program() {
    let output = compile(FUNCTIONS, "functions.c");
    let lines = text_lines(&output);
    assert_labels_consistent(&output);
    assert!(output.warnings.is_empty());

    let fib = function_label(&lines, "fib");
    let fib_code = function_lines(&lines, &fib);
    assert!(fib_code.contains(&format!("cup 1 {}", fib)));
    assert!(fib_code.contains(&"mst 1".to_string()));

    let hello = function_label(&lines, "hello_world");
    let main = function_lines(&lines, &function_label(&lines, "main"));
    let call = main.iter().position(|line| *line == format!("cup 0 {}", hello)).unwrap();
    assert_eq!(main[call - 1], "mst 0");

    // `print` lives in the file frame, two frames out from `hello_world`.
    let hello_code = function_lines(&lines, &hello);
    assert_eq!(hello_code[1], "mst 2");
    assert!(hello_code[2].starts_with("lda 2 "));

    assert_eq!(lines.iter().filter(|line| *line == "print:").count(), 1);
}

#[test]
fn test_pascal_program() {
    let output = compile(PASCAL, "pascal.c");
    let lines = text_lines(&output);
    assert_labels_consistent(&output);
    assert!(output.warnings.is_empty());

    // D takes slot 5, the two "%d%c" literals slots 6 to 15. The pool is
    // filled before the global initializers run.
    assert_eq!(lines[0], "ssp 16");
    assert_eq!(lines[1..3], ["ldc c '%'".to_string(), "str c 0 6".to_string()]);
    assert_eq!(lines[19..21], ["ldc c 0".to_string(), "str c 0 15".to_string()]);
    assert_eq!(lines[21..23], ["ldc i 16".to_string(), "str i 0 5".to_string()]);

    let pascals = function_label(&lines, "pascals");
    let main = function_lines(&lines, &function_label(&lines, "main"));
    assert_eq!(main[0], "ssp 37");
    let call = main.iter().position(|line| *line == format!("cup 3 {}", pascals)).unwrap();
    assert_eq!(main[call - 4..call], ["mst 1", "lda 0 5", "lda 0 21", "ldc i 0"]);

    let body = function_lines(&lines, &pascals);
    assert!(body.contains(&"conv i a".to_string()));
    assert!(body.contains(&"add a".to_string()));
    assert!(body.contains(&"sto i".to_string()));
    assert!(body.contains(&"ldc c 32".to_string()));
    assert!(body.contains(&"ldc c 10".to_string()));
}

#[test]
fn test_snake_program() {
    let output = compile(SNAKE, "snake.c");
    let lines = text_lines(&output);
    assert_labels_consistent(&output);
    assert!(output.warnings.is_empty());

    for builtin in ["printf:", "print:", "scanf:", "readstr:", "parseint:", "isdigit:"] {
        assert!(lines.contains(&builtin.to_string()), "{} missing", builtin);
    }
    assert!(!lines.contains(&"mod:".to_string()));
    assert!(!lines.contains(&"strlen:".to_string()));

    // WIDTH and HEIGHT take slots 5 and 6, map[225] takes 7 to 231.
    let max_length = lines
        .iter()
        .position(|line| line == "str i 0 232")
        .expect("MAXLENGTH initializer");
    assert_eq!(lines[max_length - 1], "ldc i 30");
}

#[test]
fn test_compilation_is_deterministic() {
    let first = compile(SNAKE, "snake.c").render();
    let second = compile(SNAKE, "snake.c").render();

    assert_eq!(first, second);
}

#[test]
fn test_missing_return_warning() {
    let output = compile("int f() { int a = 1; }\nvoid main() { }", "warn.c");

    assert_eq!(output.warnings.len(), 1);
    assert_eq!(
        *output.warnings[0].get_impl(),
        WarningImpl::MissingReturn {
            function: "f".to_string()
        }
    );
    assert_eq!(output.warnings[0].get_line(), 1);

    let lines = text_lines(&output);
    let f = function_lines(&lines, "f_0");
    assert_eq!(f.last().map(String::as_str), Some("retf"));
}

#[test]
fn test_syntax_error() {
    let error = compile_source("void main() {\n  int a = ;\n}", "bad.c").unwrap_err();

    assert_eq!(error.get_line(), 2);
    assert!(format_error(&error, "void main() {\n  int a = ;\n}", "bad.c").contains("-> bad.c"));
}

#[test]
fn test_semantic_errors() {
    let cases = [
        ("void main() { undefined(); }", "SymbolNotDeclared"),
        ("int f(int a);\nvoid main() { f(1); }", "FunctionNotDefined"),
        ("void main() { int a[2]; a[5] = 1; }", "IndexOutOfRange"),
        ("void main() { continue; }", "JumpOutsideLoop"),
        ("void f() {}", "MissingMain"),
        ("int main() { return 1; }", "InvalidMain"),
    ];

    for (source, expected) in cases {
        let error = compile_source(source, "bad.c").unwrap_err();
        assert_eq!(error.get_error_name(), expected, "{}", source);
    }
}

#[test]
fn test_error_reports_line() {
    let source = "int x;\nvoid main() {\n  x = 1;\n  y = 2;\n}";
    let error = compile_source(source, "main.c").unwrap_err();

    assert_eq!(
        *error.get_impl(),
        ErrorImpl::SymbolNotDeclared {
            name: "y".to_string()
        }
    );
    let text = format_error(&error, source, "main.c");
    assert!(text.contains("4 | y = 2;"));
    assert!(text.contains("Declare `y` before using it"));
}
