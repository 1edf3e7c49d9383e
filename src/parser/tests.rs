//! Unit tests for the parser module.
//!
//! - Variable, array and pointer declarations
//! - Function definitions and prototypes
//! - Expressions and operator precedence
//! - Control flow statements
//! - Syntax errors

use std::rc::Rc;

use super::parser::parse;
use crate::{
    ast::{
        ast::{Ast, NodeId, NodeKind, TypeNodeKind},
        operators::{BinaryOp, UnaryOp},
        types::type_of,
    },
    errors::errors::Error,
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Result<Ast, Error> {
    let tokens = tokenize(source.to_string(), Some("test.c".to_string()))?;
    parse(tokens, Rc::new("test.c".to_string()))
}

fn top_level(ast: &Ast) -> Vec<NodeId> {
    ast.children(ast.root().unwrap()).to_vec()
}

/// Returns the expression of the `index`-th statement in `main`'s body.
fn body_statement(ast: &Ast, index: usize) -> NodeId {
    let function = *top_level(ast).last().unwrap();
    let body = ast.children(function)[2];
    ast.children(body)[index]
}

#[test]
fn test_parse_variable_declaration() {
    let ast = parse_source("int x = 42;").unwrap();
    let declarations = top_level(&ast);

    assert_eq!(declarations.len(), 1);
    assert!(matches!(ast.kind(declarations[0]), NodeKind::Declaration { name, .. } if name == "x"));
    assert!(matches!(ast.kind(ast.children(declarations[0])[1]), NodeKind::IntLiteral(42)));
    assert!(ast.parent_links_consistent());
}

#[test]
fn test_parse_multiple_declarators() {
    let ast = parse_source("int a, *b, c[3];").unwrap();
    let declarations = top_level(&ast);

    assert_eq!(declarations.len(), 3);
    let types: Vec<String> = declarations
        .iter()
        .map(|d| type_of(&ast, ast.children(*d)[0]).unwrap().to_string())
        .collect();
    assert_eq!(types, vec!["int", "int*", "int[3]"]);
}

#[test]
fn test_parse_const_pointers() {
    let ast = parse_source("const int * const p = 0; int const c = 1;").unwrap();
    let declarations = top_level(&ast);

    let pointer = type_of(&ast, ast.children(declarations[0])[0]).unwrap();
    assert!(pointer.constant);
    assert!(pointer.pointee().unwrap().constant);

    let constant = type_of(&ast, ast.children(declarations[1])[0]).unwrap();
    assert!(constant.constant);
    assert_eq!(constant.to_string(), "const int");
}

#[test]
fn test_parse_array_initializer() {
    let ast = parse_source("int a[] = {1, 2, 3};").unwrap();
    let declaration = top_level(&ast)[0];
    let children = ast.children(declaration);

    match ast.kind(children[0]) {
        NodeKind::Type(type_node) => assert_eq!(type_node.kind, TypeNodeKind::Array { size: None }),
        other => panic!("expected a type, found {:?}", other),
    }
    assert_eq!(*ast.kind(children[1]), NodeKind::InitializerList);
    assert_eq!(ast.children(children[1]).len(), 3);
}

#[test]
fn test_parse_function_declaration() {
    let ast = parse_source("int add(int a, char *b) { return a; }").unwrap();
    let function = top_level(&ast)[0];
    let children = ast.children(function);

    assert!(matches!(ast.kind(function), NodeKind::FunctionDeclaration { name, .. } if name == "add"));
    assert_eq!(children.len(), 3);
    assert_eq!(*ast.kind(children[1]), NodeKind::FormalParameters);
    assert_eq!(ast.children(children[1]).len(), 2);
    assert_eq!(*ast.kind(children[2]), NodeKind::Block);
}

#[test]
fn test_declarations_keep_name_and_line() {
    let ast = parse_source("int x;\n\nint f(\n  int a,\n  char b) { return a; }").unwrap();
    let declarations = top_level(&ast);

    assert!(matches!(ast.kind(declarations[0]), NodeKind::Declaration { name, .. } if name == "x"));
    assert_eq!(ast.line(declarations[0]), 1);
    assert_eq!(ast.line(declarations[1]), 3);

    let params = ast.children(ast.children(declarations[1])[1]).to_vec();
    let named: Vec<(String, u32)> = params
        .iter()
        .map(|param| match ast.kind(*param) {
            NodeKind::FormalParameter { name, .. } => (name.clone(), ast.line(*param)),
            other => panic!("expected a parameter, found {:?}", other),
        })
        .collect();
    assert_eq!(named, vec![("a".to_string(), 4), ("b".to_string(), 5)]);
}

#[test]
fn test_parse_prototype() {
    let ast = parse_source("void f(void); int g(int a[]);").unwrap();
    let declarations = top_level(&ast);

    assert_eq!(ast.children(declarations[0]).len(), 2);
    assert!(ast.children(ast.children(declarations[0])[1]).is_empty());

    let param = ast.children(ast.children(declarations[1])[1])[0];
    let param_type = type_of(&ast, ast.children(param)[0]).unwrap();
    assert_eq!(param_type.to_string(), "int*");
}

#[test]
fn test_parse_precedence() {
    let ast = parse_source("void main() { x = 1 + 2 * 3 == 7 && y || z; }").unwrap();
    let statement = body_statement(&ast, 0);
    let assignment = ast.children(statement)[0];

    assert_eq!(*ast.kind(assignment), NodeKind::Binary(BinaryOp::Assign));
    let or = ast.children(assignment)[1];
    assert_eq!(*ast.kind(or), NodeKind::Binary(BinaryOp::Or));
    let and = ast.children(or)[0];
    assert_eq!(*ast.kind(and), NodeKind::Binary(BinaryOp::And));
    let equals = ast.children(and)[0];
    assert_eq!(*ast.kind(equals), NodeKind::Binary(BinaryOp::Equals));
    let plus = ast.children(equals)[0];
    assert_eq!(*ast.kind(plus), NodeKind::Binary(BinaryOp::Add));
    assert_eq!(*ast.kind(ast.children(plus)[1]), NodeKind::Binary(BinaryOp::Mul));
}

#[test]
fn test_parse_left_associative() {
    let ast = parse_source("void main() { x = 8 - 4 - 2; }").unwrap();
    let assignment = ast.children(body_statement(&ast, 0))[0];
    let outer = ast.children(assignment)[1];

    assert_eq!(*ast.kind(outer), NodeKind::Binary(BinaryOp::Sub));
    assert_eq!(*ast.kind(ast.children(outer)[0]), NodeKind::Binary(BinaryOp::Sub));
    assert_eq!(*ast.kind(ast.children(outer)[1]), NodeKind::IntLiteral(2));
}

#[test]
fn test_parse_unary_and_postfix() {
    let ast = parse_source("void main() { *p++; -x; i > -1; a[i]--; &c; }").unwrap();

    let deref = ast.children(body_statement(&ast, 0))[0];
    assert_eq!(*ast.kind(deref), NodeKind::Unary(UnaryOp::Deref));
    assert_eq!(*ast.kind(ast.children(deref)[0]), NodeKind::Unary(UnaryOp::PostIncrement));

    let negate = ast.children(body_statement(&ast, 1))[0];
    assert_eq!(*ast.kind(negate), NodeKind::Unary(UnaryOp::Negate));

    let compare = ast.children(body_statement(&ast, 2))[0];
    assert_eq!(*ast.kind(ast.children(compare)[1]), NodeKind::IntLiteral(-1));

    let decrement = ast.children(body_statement(&ast, 3))[0];
    assert_eq!(*ast.kind(decrement), NodeKind::Unary(UnaryOp::PostDecrement));
    assert_eq!(*ast.kind(ast.children(decrement)[0]), NodeKind::Subscript);

    let address = ast.children(body_statement(&ast, 4))[0];
    assert_eq!(*ast.kind(address), NodeKind::Unary(UnaryOp::AddressOf));
}

#[test]
fn test_parse_cast() {
    let ast = parse_source("void main() { x = (char) y + 1; }").unwrap();
    let assignment = ast.children(body_statement(&ast, 0))[0];
    let plus = ast.children(assignment)[1];
    let operand = ast.children(plus)[0];

    assert!(matches!(ast.kind(operand), NodeKind::Identifier { name, .. } if name == "y"));
    assert_eq!(ast.node(operand).casts.len(), 1);
    assert_eq!(ast.node(operand).casts[0].to_string(), "char");
}

#[test]
fn test_parse_call() {
    let ast = parse_source("void main() { printf(\"%d\", f(1), 2); g(); }").unwrap();
    let call = ast.children(body_statement(&ast, 0))[0];

    assert!(matches!(ast.kind(call), NodeKind::Call { name, .. } if name == "printf"));
    assert_eq!(ast.children(call).len(), 3);
    assert!(matches!(ast.kind(ast.children(call)[1]), NodeKind::Call { name, .. } if name == "f"));

    let empty = ast.children(body_statement(&ast, 1))[0];
    assert!(ast.children(empty).is_empty());
}

#[test]
fn test_parse_control_flow() {
    let source = "void main() {
        if (a) b = 1; else { b = 2; }
        while (a < 10) a++;
        for (int i = 0; i < 3; i++) { continue; }
        for (;;) break;
        return;
    }";
    let ast = parse_source(source).unwrap();

    let if_node = body_statement(&ast, 0);
    assert!(matches!(ast.kind(if_node), NodeKind::If { .. }));
    assert_eq!(ast.children(if_node).len(), 3);

    let while_node = body_statement(&ast, 1);
    assert!(matches!(ast.kind(while_node), NodeKind::While { .. }));

    let for_node = body_statement(&ast, 2);
    let clauses = ast.children(for_node);
    assert_eq!(clauses.len(), 4);
    assert!(matches!(ast.kind(clauses[0]), NodeKind::Declaration { .. }));
    assert_eq!(*ast.kind(clauses[2]), NodeKind::ExprStatement);

    let empty_for = body_statement(&ast, 3);
    let clauses = ast.children(empty_for);
    assert_eq!(*ast.kind(clauses[0]), NodeKind::Nothing);
    assert_eq!(*ast.kind(clauses[1]), NodeKind::Nothing);
    assert_eq!(*ast.kind(clauses[2]), NodeKind::Nothing);
    assert!(matches!(ast.kind(clauses[3]), NodeKind::Break { .. }));

    let return_node = body_statement(&ast, 4);
    assert_eq!(*ast.kind(return_node), NodeKind::Return);
    assert!(ast.children(return_node).is_empty());
    assert!(ast.parent_links_consistent());
}

#[test]
fn test_parse_nested_function() {
    let ast = parse_source("void main() { int inner(int x) { return x; } inner(1); }").unwrap();

    let inner = body_statement(&ast, 0);
    assert!(matches!(ast.kind(inner), NodeKind::FunctionDeclaration { name, .. } if name == "inner"));
}

#[test]
fn test_parse_lines() {
    let ast = parse_source("int a;\n\nvoid main() {\n  a = 1;\n}").unwrap();

    assert_eq!(ast.line(top_level(&ast)[0]), 1);
    assert_eq!(ast.line(body_statement(&ast, 0)), 4);
}

#[test]
fn test_parse_missing_semicolon() {
    let error = parse_source("int a = 1\nint b;").unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedToken");
    assert_eq!(error.get_line(), 2);
}

#[test]
fn test_parse_statement_at_file_level() {
    let error = parse_source("x = 1;").unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}
