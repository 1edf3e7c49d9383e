//! Unit tests for the AST arena, the builder callbacks and the type model.

use super::{
    ast::{Ast, Conversion, NodeKind, TypeNodeKind},
    builder::AstBuilder,
    operators::{BinaryOp, OperatorCategory, UnaryOp},
    types::{type_of, Type, TypeClass},
};

#[test]
fn test_append_child_sets_parent() {
    let mut ast = Ast::new();
    let block = ast.add(NodeKind::Block, 1);
    let nothing = ast.add(NodeKind::Nothing, 2);
    ast.append_child(block, nothing);

    assert_eq!(ast.parent(nothing), Some(block));
    assert_eq!(ast.children(block), &[nothing]);
    assert!(ast.parent_links_consistent());
}

#[test]
fn test_wrap_takes_over_child_slot() {
    let mut ast = Ast::new();
    let binary = ast.add(NodeKind::Binary(BinaryOp::Add), 3);
    let left = ast.add(NodeKind::IntLiteral(1), 3);
    let right = ast.add(NodeKind::CharLiteral('a'), 3);
    ast.append_child(binary, left);
    ast.append_child(binary, right);

    let conversion = ast.wrap(
        right,
        NodeKind::Conversion(Conversion {
            from: Type::char(),
            to: Type::int(),
            instruction: Some("conv c i"),
        }),
    );

    assert_eq!(ast.children(binary), &[left, conversion]);
    assert_eq!(ast.children(conversion), &[right]);
    assert_eq!(ast.parent(right), Some(conversion));
    assert_eq!(ast.line(conversion), 3);
    assert!(ast.parent_links_consistent());
}

#[test]
fn test_wrap_root() {
    let mut ast = Ast::new();
    let literal = ast.add(NodeKind::IntLiteral(7), 1);
    ast.set_root(literal);
    let block = ast.wrap(literal, NodeKind::ExprStatement);

    assert_eq!(ast.root(), Some(block));
}

#[test]
fn test_owning_function() {
    let mut builder = AstBuilder::new();
    builder.handle_type(TypeNodeKind::Void, 1);
    builder.handle_formal_parameters(0, 1).unwrap();
    builder.handle_identifier("x".to_string(), 2);
    builder.handle_expr_statement(2).unwrap();
    builder.handle_block(1, 1).unwrap();
    builder.handle_func_decl("main".to_string(), true, 1).unwrap();
    builder.handle_file(1, 1).unwrap();
    let ast = builder.finish().unwrap();

    let file = ast.root().unwrap();
    let function = ast.children(file)[0];
    let body = ast.children(function)[2];
    let statement = ast.children(body)[0];
    let identifier = ast.children(statement)[0];

    assert_eq!(ast.owning_function(identifier), Some(function));
    assert_eq!(ast.owning_function(function), None);
}

#[test]
fn test_builder_declaration() {
    // const int *p = 0;
    let mut builder = AstBuilder::new();
    builder.handle_type(TypeNodeKind::Int, 1);
    builder.handle_const(1).unwrap();
    builder.handle_pointer_type(1).unwrap();
    builder.handle_int(0, 1);
    builder.handle_var_decl("p".to_string(), true, 1).unwrap();
    builder.handle_file(1, 1).unwrap();
    let ast = builder.finish().unwrap();

    let declaration = ast.children(ast.root().unwrap())[0];
    assert!(matches!(ast.kind(declaration), NodeKind::Declaration { name, .. } if name == "p"));

    let type_id = ast.children(declaration)[0];
    match ast.kind(type_id) {
        NodeKind::Type(type_node) => {
            assert_eq!(type_node.kind, TypeNodeKind::Pointer);
            assert!(type_node.top_level);
            assert!(!type_node.constant);
        }
        other => panic!("expected a type, found {:?}", other),
    }

    let ty = type_of(&ast, type_id).unwrap();
    assert_eq!(ty.to_string(), "const int*");
    assert!(ty.pointee().unwrap().constant);
    assert!(matches!(ast.kind(ast.children(declaration)[1]), NodeKind::IntLiteral(0)));
}

#[test]
fn test_builder_keeps_operand_order() {
    let mut builder = AstBuilder::new();
    builder.handle_identifier("a".to_string(), 1);
    builder.handle_int(1, 1);
    builder.handle_binary_operator(BinaryOp::Sub, 1).unwrap();
    let ast = builder.ast();

    let binary = ast.len() - 1;
    let children = ast.children(super::ast::NodeId(binary));
    assert!(matches!(ast.kind(children[0]), NodeKind::Identifier { name, .. } if name == "a"));
    assert!(matches!(ast.kind(children[1]), NodeKind::IntLiteral(1)));
}

#[test]
fn test_builder_cast() {
    let mut builder = AstBuilder::new();
    builder.handle_type(TypeNodeKind::Char, 1);
    builder.handle_int(65, 1);
    builder.handle_cast(1).unwrap();
    assert_eq!(builder.stack_len(), 1);

    let literal = builder.ast().len() - 1;
    assert_eq!(builder.ast().node(super::ast::NodeId(literal)).casts, vec![Type::char()]);
}

#[test]
fn test_builder_underflow_is_an_error() {
    let mut builder = AstBuilder::new();
    let error = builder.handle_binary_operator(BinaryOp::Add, 4).unwrap_err();

    assert_eq!(error.get_error_name(), "MalformedTree");
    assert_eq!(error.get_line(), 4);
}

#[test]
fn test_finish_requires_single_file() {
    let mut builder = AstBuilder::new();
    builder.handle_int(1, 1);
    builder.handle_int(2, 1);
    assert!(builder.finish().is_err());

    let mut builder = AstBuilder::new();
    builder.handle_int(1, 1);
    assert!(builder.finish().is_err());
}

#[test]
fn test_type_equality_ignores_const() {
    assert_eq!(Type::int().with_const(true), Type::int());
    assert_ne!(Type::int(), Type::char());
    assert_eq!(
        Type::pointer_to(Type::char().with_const(true)),
        Type::pointer_to(Type::char())
    );
    assert_ne!(Type::array_of(Type::int(), 3), Type::array_of(Type::int(), 4));
}

#[test]
fn test_type_properties() {
    let array = Type::array_of(Type::char(), 16);

    assert_eq!(array.class(), TypeClass::Array);
    assert_eq!(array.slots(), 16);
    assert_eq!(array.decay(), Type::pointer_to(Type::char()));
    assert_eq!(array.ptype(), None);
    assert_eq!(array.to_string(), "char[16]");
    assert_eq!(Type::pointer_to(Type::int()).ptype(), Some("a"));
    assert_eq!(Type::char().ptype(), Some("c"));
    assert!(Type::void().ptype().is_none());
}

#[test]
fn test_operator_tables() {
    assert_eq!(BinaryOp::from_symbol("<="), Some(BinaryOp::LessEquals));
    assert_eq!(BinaryOp::from_symbol("<<"), None);
    assert_eq!(BinaryOp::Mod.mnemonic(), None);
    assert_eq!(BinaryOp::GreaterEquals.mnemonic(), Some("geq"));
    assert_eq!(BinaryOp::Or.category(), OperatorCategory::Logical);
    assert_eq!(BinaryOp::NotEquals.category(), OperatorCategory::Comparison);
    assert!(UnaryOp::PostDecrement.is_step());
    assert!(!UnaryOp::Deref.is_step());
    assert_eq!(UnaryOp::PostIncrement.to_string(), "x++");
}

#[test]
fn test_dump() {
    let mut builder = AstBuilder::new();
    builder.handle_type(TypeNodeKind::Int, 1);
    builder.handle_int(5, 1);
    builder.handle_var_decl("x".to_string(), true, 1).unwrap();
    builder.handle_file(1, 1).unwrap();
    let ast = builder.finish().unwrap();

    assert_eq!(
        ast.dump(ast.root().unwrap()),
        "File\n\tDeclaration: x\n\t\tIntType\n\t\tInt: 5\n"
    );
}
