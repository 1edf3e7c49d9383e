//! Tree construction callbacks.
//!
//! The parser never creates nodes itself. Each time a grammar construct
//! completes, it calls one of the `handle_*` methods, which pop the finished
//! operands from an explicit stack, assemble the new node and push it back.

use log::trace;

use crate::errors::errors::{Error, ErrorImpl};

use super::{
    ast::{Ast, NodeId, NodeKind, TypeNode, TypeNodeKind},
    operators::{BinaryOp, UnaryOp},
    types::type_of,
};

#[derive(Debug, Default)]
pub struct AstBuilder {
    ast: Ast,
    stack: Vec<NodeId>,
}

impl AstBuilder {
    pub fn new() -> Self {
        AstBuilder::default()
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    fn push(&mut self, kind: NodeKind, line: u32, children: Vec<NodeId>) -> NodeId {
        let id = self.ast.add(kind, line);
        for child in children {
            self.ast.append_child(id, child);
        }
        trace!("built {:?} at line {}", self.ast.kind(id), line);
        self.stack.push(id);
        id
    }

    fn pop(&mut self, line: u32) -> Result<NodeId, Error> {
        self.stack.pop().ok_or_else(|| {
            Error::new(
                ErrorImpl::MalformedTree {
                    message: String::from("operand stack is empty"),
                },
                line,
            )
        })
    }

    /// Pops `n` operands, returned in the order they were pushed.
    fn pop_n(&mut self, n: usize, line: u32) -> Result<Vec<NodeId>, Error> {
        if self.stack.len() < n {
            return Err(Error::new(
                ErrorImpl::MalformedTree {
                    message: format!("expected {} operands, found {}", n, self.stack.len()),
                },
                line,
            ));
        }
        Ok(self.stack.split_off(self.stack.len() - n))
    }

    fn pop_type(&mut self, line: u32) -> Result<NodeId, Error> {
        let id = self.pop(line)?;
        match self.ast.kind(id) {
            NodeKind::Type(_) => Ok(id),
            other => Err(Error::new(
                ErrorImpl::MalformedTree {
                    message: format!("expected a type, found {:?}", other),
                },
                line,
            )),
        }
    }

    fn mark_top_level(&mut self, id: NodeId) {
        if let NodeKind::Type(type_node) = self.ast.kind_mut(id) {
            type_node.top_level = true;
        }
    }

    pub fn handle_int(&mut self, value: i64, line: u32) {
        self.push(NodeKind::IntLiteral(value), line, vec![]);
    }

    pub fn handle_char(&mut self, value: char, line: u32) {
        self.push(NodeKind::CharLiteral(value), line, vec![]);
    }

    pub fn handle_string(&mut self, value: String, line: u32) {
        self.push(
            NodeKind::StringLiteral {
                value,
                pool_offset: None,
            },
            line,
            vec![],
        );
    }

    pub fn handle_identifier(&mut self, name: String, line: u32) {
        self.push(NodeKind::Identifier { name, symbol: None }, line, vec![]);
    }

    /// Pushes a base type: `Int`, `Char` or `Void`.
    pub fn handle_type(&mut self, kind: TypeNodeKind, line: u32) {
        self.push(
            NodeKind::Type(TypeNode {
                kind,
                constant: false,
                top_level: false,
            }),
            line,
            vec![],
        );
    }

    /// Qualifies the type on top of the stack.
    pub fn handle_const(&mut self, line: u32) -> Result<(), Error> {
        let id = self.pop_type(line)?;
        if let NodeKind::Type(type_node) = self.ast.kind_mut(id) {
            type_node.constant = true;
        }
        self.stack.push(id);
        Ok(())
    }

    pub fn handle_pointer_type(&mut self, line: u32) -> Result<(), Error> {
        let pointee = self.pop_type(line)?;
        self.push(
            NodeKind::Type(TypeNode {
                kind: TypeNodeKind::Pointer,
                constant: false,
                top_level: false,
            }),
            line,
            vec![pointee],
        );
        Ok(())
    }

    pub fn handle_array_type(&mut self, size: Option<usize>, line: u32) -> Result<(), Error> {
        let element = self.pop_type(line)?;
        self.push(
            NodeKind::Type(TypeNode {
                kind: TypeNodeKind::Array { size },
                constant: false,
                top_level: false,
            }),
            line,
            vec![element],
        );
        Ok(())
    }

    pub fn handle_binary_operator(&mut self, op: BinaryOp, line: u32) -> Result<(), Error> {
        let right = self.pop(line)?;
        let left = self.pop(line)?;
        self.push(NodeKind::Binary(op), line, vec![left, right]);
        Ok(())
    }

    pub fn handle_unary_operator(&mut self, op: UnaryOp, line: u32) -> Result<(), Error> {
        let operand = self.pop(line)?;
        self.push(NodeKind::Unary(op), line, vec![operand]);
        Ok(())
    }

    pub fn handle_subscript(&mut self, line: u32) -> Result<(), Error> {
        let index = self.pop(line)?;
        let base = self.pop(line)?;
        self.push(NodeKind::Subscript, line, vec![base, index]);
        Ok(())
    }

    /// Attaches a manual cast to the expression on top of the stack.
    ///
    /// Expects the expression on top and the cast's type right below it.
    pub fn handle_cast(&mut self, line: u32) -> Result<(), Error> {
        let expr = self.pop(line)?;
        let type_id = self.pop_type(line)?;
        let ty = type_of(&self.ast, type_id).ok_or_else(|| {
            Error::new(
                ErrorImpl::MalformedTree {
                    message: String::from("cast to an incomplete type"),
                },
                line,
            )
        })?;

        // Casts stack up innermost first: `(int)(char)x` truncates, then widens.
        self.ast.node_mut(expr).casts.push(ty);
        self.stack.push(expr);
        Ok(())
    }

    pub fn handle_call(&mut self, name: String, argc: usize, line: u32) -> Result<(), Error> {
        let args = self.pop_n(argc, line)?;
        self.push(NodeKind::Call { name, symbol: None }, line, args);
        Ok(())
    }

    pub fn handle_initializer_list(&mut self, n: usize, line: u32) -> Result<(), Error> {
        let elements = self.pop_n(n, line)?;
        self.push(NodeKind::InitializerList, line, elements);
        Ok(())
    }

    /// Expects the declared type and, when `has_init`, the initializer above it.
    pub fn handle_var_decl(&mut self, name: String, has_init: bool, line: u32) -> Result<(), Error> {
        let init = if has_init { Some(self.pop(line)?) } else { None };
        let type_id = self.pop_type(line)?;
        self.mark_top_level(type_id);

        let mut children = vec![type_id];
        children.extend(init);
        self.push(NodeKind::Declaration { name, symbol: None }, line, children);
        Ok(())
    }

    pub fn handle_formal_parameter(&mut self, name: String, line: u32) -> Result<(), Error> {
        let type_id = self.pop_type(line)?;
        self.mark_top_level(type_id);
        self.push(NodeKind::FormalParameter { name, symbol: None }, line, vec![type_id]);
        Ok(())
    }

    pub fn handle_formal_parameters(&mut self, n: usize, line: u32) -> Result<(), Error> {
        let params = self.pop_n(n, line)?;
        self.push(NodeKind::FormalParameters, line, params);
        Ok(())
    }

    /// Expects return type, formal parameters and, when `has_body`, the body.
    pub fn handle_func_decl(&mut self, name: String, has_body: bool, line: u32) -> Result<(), Error> {
        let body = if has_body { Some(self.pop(line)?) } else { None };
        let params = self.pop(line)?;
        let return_type = self.pop_type(line)?;
        self.mark_top_level(return_type);

        let mut children = vec![return_type, params];
        children.extend(body);
        self.push(NodeKind::FunctionDeclaration { name, symbol: None }, line, children);
        Ok(())
    }

    pub fn handle_expr_statement(&mut self, line: u32) -> Result<(), Error> {
        let expr = self.pop(line)?;
        self.push(NodeKind::ExprStatement, line, vec![expr]);
        Ok(())
    }

    pub fn handle_block(&mut self, n: usize, line: u32) -> Result<(), Error> {
        let statements = self.pop_n(n, line)?;
        self.push(NodeKind::Block, line, statements);
        Ok(())
    }

    pub fn handle_if(&mut self, has_else: bool, line: u32) -> Result<(), Error> {
        let children = self.pop_n(if has_else { 3 } else { 2 }, line)?;
        self.push(
            NodeKind::If {
                else_label: None,
                end_label: None,
            },
            line,
            children,
        );
        Ok(())
    }

    pub fn handle_while(&mut self, line: u32) -> Result<(), Error> {
        let children = self.pop_n(2, line)?;
        self.push(
            NodeKind::While {
                start_label: None,
                end_label: None,
            },
            line,
            children,
        );
        Ok(())
    }

    /// Expects init, condition, step and body; absent clauses are `Nothing`.
    pub fn handle_for(&mut self, line: u32) -> Result<(), Error> {
        let children = self.pop_n(4, line)?;
        self.push(
            NodeKind::For {
                start_label: None,
                continue_label: None,
                end_label: None,
            },
            line,
            children,
        );
        Ok(())
    }

    pub fn handle_nothing(&mut self, line: u32) {
        self.push(NodeKind::Nothing, line, vec![]);
    }

    pub fn handle_return(&mut self, has_value: bool, line: u32) -> Result<(), Error> {
        let value = if has_value { Some(self.pop(line)?) } else { None };
        self.push(NodeKind::Return, line, value.into_iter().collect());
        Ok(())
    }

    pub fn handle_break(&mut self, line: u32) {
        self.push(NodeKind::Break { label: None }, line, vec![]);
    }

    pub fn handle_continue(&mut self, line: u32) {
        self.push(NodeKind::Continue { label: None }, line, vec![]);
    }

    pub fn handle_file(&mut self, n: usize, line: u32) -> Result<(), Error> {
        let declarations = self.pop_n(n, line)?;
        let file = self.push(NodeKind::File, line, declarations);
        self.ast.set_root(file);
        Ok(())
    }

    /// Hands over the finished tree. Exactly one `File` node must remain.
    pub fn finish(mut self) -> Result<Ast, Error> {
        let line = self.stack.last().map(|id| self.ast.line(*id)).unwrap_or(0);
        if self.stack.len() != 1 {
            return Err(Error::new(
                ErrorImpl::MalformedTree {
                    message: format!("{} nodes left on the operand stack", self.stack.len()),
                },
                line,
            ));
        }

        let root = self.pop(line)?;
        if *self.ast.kind(root) != NodeKind::File {
            return Err(Error::new(
                ErrorImpl::MalformedTree {
                    message: String::from("the last node is not a file"),
                },
                line,
            ));
        }

        self.ast.set_root(root);
        Ok(self.ast)
    }
}
