use log::debug;

use crate::{
    ast::{
        ast::{Ast, NodeId, NodeKind, TypeNode, TypeNodeKind},
        operators::{BinaryOp, OperatorCategory, UnaryOp},
        types::{type_of, Type, TypeKind},
    },
    compiler::stdlib::BUILTINS,
    errors::errors::{Error, ErrorImpl},
    session::Session,
};

use super::{
    conversions::{convert, generalize, promote},
    symbol_table::{FunctionInfo, Symbol, SymbolId, SymbolTable},
};

/// State of one resolution pass over a translation unit.
///
/// Resolution annotates the tree in place: every node gets its scope depth
/// and owning function, expressions get their types, identifiers and calls
/// get their symbols, and conversions are spliced in wherever a value has to
/// change type.
pub struct TypeChecker<'a> {
    pub ast: &'a mut Ast,
    pub symbols: SymbolTable,
    pub session: &'a mut Session,
    /// Calls to functions that had no body when the call was resolved.
    pending_calls: Vec<(SymbolId, u32)>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(ast: &'a mut Ast, session: &'a mut Session) -> Self {
        TypeChecker {
            ast,
            symbols: SymbolTable::new(),
            session,
            pending_calls: vec![],
        }
    }

    fn annotate(&mut self, id: NodeId) {
        let function = self.ast.owning_function(id);
        let scope = self.symbols.depth();
        let node = self.ast.node_mut(id);
        node.scope = scope;
        node.function = function;
    }

    fn child(&self, id: NodeId, index: usize) -> Result<NodeId, Error> {
        self.ast.child(id, index).ok_or_else(|| {
            malformed(
                format!("missing child {} of {:?}", index, self.ast.kind(id)),
                self.ast.line(id),
            )
        })
    }

    fn type_of_child(&self, id: NodeId, index: usize) -> Result<Type, Error> {
        let type_node = self.child(id, index)?;
        type_of(&*self.ast, type_node)
            .ok_or_else(|| malformed(String::from("expected a type"), self.ast.line(type_node)))
    }

    fn expr_type(&self, id: NodeId) -> Result<Type, Error> {
        self.ast
            .ty(id)
            .cloned()
            .ok_or_else(|| malformed(String::from("expression left untyped"), self.ast.line(id)))
    }

    fn declare_builtins(&mut self) -> Result<(), Error> {
        for builtin in BUILTINS.iter() {
            let info = FunctionInfo {
                params: builtin.params.clone(),
                label: builtin.name.to_string(),
                builtin: true,
                variadic: builtin.variadic,
                defined: true,
            };
            self.symbols
                .declare(Symbol::function(builtin.name, builtin.return_type.clone(), info, None, 0))?;
        }
        Ok(())
    }
}

fn malformed(message: String, line: u32) -> Error {
    Error::new(ErrorImpl::MalformedTree { message }, line)
}

/// Resolves the whole tree and returns the symbol table it produced.
pub fn type_check(ast: &mut Ast, session: &mut Session) -> Result<SymbolTable, Error> {
    let Some(root) = ast.root() else {
        return Err(malformed(String::from("tree has no root"), 0));
    };

    let mut type_checker = TypeChecker::new(ast, session);
    type_check_file(&mut type_checker, root)?;

    Ok(type_checker.symbols)
}

fn type_check_file(type_checker: &mut TypeChecker, id: NodeId) -> Result<(), Error> {
    type_checker.symbols.enter_scope();
    type_checker.annotate(id);
    type_checker.declare_builtins()?;

    for child in type_checker.ast.children(id).to_vec() {
        type_check_stmt(type_checker, child)?;
    }

    for (symbol, line) in std::mem::take(&mut type_checker.pending_calls) {
        let symbol = type_checker.symbols.get(symbol);
        if symbol.function_info().is_some_and(|info| !info.defined) {
            return Err(Error::new(
                ErrorImpl::FunctionNotDefined {
                    name: symbol.name.clone(),
                },
                line,
            ));
        }
    }

    type_checker.symbols.leave_scope();
    Ok(())
}

pub fn type_check_stmt(type_checker: &mut TypeChecker, id: NodeId) -> Result<(), Error> {
    type_checker.annotate(id);

    match type_checker.ast.kind(id).clone() {
        NodeKind::Declaration { name, .. } => type_check_declaration(type_checker, id, &name),
        NodeKind::FunctionDeclaration { name, .. } => type_check_function(type_checker, id, &name),
        NodeKind::Block => {
            type_checker.symbols.enter_scope();
            for child in type_checker.ast.children(id).to_vec() {
                type_check_stmt(type_checker, child)?;
            }
            type_checker.symbols.leave_scope();
            Ok(())
        }
        NodeKind::ExprStatement => {
            let expr = type_checker.child(id, 0)?;
            type_check_expr(type_checker, expr)?;
            Ok(())
        }
        NodeKind::If { .. } => type_check_if(type_checker, id),
        NodeKind::While { .. } => type_check_while(type_checker, id),
        NodeKind::For { .. } => type_check_for(type_checker, id),
        NodeKind::Return => type_check_return(type_checker, id),
        NodeKind::Break { .. } => type_check_jump(type_checker, id, true),
        NodeKind::Continue { .. } => type_check_jump(type_checker, id, false),
        NodeKind::Nothing => Ok(()),
        other => Err(malformed(
            format!("{:?} is not a statement", other),
            type_checker.ast.line(id),
        )),
    }
}

fn type_check_declaration(type_checker: &mut TypeChecker, id: NodeId, name: &str) -> Result<(), Error> {
    let line = type_checker.ast.line(id);
    let type_node = type_checker.child(id, 0)?;
    let mut ty = type_checker.type_of_child(id, 0)?;

    if ty.is_void() || ty.element().is_some_and(|element| element.is_void()) {
        return Err(Error::new(ErrorImpl::VoidVariable { name: name.to_string() }, line));
    }

    let declared_size = match type_checker.ast.kind(type_node) {
        NodeKind::Type(TypeNode {
            kind: TypeNodeKind::Array { size },
            ..
        }) => Some(*size),
        _ => None,
    };
    let invalid_size = || Error::new(ErrorImpl::InvalidArraySize { name: name.to_string() }, line);

    if declared_size == Some(Some(0)) {
        return Err(invalid_size());
    }

    match type_checker.ast.child(id, 1) {
        Some(init) if *type_checker.ast.kind(init) == NodeKind::InitializerList => {
            let Some(element) = ty.element().cloned() else {
                return Err(Error::new(
                    ErrorImpl::ListInitializerForScalar { name: name.to_string() },
                    line,
                ));
            };

            type_checker.annotate(init);
            let items = type_checker.ast.children(init).to_vec();
            for item in items.iter() {
                let item = type_check_expr(type_checker, *item)?;
                convert(type_checker.ast, item, &element)?;
            }

            match declared_size {
                Some(None) if items.is_empty() => return Err(invalid_size()),
                Some(None) => ty = Type::array_of(element, items.len()).with_const(ty.constant),
                Some(Some(size)) if items.len() > size => {
                    return Err(Error::new(
                        ErrorImpl::InitializerTooLong {
                            name: name.to_string(),
                            size,
                        },
                        line,
                    ))
                }
                _ => {}
            }
            type_checker.ast.set_ty(init, ty.clone());
        }
        Some(init) => {
            if ty.is_array() {
                return Err(Error::new(
                    ErrorImpl::ScalarArrayInitializer { name: name.to_string() },
                    line,
                ));
            }
            let init = type_check_expr(type_checker, init)?;
            convert(type_checker.ast, init, &ty)?;
        }
        None if declared_size == Some(None) => return Err(invalid_size()),
        None => {}
    }

    type_checker.ast.set_ty(id, ty.clone());
    let frame = type_checker.ast.owning_function(id);
    let symbol = type_checker
        .symbols
        .declare(Symbol::variable(name, ty, id, frame, line))?;

    if let NodeKind::Declaration { symbol: slot, .. } = type_checker.ast.kind_mut(id) {
        *slot = Some(symbol);
    }
    Ok(())
}

/// Prototypes and definitions.
///
/// A definition matching an earlier prototype in the same scope completes it
/// and shares its label. Parameters and the body's top-level statements
/// share one scope.
fn type_check_function(type_checker: &mut TypeChecker, id: NodeId, name: &str) -> Result<(), Error> {
    let line = type_checker.ast.line(id);
    let return_type = type_checker.type_of_child(id, 0)?;

    let params_node = type_checker.child(id, 1)?;
    let params = type_checker.ast.children(params_node).to_vec();
    let mut param_types = vec![];
    for param in params.iter() {
        let NodeKind::FormalParameter { name: param_name, .. } = type_checker.ast.kind(*param).clone() else {
            return Err(malformed(String::from("expected a parameter"), type_checker.ast.line(*param)));
        };
        let ty = type_checker.type_of_child(*param, 0)?;
        if ty.is_void() {
            return Err(Error::new(
                ErrorImpl::VoidVariable { name: param_name },
                type_checker.ast.line(*param),
            ));
        }
        param_types.push(ty);
    }

    let body = type_checker.ast.child(id, 2);

    let symbol = match type_checker.symbols.lookup_current(name) {
        Some(existing) => {
            let previous = type_checker.symbols.get(existing);
            let already_declared = Error::new(
                ErrorImpl::SymbolAlreadyDeclared {
                    name: name.to_string(),
                    previous_line: previous.line,
                },
                line,
            );
            let Some(info) = previous.function_info() else {
                return Err(already_declared);
            };
            if previous.ty != return_type || info.params != param_types {
                return Err(Error::new(ErrorImpl::SignatureMismatch { name: name.to_string() }, line));
            }
            if body.is_some() && info.defined {
                return Err(already_declared);
            }

            if body.is_some() {
                if let Some(info) = type_checker.symbols.get_mut(existing).function_info_mut() {
                    info.defined = true;
                }
            }
            existing
        }
        None => {
            let info = FunctionInfo {
                params: param_types.clone(),
                label: type_checker.session.function_label(name),
                builtin: false,
                variadic: false,
                defined: body.is_some(),
            };
            let frame = type_checker.ast.owning_function(id);
            type_checker
                .symbols
                .declare(Symbol::function(name, return_type.clone(), info, frame, line))?
        }
    };

    if let NodeKind::FunctionDeclaration { symbol: slot, .. } = type_checker.ast.kind_mut(id) {
        *slot = Some(symbol);
    }
    type_checker.ast.set_ty(id, return_type);

    let Some(body) = body else {
        type_checker.annotate(params_node);
        return Ok(());
    };

    debug!("resolving body of '{}'", name);
    type_checker.symbols.enter_scope();
    type_checker.annotate(params_node);

    for (param, ty) in params.iter().zip(param_types) {
        type_checker.annotate(*param);
        let NodeKind::FormalParameter { name: param_name, .. } = type_checker.ast.kind(*param).clone() else {
            continue;
        };
        let param_line = type_checker.ast.line(*param);
        let symbol = type_checker.symbols.declare(Symbol::variable(
            &param_name,
            ty.clone(),
            *param,
            Some(id),
            param_line,
        ))?;

        type_checker.ast.set_ty(*param, ty);
        if let NodeKind::FormalParameter { symbol: slot, .. } = type_checker.ast.kind_mut(*param) {
            *slot = Some(symbol);
        }
    }

    type_checker.annotate(body);
    for statement in type_checker.ast.children(body).to_vec() {
        type_check_stmt(type_checker, statement)?;
    }

    type_checker.symbols.leave_scope();
    Ok(())
}

/// Resolves the condition in child slot `index` and converts it to int.
fn type_check_condition(type_checker: &mut TypeChecker, id: NodeId, index: usize) -> Result<(), Error> {
    let condition = type_checker.child(id, index)?;
    let condition = type_check_expr(type_checker, condition)?;
    convert(type_checker.ast, condition, &Type::int())?;
    Ok(())
}

fn type_check_if(type_checker: &mut TypeChecker, id: NodeId) -> Result<(), Error> {
    let else_target = type_checker.session.next_label();
    let end_target = type_checker.session.next_label();
    if let NodeKind::If { else_label, end_label } = type_checker.ast.kind_mut(id) {
        *else_label = Some(else_target);
        *end_label = Some(end_target);
    }

    type_check_condition(type_checker, id, 0)?;

    let then_branch = type_checker.child(id, 1)?;
    type_check_stmt(type_checker, then_branch)?;

    if let Some(else_branch) = type_checker.ast.child(id, 2) {
        type_check_stmt(type_checker, else_branch)?;
    }
    Ok(())
}

fn type_check_while(type_checker: &mut TypeChecker, id: NodeId) -> Result<(), Error> {
    let start_target = type_checker.session.next_label();
    let end_target = type_checker.session.next_label();
    if let NodeKind::While { start_label, end_label } = type_checker.ast.kind_mut(id) {
        *start_label = Some(start_target);
        *end_label = Some(end_target);
    }

    type_check_condition(type_checker, id, 0)?;

    let body = type_checker.child(id, 1)?;
    type_checker.symbols.enter_scope();
    type_check_stmt(type_checker, body)?;
    type_checker.symbols.leave_scope();
    Ok(())
}

fn type_check_for(type_checker: &mut TypeChecker, id: NodeId) -> Result<(), Error> {
    let start_target = type_checker.session.next_label();
    let continue_target = type_checker.session.next_label();
    let end_target = type_checker.session.next_label();
    if let NodeKind::For {
        start_label,
        continue_label,
        end_label,
    } = type_checker.ast.kind_mut(id)
    {
        *start_label = Some(start_target);
        *continue_label = Some(continue_target);
        *end_label = Some(end_target);
    }

    // The init declaration is visible to every clause and the body, but not
    // after the loop.
    type_checker.symbols.enter_scope();

    let init = type_checker.child(id, 0)?;
    type_check_stmt(type_checker, init)?;

    let condition = type_checker.child(id, 1)?;
    if *type_checker.ast.kind(condition) == NodeKind::Nothing {
        type_checker.annotate(condition);
    } else {
        type_check_condition(type_checker, id, 1)?;
    }

    let step = type_checker.child(id, 2)?;
    type_check_stmt(type_checker, step)?;

    let body = type_checker.child(id, 3)?;
    type_check_stmt(type_checker, body)?;

    type_checker.symbols.leave_scope();
    Ok(())
}

fn type_check_return(type_checker: &mut TypeChecker, id: NodeId) -> Result<(), Error> {
    let line = type_checker.ast.line(id);
    let Some(function) = type_checker.ast.owning_function(id) else {
        return Err(Error::new(ErrorImpl::ReturnOutsideFunction, line));
    };

    let NodeKind::FunctionDeclaration { name, .. } = type_checker.ast.kind(function).clone() else {
        return Err(malformed(String::from("return owner is not a function"), line));
    };
    let return_type = type_checker.expr_type(function)?;

    match type_checker.ast.child(id, 0) {
        Some(_) if return_type.is_void() => Err(Error::new(
            ErrorImpl::ReturnValueInVoidFunction { function: name },
            line,
        )),
        Some(value) => {
            let value = type_check_expr(type_checker, value)?;
            convert(type_checker.ast, value, &return_type.with_const(false))?;
            Ok(())
        }
        None if !return_type.is_void() => Err(Error::new(
            ErrorImpl::MissingReturnValue { function: name },
            line,
        )),
        None => Ok(()),
    }
}

/// Nearest loop around `id` within the same function.
fn enclosing_loop(ast: &Ast, id: NodeId) -> Option<NodeId> {
    let mut current = ast.parent(id);
    while let Some(node) = current {
        match ast.kind(node) {
            NodeKind::While { .. } | NodeKind::For { .. } => return Some(node),
            NodeKind::FunctionDeclaration { .. } => return None,
            _ => current = ast.parent(node),
        }
    }
    None
}

fn type_check_jump(type_checker: &mut TypeChecker, id: NodeId, is_break: bool) -> Result<(), Error> {
    let statement = if is_break { "break" } else { "continue" };
    let Some(target) = enclosing_loop(&*type_checker.ast, id) else {
        return Err(Error::new(
            ErrorImpl::JumpOutsideLoop {
                statement: statement.to_string(),
            },
            type_checker.ast.line(id),
        ));
    };

    let target_label = match (type_checker.ast.kind(target), is_break) {
        (NodeKind::While { end_label, .. }, true) | (NodeKind::For { end_label, .. }, true) => end_label.clone(),
        (NodeKind::While { start_label, .. }, false) => start_label.clone(),
        (NodeKind::For { continue_label, .. }, false) => continue_label.clone(),
        _ => None,
    };

    match type_checker.ast.kind_mut(id) {
        NodeKind::Break { label } | NodeKind::Continue { label } => *label = target_label,
        _ => {}
    }
    Ok(())
}

/// Resolves an expression subtree.
///
/// Returns the node occupying the expression's slot afterwards, which is a
/// `Conversion` when the expression carried manual casts.
pub fn type_check_expr(type_checker: &mut TypeChecker, id: NodeId) -> Result<NodeId, Error> {
    type_checker.annotate(id);
    let line = type_checker.ast.line(id);

    let ty = match type_checker.ast.kind(id).clone() {
        NodeKind::IntLiteral(_) => Type::int(),
        NodeKind::CharLiteral(_) => Type::char(),
        NodeKind::StringLiteral { .. } => Type::pointer_to(Type::char()),
        NodeKind::Identifier { name, .. } => type_check_identifier(type_checker, id, &name)?,
        NodeKind::Call { name, .. } => type_check_call(type_checker, id, &name)?,
        NodeKind::Binary(op) => type_check_binary(type_checker, id, op)?,
        NodeKind::Unary(op) => type_check_unary(type_checker, id, op)?,
        NodeKind::Subscript => type_check_subscript(type_checker, id)?,
        NodeKind::Conversion(conversion) => conversion.to,
        other => return Err(malformed(format!("{:?} is not an expression", other), line)),
    };
    type_checker.ast.set_ty(id, ty);

    let mut current = id;
    for cast in type_checker.ast.node(id).casts.clone() {
        current = convert(type_checker.ast, current, &cast)?;
    }
    Ok(current)
}

fn type_check_identifier(type_checker: &mut TypeChecker, id: NodeId, name: &str) -> Result<Type, Error> {
    let line = type_checker.ast.line(id);
    let Some(symbol_id) = type_checker.symbols.lookup(name) else {
        return Err(Error::new(ErrorImpl::SymbolNotDeclared { name: name.to_string() }, line));
    };

    let symbol = type_checker.symbols.get(symbol_id);
    if symbol.is_function() {
        return Err(Error::new(ErrorImpl::NotAVariable { name: name.to_string() }, line));
    }
    let ty = symbol.ty.clone();

    if let NodeKind::Identifier { symbol, .. } = type_checker.ast.kind_mut(id) {
        *symbol = Some(symbol_id);
    }
    Ok(ty)
}

fn type_check_call(type_checker: &mut TypeChecker, id: NodeId, name: &str) -> Result<Type, Error> {
    let line = type_checker.ast.line(id);
    let Some(symbol_id) = type_checker.symbols.lookup(name) else {
        return Err(Error::new(ErrorImpl::SymbolNotDeclared { name: name.to_string() }, line));
    };

    let symbol = type_checker.symbols.get(symbol_id);
    let Some(info) = symbol.function_info().cloned() else {
        return Err(Error::new(ErrorImpl::NotAFunction { name: name.to_string() }, line));
    };
    let return_type = symbol.ty.clone();

    let args = type_checker.ast.children(id).to_vec();
    let count_matches = if info.variadic {
        args.len() >= info.params.len()
    } else {
        args.len() == info.params.len()
    };
    if !count_matches {
        return Err(Error::new(
            ErrorImpl::ArgumentCountMismatch {
                function: name.to_string(),
                expected: info.params.len(),
                received: args.len(),
                variadic: info.variadic,
            },
            line,
        ));
    }

    for (index, arg) in args.into_iter().enumerate() {
        let arg = type_check_expr(type_checker, arg)?;
        match info.params.get(index) {
            Some(param) => {
                convert(type_checker.ast, arg, param)?;
            }
            None => {
                let ty = type_checker.expr_type(arg)?;
                if ty.is_array() {
                    convert(type_checker.ast, arg, &ty.decay())?;
                }
            }
        }
    }

    if !info.defined {
        type_checker.pending_calls.push((symbol_id, line));
    }
    if let NodeKind::Call { symbol, .. } = type_checker.ast.kind_mut(id) {
        *symbol = Some(symbol_id);
    }
    Ok(return_type)
}

/// Name used in diagnostics about an lvalue.
fn lvalue_name(ast: &Ast, id: NodeId) -> String {
    match ast.kind(id) {
        NodeKind::Identifier { name, .. } => name.clone(),
        NodeKind::Subscript | NodeKind::Unary(UnaryOp::Deref) => match ast.child(id, 0) {
            Some(inner) => lvalue_name(ast, inner),
            None => String::from("expression"),
        },
        _ => String::from("expression"),
    }
}

fn is_lvalue(ast: &Ast, id: NodeId) -> bool {
    matches!(
        ast.kind(id),
        NodeKind::Identifier { .. } | NodeKind::Subscript | NodeKind::Unary(UnaryOp::Deref)
    )
}

/// Checks that the resolved expression `target` can be written to.
fn check_writable(type_checker: &TypeChecker, target: NodeId) -> Result<Type, Error> {
    let line = type_checker.ast.line(target);
    if !is_lvalue(&*type_checker.ast, target) {
        return Err(Error::new(ErrorImpl::NotAssignable, line));
    }

    let ty = type_checker.expr_type(target)?;
    if ty.is_array() {
        return Err(Error::new(ErrorImpl::AssignToArray, line));
    }
    if ty.constant {
        return Err(Error::new(
            ErrorImpl::AssignToConstant {
                name: lvalue_name(&*type_checker.ast, target),
            },
            line,
        ));
    }
    Ok(ty)
}

fn type_check_binary(type_checker: &mut TypeChecker, id: NodeId, op: BinaryOp) -> Result<Type, Error> {
    let line = type_checker.ast.line(id);
    let left = type_checker.child(id, 0)?;
    let left = type_check_expr(type_checker, left)?;
    let right = type_checker.child(id, 1)?;
    let right = type_check_expr(type_checker, right)?;

    let left_type = type_checker.expr_type(left)?;
    let right_type = type_checker.expr_type(right)?;

    match op.category() {
        OperatorCategory::Assignment => {
            let target = check_writable(type_checker, left)?;
            convert(type_checker.ast, right, &target)?;
            Ok(target)
        }
        OperatorCategory::Logical => {
            convert(type_checker.ast, left, &Type::int())?;
            convert(type_checker.ast, right, &Type::int())?;
            Ok(Type::int())
        }
        OperatorCategory::Arithmetic if op == BinaryOp::Mod => {
            for operand in [&left_type, &right_type] {
                if !operand.is_integral() {
                    return Err(Error::new(
                        ErrorImpl::InvalidOperand {
                            operator: op.symbol().to_string(),
                            operand: operand.to_string(),
                        },
                        line,
                    ));
                }
            }
            convert(type_checker.ast, left, &Type::int())?;
            convert(type_checker.ast, right, &Type::int())?;
            Ok(Type::int())
        }
        OperatorCategory::Arithmetic | OperatorCategory::Comparison => {
            let Some(common) = generalize(&left_type, &right_type) else {
                return Err(Error::new(
                    ErrorImpl::NoCommonType {
                        operator: op.symbol().to_string(),
                        left: left_type.to_string(),
                        right: right_type.to_string(),
                    },
                    line,
                ));
            };
            promote(type_checker.ast, left, &common)?;
            promote(type_checker.ast, right, &common)?;

            if op.category() == OperatorCategory::Comparison {
                Ok(Type::int())
            } else {
                Ok(common)
            }
        }
    }
}

fn type_check_unary(type_checker: &mut TypeChecker, id: NodeId, op: UnaryOp) -> Result<Type, Error> {
    let line = type_checker.ast.line(id);
    let operand = type_checker.child(id, 0)?;
    let operand = type_check_expr(type_checker, operand)?;
    let operand_type = type_checker.expr_type(operand)?;

    let invalid_operand = |ty: &Type| {
        Error::new(
            ErrorImpl::InvalidOperand {
                operator: op.symbol().to_string(),
                operand: ty.to_string(),
            },
            line,
        )
    };

    match op {
        UnaryOp::Negate => {
            if !operand_type.is_integral() {
                return Err(invalid_operand(&operand_type));
            }
            Ok(operand_type.with_const(false))
        }
        UnaryOp::Not => {
            convert(type_checker.ast, operand, &Type::int())?;
            Ok(Type::int())
        }
        UnaryOp::Deref => {
            let decayed = operand_type.decay();
            let TypeKind::Pointer(pointee) = &decayed.kind else {
                return Err(Error::new(
                    ErrorImpl::DereferenceNonPointer {
                        ty: operand_type.to_string(),
                    },
                    line,
                ));
            };
            let pointee = (**pointee).clone();
            convert(type_checker.ast, operand, &decayed)?;
            Ok(pointee)
        }
        UnaryOp::AddressOf => {
            if !is_lvalue(&*type_checker.ast, operand) {
                return Err(Error::new(ErrorImpl::NotAssignable, line));
            }
            match operand_type.element() {
                Some(element) => Ok(Type::pointer_to(element.clone())),
                None => Ok(Type::pointer_to(operand_type)),
            }
        }
        UnaryOp::PreIncrement | UnaryOp::PreDecrement | UnaryOp::PostIncrement | UnaryOp::PostDecrement => {
            if !operand_type.is_scalar() && !operand_type.is_array() {
                return Err(invalid_operand(&operand_type));
            }
            let ty = check_writable(type_checker, operand)?;
            Ok(ty)
        }
    }
}

fn type_check_subscript(type_checker: &mut TypeChecker, id: NodeId) -> Result<Type, Error> {
    let line = type_checker.ast.line(id);
    let base = type_checker.child(id, 0)?;
    let base = type_check_expr(type_checker, base)?;

    let NodeKind::Identifier { name, .. } = type_checker.ast.kind(base).clone() else {
        return Err(Error::new(
            ErrorImpl::NotAnArray {
                name: lvalue_name(&*type_checker.ast, base),
            },
            line,
        ));
    };

    let base_type = type_checker.expr_type(base)?;
    let (element, size) = match &base_type.kind {
        TypeKind::Array(element, size) => ((**element).clone(), Some(*size)),
        TypeKind::Pointer(pointee) => ((**pointee).clone(), None),
        _ => return Err(Error::new(ErrorImpl::NotAnArray { name }, line)),
    };

    let index = type_checker.child(id, 1)?;
    let index = type_check_expr(type_checker, index)?;
    let index_type = type_checker.expr_type(index)?;
    if !index_type.is_integral() {
        return Err(Error::new(
            ErrorImpl::IndexNotInteger {
                ty: index_type.to_string(),
            },
            line,
        ));
    }

    if let (Some(value), Some(size)) = (constant_value(&*type_checker.ast, index), size) {
        if value < 0 || value as usize >= size {
            return Err(Error::new(ErrorImpl::IndexOutOfRange { index: value, size }, line));
        }
    }

    convert(type_checker.ast, index, &Type::int())?;
    Ok(element)
}

/// Value of an integer literal, possibly negated.
fn constant_value(ast: &Ast, id: NodeId) -> Option<i64> {
    match ast.kind(id) {
        NodeKind::IntLiteral(value) => Some(*value),
        NodeKind::Unary(UnaryOp::Negate) => constant_value(ast, ast.child(id, 0)?).and_then(i64::checked_neg),
        _ => None,
    }
}
