//! Missing-return analysis.
//!
//! Conservative: only `return`, blocks containing one, and `if`/`else` with
//! both branches returning count. Loops never do.

use crate::{
    ast::ast::{Ast, NodeId, NodeKind},
    errors::errors::WarningImpl,
    session::Session,
};

/// Whether every path through `id` ends in a `return`.
pub fn guarantees_return(ast: &Ast, id: NodeId) -> bool {
    match ast.kind(id) {
        NodeKind::Return => true,
        NodeKind::Block => ast.children(id).iter().any(|child| guarantees_return(ast, *child)),
        NodeKind::If { .. } => match (ast.child(id, 1), ast.child(id, 2)) {
            (Some(then_branch), Some(else_branch)) => {
                guarantees_return(ast, then_branch) && guarantees_return(ast, else_branch)
            }
            _ => false,
        },
        _ => false,
    }
}

/// Warns about every defined non-void function whose body can fall off its
/// end. Functions are visited in source order, nested ones included.
pub fn check_returns(ast: &Ast, session: &mut Session) {
    let Some(root) = ast.root() else {
        return;
    };

    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if let NodeKind::FunctionDeclaration { name, .. } = ast.kind(id) {
            let returns_value = ast.ty(id).is_some_and(|ty| !ty.is_void());
            if let Some(body) = ast.child(id, 2) {
                if returns_value && !guarantees_return(ast, body) {
                    session.warn(
                        WarningImpl::MissingReturn {
                            function: name.clone(),
                        },
                        ast.line(id),
                    );
                }
            }
        }

        stack.extend(ast.children(id).iter().rev());
    }
}
