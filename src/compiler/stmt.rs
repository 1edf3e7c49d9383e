use crate::{
    ast::ast::{NodeId, NodeKind},
    errors::errors::Error,
    MK_INSTR,
};

use super::{
    compiler::{malformed, Compiler},
    expr::{gen_discarded, gen_expression},
};

fn resolved_label(label: Option<String>, line: u32) -> Result<String, Error> {
    label.ok_or_else(|| malformed("jump target was never assigned", line))
}

/// Evaluates the int condition in child slot `index` and jumps to `target`
/// when it is zero.
fn gen_condition_jump(compiler: &mut Compiler, id: NodeId, index: usize, target: &str) -> Result<(), Error> {
    let condition = compiler.child(id, index)?;
    gen_expression(compiler, condition)?;
    compiler.emit(MK_INSTR!("conv", "i", "b"));
    compiler.emit(MK_INSTR!("fjp", target));
    Ok(())
}

pub fn gen_statement(compiler: &mut Compiler, id: NodeId) -> Result<(), Error> {
    let line = compiler.ast.line(id);

    match compiler.ast.kind(id).clone() {
        NodeKind::Declaration { .. } => gen_declaration(compiler, id)?,
        // Emitted after the program wrapper, not inline.
        NodeKind::FunctionDeclaration { .. } => {}
        NodeKind::Block => {
            for child in compiler.ast.children(id).to_vec() {
                gen_statement(compiler, child)?;
            }
        }
        NodeKind::ExprStatement => {
            let expr = compiler.child(id, 0)?;
            gen_discarded(compiler, expr)?;
        }
        NodeKind::If { else_label, end_label } => {
            let else_label = resolved_label(else_label, line)?;
            let end_label = resolved_label(end_label, line)?;
            let else_branch = compiler.ast.child(id, 2);

            let skip_target = if else_branch.is_some() { &else_label } else { &end_label };
            gen_condition_jump(compiler, id, 0, skip_target)?;

            let then_branch = compiler.child(id, 1)?;
            gen_statement(compiler, then_branch)?;

            if let Some(else_branch) = else_branch {
                compiler.emit(MK_INSTR!("ujp", end_label));
                compiler.emit_label(&else_label);
                gen_statement(compiler, else_branch)?;
            }
            compiler.emit_label(&end_label);
        }
        NodeKind::While { start_label, end_label } => {
            let start_label = resolved_label(start_label, line)?;
            let end_label = resolved_label(end_label, line)?;

            compiler.emit_label(&start_label);
            gen_condition_jump(compiler, id, 0, &end_label)?;

            let body = compiler.child(id, 1)?;
            gen_statement(compiler, body)?;

            compiler.emit(MK_INSTR!("ujp", start_label));
            compiler.emit_label(&end_label);
        }
        NodeKind::For {
            start_label,
            continue_label,
            end_label,
        } => {
            let start_label = resolved_label(start_label, line)?;
            let continue_label = resolved_label(continue_label, line)?;
            let end_label = resolved_label(end_label, line)?;

            let init = compiler.child(id, 0)?;
            gen_statement(compiler, init)?;

            compiler.emit_label(&start_label);
            let condition = compiler.child(id, 1)?;
            if *compiler.ast.kind(condition) != NodeKind::Nothing {
                gen_condition_jump(compiler, id, 1, &end_label)?;
            }

            let body = compiler.child(id, 3)?;
            gen_statement(compiler, body)?;

            compiler.emit_label(&continue_label);
            let step = compiler.child(id, 2)?;
            gen_statement(compiler, step)?;

            compiler.emit(MK_INSTR!("ujp", start_label));
            compiler.emit_label(&end_label);
        }
        NodeKind::Return => match compiler.ast.child(id, 0) {
            Some(value) => {
                gen_expression(compiler, value)?;
                let ty = compiler.node_type(value)?;
                let ptype = compiler.ptype(&ty, line);
                compiler.emit(MK_INSTR!("str", ptype, 0, 0));
                compiler.emit(MK_INSTR!("retf"));
            }
            None => compiler.emit(MK_INSTR!("retp")),
        },
        NodeKind::Break { label } | NodeKind::Continue { label } => {
            let label = resolved_label(label, line)?;
            compiler.emit(MK_INSTR!("ujp", label));
        }
        NodeKind::Nothing => {}
        other => return Err(malformed(&format!("{:?} is not a statement", other), line)),
    }

    Ok(())
}

/// Stores the initializer, if any, into the variable's slots. Variables
/// always live in the frame of the code declaring them.
fn gen_declaration(compiler: &mut Compiler, id: NodeId) -> Result<(), Error> {
    let line = compiler.ast.line(id);
    let Some(init) = compiler.ast.child(id, 1) else {
        return Ok(());
    };

    let symbol = compiler.symbol_of(id)?;
    let offset = compiler.offset_of(symbol, line)?;
    let ty = compiler.symbols.get(symbol).ty.clone();

    if *compiler.ast.kind(init) == NodeKind::InitializerList {
        let element = ty
            .element()
            .cloned()
            .ok_or_else(|| malformed("initializer list for a scalar", line))?;
        let ptype = compiler.ptype(&element, line);

        for (index, item) in compiler.ast.children(init).to_vec().into_iter().enumerate() {
            gen_expression(compiler, item)?;
            compiler.emit(MK_INSTR!("str", ptype, 0, offset + index * element.slots()));
        }
        return Ok(());
    }

    gen_expression(compiler, init)?;
    let ptype = compiler.ptype(&ty, line);
    compiler.emit(MK_INSTR!("str", ptype, 0, offset));
    Ok(())
}
