use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        operators::{BinaryOp, OperatorCategory, UnaryOp},
    },
    errors::errors::{Error, ErrorImpl},
    MK_INSTR,
};

use super::{
    compiler::{char_operand, malformed, Compiler},
    instruction::Instruction,
};

/// Emits code leaving the value of expression `id` on the stack.
///
/// Calls of void functions leave nothing.
pub fn gen_expression(compiler: &mut Compiler, id: NodeId) -> Result<(), Error> {
    let line = compiler.ast.line(id);

    match compiler.ast.kind(id).clone() {
        NodeKind::IntLiteral(value) => compiler.emit(MK_INSTR!("ldc", "i", value)),
        NodeKind::CharLiteral(value) => compiler.emit(MK_INSTR!("ldc", "c", char_operand(value))),
        NodeKind::StringLiteral { pool_offset, .. } => {
            let offset = pool_offset.ok_or_else(|| malformed("string outside the pool", line))?;
            let depth = compiler.depth_to_file(id);
            compiler.emit(MK_INSTR!("lda", depth, offset));
        }
        NodeKind::Identifier { .. } => {
            let symbol = compiler.symbol_of(id)?;
            let depth = compiler.depth_to_symbol(id, symbol);
            let offset = compiler.offset_of(symbol, line)?;
            let ty = compiler.node_type(id)?;

            // An array's value is its base address.
            if ty.is_array() {
                compiler.emit(MK_INSTR!("lda", depth, offset));
            } else {
                let ptype = compiler.ptype(&ty, line);
                compiler.emit(MK_INSTR!("lod", ptype, depth, offset));
            }
        }
        NodeKind::Call { .. } => gen_call(compiler, id)?,
        NodeKind::Binary(op) => gen_binary(compiler, id, op)?,
        NodeKind::Unary(op) => gen_unary(compiler, id, op)?,
        NodeKind::Subscript => {
            gen_address(compiler, id)?;
            let ty = compiler.node_type(id)?;
            let ptype = compiler.ptype(&ty, line);
            compiler.emit(MK_INSTR!("ind", ptype));
        }
        NodeKind::Conversion(conversion) => {
            let operand = compiler.child(id, 0)?;
            gen_expression(compiler, operand)?;
            if let Some(instruction) = conversion.instruction.and_then(Instruction::parse) {
                compiler.emit(instruction);
            }
        }
        other => return Err(malformed(&format!("{:?} is not an expression", other), line)),
    }

    Ok(())
}

/// Emits code for an expression statement: the value, if any, is dropped
/// into slot 0 so the stack ends where it started.
pub fn gen_discarded(compiler: &mut Compiler, id: NodeId) -> Result<(), Error> {
    match compiler.ast.kind(id).clone() {
        NodeKind::Binary(BinaryOp::Assign) => gen_assignment(compiler, id, false),
        NodeKind::Unary(op) if op.is_step() => gen_step(compiler, id, op, false),
        _ => {
            gen_expression(compiler, id)?;
            let ty = compiler.node_type(id)?;
            if !ty.is_void() {
                let line = compiler.ast.line(id);
                let ptype = compiler.ptype(&ty.decay(), line);
                compiler.emit(MK_INSTR!("str", ptype, 0, 0));
            }
            Ok(())
        }
    }
}

/// Emits code leaving the address of the lvalue `id` on the stack.
pub fn gen_address(compiler: &mut Compiler, id: NodeId) -> Result<(), Error> {
    let line = compiler.ast.line(id);

    match compiler.ast.kind(id) {
        NodeKind::Identifier { .. } => {
            let symbol = compiler.symbol_of(id)?;
            let depth = compiler.depth_to_symbol(id, symbol);
            let offset = compiler.offset_of(symbol, line)?;
            compiler.emit(MK_INSTR!("lda", depth, offset));
        }
        NodeKind::Subscript => {
            let base = compiler.child(id, 0)?;
            let index = compiler.child(id, 1)?;
            let element = compiler.node_type(id)?;

            // Base address (arrays) or pointer value, then the scaled index.
            gen_expression(compiler, base)?;
            gen_expression(compiler, index)?;
            compiler.emit(MK_INSTR!("ixa", element.slots()));
        }
        NodeKind::Unary(UnaryOp::Deref) => {
            let pointer = compiler.child(id, 0)?;
            gen_expression(compiler, pointer)?;
        }
        _ => return Err(Error::new(ErrorImpl::NotAssignable, line)),
    }

    Ok(())
}

fn gen_call(compiler: &mut Compiler, id: NodeId) -> Result<(), Error> {
    let symbol_id = compiler.symbol_of(id)?;
    let symbol = compiler.symbols.get(symbol_id).clone();
    let Some(info) = symbol.function_info() else {
        return Err(Error::new(
            ErrorImpl::NotAFunction {
                name: symbol.name.clone(),
            },
            compiler.ast.line(id),
        ));
    };

    let depth = compiler.depth_to_symbol(id, symbol_id);
    let args = compiler.ast.children(id).to_vec();

    compiler.emit(MK_INSTR!("mst", depth));
    if info.variadic {
        compiler.emit(MK_INSTR!("ldc", "i", args.len()));
    }
    for arg in args.iter() {
        gen_expression(compiler, *arg)?;
    }

    let parameter_slots = args.len() + usize::from(info.variadic);
    compiler.emit(MK_INSTR!("cup", parameter_slots, info.label));

    if info.builtin {
        compiler.use_builtin(&symbol.name);
    }
    Ok(())
}

fn gen_binary(compiler: &mut Compiler, id: NodeId, op: BinaryOp) -> Result<(), Error> {
    let line = compiler.ast.line(id);
    let left = compiler.child(id, 0)?;
    let right = compiler.child(id, 1)?;

    match op.category() {
        OperatorCategory::Assignment => return gen_assignment(compiler, id, true),
        OperatorCategory::Arithmetic if op == BinaryOp::Mod => {
            let depth = compiler.depth_to_file(id);
            compiler.emit(MK_INSTR!("mst", depth));
            gen_expression(compiler, left)?;
            gen_expression(compiler, right)?;
            compiler.emit(MK_INSTR!("cup", 2, "mod"));
            compiler.use_builtin("mod");
            return Ok(());
        }
        OperatorCategory::Logical => {
            gen_expression(compiler, left)?;
            compiler.emit(MK_INSTR!("conv", "i", "b"));
            gen_expression(compiler, right)?;
            compiler.emit(MK_INSTR!("conv", "i", "b"));
            compiler.emit(MK_INSTR!(op.mnemonic().unwrap_or("and")));
            compiler.emit(MK_INSTR!("conv", "b", "i"));
            return Ok(());
        }
        OperatorCategory::Arithmetic | OperatorCategory::Comparison => {}
    }

    let Some(mnemonic) = op.mnemonic() else {
        return Err(malformed(&format!("no instruction for '{}'", op), line));
    };

    gen_expression(compiler, left)?;
    gen_expression(compiler, right)?;

    if op.category() == OperatorCategory::Comparison {
        let operand_type = compiler.node_type(left)?;
        let ptype = compiler.ptype(&operand_type, line);
        compiler.emit(MK_INSTR!(mnemonic, ptype));
        compiler.emit(MK_INSTR!("conv", "b", "i"));
    } else {
        let result_type = compiler.node_type(id)?;
        let ptype = compiler.ptype(&result_type, line);
        compiler.emit(MK_INSTR!(mnemonic, ptype));
    }
    Ok(())
}

fn gen_unary(compiler: &mut Compiler, id: NodeId, op: UnaryOp) -> Result<(), Error> {
    let line = compiler.ast.line(id);
    let operand = compiler.child(id, 0)?;

    match op {
        UnaryOp::Negate => {
            gen_expression(compiler, operand)?;
            let ty = compiler.node_type(id)?;
            let ptype = compiler.ptype(&ty, line);
            compiler.emit(MK_INSTR!("neg", ptype));
        }
        UnaryOp::Not => {
            gen_expression(compiler, operand)?;
            compiler.emit(MK_INSTR!("conv", "i", "b"));
            compiler.emit(MK_INSTR!("not"));
            compiler.emit(MK_INSTR!("conv", "b", "i"));
        }
        UnaryOp::Deref => {
            gen_expression(compiler, operand)?;
            let ty = compiler.node_type(id)?;
            let ptype = compiler.ptype(&ty, line);
            compiler.emit(MK_INSTR!("ind", ptype));
        }
        UnaryOp::AddressOf => gen_address(compiler, operand)?,
        UnaryOp::PreIncrement | UnaryOp::PreDecrement | UnaryOp::PostIncrement | UnaryOp::PostDecrement => {
            gen_step(compiler, id, op, true)?
        }
    }

    Ok(())
}

/// `target = value`. With `keep_value` the assigned value is left on the
/// stack.
fn gen_assignment(compiler: &mut Compiler, id: NodeId, keep_value: bool) -> Result<(), Error> {
    let line = compiler.ast.line(id);
    let target = compiler.child(id, 0)?;
    let value = compiler.child(id, 1)?;
    let ty = compiler.node_type(target)?;
    let ptype = compiler.ptype(&ty, line);

    if let NodeKind::Identifier { .. } = compiler.ast.kind(target) {
        let symbol = compiler.symbol_of(target)?;
        let depth = compiler.depth_to_symbol(target, symbol);
        let offset = compiler.offset_of(symbol, line)?;

        gen_expression(compiler, value)?;
        compiler.emit(MK_INSTR!("str", ptype, depth, offset));
        if keep_value {
            compiler.emit(MK_INSTR!("lod", ptype, depth, offset));
        }
        return Ok(());
    }

    gen_address(compiler, target)?;
    gen_expression(compiler, value)?;
    if keep_value {
        // Nothing is evaluated between parking the value and reloading it.
        let scratch = compiler.scratch_slot(id)?;
        compiler.emit(MK_INSTR!("str", ptype, 0, scratch));
        compiler.emit(MK_INSTR!("lod", ptype, 0, scratch));
        compiler.emit(MK_INSTR!("sto", ptype));
        compiler.emit(MK_INSTR!("lod", ptype, 0, scratch));
    } else {
        compiler.emit(MK_INSTR!("sto", ptype));
    }
    Ok(())
}

/// `++` and `--` in prefix and postfix form. With `keep_value` the new
/// (prefix) or old (postfix) value is left on the stack.
fn gen_step(compiler: &mut Compiler, id: NodeId, op: UnaryOp, keep_value: bool) -> Result<(), Error> {
    let line = compiler.ast.line(id);
    let target = compiler.child(id, 0)?;
    let ty = compiler.node_type(target)?;
    let ptype = compiler.ptype(&ty, line);

    let step = match op {
        UnaryOp::PreIncrement | UnaryOp::PostIncrement => "inc",
        _ => "dec",
    };
    let postfix = matches!(op, UnaryOp::PostIncrement | UnaryOp::PostDecrement);

    if let NodeKind::Identifier { .. } = compiler.ast.kind(target) {
        let symbol = compiler.symbol_of(target)?;
        let depth = compiler.depth_to_symbol(target, symbol);
        let offset = compiler.offset_of(symbol, line)?;

        if keep_value && postfix {
            compiler.emit(MK_INSTR!("lod", ptype, depth, offset));
        }
        compiler.emit(MK_INSTR!("lod", ptype, depth, offset));
        compiler.emit(MK_INSTR!(step, ptype, 1));
        compiler.emit(MK_INSTR!("str", ptype, depth, offset));
        if keep_value && !postfix {
            compiler.emit(MK_INSTR!("lod", ptype, depth, offset));
        }
        return Ok(());
    }

    // The address is computed once; side effects inside it run once.
    let scratch = compiler.scratch_slot(id)?;
    gen_address(compiler, target)?;
    compiler.emit(MK_INSTR!("str", "a", 0, scratch));

    if keep_value && postfix {
        compiler.emit(MK_INSTR!("lod", "a", 0, scratch));
        compiler.emit(MK_INSTR!("ind", ptype));
    }
    compiler.emit(MK_INSTR!("lod", "a", 0, scratch));
    compiler.emit(MK_INSTR!("lod", "a", 0, scratch));
    compiler.emit(MK_INSTR!("ind", ptype));
    compiler.emit(MK_INSTR!(step, ptype, 1));
    compiler.emit(MK_INSTR!("sto", ptype));
    if keep_value && !postfix {
        compiler.emit(MK_INSTR!("lod", "a", 0, scratch));
        compiler.emit(MK_INSTR!("ind", ptype));
    }
    Ok(())
}
