//! Implicit and explicit conversions between types.
//!
//! The table below is the single source of truth for which conversions
//! exist and which instruction, if any, performs them at run time.
//! `convert` splices a `Conversion` node above an expression;
//! `generalize` picks the common type of two operands and `promote` brings
//! an operand to it.

use std::{cmp::Ordering, collections::HashMap};

use lazy_static::lazy_static;

use crate::{
    ast::{
        ast::{Ast, Conversion, NodeId, NodeKind},
        types::{Type, TypeClass},
    },
    errors::errors::{Error, ErrorImpl},
};

lazy_static! {
    static ref CONVERSIONS: HashMap<(TypeClass, TypeClass), Option<&'static str>> = HashMap::from([
        ((TypeClass::Char, TypeClass::Int), Some("conv c i")),
        ((TypeClass::Int, TypeClass::Char), Some("conv i c")),
        ((TypeClass::Int, TypeClass::Pointer), Some("conv i a")),
        ((TypeClass::Pointer, TypeClass::Int), Some("conv a i")),
        ((TypeClass::Pointer, TypeClass::Pointer), None),
        // An array value is already its base address.
        ((TypeClass::Array, TypeClass::Pointer), None),
    ]);
}

/// Looks up the conversion from `from` to `to`.
///
/// Returns `None` when no conversion exists, `Some(None)` when one exists
/// but needs no instruction.
pub fn lookup_conversion(from: &Type, to: &Type) -> Option<Option<&'static str>> {
    if from == to {
        return Some(None);
    }
    CONVERSIONS.get(&(from.class(), to.class())).copied()
}

fn rank(ty: &Type) -> Option<u8> {
    match ty.class() {
        TypeClass::Char => Some(0),
        TypeClass::Int => Some(1),
        TypeClass::Pointer => Some(2),
        TypeClass::Void | TypeClass::Array => None,
    }
}

/// Char has no direct conversion to a pointer; it widens to int first.
fn widens_through_int(from: &Type, to: &Type) -> bool {
    from.class() == TypeClass::Char && to.class() == TypeClass::Pointer
}

fn promotes_to(from: &Type, to: &Type) -> bool {
    lookup_conversion(from, to).is_some() || widens_through_int(from, to)
}

/// Common type of two operands on the lattice char < int < pointer: the
/// higher-ranked of the two after array decay. Two different pointer types
/// have none.
pub fn generalize(left: &Type, right: &Type) -> Option<Type> {
    let left = left.decay();
    let right = right.decay();

    let common = match rank(&left)?.cmp(&rank(&right)?) {
        Ordering::Greater => left.clone(),
        Ordering::Less => right.clone(),
        Ordering::Equal if left == right => left.clone(),
        // Distinct pointer types.
        Ordering::Equal => return None,
    };
    if !promotes_to(&left, &common) || !promotes_to(&right, &common) {
        return None;
    }

    Some(common.with_const(false))
}

/// Converts an operand to the common type picked by `generalize`.
///
/// A char operand of a pointer operation gets two conversions, to int and
/// then to the pointer.
pub fn promote(ast: &mut Ast, expr: NodeId, common: &Type) -> Result<NodeId, Error> {
    if ast.ty(expr).is_some_and(|from| widens_through_int(from, common)) {
        let widened = convert(ast, expr, &Type::int())?;
        return convert(ast, widened, common);
    }
    convert(ast, expr, common)
}

/// Makes the value of `expr` have type `target`.
///
/// Returns the node now holding `expr`'s slot: `expr` itself when the types
/// already agree, otherwise a new `Conversion` wrapping it.
pub fn convert(ast: &mut Ast, expr: NodeId, target: &Type) -> Result<NodeId, Error> {
    let line = ast.line(expr);
    let Some(from) = ast.ty(expr).cloned() else {
        return Err(Error::new(
            ErrorImpl::MalformedTree {
                message: String::from("converting an untyped expression"),
            },
            line,
        ));
    };

    if from == *target {
        return Ok(expr);
    }

    let Some(instruction) = lookup_conversion(&from, target) else {
        return Err(Error::new(
            ErrorImpl::NoConversion {
                from: from.to_string(),
                to: target.to_string(),
            },
            line,
        ));
    };

    let wrapper = ast.wrap(
        expr,
        NodeKind::Conversion(Conversion {
            from,
            to: target.clone(),
            instruction,
        }),
    );
    ast.set_ty(wrapper, target.clone());

    Ok(wrapper)
}
