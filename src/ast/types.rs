//! Type system definitions for the AST.
//!
//! Type specifiers are parsed into small node subtrees (see `TypeNode`);
//! the resolver lowers them into `Type` values. Equality of `Type` is
//! structural and ignores the `const` qualifier, so `const int == int`.

use std::fmt::Display;

use super::ast::{Ast, NodeId, NodeKind, TypeNodeKind};

#[derive(Debug, Clone, Eq)]
pub struct Type {
    pub kind: TypeKind,
    pub constant: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Void,
    Char,
    Int,
    Pointer(Box<Type>),
    Array(Box<Type>, usize),
}

/// Coarse classification used to key the conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Void,
    Char,
    Int,
    Pointer,
    Array,
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Type {
    pub fn new(kind: TypeKind) -> Self {
        Type {
            kind,
            constant: false,
        }
    }

    pub fn int() -> Self {
        Type::new(TypeKind::Int)
    }

    pub fn char() -> Self {
        Type::new(TypeKind::Char)
    }

    pub fn void() -> Self {
        Type::new(TypeKind::Void)
    }

    pub fn pointer_to(pointee: Type) -> Self {
        Type::new(TypeKind::Pointer(Box::new(pointee)))
    }

    pub fn array_of(element: Type, size: usize) -> Self {
        Type::new(TypeKind::Array(Box::new(element), size))
    }

    pub fn with_const(mut self, constant: bool) -> Self {
        self.constant = constant;
        self
    }

    pub fn class(&self) -> TypeClass {
        match self.kind {
            TypeKind::Void => TypeClass::Void,
            TypeKind::Char => TypeClass::Char,
            TypeKind::Int => TypeClass::Int,
            TypeKind::Pointer(_) => TypeClass::Pointer,
            TypeKind::Array(_, _) => TypeClass::Array,
        }
    }

    pub fn is_void(&self) -> bool {
        self.kind == TypeKind::Void
    }

    pub fn is_integral(&self) -> bool {
        matches!(self.kind, TypeKind::Int | TypeKind::Char)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.kind, TypeKind::Pointer(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array(_, _))
    }

    /// Int, char and pointers: the types with a promotion rank.
    pub fn is_scalar(&self) -> bool {
        self.is_integral() || self.is_pointer()
    }

    pub fn pointee(&self) -> Option<&Type> {
        match &self.kind {
            TypeKind::Pointer(pointee) => Some(pointee),
            _ => None,
        }
    }

    pub fn element(&self) -> Option<&Type> {
        match &self.kind {
            TypeKind::Array(element, _) => Some(element),
            _ => None,
        }
    }

    pub fn array_size(&self) -> Option<usize> {
        match &self.kind {
            TypeKind::Array(_, size) => Some(*size),
            _ => None,
        }
    }

    /// Arrays used as values behave like a pointer to their first element.
    pub fn decay(&self) -> Type {
        match &self.kind {
            TypeKind::Array(element, _) => Type::pointer_to((**element).clone()),
            _ => self.clone(),
        }
    }

    /// Number of frame slots a variable of this type occupies.
    pub fn slots(&self) -> usize {
        match &self.kind {
            TypeKind::Array(element, size) => element.slots() * size,
            _ => 1,
        }
    }

    /// The P-machine operand tag of the type, if it has one.
    pub fn ptype(&self) -> Option<&'static str> {
        match self.kind {
            TypeKind::Int => Some("i"),
            TypeKind::Char => Some("c"),
            TypeKind::Pointer(_) => Some("a"),
            TypeKind::Void | TypeKind::Array(_, _) => None,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.constant {
            write!(f, "const ")?;
        }
        match &self.kind {
            TypeKind::Void => write!(f, "void"),
            TypeKind::Char => write!(f, "char"),
            TypeKind::Int => write!(f, "int"),
            TypeKind::Pointer(pointee) => write!(f, "{}*", pointee),
            TypeKind::Array(element, size) => write!(f, "{}[{}]", element, size),
        }
    }
}

/// Lowers a type node subtree into a `Type`.
///
/// Arrays declared without a size get size 0 here; the resolver fills in
/// the length of their initializer list.
pub fn type_of(ast: &Ast, id: NodeId) -> Option<Type> {
    let NodeKind::Type(type_node) = &ast.node(id).kind else {
        return None;
    };

    let ty = match type_node.kind {
        TypeNodeKind::Int => Type::int(),
        TypeNodeKind::Char => Type::char(),
        TypeNodeKind::Void => Type::void(),
        TypeNodeKind::Pointer => Type::pointer_to(type_of(ast, *ast.children(id).first()?)?),
        TypeNodeKind::Array { size } => {
            Type::array_of(type_of(ast, *ast.children(id).first()?)?, size.unwrap_or(0))
        }
    };

    Some(ty.with_const(type_node.constant))
}
