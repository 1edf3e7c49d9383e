use std::fmt::Write;

use crate::type_checker::symbol_table::SymbolId;

use super::{
    operators::{BinaryOp, UnaryOp},
    types::Type,
};

/// Handle of a node in the `Ast` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Node Kinds
///
/// Children layouts are fixed per kind:
/// - `Declaration`: type, optional initializer
/// - `FunctionDeclaration`: return type, `FormalParameters`, optional `Block`
/// - `FormalParameter`: type
/// - `Binary`: left, right; `Unary` and `Conversion`: operand
/// - `Subscript`: array identifier, index
/// - `If`: condition, then, optional else; `While`: condition, body
/// - `For`: init, condition, step, body (absent clauses are `Nothing`)
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    File,
    Type(TypeNode),
    IntLiteral(i64),
    CharLiteral(char),
    StringLiteral {
        value: String,
        pool_offset: Option<usize>,
    },
    Identifier {
        name: String,
        symbol: Option<SymbolId>,
    },
    Declaration {
        name: String,
        symbol: Option<SymbolId>,
    },
    InitializerList,
    FunctionDeclaration {
        name: String,
        symbol: Option<SymbolId>,
    },
    FormalParameters,
    FormalParameter {
        name: String,
        symbol: Option<SymbolId>,
    },
    Call {
        name: String,
        symbol: Option<SymbolId>,
    },
    Binary(BinaryOp),
    Unary(UnaryOp),
    Subscript,
    Conversion(Conversion),
    Block,
    ExprStatement,
    If {
        else_label: Option<String>,
        end_label: Option<String>,
    },
    While {
        start_label: Option<String>,
        end_label: Option<String>,
    },
    For {
        start_label: Option<String>,
        continue_label: Option<String>,
        end_label: Option<String>,
    },
    Return,
    Break {
        label: Option<String>,
    },
    Continue {
        label: Option<String>,
    },
    Nothing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode {
    pub kind: TypeNodeKind,
    pub constant: bool,
    /// Set on the outermost node of a specifier once a declaration takes it.
    pub top_level: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeNodeKind {
    Int,
    Char,
    Void,
    Pointer,
    Array { size: Option<usize> },
}

/// A coercion spliced in by the conversion engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub from: Type,
    pub to: Type,
    /// `None` when the runtime representation is already right.
    pub instruction: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub line: u32,
    /// Scope depth the node was resolved in.
    pub scope: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Nearest enclosing function; `None` for the file frame.
    pub function: Option<NodeId>,
    pub ty: Option<Type>,
    /// Manual casts attached by the front end, innermost first.
    pub casts: Vec<Type>,
}

impl Node {
    fn new(kind: NodeKind, line: u32) -> Self {
        Node {
            kind,
            line,
            scope: 0,
            parent: None,
            children: vec![],
            function: None,
            ty: None,
            casts: vec![],
        }
    }
}

/// Arena owning every node of one translation unit.
///
/// Nodes refer to each other by `NodeId`. Every mutation that moves a node
/// keeps `children` and `parent` in agreement.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Ast::default()
    }

    pub fn add(&mut self, kind: NodeKind, line: u32) -> NodeId {
        self.nodes.push(Node::new(kind, line));
        NodeId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    pub fn line(&self, id: NodeId) -> u32 {
        self.nodes[id.0].line
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[id.0].children.get(index).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn ty(&self, id: NodeId) -> Option<&Type> {
        self.nodes[id.0].ty.as_ref()
    }

    pub fn set_ty(&mut self, id: NodeId, ty: Type) {
        self.nodes[id.0].ty = Some(ty);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Rewrites the slot of `parent` holding `old` to hold `new`.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> bool {
        let Some(slot) = self.nodes[parent.0].children.iter().position(|c| *c == old) else {
            return false;
        };
        self.nodes[parent.0].children[slot] = new;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
        true
    }

    /// Inserts a new node of `kind` between `id` and its parent.
    ///
    /// The wrapper takes over `id`'s slot, and `id` becomes its only child.
    pub fn wrap(&mut self, id: NodeId, kind: NodeKind) -> NodeId {
        let line = self.line(id);
        let wrapper = self.add(kind, line);
        {
            let wrapped = self.node(id);
            let (scope, function) = (wrapped.scope, wrapped.function);
            let node = self.node_mut(wrapper);
            node.scope = scope;
            node.function = function;
        }

        if let Some(parent) = self.parent(id) {
            self.replace_child(parent, id, wrapper);
        } else if self.root == Some(id) {
            self.root = Some(wrapper);
        }
        self.append_child(wrapper, id);

        wrapper
    }

    /// Nearest strict ancestor that is a function declaration.
    pub fn owning_function(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if let NodeKind::FunctionDeclaration { .. } = self.kind(node) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Verifies that each child's parent points back at its owner.
    pub fn parent_links_consistent(&self) -> bool {
        self.nodes.iter().enumerate().all(|(index, node)| {
            node.children
                .iter()
                .all(|child| self.nodes[child.0].parent == Some(NodeId(index)))
        })
    }

    /// Renders the subtree rooted at `id`, one node per line.
    pub fn dump(&self, id: NodeId) -> String {
        let mut result = String::new();
        self.dump_into(id, 0, &mut result);
        result
    }

    fn dump_into(&self, id: NodeId, indent: usize, result: &mut String) {
        let node = self.node(id);
        let _ = write!(result, "{}{}", "\t".repeat(indent), describe(&node.kind));
        if let Some(ty) = &node.ty {
            let _ = write!(result, " <{}>", ty);
        }
        result.push('\n');

        for child in node.children.iter() {
            self.dump_into(*child, indent + 1, result);
        }
    }
}

fn describe(kind: &NodeKind) -> String {
    match kind {
        NodeKind::File => String::from("File"),
        NodeKind::Type(type_node) => {
            let constant = if type_node.constant { " const" } else { "" };
            match type_node.kind {
                TypeNodeKind::Array { size: Some(size) } => format!("ArrayType[{}]{}", size, constant),
                TypeNodeKind::Array { size: None } => format!("ArrayType[]{}", constant),
                other => format!("{:?}Type{}", other, constant),
            }
        }
        NodeKind::IntLiteral(value) => format!("Int: {}", value),
        NodeKind::CharLiteral(value) => format!("Char: {:?}", value),
        NodeKind::StringLiteral { value, .. } => format!("String: {:?}", value),
        NodeKind::Identifier { name, .. } => format!("Identifier: {}", name),
        NodeKind::Declaration { name, .. } => format!("Declaration: {}", name),
        NodeKind::InitializerList => String::from("InitializerList"),
        NodeKind::FunctionDeclaration { name, .. } => format!("FunctionDeclaration: {}", name),
        NodeKind::FormalParameters => String::from("FormalParameters"),
        NodeKind::FormalParameter { name, .. } => format!("FormalParameter: {}", name),
        NodeKind::Call { name, .. } => format!("Call: {}", name),
        NodeKind::Binary(op) => format!("Binary: {}", op),
        NodeKind::Unary(op) => format!("Unary: {}", op),
        NodeKind::Subscript => String::from("Subscript"),
        NodeKind::Conversion(conversion) => {
            format!("Conversion: {} -> {}", conversion.from, conversion.to)
        }
        NodeKind::Block => String::from("Block"),
        NodeKind::ExprStatement => String::from("ExprStatement"),
        NodeKind::If { .. } => String::from("If"),
        NodeKind::While { .. } => String::from("While"),
        NodeKind::For { .. } => String::from("For"),
        NodeKind::Return => String::from("Return"),
        NodeKind::Break { .. } => String::from("Break"),
        NodeKind::Continue { .. } => String::from("Continue"),
        NodeKind::Nothing => String::from("Nothing"),
    }
}
