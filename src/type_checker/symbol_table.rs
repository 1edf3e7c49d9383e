//! Scoped symbol table.
//!
//! Symbols live in one arena for the whole compilation and are referenced by
//! `SymbolId` from the nodes that declare or use them. Scopes are a stack of
//! name maps that mirrors lexical nesting while the resolver runs; the file
//! scope is retained afterwards so the code generator can find `main`.

use std::collections::HashMap;

use log::debug;

use crate::{
    ast::{ast::NodeId, types::Type},
    errors::errors::{Error, ErrorImpl},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    pub params: Vec<Type>,
    pub label: String,
    pub builtin: bool,
    pub variadic: bool,
    /// Whether a body has been seen. Builtins count as defined.
    pub defined: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Variable { declaration: NodeId },
    Function(FunctionInfo),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    /// Declared type; the return type for functions.
    pub ty: Type,
    /// Scope depth the symbol was declared at.
    pub depth: usize,
    /// Slot in the owning frame, assigned during code generation.
    pub offset: Option<usize>,
    /// Function whose frame holds the symbol; `None` is the file frame.
    pub frame: Option<NodeId>,
    pub line: u32,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn variable(name: &str, ty: Type, declaration: NodeId, frame: Option<NodeId>, line: u32) -> Self {
        Symbol {
            name: name.to_string(),
            ty,
            depth: 0,
            offset: None,
            frame,
            line,
            kind: SymbolKind::Variable { declaration },
        }
    }

    pub fn function(name: &str, return_type: Type, info: FunctionInfo, frame: Option<NodeId>, line: u32) -> Self {
        Symbol {
            name: name.to_string(),
            ty: return_type,
            depth: 0,
            offset: None,
            frame,
            line,
            kind: SymbolKind::Function(info),
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, SymbolKind::Function(_))
    }

    pub fn function_info(&self) -> Option<&FunctionInfo> {
        match &self.kind {
            SymbolKind::Function(info) => Some(info),
            SymbolKind::Variable { .. } => None,
        }
    }

    pub fn function_info_mut(&mut self) -> Option<&mut FunctionInfo> {
        match &mut self.kind {
            SymbolKind::Function(info) => Some(info),
            SymbolKind::Variable { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Scope {
    symbols: HashMap<String, SymbolId>,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name).copied()
    }
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    scopes: Vec<Scope>,
    file_scope: Option<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Number of open scopes. The file scope is depth 1.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
        debug!("entered scope {}", self.depth());
    }

    pub fn leave_scope(&mut self) {
        let depth = self.depth();
        if let Some(scope) = self.scopes.pop() {
            debug!("left scope {} ({} symbols)", depth, scope.symbols.len());
            if self.scopes.is_empty() {
                self.file_scope = Some(scope);
            }
        }
    }

    /// Adds `symbol` to the innermost scope.
    ///
    /// Fails when that scope already holds the name; outer scopes are
    /// shadowed instead.
    pub fn declare(&mut self, mut symbol: Symbol) -> Result<SymbolId, Error> {
        let depth = self.depth();
        let Some(scope) = self.scopes.last() else {
            return Err(Error::new(
                ErrorImpl::MalformedTree {
                    message: format!("declaration of '{}' outside any scope", symbol.name),
                },
                symbol.line,
            ));
        };

        if let Some(previous) = scope.get(&symbol.name) {
            return Err(Error::new(
                ErrorImpl::SymbolAlreadyDeclared {
                    name: symbol.name,
                    previous_line: self.symbols[previous.0].line,
                },
                symbol.line,
            ));
        }

        symbol.depth = depth;
        let id = SymbolId(self.symbols.len());
        debug!("declared '{}' as {:?} at depth {}", symbol.name, id, depth);

        if let Some(scope) = self.scopes.last_mut() {
            scope.symbols.insert(symbol.name.clone(), id);
        }
        self.symbols.push(symbol);

        Ok(id)
    }

    /// Searches innermost to outermost.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn lookup_current(&self, name: &str) -> Option<SymbolId> {
        self.scopes.last().and_then(|scope| scope.get(name))
    }

    /// Looks a name up in the file scope, during or after resolution.
    pub fn lookup_file(&self, name: &str) -> Option<SymbolId> {
        self.scopes
            .first()
            .or(self.file_scope.as_ref())
            .and_then(|scope| scope.get(name))
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols.iter().enumerate().map(|(index, symbol)| (SymbolId(index), symbol))
    }
}
