//! Main code generation module.
//!
//! This module contains the Compiler structure and the program-level half of
//! the P-machine back end: frame layout, the string pool, the program
//! wrapper around `main`, function emission and builtin splicing. Statement
//! and expression lowering live in `stmt` and `expr`.

use std::collections::HashMap;

use log::{debug, info};

use crate::{
    ast::{
        ast::{Ast, NodeId, NodeKind},
        operators::BinaryOp,
        types::Type,
    },
    errors::errors::{Error, ErrorImpl, WarningImpl},
    session::Session,
    type_checker::symbol_table::{Symbol, SymbolId, SymbolKind, SymbolTable},
    MK_INSTR,
};

use super::{
    instruction::Instruction,
    stdlib::{instantiate, with_dependencies},
    stmt::gen_statement,
};

/// Slots 0 to 4 of every frame hold the return value and the machine's
/// bookkeeping; parameters and locals start after them.
pub const FRAME_HEADER: usize = 5;

/// State of code generation for one translation unit.
///
/// Holds:
/// - The resolved tree and its symbol table
/// - The session handing out labels and collecting warnings
/// - The instructions emitted so far
/// - Frame sizes of the file frame and of every function
/// - The scratch slot of every frame that needs one
/// - The builtins referenced by user code
pub struct Compiler<'a> {
    /// The resolved tree; string pool offsets are written back into it
    pub ast: &'a mut Ast,
    /// Symbols of the tree; frame offsets are written back into them
    pub symbols: &'a mut SymbolTable,
    pub session: &'a mut Session,

    pub instructions: Vec<Instruction>,
    /// `ssp` operand per frame; the key `None` is the file frame
    pub frame_sizes: HashMap<Option<NodeId>, usize>,
    /// Slot holding a computed lvalue address, keyed like `frame_sizes`
    scratch_slots: HashMap<Option<NodeId>, usize>,
    /// Builtins called by user code, in order of first use
    used_builtins: Vec<String>,
}

impl<'a> Compiler<'a> {
    /// Creates a new Compiler instance.
    ///
    /// # Arguments
    ///
    /// * `ast` - The resolved tree to compile
    /// * `symbols` - The symbol table produced by resolution
    /// * `session` - Session shared with the earlier passes
    pub fn new(ast: &'a mut Ast, symbols: &'a mut SymbolTable, session: &'a mut Session) -> Self {
        Compiler {
            ast,
            symbols,
            session,
            instructions: vec![],
            frame_sizes: HashMap::new(),
            scratch_slots: HashMap::new(),
            used_builtins: vec![],
        }
    }

    pub fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn emit_label(&mut self, label: &str) {
        self.instructions.push(Instruction::label(label));
    }

    /// Records that the program calls `name`, so its routine gets spliced.
    pub fn use_builtin(&mut self, name: &str) {
        if !self.used_builtins.iter().any(|used| used == name) {
            self.used_builtins.push(name.to_string());
        }
    }

    /// Number of frame boundaries between code running in `from` and the
    /// frame `to`. `None` is the file frame on both sides.
    pub fn depth(&self, from: Option<NodeId>, to: Option<NodeId>) -> usize {
        let mut current = from;
        let mut depth = 0;
        while current != to {
            let Some(function) = current else {
                break;
            };
            current = self.ast.node(function).function;
            depth += 1;
        }
        depth
    }

    /// Depth from the code containing `id` to the frame holding `symbol`.
    pub fn depth_to_symbol(&self, id: NodeId, symbol: SymbolId) -> usize {
        self.depth(self.ast.node(id).function, self.symbols.get(symbol).frame)
    }

    /// Depth from the code containing `id` to the file frame.
    pub fn depth_to_file(&self, id: NodeId) -> usize {
        self.depth(self.ast.node(id).function, None)
    }

    /// Operand tag of `ty`. Types without one are reported and emitted as
    /// int.
    pub fn ptype(&mut self, ty: &Type, line: u32) -> &'static str {
        match ty.ptype() {
            Some(tag) => tag,
            None => {
                self.session.warn(WarningImpl::UnmappedType { ty: ty.to_string() }, line);
                "i"
            }
        }
    }

    pub fn node_type(&self, id: NodeId) -> Result<Type, Error> {
        self.ast
            .ty(id)
            .cloned()
            .ok_or_else(|| malformed("expression left untyped", self.ast.line(id)))
    }

    pub fn child(&self, id: NodeId, index: usize) -> Result<NodeId, Error> {
        self.ast
            .child(id, index)
            .ok_or_else(|| malformed("missing child", self.ast.line(id)))
    }

    /// The resolved symbol of an identifier, declaration, parameter,
    /// function or call node.
    pub fn symbol_of(&self, id: NodeId) -> Result<SymbolId, Error> {
        let symbol = match self.ast.kind(id) {
            NodeKind::Identifier { symbol, .. }
            | NodeKind::Declaration { symbol, .. }
            | NodeKind::FormalParameter { symbol, .. }
            | NodeKind::FunctionDeclaration { symbol, .. }
            | NodeKind::Call { symbol, .. } => *symbol,
            _ => None,
        };
        symbol.ok_or_else(|| malformed("node has no symbol", self.ast.line(id)))
    }

    /// Frame slot of a variable symbol.
    pub fn offset_of(&self, symbol: SymbolId, line: u32) -> Result<usize, Error> {
        let symbol = self.symbols.get(symbol);
        symbol
            .offset
            .ok_or_else(|| malformed(&format!("'{}' has no frame slot", symbol.name), line))
    }

    /// Scratch slot of the frame running the code of `id`.
    pub fn scratch_slot(&self, id: NodeId) -> Result<usize, Error> {
        self.scratch_slots
            .get(&self.ast.node(id).function)
            .copied()
            .ok_or_else(|| malformed("frame has no scratch slot", self.ast.line(id)))
    }

    /// Whether code under `id`, in the same frame, writes through an
    /// address it must reuse: a step on a non-variable, or an assignment
    /// to one whose value is used.
    fn needs_scratch(&self, id: NodeId) -> bool {
        self.ast.children(id).iter().any(|child| {
            let through_address = |target: Option<NodeId>| {
                target.is_some_and(|target| !matches!(self.ast.kind(target), NodeKind::Identifier { .. }))
            };
            let needed = match self.ast.kind(*child) {
                NodeKind::FunctionDeclaration { .. } => return false,
                NodeKind::Unary(op) if op.is_step() => through_address(self.ast.child(*child, 0)),
                NodeKind::Binary(BinaryOp::Assign) => {
                    *self.ast.kind(id) != NodeKind::ExprStatement && through_address(self.ast.child(*child, 0))
                }
                _ => false,
            };
            needed || self.needs_scratch(*child)
        })
    }

    /// Closes the layout of `frame`, whose code lives under `code`.
    fn finish_frame(&mut self, frame: Option<NodeId>, code: NodeId, mut next: usize) {
        if self.needs_scratch(code) {
            debug!("scratch slot {} in {:?}", next, frame);
            self.scratch_slots.insert(frame, next);
            next += 1;
        }
        self.frame_sizes.insert(frame, next);
    }

    fn assign_slot(&mut self, id: NodeId, next: &mut usize) -> Result<(), Error> {
        let symbol = self.symbol_of(id)?;
        let symbol = self.symbols.get_mut(symbol);
        symbol.offset = Some(*next);
        debug!("'{}' -> slot {}", symbol.name, *next);
        *next += symbol.ty.slots();
        Ok(())
    }

    /// Assigns slots to the declarations under `id` that live in the same
    /// frame, in source order. Nested functions have frames of their own.
    fn layout_declarations(&mut self, id: NodeId, next: &mut usize) -> Result<(), Error> {
        for child in self.ast.children(id).to_vec() {
            match self.ast.kind(child) {
                NodeKind::FunctionDeclaration { .. } => {}
                NodeKind::Declaration { .. } => self.assign_slot(child, next)?,
                _ => self.layout_declarations(child, next)?,
            }
        }
        Ok(())
    }

    /// Lays out the file frame: globals first, then the string pool, then
    /// the scratch slot if the global initializers need one.
    fn layout_file_frame(&mut self, root: NodeId) -> Result<(), Error> {
        let mut next = FRAME_HEADER;
        for child in self.ast.children(root).to_vec() {
            if let NodeKind::Declaration { .. } = self.ast.kind(child) {
                self.assign_slot(child, &mut next)?;
            }
        }

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let NodeKind::StringLiteral { value, pool_offset } = self.ast.kind_mut(id) {
                *pool_offset = Some(next);
                next += value.chars().count() + 1;
            }
            stack.extend(self.ast.children(id).iter().rev());
        }

        self.finish_frame(None, root, next);
        Ok(())
    }

    fn layout_function_frame(&mut self, function: NodeId) -> Result<(), Error> {
        let mut next = FRAME_HEADER;

        let params = self.child(function, 1)?;
        for param in self.ast.children(params).to_vec() {
            self.assign_slot(param, &mut next)?;
        }

        let body = self.child(function, 2)?;
        self.layout_declarations(body, &mut next)?;

        self.finish_frame(Some(function), body, next);
        Ok(())
    }

    /// Every function with a body, in source order.
    fn function_bodies(&self, root: NodeId) -> Vec<NodeId> {
        let mut functions = vec![];
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let NodeKind::FunctionDeclaration { .. } = self.ast.kind(id) {
                if self.ast.child(id, 2).is_some() {
                    functions.push(id);
                }
            }
            stack.extend(self.ast.children(id).iter().rev());
        }
        functions
    }

    /// Code label of `main`, after checking it is a defined
    /// `void main()`.
    fn find_main(&self, root: NodeId) -> Result<String, Error> {
        let Some(symbol) = self.symbols.lookup_file("main") else {
            return Err(Error::new(ErrorImpl::MissingMain, self.ast.line(root)));
        };

        let symbol: &Symbol = self.symbols.get(symbol);
        let invalid = |reason: &str| {
            Error::new(
                ErrorImpl::InvalidMain {
                    reason: reason.to_string(),
                },
                symbol.line,
            )
        };

        let SymbolKind::Function(info) = &symbol.kind else {
            return Err(invalid("'main' is not a function"));
        };
        if !symbol.ty.is_void() {
            return Err(invalid("'main' must return void"));
        }
        if !info.params.is_empty() {
            return Err(invalid("'main' takes no parameters"));
        }
        if !info.defined {
            return Err(invalid("'main' is never defined"));
        }

        Ok(info.label.clone())
    }

    /// Stores every pool string, terminator included, into its slots.
    fn gen_string_pool(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let NodeKind::StringLiteral {
                value,
                pool_offset: Some(offset),
            } = self.ast.kind(id).clone()
            {
                for (index, character) in value.chars().chain(std::iter::once('\0')).enumerate() {
                    self.emit(MK_INSTR!("ldc", "c", char_operand(character)));
                    self.emit(MK_INSTR!("str", "c", 0, offset + index));
                }
            }
            stack.extend(self.ast.children(id).iter().rev());
        }
    }

    fn gen_function(&mut self, function: NodeId) -> Result<(), Error> {
        let symbol = self.symbols.get(self.symbol_of(function)?);
        let Some(info) = symbol.function_info() else {
            return Err(malformed("function without signature", self.ast.line(function)));
        };
        let label = info.label.clone();
        let returns_value = !symbol.ty.is_void();
        let frame_size = self.frame_sizes.get(&Some(function)).copied().unwrap_or(FRAME_HEADER);

        self.emit_label(&label);
        self.emit(MK_INSTR!("ssp", frame_size));

        let body = self.child(function, 2)?;
        for statement in self.ast.children(body).to_vec() {
            gen_statement(self, statement)?;
        }

        if returns_value {
            self.emit(MK_INSTR!("retf"));
        } else {
            self.emit(MK_INSTR!("retp"));
        }
        Ok(())
    }

    fn splice_builtins(&mut self) {
        for builtin in with_dependencies(&self.used_builtins) {
            let code = instantiate(builtin, self.session);
            self.instructions.extend(code);
        }
    }

    /// Emits the whole program.
    ///
    /// Layout of the output:
    /// 1. The file frame: `ssp`, the string pool, global initializers
    /// 2. The call of `main`, then `hlt`
    /// 3. Every function body in source order
    /// 4. The builtins the program uses
    fn compile(&mut self) -> Result<(), Error> {
        let Some(root) = self.ast.root() else {
            return Err(malformed("tree has no root", 0));
        };
        let main_label = self.find_main(root)?;

        self.layout_file_frame(root)?;
        let functions = self.function_bodies(root);
        for function in functions.iter() {
            self.layout_function_frame(*function)?;
        }

        let file_frame = self.frame_sizes.get(&None).copied().unwrap_or(FRAME_HEADER);
        self.emit(MK_INSTR!("ssp", file_frame));
        self.gen_string_pool(root);
        for child in self.ast.children(root).to_vec() {
            if let NodeKind::Declaration { .. } = self.ast.kind(child) {
                gen_statement(self, child)?;
            }
        }
        self.emit(MK_INSTR!("mst", 0));
        self.emit(MK_INSTR!("cup", 0, main_label));
        self.emit(MK_INSTR!("hlt"));

        for function in functions {
            self.gen_function(function)?;
        }

        self.splice_builtins();

        info!("generated {} instructions", self.instructions.len());
        Ok(())
    }
}

pub fn malformed(message: &str, line: u32) -> Error {
    Error::new(
        ErrorImpl::MalformedTree {
            message: message.to_string(),
        },
        line,
    )
}

/// Renders a character constant operand: quoted when printable, its code
/// otherwise.
pub fn char_operand(character: char) -> String {
    if character.is_ascii_graphic() && character != '\'' {
        format!("'{}'", character)
    } else {
        (character as u32).to_string()
    }
}

/// Compiles a resolved tree into P-machine instructions.
///
/// # Arguments
///
/// * `ast` - The tree, as annotated by `type_check`
/// * `symbols` - The symbol table returned by `type_check`
/// * `session` - The session used by the earlier passes
///
/// # Returns
///
/// The program's instructions, or the first error met.
pub fn compile(ast: &mut Ast, symbols: &mut SymbolTable, session: &mut Session) -> Result<Vec<Instruction>, Error> {
    let mut compiler = Compiler::new(ast, symbols, session);
    compiler.compile()?;
    Ok(compiler.instructions)
}
