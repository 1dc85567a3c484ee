//! AST arena.
//!
//! Nodes live in one `Vec` owned by the translation unit and refer to each
//! other by [`NodeId`]. Children are ordered as written; `parent` is the
//! lexical parent, `semantic_parent` the declaration context (they differ
//! for out-of-line members such as `void Class1::fun() {}`).
//!
//! ```text
//! Ast
//!  └── nodes[0]   TranslationUnit
//!       ├── StructDecl Foo
//!       │    └── FieldDecl bar
//!       └── FunctionDecl main
//!            └── CompoundStmt
//! ```

use std::ops::{Index, IndexMut};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::cursor_kind::CursorKind;
use super::types::Type;
use crate::base::{SourceLocation, SourceRange};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StorageClass {
    #[default]
    None,
    Extern,
    Static,
    Auto,
    Register,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct NodeFlags: u16 {
        const DEFINITION = 1 << 0;
        const SCOPED_ENUM = 1 << 1;
        const INLINE = 1 << 2;
        const CONSTEXPR = 1 << 3;
        const TYPEDEF_SPEC = 1 << 4;
        const GLOBAL_QUALIFIER = 1 << 5;
        const ARROW = 1 << 6;
        const INVALID = 1 << 7;
        /// The last child is the initializer.
        const HAS_INIT = 1 << 8;
        /// Declared through an `@class` or similar forward declaration.
        const FORWARD = 1 << 9;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int { value: u64, unsigned: bool },
    Float(f64),
    Char(i64),
    Str(String),
    ObjCStr(String),
    Bool(bool),
    NullPtr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    LAnd,
    LOr,
    Assign,
    MulAssign,
    DivAssign,
    RemAssign,
    AddAssign,
    SubAssign,
    ShlAssign,
    ShrAssign,
    AndAssign,
    XorAssign,
    OrAssign,
    Comma,
}

impl BinaryOp {
    pub fn spelling(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Mul => "*",
            Div => "/",
            Rem => "%",
            Add => "+",
            Sub => "-",
            Shl => "<<",
            Shr => ">>",
            Lt => "<",
            Gt => ">",
            Le => "<=",
            Ge => ">=",
            Eq => "==",
            Ne => "!=",
            BitAnd => "&",
            BitXor => "^",
            BitOr => "|",
            LAnd => "&&",
            LOr => "||",
            Assign => "=",
            MulAssign => "*=",
            DivAssign => "/=",
            RemAssign => "%=",
            AddAssign => "+=",
            SubAssign => "-=",
            ShlAssign => "<<=",
            ShrAssign => ">>=",
            AndAssign => "&=",
            XorAssign => "^=",
            OrAssign => "|=",
            Comma => ",",
        }
    }

    pub fn is_assignment(self) -> bool {
        use BinaryOp::*;
        matches!(
            self,
            Assign
                | MulAssign
                | DivAssign
                | RemAssign
                | AddAssign
                | SubAssign
                | ShlAssign
                | ShrAssign
                | AndAssign
                | XorAssign
                | OrAssign
        )
    }

    pub fn is_compound_assignment(self) -> bool {
        self.is_assignment() && self != BinaryOp::Assign
    }

    pub fn is_comparison(self) -> bool {
        use BinaryOp::*;
        matches!(self, Lt | Gt | Le | Ge | Eq | Ne)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::LAnd | BinaryOp::LOr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    PostInc,
    PostDec,
    PreInc,
    PreDec,
    AddrOf,
    Deref,
    Plus,
    Minus,
    Not,
    LNot,
    SizeOf,
}

impl UnaryOp {
    pub fn spelling(self) -> &'static str {
        match self {
            UnaryOp::PostInc | UnaryOp::PreInc => "++",
            UnaryOp::PostDec | UnaryOp::PreDec => "--",
            UnaryOp::AddrOf => "&",
            UnaryOp::Deref => "*",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "~",
            UnaryOp::LNot => "!",
            UnaryOp::SizeOf => "sizeof",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Binary(BinaryOp),
    Unary(UnaryOp),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: CursorKind,
    /// Spelling: declared or referenced name, literal text, callee name.
    pub name: SmolStr,
    /// Name as written, qualifiers included (`ns1::Class1`).
    pub written: SmolStr,
    pub location: SourceLocation,
    pub extent: SourceRange,
    pub parent: Option<NodeId>,
    pub semantic_parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub ty: Type,
    pub referenced: Option<NodeId>,
    pub storage: StorageClass,
    pub flags: NodeFlags,
    pub literal: Option<Literal>,
    pub op: Option<Operator>,
    /// Operand of `sizeof(type)`.
    pub type_operand: Option<Type>,
}

impl Node {
    pub fn new(kind: CursorKind, name: impl Into<SmolStr>, location: SourceLocation, extent: SourceRange) -> Self {
        let name = name.into();
        Self {
            kind,
            written: name.clone(),
            name,
            location,
            extent,
            parent: None,
            semantic_parent: None,
            children: Vec::new(),
            ty: Type::invalid(),
            referenced: None,
            storage: StorageClass::None,
            flags: NodeFlags::empty(),
            literal: None,
            op: None,
            type_operand: None,
        }
    }

    pub fn is_definition(&self) -> bool {
        self.flags.contains(NodeFlags::DEFINITION)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// The translation unit node, allocated first.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self[child].parent = Some(parent);
        if self[child].semantic_parent.is_none() {
            self[child].semantic_parent = Some(parent);
        }
        self[parent].children.push(child);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Nearest lexical ancestor (excluding `id`) of one of the given kinds.
    pub fn enclosing(&self, id: NodeId, pred: impl Fn(CursorKind) -> bool) -> Option<NodeId> {
        let mut current = self[id].parent;
        while let Some(parent) = current {
            if pred(self[parent].kind) {
                return Some(parent);
            }
            current = self[parent].parent;
        }
        None
    }

    /// `id` and all nodes below it, pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self[next].children.iter().rev().copied());
        }
        out
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl IndexMut<NodeId> for Ast {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }
}
