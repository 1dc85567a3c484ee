//! Syntax layer: the AST arena and the type model.
//!
//! The parser fills an [`Ast`]; semantic analysis resolves names and types
//! in place; cursors read it.

pub mod ast;
mod cursor_kind;
pub mod printing;
pub mod types;

pub use ast::{
    Ast, BinaryOp, Literal, Node, NodeFlags, NodeId, Operator, StorageClass, UnaryOp,
};
pub use cursor_kind::CursorKind;
pub use printing::{PrintingPolicy, PrintingPolicyProperty};
pub use types::{Qualifiers, TagKind, Type, TypeKind};
