//! # cxindex
//!
//! Incremental translation-unit index for C, C++ and Objective-C: cursors
//! over the AST, source locations, reparse, save/load and source rewriting.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → Rename targets, indexed symbol occurrences
//!   ↓
//! rewrite   → Batched edits committed per file
//!   ↓
//! index     → Index, TranslationUnit, Cursor, locations, reparse, save/load
//!   ↓
//! hir       → Salsa token cache, semantic checks, diagnostics, evaluation
//!   ↓
//! project   → Compiler arguments, toolchain, unsaved files, overlays
//!   ↓
//! syntax    → AST arena, cursor kinds, types, printing policy
//!   ↓
//! parser    → Logos lexer, preprocessor, recursive-descent parser
//!   ↓
//! core      → Identifier helpers
//!   ↓
//! base      → Primitives (FileId, SourceBuffer, LineIndex, SourceLocation)
//! ```

// ============================================================================
// MODULES (dependency order: base → core → parser → syntax → project → hir
//          → index → rewrite → ide)
// ============================================================================

/// Foundation types: FileId, buffers, line/column, locations
pub mod base;

/// Identifier and name helpers
pub mod core;

/// Error types of every fallible operation
pub mod error;

/// Front end: lexer, preprocessor, parser
pub mod parser;

/// Syntax: AST arena, cursor kinds, types
pub mod syntax;

/// Environment: compiler arguments, toolchains, unsaved files, overlays
pub mod project;

/// Semantic layer: token cache, analysis, diagnostics, evaluation
pub mod hir;

/// Translation units and cursors
pub mod index;

/// Source rewriting
pub mod rewrite;

/// Refactoring helpers
pub mod ide;

// Re-export commonly needed items
pub use base::{FileId, LineCol, SourceLocation, SourceRange, TextRange, TextSize};
pub use index::{ChildVisit, Cursor, Index, IndexOptions, TranslationUnit, TranslationUnitFlags};
pub use project::UnsavedFile;
pub use rewrite::Rewriter;
