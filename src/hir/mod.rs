//! High-level IR: the semantic side of a translation unit.
//!
//! ## Key Types
//!
//! - [`SourceCache`] — salsa-backed token cache, one input per buffer
//! - [`Diagnostic`] — compiler messages produced by every stage
//! - [`EvalResult`] — constant folding of expressions and initializers
//!
//! ## Layers
//!
//! ```text
//! file_text(file)        ← INPUT: buffer contents (disk or unsaved)
//!     │
//!     ▼
//! lex_file(file)         ← memoized raw tokens
//!     │
//!     ▼
//! preprocess + parse     ← parser module, recomputed per parse
//!     │
//!     ▼
//! analyze(ast)           ← names, types, semantic diagnostics
//!     │
//!     ▼
//! evaluate(cursor)       ← on demand
//! ```

mod db;
mod diagnostics;
pub(crate) mod eval;
mod sema;

pub use db::{FileText, RootDatabase, SourceCache, lex_file};
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticDisplayOptions, DiagnosticSink, Severity,
};
pub use eval::{EvalResult, enumerator_value, evaluate};
pub(crate) use sema::analyze;
