//! Source rewriting.
//!
//! A [`Rewriter`] stages edits against the buffers of a translation unit
//! and commits them to disk in one step. Edits are kept per file in an
//! [`EditBatch`]; the unit itself is never modified, so cursors stay valid
//! while edits are staged. Reparse the unit to observe the new text.

mod rewriter;

pub use rewriter::{EditBatch, EditOp, Rewriter};
