//! Rewriter tests
//!
//! Staging edits against a parsed unit and committing them to disk.

pub mod tests_rewrite;
