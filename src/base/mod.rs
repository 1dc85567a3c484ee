//! Foundation types for the index.
//!
//! This module provides the primitives every other layer builds on:
//! - [`FileId`] - Stable identifier of a buffer inside a unit
//! - [`SourceBuffer`], [`FileSet`] - Versioned file contents
//! - [`LineCol`], [`LineIndex`] - 1-based line/column conversion
//! - [`SourceLocation`], [`SourceRange`], [`SpellingLocation`] - Locations,
//!   including macro expansion sites
//!
//! This module has NO dependencies on other cxindex modules.

mod buffer;
mod file_id;
mod file_set;
mod line_index;
mod location;

pub use buffer::SourceBuffer;
pub use file_id::FileId;
pub use file_set::FileSet;
pub use line_index::{LineCol, LineIndex};
pub use location::{FileLoc, SourceLocation, SourceRange, SpellingLocation};

// Re-export text-size types for convenience
pub use text_size::{self, TextRange, TextSize};
