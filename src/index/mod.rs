//! The index: translation units and everything clients query on them.
//!
//! ## Key Types
//!
//! - [`Index`] - creates units from a main file and compiler arguments
//! - [`TranslationUnit`] - buffers, AST, diagnostics and preprocessing
//!   records of one main file; reparse and save live here too
//! - [`Cursor`] - a node of the unit's AST, borrowed from the unit
//! - [`File`] - a buffer of the unit, for location queries
//!
//! ## Example
//!
//! ```no_run
//! use cxindex::index::{ChildVisit, Index, IndexOptions, TranslationUnitFlags};
//!
//! let index = Index::new(IndexOptions::default());
//! let unit = index
//!     .parse("main.c", &["-std=c99"], &[], TranslationUnitFlags::empty())
//!     .unwrap();
//! unit.cursor().visit_children(|cursor, _parent| {
//!     println!("{} {}", cursor.kind(), cursor.spelling());
//!     ChildVisit::Recurse
//! });
//! ```

mod cursor;
mod frontend;
#[allow(clippy::module_inception)]
mod index;
mod location;
mod options;
mod persist;
mod reparse;
mod tokens;
mod unit;

pub use cursor::{ChildVisit, Cursor};
pub use index::Index;
pub use location::File;
pub use options::{
    IndexOptions, ReparseFlags, SaveFlags, TranslationUnitFlags, default_reparse_options,
    default_save_options,
};
pub use tokens::Token;
pub use unit::{ReparseState, TranslationUnit};
