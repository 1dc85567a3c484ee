//! Editor-facing features built on top of the index.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: take a unit or file contents in, return data out
//! 2. **No protocol types**: results use our own types and 1-based
//!    line/column positions, converted at the tool boundary
//! 3. **Composable**: built on cursors and the raw lexer
//!
//! ## Usage
//!
//! ```no_run
//! use cxindex::ide::{IndexedSymbol, IndexedSymbolLocation, find_symbol_occurrences_in_indexed_file};
//! use cxindex::syntax::CursorKind;
//!
//! let symbols = [IndexedSymbol {
//!     locations: vec![IndexedSymbolLocation::new(1, 7, CursorKind::DeclRefExpr)],
//!     kind: CursorKind::DeclRefExpr,
//!     name: "Test".to_string(),
//! }];
//! let no_args: [&str; 0] = [];
//! let result = find_symbol_occurrences_in_indexed_file(&symbols, "test.cpp", &no_args, &[]).unwrap();
//! for file in result.iter() {
//!     println!("{}: {} occurrences", file.filename.display(), file.occurrences.len());
//! }
//! ```

mod occurrences;
mod refactor;

pub use occurrences::{
    IndexedSymbol, IndexedSymbolLocation, NamePiece, SymbolOccurrence, SymbolOccurrenceKind,
    SymbolOccurrencesInFile, SymbolOccurrencesResult, find_symbol_occurrences_in_indexed_file,
};
pub use refactor::{RefactoringActionType, find_renamed_cursor};
