//! Salsa database definition and queries.
//!
//! Raw lexing is the only memoized query: the preprocessor's output depends
//! on macro state that flows across files, so it is recomputed on every
//! parse, but the tokens of a file whose text did not change are reused.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rustc_hash::FxHashMap;

use crate::base::FileId;
use crate::parser::{TokenList, lex};

// ============================================================================
// INPUTS
// ============================================================================

/// Input: The raw text content of a file.
///
/// Set this explicitly when a file is loaded or its content changes.
#[salsa::input]
pub struct FileText {
    pub file: FileId,
    #[return_ref]
    pub text: String,
}

// ============================================================================
// DATABASE
// ============================================================================

/// The root Salsa database.
///
/// Counts query executions so callers can observe what was recomputed.
#[salsa::db]
#[derive(Default, Clone)]
pub struct RootDatabase {
    storage: salsa::Storage<Self>,
    executions: Arc<AtomicUsize>,
}

#[salsa::db]
impl salsa::Database for RootDatabase {
    fn salsa_event(&self, event: &dyn Fn() -> salsa::Event) {
        if let salsa::EventKind::WillExecute { .. } = event().kind {
            self.executions.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl RootDatabase {
    /// Create a new, empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of query executions so far.
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::Relaxed)
    }
}

// ============================================================================
// TRACKED QUERIES
// ============================================================================

/// Tokenize a file, trivia included.
///
/// This is a tracked Salsa query - results are memoized and automatically
/// invalidated when the input `FileText` changes.
#[salsa::tracked]
pub fn lex_file(db: &dyn salsa::Database, file_text: FileText) -> TokenList {
    lex(file_text.text(db))
}

// ============================================================================
// SOURCE CACHE
// ============================================================================

/// The lexing cache of one translation unit: one input per buffer.
#[derive(Default)]
pub struct SourceCache {
    db: RootDatabase,
    inputs: FxHashMap<FileId, FileText>,
}

impl std::fmt::Debug for SourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceCache")
            .field("files", &self.inputs.len())
            .field("executions", &self.db.executions())
            .finish()
    }
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens of `file`, re-lexed only if `text` differs from what the cache
    /// last saw for it.
    pub fn tokens(&mut self, file: FileId, text: &str) -> TokenList {
        use salsa::Setter;

        let input = match self.inputs.get(&file).copied() {
            Some(input) => {
                if input.text(&self.db) != text {
                    tracing::trace!(%file, "file text changed");
                    input.set_text(&mut self.db).to(text.to_string());
                }
                input
            }
            None => {
                let input = FileText::new(&self.db, file, text.to_string());
                self.inputs.insert(file, input);
                input
            }
        };
        lex_file(&self.db, input)
    }

    /// Number of lexing runs performed by this cache.
    pub fn lex_runs(&self) -> usize {
        self.db.executions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_creation() {
        let _db = RootDatabase::new();
    }

    #[test]
    fn unchanged_text_is_not_relexed() {
        let mut cache = SourceCache::new();
        let file = FileId::new(0);
        let first = cache.tokens(file, "int a;");
        let runs = cache.lex_runs();
        let second = cache.tokens(file, "int a;");
        assert_eq!(first, second);
        assert_eq!(cache.lex_runs(), runs);

        let third = cache.tokens(file, "int a, b;");
        assert_ne!(first, third);
        assert!(cache.lex_runs() > runs);
    }
}
