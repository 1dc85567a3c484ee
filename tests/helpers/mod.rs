//! Shared test helpers.
//!
//! Every test works in its own scratch directory, so tests can run in
//! parallel without touching the current directory.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use cxindex::index::{ChildVisit, Cursor, Index, IndexOptions, TranslationUnit, TranslationUnitFlags};
use cxindex::syntax::CursorKind;
use tempfile::TempDir;

/// A scratch directory holding the files of one test.
pub struct Workspace {
    dir: TempDir,
    pub index: Index,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create scratch directory"),
            index: Index::new(IndexOptions::default()),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `contents` to `name`, creating parent directories.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent directory");
        }
        std::fs::write(&path, contents).expect("write test file");
        path
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path(name)).expect("read test file")
    }

    /// Parse `name` with `args` and the editing flags.
    pub fn parse(&self, name: &str, args: &[&str]) -> TranslationUnit {
        self.index
            .parse(self.path(name), args, &[], TranslationUnitFlags::editing())
            .expect("parse translation unit")
    }
}

/// First cursor of `kind` in a pre-order walk from the unit cursor.
pub fn find_cursor(unit: &TranslationUnit, kind: CursorKind) -> Option<Cursor<'_>> {
    let mut found = None;
    unit.cursor().visit_children(|cursor, _parent| {
        if cursor.kind() == kind {
            found = Some(cursor);
            return ChildVisit::Break;
        }
        ChildVisit::Recurse
    });
    found
}

/// Every cursor of `kind`, in pre-order.
pub fn find_all(unit: &TranslationUnit, kind: CursorKind) -> Vec<Cursor<'_>> {
    let mut found = Vec::new();
    unit.cursor().visit_children(|cursor, _parent| {
        if cursor.kind() == kind {
            found.push(cursor);
        }
        ChildVisit::Recurse
    });
    found
}

pub fn diagnostic_messages(unit: &TranslationUnit) -> Vec<String> {
    unit.diagnostics()
        .iter()
        .map(|diagnostic| diagnostic.message.to_string())
        .collect()
}
