//! The translation unit: buffers, AST arena, diagnostics and preprocessing
//! records of one parsed main file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::cursor::Cursor;
use super::frontend::{FrontendOutput, UnitConfig};
use super::options::{IndexOptions, TranslationUnitFlags};
use crate::base::{FileId, FileSet, SourceRange};
use crate::hir::{Diagnostic, DiagnosticDisplayOptions, SourceCache};
use crate::parser::{Inclusion, LangOptions};
use crate::syntax::Ast;

/// Where a unit is in its parse lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReparseState {
    /// Up to date with the last front-end run.
    Parsed,
    /// A dependency changed on disk since the last run.
    Stale,
    Reparsing,
    /// The last reparse failed; the previous results are still in place.
    Failed,
}

pub struct TranslationUnit {
    pub(crate) config: UnitConfig,
    pub(crate) options: IndexOptions,
    pub(crate) files: FileSet,
    pub(crate) main: FileId,
    pub(crate) ast: Ast,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) skipped: Vec<SourceRange>,
    pub(crate) inclusions: Vec<Inclusion>,
    pub(crate) state: ReparseState,
    pub(crate) generation: u64,
    pub(crate) cache: SourceCache,
}

impl std::fmt::Debug for TranslationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationUnit")
            .field("main", &self.config.main)
            .field("files", &self.files.len())
            .field("nodes", &self.ast.len())
            .field("diagnostics", &self.diagnostics.len())
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish()
    }
}

impl TranslationUnit {
    pub(crate) fn from_frontend(
        config: UnitConfig,
        options: IndexOptions,
        files: FileSet,
        cache: SourceCache,
        output: FrontendOutput,
    ) -> Self {
        Self {
            config,
            options,
            files,
            main: output.main,
            ast: output.ast,
            diagnostics: output.diagnostics,
            skipped: output.skipped,
            inclusions: output.inclusions,
            state: ReparseState::Parsed,
            generation: 0,
            cache,
        }
    }

    /// The translation-unit cursor; its extent covers the whole main file.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(self, self.ast.root())
    }

    /// Main file path as given at creation.
    pub fn spelling(&self) -> &Path {
        &self.config.main
    }

    pub fn main_file_id(&self) -> FileId {
        self.main
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn num_diagnostics(&self) -> usize {
        self.diagnostics.len()
    }

    /// Diagnostics rendered the way a compiler prints them.
    pub fn format_diagnostics(&self, options: DiagnosticDisplayOptions) -> Vec<String> {
        self.diagnostics
            .iter()
            .map(|d| d.format(&self.files, options))
            .collect()
    }

    pub fn lang_options(&self) -> &LangOptions {
        &self.config.lang
    }

    /// Compiler arguments the unit was created with, driver excluded.
    pub fn arguments(&self) -> &[String] {
        &self.config.args
    }

    pub fn flags(&self) -> TranslationUnitFlags {
        self.config.flags
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    /// `#include` directives that were followed, in processing order.
    pub fn inclusions(&self) -> &[Inclusion] {
        &self.inclusions
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn state(&self) -> ReparseState {
        self.state
    }

    /// Number of successful reparses since creation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Raw lexing runs performed for this unit so far.
    pub fn lex_runs(&self) -> usize {
        self.cache.lex_runs()
    }
}
