//! Reparse state machine.
//!
//! ```text
//! Parsed ──check_stale──▶ Stale
//!   │                       │
//!   └──────reparse──────────┴──▶ Reparsing ──▶ Parsed | Failed
//! ```
//!
//! A reparse builds the new results next to the old ones and swaps them in
//! only on success, so a failed reparse leaves the tree, diagnostics,
//! buffers and generation exactly as they were.

use super::frontend;
use super::options::ReparseFlags;
use super::unit::{ReparseState, TranslationUnit};
use crate::error::ReparseError;
use crate::project::{FileOverlay, UnsavedFile};

impl TranslationUnit {
    /// Compare every on-disk dependency with the buffer the unit saw. Marks
    /// the unit [`ReparseState::Stale`] and returns `true` when one differs
    /// or disappeared.
    pub fn check_stale(&mut self) -> bool {
        let stale = self
            .files
            .iter()
            .filter(|buffer| buffer.path().is_absolute())
            .any(|buffer| match std::fs::read(buffer.path()) {
                Ok(bytes) => String::from_utf8_lossy(&bytes) != buffer.text(),
                Err(_) => true,
            });
        if stale && self.state == ReparseState::Parsed {
            tracing::debug!(main = %self.config.main.display(), "unit is stale");
            self.state = ReparseState::Stale;
        }
        stale
    }

    /// Run the front end again. `unsaved` shadows disk for this call only.
    ///
    /// A malformed override is rejected before the state machine moves, so
    /// the unit keeps its current state.
    pub fn reparse(
        &mut self,
        unsaved: &[UnsavedFile],
        _flags: ReparseFlags,
    ) -> Result<(), ReparseError> {
        let overlay = FileOverlay::from_unsaved(unsaved).map_err(ReparseError::InvalidArguments)?;

        let previous = self.state;
        self.state = ReparseState::Reparsing;
        tracing::debug!(
            main = %self.config.main.display(),
            ?previous,
            overrides = overlay.len(),
            "reparsing"
        );

        let mut files = self.files.clone();
        let result = frontend::run(
            &self.config,
            &self.options,
            &mut files,
            &mut self.cache,
            &overlay,
        );
        match result {
            Ok(output) => {
                self.files = files;
                self.main = output.main;
                self.ast = output.ast;
                self.diagnostics = output.diagnostics;
                self.skipped = output.skipped;
                self.inclusions = output.inclusions;
                self.generation += 1;
                self.state = ReparseState::Parsed;
                tracing::debug!(
                    generation = self.generation,
                    diagnostics = self.diagnostics.len(),
                    "reparse finished"
                );
                Ok(())
            }
            Err(source) => {
                tracing::warn!(main = %self.config.main.display(), error = %source, "reparse failed");
                self.state = ReparseState::Failed;
                Err(ReparseError::Failure {
                    path: self.config.main.clone(),
                    source,
                })
            }
        }
    }
}
