//! Diagnostics — compiler messages attached to a translation unit.
//!
//! Diagnostics are regenerated wholesale on every (re)parse. They are data,
//! never API errors.

use std::fmt::Write as _;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::base::{FileSet, SourceLocation, SourceRange};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Ignored,
    Note,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Ignored => "ignored",
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal error",
        }
    }
}

/// Front-end phase that produced a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    Lexical,
    Parse,
    Semantic,
}

impl DiagnosticCategory {
    pub fn id(self) -> u32 {
        match self {
            DiagnosticCategory::Lexical => 1,
            DiagnosticCategory::Parse => 2,
            DiagnosticCategory::Semantic => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DiagnosticCategory::Lexical => "Lexical or Preprocessor Issue",
            DiagnosticCategory::Parse => "Parse Issue",
            DiagnosticCategory::Semantic => "Semantic Issue",
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// `None` for diagnostics not tied to a source position.
    pub location: Option<SourceLocation>,
    pub ranges: Vec<SourceRange>,
    pub category: DiagnosticCategory,
    /// Warning flag that controls this diagnostic, e.g. `-W#warnings`.
    pub option: Option<String>,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        category: DiagnosticCategory,
        message: impl Into<String>,
        location: Option<SourceLocation>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            location,
            ranges: Vec::new(),
            category,
            option: None,
        }
    }

    pub fn error(
        category: DiagnosticCategory,
        message: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self::new(Severity::Error, category, message, Some(location))
    }

    pub fn warning(
        category: DiagnosticCategory,
        message: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self::new(Severity::Warning, category, message, Some(location))
    }

    pub fn fatal(
        category: DiagnosticCategory,
        message: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self::new(Severity::Fatal, category, message, Some(location))
    }

    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.ranges.push(range);
        self
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity >= Severity::Error
    }

    /// Render in the usual `file:line:col: error: message` form.
    pub fn format(&self, files: &FileSet, options: DiagnosticDisplayOptions) -> String {
        let mut out = String::new();
        if options.contains(DiagnosticDisplayOptions::SOURCE_LOCATION) {
            if let Some(loc) = self.location {
                let expansion = loc.expansion();
                if let Some(buffer) = files.get(expansion.file) {
                    let lc = buffer.line_col(expansion.offset);
                    let _ = write!(out, "{}:{}", buffer.name().display(), lc.line);
                    if options.contains(DiagnosticDisplayOptions::COLUMN) {
                        let _ = write!(out, ":{}", lc.col);
                    }
                    if options.contains(DiagnosticDisplayOptions::SOURCE_RANGES) {
                        for range in &self.ranges {
                            let start = buffer.line_col(range.start().offset());
                            let end = buffer.line_col(range.end().offset());
                            let _ = write!(out, "{{{start}-{end}}}");
                        }
                    }
                    out.push_str(": ");
                }
            }
        }
        let _ = write!(out, "{}: {}", self.severity.label(), self.message);

        let mut extra = Vec::new();
        if options.contains(DiagnosticDisplayOptions::OPTION) {
            if let Some(option) = &self.option {
                extra.push(option.clone());
            }
        }
        if options.contains(DiagnosticDisplayOptions::CATEGORY_ID) {
            extra.push(self.category.id().to_string());
        }
        if options.contains(DiagnosticDisplayOptions::CATEGORY_NAME) {
            extra.push(self.category.name().to_string());
        }
        if !extra.is_empty() {
            let _ = write!(out, " [{}]", extra.join(","));
        }
        out
    }
}

bitflags! {
    /// What to include when rendering a diagnostic.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DiagnosticDisplayOptions: u8 {
        const SOURCE_LOCATION = 1 << 0;
        const COLUMN = 1 << 1;
        const SOURCE_RANGES = 1 << 2;
        const OPTION = 1 << 3;
        const CATEGORY_ID = 1 << 4;
        const CATEGORY_NAME = 1 << 5;
    }
}

impl Default for DiagnosticDisplayOptions {
    fn default() -> Self {
        Self::SOURCE_LOCATION | Self::COLUMN | Self::OPTION
    }
}

// ============================================================================
// COLLECTION
// ============================================================================

/// Collects diagnostics for one front-end run.
///
/// After a fatal error everything else is dropped unless `keep_going` is set.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    fatal_seen: bool,
    keep_going: bool,
}

impl DiagnosticSink {
    pub fn new(keep_going: bool) -> Self {
        Self {
            keep_going,
            ..Self::default()
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.fatal_seen && !self.keep_going {
            tracing::trace!(message = %diagnostic.message, "suppressed after fatal error");
            return;
        }
        if diagnostic.severity == Severity::Fatal {
            self.fatal_seen = true;
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    pub fn has_fatal(&self) -> bool {
        self.fatal_seen
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use std::path::Path;
    use text_size::TextSize;

    #[test]
    fn format_with_location() {
        let mut files = FileSet::new();
        let path = Path::new("main.cpp");
        let (file, _) = files.upsert(path, path, "int main() {\n  foo.baz = 8;\n}\n");
        let diag = Diagnostic::error(
            DiagnosticCategory::Semantic,
            "no member named 'baz' in 'Foo'",
            SourceLocation::new(file, TextSize::new(19)),
        );
        assert_eq!(
            diag.format(&files, DiagnosticDisplayOptions::default()),
            "main.cpp:2:7: error: no member named 'baz' in 'Foo'"
        );
        assert_eq!(
            diag.format(
                &files,
                DiagnosticDisplayOptions::default() | DiagnosticDisplayOptions::CATEGORY_NAME
            ),
            "main.cpp:2:7: error: no member named 'baz' in 'Foo' [Semantic Issue]"
        );
    }

    #[test]
    fn sink_drops_after_fatal() {
        let loc = SourceLocation::new(FileId::new(0), TextSize::new(0));
        let mut sink = DiagnosticSink::new(false);
        sink.push(Diagnostic::fatal(DiagnosticCategory::Lexical, "'x.h' file not found", loc));
        sink.push(Diagnostic::error(DiagnosticCategory::Parse, "expected ';'", loc));
        assert_eq!(sink.into_vec().len(), 1);

        let mut sink = DiagnosticSink::new(true);
        sink.push(Diagnostic::fatal(DiagnosticCategory::Lexical, "'x.h' file not found", loc));
        sink.push(Diagnostic::error(DiagnosticCategory::Parse, "expected ';'", loc));
        assert_eq!(sink.into_vec().len(), 2);
    }
}
