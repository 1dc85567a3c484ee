//! Location resolution: files, line/column conversion, ranges and skipped
//! preprocessor blocks.

use std::path::{Path, PathBuf};

use text_size::TextSize;

use super::unit::TranslationUnit;
use crate::base::{FileId, SourceBuffer, SourceLocation, SourceRange, SpellingLocation};
use crate::error::LocationError;
use crate::project::normalize_path;

/// A buffer of a translation unit.
#[derive(Debug, Clone, Copy)]
pub struct File<'tu> {
    buffer: &'tu SourceBuffer,
}

impl PartialEq for File<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.buffer, other.buffer)
    }
}

impl Eq for File<'_> {}

impl<'tu> File<'tu> {
    pub fn id(&self) -> FileId {
        self.buffer.id()
    }

    /// The path as it was given, by the client or by the include directive.
    pub fn name(&self) -> &'tu Path {
        self.buffer.name()
    }

    /// Canonical absolute path, or the normalized path when the file is not
    /// on disk.
    pub fn real_path(&self) -> PathBuf {
        std::fs::canonicalize(self.buffer.path()).unwrap_or_else(|_| self.buffer.path().to_path_buf())
    }

    pub fn contents(&self) -> &'tu str {
        self.buffer.text()
    }

    pub fn version(&self) -> u32 {
        self.buffer.version()
    }

    pub fn buffer(&self) -> &'tu SourceBuffer {
        self.buffer
    }
}

impl TranslationUnit {
    /// Look up a file of this unit by path. Relative paths are resolved
    /// against the current directory, then compared with the names the
    /// files were opened under.
    pub fn file(&self, path: impl AsRef<Path>) -> Option<File<'_>> {
        let path = path.as_ref();
        let id = self.files.lookup(&normalize_path(path)).or_else(|| {
            self.files
                .iter()
                .find(|buffer| buffer.name() == path)
                .map(SourceBuffer::id)
        })?;
        self.file_by_id(id)
    }

    pub fn file_by_id(&self, id: FileId) -> Option<File<'_>> {
        self.files.get(id).map(|buffer| File { buffer })
    }

    pub fn main_file(&self) -> Option<File<'_>> {
        self.file_by_id(self.main)
    }

    fn buffer_of(&self, file: &File<'_>) -> Result<&SourceBuffer, LocationError> {
        self.files
            .get(file.id())
            .filter(|buffer| std::ptr::eq(*buffer, file.buffer))
            .ok_or(LocationError::UnknownFile)
    }

    /// Location of a 1-based line/column in `file`. The column may point one
    /// past the last character of the line.
    pub fn location(
        &self,
        file: &File<'_>,
        line: u32,
        column: u32,
    ) -> Result<SourceLocation, LocationError> {
        let buffer = self.buffer_of(file)?;
        let offset = buffer
            .offset(line, column)
            .ok_or(LocationError::InvalidLocation { line, column })?;
        Ok(SourceLocation::new(buffer.id(), offset))
    }

    pub fn location_for_offset(
        &self,
        file: &File<'_>,
        offset: u32,
    ) -> Result<SourceLocation, LocationError> {
        let buffer = self.buffer_of(file)?;
        let offset = TextSize::new(offset);
        if offset > buffer.len() {
            return Err(LocationError::InvalidOffset(offset.into()));
        }
        Ok(SourceLocation::new(buffer.id(), offset))
    }

    fn resolve(&self, file: FileId, offset: TextSize) -> Result<SpellingLocation, LocationError> {
        let buffer = self.files.get(file).ok_or(LocationError::UnknownFile)?;
        let lc = buffer.line_col(offset);
        Ok(SpellingLocation {
            file,
            line: lc.line,
            column: lc.col,
            offset,
        })
    }

    /// Where the characters of `loc` are written. For a token produced by a
    /// macro this is inside the macro definition.
    pub fn spelling_location(&self, loc: SourceLocation) -> Result<SpellingLocation, LocationError> {
        let spelling = loc.spelling();
        self.resolve(spelling.file, spelling.offset)
    }

    /// Where `loc` appears in the token stream; the macro use for expanded
    /// tokens.
    pub fn expansion_location(&self, loc: SourceLocation) -> Result<SpellingLocation, LocationError> {
        let expansion = loc.expansion();
        self.resolve(expansion.file, expansion.offset)
    }

    pub fn range(
        &self,
        start: SourceLocation,
        end: SourceLocation,
    ) -> Result<SourceRange, LocationError> {
        if start.file() != end.file() {
            return Err(LocationError::CrossBufferRange);
        }
        if end.offset() < start.offset() {
            let lc = self.expansion_location(end)?;
            return Err(LocationError::InvalidLocation {
                line: lc.line,
                column: lc.column,
            });
        }
        Ok(SourceRange::new(start, end))
    }

    pub fn is_in_main_file(&self, loc: SourceLocation) -> bool {
        loc.file() == self.main
    }

    /// Disabled conditional blocks of `file`, in source order.
    pub fn skipped_ranges(&self, file: &File<'_>) -> Vec<SourceRange> {
        let mut ranges: Vec<SourceRange> = self
            .skipped
            .iter()
            .filter(|range| range.file() == file.id())
            .copied()
            .collect();
        ranges.sort_by_key(|range| range.start().offset());
        ranges
    }

    /// Disabled conditional blocks of every file, in the order the
    /// preprocessor met them.
    pub fn all_skipped_ranges(&self) -> &[SourceRange] {
        &self.skipped
    }
}
