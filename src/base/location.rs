//! Source locations and ranges.
//!
//! A location records where a token was spelled. Tokens produced by a macro
//! expansion additionally record the expansion site (the macro use), which
//! is what cursors and extents are reported against.

use serde::{Deserialize, Serialize};
use text_size::{TextRange, TextSize};

use super::FileId;

/// A byte offset in a specific buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileLoc {
    pub file: FileId,
    pub offset: TextSize,
}

impl FileLoc {
    pub const fn new(file: FileId, offset: TextSize) -> Self {
        Self { file, offset }
    }
}

/// A location in a translation unit.
///
/// Absent locations are expressed as `Option<SourceLocation>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    spelling: FileLoc,
    expansion: Option<FileLoc>,
}

impl SourceLocation {
    pub const fn new(file: FileId, offset: TextSize) -> Self {
        Self {
            spelling: FileLoc::new(file, offset),
            expansion: None,
        }
    }

    pub const fn macro_expansion(spelling: FileLoc, expansion: FileLoc) -> Self {
        Self {
            spelling,
            expansion: Some(expansion),
        }
    }

    /// Where the characters of the token live.
    pub fn spelling(&self) -> FileLoc {
        self.spelling
    }

    /// Where the token appears in the translation unit's token stream.
    pub fn expansion(&self) -> FileLoc {
        self.expansion.unwrap_or(self.spelling)
    }

    pub fn is_macro_expansion(&self) -> bool {
        self.expansion.is_some()
    }

    pub fn file(&self) -> FileId {
        self.expansion().file
    }

    pub fn offset(&self) -> TextSize {
        self.expansion().offset
    }
}

/// A half-open range between two locations of one buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    start: SourceLocation,
    end: SourceLocation,
}

impl SourceRange {
    pub const fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    /// An empty range at `loc`, i.e. an insertion point.
    pub const fn empty(loc: SourceLocation) -> Self {
        Self {
            start: loc,
            end: loc,
        }
    }

    pub fn start(&self) -> SourceLocation {
        self.start
    }

    pub fn end(&self) -> SourceLocation {
        self.end
    }

    pub fn file(&self) -> FileId {
        self.start.file()
    }

    /// Offsets of the range in its expansion buffer.
    pub fn text_range(&self) -> TextRange {
        let start = self.start.offset();
        let end = self.end.offset().max(start);
        TextRange::new(start, end)
    }

    pub fn is_empty(&self) -> bool {
        self.text_range().is_empty()
    }

    pub fn contains(&self, loc: SourceLocation) -> bool {
        loc.file() == self.file() && self.text_range().contains(loc.offset())
    }

    /// Smallest range covering both.
    pub fn cover(&self, other: SourceRange) -> SourceRange {
        let start = if other.start.offset() < self.start.offset() {
            other.start
        } else {
            self.start
        };
        let end = if other.end.offset() > self.end.offset() {
            other.end
        } else {
            self.end
        };
        SourceRange::new(start, end)
    }
}

/// A location resolved to line/column in the buffer where it was spelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpellingLocation {
    pub file: FileId,
    pub line: u32,
    pub column: u32,
    pub offset: TextSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_location_reports_expansion_site() {
        let def = FileLoc::new(FileId::new(0), TextSize::new(14));
        let usage = FileLoc::new(FileId::new(0), TextSize::new(40));
        let loc = SourceLocation::macro_expansion(def, usage);
        assert!(loc.is_macro_expansion());
        assert_eq!(loc.spelling(), def);
        assert_eq!(loc.expansion(), usage);
        assert_eq!(loc.offset(), TextSize::new(40));
    }

    #[test]
    fn range_is_half_open() {
        let file = FileId::new(1);
        let range = SourceRange::new(
            SourceLocation::new(file, TextSize::new(4)),
            SourceLocation::new(file, TextSize::new(8)),
        );
        assert!(range.contains(SourceLocation::new(file, TextSize::new(4))));
        assert!(!range.contains(SourceLocation::new(file, TextSize::new(8))));
        assert!(!range.contains(SourceLocation::new(FileId::new(2), TextSize::new(5))));
    }
}
