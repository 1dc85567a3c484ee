use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use text_size::{TextRange, TextSize};

use super::{FileId, LineCol, LineIndex};

/// The contents of one file as seen by a translation unit.
///
/// The line index is computed on first use and belongs to this value, so it
/// always matches the text of this version.
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    id: FileId,
    name: PathBuf,
    path: PathBuf,
    text: Arc<str>,
    version: u32,
    line_index: OnceLock<LineIndex>,
}

impl SourceBuffer {
    /// `name` is the path as spelled by the client or the include directive,
    /// `path` the normalized absolute path used as identity.
    pub fn new(id: FileId, name: PathBuf, path: PathBuf, text: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            name,
            path,
            text: text.into(),
            version: 0,
            line_index: OnceLock::new(),
        }
    }

    /// Same identity with new contents and the next version number.
    pub fn with_text(&self, text: impl Into<Arc<str>>) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            path: self.path.clone(),
            text: text.into(),
            version: self.version + 1,
            line_index: OnceLock::new(),
        }
    }

    pub(crate) fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &Path {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn shared_text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> TextSize {
        TextSize::of(&*self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_index(&self) -> &LineIndex {
        self.line_index.get_or_init(|| LineIndex::new(&self.text))
    }

    pub fn line_col(&self, offset: TextSize) -> LineCol {
        self.line_index().line_col(offset)
    }

    pub fn offset(&self, line: u32, col: u32) -> Option<TextSize> {
        self.line_index().offset(LineCol::new(line, col))
    }

    pub fn slice(&self, range: TextRange) -> Option<&str> {
        self.text.get(std::ops::Range::<usize>::from(range))
    }
}
