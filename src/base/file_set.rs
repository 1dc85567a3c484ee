use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use super::{FileId, SourceBuffer};

/// Every buffer a translation unit has loaded, keyed by normalized path.
#[derive(Clone, Debug, Default)]
pub struct FileSet {
    buffers: Vec<SourceBuffer>,
    by_path: FxHashMap<PathBuf, FileId>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: FileId) -> Option<&SourceBuffer> {
        self.buffers.get(id.index())
    }

    pub fn lookup(&self, path: &Path) -> Option<FileId> {
        self.by_path.get(path).copied()
    }

    /// Insert a buffer for `path`, or refresh the existing one.
    ///
    /// Returns the id and whether the stored text changed. A refreshed
    /// buffer gets the next version number.
    pub fn upsert(&mut self, name: &Path, path: &Path, text: &str) -> (FileId, bool) {
        if let Some(id) = self.lookup(path) {
            let slot = &mut self.buffers[id.index()];
            if slot.text() == text {
                return (id, false);
            }
            *slot = slot.with_text(text);
            return (id, true);
        }
        let id = FileId::new(self.buffers.len() as u32);
        self.buffers.push(SourceBuffer::new(
            id,
            name.to_path_buf(),
            path.to_path_buf(),
            text,
        ));
        self.by_path.insert(path.to_path_buf(), id);
        (id, true)
    }

    /// Append an already-built buffer, as done when loading a saved unit.
    pub(crate) fn push(&mut self, buffer: SourceBuffer) -> FileId {
        let id = FileId::new(self.buffers.len() as u32);
        let buffer = SourceBuffer::new(
            id,
            buffer.name().to_path_buf(),
            buffer.path().to_path_buf(),
            buffer.shared_text(),
        )
        .with_version(buffer.version());
        self.by_path.insert(buffer.path().to_path_buf(), id);
        self.buffers.push(buffer);
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceBuffer> {
        self.buffers.iter()
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}
