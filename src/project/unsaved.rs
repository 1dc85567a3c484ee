//! Unsaved buffers supplied by the client.
//!
//! An [`UnsavedFile`] shadows the file on disk with the same normalized
//! path for the duration of one parse or reparse.

use std::borrow::Cow;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Contents of a file that has not been written to disk yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsavedFile {
    pub filename: PathBuf,
    pub contents: String,
}

impl UnsavedFile {
    pub fn new(filename: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            contents: contents.into(),
        }
    }
}

/// Make `path` absolute against the current directory and resolve `.` and
/// `..` lexically. Symlinks are left alone.
pub fn normalize_path(path: &Path) -> PathBuf {
    let joined;
    let path = if path.is_absolute() {
        path
    } else {
        joined = std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf());
        &joined
    };

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Reads files through the unsaved overrides, falling back to disk.
#[derive(Debug, Clone, Default)]
pub struct FileOverlay {
    files: FxHashMap<PathBuf, Arc<str>>,
}

impl FileOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the overlay for one parse. An override without a file name is
    /// rejected, the message names the offending entry.
    pub fn from_unsaved(unsaved: &[UnsavedFile]) -> Result<Self, String> {
        let mut files = FxHashMap::default();
        for (idx, file) in unsaved.iter().enumerate() {
            if file.filename.as_os_str().is_empty() {
                return Err(format!("unsaved file #{idx} has an empty file name"));
            }
            files.insert(
                normalize_path(&file.filename),
                Arc::from(file.contents.as_str()),
            );
        }
        Ok(Self { files })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The override for `path`, if any.
    pub fn get(&self, path: &Path) -> Option<&str> {
        self.files.get(&normalize_path(path)).map(|text| &**text)
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.get(path).is_some() || normalize_path(path).is_file()
    }

    /// Text of `path`: the override when present, otherwise the disk file.
    pub fn read(&self, path: &Path) -> io::Result<Cow<'_, str>> {
        if let Some(text) = self.get(path) {
            return Ok(Cow::Borrowed(text));
        }
        let bytes = std::fs::read(normalize_path(path))?;
        Ok(Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_is_lexical() {
        assert_eq!(
            normalize_path(Path::new("/a/./b/../c.h")),
            PathBuf::from("/a/c.h")
        );
        assert!(normalize_path(Path::new("x.c")).is_absolute());
    }

    #[test]
    fn override_shadows_disk() {
        let overlay =
            FileOverlay::from_unsaved(&[UnsavedFile::new("/nowhere/a.c", "int a;")]).unwrap();
        assert!(overlay.exists(Path::new("/nowhere/./a.c")));
        assert_eq!(overlay.read(Path::new("/nowhere/a.c")).unwrap(), "int a;");
        assert!(overlay.read(Path::new("/nowhere/b.c")).is_err());
    }

    #[test]
    fn empty_file_name_is_rejected() {
        assert!(FileOverlay::from_unsaved(&[UnsavedFile::new("", "x")]).is_err());
    }
}
