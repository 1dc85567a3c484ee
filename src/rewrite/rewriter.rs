use std::io::{self, Write};
use std::path::Path;

use indexmap::IndexMap;
use tempfile::NamedTempFile;
use text_size::{TextRange, TextSize};

use crate::base::{FileId, SourceBuffer, SourceLocation, SourceRange};
use crate::error::{LocationError, RewriteError};
use crate::index::{File, TranslationUnit};

/// One staged edit, in offsets of the original buffer text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    Replace { range: TextRange, text: String },
    Insert { at: TextSize, text: String },
    Remove { range: TextRange },
}

impl EditOp {
    pub fn range(&self) -> TextRange {
        match self {
            EditOp::Replace { range, .. } | EditOp::Remove { range } => *range,
            EditOp::Insert { at, .. } => TextRange::empty(*at),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            EditOp::Replace { text, .. } | EditOp::Insert { text, .. } => text,
            EditOp::Remove { .. } => "",
        }
    }

    fn is_insertion(&self) -> bool {
        self.range().is_empty()
    }
}

/// The edits staged for one file, in the order they arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBatch {
    file: FileId,
    ops: Vec<EditOp>,
}

impl EditBatch {
    fn new(file: FileId) -> Self {
        Self {
            file,
            ops: Vec::new(),
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    /// Apply the batch to `original` in a single pass.
    ///
    /// Ops are ordered by start offset with insertions first on ties; the
    /// sort is stable, so equal keys keep arrival order. Two ops conflict
    /// when the later one starts before the earlier one ends.
    fn apply(&self, original: &str) -> Result<String, (TextRange, TextRange)> {
        let mut ordered: Vec<&EditOp> = self.ops.iter().collect();
        ordered.sort_by_key(|op| (op.range().start(), !op.is_insertion()));

        let mut out = String::with_capacity(original.len());
        let mut copied = 0usize;
        let mut previous: Option<TextRange> = None;
        for op in ordered {
            let range = op.range();
            if let Some(prev) = previous.filter(|prev| range.start() < prev.end()) {
                return Err((prev, range));
            }
            out.push_str(&original[copied..usize::from(range.start())]);
            out.push_str(op.text());
            copied = range.end().into();
            previous = Some(range);
        }
        out.push_str(&original[copied..]);
        Ok(out)
    }
}

/// Stages edits against a translation unit's buffers.
#[derive(Debug)]
pub struct Rewriter<'tu> {
    unit: &'tu TranslationUnit,
    batches: IndexMap<FileId, EditBatch>,
}

impl<'tu> Rewriter<'tu> {
    pub fn new(unit: &'tu TranslationUnit) -> Self {
        Self {
            unit,
            batches: IndexMap::new(),
        }
    }

    pub fn replace_text(
        &mut self,
        range: SourceRange,
        text: impl Into<String>,
    ) -> Result<(), RewriteError> {
        let (file, range) = self.validate_range(range)?;
        self.stage(file, EditOp::Replace {
            range,
            text: text.into(),
        });
        Ok(())
    }

    pub fn insert_text_before(
        &mut self,
        loc: SourceLocation,
        text: impl Into<String>,
    ) -> Result<(), RewriteError> {
        let buffer = self.buffer(loc.file())?;
        let at = checked_offset(buffer, loc)?;
        self.stage(buffer.id(), EditOp::Insert {
            at,
            text: text.into(),
        });
        Ok(())
    }

    pub fn remove_text(&mut self, range: SourceRange) -> Result<(), RewriteError> {
        let (file, range) = self.validate_range(range)?;
        self.stage(file, EditOp::Remove { range });
        Ok(())
    }

    /// Staged edits of `file`, if any.
    pub fn batch(&self, file: &File<'_>) -> Option<&EditBatch> {
        self.batches.get(&file.id())
    }

    pub fn is_empty(&self) -> bool {
        self.batches.values().all(|batch| batch.ops.is_empty())
    }

    /// The content `file` would have after a commit.
    pub fn rewritten_text(&self, file: &File<'_>) -> Result<String, RewriteError> {
        let buffer = self.buffer(file.id())?;
        match self.batches.get(&file.id()) {
            Some(batch) => rewrite_buffer(buffer, batch),
            None => Ok(buffer.text().to_string()),
        }
    }

    /// Write every file with staged edits and clear the batches.
    ///
    /// Overlapping edits reject the whole commit before anything is written
    /// and leave the batches in place. Otherwise each file is replaced
    /// atomically and the number of files that failed to write is returned.
    pub fn overwrite_changed_files(&mut self) -> Result<usize, RewriteError> {
        let mut pending = Vec::with_capacity(self.batches.len());
        for batch in self.batches.values().filter(|batch| !batch.ops.is_empty()) {
            let buffer = self.buffer(batch.file)?;
            pending.push((buffer.path(), rewrite_buffer(buffer, batch)?));
        }
        self.batches.clear();

        let mut failed = 0;
        for (path, text) in &pending {
            if let Err(err) = write_atomically(path, text) {
                tracing::warn!(path = %path.display(), error = %err, "failed to write rewritten file");
                failed += 1;
            }
        }
        tracing::debug!(files = pending.len(), failed, "committed rewrites");
        Ok(failed)
    }

    fn stage(&mut self, file: FileId, op: EditOp) {
        tracing::trace!(?file, range = ?op.range(), "staged edit");
        self.batches
            .entry(file)
            .or_insert_with(|| EditBatch::new(file))
            .ops
            .push(op);
    }

    fn buffer(&self, file: FileId) -> Result<&'tu SourceBuffer, LocationError> {
        self.unit.files.get(file).ok_or(LocationError::UnknownFile)
    }

    fn validate_range(&self, range: SourceRange) -> Result<(FileId, TextRange), RewriteError> {
        if range.start().file() != range.end().file() {
            return Err(LocationError::CrossBufferRange.into());
        }
        let buffer = self.buffer(range.file())?;
        let start = checked_offset(buffer, range.start())?;
        let end = checked_offset(buffer, range.end())?;
        if end < start {
            return Err(LocationError::InvalidOffset(end.into()).into());
        }
        Ok((buffer.id(), TextRange::new(start, end)))
    }
}

/// Offset of `loc` in `buffer`, rejecting macro-expanded locations and
/// offsets that do not fall on a character boundary.
fn checked_offset(buffer: &SourceBuffer, loc: SourceLocation) -> Result<TextSize, LocationError> {
    let offset = loc.offset();
    if loc.is_macro_expansion()
        || offset > buffer.len()
        || !buffer.text().is_char_boundary(offset.into())
    {
        return Err(LocationError::InvalidOffset(offset.into()));
    }
    Ok(offset)
}

fn rewrite_buffer(buffer: &SourceBuffer, batch: &EditBatch) -> Result<String, RewriteError> {
    batch
        .apply(buffer.text())
        .map_err(|(first, second)| RewriteError::OverlappingEdits {
            file: buffer.path().to_path_buf(),
            first,
            second,
        })
}

/// Replace `path` through a temporary file in the same directory, so readers
/// see either the old or the new content.
fn write_atomically(path: &Path, text: &str) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(text.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(ops: Vec<EditOp>) -> EditBatch {
        EditBatch {
            file: FileId::new(0),
            ops,
        }
    }

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    #[test]
    fn applies_edits_in_offset_order() {
        let edits = batch(vec![
            EditOp::Remove { range: range(10, 11) },
            EditOp::Replace {
                range: range(4, 8),
                text: "start".to_string(),
            },
        ]);
        assert_eq!(edits.apply("int main() {}").unwrap(), "int start( {}");
    }

    #[test]
    fn insertion_goes_before_replacement_at_same_offset() {
        let edits = batch(vec![
            EditOp::Replace {
                range: range(4, 8),
                text: "MAIN".to_string(),
            },
            EditOp::Insert {
                at: 4.into(),
                text: "_".to_string(),
            },
        ]);
        assert_eq!(edits.apply("int main();").unwrap(), "int _MAIN();");
    }

    #[test]
    fn adjacent_edits_do_not_conflict() {
        let edits = batch(vec![
            EditOp::Remove { range: range(0, 4) },
            EditOp::Insert {
                at: 4.into(),
                text: "long ".to_string(),
            },
            EditOp::Replace {
                range: range(4, 8),
                text: "x".to_string(),
            },
        ]);
        assert_eq!(edits.apply("int main;").unwrap(), "long x;");
    }

    #[test]
    fn insertions_at_one_offset_keep_arrival_order() {
        let edits = batch(vec![
            EditOp::Insert {
                at: 0.into(),
                text: "a".to_string(),
            },
            EditOp::Insert {
                at: 0.into(),
                text: "b".to_string(),
            },
        ]);
        assert_eq!(edits.apply("c").unwrap(), "abc");
    }

    #[test]
    fn overlapping_edits_are_rejected() {
        let edits = batch(vec![
            EditOp::Remove { range: range(0, 6) },
            EditOp::Remove { range: range(4, 8) },
        ]);
        assert_eq!(edits.apply("0123456789"), Err((range(0, 6), range(4, 8))));
    }

    #[test]
    fn insertion_inside_a_range_is_an_overlap() {
        let edits = batch(vec![
            EditOp::Remove { range: range(2, 6) },
            EditOp::Insert {
                at: 4.into(),
                text: "x".to_string(),
            },
        ]);
        assert!(edits.apply("0123456789").is_err());
    }

    #[test]
    fn atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.c");
        std::fs::write(&path, "old").unwrap();
        write_atomically(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
