//! Line/column conversion for source text.
//!
//! Lines and columns are 1-based; columns count bytes, the way compiler
//! diagnostics report them.

use text_size::TextSize;

/// A 1-based line/column pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl std::fmt::Display for LineCol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Offsets of every line start in a text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::new(offset as u32 + 1));
            }
        }
        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    pub fn len(&self) -> TextSize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == TextSize::new(0)
    }

    /// Line/column of `offset`. Offsets past the end clamp to the end.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let start = self.line_starts[line - 1];
        LineCol::new(line as u32, u32::from(offset - start) + 1)
    }

    /// Offset of the first byte of `line`.
    pub fn line_start(&self, line: u32) -> Option<TextSize> {
        let idx = (line as usize).checked_sub(1)?;
        self.line_starts.get(idx).copied()
    }

    /// Offset just past the last character of `line`, excluding the newline.
    pub fn line_end(&self, line: u32) -> Option<TextSize> {
        let idx = (line as usize).checked_sub(1)?;
        if idx >= self.line_starts.len() {
            return None;
        }
        match self.line_starts.get(idx + 1) {
            Some(next) => Some(*next - TextSize::new(1)),
            None => Some(self.len),
        }
    }

    /// Offset of a line/column pair. The column may point one past the last
    /// character of the line.
    pub fn offset(&self, pos: LineCol) -> Option<TextSize> {
        if pos.col == 0 {
            return None;
        }
        let start = self.line_start(pos.line)?;
        let end = self.line_end(pos.line)?;
        let col = TextSize::new(pos.col - 1);
        (col <= end - start).then(|| start + col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_is_one_based() {
        let index = LineIndex::new("ab\ncd\n");
        assert_eq!(index.line_col(TextSize::new(0)), LineCol::new(1, 1));
        assert_eq!(index.line_col(TextSize::new(2)), LineCol::new(1, 3));
        assert_eq!(index.line_col(TextSize::new(3)), LineCol::new(2, 1));
        assert_eq!(index.line_col(TextSize::new(6)), LineCol::new(3, 1));
    }

    #[test]
    fn offset_allows_one_past_line_end() {
        let index = LineIndex::new("int main() { return 0; }");
        assert_eq!(index.offset(LineCol::new(1, 25)), Some(TextSize::new(24)));
        assert_eq!(index.offset(LineCol::new(1, 26)), None);
        assert_eq!(index.offset(LineCol::new(2, 1)), None);
        assert_eq!(index.offset(LineCol::new(1, 0)), None);
    }

    #[test]
    fn offset_rejects_huge_column() {
        let index = LineIndex::new("int a;\nint b;\n");
        assert_eq!(index.offset(LineCol::new(2, u32::MAX)), None);
        assert_eq!(index.offset(LineCol::new(1, u32::MAX)), None);
    }

    #[test]
    fn offset_round_trips() {
        let text = "#ifdef A\nfoo();\n#endif\n";
        let index = LineIndex::new(text);
        for offset in 0..=text.len() as u32 {
            let lc = index.line_col(TextSize::new(offset));
            assert_eq!(index.offset(lc), Some(TextSize::new(offset)));
        }
    }
}
