//! Symbol occurrences in a file that an external index already knows about.
//!
//! The index records where a symbol was seen when the file was last
//! indexed. The file may have changed since (on disk or in an editor
//! buffer), so every recorded location is checked against the current text
//! and only locations that still spell the symbol's name are reported.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use text_size::{TextRange, TextSize};

use crate::base::{LineCol, LineIndex};
use crate::core::name_pieces;
use crate::error::RefactorError;
use crate::parser::{RawToken, SyntaxKind, lex};
use crate::project::{CompilerArgs, FileOverlay, UnsavedFile};
use crate::syntax::CursorKind;

/// A location recorded by the index, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexedSymbolLocation {
    pub position: LineCol,
    pub kind: CursorKind,
}

impl IndexedSymbolLocation {
    pub fn new(line: u32, column: u32, kind: CursorKind) -> Self {
        Self {
            position: LineCol::new(line, column),
            kind,
        }
    }
}

/// A symbol and every location the index recorded for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedSymbol {
    pub locations: Vec<IndexedSymbolLocation>,
    pub kind: CursorKind,
    /// Plain name, or an Objective-C selector such as `perform:with:`.
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolOccurrenceKind {
    /// The name of the symbol itself.
    MatchingSymbol,
    /// A piece of a multi-piece selector name.
    MatchingSelector,
}

/// One piece of a name as written, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamePiece {
    pub begin: LineCol,
    pub end: LineCol,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolOccurrence {
    pub kind: SymbolOccurrenceKind,
    /// Index into the symbols passed to the search.
    pub symbol_index: usize,
    pub name_pieces: Vec<NamePiece>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolOccurrencesInFile {
    /// The file name as passed to the search.
    pub filename: PathBuf,
    /// Occurrences in source order.
    pub occurrences: Vec<SymbolOccurrence>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolOccurrencesResult {
    files: Vec<SymbolOccurrencesInFile>,
}

impl SymbolOccurrencesResult {
    pub fn num_files(&self) -> usize {
        self.files.len()
    }

    pub fn file(&self, index: usize) -> Option<&SymbolOccurrencesInFile> {
        self.files.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolOccurrencesInFile> {
        self.files.iter()
    }
}

/// Find the occurrences of `symbols` in `path`.
///
/// `args` are the compiler arguments the file is built with; `unsaved`
/// overrides the disk contents of any file, including `path`.
pub fn find_symbol_occurrences_in_indexed_file<S: AsRef<str>>(
    symbols: &[IndexedSymbol],
    path: impl AsRef<Path>,
    args: &[S],
    unsaved: &[UnsavedFile],
) -> Result<SymbolOccurrencesResult, RefactorError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(RefactorError::InvalidArguments("empty file name".to_string()));
    }
    if symbols.is_empty() {
        return Err(RefactorError::InvalidArguments("no symbols given".to_string()));
    }
    CompilerArgs::parse(args)?;
    let overlay = FileOverlay::from_unsaved(unsaved).map_err(RefactorError::InvalidArguments)?;
    let text = overlay.read(path).map_err(|source| RefactorError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let occurrences = find_in_text(symbols, &text);
    tracing::debug!(
        path = %path.display(),
        found = occurrences.len(),
        "verified indexed symbol locations"
    );
    Ok(SymbolOccurrencesResult {
        files: vec![SymbolOccurrencesInFile {
            filename: path.to_path_buf(),
            occurrences,
        }],
    })
}

/// Verify every indexed location of `symbols` against `text`.
fn find_in_text(symbols: &[IndexedSymbol], text: &str) -> Vec<SymbolOccurrence> {
    let tokens: Vec<_> = lex(text)
        .iter()
        .filter(|token| !token.kind.is_trivia())
        .copied()
        .collect();
    let lines = LineIndex::new(text);

    let mut seen = FxHashSet::default();
    let mut found: Vec<(TextSize, SymbolOccurrence)> = Vec::new();
    for (symbol_index, symbol) in symbols.iter().enumerate() {
        let pieces = name_pieces(&symbol.name);
        if pieces.is_empty() {
            continue;
        }
        for location in &symbol.locations {
            let Some(offset) = lines.offset(location.position) else {
                continue;
            };
            let Some(first) = tokens.iter().position(|token| token.range.start() == offset) else {
                continue;
            };
            let Some(ranges) = match_pieces(&tokens[first..], text, &pieces) else {
                continue;
            };
            if !seen.insert((symbol_index, offset)) {
                continue;
            }
            let kind = if pieces.len() > 1 {
                SymbolOccurrenceKind::MatchingSelector
            } else {
                SymbolOccurrenceKind::MatchingSymbol
            };
            let name_pieces = ranges
                .into_iter()
                .map(|range| NamePiece {
                    begin: lines.line_col(range.start()),
                    end: lines.line_col(range.end()),
                })
                .collect();
            found.push((
                offset,
                SymbolOccurrence {
                    kind,
                    symbol_index,
                    name_pieces,
                },
            ));
        }
    }
    found.sort_by_key(|(offset, occurrence)| (*offset, occurrence.symbol_index));
    found.into_iter().map(|(_, occurrence)| occurrence).collect()
}

/// Match the name pieces starting at the first token. Every piece after the
/// first is the next identifier that is followed by `:`.
fn match_pieces(
    tokens: &[RawToken],
    text: &str,
    pieces: &[&str],
) -> Option<Vec<TextRange>> {
    let (head, rest) = pieces.split_first()?;
    let first = tokens.first()?;
    if first.kind != SyntaxKind::IDENT || first.text(text) != *head {
        return None;
    }
    let mut ranges = vec![first.range];
    let mut cursor = 1;
    for piece in rest {
        let next = tokens[cursor..].windows(2).position(|pair| {
            pair[0].kind == SyntaxKind::IDENT
                && pair[0].text(text) == *piece
                && pair[1].kind == SyntaxKind::COLON
        })?;
        ranges.push(tokens[cursor + next].range);
        cursor += next + 2;
    }
    Some(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(name: &str, locations: &[(u32, u32)]) -> IndexedSymbol {
        IndexedSymbol {
            locations: locations
                .iter()
                .map(|&(line, column)| IndexedSymbolLocation::new(line, column, CursorKind::DeclRefExpr))
                .collect(),
            kind: CursorKind::DeclRefExpr,
            name: name.to_string(),
        }
    }

    #[test]
    fn stale_locations_are_dropped() {
        let symbols = [symbol("Test", &[(1, 7), (2, 1), (9, 1)])];
        let found = find_in_text(&symbols, "class Test { };\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name_pieces[0].begin, LineCol::new(1, 7));
        assert_eq!(found[0].name_pieces[0].end, LineCol::new(1, 11));
    }

    #[test]
    fn location_inside_a_longer_word_does_not_match() {
        let symbols = [symbol("Test", &[(1, 1)])];
        assert!(find_in_text(&symbols, "Testing t;\n").is_empty());
    }

    #[test]
    fn selector_pieces_are_matched_in_order() {
        let symbols = [symbol("perform:with:", &[(1, 6)])];
        let found = find_in_text(&symbols, "[obj perform: a with: b];\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, SymbolOccurrenceKind::MatchingSelector);
        let begins: Vec<_> = found[0].name_pieces.iter().map(|piece| piece.begin).collect();
        assert_eq!(begins, [LineCol::new(1, 6), LineCol::new(1, 17)]);
    }
}
