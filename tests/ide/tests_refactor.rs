//! Refactoring queries.

use crate::helpers::*;
use cxindex::error::RefactorError;
use cxindex::ide::{
    IndexedSymbol, IndexedSymbolLocation, RefactoringActionType, SymbolOccurrenceKind,
    find_renamed_cursor, find_symbol_occurrences_in_indexed_file,
};
use cxindex::project::UnsavedFile;
use cxindex::syntax::CursorKind;
use cxindex::{LineCol, SourceRange};

const NO_ARGS: [&str; 0] = [];

#[test]
fn test_refactoring_action_name() {
    assert_eq!(RefactoringActionType::Rename.name(), "Rename");
}

#[test]
fn test_find_renamed_cursor_on_declaration() {
    let ws = Workspace::new();
    ws.write("test.cpp", "int renamable = 0;\n");
    let unit = ws.parse("test.cpp", &[]);
    let file = unit.file(ws.path("test.cpp")).unwrap();

    let loc = unit.location(&file, 1, 5).unwrap();
    let cursor = find_renamed_cursor(&unit, loc, SourceRange::new(loc, loc)).unwrap();
    assert_eq!(cursor.kind(), CursorKind::VarDecl);
    assert_eq!(cursor.spelling(), "renamable");
}

#[test]
fn test_find_renamed_cursor_through_reference() {
    let ws = Workspace::new();
    ws.write("test.cpp", "int renamable = 0;\nint other = renamable;\n");
    let unit = ws.parse("test.cpp", &[]);
    let file = unit.main_file().unwrap();

    let start = unit.location(&file, 2, 13).unwrap();
    let end = unit.location(&file, 2, 22).unwrap();
    let cursor = find_renamed_cursor(&unit, start, unit.range(start, end).unwrap()).unwrap();
    assert_eq!(cursor.kind(), CursorKind::VarDecl);
    assert_eq!(cursor.location(), Some(unit.location(&file, 1, 5).unwrap()));
}

#[test]
fn test_find_renamed_cursor_rejects_bad_selection() {
    let ws = Workspace::new();
    ws.write("test.cpp", "int renamable = 0;\n");
    let unit = ws.parse("test.cpp", &[]);
    let file = unit.main_file().unwrap();

    // Range covers only part of the name.
    let start = unit.location(&file, 1, 5).unwrap();
    let end = unit.location(&file, 1, 8).unwrap();
    assert!(matches!(
        find_renamed_cursor(&unit, start, unit.range(start, end).unwrap()),
        Err(RefactorError::NoCursor)
    ));

    // Not on an identifier.
    let loc = unit.location(&file, 1, 15).unwrap();
    assert!(matches!(
        find_renamed_cursor(&unit, loc, SourceRange::new(loc, loc)),
        Err(RefactorError::NoCursor)
    ));
}

fn test_symbol() -> [IndexedSymbol; 1] {
    [IndexedSymbol {
        locations: vec![
            IndexedSymbolLocation::new(1, 7, CursorKind::DeclRefExpr),
            IndexedSymbolLocation::new(2, 1, CursorKind::DeclRefExpr),
        ],
        kind: CursorKind::DeclRefExpr,
        name: "Test".to_string(),
    }]
}

#[test]
fn test_occurrences_in_indexed_file_and_unsaved_contents() {
    let ws = Workspace::new();
    let partial = "class Test { };\n";
    let path = ws.write("test.cpp", partial);
    let symbols = test_symbol();

    let result = find_symbol_occurrences_in_indexed_file(&symbols, &path, &NO_ARGS, &[]).unwrap();
    assert_eq!(result.num_files(), 1);
    let file = result.file(0).unwrap();
    assert_eq!(file.filename, path);
    assert_eq!(file.occurrences.len(), 1);
    let occurrence = &file.occurrences[0];
    assert_eq!(occurrence.kind, SymbolOccurrenceKind::MatchingSymbol);
    assert_eq!(occurrence.symbol_index, 0);
    assert_eq!(occurrence.name_pieces.len(), 1);
    assert_eq!(occurrence.name_pieces[0].begin, LineCol::new(1, 7));
    assert_eq!(occurrence.name_pieces[0].end, LineCol::new(1, 11));

    let unsaved = [UnsavedFile::new(&path, format!("{partial}Test t;\n"))];
    let result =
        find_symbol_occurrences_in_indexed_file(&symbols, &path, &NO_ARGS, &unsaved).unwrap();
    assert_eq!(result.num_files(), 1);
    let file = result.file(0).unwrap();
    assert_eq!(file.filename, path);
    let starts: Vec<LineCol> = file
        .occurrences
        .iter()
        .map(|occurrence| occurrence.name_pieces[0].begin)
        .collect();
    assert_eq!(starts, [LineCol::new(1, 7), LineCol::new(2, 1)]);
    // The file on disk is untouched.
    assert_eq!(ws.read("test.cpp"), partial);
}

#[test]
fn test_occurrences_argument_errors() {
    let ws = Workspace::new();
    let path = ws.write("test.cpp", "class Test { };\n");

    assert!(matches!(
        find_symbol_occurrences_in_indexed_file(&test_symbol(), "", &NO_ARGS, &[]),
        Err(RefactorError::InvalidArguments(_))
    ));
    assert!(matches!(
        find_symbol_occurrences_in_indexed_file(&[], &path, &NO_ARGS, &[]),
        Err(RefactorError::InvalidArguments(_))
    ));
    assert!(matches!(
        find_symbol_occurrences_in_indexed_file(&test_symbol(), ws.path("absent.cpp"), &NO_ARGS, &[]),
        Err(RefactorError::Io { .. })
    ));
}

#[test]
fn test_occurrences_skip_locations_past_line_end() {
    let ws = Workspace::new();
    let path = ws.write("test.cpp", "class Test { };\nTest t;\n");
    let symbols = [IndexedSymbol {
        locations: vec![
            IndexedSymbolLocation::new(2, u32::MAX, CursorKind::DeclRefExpr),
            IndexedSymbolLocation::new(2, 1, CursorKind::DeclRefExpr),
        ],
        kind: CursorKind::DeclRefExpr,
        name: "Test".to_string(),
    }];

    let result = find_symbol_occurrences_in_indexed_file(&symbols, &path, &NO_ARGS, &[]).unwrap();
    let file = result.file(0).unwrap();
    assert_eq!(file.occurrences.len(), 1);
    assert_eq!(file.occurrences[0].name_pieces[0].begin, LineCol::new(2, 1));
}
