//! Batched edits of translation unit buffers.

use crate::helpers::*;
use cxindex::error::RewriteError;
use cxindex::{Rewriter, SourceRange, TranslationUnit};
use rstest::rstest;

const SOURCE: &str = "int main() { return 0; }";

fn range(unit: &TranslationUnit, start: (u32, u32), end: (u32, u32)) -> SourceRange {
    let file = unit.main_file().unwrap();
    let start = unit.location(&file, start.0, start.1).unwrap();
    let end = unit.location(&file, end.0, end.1).unwrap();
    unit.range(start, end).unwrap()
}

#[rstest]
#[case("MAIN")]
#[case("foo")]
#[case("patatino")]
fn test_replace_text(#[case] replacement: &str) {
    let ws = Workspace::new();
    ws.write("file.cpp", SOURCE);
    let unit = ws.parse("file.cpp", &[]);

    let mut rewriter = Rewriter::new(&unit);
    rewriter
        .replace_text(range(&unit, (1, 5), (1, 9)), replacement)
        .unwrap();
    assert_eq!(rewriter.overwrite_changed_files().unwrap(), 0);
    assert_eq!(ws.read("file.cpp"), format!("int {replacement}() {{ return 0; }}"));
}

#[test]
fn test_insert_text_before() {
    let ws = Workspace::new();
    ws.write("file.cpp", SOURCE);
    let unit = ws.parse("file.cpp", &[]);
    let file = unit.main_file().unwrap();

    let mut rewriter = Rewriter::new(&unit);
    rewriter
        .insert_text_before(unit.location(&file, 1, 5).unwrap(), "ro")
        .unwrap();
    assert_eq!(rewriter.overwrite_changed_files().unwrap(), 0);
    assert_eq!(ws.read("file.cpp"), "int romain() { return 0; }");
}

#[test]
fn test_remove_text() {
    let ws = Workspace::new();
    ws.write("file.cpp", SOURCE);
    let unit = ws.parse("file.cpp", &[]);

    let mut rewriter = Rewriter::new(&unit);
    rewriter.remove_text(range(&unit, (1, 5), (1, 9))).unwrap();
    assert_eq!(rewriter.overwrite_changed_files().unwrap(), 0);
    assert_eq!(ws.read("file.cpp"), "int () { return 0; }");
}

#[test]
fn test_batch_applies_edits_in_source_order() {
    let ws = Workspace::new();
    ws.write("file.cpp", SOURCE);
    let unit = ws.parse("file.cpp", &[]);
    let file = unit.main_file().unwrap();

    let mut rewriter = Rewriter::new(&unit);
    // Staged out of order; the return value first, then the name.
    rewriter.replace_text(range(&unit, (1, 21), (1, 22)), "42").unwrap();
    rewriter.replace_text(range(&unit, (1, 5), (1, 9)), "start").unwrap();
    // Adjacent to the replacement, so not an overlap.
    rewriter
        .insert_text_before(unit.location(&file, 1, 9).unwrap(), "_")
        .unwrap();
    assert_eq!(rewriter.batch(&file).unwrap().ops().len(), 3);

    let preview = rewriter.rewritten_text(&file).unwrap();
    assert_eq!(preview, "int start_() { return 42; }");
    // Previewing writes nothing.
    assert_eq!(ws.read("file.cpp"), SOURCE);

    assert_eq!(rewriter.overwrite_changed_files().unwrap(), 0);
    assert_eq!(ws.read("file.cpp"), preview);
    assert!(rewriter.is_empty());
    assert!(rewriter.batch(&file).is_none());
}

#[test]
fn test_overlapping_edits_reject_the_commit() {
    let ws = Workspace::new();
    ws.write("file.cpp", SOURCE);
    let unit = ws.parse("file.cpp", &[]);
    let file = unit.main_file().unwrap();

    let mut rewriter = Rewriter::new(&unit);
    rewriter.replace_text(range(&unit, (1, 5), (1, 9)), "foo").unwrap();
    rewriter.remove_text(range(&unit, (1, 7), (1, 11))).unwrap();

    assert!(matches!(
        rewriter.rewritten_text(&file),
        Err(RewriteError::OverlappingEdits { .. })
    ));
    assert!(matches!(
        rewriter.overwrite_changed_files(),
        Err(RewriteError::OverlappingEdits { .. })
    ));
    assert_eq!(ws.read("file.cpp"), SOURCE);
    assert!(!rewriter.is_empty());
}

#[test]
fn test_insertion_inside_replaced_range_overlaps() {
    let ws = Workspace::new();
    ws.write("file.cpp", SOURCE);
    let unit = ws.parse("file.cpp", &[]);
    let file = unit.main_file().unwrap();

    let mut rewriter = Rewriter::new(&unit);
    rewriter.replace_text(range(&unit, (1, 5), (1, 9)), "foo").unwrap();
    rewriter
        .insert_text_before(unit.location(&file, 1, 7).unwrap(), "x")
        .unwrap();
    assert!(matches!(
        rewriter.rewritten_text(&file),
        Err(RewriteError::OverlappingEdits { .. })
    ));
}

#[test]
fn test_nothing_staged_writes_nothing() {
    let ws = Workspace::new();
    ws.write("file.cpp", SOURCE);
    let unit = ws.parse("file.cpp", &[]);

    let mut rewriter = Rewriter::new(&unit);
    assert!(rewriter.is_empty());
    assert_eq!(rewriter.overwrite_changed_files().unwrap(), 0);
    assert_eq!(ws.read("file.cpp"), SOURCE);
}

#[test]
fn test_edits_in_included_file() {
    let ws = Workspace::new();
    ws.write("header.h", "int old_name;\n");
    ws.write("main.c", "#include \"header.h\"\nint a;\n");
    let unit = ws.parse("main.c", &[]);
    let header = unit.file(ws.path("header.h")).unwrap();

    let mut rewriter = Rewriter::new(&unit);
    let start = unit.location(&header, 1, 5).unwrap();
    let end = unit.location(&header, 1, 13).unwrap();
    rewriter
        .replace_text(unit.range(start, end).unwrap(), "new_name")
        .unwrap();
    assert_eq!(rewriter.overwrite_changed_files().unwrap(), 0);
    assert_eq!(ws.read("header.h"), "int new_name;\n");
    assert_eq!(ws.read("main.c"), "#include \"header.h\"\nint a;\n");
}

#[test]
fn test_commit_counts_files_that_fail_to_write() {
    let ws = Workspace::new();
    ws.write("sub/header.h", "int old_name;\n");
    ws.write("main.c", "#include \"sub/header.h\"\nint a;\n");
    let unit = ws.parse("main.c", &[]);
    let header = unit.file(ws.path("sub/header.h")).unwrap();
    let main = unit.main_file().unwrap();

    let mut rewriter = Rewriter::new(&unit);
    let start = unit.location(&header, 1, 5).unwrap();
    let end = unit.location(&header, 1, 13).unwrap();
    rewriter
        .replace_text(unit.range(start, end).unwrap(), "new_name")
        .unwrap();
    let start = unit.location(&main, 2, 5).unwrap();
    let end = unit.location(&main, 2, 6).unwrap();
    rewriter.replace_text(unit.range(start, end).unwrap(), "b").unwrap();

    std::fs::remove_dir_all(ws.path("sub")).unwrap();
    assert_eq!(rewriter.overwrite_changed_files().unwrap(), 1);
    assert_eq!(ws.read("main.c"), "#include \"sub/header.h\"\nint b;\n");
    assert!(!ws.path("sub/header.h").exists());
    assert!(rewriter.is_empty());
}
