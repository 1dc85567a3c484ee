//! Location resolution, ranges and skipped preprocessor blocks.

use crate::helpers::*;
use cxindex::error::LocationError;
use cxindex::syntax::CursorKind;
use rstest::rstest;

#[test]
fn test_line_column_round_trip() {
    let ws = Workspace::new();
    ws.write("main.c", "int a;\nint bb = 2;\n");
    let unit = ws.parse("main.c", &[]);
    let file = unit.main_file().unwrap();

    let loc = unit.location(&file, 2, 5).unwrap();
    let spelled = unit.spelling_location(loc).unwrap();
    assert_eq!((spelled.line, spelled.column), (2, 5));
    assert_eq!(u32::from(spelled.offset), 11);
    assert_eq!(spelled.file, file.id());

    assert_eq!(unit.location_for_offset(&file, 11).unwrap(), loc);
    assert_eq!(unit.cursor_at(loc).spelling(), "bb");
}

#[rstest]
#[case(0, 1)]
#[case(1, 0)]
#[case(1, 9)]
#[case(4, 1)]
#[case(2, u32::MAX)]
fn test_out_of_range_location_is_invalid(#[case] line: u32, #[case] column: u32) {
    let ws = Workspace::new();
    ws.write("main.c", "int a;\nint b;\n");
    let unit = ws.parse("main.c", &[]);
    let file = unit.main_file().unwrap();

    assert_eq!(
        unit.location(&file, line, column),
        Err(LocationError::InvalidLocation { line, column })
    );
}

#[test]
fn test_column_one_past_line_end_is_valid() {
    let ws = Workspace::new();
    ws.write("main.c", "int a;\n");
    let unit = ws.parse("main.c", &[]);
    let file = unit.main_file().unwrap();
    assert!(unit.location(&file, 1, 7).is_ok());
    assert_eq!(
        unit.location_for_offset(&file, 100),
        Err(LocationError::InvalidOffset(100))
    );
}

#[test]
fn test_range_across_files_is_rejected() {
    let ws = Workspace::new();
    ws.write("header.h", "int h;\n");
    ws.write("main.c", "#include \"header.h\"\nint a;\n");
    let unit = ws.parse("main.c", &[]);

    let main = unit.main_file().unwrap();
    let header = unit.file(ws.path("header.h")).unwrap();
    let start = unit.location(&main, 2, 1).unwrap();
    let end = unit.location(&header, 1, 1).unwrap();
    assert_eq!(unit.range(start, end), Err(LocationError::CrossBufferRange));

    let end = unit.location(&main, 2, 6).unwrap();
    let range = unit.range(start, end).unwrap();
    assert_eq!(range.start(), start);
    assert_eq!(range.end(), end);
}

#[test]
fn test_skipped_ranges_per_file_and_for_the_unit() {
    let ws = Workspace::new();
    ws.write("header.h", "#ifdef MANGOS\nprintf(\"mmm\");\n#endif");
    ws.write(
        "main.cpp",
        "#include \"header.h\"\n#ifdef KIWIS\nprintf(\"mmm!!\");\n#endif",
    );
    let unit = ws.parse("main.cpp", &[]);

    let lines = |range: &cxindex::SourceRange| {
        let start = unit.spelling_location(range.start()).unwrap();
        let end = unit.spelling_location(range.end()).unwrap();
        (start.line, end.line)
    };

    let main = unit.main_file().unwrap();
    let ranges = unit.skipped_ranges(&main);
    assert_eq!(ranges.len(), 1);
    assert_eq!(lines(&ranges[0]), (2, 4));

    let all = unit.all_skipped_ranges();
    assert_eq!(all.len(), 2);
    assert_eq!(lines(&all[0]), (1, 3));
    assert_eq!(lines(&all[1]), (2, 4));
    assert_ne!(all[0].file(), all[1].file());
}

#[test]
fn test_macro_expansion_locations() {
    let ws = Workspace::new();
    ws.write("main.c", "#define FORTY_TWO 42\nint a = FORTY_TWO;\n");
    let unit = ws.parse("main.c", &[]);

    let literal = find_cursor(&unit, CursorKind::IntegerLiteral).unwrap();
    let loc = literal.location().unwrap();
    assert!(loc.is_macro_expansion());

    let spelling = unit.spelling_location(loc).unwrap();
    assert_eq!((spelling.line, spelling.column), (1, 19));
    let expansion = unit.expansion_location(loc).unwrap();
    assert_eq!((expansion.line, expansion.column), (2, 9));
}

#[test]
fn test_file_names() {
    let ws = Workspace::new();
    ws.write("main.cpp", "int main() { return 0; }\n");
    let unit = ws.parse("main.cpp", &[]);

    let file = unit.file(ws.path("main.cpp")).unwrap();
    assert_eq!(file, unit.main_file().unwrap());
    assert!(file.name().ends_with("main.cpp"));
    assert!(file.real_path().ends_with("main.cpp"));
    assert!(file.real_path().is_absolute());
    assert!(unit.file(ws.path("other.cpp")).is_none());
}
