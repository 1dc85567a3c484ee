//! Reparse: refreshing a unit after its files changed.

use crate::helpers::*;
use cxindex::error::ReparseError;
use cxindex::index::{ReparseFlags, ReparseState, TranslationUnitFlags};
use cxindex::project::UnsavedFile;
use cxindex::syntax::CursorKind;

const HEADER_TOP: &str = "#ifndef H\n#define H\nstruct Foo { int bar;";
const HEADER_BOTTOM: &str = "\n};\n#endif\n";

fn reparse(unit: &mut cxindex::TranslationUnit) {
    unit.reparse(&[], ReparseFlags::empty()).expect("reparse");
}

#[test]
fn test_reparse_picks_up_fixed_header() {
    let ws = Workspace::new();
    ws.write("HeaderFile.h", &format!("{HEADER_TOP}{HEADER_BOTTOM}"));
    ws.write(
        "CppFile.cpp",
        "#include \"HeaderFile.h\"\nint main() { Foo foo; foo.bar = 7; foo.baz = 8; }\n",
    );
    let mut unit = ws.parse("CppFile.cpp", &[]);
    assert_eq!(diagnostic_messages(&unit), ["no member named 'baz' in 'Foo'"]);

    reparse(&mut unit);
    assert_eq!(unit.num_diagnostics(), 1);

    ws.write("HeaderFile.h", &format!("{HEADER_TOP}int baz;{HEADER_BOTTOM}"));
    reparse(&mut unit);
    assert_eq!(unit.num_diagnostics(), 0);
    assert_eq!(unit.state(), ReparseState::Parsed);
}

#[test]
fn test_reparse_with_module() {
    let ws = Workspace::new();
    ws.write(
        "MFile.m",
        "#include \"HeaderFile.h\"\nint main() { struct Foo foo; foo.bar = 7; foo.baz = 8; }\n",
    );
    ws.write("HeaderFile.h", &format!("{HEADER_TOP}{HEADER_BOTTOM}"));
    ws.write("module.modulemap", "module A { header \"HeaderFile.h\" }\n");

    let cache = format!("-fmodules-cache-path={}", ws.root().display());
    let dir = ws.root().display().to_string();
    let args = ["-fmodules", cache.as_str(), "-I", dir.as_str()];
    let mut unit = ws.parse("MFile.m", &args);
    assert_eq!(
        diagnostic_messages(&unit),
        ["no member named 'baz' in 'struct Foo'"]
    );
    assert!(unit.lang_options().modules);

    reparse(&mut unit);
    assert_eq!(unit.num_diagnostics(), 1);

    ws.write("HeaderFile.h", &format!("{HEADER_TOP}int baz;{HEADER_BOTTOM}"));
    reparse(&mut unit);
    assert_eq!(unit.num_diagnostics(), 0);
}

#[test]
fn test_unsaved_contents_apply_to_one_call() {
    let ws = Workspace::new();
    let main = ws.write("main.c", "int a;\n");
    let mut unit = ws.parse("main.c", &[]);
    assert!(find_cursor(&unit, CursorKind::FunctionDecl).is_none());

    let unsaved = [UnsavedFile::new(&main, "int a;\nint f(void) { return a; }\n")];
    unit.reparse(&unsaved, ReparseFlags::empty()).unwrap();
    assert_eq!(
        find_cursor(&unit, CursorKind::FunctionDecl).unwrap().spelling(),
        "f"
    );
    assert_eq!(ws.read("main.c"), "int a;\n");

    reparse(&mut unit);
    assert!(find_cursor(&unit, CursorKind::FunctionDecl).is_none());
}

#[test]
fn test_unsaved_file_without_name_is_rejected() {
    let ws = Workspace::new();
    ws.write("main.c", "int a;\n");
    let mut unit = ws.parse("main.c", &[]);

    let result = unit.reparse(&[UnsavedFile::new("", "int b;")], ReparseFlags::empty());
    assert!(matches!(result, Err(ReparseError::InvalidArguments(_))));
    assert_eq!(unit.state(), ReparseState::Parsed);
    assert_eq!(unit.generation(), 0);

    ws.write("main.c", "int a;\nint c;\n");
    assert!(unit.check_stale());
    let result = unit.reparse(&[UnsavedFile::new("", "int b;")], ReparseFlags::empty());
    assert!(matches!(result, Err(ReparseError::InvalidArguments(_))));
    assert_eq!(unit.state(), ReparseState::Stale);
}

#[test]
fn test_check_stale_marks_changed_dependency() {
    let ws = Workspace::new();
    ws.write("header.h", "int h;\n");
    ws.write("main.c", "#include \"header.h\"\nint a;\n");
    let mut unit = ws.parse("main.c", &[]);

    assert!(!unit.check_stale());
    assert_eq!(unit.state(), ReparseState::Parsed);

    ws.write("header.h", "int h;\nint i;\n");
    assert!(unit.check_stale());
    assert_eq!(unit.state(), ReparseState::Stale);

    reparse(&mut unit);
    assert_eq!(unit.state(), ReparseState::Parsed);
    assert!(!unit.check_stale());
}

#[test]
fn test_failed_reparse_keeps_previous_results() {
    let ws = Workspace::new();
    let main = ws.write("main.c", "int main(void) { return y; }\n");
    let mut unit = ws.parse("main.c", &[]);
    assert_eq!(unit.num_diagnostics(), 1);

    std::fs::remove_file(&main).unwrap();
    let result = unit.reparse(&[], ReparseFlags::empty());
    assert!(matches!(result, Err(ReparseError::Failure { .. })));
    assert_eq!(unit.state(), ReparseState::Failed);
    assert_eq!(unit.generation(), 0);
    assert_eq!(diagnostic_messages(&unit), ["use of undeclared identifier 'y'"]);
    assert!(find_cursor(&unit, CursorKind::FunctionDecl).is_some());

    ws.write("main.c", "int main(void) { return 0; }\n");
    reparse(&mut unit);
    assert_eq!(unit.state(), ReparseState::Parsed);
    assert_eq!(unit.num_diagnostics(), 0);
}

#[test]
fn test_generation_and_token_cache() {
    let ws = Workspace::new();
    ws.write("header.h", "int h;\n");
    ws.write("main.c", "#include \"header.h\"\nint a;\n");
    let mut unit = ws.parse("main.c", &[]);
    assert_eq!(unit.generation(), 0);
    let runs = unit.lex_runs();

    reparse(&mut unit);
    assert_eq!(unit.generation(), 1);
    assert_eq!(unit.lex_runs(), runs);

    ws.write("header.h", "int h2;\n");
    reparse(&mut unit);
    assert_eq!(unit.generation(), 2);
    assert!(unit.lex_runs() > runs);
}

#[test]
fn test_parse_with_unsaved_main_file() {
    let ws = Workspace::new();
    let main = ws.path("main.c");
    let unsaved = [UnsavedFile::new(&main, "int only_in_memory;\n")];
    let unit = ws
        .index
        .parse(&main, &[] as &[&str], &unsaved, TranslationUnitFlags::editing())
        .unwrap();
    assert_eq!(
        find_cursor(&unit, CursorKind::VarDecl).unwrap().spelling(),
        "only_in_memory"
    );
}
