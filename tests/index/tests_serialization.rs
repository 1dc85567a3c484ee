//! Saving translation units and loading them back.

use crate::helpers::*;
use cxindex::TranslationUnit;
use cxindex::error::LoadError;
use cxindex::index::{ReparseFlags, SaveFlags, Token};
use cxindex::parser::TokenKind;
use cxindex::syntax::CursorKind;
use rstest::rstest;
use serde_json::Value;

fn main_file_tokens(unit: &TranslationUnit) -> Vec<Token> {
    let file = unit.main_file().unwrap();
    let start = unit.location_for_offset(&file, 0).unwrap();
    let end = unit
        .location_for_offset(&file, file.contents().len() as u32)
        .unwrap();
    unit.tokenize(unit.range(start, end).unwrap())
}

fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(|token| token.kind).collect()
}

#[test]
fn test_tokens_survive_save_and_load() {
    let ws = Workspace::new();
    ws.write("test.h", "enum class Something {};");
    let unit = ws.parse("test.h", &["-xc++-header", "-std=c++11"]);

    let expected = [
        TokenKind::Keyword,
        TokenKind::Keyword,
        TokenKind::Identifier,
        TokenKind::Punctuation,
        TokenKind::Punctuation,
        TokenKind::Punctuation,
    ];
    let tokens = main_file_tokens(&unit);
    assert_eq!(kinds(&tokens), expected);
    assert_eq!(tokens[1].spelling, "class");

    let saved = ws.path("test.h.ast");
    unit.save(&saved, SaveFlags::empty()).unwrap();
    drop(unit);

    let loaded = ws.index.load(&saved).unwrap();
    assert_eq!(kinds(&main_file_tokens(&loaded)), expected);
    assert!(loaded.lang_options().cplusplus11());
}

#[test]
fn test_loaded_unit_keeps_tree_and_diagnostics() {
    let ws = Workspace::new();
    ws.write("main.c", "struct P { int x; };\nint main(void) { return y; }\n");
    let unit = ws.parse("main.c", &[]);
    let saved = ws.path("main.ast");
    unit.save(&saved, SaveFlags::PRETTY).unwrap();

    let loaded = ws.index.load(&saved).unwrap();
    assert_eq!(diagnostic_messages(&loaded), diagnostic_messages(&unit));
    assert_eq!(loaded.arguments(), unit.arguments());
    assert_eq!(loaded.generation(), unit.generation());
    assert_eq!(
        find_cursor(&loaded, CursorKind::FieldDecl).unwrap().spelling(),
        "x"
    );
}

#[test]
fn test_loaded_unit_can_be_reparsed() {
    let ws = Workspace::new();
    ws.write("main.c", "int main(void) { return y; }\n");
    let unit = ws.parse("main.c", &[]);
    let saved = ws.path("main.ast");
    unit.save(&saved, SaveFlags::empty()).unwrap();

    ws.write("main.c", "int y;\nint main(void) { return y; }\n");
    let mut loaded = ws.index.load(&saved).unwrap();
    assert_eq!(loaded.num_diagnostics(), 1);
    loaded.reparse(&[], ReparseFlags::empty()).unwrap();
    assert_eq!(loaded.num_diagnostics(), 0);
}

#[test]
fn test_load_rejects_foreign_documents() {
    let ws = Workspace::new();
    let path = ws.write("bogus.ast", r#"{"magic": "something-else", "version": 1}"#);
    assert!(matches!(ws.index.load(&path), Err(LoadError::Format(_))));

    let path = ws.write("garbage.ast", "not json");
    assert!(matches!(ws.index.load(&path), Err(LoadError::Decode(_))));

    assert!(matches!(
        ws.index.load(ws.path("absent.ast")),
        Err(LoadError::Io { .. })
    ));
}

fn missing_child(doc: &mut Value) {
    doc["ast"]["nodes"][0]["children"][0] = Value::from(9999);
}

fn child_is_root(doc: &mut Value) {
    let child = doc["ast"]["nodes"][0]["children"][0].as_u64().unwrap() as usize;
    doc["ast"]["nodes"][child]["children"]
        .as_array_mut()
        .unwrap()
        .push(Value::from(0));
}

fn parent_cycle(doc: &mut Value) {
    let child = doc["ast"]["nodes"][0]["children"][0].clone();
    doc["ast"]["nodes"][0]["parent"] = child;
}

fn dangling_reference(doc: &mut Value) {
    doc["ast"]["nodes"][1]["referenced"] = Value::from(9999);
}

fn location_in_missing_file(doc: &mut Value) {
    doc["ast"]["nodes"][1]["location"]["spelling"]["file"] = Value::from(99);
}

fn offset_past_end_of_file(doc: &mut Value) {
    doc["ast"]["nodes"][1]["extent"]["end"]["spelling"]["offset"] = Value::from(1_000_000);
}

#[rstest]
#[case::missing_child(missing_child)]
#[case::child_is_root(child_is_root)]
#[case::parent_cycle(parent_cycle)]
#[case::dangling_reference(dangling_reference)]
#[case::location_in_missing_file(location_in_missing_file)]
#[case::offset_past_end_of_file(offset_past_end_of_file)]
fn test_load_rejects_inconsistent_tree(#[case] tamper: fn(&mut Value)) {
    let ws = Workspace::new();
    ws.write("main.c", "struct P { int x; };\nint main(void) { return 0; }\n");
    let unit = ws.parse("main.c", &[]);
    let saved = ws.path("main.ast");
    unit.save(&saved, SaveFlags::empty()).unwrap();

    let mut doc: Value = serde_json::from_str(&ws.read("main.ast")).unwrap();
    tamper(&mut doc);
    std::fs::write(&saved, doc.to_string()).unwrap();

    assert!(matches!(ws.index.load(&saved), Err(LoadError::Format(_))));
}
