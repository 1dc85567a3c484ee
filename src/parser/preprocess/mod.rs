//! The C preprocessor.
//!
//! Consumes raw token lists file by file and produces the single expanded
//! token stream the parser reads, together with preprocessor diagnostics,
//! skipped conditional ranges and inclusion records.
//!
//! ```text
//! <built-in> (predefined macros, -D/-U, -include)
//!   └── main file
//!        ├── #include "header.h"  → header tokens, recursively
//!        ├── #if/#ifdef ... #endif → skipped ranges
//!        └── text lines            → macro expansion → output
//! ```
//!
//! Locations: tokens keep the offset where they are spelled. Tokens coming
//! out of a macro expansion also carry the location of the macro use, which
//! is what the AST reports.

mod conditional;
mod expr;
mod macros;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bitflags::bitflags;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use self::conditional::Conditional;
use self::macros::{MacroDef, MacroTable};
use super::keywords;
use super::lang::LangOptions;
use super::lexer::TokenList;
use super::syntax_kind::SyntaxKind;
use crate::base::{FileId, SourceBuffer, SourceLocation, SourceRange};
use crate::hir::{Diagnostic, DiagnosticCategory};

const MAX_INCLUDE_DEPTH: usize = 200;

/// Name of the virtual buffer holding predefined macros.
pub const BUILTIN_BUFFER: &str = "<built-in>";

// ============================================================================
// TOKENS
// ============================================================================

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PpTokenFlags: u8 {
        /// Whitespace precedes the token.
        const LEADING_SPACE = 1 << 0;
        /// Painted: never expand this identifier again.
        const NO_EXPAND = 1 << 1;
    }
}

/// A token of the preprocessed stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpToken {
    pub kind: SyntaxKind,
    pub text: SmolStr,
    pub start: SourceLocation,
    pub end: SourceLocation,
    pub flags: PpTokenFlags,
}

impl PpToken {
    pub fn range(&self) -> SourceRange {
        SourceRange::new(self.start, self.end)
    }

    fn has_leading_space(&self) -> bool {
        self.flags.contains(PpTokenFlags::LEADING_SPACE)
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Include search directories, in lookup order within each class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderSearch {
    /// `-iquote`: searched for `"..."` includes only.
    pub quote_dirs: Vec<PathBuf>,
    /// `-I`.
    pub angled_dirs: Vec<PathBuf>,
    /// `-isystem` and toolchain directories.
    pub system_dirs: Vec<PathBuf>,
}

/// A `-D` or `-U` argument, applied in command-line order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacroArg {
    /// `NAME` or `NAME=value`.
    Define(String),
    Undef(String),
}

pub struct PreprocessConfig<'a> {
    pub lang: &'a LangOptions,
    pub search: &'a HeaderSearch,
    pub macros: &'a [MacroArg],
    pub forced_includes: &'a [PathBuf],
    /// Do not follow `#include`.
    pub single_file: bool,
}

/// Where the preprocessor gets files and their tokens from.
pub trait SourceProvider {
    /// Load the file at `path` (as spelled, not yet normalized). `None` when
    /// it cannot be read.
    fn load(&mut self, path: &Path) -> Option<FileId>;
    /// Whether a file exists at `path`, without loading it.
    fn exists(&self, path: &Path) -> bool;
    /// Register an in-memory buffer that does not exist on disk.
    fn add_virtual(&mut self, name: &str, text: &str) -> FileId;
    fn buffer(&self, file: FileId) -> Option<&SourceBuffer>;
    fn tokens(&mut self, file: FileId) -> TokenList;
}

// ============================================================================
// OUTPUT
// ============================================================================

/// One `#include` that was followed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inclusion {
    pub includer: FileId,
    pub included: FileId,
    /// Location of the `#` of the directive.
    pub location: SourceLocation,
    pub name: SmolStr,
    pub angled: bool,
}

#[derive(Debug, Default)]
pub struct PreprocessOutput {
    pub tokens: Vec<PpToken>,
    pub diagnostics: Vec<Diagnostic>,
    pub skipped: Vec<SourceRange>,
    pub inclusions: Vec<Inclusion>,
}

/// Preprocess `main` and everything it includes.
pub fn preprocess(
    main: FileId,
    config: &PreprocessConfig<'_>,
    provider: &mut dyn SourceProvider,
) -> PreprocessOutput {
    let mut pp = Preprocessor {
        config,
        provider,
        macros: MacroTable::default(),
        once: FxHashSet::default(),
        depth: 0,
        out: PreprocessOutput::default(),
    };

    let builtin = pp.builtin_text();
    let builtin_file = pp.provider.add_virtual(BUILTIN_BUFFER, &builtin);
    pp.process_file(builtin_file);
    pp.process_file(main);

    let mut out = pp.out;
    finish_tokens(&mut out.tokens, config.lang);
    tracing::debug!(
        tokens = out.tokens.len(),
        skipped = out.skipped.len(),
        inclusions = out.inclusions.len(),
        diagnostics = out.diagnostics.len(),
        "preprocessed"
    );
    out
}

/// Keyword classification and string-prefix merging on the final stream.
fn finish_tokens(tokens: &mut Vec<PpToken>, lang: &LangOptions) {
    let mut merged: Vec<PpToken> = Vec::with_capacity(tokens.len());
    for token in tokens.drain(..) {
        if matches!(token.kind, SyntaxKind::STRING | SyntaxKind::CHAR) && !token.has_leading_space() {
            if let Some(prev) = merged.last_mut() {
                let is_prefix = prev.kind == SyntaxKind::IDENT
                    && matches!(prev.text.as_str(), "L" | "u" | "U" | "u8")
                    && prev.end == token.start;
                if is_prefix {
                    prev.kind = token.kind;
                    prev.text = SmolStr::from(format!("{}{}", prev.text, token.text));
                    prev.end = token.end;
                    continue;
                }
            }
        }
        merged.push(token);
    }
    for token in &mut merged {
        if token.kind == SyntaxKind::IDENT {
            token.kind = keywords::classify(&token.text, lang);
        }
    }
    *tokens = merged;
}

// ============================================================================
// LINES
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct LineToken {
    kind: SyntaxKind,
    range: TextRange,
    leading_space: bool,
}

/// A logical source line: non-trivia tokens between two newlines.
#[derive(Debug, Default)]
struct Line {
    tokens: Vec<LineToken>,
}

impl Line {
    fn is_directive(&self) -> bool {
        self.tokens.first().is_some_and(|t| t.kind == SyntaxKind::HASH)
    }

    /// End of the last token of the line.
    fn end(&self) -> TextSize {
        self.tokens.last().map_or(TextSize::new(0), |t| t.range.end())
    }
}

fn split_lines(tokens: &TokenList) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Line::default();
    let mut leading_space = false;
    for token in tokens.iter() {
        match token.kind {
            SyntaxKind::NEWLINE => {
                lines.push(std::mem::take(&mut current));
                leading_space = false;
            }
            kind if kind.is_trivia() => leading_space = true,
            kind => {
                current.tokens.push(LineToken {
                    kind,
                    range: token.range,
                    leading_space,
                });
                leading_space = false;
            }
        }
    }
    if !current.tokens.is_empty() {
        lines.push(current);
    }
    lines
}

// ============================================================================
// PREPROCESSOR
// ============================================================================

struct Preprocessor<'c, 'a, 'p> {
    config: &'c PreprocessConfig<'a>,
    provider: &'p mut dyn SourceProvider,
    macros: MacroTable,
    once: FxHashSet<FileId>,
    depth: usize,
    out: PreprocessOutput,
}

/// Per-file state while its lines are processed.
struct FileState {
    file: FileId,
    text: Arc<str>,
    dir: PathBuf,
    conditionals: Vec<Conditional>,
    pending: Vec<PpToken>,
}

impl FileState {
    fn skipping(&self) -> bool {
        self.conditionals.last().is_some_and(|c| !c.active)
    }

    fn token(&self, token: &LineToken) -> PpToken {
        let text = self
            .text
            .get(std::ops::Range::<usize>::from(token.range))
            .unwrap_or("");
        PpToken {
            kind: token.kind,
            text: SmolStr::new(text),
            start: SourceLocation::new(self.file, token.range.start()),
            end: SourceLocation::new(self.file, token.range.end()),
            flags: if token.leading_space {
                PpTokenFlags::LEADING_SPACE
            } else {
                PpTokenFlags::empty()
            },
        }
    }

    fn loc(&self, offset: TextSize) -> SourceLocation {
        SourceLocation::new(self.file, offset)
    }

    fn slice(&self, range: TextRange) -> &str {
        self.text
            .get(std::ops::Range::<usize>::from(range))
            .unwrap_or("")
    }
}

impl Preprocessor<'_, '_, '_> {
    fn builtin_text(&self) -> String {
        let mut text = String::new();
        for (name, value) in self.config.lang.predefined_macros() {
            text.push_str(&format!("#define {name} {value}\n"));
        }
        for arg in self.config.macros {
            match arg {
                MacroArg::Define(def) => match def.split_once('=') {
                    Some((name, value)) => text.push_str(&format!("#define {name} {value}\n")),
                    None => text.push_str(&format!("#define {def} 1\n")),
                },
                MacroArg::Undef(name) => text.push_str(&format!("#undef {name}\n")),
            }
        }
        for path in self.config.forced_includes {
            text.push_str(&format!("#include \"{}\"\n", path.display()));
        }
        text
    }

    fn diag(&mut self, diagnostic: Diagnostic) {
        self.out.diagnostics.push(diagnostic);
    }

    fn error(&mut self, message: impl Into<String>, loc: SourceLocation) {
        self.diag(Diagnostic::error(DiagnosticCategory::Lexical, message, loc));
    }

    fn process_file(&mut self, file: FileId) {
        let Some(buffer) = self.provider.buffer(file) else {
            return;
        };
        let text = buffer.shared_text();
        let dir = buffer
            .path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        tracing::trace!(path = %buffer.path().display(), "entering file");

        let tokens = self.provider.tokens(file);
        let mut state = FileState {
            file,
            text,
            dir,
            conditionals: Vec::new(),
            pending: Vec::new(),
        };

        for line in split_lines(&tokens) {
            if line.is_directive() {
                if !state.skipping() {
                    self.flush(&mut state);
                }
                self.directive(&mut state, &line);
            } else if !state.skipping() {
                for token in &line.tokens {
                    let token = state.token(token);
                    state.pending.push(token);
                }
            }
        }
        self.flush(&mut state);

        let eof = TextSize::of(&*state.text);
        while let Some(cond) = state.conditionals.pop() {
            self.error("unterminated conditional directive", cond.hash_loc);
            if let Some(start) = cond.skip_start {
                self.out
                    .skipped
                    .push(SourceRange::new(state.loc(start), state.loc(eof)));
            }
        }
    }

    /// Macro-expand the pending text tokens and append them to the output.
    fn flush(&mut self, state: &mut FileState) {
        if state.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut state.pending);
        for token in &pending {
            if token.kind == SyntaxKind::ERROR {
                let message = match token.text.chars().next() {
                    Some(quote @ ('"' | '\'')) => format!("missing terminating {quote} character"),
                    _ => format!("unexpected character '{}'", token.text),
                };
                self.error(message, token.start);
            }
        }
        let expanded = self.expand(pending);
        self.out.tokens.extend(expanded);
    }

    // ========================================================================
    // DIRECTIVES
    // ========================================================================

    fn directive(&mut self, state: &mut FileState, line: &Line) {
        let hash = line.tokens[0];
        let Some(name_tok) = line.tokens.get(1) else {
            // Null directive.
            return;
        };
        let name = state.slice(name_tok.range).to_string();
        let args = &line.tokens[2..];

        match name.as_str() {
            "if" | "ifdef" | "ifndef" => self.open_conditional(state, &name, line, args),
            "elif" | "elifdef" | "elifndef" => self.elif(state, &name, line, args),
            "else" => self.else_branch(state, line),
            "endif" => self.endif(state, line),
            _ if state.skipping() => {}
            "include" | "include_next" | "import" => {
                self.include(state, hash, args, name == "import")
            }
            "define" => self.define(state, args),
            "undef" => {
                if let Some(tok) = args.first() {
                    let name = state.slice(tok.range).to_string();
                    self.macros.remove(&name);
                }
            }
            "pragma" => {
                let first = args.first().map(|t| state.slice(t.range));
                if first == Some("once") {
                    self.once.insert(state.file);
                }
            }
            "error" | "warning" => {
                let message = match (args.first(), args.last()) {
                    (Some(first), Some(last)) => state
                        .slice(TextRange::new(first.range.start(), last.range.end()))
                        .to_string(),
                    _ => String::new(),
                };
                let loc = state.loc(name_tok.range.start());
                let diagnostic = if name == "error" {
                    Diagnostic::error(DiagnosticCategory::Lexical, message, loc)
                } else {
                    Diagnostic::warning(DiagnosticCategory::Lexical, message, loc)
                        .with_option("-W#warnings")
                };
                self.diag(diagnostic);
            }
            "line" | "ident" | "sccs" => {}
            _ => {
                let loc = state.loc(name_tok.range.start());
                self.error("invalid preprocessing directive", loc);
            }
        }
    }

    fn include(&mut self, state: &mut FileState, hash: LineToken, args: &[LineToken], import: bool) {
        let hash_loc = state.loc(hash.range.start());
        let Some((name, angled, name_loc)) = self.include_target(state, args) else {
            let loc = args.first().map_or(hash_loc, |t| state.loc(t.range.start()));
            self.error("expected \"FILENAME\" or <FILENAME>", loc);
            return;
        };
        if self.config.single_file {
            return;
        }
        if self.depth >= MAX_INCLUDE_DEPTH {
            self.error("#include nested too deeply", hash_loc);
            return;
        }

        let Some(included) = self.resolve_include(&state.dir, &name, angled) else {
            self.diag(Diagnostic::fatal(
                DiagnosticCategory::Lexical,
                format!("'{name}' file not found"),
                name_loc,
            ));
            return;
        };
        self.out.inclusions.push(Inclusion {
            includer: state.file,
            included,
            location: hash_loc,
            name: SmolStr::new(&name),
            angled,
        });
        if self.once.contains(&included) {
            return;
        }
        if import {
            self.once.insert(included);
        }

        self.depth += 1;
        self.process_file(included);
        self.depth -= 1;
    }

    /// File name of an include directive: `"name"`, `<name>`, or a macro
    /// expanding to either.
    fn include_target(
        &mut self,
        state: &FileState,
        args: &[LineToken],
    ) -> Option<(String, bool, SourceLocation)> {
        let first = args.first()?;
        let loc = state.loc(first.range.start());
        match first.kind {
            SyntaxKind::STRING => {
                let text = state.slice(first.range);
                Some((text.trim_matches('"').to_string(), false, loc))
            }
            SyntaxKind::LT => {
                let close = args.iter().position(|t| t.kind == SyntaxKind::GT)?;
                if close == 0 {
                    return None;
                }
                let name = state
                    .slice(TextRange::new(first.range.end(), args[close].range.start()))
                    .to_string();
                Some((name, true, loc))
            }
            _ => {
                let tokens: Vec<PpToken> = args.iter().map(|t| state.token(t)).collect();
                let expanded = self.expand(tokens);
                let first = expanded.first()?;
                if first.kind == SyntaxKind::STRING {
                    return Some((first.text.trim_matches('"').to_string(), false, loc));
                }
                if first.kind == SyntaxKind::LT {
                    let close = expanded.iter().position(|t| t.kind == SyntaxKind::GT)?;
                    let name: String = expanded[1..close].iter().map(|t| t.text.as_str()).collect();
                    return Some((name, true, loc));
                }
                None
            }
        }
    }

    fn search_candidates(&self, includer_dir: &Path, name: &str, angled: bool) -> Vec<PathBuf> {
        let path = Path::new(name);
        if path.is_absolute() {
            return vec![path.to_path_buf()];
        }
        let search = self.config.search;
        let mut dirs: Vec<&Path> = Vec::new();
        if !angled {
            dirs.push(includer_dir);
            dirs.extend(search.quote_dirs.iter().map(PathBuf::as_path));
        }
        dirs.extend(search.angled_dirs.iter().map(PathBuf::as_path));
        dirs.extend(search.system_dirs.iter().map(PathBuf::as_path));
        dirs.into_iter().map(|dir| dir.join(name)).collect()
    }

    fn resolve_include(&mut self, includer_dir: &Path, name: &str, angled: bool) -> Option<FileId> {
        for candidate in self.search_candidates(includer_dir, name, angled) {
            if !self.provider.exists(&candidate) {
                continue;
            }
            if let Some(file) = self.provider.load(&candidate) {
                return Some(file);
            }
        }
        None
    }

    fn define(&mut self, state: &FileState, args: &[LineToken]) {
        let Some(name_tok) = args.first() else {
            let loc = state.loc(TextSize::new(0));
            self.error("macro name missing", loc);
            return;
        };
        if name_tok.kind != SyntaxKind::IDENT {
            self.error(
                "macro name must be an identifier",
                state.loc(name_tok.range.start()),
            );
            return;
        }
        let name = SmolStr::new(state.slice(name_tok.range));
        let mut rest = &args[1..];
        let mut params = None;
        let mut variadic = false;

        let function_like = rest
            .first()
            .is_some_and(|t| t.kind == SyntaxKind::L_PAREN && t.range.start() == name_tok.range.end());
        if function_like {
            let mut list = Vec::new();
            let mut idx = 1;
            loop {
                let Some(tok) = rest.get(idx) else {
                    self.error(
                        "missing ')' in macro parameter list",
                        state.loc(name_tok.range.start()),
                    );
                    return;
                };
                match tok.kind {
                    SyntaxKind::R_PAREN => break,
                    SyntaxKind::COMMA => {}
                    SyntaxKind::ELLIPSIS => variadic = true,
                    SyntaxKind::IDENT => list.push(SmolStr::new(state.slice(tok.range))),
                    _ => {
                        self.error(
                            "invalid token in macro parameter list",
                            state.loc(tok.range.start()),
                        );
                        return;
                    }
                }
                idx += 1;
            }
            rest = &rest[idx + 1..];
            params = Some(list);
        }

        let mut body: Vec<PpToken> = rest.iter().map(|t| state.token(t)).collect();
        if let Some(first) = body.first_mut() {
            first.flags.remove(PpTokenFlags::LEADING_SPACE);
        }
        let location = state.loc(name_tok.range.start());
        let redefined = self.macros.define(MacroDef {
            name: name.clone(),
            params,
            variadic,
            body,
            location,
        });
        if let Some(previous) = redefined {
            tracing::trace!(macro_name = %name, previous = ?previous.location, "macro redefined");
            self.diag(
                Diagnostic::warning(
                    DiagnosticCategory::Lexical,
                    format!("'{name}' macro redefined"),
                    location,
                )
                .with_option("-Wmacro-redefined"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileSet;
    use crate::parser::lang::Language;
    use crate::parser::lexer::lex;

    /// In-memory files; every path that was added exists.
    #[derive(Default)]
    struct MemoryFiles {
        files: FileSet,
        disk: Vec<(PathBuf, String)>,
    }

    impl MemoryFiles {
        fn with(files: &[(&str, &str)]) -> Self {
            let mut this = Self::default();
            for (path, text) in files {
                this.disk.push((PathBuf::from(path), (*text).to_string()));
            }
            this
        }
    }

    impl SourceProvider for MemoryFiles {
        fn load(&mut self, path: &Path) -> Option<FileId> {
            let text = self.disk.iter().find(|(p, _)| p == path)?.1.clone();
            Some(self.files.upsert(path, path, &text).0)
        }

        fn exists(&self, path: &Path) -> bool {
            self.disk.iter().any(|(p, _)| p == path)
        }

        fn add_virtual(&mut self, name: &str, text: &str) -> FileId {
            self.files.upsert(Path::new(name), Path::new(name), text).0
        }

        fn buffer(&self, file: FileId) -> Option<&SourceBuffer> {
            self.files.get(file)
        }

        fn tokens(&mut self, file: FileId) -> TokenList {
            self.files.get(file).map(|b| lex(b.text())).unwrap_or_default()
        }
    }

    fn run(files: &[(&str, &str)], lang: Language) -> (PreprocessOutput, MemoryFiles) {
        let mut provider = MemoryFiles::with(files);
        let main = provider.load(Path::new(files[0].0)).unwrap();
        let lang = LangOptions::new(lang);
        let search = HeaderSearch::default();
        let config = PreprocessConfig {
            lang: &lang,
            search: &search,
            macros: &[],
            forced_includes: &[],
            single_file: false,
        };
        let out = preprocess(main, &config, &mut provider);
        (out, provider)
    }

    fn texts(out: &PreprocessOutput) -> Vec<&str> {
        out.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn object_and_function_macros() {
        let (out, _) = run(
            &[(
                "/t/main.c",
                "#define N 4\n#define ADD(a, b) ((a) + (b))\nint x = ADD(N, 1);\n",
            )],
            Language::C,
        );
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        assert_eq!(
            texts(&out),
            ["int", "x", "=", "(", "(", "4", ")", "+", "(", "1", ")", ")", ";"]
        );
        assert_eq!(out.tokens[0].kind, SyntaxKind::INT_KW);
        assert!(out.tokens[5].start.is_macro_expansion());
    }

    #[test]
    fn self_reference_is_not_expanded_again() {
        let (out, _) = run(&[("/t/main.c", "#define foo foo + 1\nfoo;\n")], Language::C);
        assert_eq!(texts(&out), ["foo", "+", "1", ";"]);
    }

    #[test]
    fn stringify_and_paste() {
        let (out, _) = run(
            &[(
                "/t/main.c",
                "#define STR(x) #x\n#define CAT(a, b) a ## b\nCAT(my, var) = STR(a + b);\n",
            )],
            Language::C,
        );
        assert_eq!(texts(&out), ["myvar", "=", "\"a + b\"", ";"]);
        assert_eq!(out.tokens[0].kind, SyntaxKind::IDENT);
    }

    #[test]
    fn conditionals_record_skipped_ranges() {
        let source = "#if 0\nint a;\n#elif defined(X)\nint b;\n#else\nint c;\n#endif\n";
        let (out, provider) = run(&[("/t/main.c", source)], Language::C);
        assert_eq!(texts(&out), ["int", "c", ";"]);
        assert_eq!(out.skipped.len(), 1);
        let buffer = provider.buffer(out.skipped[0].file()).unwrap();
        assert_eq!(buffer.line_col(out.skipped[0].start().offset()).line, 1);
        assert_eq!(buffer.line_col(out.skipped[0].end().offset()).line, 5);
    }

    #[test]
    fn include_and_guard() {
        let (out, _) = run(
            &[
                ("/t/main.c", "#include \"a.h\"\n#include \"a.h\"\nint y;\n"),
                ("/t/a.h", "#ifndef A_H\n#define A_H\nint x;\n#endif\n"),
            ],
            Language::C,
        );
        assert_eq!(texts(&out), ["int", "x", ";", "int", "y", ";"]);
        assert_eq!(out.inclusions.len(), 2);
        assert_eq!(out.skipped.len(), 1);
    }

    #[test]
    fn missing_include_is_fatal() {
        let (out, _) = run(&[("/t/main.c", "#include <nope.h>\n")], Language::C);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].message, "'nope.h' file not found");
        assert_eq!(out.diagnostics[0].severity, crate::hir::Severity::Fatal);
    }

    #[test]
    fn if_expressions() {
        let source = "#define V 3\n#if V * 2 == 6 && !defined UNSET && (1 ? 2 : 0)\nok\n#endif\n#if __cplusplus\nbad\n#endif\n";
        let (out, _) = run(&[("/t/main.c", source)], Language::C);
        assert_eq!(texts(&out), ["ok"]);

        let (out, _) = run(&[("/t/main.c", "#if 1 / 0\n#endif\n")], Language::C);
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics[0].message.contains("division by zero"));
    }

    #[test]
    fn keywords_depend_on_language() {
        let (out, _) = run(&[("/t/main.c", "class x;\n")], Language::C);
        assert_eq!(out.tokens[0].kind, SyntaxKind::IDENT);
        let (out, _) = run(&[("/t/main.cpp", "class x;\n")], Language::Cxx);
        assert_eq!(out.tokens[0].kind, SyntaxKind::CLASS_KW);
    }

    #[test]
    fn unterminated_conditional() {
        let (out, _) = run(&[("/t/main.c", "#ifdef X\nint a;\n")], Language::C);
        assert_eq!(out.diagnostics[0].message, "unterminated conditional directive");
        assert_eq!(out.skipped.len(), 1);
    }

    #[test]
    fn wide_string_prefix_is_merged() {
        let (out, _) = run(&[("/t/main.c", "L\"abc\";\n")], Language::C);
        assert_eq!(out.tokens[0].kind, SyntaxKind::STRING);
        assert_eq!(out.tokens[0].text, "L\"abc\"");
    }
}
