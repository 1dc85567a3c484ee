//! Recursive descent parser for C, C++ and Objective-C.
//!
//! Reads the preprocessed token stream and builds the AST arena. The parser
//! is purely syntactic: names in types stay unresolved and expressions carry
//! no types yet, so that `hir::sema` can resolve them with full scoping.
//! The only semantic knowledge kept here is the set of names that were
//! declared as types, which C needs to tell declarations from expressions.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::lang::LangOptions;
use super::preprocess::PpToken;
use super::syntax_kind::SyntaxKind;
use crate::base::{FileId, SourceLocation, SourceRange};
use crate::hir::{Diagnostic, DiagnosticCategory};
use crate::syntax::{Ast, CursorKind, Node, NodeId};

/// Options that change what the parser builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Leave function bodies out of the tree.
    pub skip_function_bodies: bool,
}

/// Parse result: the syntactic tree and parse diagnostics.
#[derive(Debug, Clone)]
pub struct Parse {
    pub ast: Ast,
    pub diagnostics: Vec<Diagnostic>,
}

impl Parse {
    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// The main file a translation unit is rooted at.
#[derive(Debug, Clone, Copy)]
pub struct MainFile<'a> {
    pub id: FileId,
    pub name: &'a str,
    pub len: TextSize,
}

/// Parse a preprocessed token stream into an AST.
pub fn parse(
    tokens: &[PpToken],
    lang: &LangOptions,
    main: MainFile<'_>,
    options: ParseOptions,
) -> Parse {
    let mut parser = Parser::new(tokens, lang, main, options);
    parser.parse_translation_unit();
    parser.finish()
}

/// The parser state
pub(crate) struct Parser<'a> {
    tokens: &'a [PpToken],
    pos: usize,
    pub(crate) lang: &'a LangOptions,
    pub(crate) options: ParseOptions,
    pub(crate) ast: Ast,
    diagnostics: Vec<Diagnostic>,
    /// Names declared as types so far: typedefs everywhere, tags in C++.
    pub(crate) type_names: FxHashSet<SmolStr>,
    /// Enclosing record names, innermost last, for constructor detection.
    pub(crate) records: Vec<SmolStr>,
    eof: SourceLocation,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [PpToken], lang: &'a LangOptions, main: MainFile<'_>, options: ParseOptions) -> Self {
        let start = SourceLocation::new(main.id, TextSize::new(0));
        let eof = SourceLocation::new(main.id, main.len);
        let mut ast = Ast::new();
        ast.alloc(Node::new(
            CursorKind::TranslationUnit,
            main.name,
            start,
            SourceRange::new(start, eof),
        ));
        let mut type_names = FxHashSet::default();
        for builtin in ["size_t", "ptrdiff_t", "__builtin_va_list", "va_list"] {
            type_names.insert(SmolStr::new_static(builtin));
        }
        Self {
            tokens,
            pos: 0,
            lang,
            options,
            ast,
            diagnostics: Vec::new(),
            type_names,
            records: Vec::new(),
            eof,
        }
    }

    fn finish(self) -> Parse {
        tracing::trace!(
            nodes = self.ast.len(),
            errors = self.diagnostics.len(),
            "parsed translation unit"
        );
        Parse {
            ast: self.ast,
            diagnostics: self.diagnostics,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    pub(crate) fn current(&self) -> Option<&'a PpToken> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn current_kind(&self) -> SyntaxKind {
        self.nth(0)
    }

    pub(crate) fn current_text(&self) -> &'a str {
        self.nth_text(0)
    }

    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + n)
            .map_or(SyntaxKind::EOF, |t| t.kind)
    }

    pub(crate) fn nth_text(&self, n: usize) -> &'a str {
        self.tokens.get(self.pos + n).map_or("", |t| t.text.as_str())
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == kind
    }

    pub(crate) fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current_kind())
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn rewind(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Start location of the current token.
    pub(crate) fn loc(&self) -> SourceLocation {
        self.current().map_or(self.eof, |t| t.start)
    }

    /// End location of the last consumed token.
    pub(crate) fn prev_end(&self) -> SourceLocation {
        match self.pos.checked_sub(1).and_then(|idx| self.tokens.get(idx)) {
            Some(token) => token.end,
            None => self.loc(),
        }
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    pub(crate) fn bump(&mut self) -> Option<&'a PpToken> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error_expected(&format!("'{}'", kind.display()));
        false
    }

    /// Skip a balanced group starting at the current opening token.
    pub(crate) fn skip_balanced(&mut self) {
        let (open, close) = match self.current_kind() {
            SyntaxKind::L_PAREN => (SyntaxKind::L_PAREN, SyntaxKind::R_PAREN),
            SyntaxKind::L_BRACE => (SyntaxKind::L_BRACE, SyntaxKind::R_BRACE),
            SyntaxKind::L_BRACKET => (SyntaxKind::L_BRACKET, SyntaxKind::R_BRACKET),
            SyntaxKind::LT => (SyntaxKind::LT, SyntaxKind::GT),
            _ => {
                self.bump();
                return;
            }
        };
        let mut depth = 0usize;
        while let Some(token) = self.bump() {
            if token.kind == open {
                depth += 1;
            } else if token.kind == close {
                depth -= 1;
                if depth == 0 {
                    return;
                }
            }
        }
    }

    /// Error recovery: skip to the end of the current statement or
    /// declaration without leaving the enclosing braces.
    pub(crate) fn recover(&mut self) {
        while !self.at_eof() {
            match self.current_kind() {
                SyntaxKind::SEMICOLON => {
                    self.bump();
                    return;
                }
                SyntaxKind::R_BRACE => return,
                SyntaxKind::L_BRACE | SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET => {
                    self.skip_balanced()
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// GNU `__attribute__((...))`, `__declspec(...)` and `__asm__(...)`.
    pub(crate) fn skip_attributes(&mut self) {
        loop {
            let text = self.current_text();
            let is_attr = self.at(SyntaxKind::IDENT)
                && matches!(
                    text,
                    "__attribute__" | "__attribute" | "__declspec" | "__asm__" | "__asm" | "asm"
                );
            if is_attr && self.nth(1) == SyntaxKind::L_PAREN {
                self.bump();
                self.skip_balanced();
            } else if self.at(SyntaxKind::IDENT) && text == "__extension__" {
                self.bump();
            } else if self.at(SyntaxKind::L_BRACKET) && self.nth(1) == SyntaxKind::L_BRACKET {
                self.skip_balanced();
            } else {
                return;
            }
        }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn error(&mut self, message: impl Into<String>, loc: SourceLocation) {
        self.diagnostics
            .push(Diagnostic::error(DiagnosticCategory::Parse, message, loc));
    }

    pub(crate) fn warning(&mut self, message: impl Into<String>, loc: SourceLocation) {
        self.diagnostics
            .push(Diagnostic::warning(DiagnosticCategory::Parse, message, loc));
    }

    /// `expected X`, reported at the end of the previous token the way
    /// compilers point at a missing `;`.
    pub(crate) fn error_expected(&mut self, what: &str) {
        let loc = if self.pos == 0 { self.loc() } else { self.prev_end() };
        self.error(format!("expected {what}"), loc);
    }

    // =========================================================================
    // Node construction
    // =========================================================================

    /// Allocate a node whose extent runs from `start` to the end of the
    /// last consumed token.
    pub(crate) fn node(
        &mut self,
        kind: CursorKind,
        name: impl Into<SmolStr>,
        location: SourceLocation,
        start: SourceLocation,
    ) -> NodeId {
        let end = self.prev_end();
        self.ast
            .alloc(Node::new(kind, name, location, SourceRange::new(start, end)))
    }

    /// Stretch a node's extent to the end of the last consumed token.
    pub(crate) fn finish_node(&mut self, id: NodeId) {
        let end = self.prev_end();
        let start = self.ast[id].extent.start();
        self.ast[id].extent = SourceRange::new(start, end);
    }

    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.ast.append_child(parent, child);
    }

    pub(crate) fn attach_opt(&mut self, parent: NodeId, child: Option<NodeId>) {
        if let Some(child) = child {
            self.attach(parent, child);
        }
    }

    pub(crate) fn start_of(&self, id: NodeId) -> SourceLocation {
        self.ast[id].extent.start()
    }
}

/// Byte length of a token, for extents built from a single token.
pub(crate) fn token_range(token: &PpToken) -> TextRange {
    TextRange::new(token.start.offset(), token.end.offset().max(token.start.offset()))
}
