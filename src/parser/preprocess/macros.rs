//! Macro definitions and expansion.
//!
//! Expansion follows the hide-set scheme: every token remembers the macros
//! it was produced by, and a macro is never expanded again inside its own
//! result. A name that survives because of its hide set is painted with
//! [`PpTokenFlags::NO_EXPAND`] so later rescans leave it alone.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::{PpToken, PpTokenFlags, Preprocessor};
use crate::base::{FileLoc, SourceLocation};
use crate::hir::{Diagnostic, DiagnosticCategory};
use crate::parser::lexer::lex;
use crate::parser::literal::stringify;
use crate::parser::syntax_kind::SyntaxKind;

const VA_ARGS: &str = "__VA_ARGS__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct MacroDef {
    pub(super) name: SmolStr,
    /// `None` for object-like macros.
    pub(super) params: Option<Vec<SmolStr>>,
    pub(super) variadic: bool,
    pub(super) body: Vec<PpToken>,
    pub(super) location: SourceLocation,
}

impl MacroDef {
    fn param_index(&self, name: &str) -> Option<usize> {
        let params = self.params.as_ref()?;
        if let Some(idx) = params.iter().position(|p| p == name) {
            return Some(idx);
        }
        (self.variadic && name == VA_ARGS).then_some(params.len())
    }

    /// Same parameters and same body spelling.
    fn is_identical(&self, other: &MacroDef) -> bool {
        self.params == other.params
            && self.variadic == other.variadic
            && self.body.len() == other.body.len()
            && self
                .body
                .iter()
                .zip(&other.body)
                .all(|(a, b)| a.kind == b.kind && a.text == b.text)
    }
}

#[derive(Debug, Default)]
pub(super) struct MacroTable {
    macros: FxHashMap<SmolStr, MacroDef>,
}

impl MacroTable {
    /// Define a macro, returning the previous incompatible definition.
    pub(super) fn define(&mut self, def: MacroDef) -> Option<MacroDef> {
        let previous = self.macros.insert(def.name.clone(), def.clone());
        previous.filter(|prev| !prev.is_identical(&def))
    }

    pub(super) fn remove(&mut self, name: &str) {
        self.macros.remove(name);
    }

    pub(super) fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name) || matches!(name, "__LINE__" | "__FILE__")
    }

    fn get(&self, name: &str) -> Option<&MacroDef> {
        self.macros.get(name)
    }
}

/// A token during expansion, with the names it must not be expanded by.
#[derive(Debug, Clone)]
struct HToken {
    token: PpToken,
    hide: Vec<SmolStr>,
}

impl HToken {
    fn new(token: PpToken) -> Self {
        Self {
            token,
            hide: Vec::new(),
        }
    }
}

/// Where an expansion happens: the macro name through the closing paren.
#[derive(Debug, Clone, Copy)]
struct UseSite {
    start: FileLoc,
    end: FileLoc,
    leading_space: bool,
}

impl UseSite {
    fn relocate(&self, token: &PpToken) -> PpToken {
        let mut token = token.clone();
        token.start = SourceLocation::macro_expansion(token.start.spelling(), self.start);
        token.end = SourceLocation::macro_expansion(token.end.spelling(), self.end);
        token
    }
}

impl Preprocessor<'_, '_, '_> {
    /// Fully macro-expand a token sequence.
    pub(super) fn expand(&mut self, tokens: Vec<PpToken>) -> Vec<PpToken> {
        let input = tokens.into_iter().map(HToken::new).collect();
        self.expand_hidden(input)
            .into_iter()
            .map(|h| h.token)
            .collect()
    }

    fn expand_hidden(&mut self, input: Vec<HToken>) -> Vec<HToken> {
        let mut queue: VecDeque<HToken> = input.into();
        let mut out = Vec::new();

        while let Some(mut tok) = queue.pop_front() {
            if tok.token.kind != SyntaxKind::IDENT
                || tok.token.flags.contains(PpTokenFlags::NO_EXPAND)
            {
                out.push(tok);
                continue;
            }
            let name = tok.token.text.clone();
            if tok.hide.contains(&name) {
                tok.token.flags |= PpTokenFlags::NO_EXPAND;
                out.push(tok);
                continue;
            }
            if let Some(builtin) = self.builtin_macro(&tok.token) {
                out.push(HToken {
                    token: builtin,
                    hide: tok.hide,
                });
                continue;
            }
            let Some(def) = self.macros.get(&name).cloned() else {
                out.push(tok);
                continue;
            };

            let mut hide = tok.hide.clone();
            hide.push(name);
            let mut site = UseSite {
                start: tok.token.start.expansion(),
                end: tok.token.end.expansion(),
                leading_space: tok.token.flags.contains(PpTokenFlags::LEADING_SPACE),
            };

            let result = match &def.params {
                None => self.substitute(&def, &[], &hide, &site),
                Some(_) => {
                    if queue.front().map(|t| t.token.kind) != Some(SyntaxKind::L_PAREN) {
                        out.push(tok);
                        continue;
                    }
                    let Some((args, close)) = collect_args(&mut queue) else {
                        self.error(
                            "unterminated function-like macro invocation",
                            tok.token.start,
                        );
                        out.push(tok);
                        continue;
                    };
                    site.end = close.token.end.expansion();
                    let expected = def.params.as_ref().map_or(0, Vec::len);
                    let args = match self.check_arity(&def, args, expected, &tok.token) {
                        Some(args) => args,
                        None => continue,
                    };
                    self.substitute(&def, &args, &hide, &site)
                }
            };
            for tok in result.into_iter().rev() {
                queue.push_front(tok);
            }
        }
        out
    }

    fn check_arity(
        &mut self,
        def: &MacroDef,
        mut args: Vec<Vec<HToken>>,
        expected: usize,
        at: &PpToken,
    ) -> Option<Vec<Vec<HToken>>> {
        // `F()` passes one empty argument.
        if expected == 0 && !def.variadic && args.len() == 1 && args[0].is_empty() {
            args.clear();
        }
        if def.variadic {
            if args.len() > expected {
                let mut rest: Vec<HToken> = Vec::new();
                for (idx, arg) in args.drain(expected..).enumerate() {
                    if idx > 0 {
                        rest.push(HToken::new(comma_token(at)));
                    }
                    rest.extend(arg);
                }
                args.push(rest);
            } else if args.len() == expected {
                args.push(Vec::new());
            }
        }
        let wanted = expected + usize::from(def.variadic);
        if args.len() < wanted {
            self.error(
                format!("too few arguments provided to function-like macro invocation '{}'", def.name),
                at.start,
            );
            return None;
        }
        if args.len() > wanted {
            self.error(
                format!("too many arguments provided to function-like macro invocation '{}'", def.name),
                at.start,
            );
            return None;
        }
        Some(args)
    }

    /// Replace parameters in the body, apply `#` and `##`, and relocate the
    /// result to the use site.
    fn substitute(
        &mut self,
        def: &MacroDef,
        args: &[Vec<HToken>],
        hide: &[SmolStr],
        site: &UseSite,
    ) -> Vec<HToken> {
        let body = &def.body;
        let mut out: Vec<HToken> = Vec::new();
        // Set when the previous body token was `##`.
        let mut paste_next = false;
        let mut idx = 0;

        while idx < body.len() {
            let token = &body[idx];
            let next_is_paste = body
                .get(idx + 1)
                .is_some_and(|t| t.kind == SyntaxKind::HASH_HASH);

            if token.kind == SyntaxKind::HASH_HASH && idx > 0 && idx + 1 < body.len() {
                paste_next = true;
                idx += 1;
                continue;
            }

            let mut piece: Vec<HToken> = if token.kind == SyntaxKind::HASH && def.params.is_some() {
                match body.get(idx + 1).and_then(|t| def.param_index(&t.text)) {
                    Some(param) => {
                        idx += 1;
                        let text = spell(args.get(param).map_or(&[][..], Vec::as_slice));
                        let mut string = token.clone();
                        string.kind = SyntaxKind::STRING;
                        string.text = SmolStr::new(stringify(&text));
                        vec![HToken::new(string)]
                    }
                    None => vec![HToken::new(token.clone())],
                }
            } else if let Some(param) = def.param_index(&token.text).filter(|_| token.kind == SyntaxKind::IDENT) {
                let raw = args.get(param).cloned().unwrap_or_default();
                if paste_next || next_is_paste {
                    raw
                } else {
                    self.expand_hidden(raw)
                }
            } else {
                vec![HToken::new(token.clone())]
            };

            if let Some(first) = piece.first_mut() {
                first.token.flags.set(
                    PpTokenFlags::LEADING_SPACE,
                    token.flags.contains(PpTokenFlags::LEADING_SPACE),
                );
            }

            if paste_next {
                paste_next = false;
                // GNU `, ## __VA_ARGS__` drops the comma when the argument is empty.
                let is_va = def.variadic && token.text == VA_ARGS;
                if piece.is_empty() {
                    if is_va && out.last().is_some_and(|t| t.token.kind == SyntaxKind::COMMA) {
                        out.pop();
                    }
                } else if let Some(left) = out.pop() {
                    let right = piece.remove(0);
                    out.extend(self.paste(left, right));
                }
            }
            out.extend(piece);
            idx += 1;
        }

        for tok in &mut out {
            tok.token = site.relocate(&tok.token);
            for name in hide {
                if !tok.hide.contains(name) {
                    tok.hide.push(name.clone());
                }
            }
        }
        if let Some(first) = out.first_mut() {
            first.token.flags.set(PpTokenFlags::LEADING_SPACE, site.leading_space);
        }
        out
    }

    fn paste(&mut self, left: HToken, right: HToken) -> Vec<HToken> {
        let text = format!("{}{}", left.token.text, right.token.text);
        let lexed = lex(&text);
        let mut kinds = lexed.iter().filter(|t| !t.kind.is_trivia());
        match (kinds.next(), kinds.next()) {
            (Some(only), None) if only.range.len() == text_size::TextSize::of(&text) => {
                let mut token = left.token;
                token.kind = only.kind;
                token.text = SmolStr::new(&text);
                token.end = right.token.end;
                vec![HToken {
                    token,
                    hide: left.hide,
                }]
            }
            _ => {
                self.diag(Diagnostic::error(
                    DiagnosticCategory::Lexical,
                    format!("pasting formed '{text}', an invalid preprocessing token"),
                    left.token.start,
                ));
                vec![left, right]
            }
        }
    }

    /// `__LINE__` and `__FILE__`.
    fn builtin_macro(&self, token: &PpToken) -> Option<PpToken> {
        let name = token.text.as_str();
        if !matches!(name, "__LINE__" | "__FILE__") || self.macros.get(name).is_some() {
            return None;
        }
        let loc = token.start.expansion();
        let buffer = self.provider.buffer(loc.file)?;
        let mut out = token.clone();
        if name == "__LINE__" {
            out.kind = SyntaxKind::INT_NUMBER;
            out.text = SmolStr::new(buffer.line_col(loc.offset).line.to_string());
        } else {
            out.kind = SyntaxKind::STRING;
            out.text = SmolStr::new(stringify(&buffer.name().display().to_string()));
        }
        Some(out)
    }
}

/// Consume `( args )` from the front of the queue. Returns the arguments
/// and the closing paren.
fn collect_args(queue: &mut VecDeque<HToken>) -> Option<(Vec<Vec<HToken>>, HToken)> {
    let mut depth = 0usize;
    let mut len = 0;
    for (idx, tok) in queue.iter().enumerate() {
        match tok.token.kind {
            SyntaxKind::L_PAREN => depth += 1,
            SyntaxKind::R_PAREN => {
                depth -= 1;
                if depth == 0 {
                    len = idx + 1;
                    break;
                }
            }
            _ => {}
        }
    }
    if len == 0 {
        return None;
    }

    let mut tokens: Vec<HToken> = queue.drain(..len).collect();
    let close = tokens.pop()?;
    let mut args = vec![Vec::new()];
    let mut depth = 0usize;
    for tok in tokens.into_iter().skip(1) {
        match tok.token.kind {
            SyntaxKind::L_PAREN => depth += 1,
            SyntaxKind::R_PAREN => depth = depth.saturating_sub(1),
            SyntaxKind::COMMA if depth == 0 => {
                args.push(Vec::new());
                continue;
            }
            _ => {}
        }
        if let Some(last) = args.last_mut() {
            last.push(tok);
        }
    }
    Some((args, close))
}

/// Spelling of an argument for `#`, single spaces where there was
/// whitespace.
fn spell(tokens: &[HToken]) -> String {
    let mut out = String::new();
    for (idx, tok) in tokens.iter().enumerate() {
        if idx > 0 && tok.token.flags.contains(PpTokenFlags::LEADING_SPACE) {
            out.push(' ');
        }
        out.push_str(&tok.token.text);
    }
    out
}

fn comma_token(at: &PpToken) -> PpToken {
    PpToken {
        kind: SyntaxKind::COMMA,
        text: SmolStr::new_static(","),
        start: at.start,
        end: at.end,
        flags: PpTokenFlags::empty(),
    }
}
