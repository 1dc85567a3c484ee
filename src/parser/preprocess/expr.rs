//! Evaluation of `#if` / `#elif` controlling expressions.
//!
//! `defined` and `__has_include` are replaced before macro expansion, then
//! the expanded tokens are folded with 64-bit signed arithmetic by
//! precedence climbing.

use smol_str::SmolStr;

use super::{FileState, LineToken, PpToken, PpTokenFlags, Preprocessor};
use crate::base::SourceLocation;
use crate::parser::literal::{parse_char, parse_integer};
use crate::parser::syntax_kind::SyntaxKind;

impl Preprocessor<'_, '_, '_> {
    pub(super) fn eval_condition(&mut self, state: &FileState, args: &[LineToken]) -> bool {
        let Some(first) = args.first() else {
            let loc = state.loc(text_size::TextSize::new(0));
            self.error("#if with no expression", loc);
            return false;
        };
        let start = state.token(first).start;

        let raw: Vec<PpToken> = args.iter().map(|t| state.token(t)).collect();
        let replaced = self.replace_operators(state, raw);
        let expanded = self.expand(replaced);
        let cplusplus = self.config.lang.cplusplus();

        let mut parser = ExprParser {
            tokens: &expanded,
            pos: 0,
            cplusplus,
            error: None,
        };
        let value = parser.ternary();
        if parser.error.is_none() && parser.pos < expanded.len() {
            parser.fail(
                "token is not a valid binary operator in a preprocessor subexpression",
                expanded[parser.pos].start,
            );
        }
        match parser.error {
            Some((message, loc)) => {
                self.error(message, loc.unwrap_or(start));
                false
            }
            None => value != 0,
        }
    }

    /// Replace `defined X`, `defined(X)` and `__has_include(...)` with `1`
    /// or `0` so that macro expansion cannot disturb their operands.
    fn replace_operators(&mut self, state: &FileState, tokens: Vec<PpToken>) -> Vec<PpToken> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut idx = 0;
        while idx < tokens.len() {
            let token = &tokens[idx];
            if token.kind != SyntaxKind::IDENT {
                out.push(token.clone());
                idx += 1;
                continue;
            }
            match token.text.as_str() {
                "defined" => {
                    let (name, next) = match tokens.get(idx + 1) {
                        Some(t) if t.kind == SyntaxKind::L_PAREN => {
                            let name = tokens.get(idx + 2).map(|t| t.text.clone());
                            let closed = tokens
                                .get(idx + 3)
                                .is_some_and(|t| t.kind == SyntaxKind::R_PAREN);
                            if !closed {
                                self.error("missing ')' after 'defined'", token.start);
                            }
                            (name, idx + 4)
                        }
                        Some(t) => (Some(t.text.clone()), idx + 2),
                        None => (None, idx + 1),
                    };
                    let value = match name {
                        Some(name) => self.macros.contains(&name),
                        None => {
                            self.error("macro name missing", token.start);
                            false
                        }
                    };
                    out.push(number_token(value, token));
                    idx = next;
                }
                "__has_include" | "__has_include_next" => {
                    let close = tokens[idx..]
                        .iter()
                        .position(|t| t.kind == SyntaxKind::R_PAREN)
                        .map(|p| idx + p);
                    let Some(close) = close else {
                        self.error("missing ')' after '__has_include'", token.start);
                        out.push(number_token(false, token));
                        idx = tokens.len();
                        continue;
                    };
                    let operand = &tokens[(idx + 2).min(close)..close];
                    let found = match operand.first().map(|t| t.kind) {
                        Some(SyntaxKind::STRING) => {
                            let name = operand[0].text.trim_matches('"');
                            self.include_exists(state, name, false)
                        }
                        Some(SyntaxKind::LT) => {
                            let name: String = operand[1..]
                                .iter()
                                .take_while(|t| t.kind != SyntaxKind::GT)
                                .map(|t| t.text.as_str())
                                .collect();
                            self.include_exists(state, &name, true)
                        }
                        _ => false,
                    };
                    out.push(number_token(found, token));
                    idx = close + 1;
                }
                _ => {
                    out.push(token.clone());
                    idx += 1;
                }
            }
        }
        out
    }

    fn include_exists(&self, state: &FileState, name: &str, angled: bool) -> bool {
        self.search_candidates(&state.dir, name, angled)
            .iter()
            .any(|path| self.provider.exists(path))
    }
}

fn number_token(value: bool, at: &PpToken) -> PpToken {
    PpToken {
        kind: SyntaxKind::INT_NUMBER,
        text: SmolStr::new_static(if value { "1" } else { "0" }),
        start: at.start,
        end: at.end,
        flags: at.flags | PpTokenFlags::NO_EXPAND,
    }
}

struct ExprParser<'t> {
    tokens: &'t [PpToken],
    pos: usize,
    cplusplus: bool,
    error: Option<(String, Option<SourceLocation>)>,
}

impl ExprParser<'_> {
    fn fail(&mut self, message: &str, loc: SourceLocation) {
        if self.error.is_none() {
            self.error = Some((message.to_string(), Some(loc)));
        }
    }

    /// Fail at the current token, or at the end of the expression.
    fn fail_here(&mut self, message: &str) {
        if self.error.is_none() {
            self.error = Some((message.to_string(), self.current_loc()));
        }
    }

    fn peek(&self) -> Option<SyntaxKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn ternary(&mut self) -> i64 {
        let cond = self.binary(0);
        if !self.eat(SyntaxKind::QUESTION) {
            return cond;
        }
        let then = self.ternary();
        if !self.eat(SyntaxKind::COLON) {
            self.fail_here("expected ':' in conditional expression");
            return 0;
        }
        let otherwise = self.ternary();
        if cond != 0 { then } else { otherwise }
    }

    fn current_loc(&self) -> Option<SourceLocation> {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.start)
    }

    fn binary(&mut self, min_prec: u8) -> i64 {
        let mut lhs = self.unary();
        while let Some(kind) = self.peek() {
            let Some(prec) = precedence(kind) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            let op = self.tokens[self.pos].start;
            self.pos += 1;
            let rhs = self.binary(prec + 1);
            lhs = match kind {
                SyntaxKind::STAR => lhs.wrapping_mul(rhs),
                SyntaxKind::SLASH | SyntaxKind::PERCENT if rhs == 0 => {
                    let message = if kind == SyntaxKind::SLASH {
                        "division by zero in preprocessor expression"
                    } else {
                        "remainder by zero in preprocessor expression"
                    };
                    self.fail(message, op);
                    0
                }
                SyntaxKind::SLASH => lhs.wrapping_div(rhs),
                SyntaxKind::PERCENT => lhs.wrapping_rem(rhs),
                SyntaxKind::PLUS => lhs.wrapping_add(rhs),
                SyntaxKind::MINUS => lhs.wrapping_sub(rhs),
                SyntaxKind::LT_LT => lhs.wrapping_shl(rhs as u32),
                SyntaxKind::GT_GT => lhs.wrapping_shr(rhs as u32),
                SyntaxKind::LT => i64::from(lhs < rhs),
                SyntaxKind::GT => i64::from(lhs > rhs),
                SyntaxKind::LT_EQ => i64::from(lhs <= rhs),
                SyntaxKind::GT_EQ => i64::from(lhs >= rhs),
                SyntaxKind::EQ_EQ => i64::from(lhs == rhs),
                SyntaxKind::BANG_EQ => i64::from(lhs != rhs),
                SyntaxKind::AMP => lhs & rhs,
                SyntaxKind::CARET => lhs ^ rhs,
                SyntaxKind::PIPE => lhs | rhs,
                SyntaxKind::AMP_AMP => i64::from(lhs != 0 && rhs != 0),
                SyntaxKind::PIPE_PIPE => i64::from(lhs != 0 || rhs != 0),
                _ => lhs,
            };
        }
        lhs
    }

    fn unary(&mut self) -> i64 {
        let Some(token) = self.tokens.get(self.pos) else {
            self.fail_here("expected value in expression");
            return 0;
        };
        self.pos += 1;
        match token.kind {
            SyntaxKind::BANG => i64::from(self.unary() == 0),
            SyntaxKind::TILDE => !self.unary(),
            SyntaxKind::MINUS => self.unary().wrapping_neg(),
            SyntaxKind::PLUS => self.unary(),
            SyntaxKind::L_PAREN => {
                let value = self.ternary();
                if !self.eat(SyntaxKind::R_PAREN) {
                    self.fail("expected ')' in preprocessor expression", token.start);
                }
                value
            }
            SyntaxKind::INT_NUMBER => match parse_integer(&token.text) {
                Some(lit) => lit.value as i64,
                None => {
                    self.fail("invalid integer constant in preprocessor expression", token.start);
                    0
                }
            },
            SyntaxKind::CHAR => parse_char(&token.text).unwrap_or(0),
            SyntaxKind::IDENT => {
                // Calls to unknown function-like names evaluate to zero.
                if self.peek() == Some(SyntaxKind::L_PAREN) {
                    let mut depth = 0usize;
                    while let Some(kind) = self.peek() {
                        self.pos += 1;
                        match kind {
                            SyntaxKind::L_PAREN => depth += 1,
                            SyntaxKind::R_PAREN => {
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                    return 0;
                }
                match token.text.as_str() {
                    "true" if self.cplusplus => 1,
                    _ => 0,
                }
            }
            _ => {
                self.fail(
                    "invalid token at start of a preprocessor expression",
                    token.start,
                );
                0
            }
        }
    }
}

fn precedence(kind: SyntaxKind) -> Option<u8> {
    let prec = match kind {
        SyntaxKind::PIPE_PIPE => 1,
        SyntaxKind::AMP_AMP => 2,
        SyntaxKind::PIPE => 3,
        SyntaxKind::CARET => 4,
        SyntaxKind::AMP => 5,
        SyntaxKind::EQ_EQ | SyntaxKind::BANG_EQ => 6,
        SyntaxKind::LT | SyntaxKind::GT | SyntaxKind::LT_EQ | SyntaxKind::GT_EQ => 7,
        SyntaxKind::LT_LT | SyntaxKind::GT_GT => 8,
        SyntaxKind::PLUS | SyntaxKind::MINUS => 9,
        SyntaxKind::STAR | SyntaxKind::SLASH | SyntaxKind::PERCENT => 10,
        _ => return None,
    };
    Some(prec)
}
