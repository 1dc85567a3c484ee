//! `#if` / `#ifdef` / `#elif` / `#else` / `#endif` handling and skipped
//! range bookkeeping.

use text_size::TextSize;

use super::{FileState, Line, LineToken, Preprocessor};
use crate::base::{SourceLocation, SourceRange};

/// One open conditional block.
#[derive(Debug, Clone)]
pub(super) struct Conditional {
    /// The `#` of the opening directive.
    pub(super) hash_loc: SourceLocation,
    /// Whether the enclosing text is live at all.
    pub(super) parent_active: bool,
    /// Whether some branch has already been taken.
    pub(super) taken: bool,
    /// Whether the current branch is live.
    pub(super) active: bool,
    pub(super) seen_else: bool,
    /// Start of the disabled region currently being skipped, if any.
    pub(super) skip_start: Option<TextSize>,
}

impl Preprocessor<'_, '_, '_> {
    pub(super) fn open_conditional(
        &mut self,
        state: &mut FileState,
        name: &str,
        line: &Line,
        args: &[LineToken],
    ) {
        let hash = line.tokens[0].range.start();
        let parent_active = !state.skipping();
        let active = parent_active
            && match name {
                "ifdef" => self.is_defined_arg(state, line, args),
                "ifndef" => !self.is_defined_arg(state, line, args),
                _ => self.eval_condition(state, args),
            };
        state.conditionals.push(Conditional {
            hash_loc: state.loc(hash),
            parent_active,
            taken: active,
            active,
            seen_else: false,
            skip_start: (parent_active && !active).then_some(hash),
        });
    }

    pub(super) fn elif(&mut self, state: &mut FileState, name: &str, line: &Line, args: &[LineToken]) {
        let hash = line.tokens[0].range.start();
        let Some(cond) = state.conditionals.last() else {
            self.error(format!("#{name} without #if"), state.loc(hash));
            return;
        };
        if cond.seen_else {
            self.error(format!("#{name} after #else"), state.loc(hash));
        }
        let evaluate = cond.parent_active && !cond.taken;
        let active = evaluate
            && match name {
                "elifdef" => self.is_defined_arg(state, line, args),
                "elifndef" => !self.is_defined_arg(state, line, args),
                _ => self.eval_condition(state, args),
            };
        self.switch_branch(state, line, active);
    }

    pub(super) fn else_branch(&mut self, state: &mut FileState, line: &Line) {
        let hash = line.tokens[0].range.start();
        let Some(seen_else) = state.conditionals.last().map(|c| c.seen_else) else {
            self.error("#else without #if", state.loc(hash));
            return;
        };
        if seen_else {
            self.error("#else after #else", state.loc(hash));
        }
        let Some(cond) = state.conditionals.last_mut() else {
            return;
        };
        cond.seen_else = true;
        let active = cond.parent_active && !cond.taken;
        self.switch_branch(state, line, active);
    }

    pub(super) fn endif(&mut self, state: &mut FileState, line: &Line) {
        let hash = line.tokens[0].range.start();
        let Some(cond) = state.conditionals.pop() else {
            self.error("#endif without #if", state.loc(hash));
            return;
        };
        if let Some(start) = cond.skip_start {
            self.record_skipped(state, start, line.end());
        }
    }

    /// Move the innermost conditional to its next branch. A run of disabled
    /// branches is recorded as a single skipped range.
    fn switch_branch(&mut self, state: &mut FileState, line: &Line, active: bool) {
        let hash = line.tokens[0].range.start();
        let end = line.end();
        let Some(cond) = state.conditionals.last_mut() else {
            return;
        };
        let finished = match (cond.skip_start, active) {
            (Some(start), true) => {
                cond.skip_start = None;
                Some(start)
            }
            (None, false) if cond.parent_active => {
                cond.skip_start = Some(hash);
                None
            }
            _ => None,
        };
        cond.active = active;
        cond.taken |= active;
        if let Some(start) = finished {
            self.record_skipped(state, start, end);
        }
    }

    fn record_skipped(&mut self, state: &FileState, start: TextSize, end: TextSize) {
        let range = SourceRange::new(state.loc(start), state.loc(end));
        tracing::trace!(file = %state.file, ?start, ?end, "skipped conditional block");
        self.out.skipped.push(range);
    }

    fn is_defined_arg(&mut self, state: &FileState, line: &Line, args: &[LineToken]) -> bool {
        match args.first() {
            Some(token) => self.macros.contains(state.slice(token.range)),
            None => {
                let loc = state.loc(line.end());
                self.error("macro name missing", loc);
                false
            }
        }
    }
}
