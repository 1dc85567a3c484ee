//! Refactoring entry points: action names and the rename target at a
//! location.

use crate::base::{SourceLocation, SourceRange};
use crate::core::identifier_at;
use crate::error::{LocationError, RefactorError};
use crate::index::{Cursor, TranslationUnit};

/// The refactoring actions a client can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefactoringActionType {
    Rename,
    RenameLocal,
    Extract,
    Inline,
    FillInEnumSwitchCases,
    LocalizeObjCStringLiteral,
}

impl RefactoringActionType {
    /// Human-readable action name, as shown in an editor menu.
    pub fn name(self) -> &'static str {
        match self {
            RefactoringActionType::Rename | RefactoringActionType::RenameLocal => "Rename",
            RefactoringActionType::Extract => "Extract Function",
            RefactoringActionType::Inline => "Inline Function",
            RefactoringActionType::FillInEnumSwitchCases => "Add Missing Switch Cases",
            RefactoringActionType::LocalizeObjCStringLiteral => "Wrap in NSLocalizedString",
        }
    }
}

impl std::fmt::Display for RefactoringActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The declaration a rename at `loc` would act on.
///
/// `loc` must sit on the name of a declaration or of a reference to one.
/// A non-empty `range` must cover exactly that name.
pub fn find_renamed_cursor<'tu>(
    unit: &'tu TranslationUnit,
    loc: SourceLocation,
    range: SourceRange,
) -> Result<Cursor<'tu>, RefactorError> {
    if range.start().file() != range.end().file() || range.file() != loc.file() {
        return Err(LocationError::CrossBufferRange.into());
    }
    if loc.is_macro_expansion() {
        return Err(RefactorError::NoCursor);
    }
    let file = unit.file_by_id(loc.file()).ok_or(LocationError::UnknownFile)?;
    let text = file.contents();
    let offset = usize::from(loc.offset());
    if offset > text.len() {
        return Err(LocationError::InvalidOffset(offset as u32).into());
    }

    let word = identifier_at(text, offset).ok_or(RefactorError::NoCursor)?;
    if !range.is_empty() {
        let selected = range.text_range();
        if usize::from(selected.start()) != word.start || usize::from(selected.end()) != word.end {
            return Err(RefactorError::NoCursor);
        }
    }

    let cursor = unit.cursor_at(loc);
    let decl = cursor
        .referenced()
        .filter(|decl| !decl.kind().is_translation_unit())
        .ok_or(RefactorError::NoCursor)?;
    let name = &text[word];
    if !names_entity(decl, name) {
        tracing::debug!(name, kind = ?decl.kind(), "location does not name the declaration");
        return Err(RefactorError::NoCursor);
    }
    tracing::debug!(name, kind = ?decl.kind(), "found rename target");
    Ok(decl)
}

/// Whether `name` is the last component of the entity's qualified name.
fn names_entity(decl: Cursor<'_>, name: &str) -> bool {
    let spelling = decl.spelling();
    spelling == name
        || spelling
            .rsplit(|c: char| c == ':' || c == ' ')
            .next()
            .is_some_and(|last| last == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names() {
        assert_eq!(RefactoringActionType::Rename.name(), "Rename");
        assert_eq!(RefactoringActionType::RenameLocal.to_string(), "Rename");
        assert_eq!(RefactoringActionType::Extract.name(), "Extract Function");
    }
}
