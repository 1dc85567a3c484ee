//! Saving and loading translation units.
//!
//! A saved unit is a JSON document: a header identifying the format, the
//! configuration the unit was built with, a snapshot of every buffer, and
//! the front-end results. Loading rebuilds the unit without running the
//! front end; tokenization and reparse then use the saved configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::frontend::UnitConfig;
use super::options::{IndexOptions, SaveFlags, TranslationUnitFlags};
use super::unit::{ReparseState, TranslationUnit};
use crate::base::{FileId, FileSet, SourceBuffer, SourceLocation, SourceRange};
use crate::error::{LoadError, SaveError};
use crate::hir::{Diagnostic, SourceCache};
use crate::parser::{HeaderSearch, Inclusion, LangOptions, MacroArg};
use crate::syntax::{Ast, Node, NodeId, Type, TypeKind};

const MAGIC: &str = "cxindex-translation-unit";
const FORMAT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct Header {
    magic: String,
    version: u32,
}

#[derive(Serialize, Deserialize)]
struct SavedFile {
    name: PathBuf,
    path: PathBuf,
    contents: String,
    version: u32,
}

#[derive(Serialize, Deserialize)]
struct SavedUnit {
    magic: String,
    version: u32,
    main_path: PathBuf,
    main_file: FileId,
    args: Vec<String>,
    lang: LangOptions,
    search: HeaderSearch,
    macros: Vec<MacroArg>,
    forced_includes: Vec<PathBuf>,
    flags: TranslationUnitFlags,
    files: Vec<SavedFile>,
    ast: Ast,
    diagnostics: Vec<Diagnostic>,
    skipped: Vec<SourceRange>,
    inclusions: Vec<Inclusion>,
    generation: u64,
}

impl TranslationUnit {
    /// Write the unit to `path`.
    pub fn save(&self, path: impl AsRef<Path>, flags: SaveFlags) -> Result<(), SaveError> {
        let path = path.as_ref();
        let saved = SavedUnit {
            magic: MAGIC.to_string(),
            version: FORMAT_VERSION,
            main_path: self.config.main.clone(),
            main_file: self.main,
            args: self.config.args.clone(),
            lang: self.config.lang.clone(),
            search: self.config.search.clone(),
            macros: self.config.macros.clone(),
            forced_includes: self.config.forced_includes.clone(),
            flags: self.config.flags,
            files: self
                .files
                .iter()
                .map(|buffer| SavedFile {
                    name: buffer.name().to_path_buf(),
                    path: buffer.path().to_path_buf(),
                    contents: buffer.text().to_string(),
                    version: buffer.version(),
                })
                .collect(),
            ast: self.ast.clone(),
            diagnostics: self.diagnostics.clone(),
            skipped: self.skipped.clone(),
            inclusions: self.inclusions.clone(),
            generation: self.generation,
        };
        let json = if flags.contains(SaveFlags::PRETTY) {
            serde_json::to_string_pretty(&saved)?
        } else {
            serde_json::to_string(&saved)?
        };
        std::fs::write(path, json).map_err(|source| SaveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), files = saved.files.len(), "saved translation unit");
        Ok(())
    }

    pub(crate) fn load(path: &Path, options: IndexOptions) -> Result<Self, LoadError> {
        if path.as_os_str().is_empty() {
            return Err(LoadError::InvalidArguments("empty path".to_string()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let header: Header = serde_json::from_str(&text)?;
        if header.magic != MAGIC {
            return Err(LoadError::Format(format!("unexpected magic '{}'", header.magic)));
        }
        if header.version != FORMAT_VERSION {
            return Err(LoadError::Format(format!(
                "unsupported format version {}",
                header.version
            )));
        }
        let saved: SavedUnit = serde_json::from_str(&text)?;

        let mut files = FileSet::new();
        for (idx, file) in saved.files.into_iter().enumerate() {
            let buffer = SourceBuffer::new(FileId::new(idx as u32), file.name, file.path, file.contents)
                .with_version(file.version);
            files.push(buffer);
        }
        if files.get(saved.main_file).is_none() {
            return Err(LoadError::Format("main file missing from snapshot".to_string()));
        }
        check_tree(&saved.ast, &files).map_err(LoadError::Format)?;
        check_locations(&saved.diagnostics, &saved.skipped, &saved.inclusions, &files)
            .map_err(LoadError::Format)?;

        let config = UnitConfig {
            main: saved.main_path,
            args: saved.args,
            lang: saved.lang,
            search: saved.search,
            macros: saved.macros,
            forced_includes: saved.forced_includes,
            flags: saved.flags,
        };
        tracing::debug!(path = %path.display(), files = files.len(), "loaded translation unit");
        Ok(TranslationUnit {
            config,
            options,
            files,
            main: saved.main_file,
            ast: saved.ast,
            diagnostics: saved.diagnostics,
            skipped: saved.skipped,
            inclusions: saved.inclusions,
            state: ReparseState::Parsed,
            generation: saved.generation,
            cache: SourceCache::new(),
        })
    }
}

/// Node links must stay inside the arena, `children` and `parent` must
/// mirror each other, and parent chains must end at the root.
fn check_tree(ast: &Ast, files: &FileSet) -> Result<(), String> {
    let len = ast.len();
    if len == 0 {
        return Err("empty syntax tree".to_string());
    }
    let in_arena = |id: NodeId| id.index() < len;
    let mut claimed = vec![false; len];
    for id in ast.ids() {
        let node = &ast[id];
        let links = node.parent.iter().chain(&node.semantic_parent).chain(&node.referenced);
        if let Some(bad) = links.copied().find(|link| !in_arena(*link)) {
            return Err(format!("node {} links to missing node {}", id.index(), bad.index()));
        }
        let mut decls = Vec::new();
        type_decls(&node.ty, &mut decls);
        if let Some(ty) = &node.type_operand {
            type_decls(ty, &mut decls);
        }
        if let Some(bad) = decls.into_iter().find(|decl| !in_arena(*decl)) {
            return Err(format!("type of node {} names missing node {}", id.index(), bad.index()));
        }
        for &child in &node.children {
            if !in_arena(child) {
                return Err(format!("node {} has missing child {}", id.index(), child.index()));
            }
            if ast[child].parent != Some(id) || std::mem::replace(&mut claimed[child.index()], true) {
                return Err(format!("node {} is not a child of node {}", child.index(), id.index()));
            }
        }
        check_location(node.location, files)?;
        check_range(node.extent, files)?;
    }
    if ast[ast.root()].parent.is_some() {
        return Err("root node has a parent".to_string());
    }

    // 0 = unvisited, 1 = on the current chain, 2 = ends without a cycle.
    let links: [fn(&Node) -> Option<NodeId>; 2] = [|n| n.parent, |n| n.semantic_parent];
    for link in links {
        let mut state = vec![0u8; len];
        for start in ast.ids() {
            let mut chain = Vec::new();
            let mut current = Some(start);
            while let Some(id) = current {
                match state[id.index()] {
                    2 => break,
                    1 => return Err(format!("node {} is its own ancestor", id.index())),
                    _ => {}
                }
                state[id.index()] = 1;
                chain.push(id);
                current = link(&ast[id]);
            }
            for id in chain {
                state[id.index()] = 2;
            }
        }
    }
    Ok(())
}

fn type_decls(ty: &Type, out: &mut Vec<NodeId>) {
    match &ty.kind {
        TypeKind::Pointer(inner)
        | TypeKind::LValueReference(inner)
        | TypeKind::RValueReference(inner)
        | TypeKind::IncompleteArray(inner)
        | TypeKind::ConstantArray { element: inner, .. }
        | TypeKind::FunctionNoProto { result: inner } => type_decls(inner, out),
        TypeKind::FunctionProto { result, params, .. } => {
            type_decls(result, out);
            for param in params {
                type_decls(param, out);
            }
        }
        TypeKind::Typedef { decl, underlying, .. } => {
            out.extend(*decl);
            type_decls(underlying, out);
        }
        TypeKind::Record { decl, .. } | TypeKind::Enum { decl, .. } => out.extend(*decl),
        _ => {}
    }
}

fn check_locations(
    diagnostics: &[Diagnostic],
    skipped: &[SourceRange],
    inclusions: &[Inclusion],
    files: &FileSet,
) -> Result<(), String> {
    for diagnostic in diagnostics {
        if let Some(location) = diagnostic.location {
            check_location(location, files)?;
        }
        for range in &diagnostic.ranges {
            check_range(*range, files)?;
        }
    }
    for range in skipped {
        check_range(*range, files)?;
    }
    for inclusion in inclusions {
        for file in [inclusion.includer, inclusion.included] {
            if files.get(file).is_none() {
                return Err(format!("inclusion names missing file {file:?}"));
            }
        }
        check_location(inclusion.location, files)?;
    }
    Ok(())
}

fn check_range(range: SourceRange, files: &FileSet) -> Result<(), String> {
    check_location(range.start(), files)?;
    check_location(range.end(), files)
}

fn check_location(location: SourceLocation, files: &FileSet) -> Result<(), String> {
    let mut sites = vec![location.spelling()];
    if location.is_macro_expansion() {
        sites.push(location.expansion());
    }
    for site in sites {
        match files.get(site.file) {
            Some(buffer) if site.offset <= buffer.len() => {}
            Some(_) => return Err(format!("offset {:?} is past the end of {:?}", site.offset, site.file)),
            None => return Err(format!("location names missing file {:?}", site.file)),
        }
    }
    Ok(())
}
