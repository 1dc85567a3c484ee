//! Cursors: borrowed views of AST nodes.
//!
//! A [`Cursor`] borrows its [`TranslationUnit`], so it cannot outlive the
//! unit or survive a reparse.

use smol_str::SmolStr;

use super::unit::TranslationUnit;
use crate::base::{SourceLocation, SourceRange};
use crate::hir::{self, EvalResult};
use crate::syntax::{
    CursorKind, Node, NodeFlags, NodeId, PrintingPolicy, StorageClass, Type, TypeKind,
};

/// What a [`Cursor::visit_children`] visitor wants next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildVisit {
    /// Stop the whole traversal.
    Break,
    /// Skip this cursor's children, continue with its next sibling.
    Continue,
    /// Visit this cursor's children next.
    Recurse,
}

#[derive(Clone, Copy)]
pub struct Cursor<'tu> {
    unit: &'tu TranslationUnit,
    id: Option<NodeId>,
}

impl PartialEq for Cursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.unit, other.unit) && self.id == other.id
    }
}

impl Eq for Cursor<'_> {}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("kind", &self.kind())
            .field("spelling", &self.spelling())
            .field("id", &self.id)
            .finish()
    }
}

impl<'tu> Cursor<'tu> {
    pub(crate) fn new(unit: &'tu TranslationUnit, id: NodeId) -> Self {
        let id = unit.ast.get(id).map(|_| id);
        Self { unit, id }
    }

    pub fn null(unit: &'tu TranslationUnit) -> Self {
        Self { unit, id: None }
    }

    fn at(&self, id: NodeId) -> Self {
        Self::new(self.unit, id)
    }

    fn wrap(&self, id: Option<NodeId>) -> Option<Self> {
        id.map(|id| self.at(id))
    }

    fn node(&self) -> Option<&'tu Node> {
        self.unit.ast.get(self.id?)
    }

    pub fn is_null(&self) -> bool {
        self.id.is_none()
    }

    pub fn id(&self) -> Option<NodeId> {
        self.id
    }

    pub fn translation_unit(&self) -> &'tu TranslationUnit {
        self.unit
    }

    pub fn kind(&self) -> CursorKind {
        self.node().map_or(CursorKind::InvalidFile, |node| node.kind)
    }

    /// Declared or referenced name, literal text, or the main file name for
    /// the translation unit.
    pub fn spelling(&self) -> &'tu str {
        self.node().map_or("", |node| node.name.as_str())
    }

    /// Spelling plus the parameter types of functions: `f(int, char *)`.
    pub fn display_name(&self) -> String {
        let Some(node) = self.node() else {
            return String::new();
        };
        if !node.kind.is_function() {
            return node.name.to_string();
        }
        let policy = self.printing_policy();
        let params: Vec<String> = match &node.ty.kind {
            TypeKind::FunctionProto { params, variadic, .. } => {
                let mut params: Vec<String> = params.iter().map(|ty| ty.spelling(&policy)).collect();
                if *variadic {
                    params.push("...".to_string());
                }
                params
            }
            _ => Vec::new(),
        };
        format!("{}({})", node.name, params.join(", "))
    }

    pub fn location(&self) -> Option<SourceLocation> {
        self.node().map(|node| node.location)
    }

    pub fn extent(&self) -> Option<SourceRange> {
        self.node().map(|node| node.extent)
    }

    /// The scope the entity belongs to: the class of an out-of-line method,
    /// not the namespace it is written in.
    pub fn semantic_parent(&self) -> Option<Self> {
        self.wrap(self.node()?.semantic_parent)
    }

    pub fn lexical_parent(&self) -> Option<Self> {
        self.wrap(self.node()?.parent)
    }

    pub fn children(&self) -> Vec<Self> {
        self.node()
            .map(|node| node.children.iter().map(|&id| self.at(id)).collect())
            .unwrap_or_default()
    }

    /// Pre-order traversal of the descendants of this cursor.
    ///
    /// `visitor` receives each cursor and its parent. Returns `true` when the
    /// visitor stopped the traversal with [`ChildVisit::Break`].
    pub fn visit_children<F>(&self, mut visitor: F) -> bool
    where
        F: FnMut(Cursor<'tu>, Cursor<'tu>) -> ChildVisit,
    {
        let Some(root) = self.id else {
            return false;
        };
        let ast = &self.unit.ast;
        let mut worklist: Vec<(NodeId, usize)> = vec![(root, 0)];
        while let Some(top) = worklist.last_mut() {
            let (parent, next) = *top;
            let Some(&child) = ast[parent].children.get(next) else {
                worklist.pop();
                continue;
            };
            top.1 += 1;
            match visitor(self.at(child), self.at(parent)) {
                ChildVisit::Break => return true,
                ChildVisit::Continue => {}
                ChildVisit::Recurse => worklist.push((child, 0)),
            }
        }
        false
    }

    pub fn ty(&self) -> Type {
        self.node().map(|node| node.ty.clone()).unwrap_or_default()
    }

    /// Return type of a function cursor.
    pub fn result_type(&self) -> Option<Type> {
        self.node()?.ty.result_type().cloned()
    }

    /// The entity a reference or expression names. Declarations refer to
    /// themselves.
    pub fn referenced(&self) -> Option<Self> {
        let node = self.node()?;
        if node.kind.is_declaration() {
            return Some(*self);
        }
        self.wrap(node.referenced)
    }

    pub fn is_definition(&self) -> bool {
        self.node().is_some_and(Node::is_definition)
    }

    /// The defining declaration of the entity this cursor declares or
    /// references.
    pub fn definition(&self) -> Option<Self> {
        let decl = self.referenced()?;
        if decl.is_definition() {
            return Some(decl);
        }
        let node = decl.node()?;
        if let Some(target) = node.ty.declaration() {
            let target = self.at(target);
            if target.is_definition() && target.kind() == node.kind {
                return Some(target);
            }
        }
        let qualified = decl.qualified_name();
        let ast = &self.unit.ast;
        ast.ids()
            .filter(|&id| {
                let other = &ast[id];
                other.is_definition()
                    && other.name == node.name
                    && same_entity_kind(other.kind, node.kind)
            })
            .map(|id| self.at(id))
            .find(|candidate| candidate.qualified_name() == qualified)
    }

    /// `ns::Class::member`, following semantic parents up to the unit.
    pub fn qualified_name(&self) -> String {
        let mut parts: Vec<SmolStr> = Vec::new();
        let mut current = self.node();
        while let Some(node) = current {
            if node.kind.is_translation_unit() {
                break;
            }
            parts.push(node.name.clone());
            current = node.semantic_parent.and_then(|id| self.unit.ast.get(id));
        }
        parts.reverse();
        parts.join("::")
    }

    /// Initializer expression of a variable.
    pub fn var_decl_initializer(&self) -> Option<Self> {
        let node = self.node()?;
        if node.kind != CursorKind::VarDecl || !node.flags.contains(NodeFlags::HAS_INIT) {
            return None;
        }
        let init = node
            .children
            .iter()
            .rev()
            .copied()
            .find(|&child| self.unit.ast[child].kind.is_expression())?;
        Some(self.at(init))
    }

    /// Static storage duration: file scope, namespace scope, `static` or
    /// `extern` locals.
    pub fn has_var_decl_global_storage(&self) -> bool {
        let Some(node) = self.node() else {
            return false;
        };
        if node.kind != CursorKind::VarDecl {
            return false;
        }
        if matches!(node.storage, StorageClass::Static | StorageClass::Extern) {
            return true;
        }
        let id = self.id.unwrap_or_else(|| self.unit.ast.root());
        self.unit
            .ast
            .enclosing(id, |kind| kind.is_function() || kind == CursorKind::CompoundStmt)
            .is_none()
    }

    pub fn has_var_decl_external_storage(&self) -> bool {
        self.node()
            .is_some_and(|node| node.kind == CursorKind::VarDecl && node.storage == StorageClass::Extern)
    }

    /// Storage class of a variable, parameter or function.
    pub fn storage_class(&self) -> Option<StorageClass> {
        let node = self.node()?;
        matches!(
            node.kind,
            CursorKind::VarDecl | CursorKind::ParmDecl | CursorKind::FunctionDecl | CursorKind::CXXMethod
        )
        .then_some(node.storage)
    }

    fn argument_ids(&self) -> Option<Vec<NodeId>> {
        let node = self.node()?;
        let ast = &self.unit.ast;
        if node.kind.is_function() {
            return Some(
                node.children
                    .iter()
                    .copied()
                    .filter(|&child| ast[child].kind == CursorKind::ParmDecl)
                    .collect(),
            );
        }
        if node.kind == CursorKind::CallExpr {
            return Some(node.children.iter().skip(1).copied().collect());
        }
        None
    }

    /// Parameters of a function or arguments of a call.
    pub fn num_arguments(&self) -> Option<usize> {
        self.argument_ids().map(|ids| ids.len())
    }

    pub fn argument(&self, index: usize) -> Option<Self> {
        let ids = self.argument_ids()?;
        self.wrap(ids.get(index).copied())
    }

    pub fn evaluate(&self) -> Option<EvalResult> {
        hir::evaluate(&self.unit.ast, self.id?)
    }

    /// Printing policy for the unit's language, as used by type spellings.
    pub fn printing_policy(&self) -> PrintingPolicy {
        PrintingPolicy::for_language(&self.unit.config.lang)
    }

    /// Spelling of this cursor's type under `policy`.
    pub fn type_spelling(&self, policy: &PrintingPolicy) -> String {
        self.node()
            .map(|node| node.ty.spelling(policy))
            .unwrap_or_default()
    }
}

fn same_entity_kind(a: CursorKind, b: CursorKind) -> bool {
    a == b || (a.is_record() && b.is_record()) || (a.is_function() && b.is_function())
}

impl TranslationUnit {
    /// Innermost cursor whose extent contains `loc`; the unit cursor when
    /// no declaration does.
    pub fn cursor_at(&self, loc: SourceLocation) -> Cursor<'_> {
        let ast = &self.ast;
        let mut current = ast.root();
        loop {
            let inner = ast[current].children.iter().copied().find(|&child| {
                let extent = ast[child].extent;
                extent.contains(loc) || (extent.is_empty() && extent.start() == loc)
            });
            match inner {
                Some(child) => current = child,
                None => return Cursor::new(self, current),
            }
        }
    }

    pub fn cursor_for(&self, id: NodeId) -> Cursor<'_> {
        Cursor::new(self, id)
    }
}
