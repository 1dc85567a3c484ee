//! Semantic analysis over the parsed tree.
//!
//! One walk in source order with a stack of scopes. It links `TypeRef`s,
//! `DeclRefExpr`s, member accesses and labels to their declarations
//! through `referenced`, replaces `Unresolved` types with the entities they
//! name and assigns types to expressions. Lookup failures become
//! diagnostics.
//!
//! ```text
//! frames: [Context(TU), Context(ns1), Context(Class1), Block, Block]
//!            │             │             └─ contexts[Class1]: fields, methods
//!            │             └─ merged across reopened `namespace ns1 {}`
//!            └─ file scope
//! ```
//!
//! Namespaces, records and enums are keyed by their first declaration so
//! that reopened namespaces and redeclared tags share one member table.

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::diagnostics::{Diagnostic, DiagnosticCategory};
use super::eval::{EvalResult, evaluate};
use crate::base::SourceLocation;
use crate::parser::LangOptions;
use crate::syntax::{
    Ast, BinaryOp, CursorKind, Literal, NodeFlags, NodeId, Operator, PrintingPolicy, Qualifiers,
    TagKind, Type, TypeKind, UnaryOp,
};

/// Resolve names and types in `ast` in place.
pub fn analyze(ast: &mut Ast, lang: &LangOptions) -> Vec<Diagnostic> {
    let root = ast.root();
    let mut sema = Sema::new(ast, lang);
    sema.contexts.insert(root, Scope::default());
    sema.frames.push(Frame::Context(root));
    sema.visit_children(root);
    sema.retarget_types();
    tracing::debug!(
        diagnostics = sema.diagnostics.len(),
        "semantic analysis finished"
    );
    sema.diagnostics
}

#[derive(Debug, Default)]
struct Scope {
    ordinary: FxHashMap<SmolStr, NodeId>,
    tags: FxHashMap<SmolStr, NodeId>,
    /// Namespaces nominated by `using namespace`.
    usings: Vec<NodeId>,
}

#[derive(Debug)]
enum Frame {
    /// Translation unit, namespace, record or enum, by first declaration.
    Context(NodeId),
    Block(Scope),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ns {
    /// Variables, functions, enumerators, typedefs; tags too in C++.
    Ordinary,
    /// Names after `struct`, `union`, `class` and `enum`.
    Tag,
    /// Anything usable as a type or a scope qualifier.
    Type,
}

/// Outcome of a possibly qualified lookup.
#[derive(Debug, Clone)]
enum Lookup {
    Found(NodeId),
    /// The qualifier resolved to this context, which lacks the segment.
    MissingIn(NodeId, SmolStr),
    /// An unqualified segment that names nothing.
    Undeclared(SmolStr),
}

struct Sema<'a> {
    ast: &'a mut Ast,
    lang: &'a LangOptions,
    policy: PrintingPolicy,
    root: NodeId,
    frames: Vec<Frame>,
    contexts: FxHashMap<NodeId, Scope>,
    /// Redeclaration → first declaration, for namespaces and tags.
    canonical: FxHashMap<NodeId, NodeId>,
    /// First declaration → definition, for tags.
    definitions: FxHashMap<NodeId, NodeId>,
    /// Record → base classes, both by first declaration.
    bases: FxHashMap<NodeId, Vec<NodeId>>,
    /// Context → its anonymous namespace.
    anonymous_namespaces: FxHashMap<NodeId, NodeId>,
    labels: FxHashMap<SmolStr, NodeId>,
    functions: Vec<NodeId>,
    this_types: Vec<Type>,
    diagnostics: Vec<Diagnostic>,
    reported: FxHashSet<(SourceLocation, String)>,
}

impl<'a> Sema<'a> {
    fn new(ast: &'a mut Ast, lang: &'a LangOptions) -> Self {
        let root = ast.root();
        Self {
            ast,
            lang,
            policy: PrintingPolicy::for_language(lang),
            root,
            frames: Vec::new(),
            contexts: FxHashMap::default(),
            canonical: FxHashMap::default(),
            definitions: FxHashMap::default(),
            bases: FxHashMap::default(),
            anonymous_namespaces: FxHashMap::default(),
            labels: FxHashMap::default(),
            functions: Vec::new(),
            this_types: Vec::new(),
            diagnostics: Vec::new(),
            reported: FxHashSet::default(),
        }
    }

    fn cplusplus(&self) -> bool {
        self.lang.cplusplus()
    }

    fn error(&mut self, message: String, location: SourceLocation) {
        if self.reported.insert((location, message.clone())) {
            self.diagnostics
                .push(Diagnostic::error(DiagnosticCategory::Semantic, message, location));
        }
    }

    fn warning(&mut self, message: String, location: SourceLocation, option: &str) {
        if self.reported.insert((location, message.clone())) {
            self.diagnostics.push(
                Diagnostic::warning(DiagnosticCategory::Semantic, message, location)
                    .with_option(option),
            );
        }
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    fn canonical_of(&self, id: NodeId) -> NodeId {
        self.canonical.get(&id).copied().unwrap_or(id)
    }

    fn definition_of(&self, id: NodeId) -> Option<NodeId> {
        self.definitions.get(&self.canonical_of(id)).copied()
    }

    fn top(&self) -> usize {
        self.frames.len() - 1
    }

    fn scope_at(&mut self, index: usize) -> &mut Scope {
        match &mut self.frames[index] {
            Frame::Block(scope) => scope,
            Frame::Context(ctx) => self.contexts.entry(*ctx).or_default(),
        }
    }

    fn scope_ref(&self, index: usize) -> Option<&Scope> {
        match &self.frames[index] {
            Frame::Block(scope) => Some(scope),
            Frame::Context(ctx) => self.contexts.get(ctx),
        }
    }

    /// Innermost context frame (translation unit, namespace, record).
    fn current_context(&self) -> NodeId {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| match frame {
                Frame::Context(ctx) => Some(*ctx),
                Frame::Block(_) => None,
            })
            .unwrap_or(self.root)
    }

    /// Frame a tag declaration lands in. C has no nested tag scopes inside
    /// records.
    fn tag_frame(&self) -> usize {
        if self.cplusplus() {
            return self.top();
        }
        (0..self.frames.len())
            .rev()
            .find(|&index| match &self.frames[index] {
                Frame::Context(ctx) => !self.ast[*ctx].kind.is_record(),
                Frame::Block(_) => true,
            })
            .unwrap_or(0)
    }

    fn is_tag_decl(&self, id: NodeId) -> bool {
        let kind = self.ast[id].kind;
        kind.is_record() || kind == CursorKind::EnumDecl
    }

    fn is_type_or_scope(&self, id: NodeId) -> bool {
        matches!(
            self.ast[id].kind,
            CursorKind::StructDecl
                | CursorKind::ClassDecl
                | CursorKind::UnionDecl
                | CursorKind::EnumDecl
                | CursorKind::TypedefDecl
                | CursorKind::Namespace
                | CursorKind::ObjCInterfaceDecl
                | CursorKind::ObjCImplementationDecl
        )
    }

    /// Declare `name` in the frame at `index`. In C++ a tag is also an
    /// ordinary name unless something else already uses it there.
    fn declare_at(&mut self, index: usize, name: SmolStr, id: NodeId, is_tag: bool) {
        if name.is_empty() {
            return;
        }
        let cplusplus = self.cplusplus();
        let existing = self
            .scope_ref(index)
            .and_then(|scope| scope.ordinary.get(&name).copied());
        let existing_is_tag = existing.is_some_and(|e| self.is_tag_decl(e));
        let scope = self.scope_at(index);
        if is_tag {
            scope.tags.insert(name.clone(), id);
            if cplusplus && (existing.is_none() || existing_is_tag) {
                scope.ordinary.insert(name, id);
            }
        } else {
            scope.ordinary.insert(name, id);
        }
    }

    fn local(&self, index: usize, name: &str, ns: Ns) -> Option<NodeId> {
        let scope = self.scope_ref(index)?;
        self.scope_get(scope, name, ns)
    }

    fn scope_get(&self, scope: &Scope, name: &str, ns: Ns) -> Option<NodeId> {
        match ns {
            Ns::Ordinary => scope.ordinary.get(name).copied(),
            Ns::Tag => scope.tags.get(name).copied(),
            Ns::Type => {
                if let Some(&hit) = scope.ordinary.get(name) {
                    if self.is_type_or_scope(hit) {
                        return Some(hit);
                    }
                }
                if self.cplusplus() {
                    scope.tags.get(name).copied()
                } else {
                    None
                }
            }
        }
    }

    /// Members of a context, following using-directives and base classes.
    fn lookup_in(&self, ctx: NodeId, name: &str, ns: Ns, visited: &mut Vec<NodeId>) -> Option<NodeId> {
        if visited.contains(&ctx) {
            return None;
        }
        visited.push(ctx);
        let scope = self.contexts.get(&ctx)?;
        if let Some(hit) = self.scope_get(scope, name, ns) {
            return Some(hit);
        }
        for &nominated in &scope.usings {
            if let Some(hit) = self.lookup_in(nominated, name, ns, visited) {
                return Some(hit);
            }
        }
        for &base in self.bases.get(&ctx).into_iter().flatten() {
            if let Some(hit) = self.lookup_in(base, name, ns, visited) {
                return Some(hit);
            }
        }
        None
    }

    fn member(&self, ctx: NodeId, name: &str, ns: Ns) -> Option<NodeId> {
        self.lookup_in(ctx, name, ns, &mut Vec::new())
    }

    /// Unqualified lookup from the innermost scope outwards.
    fn lookup(&self, name: &str, ns: Ns) -> Option<NodeId> {
        for frame in self.frames.iter().rev() {
            let hit = match frame {
                Frame::Block(scope) => self.scope_get(scope, name, ns).or_else(|| {
                    scope
                        .usings
                        .iter()
                        .find_map(|&nominated| self.member(nominated, name, ns))
                }),
                Frame::Context(ctx) => self.member(*ctx, name, ns),
            };
            if hit.is_some() {
                return hit;
            }
        }
        None
    }

    /// Context a qualifier names: namespaces, records, enums and typedefs
    /// of records.
    fn scope_of(&self, decl: NodeId) -> Option<NodeId> {
        let node = &self.ast[decl];
        match node.kind {
            CursorKind::Namespace
            | CursorKind::StructDecl
            | CursorKind::ClassDecl
            | CursorKind::UnionDecl
            | CursorKind::EnumDecl => Some(self.canonical_of(decl)),
            CursorKind::TypedefDecl => {
                let target = node.ty.canonical().declaration()?;
                Some(self.canonical_of(target))
            }
            _ => None,
        }
    }

    /// Look up `x`, `ns::x` or `::x`.
    fn lookup_qualified(&self, written: &str, ns: Ns) -> Lookup {
        let (global, path) = match written.strip_prefix("::") {
            Some(rest) => (true, rest),
            None => (false, written),
        };
        let segments: Vec<&str> = path.split("::").collect();
        let Some((last, qualifiers)) = segments.split_last() else {
            return Lookup::Undeclared(SmolStr::new(written));
        };
        let mut ctx = if global { Some(self.root) } else { None };
        for segment in qualifiers {
            let hit = match ctx {
                None => self.lookup(segment, Ns::Type),
                Some(ctx) => self.member(ctx, segment, Ns::Type),
            };
            match (hit.and_then(|decl| self.scope_of(decl)), ctx) {
                (Some(next), _) => ctx = Some(next),
                (None, None) => return Lookup::Undeclared(SmolStr::new(segment)),
                (None, Some(ctx)) => return Lookup::MissingIn(ctx, SmolStr::new(segment)),
            }
        }
        match ctx {
            None => match self.lookup(last, ns) {
                Some(hit) => Lookup::Found(hit),
                None => Lookup::Undeclared(SmolStr::new(last)),
            },
            Some(ctx) => match self.member(ctx, last, ns) {
                Some(hit) => Lookup::Found(hit),
                None => Lookup::MissingIn(ctx, SmolStr::new(last)),
            },
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// `ns1::Class1`, with `(anonymous namespace)` for unnamed namespaces.
    fn qualified_name(&self, id: NodeId) -> SmolStr {
        let node = &self.ast[id];
        let own = if node.name.is_empty() {
            "(anonymous)"
        } else {
            node.name.as_str()
        };
        if !self.cplusplus() {
            return SmolStr::new(own);
        }
        let mut parts = vec![own.to_string()];
        let mut current = node.semantic_parent;
        while let Some(parent) = current {
            let parent_node = &self.ast[parent];
            match parent_node.kind {
                CursorKind::Namespace if parent_node.name.is_empty() => {
                    parts.push("(anonymous namespace)".to_string())
                }
                CursorKind::Namespace
                | CursorKind::StructDecl
                | CursorKind::ClassDecl
                | CursorKind::UnionDecl
                | CursorKind::EnumDecl => parts.push(if parent_node.name.is_empty() {
                    "(anonymous)".to_string()
                } else {
                    parent_node.name.to_string()
                }),
                kind if kind.is_function() || kind.is_translation_unit() => break,
                _ => {}
            }
            current = parent_node.semantic_parent;
        }
        parts.reverse();
        SmolStr::new(parts.join("::"))
    }

    /// The type a declaration introduces, for type-declaring cursors.
    fn decl_type(&self, decl: NodeId) -> Option<Type> {
        let node = &self.ast[decl];
        match node.kind {
            CursorKind::StructDecl
            | CursorKind::ClassDecl
            | CursorKind::UnionDecl
            | CursorKind::EnumDecl => Some(self.ast[self.canonical_of(decl)].ty.unqualified()),
            CursorKind::TypedefDecl => Some(node.ty.clone()),
            CursorKind::ObjCInterfaceDecl | CursorKind::ObjCImplementationDecl => {
                Some(Type::new(TypeKind::ObjCObjectPointer {
                    class: node.name.clone(),
                }))
            }
            _ => None,
        }
    }

    /// The type of an expression naming `decl`.
    fn value_type(&self, decl: NodeId) -> Type {
        let node = &self.ast[decl];
        match node.kind {
            CursorKind::VarDecl
            | CursorKind::ParmDecl
            | CursorKind::FieldDecl
            | CursorKind::EnumConstantDecl => node.ty.clone(),
            kind if kind.is_function() => node.ty.clone(),
            _ => self.decl_type(decl).unwrap_or_default(),
        }
    }

    fn resolve_named(&self, name: &SmolStr, tag: Option<TagKind>) -> Type {
        let ns = if tag.is_some() { Ns::Tag } else { Ns::Type };
        if let Lookup::Found(decl) = self.lookup_qualified(name, ns) {
            return self.decl_type(decl).unwrap_or_default();
        }
        if tag.is_none() && !self.cplusplus() {
            if let Lookup::Found(decl) = self.lookup_qualified(name, Ns::Tag) {
                return self.decl_type(decl).unwrap_or_default();
            }
        }
        let last = SmolStr::new(name.rsplit("::").next().unwrap_or(name));
        match tag {
            Some(TagKind::Enum) => Type::new(TypeKind::Enum {
                name: last,
                qualified: name.clone(),
                decl: None,
            }),
            Some(tag) => Type::new(TypeKind::Record {
                tag,
                name: last,
                qualified: name.clone(),
                decl: None,
            }),
            None => Type::invalid(),
        }
    }

    /// Replace unresolved names and stale tag types inside `ty`.
    fn resolve_type(&self, ty: &Type) -> Type {
        let quals = ty.quals;
        let kind = match &ty.kind {
            TypeKind::Unresolved { name, tag } => {
                return self.resolve_named(name, *tag).with_quals(quals);
            }
            TypeKind::Record { decl: Some(decl), .. } | TypeKind::Enum { decl: Some(decl), .. } => {
                return self.ast[self.canonical_of(*decl)].ty.unqualified().with_quals(quals);
            }
            TypeKind::Pointer(inner) => {
                let resolved = self.resolve_type(inner);
                // `NSString *` is the object pointer itself.
                if matches!(inner.kind, TypeKind::Unresolved { .. })
                    && matches!(resolved.kind, TypeKind::ObjCObjectPointer { .. })
                {
                    return resolved.with_quals(quals);
                }
                TypeKind::Pointer(Box::new(resolved))
            }
            TypeKind::LValueReference(inner) => {
                TypeKind::LValueReference(Box::new(self.resolve_type(inner)))
            }
            TypeKind::RValueReference(inner) => {
                TypeKind::RValueReference(Box::new(self.resolve_type(inner)))
            }
            TypeKind::ConstantArray { element, size } => TypeKind::ConstantArray {
                element: Box::new(self.resolve_type(element)),
                size: *size,
            },
            TypeKind::IncompleteArray(element) => {
                TypeKind::IncompleteArray(Box::new(self.resolve_type(element)))
            }
            TypeKind::FunctionProto {
                result,
                params,
                variadic,
            } => TypeKind::FunctionProto {
                result: Box::new(self.resolve_type(result)),
                params: params.iter().map(|p| self.resolve_type(p)).collect(),
                variadic: *variadic,
            },
            TypeKind::FunctionNoProto { result } => TypeKind::FunctionNoProto {
                result: Box::new(self.resolve_type(result)),
            },
            other => other.clone(),
        };
        Type { kind, quals }
    }

    fn resolve_node_type(&mut self, id: NodeId) {
        let ty = self.resolve_type(&self.ast[id].ty);
        self.ast[id].ty = ty;
        if let Some(operand) = self.ast[id].type_operand.clone() {
            self.ast[id].type_operand = Some(self.resolve_type(&operand));
        }
    }

    /// Point record and enum types at their definitions.
    fn retarget_types(&mut self) {
        let ids: Vec<NodeId> = self.ast.ids().collect();
        for id in ids {
            let mut ty = std::mem::take(&mut self.ast[id].ty);
            self.retarget(&mut ty);
            self.ast[id].ty = ty;
            if let Some(mut operand) = self.ast[id].type_operand.take() {
                self.retarget(&mut operand);
                self.ast[id].type_operand = Some(operand);
            }
        }
    }

    fn retarget(&self, ty: &mut Type) {
        match &mut ty.kind {
            TypeKind::Record { decl: Some(decl), .. } | TypeKind::Enum { decl: Some(decl), .. } => {
                if let Some(definition) = self.definition_of(*decl) {
                    *decl = definition;
                }
            }
            TypeKind::Pointer(inner)
            | TypeKind::LValueReference(inner)
            | TypeKind::RValueReference(inner)
            | TypeKind::IncompleteArray(inner)
            | TypeKind::ConstantArray { element: inner, .. } => self.retarget(inner),
            TypeKind::Typedef { underlying, .. } => self.retarget(underlying),
            TypeKind::FunctionProto { result, params, .. } => {
                self.retarget(result);
                for param in params {
                    self.retarget(param);
                }
            }
            TypeKind::FunctionNoProto { result } => self.retarget(result),
            _ => {}
        }
    }

    fn bool_type(&self) -> Type {
        Type::new(if self.cplusplus() {
            TypeKind::Bool
        } else {
            TypeKind::Int
        })
    }

    fn spell(&self, ty: &Type) -> String {
        ty.spelling(&self.policy)
    }

    fn describe_context(&self, ctx: NodeId) -> String {
        let node = &self.ast[ctx];
        match node.kind {
            CursorKind::Namespace => format!("namespace '{}'", self.qualified_name(ctx)),
            _ => format!("'{}'", self.spell(&node.ty)),
        }
    }

    // =========================================================================
    // Walk
    // =========================================================================

    fn visit_children(&mut self, id: NodeId) {
        let children = self.ast[id].children.clone();
        for child in children {
            self.visit(child);
        }
    }

    fn visit(&mut self, id: NodeId) {
        let kind = self.ast[id].kind;
        if kind.is_declaration() {
            self.fix_local_parent(id);
        }
        match kind {
            CursorKind::Namespace => self.visit_namespace(id),
            CursorKind::StructDecl
            | CursorKind::ClassDecl
            | CursorKind::UnionDecl
            | CursorKind::EnumDecl => self.visit_tag(id),
            CursorKind::TypedefDecl => self.visit_typedef(id),
            CursorKind::VarDecl | CursorKind::FieldDecl | CursorKind::ParmDecl => {
                self.visit_variable(id)
            }
            kind if kind.is_function() => self.visit_function(id),
            CursorKind::UsingDirective => self.visit_using_directive(id),
            CursorKind::UsingDeclaration => self.visit_using_declaration(id),
            CursorKind::StaticAssert => self.visit_static_assert(id),
            CursorKind::ObjCInterfaceDecl | CursorKind::ObjCImplementationDecl => {
                let name = self.ast[id].name.clone();
                let top = self.top();
                self.declare_at(top, name, id, false);
            }
            CursorKind::TypeRef => self.resolve_ref(id),
            CursorKind::LabelRef => self.resolve_label(id),
            CursorKind::CompoundStmt
            | CursorKind::IfStmt
            | CursorKind::WhileStmt
            | CursorKind::ForStmt
            | CursorKind::SwitchStmt => {
                self.frames.push(Frame::Block(Scope::default()));
                self.visit_children(id);
                self.frames.pop();
            }
            kind if kind.is_expression() => self.visit_expr(id),
            _ => self.visit_children(id),
        }
    }

    /// Declarations inside statements belong to the enclosing function.
    fn fix_local_parent(&mut self, id: NodeId) {
        let Some(parent) = self.ast[id].parent else {
            return;
        };
        if self.ast[parent].kind.is_statement() {
            if let Some(&function) = self.functions.last() {
                self.ast[id].semantic_parent = Some(function);
            }
        }
    }

    /// Resolve the reference children of a declaration.
    fn visit_refs(&mut self, id: NodeId) {
        let children = self.ast[id].children.clone();
        for child in children {
            if self.ast[child].kind == CursorKind::TypeRef {
                self.resolve_ref(child);
            }
        }
    }

    fn visit_non_refs(&mut self, id: NodeId) {
        let children = self.ast[id].children.clone();
        for child in children {
            if !self.ast[child].kind.is_reference() {
                self.visit(child);
            }
        }
    }

    fn visit_namespace(&mut self, id: NodeId) {
        let name = self.ast[id].name.clone();
        let top = self.top();
        let ctx = self.current_context();
        let prior = if name.is_empty() {
            self.anonymous_namespaces.get(&ctx).copied()
        } else {
            self.local(top, &name, Ns::Ordinary)
                .filter(|&hit| self.ast[hit].kind == CursorKind::Namespace)
        };
        let canonical = match prior {
            Some(prior) => {
                let canonical = self.canonical_of(prior);
                self.canonical.insert(id, canonical);
                canonical
            }
            None => {
                if name.is_empty() {
                    self.anonymous_namespaces.insert(ctx, id);
                    self.scope_at(top).usings.push(id);
                } else {
                    self.declare_at(top, name, id, false);
                }
                id
            }
        };
        self.contexts.entry(canonical).or_default();
        self.frames.push(Frame::Context(canonical));
        self.visit_children(id);
        self.frames.pop();
    }

    /// Resolve the context a qualified declarator names (`A::B::f` → `B`).
    fn owner_of(&self, id: NodeId) -> Option<NodeId> {
        let written = self.ast[id].written.clone();
        let (qualifier, _) = written.rsplit_once("::")?;
        if qualifier.is_empty() {
            return Some(self.root);
        }
        match self.lookup_qualified(qualifier, Ns::Type) {
            Lookup::Found(decl) => self.scope_of(decl),
            _ => None,
        }
    }

    /// Push context frames for `owner` and its enclosing contexts. Returns
    /// how many were pushed.
    fn enter_owner(&mut self, owner: NodeId) -> usize {
        let mut chain = Vec::new();
        let mut current = Some(owner);
        while let Some(ctx) = current {
            if ctx == self.root || self.ast[ctx].kind.is_translation_unit() {
                break;
            }
            let node = &self.ast[ctx];
            if matches!(node.kind, CursorKind::Namespace) || self.is_tag_decl(ctx) {
                chain.push(self.canonical_of(ctx));
            }
            current = node.semantic_parent;
        }
        let already: Vec<NodeId> = self
            .frames
            .iter()
            .filter_map(|frame| match frame {
                Frame::Context(ctx) => Some(*ctx),
                Frame::Block(_) => None,
            })
            .collect();
        let mut pushed = 0;
        for ctx in chain.into_iter().rev() {
            if !already.contains(&ctx) {
                self.frames.push(Frame::Context(ctx));
                pushed += 1;
            }
        }
        pushed
    }

    fn leave(&mut self, count: usize) {
        for _ in 0..count {
            self.frames.pop();
        }
    }

    fn visit_tag(&mut self, id: NodeId) {
        let node = &self.ast[id];
        let name = node.name.clone();
        let written = node.written.clone();
        let kind = node.kind;
        let is_definition = node.is_definition();
        let location = node.location;
        let children = node.children.clone();
        let qualifier_prefix = format!("{written}::");

        // Qualifier refs precede base-class refs; both are TypeRefs.
        let mut body = Vec::new();
        for &child in &children {
            let child_node = &self.ast[child];
            if child_node.kind == CursorKind::TypeRef
                && qualifier_prefix.starts_with(&format!("{}::", child_node.written))
                && child_node.written != written
            {
                self.resolve_ref(child);
            } else {
                body.push(child);
            }
        }

        let owner = self.owner_of(id);
        if let Some(owner) = owner {
            let parent = self.definition_of(owner).unwrap_or(owner);
            self.ast[id].semantic_parent = Some(parent);
        }
        let prior = if name.is_empty() {
            None
        } else if let Some(owner) = owner {
            self.member(owner, &name, Ns::Tag)
        } else {
            self.local(self.tag_frame(), &name, Ns::Tag)
        };
        let prior = prior.filter(|&prior| prior != id && self.is_tag_decl(prior));
        let canonical = match prior {
            Some(prior) => {
                let canonical = self.canonical_of(prior);
                if is_definition && self.definitions.contains_key(&canonical) {
                    self.error(format!("redefinition of '{name}'"), location);
                }
                self.canonical.insert(id, canonical);
                canonical
            }
            None => {
                match owner {
                    Some(owner) => {
                        self.contexts
                            .entry(owner)
                            .or_default()
                            .tags
                            .insert(name.clone(), id);
                    }
                    None => {
                        let frame = self.tag_frame();
                        self.declare_at(frame, name.clone(), id, true);
                    }
                }
                id
            }
        };

        if canonical == id {
            let qualified = self.qualified_name(id);
            let display = if name.is_empty() {
                SmolStr::new("(anonymous)")
            } else {
                name.clone()
            };
            self.ast[id].ty = Type::new(match kind {
                CursorKind::EnumDecl => TypeKind::Enum {
                    name: display,
                    qualified,
                    decl: Some(id),
                },
                _ => TypeKind::Record {
                    tag: tag_of(kind),
                    name: display,
                    qualified,
                    decl: Some(id),
                },
            });
        } else {
            self.ast[id].ty = self.ast[canonical].ty.clone();
        }
        if !is_definition {
            return;
        }
        self.definitions.insert(canonical, id);
        self.contexts.entry(canonical).or_default();

        if kind == CursorKind::EnumDecl {
            self.visit_enum_body(id, canonical, &body);
            return;
        }

        // Base classes.
        let mut bases = Vec::new();
        let mut members = Vec::new();
        for child in body {
            if self.ast[child].kind == CursorKind::TypeRef {
                self.resolve_ref(child);
                if let Some(base) = self.ast[child].referenced {
                    if self.is_tag_decl(base) {
                        bases.push(self.canonical_of(base));
                    }
                }
            } else {
                members.push(child);
            }
        }
        if !bases.is_empty() {
            self.bases.insert(canonical, bases);
        }

        self.frames.push(Frame::Context(canonical));
        self.hoist_members(id);
        for member in members {
            self.visit(member);
        }
        self.frames.pop();

        if name.is_empty() {
            self.inject_anonymous_members(id);
        }
    }

    /// Member names are visible in member function bodies before their
    /// declaration point.
    fn hoist_members(&mut self, record: NodeId) {
        let top = self.top();
        let children = self.ast[record].children.clone();
        for child in children {
            let name = self.ast[child].name.clone();
            let kind = self.ast[child].kind;
            match kind {
                CursorKind::FieldDecl
                | CursorKind::VarDecl
                | CursorKind::CXXMethod
                | CursorKind::Constructor
                | CursorKind::Destructor
                | CursorKind::TypedefDecl => self.declare_at(top, name, child, false),
                CursorKind::StructDecl
                | CursorKind::ClassDecl
                | CursorKind::UnionDecl
                | CursorKind::EnumDecl
                    if self.cplusplus() && !name.is_empty() =>
                {
                    self.declare_at(top, name, child, true)
                }
                _ => {}
            }
        }
    }

    /// Fields of an anonymous struct or union member are members of the
    /// enclosing record.
    fn inject_anonymous_members(&mut self, record: NodeId) {
        let Some(parent) = self.ast[record].parent else {
            return;
        };
        if !self.ast[parent].kind.is_record() {
            return;
        }
        let has_declarator = self.ast[parent].children.iter().any(|&sibling| {
            sibling != record && self.ast[sibling].ty.declaration() == Some(record)
        });
        if has_declarator {
            return;
        }
        let target = self.canonical_of(parent);
        let fields: Vec<(SmolStr, NodeId)> = self
            .contexts
            .get(&record)
            .map(|scope| {
                scope
                    .ordinary
                    .iter()
                    .map(|(name, &id)| (name.clone(), id))
                    .collect()
            })
            .unwrap_or_default();
        let scope = self.contexts.entry(target).or_default();
        for (name, id) in fields {
            scope.ordinary.entry(name).or_insert(id);
        }
    }

    fn visit_enum_body(&mut self, id: NodeId, canonical: NodeId, body: &[NodeId]) {
        let scoped = self.ast[id].flags.contains(NodeFlags::SCOPED_ENUM);
        let constant_type = if self.cplusplus() {
            self.ast[id].ty.clone()
        } else {
            Type::new(TypeKind::Int)
        };
        let outer = if self.cplusplus() { self.top() } else { self.tag_frame() };
        self.frames.push(Frame::Context(canonical));
        let inner = self.top();
        for &child in body {
            if self.ast[child].kind != CursorKind::EnumConstantDecl {
                self.visit(child);
                continue;
            }
            self.visit_children(child);
            let name = self.ast[child].name.clone();
            self.ast[child].ty = constant_type.clone();
            self.declare_at(inner, name.clone(), child, false);
            if !scoped {
                self.declare_at(outer, name, child, false);
            }
        }
        self.frames.pop();
    }

    fn visit_typedef(&mut self, id: NodeId) {
        self.visit_refs(id);
        let underlying = self.resolve_type(&self.ast[id].ty);
        let name = self.ast[id].name.clone();
        self.ast[id].ty = Type::new(TypeKind::Typedef {
            name: name.clone(),
            decl: Some(id),
            underlying: Box::new(underlying),
        });
        let top = self.top();
        self.declare_at(top, name, id, false);
        self.visit_non_refs(id);
    }

    fn visit_variable(&mut self, id: NodeId) {
        self.visit_refs(id);
        self.resolve_node_type(id);
        let node = &self.ast[id];
        let name = node.name.clone();
        let kind = node.kind;
        let location = node.location;
        let has_init = node.flags.contains(NodeFlags::HAS_INIT);
        let is_definition = node.is_definition();

        let top = self.top();
        if let Some(prior) = self.local(top, &name, Ns::Ordinary) {
            let prior_node = &self.ast[prior];
            let same_family = matches!(
                prior_node.kind,
                CursorKind::VarDecl | CursorKind::ParmDecl | CursorKind::FieldDecl
            );
            let in_block = matches!(self.frames[top], Frame::Block(_));
            let clash = if in_block {
                is_definition && prior_node.is_definition()
            } else {
                has_init && prior_node.flags.contains(NodeFlags::HAS_INIT)
            };
            let hoisted_self = prior == id;
            if same_family && clash && !hoisted_self && kind != CursorKind::FieldDecl {
                self.error(format!("redefinition of '{name}'"), location);
            }
        }
        if kind != CursorKind::FieldDecl || !self.current_is_record() {
            self.declare_at(top, name, id, false);
        }

        let children = self.ast[id].children.clone();
        let has_params = children
            .iter()
            .any(|&c| self.ast[c].kind == CursorKind::ParmDecl);
        if has_params {
            self.frames.push(Frame::Block(Scope::default()));
        }
        for &child in &children {
            if !self.ast[child].kind.is_reference() {
                self.visit(child);
            }
        }
        if has_params {
            self.frames.pop();
        }

        if has_init {
            if let Some(&init) = children.last() {
                self.adopt_initializer(id, init);
            }
        }
    }

    fn current_is_record(&self) -> bool {
        match self.frames.last() {
            Some(Frame::Context(ctx)) => self.ast[*ctx].kind.is_record(),
            _ => false,
        }
    }

    /// `auto` deduction and init-list typing.
    fn adopt_initializer(&mut self, id: NodeId, init: NodeId) {
        let declared = self.ast[id].ty.clone();
        if self.ast[init].kind == CursorKind::InitListExpr {
            self.ast[init].ty = declared.clone();
        }
        if declared.kind == TypeKind::Auto {
            let deduced = decay(&self.ast[init].ty.non_reference())
                .unqualified()
                .with_quals(declared.quals);
            if deduced.is_valid() {
                self.ast[id].ty = deduced;
            }
        }
    }

    fn visit_function(&mut self, id: NodeId) {
        self.visit_refs(id);
        let owner = self.owner_of(id);
        let node = &self.ast[id];
        let name = node.name.clone();
        let location = node.location;
        let is_definition = node.is_definition();
        let qualified = node.written.contains("::");

        if let Some(owner) = owner {
            let owner_is_record = self.ast[owner].kind.is_record();
            if owner_is_record && self.ast[id].kind == CursorKind::FunctionDecl {
                self.ast[id].kind = CursorKind::CXXMethod;
            }
            let parent = self.definition_of(owner).unwrap_or(owner);
            self.ast[id].semantic_parent = Some(parent);
            if self.member(owner, &name, Ns::Ordinary).is_none() {
                let message = if owner_is_record {
                    format!(
                        "out-of-line definition of '{name}' does not match any declaration in '{}'",
                        self.qualified_name(owner)
                    )
                } else {
                    format!(
                        "out-of-line declaration of '{name}' does not match any declaration in {}",
                        self.describe_context(owner)
                    )
                };
                self.error(message, location);
            }
        }

        self.resolve_node_type(id);

        if !qualified {
            let top = self.top();
            if let Some(prior) = self.local(top, &name, Ns::Ordinary) {
                let prior_node = &self.ast[prior];
                let redefined = prior != id
                    && prior_node.kind.is_function()
                    && prior_node.is_definition()
                    && is_definition
                    && prior_node.ty.canonical() == self.ast[id].ty.canonical();
                if redefined {
                    self.error(format!("redefinition of '{name}'"), location);
                }
            }
            self.declare_at(top, name, id, false);
        }

        let pushed = owner.map_or(0, |owner| self.enter_owner(owner));
        let record = match self.frames.last() {
            Some(Frame::Context(ctx)) if self.ast[*ctx].kind.is_record() => Some(*ctx),
            _ => None,
        };
        if let Some(record) = record {
            self.this_types.push(self.ast[record].ty.unqualified().pointer_to());
        }
        self.frames.push(Frame::Block(Scope::default()));
        self.functions.push(id);
        let saved_labels = std::mem::take(&mut self.labels);
        self.collect_labels(id);

        let children = self.ast[id].children.clone();
        for child in children {
            match self.ast[child].kind {
                CursorKind::TypeRef => {}
                CursorKind::MemberRef => self.resolve_member_initializer(child, record),
                _ => self.visit(child),
            }
        }

        self.labels = saved_labels;
        self.functions.pop();
        self.frames.pop();
        if record.is_some() {
            self.this_types.pop();
        }
        self.leave(pushed);
    }

    fn collect_labels(&mut self, function: NodeId) {
        for id in self.ast.descendants(function) {
            let node = &self.ast[id];
            if node.kind == CursorKind::LabelStmt {
                self.labels.insert(node.name.clone(), id);
            }
        }
    }

    fn resolve_label(&mut self, id: NodeId) {
        let name = self.ast[id].name.clone();
        match self.labels.get(&name).copied() {
            Some(label) => self.ast[id].referenced = Some(label),
            None => {
                let location = self.ast[id].location;
                self.error(format!("use of undeclared label '{name}'"), location);
            }
        }
    }

    fn resolve_member_initializer(&mut self, id: NodeId, record: Option<NodeId>) {
        let name = self.ast[id].name.clone();
        let found = record.and_then(|record| {
            self.member(record, &name, Ns::Ordinary)
                .filter(|&m| self.ast[m].kind == CursorKind::FieldDecl)
                .or_else(|| self.lookup(&name, Ns::Type))
        });
        match found {
            Some(target) => {
                self.ast[id].referenced = Some(target);
                self.ast[id].ty = self.value_type(target);
                if self.is_tag_decl(target) {
                    self.ast[id].kind = CursorKind::TypeRef;
                }
            }
            None => {
                let location = self.ast[id].location;
                self.error(
                    format!(
                        "member initializer '{name}' does not name a non-static data member or base class"
                    ),
                    location,
                );
            }
        }
    }

    fn visit_using_directive(&mut self, id: NodeId) {
        let children = self.ast[id].children.clone();
        let Some((&target, qualifiers)) = children.split_last() else {
            return;
        };
        for &child in qualifiers {
            self.resolve_ref(child);
        }
        let written = self.ast[id].written.clone();
        let location = self.ast[id].location;
        let namespace = match self.lookup_qualified(&written, Ns::Type) {
            Lookup::Found(decl) if self.ast[decl].kind == CursorKind::Namespace => {
                Some(self.canonical_of(decl))
            }
            _ => None,
        };
        match namespace {
            Some(namespace) => {
                self.link_ref(target, namespace);
                self.ast[id].referenced = Some(namespace);
                let top = self.top();
                self.scope_at(top).usings.push(namespace);
            }
            None => self.error("expected namespace name".to_string(), location),
        }
    }

    fn visit_using_declaration(&mut self, id: NodeId) {
        self.visit_refs(id);
        let node = &self.ast[id];
        let written = node.written.clone();
        let name = node.name.clone();
        let location = node.location;
        let target_ref = node
            .children
            .iter()
            .copied()
            .find(|&c| self.ast[c].kind == CursorKind::OverloadedDeclRef);
        match self.lookup_qualified(&written, Ns::Ordinary) {
            Lookup::Found(target) => {
                if let Some(target_ref) = target_ref {
                    self.ast[target_ref].referenced = Some(target);
                }
                self.ast[id].referenced = Some(target);
                let is_tag = self.is_tag_decl(target);
                let top = self.top();
                self.declare_at(top, name, target, is_tag);
            }
            Lookup::MissingIn(ctx, last) => {
                let message = format!("no member named '{last}' in {}", self.describe_context(ctx));
                self.error(message, location);
            }
            Lookup::Undeclared(segment) => {
                if !self.qualifier_failed(id) {
                    self.error(format!("use of undeclared identifier '{segment}'"), location);
                }
            }
        }
    }

    fn visit_static_assert(&mut self, id: NodeId) {
        self.visit_children(id);
        let children = self.ast[id].children.clone();
        let Some(&cond) = children.first() else {
            return;
        };
        if let Some(EvalResult::Int { value: 0, .. }) = evaluate(&*self.ast, cond) {
            let message = children
                .get(1)
                .and_then(|&m| match &self.ast[m].literal {
                    Some(Literal::Str(text)) => Some(format!("static assertion failed: {text}")),
                    _ => None,
                })
                .unwrap_or_else(|| "static assertion failed".to_string());
            let location = self.ast[cond].extent.start();
            self.error(message, location);
        }
    }

    // =========================================================================
    // References
    // =========================================================================

    /// Whether a `TypeRef` sibling qualifying `id` already failed.
    fn qualifier_failed(&self, id: NodeId) -> bool {
        let written = &self.ast[id].written;
        let siblings = match self.ast[id].parent {
            Some(parent) => &self.ast[parent].children,
            None => return false,
        };
        let own = self.ast[id].children.iter();
        siblings.iter().chain(own).any(|&sibling| {
            sibling != id && {
                let node = &self.ast[sibling];
                node.kind == CursorKind::TypeRef
                    && node.referenced.is_none()
                    && written.starts_with(&format!("{}::", node.written))
            }
        })
    }

    fn is_qualifier_ref(&self, id: NodeId) -> bool {
        let prefix = format!("{}::", self.ast[id].written);
        let Some(parent) = self.ast[id].parent else {
            return false;
        };
        let parent_node = &self.ast[parent];
        parent_node.written.starts_with(&prefix)
            || parent_node.children.iter().any(|&sibling| {
                let node = &self.ast[sibling];
                node.kind == CursorKind::TypeRef && node.written.starts_with(&prefix)
            })
    }

    fn resolve_ref(&mut self, id: NodeId) {
        let node = &self.ast[id];
        if node.kind != CursorKind::TypeRef || node.referenced.is_some() {
            return;
        }
        let written = node.written.clone();
        let location = node.location;
        let tag = match &node.ty.kind {
            TypeKind::Unresolved { tag, .. } => *tag,
            _ => None,
        };
        if self.qualifier_failed(id) {
            return;
        }
        let ns = if tag.is_some() { Ns::Tag } else { Ns::Type };
        let lookup = self.lookup_qualified(&written, ns);
        let found = match &lookup {
            Lookup::Found(decl) => Some(*decl),
            _ if tag.is_none() && !self.cplusplus() => {
                match self.lookup_qualified(&written, Ns::Tag) {
                    Lookup::Found(decl) => {
                        let keyword = tag_of(self.ast[decl].kind).keyword();
                        self.error(
                            format!("must use '{keyword}' tag to refer to type '{written}'"),
                            location,
                        );
                        Some(decl)
                    }
                    _ => None,
                }
            }
            _ => None,
        };
        if let Some(decl) = found {
            self.link_ref(id, decl);
            return;
        }
        if let Some(tag) = tag {
            // An elaborated name that declares nothing yet.
            let ty = self.resolve_named(&written, Some(tag));
            self.ast[id].name = SmolStr::new(format!("{} {written}", tag.keyword()));
            self.ast[id].ty = ty;
            return;
        }
        let qualifier = self.is_qualifier_ref(id);
        let message = match lookup {
            Lookup::MissingIn(ctx, last) => {
                let what = if qualifier { "member" } else { "type" };
                format!("no {what} named '{last}' in {}", self.describe_context(ctx))
            }
            Lookup::Undeclared(segment) if qualifier => {
                format!("use of undeclared identifier '{segment}'")
            }
            Lookup::Undeclared(segment) => format!("unknown type name '{segment}'"),
            Lookup::Found(_) => format!("unknown type name '{written}'"),
        };
        self.ast[id].ty = Type::invalid();
        self.error(message, location);
    }

    /// Point a reference cursor at `decl` and spell it the way the entity
    /// prints: `class ns1::Class1`, `ns1`, `myint`.
    fn link_ref(&mut self, id: NodeId, decl: NodeId) {
        let target = &self.ast[decl];
        let (kind, name) = match target.kind {
            CursorKind::Namespace => (CursorKind::NamespaceRef, target.name.clone()),
            CursorKind::StructDecl
            | CursorKind::ClassDecl
            | CursorKind::UnionDecl
            | CursorKind::EnumDecl => {
                let keyword = tag_of(target.kind).keyword();
                let qualified = match &self.ast[self.canonical_of(decl)].ty.kind {
                    TypeKind::Record { qualified, .. } | TypeKind::Enum { qualified, .. } => {
                        qualified.clone()
                    }
                    _ => target.name.clone(),
                };
                (CursorKind::TypeRef, SmolStr::new(format!("{keyword} {qualified}")))
            }
            _ => (CursorKind::TypeRef, target.name.clone()),
        };
        let ty = self.decl_type(decl).unwrap_or_default();
        let node = &mut self.ast[id];
        node.kind = kind;
        node.name = name;
        node.referenced = Some(decl);
        node.ty = ty;
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn visit_expr(&mut self, id: NodeId) {
        let kind = self.ast[id].kind;
        self.visit_children(id);
        match kind {
            CursorKind::DeclRefExpr => self.resolve_decl_ref(id),
            CursorKind::MemberRefExpr => self.resolve_member(id),
            CursorKind::CStyleCastExpr | CursorKind::UnexposedExpr => {
                self.resolve_node_type(id);
                if !self.ast[id].ty.is_valid() {
                    if let Some(&last) = self.ast[id].children.last() {
                        self.ast[id].ty = self.ast[last].ty.clone();
                    }
                }
            }
            CursorKind::UnaryExpr => {
                self.resolve_node_type(id);
                self.ast[id].ty = Type::new(TypeKind::ULong);
            }
            CursorKind::CXXThisExpr => match self.this_types.last() {
                Some(ty) => self.ast[id].ty = ty.clone(),
                None => {
                    let location = self.ast[id].location;
                    self.error(
                        "invalid use of 'this' outside of a non-static member function".to_string(),
                        location,
                    );
                }
            },
            _ => {
                if let Some(ty) = self.expr_type(id) {
                    self.ast[id].ty = ty;
                }
            }
        }
    }

    fn resolve_decl_ref(&mut self, id: NodeId) {
        let node = &self.ast[id];
        let written = node.written.clone();
        let name = node.name.clone();
        let location = node.location;
        let is_callee = node.parent.is_some_and(|parent| {
            let parent = &self.ast[parent];
            parent.kind == CursorKind::CallExpr && parent.children.first() == Some(&id)
        });
        if self.qualifier_failed(id) {
            return;
        }
        match self.lookup_qualified(&written, Ns::Ordinary) {
            Lookup::Found(decl) => {
                self.ast[id].referenced = Some(decl);
                self.ast[id].ty = self.value_type(decl);
            }
            Lookup::MissingIn(ctx, last) => {
                let message = format!("no member named '{last}' in {}", self.describe_context(ctx));
                self.error(message, location);
            }
            Lookup::Undeclared(segment) => {
                if let Some(ty) = self.implicit_name_type(&name) {
                    self.ast[id].ty = ty;
                } else if is_callee && !self.cplusplus() {
                    self.ast[id].ty = Type::new(TypeKind::FunctionNoProto {
                        result: Box::new(Type::new(TypeKind::Int)),
                    });
                    if self.lang.c99() {
                        self.error(
                            format!(
                                "call to undeclared function '{name}'; ISO C99 and later do not support implicit function declarations"
                            ),
                            location,
                        );
                    } else {
                        self.warning(
                            format!("implicit declaration of function '{name}'"),
                            location,
                            "-Wimplicit-function-declaration",
                        );
                    }
                } else {
                    self.error(format!("use of undeclared identifier '{segment}'"), location);
                }
            }
        }
    }

    /// Names the compiler provides without a declaration.
    fn implicit_name_type(&self, name: &str) -> Option<Type> {
        if name.starts_with("__builtin") {
            return Some(Type::new(TypeKind::FunctionNoProto {
                result: Box::new(Type::new(TypeKind::Int)),
            }));
        }
        match name {
            "__func__" | "__FUNCTION__" | "__PRETTY_FUNCTION__" => {
                let function = self.functions.last().map_or(0, |&f| self.ast[f].name.len());
                let element = Type::new(TypeKind::CharS).with_quals(Qualifiers::CONST);
                Some(Type::new(TypeKind::ConstantArray {
                    element: Box::new(element),
                    size: function as u64 + 1,
                }))
            }
            "self" | "super" | "_cmd" if self.lang.objc() => Some(Type::new(TypeKind::ObjCId)),
            _ => None,
        }
    }

    fn resolve_member(&mut self, id: NodeId) {
        let node = &self.ast[id];
        let Some(&base) = node.children.last() else {
            return;
        };
        let name = node.name.clone();
        let location = node.location;
        let arrow = node.flags.contains(NodeFlags::ARROW);
        let base_ty = self.ast[base].ty.non_reference();
        if !base_ty.is_valid() {
            return;
        }
        let canonical = base_ty.canonical();
        let record_ty = if arrow {
            match canonical.pointee() {
                Some(pointee) => pointee.clone(),
                None => {
                    if matches!(canonical.kind, TypeKind::Record { .. }) {
                        self.error(
                            format!(
                                "member reference type '{}' is not a pointer; did you mean to use '.'?",
                                self.spell(&base_ty)
                            ),
                            location,
                        );
                    }
                    return;
                }
            }
        } else {
            if let Some(pointee) = canonical.pointee() {
                if matches!(pointee.canonical().kind, TypeKind::Record { .. }) {
                    self.error(
                        format!(
                            "member reference type '{}' is a pointer; did you mean to use '->'?",
                            self.spell(&base_ty)
                        ),
                        location,
                    );
                }
                return;
            }
            base_ty
        };
        let record = record_ty.canonical().unqualified();
        match &record.kind {
            TypeKind::Record { decl, .. } => {
                let definition = decl.and_then(|decl| self.definition_of(decl));
                let Some(definition) = definition else {
                    let message = if self.cplusplus() {
                        format!("member access into incomplete type '{}'", self.spell(&record))
                    } else {
                        format!("incomplete definition of type '{}'", self.spell(&record))
                    };
                    self.error(message, location);
                    return;
                };
                let ctx = self.canonical_of(definition);
                match self.member(ctx, &name, Ns::Ordinary) {
                    Some(member) => {
                        self.ast[id].referenced = Some(member);
                        let mut ty = self.value_type(member);
                        if matches!(self.ast[member].kind, CursorKind::FieldDecl) {
                            ty = ty.with_quals(record_ty.quals);
                        }
                        self.ast[id].ty = ty;
                    }
                    None => {
                        let message = format!("no member named '{name}' in '{}'", self.spell(&record));
                        self.error(message, location);
                    }
                }
            }
            TypeKind::Invalid
            | TypeKind::Unresolved { .. }
            | TypeKind::ObjCId
            | TypeKind::ObjCObjectPointer { .. } => {}
            _ => {
                let message = format!(
                    "member reference base type '{}' is not a structure or union",
                    self.spell(&record)
                );
                self.error(message, location);
            }
        }
    }

    fn child_type(&self, id: NodeId, index: usize) -> Option<Type> {
        let child = *self.ast[id].children.get(index)?;
        Some(self.ast[child].ty.clone())
    }

    fn expr_type(&self, id: NodeId) -> Option<Type> {
        let node = &self.ast[id];
        match node.kind {
            CursorKind::ParenExpr => self.child_type(id, 0),
            CursorKind::CallExpr => {
                let callee = self.child_type(id, 0)?;
                if matches!(callee.canonical().kind, TypeKind::Record { .. }) {
                    return Some(callee);
                }
                let function = function_of(&callee)?;
                function.result_type().cloned()
            }
            CursorKind::ArraySubscriptExpr => {
                let base = decay(&self.child_type(id, 0)?);
                let index = self.child_type(id, 1).map(|t| decay(&t));
                let canonical = base.canonical();
                canonical
                    .pointee()
                    .cloned()
                    .or_else(|| index.and_then(|t| t.canonical().pointee().cloned()))
            }
            CursorKind::UnaryOperator => {
                let Some(Operator::Unary(op)) = node.op else {
                    return None;
                };
                let operand = self.child_type(id, 0)?;
                match op {
                    UnaryOp::Deref => {
                        let decayed = decay(&operand.non_reference());
                        let canonical = decayed.canonical();
                        if canonical.is_function() {
                            return Some(operand);
                        }
                        canonical.pointee().cloned()
                    }
                    UnaryOp::AddrOf => Some(operand.non_reference().pointer_to()),
                    UnaryOp::LNot => Some(self.bool_type()),
                    UnaryOp::Plus | UnaryOp::Minus | UnaryOp::Not => Some(promote(&operand)),
                    _ => Some(operand),
                }
            }
            CursorKind::BinaryOperator | CursorKind::CompoundAssignOperator => {
                let Some(Operator::Binary(op)) = node.op else {
                    return None;
                };
                let lhs = self.child_type(id, 0)?;
                let rhs = self.child_type(id, 1).unwrap_or_default();
                Some(self.binary_type(op, lhs, rhs))
            }
            CursorKind::ConditionalOperator => {
                let then = self.child_type(id, 1).filter(Type::is_valid);
                then.or_else(|| self.child_type(id, 2))
            }
            _ => None,
        }
    }

    fn binary_type(&self, op: BinaryOp, lhs: Type, rhs: Type) -> Type {
        if op.is_comparison() || op.is_logical() {
            return self.bool_type();
        }
        if op.is_assignment() {
            return lhs.non_reference();
        }
        match op {
            BinaryOp::Comma => rhs,
            BinaryOp::Shl | BinaryOp::Shr => promote(&lhs.non_reference()),
            BinaryOp::Add | BinaryOp::Sub => {
                let l = decay(&lhs.non_reference());
                let r = decay(&rhs.non_reference());
                match (l.is_pointer(), r.is_pointer()) {
                    (true, true) if op == BinaryOp::Sub => Type::new(TypeKind::Long),
                    (true, _) => l,
                    (false, true) if op == BinaryOp::Add => r,
                    _ => usual_conversions(&l, &r),
                }
            }
            _ => usual_conversions(&lhs.non_reference(), &rhs.non_reference()),
        }
    }
}

fn tag_of(kind: CursorKind) -> TagKind {
    match kind {
        CursorKind::ClassDecl => TagKind::Class,
        CursorKind::UnionDecl => TagKind::Union,
        CursorKind::EnumDecl => TagKind::Enum,
        _ => TagKind::Struct,
    }
}

fn function_of(ty: &Type) -> Option<Type> {
    let canonical = ty.non_reference().canonical();
    if canonical.is_function() {
        return Some(canonical);
    }
    canonical.pointee().filter(|t| t.is_function()).cloned()
}

/// Array-to-pointer decay.
fn decay(ty: &Type) -> Type {
    match ty.canonical().kind {
        TypeKind::ConstantArray { element, .. } | TypeKind::IncompleteArray(element) => {
            (*element).pointer_to()
        }
        _ => ty.clone(),
    }
}

/// Integer promotion of small integer and enum types.
fn promote(ty: &Type) -> Type {
    match ty.canonical().kind {
        TypeKind::Bool
        | TypeKind::CharS
        | TypeKind::SChar
        | TypeKind::UChar
        | TypeKind::Short
        | TypeKind::UShort
        | TypeKind::Enum { .. } => Type::new(TypeKind::Int),
        _ => ty.unqualified(),
    }
}

fn integer_rank(kind: &TypeKind) -> u8 {
    match kind {
        TypeKind::Long | TypeKind::ULong => 2,
        TypeKind::LongLong | TypeKind::ULongLong => 3,
        _ => 1,
    }
}

fn float_rank(kind: &TypeKind) -> Option<u8> {
    match kind {
        TypeKind::Float => Some(1),
        TypeKind::Double => Some(2),
        TypeKind::LongDouble => Some(3),
        _ => None,
    }
}

/// The common type of arithmetic operands.
fn usual_conversions(lhs: &Type, rhs: &Type) -> Type {
    if !lhs.is_arithmetic() {
        return if rhs.is_valid() && !lhs.is_valid() {
            rhs.unqualified()
        } else {
            lhs.unqualified()
        };
    }
    if !rhs.is_arithmetic() {
        return lhs.unqualified();
    }
    let l = promote(lhs).canonical();
    let r = promote(rhs).canonical();
    match (float_rank(&l.kind), float_rank(&r.kind)) {
        (Some(a), Some(b)) => return if a >= b { l } else { r },
        (Some(_), None) => return l,
        (None, Some(_)) => return r,
        (None, None) => {}
    }
    if l.kind == r.kind {
        return l;
    }
    let (lr, rr) = (integer_rank(&l.kind), integer_rank(&r.kind));
    let (lu, ru) = (l.is_unsigned_integer(), r.is_unsigned_integer());
    match lr.cmp(&rr) {
        std::cmp::Ordering::Greater => l,
        std::cmp::Ordering::Less => r,
        std::cmp::Ordering::Equal => {
            if lu || !ru {
                l
            } else {
                r
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::hir::eval::enumerator_value;
    use crate::parser::{
        Language, MainFile, ParseOptions, PpToken, SyntaxKind, keywords, lex, parse,
    };
    use text_size::TextSize;

    fn analyzed(text: &str, language: Language) -> (Ast, Vec<Diagnostic>) {
        let lang = LangOptions::new(language);
        let file = FileId::new(0);
        let tokens: Vec<PpToken> = lex(text)
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .map(|t| {
                let raw = t.text(text);
                let kind = if t.kind == SyntaxKind::IDENT {
                    keywords::classify(raw, &lang)
                } else {
                    t.kind
                };
                PpToken {
                    kind,
                    text: raw.into(),
                    start: SourceLocation::new(file, t.range.start()),
                    end: SourceLocation::new(file, t.range.end()),
                    flags: Default::default(),
                }
            })
            .collect();
        let main = MainFile {
            id: file,
            name: "test",
            len: TextSize::of(text),
        };
        let mut parse = parse(&tokens, &lang, main, ParseOptions::default());
        let mut diagnostics = parse.diagnostics;
        diagnostics.extend(analyze(&mut parse.ast, &lang));
        (parse.ast, diagnostics)
    }

    fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    fn find(ast: &Ast, kind: CursorKind, name: &str) -> NodeId {
        ast.ids()
            .find(|&id| ast[id].kind == kind && ast[id].name == name)
            .unwrap_or_else(|| panic!("no {kind:?} named {name}"))
    }

    #[test]
    fn missing_member_is_reported_with_language_spelling() {
        let source = "struct Foo { int bar; };\nint main() { Foo foo; foo.bar = 7; foo.baz = 8; }\n";
        let (_, diagnostics) = analyzed(source, Language::Cxx);
        assert_eq!(messages(&diagnostics), ["no member named 'baz' in 'Foo'"]);

        let source = "struct Foo { int bar; };\nint main() { struct Foo foo; foo.baz = 8; }\n";
        let (_, diagnostics) = analyzed(source, Language::ObjC);
        assert_eq!(messages(&diagnostics), ["no member named 'baz' in 'struct Foo'"]);
    }

    #[test]
    fn member_reference_links_to_field() {
        let source = "struct P { int x; };\nint g(struct P *p) { return p->x; }\n";
        let (ast, diagnostics) = analyzed(source, Language::C);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let member = find(&ast, CursorKind::MemberRefExpr, "x");
        let field = find(&ast, CursorKind::FieldDecl, "x");
        assert_eq!(ast[member].referenced, Some(field));
        assert_eq!(ast[member].ty.kind, TypeKind::Int);
    }

    #[test]
    fn using_declaration_resolves_out_of_line_qualifier() {
        let source = "namespace ns1 { class Class1 { void fun(); }; }\nusing ns1::Class1;\nvoid Class1::fun() {}\n";
        let (ast, diagnostics) = analyzed(source, Language::Cxx);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let last_ref = ast
            .ids()
            .filter(|&id| ast[id].kind == CursorKind::TypeRef)
            .last()
            .unwrap();
        assert_eq!(ast[last_ref].name, "class ns1::Class1");
        let definition = ast
            .ids()
            .find(|&id| ast[id].name == "fun" && ast[id].is_definition())
            .unwrap();
        assert_eq!(ast[definition].kind, CursorKind::CXXMethod);
        let class = find(&ast, CursorKind::ClassDecl, "Class1");
        assert_eq!(ast[definition].semantic_parent, Some(class));
        let ns_ref = find(&ast, CursorKind::NamespaceRef, "ns1");
        assert_eq!(ast[ns_ref].referenced, Some(find(&ast, CursorKind::Namespace, "ns1")));
    }

    #[test]
    fn undeclared_names() {
        let (_, diagnostics) = analyzed("int main(void) { return y; }\n", Language::C);
        assert_eq!(messages(&diagnostics), ["use of undeclared identifier 'y'"]);

        let (_, diagnostics) = analyzed("Foo f;\n", Language::Cxx);
        assert_eq!(messages(&diagnostics), ["unknown type name 'Foo'"]);

        let (_, diagnostics) = analyzed("int main(void) { return g(); }\n", Language::C);
        assert_eq!(
            messages(&diagnostics),
            ["call to undeclared function 'g'; ISO C99 and later do not support implicit function declarations"]
        );
    }

    #[test]
    fn c_requires_tag_keyword() {
        let (ast, diagnostics) = analyzed("struct Foo { int a; };\nvoid f(void) { Foo x; }\n", Language::C);
        assert_eq!(messages(&diagnostics), ["must use 'struct' tag to refer to type 'Foo'"]);
        let x = find(&ast, CursorKind::VarDecl, "x");
        assert!(matches!(ast[x].ty.kind, TypeKind::Record { .. }));
    }

    #[test]
    fn typedefs_and_qualified_record_names() {
        let source = "namespace a { namespace { struct S {}; } }\ntypedef a::S alias;\nalias value;\n";
        let (ast, diagnostics) = analyzed(source, Language::Cxx);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let value = find(&ast, CursorKind::VarDecl, "value");
        let ty = &ast[value].ty;
        assert!(matches!(ty.kind, TypeKind::Typedef { .. }));
        let policy = PrintingPolicy::for_language(&LangOptions::new(Language::Cxx));
        assert_eq!(ty.canonical().spelling(&policy), "a::(anonymous namespace)::S");
    }

    #[test]
    fn enumerators_and_static_assert() {
        let source = "enum E { A, B = 4, C };\nstatic_assert(C == 5, \"ok\");\nstatic_assert(A == 1, \"bad\");\n";
        let (ast, diagnostics) = analyzed(source, Language::Cxx);
        assert_eq!(messages(&diagnostics), ["static assertion failed: bad"]);
        let c = find(&ast, CursorKind::EnumConstantDecl, "C");
        assert_eq!(enumerator_value(&ast, c), Some(5));
        assert!(matches!(ast[c].ty.kind, TypeKind::Enum { .. }));
    }

    #[test]
    fn forward_declared_type_points_at_definition() {
        let source = "struct S;\nstruct S *p;\nstruct S { int v; };\n";
        let (ast, diagnostics) = analyzed(source, Language::C);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let definition = ast
            .ids()
            .find(|&id| ast[id].kind == CursorKind::StructDecl && ast[id].is_definition())
            .unwrap();
        let p = find(&ast, CursorKind::VarDecl, "p");
        assert_eq!(ast[p].ty.pointee().unwrap().declaration(), Some(definition));
    }

    #[test]
    fn expression_types() {
        let source = "int f(void) { double d = 1; long l = 2; unsigned u = 3; d + l; l + u; &l; }\n";
        let (ast, _) = analyzed(source, Language::C);
        let plus: Vec<NodeId> = ast
            .ids()
            .filter(|&id| ast[id].kind == CursorKind::BinaryOperator && ast[id].name == "+")
            .collect();
        assert_eq!(ast[plus[0]].ty.kind, TypeKind::Double);
        assert_eq!(ast[plus[1]].ty.kind, TypeKind::Long);
        let addr = find(&ast, CursorKind::UnaryOperator, "&");
        assert!(ast[addr].ty.is_pointer());
    }

    #[test]
    fn labels_resolve() {
        let source = "void f(void) { goto done; done: return; }\nvoid g(void) { goto nowhere; }\n";
        let (ast, diagnostics) = analyzed(source, Language::C);
        assert_eq!(messages(&diagnostics), ["use of undeclared label 'nowhere'"]);
        let label_ref = find(&ast, CursorKind::LabelRef, "done");
        assert_eq!(ast[label_ref].referenced, Some(find(&ast, CursorKind::LabelStmt, "done")));
    }

    #[test]
    fn auto_is_deduced_from_initializer() {
        let (ast, diagnostics) = analyzed("const auto x = 1.5;\n", Language::Cxx);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let x = find(&ast, CursorKind::VarDecl, "x");
        assert_eq!(ast[x].ty.kind, TypeKind::Double);
        assert!(ast[x].ty.is_const_qualified());
    }
}
