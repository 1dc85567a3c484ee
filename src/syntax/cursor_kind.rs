use serde::{Deserialize, Serialize};

/// Kind of an AST node, as exposed through cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CursorKind {
    // Declarations
    UnexposedDecl,
    StructDecl,
    UnionDecl,
    ClassDecl,
    EnumDecl,
    FieldDecl,
    EnumConstantDecl,
    FunctionDecl,
    VarDecl,
    ParmDecl,
    TypedefDecl,
    CXXMethod,
    Constructor,
    Destructor,
    Namespace,
    LinkageSpec,
    UsingDirective,
    UsingDeclaration,
    CXXAccessSpecifier,
    StaticAssert,
    ObjCInterfaceDecl,
    ObjCImplementationDecl,

    // References
    TypeRef,
    NamespaceRef,
    MemberRef,
    OverloadedDeclRef,
    LabelRef,

    // Expressions
    UnexposedExpr,
    DeclRefExpr,
    MemberRefExpr,
    CallExpr,
    IntegerLiteral,
    FloatingLiteral,
    StringLiteral,
    CharacterLiteral,
    ObjCStringLiteral,
    ParenExpr,
    UnaryOperator,
    ArraySubscriptExpr,
    BinaryOperator,
    CompoundAssignOperator,
    ConditionalOperator,
    CStyleCastExpr,
    InitListExpr,
    UnaryExpr,
    CXXBoolLiteralExpr,
    CXXNullPtrLiteralExpr,
    CXXThisExpr,

    // Statements
    CompoundStmt,
    IfStmt,
    WhileStmt,
    DoStmt,
    ForStmt,
    ReturnStmt,
    BreakStmt,
    ContinueStmt,
    NullStmt,
    DeclStmt,
    SwitchStmt,
    CaseStmt,
    DefaultStmt,
    GotoStmt,
    LabelStmt,

    TranslationUnit,

    /// Kind of a null cursor.
    InvalidFile,
}

impl CursorKind {
    pub fn is_declaration(self) -> bool {
        use CursorKind::*;
        matches!(
            self,
            UnexposedDecl
                | StructDecl
                | UnionDecl
                | ClassDecl
                | EnumDecl
                | FieldDecl
                | EnumConstantDecl
                | FunctionDecl
                | VarDecl
                | ParmDecl
                | TypedefDecl
                | CXXMethod
                | Constructor
                | Destructor
                | Namespace
                | LinkageSpec
                | UsingDirective
                | UsingDeclaration
                | CXXAccessSpecifier
                | StaticAssert
                | ObjCInterfaceDecl
                | ObjCImplementationDecl
        )
    }

    pub fn is_reference(self) -> bool {
        use CursorKind::*;
        matches!(
            self,
            TypeRef | NamespaceRef | MemberRef | OverloadedDeclRef | LabelRef
        )
    }

    pub fn is_expression(self) -> bool {
        use CursorKind::*;
        matches!(
            self,
            UnexposedExpr
                | DeclRefExpr
                | MemberRefExpr
                | CallExpr
                | IntegerLiteral
                | FloatingLiteral
                | StringLiteral
                | CharacterLiteral
                | ObjCStringLiteral
                | ParenExpr
                | UnaryOperator
                | ArraySubscriptExpr
                | BinaryOperator
                | CompoundAssignOperator
                | ConditionalOperator
                | CStyleCastExpr
                | InitListExpr
                | UnaryExpr
                | CXXBoolLiteralExpr
                | CXXNullPtrLiteralExpr
                | CXXThisExpr
        )
    }

    pub fn is_statement(self) -> bool {
        use CursorKind::*;
        matches!(
            self,
            CompoundStmt
                | IfStmt
                | WhileStmt
                | DoStmt
                | ForStmt
                | ReturnStmt
                | BreakStmt
                | ContinueStmt
                | NullStmt
                | DeclStmt
                | SwitchStmt
                | CaseStmt
                | DefaultStmt
                | GotoStmt
                | LabelStmt
        )
    }

    pub fn is_invalid(self) -> bool {
        self == CursorKind::InvalidFile
    }

    pub fn is_translation_unit(self) -> bool {
        self == CursorKind::TranslationUnit
    }

    /// Struct, class or union declaration.
    pub fn is_record(self) -> bool {
        matches!(
            self,
            CursorKind::StructDecl | CursorKind::ClassDecl | CursorKind::UnionDecl
        )
    }

    /// Declarations that introduce a type name.
    pub fn is_type_declaration(self) -> bool {
        self.is_record() || matches!(self, CursorKind::EnumDecl | CursorKind::TypedefDecl)
    }

    pub fn is_function(self) -> bool {
        matches!(
            self,
            CursorKind::FunctionDecl
                | CursorKind::CXXMethod
                | CursorKind::Constructor
                | CursorKind::Destructor
        )
    }

    pub fn spelling(self) -> &'static str {
        use CursorKind::*;
        match self {
            UnexposedDecl => "UnexposedDecl",
            StructDecl => "StructDecl",
            UnionDecl => "UnionDecl",
            ClassDecl => "ClassDecl",
            EnumDecl => "EnumDecl",
            FieldDecl => "FieldDecl",
            EnumConstantDecl => "EnumConstantDecl",
            FunctionDecl => "FunctionDecl",
            VarDecl => "VarDecl",
            ParmDecl => "ParmDecl",
            TypedefDecl => "TypedefDecl",
            CXXMethod => "CXXMethod",
            Constructor => "CXXConstructor",
            Destructor => "CXXDestructor",
            Namespace => "Namespace",
            LinkageSpec => "LinkageSpec",
            UsingDirective => "UsingDirective",
            UsingDeclaration => "UsingDeclaration",
            CXXAccessSpecifier => "CXXAccessSpecifier",
            StaticAssert => "StaticAssert",
            ObjCInterfaceDecl => "ObjCInterfaceDecl",
            ObjCImplementationDecl => "ObjCImplementationDecl",
            TypeRef => "TypeRef",
            NamespaceRef => "NamespaceRef",
            MemberRef => "MemberRef",
            OverloadedDeclRef => "OverloadedDeclRef",
            LabelRef => "LabelRef",
            UnexposedExpr => "UnexposedExpr",
            DeclRefExpr => "DeclRefExpr",
            MemberRefExpr => "MemberRefExpr",
            CallExpr => "CallExpr",
            IntegerLiteral => "IntegerLiteral",
            FloatingLiteral => "FloatingLiteral",
            StringLiteral => "StringLiteral",
            CharacterLiteral => "CharacterLiteral",
            ObjCStringLiteral => "ObjCStringLiteral",
            ParenExpr => "ParenExpr",
            UnaryOperator => "UnaryOperator",
            ArraySubscriptExpr => "ArraySubscriptExpr",
            BinaryOperator => "BinaryOperator",
            CompoundAssignOperator => "CompoundAssignOperator",
            ConditionalOperator => "ConditionalOperator",
            CStyleCastExpr => "CStyleCastExpr",
            InitListExpr => "InitListExpr",
            UnaryExpr => "UnaryExpr",
            CXXBoolLiteralExpr => "CXXBoolLiteralExpr",
            CXXNullPtrLiteralExpr => "CXXNullPtrLiteralExpr",
            CXXThisExpr => "CXXThisExpr",
            CompoundStmt => "CompoundStmt",
            IfStmt => "IfStmt",
            WhileStmt => "WhileStmt",
            DoStmt => "DoStmt",
            ForStmt => "ForStmt",
            ReturnStmt => "ReturnStmt",
            BreakStmt => "BreakStmt",
            ContinueStmt => "ContinueStmt",
            NullStmt => "NullStmt",
            DeclStmt => "DeclStmt",
            SwitchStmt => "SwitchStmt",
            CaseStmt => "CaseStmt",
            DefaultStmt => "DefaultStmt",
            GotoStmt => "GotoStmt",
            LabelStmt => "LabelStmt",
            TranslationUnit => "TranslationUnit",
            InvalidFile => "InvalidFile",
        }
    }
}

impl std::fmt::Display for CursorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.spelling())
    }
}
