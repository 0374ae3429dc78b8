//! Boundary to the C++ front end
//!
//! The classifier never parses C++ itself. Everything it knows about a
//! declaration comes through the [`Cursor`] trait: a kind tag, a spelling,
//! child cursors, reference links, type spellings and the raw source tokens
//! of the declaration's extent.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Kind tag of a cursor, as reported by the front end
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CursorKind {
    TranslationUnit,
    Namespace,
    NamespaceAlias,
    UsingDirective,
    UsingDeclaration,
    TypedefDecl,
    TypeAliasDecl,
    EnumDecl,
    EnumConstantDecl,
    StructDecl,
    ClassDecl,
    UnionDecl,
    AccessSpecifier,
    BaseSpecifier,
    VarDecl,
    FieldDecl,
    FunctionDecl,
    CxxMethod,
    Constructor,
    Destructor,
    ConversionFunction,
    ParmDecl,
    TypeRef,
    NamespaceRef,
    TemplateRef,
    OverloadedDeclRef,
    MemberRef,
    Expression,
    Statement,
    #[default]
    Unexposed,
}

impl CursorKind {
    /// Reference cursors link to another declaration
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            CursorKind::TypeRef
                | CursorKind::NamespaceRef
                | CursorKind::TemplateRef
                | CursorKind::OverloadedDeclRef
                | CursorKind::MemberRef
        )
    }

    pub fn is_class(self) -> bool {
        matches!(
            self,
            CursorKind::StructDecl | CursorKind::ClassDecl | CursorKind::UnionDecl
        )
    }

    /// Cursor kinds that may carry a member function
    pub fn is_member_function(self) -> bool {
        matches!(
            self,
            CursorKind::CxxMethod
                | CursorKind::Constructor
                | CursorKind::Destructor
                | CursorKind::ConversionFunction
        )
    }
}

/// Spelling of a type as written and in canonical form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpelling {
    pub spelling: String,
    /// Fully qualified, front-end normalized spelling
    pub canonical: String,
}

impl TypeSpelling {
    pub fn new(spelling: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self {
            spelling: spelling.into(),
            canonical: canonical.into(),
        }
    }
}

/// A node of the front end's parse tree
///
/// Implementations are expected to be cheap handles into a tree owned
/// elsewhere; `Clone` must not copy the tree.
pub trait Cursor: Clone {
    fn kind(&self) -> CursorKind;

    /// Declared name; empty for unnamed declarations
    fn spelling(&self) -> String;

    /// 1-based source line of the declaration
    fn line(&self) -> u32;

    /// Declared type of a typed declaration
    fn ty(&self) -> Option<TypeSpelling>;

    /// Return type of a function-like declaration
    fn result_type(&self) -> Option<TypeSpelling>;

    /// Integer type of an enum, or target type of a typedef/alias
    fn underlying_type(&self) -> Option<TypeSpelling>;

    /// Declaration referenced by a reference, using or base cursor
    fn referenced(&self) -> Option<Self>;

    /// Class or namespace a declaration semantically belongs to
    fn semantic_parent(&self) -> Option<Self>;

    /// Child cursors in source order
    fn children(&self) -> Vec<Self>;

    /// Raw documentation comment attached to the declaration
    fn raw_comment(&self) -> Option<String>;

    /// Source tokens of the declaration's extent
    fn tokens(&self) -> Vec<String>;

    /// Whether this declaration is also a definition
    fn is_definition(&self) -> bool;

    /// Value of an enumerator as evaluated by the front end
    fn enum_constant_value(&self) -> Option<i128>;
}
