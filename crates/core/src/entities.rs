//! Entity model for C++ declarations
//!
//! Every declaration the classifier understands becomes an [`Entity`]: a
//! common header (names, scope, comment, line) plus an [`EntityKind`] payload.
//! Entities own their children by value; every other relationship (base
//! classes, alias targets, overridden members) is a name that is resolved
//! through the registry on demand.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::comment::Comment;

/// Simple tag identifying the variant of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityType {
    File,
    Namespace,
    NamespaceAlias,
    UsingDirective,
    UsingDeclaration,
    Enum,
    EnumValue,
    Class,
    AccessSpecifier,
    BaseClass,
    TypeAlias,
    Variable,
    Function,
    MemberFunction,
    Constructor,
    Destructor,
    ConversionOp,
}

impl EntityType {
    /// Whether entities of this type are registered as types
    pub fn is_type(self) -> bool {
        matches!(
            self,
            EntityType::Enum | EntityType::Class | EntityType::TypeAlias
        )
    }

    /// Whether entities of this type take part in overload disambiguation
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            EntityType::Function
                | EntityType::MemberFunction
                | EntityType::Constructor
                | EntityType::Destructor
                | EntityType::ConversionOp
        )
    }
}

/// A type as written and as canonically spelled by the front end
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// Terse spelling as written in source
    pub name: String,
    /// Fully qualified, front-end normalized spelling
    pub full_name: String,
}

impl TypeRef {
    pub fn new(name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
        }
    }
}

/// Member access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Access {
    Public,
    Protected,
    Private,
}

/// How a function body is provided
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Definition {
    #[default]
    Normal,
    Deleted,
    Defaulted,
}

/// Exception specification of a function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Noexcept {
    /// Expression text when written in source, otherwise `"true"` or `"false"`
    pub expression: String,
    /// Whether a `noexcept` specifier was written
    pub explicit: bool,
}

impl Noexcept {
    pub fn implicit(value: bool) -> Self {
        Self {
            expression: value.to_string(),
            explicit: false,
        }
    }

    pub fn explicit(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            explicit: true,
        }
    }
}

/// cv-qualifiers of a member function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CvQualifiers {
    pub is_const: bool,
    pub is_volatile: bool,
}

/// Ref-qualifier of a member function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RefQualifier {
    #[default]
    None,
    Lvalue,
    Rvalue,
}

/// Virtual state of a member function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Virtuality {
    #[default]
    None,
    /// Introduces a new virtual function
    New,
    /// Overrides a base class virtual
    Overridden,
    /// Overrides and forbids further overriding
    Final,
    /// Pure virtual (`= 0`)
    Pure,
    /// Static member function
    Static,
}

impl Virtuality {
    /// Whether a function in this state is a virtual function
    pub fn is_virtual(self) -> bool {
        matches!(
            self,
            Virtuality::New | Virtuality::Overridden | Virtuality::Final | Virtuality::Pure
        )
    }
}

/// One function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Empty for unnamed parameters
    pub name: String,
    pub ty: TypeRef,
    pub default_value: Option<String>,
}

/// Attributes shared by every function-like entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub parameters: Vec<Parameter>,
    /// Return type, or target type for conversion operators
    pub return_type: TypeRef,
    pub is_variadic: bool,
    pub is_constexpr: bool,
    pub definition: Definition,
    pub noexcept: Noexcept,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub signature: FunctionSignature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberFunction {
    pub signature: FunctionSignature,
    pub cv: CvQualifiers,
    pub ref_qualifier: RefQualifier,
    pub virtuality: Virtuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constructor {
    pub signature: FunctionSignature,
    pub is_explicit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destructor {
    pub signature: FunctionSignature,
    pub virtuality: Virtuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionOp {
    pub signature: FunctionSignature,
    pub is_explicit: bool,
    pub cv: CvQualifiers,
    pub ref_qualifier: RefQualifier,
    pub virtuality: Virtuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub is_inline: bool,
    pub children: Vec<Entity>,
}

/// Target of a namespace alias or using-directive/declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsingTarget {
    /// Target name as referenced, e.g. `a::b`
    pub target: String,
    /// Scope of the first referenced declaration
    pub target_scope: String,
}

impl UsingTarget {
    /// Fully qualified target
    pub fn full_target(&self) -> String {
        crate::scope::qualify(&self.target_scope, &self.target)
    }
}

/// Numeric value of an enumerator; signedness follows the underlying type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumConstant {
    Signed(i64),
    Unsigned(u64),
}

impl EnumConstant {
    pub fn as_i128(self) -> i128 {
        match self {
            EnumConstant::Signed(v) => i128::from(v),
            EnumConstant::Unsigned(v) => i128::from(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enum {
    pub is_scoped: bool,
    /// `name` is empty when the underlying type was inferred
    pub underlying: TypeRef,
    pub values: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub value: EnumConstant,
    pub explicitly_given: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClassType {
    Class,
    Struct,
    Union,
}

impl ClassType {
    /// Access of members and bases when no specifier is written
    pub fn default_access(self) -> Access {
        match self {
            ClassType::Class => Access::Private,
            ClassType::Struct | ClassType::Union => Access::Public,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub class_type: ClassType,
    pub is_final: bool,
    pub is_abstract: bool,
    /// Direct members in declaration order
    pub children: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseClass {
    pub access: Access,
    pub is_virtual: bool,
    pub target: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAlias {
    pub target: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub ty: TypeRef,
    pub initializer: Option<String>,
    pub is_static: bool,
    pub is_constexpr: bool,
    pub is_thread_local: bool,
    pub is_mutable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub children: Vec<Entity>,
}

/// Variant payload of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityKind {
    File(File),
    Namespace(Namespace),
    NamespaceAlias(UsingTarget),
    UsingDirective(UsingTarget),
    UsingDeclaration(UsingTarget),
    Enum(Enum),
    EnumValue(EnumValue),
    Class(Class),
    AccessSpecifier { access: Access },
    BaseClass(BaseClass),
    TypeAlias(TypeAlias),
    Variable(Variable),
    Function(Function),
    MemberFunction(MemberFunction),
    Constructor(Constructor),
    Destructor(Destructor),
    ConversionOp(ConversionOp),
}

/// A classified declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
pub struct Entity {
    /// Declared, possibly unqualified name
    pub name: String,

    /// Scope-qualified name, disambiguated for overloads
    pub unique_name: String,

    /// Owning namespace/class path, empty for the global scope
    #[builder(default = "String::new()")]
    pub scope: String,

    /// Parsed documentation comment
    #[builder(default = "None")]
    pub comment: Option<Comment>,

    /// Source line of the declaration
    #[builder(default = "0")]
    pub line: u32,

    pub kind: EntityKind,
}

impl Entity {
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    pub fn entity_type(&self) -> EntityType {
        match &self.kind {
            EntityKind::File(_) => EntityType::File,
            EntityKind::Namespace(_) => EntityType::Namespace,
            EntityKind::NamespaceAlias(_) => EntityType::NamespaceAlias,
            EntityKind::UsingDirective(_) => EntityType::UsingDirective,
            EntityKind::UsingDeclaration(_) => EntityType::UsingDeclaration,
            EntityKind::Enum(_) => EntityType::Enum,
            EntityKind::EnumValue(_) => EntityType::EnumValue,
            EntityKind::Class(_) => EntityType::Class,
            EntityKind::AccessSpecifier { .. } => EntityType::AccessSpecifier,
            EntityKind::BaseClass(_) => EntityType::BaseClass,
            EntityKind::TypeAlias(_) => EntityType::TypeAlias,
            EntityKind::Variable(_) => EntityType::Variable,
            EntityKind::Function(_) => EntityType::Function,
            EntityKind::MemberFunction(_) => EntityType::MemberFunction,
            EntityKind::Constructor(_) => EntityType::Constructor,
            EntityKind::Destructor(_) => EntityType::Destructor,
            EntityKind::ConversionOp(_) => EntityType::ConversionOp,
        }
    }

    /// Owned children in declaration order
    pub fn children(&self) -> &[Entity] {
        match &self.kind {
            EntityKind::File(f) => &f.children,
            EntityKind::Namespace(n) => &n.children,
            EntityKind::Class(c) => &c.children,
            EntityKind::Enum(e) => &e.values,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Entity>> {
        match &mut self.kind {
            EntityKind::File(f) => Some(&mut f.children),
            EntityKind::Namespace(n) => Some(&mut n.children),
            EntityKind::Class(c) => Some(&mut c.children),
            EntityKind::Enum(e) => Some(&mut e.values),
            _ => None,
        }
    }

    /// Signature of a function-like entity
    pub fn signature(&self) -> Option<&FunctionSignature> {
        match &self.kind {
            EntityKind::Function(f) => Some(&f.signature),
            EntityKind::MemberFunction(f) => Some(&f.signature),
            EntityKind::Constructor(f) => Some(&f.signature),
            EntityKind::Destructor(f) => Some(&f.signature),
            EntityKind::ConversionOp(f) => Some(&f.signature),
            _ => None,
        }
    }

    /// Virtual state of a member-like entity
    pub fn virtuality(&self) -> Option<Virtuality> {
        match &self.kind {
            EntityKind::MemberFunction(f) => Some(f.virtuality),
            EntityKind::Destructor(f) => Some(f.virtuality),
            EntityKind::ConversionOp(f) => Some(f.virtuality),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&Class> {
        match &self.kind {
            EntityKind::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&Enum> {
        match &self.kind {
            EntityKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_enum_value(&self) -> Option<&EnumValue> {
        match &self.kind {
            EntityKind::EnumValue(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&Namespace> {
        match &self.kind {
            EntityKind::Namespace(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match &self.kind {
            EntityKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_member_function(&self) -> Option<&MemberFunction> {
        match &self.kind {
            EntityKind::MemberFunction(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_constructor(&self) -> Option<&Constructor> {
        match &self.kind {
            EntityKind::Constructor(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_destructor(&self) -> Option<&Destructor> {
        match &self.kind {
            EntityKind::Destructor(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_conversion_op(&self) -> Option<&ConversionOp> {
        match &self.kind {
            EntityKind::ConversionOp(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_type_alias(&self) -> Option<&TypeAlias> {
        match &self.kind {
            EntityKind::TypeAlias(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_base_class(&self) -> Option<&BaseClass> {
        match &self.kind {
            EntityKind::BaseClass(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match &self.kind {
            EntityKind::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_using_target(&self) -> Option<&UsingTarget> {
        match &self.kind {
            EntityKind::NamespaceAlias(t)
            | EntityKind::UsingDirective(t)
            | EntityKind::UsingDeclaration(t) => Some(t),
            _ => None,
        }
    }

    /// Whether this entity or any descendant carries a comment
    pub fn is_documented(&self) -> bool {
        self.comment.is_some() || self.children().iter().any(Entity::is_documented)
    }

    /// Depth-first, pre-order visit of this entity and its descendants
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Entity)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(name: &str) -> Entity {
        Entity::builder()
            .name(name)
            .unique_name(name)
            .kind(EntityKind::Variable(Variable {
                ty: TypeRef::new("int", "int"),
                initializer: None,
                is_static: false,
                is_constexpr: false,
                is_thread_local: false,
                is_mutable: false,
            }))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let entity = variable("x");
        assert_eq!(entity.scope, "");
        assert_eq!(entity.line, 0);
        assert!(entity.comment.is_none());
        assert_eq!(entity.entity_type(), EntityType::Variable);
        assert!(entity.children().is_empty());
    }

    #[test]
    fn test_walk_is_preorder() {
        let ns = Entity::builder()
            .name("ns")
            .unique_name("ns")
            .kind(EntityKind::Namespace(Namespace {
                is_inline: false,
                children: vec![variable("a"), variable("b")],
            }))
            .build()
            .unwrap();

        let mut names = Vec::new();
        ns.walk(&mut |e| names.push(e.name.as_str()));
        assert_eq!(names, vec!["ns", "a", "b"]);
    }

    #[test]
    fn test_entity_type_tags() {
        assert!(EntityType::TypeAlias.is_type());
        assert!(!EntityType::Namespace.is_type());
        assert!(EntityType::Constructor.is_function_like());
        assert_eq!(EntityType::ConversionOp.to_string(), "conversion_op");
    }

    #[test]
    fn test_virtuality_is_virtual() {
        assert!(Virtuality::Pure.is_virtual());
        assert!(!Virtuality::Static.is_virtual());
        assert!(!Virtuality::None.is_virtual());
    }

    #[test]
    fn test_serialized_kind_tag() {
        let json = serde_json::to_value(variable("v")).unwrap();
        assert_eq!(json["kind"]["type"], "variable");
        assert_eq!(json["unique_name"], "v");
    }
}
