//! Virtual-override resolution
//!
//! Whether a member function overrides something depends on the base classes
//! of its class, which may be reachable as cursors (the front end resolved the
//! base specifier) or only by name through the registry of already classified
//! files. Both paths are searched depth first, bounded by [`MAX_BASE_DEPTH`].

use cxxdoc_core::entities::{CvQualifiers, Entity, EntityKind, RefQualifier, Virtuality};

use crate::cursor::{Cursor, CursorKind};
use crate::handlers::qualified_name;
use crate::registry::RegistryView;
use crate::tokens::{analyze_function, analyze_parameter, join, FunctionTokens};

/// Inheritance chains deeper than this are treated as cyclic
const MAX_BASE_DEPTH: usize = 64;

/// What makes two member functions the same virtual slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MemberShape {
    name: String,
    is_destructor: bool,
    parameters: Vec<String>,
    cv: CvQualifiers,
    ref_qualifier: RefQualifier,
}

impl MemberShape {
    pub(crate) fn of_cursor<C: Cursor>(cursor: &C, analysis: &FunctionTokens) -> Self {
        let name = match &analysis.conversion_target {
            Some(target) => format!("operator {target}"),
            None => cursor.spelling(),
        };
        Self {
            name,
            is_destructor: cursor.kind() == CursorKind::Destructor,
            parameters: parameter_types(cursor),
            cv: analysis.trailing.cv,
            ref_qualifier: analysis.trailing.ref_qualifier,
        }
    }

    fn of_entity(entity: &Entity) -> Option<Self> {
        let signature = entity.signature()?;
        let (cv, ref_qualifier) = match &entity.kind {
            EntityKind::MemberFunction(f) => (f.cv, f.ref_qualifier),
            EntityKind::ConversionOp(f) => (f.cv, f.ref_qualifier),
            EntityKind::Destructor(_) => Default::default(),
            _ => return None,
        };
        Some(Self {
            name: entity.name.clone(),
            is_destructor: matches!(entity.kind, EntityKind::Destructor(_)),
            parameters: signature
                .parameters
                .iter()
                .map(|p| p.ty.full_name.clone())
                .collect(),
            cv,
            ref_qualifier,
        })
    }

    /// Destructors share one slot whatever their class is called
    fn matches(&self, other: &MemberShape) -> bool {
        if self.is_destructor || other.is_destructor {
            return self.is_destructor && other.is_destructor;
        }
        self.name == other.name
            && self.parameters == other.parameters
            && self.cv == other.cv
            && self.ref_qualifier == other.ref_qualifier
    }
}

/// Canonical parameter types of a function cursor
fn parameter_types<C: Cursor>(cursor: &C) -> Vec<String> {
    cursor
        .children()
        .iter()
        .filter(|child| child.kind() == CursorKind::ParmDecl)
        .map(|parm| match parm.ty() {
            Some(ty) if !ty.canonical.is_empty() => ty.canonical,
            Some(ty) if !ty.spelling.is_empty() => ty.spelling,
            _ => analyze_parameter(&parm.tokens(), &parm.spelling()).0,
        })
        .collect()
}

/// Keywords written on a member function that bear on its virtual state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct VirtualFacts {
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_final: bool,
    pub is_pure: bool,
}

impl VirtualFacts {
    pub(crate) fn of(analysis: &FunctionTokens) -> Self {
        Self {
            is_static: analysis.specifiers.is_static,
            is_virtual: analysis.specifiers.is_virtual,
            is_override: analysis.trailing.is_override,
            is_final: analysis.trailing.is_final,
            is_pure: analysis.trailing.is_pure,
        }
    }

    fn is_declared_virtual(self) -> bool {
        self.is_virtual || self.is_override || self.is_final || self.is_pure
    }
}

/// Combine written keywords with whether a base declares the same virtual
pub(crate) fn resolve(facts: VirtualFacts, base_match: bool) -> Virtuality {
    if facts.is_static {
        Virtuality::Static
    } else if facts.is_pure {
        Virtuality::Pure
    } else if facts.is_final && (facts.is_override || base_match) {
        Virtuality::Final
    } else if facts.is_override || base_match {
        Virtuality::Overridden
    } else if facts.is_virtual {
        Virtuality::New
    } else {
        Virtuality::None
    }
}

/// Whether any direct or indirect base of `class` declares a virtual member
/// matching `shape`
pub(crate) fn overrides_base<C: Cursor>(
    class: &C,
    shape: &MemberShape,
    types: &RegistryView<'_>,
) -> bool {
    cursor_bases_match(class, shape, types, 0)
}

fn cursor_bases_match<C: Cursor>(
    class: &C,
    shape: &MemberShape,
    types: &RegistryView<'_>,
    depth: usize,
) -> bool {
    if depth >= MAX_BASE_DEPTH {
        return false;
    }
    for base in base_specifiers(class) {
        let matched = match base.referenced() {
            Some(base_class) => {
                declares_virtual(&base_class, shape)
                    || cursor_bases_match(&base_class, shape, types, depth + 1)
            }
            None => lookup_base(class, &base, types)
                .is_some_and(|entity| entity_matches(entity, shape, types, depth + 1)),
        };
        if matched {
            return true;
        }
    }
    false
}

/// A member of `class` that matches `shape` and is virtual by its own
/// keywords
///
/// Members that are virtual only because they override a further base are
/// found when the search continues into that base.
fn declares_virtual<C: Cursor>(class: &C, shape: &MemberShape) -> bool {
    class.children().iter().any(|member| {
        if !member.kind().is_member_function() {
            return false;
        }
        let Some(analysis) = analyze_function(&member.tokens(), &member.spelling(), member.kind())
        else {
            return false;
        };
        VirtualFacts::of(&analysis).is_declared_virtual()
            && MemberShape::of_cursor(member, &analysis).matches(shape)
    })
}

fn entity_matches(
    class: &Entity,
    shape: &MemberShape,
    types: &RegistryView<'_>,
    depth: usize,
) -> bool {
    if depth >= MAX_BASE_DEPTH {
        return false;
    }
    let own = class.children().iter().any(|member| {
        member.virtuality().is_some_and(Virtuality::is_virtual)
            && MemberShape::of_entity(member).is_some_and(|m| m.matches(shape))
    });
    own || entity_bases(class, types)
        .into_iter()
        .any(|base| entity_matches(base, shape, types, depth + 1))
}

fn base_specifiers<C: Cursor>(class: &C) -> Vec<C> {
    class
        .children()
        .into_iter()
        .filter(|child| child.kind() == CursorKind::BaseSpecifier)
        .collect()
}

/// Name of a base as written in its specifier, without access and `virtual`
fn written_base_name<C: Cursor>(base: &C) -> String {
    let tokens = base.tokens();
    let name: Vec<&String> = tokens
        .iter()
        .filter(|t| !matches!(t.as_str(), "public" | "protected" | "private" | "virtual"))
        .collect();
    if name.is_empty() {
        base.spelling()
    } else {
        join(&name)
    }
}

fn lookup_base<'a, C: Cursor>(
    class: &C,
    base: &C,
    types: &RegistryView<'a>,
) -> Option<&'a Entity> {
    types.lookup_type(&written_base_name(base), &qualified_name(class))
}

fn entity_bases<'a>(class: &Entity, types: &RegistryView<'a>) -> Vec<&'a Entity> {
    class
        .children()
        .iter()
        .filter_map(Entity::as_base_class)
        .filter_map(|base| types.lookup_type(&base.target.full_name, ""))
        .collect()
}

/// Pure virtual members of `class` that are not overridden anywhere below
/// their declaration
///
/// A class with any such member is abstract.
pub(crate) fn pure_members<C: Cursor>(class: &C, types: &RegistryView<'_>) -> Vec<MemberShape> {
    cursor_pure_members(class, types, 0)
}

fn cursor_pure_members<C: Cursor>(
    class: &C,
    types: &RegistryView<'_>,
    depth: usize,
) -> Vec<MemberShape> {
    if depth >= MAX_BASE_DEPTH {
        return Vec::new();
    }

    let mut own_pure = Vec::new();
    let mut own_members = Vec::new();
    for member in class.children() {
        if !member.kind().is_member_function() {
            continue;
        }
        let Some(analysis) = analyze_function(&member.tokens(), &member.spelling(), member.kind())
        else {
            continue;
        };
        let shape = MemberShape::of_cursor(&member, &analysis);
        if analysis.trailing.is_pure {
            own_pure.push(shape.clone());
        }
        own_members.push(shape);
    }

    let mut inherited = Vec::new();
    for base in base_specifiers(class) {
        let base_pure = match base.referenced() {
            Some(base_class) => cursor_pure_members(&base_class, types, depth + 1),
            None => lookup_base(class, &base, types)
                .map(|entity| entity_pure_members(entity, types, depth + 1))
                .unwrap_or_default(),
        };
        inherited.extend(base_pure);
    }
    merge_pure(own_pure, &own_members, inherited)
}

fn entity_pure_members(class: &Entity, types: &RegistryView<'_>, depth: usize) -> Vec<MemberShape> {
    if depth >= MAX_BASE_DEPTH {
        return Vec::new();
    }

    let mut own_pure = Vec::new();
    let mut own_members = Vec::new();
    for member in class.children() {
        let Some(shape) = MemberShape::of_entity(member) else {
            continue;
        };
        if member.virtuality() == Some(Virtuality::Pure) {
            own_pure.push(shape.clone());
        }
        own_members.push(shape);
    }

    let inherited = entity_bases(class, types)
        .into_iter()
        .flat_map(|base| entity_pure_members(base, types, depth + 1))
        .collect();
    merge_pure(own_pure, &own_members, inherited)
}

fn merge_pure(
    mut own_pure: Vec<MemberShape>,
    own_members: &[MemberShape],
    inherited: Vec<MemberShape>,
) -> Vec<MemberShape> {
    for shape in inherited {
        let overridden = own_members.iter().any(|m| m.matches(&shape));
        if !overridden && !own_pure.iter().any(|m| m.matches(&shape)) {
            own_pure.push(shape);
        }
    }
    own_pure
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(is_virtual: bool, is_override: bool, is_final: bool, is_pure: bool) -> VirtualFacts {
        VirtualFacts {
            is_static: false,
            is_virtual,
            is_override,
            is_final,
            is_pure,
        }
    }

    #[test]
    fn test_resolve_precedence() {
        assert_eq!(resolve(facts(false, false, false, false), false), Virtuality::None);
        assert_eq!(resolve(facts(true, false, false, false), false), Virtuality::New);
        assert_eq!(resolve(facts(true, false, false, false), true), Virtuality::Overridden);
        assert_eq!(resolve(facts(false, false, false, false), true), Virtuality::Overridden);
        assert_eq!(resolve(facts(false, true, false, false), true), Virtuality::Overridden);
        assert_eq!(resolve(facts(false, true, true, false), false), Virtuality::Final);
        assert_eq!(resolve(facts(false, false, true, false), true), Virtuality::Final);
        assert_eq!(resolve(facts(true, false, true, false), false), Virtuality::New);
        assert_eq!(resolve(facts(true, false, false, true), false), Virtuality::Pure);
        assert_eq!(resolve(facts(true, true, false, true), true), Virtuality::Pure);

        let is_static = VirtualFacts {
            is_static: true,
            ..VirtualFacts::default()
        };
        assert_eq!(resolve(is_static, true), Virtuality::Static);
    }

    #[test]
    fn test_destructors_share_a_slot() {
        let destructor = |name: &str| MemberShape {
            name: name.to_string(),
            is_destructor: true,
            parameters: Vec::new(),
            cv: CvQualifiers::default(),
            ref_qualifier: RefQualifier::None,
        };
        assert!(destructor("~base").matches(&destructor("~derived")));

        let method = MemberShape {
            is_destructor: false,
            ..destructor("~base")
        };
        assert!(!method.matches(&destructor("~base")));
    }

    #[test]
    fn test_shapes_compare_qualifiers() {
        let shape = |is_const: bool| MemberShape {
            name: "k".to_string(),
            is_destructor: false,
            parameters: vec!["int".to_string()],
            cv: CvQualifiers {
                is_const,
                is_volatile: false,
            },
            ref_qualifier: RefQualifier::None,
        };
        assert!(shape(true).matches(&shape(true)));
        assert!(!shape(true).matches(&shape(false)));
    }
}
