//! Namespaces, namespace aliases and using-directives/declarations

use cxxdoc_core::entities::{Entity, EntityKind, Namespace, UsingTarget};
use cxxdoc_core::error::Result;
use cxxdoc_core::scope::SCOPE_SEPARATOR;

use super::{scope_of, Container, Walker};
use crate::cursor::{Cursor, CursorKind};
use crate::tokens::find_declared_name;

impl Walker<'_> {
    pub(super) fn handle_namespace<C: Cursor>(&mut self, cursor: &C) -> Result<Entity> {
        let name = cursor.spelling();
        let is_inline = is_inline_namespace(&cursor.tokens(), &name);
        let header = self.header(cursor, name.clone());

        let children = self.within(&name, Container::Namespace, |walker| {
            walker.visit_children(cursor)
        });

        header.into_entity(EntityKind::Namespace(Namespace {
            is_inline,
            children,
        }))
    }

    /// `namespace b = a::c;` is named `b` but unique by its target `a::c`
    pub(super) fn handle_namespace_alias<C: Cursor>(&mut self, cursor: &C) -> Result<Entity> {
        let target = parse_target(cursor);
        let mut header = self.header(cursor, cursor.spelling());
        header.unique_name = target.full_target();
        header.into_entity(EntityKind::NamespaceAlias(target))
    }

    /// Using-directives and using-declarations are named by their target
    pub(super) fn handle_using<C: Cursor>(&mut self, cursor: &C) -> Result<Entity> {
        let target = parse_target(cursor);
        let mut header = self.header(cursor, target.target.clone());
        header.unique_name = target.full_target();

        let kind = if cursor.kind() == CursorKind::UsingDirective {
            EntityKind::UsingDirective(target)
        } else {
            EntityKind::UsingDeclaration(target)
        };
        header.into_entity(kind)
    }
}

/// Whether `inline` directly precedes the namespace name (or the `namespace`
/// keyword of an unnamed namespace)
fn is_inline_namespace(tokens: &[String], name: &str) -> bool {
    let keyword = if name.is_empty() {
        tokens.iter().position(|t| t == "namespace")
    } else {
        find_declared_name(tokens, name).and_then(|pos| pos.checked_sub(1))
    };
    let Some(mut pos) = keyword else {
        return false;
    };
    if tokens[pos] == "namespace" {
        let Some(before) = pos.checked_sub(1) else {
            return false;
        };
        pos = before;
    }
    tokens[pos] == "inline"
}

/// Collect the target of an alias or using cursor from its reference
/// children
///
/// Children are visited in pre-order. An overloaded-declaration reference
/// ends the target: for inheriting constructors it is followed by an implicit
/// type reference that is not part of the name.
fn parse_target<C: Cursor>(cursor: &C) -> UsingTarget {
    let mut segments: Vec<String> = Vec::new();
    let mut target_scope: Option<String> = None;
    collect_target(cursor, &mut segments, &mut target_scope);
    UsingTarget {
        target: segments.join(SCOPE_SEPARATOR),
        target_scope: target_scope.unwrap_or_default(),
    }
}

/// Returns `false` once the target is complete
fn collect_target<C: Cursor>(
    cursor: &C,
    segments: &mut Vec<String>,
    target_scope: &mut Option<String>,
) -> bool {
    for child in cursor.children() {
        let kind = child.kind();
        if !kind.is_reference() {
            continue;
        }

        let referenced = child.referenced();
        let spelling = referenced
            .as_ref()
            .map(Cursor::spelling)
            .unwrap_or_else(|| child.spelling());
        if target_scope.is_none() {
            *target_scope = Some(referenced.as_ref().map(scope_of).unwrap_or_default());
        }
        segments.push(spelling);

        let is_overload_set = kind == CursorKind::OverloadedDeclRef
            || referenced
                .as_ref()
                .is_some_and(|r| r.kind() == CursorKind::OverloadedDeclRef);
        if is_overload_set || !collect_target(&child, segments, target_scope) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::tokenize;

    #[test]
    fn test_inline_namespace_detection() {
        assert!(is_inline_namespace(&tokenize("inline namespace v1 {}"), "v1"));
        assert!(!is_inline_namespace(&tokenize("namespace v1 {}"), "v1"));
        assert!(is_inline_namespace(&tokenize("inline namespace {}"), ""));
        assert!(!is_inline_namespace(&tokenize("namespace {}"), ""));
        assert!(!is_inline_namespace(&[], "v1"));
    }
}
