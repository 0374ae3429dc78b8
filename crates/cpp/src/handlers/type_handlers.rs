//! Classes, enums, type aliases, access specifiers and base classes

use std::str::FromStr;

use cxxdoc_core::diagnostics::DiagnosticKind;
use cxxdoc_core::entities::{
    Access, BaseClass, Class, ClassType, Entity, EntityKind, Enum, EnumConstant, EnumValue,
    TypeAlias, TypeRef,
};
use cxxdoc_core::error::Result;

use super::{qualified_name, Container, Walker};
use crate::cursor::{Cursor, CursorKind};
use crate::tokens::{find_declared_name, join, parse_integer_literal};
use crate::virtuals;

impl Walker<'_> {
    pub(super) fn handle_class<C: Cursor>(&mut self, cursor: &C) -> Result<Option<Entity>> {
        if !cursor.is_definition() && self.options.ignore_forward_declarations {
            return self.skip(cursor, "forward declaration");
        }

        let class_type = match cursor.kind() {
            CursorKind::StructDecl => ClassType::Struct,
            CursorKind::UnionDecl => ClassType::Union,
            _ => ClassType::Class,
        };
        let name = cursor.spelling();
        let is_final = is_final_class(&cursor.tokens(), &name);
        let header = self.header(cursor, name.clone());

        let children = self.within(&name, Container::Class(class_type), |walker| {
            walker.visit_children(cursor)
        });
        let is_abstract = !virtuals::pure_members(cursor, &self.types).is_empty();

        Ok(Some(header.into_entity(EntityKind::Class(Class {
            class_type,
            is_final,
            is_abstract,
            children,
        }))?))
    }

    pub(super) fn handle_enum<C: Cursor>(&mut self, cursor: &C) -> Result<Option<Entity>> {
        if !cursor.is_definition() && self.options.ignore_forward_declarations {
            return self.skip(cursor, "forward declaration");
        }

        let name = cursor.spelling();
        let tokens = cursor.tokens();
        let is_scoped = matches!(
            tokens
                .iter()
                .position(|t| t == "enum")
                .and_then(|pos| tokens.get(pos + 1))
                .map(String::as_str),
            Some("class") | Some("struct")
        );

        let written = written_underlying_type(&tokens, &name);
        let full_name = cursor
            .underlying_type()
            .map(|t| t.canonical)
            .filter(|canonical| !canonical.is_empty())
            .unwrap_or_else(|| {
                if written.is_empty() {
                    "int".to_string()
                } else {
                    written.clone()
                }
            });
        let is_unsigned = is_unsigned_type(&full_name);
        let header = self.header(cursor, name.clone());

        // only scoped enumerators are qualified by the enum name
        let values = if is_scoped {
            self.within(&name, Container::Namespace, |walker| {
                walker.enum_values(cursor, is_unsigned)
            })
        } else {
            self.enum_values(cursor, is_unsigned)
        };

        Ok(Some(header.into_entity(EntityKind::Enum(Enum {
            is_scoped,
            underlying: TypeRef::new(written, full_name),
            values,
        }))?))
    }

    fn enum_values<C: Cursor>(&mut self, cursor: &C, is_unsigned: bool) -> Vec<Entity> {
        let mut values = Vec::new();
        let mut previous: Option<i128> = None;

        for child in cursor.children() {
            if child.kind() != CursorKind::EnumConstantDecl {
                continue;
            }
            match self.enum_value(&child, previous, is_unsigned) {
                Ok((value, entity)) => {
                    previous = Some(value);
                    values.push(entity);
                }
                Err(e) => self.report(
                    DiagnosticKind::Classification,
                    &child.spelling(),
                    child.line(),
                    e.to_string(),
                ),
            }
        }
        values
    }

    fn enum_value<C: Cursor>(
        &mut self,
        cursor: &C,
        previous: Option<i128>,
        is_unsigned: bool,
    ) -> Result<(i128, Entity)> {
        let tokens = cursor.tokens();
        let initializer = tokens.iter().position(|t| t == "=");
        let explicitly_given = initializer.is_some()
            || cursor
                .children()
                .iter()
                .any(|c| c.kind() == CursorKind::Expression);

        let header = self.header(cursor, cursor.spelling());
        let implicit = previous.map_or(0, |p| p + 1);
        let value = match (cursor.enum_constant_value(), explicitly_given) {
            (Some(value), _) => value,
            (None, false) => implicit,
            (None, true) => {
                let literal = initializer.and_then(|pos| parse_integer_literal(&tokens[pos + 1..]));
                literal.unwrap_or_else(|| {
                    self.report(
                        DiagnosticKind::Classification,
                        &header.unique_name,
                        header.line,
                        "enumerator value could not be evaluated, assuming previous + 1",
                    );
                    implicit
                })
            }
        };

        let constant = if is_unsigned {
            u64::try_from(value).map(EnumConstant::Unsigned).ok()
        } else {
            i64::try_from(value).map(EnumConstant::Signed).ok()
        };
        let constant = match constant {
            Some(constant) => constant,
            None => {
                self.report(
                    DiagnosticKind::Classification,
                    &header.unique_name,
                    header.line,
                    format!("enumerator value {value} does not fit the underlying type"),
                );
                if is_unsigned {
                    EnumConstant::Unsigned(0)
                } else {
                    EnumConstant::Signed(0)
                }
            }
        };

        let entity = header.into_entity(EntityKind::EnumValue(EnumValue {
            value: constant,
            explicitly_given,
        }))?;
        Ok((value, entity))
    }

    pub(super) fn handle_type_alias<C: Cursor>(&mut self, cursor: &C) -> Result<Entity> {
        let name = cursor.spelling();
        let tokens = cursor.tokens();
        let underlying = cursor.underlying_type();

        let mut written = if cursor.kind() == CursorKind::TypeAliasDecl {
            written_alias_target(&tokens)
        } else {
            written_typedef_target(&tokens, &name)
        };
        if written.is_empty() {
            written = underlying
                .as_ref()
                .map(|t| t.spelling.clone())
                .unwrap_or_default();
        }
        let full_name = underlying
            .map(|t| t.canonical)
            .filter(|canonical| !canonical.is_empty())
            .unwrap_or_else(|| written.clone());

        let header = self.header(cursor, name);
        header.into_entity(EntityKind::TypeAlias(TypeAlias {
            target: TypeRef::new(written, full_name),
        }))
    }

    pub(super) fn handle_access_specifier<C: Cursor>(
        &mut self,
        cursor: &C,
    ) -> Result<Option<Entity>> {
        if self.enclosing_class().is_none() {
            self.report(
                DiagnosticKind::Classification,
                &cursor.spelling(),
                cursor.line(),
                "access specifier outside of a class",
            );
            return Ok(None);
        }

        let tokens = cursor.tokens();
        let access = tokens
            .iter()
            .chain(std::iter::once(&cursor.spelling()))
            .find_map(|t| Access::from_str(t).ok());
        let Some(access) = access else {
            self.report(
                DiagnosticKind::Classification,
                &cursor.spelling(),
                cursor.line(),
                "access specifier without access keyword",
            );
            return Ok(None);
        };

        let mut header = self.header(cursor, access.to_string());
        header.unique_name = header.name.clone();
        Ok(Some(header.into_entity(EntityKind::AccessSpecifier { access })?))
    }

    pub(super) fn handle_base_class<C: Cursor>(&mut self, cursor: &C) -> Result<Option<Entity>> {
        let Some(class_type) = self.enclosing_class() else {
            self.report(
                DiagnosticKind::Classification,
                &cursor.spelling(),
                cursor.line(),
                "base specifier outside of a class",
            );
            return Ok(None);
        };

        let tokens = cursor.tokens();
        let mut access = None;
        let mut is_virtual = false;
        let mut name_tokens = Vec::new();
        for token in &tokens {
            match token.as_str() {
                "virtual" => is_virtual = true,
                keyword if Access::from_str(keyword).is_ok() => {
                    access = Access::from_str(keyword).ok();
                }
                _ => name_tokens.push(token.as_str()),
            }
        }
        let access = access.unwrap_or_else(|| class_type.default_access());

        let referenced = cursor.referenced();
        let mut name = join(&name_tokens);
        if name.is_empty() {
            name = referenced
                .as_ref()
                .map(Cursor::spelling)
                .unwrap_or_else(|| cursor.spelling());
        }

        let scope = self.scope.current();
        let full_name = match (&referenced, cursor.ty()) {
            (_, Some(ty)) if !ty.canonical.is_empty() => ty.canonical,
            (Some(referenced), _) => qualified_name(referenced),
            (None, _) => match self.types.lookup_type(&name, &scope) {
                Some(entity) => entity.unique_name.clone(),
                None => {
                    self.report(
                        DiagnosticKind::UnresolvedReference,
                        &scope,
                        cursor.line(),
                        format!("base class '{name}' is not known"),
                    );
                    name.clone()
                }
            },
        };

        let mut header = self.header(cursor, name.clone());
        header.unique_name = full_name.clone();
        Ok(Some(header.into_entity(EntityKind::BaseClass(BaseClass {
            access,
            is_virtual,
            target: TypeRef::new(name, full_name),
        }))?))
    }
}

/// `final` between the class name and the body or base clause
fn is_final_class(tokens: &[String], name: &str) -> bool {
    let start = if name.is_empty() {
        0
    } else {
        match find_declared_name(tokens, name) {
            Some(pos) => pos + 1,
            None => return false,
        }
    };
    tokens[start..]
        .iter()
        .take_while(|t| !matches!(t.as_str(), "{" | ":" | ";"))
        .any(|t| t == "final")
}

/// Underlying type written after `:` in an enum head; empty when inferred
fn written_underlying_type(tokens: &[String], name: &str) -> String {
    let start = if name.is_empty() {
        tokens.iter().position(|t| t == "enum")
    } else {
        find_declared_name(tokens, name)
    };
    let Some(start) = start else {
        return String::new();
    };
    let Some(colon) = tokens[start..]
        .iter()
        .take_while(|t| !matches!(t.as_str(), "{" | ";"))
        .position(|t| t == ":")
        .map(|p| p + start)
    else {
        return String::new();
    };
    let end = tokens[colon..]
        .iter()
        .position(|t| t == "{" || t == ";")
        .map_or(tokens.len(), |p| p + colon);
    join(&tokens[colon + 1..end])
}

fn is_unsigned_type(canonical: &str) -> bool {
    canonical.starts_with("unsigned")
        || matches!(canonical, "bool" | "char8_t" | "char16_t" | "char32_t")
}

/// Target of `using name = target;`
fn written_alias_target(tokens: &[String]) -> String {
    let Some(eq) = tokens.iter().position(|t| t == "=") else {
        return String::new();
    };
    let target: Vec<&String> = tokens[eq + 1..].iter().filter(|t| *t != ";").collect();
    join(&target)
}

/// Target of `typedef target name;`, with the declared name cut out of the
/// declarator
fn written_typedef_target(tokens: &[String], name: &str) -> String {
    let name_pos = find_declared_name(tokens, name);
    let target: Vec<&String> = tokens
        .iter()
        .enumerate()
        .filter(|(i, t)| *t != "typedef" && *t != ";" && Some(*i) != name_pos)
        .map(|(_, t)| t)
        .collect();
    join(&target)
}
