//! Declaration classifier
//!
//! A [`Walker`] visits a cursor tree top-down and turns every modeled
//! declaration into an [`Entity`]. Each entity family has its own handler
//! module; this module holds the dispatch, the shared entity header and the
//! lexical scope bookkeeping.

mod function_handlers;
mod namespace_handlers;
mod type_handlers;
mod variable_handlers;

use cxxdoc_core::comment::{Comment, CommentParser, CommentSyntax};
use cxxdoc_core::config::ParserConfig;
use cxxdoc_core::diagnostics::{DiagnosticKind, Diagnostics};
use cxxdoc_core::entities::{ClassType, Entity, EntityKind};
use cxxdoc_core::error::{Error, Result};
use cxxdoc_core::scope::{qualify, ScopeContext, SCOPE_SEPARATOR};
use tracing::{debug, trace};

use crate::cursor::{Cursor, CursorKind};
use crate::registry::RegistryView;

/// Lexical container currently being filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    File,
    Namespace,
    Class(ClassType),
}

/// Fields every entity shares
pub(crate) struct Header {
    name: String,
    unique_name: String,
    scope: String,
    comment: Option<Comment>,
    line: u32,
}

impl Header {
    fn into_entity(self, kind: EntityKind) -> Result<Entity> {
        Entity::builder()
            .name(self.name)
            .unique_name(self.unique_name)
            .scope(self.scope)
            .comment(self.comment)
            .line(self.line)
            .kind(kind)
            .build()
            .map_err(|e| Error::classification(e.to_string()))
    }
}

/// Top-down classifier for one translation unit
pub(crate) struct Walker<'s> {
    parser: CommentParser<'s>,
    options: &'s ParserConfig,
    types: RegistryView<'s>,
    diagnostics: &'s mut Diagnostics,
    scope: ScopeContext,
    containers: Vec<Container>,
}

impl<'s> Walker<'s> {
    pub(crate) fn new(
        syntax: &'s CommentSyntax,
        options: &'s ParserConfig,
        types: RegistryView<'s>,
        diagnostics: &'s mut Diagnostics,
    ) -> Self {
        Self {
            parser: CommentParser::new(syntax),
            options,
            types,
            diagnostics,
            scope: ScopeContext::new(),
            containers: vec![Container::File],
        }
    }

    /// Classify every child of `parent`, in source order
    pub(crate) fn visit_children<C: Cursor>(&mut self, parent: &C) -> Vec<Entity> {
        let mut entities = Vec::new();
        for child in parent.children() {
            match self.classify(&child) {
                Ok(Some(entity)) => entities.push(entity),
                Ok(None) => {}
                Err(e) => self.report(
                    DiagnosticKind::Classification,
                    &child.spelling(),
                    child.line(),
                    e.to_string(),
                ),
            }
        }
        entities
    }

    fn classify<C: Cursor>(&mut self, cursor: &C) -> Result<Option<Entity>> {
        let kind = cursor.kind();
        trace!(kind = %kind, spelling = %cursor.spelling(), line = cursor.line(), "Classifying cursor");

        match kind {
            CursorKind::Namespace => self.handle_namespace(cursor).map(Some),
            CursorKind::NamespaceAlias => self.handle_namespace_alias(cursor).map(Some),
            CursorKind::UsingDirective | CursorKind::UsingDeclaration => {
                self.handle_using(cursor).map(Some)
            }
            CursorKind::TypedefDecl | CursorKind::TypeAliasDecl => {
                self.handle_type_alias(cursor).map(Some)
            }
            CursorKind::EnumDecl => self.handle_enum(cursor),
            CursorKind::StructDecl | CursorKind::ClassDecl | CursorKind::UnionDecl => {
                self.handle_class(cursor)
            }
            CursorKind::AccessSpecifier => self.handle_access_specifier(cursor),
            CursorKind::BaseSpecifier => self.handle_base_class(cursor),
            CursorKind::VarDecl | CursorKind::FieldDecl => self.handle_variable(cursor).map(Some),
            CursorKind::FunctionDecl => self.handle_function(cursor),
            CursorKind::CxxMethod
            | CursorKind::Constructor
            | CursorKind::Destructor
            | CursorKind::ConversionFunction => self.handle_member_function(cursor),
            // parts of a declaration, handled by its owner
            CursorKind::ParmDecl
            | CursorKind::TypeRef
            | CursorKind::NamespaceRef
            | CursorKind::TemplateRef
            | CursorKind::OverloadedDeclRef
            | CursorKind::MemberRef
            | CursorKind::Expression
            | CursorKind::Statement => Ok(None),
            CursorKind::TranslationUnit | CursorKind::EnumConstantDecl | CursorKind::Unexposed => {
                self.report(
                    DiagnosticKind::Classification,
                    &cursor.spelling(),
                    cursor.line(),
                    format!("unexpected cursor kind '{kind}'"),
                );
                Ok(None)
            }
        }
    }

    /// Build the shared header, qualifying `name` with the current scope
    fn header<C: Cursor>(&mut self, cursor: &C, name: String) -> Header {
        let scope = self.scope.current();
        let unique_name = qualify(&scope, &name);
        let comment = cursor
            .raw_comment()
            .and_then(|raw| self.parser.parse(&unique_name, &raw, self.diagnostics));
        Header {
            name,
            unique_name,
            scope,
            comment,
            line: cursor.line(),
        }
    }

    /// Run `f` with `name` pushed as the innermost scope
    fn within<T>(
        &mut self,
        name: &str,
        container: Container,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.scope.push_scope(name);
        self.containers.push(container);
        let result = f(self);
        self.containers.pop();
        self.scope.pop_scope();
        result
    }

    fn enclosing_class(&self) -> Option<ClassType> {
        match self.containers.last() {
            Some(Container::Class(class_type)) => Some(*class_type),
            _ => None,
        }
    }

    fn report(&mut self, kind: DiagnosticKind, entity: &str, line: u32, message: impl Into<String>) {
        self.diagnostics.report(kind, entity, line, message);
    }

    fn skip<C: Cursor>(&self, cursor: &C, reason: &str) -> Result<Option<Entity>> {
        debug!(
            kind = %cursor.kind(),
            spelling = %cursor.spelling(),
            line = cursor.line(),
            "Skipping {reason}"
        );
        Ok(None)
    }
}

/// Scope path of a declaration, built from its semantic parents
pub(crate) fn scope_of<C: Cursor>(cursor: &C) -> String {
    const MAX_NESTING: usize = 256;

    let mut segments = Vec::new();
    let mut current = cursor.semantic_parent();
    for _ in 0..MAX_NESTING {
        let Some(parent) = current else {
            break;
        };
        let kind = parent.kind();
        if kind == CursorKind::Namespace || kind.is_class() {
            let spelling = parent.spelling();
            if !spelling.is_empty() {
                segments.push(spelling);
            }
        } else if kind == CursorKind::TranslationUnit {
            break;
        }
        current = parent.semantic_parent();
    }
    segments.reverse();
    segments.join(SCOPE_SEPARATOR)
}

/// Fully qualified name of a declaration
pub(crate) fn qualified_name<C: Cursor>(cursor: &C) -> String {
    qualify(&scope_of(cursor), &cursor.spelling())
}
