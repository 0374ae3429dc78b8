use cxxdoc_core::entities::{Entity, EntityKind, TypeRef, Variable};
use cxxdoc_core::error::Result;

use super::Walker;
use crate::cursor::{Cursor, CursorKind};
use crate::tokens::analyze_variable;

impl Walker<'_> {
    /// Namespace-scope variables, static data members and fields
    pub(super) fn handle_variable<C: Cursor>(&mut self, cursor: &C) -> Result<Entity> {
        let name = cursor.spelling();
        let analysis = analyze_variable(&cursor.tokens(), &name);

        let ty = cursor.ty();
        let type_name = if analysis.type_name.is_empty() {
            ty.as_ref().map(|t| t.spelling.clone()).unwrap_or_default()
        } else {
            analysis.type_name
        };
        let full_name = ty
            .map(|t| t.canonical)
            .filter(|canonical| !canonical.is_empty())
            .unwrap_or_else(|| type_name.clone());

        // a plain variable declared inside a class is a static data member
        let is_static = analysis.specifiers.is_static
            || (cursor.kind() == CursorKind::VarDecl && self.enclosing_class().is_some());

        let header = self.header(cursor, name);
        header.into_entity(EntityKind::Variable(Variable {
            ty: TypeRef::new(type_name, full_name),
            initializer: analysis.initializer,
            is_static,
            is_constexpr: analysis.specifiers.is_constexpr,
            is_thread_local: analysis.specifiers.is_thread_local,
            is_mutable: analysis.specifiers.is_mutable,
        }))
    }
}
