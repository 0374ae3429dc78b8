//! Functions and the member function family

use cxxdoc_core::diagnostics::DiagnosticKind;
use cxxdoc_core::entities::{
    Constructor, ConversionOp, Destructor, Entity, EntityKind, Function, FunctionSignature,
    MemberFunction, Noexcept, Parameter, TypeRef, Virtuality,
};
use cxxdoc_core::error::Result;

use super::Walker;
use crate::cursor::{Cursor, CursorKind};
use crate::tokens::{analyze_function, analyze_parameter, FunctionTokens};
use crate::virtuals::{self, MemberShape, VirtualFacts};

impl Walker<'_> {
    pub(super) fn handle_function<C: Cursor>(&mut self, cursor: &C) -> Result<Option<Entity>> {
        if self.enclosing_class().is_some() {
            return self.skip(cursor, "friend function");
        }
        if cursor.semantic_parent().is_some_and(|p| p.kind().is_class()) {
            return self.skip(cursor, "out-of-line member definition");
        }

        let analysis = self.function_tokens(cursor);
        let signature = self.signature(cursor, &analysis);
        let header = self.header(cursor, cursor.spelling());
        Ok(Some(
            header.into_entity(EntityKind::Function(Function { signature }))?,
        ))
    }

    pub(super) fn handle_member_function<C: Cursor>(
        &mut self,
        cursor: &C,
    ) -> Result<Option<Entity>> {
        if self.enclosing_class().is_none() {
            return self.skip(cursor, "out-of-line member definition");
        }

        let kind = cursor.kind();
        let analysis = self.function_tokens(cursor);
        let signature = self.signature(cursor, &analysis);
        let cv = analysis.trailing.cv;
        let ref_qualifier = analysis.trailing.ref_qualifier;

        let (name, entity_kind) = match kind {
            CursorKind::Constructor => (
                cursor.spelling(),
                EntityKind::Constructor(Constructor {
                    signature,
                    is_explicit: analysis.specifiers.is_explicit,
                }),
            ),
            CursorKind::Destructor => {
                let virtuality = self.virtuality(cursor, &analysis);
                (
                    cursor.spelling(),
                    EntityKind::Destructor(Destructor {
                        signature,
                        virtuality,
                    }),
                )
            }
            CursorKind::ConversionFunction => {
                let virtuality = self.virtuality(cursor, &analysis);
                let name = match &analysis.conversion_target {
                    Some(target) => format!("operator {target}"),
                    None => cursor.spelling(),
                };
                (
                    name,
                    EntityKind::ConversionOp(ConversionOp {
                        signature,
                        is_explicit: analysis.specifiers.is_explicit,
                        cv,
                        ref_qualifier,
                        virtuality,
                    }),
                )
            }
            _ => {
                let virtuality = self.virtuality(cursor, &analysis);
                (
                    cursor.spelling(),
                    EntityKind::MemberFunction(MemberFunction {
                        signature,
                        cv,
                        ref_qualifier,
                        virtuality,
                    }),
                )
            }
        };

        let header = self.header(cursor, name);
        Ok(Some(header.into_entity(entity_kind)?))
    }

    fn function_tokens<C: Cursor>(&mut self, cursor: &C) -> FunctionTokens {
        let tokens = cursor.tokens();
        match analyze_function(&tokens, &cursor.spelling(), cursor.kind()) {
            Some(analysis) => analysis,
            None => {
                if !tokens.is_empty() {
                    self.report(
                        DiagnosticKind::Classification,
                        &cursor.spelling(),
                        cursor.line(),
                        "declarator could not be located in the declaration tokens",
                    );
                }
                FunctionTokens::default()
            }
        }
    }

    fn signature<C: Cursor>(&self, cursor: &C, analysis: &FunctionTokens) -> FunctionSignature {
        let kind = cursor.kind();
        let parameters = cursor
            .children()
            .iter()
            .filter(|child| child.kind() == CursorKind::ParmDecl)
            .enumerate()
            .map(|(index, parm)| parameter(parm, analysis.parameters.get(index)))
            .collect();

        let return_type = if matches!(kind, CursorKind::Constructor | CursorKind::Destructor) {
            TypeRef::default()
        } else {
            let result = cursor.result_type();
            let name = if analysis.return_type.is_empty() {
                result.as_ref().map(|t| t.spelling.clone()).unwrap_or_default()
            } else {
                analysis.return_type.clone()
            };
            let full_name = result
                .map(|t| t.canonical)
                .filter(|canonical| !canonical.is_empty())
                .unwrap_or_else(|| name.clone());
            TypeRef::new(name, full_name)
        };

        let noexcept = match &analysis.trailing.noexcept {
            Some(expression) => Noexcept::explicit(expression.clone()),
            None => Noexcept::implicit(kind == CursorKind::Destructor),
        };

        FunctionSignature {
            parameters,
            return_type,
            is_variadic: analysis.is_variadic,
            is_constexpr: analysis.specifiers.is_constexpr,
            definition: analysis.trailing.definition,
            noexcept,
        }
    }

    fn virtuality<C: Cursor>(&mut self, cursor: &C, analysis: &FunctionTokens) -> Virtuality {
        let facts = VirtualFacts::of(analysis);
        if facts.is_static {
            return Virtuality::Static;
        }

        let shape = MemberShape::of_cursor(cursor, analysis);
        let base_match = cursor
            .semantic_parent()
            .filter(|parent| parent.kind().is_class())
            .is_some_and(|class| virtuals::overrides_base(&class, &shape, &self.types));

        let needs_base = facts.is_override || (facts.is_final && !facts.is_virtual);
        if needs_base && !base_match {
            let entity = self.scope.qualify(&cursor.spelling());
            self.report(
                DiagnosticKind::UnresolvedReference,
                &entity,
                cursor.line(),
                "no virtual base member with the same signature",
            );
        }
        virtuals::resolve(facts, base_match)
    }
}

/// Parameter from its cursor, falling back to the tokens of the enclosing
/// declaration when the parameter cursor carries none
fn parameter<C: Cursor>(parm: &C, written: Option<&Vec<String>>) -> Parameter {
    let name = parm.spelling();
    let mut tokens = parm.tokens();
    if tokens.is_empty() {
        tokens = written.cloned().unwrap_or_default();
    }
    let (mut type_name, default_value) = analyze_parameter(&tokens, &name);

    let ty = parm.ty();
    if type_name.is_empty() {
        type_name = ty.as_ref().map(|t| t.spelling.clone()).unwrap_or_default();
    }
    let full_name = ty
        .map(|t| t.canonical)
        .filter(|canonical| !canonical.is_empty())
        .unwrap_or_else(|| type_name.clone());

    Parameter {
        name,
        ty: TypeRef::new(type_name, full_name),
        default_value,
    }
}
