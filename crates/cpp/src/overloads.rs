//! Overload disambiguation
//!
//! Runs once per file after the walk. Function-like entities that share a
//! scope and a name are grouped; a group with more than one distinct
//! signature gets a signature suffix on every member's unique name, and
//! repeated declarations of one signature collapse into the first. A second
//! pass checks the groups against files registered earlier.

use std::collections::HashMap;

use cxxdoc_core::diagnostics::{DiagnosticKind, Diagnostics};
use cxxdoc_core::entities::{Entity, EntityKind, RefQualifier};
use cxxdoc_core::scope::qualify;
use tracing::debug;

use crate::registry::RegistryView;

/// Signature suffix that tells overloads apart
///
/// `(int, const char *) const &`, with canonical parameter types and `...`
/// for a variadic parameter pack.
pub fn signature_suffix(entity: &Entity) -> Option<String> {
    let signature = entity.signature()?;
    let mut parameters: Vec<&str> = signature
        .parameters
        .iter()
        .map(|p| p.ty.full_name.as_str())
        .collect();
    if signature.is_variadic {
        parameters.push("...");
    }

    let mut suffix = format!("({})", parameters.join(", "));
    let qualifiers = match &entity.kind {
        EntityKind::MemberFunction(f) => Some((f.cv, f.ref_qualifier)),
        EntityKind::ConversionOp(f) => Some((f.cv, f.ref_qualifier)),
        _ => None,
    };
    if let Some((cv, ref_qualifier)) = qualifiers {
        if cv.is_const {
            suffix.push_str(" const");
        }
        if cv.is_volatile {
            suffix.push_str(" volatile");
        }
        match ref_qualifier {
            RefQualifier::None => {}
            RefQualifier::Lvalue => suffix.push_str(" &"),
            RefQualifier::Rvalue => suffix.push_str(" &&"),
        }
    }
    Some(suffix)
}

struct Candidate {
    path: Vec<usize>,
    suffix: String,
    has_comment: bool,
}

/// Disambiguate overloads and drop redeclarations below `root`
pub fn disambiguate(root: &mut Entity) {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), Vec<Candidate>> = HashMap::new();
    let mut path = Vec::new();
    collect(root, &mut path, &mut order, &mut groups);

    let mut renames: Vec<(Vec<usize>, String)> = Vec::new();
    let mut carried_comments: Vec<(Vec<usize>, Vec<usize>)> = Vec::new();
    let mut removals: Vec<Vec<usize>> = Vec::new();

    for key in &order {
        let Some(candidates) = groups.get(key) else {
            continue;
        };
        let mut kept: Vec<&Candidate> = Vec::new();
        for candidate in candidates {
            match kept.iter().find(|k| k.suffix == candidate.suffix) {
                Some(first) => {
                    debug!(
                        scope = %key.0,
                        name = %key.1,
                        signature = %candidate.suffix,
                        "Dropping redeclaration"
                    );
                    if !first.has_comment && candidate.has_comment {
                        carried_comments.push((candidate.path.clone(), first.path.clone()));
                    }
                    removals.push(candidate.path.clone());
                }
                None => kept.push(candidate),
            }
        }
        if kept.len() > 1 {
            for candidate in kept {
                renames.push((candidate.path.clone(), candidate.suffix.clone()));
            }
        }
    }

    for (path, suffix) in renames {
        if let Some(entity) = entity_at_mut(root, &path) {
            entity.unique_name.push_str(&suffix);
        }
    }
    for (from, to) in carried_comments {
        let comment = entity_at_mut(root, &from).and_then(|e| e.comment.take());
        if let Some(target) = entity_at_mut(root, &to) {
            if target.comment.is_none() {
                target.comment = comment;
            }
        }
    }

    // later siblings first so earlier paths stay valid
    removals.sort_unstable_by(|a, b| b.cmp(a));
    for path in removals {
        let Some((index, parent)) = path.split_last() else {
            continue;
        };
        if let Some(children) = entity_at_mut(root, parent).and_then(Entity::children_mut) {
            if *index < children.len() {
                children.remove(*index);
            }
        }
    }
}

/// Disambiguate the overloads below `root` against files parsed earlier
///
/// Runs after [`disambiguate`]. Earlier files are already registered and
/// keep their unique names, so a function that overloads one of theirs gets
/// its signature suffix here. When the earlier declaration was the only one of
/// its name in its file and stayed unsuffixed, a diagnostic is raised: lookups
/// by the plain name still land on it.
pub fn disambiguate_across_files(
    root: &mut Entity,
    earlier: RegistryView<'_>,
    diagnostics: &mut Diagnostics,
) {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), Vec<Candidate>> = HashMap::new();
    let mut path = Vec::new();
    collect(root, &mut path, &mut order, &mut groups);

    let mut renames: Vec<(Vec<usize>, String)> = Vec::new();
    for key in &order {
        let Some(candidates) = groups.get(key) else {
            continue;
        };
        let plain = qualify(&key.0, &key.1);
        let mut previous: Vec<(String, String, u32)> = Vec::new();
        earlier.for_each_overload(&key.0, &key.1, |e| {
            if let Some(suffix) = signature_suffix(e) {
                previous.push((suffix, e.unique_name.clone(), e.line));
            }
        });
        if previous.is_empty() {
            continue;
        }

        let overloaded = candidates
            .iter()
            .any(|c| previous.iter().all(|(suffix, ..)| *suffix != c.suffix));
        if !overloaded && candidates.len() == 1 && previous.iter().all(|p| p.1 == plain) {
            // same single declaration seen again
            continue;
        }

        for candidate in candidates {
            renames.push((candidate.path.clone(), candidate.suffix.clone()));
        }
        if overloaded {
            for (suffix, unique_name, line) in &previous {
                if *unique_name == plain {
                    diagnostics.report(
                        DiagnosticKind::Classification,
                        unique_name.clone(),
                        *line,
                        format!(
                            "'{plain}{suffix}' is overloaded in a later file but keeps its unsuffixed name"
                        ),
                    );
                }
            }
        }
    }

    for (path, suffix) in renames {
        if let Some(entity) = entity_at_mut(root, &path) {
            if entity.unique_name.ends_with(&suffix) {
                continue;
            }
            debug!(unique_name = %entity.unique_name, signature = %suffix, "Suffixing overload of an earlier file");
            entity.unique_name.push_str(&suffix);
        }
    }
}

fn collect(
    entity: &Entity,
    path: &mut Vec<usize>,
    order: &mut Vec<(String, String)>,
    groups: &mut HashMap<(String, String), Vec<Candidate>>,
) {
    for (i, child) in entity.children().iter().enumerate() {
        path.push(i);
        if let Some(suffix) = signature_suffix(child) {
            let key = (child.scope.clone(), child.name.clone());
            let group = groups.entry(key.clone()).or_default();
            if group.is_empty() {
                order.push(key);
            }
            group.push(Candidate {
                path: path.clone(),
                suffix,
                has_comment: child.comment.is_some(),
            });
        }
        collect(child, path, order, groups);
        path.pop();
    }
}

fn entity_at_mut<'a>(root: &'a mut Entity, path: &[usize]) -> Option<&'a mut Entity> {
    let mut entity = root;
    for index in path {
        entity = entity.children_mut()?.get_mut(*index)?;
    }
    Some(entity)
}
