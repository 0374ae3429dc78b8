//! Name index over classified files
//!
//! Entities are owned by their file's tree. The registry only records where
//! they live, as an [`EntityPath`] of child indices, and resolves names to
//! those paths. Lookups go through a [`RegistryView`], which pairs the index
//! with the file trees it points into.

use std::collections::HashMap;

use cxxdoc_core::entities::{Entity, EntityType};
use cxxdoc_core::scope::{enclosing_scopes, qualify, split_qualified, SCOPE_SEPARATOR};

/// Location of an entity: a file index followed by child indices
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityPath {
    pub file: usize,
    pub indices: Vec<usize>,
}

/// Strategies `lookup_type` tries, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookupStrategy {
    /// Name qualified with the requesting scope and each scope around it
    EnclosingScopes,
    /// Unqualified name that exactly one registered type carries
    UniqueSimpleName,
}

const LOOKUP_STRATEGIES: &[LookupStrategy] = &[
    LookupStrategy::EnclosingScopes,
    LookupStrategy::UniqueSimpleName,
];

#[derive(Debug, Default)]
pub struct Registry {
    /// Namespace names in registration order
    namespace_names: Vec<String>,
    namespaces: HashMap<String, Vec<EntityPath>>,
    /// Types (classes, enums, aliases) in registration order
    types: Vec<EntityPath>,
    types_by_name: HashMap<String, EntityPath>,
    types_by_simple_name: HashMap<String, Vec<EntityPath>>,
    /// Function-like entities by scope and unqualified name
    functions: HashMap<(String, String), Vec<EntityPath>>,
    entities: HashMap<String, EntityPath>,
    files: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every entity below `file`, which lives at position `index`
    pub fn register_file(&mut self, index: usize, file: &Entity) {
        let mut indices = Vec::new();
        for (i, child) in file.children().iter().enumerate() {
            indices.push(i);
            self.register(index, &mut indices, child);
            indices.pop();
        }
        self.files = self.files.max(index + 1);
    }

    fn register(&mut self, file: usize, indices: &mut Vec<usize>, entity: &Entity) {
        let path = || EntityPath {
            file,
            indices: indices.clone(),
        };
        let entity_type = entity.entity_type();

        if entity_type == EntityType::Namespace {
            let name = entity.unique_name.clone();
            let paths = self.namespaces.entry(name.clone()).or_default();
            if paths.is_empty() {
                self.namespace_names.push(name);
            }
            paths.push(path());
        }

        if entity_type.is_type() && !self.types_by_name.contains_key(&entity.unique_name) {
            self.types.push(path());
            self.types_by_name.insert(entity.unique_name.clone(), path());
            self.types_by_simple_name
                .entry(entity.name.clone())
                .or_default()
                .push(path());
        }

        if entity.signature().is_some() {
            self.functions
                .entry((entity.scope.clone(), entity.name.clone()))
                .or_default()
                .push(path());
        }

        if is_indexed(entity_type) {
            self.entities
                .entry(entity.unique_name.clone())
                .or_insert_with(path);
        }

        for (i, child) in entity.children().iter().enumerate() {
            indices.push(i);
            self.register(file, indices, child);
            indices.pop();
        }
    }

    pub fn view<'a>(&'a self, files: &'a [Entity]) -> RegistryView<'a> {
        RegistryView {
            registry: self,
            files,
        }
    }

    pub fn file_count(&self) -> usize {
        self.files
    }
}

/// Entities whose unique name identifies them rather than what they refer to
fn is_indexed(entity_type: EntityType) -> bool {
    !matches!(
        entity_type,
        EntityType::File
            | EntityType::AccessSpecifier
            | EntityType::BaseClass
            | EntityType::NamespaceAlias
            | EntityType::UsingDirective
            | EntityType::UsingDeclaration
    )
}

/// Strip cv-qualifiers, elaborated-type keywords and pointer/reference
/// declarators from a type spelling
fn normalize_type_name(name: &str) -> &str {
    let mut name = name.trim();
    loop {
        let before = name;
        for keyword in ["const ", "volatile ", "class ", "struct ", "union ", "enum ", "typename "] {
            name = name.strip_prefix(keyword).unwrap_or(name).trim_start();
        }
        for suffix in [" const", " volatile", "&&", "&", "*"] {
            name = name.strip_suffix(suffix).unwrap_or(name).trim_end();
        }
        if name == before {
            return name;
        }
    }
}

/// Read access to the registry together with the trees it indexes
#[derive(Debug, Clone, Copy)]
pub struct RegistryView<'a> {
    registry: &'a Registry,
    files: &'a [Entity],
}

impl<'a> RegistryView<'a> {
    pub fn resolve(&self, path: &EntityPath) -> Option<&'a Entity> {
        let mut entity = self.files.get(path.file)?;
        for index in &path.indices {
            entity = entity.children().get(*index)?;
        }
        Some(entity)
    }

    pub fn for_each_file(&self, mut f: impl FnMut(&'a Entity)) {
        self.files.iter().for_each(&mut f);
    }

    /// Visit the name of every namespace, in registration order
    pub fn for_each_namespace(&self, mut f: impl FnMut(&'a str)) {
        for name in &self.registry.namespace_names {
            f(name);
        }
    }

    /// Visit the members of every namespace named `name`
    ///
    /// Returns the first namespace entity of that name, or `None` when there
    /// is no such namespace.
    pub fn for_each_in_namespace(
        &self,
        name: &str,
        mut f: impl FnMut(&'a Entity),
    ) -> Option<&'a Entity> {
        let paths = self.registry.namespaces.get(name)?;
        let mut first = None;
        for namespace in paths.iter().filter_map(|path| self.resolve(path)) {
            first.get_or_insert(namespace);
            namespace.children().iter().for_each(&mut f);
        }
        first
    }

    /// Visit the members of the global namespace of every file and of every
    /// named namespace
    pub fn for_each_in_all_namespaces(&self, mut f: impl FnMut(&'a Entity)) {
        for file in self.files {
            file.children().iter().for_each(&mut f);
        }
        for name in &self.registry.namespace_names {
            self.for_each_in_namespace(name, &mut f);
        }
    }

    /// Visit every class, enum and type alias, nested ones included
    pub fn for_each_type(&self, mut f: impl FnMut(&'a Entity)) {
        for path in &self.registry.types {
            if let Some(entity) = self.resolve(path) {
                f(entity);
            }
        }
    }

    pub fn for_each_of_type(&self, entity_type: EntityType, mut f: impl FnMut(&'a Entity)) {
        for file in self.files {
            file.walk(&mut |entity: &'a Entity| {
                if entity.entity_type() == entity_type {
                    f(entity);
                }
            });
        }
    }

    /// Visit every function-like entity declared as `name` in `scope`
    pub fn for_each_overload(&self, scope: &str, name: &str, mut f: impl FnMut(&'a Entity)) {
        let key = (scope.to_string(), name.to_string());
        for path in self.registry.functions.get(&key).into_iter().flatten() {
            if let Some(entity) = self.resolve(path) {
                f(entity);
            }
        }
    }

    /// Entity registered under `unique_name`; the first registration wins
    pub fn lookup(&self, unique_name: &str) -> Option<&'a Entity> {
        self.resolve(self.registry.entities.get(unique_name)?)
    }

    /// Resolve a type name as written inside `from_scope`
    ///
    /// A leading `::` anchors the name at the global scope. Otherwise the
    /// name is tried in `from_scope` and each scope around it, and as a last
    /// resort by its unqualified name when only one type carries it.
    pub fn lookup_type(&self, name: &str, from_scope: &str) -> Option<&'a Entity> {
        let name = normalize_type_name(name);
        if name.is_empty() {
            return None;
        }
        if let Some(global) = name.strip_prefix(SCOPE_SEPARATOR) {
            return self.type_named(global);
        }

        LOOKUP_STRATEGIES
            .iter()
            .find_map(|strategy| match strategy {
                LookupStrategy::EnclosingScopes => enclosing_scopes(from_scope)
                    .iter()
                    .find_map(|scope| self.type_named(&qualify(scope, name))),
                LookupStrategy::UniqueSimpleName => {
                    let simple = split_qualified(name).last().copied().unwrap_or(name);
                    match self.registry.types_by_simple_name.get(simple)?.as_slice() {
                        [only] => self.resolve(only),
                        _ => None,
                    }
                }
            })
    }

    fn type_named(&self, unique_name: &str) -> Option<&'a Entity> {
        self.resolve(self.registry.types_by_name.get(unique_name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxdoc_core::entities::{
        Class, ClassType, EntityKind, File, Function, FunctionSignature, Namespace, Noexcept,
        TypeAlias, TypeRef,
    };

    fn entity(name: &str, scope: &str, kind: EntityKind) -> Entity {
        Entity::builder()
            .name(name)
            .unique_name(qualify(scope, name))
            .scope(scope)
            .kind(kind)
            .build()
            .unwrap()
    }

    fn class(name: &str, scope: &str, children: Vec<Entity>) -> Entity {
        entity(
            name,
            scope,
            EntityKind::Class(Class {
                class_type: ClassType::Struct,
                is_final: false,
                is_abstract: false,
                children,
            }),
        )
    }

    fn namespace(name: &str, scope: &str, children: Vec<Entity>) -> Entity {
        entity(
            name,
            scope,
            EntityKind::Namespace(Namespace {
                is_inline: false,
                children,
            }),
        )
    }

    fn file(children: Vec<Entity>) -> Entity {
        entity("a.hpp", "", EntityKind::File(File { children }))
    }

    fn sample() -> Vec<Entity> {
        let alias = entity(
            "size",
            "ns::outer",
            EntityKind::TypeAlias(TypeAlias {
                target: TypeRef::new("unsigned", "unsigned int"),
            }),
        );
        vec![
            file(vec![
                class("top", "", vec![]),
                namespace(
                    "ns",
                    "",
                    vec![class("outer", "ns", vec![class("inner", "ns::outer", vec![]), alias])],
                ),
            ]),
            file(vec![namespace("ns", "", vec![class("other", "ns", vec![])])]),
        ]
    }

    fn registry(files: &[Entity]) -> Registry {
        let mut registry = Registry::new();
        for (index, file) in files.iter().enumerate() {
            registry.register_file(index, file);
        }
        registry
    }

    #[test]
    fn test_types_include_nested() {
        let files = sample();
        let registry = registry(&files);
        let mut names = Vec::new();
        registry
            .view(&files)
            .for_each_type(|e| names.push(e.unique_name.clone()));
        assert_eq!(
            names,
            vec!["top", "ns::outer", "ns::outer::inner", "ns::outer::size", "ns::other"]
        );
    }

    #[test]
    fn test_reopened_namespace() {
        let files = sample();
        let registry = registry(&files);
        let view = registry.view(&files);

        let mut namespaces = Vec::new();
        view.for_each_namespace(|n| namespaces.push(n.to_string()));
        assert_eq!(namespaces, vec!["ns"]);

        let mut members = Vec::new();
        let first = view.for_each_in_namespace("ns", |e| members.push(e.name.clone()));
        assert_eq!(members, vec!["outer", "other"]);
        assert!(std::ptr::eq(first.unwrap(), &files[0].children()[1]));
        assert!(view.for_each_in_namespace("missing", |_| {}).is_none());
    }

    #[test]
    fn test_all_namespaces_include_global() {
        let files = sample();
        let registry = registry(&files);
        let mut members = Vec::new();
        registry
            .view(&files)
            .for_each_in_all_namespaces(|e| members.push(e.unique_name.clone()));
        assert_eq!(members, vec!["top", "ns", "ns", "ns::outer", "ns::other"]);
    }

    #[test]
    fn test_lookup_type_walks_outward() {
        let files = sample();
        let registry = registry(&files);
        let view = registry.view(&files);

        let found = |name: &str, scope: &str| view.lookup_type(name, scope).map(|e| e.unique_name.clone());
        assert_eq!(found("inner", "ns::outer"), Some("ns::outer::inner".to_string()));
        assert_eq!(found("outer::inner", "ns"), Some("ns::outer::inner".to_string()));
        assert_eq!(found("const outer &", "ns"), Some("ns::outer".to_string()));
        assert_eq!(found("::top", "ns"), Some("top".to_string()));
        assert_eq!(found("::outer", ""), None);
        // unqualified fallback when the name is unambiguous
        assert_eq!(found("other", ""), Some("ns::other".to_string()));
        assert_eq!(found("missing", "ns"), None);
    }

    #[test]
    fn test_lookup_by_unique_name() {
        let files = sample();
        let registry = registry(&files);
        let view = registry.view(&files);
        assert_eq!(view.lookup("ns::outer::size").unwrap().name, "size");
        assert!(view.lookup("a.hpp").is_none());
        assert_eq!(registry.file_count(), 2);
    }

    #[test]
    fn test_overloads_indexed_by_scope_and_name() {
        let function = |unique: &str| {
            let mut f = entity(
                "f",
                "ns",
                EntityKind::Function(Function {
                    signature: FunctionSignature {
                        parameters: Vec::new(),
                        return_type: TypeRef::new("void", "void"),
                        is_variadic: false,
                        is_constexpr: false,
                        definition: Default::default(),
                        noexcept: Noexcept::implicit(false),
                    },
                }),
            );
            f.unique_name = unique.to_string();
            f
        };
        let files = vec![
            file(vec![namespace("ns", "", vec![function("ns::f")])]),
            file(vec![
                namespace("ns", "", vec![function("ns::f(char)")]),
                class("f", "ns", vec![]),
            ]),
        ];
        let registry = registry(&files);

        let mut found = Vec::new();
        registry
            .view(&files)
            .for_each_overload("ns", "f", |e| found.push(e.unique_name.clone()));
        assert_eq!(found, vec!["ns::f", "ns::f(char)"]);

        let mut none = 0;
        registry.view(&files).for_each_overload("", "f", |_| none += 1);
        assert_eq!(none, 0);
    }

    #[test]
    fn test_normalize_type_name() {
        assert_eq!(normalize_type_name("const foo &"), "foo");
        assert_eq!(normalize_type_name("struct ns::bar *"), "ns::bar");
        assert_eq!(normalize_type_name("volatile baz&&"), "baz");
    }
}
