//! Parsing session
//!
//! A [`Session`] owns everything one run of the extractor produces: the
//! entity tree of every parsed file, the registry indexing them and the
//! diagnostics raised on the way. The comment syntax and walk options are
//! fixed when the session is created.

use std::path::Path;

use cxxdoc_core::comment::CommentSyntax;
use cxxdoc_core::config::{Config, ParserConfig};
use cxxdoc_core::diagnostics::{Diagnostic, Diagnostics};
use cxxdoc_core::entities::{Entity, EntityKind, EntityType, File};
use cxxdoc_core::error::{Error, Result};
use tracing::info;

use crate::cursor::{Cursor, CursorKind};
use crate::handlers::Walker;
use crate::memory::MemoryTree;
use crate::overloads;
use crate::registry::{Registry, RegistryView};

pub struct Session {
    syntax: CommentSyntax,
    options: ParserConfig,
    registry: Registry,
    files: Vec<Entity>,
    diagnostics: Diagnostics,
}

impl Session {
    /// Create a session from configuration
    ///
    /// Invalid comment syntax overrides are reported here, before anything is
    /// parsed.
    pub fn new(config: &Config) -> Result<Self> {
        let syntax = config.comment_syntax()?;
        Ok(Self::with_syntax(syntax, config.parser.clone()))
    }

    pub fn with_syntax(syntax: CommentSyntax, options: ParserConfig) -> Self {
        Self {
            syntax,
            options,
            registry: Registry::new(),
            files: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn syntax(&self) -> &CommentSyntax {
        &self.syntax
    }

    /// Classify the translation unit under `root` and add it as a file
    pub fn parse<C: Cursor>(&mut self, path: &Path, root: &C) -> Result<&Entity> {
        if root.kind() != CursorKind::TranslationUnit {
            return Err(Error::front_end(format!(
                "expected a translation unit for {}, got '{}'",
                path.display(),
                root.kind()
            )));
        }

        let children = {
            let types = self.registry.view(&self.files);
            let mut walker =
                Walker::new(&self.syntax, &self.options, types, &mut self.diagnostics);
            walker.visit_children(root)
        };

        let name = path.display().to_string();
        let mut file = Entity::builder()
            .name(name.clone())
            .unique_name(name)
            .kind(EntityKind::File(File { children }))
            .build()
            .map_err(|e| Error::classification(e.to_string()))?;

        overloads::disambiguate(&mut file);
        overloads::disambiguate_across_files(
            &mut file,
            self.registry.view(&self.files),
            &mut self.diagnostics,
        );
        if self.options.skip_undocumented {
            if let Some(children) = file.children_mut() {
                prune_undocumented(children);
            }
        }

        let index = self.files.len();
        self.registry.register_file(index, &file);
        self.files.push(file);
        let file = &self.files[index];

        let mut entities = 0usize;
        file.walk(&mut |_| entities += 1);
        info!(
            file = %path.display(),
            entities = entities - 1,
            diagnostics = self.diagnostics.len(),
            "Parsed translation unit"
        );
        Ok(file)
    }

    /// Classify a translation unit handed over as a JSON cursor dump
    pub fn parse_dump(&mut self, path: &Path, json: &str) -> Result<&Entity> {
        let tree = MemoryTree::from_json(json)?;
        self.parse(path, &tree.root())
    }

    fn view(&self) -> RegistryView<'_> {
        self.registry.view(&self.files)
    }

    pub fn files(&self) -> &[Entity] {
        &self.files
    }

    pub fn for_each_file(&self, f: impl FnMut(&Entity)) {
        self.view().for_each_file(f);
    }

    pub fn for_each_namespace(&self, f: impl FnMut(&str)) {
        self.view().for_each_namespace(f);
    }

    pub fn for_each_in_namespace(&self, name: &str, f: impl FnMut(&Entity)) -> Option<&Entity> {
        self.view().for_each_in_namespace(name, f)
    }

    pub fn for_each_in_all_namespaces(&self, f: impl FnMut(&Entity)) {
        self.view().for_each_in_all_namespaces(f);
    }

    pub fn for_each_type(&self, f: impl FnMut(&Entity)) {
        self.view().for_each_type(f);
    }

    pub fn for_each_of_type(&self, entity_type: EntityType, f: impl FnMut(&Entity)) {
        self.view().for_each_of_type(entity_type, f);
    }

    pub fn lookup(&self, unique_name: &str) -> Option<&Entity> {
        self.view().lookup(unique_name)
    }

    pub fn lookup_type(&self, name: &str, from_scope: &str) -> Option<&Entity> {
        self.view().lookup_type(name, from_scope)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }
}

/// Drop entities that are neither documented nor hold documented children
///
/// Access specifiers, base classes and enum values describe their parent and
/// stay with it.
fn prune_undocumented(children: &mut Vec<Entity>) {
    children.retain(|child| {
        matches!(
            child.entity_type(),
            EntityType::AccessSpecifier | EntityType::BaseClass | EntityType::EnumValue
        ) || child.is_documented()
    });
    for child in children.iter_mut() {
        if let Some(grandchildren) = child.children_mut() {
            prune_undocumented(grandchildren);
        }
    }
}
