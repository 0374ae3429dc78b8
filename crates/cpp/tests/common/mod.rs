//! Cursor tree fixtures shared by the integration tests

#![allow(dead_code)]

use std::path::Path;

use cxxdoc_core::config::Config;
use cxxdoc_core::entities::Entity;
use cxxdoc_cpp::{CursorKind, MemoryTree, Node, NodeId, Session};

/// Install a test-writer subscriber once; `RUST_LOG` selects the level
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builder for an in-memory translation unit
pub struct Fixture {
    pub tree: MemoryTree,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        Self {
            tree: MemoryTree::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.tree.root_id()
    }

    pub fn add(&mut self, parent: NodeId, node: Node) -> NodeId {
        self.tree.add(parent, node)
    }

    /// Declaration cursor whose tokens come from `source`
    pub fn decl(&mut self, parent: NodeId, kind: CursorKind, name: &str, source: &str) -> NodeId {
        self.tree.add(parent, Node::new(kind, name).source(source))
    }

    pub fn namespace(&mut self, parent: NodeId, name: &str) -> NodeId {
        let source = format!("namespace {name} {{}}");
        self.decl(parent, CursorKind::Namespace, name, &source)
    }

    /// Class, struct or union definition
    pub fn class(&mut self, parent: NodeId, kind: CursorKind, name: &str, head: &str) -> NodeId {
        let source = format!("{head} {{}};");
        self.decl(parent, kind, name, &source)
    }

    /// Function-like cursor with its canonical result type
    pub fn function(
        &mut self,
        parent: NodeId,
        kind: CursorKind,
        name: &str,
        source: &str,
        result: &str,
    ) -> NodeId {
        let mut node = Node::new(kind, name).source(source);
        if !result.is_empty() {
            node = node.result_type(result, result);
        }
        self.tree.add(parent, node)
    }

    /// Parameter of `function`, declared by `source`
    pub fn param(&mut self, function: NodeId, name: &str, source: &str, canonical: &str) -> NodeId {
        self.tree.add(
            function,
            Node::new(CursorKind::ParmDecl, name)
                .source(source)
                .ty(canonical, canonical),
        )
    }

    /// Base specifier of `class`, optionally resolved to the base's cursor
    pub fn base(&mut self, class: NodeId, source: &str, target: Option<NodeId>) -> NodeId {
        let name = source
            .split_whitespace()
            .last()
            .unwrap_or_default()
            .to_string();
        let id = self.decl(class, CursorKind::BaseSpecifier, &name, source);
        if let Some(target) = target {
            self.tree.set_referenced(id, target);
        }
        id
    }

    /// Classify the tree as `test.hpp` with the default configuration
    pub fn parse(&self) -> Session {
        self.parse_with(&Config::default())
    }

    pub fn parse_with(&self, config: &Config) -> Session {
        let mut session = Session::new(config).unwrap();
        session
            .parse(Path::new("test.hpp"), &self.tree.root())
            .unwrap();
        session
    }
}

/// The single file of a session
pub fn file(session: &Session) -> &Entity {
    &session.files()[0]
}

/// First child of `parent` named `name`
pub fn child<'a>(parent: &'a Entity, name: &str) -> &'a Entity {
    parent
        .children()
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("'{}' has no child named '{name}'", parent.name))
}

/// Names of the children of `parent`, in order
pub fn child_names(parent: &Entity) -> Vec<String> {
    parent.children().iter().map(|c| c.name.clone()).collect()
}
