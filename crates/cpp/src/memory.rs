//! In-memory cursor tree
//!
//! [`MemoryTree`] is an arena of cursor nodes addressed by index. It serves as
//! the dump format through which an external front end hands over a parsed
//! translation unit (JSON via serde) and as the cursor source for tests.

use std::path::Path;

use cxxdoc_core::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};

use crate::cursor::{Cursor, CursorKind, TypeSpelling};
use crate::tokens::tokenize;

/// Index of a node inside a [`MemoryTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// One cursor node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    pub kind: CursorKind,
    pub spelling: String,
    pub line: u32,
    pub ty: Option<TypeSpelling>,
    pub result_type: Option<TypeSpelling>,
    pub underlying_type: Option<TypeSpelling>,
    pub tokens: Vec<String>,
    pub comment: Option<String>,
    pub children: Vec<NodeId>,
    pub referenced: Option<NodeId>,
    pub semantic_parent: Option<NodeId>,
    pub is_definition: bool,
    pub enum_value: Option<i128>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            kind: CursorKind::Unexposed,
            spelling: String::new(),
            line: 0,
            ty: None,
            result_type: None,
            underlying_type: None,
            tokens: Vec::new(),
            comment: None,
            children: Vec::new(),
            referenced: None,
            semantic_parent: None,
            is_definition: true,
            enum_value: None,
        }
    }
}

impl Node {
    pub fn new(kind: CursorKind, spelling: impl Into<String>) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            ..Self::default()
        }
    }

    /// Set the tokens by tokenizing declaration source text
    pub fn source(mut self, source: &str) -> Self {
        self.tokens = tokenize(source);
        self
    }

    pub fn line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    pub fn ty(mut self, spelling: &str, canonical: &str) -> Self {
        self.ty = Some(TypeSpelling::new(spelling, canonical));
        self
    }

    pub fn result_type(mut self, spelling: &str, canonical: &str) -> Self {
        self.result_type = Some(TypeSpelling::new(spelling, canonical));
        self
    }

    pub fn underlying_type(mut self, spelling: &str, canonical: &str) -> Self {
        self.underlying_type = Some(TypeSpelling::new(spelling, canonical));
        self
    }

    pub fn comment(mut self, raw: &str) -> Self {
        self.comment = Some(raw.to_string());
        self
    }

    /// Mark as a declaration without definition
    pub fn declaration_only(mut self) -> Self {
        self.is_definition = false;
        self
    }

    pub fn enum_value(mut self, value: i128) -> Self {
        self.enum_value = Some(value);
        self
    }
}

/// Arena-backed cursor tree rooted at a translation unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryTree {
    nodes: Vec<Node>,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTree {
    /// Create a tree holding only the translation unit node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(CursorKind::TranslationUnit, "")],
        }
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.cursor(self.root_id())
    }

    pub fn cursor(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append `node` as the last child of `parent`
    ///
    /// The semantic parent defaults to the lexical parent.
    pub fn add(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        if node.semantic_parent.is_none() {
            node.semantic_parent = Some(parent);
        }
        self.nodes.push(node);
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.children.push(id);
        }
        id
    }

    /// Link a reference, using or base cursor to the declaration it names
    pub fn set_referenced(&mut self, id: NodeId, target: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.referenced = Some(target);
        }
    }

    pub fn set_semantic_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.semantic_parent = Some(parent);
        }
    }

    /// Read a tree from its JSON dump
    pub fn from_json(json: &str) -> Result<Self> {
        let mut tree: MemoryTree = serde_json::from_str(json)
            .map_err(|e| Error::front_end(format!("Failed to parse cursor dump: {e}")))?;
        tree.validate()?;
        tree.fill_semantic_parents();
        Ok(tree)
    }

    /// Nodes dumped without a semantic parent get their lexical parent, the
    /// same default [`MemoryTree::add`] applies
    fn fill_semantic_parents(&mut self) {
        let mut lexical = vec![None; self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            for child in &node.children {
                lexical[child.0].get_or_insert(NodeId(index));
            }
        }
        for (node, parent) in self.nodes.iter_mut().zip(lexical) {
            if node.semantic_parent.is_none() {
                node.semantic_parent = parent;
            }
        }
    }

    /// Read a tree from a JSON dump file
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .context(format!("Failed to read cursor dump {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::front_end(format!("Failed to write cursor dump: {e}")))
    }

    /// Check that every link points inside the arena and the root is a
    /// translation unit
    fn validate(&self) -> Result<()> {
        match self.nodes.first() {
            Some(root) if root.kind == CursorKind::TranslationUnit => {}
            _ => {
                return Err(Error::front_end(
                    "cursor dump must start with a translation unit node",
                ))
            }
        }

        let in_range = |id: &NodeId| id.0 < self.nodes.len();
        for (index, node) in self.nodes.iter().enumerate() {
            let links_ok = node.children.iter().all(in_range)
                && node.referenced.iter().all(in_range)
                && node.semantic_parent.iter().all(in_range);
            if !links_ok {
                return Err(Error::front_end(format!(
                    "cursor dump node {index} links outside the tree"
                )));
            }
            if node.children.iter().any(|c| c.0 <= index) {
                return Err(Error::front_end(format!(
                    "cursor dump node {index} has a child that is not after it"
                )));
            }
        }
        Ok(())
    }
}

/// Cursor handle into a [`MemoryTree`]
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a MemoryTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn node(&self) -> &'a Node {
        // ids are only handed out for nodes inside the arena
        &self.tree.nodes[self.id.0]
    }

    fn link(&self, id: Option<NodeId>) -> Option<Self> {
        id.filter(|id| id.0 < self.tree.nodes.len())
            .map(|id| self.tree.cursor(id))
    }
}

impl Cursor for NodeRef<'_> {
    fn kind(&self) -> CursorKind {
        self.node().kind
    }

    fn spelling(&self) -> String {
        self.node().spelling.clone()
    }

    fn line(&self) -> u32 {
        self.node().line
    }

    fn ty(&self) -> Option<TypeSpelling> {
        self.node().ty.clone()
    }

    fn result_type(&self) -> Option<TypeSpelling> {
        self.node().result_type.clone()
    }

    fn underlying_type(&self) -> Option<TypeSpelling> {
        self.node().underlying_type.clone()
    }

    fn referenced(&self) -> Option<Self> {
        self.link(self.node().referenced)
    }

    fn semantic_parent(&self) -> Option<Self> {
        self.link(self.node().semantic_parent)
    }

    fn children(&self) -> Vec<Self> {
        self.node()
            .children
            .iter()
            .map(|id| self.tree.cursor(*id))
            .collect()
    }

    fn raw_comment(&self) -> Option<String> {
        self.node().comment.clone()
    }

    fn tokens(&self) -> Vec<String> {
        self.node().tokens.clone()
    }

    fn is_definition(&self) -> bool {
        self.node().is_definition
    }

    fn enum_constant_value(&self) -> Option<i128> {
        self.node().enum_value
    }
}
