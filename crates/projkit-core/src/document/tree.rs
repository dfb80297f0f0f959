//! Arena-backed XML tree
//!
//! Nodes live in a flat arena and are addressed by [`NodeId`]. Removing a
//! node only detaches it, so an id never gets reused for a different node.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one document instance. Deep clones get a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a node within its document's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A reference to an element inside a specific document
///
/// Carries the owning [`DocumentId`] so mutations can reject nodes that
/// belong to another project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    document: DocumentId,
    node: NodeId,
}

impl ElementRef {
    pub(crate) fn new(document: DocumentId, node: NodeId) -> Self {
        Self { document, node }
    }

    /// The document the element belongs to
    pub fn document(&self) -> DocumentId {
        self.document
    }

    /// Position of the element in that document
    pub fn node(&self) -> NodeId {
        self.node
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ElementData {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Element(ElementData),
    Text(String),
    Comment(String),
    CData(String),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub(crate) struct Tree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Tree {
    pub fn new(root_name: &str, attributes: Vec<(String, String)>) -> Self {
        let root = NodeData {
            kind: NodeKind::Element(ElementData {
                name: root_name.to_string(),
                attributes,
            }),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Whether the node is reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Allocate a node that is not yet attached anywhere
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create(NodeKind::Element(ElementData {
            name: name.to_string(),
            attributes: Vec::new(),
        }))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `child` as the sibling immediately before (`after == false`)
    /// or after `anchor`. Returns `false` if the anchor has no parent.
    pub fn insert_sibling(&mut self, anchor: NodeId, child: NodeId, after: bool) -> bool {
        let Some(parent) = self.nodes[anchor.0].parent else {
            return false;
        };
        self.detach(child);
        let siblings = &mut self.nodes[parent.0].children;
        let position = siblings
            .iter()
            .position(|&id| id == anchor)
            .map(|p| if after { p + 1 } else { p })
            .unwrap_or(siblings.len());
        siblings.insert(position, child);
        self.nodes[child.0].parent = Some(parent);
        true
    }

    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Replace all children of an element with a single text node
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
        if !text.is_empty() {
            let node = self.create(NodeKind::Text(text.to_string()));
            self.append_child(id, node);
        }
    }

    /// Concatenated text and CDATA content directly under a node
    pub fn text(&self, id: NodeId) -> String {
        self.nodes[id.0]
            .children
            .iter()
            .filter_map(|&c| match &self.nodes[c.0].kind {
                NodeKind::Text(text) | NodeKind::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Attached element descendants of `from` (excluding itself), in
    /// document order
    pub fn descendants(&self, from: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.nodes[from.0].children.clone();
        stack.reverse();
        Descendants { tree: self, stack }
    }
}

/// Lazy pre-order walk over element nodes
pub(crate) struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(id) = self.stack.pop() {
            let node = self.tree.node(id);
            if let NodeKind::Element(_) = node.kind {
                self.stack.extend(node.children.iter().rev().copied());
                return Some(id);
            }
        }
        None
    }
}
