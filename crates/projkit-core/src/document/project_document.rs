//! Project document: the owned tree plus its file identity

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::DocumentError;
use super::reader::{read_document, Declaration, PROJECT_ELEMENT};
use super::tree::{DocumentId, ElementRef, NodeId, NodeKind, Tree};
use super::writer::write_document;

/// Default XML namespace of project files
pub const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

/// An editable project document
///
/// Owns the element tree. Callers hold [`ElementRef`]s into it; every
/// mutation checks that the ref belongs to this document.
#[derive(Debug)]
pub struct ProjectDocument {
    id: DocumentId,
    path: Option<PathBuf>,
    tree: Tree,
    declaration: Option<Declaration>,
    prolog: Vec<String>,
    revision: u64,
}

impl Default for ProjectDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectDocument {
    /// Create an empty `<Project>` document with the default namespace
    pub fn new() -> Self {
        let tree = Tree::new(
            PROJECT_ELEMENT,
            vec![
                ("ToolsVersion".to_string(), "4.0".to_string()),
                ("xmlns".to_string(), MSBUILD_NAMESPACE.to_string()),
            ],
        );
        Self {
            id: DocumentId::new(),
            path: None,
            tree,
            declaration: Some(Declaration::default()),
            prolog: Vec::new(),
            revision: 0,
        }
    }

    /// Parse a document from XML text. The result has no path.
    pub fn parse(xml: &str) -> Result<Self, DocumentError> {
        let parsed = read_document(xml)?;
        Ok(Self {
            id: DocumentId::new(),
            path: None,
            tree: parsed.tree,
            declaration: parsed.declaration,
            prolog: parsed.prolog,
            revision: 0,
        })
    }

    /// Load and parse a project file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut document = Self::parse(&content)?;
        document.path = Some(path.to_path_buf());
        debug!(path = %path.display(), nodes = document.tree_len(), "parsed project document");
        Ok(document)
    }

    /// Write the document back to its own path
    pub fn save(&self) -> Result<(), DocumentError> {
        let path = self.path.as_deref().ok_or(DocumentError::NoPath)?;
        self.write_to(path)
    }

    /// Write the document to another path and make that its path
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<(), DocumentError> {
        let path = path.as_ref();
        self.write_to(path)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Write the document to a path without changing its own path
    pub fn write_to(&self, path: &Path) -> Result<(), DocumentError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_xml_string()?)?;
        Ok(())
    }

    /// Serialize to XML text
    pub fn to_xml_string(&self) -> Result<String, DocumentError> {
        write_document(&self.tree, self.declaration.as_ref(), &self.prolog)
    }

    /// Copy the whole tree into a new, independent document
    ///
    /// The copy gets a new [`DocumentId`], so refs into the source are
    /// rejected by it. Node ids are preserved; use
    /// [`ProjectDocument::translate`] to carry a ref across.
    pub fn deep_clone(&self) -> Self {
        Self {
            id: DocumentId::new(),
            path: self.path.clone(),
            tree: self.tree.clone(),
            declaration: self.declaration.clone(),
            prolog: self.prolog.clone(),
            revision: 0,
        }
    }

    /// Re-point a ref taken from a document this one was cloned from
    pub fn translate(&self, source: ElementRef) -> Option<ElementRef> {
        let node = source.node();
        (self.tree.is_attached(node) && self.tree.element(node).is_some())
            .then(|| ElementRef::new(self.id, node))
    }

    /// Identity stamped into every [`ElementRef`] this document hands out
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// File the document was loaded from or will be saved to
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Change the save location. Does not touch the file system.
    pub fn set_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.path = Some(path.into());
    }

    /// Incremented on every structural or attribute change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The `<Project>` element
    pub fn root(&self) -> Element<'_> {
        Element {
            document: self,
            node: self.tree.root(),
        }
    }

    /// Resolve a ref into a borrowed element view
    pub fn element(&self, element: ElementRef) -> Result<Element<'_>, DocumentError> {
        let node = self.check(element)?;
        Ok(Element {
            document: self,
            node,
        })
    }

    /// Every element below the root, in document order
    pub fn elements(&self) -> impl Iterator<Item = Element<'_>> + '_ {
        self.tree.descendants(self.tree.root()).map(move |node| Element {
            document: self,
            node,
        })
    }

    /// Set an attribute, adding it after the existing ones if absent
    pub fn set_attribute(
        &mut self,
        element: ElementRef,
        name: &str,
        value: &str,
    ) -> Result<(), DocumentError> {
        let node = self.check(element)?;
        let data = self
            .tree
            .element_mut(node)
            .ok_or(DocumentError::Detached)?;
        match data.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => data
                .attributes
                .push((name.to_string(), value.to_string())),
        }
        self.touch();
        Ok(())
    }

    /// Remove an attribute; returns its previous value
    pub fn remove_attribute(
        &mut self,
        element: ElementRef,
        name: &str,
    ) -> Result<Option<String>, DocumentError> {
        let node = self.check(element)?;
        let data = self
            .tree
            .element_mut(node)
            .ok_or(DocumentError::Detached)?;
        let removed = data
            .attributes
            .iter()
            .position(|(key, _)| key == name)
            .map(|position| data.attributes.remove(position).1);
        if removed.is_some() {
            self.touch();
        }
        Ok(removed)
    }

    /// Replace an element's content with text
    pub fn set_text(&mut self, element: ElementRef, text: &str) -> Result<(), DocumentError> {
        let node = self.check(element)?;
        self.tree.set_text(node, text);
        self.touch();
        Ok(())
    }

    /// Append a new empty child element
    pub fn append_element(
        &mut self,
        parent: ElementRef,
        name: &str,
    ) -> Result<ElementRef, DocumentError> {
        let parent = self.check(parent)?;
        let node = self.tree.create_element(name);
        self.tree.append_child(parent, node);
        self.touch();
        Ok(ElementRef::new(self.id, node))
    }

    /// Insert a new empty element as a sibling before or after `anchor`
    pub fn insert_element(
        &mut self,
        anchor: ElementRef,
        name: &str,
        after: bool,
    ) -> Result<ElementRef, DocumentError> {
        let anchor = self.check(anchor)?;
        if anchor == self.tree.root() {
            return Err(DocumentError::InvalidAnchor);
        }
        let node = self.tree.create_element(name);
        if !self.tree.insert_sibling(anchor, node, after) {
            return Err(DocumentError::InvalidAnchor);
        }
        self.touch();
        Ok(ElementRef::new(self.id, node))
    }

    /// Detach an element (and its subtree) from the document
    pub fn remove(&mut self, element: ElementRef) -> Result<(), DocumentError> {
        let node = self.check(element)?;
        if node == self.tree.root() {
            return Err(DocumentError::InvalidAnchor);
        }
        self.tree.detach(node);
        self.touch();
        Ok(())
    }

    /// Validate that a ref points at a live element of this document
    pub(crate) fn check(&self, element: ElementRef) -> Result<NodeId, DocumentError> {
        if element.document() != self.id {
            return Err(DocumentError::ForeignNode);
        }
        let node = element.node();
        if !self.tree.is_attached(node) || self.tree.element(node).is_none() {
            return Err(DocumentError::Detached);
        }
        Ok(node)
    }

    fn tree_len(&self) -> usize {
        self.tree.descendants(self.tree.root()).count()
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

/// A borrowed view of one element
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    document: &'a ProjectDocument,
    node: NodeId,
}

impl<'a> Element<'a> {
    /// Owned address of this element
    pub fn element_ref(&self) -> ElementRef {
        ElementRef::new(self.document.id, self.node)
    }

    /// Element name, without namespace handling
    pub fn name(&self) -> &'a str {
        self.document
            .tree
            .element(self.node)
            .map(|data| data.name.as_str())
            .unwrap_or_default()
    }

    /// Attribute value by exact name
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.document
            .tree
            .element(self.node)?
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attributes in document order
    pub fn attributes(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.document
            .tree
            .element(self.node)
            .into_iter()
            .flat_map(|data| data.attributes.iter())
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Text content directly under this element
    pub fn text(&self) -> String {
        self.document.tree.text(self.node)
    }

    /// Direct child elements, in order
    pub fn children(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        let document = self.document;
        document
            .tree
            .children(self.node)
            .iter()
            .copied()
            .filter(move |&child| matches!(document.tree.node(child).kind, NodeKind::Element(_)))
            .map(move |node| Element { document, node })
    }

    /// Parent element; `None` for the root
    pub fn parent(&self) -> Option<Element<'a>> {
        self.document.tree.parent(self.node).map(|node| Element {
            document: self.document,
            node,
        })
    }

    /// The document this element lives in
    pub fn document(&self) -> &'a ProjectDocument {
        self.document
    }
}
