//! Project XML reader.
//!
//! Builds the arena tree from project file text.

use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Reader;

use super::error::DocumentError;
use super::tree::{ElementData, NodeId, NodeKind, Tree};

/// Name of the root element every project document must have
pub const PROJECT_ELEMENT: &str = "Project";

/// The `<?xml ...?>` declaration, kept so saves reproduce it
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: Some("utf-8".to_string()),
            standalone: None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ParsedDocument {
    pub tree: Tree,
    pub declaration: Option<Declaration>,
    /// Comments that appear before the root element
    pub prolog: Vec<String>,
}

/// Parse project XML text.
pub(crate) fn read_document(xml: &str) -> Result<ParsedDocument, DocumentError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = Reader::from_str(xml);

    let mut tree: Option<Tree> = None;
    let mut stack: Vec<NodeId> = Vec::new();
    let mut declaration = None;
    let mut prolog = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Decl(ref e)) => {
                declaration = Some(read_declaration(e)?);
            }
            Ok(Event::Start(ref e)) => {
                let id = open_element(&mut tree, &stack, e)?;
                stack.push(id);
            }
            Ok(Event::Empty(ref e)) => {
                open_element(&mut tree, &stack, e)?;
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape()?.into_owned();
                append_leaf(&mut tree, &stack, NodeKind::Text(text));
            }
            Ok(Event::CData(ref e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).to_string();
                append_leaf(&mut tree, &stack, NodeKind::CData(text));
            }
            Ok(Event::Comment(ref e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).to_string();
                if stack.is_empty() {
                    if tree.is_none() {
                        prolog.push(text);
                    }
                } else {
                    append_leaf(&mut tree, &stack, NodeKind::Comment(text));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocumentError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(DocumentError::Malformed(
            "unexpected end of document inside an element".to_string(),
        ));
    }

    let mut tree = tree.ok_or(DocumentError::MissingRoot)?;
    drop_indentation(&mut tree);
    Ok(ParsedDocument {
        tree,
        declaration,
        prolog,
    })
}

fn read_declaration(e: &BytesDecl) -> Result<Declaration, DocumentError> {
    let version = String::from_utf8_lossy(&e.version()?).to_string();
    let encoding = e
        .encoding()
        .transpose()
        .map_err(quick_xml::Error::from)?
        .map(|v| String::from_utf8_lossy(&v).to_string());
    let standalone = e
        .standalone()
        .transpose()
        .map_err(quick_xml::Error::from)?
        .map(|v| String::from_utf8_lossy(&v).to_string());
    Ok(Declaration {
        version,
        encoding,
        standalone,
    })
}

fn open_element(
    tree: &mut Option<Tree>,
    stack: &[NodeId],
    e: &BytesStart,
) -> Result<NodeId, DocumentError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    let Some(existing) = tree.as_mut() else {
        if name != PROJECT_ELEMENT {
            return Err(DocumentError::InvalidRoot(name));
        }
        let new_tree = Tree::new(&name, attributes);
        let root = new_tree.root();
        *tree = Some(new_tree);
        return Ok(root);
    };

    let Some(&parent) = stack.last() else {
        return Err(DocumentError::Malformed(format!(
            "second root element <{}>",
            name
        )));
    };
    let id = existing.create(NodeKind::Element(ElementData { name, attributes }));
    existing.append_child(parent, id);
    Ok(id)
}

/// Remove whitespace-only text from elements whose content is structural
/// (child elements or comments, no other text). The writer re-indents those.
/// Leaf and mixed-content elements keep their text exactly.
fn drop_indentation(tree: &mut Tree) {
    let root = tree.root();
    let elements: Vec<NodeId> = std::iter::once(root).chain(tree.descendants(root)).collect();

    for element in elements {
        let blank: Vec<NodeId> = {
            let children = tree.children(element);
            let is_blank = |id: NodeId| {
                matches!(&tree.node(id).kind, NodeKind::Text(text) if text.trim().is_empty())
            };
            let has_structure = children.iter().any(|&child| {
                matches!(
                    tree.node(child).kind,
                    NodeKind::Element(_) | NodeKind::Comment(_)
                )
            });
            let has_text = children.iter().any(|&child| {
                matches!(tree.node(child).kind, NodeKind::Text(_)) && !is_blank(child)
            });
            if !has_structure || has_text {
                continue;
            }
            children.iter().copied().filter(|&child| is_blank(child)).collect()
        };
        for child in blank {
            tree.detach(child);
        }
    }
}

fn append_leaf(tree: &mut Option<Tree>, stack: &[NodeId], kind: NodeKind) {
    if let (Some(tree), Some(&parent)) = (tree.as_mut(), stack.last()) {
        let id = tree.create(kind);
        tree.append_child(parent, id);
    }
}
