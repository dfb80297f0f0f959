//! Project XML writer.
//!
//! Writes the arena tree back out with two-space indentation.

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

use super::error::DocumentError;
use super::reader::Declaration;
use super::tree::{NodeId, NodeKind, Tree};

/// Serialize a document tree to XML text.
pub(crate) fn write_document(
    tree: &Tree,
    declaration: Option<&Declaration>,
    prolog: &[String],
) -> Result<String, DocumentError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    if let Some(decl) = declaration {
        writer.write_event(Event::Decl(BytesDecl::new(
            &decl.version,
            decl.encoding.as_deref(),
            decl.standalone.as_deref(),
        )))?;
    }

    for comment in prolog {
        writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?;
    }

    write_node(&mut writer, tree, tree.root())?;

    let mut result = String::from_utf8_lossy(&writer.into_inner()).to_string();
    result.push('\n');
    Ok(result)
}

fn write_node<W: Write>(
    writer: &mut Writer<W>,
    tree: &Tree,
    id: NodeId,
) -> Result<(), DocumentError> {
    match &tree.node(id).kind {
        NodeKind::Element(data) => {
            let mut elem = BytesStart::new(data.name.as_str());
            for (key, value) in &data.attributes {
                // Quotes stay literal: conditions are full of `'`
                let escaped = partial_escape(value).replace('"', "&quot;");
                elem.push_attribute((key.as_bytes(), escaped.as_bytes()));
            }

            let children = tree.children(id);
            if children.is_empty() {
                writer.write_event(Event::Empty(elem))?;
            } else {
                writer.write_event(Event::Start(elem))?;
                for &child in children {
                    write_node(writer, tree, child)?;
                }
                writer.write_event(Event::End(BytesEnd::new(data.name.as_str())))?;
            }
        }
        NodeKind::Text(text) => {
            writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
        }
        NodeKind::CData(text) => {
            writer.write_event(Event::CData(BytesCData::new(text.as_str())))?;
        }
        NodeKind::Comment(text) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?;
        }
    }
    Ok(())
}
