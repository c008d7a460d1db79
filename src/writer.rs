//! Serialization of cross-section documents
//!
//! Two outputs: the canonical DSL rendering (vertices in ascending id
//! order, then polygons in declaration order) and an XML export for
//! downstream tooling. The canonical rendering round-trips: parsing it
//! yields a document equal to the one serialized.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::error::{Error, Result};
use crate::model::{Document, Vertex};

/// Render a document as canonical DSL text
///
/// Vertices are emitted in ascending id order, polygons in declaration
/// order, one record per line, no comments. `f64` formatting is the
/// shortest round-trip form, so coordinates survive a re-parse exactly.
pub fn to_dsl(document: &Document) -> String {
    let mut out = String::new();

    let mut vertices: Vec<&Vertex> = document.vertices().iter().collect();
    vertices.sort_by_key(|v| v.id);
    for vertex in vertices {
        out.push_str(&format!("{} {} {}\n", vertex.id, vertex.x, vertex.z));
    }

    for polygon in document.polygons() {
        out.push_str(&polygon.name.full());
        for id in &polygon.vertex_ids {
            out.push_str(&format!(" {}", id));
        }
        out.push('\n');
    }

    out
}

/// Render a document as XML
///
/// The layout mirrors the DSL: a `<vertices>` block of empty `<vertex>`
/// elements followed by a `<polygons>` block whose `<polygon>` elements
/// list `<vertexref>` children in ring order.
pub fn to_xml(document: &Document) -> Result<String> {
    let mut buffer = Vec::new();
    let mut writer = Writer::new_with_indent(&mut buffer, b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| Error::xml_write(format!("Failed to write XML declaration: {}", e)))?;

    writer
        .write_event(Event::Start(BytesStart::new("crosssection")))
        .map_err(|e| Error::xml_write(format!("Failed to open crosssection element: {}", e)))?;

    writer
        .write_event(Event::Start(BytesStart::new("vertices")))
        .map_err(|e| Error::xml_write(format!("Failed to open vertices element: {}", e)))?;
    let mut vertices: Vec<&Vertex> = document.vertices().iter().collect();
    vertices.sort_by_key(|v| v.id);
    for vertex in vertices {
        let mut elem = BytesStart::new("vertex");
        elem.push_attribute(("id", vertex.id.to_string().as_str()));
        elem.push_attribute(("x", vertex.x.to_string().as_str()));
        elem.push_attribute(("z", vertex.z.to_string().as_str()));
        writer
            .write_event(Event::Empty(elem))
            .map_err(|e| Error::xml_write(format!("Failed to write vertex element: {}", e)))?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("vertices")))
        .map_err(|e| Error::xml_write(format!("Failed to close vertices element: {}", e)))?;

    writer
        .write_event(Event::Start(BytesStart::new("polygons")))
        .map_err(|e| Error::xml_write(format!("Failed to open polygons element: {}", e)))?;
    for polygon in document.polygons() {
        let mut elem = BytesStart::new("polygon");
        elem.push_attribute(("name", polygon.name.base()));
        if let Some(part) = polygon.name.part() {
            elem.push_attribute(("part", part));
        }
        writer
            .write_event(Event::Start(elem))
            .map_err(|e| Error::xml_write(format!("Failed to open polygon element: {}", e)))?;
        for id in &polygon.vertex_ids {
            let mut vref = BytesStart::new("vertexref");
            vref.push_attribute(("id", id.to_string().as_str()));
            writer.write_event(Event::Empty(vref)).map_err(|e| {
                Error::xml_write(format!("Failed to write vertexref element: {}", e))
            })?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("polygon")))
            .map_err(|e| Error::xml_write(format!("Failed to close polygon element: {}", e)))?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("polygons")))
        .map_err(|e| Error::xml_write(format!("Failed to close polygons element: {}", e)))?;

    writer
        .write_event(Event::End(BytesEnd::new("crosssection")))
        .map_err(|e| Error::xml_write(format!("Failed to close crosssection element: {}", e)))?;

    String::from_utf8(buffer)
        .map_err(|e| Error::xml_write(format!("Failed to convert XML to UTF-8: {}", e)))
}
