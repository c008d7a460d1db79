//! Two-phase parsing of cross-section definitions
//!
//! Phase one consumes vertex records into the vertex table; phase two
//! consumes polygon records, resolving ids against the table. The
//! ordering rule — all vertices before all polygons — is structural: a
//! vertex record after the first polygon record is an
//! `OrderingViolation`, not a late geometric finding.
//!
//! The parser collects every independent finding of one attempt rather
//! than stopping at the first, so a correction request carries maximal
//! information in a single round-trip. Geometry checks are not run
//! here; see [`crate::validator`].

use std::collections::{HashMap, HashSet};

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::error::{Error, Result};
use crate::lexer::{self, RawRecord, Record};
use crate::model::{
    Document, Polygon, PolygonName, ValidatorConfig, Vertex, VertexTable, is_identifier,
};

/// Parse a definition strictly, failing on the first finding
///
/// This is the plain-parse entry point for consumers that already hold
/// validated text (for example a renderer). It performs the syntax and
/// reference checks but no geometry checks. For collect-everything
/// behavior use [`crate::validate_text`].
pub fn parse_document(text: &str, config: &ValidatorConfig) -> Result<Document> {
    let (document, diagnostics) = parse_with_diagnostics(text, config);
    match document {
        Some(document) => Ok(document),
        None => {
            // Non-empty by construction when no document was produced.
            let first = &diagnostics[0];
            let message = first.to_string();
            match first.kind {
                DiagnosticKind::SyntaxError => Err(Error::Syntax(message)),
                _ => Err(Error::InvalidSection(message)),
            }
        }
    }
}

/// Parse a definition, collecting all syntax and reference findings
///
/// Returns the document only when no finding was recorded; a rejected
/// attempt yields `None` and the full diagnostics list.
pub(crate) fn parse_with_diagnostics(
    text: &str,
    config: &ValidatorConfig,
) -> (Option<Document>, Vec<Diagnostic>) {
    let (records, mut diagnostics) = lexer::tokenize(text);

    let mut table = VertexTable::new();
    let mut coords_seen: HashMap<(u64, u64), u32> = HashMap::new();
    let mut polygons: Vec<Polygon> = Vec::new();
    let mut names_seen: HashSet<String> = HashSet::new();
    let mut referenced: HashSet<u32> = HashSet::new();
    let mut polygon_records = 0usize;

    for record in &records {
        match record {
            Record::Vertex(raw) => {
                if polygon_records > 0 {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticKind::OrderingViolation,
                            "Vertex declared after the first polygon; all vertices must \
                             precede all polygons.",
                        )
                        .with_line(raw.line),
                    );
                }
                parse_vertex_record(raw, config, &mut table, &mut coords_seen, &mut diagnostics);
            }
            Record::Polygon(raw) => {
                polygon_records += 1;
                parse_polygon_record(
                    raw,
                    &table,
                    &mut names_seen,
                    &mut referenced,
                    &mut polygons,
                    &mut diagnostics,
                );
            }
        }
    }

    if table.is_empty() {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::EmptySection,
            "No vertices are defined.",
        ));
    }
    if polygon_records == 0 {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::EmptySection,
            "No polygons are defined.",
        ));
    }

    let mut unused: Vec<u32> = table
        .iter()
        .map(|v| v.id)
        .filter(|id| !referenced.contains(id))
        .collect();
    if !unused.is_empty() {
        unused.sort_unstable();
        diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::UnreferencedVertex,
                format!("Vertices never used in any polygon: {:?}.", unused),
            )
            .with_vertex_ids(unused),
        );
    }

    if diagnostics.is_empty() {
        (Some(Document::new(table, polygons)), diagnostics)
    } else {
        (None, diagnostics)
    }
}

fn parse_vertex_record(
    raw: &RawRecord<'_>,
    config: &ValidatorConfig,
    table: &mut VertexTable,
    coords_seen: &mut HashMap<(u64, u64), u32>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if raw.tokens.len() != 3 {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::SyntaxError,
                format!(
                    "Vertex record must have exactly three fields (id x z), found {}.",
                    raw.tokens.len()
                ),
            )
            .with_line(raw.line),
        );
        return;
    }

    let id = match raw.tokens[0].parse::<u32>() {
        Ok(id) => id,
        Err(_) => {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::SyntaxError,
                    format!("Vertex id '{}' is out of range.", raw.tokens[0]),
                )
                .with_line(raw.line),
            );
            return;
        }
    };

    let mut fields_ok = true;
    let x = match parse_coordinate(raw.tokens[1]) {
        Some(x) => x,
        None => {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::SyntaxError,
                    format!("Invalid x-coordinate '{}'.", raw.tokens[1]),
                )
                .with_line(raw.line),
            );
            fields_ok = false;
            0.0
        }
    };
    let z = match parse_coordinate(raw.tokens[2]) {
        Some(z) => z,
        None => {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::SyntaxError,
                    format!("Invalid z-coordinate '{}'.", raw.tokens[2]),
                )
                .with_line(raw.line),
            );
            fields_ok = false;
            0.0
        }
    };
    if !fields_ok {
        return;
    }

    if z > config.surface_epsilon {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::SyntaxError,
                format!(
                    "Vertex {} lies above the surface (z = {}); depths must be ≤ 0.",
                    id, z
                ),
            )
            .with_line(raw.line)
            .with_vertex_ids(vec![id]),
        );
        return;
    }

    if table.contains(id) {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::DuplicateVertexId,
                format!("Duplicate vertex ID {}.", id),
            )
            .with_line(raw.line)
            .with_vertex_ids(vec![id]),
        );
        return;
    }

    let key = (x.to_bits(), z.to_bits());
    if let Some(&previous) = coords_seen.get(&key) {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::DuplicateVertexCoordinate,
                format!(
                    "Vertices {} and {} share identical coordinates ({}, {}).",
                    previous, id, x, z
                ),
            )
            .with_line(raw.line)
            .with_vertex_ids(vec![previous, id]),
        );
    } else {
        coords_seen.insert(key, id);
    }

    let mut vertex = Vertex::new(id, x, z);
    vertex.line = raw.line;
    table.insert(vertex);
}

fn parse_coordinate(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_polygon_record(
    raw: &RawRecord<'_>,
    table: &VertexTable,
    names_seen: &mut HashSet<String>,
    referenced: &mut HashSet<u32>,
    polygons: &mut Vec<Polygon>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let raw_name = raw.tokens[0];
    let name = parse_polygon_name(raw_name, raw.line, diagnostics);

    // Ids are parsed and recorded as referenced even when the name is
    // rejected, so unreferenced-vertex findings stay accurate.
    let mut ids: Vec<u32> = Vec::with_capacity(raw.tokens.len().saturating_sub(1));
    let mut resolved = 0usize;
    let mut ids_ok = true;
    for token in &raw.tokens[1..] {
        match token.parse::<u32>() {
            Ok(id) => {
                referenced.insert(id);
                if table.contains(id) {
                    resolved += 1;
                } else {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticKind::UnknownVertexReference,
                            format!(
                                "Polygon '{}' references undefined vertex ID {}.",
                                raw_name, id
                            ),
                        )
                        .with_line(raw.line)
                        .with_vertex_ids(vec![id])
                        .with_polygons(vec![raw_name.to_string()]),
                    );
                    ids_ok = false;
                }
                ids.push(id);
            }
            Err(_) => {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::SyntaxError,
                        format!("Polygon '{}' has invalid vertex ID '{}'.", raw_name, token),
                    )
                    .with_line(raw.line)
                    .with_polygons(vec![raw_name.to_string()]),
                );
                ids_ok = false;
            }
        }
    }

    if resolved < 3 {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::DegeneratePolygon,
                format!(
                    "Polygon '{}' has fewer than 3 vertices ({} resolved).",
                    raw_name, resolved
                ),
            )
            .with_line(raw.line)
            .with_polygons(vec![raw_name.to_string()]),
        );
        ids_ok = false;
    }

    let mut ring_seen: HashSet<u32> = HashSet::new();
    for &id in &ids {
        if !ring_seen.insert(id) {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::DegeneratePolygon,
                    format!("Polygon '{}' lists the same vertex ID twice.", raw_name),
                )
                .with_line(raw.line)
                .with_vertex_ids(vec![id])
                .with_polygons(vec![raw_name.to_string()]),
            );
            ids_ok = false;
            break;
        }
    }

    if !names_seen.insert(raw_name.to_string()) {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::DuplicatePolygonName,
                format!("Polygon name '{}' is not unique.", raw_name),
            )
            .with_line(raw.line)
            .with_polygons(vec![raw_name.to_string()]),
        );
        return;
    }

    if let Some(name) = name
        && ids_ok
    {
        let mut polygon = Polygon::new(name, ids);
        polygon.line = raw.line;
        polygons.push(polygon);
    }
}

/// Apply the name grammar: `identifier` with at most one `^identifier`
fn parse_polygon_name(
    raw_name: &str,
    line: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<PolygonName> {
    let mut pieces = raw_name.split('^');
    let base = pieces.next().unwrap_or("");
    let part = pieces.next();

    if pieces.next().is_some() {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::InvalidPolygonName,
                format!("Polygon name '{}' contains more than one '^'.", raw_name),
            )
            .with_line(line)
            .with_polygons(vec![raw_name.to_string()]),
        );
        return None;
    }

    if !is_identifier(base) {
        let message = if base.starts_with(|c: char| c.is_ascii_digit()) {
            format!("Polygon name '{}' cannot start with a number.", raw_name)
        } else {
            format!("Polygon name '{}' is not a valid identifier.", raw_name)
        };
        diagnostics.push(
            Diagnostic::new(DiagnosticKind::InvalidPolygonName, message)
                .with_line(line)
                .with_polygons(vec![raw_name.to_string()]),
        );
        return None;
    }

    if let Some(part) = part
        && !is_identifier(part)
    {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::InvalidPolygonName,
                format!(
                    "Polygon part '{}' in '{}' is not a valid identifier.",
                    part, raw_name
                ),
            )
            .with_line(line)
            .with_polygons(vec![raw_name.to_string()]),
        );
        return None;
    }

    Some(PolygonName::new(base, part.map(str::to_string)))
}
