//! Validation of cross-section documents
//!
//! Validation runs in two phases. The parse phase (syntax, references,
//! naming, ordering) gates the geometry phase: there is no point
//! clipping polygons out of an unreadable document. Within each phase
//! every independent check runs and every finding is collected, so one
//! correction round-trip carries as much information as possible.
//!
//! The geometry phase enforces the coverage contract: the polygons must
//! tile the derived bounding rectangle exactly — no gaps, no
//! overlapping interiors, one connected region, and no vertex stranded
//! inside or on the edge of a polygon that does not list it.

use log::debug;

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::error::Result;
use crate::geometry;
use crate::model::{Document, Polygon, ValidatorConfig};
use crate::parser;

/// The outcome of validating one parse attempt
///
/// A document is accepted as a whole or rejected as a whole; there is
/// no partially-valid state.
#[derive(Debug)]
pub enum Validation {
    /// The document passed every check
    Valid(Document),
    /// The document was rejected; at least one finding is present
    Invalid {
        /// Every finding of this attempt, in check order
        diagnostics: Vec<Diagnostic>,
    },
}

impl Validation {
    /// Whether the attempt was accepted
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }

    /// The findings of a rejected attempt; empty when valid
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Validation::Valid(_) => &[],
            Validation::Invalid { diagnostics } => diagnostics,
        }
    }

    /// Extract the document of an accepted attempt
    pub fn into_document(self) -> Option<Document> {
        match self {
            Validation::Valid(document) => Some(document),
            Validation::Invalid { .. } => None,
        }
    }
}

/// Parse and fully validate definition text
///
/// This is the main entry point of the crate: it runs the lexer, the
/// two-phase parser and — when the text parses cleanly — the geometry
/// engine, and returns either the validated document or the complete
/// diagnostics list.
///
/// # Example
///
/// ```
/// use geosection::{ValidatorConfig, validate_text};
///
/// let text = "\
/// 0 0 0
/// 1 20 0
/// 2 20 -5
/// 3 0 -5
/// layer 0 1 2 3
/// ";
/// let validation = validate_text(text, &ValidatorConfig::default());
/// assert!(validation.is_valid());
/// ```
pub fn validate_text(text: &str, config: &ValidatorConfig) -> Validation {
    let (document, diagnostics) = parser::parse_with_diagnostics(text, config);
    let document = match document {
        Some(document) => document,
        None => {
            debug!("parse rejected with {} finding(s)", diagnostics.len());
            return Validation::Invalid { diagnostics };
        }
    };

    let diagnostics = validate_document(&document, config);
    if diagnostics.is_empty() {
        debug!(
            "accepted section: {} vertices, {} polygons",
            document.vertices().len(),
            document.polygons().len()
        );
        Validation::Valid(document)
    } else {
        debug!("geometry rejected with {} finding(s)", diagnostics.len());
        Validation::Invalid { diagnostics }
    }
}

/// Run the geometry checks on an already-parsed document
///
/// Returns every finding; an empty list means the document is valid.
/// Re-validating an accepted document is idempotent and produces no
/// findings.
pub fn validate_document(document: &Document, config: &ValidatorConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let Some(rect) = document.bounding_rect() else {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::EmptySection,
            "No vertices are defined.",
        ));
        return diagnostics;
    };

    let rect_area = rect.area();
    if rect_area <= f64::EPSILON {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::DegenerateGeometry,
            "The bounding rectangle has zero area; the vertices are collinear.",
        ));
        return diagnostics;
    }
    let area_tolerance = config.area_tolerance * rect_area;

    let polygons = document.polygons();
    let rings: Vec<Vec<(f64, f64)>> = polygons.iter().map(|p| document.ring(p)).collect();

    let mut total_polygon_area = 0.0;
    for (polygon, ring) in polygons.iter().zip(&rings) {
        let area = geometry::ring_signed_area(ring).abs();
        if area <= area_tolerance {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::DegenerateGeometry,
                    format!(
                        "Polygon '{}' encloses no area; it may be self-intersecting or collapsed.",
                        polygon.name
                    ),
                )
                .with_line(polygon.line)
                .with_polygons(vec![polygon.name.full()]),
            );
        }
        total_polygon_area += area;
    }

    match coverage_findings(rect_area, area_tolerance, total_polygon_area, polygons, &rings) {
        Ok(mut findings) => diagnostics.append(&mut findings),
        Err(err) => {
            // The clipping backend rejected the rings outright; report
            // it as broken geometry so the attempt still fails closed.
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::DegenerateGeometry,
                format!("Geometry computation failed: {}", err),
            ));
        }
    }

    diagnostics.extend(stranded_vertex_findings(document, &rings));

    diagnostics
}

/// Gap, overlap and contiguity checks against the bounding rectangle
fn coverage_findings(
    rect_area: f64,
    area_tolerance: f64,
    total_polygon_area: f64,
    polygons: &[Polygon],
    rings: &[Vec<(f64, f64)>],
) -> Result<Vec<Diagnostic>> {
    let mut findings = Vec::new();

    let union_area = geometry::union_area(rings)?;

    let gap_area = rect_area - union_area;
    if gap_area > area_tolerance {
        findings.push(
            Diagnostic::new(
                DiagnosticKind::GapDetected,
                format!(
                    "The polygons leave gap(s) totalling ≈ {:.3e} km² inside the bounding \
                     rectangle.",
                    gap_area
                ),
            )
            .with_area(gap_area),
        );
    }

    let overlaps = geometry::pairwise_overlaps(rings)?;
    let mut attributed = false;
    for overlap in &overlaps {
        if overlap.area > area_tolerance {
            attributed = true;
            findings.push(
                Diagnostic::new(
                    DiagnosticKind::OverlapDetected,
                    format!(
                        "Polygons '{}' and '{}' overlap (area ≈ {:.3e} km²).",
                        polygons[overlap.a].name, polygons[overlap.b].name, overlap.area
                    ),
                )
                .with_polygons(vec![
                    polygons[overlap.a].name.full(),
                    polygons[overlap.b].name.full(),
                ])
                .with_area(overlap.area),
            );
        }
    }
    // Safety net: a residual Σ(areas) − union that no pair explains.
    let overlap_total = total_polygon_area - union_area;
    if !attributed && overlap_total > area_tolerance {
        findings.push(
            Diagnostic::new(
                DiagnosticKind::OverlapDetected,
                format!(
                    "Polygon interiors overlap by ≈ {:.3e} km² in total.",
                    overlap_total
                ),
            )
            .with_area(overlap_total),
        );
    }

    let mut edges: Vec<(usize, usize)> = overlaps
        .iter()
        .filter(|o| o.area > area_tolerance)
        .map(|o| (o.a, o.b))
        .collect();
    for a in 0..rings.len() {
        for b in (a + 1)..rings.len() {
            if geometry::rings_share_boundary(&rings[a], &rings[b]) {
                edges.push((a, b));
            }
        }
    }
    let components = geometry::component_count(rings.len(), &edges);
    if components > 1 {
        findings.push(Diagnostic::new(
            DiagnosticKind::DisconnectedGeometry,
            format!(
                "Combined polygons do not form a single contiguous shape ({} separate \
                 components).",
                components
            ),
        ));
    }

    Ok(findings)
}

/// Vertices sitting inside, or on an edge of, a polygon that does not
/// list them
fn stranded_vertex_findings(document: &Document, rings: &[Vec<(f64, f64)>]) -> Vec<Diagnostic> {
    let mut findings = Vec::new();
    for vertex in document.vertices().iter() {
        let point = (vertex.x, vertex.z);
        for (polygon, ring) in document.polygons().iter().zip(rings) {
            if polygon.vertex_ids.contains(&vertex.id) {
                continue;
            }
            if geometry::point_on_ring_edge(point, ring) {
                findings.push(
                    Diagnostic::new(
                        DiagnosticKind::StrandedVertex,
                        format!(
                            "Vertex {} lies on an edge of polygon '{}' (but is not an endpoint).",
                            vertex.id, polygon.name
                        ),
                    )
                    .with_vertex_ids(vec![vertex.id])
                    .with_polygons(vec![polygon.name.full()]),
                );
            } else if geometry::point_strictly_inside(point, ring) {
                findings.push(
                    Diagnostic::new(
                        DiagnosticKind::StrandedVertex,
                        format!(
                            "Vertex {} lies strictly inside polygon '{}'.",
                            vertex.id, polygon.name
                        ),
                    )
                    .with_vertex_ids(vec![vertex.id])
                    .with_polygons(vec![polygon.name.full()]),
                );
            }
        }
    }
    findings
}
