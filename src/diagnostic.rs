//! Validation diagnostics
//!
//! Every rule the validator enforces maps to one [`DiagnosticKind`].
//! A [`Diagnostic`] is a stable record of one finding: the kind, a
//! deterministic human-readable message, and whatever location data the
//! check could attribute (source line, vertex ids, polygon names,
//! measured area). The records serialize to JSON so they can travel to
//! the generation service as structured correction context.

use std::fmt;

use serde::Serialize;

/// Classification of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// A line that could not be parsed at all
    SyntaxError,
    /// A vertex record appeared after the first polygon record
    OrderingViolation,
    /// The same vertex id was declared twice
    DuplicateVertexId,
    /// Two vertices share identical coordinates
    DuplicateVertexCoordinate,
    /// A declared vertex is not referenced by any polygon
    UnreferencedVertex,
    /// The document declares no vertices or no polygons
    EmptySection,
    /// A polygon name fails the name grammar
    InvalidPolygonName,
    /// A polygon references a vertex id that was never declared
    UnknownVertexReference,
    /// A polygon has fewer than three distinct vertices
    DegeneratePolygon,
    /// Two polygons share the same full name
    DuplicatePolygonName,
    /// A ring encloses no area, or the section itself is flat
    DegenerateGeometry,
    /// The polygons leave uncovered area inside the bounding rectangle
    GapDetected,
    /// Two polygon interiors overlap
    OverlapDetected,
    /// The union of all polygons is not a single connected region
    DisconnectedGeometry,
    /// A vertex sits inside another polygon, or on one of its edges
    StrandedVertex,
}

impl DiagnosticKind {
    /// Stable name of this kind, as it appears in serialized records
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticKind::SyntaxError => "SyntaxError",
            DiagnosticKind::OrderingViolation => "OrderingViolation",
            DiagnosticKind::DuplicateVertexId => "DuplicateVertexId",
            DiagnosticKind::DuplicateVertexCoordinate => "DuplicateVertexCoordinate",
            DiagnosticKind::UnreferencedVertex => "UnreferencedVertex",
            DiagnosticKind::EmptySection => "EmptySection",
            DiagnosticKind::InvalidPolygonName => "InvalidPolygonName",
            DiagnosticKind::UnknownVertexReference => "UnknownVertexReference",
            DiagnosticKind::DegeneratePolygon => "DegeneratePolygon",
            DiagnosticKind::DuplicatePolygonName => "DuplicatePolygonName",
            DiagnosticKind::DegenerateGeometry => "DegenerateGeometry",
            DiagnosticKind::GapDetected => "GapDetected",
            DiagnosticKind::OverlapDetected => "OverlapDetected",
            DiagnosticKind::DisconnectedGeometry => "DisconnectedGeometry",
            DiagnosticKind::StrandedVertex => "StrandedVertex",
        }
    }

    /// Whether this finding comes from the geometry engine
    ///
    /// Syntax and reference findings gate the geometry phase: a document
    /// that fails them is never handed to the boolean-ops backend.
    pub fn is_geometric(&self) -> bool {
        matches!(
            self,
            DiagnosticKind::DegenerateGeometry
                | DiagnosticKind::GapDetected
                | DiagnosticKind::OverlapDetected
                | DiagnosticKind::DisconnectedGeometry
                | DiagnosticKind::StrandedVertex
        )
    }
}

/// How a finding affects the validation outcome
///
/// Severity is binary: every rule currently enforced blocks acceptance.
/// The advisory level exists so the record shape stays stable if
/// non-blocking findings are added later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// The finding rejects the document
    Blocking,
    /// The finding is informational only
    Advisory,
}

/// One validation finding
///
/// Construction follows a builder pattern: the kind and message are
/// mandatory, location data is attached where the check can supply it.
///
/// # Example
///
/// ```
/// use geosection::{Diagnostic, DiagnosticKind};
///
/// let d = Diagnostic::new(DiagnosticKind::GapDetected, "uncovered area")
///     .with_area(2.5);
/// assert_eq!(d.area, Some(2.5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Classification of the finding
    pub kind: DiagnosticKind,
    /// Deterministic human-readable description
    pub message: String,
    /// 1-based source line, when the finding is tied to one record
    pub line: Option<usize>,
    /// Offending vertex ids, when attributable
    pub vertex_ids: Vec<u32>,
    /// Offending polygon full names, when attributable
    pub polygons: Vec<String>,
    /// Measured area in km², for gap and overlap findings
    pub area: Option<f64>,
    /// Whether the finding blocks acceptance
    pub severity: Severity,
}

impl Diagnostic {
    /// Create a blocking diagnostic
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
            vertex_ids: Vec::new(),
            polygons: Vec::new(),
            area: None,
            severity: Severity::Blocking,
        }
    }

    /// Attach the 1-based source line
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach offending vertex ids
    pub fn with_vertex_ids(mut self, ids: impl Into<Vec<u32>>) -> Self {
        self.vertex_ids = ids.into();
        self
    }

    /// Attach offending polygon full names
    pub fn with_polygons(mut self, names: impl Into<Vec<String>>) -> Self {
        self.polygons = names.into();
        self
    }

    /// Attach a measured area in km²
    pub fn with_area(mut self, area: f64) -> Self {
        self.area = Some(area);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "Line {}: {}", line, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Render an ordered diagnostics list as correction feedback text
///
/// One line per finding, in the order the validator produced them. This
/// is the human/LLM-readable rendering; the structured form is the
/// serde serialization of the records themselves.
pub fn render_report(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for diagnostic in diagnostics {
        out.push_str("- ");
        out.push_str(&diagnostic.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_line_when_present() {
        let d = Diagnostic::new(DiagnosticKind::SyntaxError, "Unrecognized line format: 'x'")
            .with_line(4);
        assert_eq!(d.to_string(), "Line 4: Unrecognized line format: 'x'");

        let d = Diagnostic::new(DiagnosticKind::GapDetected, "gaps remain");
        assert_eq!(d.to_string(), "gaps remain");
    }

    #[test]
    fn test_builder_attaches_location_data() {
        let d = Diagnostic::new(DiagnosticKind::OverlapDetected, "overlap")
            .with_polygons(vec!["layer1".to_string(), "layer2".to_string()])
            .with_area(0.25);
        assert_eq!(d.polygons, vec!["layer1", "layer2"]);
        assert_eq!(d.area, Some(0.25));
        assert_eq!(d.severity, Severity::Blocking);
    }

    #[test]
    fn test_geometric_kinds() {
        assert!(DiagnosticKind::GapDetected.is_geometric());
        assert!(DiagnosticKind::StrandedVertex.is_geometric());
        assert!(!DiagnosticKind::SyntaxError.is_geometric());
        assert!(!DiagnosticKind::DuplicatePolygonName.is_geometric());
    }

    #[test]
    fn test_report_renders_one_line_per_finding() {
        let report = render_report(&[
            Diagnostic::new(DiagnosticKind::GapDetected, "first").with_area(1.0),
            Diagnostic::new(DiagnosticKind::DisconnectedGeometry, "second"),
        ]);
        assert_eq!(report, "- first\n- second\n");
    }

    #[test]
    fn test_serializes_to_stable_json() {
        let d = Diagnostic::new(DiagnosticKind::StrandedVertex, "vertex 3 inside 'layer1'")
            .with_vertex_ids(vec![3])
            .with_polygons(vec!["layer1".to_string()]);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "StrandedVertex");
        assert_eq!(json["vertex_ids"][0], 3);
        assert_eq!(json["polygons"][0], "layer1");
        assert_eq!(json["severity"], "Blocking");
    }
}
