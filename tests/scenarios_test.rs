//! Integration tests for cross-section validation
//!
//! These exercise the full parse-and-validate pipeline on realistic
//! section definitions: a single layer, faulted layers with broken and
//! repaired topology, and the headline failure modes.

use geosection::{DiagnosticKind, Document, ValidatorConfig, Validation, validate_text};

fn validate(text: &str) -> Validation {
    validate_text(text, &ValidatorConfig::default())
}

fn kinds(validation: &Validation) -> Vec<DiagnosticKind> {
    validation.diagnostics().iter().map(|d| d.kind).collect()
}

/// A 20 km x 5 km section holding a single layer
const SINGLE_LAYER: &str = "\
0 0 0
1 20 0
2 20 -5
3 0 -5
layer 0 1 2 3
";

/// A faulted section with broken topology: the footwall's fault edge
/// bends through vertices 8 and 9 while the hanging wall cuts straight
/// from the fault trace to the fault foot, leaving a 2.5 km² sliver
/// uncovered and the two blocks disconnected.
const FAULT_BROKEN: &str = "\
0 0 0        # top-left corner
1 10 0       # fault trace at surface
2 20 0       # top-right corner
3 20 -5      # bottom-right corner
4 12.5 -5    # fault foot at base
5 0 -5       # bottom-left corner
8 10.5 -2    # fault bend, upper
9 11 -4      # fault bend, lower
footwall 0 1 8 9 4 5
hangingwall 1 2 3 4
";

/// The same section after adding the shared fault-bend vertices 8 and 9
/// to the hanging wall as well; both blocks now follow the same fault
/// line and tile the rectangle exactly.
const FAULT_REPAIRED: &str = "\
0 0 0        # top-left corner
1 10 0       # fault trace at surface
2 20 0       # top-right corner
3 20 -5      # bottom-right corner
4 12.5 -5    # fault foot at base
5 0 -5       # bottom-left corner
8 10.5 -2    # fault bend, upper
9 11 -4      # fault bend, lower
footwall 0 1 8 9 4 5
hangingwall 1 2 3 4 9 8
";

#[test]
fn test_single_rectangle_layer_is_valid() {
    let validation = validate(SINGLE_LAYER);
    assert!(
        validation.is_valid(),
        "unexpected findings: {:?}",
        validation.diagnostics()
    );

    let document = validation.into_document().unwrap();
    let rect = document.bounding_rect().unwrap();
    assert_eq!(rect.area(), 100.0);
    assert_eq!(
        geosection::geometry::ring_signed_area(&rect.ring()),
        100.0,
        "the rectangle's own ring is counter-clockwise"
    );

    let ring = document.ring(&document.polygons()[0]);
    let area = geosection::geometry::ring_signed_area(&ring).abs();
    assert!((area - 100.0).abs() < 1e-9, "polygon area was {}", area);
}

#[test]
fn test_broken_fault_reports_gap_and_disconnection() {
    let validation = validate(FAULT_BROKEN);
    assert!(!validation.is_valid());

    let found = kinds(&validation);
    assert!(
        found.contains(&DiagnosticKind::GapDetected),
        "expected a gap finding, got {:?}",
        found
    );
    assert!(
        found.contains(&DiagnosticKind::DisconnectedGeometry),
        "expected a disconnection finding, got {:?}",
        found
    );

    let gap = validation
        .diagnostics()
        .iter()
        .find(|d| d.kind == DiagnosticKind::GapDetected)
        .unwrap();
    let area = gap.area.expect("gap finding carries the measured area");
    assert!((area - 2.5).abs() < 1e-6, "gap area was {}", area);
    assert!(gap.message.contains("inside the bounding rectangle"));

    let disconnected = validation
        .diagnostics()
        .iter()
        .find(|d| d.kind == DiagnosticKind::DisconnectedGeometry)
        .unwrap();
    assert!(
        disconnected
            .message
            .contains("do not form a single contiguous shape")
    );
}

#[test]
fn test_repaired_fault_is_valid() {
    let validation = validate(FAULT_REPAIRED);
    assert!(
        validation.is_valid(),
        "unexpected findings: {:?}",
        validation.diagnostics()
    );
}

#[test]
fn test_shared_full_edge_is_neither_gap_nor_overlap() {
    // Two layers share the edge 3-2; the boundary between them must
    // not register as a gap or an overlap.
    let text = "\
0 0 0
1 20 0
2 20 -2
3 0 -2
4 20 -5
5 0 -5
upper 0 1 2 3
lower 3 2 4 5
";
    let validation = validate(text);
    assert!(
        validation.is_valid(),
        "unexpected findings: {:?}",
        validation.diagnostics()
    );
}

#[test]
fn test_duplicate_polygon_name_gates_geometry() {
    let text = "\
0 0 0
1 20 0
2 20 -5
3 0 -5
layer1 0 1 2 3
layer1 0 1 2 3
";
    let validation = validate(text);
    let found = kinds(&validation);
    assert!(found.contains(&DiagnosticKind::DuplicatePolygonName));
    assert!(
        found.iter().all(|k| !k.is_geometric()),
        "no geometric check may run on a rejected parse: {:?}",
        found
    );
}

#[test]
fn test_digit_leading_polygon_name_is_rejected() {
    let text = "\
0 0 0
1 20 0
2 20 -5
3 0 -5
1name 0 1 2 3
";
    let validation = validate(text);
    let finding = validation
        .diagnostics()
        .iter()
        .find(|d| d.kind == DiagnosticKind::InvalidPolygonName)
        .expect("expected an invalid-name finding");
    assert!(finding.message.contains("cannot start with a number"));
}

#[test]
fn test_unknown_reference_regardless_of_position() {
    // Leading, middle and trailing positions of the missing id all
    // produce the same finding.
    for text in [
        "0 0 0\n1 20 0\n2 20 -5\nlayer 99 0 1 2\n",
        "0 0 0\n1 20 0\n2 20 -5\nlayer 0 99 1 2\n",
        "0 0 0\n1 20 0\n2 20 -5\nlayer 0 1 2 99\n",
    ] {
        let validation = validate(text);
        let unknown = validation
            .diagnostics()
            .iter()
            .find(|d| d.kind == DiagnosticKind::UnknownVertexReference)
            .unwrap_or_else(|| panic!("expected unknown reference for {:?}", text));
        assert_eq!(unknown.vertex_ids, vec![99]);
    }
}

#[test]
fn test_strict_parse_accepts_what_validation_accepts() {
    let document: Document = FAULT_REPAIRED.parse().unwrap();
    assert_eq!(document.vertices().len(), 8);
    assert_eq!(document.polygons().len(), 2);

    // Ids jump from 5 to 8; only uniqueness is enforced.
    assert!(document.vertex(8).is_some());
    assert!(document.vertex(6).is_none());
}

#[test]
fn test_multiple_geometric_findings_in_one_attempt() {
    // A gap on the left AND an overlap on the right, reported together.
    let text = "\
0 0 0
1 8 0
2 8 -5
3 0 -5
4 10 0
5 20 0
6 20 -5
7 10 -5
8 12 0
9 18 0
10 18 -5
11 12 -5
left 0 1 2 3
right 4 5 6 7
inset 8 9 10 11
";
    let validation = validate(text);
    let found = kinds(&validation);
    assert!(found.contains(&DiagnosticKind::GapDetected));
    assert!(found.contains(&DiagnosticKind::OverlapDetected));
}
