//! Core cross-section types
//!
//! A cross-section document is a vertex table plus an ordered list of
//! named polygons. Vertices carry kilometre coordinates: `x` runs along
//! the section, `z` is depth and never rises above the surface (z = 0).
//! Polygons reference vertices by id; they never copy coordinates. The
//! bounding rectangle is derived from the full vertex set, not declared.

use std::collections::HashMap;

/// A single vertex of the cross-section
///
/// Coordinates are in kilometres. Depth `z` is zero at the surface and
/// negative below it.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Unique non-negative id, as written in the definition
    pub id: u32,
    /// Horizontal position along the section (km)
    pub x: f64,
    /// Depth (km, ≤ 0)
    pub z: f64,
    /// 1-based source line of the declaring record (0 when synthetic)
    pub line: usize,
}

impl Vertex {
    /// Create a vertex without source-line metadata
    pub fn new(id: u32, x: f64, z: f64) -> Self {
        Self { id, x, z, line: 0 }
    }
}

// Source lines are diagnostics metadata, not identity: two documents
// with the same vertices and polygons compare equal even if comments or
// blank lines shifted the records around.
impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.x == other.x && self.z == other.z
    }
}

/// The ordered, id-indexed vertex table of one document
///
/// Insertion order is the declaration order of the definition; it is
/// kept for diagnostics and canonical serialization, lookups go through
/// the id index.
#[derive(Debug, Clone, Default)]
pub struct VertexTable {
    entries: Vec<Vertex>,
    index: HashMap<u32, usize>,
}

impl VertexTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vertex, replacing nothing
    ///
    /// The parser rejects duplicate ids before insertion; inserting an
    /// id that is already present is a caller bug and is ignored here.
    pub(crate) fn insert(&mut self, vertex: Vertex) {
        if self.index.contains_key(&vertex.id) {
            return;
        }
        self.index.insert(vertex.id, self.entries.len());
        self.entries.push(vertex);
    }

    /// Look up a vertex by id
    pub fn get(&self, id: u32) -> Option<&Vertex> {
        self.index.get(&id).map(|&i| &self.entries[i])
    }

    /// Whether the table contains the id
    pub fn contains(&self, id: u32) -> bool {
        self.index.contains_key(&id)
    }

    /// Vertices in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Vertex> {
        self.entries.iter()
    }

    /// Number of vertices
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for VertexTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

/// A polygon name: a base identifier with an optional `^part` suffix
///
/// Multi-part geological bodies (a salt layer split by a diapir, the
/// two blocks of a faulted layer) share a base name and differ in the
/// part: `salt^left`, `salt^right`. Full names are unique per document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PolygonName {
    base: String,
    part: Option<String>,
}

impl PolygonName {
    /// Build a name from already-validated components
    pub(crate) fn new(base: impl Into<String>, part: Option<String>) -> Self {
        Self {
            base: base.into(),
            part,
        }
    }

    /// The base identifier
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The part suffix, if any
    pub fn part(&self) -> Option<&str> {
        self.part.as_deref()
    }

    /// The full name as written: `base` or `base^part`
    pub fn full(&self) -> String {
        match &self.part {
            Some(part) => format!("{}^{}", self.base, part),
            None => self.base.clone(),
        }
    }
}

impl std::fmt::Display for PolygonName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.part {
            Some(part) => write!(f, "{}^{}", self.base, part),
            None => f.write_str(&self.base),
        }
    }
}

/// Whether `s` matches the identifier grammar `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A named polygon: an ordered ring of vertex-id references
///
/// The ring is implicitly closed; the last vertex connects back to the
/// first. Ids resolve against the document's vertex table.
#[derive(Debug, Clone)]
pub struct Polygon {
    /// The polygon's name
    pub name: PolygonName,
    /// Ordered vertex ids of the ring, length ≥ 3
    pub vertex_ids: Vec<u32>,
    /// 1-based source line of the declaring record (0 when synthetic)
    pub line: usize,
}

impl Polygon {
    /// Create a polygon without source-line metadata
    pub fn new(name: PolygonName, vertex_ids: Vec<u32>) -> Self {
        Self {
            name,
            vertex_ids,
            line: 0,
        }
    }
}

impl PartialEq for Polygon {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.vertex_ids == other.vertex_ids
    }
}

/// The axis-aligned rectangle spanning all vertices of a document
///
/// This is the ground truth for coverage: a valid section's polygons
/// tile exactly this rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRect {
    /// Smallest x over all vertices (km)
    pub min_x: f64,
    /// Largest x over all vertices (km)
    pub max_x: f64,
    /// Smallest (deepest) z over all vertices (km)
    pub min_z: f64,
    /// Largest (shallowest) z over all vertices (km)
    pub max_z: f64,
}

impl BoundingRect {
    /// Derive the rectangle from a set of vertices; `None` when empty
    pub fn from_vertices<'a>(vertices: impl Iterator<Item = &'a Vertex>) -> Option<Self> {
        let mut rect: Option<BoundingRect> = None;
        for v in vertices {
            let r = rect.get_or_insert(BoundingRect {
                min_x: v.x,
                max_x: v.x,
                min_z: v.z,
                max_z: v.z,
            });
            r.min_x = r.min_x.min(v.x);
            r.max_x = r.max_x.max(v.x);
            r.min_z = r.min_z.min(v.z);
            r.max_z = r.max_z.max(v.z);
        }
        rect
    }

    /// Horizontal extent (km)
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Vertical extent (km)
    pub fn depth(&self) -> f64 {
        self.max_z - self.min_z
    }

    /// Area (km²)
    pub fn area(&self) -> f64 {
        self.width() * self.depth()
    }

    /// The rectangle's corner ring, counter-clockwise
    pub fn ring(&self) -> Vec<(f64, f64)> {
        vec![
            (self.min_x, self.min_z),
            (self.max_x, self.min_z),
            (self.max_x, self.max_z),
            (self.min_x, self.max_z),
        ]
    }
}

/// One parsed cross-section definition
///
/// A document is created fresh by each parse attempt and never mutated:
/// a repaired section is a new parse of regenerated text. Use
/// [`crate::validate_text`] to obtain a validated document, or
/// `Document::from_str` for a strict parse without geometry checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    vertices: VertexTable,
    polygons: Vec<Polygon>,
}

impl Document {
    pub(crate) fn new(vertices: VertexTable, polygons: Vec<Polygon>) -> Self {
        Self { vertices, polygons }
    }

    /// The vertex table
    pub fn vertices(&self) -> &VertexTable {
        &self.vertices
    }

    /// Shorthand for vertex lookup by id
    pub fn vertex(&self, id: u32) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    /// Polygons in declaration order
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// The derived bounding rectangle; `None` for an empty vertex table
    pub fn bounding_rect(&self) -> Option<BoundingRect> {
        BoundingRect::from_vertices(self.vertices.iter())
    }

    /// Resolve a polygon's ring to coordinates, in declaration order
    ///
    /// The ring is open; the closing edge back to the first coordinate
    /// is implicit. Ids without a table entry are skipped, which cannot
    /// happen for a parsed document.
    pub fn ring(&self, polygon: &Polygon) -> Vec<(f64, f64)> {
        polygon
            .vertex_ids
            .iter()
            .filter_map(|&id| self.vertices.get(id))
            .map(|v| (v.x, v.z))
            .collect()
    }
}

/// Tolerances for the validator
///
/// The gap/overlap threshold is relative to the bounding-rectangle
/// area: a finding fires when the measured area exceeds
/// `area_tolerance × rectangle_area`. The surface epsilon absorbs
/// rounding on surface vertices whose depth lands a hair above zero.
///
/// # Example
///
/// ```
/// use geosection::ValidatorConfig;
///
/// let config = ValidatorConfig::new().with_area_tolerance(1e-9);
/// assert_eq!(config.area_tolerance, 1e-9);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ValidatorConfig {
    /// Relative area tolerance for gap/overlap/degeneracy checks
    pub area_tolerance: f64,
    /// Absolute tolerance (km) for `z ≤ 0` on surface vertices
    pub surface_epsilon: f64,
}

impl ValidatorConfig {
    /// Default tolerances: `1e-6` relative area, `1e-9` km surface slack
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the relative area tolerance
    pub fn with_area_tolerance(mut self, tolerance: f64) -> Self {
        self.area_tolerance = tolerance;
        self
    }

    /// Set the surface epsilon
    pub fn with_surface_epsilon(mut self, epsilon: f64) -> Self {
        self.surface_epsilon = epsilon;
        self
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            area_tolerance: 1e-6,
            surface_epsilon: 1e-9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_table_lookup() {
        let mut table = VertexTable::new();
        table.insert(Vertex::new(0, 0.0, 0.0));
        table.insert(Vertex::new(5, 20.0, -5.0));

        assert_eq!(table.len(), 2);
        assert!(table.contains(5));
        assert!(!table.contains(1));
        assert_eq!(table.get(5).unwrap().x, 20.0);
        // Declaration order survives
        let ids: Vec<u32> = table.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![0, 5]);
    }

    #[test]
    fn test_polygon_name_full() {
        let plain = PolygonName::new("basement", None);
        assert_eq!(plain.full(), "basement");
        assert_eq!(plain.part(), None);

        let parted = PolygonName::new("salt", Some("left".to_string()));
        assert_eq!(parted.full(), "salt^left");
        assert_eq!(parted.base(), "salt");
        assert_eq!(parted.part(), Some("left"));
        assert_eq!(parted.to_string(), "salt^left");
    }

    #[test]
    fn test_identifier_grammar() {
        assert!(is_identifier("layer1"));
        assert!(is_identifier("_fault"));
        assert!(is_identifier("Salt_Dome"));
        assert!(!is_identifier("1name"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("bad-name"));
        assert!(!is_identifier("has space"));
    }

    #[test]
    fn test_bounding_rect_from_vertices() {
        let vertices = vec![
            Vertex::new(0, 0.0, 0.0),
            Vertex::new(1, 20.0, 0.0),
            Vertex::new(2, 20.0, -5.0),
            Vertex::new(3, 0.0, -5.0),
        ];
        let rect = BoundingRect::from_vertices(vertices.iter()).unwrap();
        assert_eq!(rect.width(), 20.0);
        assert_eq!(rect.depth(), 5.0);
        assert_eq!(rect.area(), 100.0);

        assert!(BoundingRect::from_vertices(std::iter::empty::<&Vertex>()).is_none());
    }

    #[test]
    fn test_equality_ignores_source_lines() {
        let mut a = Vertex::new(1, 2.0, -3.0);
        a.line = 10;
        let mut b = Vertex::new(1, 2.0, -3.0);
        b.line = 99;
        assert_eq!(a, b);

        let name = PolygonName::new("layer", None);
        let mut p = Polygon::new(name.clone(), vec![0, 1, 2]);
        p.line = 7;
        let q = Polygon::new(name, vec![0, 1, 2]);
        assert_eq!(p, q);
    }
}
