//! Planar geometry for coverage checking
//!
//! The heavy lifting — polygon union and intersection — goes through
//! the Clipper2 library, a robust polygon boolean-ops engine. Rings
//! are normalized to counter-clockwise orientation before clipping so
//! the non-zero fill rule gives plain union semantics regardless of
//! how a definition happened to wind its polygons.
//!
//! Clipper2 works on fixed-point coordinates; [`KmPrecision`] scales
//! kilometre inputs by 10⁶, keeping millimetre resolution through the
//! conversion. Everything else here — shoelace areas, containment and
//! edge tests, boundary adjacency — is direct arithmetic on the f64
//! rings.

use clipper2::*;

use crate::error::{Error, Result};

/// Absolute tolerance (km) for point-coincidence and edge tests
pub(crate) const POINT_EPSILON: f64 = 1e-9;

/// Fixed-point scaler for kilometre-unit sections
///
/// Six decimal digits survive the conversion to Clipper2's integer
/// grid; section coordinates stay far below the overflow range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KmPrecision;

impl PointScaler for KmPrecision {
    const MULTIPLIER: f64 = 1_000_000.0;
}

/// Signed area of an open ring via the shoelace formula
///
/// The closing edge from the last coordinate back to the first is
/// implicit. Counter-clockwise rings are positive. Rings with fewer
/// than three coordinates have zero area.
pub fn ring_signed_area(ring: &[(f64, f64)]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let (x1, z1) = ring[i];
        let (x2, z2) = ring[(i + 1) % ring.len()];
        sum += x1 * z2 - x2 * z1;
    }
    sum / 2.0
}

/// Normalize a ring to counter-clockwise orientation
fn oriented_ccw(ring: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if ring_signed_area(ring) < 0.0 {
        ring.iter().rev().copied().collect()
    } else {
        ring.to_vec()
    }
}

/// Union all rings and return the resulting boundary paths
///
/// Output paths carry Clipper2's orientation convention: outer
/// boundaries and holes have opposite signed areas, so summing signed
/// areas over all paths yields the net covered area.
fn union_rings(rings: &[Vec<(f64, f64)>]) -> Result<Vec<Vec<(f64, f64)>>> {
    if rings.is_empty() {
        return Ok(Vec::new());
    }

    let mut oriented: Vec<Vec<(f64, f64)>> = rings.iter().map(|r| oriented_ccw(r)).collect();

    if oriented.len() == 1 {
        let simplified = simplify::<KmPrecision>(oriented, POINT_EPSILON, false);
        return Ok(simplified.into());
    }

    let subject = vec![oriented.remove(0)];
    let result = union::<KmPrecision>(subject, oriented, FillRule::NonZero)
        .map_err(|e| Error::Geometry(format!("union failed: {:?}", e)))?;
    Ok(result.into())
}

/// Total area covered by the union of all rings (km²)
pub(crate) fn union_area(rings: &[Vec<(f64, f64)>]) -> Result<f64> {
    let paths = union_rings(rings)?;
    let net: f64 = paths.iter().map(|p| ring_signed_area(p)).sum();
    Ok(net.abs())
}

/// Area of the intersection of two rings (km²)
pub(crate) fn intersection_area(a: &[(f64, f64)], b: &[(f64, f64)]) -> Result<f64> {
    let result = intersect::<KmPrecision>(
        vec![oriented_ccw(a)],
        vec![oriented_ccw(b)],
        FillRule::NonZero,
    )
    .map_err(|e| Error::Geometry(format!("intersection failed: {:?}", e)))?;
    let paths: Vec<Vec<(f64, f64)>> = result.into();
    let net: f64 = paths.iter().map(|p| ring_signed_area(p)).sum();
    Ok(net.abs())
}

/// One overlapping polygon pair, by ring index
#[derive(Debug, Clone, Copy)]
pub(crate) struct PairOverlap {
    /// Index of the first ring
    pub a: usize,
    /// Index of the second ring
    pub b: usize,
    /// Intersection area (km²)
    pub area: f64,
}

/// Intersection areas of every ring pair
pub(crate) fn pairwise_overlaps(rings: &[Vec<(f64, f64)>]) -> Result<Vec<PairOverlap>> {
    let mut overlaps = Vec::new();
    for a in 0..rings.len() {
        for b in (a + 1)..rings.len() {
            let area = intersection_area(&rings[a], &rings[b])?;
            if area > 0.0 {
                overlaps.push(PairOverlap { a, b, area });
            }
        }
    }
    Ok(overlaps)
}

/// Whether two segments are collinear and overlap with positive length
fn segments_collinear_overlap(
    a1: (f64, f64),
    a2: (f64, f64),
    b1: (f64, f64),
    b2: (f64, f64),
) -> bool {
    let dx = a2.0 - a1.0;
    let dz = a2.1 - a1.1;
    let len = (dx * dx + dz * dz).sqrt();
    if len <= POINT_EPSILON {
        return false;
    }

    // Both endpoints of b must lie on the carrier line of a.
    let off1 = (dx * (b1.1 - a1.1) - dz * (b1.0 - a1.0)).abs() / len;
    let off2 = (dx * (b2.1 - a1.1) - dz * (b2.0 - a1.0)).abs() / len;
    if off1 > POINT_EPSILON || off2 > POINT_EPSILON {
        return false;
    }

    // Project b onto a and measure the shared interval in length units.
    let t1 = ((b1.0 - a1.0) * dx + (b1.1 - a1.1) * dz) / len;
    let t2 = ((b2.0 - a1.0) * dx + (b2.1 - a1.1) * dz) / len;
    let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
    hi.min(len) - lo.max(0.0) > POINT_EPSILON
}

/// Whether two rings share a boundary segment of positive length
///
/// Sharing an isolated point does not count: two polygons touching at
/// a single vertex do not form a contiguous region.
pub(crate) fn rings_share_boundary(a: &[(f64, f64)], b: &[(f64, f64)]) -> bool {
    for i in 0..a.len() {
        let a1 = a[i];
        let a2 = a[(i + 1) % a.len()];
        for j in 0..b.len() {
            let b1 = b[j];
            let b2 = b[(j + 1) % b.len()];
            if segments_collinear_overlap(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

/// Count connected components over an adjacency relation
///
/// `edges` lists undirected pairs of ring indices that touch along a
/// shared boundary or overlapping interior.
pub(crate) fn component_count(ring_count: usize, edges: &[(usize, usize)]) -> usize {
    if ring_count == 0 {
        return 0;
    }
    let mut adjacency = vec![Vec::new(); ring_count];
    for &(a, b) in edges {
        adjacency[a].push(b);
        adjacency[b].push(a);
    }

    let mut visited = vec![false; ring_count];
    let mut components = 0;
    let mut stack = Vec::new();
    for start in 0..ring_count {
        if visited[start] {
            continue;
        }
        components += 1;
        visited[start] = true;
        stack.push(start);
        while let Some(node) = stack.pop() {
            for &next in &adjacency[node] {
                if !visited[next] {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }
    }
    components
}

/// Whether a point lies strictly inside a ring (even-odd rule)
///
/// Points on the boundary are not classified reliably here; callers
/// test [`point_on_ring_edge`] first.
pub(crate) fn point_strictly_inside(point: (f64, f64), ring: &[(f64, f64)]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let (px, pz) = point;
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, zi) = ring[i];
        let (xj, zj) = ring[j];
        if (zi > pz) != (zj > pz) {
            let x_cross = xi + (pz - zi) * (xj - xi) / (zj - zi);
            if px < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Whether a point lies on one of a ring's edges, excluding endpoints
pub(crate) fn point_on_ring_edge(point: (f64, f64), ring: &[(f64, f64)]) -> bool {
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        if point_on_segment(point, a, b) {
            return true;
        }
    }
    false
}

fn point_on_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> bool {
    let dx = b.0 - a.0;
    let dz = b.1 - a.1;
    let len = (dx * dx + dz * dz).sqrt();
    if len <= POINT_EPSILON {
        return false;
    }
    let offset = (dx * (p.1 - a.1) - dz * (p.0 - a.0)).abs() / len;
    if offset > POINT_EPSILON {
        return false;
    }
    let t = ((p.0 - a.0) * dx + (p.1 - a.1) * dz) / len;
    t > POINT_EPSILON && t < len - POINT_EPSILON
}
