//! Validity diagnosis for assembled rings. A ring polygon is valid when
//! its exterior is simple: no vertex visited twice, no two edges meeting
//! outside a shared endpoint.

use crate::geometry::{intersection, outside_x_range, y_range_overlap, Position, UndirectedSegment};
use fnv::FnvHashSet;
use geo::{BooleanOps, MultiPolygon, Polygon};

pub fn polygon_is_valid(polygon: &Polygon<f64>) -> bool {
    invalidity_reason(polygon).is_none()
}

/// Why a polygon is invalid, or `None` if it is fine. The returned
/// string has the form `"<reason> [<lon> <lat>]"` with the coordinates
/// of the first flaw found. Rings too short to form a polygon are
/// reported through other channels and not diagnosed here.
pub fn invalidity_reason(polygon: &Polygon<f64>) -> Option<String> {
    let coords = &polygon.exterior().0;
    let points: Vec<Position> = coords.iter().map(|c| Position::new(c.x, c.y)).collect();

    // interior vertices must be unique, only the closing node repeats
    let mut seen: FnvHashSet<Position> = FnvHashSet::default();
    for point in &points[..points.len().saturating_sub(1)] {
        if !seen.insert(*point) {
            return Some(format!(
                "Ring Self-intersection [{} {}]",
                point.lon(),
                point.lat()
            ));
        }
    }

    // with unique vertices no two edges can be equal, so only proper
    // crossings remain to be checked
    let mut segments: Vec<UndirectedSegment> = points
        .windows(2)
        .map(|pair| UndirectedSegment::new(pair[0], pair[1], 0, 0))
        .collect();
    segments.sort_unstable();

    for (i, s1) in segments.iter().enumerate() {
        for s2 in &segments[i + 1..] {
            if outside_x_range(s2, s1) {
                break;
            }
            if y_range_overlap(s1, s2) {
                if let Some(point) = intersection(s1, s2) {
                    return Some(format!(
                        "Self-intersection [{} {}]",
                        point.lon(),
                        point.lat()
                    ));
                }
            }
        }
    }

    None
}

/// Zero-width repair for an invalid ring polygon: dissolve the exterior
/// with a boolean self-union. The result is accepted only if it came
/// back as a single simple polygon with more than three points and no
/// interior rings.
pub fn repair(polygon: &Polygon<f64>) -> Option<Polygon<f64>> {
    let MultiPolygon(mut polygons) = polygon.union(polygon);
    if polygons.len() != 1 {
        return None;
    }
    let repaired = polygons.pop().unwrap();
    if repaired.exterior().0.len() <= 3 {
        return None;
    }
    if !repaired.interiors().is_empty() {
        return None;
    }
    if !polygon_is_valid(&repaired) {
        return None;
    }
    Some(repaired)
}
