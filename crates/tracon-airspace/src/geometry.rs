//! Planar polygon tests used by airspace boundaries, restricted areas,
//! and terrain containment. Coordinates are kilometres east/north.

use glam::DVec2;

/// A simple polygon ring. Vertices in order, not closed (the last vertex
/// connects back to the first implicitly).
pub type Polygon = Vec<DVec2>;

/// Ray-casting point-in-polygon test.
pub fn point_in_polygon(point: DVec2, polygon: &[DVec2]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Shortest distance from a point to a polygon's boundary (km).
/// Zero only when the point lies exactly on an edge.
pub fn distance_to_polygon(point: DVec2, polygon: &[DVec2]) -> f64 {
    let n = polygon.len();
    if n == 0 {
        return f64::INFINITY;
    }
    if n == 1 {
        return point.distance(polygon[0]);
    }
    let mut best = f64::INFINITY;
    let mut j = n - 1;
    for i in 0..n {
        let d = point_segment_distance(point, polygon[j], polygon[i]);
        if d < best {
            best = d;
        }
        j = i;
    }
    best
}

/// Distance from a point to a line segment.
fn point_segment_distance(point: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < f64::EPSILON {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}
