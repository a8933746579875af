//! Polygon geometry kernel.
//!
//! Pure functions over image-space points: containment, segment projection,
//! edge and vertex hit-testing, perimeter, nearest-neighbour reordering and
//! perimeter-equidistant resampling. Nothing in here holds state.

use serde::{Deserialize, Serialize};

use crate::constants::MIN_POLYGON_VERTICES;

/// Perimeters shorter than this are treated as a collapsed polygon.
const DEGENERATE_PERIMETER: f32 = 1e-6;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// This point shifted by `delta`.
    pub fn translated(self, delta: Offset) -> Self {
        Self::new(self.x + delta.dx, self.y + delta.dy)
    }

    /// Offset that carries `from` onto `self`.
    pub fn offset_from(self, from: Point) -> Offset {
        Offset::new(self.x - from.x, self.y - from.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// A translation vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub dx: f32,
    pub dy: f32,
}

impl Offset {
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

/// Projection of a point onto a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Closest point on the segment.
    pub point: Point,
    /// Distance from the query point to `point`.
    pub distance: f32,
    /// Clamped projection parameter along the segment, in `[0, 1]`.
    pub t: f32,
}

/// An edge that lies within hit distance of a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeHit {
    /// Index of the edge's first vertex; the edge runs to `edge_index + 1 mod N`.
    pub edge_index: usize,
    /// Projection of the query point onto that edge.
    pub point: Point,
}

/// The vertex nearest to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    pub index: usize,
    pub distance: f32,
}

/// Even-odd ray casting test.
///
/// Edges are walked as `(i, i - 1 mod N)`; the strict `>` comparison on the
/// endpoint ordinates keeps a ray passing through a vertex from being
/// counted twice. Fewer than three points never contain anything.
pub fn is_point_in_polygon(p: Point, points: &[Point]) -> bool {
    if points.len() < MIN_POLYGON_VERTICES {
        return false;
    }

    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let vi = points[i];
        let vj = points[j];
        if (vi.y > p.y) != (vj.y > p.y) && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Project `p` onto the segment `a`-`b`, clamping to the endpoints.
pub fn closest_point_on_segment(p: Point, a: Point, b: Point) -> SegmentProjection {
    let ex = b.x - a.x;
    let ey = b.y - a.y;
    let len_sq = ex * ex + ey * ey;

    // Zero-length segment: everything projects onto `a`.
    let t = if len_sq > 0.0 {
        (((p.x - a.x) * ex + (p.y - a.y) * ey) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let point = Point::new(a.x + t * ex, a.y + t * ey);
    SegmentProjection {
        point,
        distance: p.distance_to(point),
        t,
    }
}

/// Find the first edge `(i, i + 1 mod N)` closer than `threshold` to `p`.
///
/// Projections landing on an endpoint (`t` of exactly 0 or 1) are ignored so
/// that vertex hits stay with [`find_closest_point`].
pub fn point_near_edge(p: Point, points: &[Point], threshold: f32) -> Option<EdgeHit> {
    let n = points.len();
    (0..n).find_map(|i| {
        let proj = closest_point_on_segment(p, points[i], points[(i + 1) % n]);
        (proj.distance < threshold && proj.t > 0.0 && proj.t < 1.0).then_some(EdgeHit {
            edge_index: i,
            point: proj.point,
        })
    })
}

/// Nearest vertex to `p`; ties resolve to the lowest index.
pub fn find_closest_point(points: &[Point], p: Point) -> Option<ClosestPoint> {
    let mut best: Option<ClosestPoint> = None;
    for (index, vertex) in points.iter().enumerate() {
        let distance = vertex.distance_to(p);
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(ClosestPoint { index, distance });
        }
    }
    best
}

/// Length of the closed outline through `points`.
pub fn perimeter(points: &[Point]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| points[i].distance_to(points[(i + 1) % n]))
        .sum()
}

/// Greedy nearest-neighbour ordering starting at `points[0]`.
///
/// This is a heuristic: out-of-order clicks on concave outlines can still
/// produce a self-intersecting result, and nothing here tries to untangle it.
pub fn reorder_points(points: &[Point]) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut remaining = points[1..].to_vec();
    let mut ordered = Vec::with_capacity(points.len());
    let mut last = points[0];
    ordered.push(last);

    while !remaining.is_empty() {
        let Some(nearest) = find_closest_point(&remaining, last) else {
            break;
        };
        last = remaining.remove(nearest.index);
        ordered.push(last);
    }
    ordered
}

/// Resample the closed outline of `original` into `target` points spaced at
/// equal arc length, starting at `original[0]`.
///
/// The walk always follows the anchor outline, never a previously resampled
/// one, so repeated calls do not drift. Targets at or below the anchor's own
/// vertex count return the anchor unchanged.
pub fn equidistant_points(original: &[Point], target: usize) -> Vec<Point> {
    let n = original.len();
    if n < MIN_POLYGON_VERTICES || target <= n {
        return original.to_vec();
    }

    let total = perimeter(original);
    if total <= DEGENERATE_PERIMETER {
        log::warn!("Resample skipped: outline perimeter is degenerate");
        return original.to_vec();
    }

    let spacing = total / target as f32;
    let mut out = Vec::with_capacity(target);
    let mut current = original[0];
    let mut index = 0;
    let mut remaining = spacing;
    out.push(current);

    // Each step either reaches the next anchor vertex or emits a point.
    let max_steps = 2 * (target + n);
    let mut steps = 0;
    while out.len() < target {
        steps += 1;
        if steps > max_steps {
            log::warn!(
                "Resample walk stopped after {} steps with {}/{} points",
                max_steps,
                out.len(),
                target
            );
            break;
        }

        let next_index = (index + 1) % n;
        let next = original[next_index];
        let edge = current.distance_to(next);

        if edge < remaining {
            current = next;
            index = next_index;
            remaining -= edge;
        } else {
            let ratio = remaining / edge;
            current = Point::new(
                current.x + (next.x - current.x) * ratio,
                current.y + (next.y - current.y) * ratio,
            );
            out.push(current);
            remaining = spacing;
        }
    }

    out.truncate(target);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_point_in_square() {
        let sq = square();
        assert!(is_point_in_polygon(Point::new(5.0, 5.0), &sq));
        assert!(!is_point_in_polygon(Point::new(15.0, 5.0), &sq));
        assert!(!is_point_in_polygon(Point::new(5.0, -0.5), &sq));
    }

    #[test]
    fn test_point_in_degenerate_polygon() {
        let line = [Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
        assert!(!is_point_in_polygon(Point::new(5.0, 5.0), &line));
        assert!(!is_point_in_polygon(Point::new(0.0, 0.0), &[]));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // U shape opening upwards
        let u = [
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 30.0),
            Point::new(20.0, 30.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 30.0),
            Point::new(0.0, 30.0),
        ];
        assert!(is_point_in_polygon(Point::new(5.0, 20.0), &u));
        assert!(!is_point_in_polygon(Point::new(15.0, 20.0), &u));
        assert!(is_point_in_polygon(Point::new(15.0, 5.0), &u));
    }

    #[test]
    fn test_segment_projection_clamps() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);

        let mid = closest_point_on_segment(Point::new(4.0, 3.0), a, b);
        assert_eq!(mid.point, Point::new(4.0, 0.0));
        assert!(approx_eq(mid.distance, 3.0));
        assert!(approx_eq(mid.t, 0.4));

        let before = closest_point_on_segment(Point::new(-3.0, 4.0), a, b);
        assert_eq!(before.point, a);
        assert_eq!(before.t, 0.0);
        assert!(approx_eq(before.distance, 5.0));

        let after = closest_point_on_segment(Point::new(13.0, 0.0), a, b);
        assert_eq!(after.point, b);
        assert_eq!(after.t, 1.0);
    }

    #[test]
    fn test_segment_projection_zero_length() {
        let a = Point::new(2.0, 2.0);
        let proj = closest_point_on_segment(Point::new(5.0, 6.0), a, a);
        assert_eq!(proj.point, a);
        assert_eq!(proj.t, 0.0);
        assert!(approx_eq(proj.distance, 5.0));
    }

    #[test]
    fn test_point_near_edge_bottom() {
        let hit = point_near_edge(Point::new(5.0, -1.0), &square(), 2.0).unwrap();
        assert_eq!(hit.edge_index, 0);
        assert!(approx_eq(hit.point.x, 5.0));
        assert!(approx_eq(hit.point.y, 0.0));
    }

    #[test]
    fn test_point_near_edge_closing_edge() {
        // Left side is the implied edge from the last vertex back to the first
        let hit = point_near_edge(Point::new(-1.0, 5.0), &square(), 2.0).unwrap();
        assert_eq!(hit.edge_index, 3);
        assert!(approx_eq(hit.point.x, 0.0));
        assert!(approx_eq(hit.point.y, 5.0));
    }

    #[test]
    fn test_point_near_edge_ignores_vertices_and_far_points() {
        let sq = square();
        // Outside the corner: projections clamp to t = 0 or 1
        assert!(point_near_edge(Point::new(-1.0, -1.0), &sq, 2.0).is_none());
        assert!(point_near_edge(Point::new(5.0, -5.0), &sq, 2.0).is_none());
    }

    #[test]
    fn test_find_closest_point() {
        let sq = square();
        let c = find_closest_point(&sq, Point::new(9.0, 8.0)).unwrap();
        assert_eq!(c.index, 2);
        assert!(approx_eq(c.distance, (1.0f32 + 4.0).sqrt()));
        assert!(find_closest_point(&[], Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_find_closest_point_tie_takes_lowest_index() {
        let sq = square();
        let c = find_closest_point(&sq, Point::new(5.0, 0.0)).unwrap();
        assert_eq!(c.index, 0);
    }

    #[test]
    fn test_perimeter_square() {
        assert!(approx_eq(perimeter(&square()), 40.0));
    }

    #[test]
    fn test_reorder_points_nearest_neighbour() {
        let clicks = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ];
        let ordered = reorder_points(&clicks);
        assert_eq!(ordered.len(), 4);
        assert_eq!(ordered[0], Point::new(0.0, 0.0));
        // (10,0) and (0,10) tie from the origin; the earlier one wins
        assert_eq!(ordered[1], Point::new(10.0, 0.0));
        assert_eq!(ordered[2], Point::new(10.0, 10.0));
        assert_eq!(ordered[3], Point::new(0.0, 10.0));
    }

    #[test]
    fn test_reorder_short_input_unchanged() {
        let two = [Point::new(3.0, 3.0), Point::new(1.0, 1.0)];
        assert_eq!(reorder_points(&two), two.to_vec());
    }

    #[test]
    fn test_equidistant_square_eight() {
        let sq = square();
        let points = equidistant_points(&sq, 8);
        assert_eq!(points.len(), 8);
        assert_eq!(points[0], sq[0]);

        let spacing = perimeter(&sq) / 8.0;
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            // Every other sample sits on a corner, so measure along the outline
            let along = (b.x - a.x).abs() + (b.y - a.y).abs();
            assert!(approx_eq(along, spacing), "gap {} at {}", along, i);
        }
    }

    #[test]
    fn test_equidistant_odd_count_lands_on_outline() {
        let sq = square();
        let points = equidistant_points(&sq, 7);
        assert_eq!(points.len(), 7);
        for p in &points {
            let on_edge = approx_eq(p.x, 0.0)
                || approx_eq(p.x, 10.0)
                || approx_eq(p.y, 0.0)
                || approx_eq(p.y, 10.0);
            assert!(on_edge, "{:?} left the outline", p);
        }
    }

    #[test]
    fn test_equidistant_never_reduces() {
        let sq = square();
        assert_eq!(equidistant_points(&sq, 4), sq);
        assert_eq!(equidistant_points(&sq, 2), sq);
    }

    #[test]
    fn test_equidistant_degenerate_outline() {
        let collapsed = vec![Point::new(1.0, 1.0); 3];
        assert_eq!(equidistant_points(&collapsed, 10), collapsed);
    }

    #[test]
    fn test_equidistant_large_target() {
        let sq = square();
        let points = equidistant_points(&sq, 100);
        assert_eq!(points.len(), 100);
    }

    #[test]
    fn test_translate_and_offset() {
        let p = Point::new(1.0, 2.0).translated(Offset::new(3.0, -1.0));
        assert_eq!(p, Point::new(4.0, 1.0));
        assert_eq!(p.offset_from(Point::new(1.0, 1.0)), Offset::new(3.0, 0.0));
    }
}
