//! The polygon being drawn.

use crate::constants::MIN_POLYGON_VERTICES;
use crate::geometry::{ClosestPoint, Point, find_closest_point};

/// Ordered vertices of a polygon that has not been committed yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    points: Vec<Point>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether there are enough vertices to commit.
    pub fn can_commit(&self) -> bool {
        self.points.len() >= MIN_POLYGON_VERTICES
    }

    /// Append a vertex and return its index.
    pub fn push(&mut self, point: Point) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Option<Point> {
        (index < self.points.len()).then(|| self.points.remove(index))
    }

    /// Closest vertex within `tolerance` (inclusive).
    pub fn vertex_within(&self, p: Point, tolerance: f32) -> Option<ClosestPoint> {
        find_closest_point(&self.points, p).filter(|c| c.distance <= tolerance)
    }

    /// Whether `p` is within `threshold` of the first vertex.
    pub fn closes_at(&self, p: Point, threshold: f32) -> bool {
        self.can_commit()
            && self
                .points
                .first()
                .is_some_and(|first| first.distance_to(p) <= threshold)
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Hand the vertices over and leave the draft empty.
    pub fn take(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_remove() {
        let mut draft = Draft::new();
        assert_eq!(draft.push(Point::new(1.0, 1.0)), 0);
        assert_eq!(draft.push(Point::new(2.0, 2.0)), 1);
        assert_eq!(draft.remove(0), Some(Point::new(1.0, 1.0)));
        assert_eq!(draft.remove(5), None);
        assert_eq!(draft.points(), &[Point::new(2.0, 2.0)]);
    }

    #[test]
    fn test_vertex_within_is_inclusive() {
        let mut draft = Draft::new();
        draft.push(Point::new(0.0, 0.0));
        assert!(draft.vertex_within(Point::new(3.0, 4.0), 5.0).is_some());
        assert!(draft.vertex_within(Point::new(3.0, 4.1), 5.0).is_none());
    }

    #[test]
    fn test_closes_at_needs_three_points() {
        let mut draft = Draft::new();
        draft.push(Point::new(0.0, 0.0));
        draft.push(Point::new(10.0, 0.0));
        assert!(!draft.closes_at(Point::new(1.0, 1.0), 5.0));
        draft.push(Point::new(5.0, 8.0));
        assert!(draft.closes_at(Point::new(1.0, 1.0), 5.0));
        assert!(!draft.closes_at(Point::new(9.0, 9.0), 5.0));
    }

    #[test]
    fn test_take_empties() {
        let mut draft = Draft::new();
        draft.push(Point::new(0.0, 0.0));
        assert_eq!(draft.take().len(), 1);
        assert!(draft.is_empty());
    }
}
