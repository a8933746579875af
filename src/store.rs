//! Polygon store.
//!
//! One authoritative collection of committed polygons, keyed by the image
//! they belong to. Insertion order within a file is the z-order used for
//! hit-testing and rendering. Every mutation either applies completely or
//! leaves the store untouched and returns an [`EditError`].

use std::collections::BTreeMap;

use crate::constants::{MAX_POINT_DENSITY, MIN_POLYGON_VERTICES};
use crate::error::EditError;
use crate::geometry::{Offset, Point, equidistant_points};
use crate::model::{FileKey, Group, Polygon, PolygonId, PolygonSeed, ShapeName};

/// Per-image ordered polygon collections.
#[derive(Debug, Clone)]
pub struct PolygonStore {
    files: BTreeMap<FileKey, Vec<Polygon>>,
    next_id: u64,
    max_density: usize,
}

impl Default for PolygonStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Log a rejected mutation and pass the result through.
fn logged<T>(op: &str, result: Result<T, EditError>) -> Result<T, EditError> {
    if let Err(e) = &result {
        log::warn!("⚠️ {} rejected: {}", op, e);
    }
    result
}

impl PolygonStore {
    pub fn new() -> Self {
        Self {
            files: BTreeMap::new(),
            next_id: 1,
            max_density: MAX_POINT_DENSITY,
        }
    }

    /// Set the upper bound for resampling targets.
    pub fn with_max_density(mut self, max_density: usize) -> Self {
        self.max_density = max_density.max(MIN_POLYGON_VERTICES);
        self
    }

    pub fn max_density(&self) -> usize {
        self.max_density
    }

    fn allocate_id(&mut self) -> PolygonId {
        let id = PolygonId(self.next_id);
        self.next_id += 1;
        id
    }

    fn polygon_mut(&mut self, file: &FileKey, id: PolygonId) -> Result<&mut Polygon, EditError> {
        self.files
            .get_mut(file)
            .ok_or_else(|| EditError::UnknownFile(file.clone()))?
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| EditError::unknown_polygon(file, id))
    }

    // -- Mutations ----------------------------------------------------------

    /// Commit a new polygon. `original_points` starts as a copy of `points`.
    pub fn create_polygon(
        &mut self,
        file: &FileKey,
        points: Vec<Point>,
        name: ShapeName,
        group: Group,
    ) -> Result<PolygonId, EditError> {
        if points.len() < MIN_POLYGON_VERTICES {
            return logged("create", Err(EditError::too_few_points(points.len())));
        }

        let id = self.allocate_id();
        let polygon = Polygon {
            id,
            name,
            group,
            original_points: points.clone(),
            points,
            file_key: file.clone(),
        };
        log::debug!(
            "🔷 Created polygon {} '{}' with {} points in {}",
            id,
            polygon.label(),
            polygon.points.len(),
            file
        );
        self.files.entry(file.clone()).or_default().push(polygon);
        Ok(id)
    }

    /// Replace a single vertex. The anchor outline is left alone.
    pub fn update_point(
        &mut self,
        file: &FileKey,
        id: PolygonId,
        index: usize,
        point: Point,
    ) -> Result<(), EditError> {
        let result = self.polygon_mut(file, id).and_then(|polygon| {
            let len = polygon.points.len();
            let vertex = polygon
                .points
                .get_mut(index)
                .ok_or_else(|| EditError::index_out_of_range(index, len))?;
            *vertex = point;
            Ok(())
        });
        logged("update point", result)
    }

    /// Insert `point` on the edge starting at `edge_index`.
    ///
    /// Returns the index of the new vertex, always `edge_index + 1`.
    pub fn insert_point_on_edge(
        &mut self,
        file: &FileKey,
        id: PolygonId,
        edge_index: usize,
        point: Point,
    ) -> Result<usize, EditError> {
        let result = self.polygon_mut(file, id).and_then(|polygon| {
            let len = polygon.points.len();
            if edge_index >= len {
                return Err(EditError::index_out_of_range(edge_index, len));
            }
            let index = edge_index + 1;
            polygon.points.insert(index, point);
            log::debug!("➕ Inserted point {} into polygon {}", index, id);
            Ok(index)
        });
        logged("insert point", result)
    }

    /// Translate every vertex by `delta`.
    pub fn move_polygon(
        &mut self,
        file: &FileKey,
        id: PolygonId,
        delta: Offset,
    ) -> Result<(), EditError> {
        let result = self.polygon_mut(file, id).map(|polygon| {
            for point in &mut polygon.points {
                *point = point.translated(delta);
            }
        });
        logged("move polygon", result)
    }

    /// Resample the polygon from its anchor outline.
    ///
    /// The target is clamped to `[3, max_density]`. Targets at or below the
    /// anchor's vertex count restore the anchor outline. Returns the new
    /// vertex count.
    pub fn resample_polygon(
        &mut self,
        file: &FileKey,
        id: PolygonId,
        target: usize,
    ) -> Result<usize, EditError> {
        let target = target.clamp(MIN_POLYGON_VERTICES, self.max_density);
        let result = self.polygon_mut(file, id).map(|polygon| {
            polygon.points = equidistant_points(&polygon.original_points, target);
            log::debug!(
                "🔁 Resampled polygon {} to {} points (target {})",
                id,
                polygon.points.len(),
                target
            );
            polygon.points.len()
        });
        logged("resample", result)
    }

    /// Remove one vertex. Rejected if fewer than three would remain.
    pub fn remove_point(
        &mut self,
        file: &FileKey,
        id: PolygonId,
        index: usize,
    ) -> Result<(), EditError> {
        let result = self.polygon_mut(file, id).and_then(|polygon| {
            let len = polygon.points.len();
            if index >= len {
                return Err(EditError::index_out_of_range(index, len));
            }
            if len - 1 < MIN_POLYGON_VERTICES {
                return Err(EditError::too_few_points(len - 1));
            }
            polygon.points.remove(index);
            log::debug!("➖ Removed point {} from polygon {}", index, id);
            Ok(())
        });
        logged("remove point", result)
    }

    /// Remove a polygon and hand it back.
    pub fn delete_polygon(&mut self, file: &FileKey, id: PolygonId) -> Result<Polygon, EditError> {
        let result = self
            .files
            .get_mut(file)
            .ok_or_else(|| EditError::UnknownFile(file.clone()))
            .and_then(|polygons| {
                let position = polygons
                    .iter()
                    .position(|p| p.id == id)
                    .ok_or_else(|| EditError::unknown_polygon(file, id))?;
                Ok(polygons.remove(position))
            });
        if result.is_ok() {
            log::debug!("🗑️ Deleted polygon {} from {}", id, file);
        }
        logged("delete polygon", result)
    }

    /// Change name and group only.
    pub fn rename(
        &mut self,
        file: &FileKey,
        id: PolygonId,
        name: ShapeName,
        group: Group,
    ) -> Result<(), EditError> {
        let result = self.polygon_mut(file, id).map(|polygon| {
            polygon.name = name;
            polygon.group = group;
            log::debug!("🏷️ Renamed polygon {} to '{}'", id, polygon.label());
        });
        logged("rename", result)
    }

    /// Replace both the outline and its anchor.
    pub fn redraw_polygon(
        &mut self,
        file: &FileKey,
        id: PolygonId,
        points: Vec<Point>,
    ) -> Result<(), EditError> {
        if points.len() < MIN_POLYGON_VERTICES {
            return logged("redraw", Err(EditError::too_few_points(points.len())));
        }
        let result = self.polygon_mut(file, id).map(|polygon| {
            polygon.original_points = points.clone();
            polygon.points = points;
            log::debug!("✏️ Redrew polygon {}", id);
        });
        logged("redraw", result)
    }

    /// Replace everything stored for `file` with freshly created polygons.
    ///
    /// Seeds with too few points are skipped. Returns how many were stored.
    pub fn replace_file(&mut self, file: &FileKey, seeds: Vec<PolygonSeed>) -> usize {
        let mut polygons = Vec::with_capacity(seeds.len());
        for seed in seeds {
            if seed.points.len() < MIN_POLYGON_VERTICES {
                log::warn!(
                    "⚠️ Skipping '{}' in {}: {}",
                    seed.name,
                    file,
                    EditError::too_few_points(seed.points.len())
                );
                continue;
            }
            let id = self.allocate_id();
            polygons.push(Polygon {
                id,
                name: seed.name,
                group: seed.group,
                original_points: seed.points.clone(),
                points: seed.points,
                file_key: file.clone(),
            });
        }

        let count = polygons.len();
        log::info!("Loaded {} polygons into {}", count, file);
        self.files.insert(file.clone(), polygons);
        count
    }

    // -- Read views ---------------------------------------------------------

    /// Polygons of one file in z-order. Unknown files have none.
    pub fn polygons(&self, file: &FileKey) -> &[Polygon] {
        self.files.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, file: &FileKey, id: PolygonId) -> Option<&Polygon> {
        self.polygons(file).iter().find(|p| p.id == id)
    }

    /// Files that have ever held polygons.
    pub fn file_keys(&self) -> impl Iterator<Item = &FileKey> {
        self.files.keys()
    }

    pub fn len(&self, file: &FileKey) -> usize {
        self.polygons(file).len()
    }

    pub fn total_len(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    /// Polygons of one file grouped by [`Group`], groups in order of first
    /// appearance and polygons in z-order within each group.
    pub fn by_group(&self, file: &FileKey) -> Vec<(&Group, Vec<&Polygon>)> {
        let mut groups: Vec<(&Group, Vec<&Polygon>)> = Vec::new();
        for polygon in self.polygons(file) {
            match groups.iter_mut().find(|(g, _)| *g == &polygon.group) {
                Some((_, members)) => members.push(polygon),
                None => groups.push((&polygon.group, vec![polygon])),
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> FileKey {
        FileKey::from("img_001.png")
    }

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    fn triangle() -> Vec<Point> {
        vec![
            Point::new(1.0, 1.0),
            Point::new(5.0, 1.0),
            Point::new(3.0, 5.0),
        ]
    }

    fn store_with_square() -> (PolygonStore, PolygonId) {
        let mut store = PolygonStore::new();
        let id = store
            .create_polygon(&file(), square(), ShapeName::Rectangle, Group::default())
            .unwrap();
        (store, id)
    }

    #[test]
    fn test_create_sets_anchor_and_file_key() {
        let (store, id) = store_with_square();
        let polygon = store.get(&file(), id).unwrap();
        assert_eq!(polygon.points, square());
        assert_eq!(polygon.original_points, square());
        assert_eq!(polygon.file_key, file());
        assert_eq!(store.len(&file()), 1);
    }

    #[test]
    fn test_create_rejects_two_points() {
        let mut store = PolygonStore::new();
        let err = store
            .create_polygon(
                &file(),
                vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
                ShapeName::Star,
                Group::default(),
            )
            .unwrap_err();
        assert!(matches!(err, EditError::TooFewPoints { count: 2, .. }));
        assert_eq!(store.total_len(), 0);
    }

    #[test]
    fn test_ids_are_unique_across_files() {
        let mut store = PolygonStore::new();
        let a = store
            .create_polygon(&file(), triangle(), ShapeName::Triangle, Group::default())
            .unwrap();
        let b = store
            .create_polygon(
                &FileKey::from("other.png"),
                triangle(),
                ShapeName::Triangle,
                Group::default(),
            )
            .unwrap();
        assert_ne!(a, b);
        assert!(store.get(&file(), b).is_none());
    }

    #[test]
    fn test_update_point_keeps_anchor() {
        let (mut store, id) = store_with_square();
        store
            .update_point(&file(), id, 0, Point::new(2.0, 3.0))
            .unwrap();
        let polygon = store.get(&file(), id).unwrap();
        assert_eq!(polygon.points[0], Point::new(2.0, 3.0));
        assert_eq!(polygon.original_points[0], Point::new(0.0, 0.0));
    }

    #[test]
    fn test_update_point_out_of_range() {
        let (mut store, id) = store_with_square();
        let err = store
            .update_point(&file(), id, 9, Point::new(0.0, 0.0))
            .unwrap_err();
        assert_eq!(err, EditError::index_out_of_range(9, 4));
    }

    #[test]
    fn test_insert_point_on_edge() {
        let (mut store, id) = store_with_square();
        let index = store
            .insert_point_on_edge(&file(), id, 0, Point::new(5.0, 0.0))
            .unwrap();
        assert_eq!(index, 1);
        let polygon = store.get(&file(), id).unwrap();
        assert_eq!(polygon.points.len(), 5);
        assert_eq!(polygon.points[1], Point::new(5.0, 0.0));
        assert_eq!(polygon.original_points.len(), 4);
    }

    #[test]
    fn test_insert_point_on_closing_edge_appends() {
        let (mut store, id) = store_with_square();
        let index = store
            .insert_point_on_edge(&file(), id, 3, Point::new(0.0, 5.0))
            .unwrap();
        assert_eq!(index, 4);
        assert_eq!(store.get(&file(), id).unwrap().points[4], Point::new(0.0, 5.0));
    }

    #[test]
    fn test_move_polygon() {
        let (mut store, id) = store_with_square();
        store
            .move_polygon(&file(), id, Offset::new(2.0, -1.0))
            .unwrap();
        let polygon = store.get(&file(), id).unwrap();
        assert_eq!(polygon.points[2], Point::new(12.0, 9.0));
        assert_eq!(polygon.original_points, square());
    }

    #[test]
    fn test_resample_is_anchor_stable() {
        let (mut store, id) = store_with_square();
        assert_eq!(store.resample_polygon(&file(), id, 20).unwrap(), 20);
        assert_eq!(store.resample_polygon(&file(), id, 8).unwrap(), 8);

        let direct = equidistant_points(&square(), 8);
        let polygon = store.get(&file(), id).unwrap();
        assert_eq!(polygon.points, direct);
        assert_eq!(polygon.original_points, square());
    }

    #[test]
    fn test_resample_clamps_target() {
        let (mut store, id) = store_with_square();
        assert_eq!(store.resample_polygon(&file(), id, 1000).unwrap(), MAX_POINT_DENSITY);
        // Below the anchor count restores the anchor
        assert_eq!(store.resample_polygon(&file(), id, 0).unwrap(), 4);
        assert_eq!(store.get(&file(), id).unwrap().points, square());
    }

    #[test]
    fn test_with_max_density() {
        let mut store = PolygonStore::new().with_max_density(12);
        let id = store
            .create_polygon(&file(), square(), ShapeName::Rectangle, Group::default())
            .unwrap();
        assert_eq!(store.resample_polygon(&file(), id, 50).unwrap(), 12);
    }

    #[test]
    fn test_remove_point_on_triangle_is_noop() {
        let mut store = PolygonStore::new();
        let id = store
            .create_polygon(&file(), triangle(), ShapeName::Triangle, Group::default())
            .unwrap();
        let err = store.remove_point(&file(), id, 0).unwrap_err();
        assert!(matches!(err, EditError::TooFewPoints { count: 2, min: 3 }));
        assert_eq!(store.len(&file()), 1);
        assert_eq!(store.get(&file(), id).unwrap().points.len(), 3);
    }

    #[test]
    fn test_remove_point_renumbers() {
        let (mut store, id) = store_with_square();
        store.remove_point(&file(), id, 1).unwrap();
        let polygon = store.get(&file(), id).unwrap();
        assert_eq!(polygon.points.len(), 3);
        assert_eq!(polygon.points[1], Point::new(10.0, 10.0));
    }

    #[test]
    fn test_delete_polygon() {
        let (mut store, id) = store_with_square();
        let removed = store.delete_polygon(&file(), id).unwrap();
        assert_eq!(removed.id, id);
        assert_eq!(store.len(&file()), 0);
        assert!(store.delete_polygon(&file(), id).is_err());
    }

    #[test]
    fn test_stale_id_is_rejected() {
        let (mut store, _) = store_with_square();
        let err = store
            .move_polygon(&file(), PolygonId(999), Offset::new(1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, EditError::UnknownPolygon { .. }));
        let err = store
            .move_polygon(&FileKey::from("nope"), PolygonId(1), Offset::new(1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, EditError::UnknownFile(_)));
    }

    #[test]
    fn test_rename() {
        let (mut store, id) = store_with_square();
        store
            .rename(&file(), id, ShapeName::Hexagon, Group::from("4"))
            .unwrap();
        let polygon = store.get(&file(), id).unwrap();
        assert_eq!(polygon.label(), "Hexagon (4)");
        assert_eq!(polygon.points, square());
    }

    #[test]
    fn test_redraw_replaces_anchor() {
        let (mut store, id) = store_with_square();
        store.redraw_polygon(&file(), id, triangle()).unwrap();
        let polygon = store.get(&file(), id).unwrap();
        assert_eq!(polygon.points, triangle());
        assert_eq!(polygon.original_points, triangle());
        assert!(store.redraw_polygon(&file(), id, vec![]).is_err());
    }

    #[test]
    fn test_replace_file_skips_invalid_seeds() {
        let (mut store, old) = store_with_square();
        let seeds = vec![
            PolygonSeed::new("Star", "2", triangle()),
            PolygonSeed::new("Arrow", "1", vec![Point::new(0.0, 0.0)]),
        ];
        assert_eq!(store.replace_file(&file(), seeds), 1);
        assert!(store.get(&file(), old).is_none());
        let polygon = &store.polygons(&file())[0];
        assert_eq!(polygon.name, ShapeName::Star);
        assert_eq!(polygon.file_key, file());
    }

    #[test]
    fn test_per_file_isolation() {
        let (mut store, _) = store_with_square();
        let other = FileKey::from("img_002.png");
        store
            .create_polygon(&other, triangle(), ShapeName::Triangle, Group::default())
            .unwrap();
        assert_eq!(store.len(&file()), 1);
        assert_eq!(store.len(&other), 1);
        assert_eq!(store.total_len(), 2);
        for key in store.file_keys() {
            assert!(store.polygons(key).iter().all(|p| &p.file_key == key));
        }
    }

    #[test]
    fn test_by_group_first_appearance_order() {
        let mut store = PolygonStore::new();
        for group in ["2", "1", "2"] {
            store
                .create_polygon(&file(), triangle(), ShapeName::Triangle, Group::from(group))
                .unwrap();
        }
        let groups = store.by_group(&file());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0.as_str(), "2");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0.as_str(), "1");
    }
}
