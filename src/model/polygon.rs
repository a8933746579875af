//! Polygon data model.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Group, ShapeName};
use crate::geometry::Point;

/// Unique identifier for a polygon, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolygonId(pub u64);

impl fmt::Display for PolygonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of an image file. Polygons are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileKey(String);

impl FileKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FileKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An image handed to the editor when the user picks a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub key: FileKey,
    /// Display/file name, also used to name the saved annotation document.
    pub name: String,
}

impl FileRef {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: FileKey::new(key),
            name: name.into(),
        }
    }

    /// A file whose key is its own name.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: FileKey::new(name.clone()),
            name,
        }
    }
}

/// A committed, closed polygon over one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub id: PolygonId,
    pub name: ShapeName,
    pub group: Group,
    /// Current outline, at least three vertices. The closing edge is implied.
    pub points: Vec<Point>,
    /// Outline as committed (or last redrawn). Resampling always starts here.
    pub original_points: Vec<Point>,
    pub file_key: FileKey,
}

impl Polygon {
    /// Label shown next to the polygon: `name (group)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.group)
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }
}

/// Polygon data without store identity, used for loads and producer merges.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonSeed {
    pub name: ShapeName,
    pub group: Group,
    pub points: Vec<Point>,
}

impl PolygonSeed {
    pub fn new(name: impl Into<ShapeName>, group: impl Into<Group>, points: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            points,
        }
    }
}

impl From<&Polygon> for PolygonSeed {
    fn from(polygon: &Polygon) -> Self {
        Self {
            name: polygon.name.clone(),
            group: polygon.group.clone(),
            points: polygon.points.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_format() {
        let polygon = Polygon {
            id: PolygonId(1),
            name: ShapeName::Star,
            group: Group::from("2"),
            points: vec![Point::new(0.0, 0.0); 3],
            original_points: vec![Point::new(0.0, 0.0); 3],
            file_key: FileKey::from("a.png"),
        };
        assert_eq!(polygon.label(), "Star (2)");
    }

    #[test]
    fn test_named_file_ref() {
        let file = FileRef::named("frame_000002.png");
        assert_eq!(file.key.as_str(), "frame_000002.png");
        assert_eq!(file.name, "frame_000002.png");
    }
}
