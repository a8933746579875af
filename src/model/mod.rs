//! Data models for the polygon editor.

mod group;
mod polygon;
mod shape;

pub use group::Group;
pub use polygon::{FileKey, FileRef, Polygon, PolygonId, PolygonSeed};
pub use shape::ShapeName;
