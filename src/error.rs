//! Error types for polygon store and editor operations.

use thiserror::Error;

use crate::model::{FileKey, PolygonId};

/// Errors raised when an edit cannot be applied.
///
/// None of these are fatal: the rejected operation leaves all state as it
/// was and the editor reports the message in its status line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// No polygons have ever been stored for this file
    #[error("Unknown file: {0}")]
    UnknownFile(FileKey),

    /// Polygon id does not exist under the given file
    #[error("Polygon {id} not found in {file}")]
    UnknownPolygon {
        /// File that was searched
        file: FileKey,
        /// The missing polygon id
        id: PolygonId,
    },

    /// Vertex or edge index past the end of the outline
    #[error("Index {index} out of range for polygon with {len} points")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of vertices in the polygon
        len: usize,
    },

    /// Operation would leave fewer vertices than a polygon needs
    #[error("A polygon needs at least {min} points, got {count}")]
    TooFewPoints {
        /// Vertex count the operation would produce
        count: usize,
        /// Minimum allowed vertex count
        min: usize,
    },

    /// No file is active in the editor
    #[error("No active file")]
    NoActiveFile,

    /// Operation needs a selected polygon
    #[error("No polygon selected")]
    NoSelection,
}

impl EditError {
    /// Create an unknown polygon error.
    pub fn unknown_polygon(file: &FileKey, id: PolygonId) -> Self {
        Self::UnknownPolygon {
            file: file.clone(),
            id,
        }
    }

    /// Create an index out of range error.
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create a too-few-points error against the polygon minimum.
    pub fn too_few_points(count: usize) -> Self {
        Self::TooFewPoints {
            count,
            min: crate::constants::MIN_POLYGON_VERTICES,
        }
    }
}
