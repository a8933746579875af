//! Global constants for the polygon editor

/// Minimum number of vertices a committed polygon may have.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Upper bound for resampling targets.
pub const MAX_POINT_DENSITY: usize = 100;

/// Point density used before the user picks one.
pub const DEFAULT_POINT_DENSITY: usize = 50;

/// Lowest density suggested when a polygon is selected.
pub const MIN_POINT_DENSITY: usize = 6;

/// Vertex/edge hit distance for the select tool (image pixels).
pub const SELECT_TOLERANCE: f32 = 10.0;

/// Vertex hit distance for the erase tool, in surface pixels.
/// Converted to image pixels with the current display scale.
pub const ERASE_TOLERANCE_PX: f32 = 15.0;

/// Zoom factor applied per zoom-in/zoom-out step.
pub const ZOOM_STEP: f32 = 1.2;

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f32 = 0.5;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f32 = 5.0;

/// Default vertex marker radius (surface pixels).
pub const DEFAULT_VERTEX_RADIUS: f32 = 4.0;

/// Allowed vertex marker radius range.
pub const VERTEX_RADIUS_RANGE: (f32, f32) = (1.0, 10.0);

/// Group assigned when the caller does not supply one.
pub const DEFAULT_GROUP: &str = "1";
