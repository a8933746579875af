//! Display-list commands emitted by the frame builder.
//!
//! All coordinates are surface pixels. A backend (canvas, GPU, SVG writer)
//! replays the commands in order.

use crate::color_utils::Rgba;
use crate::geometry::Point;
use crate::model::PolygonId;
use crate::view::Size;

/// Box and text placement for a polygon label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelBox {
    pub text: String,
    /// Top-left corner of the background box.
    pub origin: Point,
    /// Box height; the width follows the measured text plus padding.
    pub height: f32,
    /// Horizontal padding on each side of the text.
    pub padding: f32,
    /// Text baseline start.
    pub text_anchor: Point,
    pub font_size: f32,
    pub background: Rgba,
    pub text_color: Rgba,
}

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Clear the whole surface.
    Clear { size: Size },
    /// Draw the base image stretched over `size` at `origin`.
    Image { origin: Point, size: Size },
    /// No image is loaded.
    NoImage { size: Size },
    /// A polyline, optionally closed, filled and/or stroked.
    Path {
        points: Vec<Point>,
        closed: bool,
        fill: Option<Rgba>,
        stroke: Option<Rgba>,
        line_width: f32,
        /// Owning polygon, `None` for the draft.
        polygon: Option<PolygonId>,
    },
    /// A filled circular vertex marker.
    Vertex {
        center: Point,
        radius: f32,
        color: Rgba,
    },
    /// A label box with text.
    Label(LabelBox),
}

impl DrawCommand {
    /// Short name for logging and tests.
    pub fn kind(&self) -> &'static str {
        match self {
            DrawCommand::Clear { .. } => "clear",
            DrawCommand::Image { .. } => "image",
            DrawCommand::NoImage { .. } => "no-image",
            DrawCommand::Path { .. } => "path",
            DrawCommand::Vertex { .. } => "vertex",
            DrawCommand::Label(_) => "label",
        }
    }
}
