//! Colours, display modes and marker sizes used when building a frame.

use serde::{Deserialize, Serialize};

use crate::color_utils::Rgba;
use crate::constants::{DEFAULT_VERTEX_RADIUS, VERTEX_RADIUS_RANGE};
use crate::model::Group;

/// Fill opacity for committed polygons.
pub const FILL_ALPHA: f32 = 0.3;

/// Opacity of the selection highlight stroke and label box.
pub const HIGHLIGHT_ALPHA: f32 = 0.7;

/// Stroke width for outlines and the draft path.
pub const LINE_WIDTH: f32 = 2.0;

/// Colour for groups outside the palette.
pub const FALLBACK_COLOR: Rgba = Rgba::rgb(0x9C, 0x9C, 0x9C);

const GROUP_PALETTE: [(&str, Rgba); 5] = [
    ("1", Rgba::rgb(0xFF, 0x57, 0x33)),
    ("2", Rgba::rgb(0x33, 0xA1, 0xFF)),
    ("3", Rgba::rgb(0x33, 0xFF, 0x57)),
    ("4", Rgba::rgb(0xF0, 0x33, 0xFF)),
    ("5", Rgba::rgb(0xFF, 0xD7, 0x00)),
];

/// Base colour for a group; unknown groups are gray.
pub fn group_color(group: &Group) -> Rgba {
    GROUP_PALETTE
        .iter()
        .find(|(id, _)| *id == group.as_str())
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_COLOR)
}

/// How committed polygons are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Fill, outline, vertices and label
    #[default]
    Polygon,
    /// Fill only; the selected polygon still shows its vertices
    Mask,
}

impl DisplayMode {
    pub fn name(&self) -> &'static str {
        match self {
            DisplayMode::Polygon => "polygon",
            DisplayMode::Mask => "mask",
        }
    }

    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Polygon => DisplayMode::Mask,
            DisplayMode::Mask => DisplayMode::Polygon,
        }
    }
}

/// Per-frame styling knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub display_mode: DisplayMode,
    /// Vertex marker radius in surface pixels.
    pub vertex_radius: f32,
}

impl RenderStyle {
    pub fn new(display_mode: DisplayMode, vertex_radius: f32) -> Self {
        let (min, max) = VERTEX_RADIUS_RANGE;
        Self {
            display_mode,
            vertex_radius: vertex_radius.clamp(min, max),
        }
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::new(DisplayMode::default(), DEFAULT_VERTEX_RADIUS)
    }
}
