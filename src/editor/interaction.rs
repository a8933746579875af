//! Interaction state: tool, selection, drag and hover.

use super::tool::Tool;
use crate::geometry::Point;
use crate::model::PolygonId;

/// An in-progress drag.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Dragging one vertex (Select tool).
    Point { polygon: PolygonId, index: usize },
    /// Dragging a whole polygon (Move tool). `last` is the image-space
    /// position of the previous pointer event.
    Polygon { polygon: PolygonId, last: Point },
    /// Panning the view. `last` is in surface pixels.
    Pan { last: Point },
}

impl DragState {
    pub fn is_active(&self) -> bool {
        !matches!(self, DragState::Idle)
    }
}

/// Cursor affordance derived from hover hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    /// Placing points, or over an edge where a point would be inserted
    Crosshair,
    /// Over something clickable (a vertex, or an erasable point)
    Pointer,
    /// Over a polygon that can be dragged
    Move,
    /// Dragging
    Grabbing,
}

/// Everything the editor remembers between pointer events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InteractionState {
    pub tool: Tool,
    pub selected_polygon: Option<PolygonId>,
    pub selected_point: Option<usize>,
    pub drag: DragState,
    pub hovered_polygon: Option<PolygonId>,
    pub cursor: Cursor,
}

impl InteractionState {
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            cursor: Self::idle_cursor(tool),
            ..Self::default()
        }
    }

    /// Cursor shown when nothing is hovered.
    pub fn idle_cursor(tool: Tool) -> Cursor {
        match tool {
            Tool::Draw => Cursor::Crosshair,
            Tool::Select | Tool::Move | Tool::Erase => Cursor::Default,
        }
    }

    pub fn select(&mut self, polygon: PolygonId, point: Option<usize>) {
        self.selected_polygon = Some(polygon);
        self.selected_point = point;
    }

    pub fn clear_selection(&mut self) {
        self.selected_polygon = None;
        self.selected_point = None;
    }

    /// Drop any drag. Edits already applied stay applied.
    pub fn cancel_drag(&mut self) {
        if self.drag.is_active() {
            log::debug!("✋ Drag cancelled");
        }
        self.drag = DragState::Idle;
    }

    /// Forget everything except the tool.
    pub fn reset(&mut self) {
        *self = Self::new(self.tool);
    }

    /// Forget references to a polygon that no longer exists.
    pub fn forget_polygon(&mut self, polygon: PolygonId) {
        if self.selected_polygon == Some(polygon) {
            self.clear_selection();
        }
        if self.hovered_polygon == Some(polygon) {
            self.hovered_polygon = None;
        }
        let dragging = match self.drag {
            DragState::Point { polygon: p, .. } | DragState::Polygon { polygon: p, .. } => {
                p == polygon
            }
            DragState::Idle | DragState::Pan { .. } => false,
        };
        if dragging {
            self.drag = DragState::Idle;
        }
    }
}
