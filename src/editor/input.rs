//! Pointer input and what the editor did with it.

use crate::error::EditError;
use crate::geometry::Point;
use crate::model::PolygonId;

/// Which button a pointer event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

impl PointerButton {
    /// Secondary and middle drags pan the view in every tool.
    pub fn pans(&self) -> bool {
        matches!(self, PointerButton::Secondary | PointerButton::Middle)
    }
}

/// A pointer event in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { pos: Point, button: PointerButton },
    Move { pos: Point },
    Up { pos: Point, button: PointerButton },
}

impl PointerEvent {
    /// Primary-button press.
    pub fn down(x: f32, y: f32) -> Self {
        PointerEvent::Down {
            pos: Point::new(x, y),
            button: PointerButton::Primary,
        }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        PointerEvent::Move {
            pos: Point::new(x, y),
        }
    }

    /// Primary-button release.
    pub fn up(x: f32, y: f32) -> Self {
        PointerEvent::Up {
            pos: Point::new(x, y),
            button: PointerButton::Primary,
        }
    }

    pub fn pos(&self) -> Point {
        match self {
            PointerEvent::Down { pos, .. }
            | PointerEvent::Move { pos }
            | PointerEvent::Up { pos, .. } => *pos,
        }
    }
}

/// Result of handling one pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// Nothing changed
    Ignored,
    /// Hover feedback was updated; no edits
    Hover,
    DraftPointAdded { index: usize },
    /// Click landed on the first draft vertex; the caller should commit
    DraftReadyToCommit,
    DraftPointRemoved { index: usize },
    Selected {
        polygon: PolygonId,
        point: Option<usize>,
    },
    PointInserted { polygon: PolygonId, index: usize },
    PointMoved { polygon: PolygonId, index: usize },
    PolygonMoved { polygon: PolygonId },
    DragStarted { polygon: PolygonId },
    DragEnded,
    PointRemoved { polygon: PolygonId, index: usize },
    Panned,
    /// The edit was refused; state is unchanged
    Rejected(EditError),
}

impl PointerOutcome {
    /// Whether the store was mutated.
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            PointerOutcome::PointInserted { .. }
                | PointerOutcome::PointMoved { .. }
                | PointerOutcome::PolygonMoved { .. }
                | PointerOutcome::PointRemoved { .. }
        )
    }
}
