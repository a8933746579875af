//! Pointer dispatch for the editing tools.

use super::{
    Cursor, DragState, Editor, InteractionState, PointerButton, PointerEvent, PointerOutcome, Tool,
};
use crate::config::MoveRelease;
use crate::geometry::{Point, find_closest_point, is_point_in_polygon, point_near_edge};
use crate::model::{FileKey, PolygonId};

/// What the select tool finds under the pointer, in priority order.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SelectHit {
    Vertex {
        polygon: PolygonId,
        index: usize,
    },
    Interior {
        polygon: PolygonId,
    },
    Edge {
        polygon: PolygonId,
        edge_index: usize,
        point: Point,
    },
}

impl Editor {
    /// Route one pointer event through the active tool.
    ///
    /// Positions are in surface pixels. Without an active file or image
    /// every event is ignored.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerOutcome {
        let Some(view) = self.view else {
            return PointerOutcome::Ignored;
        };
        let Some(key) = self.file.as_ref().map(|f| f.key.clone()) else {
            return PointerOutcome::Ignored;
        };
        if !view.surface_size().is_usable() {
            return PointerOutcome::Ignored;
        }

        let image_pos = view.surface_to_image(event.pos());
        let outcome = match event {
            PointerEvent::Down { pos, button } if button.pans() => self.start_pan(pos),
            PointerEvent::Down { .. } => self.pointer_down(&key, image_pos),
            PointerEvent::Move { pos } => self.pointer_move(&key, pos, image_pos),
            PointerEvent::Up { button, .. } => self.pointer_up(button),
        };

        if outcome.is_edit() {
            self.mark_dirty(&key);
        }
        if let PointerOutcome::Rejected(err) = &outcome {
            self.status = Some(err.to_string());
        }
        outcome
    }

    fn pointer_down(&mut self, key: &FileKey, p: Point) -> PointerOutcome {
        match self.state.tool {
            Tool::Draw => self.draw_down(p),
            Tool::Select => self.select_down(key, p),
            Tool::Move => self.move_down(key, p),
            Tool::Erase => self.erase_down(key, p),
        }
    }

    fn pointer_move(&mut self, key: &FileKey, surface_pos: Point, p: Point) -> PointerOutcome {
        match self.state.drag {
            DragState::Point { polygon, index } => {
                match self.store.update_point(key, polygon, index, p) {
                    Ok(()) => PointerOutcome::PointMoved { polygon, index },
                    Err(e) => {
                        self.state.cancel_drag();
                        PointerOutcome::Rejected(e)
                    }
                }
            }
            DragState::Polygon { polygon, last } => {
                let delta = p.offset_from(last);
                if delta.is_zero() {
                    return PointerOutcome::Ignored;
                }
                match self.store.move_polygon(key, polygon, delta) {
                    Ok(()) => {
                        self.state.drag = DragState::Polygon { polygon, last: p };
                        PointerOutcome::PolygonMoved { polygon }
                    }
                    Err(e) => {
                        self.state.cancel_drag();
                        PointerOutcome::Rejected(e)
                    }
                }
            }
            DragState::Pan { last } => {
                if let Some(view) = &mut self.view {
                    view.pan_by(surface_pos.x - last.x, surface_pos.y - last.y);
                }
                self.state.drag = DragState::Pan { last: surface_pos };
                PointerOutcome::Panned
            }
            DragState::Idle => {
                self.hover(key, p);
                PointerOutcome::Hover
            }
        }
    }

    fn pointer_up(&mut self, button: PointerButton) -> PointerOutcome {
        let ends = match self.state.drag {
            DragState::Pan { .. } => button.pans(),
            DragState::Point { .. } => button == PointerButton::Primary,
            DragState::Polygon { .. } => {
                button == PointerButton::Primary
                    && self.config.move_release == MoveRelease::PointerUp
            }
            DragState::Idle => false,
        };
        if ends {
            self.end_drag();
            PointerOutcome::DragEnded
        } else {
            PointerOutcome::Ignored
        }
    }

    fn start_pan(&mut self, pos: Point) -> PointerOutcome {
        self.state.drag = DragState::Pan { last: pos };
        self.state.cursor = Cursor::Grabbing;
        log::debug!("✋ Pan drag started at ({:.1}, {:.1})", pos.x, pos.y);
        PointerOutcome::Panned
    }

    fn end_drag(&mut self) {
        self.state.drag = DragState::Idle;
        self.state.cursor = InteractionState::idle_cursor(self.state.tool);
        log::debug!("✋ Drag ended");
    }

    // ---- draw ----

    fn draw_down(&mut self, p: Point) -> PointerOutcome {
        if let Some(threshold) = self.config.auto_close_threshold
            && self.draft.closes_at(p, threshold)
        {
            log::debug!("🔒 Draft closed at its first point");
            return PointerOutcome::DraftReadyToCommit;
        }
        let index = self.draft.push(p);
        log::debug!("✏️ Draft point {} at ({:.1}, {:.1})", index, p.x, p.y);
        PointerOutcome::DraftPointAdded { index }
    }

    // ---- select ----

    fn select_down(&mut self, key: &FileKey, p: Point) -> PointerOutcome {
        if let DragState::Point { .. } = self.state.drag {
            self.end_drag();
            return PointerOutcome::DragEnded;
        }

        match self.select_hit(key, p) {
            Some(SelectHit::Vertex { polygon, index }) => {
                self.state.select(polygon, Some(index));
                self.begin_point_drag(polygon, index);
                self.suggest_density(key, polygon);
                log::debug!("🔍 Selected point {} of polygon {}", index, polygon);
                PointerOutcome::Selected {
                    polygon,
                    point: Some(index),
                }
            }
            Some(SelectHit::Interior { polygon }) => {
                self.state.select(polygon, None);
                self.suggest_density(key, polygon);
                log::debug!("🔍 Selected polygon {}", polygon);
                PointerOutcome::Selected {
                    polygon,
                    point: None,
                }
            }
            Some(SelectHit::Edge {
                polygon,
                edge_index,
                point,
            }) => match self.store.insert_point_on_edge(key, polygon, edge_index, point) {
                Ok(index) => {
                    self.state.select(polygon, Some(index));
                    self.begin_point_drag(polygon, index);
                    self.suggest_density(key, polygon);
                    log::debug!("➕ Inserted point {} into polygon {}", index, polygon);
                    PointerOutcome::PointInserted { polygon, index }
                }
                Err(e) => PointerOutcome::Rejected(e),
            },
            None => PointerOutcome::Ignored,
        }
    }

    fn begin_point_drag(&mut self, polygon: PolygonId, index: usize) {
        self.state.drag = DragState::Point { polygon, index };
        self.state.cursor = Cursor::Grabbing;
    }

    /// Vertex of any polygon first, then interior, then edge. Within each
    /// pass the first polygon in store order wins.
    fn select_hit(&self, key: &FileKey, p: Point) -> Option<SelectHit> {
        let tolerance = self.config.select_tolerance;
        let polygons = self.store.polygons(key);

        polygons
            .iter()
            .find_map(|polygon| {
                find_closest_point(&polygon.points, p)
                    .filter(|closest| closest.distance < tolerance)
                    .map(|closest| SelectHit::Vertex {
                        polygon: polygon.id,
                        index: closest.index,
                    })
            })
            .or_else(|| {
                polygons
                    .iter()
                    .find(|polygon| is_point_in_polygon(p, &polygon.points))
                    .map(|polygon| SelectHit::Interior { polygon: polygon.id })
            })
            .or_else(|| {
                polygons.iter().find_map(|polygon| {
                    point_near_edge(p, &polygon.points, tolerance).map(|hit| SelectHit::Edge {
                        polygon: polygon.id,
                        edge_index: hit.edge_index,
                        point: hit.point,
                    })
                })
            })
    }

    // ---- move ----

    fn move_down(&mut self, key: &FileKey, p: Point) -> PointerOutcome {
        if let DragState::Polygon { .. } = self.state.drag {
            self.end_drag();
            return PointerOutcome::DragEnded;
        }

        let Some(polygon) = self.polygon_at(key, p) else {
            return PointerOutcome::Ignored;
        };
        self.state.select(polygon, None);
        self.state.drag = DragState::Polygon { polygon, last: p };
        self.state.cursor = Cursor::Grabbing;
        log::debug!("✋ Moving polygon {}", polygon);
        PointerOutcome::DragStarted { polygon }
    }

    fn polygon_at(&self, key: &FileKey, p: Point) -> Option<PolygonId> {
        self.store
            .polygons(key)
            .iter()
            .find(|polygon| is_point_in_polygon(p, &polygon.points))
            .map(|polygon| polygon.id)
    }

    // ---- erase ----

    /// Erase hit distance in image pixels, constant on screen.
    fn erase_tolerance(&self) -> f32 {
        let scale = self.view.map_or(1.0, |view| view.image_per_surface_px());
        self.config.erase_tolerance_px * scale
    }

    fn erase_down(&mut self, key: &FileKey, p: Point) -> PointerOutcome {
        let tolerance = self.erase_tolerance();

        if let Some(hit) = self.draft.vertex_within(p, tolerance)
            && self.draft.remove(hit.index).is_some()
        {
            log::debug!("🧽 Removed draft point {}", hit.index);
            return PointerOutcome::DraftPointRemoved { index: hit.index };
        }

        let Some((polygon, index)) = self.closest_committed_vertex(key, p, tolerance) else {
            return PointerOutcome::Ignored;
        };
        match self.store.remove_point(key, polygon, index) {
            Ok(()) => {
                if self.state.selected_polygon == Some(polygon) {
                    self.state.selected_point = None;
                }
                PointerOutcome::PointRemoved { polygon, index }
            }
            Err(e) => PointerOutcome::Rejected(e),
        }
    }

    /// Closest vertex over all polygons of the file, within `tolerance`
    /// (inclusive). Ties go to the earlier polygon.
    fn closest_committed_vertex(
        &self,
        key: &FileKey,
        p: Point,
        tolerance: f32,
    ) -> Option<(PolygonId, usize)> {
        let mut best: Option<(PolygonId, usize, f32)> = None;
        for polygon in self.store.polygons(key) {
            let Some(closest) = find_closest_point(&polygon.points, p) else {
                continue;
            };
            if closest.distance <= tolerance
                && best.is_none_or(|(_, _, distance)| closest.distance < distance)
            {
                best = Some((polygon.id, closest.index, closest.distance));
            }
        }
        best.map(|(polygon, index, _)| (polygon, index))
    }

    // ---- hover ----

    fn hover(&mut self, key: &FileKey, p: Point) {
        let (cursor, hovered) = match self.state.tool {
            Tool::Draw => (Cursor::Crosshair, None),
            Tool::Select => match self.select_hit(key, p) {
                Some(SelectHit::Vertex { polygon, .. }) => (Cursor::Pointer, Some(polygon)),
                Some(SelectHit::Edge { polygon, .. }) => (Cursor::Crosshair, Some(polygon)),
                Some(SelectHit::Interior { polygon }) => (Cursor::Default, Some(polygon)),
                None => (Cursor::Default, None),
            },
            Tool::Move => match self.polygon_at(key, p) {
                Some(polygon) => (Cursor::Move, Some(polygon)),
                None => (Cursor::Default, None),
            },
            Tool::Erase => {
                let tolerance = self.erase_tolerance();
                let near = self.draft.vertex_within(p, tolerance).is_some()
                    || self.closest_committed_vertex(key, p, tolerance).is_some();
                (if near { Cursor::Pointer } else { Cursor::Default }, None)
            }
        };
        self.state.cursor = cursor;
        self.state.hovered_polygon = hovered;
    }
}
