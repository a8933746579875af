//! Render pipeline.
//!
//! Turns the active file's polygons, the selection, the draft and the view
//! transform into an ordered display list. The order is fixed: clear, base
//! image, then every polygon in store order (fill and outline, vertices,
//! label), then the draft on top.

mod command;
mod style;

pub use command::{DrawCommand, LabelBox};
pub use style::{
    DisplayMode, FALLBACK_COLOR, FILL_ALPHA, HIGHLIGHT_ALPHA, LINE_WIDTH, RenderStyle, group_color,
};

use crate::color_utils::Rgba;
use crate::constants::MIN_POLYGON_VERTICES;
use crate::geometry::Point;
use crate::model::{FileKey, Polygon, PolygonId};
use crate::view::{Size, ViewTransform};

/// Label box geometry, in surface pixels relative to the first vertex.
const LABEL_OFFSET: f32 = 25.0;
const LABEL_HEIGHT: f32 = 20.0;
const LABEL_PADDING: f32 = 4.0;
const LABEL_BASELINE: f32 = 10.0;
const LABEL_FONT_SIZE: f32 = 12.0;

/// Everything the frame builder reads.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub surface: Size,
    /// `None` while no image is loaded.
    pub view: Option<&'a ViewTransform>,
    /// Active file. Polygons tagged with any other key are skipped.
    pub file: Option<&'a FileKey>,
    pub polygons: &'a [Polygon],
    pub selected: Option<PolygonId>,
    pub draft: &'a [Point],
    pub style: RenderStyle,
}

/// A built display list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
    /// Polygons left out because they were malformed or foreign.
    pub skipped: usize,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Build the display list for one frame.
pub fn build_frame(input: FrameInput<'_>) -> Frame {
    let mut frame = Frame::default();
    frame.commands.push(DrawCommand::Clear {
        size: input.surface,
    });

    let Some(view) = input.view else {
        frame.commands.push(DrawCommand::NoImage {
            size: input.surface,
        });
        return frame;
    };

    let image = view.image_size();
    let origin = view.image_to_surface(Point::new(0.0, 0.0));
    let far = view.image_to_surface(Point::new(image.width, image.height));
    frame.commands.push(DrawCommand::Image {
        origin,
        size: Size::new(far.x - origin.x, far.y - origin.y),
    });

    for polygon in input.polygons {
        if input.file != Some(&polygon.file_key) {
            log::debug!(
                "Skipping polygon {} from {} while drawing {:?}",
                polygon.id,
                polygon.file_key,
                input.file.map(FileKey::as_str)
            );
            frame.skipped += 1;
            continue;
        }
        if polygon.points.len() < MIN_POLYGON_VERTICES {
            log::debug!(
                "Skipping polygon {} with {} points",
                polygon.id,
                polygon.points.len()
            );
            frame.skipped += 1;
            continue;
        }
        push_polygon(&mut frame.commands, view, polygon, input);
    }

    if !input.draft.is_empty() {
        push_draft(&mut frame.commands, view, input.draft, input.style);
    }

    frame
}

fn push_polygon(
    commands: &mut Vec<DrawCommand>,
    view: &ViewTransform,
    polygon: &Polygon,
    input: FrameInput<'_>,
) {
    let selected = input.selected == Some(polygon.id);
    let polygon_mode = input.style.display_mode == DisplayMode::Polygon;
    let base = group_color(&polygon.group);

    let (fill, stroke, vertex, label_bg) = if selected {
        (
            Rgba::RED.with_alpha(FILL_ALPHA),
            Rgba::RED.with_alpha(HIGHLIGHT_ALPHA),
            Rgba::RED,
            Rgba::RED.with_alpha(HIGHLIGHT_ALPHA),
        )
    } else {
        (base.with_alpha(FILL_ALPHA), base, base, base)
    };

    let points: Vec<Point> = polygon
        .points
        .iter()
        .map(|p| view.image_to_surface(*p))
        .collect();
    let first = points[0];

    commands.push(DrawCommand::Path {
        points: points.clone(),
        closed: true,
        fill: Some(fill),
        stroke: polygon_mode.then_some(stroke),
        line_width: LINE_WIDTH,
        polygon: Some(polygon.id),
    });

    if polygon_mode || selected {
        commands.extend(points.into_iter().map(|center| DrawCommand::Vertex {
            center,
            radius: input.style.vertex_radius,
            color: vertex,
        }));
    }

    if polygon_mode {
        commands.push(DrawCommand::Label(LabelBox {
            text: polygon.label(),
            origin: Point::new(first.x, first.y - LABEL_OFFSET),
            height: LABEL_HEIGHT,
            padding: LABEL_PADDING,
            text_anchor: Point::new(first.x + LABEL_PADDING, first.y - LABEL_BASELINE),
            font_size: LABEL_FONT_SIZE,
            background: label_bg,
            text_color: Rgba::WHITE,
        }));
    }
}

fn push_draft(
    commands: &mut Vec<DrawCommand>,
    view: &ViewTransform,
    draft: &[Point],
    style: RenderStyle,
) {
    let points: Vec<Point> = draft.iter().map(|p| view.image_to_surface(*p)).collect();
    commands.push(DrawCommand::Path {
        points: points.clone(),
        closed: false,
        fill: None,
        stroke: Some(Rgba::RED.with_alpha(HIGHLIGHT_ALPHA)),
        line_width: LINE_WIDTH,
        polygon: None,
    });
    commands.extend(points.into_iter().map(|center| DrawCommand::Vertex {
        center,
        radius: style.vertex_radius,
        color: Rgba::BLUE,
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Group, ShapeName};

    fn key() -> FileKey {
        FileKey::from("a.png")
    }

    fn polygon(id: u64, group: &str, file: &str, points: Vec<Point>) -> Polygon {
        Polygon {
            id: PolygonId(id),
            name: ShapeName::Triangle,
            group: Group::from(group),
            original_points: points.clone(),
            points,
            file_key: FileKey::from(file),
        }
    }

    fn triangle() -> Vec<Point> {
        vec![
            Point::new(10.0, 40.0),
            Point::new(50.0, 40.0),
            Point::new(30.0, 80.0),
        ]
    }

    fn identity_view() -> ViewTransform {
        ViewTransform::new(Size::new(100.0, 100.0), Size::new(100.0, 100.0))
    }

    fn input<'a>(
        view: Option<&'a ViewTransform>,
        file: &'a FileKey,
        polygons: &'a [Polygon],
        draft: &'a [Point],
    ) -> FrameInput<'a> {
        FrameInput {
            surface: Size::new(100.0, 100.0),
            view,
            file: Some(file),
            polygons,
            selected: None,
            draft,
            style: RenderStyle::default(),
        }
    }

    fn kinds(frame: &Frame) -> Vec<&'static str> {
        frame.commands.iter().map(DrawCommand::kind).collect()
    }

    #[test]
    fn test_draw_order_polygon_mode() {
        let view = identity_view();
        let file = key();
        let polygons = vec![polygon(1, "1", "a.png", triangle())];
        let draft = vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)];
        let frame = build_frame(input(Some(&view), &file, &polygons, &draft));

        assert_eq!(
            kinds(&frame),
            vec![
                "clear", "image", "path", "vertex", "vertex", "vertex", "label", "path", "vertex",
                "vertex"
            ]
        );
        assert_eq!(frame.skipped, 0);
    }

    #[test]
    fn test_group_fill_and_stroke() {
        let view = identity_view();
        let file = key();
        let polygons = vec![polygon(1, "2", "a.png", triangle())];
        let frame = build_frame(input(Some(&view), &file, &polygons, &[]));

        let DrawCommand::Path {
            fill,
            stroke,
            closed,
            ..
        } = &frame.commands[2]
        else {
            panic!("expected path, got {:?}", frame.commands[2]);
        };
        let blue = group_color(&Group::from("2"));
        assert!(*closed);
        assert_eq!(*fill, Some(blue.with_alpha(FILL_ALPHA)));
        assert_eq!(*stroke, Some(blue));
    }

    #[test]
    fn test_selected_polygon_is_red() {
        let view = identity_view();
        let file = key();
        let polygons = vec![polygon(7, "3", "a.png", triangle())];
        let mut frame_input = input(Some(&view), &file, &polygons, &[]);
        frame_input.selected = Some(PolygonId(7));
        let frame = build_frame(frame_input);

        let DrawCommand::Path { fill, stroke, .. } = &frame.commands[2] else {
            panic!("expected path");
        };
        assert_eq!(*fill, Some(Rgba::RED.with_alpha(FILL_ALPHA)));
        assert_eq!(*stroke, Some(Rgba::RED.with_alpha(HIGHLIGHT_ALPHA)));
        assert!(matches!(
            frame.commands[3],
            DrawCommand::Vertex {
                color: Rgba::RED,
                ..
            }
        ));
    }

    #[test]
    fn test_mask_mode_hides_outline_vertices_and_label() {
        let view = identity_view();
        let file = key();
        let polygons = vec![
            polygon(1, "1", "a.png", triangle()),
            polygon(2, "1", "a.png", triangle()),
        ];
        let mut frame_input = input(Some(&view), &file, &polygons, &[]);
        frame_input.style = RenderStyle::new(DisplayMode::Mask, 4.0);
        frame_input.selected = Some(PolygonId(2));
        let frame = build_frame(frame_input);

        // Unselected: fill only. Selected: fill plus vertices.
        assert_eq!(
            kinds(&frame),
            vec!["clear", "image", "path", "path", "vertex", "vertex", "vertex"]
        );
        let DrawCommand::Path { stroke, .. } = &frame.commands[2] else {
            panic!("expected path");
        };
        assert!(stroke.is_none());
    }

    #[test]
    fn test_skips_foreign_and_malformed() {
        let view = identity_view();
        let file = key();
        let polygons = vec![
            polygon(1, "1", "other.png", triangle()),
            polygon(2, "1", "a.png", vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]),
            polygon(3, "1", "a.png", triangle()),
        ];
        let frame = build_frame(input(Some(&view), &file, &polygons, &[]));
        assert_eq!(frame.skipped, 2);
        let paths = frame
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Path { polygon: Some(PolygonId(3)), .. }))
            .count();
        assert_eq!(paths, 1);
    }

    #[test]
    fn test_label_placement() {
        let view = identity_view();
        let file = key();
        let polygons = vec![polygon(1, "9", "a.png", triangle())];
        let frame = build_frame(input(Some(&view), &file, &polygons, &[]));
        let label = frame
            .commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::Label(label) => Some(label),
                _ => None,
            })
            .unwrap();
        assert_eq!(label.text, "Triangle (9)");
        assert_eq!(label.origin, Point::new(10.0, 15.0));
        assert_eq!(label.text_anchor, Point::new(14.0, 30.0));
        assert_eq!(label.background, FALLBACK_COLOR);
    }

    #[test]
    fn test_coordinates_follow_view() {
        // 200x200 image on a 100x100 surface
        let view = ViewTransform::new(Size::new(200.0, 200.0), Size::new(100.0, 100.0));
        let file = key();
        let polygons = vec![polygon(1, "1", "a.png", triangle())];
        let frame = build_frame(input(Some(&view), &file, &polygons, &[]));
        let DrawCommand::Path { points, .. } = &frame.commands[2] else {
            panic!("expected path");
        };
        assert_eq!(points[0], Point::new(5.0, 20.0));
        assert_eq!(
            frame.commands[1],
            DrawCommand::Image {
                origin: Point::new(0.0, 0.0),
                size: Size::new(100.0, 100.0)
            }
        );
    }

    #[test]
    fn test_no_image() {
        let file = key();
        let polygons = vec![polygon(1, "1", "a.png", triangle())];
        let frame = build_frame(input(None, &file, &polygons, &[]));
        assert_eq!(kinds(&frame), vec!["clear", "no-image"]);
    }

    #[test]
    fn test_draft_is_open_blue() {
        let view = identity_view();
        let file = key();
        let draft = vec![Point::new(1.0, 1.0), Point::new(9.0, 1.0), Point::new(5.0, 5.0)];
        let frame = build_frame(input(Some(&view), &file, &[], &draft));
        let DrawCommand::Path {
            closed,
            fill,
            polygon,
            ..
        } = &frame.commands[2]
        else {
            panic!("expected path");
        };
        assert!(!*closed);
        assert!(fill.is_none());
        assert!(polygon.is_none());
        assert!(frame.commands[3..].iter().all(|c| matches!(
            c,
            DrawCommand::Vertex {
                color: Rgba::BLUE,
                ..
            }
        )));
    }
}
