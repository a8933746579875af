//! View transform mathematics.
//!
//! Maps pointer-surface coordinates to image coordinates and back. The
//! display pipeline is, in order: base fit-scale (image → surface pixels,
//! per axis), zoom about the surface centre, then pan.

use crate::constants::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use crate::geometry::Point;

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are strictly positive and finite.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Zoom limits and step, usually taken from the editor configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub step: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            step: ZOOM_STEP,
            min: MIN_ZOOM,
            max: MAX_ZOOM,
        }
    }
}

/// Largest surface with the image's aspect ratio that fits inside `container`.
pub fn fit_surface(image: Size, container: Size) -> Size {
    if !image.is_usable() || !container.is_usable() {
        return container;
    }
    let scale = (container.width / image.width).min(container.height / image.height);
    Size::new(image.width * scale, image.height * scale)
}

/// Pan/zoom state plus the sizes needed to compose the base fit-scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    zoom: f32,
    pan_x: f32,
    pan_y: f32,
    image: Size,
    surface: Size,
    limits: ZoomLimits,
}

impl ViewTransform {
    /// Create a transform for a freshly loaded image (zoom 1, no pan).
    pub fn new(image: Size, surface: Size) -> Self {
        Self::with_limits(image, surface, ZoomLimits::default())
    }

    /// Create a transform with custom zoom limits.
    pub fn with_limits(image: Size, surface: Size, limits: ZoomLimits) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            image,
            surface,
            limits,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Current pan offset in surface pixels.
    pub fn pan(&self) -> (f32, f32) {
        (self.pan_x, self.pan_y)
    }

    pub fn image_size(&self) -> Size {
        self.image
    }

    pub fn surface_size(&self) -> Size {
        self.surface
    }

    /// Base fit-scale per axis (surface pixels per image pixel, before zoom).
    pub fn base_scale(&self) -> (f32, f32) {
        if !self.image.is_usable() {
            return (1.0, 1.0);
        }
        (
            self.surface.width / self.image.width,
            self.surface.height / self.image.height,
        )
    }

    /// Image pixels covered by one surface pixel along x at the current zoom.
    ///
    /// Used to keep hit tolerances constant on screen regardless of image
    /// resolution or zoom.
    pub fn image_per_surface_px(&self) -> f32 {
        let (sx, _) = self.base_scale();
        let scale = sx * self.zoom;
        if scale > 0.0 { 1.0 / scale } else { 1.0 }
    }

    /// Map a pointer-surface position into image space.
    pub fn surface_to_image(&self, surface: Point) -> Point {
        let c = self.surface.center();
        let (sx, sy) = self.base_scale();
        // Undo pan, then zoom about the centre, then the base scale.
        let fx = (surface.x - c.x - self.pan_x) / self.zoom + c.x;
        let fy = (surface.y - c.y - self.pan_y) / self.zoom + c.y;
        Point::new(fx / sx, fy / sy)
    }

    /// Map an image-space position onto the pointer surface.
    pub fn image_to_surface(&self, image: Point) -> Point {
        let c = self.surface.center();
        let (sx, sy) = self.base_scale();
        Point::new(
            c.x + self.pan_x + (image.x * sx - c.x) * self.zoom,
            c.y + self.pan_y + (image.y * sy - c.y) * self.zoom,
        )
    }

    /// Zoom in by one step, clamped to the maximum.
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * self.limits.step).min(self.limits.max);
    }

    /// Zoom out by one step, clamped to the minimum.
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / self.limits.step).max(self.limits.min);
    }

    /// Back to zoom 1 with no pan.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }

    /// Apply a pan delta in surface pixels.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Recompute the base scale for a resized surface. Zoom and pan are kept.
    pub fn refit(&mut self, surface: Size) {
        self.surface = surface;
    }

    /// Swap in a new image size. Zoom and pan are kept.
    pub fn set_image_size(&mut self, image: Size) {
        self.image = image;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn approx_point(a: Point, b: Point) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
    }

    fn view() -> ViewTransform {
        // 1000x500 image shown on a 500x250 surface: half scale
        ViewTransform::new(Size::new(1000.0, 500.0), Size::new(500.0, 250.0))
    }

    #[test]
    fn test_identity_maps_by_base_scale() {
        let v = view();
        assert_eq!(v.zoom(), 1.0);
        assert!(approx_point(
            v.surface_to_image(Point::new(100.0, 50.0)),
            Point::new(200.0, 100.0)
        ));
        assert!(approx_point(
            v.image_to_surface(Point::new(200.0, 100.0)),
            Point::new(100.0, 50.0)
        ));
    }

    #[test]
    fn test_round_trip_with_zoom_and_pan() {
        let mut v = view();
        v.zoom_in();
        v.zoom_in();
        v.pan_by(37.0, -12.0);

        let image = Point::new(640.0, 123.0);
        let back = v.surface_to_image(v.image_to_surface(image));
        assert!(approx_eq(back.x, image.x));
        assert!((back.y - image.y).abs() < 0.001);
    }

    #[test]
    fn test_zoom_keeps_centre_fixed() {
        let mut v = view();
        let centre = Point::new(250.0, 125.0);
        let before = v.surface_to_image(centre);
        v.zoom_in();
        let after = v.surface_to_image(centre);
        assert!(approx_point(before, after));
    }

    #[test]
    fn test_pan_shifts_surface_position() {
        let mut v = view();
        let p = Point::new(400.0, 200.0);
        let s0 = v.image_to_surface(p);
        v.pan_by(10.0, 20.0);
        let s1 = v.image_to_surface(p);
        assert!(approx_point(s1, Point::new(s0.x + 10.0, s0.y + 20.0)));
    }

    #[test]
    fn test_zoom_in_clamps_to_max() {
        let mut v = view();
        for _ in 0..50 {
            v.zoom_in();
        }
        assert_eq!(v.zoom(), MAX_ZOOM);
    }

    #[test]
    fn test_zoom_out_clamps_to_min() {
        let mut v = view();
        for _ in 0..50 {
            v.zoom_out();
        }
        assert_eq!(v.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_zoom_in_then_out() {
        let mut v = view();
        v.zoom_in();
        assert!(approx_eq(v.zoom(), 1.2));
        v.zoom_out();
        assert!(approx_eq(v.zoom(), 1.0));
    }

    #[test]
    fn test_reset() {
        let mut v = view();
        v.zoom_in();
        v.pan_by(5.0, 5.0);
        v.reset();
        assert_eq!(v.zoom(), 1.0);
        assert_eq!(v.pan(), (0.0, 0.0));
    }

    #[test]
    fn test_refit_keeps_zoom_and_pan() {
        let mut v = view();
        v.zoom_in();
        v.pan_by(3.0, 4.0);
        v.refit(Size::new(1000.0, 500.0));
        assert!(approx_eq(v.zoom(), 1.2));
        assert_eq!(v.pan(), (3.0, 4.0));
        assert_eq!(v.base_scale(), (1.0, 1.0));
    }

    #[test]
    fn test_image_per_surface_px() {
        let mut v = view();
        assert!(approx_eq(v.image_per_surface_px(), 2.0));
        v.zoom_in();
        assert!(approx_eq(v.image_per_surface_px(), 2.0 / 1.2));
    }

    #[test]
    fn test_fit_surface_preserves_aspect() {
        let fitted = fit_surface(Size::new(1000.0, 500.0), Size::new(800.0, 800.0));
        assert_eq!(fitted, Size::new(800.0, 400.0));

        let tall = fit_surface(Size::new(100.0, 400.0), Size::new(800.0, 800.0));
        assert_eq!(tall, Size::new(200.0, 800.0));
    }

    #[test]
    fn test_unusable_image_size_falls_back() {
        let v = ViewTransform::new(Size::new(0.0, 0.0), Size::new(100.0, 100.0));
        assert_eq!(v.base_scale(), (1.0, 1.0));
        assert_eq!(
            fit_surface(Size::new(0.0, 10.0), Size::new(50.0, 60.0)),
            Size::new(50.0, 60.0)
        );
    }
}
