//! Zoom and pan state mapping canvas space onto the visible surface.
//!
//! `viewport = canvas * zoom + pan`, with the viewport origin in the
//! top-left corner of the drawing surface.

use super::geometry::{Point, Rect, Size};

pub const MIN_ZOOM: f64 = 0.05;
pub const MAX_ZOOM: f64 = 8.0;

/// Margin left around the graph by [`Viewport::fit_view`].
pub const FIT_PADDING: f64 = 16.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan: Point,
    size: Size,
}

impl Viewport {
    pub fn new(size: Size) -> Self {
        Self {
            zoom: 1.0,
            pan: Point::default(),
            size,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    pub fn canvas_to_viewport(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.pan.x, p.y * self.zoom + self.pan.y)
    }

    pub fn viewport_to_canvas(&self, p: Point) -> Point {
        Point::new((p.x - self.pan.x) / self.zoom, (p.y - self.pan.y) / self.zoom)
    }

    /// Maps a canvas rectangle into viewport space.
    pub fn rect_to_viewport(&self, r: Rect) -> Rect {
        let origin = self.canvas_to_viewport(Point::new(r.x, r.y));
        Rect::new(origin.x, origin.y, r.width * self.zoom, r.height * self.zoom)
    }

    /// Shifts the view by a viewport-space offset.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    /// Multiplies the zoom by `factor`, keeping the canvas point under
    /// `origin` fixed on screen. The result is clamped to
    /// [`MIN_ZOOM`]..=[`MAX_ZOOM`].
    pub fn zoom_by(&mut self, factor: f64, origin: Point) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let anchor = self.viewport_to_canvas(origin);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = Point::new(
            origin.x - anchor.x * self.zoom,
            origin.y - anchor.y * self.zoom,
        );
    }

    /// Scales and centers the view so `bounds` fits with [`FIT_PADDING`]
    /// on every side.
    pub fn fit_view(&mut self, bounds: Rect) {
        if self.size.is_empty() || bounds.width <= 0.0 || bounds.height <= 0.0 {
            return;
        }
        let avail_w = (self.size.width - 2.0 * FIT_PADDING).max(1.0);
        let avail_h = (self.size.height - 2.0 * FIT_PADDING).max(1.0);
        self.zoom = (avail_w / bounds.width)
            .min(avail_h / bounds.height)
            .clamp(MIN_ZOOM, MAX_ZOOM);

        let c = bounds.center();
        self.pan = Point::new(
            self.size.width / 2.0 - c.x * self.zoom,
            self.size.height / 2.0 - c.y * self.zoom,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transforms_are_inverse() {
        let mut vp = Viewport::new(Size::new(800.0, 600.0));
        vp.pan_by(30.0, -12.0);
        vp.zoom_by(2.5, Point::new(100.0, 100.0));
        let p = Point::new(-42.0, 17.5);
        let back = vp.viewport_to_canvas(vp.canvas_to_viewport(p));
        assert!((back.x - p.x).abs() < 1e-9);
        assert!((back.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn zoom_keeps_origin_fixed_and_clamps() {
        let mut vp = Viewport::new(Size::new(800.0, 600.0));
        let origin = Point::new(400.0, 300.0);
        let before = vp.viewport_to_canvas(origin);
        vp.zoom_by(4.0, origin);
        let after = vp.viewport_to_canvas(origin);
        assert!((before.x - after.x).abs() < 1e-9);

        vp.zoom_by(1000.0, origin);
        assert_eq!(vp.zoom(), MAX_ZOOM);
        vp.zoom_by(1e-9, origin);
        assert_eq!(vp.zoom(), MIN_ZOOM);
    }

    #[test]
    fn fit_view_centers_bounds() {
        let mut vp = Viewport::new(Size::new(832.0, 432.0));
        vp.fit_view(Rect::new(-400.0, 0.0, 800.0, 200.0));
        assert_eq!(vp.zoom(), 1.0);
        let c = vp.canvas_to_viewport(Point::new(0.0, 100.0));
        assert_eq!(c, Point::new(416.0, 216.0));
    }

    #[test]
    fn fit_view_ignores_empty_surface() {
        let mut vp = Viewport::new(Size::new(0.0, 0.0));
        vp.fit_view(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(vp.zoom(), 1.0);
    }
}
