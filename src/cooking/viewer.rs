//! Full-screen dish photo with pan and zoom.

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 4.0;
/// Zoom change per button press
pub const ZOOM_STEP: f64 = 0.5;
/// Zoom change per unit of wheel delta (negative: wheel up zooms in)
pub const WHEEL_FACTOR: f64 = -0.005;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageViewer {
    open: bool,
    zoom: f64,
    pan: Point,
    /// `pointer - pan` captured when a drag starts
    drag_anchor: Option<Point>,
}

impl Default for ImageViewer {
    fn default() -> Self {
        Self {
            open: false,
            zoom: MIN_ZOOM,
            pan: Point::ORIGIN,
            drag_anchor: None,
        }
    }
}

impl ImageViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Open only when there is something to show
    pub fn open(&mut self, has_image: bool) -> bool {
        if has_image {
            self.open = true;
        }
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
        self.drag_anchor = None;
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn wheel(&mut self, delta_y: f64) {
        self.set_zoom(self.zoom + delta_y * WHEEL_FACTOR);
    }

    pub fn reset(&mut self) {
        self.zoom = MIN_ZOOM;
        self.pan = Point::ORIGIN;
        self.drag_anchor = None;
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if self.zoom <= MIN_ZOOM {
            self.pan = Point::ORIGIN;
            self.drag_anchor = None;
        }
    }

    /// Mouse button down; starts a drag only when zoomed in
    pub fn pointer_down(&mut self, pointer: Point) {
        if self.zoom > MIN_ZOOM {
            self.drag_anchor = Some(Point::new(pointer.x - self.pan.x, pointer.y - self.pan.y));
        }
    }

    pub fn pointer_move(&mut self, pointer: Point) {
        if self.zoom <= MIN_ZOOM {
            return;
        }
        if let Some(anchor) = self.drag_anchor {
            self.pan = Point::new(pointer.x - anchor.x, pointer.y - anchor.y);
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag_anchor = None;
    }

    /// Touch start; multi-touch never pans
    pub fn touch_start(&mut self, touches: &[Point]) {
        if let [touch] = touches {
            self.pointer_down(*touch);
        }
    }

    pub fn touch_move(&mut self, touches: &[Point]) {
        if let [touch] = touches {
            self.pointer_move(*touch);
        }
    }

    pub fn touch_end(&mut self) {
        self.pointer_up();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_requires_image() {
        let mut viewer = ImageViewer::new();
        assert!(!viewer.open(false));
        assert!(viewer.open(true));
        viewer.close();
        assert!(!viewer.is_open());
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut viewer = ImageViewer::new();
        for _ in 0..10 {
            viewer.zoom_in();
        }
        assert_eq!(viewer.zoom(), MAX_ZOOM);
        viewer.wheel(-100.0);
        assert_eq!(viewer.zoom(), MAX_ZOOM);
        viewer.wheel(200.0);
        assert_eq!(viewer.zoom(), 3.0);
        for _ in 0..10 {
            viewer.zoom_out();
        }
        assert_eq!(viewer.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_pan_only_when_zoomed() {
        let mut viewer = ImageViewer::new();
        viewer.pointer_down(Point::new(10.0, 10.0));
        viewer.pointer_move(Point::new(50.0, 50.0));
        assert_eq!(viewer.pan(), Point::ORIGIN);
        assert!(!viewer.is_dragging());

        viewer.zoom_in();
        viewer.pointer_down(Point::new(10.0, 10.0));
        viewer.pointer_move(Point::new(30.0, 25.0));
        assert_eq!(viewer.pan(), Point::new(20.0, 15.0));
        viewer.pointer_up();

        // A second drag continues from the current pan
        viewer.pointer_down(Point::new(0.0, 0.0));
        viewer.pointer_move(Point::new(5.0, 5.0));
        assert_eq!(viewer.pan(), Point::new(25.0, 20.0));
        viewer.pointer_up();

        viewer.zoom_out();
        assert_eq!(viewer.pan(), Point::ORIGIN);
    }

    #[test]
    fn test_multi_touch_does_not_pan() {
        let mut viewer = ImageViewer::new();
        viewer.zoom_in();
        viewer.touch_start(&[Point::new(0.0, 0.0), Point::new(10.0, 10.0)]);
        assert!(!viewer.is_dragging());

        viewer.touch_start(&[Point::new(0.0, 0.0)]);
        viewer.touch_move(&[Point::new(4.0, 4.0), Point::new(9.0, 9.0)]);
        assert_eq!(viewer.pan(), Point::ORIGIN);
        viewer.touch_move(&[Point::new(4.0, 6.0)]);
        assert_eq!(viewer.pan(), Point::new(4.0, 6.0));
    }

    #[test]
    fn test_reset() {
        let mut viewer = ImageViewer::new();
        viewer.zoom_in();
        viewer.pointer_down(Point::new(0.0, 0.0));
        viewer.pointer_move(Point::new(7.0, 7.0));
        viewer.reset();
        assert_eq!(viewer.zoom(), MIN_ZOOM);
        assert_eq!(viewer.pan(), Point::ORIGIN);
    }
}
