use opencv::core::{Point, Rect};

/// Movable, fixed-size capture rectangle.
///
/// Pointer events arrive from the windowing adapter; the controller itself
/// never touches the window, so it can be driven with synthetic events.
/// Two states: idle, and dragging with the pointer offset captured at the
/// press. No bounds clamping happens here; the capture loop validates the
/// rectangle against the frame before cropping.
pub struct RoiController {
    rect: Rect,
    drag: Option<Point>,
}

impl RoiController {
    pub fn new(rect: Rect) -> Self {
        RoiController { rect, drag: None }
    }

    /// Current bounds of the rectangle.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Button press: if the pointer is inside the rectangle, start dragging
    /// and remember its offset from the top-left corner.
    pub fn pointer_down(&mut self, x: i32, y: i32) {
        if self.rect.contains(Point::new(x, y)) {
            self.drag = Some(Point::new(x - self.rect.x, y - self.rect.y));
        }
    }

    /// Pointer motion: while dragging, keep the grabbed point under the
    /// pointer. Width and height never change.
    pub fn pointer_move(&mut self, x: i32, y: i32) {
        if let Some(offset) = self.drag {
            self.rect.x = x - offset.x;
            self.rect.y = y - offset.y;
        }
    }

    /// Button release: back to idle, whatever the prior state.
    pub fn pointer_up(&mut self) {
        self.drag = None;
    }
}
