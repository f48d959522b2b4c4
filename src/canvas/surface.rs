use crate::brush_engine::brush::{Brush, BrushTool};
use crate::brush_engine::stroke::StrokeState;
use crate::canvas::raster::RasterBuffer;
use crate::utils::coords::{ScreenRect, try_map_to_raster};
use crate::utils::vector::Vec2;

/// Minimal capability a raster backend needs to host freehand strokes.
pub trait RasterSurface {
    /// Start a stroke at a raster-space position.
    fn begin_stroke(&mut self, pos: Vec2);
    /// Extend the active stroke; ignored when no stroke is active.
    fn extend_stroke(&mut self, pos: Vec2);
    fn end_stroke(&mut self);
    /// Current raster content.
    fn snapshot(&self) -> &RasterBuffer;
}

/// Region editor surface laid over the displayed result image.
///
/// The buffer is sized to the image's displayed box, not its native
/// resolution, and is wiped whenever that box changes size.
pub struct DrawingSurface {
    buffer: RasterBuffer,
    brush: Brush,
    stroke: Option<StrokeState>,
    dirty: bool,
}

impl DrawingSurface {
    /// Attach a fresh, empty surface of the displayed size.
    pub fn attach(display_width: usize, display_height: usize, brush: Brush) -> Self {
        log::debug!("attaching drawing surface {display_width}x{display_height}");
        Self {
            buffer: RasterBuffer::new(display_width, display_height),
            brush,
            stroke: None,
            dirty: true,
        }
    }

    /// Follow the displayed size. Any change discards existing ink.
    ///
    /// Returns true if the buffer was reallocated.
    pub fn observe_size(&mut self, display_width: usize, display_height: usize) -> bool {
        if self.buffer.width() == display_width && self.buffer.height() == display_height {
            return false;
        }
        log::debug!(
            "drawing surface resized {}x{} -> {display_width}x{display_height}, clearing",
            self.buffer.width(),
            self.buffer.height()
        );
        self.buffer = RasterBuffer::new(display_width, display_height);
        self.stroke = None;
        self.dirty = true;
        true
    }

    pub fn width(&self) -> usize {
        self.buffer.width()
    }

    pub fn height(&self) -> usize {
        self.buffer.height()
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn set_tool(&mut self, tool: BrushTool) {
        self.brush.tool = tool;
    }

    pub fn set_brush_size(&mut self, size: f32) {
        self.brush.set_diameter(size);
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    /// Returns whether the buffer changed since the last call, and resets the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Pointer pressed over the surface.
    pub fn pointer_down(&mut self, event: Vec2, rect: ScreenRect) {
        if let Some(pos) = self.to_raster(event, rect) {
            self.begin_stroke(pos);
        }
    }

    /// Pointer moved; only paints while a stroke is active.
    pub fn pointer_move(&mut self, event: Vec2, rect: ScreenRect) {
        if !self.is_drawing() {
            return;
        }
        if let Some(pos) = self.to_raster(event, rect) {
            self.extend_stroke(pos);
        }
    }

    pub fn pointer_up(&mut self) {
        self.end_stroke();
    }

    /// Pointer left the surface; the stroke ends like a release.
    pub fn pointer_leave(&mut self) {
        self.end_stroke();
    }

    fn to_raster(&self, event: Vec2, rect: ScreenRect) -> Option<Vec2> {
        try_map_to_raster(event, rect, self.buffer.width(), self.buffer.height())
    }
}

impl RasterSurface for DrawingSurface {
    fn begin_stroke(&mut self, pos: Vec2) {
        if self.buffer.is_zero_area() {
            return;
        }
        if let Some(mut previous) = self.stroke.take() {
            previous.end();
        }
        self.stroke = Some(StrokeState::begin(&self.brush, &mut self.buffer, pos));
        self.dirty = true;
    }

    fn extend_stroke(&mut self, pos: Vec2) {
        if let Some(stroke) = &mut self.stroke {
            stroke.add_point(&self.brush, &mut self.buffer, pos);
            self.dirty = true;
        }
    }

    fn end_stroke(&mut self) {
        if let Some(mut stroke) = self.stroke.take() {
            stroke.end();
        }
    }

    fn snapshot(&self) -> &RasterBuffer {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(w: usize, h: usize) -> DrawingSurface {
        DrawingSurface::attach(w, h, Brush::new(10.0))
    }

    #[test]
    fn pointer_events_map_through_layout_scale() {
        // 100x50 backing shown at 2x
        let mut s = surface(100, 50);
        let rect = ScreenRect::new(20.0, 10.0, 200.0, 100.0);
        s.pointer_down(Vec2::new(120.0, 60.0), rect);
        assert!(s.is_drawing());
        s.pointer_up();
        assert!(!s.is_drawing());
        assert!(s.snapshot().pixel(50, 25).unwrap().a() > 0);
        assert_eq!(s.snapshot().pixel(90, 25).unwrap().a(), 0);
    }

    #[test]
    fn moves_without_a_pressed_pointer_do_not_paint() {
        let mut s = surface(40, 40);
        let rect = ScreenRect::new(0.0, 0.0, 40.0, 40.0);
        s.pointer_move(Vec2::new(20.0, 20.0), rect);
        assert!(!s.snapshot().has_ink());
    }

    #[test]
    fn leaving_the_surface_ends_the_stroke() {
        let mut s = surface(40, 40);
        let rect = ScreenRect::new(0.0, 0.0, 40.0, 40.0);
        s.pointer_down(Vec2::new(5.0, 5.0), rect);
        s.pointer_leave();
        s.pointer_move(Vec2::new(35.0, 35.0), rect);
        assert_eq!(s.snapshot().pixel(35, 35).unwrap().a(), 0);
    }

    #[test]
    fn resize_clears_but_same_size_keeps_ink() {
        let mut s = surface(30, 30);
        s.begin_stroke(Vec2::new(15.0, 15.0));
        s.end_stroke();
        assert!(!s.observe_size(30, 30));
        assert!(s.snapshot().has_ink());

        assert!(s.observe_size(60, 45));
        assert_eq!((s.width(), s.height()), (60, 45));
        assert!(!s.snapshot().has_ink());
    }

    #[test]
    fn zero_size_surface_ignores_input() {
        let mut s = surface(0, 0);
        s.pointer_down(Vec2::new(0.0, 0.0), ScreenRect::new(0.0, 0.0, 0.0, 0.0));
        s.begin_stroke(Vec2::new(0.0, 0.0));
        assert!(!s.is_drawing());
    }

    #[test]
    fn dirty_flag_tracks_changes() {
        let mut s = surface(10, 10);
        assert!(s.take_dirty());
        assert!(!s.take_dirty());
        s.begin_stroke(Vec2::new(5.0, 5.0));
        assert!(s.take_dirty());
    }
}
