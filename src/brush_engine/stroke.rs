use crate::brush_engine::brush::Brush;
use crate::canvas::raster::RasterBuffer;
use crate::utils::{profiler::ScopeTimer, vector::Vec2};

/// Tracks the one piece of per-stroke state the buffer needs: the last sample.
///
/// Points are not retained; each sample is painted immediately and forgotten.
pub struct StrokeState {
    pub last_pos: Option<Vec2>,
    stroke_timer: Option<ScopeTimer>,
}

impl StrokeState {
    /// Start a stroke and paint its initial round dot.
    pub fn begin(brush: &Brush, buffer: &mut RasterBuffer, pos: Vec2) -> Self {
        brush.paint_segment(buffer, pos, pos);
        Self {
            last_pos: Some(pos),
            stroke_timer: Some(ScopeTimer::new("stroke")),
        }
    }

    /// Paint a connected segment from the previous sample to `pos`.
    pub fn add_point(&mut self, brush: &Brush, buffer: &mut RasterBuffer, pos: Vec2) {
        let from = self.last_pos.unwrap_or(pos);
        if from == pos {
            return;
        }
        brush.paint_segment(buffer, from, pos);
        self.last_pos = Some(pos);
    }

    /// Reset the stroke state and emit the timing.
    pub fn end(&mut self) {
        self.last_pos = None;
        self.stroke_timer.take();
    }
}
