use crate::canvas::raster::{RasterBuffer, blend_erase, blend_highlight};
use crate::utils::{color::Color, vector::{Vec2, distance_sq_to_segment}};
use eframe::egui::Color32;
use rayon::prelude::*;

/// Smallest brush diameter offered by the size control.
pub const MIN_BRUSH_SIZE: f32 = 5.0;
/// Largest brush diameter offered by the size control.
pub const MAX_BRUSH_SIZE: f32 = 100.0;
pub const DEFAULT_BRUSH_SIZE: f32 = 30.0;

/// Which compositing rule a stroke uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BrushTool {
    /// Translucent highlight, source-over.
    Paint,
    /// Opaque ink, destination-out.
    Erase,
}

impl BrushTool {
    pub fn label(&self) -> &'static str {
        match self {
            BrushTool::Paint => "Brush",
            BrushTool::Erase => "Eraser",
        }
    }
}

/// User-facing brush configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Brush {
    diameter: f32,
    pub color: Color,
    pub tool: BrushTool,
}

impl Default for Brush {
    fn default() -> Self {
        Self::new(DEFAULT_BRUSH_SIZE)
    }
}

impl Brush {
    /// Create a highlight brush; the diameter is clamped into the supported range.
    pub fn new(diameter: f32) -> Self {
        Self {
            diameter: clamp_brush_size(diameter),
            color: Color::highlight(),
            tool: BrushTool::Paint,
        }
    }

    pub fn diameter(&self) -> f32 {
        self.diameter
    }

    pub fn set_diameter(&mut self, diameter: f32) {
        self.diameter = clamp_brush_size(diameter);
    }

    pub fn radius(&self) -> f32 {
        self.diameter / 2.0
    }

    /// Premultiplied ink for the active tool.
    pub fn ink(&self) -> Color32 {
        match self.tool {
            BrushTool::Paint => self.color.to_color32(),
            BrushTool::Erase => Color::opaque_black().to_color32(),
        }
    }

    /// Composite a round-capped segment from `from` to `to` into the buffer.
    ///
    /// Every pixel whose center lies within the brush radius of the segment is
    /// blended exactly once. Returns whether any pixel was inside the buffer.
    pub fn paint_segment(&self, buffer: &mut RasterBuffer, from: Vec2, to: Vec2) -> bool {
        if buffer.is_zero_area() || !from.is_finite() || !to.is_finite() {
            return false;
        }

        let r = self.radius();
        let r_sq = r * r;
        let width = buffer.width() as i64;
        let height = buffer.height() as i64;

        let min_x = ((from.x.min(to.x) - r).floor() as i64).max(0);
        let max_x = ((from.x.max(to.x) + r).ceil() as i64).min(width - 1);
        let min_y = ((from.y.min(to.y) - r).floor() as i64).max(0);
        let max_y = ((from.y.max(to.y) + r).ceil() as i64).min(height - 1);

        if min_x > max_x || min_y > max_y {
            return false;
        }

        let (start_x, end_x) = (min_x as usize, max_x as usize);
        let (start_y, end_y) = (min_y as usize, max_y as usize);
        let row_len = buffer.width();
        let ink = self.ink();
        let tool = self.tool;

        let rows = &mut buffer.pixels_mut()[start_y * row_len..(end_y + 1) * row_len];
        rows.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(row, line)| {
                let cy = (start_y + row) as f32 + 0.5;
                for gx in start_x..=end_x {
                    let center = Vec2::new(gx as f32 + 0.5, cy);
                    if distance_sq_to_segment(center, from, to) > r_sq {
                        continue;
                    }
                    let dst = line[gx];
                    line[gx] = match tool {
                        BrushTool::Paint => blend_highlight(ink, dst),
                        BrushTool::Erase => blend_erase(ink, dst),
                    };
                }
            });
        true
    }
}

/// Clamp a requested brush diameter into the supported 5..=100 range.
pub fn clamp_brush_size(size: f32) -> f32 {
    if size.is_nan() {
        return DEFAULT_BRUSH_SIZE;
    }
    size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
}
