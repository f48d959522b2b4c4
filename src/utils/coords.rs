//! Pointer-to-raster coordinate mapping.
//!
//! The drawing overlay is laid out in screen units while its pixel buffer has
//! its own backing size; the two diverge whenever the layout scales the
//! surface. Every pointer sample goes through [`map_to_raster`] before it
//! touches the buffer.

use crate::utils::vector::Vec2;

/// On-screen bounding box of the raster surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= self.left
            && pos.y >= self.top
            && pos.x <= self.left + self.width
            && pos.y <= self.top + self.height
    }
}

/// Map a pointer position to backing-pixel coordinates.
///
/// A zero-width or zero-height rect produces non-finite output; use
/// [`try_map_to_raster`] when the rect is not known to be laid out.
pub fn map_to_raster(
    event: Vec2,
    rect: ScreenRect,
    backing_width: usize,
    backing_height: usize,
) -> Vec2 {
    Vec2 {
        x: (event.x - rect.left) / rect.width * backing_width as f32,
        y: (event.y - rect.top) / rect.height * backing_height as f32,
    }
}

/// Guarded variant of [`map_to_raster`] that refuses zero-size surfaces.
pub fn try_map_to_raster(
    event: Vec2,
    rect: ScreenRect,
    backing_width: usize,
    backing_height: usize,
) -> Option<Vec2> {
    if rect.is_empty() || backing_width == 0 || backing_height == 0 {
        return None;
    }
    let mapped = map_to_raster(event, rect, backing_width, backing_height);
    mapped.is_finite().then_some(mapped)
}
