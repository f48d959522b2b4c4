use eframe::egui::{Color32, ColorImage};

use crate::utils::profiler::ScopeTimer;

/// Live pixel surface backing the region editor.
///
/// Pixels are stored premultiplied, row-major, starting fully transparent.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color32>,
}

impl RasterBuffer {
    /// Allocate a transparent buffer of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color32::TRANSPARENT; width * height],
        }
    }

    /// Current buffer width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Current buffer height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// True when the buffer has no addressable pixels.
    pub fn is_zero_area(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[Color32] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Color32] {
        &mut self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Overwrite a single pixel; out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color32) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    /// Drop all ink.
    pub fn clear(&mut self) {
        self.pixels.fill(Color32::TRANSPARENT);
    }

    /// True if at least one pixel carries ink.
    pub fn has_ink(&self) -> bool {
        self.pixels.iter().any(|p| p.a() > 0)
    }

    /// Copy the buffer into an egui image for upload as an overlay texture.
    pub fn write_to_color_image(&self, out: &mut ColorImage) {
        let _timer = ScopeTimer::new("raster_to_color_image");
        if out.size != [self.width, self.height] {
            out.size = [self.width, self.height];
            out.pixels.resize(self.width * self.height, Color32::TRANSPARENT);
        }
        out.pixels.copy_from_slice(&self.pixels);
    }
}

/// Standard "source over" alpha compositing for premultiplied colors.
pub fn alpha_over(src: Color32, dst: Color32) -> Color32 {
    let src_a = src.a() as u32;
    let dst_a = dst.a() as u32;
    let inv = 255 - src_a;
    let out_a = src_a + (dst_a * inv + 127) / 255;
    if out_a == 0 {
        return Color32::TRANSPARENT;
    }

    let out_r = src.r() as u32 + (dst.r() as u32 * inv + 127) / 255;
    let out_g = src.g() as u32 + (dst.g() as u32 * inv + 127) / 255;
    let out_b = src.b() as u32 + (dst.b() as u32 * inv + 127) / 255;

    Color32::from_rgba_premultiplied(
        out_r.min(255) as u8,
        out_g.min(255) as u8,
        out_b.min(255) as u8,
        out_a.min(255) as u8,
    )
}

/// Source-over whose resulting alpha never climbs past the stronger of the
/// two inputs, so repeated passes of the same translucent ink stay at the
/// ink's own opacity.
pub fn blend_highlight(src: Color32, dst: Color32) -> Color32 {
    let ceiling = src.a().max(dst.a()) as u32;
    let over = alpha_over(src, dst);
    let out_a = over.a() as u32;
    if out_a <= ceiling {
        return over;
    }
    let scale = |c: u8| ((c as u32 * ceiling + out_a / 2) / out_a).min(ceiling) as u8;
    Color32::from_rgba_premultiplied(
        scale(over.r()),
        scale(over.g()),
        scale(over.b()),
        ceiling as u8,
    )
}

/// Erase blend mode ("destination out"): reduce destination alpha by the source alpha.
pub fn blend_erase(src: Color32, dst: Color32) -> Color32 {
    let src_a = src.a() as u32;
    let inv = 255 - src_a;
    let out_a = (dst.a() as u32 * inv + 127) / 255;
    let out_r = (dst.r() as u32 * inv + 127) / 255;
    let out_g = (dst.g() as u32 * inv + 127) / 255;
    let out_b = (dst.b() as u32 * inv + 127) / 255;
    Color32::from_rgba_premultiplied(
        out_r.min(255) as u8,
        out_g.min(255) as u8,
        out_b.min(255) as u8,
        out_a.min(255) as u8,
    )
}
