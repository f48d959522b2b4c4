//! Binary selection masks derived from the region editor.
//!
//! Convention: white (255) marks pixels to keep, black (0) marks the region
//! the generation service should redraw. Nothing in between survives.

use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};
use rayon::prelude::*;

use crate::canvas::raster::RasterBuffer;
use crate::utils::profiler::ScopeTimer;

pub const MASK_KEEP: u8 = 255;
pub const MASK_EDIT: u8 = 0;

/// Two-level bitmap with the same dimensions as the buffer it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Mask {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of pixels marked for redrawing.
    pub fn selected_pixels(&self) -> usize {
        self.pixels.iter().filter(|&&v| v == MASK_EDIT).count()
    }

    /// Encode as an 8-bit grayscale PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let _timer = ScopeTimer::new("mask_encode_png");
        let image = GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            Luma([self.pixels[y as usize * self.width + x as usize]])
        });
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// Derive the selection mask from the editor's raster buffer.
///
/// The output starts white; every pixel whose alpha is non-zero (painted and
/// not erased since) becomes solid black. With no surface, or a surface with
/// no pixels, there is nothing to derive and `None` is returned.
pub fn produce_mask(buffer: Option<&RasterBuffer>) -> Option<Mask> {
    let buffer = buffer?;
    if buffer.is_zero_area() {
        return None;
    }
    let _timer = ScopeTimer::new("produce_mask");

    let mut pixels = vec![MASK_KEEP; buffer.width() * buffer.height()];
    pixels
        .par_iter_mut()
        .zip(buffer.pixels().par_iter())
        .for_each(|(out, src)| {
            if src.a() != 0 {
                *out = MASK_EDIT;
            }
        });

    Some(Mask {
        width: buffer.width(),
        height: buffer.height(),
        pixels,
    })
}
