use eframe::egui::Color32;

/// Simple RGBA color stored as floats in 0..1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Construct from 0-255 channel values.
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Translucent red used to highlight the region the user wants regenerated.
    pub fn highlight() -> Self {
        Self::rgba(255, 48, 48, 128)
    }

    /// Opaque ink; only its alpha matters when erasing.
    pub fn opaque_black() -> Self {
        Self::rgba(0, 0, 0, 255)
    }

    /// Convert to egui's 8-bit premultiplied format.
    ///
    /// Premultiplies in gamma space so the raster math stays linear in the
    /// stored bytes.
    pub fn to_color32(&self) -> Color32 {
        let a = self.a.clamp(0.0, 1.0);
        let channel = |c: f32| (c.clamp(0.0, 1.0) * a * 255.0).round() as u8;
        Color32::from_rgba_premultiplied(
            channel(self.r),
            channel(self.g),
            channel(self.b),
            (a * 255.0).round() as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_is_translucent_and_premultiplied() {
        let ink = Color::highlight().to_color32();
        assert_eq!(ink.a(), 128);
        assert!(ink.r() <= ink.a());
        assert_eq!(Color::opaque_black().to_color32(), Color32::BLACK);
    }
}
