use crate::app::assets::{AssetId, ImageAsset};
use eframe::egui;
use eframe::egui::{ColorImage, TextureHandle, TextureOptions};

/// Which on-screen image a preview belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewSlot {
    Model,
    Product,
    Mask,
    Result,
}

impl PreviewSlot {
    fn index(self) -> usize {
        match self {
            PreviewSlot::Model => 0,
            PreviewSlot::Product => 1,
            PreviewSlot::Mask => 2,
            PreviewSlot::Result => 3,
        }
    }

    fn texture_name(self) -> &'static str {
        match self {
            PreviewSlot::Model => "preview_model",
            PreviewSlot::Product => "preview_product",
            PreviewSlot::Mask => "preview_mask",
            PreviewSlot::Result => "preview_result",
        }
    }
}

struct Preview {
    asset: AssetId,
    texture: Option<TextureHandle>,
}

/// One decoded texture per slot, tied to the asset it was decoded from.
///
/// When the slot's asset changes or goes away the old handle is dropped,
/// which frees the GPU texture.
#[derive(Default)]
pub struct PreviewCache {
    slots: [Option<Preview>; 4],
}

impl PreviewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture for `asset`, decoding and uploading it on first use.
    pub fn texture(
        &mut self,
        ctx: &egui::Context,
        slot: PreviewSlot,
        asset: Option<&ImageAsset>,
    ) -> Option<&TextureHandle> {
        let entry = &mut self.slots[slot.index()];
        let Some(asset) = asset else {
            if entry.take().is_some() {
                log::debug!("released {} texture", slot.texture_name());
            }
            return None;
        };

        let stale = entry.as_ref().is_none_or(|p| p.asset != asset.id());
        if stale {
            let texture = match asset.decode_rgba() {
                Ok(rgba) => {
                    let size = [rgba.width() as usize, rgba.height() as usize];
                    let image = ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                    Some(ctx.load_texture(slot.texture_name(), image, TextureOptions::LINEAR))
                }
                Err(err) => {
                    log::warn!("could not decode {} preview: {err}", slot.texture_name());
                    None
                }
            };
            *entry = Some(Preview {
                asset: asset.id(),
                texture,
            });
        }
        entry.as_ref().and_then(|p| p.texture.as_ref())
    }

    pub fn is_loaded(&self, slot: PreviewSlot) -> bool {
        self.slots[slot.index()]
            .as_ref()
            .is_some_and(|p| p.texture.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::assets::test_images::png_bytes;

    #[test]
    fn replacing_the_asset_replaces_the_texture() {
        let ctx = egui::Context::default();
        let mut cache = PreviewCache::new();
        let first = ImageAsset::from_bytes(png_bytes(6, 4)).unwrap();
        let second = ImageAsset::from_bytes(png_bytes(3, 3)).unwrap();

        let id_a = cache.texture(&ctx, PreviewSlot::Model, Some(&first)).unwrap().id();
        let id_again = cache.texture(&ctx, PreviewSlot::Model, Some(&first)).unwrap().id();
        assert_eq!(id_a, id_again);

        let tex = cache.texture(&ctx, PreviewSlot::Model, Some(&second)).unwrap();
        assert_ne!(tex.id(), id_a);
        assert_eq!(tex.size(), [3, 3]);
    }

    #[test]
    fn removed_asset_releases_the_handle() {
        let ctx = egui::Context::default();
        let mut cache = PreviewCache::new();
        let asset = ImageAsset::from_bytes(png_bytes(2, 2)).unwrap();
        cache.texture(&ctx, PreviewSlot::Result, Some(&asset));
        assert!(cache.is_loaded(PreviewSlot::Result));
        assert!(!cache.is_loaded(PreviewSlot::Mask));
        assert!(cache.texture(&ctx, PreviewSlot::Result, None).is_none());
        assert!(!cache.is_loaded(PreviewSlot::Result));
    }
}
