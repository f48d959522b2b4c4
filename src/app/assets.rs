use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use image::{ImageReader, RgbaImage};

use crate::error::TryOnError;
use crate::generation::request::ImagePayload;

static NEXT_ASSET_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an [`ImageAsset`]; previews key off it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AssetId(u64);

/// Encoded image plus what was learned decoding its header.
///
/// Assets are immutable; re-selecting a photo builds a new asset.
#[derive(Clone, Debug)]
pub struct ImageAsset {
    id: AssetId,
    bytes: Arc<[u8]>,
    mime_type: String,
    width: u32,
    height: u32,
}

impl ImageAsset {
    /// Sniff the format and read native dimensions from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, TryOnError> {
        let reader = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|err| TryOnError::AssetDecode(err.to_string()))?;
        let format = reader
            .format()
            .ok_or_else(|| TryOnError::AssetDecode("unrecognized image format".to_string()))?;
        let (width, height) = reader.into_dimensions()?;
        if width == 0 || height == 0 {
            return Err(TryOnError::AssetDecode(format!(
                "image has no pixels ({width}x{height})"
            )));
        }
        Ok(Self {
            id: AssetId(NEXT_ASSET_ID.fetch_add(1, Ordering::Relaxed)),
            bytes: bytes.into(),
            mime_type: format.to_mime_type().to_string(),
            width,
            height,
        })
    }

    /// Adopt an image returned by the generation service.
    pub fn from_payload(payload: ImagePayload) -> Result<Self, TryOnError> {
        let declared = payload.mime_type;
        let asset = Self::from_bytes(payload.data)?;
        if declared != asset.mime_type {
            log::debug!("payload declared {declared}, sniffed {}", asset.mime_type);
        }
        Ok(asset)
    }

    pub fn load(path: &Path) -> Result<Self, TryOnError> {
        let bytes = std::fs::read(path)
            .map_err(|err| TryOnError::AssetDecode(format!("{}: {err}", path.display())))?;
        Self::from_bytes(bytes)
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encoded copy for an outbound request.
    pub fn to_payload(&self) -> ImagePayload {
        ImagePayload::new(self.mime_type.clone(), self.bytes.to_vec())
    }

    /// Full decode for on-screen preview.
    pub fn decode_rgba(&self) -> Result<RgbaImage, TryOnError> {
        Ok(image::load_from_memory(&self.bytes)?.to_rgba8())
    }
}

#[cfg(test)]
pub(crate) mod test_images {
    use super::*;
    use image::ImageFormat;

    /// Encode a flat-colored PNG of the given size.
    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, image::Rgba([90, 120, 200, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }
}
