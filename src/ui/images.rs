//! Textures for uploaded images
//!
//! Messages carry images as `data:` URIs. They are decoded with the `image`
//! crate the first time they are shown and the texture is kept while the
//! message stays on screen; textures not drawn during a frame are released at
//! the end of it. Anything that fails to decode (SVG included) is remembered
//! as a failure and rendered as a text placeholder.

use crate::{Result, VocalisError};
use base64::Engine;
use egui::{ColorImage, TextureHandle, TextureOptions};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Raw bytes of a base64 `data:` URI
pub fn decode_data_uri(data_uri: &str) -> Result<Vec<u8>> {
    let (header, payload) = data_uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| VocalisError::ImageError("Not a data URI".to_string()))?;

    if !header.ends_with(";base64") {
        return Err(VocalisError::ImageError(format!("Unsupported encoding: {}", header)));
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| VocalisError::ImageError(e.to_string()))
}

pub fn decode_color_image(bytes: &[u8]) -> Result<ColorImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| VocalisError::ImageError(e.to_string()))?
        .to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, image.as_flat_samples().as_slice()))
}

// Bytes of the URI tail folded into the key alongside the message key
const KEY_TAIL: usize = 64;

/// Cache key for the image of one message.
///
/// The message key alone repeats across chats (same index, same placeholder
/// text), so the URI length and tail are mixed in without hashing the payload.
fn image_key(message_key: &str, data_uri: &str) -> egui::Id {
    let tail_start = data_uri.len().saturating_sub(KEY_TAIL);
    let tail = data_uri.get(tail_start..).unwrap_or(data_uri);
    egui::Id::new((message_key, data_uri.len(), tail))
}

struct CachedImage {
    texture: Option<TextureHandle>,
    drawn: bool,
}

#[derive(Default)]
pub struct ImageCache {
    textures: HashMap<egui::Id, CachedImage>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture for the image of the message keyed `message_key`, or `None`
    /// when it cannot be decoded
    pub fn texture(
        &mut self,
        ctx: &egui::Context,
        message_key: &str,
        data_uri: &str,
    ) -> Option<TextureHandle> {
        let id = image_key(message_key, data_uri);
        let entry = self.textures.entry(id).or_insert_with(|| {
            let texture = match decode_data_uri(data_uri).and_then(|bytes| decode_color_image(&bytes)) {
                Ok(image) => Some(ctx.load_texture(
                    format!("uploaded-{:?}", id),
                    image,
                    TextureOptions::LINEAR,
                )),
                Err(e) => {
                    warn!("Cannot display uploaded image: {}", e);
                    None
                }
            };
            CachedImage { texture, drawn: false }
        });
        entry.drawn = true;
        entry.texture.clone()
    }

    /// Release every image not requested since the previous call
    pub fn end_frame(&mut self) {
        let before = self.textures.len();
        self.textures.retain(|_, image| std::mem::take(&mut image.drawn));
        let released = before - self.textures.len();
        if released > 0 {
            debug!("Released {} image textures", released);
        }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::image::encode_data_uri;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(2, 3, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_data_uri() {
        assert_eq!(decode_data_uri("data:image/gif;base64,R0lGODlh").unwrap(), b"GIF89a");
        assert!(decode_data_uri("image/gif;base64,R0lGODlh").is_err());
        assert!(decode_data_uri("data:text/plain,hello").is_err());
    }

    #[test]
    fn test_decode_color_image() {
        let image = decode_color_image(&png_bytes()).unwrap();
        assert_eq!(image.size, [2, 3]);
        assert_eq!(image.pixels[0], egui::Color32::from_rgb(255, 0, 0));
    }

    #[test]
    fn test_cache_remembers_failures() {
        let ctx = egui::Context::default();
        let mut cache = ImageCache::new();

        let svg = encode_data_uri("image/svg+xml", b"<svg/>");
        assert!(cache.texture(&ctx, "message-0", &svg).is_none());
        assert!(cache.texture(&ctx, "message-0", &svg).is_none());
        assert_eq!(cache.len(), 1);

        let png = encode_data_uri("image/png", &png_bytes());
        let texture = cache.texture(&ctx, "message-1", &png).unwrap();
        assert_eq!(texture.size(), [2, 3]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_same_message_key_with_other_image_is_separate() {
        let ctx = egui::Context::default();
        let mut cache = ImageCache::new();

        let svg = encode_data_uri("image/svg+xml", b"<svg/>");
        let png = encode_data_uri("image/png", &png_bytes());
        assert!(cache.texture(&ctx, "message-0", &svg).is_none());
        assert!(cache.texture(&ctx, "message-0", &png).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_end_frame_releases_undrawn_images() {
        let ctx = egui::Context::default();
        let mut cache = ImageCache::new();
        let png = encode_data_uri("image/png", &png_bytes());

        cache.texture(&ctx, "message-0", &png);
        cache.texture(&ctx, "message-2", &png);
        cache.end_frame();
        assert_eq!(cache.len(), 2);

        // Only the first is still on screen
        cache.texture(&ctx, "message-0", &png);
        cache.end_frame();
        assert_eq!(cache.len(), 1);

        cache.end_frame();
        assert!(cache.is_empty());
    }
}
