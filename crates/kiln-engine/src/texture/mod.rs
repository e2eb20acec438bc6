//! 2D textures.
//!
//! Creation never panics: invalid texel data, undecodable files and sink failures
//! all produce `None` so callers can pick a fallback.

mod format;

use std::path::Path;

use crate::gpu::{GpuSink, TextureHandle};

pub use format::{MagFilter, MinFilter, TexelData, TextureDesc, TextureFormat};

/// Texture object with its last bound slot.
#[derive(Debug)]
pub struct Texture {
    handle: TextureHandle,
    desc: TextureDesc,
    last_slot: u32,
}

impl Texture {
    /// Uploads `texels` as a new texture.
    ///
    /// `texels` must hold exactly `width * height * format.channels()` components.
    pub fn from_pixels(
        gpu: &mut dyn GpuSink,
        width: u32,
        height: u32,
        texels: TexelData<'_>,
        format: TextureFormat,
        min_filter: MinFilter,
        mag_filter: MagFilter,
    ) -> Option<Self> {
        let desc = TextureDesc {
            width,
            height,
            format,
            min_filter,
            mag_filter,
        };

        if width == 0 || height == 0 || texels.len() != desc.component_count() {
            log::warn!(
                "texture {}x{} {:?}: expected {} components, got {}",
                width,
                height,
                format,
                desc.component_count(),
                texels.len()
            );
            return None;
        }

        let Some(handle) = gpu.create_texture(&desc, texels) else {
            log::warn!("failed to create {}x{} {:?} texture", width, height, format);
            return None;
        };

        Some(Self {
            handle,
            desc,
            last_slot: 0,
        })
    }

    /// Decodes an image file into a texture of `format`.
    ///
    /// The image is converted to the format's channel count and flipped vertically
    /// so the bottom row lands at `v = 0`.
    pub fn from_file(
        gpu: &mut dyn GpuSink,
        path: impl AsRef<Path>,
        format: TextureFormat,
        min_filter: MinFilter,
        mag_filter: MagFilter,
    ) -> Option<Self> {
        let path = path.as_ref();
        let image = match image::open(path) {
            Ok(image) => image.flipv(),
            Err(e) => {
                log::warn!("failed to load texture {}: {e}", path.display());
                return None;
            }
        };

        let (width, height) = (image.width(), image.height());
        let bytes = match format.channels() {
            1 => image.into_luma8().into_raw(),
            3 => image.into_rgb8().into_raw(),
            _ => image.into_rgba8().into_raw(),
        };

        if format.is_float() {
            let floats: Vec<f32> = bytes.iter().map(|&b| b as f32 / 255.0).collect();
            Self::from_pixels(gpu, width, height, TexelData::F32(&floats), format, min_filter, mag_filter)
        } else {
            Self::from_pixels(gpu, width, height, TexelData::U8(&bytes), format, min_filter, mag_filter)
        }
    }

    /// Binds to slot 0.
    pub fn bind(&mut self, gpu: &mut dyn GpuSink) -> &mut Self {
        self.bind_slot(gpu, 0)
    }

    pub fn bind_slot(&mut self, gpu: &mut dyn GpuSink, slot: u32) -> &mut Self {
        self.last_slot = slot;
        gpu.bind_texture(Some(self.handle), slot);
        self
    }

    /// Slot used by the most recent bind.
    #[inline]
    pub fn slot(&self) -> u32 {
        self.last_slot
    }

    #[inline]
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.desc.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.desc.height
    }

    #[inline]
    pub fn format(&self) -> TextureFormat {
        self.desc.format
    }

    pub fn dispose(self, gpu: &mut dyn GpuSink) {
        gpu.delete_texture(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{GpuCommand, RecordingSink};

    fn checker(gpu: &mut dyn GpuSink) -> Option<Texture> {
        let texels = [255u8, 0, 0, 255, 255, 0, 0, 255, 255, 0, 0, 255, 255, 0, 0, 255];
        Texture::from_pixels(
            gpu,
            2,
            2,
            TexelData::U8(&texels),
            TextureFormat::Rgba,
            MinFilter::Nearest,
            MagFilter::Nearest,
        )
    }

    #[test]
    fn from_pixels_creates_texture() {
        let mut sink = RecordingSink::new();
        let tex = checker(&mut sink).unwrap();
        assert_eq!((tex.width(), tex.height()), (2, 2));
        assert_eq!(tex.format(), TextureFormat::Rgba);
    }

    #[test]
    fn from_pixels_rejects_wrong_length() {
        let mut sink = RecordingSink::new();
        let tex = Texture::from_pixels(
            &mut sink,
            2,
            2,
            TexelData::F32(&[0.0; 3]),
            TextureFormat::FloatRgb,
            MinFilter::Linear,
            MagFilter::Linear,
        );
        assert!(tex.is_none());
        assert!(sink.commands().is_empty());
    }

    #[test]
    fn from_pixels_returns_none_when_sink_fails() {
        let mut sink = RecordingSink::failing();
        assert!(checker(&mut sink).is_none());
    }

    #[test]
    fn from_file_missing_path_is_none() {
        let mut sink = RecordingSink::new();
        let tex = Texture::from_file(
            &mut sink,
            "definitely/not/here.png",
            TextureFormat::Rgba,
            MinFilter::Linear,
            MagFilter::Linear,
        );
        assert!(tex.is_none());
    }

    #[test]
    fn bind_slot_remembers_slot() {
        let mut sink = RecordingSink::new();
        let mut tex = checker(&mut sink).unwrap();
        tex.bind_slot(&mut sink, 3);
        assert_eq!(tex.slot(), 3);
        assert_eq!(
            sink.commands().last(),
            Some(&GpuCommand::BindTexture { handle: Some(tex.handle()), slot: 3 })
        );
        tex.bind(&mut sink);
        assert_eq!(tex.slot(), 0);
    }
}
