//! CPU-side conversions from engine types to wgpu types.

use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Pixel, RgbaImage};

use crate::mesh::{Attrib, DrawMode, ElementType};
use crate::texture::{MagFilter, MinFilter, TexelData, TextureDesc, TextureFormat};

// ── vertex formats ────────────────────────────────────────────────────────

/// Maps an attribute to a wgpu vertex format.
///
/// Returns `None` for shapes wgpu cannot fetch (3-component 8/16-bit vectors,
/// normalized 32-bit integers, more than 4 components).
pub(super) fn vertex_format(attrib: Attrib) -> Option<wgpu::VertexFormat> {
    use ElementType as E;
    use wgpu::VertexFormat as F;

    let n = attrib.normalized;
    let format = match (attrib.element, attrib.components, n) {
        (E::UByte, 1, false) => F::Uint8,
        (E::UByte, 2, false) => F::Uint8x2,
        (E::UByte, 4, false) => F::Uint8x4,
        (E::UByte, 1, true) => F::Unorm8,
        (E::UByte, 2, true) => F::Unorm8x2,
        (E::UByte, 4, true) => F::Unorm8x4,
        (E::Byte, 1, false) => F::Sint8,
        (E::Byte, 2, false) => F::Sint8x2,
        (E::Byte, 4, false) => F::Sint8x4,
        (E::Byte, 1, true) => F::Snorm8,
        (E::Byte, 2, true) => F::Snorm8x2,
        (E::Byte, 4, true) => F::Snorm8x4,

        (E::UShort, 1, false) => F::Uint16,
        (E::UShort, 2, false) => F::Uint16x2,
        (E::UShort, 4, false) => F::Uint16x4,
        (E::UShort, 1, true) => F::Unorm16,
        (E::UShort, 2, true) => F::Unorm16x2,
        (E::UShort, 4, true) => F::Unorm16x4,
        (E::Short, 1, false) => F::Sint16,
        (E::Short, 2, false) => F::Sint16x2,
        (E::Short, 4, false) => F::Sint16x4,
        (E::Short, 1, true) => F::Snorm16,
        (E::Short, 2, true) => F::Snorm16x2,
        (E::Short, 4, true) => F::Snorm16x4,

        (E::UInt, 1, false) => F::Uint32,
        (E::UInt, 2, false) => F::Uint32x2,
        (E::UInt, 3, false) => F::Uint32x3,
        (E::UInt, 4, false) => F::Uint32x4,
        (E::Int, 1, false) => F::Sint32,
        (E::Int, 2, false) => F::Sint32x2,
        (E::Int, 3, false) => F::Sint32x3,
        (E::Int, 4, false) => F::Sint32x4,

        // Normalization is meaningless for floats.
        (E::Float, 1, _) => F::Float32,
        (E::Float, 2, _) => F::Float32x2,
        (E::Float, 3, _) => F::Float32x3,
        (E::Float, 4, _) => F::Float32x4,
        (E::Double, 1, _) => F::Float64,
        (E::Double, 2, _) => F::Float64x2,
        (E::Double, 3, _) => F::Float64x3,
        (E::Double, 4, _) => F::Float64x4,

        _ => return None,
    };
    Some(format)
}

#[inline]
pub(super) fn topology(mode: DrawMode) -> wgpu::PrimitiveTopology {
    match mode {
        DrawMode::Lines => wgpu::PrimitiveTopology::LineList,
        DrawMode::Triangles => wgpu::PrimitiveTopology::TriangleList,
    }
}

// ── buffers ───────────────────────────────────────────────────────────────

/// Smallest GPU buffer allocated for mesh data.
pub(super) const MIN_BUFFER_SIZE: u64 = 256;

/// Allocation size for a buffer that must hold `required` bytes.
#[inline]
pub(super) fn buffer_size_for(required: u64) -> u64 {
    required.next_power_of_two().max(MIN_BUFFER_SIZE)
}

/// Allocation size for `required` bytes under the device's `max_buffer_size`.
///
/// The power-of-two size is clamped to the limit; `None` if even `required` does
/// not fit.
pub(super) fn buffer_size_within(required: u64, max_buffer_size: u64) -> Option<u64> {
    (required <= max_buffer_size).then(|| buffer_size_for(required).min(max_buffer_size))
}

/// Pads `bytes` with zeros to `COPY_BUFFER_ALIGNMENT`.
pub(super) fn pad_to_copy_alignment(bytes: &[u8]) -> std::borrow::Cow<'_, [u8]> {
    let align = wgpu::COPY_BUFFER_ALIGNMENT as usize;
    if bytes.len() % align == 0 {
        return std::borrow::Cow::Borrowed(bytes);
    }
    let mut padded = Vec::with_capacity(bytes.len().next_multiple_of(align));
    padded.extend_from_slice(bytes);
    padded.resize(bytes.len().next_multiple_of(align), 0);
    std::borrow::Cow::Owned(padded)
}

// ── textures ──────────────────────────────────────────────────────────────

/// One mip level ready for `Queue::write_texture`.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Texel data converted to a wgpu-compatible format.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct TextureUpload {
    pub format: wgpu::TextureFormat,
    pub bytes_per_texel: u32,
    /// Float formats cannot be sampled with a filtering sampler.
    pub filterable: bool,
    pub levels: Vec<MipLevel>,
}

/// Whether a texture of this size can be created on a device with `limits`.
#[inline]
pub(super) fn texture_within_limits(desc: &TextureDesc, limits: &wgpu::Limits) -> bool {
    let max = limits.max_texture_dimension_2d;
    desc.width <= max && desc.height <= max
}

/// Converts texels to an upload, expanding RGB to RGBA (wgpu has no 3-channel
/// formats) and building the mip chain on the CPU for 8-bit formats.
///
/// Returns `None` if the texel count does not match the description.
pub(super) fn texture_upload(desc: &TextureDesc, texels: TexelData<'_>) -> Option<TextureUpload> {
    if desc.width == 0 || desc.height == 0 || texels.len() != desc.component_count() {
        return None;
    }

    let (width, height) = (desc.width, desc.height);
    let mipmaps = desc.min_filter.uses_mipmaps();

    let upload = match desc.format {
        TextureFormat::R => {
            let base = GrayImage::from_raw(width, height, texels_u8(texels))?;
            TextureUpload {
                format: wgpu::TextureFormat::R8Unorm,
                bytes_per_texel: 1,
                filterable: true,
                levels: if mipmaps { mip_chain(base) } else { vec![level_of(base)] },
            }
        }
        TextureFormat::Rgb | TextureFormat::Rgba => {
            let mut data = texels_u8(texels);
            if desc.format == TextureFormat::Rgb {
                data = expand_rgb(&data, u8::MAX);
            }
            let base = RgbaImage::from_raw(width, height, data)?;
            TextureUpload {
                format: wgpu::TextureFormat::Rgba8Unorm,
                bytes_per_texel: 4,
                filterable: true,
                levels: if mipmaps { mip_chain(base) } else { vec![level_of(base)] },
            }
        }
        TextureFormat::FloatR | TextureFormat::FloatRgb | TextureFormat::FloatRgba => {
            if mipmaps {
                log::debug!("mipmaps are not generated for float textures");
            }
            let mut data = texels_f32(texels);
            let (format, bytes_per_texel) = match desc.format {
                TextureFormat::FloatR => (wgpu::TextureFormat::R32Float, 4),
                TextureFormat::FloatRgb => {
                    data = expand_rgb(&data, 1.0);
                    (wgpu::TextureFormat::Rgba32Float, 16)
                }
                _ => (wgpu::TextureFormat::Rgba32Float, 16),
            };
            TextureUpload {
                format,
                bytes_per_texel,
                filterable: false,
                levels: vec![MipLevel {
                    width,
                    height,
                    bytes: bytemuck::cast_slice(&data).to_vec(),
                }],
            }
        }
    };

    Some(upload)
}

pub(super) fn sampler_filters(
    min: MinFilter,
    mag: MagFilter,
    filterable: bool,
) -> (wgpu::FilterMode, wgpu::FilterMode, wgpu::MipmapFilterMode) {
    if !filterable {
        return (
            wgpu::FilterMode::Nearest,
            wgpu::FilterMode::Nearest,
            wgpu::MipmapFilterMode::Nearest,
        );
    }

    let min_filter = match min {
        MinFilter::Nearest => wgpu::FilterMode::Nearest,
        MinFilter::Linear | MinFilter::MipMapLinear => wgpu::FilterMode::Linear,
    };
    let mag_filter = match mag {
        MagFilter::Nearest => wgpu::FilterMode::Nearest,
        MagFilter::Linear => wgpu::FilterMode::Linear,
    };
    let mipmap_filter = if min.uses_mipmaps() {
        wgpu::MipmapFilterMode::Linear
    } else {
        wgpu::MipmapFilterMode::Nearest
    };
    (min_filter, mag_filter, mipmap_filter)
}

fn texels_u8(texels: TexelData<'_>) -> Vec<u8> {
    match texels {
        TexelData::U8(d) => d.to_vec(),
        TexelData::F32(d) => d
            .iter()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect(),
    }
}

fn texels_f32(texels: TexelData<'_>) -> Vec<f32> {
    match texels {
        TexelData::F32(d) => d.to_vec(),
        TexelData::U8(d) => d.iter().map(|&b| b as f32 / 255.0).collect(),
    }
}

fn expand_rgb<T: Copy>(rgb: &[T], alpha: T) -> Vec<T> {
    rgb.chunks_exact(3)
        .flat_map(|px| [px[0], px[1], px[2], alpha])
        .collect()
}

fn level_of<P>(image: ImageBuffer<P, Vec<u8>>) -> MipLevel
where
    P: Pixel<Subpixel = u8>,
{
    MipLevel {
        width: image.width(),
        height: image.height(),
        bytes: image.into_raw(),
    }
}

/// Halves the image until both sides reach 1.
fn mip_chain<P>(base: ImageBuffer<P, Vec<u8>>) -> Vec<MipLevel>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let count = mip_level_count(base.width(), base.height());
    let mut levels = Vec::with_capacity(count as usize);
    let mut current = base;

    for _ in 1..count {
        let next = imageops::resize(
            &current,
            (current.width() / 2).max(1),
            (current.height() / 2).max(1),
            FilterType::Triangle,
        );
        levels.push(level_of(std::mem::replace(&mut current, next)));
    }
    levels.push(level_of(current));
    levels
}

#[inline]
pub(super) fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(width: u32, height: u32, format: TextureFormat, min_filter: MinFilter) -> TextureDesc {
        TextureDesc {
            width,
            height,
            format,
            min_filter,
            mag_filter: MagFilter::Linear,
        }
    }

    // ── device limits ─────────────────────────────────────────────────────

    #[test]
    fn buffer_sizes_clamp_to_the_device_limit() {
        let max = 256 * 1024 * 1024;
        assert_eq!(buffer_size_within(100, max), Some(256));
        // Next power of two would exceed the limit.
        assert_eq!(buffer_size_within(max - 4, max), Some(max));
        assert_eq!(buffer_size_within(max, max), Some(max));
        assert_eq!(buffer_size_within(max + 4, max), None);
    }

    #[test]
    fn texture_sides_are_checked_against_limits() {
        let limits = wgpu::Limits::downlevel_defaults();
        let max = limits.max_texture_dimension_2d;
        assert!(texture_within_limits(&desc(max, 1, TextureFormat::R, MinFilter::Linear), &limits));
        assert!(!texture_within_limits(&desc(max + 1, 1, TextureFormat::R, MinFilter::Linear), &limits));
        assert!(!texture_within_limits(&desc(1, max + 1, TextureFormat::Rgba, MinFilter::Linear), &limits));
    }

    // ── vertex formats ────────────────────────────────────────────────────

    #[test]
    fn builtin_attribs_map_to_float_and_uint_formats() {
        assert_eq!(vertex_format(Attrib::VEC2), Some(wgpu::VertexFormat::Float32x2));
        assert_eq!(vertex_format(Attrib::VEC4), Some(wgpu::VertexFormat::Float32x4));
        assert_eq!(vertex_format(Attrib::UBYTE), Some(wgpu::VertexFormat::Uint8));
    }

    #[test]
    fn normalized_bytes_use_unorm() {
        let color = Attrib::new(4, ElementType::UByte, true);
        assert_eq!(vertex_format(color), Some(wgpu::VertexFormat::Unorm8x4));
    }

    #[test]
    fn unfetchable_shapes_are_rejected() {
        assert_eq!(vertex_format(Attrib::new(3, ElementType::UByte, true)), None);
        assert_eq!(vertex_format(Attrib::new(1, ElementType::Int, true)), None);
        assert_eq!(vertex_format(Attrib::new(5, ElementType::Float, false)), None);
    }

    // ── buffers ───────────────────────────────────────────────────────────

    #[test]
    fn buffer_sizes_are_powers_of_two_with_floor() {
        assert_eq!(buffer_size_for(1), MIN_BUFFER_SIZE);
        assert_eq!(buffer_size_for(256), 256);
        assert_eq!(buffer_size_for(257), 512);
        assert_eq!(buffer_size_for(5000), 8192);
    }

    #[test]
    fn padding_reaches_copy_alignment() {
        assert_eq!(pad_to_copy_alignment(&[1, 2, 3, 4]).len(), 4);
        let padded = pad_to_copy_alignment(&[1, 2, 3, 4, 5]);
        assert_eq!(&*padded, &[1, 2, 3, 4, 5, 0, 0, 0]);
    }

    // ── textures ──────────────────────────────────────────────────────────

    #[test]
    fn rgb_is_expanded_to_opaque_rgba() {
        let texels = [10u8, 20, 30, 40, 50, 60];
        let upload =
            texture_upload(&desc(2, 1, TextureFormat::Rgb, MinFilter::Nearest), TexelData::U8(&texels))
                .unwrap();
        assert_eq!(upload.format, wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(upload.levels.len(), 1);
        assert_eq!(upload.levels[0].bytes, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn float_textures_are_not_filterable() {
        let texels = [0.5f32; 4];
        let upload = texture_upload(
            &desc(2, 2, TextureFormat::FloatR, MinFilter::MipMapLinear),
            TexelData::F32(&texels),
        )
        .unwrap();
        assert_eq!(upload.format, wgpu::TextureFormat::R32Float);
        assert!(!upload.filterable);
        assert_eq!(upload.levels.len(), 1);
        assert_eq!(upload.levels[0].bytes.len(), 16);
    }

    #[test]
    fn mip_chain_halves_down_to_one_texel() {
        let texels = vec![128u8; 8 * 4 * 4];
        let upload = texture_upload(
            &desc(8, 4, TextureFormat::Rgba, MinFilter::MipMapLinear),
            TexelData::U8(&texels),
        )
        .unwrap();
        let sizes: Vec<(u32, u32)> = upload.levels.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes, vec![(8, 4), (4, 2), (2, 1), (1, 1)]);
        for level in &upload.levels {
            assert_eq!(level.bytes.len(), (level.width * level.height * 4) as usize);
        }
    }

    #[test]
    fn mismatched_texel_count_is_rejected() {
        let texels = [0u8; 3];
        assert!(texture_upload(&desc(2, 2, TextureFormat::R, MinFilter::Linear), TexelData::U8(&texels)).is_none());
    }

    #[test]
    fn float_data_into_byte_format_is_quantized() {
        let texels = [0.0f32, 1.0, 2.0];
        let upload =
            texture_upload(&desc(3, 1, TextureFormat::R, MinFilter::Nearest), TexelData::F32(&texels))
                .unwrap();
        assert_eq!(upload.levels[0].bytes, vec![0, 255, 255]);
    }

    #[test]
    fn non_filterable_samplers_are_nearest() {
        let (min, mag, mip) = sampler_filters(MinFilter::MipMapLinear, MagFilter::Linear, false);
        assert_eq!(min, wgpu::FilterMode::Nearest);
        assert_eq!(mag, wgpu::FilterMode::Nearest);
        assert_eq!(mip, wgpu::MipmapFilterMode::Nearest);
    }

    #[test]
    fn level_count_matches_largest_side() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(256, 1), 9);
        assert_eq!(mip_level_count(300, 200), 9);
    }
}
