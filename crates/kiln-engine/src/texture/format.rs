/// Pixel format of a texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureFormat {
    R,
    Rgb,
    Rgba,
    FloatR,
    FloatRgb,
    FloatRgba,
}

impl TextureFormat {
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            TextureFormat::R | TextureFormat::FloatR => 1,
            TextureFormat::Rgb | TextureFormat::FloatRgb => 3,
            TextureFormat::Rgba | TextureFormat::FloatRgba => 4,
        }
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(
            self,
            TextureFormat::FloatR | TextureFormat::FloatRgb | TextureFormat::FloatRgba
        )
    }
}

/// Minification filter.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MinFilter {
    Nearest,
    Linear,
    /// Linear filtering across a generated mip chain.
    MipMapLinear,
}

impl MinFilter {
    #[inline]
    pub const fn uses_mipmaps(self) -> bool {
        matches!(self, MinFilter::MipMapLinear)
    }
}

/// Magnification filter.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MagFilter {
    Nearest,
    Linear,
}

/// Everything a sink needs to allocate a texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub min_filter: MinFilter,
    pub mag_filter: MagFilter,
}

impl TextureDesc {
    /// Number of texel components expected for the full image.
    #[inline]
    pub fn component_count(&self) -> usize {
        self.width as usize * self.height as usize * self.format.channels()
    }
}

/// Borrowed texel components, row-major; the first row is sampled at `v = 0`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TexelData<'a> {
    U8(&'a [u8]),
    F32(&'a [f32]),
}

impl TexelData<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            TexelData::U8(d) => d.len(),
            TexelData::F32(d) => d.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
