/// Linear RGBA color, written to vertices as four floats.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    #[inline]
    pub const fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// 8-bit channels mapped to `[0, 1]` without gamma conversion.
    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    /// Hue in turns (`0..1`), full saturation and value.
    pub fn from_hue(hue: f32) -> Self {
        let h = hue.rem_euclid(1.0) * 6.0;
        let x = 1.0 - (h % 2.0 - 1.0).abs();
        let (r, g, b) = match h as u32 {
            0 => (1.0, x, 0.0),
            1 => (x, 1.0, 0.0),
            2 => (0.0, 1.0, x),
            3 => (0.0, x, 1.0),
            4 => (x, 0.0, 1.0),
            _ => (1.0, 0.0, x),
        };
        Self::new(r, g, b, 1.0)
    }

    #[inline]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

impl From<ColorRgba> for wgpu::Color {
    fn from(c: ColorRgba) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_four_floats_in_rgba_order() {
        let color = ColorRgba::new(0.25, 0.5, 0.75, 1.0);
        let floats: [f32; 4] = bytemuck::cast(color);
        assert_eq!(floats, [0.25, 0.5, 0.75, 1.0]);
        assert_eq!(bytemuck::bytes_of(&color).len(), 16);
    }

    #[test]
    fn from_rgba8_scales_to_unit_range() {
        assert_eq!(ColorRgba::from_rgba8(255, 0, 255, 0), ColorRgba::new(1.0, 0.0, 1.0, 0.0));
    }

    #[test]
    fn hue_primaries() {
        assert_eq!(ColorRgba::from_hue(0.0), ColorRgba::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(ColorRgba::from_hue(1.0 / 3.0).g, 1.0);
        assert_eq!(ColorRgba::from_hue(2.0 / 3.0).b, 1.0);
    }
}
