use core::ops::Mul;

use super::{Vec2, Vec3};

/// Column-major 4x4 matrix, laid out the way WGSL `mat4x4<f32>` expects.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Orthographic projection mapping the box onto clip space (depth `[0, 1]`).
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let rw = 1.0 / (right - left);
        let rh = 1.0 / (top - bottom);
        let rd = 1.0 / (far - near);
        Self {
            cols: [
                [2.0 * rw, 0.0, 0.0, 0.0],
                [0.0, 2.0 * rh, 0.0, 0.0],
                [0.0, 0.0, -rd, 0.0],
                [-(right + left) * rw, -(top + bottom) * rh, -near * rd, 1.0],
            ],
        }
    }

    /// Aspect-correct projection of `[-extent, extent]` on the shorter axis.
    pub fn fit_aspect(width: f32, height: f32, extent: f32) -> Self {
        let aspect = if height > 0.0 { width / height } else { 1.0 };
        if aspect >= 1.0 {
            Self::orthographic(-extent * aspect, extent * aspect, -extent, extent, -1.0, 1.0)
        } else {
            Self::orthographic(-extent, extent, -extent / aspect, extent / aspect, -1.0, 1.0)
        }
    }

    pub fn translation(t: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = [t.x, t.y, t.z, 1.0];
        m
    }

    pub fn scale(s: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[0][0] = s.x;
        m.cols[1][1] = s.y;
        m.cols[2][2] = s.z;
        m
    }

    /// Counter-clockwise rotation about +Z.
    pub fn rotation_z(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        let mut m = Self::IDENTITY;
        m.cols[0] = [cos, sin, 0.0, 0.0];
        m.cols[1] = [-sin, cos, 0.0, 0.0];
        m
    }

    /// Transforms a point (`w = 1`) and drops `w`.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let c = &self.cols;
        Vec3::new(
            c[0][0] * p.x + c[1][0] * p.y + c[2][0] * p.z + c[3][0],
            c[0][1] * p.x + c[1][1] * p.y + c[2][1] * p.z + c[3][1],
            c[0][2] * p.x + c[1][2] * p.y + c[2][2] * p.z + c[3][2],
        )
    }

    #[inline]
    pub fn transform_point2(&self, p: Vec2) -> Vec2 {
        self.transform_point(Vec3::from_vec2(p, 0.0)).xy()
    }

    #[inline]
    pub const fn to_cols_array(self) -> [[f32; 4]; 4] {
        self.cols
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut out = [[0.0f32; 4]; 4];
        for (col, out_col) in out.iter_mut().enumerate() {
            for (row, v) in out_col.iter_mut().enumerate() {
                *v = (0..4).map(|k| self.cols[k][row] * rhs.cols[col][k]).sum();
            }
        }
        Mat4 { cols: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).dot(a - b) < 1e-10
    }

    #[test]
    fn identity_is_neutral() {
        let m = Mat4::rotation_z(0.3) * Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m * Mat4::IDENTITY, m);
        assert_eq!(Mat4::IDENTITY * m, m);
    }

    #[test]
    fn orthographic_maps_corners_to_clip() {
        let m = Mat4::orthographic(0.0, 800.0, 0.0, 600.0, -1.0, 1.0);
        assert!(close(m.transform_point(Vec3::new(0.0, 0.0, 0.0)), Vec3::new(-1.0, -1.0, 0.5)));
        assert!(close(m.transform_point(Vec3::new(800.0, 600.0, 0.0)), Vec3::new(1.0, 1.0, 0.5)));
    }

    #[test]
    fn rotation_quarter_turn() {
        let p = Mat4::rotation_z(core::f32::consts::FRAC_PI_2).transform_point2(Vec2::new(1.0, 0.0));
        assert!((p.x).abs() < 1e-6 && (p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn product_applies_right_operand_first() {
        let m = Mat4::translation(Vec3::new(1.0, 0.0, 0.0)) * Mat4::scale(Vec3::new(2.0, 2.0, 2.0));
        assert!(close(m.transform_point(Vec3::new(1.0, 1.0, 0.0)), Vec3::new(3.0, 2.0, 0.0)));
    }

    #[test]
    fn fit_aspect_keeps_extent_on_short_axis() {
        let m = Mat4::fit_aspect(200.0, 100.0, 1.0);
        assert!(close(m.transform_point(Vec3::new(2.0, 1.0, 0.0)), Vec3::new(1.0, 1.0, 0.5)));
    }
}
