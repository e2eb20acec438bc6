/// Primitive type a mesh assembles indices for.
///
/// The mode is fixed at construction and decides which emission call is valid:
/// `line` for [`DrawMode::Lines`], `triangle`/`quad` for [`DrawMode::Triangles`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DrawMode {
    Lines,
    Triangles,
}

impl DrawMode {
    /// Number of indices (and vertices) that make up one primitive.
    #[inline]
    pub const fn indices_per_primitive(self) -> usize {
        match self {
            DrawMode::Lines => 2,
            DrawMode::Triangles => 3,
        }
    }
}
