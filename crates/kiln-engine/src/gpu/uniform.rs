/// Type of a member of a program's uniform block.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformKind {
    Int,
    Float,
    Vec2,
    Mat4,
}

impl UniformKind {
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            UniformKind::Int | UniformKind::Float => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Mat4 => 64,
        }
    }

    /// Alignment in the WGSL uniform address space.
    #[inline]
    pub const fn align(self) -> usize {
        match self {
            UniformKind::Int | UniformKind::Float => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Mat4 => 16,
        }
    }
}

/// Declared uniform block member.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformDecl<'a> {
    pub name: &'a str,
    pub kind: UniformKind,
}

impl<'a> UniformDecl<'a> {
    #[inline]
    pub const fn new(name: &'a str, kind: UniformKind) -> Self {
        Self { name, kind }
    }
}

/// Value assigned to a uniform.
///
/// `Sampler` carries a texture slot, like `glUniform1i` on a sampler.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    /// Column-major 4x4 matrix.
    Mat4([[f32; 4]; 4]),
    Sampler(u32),
}

impl UniformValue {
    /// Block member kind this value writes, or `None` for texture slots.
    #[inline]
    pub fn kind(&self) -> Option<UniformKind> {
        match self {
            UniformValue::Int(_) => Some(UniformKind::Int),
            UniformValue::Float(_) => Some(UniformKind::Float),
            UniformValue::Vec2(_) => Some(UniformKind::Vec2),
            UniformValue::Mat4(_) => Some(UniformKind::Mat4),
            UniformValue::Sampler(_) => None,
        }
    }

    /// Native-endian bytes of the value as stored in a uniform block.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            UniformValue::Int(v) => bytemuck::bytes_of(v).to_vec(),
            UniformValue::Float(v) => bytemuck::bytes_of(v).to_vec(),
            UniformValue::Vec2(v) => bytemuck::bytes_of(v).to_vec(),
            UniformValue::Mat4(v) => bytemuck::bytes_of(v).to_vec(),
            UniformValue::Sampler(slot) => bytemuck::bytes_of(slot).to_vec(),
        }
    }
}

/// Member of a [`UniformBlockLayout`] with its byte offset.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UniformSlot {
    pub name: String,
    pub kind: UniformKind,
    pub offset: usize,
}

/// Byte layout of a uniform block following WGSL uniform-buffer rules.
///
/// Members are placed in declaration order at their natural alignment; the total
/// size is rounded up to 16 bytes.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct UniformBlockLayout {
    slots: Vec<UniformSlot>,
    size: usize,
}

impl UniformBlockLayout {
    pub fn new(decls: &[UniformDecl<'_>]) -> Self {
        let mut slots = Vec::with_capacity(decls.len());
        let mut end = 0usize;
        for decl in decls {
            let offset = end.next_multiple_of(decl.kind.align());
            slots.push(UniformSlot {
                name: decl.name.to_string(),
                kind: decl.kind,
                offset,
            });
            end = offset + decl.kind.size();
        }

        Self {
            slots,
            size: end.next_multiple_of(16),
        }
    }

    /// Block size in bytes (0 when there are no members).
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn slots(&self) -> &[UniformSlot] {
        &self.slots
    }

    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    #[inline]
    pub fn slot(&self, index: usize) -> Option<&UniformSlot> {
        self.slots.get(index)
    }
}
