macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Wraps a sink-specific object id.
            #[inline]
            pub const fn from_raw(id: u32) -> Self {
                Self(id)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

gpu_handle!(
    /// Vertex array object: attribute layout plus attached vertex/index buffers.
    VertexArrayHandle
);
gpu_handle!(
    /// GPU buffer object (vertex or index data).
    BufferHandle
);
gpu_handle!(
    /// Linked shader program.
    ProgramHandle
);
gpu_handle!(
    /// 2D texture object.
    TextureHandle
);

/// Resolved uniform slot inside a program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation {
    pub program: ProgramHandle,
    pub index: u32,
}
