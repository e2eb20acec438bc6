use super::buffer::GrowableBuffer;

/// Size of one index in bytes (`u32`).
pub const INDEX_SIZE: usize = 4;

/// Packed 32-bit index storage.
///
/// Growth is quantized to whole primitives (`indices_per_primitive * 4` bytes).
/// `count() * 4` always equals the number of bytes written.
#[derive(Debug)]
pub struct IndexBuffer {
    buf: GrowableBuffer,
    count: u32,
}

impl IndexBuffer {
    pub fn new(indices_per_primitive: usize, primitives: usize) -> Self {
        let quantum = indices_per_primitive * INDEX_SIZE;
        Self {
            buf: GrowableBuffer::with_capacity("index buffer", quantum * primitives, quantum),
            count: 0,
        }
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[inline]
    pub fn quantum(&self) -> usize {
        self.buf.quantum()
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        self.buf.written()
    }

    /// Decodes the written indices.
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.buf
            .written()
            .chunks_exact(INDEX_SIZE)
            .map(bytemuck::pod_read_unaligned::<u32>)
    }

    #[inline]
    pub fn reset(&mut self) {
        self.buf.reset();
        self.count = 0;
    }

    /// Appends indices as one unit; room for all of them is made before writing.
    pub fn push(&mut self, indices: &[u32]) {
        self.buf.ensure_capacity(indices.len() * INDEX_SIZE);
        for &i in indices {
            self.buf.put(i);
        }
        self.count += indices.len() as u32;
    }

    #[inline]
    pub fn line(&mut self, i1: u32, i2: u32) {
        self.push(&[i1, i2]);
    }

    #[inline]
    pub fn triangle(&mut self, i1: u32, i2: u32, i3: u32) {
        self.push(&[i1, i2, i3]);
    }

    /// Splits the quad along the `i1`–`i3` diagonal: `(i1, i2, i3)`, `(i3, i4, i1)`.
    #[inline]
    pub fn quad(&mut self, i1: u32, i2: u32, i3: u32, i4: u32) {
        self.push(&[i1, i2, i3, i3, i4, i1]);
    }
}
