use super::buffer::GrowableBuffer;
use crate::coords::ColorRgba;

/// Packed vertex storage.
///
/// Growth is quantized to whole primitives (`stride * vertices_per_primitive`), so
/// the capacity always stays a multiple of the stride.
#[derive(Debug)]
pub struct VertexBuffer {
    buf: GrowableBuffer,
    stride: usize,
}

impl VertexBuffer {
    pub fn new(stride: usize, vertices_per_primitive: usize, primitives: usize) -> Self {
        let quantum = stride * vertices_per_primitive;
        Self {
            buf: GrowableBuffer::with_capacity("vertex buffer", quantum * primitives, quantum),
            stride,
        }
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[inline]
    pub fn quantum(&self) -> usize {
        self.buf.quantum()
    }

    /// Raw bytes written this cycle, including any partial vertex.
    #[inline]
    pub fn written(&self) -> &[u8] {
        self.buf.written()
    }

    /// Bytes covering the first `vertex_count` complete vertices.
    ///
    /// Clamped to what was actually written, so a layout mismatch on the caller's
    /// side can shorten the upload but never read past the cursor.
    #[inline]
    pub fn vertices(&self, vertex_count: usize) -> &[u8] {
        let written = self.buf.written();
        let len = vertex_count.saturating_mul(self.stride).min(written.len());
        &written[..len]
    }

    #[inline]
    pub fn reset(&mut self) {
        self.buf.reset();
    }

    #[inline]
    pub fn put_u8(&mut self, v: u8) {
        self.buf.put(v);
    }

    #[inline]
    pub fn put_f32(&mut self, v: f32) {
        self.buf.put(v);
    }

    #[inline]
    pub fn put_f32x2(&mut self, v: [f32; 2]) {
        self.buf.put(v);
    }

    #[inline]
    pub fn put_f32x3(&mut self, v: [f32; 3]) {
        self.buf.put(v);
    }

    #[inline]
    pub fn put_f32x4(&mut self, v: [f32; 4]) {
        self.buf.put(v);
    }

    #[inline]
    pub fn put_color(&mut self, color: ColorRgba) {
        self.buf.put(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_multiple_of_stride_after_growth() {
        let mut vb = VertexBuffer::new(20, 3, 1);
        assert_eq!(vb.capacity(), 60);
        for i in 0..50 {
            vb.put_f32x4([i as f32; 4]);
            vb.put_f32(i as f32);
            assert_eq!(vb.capacity() % vb.stride(), 0);
            assert_eq!(vb.capacity() % vb.quantum(), 0);
        }
        assert_eq!(vb.written().len(), 50 * 20);
    }

    #[test]
    fn vertices_clamps_to_written_bytes() {
        let mut vb = VertexBuffer::new(12, 3, 4);
        vb.put_f32x3([1.0, 2.0, 3.0]);
        assert_eq!(vb.vertices(1).len(), 12);
        assert_eq!(vb.vertices(5).len(), 12);
        assert_eq!(vb.vertices(0).len(), 0);
    }
}
