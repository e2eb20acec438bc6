use bytemuck::Pod;

/// Owned, resizable byte region with a forward-only write cursor.
///
/// Invariants:
/// - `cursor <= capacity`
/// - `capacity` is a non-zero multiple of `quantum`
///
/// Writes are check-before-write: every `put_*` first makes room, so the cursor
/// never passes the end of the region, not even transiently. Growth replaces the
/// region (copy then drop), so exactly one allocation is live at a time.
#[derive(Debug)]
pub struct GrowableBuffer {
    label: &'static str,
    data: Box<[u8]>,
    cursor: usize,
    quantum: usize,
}

impl GrowableBuffer {
    /// Creates a buffer holding at least `capacity` bytes, rounded up to `quantum`.
    ///
    /// A zero quantum (degenerate empty layout) is treated as one byte.
    pub fn with_capacity(label: &'static str, capacity: usize, quantum: usize) -> Self {
        let quantum = quantum.max(1);
        let capacity = round_up(capacity.max(quantum), quantum, label);

        Self {
            label,
            data: vec![0u8; capacity].into_boxed_slice(),
            cursor: 0,
            quantum,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn quantum(&self) -> usize {
        self.quantum
    }

    /// Bytes written since the last [`reset`](Self::reset).
    #[inline]
    pub fn len(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    #[inline]
    pub fn written(&self) -> &[u8] {
        &self.data[..self.cursor]
    }

    /// Rewinds the cursor. Capacity is kept for reuse.
    #[inline]
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Makes room for `additional` bytes at the cursor.
    ///
    /// Capacity doubles until the write fits, then rounds up to the quantum. The
    /// written prefix is copied into the new region. Returns `true` if it grew.
    ///
    /// # Panics
    /// Panics if the required capacity overflows `usize`. Allocation failure aborts.
    pub fn ensure_capacity(&mut self, additional: usize) -> bool {
        let required = self
            .cursor
            .checked_add(additional)
            .unwrap_or_else(|| capacity_overflow(self.label));
        if required <= self.capacity() {
            return false;
        }

        let mut new_capacity = self.capacity();
        while new_capacity < required {
            new_capacity = new_capacity
                .checked_mul(2)
                .unwrap_or_else(|| capacity_overflow(self.label));
        }
        let new_capacity = round_up(new_capacity, self.quantum, self.label);

        log::debug!(
            "{}: growing {} -> {} bytes (preserving {})",
            self.label,
            self.capacity(),
            new_capacity,
            self.cursor
        );

        let mut data = vec![0u8; new_capacity].into_boxed_slice();
        data[..self.cursor].copy_from_slice(&self.data[..self.cursor]);
        self.data = data;

        true
    }

    /// Appends raw bytes, growing first if needed.
    #[inline]
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.ensure_capacity(bytes.len());
        let end = self.cursor + bytes.len();
        self.data[self.cursor..end].copy_from_slice(bytes);
        self.cursor = end;
    }

    /// Appends a plain-old-data value in native byte order.
    #[inline]
    pub fn put<T: Pod>(&mut self, value: T) {
        self.put_bytes(bytemuck::bytes_of(&value));
    }
}

fn round_up(value: usize, quantum: usize, label: &'static str) -> usize {
    value
        .checked_next_multiple_of(quantum)
        .unwrap_or_else(|| capacity_overflow(label))
}

#[cold]
fn capacity_overflow(label: &'static str) -> ! {
    panic!("{label}: capacity overflow while growing buffer")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_capacity_rounds_up_to_quantum() {
        let buf = GrowableBuffer::with_capacity("test", 100, 36);
        assert_eq!(buf.capacity(), 108);
        assert!(buf.is_empty());
    }

    #[test]
    fn zero_quantum_is_treated_as_one_byte() {
        let buf = GrowableBuffer::with_capacity("test", 0, 0);
        assert_eq!(buf.quantum(), 1);
        assert_eq!(buf.capacity(), 1);
    }

    #[test]
    fn ensure_capacity_is_noop_when_write_fits() {
        let mut buf = GrowableBuffer::with_capacity("test", 16, 4);
        assert!(!buf.ensure_capacity(16));
        assert_eq!(buf.capacity(), 16);
    }

    // ── growth ────────────────────────────────────────────────────────────

    #[test]
    fn growth_doubles_and_keeps_quantum_multiple() {
        let mut buf = GrowableBuffer::with_capacity("test", 36, 36);
        buf.put_bytes(&[1u8; 36]);
        assert!(buf.ensure_capacity(1));
        assert_eq!(buf.capacity(), 72);
        assert_eq!(buf.capacity() % buf.quantum(), 0);
    }

    #[test]
    fn growth_covers_writes_larger_than_double() {
        let mut buf = GrowableBuffer::with_capacity("test", 12, 12);
        buf.put_bytes(&[7u8; 100]);
        assert!(buf.capacity() >= 100);
        assert_eq!(buf.capacity() % 12, 0);
        assert_eq!(buf.len(), 100);
    }

    #[test]
    fn growth_preserves_written_bytes() {
        let mut buf = GrowableBuffer::with_capacity("test", 8, 4);
        let expected: Vec<u8> = (0..=200u8).collect();
        for b in &expected {
            buf.put(*b);
        }
        assert_eq!(buf.written(), expected.as_slice());
    }

    #[test]
    fn capacity_is_monotonic_and_sufficient() {
        let mut buf = GrowableBuffer::with_capacity("test", 24, 24);
        let mut previous = buf.capacity();
        for step in 1..200usize {
            let chunk = vec![0xABu8; step % 37 + 1];
            buf.ensure_capacity(chunk.len());
            assert!(buf.capacity() >= previous);
            assert!(buf.len() + chunk.len() <= buf.capacity());
            buf.put_bytes(&chunk);
            previous = buf.capacity();
        }
    }

    // ── reset ─────────────────────────────────────────────────────────────

    #[test]
    fn reset_rewinds_cursor_but_keeps_capacity() {
        let mut buf = GrowableBuffer::with_capacity("test", 4, 4);
        buf.put_bytes(&[0u8; 64]);
        let grown = buf.capacity();
        buf.reset();
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.capacity(), grown);
    }

    #[test]
    fn put_writes_native_endian_values() {
        let mut buf = GrowableBuffer::with_capacity("test", 4, 4);
        buf.put(1.5f32);
        buf.put(7u32);
        assert_eq!(&buf.written()[..4], &1.5f32.to_ne_bytes());
        assert_eq!(&buf.written()[4..], &7u32.to_ne_bytes());
    }
}
