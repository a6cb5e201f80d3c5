/// A running XOR of part payloads, each logically zero-padded to the part length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityAccumulator {
    buf: Vec<u8>,
}

impl ParityAccumulator {
    /// Starts an accumulator of `part_length` zero bytes.
    pub fn new(part_length: usize) -> Self {
        Self {
            buf: vec![0u8; part_length],
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// XORs `chunk` into the accumulator. A shorter chunk behaves as if padded
    /// with zeros, which leaves the tail untouched.
    ///
    /// # Panics
    /// If `chunk` is longer than the accumulator; callers check payload lengths first.
    pub fn fold(&mut self, chunk: &[u8]) {
        assert!(
            chunk.len() <= self.buf.len(),
            "chunk of {} bytes exceeds parity width {}",
            chunk.len(),
            self.buf.len()
        );
        for (acc, byte) in self.buf.iter_mut().zip(chunk) {
            *acc ^= byte;
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
