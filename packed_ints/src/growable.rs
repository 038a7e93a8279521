//! A mutable array that widens itself when a value does not fit.

use store_io::DataOutput;
use tracing::debug;

use crate::Result;
use crate::array::PackedArray;
use crate::bit_ops::{bits_required, max_value};
use crate::config::{DEFAULT_BUFFER_SIZE, PackedConfig};
use crate::factory::get_mutable;
use crate::format::Format;
use crate::reader::{Mutable, Reader, copy};

/// Starts at a given width and migrates to a wider layout, copying every
/// value, the first time a value needs more bits. It never narrows.
///
/// Growth swaps the backing array, so a writer must not be shared with
/// concurrent readers while it is still being filled.
#[derive(Debug, Clone)]
pub struct GrowableWriter {
    current: PackedArray,
    current_mask: u64,
    acceptable_overhead_ratio: f32,
}

impl GrowableWriter {
    pub fn new(start_bits_per_value: u32, value_count: usize, acceptable_overhead_ratio: f32) -> Self {
        let current = get_mutable(value_count, start_bits_per_value, acceptable_overhead_ratio);
        let current_mask = max_value(current.bits_per_value());
        Self {
            current,
            current_mask,
            acceptable_overhead_ratio,
        }
    }

    pub fn with_config(start_bits_per_value: u32, value_count: usize, config: &PackedConfig) -> Self {
        Self::new(start_bits_per_value, value_count, config.acceptable_overhead_ratio)
    }

    /// The array currently backing this writer.
    pub fn mutable(&self) -> &PackedArray {
        &self.current
    }

    pub fn into_mutable(self) -> PackedArray {
        self.current
    }

    fn ensure_capacity(&mut self, value: u64) {
        if value & self.current_mask == value {
            return;
        }
        let bits = bits_required(value);
        let size = self.size();
        let mut next = get_mutable(size, bits, self.acceptable_overhead_ratio);
        copy(&self.current, 0, &mut next, 0, size, DEFAULT_BUFFER_SIZE);
        debug!(
            from_bits = self.current.bits_per_value(),
            to_bits = next.bits_per_value(),
            layout = next.kind(),
            size,
            "growing packed writer"
        );
        self.current_mask = max_value(next.bits_per_value());
        self.current = next;
    }

    /// A writer of `new_size` values holding the first `min(size, new_size)`
    /// values of this one; the rest are zero.
    pub fn resize(&self, new_size: usize) -> GrowableWriter {
        let mut next = GrowableWriter::new(
            self.bits_per_value(),
            new_size,
            self.acceptable_overhead_ratio,
        );
        let limit = self.size().min(new_size);
        copy(&self.current, 0, &mut next, 0, limit, DEFAULT_BUFFER_SIZE);
        next
    }
}

impl Reader for GrowableWriter {
    #[inline]
    fn get(&self, index: usize) -> u64 {
        self.current.get(index)
    }

    fn size(&self) -> usize {
        self.current.size()
    }

    fn bits_per_value(&self) -> u32 {
        self.current.bits_per_value()
    }

    fn bulk_get(&self, index: usize, out: &mut [u64]) -> usize {
        self.current.bulk_get(index, out)
    }
}

impl Mutable for GrowableWriter {
    fn set(&mut self, index: usize, value: u64) {
        self.ensure_capacity(value);
        self.current.set(index, value);
    }

    fn bulk_set(&mut self, index: usize, values: &[u64]) -> usize {
        let widest = values.iter().fold(0u64, |acc, &v| acc | v);
        self.ensure_capacity(widest);
        self.current.bulk_set(index, values)
    }

    fn fill(&mut self, from: usize, to: usize, value: u64) {
        self.ensure_capacity(value);
        self.current.fill(from, to, value);
    }

    fn clear(&mut self) {
        self.current.clear();
    }

    fn format(&self) -> Format {
        self.current.format()
    }

    fn write_payload(&self, out: &mut dyn DataOutput) -> Result<()> {
        self.current.write_payload(out)
    }
}
