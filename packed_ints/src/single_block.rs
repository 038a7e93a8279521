//! Packed layout where no value crosses a 64-bit block boundary.

use store_io::{DataInput, DataOutput};

use crate::Result;
use crate::bit_ops::{bits_required, max_value};
use crate::bulk::{BulkOperationPackedSingleBlock, PackedIntsDecoder, PackedIntsEncoder};
use crate::error::PackedIntsError;
use crate::format::{Format, VERSION_CURRENT};
use crate::reader::{Mutable, Reader, default_bulk_get, default_bulk_set, default_fill};

/// Widths with an efficient single-block layout.
pub const SUPPORTED_BITS_PER_VALUE: [u32; 14] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 12, 16, 21, 32];

pub(crate) fn is_supported(bits_per_value: u32) -> bool {
    SUPPORTED_BITS_PER_VALUE.binary_search(&bits_per_value).is_ok()
}

/// `64 / bits_per_value` values per block, the first one in the low bits.
#[derive(Debug, Clone)]
pub struct Packed64SingleBlock {
    blocks: Vec<u64>,
    value_count: usize,
    bits_per_value: u32,
    values_per_block: usize,
    mask: u64,
    bulk: BulkOperationPackedSingleBlock,
}

impl Packed64SingleBlock {
    /// # Panics
    ///
    /// Panics when `bits_per_value` has no single-block layout; see
    /// [`SUPPORTED_BITS_PER_VALUE`].
    pub fn new(value_count: usize, bits_per_value: u32) -> Self {
        assert!(
            is_supported(bits_per_value),
            "unsupported single-block width {bits_per_value}"
        );
        let long_count =
            Format::PackedSingleBlock.long_count(VERSION_CURRENT, value_count, bits_per_value);
        Self {
            blocks: vec![0; long_count],
            value_count,
            bits_per_value,
            values_per_block: (64 / bits_per_value) as usize,
            mask: max_value(bits_per_value),
            bulk: BulkOperationPackedSingleBlock::new(bits_per_value),
        }
    }

    pub fn from_input(
        version: i32,
        input: &mut dyn DataInput,
        value_count: usize,
        bits_per_value: u32,
    ) -> Result<Self> {
        if !is_supported(bits_per_value) {
            return Err(PackedIntsError::UnsupportedBitsPerValue {
                format: Format::PackedSingleBlock,
                bits_per_value,
            });
        }
        let mut reader = Self::new(value_count, bits_per_value);
        let long_count =
            Format::PackedSingleBlock.long_count(version, value_count, bits_per_value);
        for block in &mut reader.blocks[..long_count] {
            *block = input.read_long()?;
        }
        Ok(reader)
    }

    #[inline]
    fn locate(&self, index: usize) -> (usize, u32) {
        assert!(
            index < self.value_count,
            "index {index} out of bounds for {} values",
            self.value_count
        );
        let block = index / self.values_per_block;
        let shift = (index % self.values_per_block) as u32 * self.bits_per_value;
        (block, shift)
    }
}

impl Reader for Packed64SingleBlock {
    #[inline]
    fn get(&self, index: usize) -> u64 {
        let (block, shift) = self.locate(index);
        (self.blocks[block] >> shift) & self.mask
    }

    fn size(&self) -> usize {
        self.value_count
    }

    fn bits_per_value(&self) -> u32 {
        self.bits_per_value
    }

    fn bulk_get(&self, mut index: usize, out: &mut [u64]) -> usize {
        let mut len = out.len().min(self.value_count.saturating_sub(index));
        if len == 0 {
            return 0;
        }
        let start = index;
        let mut off = 0;

        let offset_in_block = index % self.values_per_block;
        if offset_in_block != 0 {
            for _ in offset_in_block..self.values_per_block {
                if len == 0 {
                    break;
                }
                out[off] = self.get(index);
                off += 1;
                index += 1;
                len -= 1;
            }
            if len == 0 {
                return index - start;
            }
        }

        let block_index = index / self.values_per_block;
        let iterations = len / self.values_per_block;
        self.bulk
            .decode_longs(&self.blocks[block_index..], &mut out[off..], iterations);
        index += iterations * self.values_per_block;

        if index > start {
            index - start
        } else {
            default_bulk_get(self, index, &mut out[off..off + len])
        }
    }
}

impl Mutable for Packed64SingleBlock {
    #[inline]
    fn set(&mut self, index: usize, value: u64) {
        debug_assert!(value <= self.mask, "{value} does not fit in {} bits", self.bits_per_value);
        let (block, shift) = self.locate(index);
        self.blocks[block] = (self.blocks[block] & !(self.mask << shift)) | (value << shift);
    }

    fn bulk_set(&mut self, mut index: usize, values: &[u64]) -> usize {
        let mut len = values.len().min(self.value_count.saturating_sub(index));
        if len == 0 {
            return 0;
        }
        let start = index;
        let mut off = 0;

        let offset_in_block = index % self.values_per_block;
        if offset_in_block != 0 {
            for _ in offset_in_block..self.values_per_block {
                if len == 0 {
                    break;
                }
                self.set(index, values[off]);
                off += 1;
                index += 1;
                len -= 1;
            }
            if len == 0 {
                return index - start;
            }
        }

        let block_index = index / self.values_per_block;
        let iterations = len / self.values_per_block;
        self.bulk
            .encode_longs(&values[off..], &mut self.blocks[block_index..], iterations);
        index += iterations * self.values_per_block;

        if index > start {
            index - start
        } else {
            default_bulk_set(self, index, &values[off..off + len])
        }
    }

    fn fill(&mut self, mut from: usize, mut to: usize, value: u64) {
        assert!(from <= to && to <= self.value_count, "invalid fill range {from}..{to}");
        debug_assert!(bits_required(value) <= self.bits_per_value);
        let per_block = self.values_per_block;
        if to - from <= per_block << 1 {
            default_fill(self, from, to, value);
            return;
        }

        let from_offset = from % per_block;
        if from_offset != 0 {
            for _ in from_offset..per_block {
                self.set(from, value);
                from += 1;
            }
        }
        let to_offset = to % per_block;
        for _ in 0..to_offset {
            to -= 1;
            self.set(to, value);
        }

        let block_value = (0..per_block).fold(0u64, |block, i| {
            block | (value << (i as u32 * self.bits_per_value))
        });
        self.blocks[from / per_block..to / per_block].fill(block_value);
    }

    fn clear(&mut self) {
        self.blocks.fill(0);
    }

    fn format(&self) -> Format {
        Format::PackedSingleBlock
    }

    fn write_payload(&self, out: &mut dyn DataOutput) -> Result<()> {
        for &block in &self.blocks {
            out.write_long(block)?;
        }
        Ok(())
    }
}
