//! The general bit-packed layout: values of any width from 1 to 64 bits
//! written back to back, most significant bit first, possibly straddling two
//! 64-bit blocks.

use store_io::{DataInput, DataOutput};

use crate::Result;
use crate::bit_ops::{bits_required, gcd, max_value};
use crate::bulk::{BlockGeometry, BulkOperationPacked, PackedIntsDecoder, PackedIntsEncoder};
use crate::format::{Format, VERSION_CURRENT};
use crate::reader::{Mutable, Reader, default_bulk_get, default_bulk_set, default_fill};

/// Values packed in a contiguous big-endian bit stream over `u64` blocks.
#[derive(Debug, Clone)]
pub struct Packed64 {
    blocks: Vec<u64>,
    value_count: usize,
    bits_per_value: u32,
    mask: u64,
    bulk: BulkOperationPacked,
}

impl Packed64 {
    /// # Panics
    ///
    /// Panics unless `1 <= bits_per_value <= 64`.
    pub fn new(value_count: usize, bits_per_value: u32) -> Self {
        assert!(
            (1..=64).contains(&bits_per_value),
            "bits_per_value must be in 1..=64, got {bits_per_value}"
        );
        let long_count = Format::Packed.long_count(VERSION_CURRENT, value_count, bits_per_value);
        Self {
            blocks: vec![0; long_count],
            value_count,
            bits_per_value,
            mask: max_value(bits_per_value),
            bulk: BulkOperationPacked::new(bits_per_value),
        }
    }

    /// Reads the payload of a `version` stream: whole big-endian longs, then
    /// the trailing bytes, which fill the last block from its high end.
    pub fn from_input(
        version: i32,
        input: &mut dyn DataInput,
        value_count: usize,
        bits_per_value: u32,
    ) -> Result<Self> {
        let mut packed = Self::new(value_count, bits_per_value);
        let byte_count = Format::Packed.byte_count(version, value_count, bits_per_value);
        let full_longs = (byte_count / 8) as usize;
        for block in &mut packed.blocks[..full_longs] {
            *block = input.read_long()?;
        }
        let remaining = (byte_count % 8) as u32;
        if remaining != 0 {
            let mut last = 0u64;
            for i in 0..remaining {
                last |= u64::from(input.read_byte()?) << (56 - i * 8);
            }
            packed.blocks[full_longs] = last;
        }
        Ok(packed)
    }

    /// The backing blocks, including slack bits after the last value.
    pub fn blocks(&self) -> &[u64] {
        &self.blocks
    }

    #[inline]
    fn check_index(&self, index: usize) {
        assert!(
            index < self.value_count,
            "index {index} out of bounds for {} values",
            self.value_count
        );
    }

    /// Block holding the first bit of `index` and the end position of the
    /// value counted from that block's most significant bit (1..=127).
    #[inline]
    fn locate(&self, index: usize) -> (usize, u32) {
        let bit_pos = index as u64 * u64::from(self.bits_per_value);
        ((bit_pos >> 6) as usize, (bit_pos & 63) as u32 + self.bits_per_value)
    }
}

impl Reader for Packed64 {
    #[inline]
    fn get(&self, index: usize) -> u64 {
        self.check_index(index);
        let (element, end_bits) = self.locate(index);
        if end_bits <= 64 {
            (self.blocks[element] >> (64 - end_bits)) & self.mask
        } else {
            let over = end_bits - 64;
            ((self.blocks[element] << over) | (self.blocks[element + 1] >> (64 - over)))
                & self.mask
        }
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
        let values_per_iteration = self.bulk.long_value_count();

        // walk to the next iteration boundary one value at a time
        let offset_in_iteration = index % values_per_iteration;
        if offset_in_iteration != 0 {
            for _ in offset_in_iteration..values_per_iteration {
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

        let block_index = (index as u64 * u64::from(self.bits_per_value) >> 6) as usize;
        let iterations = len / values_per_iteration;
        self.bulk
            .decode_longs(&self.blocks[block_index..], &mut out[off..], iterations);
        index += iterations * values_per_iteration;

        if index > start {
            index - start
        } else {
            default_bulk_get(self, index, &mut out[off..off + len])
        }
    }
}

impl Mutable for Packed64 {
    #[inline]
    fn set(&mut self, index: usize, value: u64) {
        self.check_index(index);
        debug_assert!(value <= self.mask, "{value} does not fit in {} bits", self.bits_per_value);
        let (element, end_bits) = self.locate(index);
        if end_bits <= 64 {
            let shift = 64 - end_bits;
            self.blocks[element] = (self.blocks[element] & !(self.mask << shift)) | (value << shift);
        } else {
            let over = end_bits - 64;
            self.blocks[element] = (self.blocks[element] & !(self.mask >> over)) | (value >> over);
            self.blocks[element + 1] =
                (self.blocks[element + 1] & (u64::MAX >> over)) | (value << (64 - over));
        }
    }

    fn bulk_set(&mut self, mut index: usize, values: &[u64]) -> usize {
        let mut len = values.len().min(self.value_count.saturating_sub(index));
        if len == 0 {
            return 0;
        }
        let start = index;
        let mut off = 0;
        let values_per_iteration = self.bulk.long_value_count();

        let offset_in_iteration = index % values_per_iteration;
        if offset_in_iteration != 0 {
            for _ in offset_in_iteration..values_per_iteration {
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

        let block_index = (index as u64 * u64::from(self.bits_per_value) >> 6) as usize;
        let iterations = len / values_per_iteration;
        self.bulk
            .encode_longs(&values[off..], &mut self.blocks[block_index..], iterations);
        index += iterations * values_per_iteration;

        if index > start {
            index - start
        } else {
            default_bulk_set(self, index, &values[off..off + len])
        }
    }

    fn fill(&mut self, mut from: usize, to: usize, value: u64) {
        assert!(from <= to && to <= self.value_count, "invalid fill range {from}..{to}");
        debug_assert!(bits_required(value) <= self.bits_per_value);
        let bpv = self.bits_per_value as usize;

        // every `aligned_values` values the pattern starts on a block boundary
        let aligned_values = (64 / gcd(64, self.bits_per_value)) as usize;
        if to - from <= 3 * aligned_values {
            default_fill(self, from, to, value);
            return;
        }

        let from_mod = from % aligned_values;
        if from_mod != 0 {
            for _ in from_mod..aligned_values {
                self.set(from, value);
                from += 1;
            }
        }
        debug_assert_eq!(from % aligned_values, 0);

        let aligned_blocks = aligned_values * bpv / 64;
        let mut pattern = Packed64::new(aligned_values, self.bits_per_value);
        for i in 0..aligned_values {
            pattern.set(i, value);
        }
        debug_assert_eq!(pattern.blocks.len(), aligned_blocks);

        let start_block = from * bpv / 64;
        let end_block = to * bpv / 64;
        for (block, &word) in self.blocks[start_block..end_block]
            .iter_mut()
            .zip(pattern.blocks.iter().cycle())
        {
            *block = word;
        }

        for i in (end_block * 64) / bpv..to {
            self.set(i, value);
        }
    }

    fn clear(&mut self) {
        self.blocks.fill(0);
    }

    fn write_payload(&self, out: &mut dyn DataOutput) -> Result<()> {
        let byte_count =
            Format::Packed.byte_count(VERSION_CURRENT, self.value_count, self.bits_per_value);
        let full_longs = (byte_count / 8) as usize;
        for &block in &self.blocks[..full_longs] {
            out.write_long(block)?;
        }
        let remaining = (byte_count % 8) as u32;
        if remaining != 0 {
            let last = self.blocks[full_longs];
            for i in 0..remaining {
                out.write_byte((last >> (56 - i * 8)) as u8)?;
            }
        }
        Ok(())
    }
}
