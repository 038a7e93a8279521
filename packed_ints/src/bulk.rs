//! Bulk conversion between value sequences and packed blocks.
//!
//! An encoder or decoder works in *iterations*: one iteration turns
//! `long_value_count()` values into `long_block_count()` 64-bit blocks, or
//! `byte_value_count()` values into `byte_block_count()` bytes. Every method
//! checks up front that the supplied slices hold the requested number of
//! iterations and panics otherwise, so a short buffer can never be overrun.

use crate::Result;
use crate::bit_ops::max_value;
use crate::error::PackedIntsError;
use crate::format::{Format, check_version};

/// Block and value counts of one bulk iteration.
pub trait BlockGeometry {
    fn long_block_count(&self) -> usize;
    fn long_value_count(&self) -> usize;
    fn byte_block_count(&self) -> usize;
    fn byte_value_count(&self) -> usize;

    /// How many byte iterations fit in `ram_budget` bytes of blocks plus
    /// decoded values, capped to what `value_count` values need. Always at
    /// least one.
    fn compute_iterations(&self, value_count: usize, ram_budget: usize) -> usize {
        let byte_value_count = self.byte_value_count();
        let iterations = ram_budget / (self.byte_block_count() + 8 * byte_value_count);
        if iterations == 0 {
            1
        } else if (iterations - 1) * byte_value_count >= value_count {
            value_count.div_ceil(byte_value_count).max(1)
        } else {
            iterations
        }
    }
}

pub trait PackedIntsDecoder: BlockGeometry {
    /// Decodes `iterations * long_block_count()` blocks into
    /// `iterations * long_value_count()` values.
    fn decode_longs(&self, blocks: &[u64], values: &mut [u64], iterations: usize);

    /// Decodes `iterations * byte_block_count()` bytes into
    /// `iterations * byte_value_count()` values.
    fn decode_bytes(&self, blocks: &[u8], values: &mut [u64], iterations: usize);
}

pub trait PackedIntsEncoder: BlockGeometry {
    /// Encodes `iterations * long_value_count()` values into
    /// `iterations * long_block_count()` blocks.
    fn encode_longs(&self, values: &[u64], blocks: &mut [u64], iterations: usize);

    /// Encodes `iterations * byte_value_count()` values into
    /// `iterations * byte_block_count()` bytes.
    fn encode_bytes(&self, values: &[u64], blocks: &mut [u8], iterations: usize);
}

#[inline]
fn check_bounds(what: &str, len: usize, needed: usize) {
    assert!(len >= needed, "{what} holds {len} entries, {needed} required");
}

/// Bulk codec for [`Format::Packed`]: a big-endian bit stream where values
/// may straddle block boundaries.
#[derive(Debug, Clone)]
pub struct BulkOperationPacked {
    bits_per_value: u32,
    long_block_count: usize,
    long_value_count: usize,
    byte_block_count: usize,
    byte_value_count: usize,
    mask: u64,
}

impl BulkOperationPacked {
    pub fn new(bits_per_value: u32) -> Self {
        assert!((1..=64).contains(&bits_per_value), "bits_per_value={bits_per_value}");
        let mut blocks = bits_per_value as usize;
        while blocks & 1 == 0 {
            blocks >>= 1;
        }
        let long_block_count = blocks;
        let long_value_count = 64 * long_block_count / bits_per_value as usize;
        let mut byte_block_count = 8 * long_block_count;
        let mut byte_value_count = long_value_count;
        while byte_block_count & 1 == 0 && byte_value_count & 1 == 0 {
            byte_block_count >>= 1;
            byte_value_count >>= 1;
        }
        debug_assert_eq!(long_value_count * bits_per_value as usize, 64 * long_block_count);
        Self {
            bits_per_value,
            long_block_count,
            long_value_count,
            byte_block_count,
            byte_value_count,
            mask: max_value(bits_per_value),
        }
    }
}

impl BlockGeometry for BulkOperationPacked {
    fn long_block_count(&self) -> usize {
        self.long_block_count
    }

    fn long_value_count(&self) -> usize {
        self.long_value_count
    }

    fn byte_block_count(&self) -> usize {
        self.byte_block_count
    }

    fn byte_value_count(&self) -> usize {
        self.byte_value_count
    }
}

impl PackedIntsDecoder for BulkOperationPacked {
    fn decode_longs(&self, blocks: &[u64], values: &mut [u64], iterations: usize) {
        let value_count = iterations * self.long_value_count;
        check_bounds("blocks", blocks.len(), iterations * self.long_block_count);
        check_bounds("values", values.len(), value_count);

        let bpv = self.bits_per_value as i32;
        let mut bits_left: i32 = 64;
        let mut block = 0;
        for v in &mut values[..value_count] {
            bits_left -= bpv;
            if bits_left < 0 {
                // straddles blocks[block] and blocks[block + 1]
                let head = blocks[block] & ((1u64 << (bpv + bits_left)) - 1);
                *v = (head << -bits_left) | (blocks[block + 1] >> (64 + bits_left));
                block += 1;
                bits_left += 64;
            } else {
                *v = (blocks[block] >> bits_left) & self.mask;
                if bits_left == 0 {
                    block += 1;
                    bits_left = 64;
                }
            }
        }
    }

    fn decode_bytes(&self, blocks: &[u8], values: &mut [u64], iterations: usize) {
        let block_count = iterations * self.byte_block_count;
        check_bounds("blocks", blocks.len(), block_count);
        check_bounds("values", values.len(), iterations * self.byte_value_count);

        let bpv = self.bits_per_value;
        let mut next_value = 0u64;
        let mut bits_left = bpv;
        let mut v = 0;
        for &byte in &blocks[..block_count] {
            let bytes = u64::from(byte);
            if bits_left > 8 {
                bits_left -= 8;
                next_value |= bytes << bits_left;
            } else {
                let mut bits = 8 - bits_left;
                values[v] = next_value | (bytes >> bits);
                v += 1;
                while bits >= bpv {
                    bits -= bpv;
                    values[v] = (bytes >> bits) & self.mask;
                    v += 1;
                }
                bits_left = bpv - bits;
                next_value = if bits == 0 {
                    0
                } else {
                    (bytes & ((1u64 << bits) - 1)) << bits_left
                };
            }
        }
        debug_assert_eq!(bits_left, bpv);
    }
}

impl PackedIntsEncoder for BulkOperationPacked {
    fn encode_longs(&self, values: &[u64], blocks: &mut [u64], iterations: usize) {
        let value_count = iterations * self.long_value_count;
        check_bounds("values", values.len(), value_count);
        check_bounds("blocks", blocks.len(), iterations * self.long_block_count);

        let bpv = self.bits_per_value as i32;
        let mut next_block = 0u64;
        let mut bits_left: i32 = 64;
        let mut block = 0;
        for &v in &values[..value_count] {
            debug_assert!(v <= self.mask);
            bits_left -= bpv;
            if bits_left > 0 {
                next_block |= v << bits_left;
            } else if bits_left == 0 {
                blocks[block] = next_block | v;
                block += 1;
                next_block = 0;
                bits_left = 64;
            } else {
                blocks[block] = next_block | (v >> -bits_left);
                block += 1;
                next_block = (v & ((1u64 << -bits_left) - 1)) << (64 + bits_left);
                bits_left += 64;
            }
        }
    }

    fn encode_bytes(&self, values: &[u64], blocks: &mut [u8], iterations: usize) {
        let value_count = iterations * self.byte_value_count;
        check_bounds("values", values.len(), value_count);
        check_bounds("blocks", blocks.len(), iterations * self.byte_block_count);

        let bpv = self.bits_per_value;
        let mut next_block = 0u64;
        let mut bits_left = 8u32;
        let mut b = 0;
        for &v in &values[..value_count] {
            debug_assert!(v <= self.mask);
            if bpv < bits_left {
                next_block |= v << (bits_left - bpv);
                bits_left -= bpv;
            } else {
                let mut bits = bpv - bits_left;
                blocks[b] = (next_block | (v >> bits)) as u8;
                b += 1;
                while bits >= 8 {
                    bits -= 8;
                    blocks[b] = (v >> bits) as u8;
                    b += 1;
                }
                bits_left = 8 - bits;
                next_block = (v & ((1u64 << bits) - 1)) << bits_left;
            }
        }
        debug_assert_eq!(bits_left, 8);
    }
}

/// Bulk codec for [`Format::PackedSingleBlock`]: one block per iteration,
/// first value in the lowest bits.
#[derive(Debug, Clone)]
pub struct BulkOperationPackedSingleBlock {
    bits_per_value: u32,
    value_count: usize,
    mask: u64,
}

impl BulkOperationPackedSingleBlock {
    pub fn new(bits_per_value: u32) -> Self {
        assert!(
            Format::PackedSingleBlock.is_supported(bits_per_value),
            "unsupported bits_per_value={bits_per_value}"
        );
        Self {
            bits_per_value,
            value_count: (64 / bits_per_value) as usize,
            mask: max_value(bits_per_value),
        }
    }

    #[inline]
    fn decode_block(&self, block: u64, values: &mut [u64]) {
        for (j, v) in values.iter_mut().enumerate() {
            *v = (block >> (j as u32 * self.bits_per_value)) & self.mask;
        }
    }

    #[inline]
    fn encode_block(&self, values: &[u64]) -> u64 {
        values
            .iter()
            .enumerate()
            .fold(0u64, |block, (j, &v)| block | (v << (j as u32 * self.bits_per_value)))
    }
}

impl BlockGeometry for BulkOperationPackedSingleBlock {
    fn long_block_count(&self) -> usize {
        1
    }

    fn long_value_count(&self) -> usize {
        self.value_count
    }

    fn byte_block_count(&self) -> usize {
        8
    }

    fn byte_value_count(&self) -> usize {
        self.value_count
    }
}

impl PackedIntsDecoder for BulkOperationPackedSingleBlock {
    fn decode_longs(&self, blocks: &[u64], values: &mut [u64], iterations: usize) {
        check_bounds("blocks", blocks.len(), iterations);
        check_bounds("values", values.len(), iterations * self.value_count);
        for (&block, chunk) in blocks[..iterations]
            .iter()
            .zip(values.chunks_exact_mut(self.value_count))
        {
            self.decode_block(block, chunk);
        }
    }

    fn decode_bytes(&self, blocks: &[u8], values: &mut [u64], iterations: usize) {
        check_bounds("blocks", blocks.len(), iterations * 8);
        check_bounds("values", values.len(), iterations * self.value_count);
        for (bytes, chunk) in blocks[..iterations * 8]
            .chunks_exact(8)
            .zip(values.chunks_exact_mut(self.value_count))
        {
            let mut word = [0u8; 8];
            word.copy_from_slice(bytes);
            self.decode_block(u64::from_be_bytes(word), chunk);
        }
    }
}

impl PackedIntsEncoder for BulkOperationPackedSingleBlock {
    fn encode_longs(&self, values: &[u64], blocks: &mut [u64], iterations: usize) {
        check_bounds("values", values.len(), iterations * self.value_count);
        check_bounds("blocks", blocks.len(), iterations);
        for (block, chunk) in blocks[..iterations]
            .iter_mut()
            .zip(values.chunks_exact(self.value_count))
        {
            *block = self.encode_block(chunk);
        }
    }

    fn encode_bytes(&self, values: &[u64], blocks: &mut [u8], iterations: usize) {
        check_bounds("values", values.len(), iterations * self.value_count);
        check_bounds("blocks", blocks.len(), iterations * 8);
        for (bytes, chunk) in blocks[..iterations * 8]
            .chunks_exact_mut(8)
            .zip(values.chunks_exact(self.value_count))
        {
            bytes.copy_from_slice(&self.encode_block(chunk).to_be_bytes());
        }
    }
}

/// Either bulk codec, selected once from a format.
#[derive(Debug, Clone)]
pub enum BulkOperation {
    Packed(BulkOperationPacked),
    PackedSingleBlock(BulkOperationPackedSingleBlock),
}

impl BulkOperation {
    /// # Panics
    ///
    /// Panics when `format` does not support `bits_per_value`.
    pub fn of(format: Format, bits_per_value: u32) -> Self {
        match format {
            Format::Packed => BulkOperation::Packed(BulkOperationPacked::new(bits_per_value)),
            Format::PackedSingleBlock => BulkOperation::PackedSingleBlock(
                BulkOperationPackedSingleBlock::new(bits_per_value),
            ),
        }
    }
}

macro_rules! dispatch_bulk {
    ($self:ident, $op:ident => $body:expr) => {
        match $self {
            BulkOperation::Packed($op) => $body,
            BulkOperation::PackedSingleBlock($op) => $body,
        }
    };
}

impl BlockGeometry for BulkOperation {
    fn long_block_count(&self) -> usize {
        dispatch_bulk!(self, op => op.long_block_count())
    }

    fn long_value_count(&self) -> usize {
        dispatch_bulk!(self, op => op.long_value_count())
    }

    fn byte_block_count(&self) -> usize {
        dispatch_bulk!(self, op => op.byte_block_count())
    }

    fn byte_value_count(&self) -> usize {
        dispatch_bulk!(self, op => op.byte_value_count())
    }
}

impl PackedIntsDecoder for BulkOperation {
    fn decode_longs(&self, blocks: &[u64], values: &mut [u64], iterations: usize) {
        dispatch_bulk!(self, op => op.decode_longs(blocks, values, iterations))
    }

    fn decode_bytes(&self, blocks: &[u8], values: &mut [u64], iterations: usize) {
        dispatch_bulk!(self, op => op.decode_bytes(blocks, values, iterations))
    }
}

impl PackedIntsEncoder for BulkOperation {
    fn encode_longs(&self, values: &[u64], blocks: &mut [u64], iterations: usize) {
        dispatch_bulk!(self, op => op.encode_longs(values, blocks, iterations))
    }

    fn encode_bytes(&self, values: &[u64], blocks: &mut [u8], iterations: usize) {
        dispatch_bulk!(self, op => op.encode_bytes(values, blocks, iterations))
    }
}

fn checked_operation(
    format: Format,
    version: i32,
    bits_per_value: u32,
) -> Result<BulkOperation> {
    check_version(version)?;
    if !(1..=64).contains(&bits_per_value) {
        return Err(PackedIntsError::InvalidBitsPerValue(bits_per_value));
    }
    if !format.is_supported(bits_per_value) {
        return Err(PackedIntsError::UnsupportedBitsPerValue {
            format,
            bits_per_value,
        });
    }
    Ok(BulkOperation::of(format, bits_per_value))
}

/// Encoder for values of `bits_per_value` bits in `format`.
pub fn get_encoder(
    format: Format,
    version: i32,
    bits_per_value: u32,
) -> Result<impl PackedIntsEncoder> {
    checked_operation(format, version, bits_per_value)
}

/// Decoder for values of `bits_per_value` bits in `format`.
pub fn get_decoder(
    format: Format,
    version: i32,
    bits_per_value: u32,
) -> Result<impl PackedIntsDecoder> {
    checked_operation(format, version, bits_per_value)
}
