//! 24-bit and 48-bit values spread over three consecutive bytes or shorts.

use bytemuck::Zeroable;
use store_io::{DataInput, DataOutput};

use crate::Result;
use crate::direct::{Cell, read_cells, skip_padding, write_cells, zeroed_cells};
use crate::error::PackedIntsError;
use crate::reader::{Mutable, Reader};

/// Largest value count a three-block layout accepts; `3 * count` must stay
/// addressable as a signed 32-bit cell index.
pub const THREE_BLOCKS_MAX_SIZE: usize = i32::MAX as usize / 3;

/// Each value occupies three `C` cells, most significant cell first.
#[derive(Debug, Clone)]
pub struct ThreeBlocks<C: Cell> {
    blocks: Vec<C>,
    value_count: usize,
}

pub type Packed8ThreeBlocks = ThreeBlocks<u8>;
pub type Packed16ThreeBlocks = ThreeBlocks<u16>;

impl<C: Cell> ThreeBlocks<C> {
    const BITS_PER_VALUE: u32 = 3 * C::BITS;
    const CELL_MASK: u64 = u64::MAX >> (64 - C::BITS);

    pub fn new(value_count: usize) -> Result<Self> {
        if value_count > THREE_BLOCKS_MAX_SIZE {
            return Err(PackedIntsError::CapacityExceeded {
                value_count,
                max: THREE_BLOCKS_MAX_SIZE,
            });
        }
        Ok(Self {
            blocks: zeroed_cells(value_count * 3),
            value_count,
        })
    }

    pub fn from_input(
        version: i32,
        input: &mut dyn DataInput,
        value_count: usize,
    ) -> Result<Self> {
        let mut reader = Self::new(value_count)?;
        read_cells(input, &mut reader.blocks)?;
        let payload = value_count as u64 * 3 * u64::from(C::BITS / 8);
        skip_padding(input, version, value_count, Self::BITS_PER_VALUE, payload)?;
        Ok(reader)
    }
}

impl<C: Cell> Reader for ThreeBlocks<C> {
    #[inline]
    fn get(&self, index: usize) -> u64 {
        assert!(index < self.value_count, "index {index} out of bounds for {}", self.value_count);
        let o = index * 3;
        (self.blocks[o].to_u64() << (2 * C::BITS))
            | (self.blocks[o + 1].to_u64() << C::BITS)
            | self.blocks[o + 2].to_u64()
    }

    fn size(&self) -> usize {
        self.value_count
    }

    fn bits_per_value(&self) -> u32 {
        Self::BITS_PER_VALUE
    }
}

impl<C: Cell> Mutable for ThreeBlocks<C> {
    #[inline]
    fn set(&mut self, index: usize, value: u64) {
        assert!(index < self.value_count, "index {index} out of bounds for {}", self.value_count);
        let o = index * 3;
        self.blocks[o] = C::from_u64((value >> (2 * C::BITS)) & Self::CELL_MASK);
        self.blocks[o + 1] = C::from_u64((value >> C::BITS) & Self::CELL_MASK);
        self.blocks[o + 2] = C::from_u64(value & Self::CELL_MASK);
    }

    fn fill(&mut self, from: usize, to: usize, value: u64) {
        assert!(from <= to && to <= self.value_count, "invalid fill range {from}..{to}");
        let cells = [
            C::from_u64((value >> (2 * C::BITS)) & Self::CELL_MASK),
            C::from_u64((value >> C::BITS) & Self::CELL_MASK),
            C::from_u64(value & Self::CELL_MASK),
        ];
        for chunk in self.blocks[from * 3..to * 3].chunks_exact_mut(3) {
            chunk.copy_from_slice(&cells);
        }
    }

    fn clear(&mut self) {
        self.blocks.fill(C::zeroed());
    }

    fn write_payload(&self, out: &mut dyn DataOutput) -> Result<()> {
        write_cells(out, &self.blocks)
    }
}
