//! One native cell (byte, short, int or long) per value.

use bytemuck::{Pod, Zeroable};
use store_io::{DataInput, DataOutput};
use tracing::debug;

use crate::Result;
use crate::error::PackedIntsError;
use crate::format::Format;
use crate::reader::{Mutable, Reader};

/// An unsigned storage cell read and written in big-endian order.
pub trait Cell: Pod {
    const BITS: u32;

    fn from_u64(value: u64) -> Self;
    fn to_u64(self) -> u64;
    fn read_from(input: &mut dyn DataInput) -> Result<Self>;
    fn write_to(self, out: &mut dyn DataOutput) -> Result<()>;
}

macro_rules! impl_cell {
    ($ty:ty, $bits:expr, $read:ident, $write:ident) => {
        impl Cell for $ty {
            const BITS: u32 = $bits;

            #[inline(always)]
            fn from_u64(value: u64) -> Self {
                value as $ty
            }

            #[inline(always)]
            fn to_u64(self) -> u64 {
                self as u64
            }

            fn read_from(input: &mut dyn DataInput) -> Result<Self> {
                Ok(input.$read()?)
            }

            fn write_to(self, out: &mut dyn DataOutput) -> Result<()> {
                Ok(out.$write(self)?)
            }
        }
    };
}

impl_cell!(u8, 8, read_byte, write_byte);
impl_cell!(u16, 16, read_short, write_short);
impl_cell!(u32, 32, read_int, write_int);
impl_cell!(u64, 64, read_long, write_long);

pub(crate) fn zeroed_cells<C: Cell>(count: usize) -> Vec<C> {
    vec![C::zeroed(); count]
}

pub(crate) fn read_cells<C: Cell>(
    input: &mut dyn DataInput,
    cells: &mut [C],
) -> Result<()> {
    if C::BITS == 8 {
        input.read_bytes(bytemuck::cast_slice_mut(cells))?;
        return Ok(());
    }
    for cell in cells.iter_mut() {
        *cell = C::read_from(input)?;
    }
    Ok(())
}

pub(crate) fn write_cells<C: Cell>(
    out: &mut dyn DataOutput,
    cells: &[C],
) -> Result<()> {
    if C::BITS == 8 {
        out.write_bytes(bytemuck::cast_slice(cells))?;
        return Ok(());
    }
    for &cell in cells {
        cell.write_to(out)?;
    }
    Ok(())
}

/// Skips what older, word-aligned streams wrote after `payload_bytes`.
pub(crate) fn skip_padding(
    input: &mut dyn DataInput,
    version: i32,
    value_count: usize,
    bits_per_value: u32,
    payload_bytes: u64,
) -> Result<()> {
    let total = Format::Packed.byte_count(version, value_count, bits_per_value);
    let padding = total - payload_bytes;
    if padding > 0 {
        debug!(version, padding, "skipping legacy word padding");
        input.skip_bytes(padding)?;
    }
    Ok(())
}

/// Values stored unpacked, one `C` per value.
#[derive(Debug, Clone)]
pub struct Direct<C: Cell> {
    values: Vec<C>,
}

pub type Direct8 = Direct<u8>;
pub type Direct16 = Direct<u16>;
pub type Direct32 = Direct<u32>;
pub type Direct64 = Direct<u64>;

impl<C: Cell> Direct<C> {
    pub fn new(value_count: usize) -> Self {
        Self {
            values: zeroed_cells(value_count),
        }
    }

    /// Reads `value_count` cells, then any padding a pre-byte-aligned stream
    /// carries after them.
    pub fn from_input(
        version: i32,
        input: &mut dyn DataInput,
        value_count: usize,
    ) -> Result<Self> {
        let mut values = zeroed_cells::<C>(value_count);
        read_cells(input, &mut values)?;
        let payload = value_count as u64 * u64::from(C::BITS / 8);
        skip_padding(input, version, value_count, C::BITS, payload)?;
        Ok(Self { values })
    }

    pub fn as_slice(&self) -> &[C] {
        &self.values
    }
}

impl<C: Cell> Reader for Direct<C> {
    #[inline]
    fn get(&self, index: usize) -> u64 {
        self.values[index].to_u64()
    }

    fn size(&self) -> usize {
        self.values.len()
    }

    fn bits_per_value(&self) -> u32 {
        C::BITS
    }

    fn bulk_get(&self, index: usize, out: &mut [u64]) -> usize {
        let len = out.len().min(self.values.len().saturating_sub(index));
        for (slot, cell) in out[..len].iter_mut().zip(&self.values[index..index + len]) {
            *slot = cell.to_u64();
        }
        len
    }
}

impl<C: Cell> Mutable for Direct<C> {
    #[inline]
    fn set(&mut self, index: usize, value: u64) {
        self.values[index] = C::from_u64(value);
    }

    fn bulk_set(&mut self, index: usize, values: &[u64]) -> usize {
        let len = values.len().min(self.values.len().saturating_sub(index));
        for (cell, &v) in self.values[index..index + len].iter_mut().zip(values) {
            *cell = C::from_u64(v);
        }
        len
    }

    fn fill(&mut self, from: usize, to: usize, value: u64) {
        assert!(from <= to, "invalid fill range {from}..{to}");
        self.values[from..to].fill(C::from_u64(value));
    }

    fn clear(&mut self) {
        self.values.fill(C::zeroed());
    }

    fn write_payload(&self, out: &mut dyn DataOutput) -> Result<()> {
        write_cells(out, &self.values)
    }
}
