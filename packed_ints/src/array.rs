//! A closed set of in-memory layouts behind one concrete type.

use store_io::DataOutput;

use crate::Result;
use crate::direct::{Direct8, Direct16, Direct32, Direct64};
use crate::format::Format;
use crate::packed64::Packed64;
use crate::reader::{Mutable, Reader};
use crate::single_block::Packed64SingleBlock;
use crate::three_blocks::{Packed8ThreeBlocks, Packed16ThreeBlocks};

/// Every layout the factory can produce.
#[derive(Debug, Clone)]
pub enum PackedArray {
    Direct8(Direct8),
    Direct16(Direct16),
    Direct32(Direct32),
    Direct64(Direct64),
    Packed8ThreeBlocks(Packed8ThreeBlocks),
    Packed16ThreeBlocks(Packed16ThreeBlocks),
    Packed64(Packed64),
    Packed64SingleBlock(Packed64SingleBlock),
}

macro_rules! dispatch {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            PackedArray::Direct8($inner) => $body,
            PackedArray::Direct16($inner) => $body,
            PackedArray::Direct32($inner) => $body,
            PackedArray::Direct64($inner) => $body,
            PackedArray::Packed8ThreeBlocks($inner) => $body,
            PackedArray::Packed16ThreeBlocks($inner) => $body,
            PackedArray::Packed64($inner) => $body,
            PackedArray::Packed64SingleBlock($inner) => $body,
        }
    };
}

impl PackedArray {
    /// Short layout name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PackedArray::Direct8(_) => "Direct8",
            PackedArray::Direct16(_) => "Direct16",
            PackedArray::Direct32(_) => "Direct32",
            PackedArray::Direct64(_) => "Direct64",
            PackedArray::Packed8ThreeBlocks(_) => "Packed8ThreeBlocks",
            PackedArray::Packed16ThreeBlocks(_) => "Packed16ThreeBlocks",
            PackedArray::Packed64(_) => "Packed64",
            PackedArray::Packed64SingleBlock(_) => "Packed64SingleBlock",
        }
    }
}

impl Reader for PackedArray {
    #[inline]
    fn get(&self, index: usize) -> u64 {
        dispatch!(self, r => r.get(index))
    }

    fn size(&self) -> usize {
        dispatch!(self, r => r.size())
    }

    fn bits_per_value(&self) -> u32 {
        dispatch!(self, r => r.bits_per_value())
    }

    fn bulk_get(&self, index: usize, out: &mut [u64]) -> usize {
        dispatch!(self, r => r.bulk_get(index, out))
    }
}

impl Mutable for PackedArray {
    #[inline]
    fn set(&mut self, index: usize, value: u64) {
        dispatch!(self, m => m.set(index, value))
    }

    fn bulk_set(&mut self, index: usize, values: &[u64]) -> usize {
        dispatch!(self, m => m.bulk_set(index, values))
    }

    fn fill(&mut self, from: usize, to: usize, value: u64) {
        dispatch!(self, m => m.fill(from, to, value))
    }

    fn clear(&mut self) {
        dispatch!(self, m => m.clear())
    }

    fn format(&self) -> Format {
        dispatch!(self, m => m.format())
    }

    fn write_payload(&self, out: &mut dyn DataOutput) -> Result<()> {
        dispatch!(self, m => m.write_payload(out))
    }
}
