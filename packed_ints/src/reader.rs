//! The read and write capabilities shared by every layout.

use store_io::{DataOutput, write_header};

use crate::Result;
use crate::bit_ops::bits_required;
use crate::format::{CODEC_NAME, Format, VERSION_CURRENT};

/// Random access to a fixed number of unsigned values.
///
/// `get(index)` with `index >= size()` is a bug in the caller and panics.
pub trait Reader {
    fn get(&self, index: usize) -> u64;

    /// Number of values.
    fn size(&self) -> usize;

    fn bits_per_value(&self) -> u32;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Reads up to `out.len()` values starting at `index` and returns how
    /// many were read. Reads at least one value when `out` is not empty and
    /// `index < size()`.
    fn bulk_get(&self, index: usize, out: &mut [u64]) -> usize {
        default_bulk_get(self, index, out)
    }
}

/// A [`Reader`] whose values can be modified in place.
///
/// Values passed to `set` must fit in `bits_per_value()` bits; wider values
/// are a caller bug. Use [`GrowableWriter`](crate::GrowableWriter) when the
/// width is not known in advance.
pub trait Mutable: Reader {
    fn set(&mut self, index: usize, value: u64);

    /// Writes up to `values.len()` values starting at `index` and returns how
    /// many were written.
    fn bulk_set(&mut self, index: usize, values: &[u64]) -> usize {
        default_bulk_set(self, index, values)
    }

    /// Sets every value in `from..to` to `value`.
    fn fill(&mut self, from: usize, to: usize, value: u64) {
        default_fill(self, from, to, value);
    }

    /// Sets every value to zero.
    fn clear(&mut self) {
        let size = self.size();
        self.fill(0, size, 0);
    }

    fn format(&self) -> Format {
        Format::Packed
    }

    /// Writes the layout-specific payload, without header.
    fn write_payload(&self, out: &mut dyn DataOutput) -> Result<()>;

    /// Serializes a full packed-ints block that
    /// [`get_reader`](crate::get_reader) can restore.
    fn save(&self, out: &mut dyn DataOutput) -> Result<()> {
        debug_assert!(self.size() <= u32::MAX as usize);
        write_header(out, CODEC_NAME, VERSION_CURRENT)?;
        out.write_vint(self.bits_per_value())?;
        out.write_vint(self.size() as u32)?;
        out.write_vint(self.format().id())?;
        self.write_payload(out)
    }
}

pub(crate) fn default_bulk_get<R: Reader + ?Sized>(reader: &R, index: usize, out: &mut [u64]) -> usize {
    let len = out.len().min(reader.size().saturating_sub(index));
    for (i, slot) in out[..len].iter_mut().enumerate() {
        *slot = reader.get(index + i);
    }
    len
}

pub(crate) fn default_bulk_set<M: Mutable + ?Sized>(mutable: &mut M, index: usize, values: &[u64]) -> usize {
    let len = values.len().min(mutable.size().saturating_sub(index));
    for (i, &v) in values[..len].iter().enumerate() {
        mutable.set(index + i, v);
    }
    len
}

pub(crate) fn default_fill<M: Mutable + ?Sized>(mutable: &mut M, from: usize, to: usize, value: u64) {
    assert!(from <= to && to <= mutable.size(), "invalid fill range {from}..{to}");
    debug_assert!(bits_required(value) <= mutable.bits_per_value());
    for i in from..to {
        mutable.set(i, value);
    }
}

/// Copies `len` values from `src[src_pos..]` into `dest[dest_pos..]` using a
/// scratch buffer of at most `mem` bytes.
pub fn copy<R, M>(src: &R, src_pos: usize, dest: &mut M, dest_pos: usize, len: usize, mem: usize)
where
    R: Reader + ?Sized,
    M: Mutable + ?Sized,
{
    assert!(src_pos + len <= src.size(), "source range out of bounds");
    assert!(dest_pos + len <= dest.size(), "destination range out of bounds");
    let capacity = (mem / 8).max(1).min(len);
    if capacity <= 1 {
        for i in 0..len {
            dest.set(dest_pos + i, src.get(src_pos + i));
        }
        return;
    }

    let mut buf = vec![0u64; capacity];
    let mut copied = 0;
    while copied < len {
        let want = capacity.min(len - copied);
        let read = src.bulk_get(src_pos + copied, &mut buf[..want]);
        debug_assert!(read > 0);
        let mut written = 0;
        while written < read {
            written += dest.bulk_set(dest_pos + copied + written, &buf[written..read]);
        }
        copied += read;
    }
}
