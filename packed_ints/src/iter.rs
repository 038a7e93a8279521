//! Sequential decoding of a serialized payload through a bounded buffer.

use store_io::DataInput;
use tracing::debug;

use crate::Result;
use crate::bulk::{BlockGeometry, BulkOperation, PackedIntsDecoder};
use crate::config::PackedConfig;
use crate::error::PackedIntsError;
use crate::factory::read_header;
use crate::format::{Format, check_value_count, check_version};

/// Yields the values of a payload in order without loading all of them.
#[derive(Debug)]
pub struct PackedReaderIterator<R: DataInput> {
    input: R,
    format: Format,
    bits_per_value: u32,
    value_count: usize,
    decoder: BulkOperation,
    iterations: usize,
    next_blocks: Vec<u8>,
    next_values: Vec<u64>,
    off: usize,
    available: usize,
    position: usize,
    remaining_bytes: u64,
}

impl<R: DataInput> PackedReaderIterator<R> {
    /// Iterates a payload whose header was already consumed. `mem` bounds
    /// the decode buffer in bytes.
    pub fn new(
        input: R,
        format: Format,
        version: i32,
        value_count: usize,
        bits_per_value: u32,
        mem: usize,
    ) -> Result<Self> {
        check_version(version)?;
        check_value_count(value_count)?;
        if !(1..=64).contains(&bits_per_value) {
            return Err(PackedIntsError::InvalidBitsPerValue(bits_per_value));
        }
        if !format.is_supported(bits_per_value) {
            return Err(PackedIntsError::UnsupportedBitsPerValue {
                format,
                bits_per_value,
            });
        }
        let decoder = BulkOperation::of(format, bits_per_value);
        let iterations = decoder.compute_iterations(value_count, mem);
        Ok(Self {
            input,
            format,
            bits_per_value,
            value_count,
            iterations,
            next_blocks: vec![0; iterations * decoder.byte_block_count()],
            next_values: vec![0; iterations * decoder.byte_value_count()],
            decoder,
            off: 0,
            available: 0,
            position: 0,
            remaining_bytes: format.byte_count(version, value_count, bits_per_value),
        })
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn bits_per_value(&self) -> u32 {
        self.bits_per_value
    }

    pub fn size(&self) -> usize {
        self.value_count
    }

    /// Index of the last value returned, `None` before the first.
    pub fn ord(&self) -> Option<usize> {
        self.position.checked_sub(1)
    }

    /// Returns between 1 and `max` of the next values.
    ///
    /// A failed read ends the iteration; later calls report
    /// [`PackedIntsError::ReadPastEnd`].
    ///
    /// # Panics
    ///
    /// Panics if `max` is zero.
    pub fn next_batch(&mut self, max: usize) -> Result<&[u64]> {
        assert!(max > 0, "max must be positive");
        if self.position >= self.value_count {
            return Err(PackedIntsError::ReadPastEnd {
                value_count: self.value_count,
            });
        }
        if self.off == self.available {
            if let Err(err) = self.refill() {
                self.position = self.value_count;
                return Err(err);
            }
        }
        let start = self.off;
        let n = max.min(self.available - start);
        self.off += n;
        self.position += n;
        Ok(&self.next_values[start..start + n])
    }

    fn refill(&mut self) -> Result<()> {
        let to_read = self.remaining_bytes.min(self.next_blocks.len() as u64) as usize;
        self.input.read_bytes(&mut self.next_blocks[..to_read])?;
        self.next_blocks[to_read..].fill(0);
        self.remaining_bytes -= to_read as u64;

        self.decoder
            .decode_bytes(&self.next_blocks, &mut self.next_values, self.iterations);
        self.available = self.next_values.len().min(self.value_count - self.position);
        self.off = 0;

        if self.position + self.available == self.value_count && self.remaining_bytes > 0 {
            debug!(padding = self.remaining_bytes, "skipping trailing payload padding");
            self.input.skip_bytes(self.remaining_bytes)?;
            self.remaining_bytes = 0;
        }
        Ok(())
    }
}

impl<R: DataInput> Iterator for PackedReaderIterator<R> {
    type Item = Result<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.value_count {
            return None;
        }
        Some(self.next_batch(1).map(|values| values[0]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.value_count - self.position;
        (remaining, Some(remaining))
    }
}

/// Reads the header from `input`, then iterates its payload.
pub fn get_reader_iterator<R: DataInput>(
    mut input: R,
    mem: usize,
) -> Result<PackedReaderIterator<R>> {
    let header = read_header(&mut input)?;
    PackedReaderIterator::new(
        input,
        header.format,
        header.version,
        header.value_count,
        header.bits_per_value,
        mem,
    )
}

/// Like [`get_reader_iterator`], with the decode buffer sized by
/// `config.buffer_size`.
pub fn get_reader_iterator_with_config<R: DataInput>(
    input: R,
    config: &PackedConfig,
) -> Result<PackedReaderIterator<R>> {
    get_reader_iterator(input, config.buffer_size)
}
