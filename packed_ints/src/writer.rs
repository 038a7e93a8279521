//! Streaming serialization for values that arrive one at a time.

use store_io::{DataOutput, write_header};
use tracing::trace;

use crate::Result;
use crate::bit_ops::max_value;
use crate::bulk::{BlockGeometry, BulkOperation, PackedIntsEncoder};
use crate::config::PackedConfig;
use crate::error::PackedIntsError;
use crate::format::{CODEC_NAME, Format, FormatAndBits, VERSION_CURRENT, check_value_count};

/// Encodes a declared number of values into a packed payload through a
/// bounded buffer.
///
/// Call [`finish`](PackedWriter::finish) once all values are added; it pads
/// any missing values with zeros and flushes the buffer. Once a flush fails
/// the writer only returns [`PackedIntsError::WriterFailed`].
#[derive(Debug)]
pub struct PackedWriter<W: DataOutput> {
    out: W,
    format: Format,
    bits_per_value: u32,
    value_count: usize,
    encoder: BulkOperation,
    iterations: usize,
    next_blocks: Vec<u8>,
    next_values: Vec<u64>,
    off: usize,
    written: usize,
    finished: bool,
    failed: bool,
}

impl<W: DataOutput> PackedWriter<W> {
    /// A writer for the payload only; the header, if any, is the caller's.
    ///
    /// `mem` bounds the encode buffer in bytes.
    pub fn new(
        out: W,
        format: Format,
        value_count: usize,
        bits_per_value: u32,
        mem: usize,
    ) -> Result<Self> {
        if !(1..=64).contains(&bits_per_value) {
            return Err(PackedIntsError::InvalidBitsPerValue(bits_per_value));
        }
        if !format.is_supported(bits_per_value) {
            return Err(PackedIntsError::UnsupportedBitsPerValue {
                format,
                bits_per_value,
            });
        }
        let encoder = BulkOperation::of(format, bits_per_value);
        let iterations = encoder.compute_iterations(value_count, mem);
        Ok(Self {
            out,
            format,
            bits_per_value,
            value_count,
            iterations,
            next_blocks: vec![0; iterations * encoder.byte_block_count()],
            next_values: vec![0; iterations * encoder.byte_value_count()],
            encoder,
            off: 0,
            written: 0,
            finished: false,
            failed: false,
        })
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn bits_per_value(&self) -> u32 {
        self.bits_per_value
    }

    pub fn value_count(&self) -> usize {
        self.value_count
    }

    /// Index of the last value added, `None` before the first.
    pub fn ord(&self) -> Option<usize> {
        self.written.checked_sub(1)
    }

    pub fn add(&mut self, value: u64) -> Result<()> {
        debug_assert!(
            value <= max_value(self.bits_per_value),
            "{value} does not fit in {} bits",
            self.bits_per_value
        );
        if self.failed {
            return Err(PackedIntsError::WriterFailed);
        }
        if self.finished || self.written >= self.value_count {
            return Err(PackedIntsError::WritePastEnd {
                value_count: self.value_count,
            });
        }
        self.next_values[self.off] = value;
        self.off += 1;
        self.written += 1;
        if self.off == self.next_values.len() {
            self.flush()?;
        }
        Ok(())
    }

    /// Zero-pads up to the declared count and flushes. Calling it again is a
    /// no-op.
    pub fn finish(&mut self) -> Result<()> {
        if self.failed {
            return Err(PackedIntsError::WriterFailed);
        }
        if self.finished {
            return Ok(());
        }
        while self.written < self.value_count {
            self.add(0)?;
        }
        self.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Finishes the stream and hands back the output.
    pub fn into_inner(mut self) -> Result<W> {
        self.finish()?;
        Ok(self.out)
    }

    fn flush(&mut self) -> Result<()> {
        if self.off == 0 {
            return Ok(());
        }
        self.encoder
            .encode_bytes(&self.next_values, &mut self.next_blocks, self.iterations);
        let block_count =
            self.format.byte_count(VERSION_CURRENT, self.off, self.bits_per_value) as usize;
        if let Err(err) = self.out.write_bytes(&self.next_blocks[..block_count]) {
            self.failed = true;
            return Err(err.into());
        }
        trace!(values = self.off, bytes = block_count, "flushed packed values");
        self.next_values.fill(0);
        self.off = 0;
        Ok(())
    }
}

/// Writes a header for `value_count` values of `bits_per_value` bits and
/// returns a writer for the payload, in the fastest format allowed by
/// `acceptable_overhead_ratio`.
pub fn get_writer<W: DataOutput>(
    out: W,
    value_count: usize,
    bits_per_value: u32,
    acceptable_overhead_ratio: f32,
) -> Result<PackedWriter<W>> {
    let config = PackedConfig::default().with_overhead_ratio(acceptable_overhead_ratio);
    get_writer_with_config(out, value_count, bits_per_value, &config)
}

pub fn get_writer_with_config<W: DataOutput>(
    mut out: W,
    value_count: usize,
    bits_per_value: u32,
    config: &PackedConfig,
) -> Result<PackedWriter<W>> {
    if !(1..=64).contains(&bits_per_value) {
        return Err(PackedIntsError::InvalidBitsPerValue(bits_per_value));
    }
    check_value_count(value_count)?;
    let fab = FormatAndBits::fastest(
        Some(value_count),
        bits_per_value,
        config.acceptable_overhead_ratio,
    );
    write_header(&mut out, CODEC_NAME, VERSION_CURRENT)?;
    out.write_vint(fab.bits_per_value)?;
    out.write_vint(value_count as u32)?;
    out.write_vint(fab.format.id())?;
    PackedWriter::new(out, fab.format, value_count, fab.bits_per_value, config.buffer_size)
}
